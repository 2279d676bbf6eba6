//! Testing utilities
//!
//! - `expect!` macro for fluent assertions with clear expected/received output
//! - `TestDatabase` for isolated, fully migrated databases
//! - `TestClient` for driving a router without a socket
//!
//! # Example
//!
//! ```rust,ignore
//! use listkit::expect;
//! use listkit::testing::{TestClient, TestDatabase};
//!
//! #[tokio::test]
//! async fn creates_a_list() {
//!     let db = TestDatabase::fresh::<Migrator>().await.unwrap();
//!     let client = TestClient::new(routes::register(db.connection()));
//!
//!     let res = client.post("/todo-lists").json(json!({"title": "groceries"})).send().await;
//!     expect!(res.status()).to_equal(200);
//!     expect!(res.json()).to_have_key("id");
//! }
//! ```

mod client;
mod expect;

pub use crate::database::testing::TestDatabase;
pub use client::{TestClient, TestRequest, TestResponse};
pub use expect::Expect;

/// Wrap a value for fluent assertions, recording the call site
#[macro_export]
macro_rules! expect {
    ($value:expr) => {
        $crate::testing::Expect::new($value, concat!(file!(), ":", line!()))
    };
}
