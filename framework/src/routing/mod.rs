pub mod resource;
mod router;

pub use router::{with_state, BoxedHandler, Router};
