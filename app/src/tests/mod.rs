//! Tests against a fresh, fully migrated in-memory database

use crate::migrations::Migrator;
use crate::routes;
use listkit::testing::{TestClient, TestDatabase};
use serde_json::Value;

mod notes;
mod ping;
mod todo_list_todos;
mod todo_lists;

async fn client() -> TestClient {
    let db = TestDatabase::fresh::<Migrator>()
        .await
        .expect("test database");
    TestClient::new(routes::register(db.connection()))
}

/// POST `body` to `path` and return the created record
async fn given(client: &TestClient, path: &str, body: Value) -> Value {
    let res = client.post(path).json(body).send().await;
    assert_eq!(res.status(), 200, "seeding {} failed: {}", path, res.text());
    res.json()
}

fn id_of(record: &Value) -> i64 {
    record["id"].as_i64().expect("record has an id")
}
