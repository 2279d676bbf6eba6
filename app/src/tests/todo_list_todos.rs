use super::{client, given, id_of};
use listkit::expect;
use pretty_assertions::assert_eq;
use serde_json::json;

#[tokio::test]
async fn creates_a_todo_owned_by_the_list() {
    let client = client().await;
    let list = given(&client, "/todo-lists", json!({"title": "groceries"})).await;

    let res = client
        .post(&format!("/todo-lists/{}/todos", id_of(&list)))
        .json(json!({"title": "buy milk"}))
        .send()
        .await;

    expect!(res.status()).to_equal(200);
    expect!(res.json()).to_contain_subset(json!({"title": "buy milk", "todoListId": id_of(&list)}));
}

#[tokio::test]
async fn creating_in_a_missing_list_fails_validation() {
    let client = client().await;

    let res = client
        .post("/todo-lists/99999/todos")
        .json(json!({"title": "buy milk"}))
        .send()
        .await;

    expect!(res.status()).to_equal(422);
}

#[tokio::test]
async fn finds_only_the_lists_todos() {
    let client = client().await;
    let list = given(&client, "/todo-lists", json!({"title": "groceries"})).await;
    let other = given(&client, "/todo-lists", json!({"title": "chores"})).await;
    let milk = given(
        &client,
        "/todos",
        json!({"title": "buy milk", "todoListId": id_of(&list)}),
    )
    .await;
    given(
        &client,
        "/todos",
        json!({"title": "sweep", "todoListId": id_of(&other)}),
    )
    .await;

    let res = client
        .get(&format!("/todo-lists/{}/todos", id_of(&list)))
        .send()
        .await;

    assert_eq!(res.json(), json!([milk]));
}

#[tokio::test]
async fn patches_and_deletes_only_the_lists_todos() {
    let client = client().await;
    let list = given(&client, "/todo-lists", json!({"title": "groceries"})).await;
    let other = given(&client, "/todo-lists", json!({"title": "chores"})).await;
    for (title, owner) in [("milk", &list), ("eggs", &list), ("sweep", &other)] {
        given(
            &client,
            "/todos",
            json!({"title": title, "todoListId": id_of(owner)}),
        )
        .await;
    }
    let path = format!("/todo-lists/{}/todos", id_of(&list));

    let patched = client
        .patch(&path)
        .query_json("where", json!({"title": "milk"}))
        .json(json!({"isComplete": true}))
        .send()
        .await;
    expect!(patched.json()).to_equal(json!({"count": 1}));

    let completed = client
        .get("/todos/count")
        .query("where[isComplete]", "true")
        .send()
        .await;
    expect!(completed.json()).to_equal(json!({"count": 1}));

    let deleted = client.delete(&path).send().await;
    expect!(deleted.json()).to_equal(json!({"count": 2}));

    let remaining = client.get("/todos").send().await.json();
    expect!(remaining.clone()).to_have_length(1);
    assert_eq!(remaining[0]["title"], json!("sweep"));
}

#[tokio::test]
async fn refuses_to_move_todos_between_lists() {
    let client = client().await;
    let list = given(&client, "/todo-lists", json!({"title": "groceries"})).await;
    let other = given(&client, "/todo-lists", json!({"title": "chores"})).await;

    let res = client
        .patch(&format!("/todo-lists/{}/todos", id_of(&list)))
        .json(json!({"todoListId": id_of(&other)}))
        .send()
        .await;

    expect!(res.status()).to_equal(422);
}
