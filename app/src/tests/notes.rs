use super::{client, given, id_of};
use listkit::expect;
use pretty_assertions::assert_eq;
use serde_json::json;

#[tokio::test]
async fn manages_notes() {
    let client = client().await;
    let note = given(
        &client,
        "/notes",
        json!({"title": "shopping", "content": "milk, eggs"}),
    )
    .await;
    let path = format!("/notes/{}", id_of(&note));

    assert_eq!(client.get(&path).send().await.json(), note);

    let res = client.put(&path).json(json!({"title": "errands"})).send().await;
    expect!(res.status()).to_equal(204);
    assert_eq!(
        client.get(&path).send().await.json(),
        json!({"id": id_of(&note), "title": "errands"})
    );

    expect!(client.delete(&path).send().await.status()).to_equal(204);
    expect!(client.get("/notes/count").send().await.json()).to_equal(json!({"count": 0}));
}

#[tokio::test]
async fn replace_still_requires_a_title() {
    let client = client().await;
    let note = given(&client, "/notes", json!({"title": "shopping"})).await;

    let res = client
        .put(&format!("/notes/{}", id_of(&note)))
        .json(json!({"content": "no title"}))
        .send()
        .await;

    expect!(res.status()).to_equal(422);
}
