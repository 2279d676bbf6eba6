use super::{client, given, id_of};
use listkit::expect;
use pretty_assertions::assert_eq;
use serde_json::json;

fn red_list() -> serde_json::Value {
    json!({"title": "so many things to do", "color": "red"})
}

fn green_list() -> serde_json::Value {
    json!({"title": "so many things to do wow", "color": "green"})
}

#[tokio::test]
async fn creates_a_todo_list() {
    let client = client().await;

    let res = client.post("/todo-lists").json(red_list()).send().await;

    expect!(res.status()).to_equal(200);
    expect!(res.json()).to_have_key("id");
    expect!(res.json()).to_contain_subset(red_list());
}

#[tokio::test]
async fn counts_todo_lists() {
    let client = client().await;
    given(&client, "/todo-lists", red_list()).await;
    given(&client, "/todo-lists", green_list()).await;

    let res = client.get("/todo-lists/count").send().await;
    expect!(res.json()).to_equal(json!({"count": 2}));

    let all = client.get("/todo-lists").send().await;
    expect!(all.json()).to_have_length(2);
}

#[tokio::test]
async fn counts_a_subset_of_todo_lists() {
    let client = client().await;
    given(&client, "/todo-lists", red_list()).await;
    given(&client, "/todo-lists", green_list()).await;

    let res = client
        .get("/todo-lists/count")
        .query_json("where", json!({"title": "so many things to do wow"}))
        .send()
        .await;

    expect!(res.status()).to_equal(200);
    expect!(res.json()).to_equal(json!({"count": 1}));
}

#[tokio::test]
async fn finds_all_todo_lists_in_id_order() {
    let client = client().await;
    let red = given(&client, "/todo-lists", red_list()).await;
    let green = given(&client, "/todo-lists", green_list()).await;

    let res = client.get("/todo-lists").send().await;

    expect!(res.status()).to_equal(200);
    assert_eq!(res.json(), json!([red, green]));
}

#[tokio::test]
async fn updates_only_the_selected_todo_lists() {
    let client = client().await;
    let red = given(&client, "/todo-lists", red_list()).await;
    let green = given(&client, "/todo-lists", green_list()).await;

    let res = client
        .patch("/todo-lists")
        .query_json("where", json!({"color": "red"}))
        .json(json!({"color": "purple"}))
        .send()
        .await;
    expect!(res.json()).to_equal(json!({"count": 1}));

    let red = client.get(&format!("/todo-lists/{}", id_of(&red))).send().await;
    expect!(red.json()["color"].clone()).to_equal(json!("purple"));
    let green = client.get(&format!("/todo-lists/{}", id_of(&green))).send().await;
    expect!(green.json()["color"].clone()).to_equal(json!("green"));
}

#[tokio::test]
async fn updates_every_todo_list_without_a_where() {
    let client = client().await;
    given(&client, "/todo-lists", red_list()).await;
    given(&client, "/todo-lists", green_list()).await;

    let res = client
        .patch("/todo-lists")
        .json(json!({"color": "purple"}))
        .send()
        .await;
    expect!(res.json()).to_equal(json!({"count": 2}));

    let purple = client
        .get("/todo-lists/count")
        .query("where[color]", "purple")
        .send()
        .await;
    expect!(purple.json()).to_equal(json!({"count": 2}));
}

#[tokio::test]
async fn rejects_a_bulk_title_change_that_would_duplicate() {
    let client = client().await;
    given(&client, "/todo-lists", red_list()).await;
    given(&client, "/todo-lists", green_list()).await;

    let res = client
        .patch("/todo-lists")
        .json(json!({"title": "same"}))
        .send()
        .await;

    expect!(res.status()).to_equal(422);
    expect!(res.json()["errors"].clone()).to_have_key("title");
}

#[tokio::test]
async fn gets_a_todo_list_by_id() {
    let client = client().await;
    let red = given(&client, "/todo-lists", red_list()).await;

    let res = client.get(&format!("/todo-lists/{}", id_of(&red))).send().await;

    expect!(res.status()).to_equal(200);
    assert_eq!(res.json(), red);
}

#[tokio::test]
async fn returns_404_for_a_missing_todo_list() {
    let client = client().await;

    expect!(client.get("/todo-lists/99999").send().await.status()).to_equal(404);
    expect!(client
        .patch("/todo-lists/99999")
        .json(json!({"color": "blue"}))
        .send()
        .await
        .status())
    .to_equal(404);
    expect!(client.delete("/todo-lists/99999").send().await.status()).to_equal(404);
}

#[tokio::test]
async fn rejects_a_non_numeric_id() {
    let client = client().await;
    expect!(client.get("/todo-lists/abc").send().await.status()).to_equal(400);
}

#[tokio::test]
async fn patches_a_todo_list_by_id() {
    let client = client().await;
    let red = given(&client, "/todo-lists", red_list()).await;
    let path = format!("/todo-lists/{}", id_of(&red));

    let res = client
        .patch(&path)
        .json(json!({"title": "DO SOME STUFF"}))
        .send()
        .await;
    expect!(res.status()).to_equal(204);
    expect!(res.text().to_string()).to_equal(String::new());

    let updated = client.get(&path).send().await.json();
    assert_eq!(
        updated,
        json!({"id": id_of(&red), "title": "DO SOME STUFF", "color": "red"})
    );
}

#[tokio::test]
async fn replaces_a_todo_list_by_id() {
    let client = client().await;
    let red = given(&client, "/todo-lists", red_list()).await;
    let path = format!("/todo-lists/{}", id_of(&red));

    let res = client.put(&path).json(json!({"title": "fresh"})).send().await;
    expect!(res.status()).to_equal(204);

    let replaced = client.get(&path).send().await.json();
    expect!(replaced.clone()).to_not_have_key("color");
    expect!(replaced["title"].clone()).to_equal(json!("fresh"));
}

#[tokio::test]
async fn deletes_a_todo_list() {
    let client = client().await;
    let red = given(&client, "/todo-lists", red_list()).await;
    let path = format!("/todo-lists/{}", id_of(&red));

    expect!(client.delete(&path).send().await.status()).to_equal(204);
    expect!(client.get(&path).send().await.status()).to_equal(404);
}

#[tokio::test]
async fn filters_with_bracket_and_json_encodings_alike() {
    let client = client().await;
    given(&client, "/todo-lists", red_list()).await;
    let black = given(
        &client,
        "/todo-lists",
        json!({"title": "errands", "color": "black"}),
    )
    .await;

    let bracket = client
        .get("/todo-lists")
        .query("filter[where][color]", "black")
        .send()
        .await;
    let encoded = client
        .get("/todo-lists")
        .query_json("filter", json!({"where": {"color": "black"}}))
        .send()
        .await;

    assert_eq!(bracket.json(), json!([black]));
    assert_eq!(encoded.json(), bracket.json());
}

#[tokio::test]
async fn orders_and_pages_todo_lists() {
    let client = client().await;
    for title in ["a", "b", "c"] {
        given(&client, "/todo-lists", json!({ "title": title })).await;
    }

    let res = client
        .get("/todo-lists")
        .query_json("filter", json!({"order": "title DESC", "limit": 2, "skip": 1}))
        .send()
        .await;

    let titles: Vec<_> = res
        .json()
        .as_array()
        .map(|lists| lists.iter().map(|l| l["title"].clone()).collect())
        .unwrap_or_default();
    assert_eq!(titles, vec![json!("b"), json!("a")]);
}

#[tokio::test]
async fn includes_todos_of_each_list() {
    let client = client().await;
    let with_todo = given(&client, "/todo-lists", red_list()).await;
    let empty = given(&client, "/todo-lists", green_list()).await;
    let todo = given(
        &client,
        "/todos",
        json!({"title": "build a ship", "todoListId": id_of(&with_todo)}),
    )
    .await;

    let res = client
        .get("/todo-lists")
        .query_json("filter", json!({"include": [{"relation": "todos"}]}))
        .send()
        .await;

    expect!(res.status()).to_equal(200);
    let lists = res.json();
    assert_eq!(lists[0]["id"], with_todo["id"]);
    assert_eq!(lists[0]["todos"], json!([todo]));
    assert_eq!(lists[1]["id"], empty["id"]);
    assert_eq!(lists[1]["todos"], json!([]));
}

#[tokio::test]
async fn includes_todos_with_a_scope() {
    let client = client().await;
    let list = given(&client, "/todo-lists", red_list()).await;
    let list_id = id_of(&list);
    given(
        &client,
        "/todos",
        json!({"title": "done", "isComplete": true, "todoListId": list_id}),
    )
    .await;
    let open = given(
        &client,
        "/todos",
        json!({"title": "open", "isComplete": false, "todoListId": list_id}),
    )
    .await;

    let res = client
        .get(&format!("/todo-lists/{}", list_id))
        .query_json(
            "filter",
            json!({"include": [{"relation": "todos", "scope": {"where": {"isComplete": false}}}]}),
        )
        .send()
        .await;

    assert_eq!(res.json()["todos"], json!([open]));
}

#[tokio::test]
async fn rejects_a_list_without_a_title() {
    let client = client().await;

    let res = client
        .post("/todo-lists")
        .json(json!({"color": "red"}))
        .send()
        .await;

    expect!(res.status()).to_equal(422);
    assert_eq!(
        res.json()["errors"]["title"],
        json!(["The title field is required."])
    );
}

#[tokio::test]
async fn rejects_a_duplicate_title() {
    let client = client().await;
    given(&client, "/todo-lists", red_list()).await;

    let res = client.post("/todo-lists").json(red_list()).send().await;

    expect!(res.status()).to_equal(422);
    assert_eq!(
        res.json()["errors"]["title"],
        json!(["The title has already been taken."])
    );
}

#[tokio::test]
async fn rejects_unknown_filter_fields_and_relations() {
    let client = client().await;

    let field = client
        .get("/todo-lists")
        .query_json("filter", json!({"where": {"owner": "me"}}))
        .send()
        .await;
    expect!(field.status()).to_equal(400);

    let relation = client
        .get("/todo-lists")
        .query_json("filter", json!({"include": ["owner"]}))
        .send()
        .await;
    expect!(relation.status()).to_equal(400);
}

#[tokio::test]
async fn deleting_a_list_deletes_its_todos() {
    let client = client().await;
    let list = given(&client, "/todo-lists", red_list()).await;
    let other = given(&client, "/todo-lists", green_list()).await;
    for (title, owner) in [("a", &list), ("b", &list), ("c", &other)] {
        given(
            &client,
            "/todos",
            json!({"title": title, "todoListId": id_of(owner)}),
        )
        .await;
    }

    let res = client
        .delete(&format!("/todo-lists/{}", id_of(&list)))
        .send()
        .await;
    expect!(res.status()).to_equal(204);

    let remaining = client.get("/todos").send().await.json();
    expect!(remaining.clone()).to_have_length(1);
    assert_eq!(remaining[0]["title"], json!("c"));
}
