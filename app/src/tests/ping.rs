use super::client;
use listkit::expect;
use serde_json::json;

#[tokio::test]
async fn ping_echoes_the_request() {
    let client = client().await;

    let res = client
        .get("/ping")
        .header("x-request-id", "abc")
        .send()
        .await;

    expect!(res.status()).to_equal(200);
    let body = res.json();
    for key in ["greeting", "date", "url", "headers"] {
        expect!(body.clone()).to_have_key(key);
    }
    expect!(body["url"].clone()).to_equal(json!("/ping"));
    expect!(body["headers"]["x-request-id"].clone()).to_equal(json!("abc"));
}
