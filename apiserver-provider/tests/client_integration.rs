use apiserver_provider::client::HttpPeopleClient;
use apiserver_provider_core::contract::{PeopleClient, Person};
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn person(id: i64, name: &str, age: i64, description: &str) -> Person {
    Person {
        id,
        name: name.into(),
        age,
        description: description.into(),
    }
}

#[tokio::test]
async fn test_create_posts_person_and_returns_assigned_id() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/people"))
        .and(body_json(json!({"id": 0, "name": "MyName", "age": 42, "description": "one"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": 0, "name": "MyName", "age": 42, "description": "one"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = HttpPeopleClient::new(&server.uri()).expect("client builds");
    let created = client
        .create(person(0, "MyName", 42, "one"))
        .await
        .expect("create succeeds");

    assert_eq!(created, person(0, "MyName", 42, "one"));
    server.verify().await;
}

#[tokio::test]
async fn test_get_reads_person_and_defaults_missing_description() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/people/0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 0, "name": "personXXX", "age": 49
        })))
        .mount(&server)
        .await;

    let client = HttpPeopleClient::new(&server.uri()).unwrap();
    let fetched = client.get(0).await.expect("get succeeds");
    assert_eq!(fetched, person(0, "personXXX", 49, ""));
}

#[tokio::test]
async fn test_get_maps_404_to_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/people/7"))
        .respond_with(ResponseTemplate::new(404).set_body_string("not found"))
        .mount(&server)
        .await;

    let client = HttpPeopleClient::new(&server.uri()).unwrap();
    let err = client.get(7).await.unwrap_err();
    assert_eq!(err.to_string(), "person 7 not found");
}

#[tokio::test]
async fn test_update_puts_new_values() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/api/v1/people/3"))
        .and(body_json(json!({"id": 3, "name": "MyName", "age": 42, "description": "two"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 3, "name": "MyName", "age": 42, "description": "two"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = HttpPeopleClient::new(&server.uri()).unwrap();
    let updated = client
        .update(3, person(0, "MyName", 42, "two"))
        .await
        .expect("update succeeds");
    assert_eq!(updated.description, "two");
    server.verify().await;
}

#[tokio::test]
async fn test_delete_accepts_no_content() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/v1/people/3"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let client = HttpPeopleClient::new(&server.uri()).unwrap();
    client.delete(3).await.expect("delete succeeds");
    server.verify().await;
}

#[tokio::test]
async fn test_server_errors_carry_status_and_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/people"))
        .respond_with(ResponseTemplate::new(422).set_body_string("age must be positive"))
        .mount(&server)
        .await;

    let client = HttpPeopleClient::new(&server.uri()).unwrap();
    let err = client.create(person(0, "X", -1, "")).await.unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("422"), "status expected in: {msg}");
    assert!(msg.contains("age must be positive"), "body expected in: {msg}");
}

#[tokio::test]
async fn test_malformed_response_is_a_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/people/1"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
        .mount(&server)
        .await;

    let client = HttpPeopleClient::new(&server.uri()).unwrap();
    let err = client.get(1).await.unwrap_err();
    assert!(err.to_string().contains("failed to decode"));
}
