//! Generated clients over `HyperTransport`, against wiremock.

#![allow(missing_docs)]

use std::collections::HashMap;
use std::time::Duration;

use assert2::{check, let_assert};
use ferrule::prelude::*;
use ferrule::{LoggingTransport, TransportConfig};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{
        body_json, body_string, body_string_contains, header, header_regex, method, path,
        query_param,
    },
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct User {
    id: u64,
    name: String,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

#[ferrule]
pub trait UserApi {
    #[get("/users/{id}")]
    async fn get_user(&self, #[path] id: u64) -> ferrule::Result<User>;

    #[get("/users")]
    async fn search(
        &self,
        #[query("q")] name: &str,
        #[query] page: Option<u32>,
        #[query_map] extra: &HashMap<String, String>,
    ) -> ferrule::Result<Vec<User>>;

    #[post("/users")]
    #[headers("X-Client: ferrule")]
    async fn create_user(
        &self,
        #[body] user: &User,
        #[header("Authorization")] token: &str,
    ) -> ferrule::Result<User>;

    #[put("/users/{id}")]
    async fn update_user(&self, #[path] id: u64, #[body] user: &User) -> ferrule::Result<User>;

    #[delete("/users/{id}")]
    async fn delete_user(&self, #[path] id: u64) -> ferrule::Result<()>;

    #[post("/login")]
    #[form_url_encoded]
    async fn login(&self, #[field] user: &str, #[field] password: &str) -> ferrule::Result<()>;

    #[post("/avatar")]
    #[multipart]
    async fn upload(&self, #[part] file: Part, #[part] caption: &str) -> ferrule::Result<()>;

    #[get("/archive")]
    #[streaming]
    async fn archive(&self) -> ferrule::Result<bytes::Bytes>;

    #[get("/slow")]
    async fn slow(&self) -> ferrule::Result<()>;
}

fn client(server: &MockServer) -> UserApiClient {
    UserApiClient::new(Ferrule::new(server.uri(), HyperTransport::new()))
}

fn alice() -> User {
    User {
        id: 1,
        name: "Alice".to_string(),
    }
}

#[tokio::test]
async fn get_decodes_json() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(alice()))
        .expect(1)
        .mount(&server)
        .await;

    let_assert!(Ok(user) = client(&server).get_user(1).await);
    check!(user == alice());
}

#[tokio::test]
async fn query_parameters() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users"))
        .and(query_param("q", "ali ce"))
        .and(query_param("page", "2"))
        .and(query_param("sort", "name"))
        .respond_with(ResponseTemplate::new(200).set_body_json(vec![alice()]))
        .mount(&server)
        .await;

    let extra = HashMap::from([("sort".to_string(), "name".to_string())]);
    let_assert!(Ok(users) = client(&server).search("ali ce", Some(2), &extra).await);
    check!(users == [alice()]);
}

#[tokio::test]
async fn post_json_with_headers() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/users"))
        .and(header("content-type", "application/json"))
        .and(header("x-client", "ferrule"))
        .and(header("authorization", "Bearer abc"))
        .and(body_json(alice()))
        .respond_with(ResponseTemplate::new(201).set_body_json(alice()))
        .expect(1)
        .mount(&server)
        .await;

    let_assert!(Ok(user) = client(&server).create_user(&alice(), "Bearer abc").await);
    check!(user == alice());
}

#[tokio::test]
async fn put_and_delete() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/users/1"))
        .and(body_json(alice()))
        .respond_with(ResponseTemplate::new(200).set_body_json(alice()))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/users/1"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let api = client(&server);
    let_assert!(Ok(_) = api.update_user(1, &alice()).await);
    let_assert!(Ok(()) = api.delete_user(1).await);
}

#[tokio::test]
async fn form_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/login"))
        .and(header("content-type", "application/x-www-form-urlencoded"))
        .and(body_string("password=s3cr%21t&user=alice"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let_assert!(Ok(()) = client(&server).login("alice", "s3cr!t").await);
}

#[tokio::test]
async fn multipart_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/avatar"))
        .and(header_regex("content-type", "^multipart/form-data; boundary="))
        .and(body_string_contains(
            "Content-Disposition: form-data; name=\"file\"; filename=\"me.png\"",
        ))
        .and(body_string_contains("name=\"caption\""))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let file = Part::file("me.png", b"fake png".to_vec());
    let_assert!(Ok(()) = client(&server).upload(file, "hello").await);
}

#[tokio::test]
async fn streaming_reply_is_raw() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/archive"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"not json".to_vec()))
        .mount(&server)
        .await;

    let_assert!(Ok(data) = client(&server).archive().await);
    check!(data == "not json");
}

#[tokio::test]
async fn http_error_keeps_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/404"))
        .respond_with(
            ResponseTemplate::new(404)
                .set_body_json(serde_json::json!({"message": "no such user"})),
        )
        .mount(&server)
        .await;

    let_assert!(Err(err) = client(&server).get_user(404).await);
    check!(err.is_not_found());
    let_assert!(Some(Ok(body)) = err.decode_body::<ApiError>());
    check!(body.message == "no such user");
}

#[tokio::test]
async fn timeout() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
        .mount(&server)
        .await;

    let transport = HyperTransport::with_config(
        TransportConfig::builder()
            .timeout(Duration::from_millis(100))
            .build(),
    );
    let api = UserApiClient::new(Ferrule::new(server.uri(), transport));

    let_assert!(Err(err) = api.slow().await);
    check!(err.is_timeout(), "expected timeout error, got: {err}");
}

#[tokio::test]
async fn timeout_covers_reply_body() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().expect("local addr");
    let server = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.expect("accept");
        let mut request = [0_u8; 1024];
        let _ = socket.read(&mut request).await;
        socket
            .write_all(b"HTTP/1.1 200 OK\r\ncontent-length: 64\r\n\r\n{\"id\":")
            .await
            .expect("write head");
        tokio::time::sleep(Duration::from_secs(5)).await;
    });

    let transport = HyperTransport::with_config(
        TransportConfig::builder()
            .timeout(Duration::from_millis(200))
            .build(),
    );
    let api = UserApiClient::new(Ferrule::new(format!("http://{addr}"), transport));

    let_assert!(Err(err) = api.get_user(1).await);
    check!(err.is_timeout(), "expected timeout error, got: {err}");
    server.abort();
}

#[tokio::test]
async fn connection_error() {
    let api = UserApiClient::new(Ferrule::new("http://127.0.0.1:1", HyperTransport::new()));

    let_assert!(Err(err) = api.delete_user(1).await);
    check!(err.is_connection(), "expected connection error, got: {err}");
}

#[tokio::test]
async fn logging_transport_is_transparent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(alice()))
        .expect(1)
        .mount(&server)
        .await;

    let ferrule = Ferrule::new(server.uri(), LoggingTransport::debug(HyperTransport::new()));
    let_assert!(Ok(api) = ferrule.create::<dyn UserApi>());
    let_assert!(Ok(user) = api.get_user(1).await);
    check!(user == alice());
}
