use axum::http::{self, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use todo_server::{app, Todo};
use tower::{Service, ServiceExt};

const AUTH: &str = "Bearer fake-jwt-token";

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn error_message(response: axum::response::Response) -> String {
    let body: Value = body_json(response).await;
    body["error"].as_str().unwrap().to_string()
}

fn request(method: &str, uri: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::AUTHORIZATION, AUTH)
        .body(String::new())
        .unwrap()
}

fn json_request(method: &str, uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::AUTHORIZATION, AUTH)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

/// Drive several requests through one router so they share a store.
async fn send(app: &mut Router, req: Request<String>) -> axum::response::Response {
    ServiceExt::<Request<String>>::ready(app)
        .await
        .unwrap()
        .call(req)
        .await
        .unwrap()
}

// --- access gate ---

#[tokio::test]
async fn items_without_token_returns_401() {
    let resp = app()
        .oneshot(Request::builder().uri("/items").body(String::new()).unwrap())
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(error_message(resp).await, "Access token required");
}

#[tokio::test]
async fn items_with_wrong_token_returns_403() {
    let resp = app()
        .oneshot(
            Request::builder()
                .uri("/items")
                .header(http::header::AUTHORIZATION, "Bearer invalid-token")
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    assert_eq!(error_message(resp).await, "Invalid token");
}

#[tokio::test]
async fn rejected_request_does_not_reach_store() {
    let mut app = app();
    let resp = send(
        &mut app,
        Request::builder()
            .method("POST")
            .uri("/items")
            .header(http::header::CONTENT_TYPE, "application/json")
            .body(r#"{"title":"sneaky"}"#.to_string())
            .unwrap(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = send(&mut app, request("GET", "/items")).await;
    let todos: Vec<Todo> = body_json(resp).await;
    assert!(todos.is_empty());
}

// --- login / health ---

#[tokio::test]
async fn login_returns_static_token() {
    let resp = app()
        .oneshot(json_request(
            "POST",
            "/login",
            r#"{"username":"admin","password":"admin"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = body_json(resp).await;
    assert_eq!(body["token"], "fake-jwt-token");
    assert_eq!(body["user"]["username"], "admin");
    assert_eq!(body["user"]["role"], "admin");
}

#[tokio::test]
async fn login_with_missing_fields_returns_400() {
    let resp = app()
        .oneshot(json_request("POST", "/login", r#"{"username":"admin"}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_message(resp).await, "Username and password are required");
}

#[tokio::test]
async fn login_with_bad_credentials_returns_401() {
    let resp = app()
        .oneshot(json_request(
            "POST",
            "/login",
            r#"{"username":"invalid","password":"invalid"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(error_message(resp).await, "Invalid credentials");
}

#[tokio::test]
async fn login_with_non_string_username_is_invalid_credentials() {
    let resp = app()
        .oneshot(json_request(
            "POST",
            "/login",
            r#"{"username":123,"password":"admin"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(error_message(resp).await, "Invalid credentials");
}

#[tokio::test]
async fn health_is_open_and_counts_todos() {
    let mut app = app();
    send(&mut app, json_request("POST", "/items", r#"{"title":"one"}"#)).await;

    let resp = send(
        &mut app,
        Request::builder().uri("/health").body(String::new()).unwrap(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = body_json(resp).await;
    assert_eq!(body["status"], "OK");
    assert_eq!(body["todoCount"], 1);
    assert!(body["timestamp"].as_str().unwrap().ends_with('Z'));
}

// --- create ---

#[tokio::test]
async fn create_todo_returns_201() {
    let resp = app()
        .oneshot(json_request("POST", "/items", r#"{"title":"Buy milk"}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = body_json(resp).await;
    assert_eq!(body["id"], 1);
    assert_eq!(body["title"], "Buy milk");
    assert_eq!(body["completed"], false);
    assert_eq!(body["createdAt"], body["updatedAt"]);
}

#[tokio::test]
async fn create_todo_trims_title() {
    let resp = app()
        .oneshot(json_request(
            "POST",
            "/items",
            r#"{"title":"  Already done  ","completed":true}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::CREATED);
    let todo: Todo = body_json(resp).await;
    assert_eq!(todo.title, "Already done");
    assert!(todo.completed);
}

#[tokio::test]
async fn create_todo_validation_failures_return_400() {
    let too_long = format!(r#"{{"title":"{}"}}"#, "x".repeat(256));
    let cases = [
        (r#"{"title":""}"#.to_string(), "Title is required and must be a non-empty string"),
        (r#"{"title":"   "}"#.to_string(), "Title is required and must be a non-empty string"),
        (r#"{"completed":true}"#.to_string(), "Title is required and must be a non-empty string"),
        (r#"{"title":7}"#.to_string(), "Title must be a string"),
        (too_long, "Title must be less than 255 characters"),
        (r#"{"title":"ok","completed":1}"#.to_string(), "Completed must be a boolean"),
        ("{oops".to_string(), "Request body must be a valid JSON object"),
    ];

    let mut app = app();
    for (body, expected) in cases {
        let resp = send(&mut app, json_request("POST", "/items", &body)).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{body}");
        assert_eq!(error_message(resp).await, expected, "{body}");
    }

    let resp = send(&mut app, request("GET", "/items")).await;
    let todos: Vec<Todo> = body_json(resp).await;
    assert!(todos.is_empty());
}

#[tokio::test]
async fn create_with_non_json_content_type_ignores_body() {
    let resp = app()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/items")
                .header(http::header::AUTHORIZATION, AUTH)
                .header(http::header::CONTENT_TYPE, "text/plain")
                .body(r#"{"title":"x"}"#.to_string())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        error_message(resp).await,
        "Title is required and must be a non-empty string"
    );
}

#[tokio::test]
async fn create_with_long_emoji_title_is_rejected() {
    let body = format!(r#"{{"title":"{}"}}"#, "\u{1F600}".repeat(200));
    let resp = app()
        .oneshot(json_request("POST", "/items", &body))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_message(resp).await, "Title must be less than 255 characters");
}

#[tokio::test]
async fn create_without_body_is_a_validation_failure() {
    let resp = app().oneshot(request("POST", "/items")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// --- get / update / toggle / delete on missing records ---

#[tokio::test]
async fn missing_record_returns_404() {
    let mut app = app();
    for req in [
        request("GET", "/items/999"),
        json_request("PUT", "/items/999", r#"{"title":"Nope"}"#),
        request("PATCH", "/items/999/toggle"),
        request("DELETE", "/items/999"),
        request("GET", "/items/not-a-number"),
    ] {
        let resp = send(&mut app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert_eq!(error_message(resp).await, "Todo not found");
    }
}

#[tokio::test]
async fn update_reports_not_found_before_validation() {
    let resp = app()
        .oneshot(json_request("PUT", "/items/5", r#"{"title":""}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// --- trailing slashes ---

#[tokio::test]
async fn trailing_slash_reaches_same_routes() {
    let mut app = app();

    let resp = send(&mut app, request("GET", "/items/")).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = send(&mut app, json_request("POST", "/items/", r#"{"title":"slash"}"#)).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let resp = send(&mut app, request("GET", "/items/1/")).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let todo: Todo = body_json(resp).await;
    assert_eq!(todo.title, "slash");

    let resp = send(&mut app, request("PATCH", "/items/1/toggle/")).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

// --- unknown endpoints ---

#[tokio::test]
async fn unknown_path_returns_404_body() {
    let resp = app().oneshot(request("GET", "/nope")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(error_message(resp).await, "Endpoint not found");
}

#[tokio::test]
async fn unknown_method_returns_404_body() {
    let resp = app().oneshot(request("POST", "/health")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(error_message(resp).await, "Endpoint not found");
}

// --- scenarios ---

#[tokio::test]
async fn create_toggle_clear_scenario() {
    let mut app = app();

    let resp = send(&mut app, json_request("POST", "/items", r#"{"title":"Buy milk"}"#)).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: Todo = body_json(resp).await;
    assert_eq!(created.id, 1);
    assert!(!created.completed);

    let resp = send(&mut app, json_request("POST", "/items", r#"{"title":"  "}"#)).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = send(&mut app, request("PATCH", "/items/1/toggle")).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let toggled: Todo = body_json(resp).await;
    assert!(toggled.completed);

    let resp = send(&mut app, request("DELETE", "/items")).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = body_json(resp).await;
    assert_eq!(body["message"], "All todos deleted successfully");
    assert_eq!(body["deletedCount"], 1);

    let resp = send(&mut app, json_request("POST", "/items", r#"{"title":"Again"}"#)).await;
    let again: Todo = body_json(resp).await;
    assert_eq!(again.id, 1);
}

#[tokio::test]
async fn crud_lifecycle() {
    let mut app = app();

    // create two, list keeps insertion order
    let resp = send(&mut app, json_request("POST", "/items", r#"{"title":"Walk dog"}"#)).await;
    let created: Todo = body_json(resp).await;
    send(&mut app, json_request("POST", "/items", r#"{"title":"Feed cat","completed":true}"#)).await;

    let resp = send(&mut app, request("GET", "/items")).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let todos: Vec<Todo> = body_json(resp).await;
    let titles: Vec<&str> = todos.iter().map(|t| t.title.as_str()).collect();
    assert_eq!(titles, ["Walk dog", "Feed cat"]);

    // get
    let resp = send(&mut app, request("GET", &format!("/items/{}", created.id))).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let fetched: Todo = body_json(resp).await;
    assert_eq!(fetched, created);

    // update with completed
    let resp = send(
        &mut app,
        json_request(
            "PUT",
            &format!("/items/{}", created.id),
            r#"{"title":"Walk dog twice","completed":true}"#,
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let updated: Todo = body_json(resp).await;
    assert_eq!(updated.title, "Walk dog twice");
    assert!(updated.completed);
    assert_eq!(updated.created_at, created.created_at);
    assert!(updated.updated_at > created.updated_at);

    // update without completed keeps it
    let resp = send(
        &mut app,
        json_request("PUT", &format!("/items/{}", created.id), r#"{"title":"Walk cat"}"#),
    )
    .await;
    let updated: Todo = body_json(resp).await;
    assert_eq!(updated.title, "Walk cat");
    assert!(updated.completed);

    // update validates the title
    let resp = send(
        &mut app,
        json_request("PUT", &format!("/items/{}", created.id), r#"{"completed":false}"#),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // delete
    let resp = send(&mut app, request("DELETE", &format!("/items/{}", created.id))).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = body_json(resp).await;
    assert_eq!(body["message"], "Todo deleted successfully");
    assert_eq!(body["deletedTodo"]["id"], created.id);
    assert_eq!(body["deletedTodo"]["title"], "Walk cat");

    // get after delete
    let resp = send(&mut app, request("GET", &format!("/items/{}", created.id))).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    // remaining record untouched
    let resp = send(&mut app, request("GET", "/items")).await;
    let todos: Vec<Todo> = body_json(resp).await;
    assert_eq!(todos.len(), 1);
    assert_eq!(todos[0].title, "Feed cat");
    assert_eq!(todos[0].id, 2);
}
