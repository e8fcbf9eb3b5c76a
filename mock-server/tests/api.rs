use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, Problem, Task, TaskStatus, User};
use tower::ServiceExt;

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn get(uri: &str) -> Request<String> {
    Request::builder().uri(uri).body(String::new()).unwrap()
}

fn json_request(method: &str, uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

fn content_type(response: &axum::response::Response) -> &str {
    response
        .headers()
        .get(http::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
}

// --- users ---

#[tokio::test]
async fn current_user_is_me() {
    let resp = app().oneshot(get("/api/users/me/")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let user: User = body_json(resp).await;
    assert_eq!(user.uuid, "me");
}

#[tokio::test]
async fn unknown_user_is_404_with_problem_body() {
    let resp = app().oneshot(get("/api/users/someone/")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(content_type(&resp), "application/json");
    let problem: Problem = body_json(resp).await;
    assert_eq!(problem.detail, "Not found.");
}

// --- tasks ---

#[tokio::test]
async fn list_tasks_empty() {
    let resp = app().oneshot(get("/api/tasks/")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let tasks: Vec<Task> = body_json(resp).await;
    assert!(tasks.is_empty());
}

#[tokio::test]
async fn list_tasks_rejects_bad_limit() {
    let resp = app().oneshot(get("/api/tasks/?limit=many")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn create_task_returns_201() {
    let resp = app()
        .oneshot(json_request("POST", "/api/tasks/", r#"{"title":"Index repo"}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::CREATED);
    let task: Task = body_json(resp).await;
    assert_eq!(task.title, "Index repo");
    assert_eq!(task.status, TaskStatus::Queued);
}

#[tokio::test]
async fn create_task_malformed_json_returns_422() {
    let resp = app()
        .oneshot(json_request("POST", "/api/tasks/", r#"{"not_title":1}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn get_task_bad_uuid_returns_400() {
    let resp = app().oneshot(get("/api/tasks/not-a-uuid/")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn update_task_not_found() {
    let resp = app()
        .oneshot(json_request(
            "PATCH",
            "/api/tasks/00000000-0000-0000-0000-000000000000/",
            r#"{"title":"Nope"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// --- content types ---

#[tokio::test]
async fn broken_endpoint_mislabels_body() {
    let resp = app().oneshot(get("/api/broken/")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(content_type(&resp), "application/json");
    let body = body_bytes(resp).await;
    assert!(serde_json::from_slice::<serde_json::Value>(&body).is_err());
}

#[tokio::test]
async fn echo_reflects_repeated_query_keys() {
    let resp = app()
        .oneshot(get("/api/echo/?tag=a&tag=b&q=x+y"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let echo: serde_json::Value = body_json(resp).await;
    assert_eq!(echo["method"], "GET");
    assert_eq!(
        echo["query"],
        serde_json::json!([["tag", "a"], ["tag", "b"], ["q", "x y"]])
    );
}

#[tokio::test]
async fn status_endpoint_returns_requested_code() {
    for code in [201u16, 418, 503] {
        let resp = app()
            .oneshot(get(&format!("/api/status/{code}/")))
            .await
            .unwrap();
        assert_eq!(resp.status().as_u16(), code);
        let body: serde_json::Value = body_json(resp).await;
        assert_eq!(body["status"], code);
    }
}

// --- full task lifecycle ---

#[tokio::test]
async fn task_lifecycle() {
    use tower::Service;

    let mut app = app().into_service();

    // create
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request("POST", "/api/tasks/", r#"{"title":"Sync docs"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: Task = body_json(resp).await;
    let id = created.uuid;

    // second task, already done
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request(
            "POST",
            "/api/tasks/",
            r#"{"title":"Archive logs","status":"done"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);

    // filter by repeated status
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(get("/api/tasks/?status=queued&status=running"))
        .await
        .unwrap();
    let tasks: Vec<Task> = body_json(resp).await;
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].uuid, id);

    // limit
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(get("/api/tasks/?limit=1"))
        .await
        .unwrap();
    let tasks: Vec<Task> = body_json(resp).await;
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].title, "Archive logs");

    // patch status
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request(
            "PATCH",
            &format!("/api/tasks/{id}/"),
            r#"{"status":"running"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let updated: Task = body_json(resp).await;
    assert_eq!(updated.title, "Sync docs");
    assert_eq!(updated.status, TaskStatus::Running);

    // logs are plain text
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(get(&format!("/api/tasks/{id}/logs/")))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(content_type(&resp).starts_with("text/plain"));
    let body = body_bytes(resp).await;
    assert!(String::from_utf8_lossy(&body).contains("status: running"));

    // artifact is raw bytes
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(get(&format!("/api/tasks/{id}/artifact/")))
        .await
        .unwrap();
    assert_eq!(content_type(&resp), "application/octet-stream");
    assert_eq!(body_bytes(resp).await.as_ref(), b"Sync docs");

    // delete
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(
            Request::builder()
                .method("DELETE")
                .uri(&format!("/api/tasks/{id}/"))
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    assert!(body_bytes(resp).await.is_empty());

    // get after delete
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(get(&format!("/api/tasks/{id}/")))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
