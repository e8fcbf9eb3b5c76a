use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, Method, StatusCode},
    response::IntoResponse,
    routing::{any, get},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Queued,
    Running,
    Done,
    Failed,
}

impl TaskStatus {
    fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Queued => "queued",
            TaskStatus::Running => "running",
            TaskStatus::Done => "done",
            TaskStatus::Failed => "failed",
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Task {
    pub uuid: Uuid,
    pub title: String,
    pub status: TaskStatus,
}

#[derive(Deserialize)]
pub struct CreateTask {
    pub title: String,
    pub status: Option<TaskStatus>,
}

#[derive(Deserialize)]
pub struct UpdateTask {
    pub title: Option<String>,
    pub status: Option<TaskStatus>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct User {
    pub uuid: String,
    pub username: String,
}

/// Error body for every 4xx the server produces.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Problem {
    pub detail: String,
}

pub type Db = Arc<RwLock<HashMap<Uuid, Task>>>;

type ApiResult<T> = Result<T, (StatusCode, Json<Problem>)>;

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(HashMap::new()));
    Router::new()
        .route("/api/users/{uuid}/", get(get_user))
        .route("/api/tasks/", get(list_tasks).post(create_task))
        .route(
            "/api/tasks/{uuid}/",
            get(get_task).patch(update_task).delete(delete_task),
        )
        .route("/api/tasks/{uuid}/logs/", get(task_logs))
        .route("/api/tasks/{uuid}/artifact/", get(task_artifact))
        .route("/api/echo/", any(echo))
        .route("/api/broken/", get(broken_json))
        .route("/api/status/{code}/", any(with_status))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

fn problem(status: StatusCode, detail: &str) -> (StatusCode, Json<Problem>) {
    (
        status,
        Json(Problem {
            detail: detail.to_string(),
        }),
    )
}

fn not_found() -> (StatusCode, Json<Problem>) {
    problem(StatusCode::NOT_FOUND, "Not found.")
}

async fn get_user(Path(uuid): Path<String>) -> ApiResult<Json<User>> {
    if uuid != "me" {
        return Err(not_found());
    }
    Ok(Json(User {
        uuid: "me".to_string(),
        username: "operator".to_string(),
    }))
}

/// `?status=` may repeat; `?limit=` caps the result.
async fn list_tasks(
    State(db): State<Db>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> ApiResult<Json<Vec<Task>>> {
    let statuses: Vec<&str> = pairs
        .iter()
        .filter(|(key, _)| key == "status")
        .map(|(_, value)| value.as_str())
        .collect();
    let limit = match pairs.iter().find(|(key, _)| key == "limit") {
        Some((_, value)) => Some(
            value
                .parse::<usize>()
                .map_err(|_| problem(StatusCode::BAD_REQUEST, "limit must be a number"))?,
        ),
        None => None,
    };

    let tasks = db.read().await;
    let mut matching: Vec<Task> = tasks
        .values()
        .filter(|task| statuses.is_empty() || statuses.contains(&task.status.as_str()))
        .cloned()
        .collect();
    matching.sort_by(|a, b| a.title.cmp(&b.title));
    if let Some(limit) = limit {
        matching.truncate(limit);
    }
    Ok(Json(matching))
}

async fn create_task(
    State(db): State<Db>,
    Json(input): Json<CreateTask>,
) -> (StatusCode, Json<Task>) {
    let task = Task {
        uuid: Uuid::new_v4(),
        title: input.title,
        status: input.status.unwrap_or(TaskStatus::Queued),
    };
    db.write().await.insert(task.uuid, task.clone());
    (StatusCode::CREATED, Json(task))
}

async fn get_task(State(db): State<Db>, Path(uuid): Path<Uuid>) -> ApiResult<Json<Task>> {
    let tasks = db.read().await;
    tasks.get(&uuid).cloned().map(Json).ok_or_else(not_found)
}

async fn update_task(
    State(db): State<Db>,
    Path(uuid): Path<Uuid>,
    Json(input): Json<UpdateTask>,
) -> ApiResult<Json<Task>> {
    let mut tasks = db.write().await;
    let task = tasks.get_mut(&uuid).ok_or_else(not_found)?;
    if let Some(title) = input.title {
        task.title = title;
    }
    if let Some(status) = input.status {
        task.status = status;
    }
    Ok(Json(task.clone()))
}

async fn delete_task(State(db): State<Db>, Path(uuid): Path<Uuid>) -> ApiResult<StatusCode> {
    let mut tasks = db.write().await;
    tasks
        .remove(&uuid)
        .map(|_| StatusCode::NO_CONTENT)
        .ok_or_else(not_found)
}

async fn task_logs(State(db): State<Db>, Path(uuid): Path<Uuid>) -> ApiResult<impl IntoResponse> {
    let tasks = db.read().await;
    let task = tasks.get(&uuid).ok_or_else(not_found)?;
    let log = format!(
        "task {} created: {}\ntask {} status: {}\n",
        task.uuid,
        task.title,
        task.uuid,
        task.status.as_str()
    );
    Ok(([(header::CONTENT_TYPE, "text/plain; charset=utf-8")], log))
}

async fn task_artifact(
    State(db): State<Db>,
    Path(uuid): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let tasks = db.read().await;
    let task = tasks.get(&uuid).ok_or_else(not_found)?;
    Ok((
        [(header::CONTENT_TYPE, "application/octet-stream")],
        task.title.clone().into_bytes(),
    ))
}

/// Reflects the request back as JSON so clients can check what they sent.
async fn echo(
    method: Method,
    Query(pairs): Query<Vec<(String, String)>>,
    headers: HeaderMap,
    body: String,
) -> Json<Value> {
    let headers: HashMap<String, String> = headers
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|value| (name.as_str().to_string(), value.to_string()))
        })
        .collect();
    Json(json!({
        "method": method.as_str(),
        "query": pairs,
        "headers": headers,
        "body": body,
    }))
}

/// Labelled as JSON, but not JSON.
async fn broken_json() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "application/json")], "{not json")
}

async fn with_status(Path(code): Path<u16>) -> ApiResult<impl IntoResponse> {
    let status = StatusCode::from_u16(code)
        .map_err(|_| problem(StatusCode::BAD_REQUEST, "not a valid status code"))?;
    Ok((status, Json(json!({ "status": code }))))
}
