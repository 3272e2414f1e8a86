//! In-process mock gateway for integration tests
//!
//! Emulates the remote API gateway plus the object store on one ephemeral
//! port: signed upload URLs issued by the grant endpoint point back at
//! this server's `/storage/` routes. State is programmable (failure
//! injection per endpoint) and every mutating request is recorded so
//! tests can assert on exactly what went over the wire.

#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde_json::{json, Value};
use uuid::Uuid;

use coursekit_client::{ApiGateway, CourseEditor, CourseStore, StaticCredentials};
use coursekit_common::model::{ContentKind, Course, Lesson, Note, Section};

/// One request observed by the mock, for wire-level assertions
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: String,
    pub path: String,
    pub body: Value,
    pub bearer: Option<String>,
}

#[derive(Default)]
pub struct MockState {
    pub base_url: String,
    pub courses: Vec<Course>,
    pub lessons: HashMap<Uuid, Lesson>,
    pub storage: HashMap<String, Vec<u8>>,
    pub recorded: Vec<Recorded>,
    /// Non-2xx status to return from the course list endpoint
    pub fail_list: Option<u16>,
    /// Non-2xx status to return from the upload grant endpoint
    pub fail_grant: Option<u16>,
    /// Non-2xx status to return from the storage PUT
    pub fail_transfer: Option<u16>,
    /// Non-2xx status to return from lesson creation
    pub fail_lesson_create: Option<u16>,
    /// Non-2xx status to return from section deletion
    pub fail_delete_section: Option<u16>,
}

impl MockState {
    pub fn seed_course(&mut self, title: &str, published: bool) -> Uuid {
        let id = Uuid::new_v4();
        self.courses.push(Course {
            id,
            title: title.to_string(),
            description: String::new(),
            category: None,
            banner: None,
            published,
            sections: Vec::new(),
            created_at: None,
        });
        id
    }

    pub fn seed_section(&mut self, course_id: Uuid, title: &str) -> Uuid {
        let id = Uuid::new_v4();
        let course = self
            .courses
            .iter_mut()
            .find(|c| c.id == course_id)
            .expect("seed_section: unknown course");
        course.sections.push(Section {
            id,
            course_id,
            title: title.to_string(),
            description: String::new(),
            lessons: Vec::new(),
        });
        id
    }

    pub fn seed_lesson(&mut self, course_id: Uuid, section_id: Uuid, title: &str) -> Uuid {
        let id = Uuid::new_v4();
        let course = self
            .courses
            .iter_mut()
            .find(|c| c.id == course_id)
            .expect("seed_lesson: unknown course");
        let section = course
            .sections
            .iter_mut()
            .find(|s| s.id == section_id)
            .expect("seed_lesson: unknown section");
        section.lessons.push(id);
        self.lessons.insert(
            id,
            Lesson {
                id,
                title: title.to_string(),
                description: String::new(),
                kind: ContentKind::Lecture,
                file_path: None,
                notes: Vec::new(),
            },
        );
        id
    }

    pub fn requests_to(&self, method: &str, path: &str) -> Vec<Recorded> {
        self.recorded
            .iter()
            .filter(|r| r.method == method && r.path == path)
            .cloned()
            .collect()
    }

    fn record(&mut self, method: &str, path: &str, body: Value, headers: &HeaderMap) {
        let bearer = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(|v| v.to_string());
        self.recorded.push(Recorded {
            method: method.to_string(),
            path: path.to_string(),
            body,
            bearer,
        });
    }
}

pub struct MockGateway {
    pub addr: SocketAddr,
    pub state: Arc<Mutex<MockState>>,
}

impl MockGateway {
    /// Bind on an ephemeral port and serve in the background
    pub async fn spawn() -> Self {
        let state = Arc::new(Mutex::new(MockState::default()));
        let app = router(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock gateway");
        let addr = listener.local_addr().expect("mock gateway addr");
        state.lock().unwrap().base_url = format!("http://{}", addr);

        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("mock gateway serve");
        });

        Self { addr, state }
    }

    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn lock(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.state.lock().unwrap()
    }

    /// Gateway client + store + editor wired against this mock
    pub fn client(&self) -> (Arc<ApiGateway>, Arc<CourseStore>, CourseEditor) {
        let gateway = Arc::new(
            ApiGateway::new(
                self.url(),
                Duration::from_secs(5),
                Box::new(StaticCredentials::new("test-token")),
            )
            .expect("gateway client"),
        );
        let store = Arc::new(CourseStore::new());
        let editor =
            CourseEditor::new(Arc::clone(&gateway), Arc::clone(&store)).expect("editor");
        (gateway, store, editor)
    }
}

type Shared = Arc<Mutex<MockState>>;

fn router(state: Shared) -> Router {
    Router::new()
        .route("/teacher/course/all", get(list_courses))
        .route("/teacher/course", post(create_course).patch(patch_course))
        .route(
            "/teacher/course/section",
            post(create_section).put(patch_section).delete(delete_section),
        )
        .route(
            "/teacher/course/lesson",
            get(get_lesson).post(create_lesson).put(patch_lesson).delete(delete_lesson),
        )
        .route("/teacher/course/getUpdateLink", get(update_link))
        .route("/teacher/course/getViewableLink", get(viewable_link))
        .route(
            "/user/course/lesson/note",
            post(create_note).delete(delete_note),
        )
        .route("/storage/*key", put(storage_put))
        .with_state(state)
}

fn reject(status: u16, message: &str) -> Response {
    (
        StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        Json(json!({ "message": message })),
    )
        .into_response()
}

fn query_uuid(query: &HashMap<String, String>, key: &str) -> Result<Uuid, Response> {
    query
        .get(key)
        .and_then(|v| v.parse().ok())
        .ok_or_else(|| reject(400, &format!("missing or invalid {}", key)))
}

async fn list_courses(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let mut state = state.lock().unwrap();
    state.record("GET", "/teacher/course/all", Value::Null, &headers);
    if let Some(status) = state.fail_list {
        return reject(status, "course list unavailable");
    }
    Json(state.courses.clone()).into_response()
}

async fn create_course(
    State(state): State<Shared>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let value: Value = match serde_json::from_slice(&body) {
        Ok(v) => v,
        Err(_) => return reject(400, "invalid body"),
    };
    let mut state = state.lock().unwrap();
    state.record("POST", "/teacher/course", value.clone(), &headers);

    let course = Course {
        id: Uuid::new_v4(),
        title: value["title"].as_str().unwrap_or_default().to_string(),
        description: value["description"].as_str().unwrap_or_default().to_string(),
        category: value["category"].as_str().map(|s| s.to_string()),
        banner: None,
        published: false,
        sections: Vec::new(),
        created_at: None,
    };
    state.courses.push(course.clone());
    Json(course).into_response()
}

async fn patch_course(
    State(state): State<Shared>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let course_id = match query_uuid(&query, "courseId") {
        Ok(id) => id,
        Err(r) => return r,
    };
    let value: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);

    let mut state = state.lock().unwrap();
    state.record("PATCH", "/teacher/course", value.clone(), &headers);

    let Some(course) = state.courses.iter_mut().find(|c| c.id == course_id) else {
        return reject(404, "course not found");
    };
    if let Some(title) = value["title"].as_str() {
        course.title = title.to_string();
    }
    if let Some(description) = value["description"].as_str() {
        course.description = description.to_string();
    }
    if let Some(banner) = value["banner"].as_str() {
        course.banner = Some(banner.to_string());
    }
    if let Some(published) = value["published"].as_bool() {
        course.published = published;
    }
    Json(json!({ "ok": true })).into_response()
}

async fn create_section(
    State(state): State<Shared>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let course_id = match query_uuid(&query, "courseId") {
        Ok(id) => id,
        Err(r) => return r,
    };
    let value: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);

    let mut state = state.lock().unwrap();
    state.record("POST", "/teacher/course/section", value.clone(), &headers);

    let Some(course) = state.courses.iter_mut().find(|c| c.id == course_id) else {
        return reject(404, "course not found");
    };
    course.sections.push(Section {
        id: Uuid::new_v4(),
        course_id,
        title: value["title"].as_str().unwrap_or_default().to_string(),
        description: value["description"].as_str().unwrap_or_default().to_string(),
        lessons: Vec::new(),
    });
    Json(json!({ "ok": true })).into_response()
}

async fn patch_section(
    State(state): State<Shared>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let course_id = match query_uuid(&query, "courseId") {
        Ok(id) => id,
        Err(r) => return r,
    };
    let section_id = match query_uuid(&query, "sectionId") {
        Ok(id) => id,
        Err(r) => return r,
    };
    let value: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);

    let mut state = state.lock().unwrap();
    state.record("PUT", "/teacher/course/section", value.clone(), &headers);

    let Some(section) = state
        .courses
        .iter_mut()
        .find(|c| c.id == course_id)
        .and_then(|c| c.sections.iter_mut().find(|s| s.id == section_id))
    else {
        return reject(404, "section not found");
    };
    if let Some(title) = value["title"].as_str() {
        section.title = title.to_string();
    }
    if let Some(description) = value["description"].as_str() {
        section.description = description.to_string();
    }
    Json(json!({ "ok": true })).into_response()
}

async fn delete_section(
    State(state): State<Shared>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    let course_id = match query_uuid(&query, "courseId") {
        Ok(id) => id,
        Err(r) => return r,
    };
    let section_id = match query_uuid(&query, "sectionId") {
        Ok(id) => id,
        Err(r) => return r,
    };

    let mut state = state.lock().unwrap();
    state.record("DELETE", "/teacher/course/section", Value::Null, &headers);

    if let Some(status) = state.fail_delete_section {
        return reject(status, "section delete refused");
    }

    let Some(course) = state.courses.iter_mut().find(|c| c.id == course_id) else {
        return reject(404, "course not found");
    };
    let Some(index) = course.sections.iter().position(|s| s.id == section_id) else {
        return reject(404, "section not found");
    };
    let removed = course.sections.remove(index);
    for lesson_id in &removed.lessons {
        state.lessons.remove(lesson_id);
    }
    Json(json!({ "ok": true })).into_response()
}

async fn get_lesson(
    State(state): State<Shared>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    let lesson_id = match query_uuid(&query, "lessonId") {
        Ok(id) => id,
        Err(r) => return r,
    };
    let mut state = state.lock().unwrap();
    state.record("GET", "/teacher/course/lesson", Value::Null, &headers);
    match state.lessons.get(&lesson_id) {
        Some(lesson) => Json(lesson.clone()).into_response(),
        None => reject(404, "lesson not found"),
    }
}

async fn create_lesson(
    State(state): State<Shared>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let section_id = match query_uuid(&query, "sectionId") {
        Ok(id) => id,
        Err(r) => return r,
    };
    let course_id = match query_uuid(&query, "courseId") {
        Ok(id) => id,
        Err(r) => return r,
    };
    let value: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);

    let mut state = state.lock().unwrap();
    state.record("POST", "/teacher/course/lesson", value.clone(), &headers);

    if let Some(status) = state.fail_lesson_create {
        return reject(status, "lesson create refused");
    }

    let lesson = Lesson {
        id: Uuid::new_v4(),
        title: value["title"].as_str().unwrap_or_default().to_string(),
        description: value["description"].as_str().unwrap_or_default().to_string(),
        kind: ContentKind::Lecture,
        file_path: value["filePath"].as_str().map(|s| s.to_string()),
        notes: Vec::new(),
    };

    let Some(section) = state
        .courses
        .iter_mut()
        .find(|c| c.id == course_id)
        .and_then(|c| c.sections.iter_mut().find(|s| s.id == section_id))
    else {
        return reject(404, "section not found");
    };
    section.lessons.push(lesson.id);
    state.lessons.insert(lesson.id, lesson.clone());
    Json(lesson).into_response()
}

async fn patch_lesson(
    State(state): State<Shared>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let lesson_id = match query_uuid(&query, "lessonId") {
        Ok(id) => id,
        Err(r) => return r,
    };
    let value: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);

    let mut state = state.lock().unwrap();
    state.record("PUT", "/teacher/course/lesson", value.clone(), &headers);

    let Some(lesson) = state.lessons.get_mut(&lesson_id) else {
        return reject(404, "lesson not found");
    };
    if let Some(title) = value["title"].as_str() {
        lesson.title = title.to_string();
    }
    if let Some(description) = value["description"].as_str() {
        lesson.description = description.to_string();
    }
    Json(json!({ "ok": true })).into_response()
}

async fn delete_lesson(
    State(state): State<Shared>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    let lesson_id = match query_uuid(&query, "lessonId") {
        Ok(id) => id,
        Err(r) => return r,
    };
    let course_id = match query_uuid(&query, "courseId") {
        Ok(id) => id,
        Err(r) => return r,
    };
    let section_id = match query_uuid(&query, "sectionId") {
        Ok(id) => id,
        Err(r) => return r,
    };

    let mut state = state.lock().unwrap();
    state.record("DELETE", "/teacher/course/lesson", Value::Null, &headers);

    state.lessons.remove(&lesson_id);
    let Some(section) = state
        .courses
        .iter_mut()
        .find(|c| c.id == course_id)
        .and_then(|c| c.sections.iter_mut().find(|s| s.id == section_id))
    else {
        return reject(404, "section not found");
    };
    section.lessons.retain(|id| *id != lesson_id);
    Json(json!({ "ok": true })).into_response()
}

async fn update_link(
    State(state): State<Shared>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    let Some(filename) = query.get("filename") else {
        return reject(400, "missing filename");
    };
    if query_uuid(&query, "courseId").is_err() {
        return reject(400, "missing or invalid courseId");
    }

    let mut state = state.lock().unwrap();
    state.record("GET", "/teacher/course/getUpdateLink", Value::Null, &headers);

    if let Some(status) = state.fail_grant {
        return reject(status, "upload quota exceeded");
    }

    let file_key = format!("uploads/{}-{}", Uuid::new_v4(), filename);
    let signed_url = format!("{}/storage/{}", state.base_url, file_key);
    Json(json!({ "signedUrl": signed_url, "fileKey": file_key })).into_response()
}

async fn viewable_link(
    State(state): State<Shared>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    let Some(filename) = query.get("filename") else {
        return reject(400, "missing filename");
    };
    let mut state = state.lock().unwrap();
    state.record("GET", "/teacher/course/getViewableLink", Value::Null, &headers);

    if !state.storage.contains_key(filename) {
        return reject(404, "object not found");
    }
    let signed_url = format!("{}/storage/{}?sig={}", state.base_url, filename, Uuid::new_v4());
    Json(json!({ "signedUrl": signed_url })).into_response()
}

async fn create_note(
    State(state): State<Shared>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let lesson_id = match query_uuid(&query, "lessonId") {
        Ok(id) => id,
        Err(r) => return r,
    };
    let value: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);

    let mut state = state.lock().unwrap();
    state.record("POST", "/user/course/lesson/note", value.clone(), &headers);

    let Some(lesson) = state.lessons.get_mut(&lesson_id) else {
        return reject(404, "lesson not found");
    };
    let note = Note {
        id: Uuid::new_v4(),
        title: value["title"].as_str().unwrap_or_default().to_string(),
        description: value["description"].as_str().unwrap_or_default().to_string(),
        image: value["image"].as_str().map(|s| s.to_string()),
    };
    lesson.notes.push(note.clone());
    Json(note).into_response()
}

async fn delete_note(
    State(state): State<Shared>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    let note_id = match query_uuid(&query, "noteId") {
        Ok(id) => id,
        Err(r) => return r,
    };
    let lesson_id = match query_uuid(&query, "lessonId") {
        Ok(id) => id,
        Err(r) => return r,
    };

    let mut state = state.lock().unwrap();
    state.record("DELETE", "/user/course/lesson/note", Value::Null, &headers);

    let Some(lesson) = state.lessons.get_mut(&lesson_id) else {
        return reject(404, "lesson not found");
    };
    lesson.notes.retain(|n| n.id != note_id);
    Json(json!({ "ok": true })).into_response()
}

/// Direct object-store PUT; reached via the signed URL, not the gateway
async fn storage_put(
    State(state): State<Shared>,
    Path(key): Path<String>,
    body: Bytes,
) -> Response {
    let mut state = state.lock().unwrap();
    if let Some(status) = state.fail_transfer {
        return reject(status, "storage refused transfer");
    }
    state.storage.insert(key, body.to_vec());
    StatusCode::OK.into_response()
}
