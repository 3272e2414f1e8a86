//! Remote API gateway client
//!
//! One async method per gateway endpoint. Credentials are injected through
//! [`CredentialProvider`] rather than read from ambient storage inside leaf
//! operations, so every caller is testable with a fake credential source.
//!
//! Non-2xx responses are surfaced as [`GatewayError::Api`] with the message
//! extracted from the JSON body's `message` field when present.

use coursekit_common::api::{
    ApiErrorBody, CoursePatch, CreateCourseBody, LessonBody, LessonPatch, NoteBody, SectionBody,
    SectionPatch, UploadGrant, ViewableLink,
};
use coursekit_common::model::{Course, Lesson, Note};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

const USER_AGENT: &str = "CourseKit/0.1.0 (https://github.com/coursekit/coursekit)";

/// Gateway client errors
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Credential error: {0}")]
    Credentials(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Parse error: {0}")]
    Decode(String),
}

impl GatewayError {
    /// Status code of an API rejection, if this error is one
    pub fn status(&self) -> Option<u16> {
        match self {
            GatewayError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Source of the bearer token attached to every gateway call
pub trait CredentialProvider: Send + Sync {
    fn bearer_token(&self) -> Result<String, GatewayError>;
}

/// Fixed token, used by tests and the CLI `--token` flag
pub struct StaticCredentials(String);

impl StaticCredentials {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

impl CredentialProvider for StaticCredentials {
    fn bearer_token(&self) -> Result<String, GatewayError> {
        Ok(self.0.clone())
    }
}

/// Token persisted by the session layer, re-read on every call so a
/// rotated session is picked up without restarting
pub struct SessionFile {
    path: PathBuf,
}

impl SessionFile {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl CredentialProvider for SessionFile {
    fn bearer_token(&self) -> Result<String, GatewayError> {
        let token = std::fs::read_to_string(&self.path)
            .map_err(|e| GatewayError::Credentials(format!("{:?}: {}", self.path, e)))?;
        let token = token.trim();
        if token.is_empty() {
            return Err(GatewayError::Credentials(format!(
                "Session file is empty: {:?}",
                self.path
            )));
        }
        Ok(token.to_string())
    }
}

/// Remote API gateway client
pub struct ApiGateway {
    http: reqwest::Client,
    base_url: String,
    credentials: Box<dyn CredentialProvider>,
}

impl ApiGateway {
    pub fn new(
        base_url: impl Into<String>,
        timeout: Duration,
        credentials: Box<dyn CredentialProvider>,
    ) -> Result<Self, GatewayError> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| GatewayError::Network(e.to_string()))?;

        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }

        Ok(Self {
            http,
            base_url,
            credentials,
        })
    }

    /// Full course list for the authenticated teacher, sections nested,
    /// lesson lists as ID arrays
    pub async fn list_courses(&self) -> Result<Vec<Course>, GatewayError> {
        self.get_json("/teacher/course/all", &[]).await
    }

    pub async fn create_course(&self, body: &CreateCourseBody) -> Result<Course, GatewayError> {
        self.send_json(reqwest::Method::POST, "/teacher/course", &[], body)
            .await
    }

    pub async fn patch_course(
        &self,
        course_id: Uuid,
        patch: &CoursePatch,
    ) -> Result<(), GatewayError> {
        let response = self
            .request(
                reqwest::Method::PATCH,
                "/teacher/course",
                &[("courseId", course_id.to_string())],
            )?
            .json(patch)
            .send()
            .await
            .map_err(|e| GatewayError::Network(e.to_string()))?;
        Self::check(response).await.map(|_| ())
    }

    pub async fn create_section(
        &self,
        course_id: Uuid,
        body: &SectionBody,
    ) -> Result<(), GatewayError> {
        let response = self
            .request(
                reqwest::Method::POST,
                "/teacher/course/section",
                &[("courseId", course_id.to_string())],
            )?
            .json(body)
            .send()
            .await
            .map_err(|e| GatewayError::Network(e.to_string()))?;
        Self::check(response).await.map(|_| ())
    }

    pub async fn patch_section(
        &self,
        course_id: Uuid,
        section_id: Uuid,
        patch: &SectionPatch,
    ) -> Result<(), GatewayError> {
        let response = self
            .request(
                reqwest::Method::PUT,
                "/teacher/course/section",
                &[
                    ("courseId", course_id.to_string()),
                    ("sectionId", section_id.to_string()),
                ],
            )?
            .json(patch)
            .send()
            .await
            .map_err(|e| GatewayError::Network(e.to_string()))?;
        Self::check(response).await.map(|_| ())
    }

    pub async fn delete_section(
        &self,
        course_id: Uuid,
        section_id: Uuid,
    ) -> Result<(), GatewayError> {
        let response = self
            .request(
                reqwest::Method::DELETE,
                "/teacher/course/section",
                &[
                    ("courseId", course_id.to_string()),
                    ("sectionId", section_id.to_string()),
                ],
            )?
            .send()
            .await
            .map_err(|e| GatewayError::Network(e.to_string()))?;
        Self::check(response).await.map(|_| ())
    }

    /// Full lesson record with notes, fetched on demand per node
    pub async fn get_lesson(&self, lesson_id: Uuid) -> Result<Lesson, GatewayError> {
        self.get_json(
            "/teacher/course/lesson",
            &[("lessonId", lesson_id.to_string())],
        )
        .await
    }

    pub async fn create_lesson(
        &self,
        section_id: Uuid,
        course_id: Uuid,
        body: &LessonBody,
    ) -> Result<Lesson, GatewayError> {
        self.send_json(
            reqwest::Method::POST,
            "/teacher/course/lesson",
            &[
                ("sectionId", section_id.to_string()),
                ("courseId", course_id.to_string()),
            ],
            body,
        )
        .await
    }

    pub async fn patch_lesson(
        &self,
        lesson_id: Uuid,
        course_id: Uuid,
        patch: &LessonPatch,
    ) -> Result<(), GatewayError> {
        let response = self
            .request(
                reqwest::Method::PUT,
                "/teacher/course/lesson",
                &[
                    ("lessonId", lesson_id.to_string()),
                    ("courseId", course_id.to_string()),
                ],
            )?
            .json(patch)
            .send()
            .await
            .map_err(|e| GatewayError::Network(e.to_string()))?;
        Self::check(response).await.map(|_| ())
    }

    pub async fn delete_lesson(
        &self,
        lesson_id: Uuid,
        course_id: Uuid,
        section_id: Uuid,
    ) -> Result<(), GatewayError> {
        let response = self
            .request(
                reqwest::Method::DELETE,
                "/teacher/course/lesson",
                &[
                    ("lessonId", lesson_id.to_string()),
                    ("courseId", course_id.to_string()),
                    ("sectionId", section_id.to_string()),
                ],
            )?
            .send()
            .await
            .map_err(|e| GatewayError::Network(e.to_string()))?;
        Self::check(response).await.map(|_| ())
    }

    pub async fn create_note(
        &self,
        lesson_id: Uuid,
        body: &NoteBody,
    ) -> Result<Note, GatewayError> {
        self.send_json(
            reqwest::Method::POST,
            "/user/course/lesson/note",
            &[("lessonId", lesson_id.to_string())],
            body,
        )
        .await
    }

    pub async fn delete_note(&self, note_id: Uuid, lesson_id: Uuid) -> Result<(), GatewayError> {
        let response = self
            .request(
                reqwest::Method::DELETE,
                "/user/course/lesson/note",
                &[
                    ("noteId", note_id.to_string()),
                    ("lessonId", lesson_id.to_string()),
                ],
            )?
            .send()
            .await
            .map_err(|e| GatewayError::Network(e.to_string()))?;
        Self::check(response).await.map(|_| ())
    }

    /// Signed upload grant for a direct storage PUT
    pub async fn upload_grant(
        &self,
        filename: &str,
        content_type: &str,
        course_id: Uuid,
    ) -> Result<UploadGrant, GatewayError> {
        self.get_json(
            "/teacher/course/getUpdateLink",
            &[
                ("filename", filename.to_string()),
                ("contentType", content_type.to_string()),
                ("courseId", course_id.to_string()),
            ],
        )
        .await
    }

    /// Time-limited signed download link for an object key.
    ///
    /// Links expire; callers must re-request on every render rather than
    /// cache the result.
    pub async fn viewable_link(&self, file_key: &str) -> Result<ViewableLink, GatewayError> {
        self.get_json(
            "/teacher/course/getViewableLink",
            &[("filename", file_key.to_string())],
        )
        .await
    }

    fn request(
        &self,
        method: reqwest::Method,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<reqwest::RequestBuilder, GatewayError> {
        let token = self.credentials.bearer_token()?;
        let url = format!("{}{}", self.base_url, path);
        let mut builder = self.http.request(method, url).bearer_auth(token);
        if !query.is_empty() {
            builder = builder.query(query);
        }
        Ok(builder)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, GatewayError> {
        let response = self
            .request(reqwest::Method::GET, path, query)?
            .send()
            .await
            .map_err(|e| GatewayError::Network(e.to_string()))?;
        let response = Self::check(response).await?;
        response
            .json()
            .await
            .map_err(|e| GatewayError::Decode(e.to_string()))
    }

    async fn send_json<B: Serialize, T: DeserializeOwned>(
        &self,
        method: reqwest::Method,
        path: &str,
        query: &[(&str, String)],
        body: &B,
    ) -> Result<T, GatewayError> {
        let response = self
            .request(method, path, query)?
            .json(body)
            .send()
            .await
            .map_err(|e| GatewayError::Network(e.to_string()))?;
        let response = Self::check(response).await?;
        response
            .json()
            .await
            .map_err(|e| GatewayError::Decode(e.to_string()))
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response, GatewayError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        // Prefer the gateway's own message over the bare status line
        let message = match response.text().await {
            Ok(text) => match serde_json::from_str::<ApiErrorBody>(&text) {
                Ok(body) => body.message,
                Err(_) if !text.is_empty() => text,
                Err(_) => status
                    .canonical_reason()
                    .unwrap_or("request failed")
                    .to_string(),
            },
            Err(_) => status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string(),
        };

        Err(GatewayError::Api {
            status: status.as_u16(),
            message,
        })
    }
}
