//! Shared API request/response types
//!
//! Bodies for every gateway endpoint the client consumes. Patch types use
//! `Option` fields with `skip_serializing_if` so unset fields are stripped
//! before transmission: a blur-to-commit edit that only changed the title
//! sends exactly `{"title": ...}`.

use serde::{Deserialize, Serialize};

/// Body for `POST /teacher/course`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCourseBody {
    pub title: String,
    pub description: String,
    pub category: String,
}

/// Partial course update for `PATCH /teacher/course?courseId=`
///
/// Also carries the publish flip: the gateway exposes no dedicated publish
/// route, so publishing is `CoursePatch { published: Some(true), .. }`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CoursePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub banner: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published: Option<bool>,
}

/// Body for `POST /teacher/course/section?courseId=`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectionBody {
    pub title: String,
    pub description: String,
}

/// Partial section update for `PUT /teacher/course/section?courseId=&sectionId=`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SectionPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Body for `POST /teacher/course/lesson?sectionId=&courseId=`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonBody {
    pub title: String,
    pub description: String,
    /// Object key from a completed upload, if the lesson carries an asset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
}

/// Partial lesson update for `PUT /teacher/course/lesson?lessonId=&courseId=`
///
/// Title/description only; the asset key is written once at creation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LessonPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Body for `POST /user/course/lesson/note?lessonId=`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoteBody {
    pub title: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// Signed upload grant from `GET /teacher/course/getUpdateLink`
///
/// Ephemeral: `signed_url` is valid for one immediate PUT, `file_key` is
/// meaningless until the owning entity's metadata write records it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadGrant {
    pub signed_url: String,
    pub file_key: String,
}

/// Signed download link from `GET /teacher/course/getViewableLink`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewableLink {
    pub signed_url: String,
}

/// Error body shape returned by the gateway on non-2xx responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorBody {
    pub message: String,
}
