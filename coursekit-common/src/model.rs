//! Content tree models
//!
//! The Course → Section → Lesson hierarchy mirrored from the gateway.
//! Section and lesson order is the server-returned array order; the client
//! never re-sorts (the backend owns ordering, there is no rank field).

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Client-side bound on notes attached to a single lesson
pub const MAX_NOTES_PER_LESSON: usize = 5;

/// Lesson content type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Video,
    Lecture,
    Quiz,
}

impl std::fmt::Display for ContentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContentKind::Video => write!(f, "video"),
            ContentKind::Lecture => write!(f, "lecture"),
            ContentKind::Quiz => write!(f, "quiz"),
        }
    }
}

/// A teacher's course with its nested sections
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: Uuid,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: Option<String>,
    /// Object key of the banner image, set after the banner upload completes
    #[serde(default)]
    pub banner: Option<String>,
    #[serde(default)]
    pub published: bool,
    #[serde(default)]
    pub sections: Vec<Section>,
    #[serde(default)]
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl Course {
    /// Look up a nested section by id
    pub fn section(&self, section_id: Uuid) -> Option<&Section> {
        self.sections.iter().find(|s| s.id == section_id)
    }
}

/// A section inside exactly one course
///
/// Lessons arrive as an ID array; the full `Lesson` record is fetched
/// per-lesson on demand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    pub id: Uuid,
    pub course_id: Uuid,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub lessons: Vec<Uuid>,
}

/// A lesson, optionally carrying an uploaded asset
///
/// A lesson with no `file_path` has no playable content but is still a
/// valid tree node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lesson {
    pub id: Uuid,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_kind")]
    pub kind: ContentKind,
    /// Object key of the uploaded asset, if any
    #[serde(default)]
    pub file_path: Option<String>,
    #[serde(default)]
    pub notes: Vec<Note>,
}

fn default_kind() -> ContentKind {
    ContentKind::Lecture
}

/// A learner note attached to a lesson
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: Uuid,
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Object key of an optional attached image
    #[serde(default)]
    pub image: Option<String>,
}
