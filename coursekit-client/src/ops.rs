//! Tree mutation operations
//!
//! Each operation performs one structural change against the gateway and
//! then reloads the content tree from the authoritative response. No
//! operation writes the local store directly; a failed mutation leaves the
//! store exactly as it was (stale but consistent).

use crate::gateway::{ApiGateway, GatewayError};
use crate::store::CourseStore;
use crate::upload::{UploadError, UploadSource, Uploader};
use coursekit_common::api::{
    CoursePatch, CreateCourseBody, LessonBody, LessonPatch, NoteBody, SectionBody, SectionPatch,
};
use coursekit_common::model::{Course, Lesson, Note, MAX_NOTES_PER_LESSON};
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

/// Mutation operation errors
#[derive(Debug, Error)]
pub enum OpError {
    /// Asset upload failed before any metadata write was attempted
    #[error("Upload failed: {0}")]
    Upload(#[from] UploadError),

    /// CRUD call against the gateway failed; the local tree is unchanged
    #[error("Mutation failed: {0}")]
    Gateway(#[from] GatewayError),

    /// The asset transferred to storage but the metadata write failed, so
    /// the object sits in storage with nothing referencing its key. No
    /// compensating delete is issued; remediation is server-side.
    #[error("Metadata write failed after upload, object {file_key} is orphaned: {source}")]
    OrphanedAsset {
        file_key: String,
        source: GatewayError,
    },

    /// Publish requested for a course with zero sections
    #[error("Cannot publish a course with no sections")]
    PublishBlocked,

    /// Course id not present in the current snapshot
    #[error("Unknown course: {0}")]
    UnknownCourse(Uuid),

    /// Lesson already carries the maximum number of notes
    #[error("Lesson already has {MAX_NOTES_PER_LESSON} notes")]
    NoteLimit,
}

/// Performs structural edits on the course tree
pub struct CourseEditor {
    gateway: Arc<ApiGateway>,
    store: Arc<CourseStore>,
    uploader: Uploader,
}

impl CourseEditor {
    pub fn new(gateway: Arc<ApiGateway>, store: Arc<CourseStore>) -> Result<Self, OpError> {
        let uploader = Uploader::new(Arc::clone(&gateway))?;
        Ok(Self {
            gateway,
            store,
            uploader,
        })
    }

    pub fn store(&self) -> &Arc<CourseStore> {
        &self.store
    }

    pub fn uploader(&self) -> &Uploader {
        &self.uploader
    }

    /// Create a course, upload its banner if one was chosen, and reload.
    ///
    /// The banner goes through the two-phase pipeline after the course
    /// exists (the grant is scoped to a course id). A banner failure
    /// leaves a bannerless course server-side; the local tree stays
    /// unchanged because no reload happens on the failure path.
    pub async fn create_course(
        &self,
        title: &str,
        description: &str,
        category: &str,
        banner: Option<&UploadSource>,
    ) -> Result<Course, OpError> {
        let body = CreateCourseBody {
            title: title.to_string(),
            description: description.to_string(),
            category: category.to_string(),
        };
        let course = self.gateway.create_course(&body).await?;

        if let Some(source) = banner {
            let file_key = self.uploader.upload(course.id, source).await?;
            let patch = CoursePatch {
                banner: Some(file_key.clone()),
                ..CoursePatch::default()
            };
            if let Err(e) = self.gateway.patch_course(course.id, &patch).await {
                warn!(
                    course_id = %course.id,
                    file_key = %file_key,
                    "Banner patch failed after upload; object is orphaned in storage"
                );
                return Err(OpError::OrphanedAsset {
                    file_key,
                    source: e,
                });
            }
        }

        self.store.load(&self.gateway).await?;
        info!(course_id = %course.id, title = %title, "Course created");
        Ok(course)
    }

    pub async fn add_section(
        &self,
        course_id: Uuid,
        title: &str,
        description: &str,
    ) -> Result<(), OpError> {
        let body = SectionBody {
            title: title.to_string(),
            description: description.to_string(),
        };
        self.gateway.create_section(course_id, &body).await?;
        self.store.load(&self.gateway).await?;
        info!(course_id = %course_id, title = %title, "Section added");
        Ok(())
    }

    /// Patch a section with only the fields that changed (unset fields
    /// are stripped before transmission)
    pub async fn edit_section(
        &self,
        course_id: Uuid,
        section_id: Uuid,
        patch: SectionPatch,
    ) -> Result<(), OpError> {
        self.gateway
            .patch_section(course_id, section_id, &patch)
            .await?;
        self.store.load(&self.gateway).await?;
        info!(section_id = %section_id, "Section updated");
        Ok(())
    }

    /// Delete a section and all its lessons
    pub async fn delete_section(&self, course_id: Uuid, section_id: Uuid) -> Result<(), OpError> {
        self.gateway.delete_section(course_id, section_id).await?;
        self.store.load(&self.gateway).await?;
        info!(section_id = %section_id, "Section deleted");
        Ok(())
    }

    /// Create a lesson, uploading its asset first when one was chosen.
    ///
    /// A transfer failure aborts before any lesson POST is issued, so no
    /// lesson can ever persist an asset key whose transfer failed. The
    /// reverse failure (upload succeeded, create failed) is reported as
    /// [`OpError::OrphanedAsset`].
    pub async fn add_lesson(
        &self,
        section_id: Uuid,
        course_id: Uuid,
        title: &str,
        description: &str,
        file: Option<&UploadSource>,
    ) -> Result<Lesson, OpError> {
        let file_path = match file {
            Some(source) => Some(self.uploader.upload(course_id, source).await?),
            None => None,
        };

        let body = LessonBody {
            title: title.to_string(),
            description: description.to_string(),
            file_path: file_path.clone(),
        };

        let lesson = match self.gateway.create_lesson(section_id, course_id, &body).await {
            Ok(lesson) => lesson,
            Err(e) => {
                if let Some(file_key) = file_path {
                    warn!(
                        section_id = %section_id,
                        file_key = %file_key,
                        "Lesson create failed after upload; object is orphaned in storage"
                    );
                    return Err(OpError::OrphanedAsset {
                        file_key,
                        source: e,
                    });
                }
                return Err(e.into());
            }
        };

        self.store.load(&self.gateway).await?;
        info!(lesson_id = %lesson.id, title = %title, "Lesson added");
        Ok(lesson)
    }

    pub async fn edit_lesson(
        &self,
        lesson_id: Uuid,
        course_id: Uuid,
        patch: LessonPatch,
    ) -> Result<(), OpError> {
        self.gateway
            .patch_lesson(lesson_id, course_id, &patch)
            .await?;
        self.store.load(&self.gateway).await?;
        info!(lesson_id = %lesson_id, "Lesson updated");
        Ok(())
    }

    pub async fn delete_lesson(
        &self,
        lesson_id: Uuid,
        course_id: Uuid,
        section_id: Uuid,
    ) -> Result<(), OpError> {
        self.gateway
            .delete_lesson(lesson_id, course_id, section_id)
            .await?;
        self.store.load(&self.gateway).await?;
        info!(lesson_id = %lesson_id, "Lesson deleted");
        Ok(())
    }

    /// Flip a course to published.
    ///
    /// Guarded client-side: a course with zero sections is blocked, and a
    /// course that is already published is a no-op (the flip is
    /// irreversible through this operation, so there is nothing to redo).
    pub async fn publish_course(&self, course_id: Uuid) -> Result<(), OpError> {
        let course = self
            .store
            .course(course_id)
            .ok_or(OpError::UnknownCourse(course_id))?;

        if course.published {
            return Ok(());
        }
        if course.sections.is_empty() {
            return Err(OpError::PublishBlocked);
        }

        let patch = CoursePatch {
            published: Some(true),
            ..CoursePatch::default()
        };
        self.gateway.patch_course(course_id, &patch).await?;
        self.store.load(&self.gateway).await?;
        info!(course_id = %course_id, "Course published");
        Ok(())
    }

    /// Attach a note to a lesson, uploading its image first when one was
    /// chosen. Bounded client-side to [`MAX_NOTES_PER_LESSON`].
    pub async fn add_note(
        &self,
        lesson_id: Uuid,
        course_id: Uuid,
        title: &str,
        description: &str,
        image: Option<&UploadSource>,
    ) -> Result<Note, OpError> {
        let lesson = self.store.lesson(&self.gateway, lesson_id).await?;
        if lesson.notes.len() >= MAX_NOTES_PER_LESSON {
            return Err(OpError::NoteLimit);
        }

        let image_key = match image {
            Some(source) => Some(self.uploader.upload(course_id, source).await?),
            None => None,
        };

        let body = NoteBody {
            title: title.to_string(),
            description: description.to_string(),
            image: image_key.clone(),
        };

        let note = match self.gateway.create_note(lesson_id, &body).await {
            Ok(note) => note,
            Err(e) => {
                if let Some(file_key) = image_key {
                    warn!(
                        lesson_id = %lesson_id,
                        file_key = %file_key,
                        "Note create failed after upload; object is orphaned in storage"
                    );
                    return Err(OpError::OrphanedAsset {
                        file_key,
                        source: e,
                    });
                }
                return Err(e.into());
            }
        };

        self.store.load(&self.gateway).await?;
        info!(note_id = %note.id, lesson_id = %lesson_id, "Note added");
        Ok(note)
    }

    pub async fn delete_note(&self, note_id: Uuid, lesson_id: Uuid) -> Result<(), OpError> {
        self.gateway.delete_note(note_id, lesson_id).await?;
        self.store.load(&self.gateway).await?;
        info!(note_id = %note_id, "Note deleted");
        Ok(())
    }
}
