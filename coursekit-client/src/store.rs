//! Content tree store
//!
//! Single source of truth for the course tree on the client side. The
//! snapshot is only ever replaced wholesale from a successful gateway
//! fetch: there is no merge logic and no partial write, so readers can
//! never observe a state that mixes old and new trees.

use crate::gateway::{ApiGateway, GatewayError};
use coursekit_common::model::{Course, Lesson};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::{watch, Mutex, Notify, RwLock};
use uuid::Uuid;

/// In-memory course tree with atomic reload semantics
pub struct CourseStore {
    snapshot: watch::Sender<Arc<Vec<Course>>>,
    /// Lesson details fetched on demand, keyed by lesson id. Cleared on
    /// every tree reload so details are never staler than the tree.
    lessons: RwLock<HashMap<Uuid, Lesson>>,
    /// Lesson ids with a fetch currently in flight. Guards against
    /// duplicate concurrent fetches for the same node from independent
    /// reader surfaces.
    in_flight: Mutex<HashSet<Uuid>>,
    lesson_settled: Notify,
}

impl CourseStore {
    pub fn new() -> Self {
        let (snapshot, _) = watch::channel(Arc::new(Vec::new()));
        Self {
            snapshot,
            lessons: RwLock::new(HashMap::new()),
            in_flight: Mutex::new(HashSet::new()),
            lesson_settled: Notify::new(),
        }
    }

    /// Fetch the full course list and replace the snapshot atomically.
    ///
    /// On failure the previous snapshot stays intact and the error is
    /// returned to the caller.
    pub async fn load(&self, gateway: &ApiGateway) -> Result<(), GatewayError> {
        let courses = gateway.list_courses().await?;
        tracing::debug!(courses = courses.len(), "Course tree reloaded");

        self.lessons.write().await.clear();
        self.snapshot.send_replace(Arc::new(courses));
        Ok(())
    }

    /// Current snapshot (cheap Arc clone)
    pub fn get(&self) -> Arc<Vec<Course>> {
        self.snapshot.borrow().clone()
    }

    /// Watch receiver for readers that re-render on every reload
    pub fn subscribe(&self) -> watch::Receiver<Arc<Vec<Course>>> {
        self.snapshot.subscribe()
    }

    /// Look up a course in the current snapshot
    pub fn course(&self, course_id: Uuid) -> Option<Course> {
        self.snapshot
            .borrow()
            .iter()
            .find(|c| c.id == course_id)
            .cloned()
    }

    /// Lesson detail for one node, fetched on demand.
    ///
    /// Concurrent calls for the same lesson collapse into a single gateway
    /// fetch; late callers wait for the first to settle and then read the
    /// cache. A failed fetch is not cached, so the next caller retries.
    pub async fn lesson(
        &self,
        gateway: &ApiGateway,
        lesson_id: Uuid,
    ) -> Result<Lesson, GatewayError> {
        loop {
            if let Some(lesson) = self.lessons.read().await.get(&lesson_id) {
                return Ok(lesson.clone());
            }

            // Arm the notification before deciding, so a fetch settling
            // between the cache miss and the wait is not lost
            let mut settled = std::pin::pin!(self.lesson_settled.notified());
            settled.as_mut().enable();
            let fetch_is_ours = self.in_flight.lock().await.insert(lesson_id);
            if fetch_is_ours {
                break;
            }
            settled.await;
        }

        // The winner may have settled between our cache miss and the
        // in-flight insert
        if let Some(lesson) = self.lessons.read().await.get(&lesson_id) {
            self.in_flight.lock().await.remove(&lesson_id);
            self.lesson_settled.notify_waiters();
            return Ok(lesson.clone());
        }

        let result = gateway.get_lesson(lesson_id).await;

        if let Ok(lesson) = &result {
            self.lessons.write().await.insert(lesson_id, lesson.clone());
        }
        self.in_flight.lock().await.remove(&lesson_id);
        self.lesson_settled.notify_waiters();

        if let Err(e) = &result {
            tracing::warn!(lesson_id = %lesson_id, error = %e, "Lesson fetch failed");
        }
        result
    }
}

impl Default for CourseStore {
    fn default() -> Self {
        Self::new()
    }
}
