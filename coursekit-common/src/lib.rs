//! # CourseKit Common Library
//!
//! Shared code for the CourseKit client crates including:
//! - Content tree models (Course, Section, Lesson, Note)
//! - API request/response types for the remote gateway
//! - Configuration loading
//! - Clock formatting for the media viewer

pub mod api;
pub mod config;
pub mod error;
pub mod human_time;
pub mod model;

pub use error::{Error, Result};
pub use model::{ContentKind, Course, Lesson, Note, Section};
