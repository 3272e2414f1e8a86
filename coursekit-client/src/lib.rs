//! # CourseKit Client
//!
//! Client-side core for hierarchical course-content management:
//! - Gateway HTTP client (`gateway`)
//! - Content tree store with atomic reload semantics (`store`)
//! - Tree mutation operations (`ops`)
//! - Two-phase asset upload pipeline (`upload`)
//!
//! Durable state is owned by the remote gateway. The local tree is never
//! authoritative: every mutation ends with a full refetch, so the store
//! only ever holds a state derived from one successful load.

pub mod gateway;
pub mod ops;
pub mod store;
pub mod upload;

pub use gateway::{ApiGateway, CredentialProvider, GatewayError, SessionFile, StaticCredentials};
pub use ops::{CourseEditor, OpError};
pub use store::CourseStore;
pub use upload::{UploadError, UploadSource, Uploader};
