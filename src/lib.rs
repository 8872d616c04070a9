//! # card-spotter
//!
//! The backend for a webcam card-spotting demo.
//!
//! A browser page captures a webcam frame every two seconds and posts it
//! here as a multipart upload. The backend stores each frame on disk under a
//! generated name and answers detection requests with fixed mock bounding
//! boxes, so the frontend can build its rendering before a real detector
//! exists.
//!
//! ## Features
//!
//! - **Resilient startup**: If the preferred port is busy, the listener
//!   walks up through consecutive ports before giving up
//! - **Upload storage**: Frames land on disk under collision-free generated
//!   names and can be fetched back by name
//! - **Mock detection**: Two fixed bounding-box sets stand in for a card
//!   detector
//! - **Optional upload gate**: A flag rejects uploads whose declared
//!   content type is not `image/*`
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use card_spotter::storage::UploadStore;
//! use card_spotter::web::server::{build_router, AppState};
//!
//! // Build the application router against a local upload directory
//! let store = UploadStore::new("uploads");
//! let app = build_router(Arc::new(AppState {
//!     store,
//!     port: 5000,
//!     enforce_validation: false,
//! }));
//! # let _ = app;
//! ```
//!
//! ## Modules
//!
//! - [`core`]: Mock detection types and the fixed result sets
//! - [`storage`]: Upload directory management and filename generation
//! - [`cli`]: Command-line interface implementation
//! - [`web`]: Listener with port fallback, router, and handlers

pub mod cli;
pub mod core;
pub mod storage;
pub mod utils;
pub mod web;

// Re-export commonly used types for convenience
pub use self::core::detection::{BoundingBox, Game};
pub use storage::{SavedUpload, UploadStore};
pub use web::listener::{bind_with_retry, BindError, BoundListener};
