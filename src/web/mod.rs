//! Web server for webcam capture uploads and mock card detection.
//!
//! This module provides the HTTP backend using Axum. The browser page
//! captures webcam frames and posts them here; responses carry stored-file
//! metadata or mock detection boxes.
//!
//! ## Starting the Server
//!
//! ```text
//! # Start on default port 5000
//! card-spotter serve
//!
//! # Custom port and auto-open browser
//! card-spotter serve --port 3000 --open
//!
//! # Bind to all interfaces
//! card-spotter serve --address 0.0.0.0
//! ```
//!
//! ## API Endpoints
//!
//! - `GET /` - Capture page with live webcam preview
//! - `GET /health` - Liveness probe
//! - `GET /meta` - Bound port, upload directory, and version
//! - `POST /upload` - Store a multipart `image` field
//! - `POST /mock-cv` - Mock detection results for a stored file
//! - `POST /analyze` - Upload and mock-detect in one request
//! - `GET /uploads/{file}` - Serve a stored upload back

pub mod listener;
pub mod server;
