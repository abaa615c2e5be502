//! HTTP surface: an upload page and a single conversion endpoint.
//!
//! `POST /upload` takes a multipart field `file` and answers with the
//! workbook as an attachment, or a JSON error body.

pub mod error;
pub mod page;
pub mod router;
pub mod server;

pub use error::ApiError;
pub use router::app_router;
pub use server::{ctrl_c, serve, serve_on};
