//! Request extractors whose rejections use the `{ "error": message }` body.
//!
//! Axum's own `Json`, `Query` and `Path` reply with plain text (and 422 for
//! malformed JSON). These wrappers turn every rejection into
//! [`AppError::BadRequest`].

use axum::extract::{FromRequest, FromRequestParts};

use crate::error::AppError;

#[derive(Debug, Clone, Copy, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

#[derive(Debug, Clone, Copy, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct AppQuery<T>(pub T);

#[derive(Debug, Clone, Copy, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct AppPath<T>(pub T);
