//! Request extractors whose rejections render as `{"detail": ...}`.
//!
//! Each wraps the axum extractor of the same role and converts its rejection
//! through [`AppError`]'s `From` impls.

use axum::extract::{FromRequest, FromRequestParts};

use crate::http::AppError;

#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct AppPath<T>(pub T);

#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct AppQuery<T>(pub T);

#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

#[derive(FromRequest)]
#[from_request(via(axum::Form), rejection(AppError))]
pub struct AppForm<T>(pub T);
