//! Request extractors whose rejections use the `{ "error": … }` shape.

use axum::extract::FromRequest;
use axum::extract::FromRequestParts;

use crate::ServerError;

/// JSON request body. Malformed or incomplete bodies are a 400.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ServerError))]
pub struct JsonBody<T>(pub T);

/// Query string. Unparseable parameters are a 400.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ServerError))]
pub struct QueryParams<T>(pub T);
