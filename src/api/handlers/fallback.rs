//! Handler for requests no route matched.

use crate::error::AppError;

/// Responds `404 Not Found` with `{"error":"Not Found"}`.
pub async fn not_found_handler() -> AppError {
    AppError::NotFound
}
