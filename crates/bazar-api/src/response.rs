//! The JSON response envelope.

use crate::ApiError;
use serde::Serialize;

/// Uniform JSON envelope for every API response.
///
/// Success: `{"success": true, "message": ..., "data": ...}`.
/// Failure: `{"success": false, "message": ...}` with the status code
/// carried out of band.
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse<T: Serialize> {
    /// Whether the request succeeded.
    pub success: bool,
    /// Human-readable outcome.
    pub message: String,
    /// Payload, omitted on failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// HTTP status code, not serialized into the body.
    #[serde(skip)]
    pub status: u16,
}

impl<T: Serialize> ApiResponse<T> {
    /// A 200 response with payload.
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
            status: 200,
        }
    }

    /// A 201 response with payload.
    pub fn created(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
            status: 201,
        }
    }

    /// Serialize the envelope body.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| {
            r#"{"success":false,"message":"response serialization failed"}"#.to_string()
        })
    }
}

impl ApiResponse<()> {
    /// An error envelope from an [`ApiError`].
    pub fn from_error(error: &ApiError) -> Self {
        Self {
            success: false,
            message: error.to_string(),
            data: None,
            status: error.status_code(),
        }
    }
}
