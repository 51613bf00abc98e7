//! The `{success, message, result}` envelope every endpoint answers with.

use serde::Serialize;

/// Successful response body.
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse<T> {
    /// Always `true` for this type.
    pub success: bool,
    /// Always `"OK"` for this type.
    pub message: &'static str,
    /// Endpoint payload.
    pub result: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Wraps a payload.
    #[must_use]
    pub const fn ok(result: T) -> Self {
        Self {
            success: true,
            message: "OK",
            result,
        }
    }
}

/// Reference to the row a write touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ObjectRef {
    /// A row was inserted.
    #[serde(rename = "created_object_id")]
    Created(i64),
    /// A row was changed.
    #[serde(rename = "updated_object_id")]
    Updated(i64),
    /// A row was removed.
    #[serde(rename = "deleted_object_id")]
    Deleted(i64),
    /// A user was marked as withdrawn but kept.
    #[serde(rename = "withdrawn_object_id")]
    Withdrawn(i64),
}

/// Body of an error response.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    /// Always `false`.
    pub success: bool,
    /// Stable machine-readable code.
    pub error: &'static str,
    /// Human-readable message.
    pub message: String,
}

impl ErrorBody {
    /// Builds an error body.
    #[must_use]
    pub const fn new(error: &'static str, message: String) -> Self {
        Self {
            success: false,
            error,
            message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_object_refs_serialize_as_single_key() {
        let body = ApiResponse::ok(ObjectRef::Created(3));
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({"success": true, "message": "OK", "result": {"created_object_id": 3}})
        );
        assert_eq!(
            serde_json::to_value(ObjectRef::Withdrawn(8)).unwrap(),
            json!({"withdrawn_object_id": 8})
        );
    }

    #[test]
    fn test_error_body() {
        let body = ErrorBody::new("FORBIDDEN", "You do not have permission".to_string());
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({"success": false, "error": "FORBIDDEN", "message": "You do not have permission"})
        );
    }
}
