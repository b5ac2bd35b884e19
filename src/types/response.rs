use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};

use crate::config::{CODE_BAD_REQUEST, CODE_CONFLICT, CODE_INTERNAL, CODE_NOT_FOUND};

/// Error body returned by resource endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Fault {
    pub code: String,
    pub details: String,
    pub message: String,
}

impl Fault {
    pub fn new(code: impl Into<String>, details: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            details: details.into(),
            message: message.into(),
        }
    }

    /// Pair this body with a status code.
    pub fn with_status(self, status: StatusCode) -> axum::response::Response {
        (status, Json(self)).into_response()
    }
}

/// Acknowledgement body for successful writes. Same shape as [`Fault`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Success {
    pub code: String,
    pub details: String,
    pub message: String,
}

impl Success {
    pub fn new(code: impl Into<String>, details: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            details: details.into(),
            message: message.into(),
        }
    }
}

impl IntoResponse for Success {
    fn into_response(self) -> axum::response::Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

/// Externally configured status for generic failures.
///
/// Read from a one-character setting: `1` internal error, `2` not found,
/// `3` bad request, anything else conflict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FaultMapping {
    InternalServerError,
    NotFound,
    BadRequest,
    #[default]
    Conflict,
}

impl FaultMapping {
    pub fn from_setting(value: &str) -> Self {
        match value.trim() {
            "1" => FaultMapping::InternalServerError,
            "2" => FaultMapping::NotFound,
            "3" => FaultMapping::BadRequest,
            _ => FaultMapping::Conflict,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            FaultMapping::InternalServerError => StatusCode::INTERNAL_SERVER_ERROR,
            FaultMapping::NotFound => StatusCode::NOT_FOUND,
            FaultMapping::BadRequest => StatusCode::BAD_REQUEST,
            FaultMapping::Conflict => StatusCode::CONFLICT,
        }
    }

    /// Build the fault body for a failure message under this mapping.
    pub fn fault(&self, message: impl Into<String>) -> Fault {
        let (code, details) = match self {
            FaultMapping::InternalServerError => (CODE_INTERNAL, "Catch - InternalServerError"),
            FaultMapping::NotFound => (CODE_NOT_FOUND, "Catch - NotFound"),
            FaultMapping::BadRequest => (CODE_BAD_REQUEST, "Catch - BadRequest"),
            FaultMapping::Conflict => (CODE_CONFLICT, "Catch - Conflict"),
        };
        Fault::new(code, details, message)
    }

    pub fn respond(&self, message: impl Into<String>) -> axum::response::Response {
        self.fault(message).with_status(self.status())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_settings_to_statuses() {
        assert_eq!(FaultMapping::from_setting("1").status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(FaultMapping::from_setting("2").status(), StatusCode::NOT_FOUND);
        assert_eq!(FaultMapping::from_setting(" 3 ").status(), StatusCode::BAD_REQUEST);
        assert_eq!(FaultMapping::from_setting("9").status(), StatusCode::CONFLICT);
        assert_eq!(FaultMapping::default(), FaultMapping::Conflict);
    }

    #[test]
    fn fault_serializes_with_pascal_case_keys() {
        let fault = FaultMapping::NotFound.fault("boom");
        let json = serde_json::to_value(&fault).unwrap();
        assert_eq!(json["Code"], "E4004");
        assert_eq!(json["Details"], "Catch - NotFound");
        assert_eq!(json["Message"], "boom");
    }
}
