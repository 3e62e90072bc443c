//! Result envelope returned by every Request Gateway operation.
//!
//! A call either succeeds with a typed payload or fails with a human-readable
//! message; the two shapes are mutually exclusive by construction.

use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// Outcome of one Request Gateway call.
///
/// Serializes to the service's envelope shape:
/// `{"success":true,"data":…}` or `{"success":false,"error":"…"}`.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiResponse<T> {
    /// The call succeeded and the body decoded into `T`.
    Success(T),
    /// The call failed; the string explains why.
    Failure(String),
}

impl<T> ApiResponse<T> {
    /// Build a failure from anything printable.
    pub fn failure(error: impl std::fmt::Display) -> Self {
        ApiResponse::Failure(error.to_string())
    }

    /// Whether the call succeeded.
    pub fn is_success(&self) -> bool {
        matches!(self, ApiResponse::Success(_))
    }

    /// The payload, present only on success.
    pub fn data(&self) -> Option<&T> {
        match self {
            ApiResponse::Success(data) => Some(data),
            ApiResponse::Failure(_) => None,
        }
    }

    /// The error message, present only on failure.
    pub fn error(&self) -> Option<&str> {
        match self {
            ApiResponse::Success(_) => None,
            ApiResponse::Failure(error) => Some(error),
        }
    }

    /// Transform the payload, leaving failures untouched.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ApiResponse<U> {
        match self {
            ApiResponse::Success(data) => ApiResponse::Success(f(data)),
            ApiResponse::Failure(error) => ApiResponse::Failure(error),
        }
    }

    /// Convert into a `Result` for use with `?`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Server`] carrying the failure message.
    pub fn into_result(self) -> Result<T, ApiError> {
        match self {
            ApiResponse::Success(data) => Ok(data),
            ApiResponse::Failure(message) => Err(ApiError::Server { message }),
        }
    }
}

impl<T: Serialize> Serialize for ApiResponse<T> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;

        let mut state = serializer.serialize_struct("ApiResponse", 2)?;
        match self {
            ApiResponse::Success(data) => {
                state.serialize_field("success", &true)?;
                state.serialize_field("data", data)?;
            }
            ApiResponse::Failure(error) => {
                state.serialize_field("success", &false)?;
                state.serialize_field("error", error)?;
            }
        }
        state.end()
    }
}

/// Body the service sends with non-2xx responses.
///
/// Either field may carry the message; `error` wins when both are present.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ErrorBody {
    /// The first non-empty message, preferring `error`.
    pub fn into_message(self) -> Option<String> {
        self.error
            .filter(|e| !e.is_empty())
            .or_else(|| self.message.filter(|m| !m.is_empty()))
    }
}
