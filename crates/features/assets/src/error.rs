use cutout_storage::StorageError;
use std::borrow::Cow;

/// A specialized [`AssetError`] enum of this crate.
///
/// Every failure on the asset endpoint ends up as exactly one of these variants, and every
/// variant maps to exactly one HTTP status.
#[cutout_derive::cutout_error]
pub enum AssetError {
    /// Malformed or missing client input (400).
    #[error("Invalid request{}: {message}", format_context(.context))]
    InvalidInput { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// The request body exceeds the configured limit (413).
    #[error("Payload too large{}: {message}", format_context(.context))]
    PayloadTooLarge { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// The background-removal service answered with a non-success status (502).
    #[error("Background removal failed{}: {message}", format_context(.context))]
    Upstream { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// The background-removal service could not be reached (502).
    #[error("Background removal unreachable{}: {source}", format_context(.context))]
    Transport { source: reqwest::Error, context: Option<Cow<'static, str>> },

    /// The target key belongs to another identity (403).
    #[error("Forbidden{}: {message}", format_context(.context))]
    Forbidden { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// Unknown action or action/method mismatch (405).
    #[error("Unsupported action{}: {message}", format_context(.context))]
    Unsupported { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// The image could not be mirrored or re-encoded (500).
    #[error("Image transform failed{}: {message}", format_context(.context))]
    Transform { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Image codec error{}: {source}", format_context(.context))]
    Image { source: image::ImageError, context: Option<Cow<'static, str>> },

    /// Object store failure (500).
    #[error("Object store failure{}: {source}", format_context(.context))]
    Store { source: StorageError, context: Option<Cow<'static, str>> },

    /// Public object lookup miss (404).
    #[error("Not found{}: {message}", format_context(.context))]
    NotFound { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Internal asset error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

impl AssetError {
    /// Short, stable summary used as the `error` field of failure bodies.
    #[must_use]
    pub const fn summary(&self) -> &'static str {
        match self {
            Self::InvalidInput { .. } => "Invalid request",
            Self::PayloadTooLarge { .. } => "Payload too large",
            Self::Upstream { .. } | Self::Transport { .. } => "Background removal failed",
            Self::Forbidden { .. } => "Forbidden",
            Self::Unsupported { .. } => "Method not allowed",
            Self::Transform { .. } | Self::Image { .. } => "Image processing failed",
            Self::Store { .. } => "Storage failure",
            Self::NotFound { .. } => "Not found",
            Self::Internal { .. } => "Internal server error",
        }
    }

    /// The underlying message without the summary prefix, used as `details`.
    #[must_use]
    pub fn details(&self) -> String {
        match self {
            Self::InvalidInput { message, .. }
            | Self::PayloadTooLarge { message, .. }
            | Self::Upstream { message, .. }
            | Self::Forbidden { message, .. }
            | Self::Unsupported { message, .. }
            | Self::Transform { message, .. }
            | Self::NotFound { message, .. }
            | Self::Internal { message, .. } => message.to_string(),
            Self::Transport { source, .. } => source.to_string(),
            Self::Image { source, .. } => source.to_string(),
            Self::Store { source, .. } => source.to_string(),
        }
    }

    pub(crate) fn invalid(message: impl Into<Cow<'static, str>>) -> Self {
        Self::InvalidInput { message: message.into(), context: None }
    }
}

#[cfg(feature = "server")]
mod response {
    use super::AssetError;
    use crate::model::ErrorResponse;
    use axum::Json;
    use axum::http::StatusCode;
    use axum::response::{IntoResponse, Response};

    impl AssetError {
        #[must_use]
        pub const fn status(&self) -> StatusCode {
            match self {
                Self::InvalidInput { .. } => StatusCode::BAD_REQUEST,
                Self::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
                Self::Upstream { .. } | Self::Transport { .. } => StatusCode::BAD_GATEWAY,
                Self::Forbidden { .. } => StatusCode::FORBIDDEN,
                Self::Unsupported { .. } => StatusCode::METHOD_NOT_ALLOWED,
                Self::NotFound { .. } => StatusCode::NOT_FOUND,
                Self::Transform { .. }
                | Self::Image { .. }
                | Self::Store { .. }
                | Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            }
        }
    }

    impl IntoResponse for AssetError {
        fn into_response(self) -> Response {
            let status = self.status();
            if status.is_server_error() {
                tracing::error!(status = status.as_u16(), error = %self, "Asset request failed");
            } else {
                tracing::debug!(status = status.as_u16(), error = %self, "Asset request rejected");
            }

            let body = ErrorResponse { error: self.summary().to_owned(), details: Some(self.details()) };
            (status, Json(body)).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_errors_convert_into_store_failures() {
        let err: AssetError =
            StorageError::NotFound { message: "images/a/1-x.png".into(), context: None }.into();

        assert!(matches!(err, AssetError::Store { .. }));
        assert_eq!(err.summary(), "Storage failure");
        assert!(err.details().contains("images/a/1-x.png"));
    }

    #[test]
    fn details_carry_the_raw_message() {
        let err = AssetError::Upstream { message: "Insufficient credits".into(), context: None };
        assert_eq!(err.details(), "Insufficient credits");
        assert_eq!(err.summary(), "Background removal failed");
    }

    #[cfg(feature = "server")]
    #[test]
    fn statuses_follow_the_error_taxonomy() {
        use axum::http::StatusCode;

        let cases = [
            (AssetError::invalid("x"), StatusCode::BAD_REQUEST),
            (
                AssetError::PayloadTooLarge { message: "x".into(), context: None },
                StatusCode::PAYLOAD_TOO_LARGE,
            ),
            (AssetError::Upstream { message: "x".into(), context: None }, StatusCode::BAD_GATEWAY),
            (AssetError::Forbidden { message: "x".into(), context: None }, StatusCode::FORBIDDEN),
            (
                AssetError::Unsupported { message: "x".into(), context: None },
                StatusCode::METHOD_NOT_ALLOWED,
            ),
            (
                AssetError::Transform { message: "x".into(), context: None },
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (AssetError::from("boom"), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, status) in cases {
            assert_eq!(err.status(), status, "{err}");
        }
    }
}
