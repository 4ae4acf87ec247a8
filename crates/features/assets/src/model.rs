use crate::ports::StoredBlob;
use cutout_derive::api_model;

/// Upload payload. `fileB64` may carry a `data:<mime>;base64,` prefix.
#[api_model(deny_unknown_fields = false)]
#[derive(Default, Clone)]
pub struct UploadRequest {
    /// Base64-encoded source image
    pub file_b64: Option<String>,
}

/// Where the processed image was stored.
#[api_model]
#[derive(Clone, PartialEq, Eq)]
pub struct UploadResponse {
    /// Public retrieval locator
    pub url: String,
    /// Object key, `images/{identity}/{millis}-{suffix}.png`
    pub pathname: String,
}

impl From<StoredBlob> for UploadResponse {
    fn from(blob: StoredBlob) -> Self {
        Self { url: blob.url, pathname: blob.pathname }
    }
}

/// One stored object of the caller.
#[api_model]
#[derive(Clone, PartialEq, Eq)]
pub struct AssetRecord {
    pub url: String,
    pub pathname: String,
    /// Size in bytes
    pub size: u64,
    /// RFC 3339 timestamp of the last write
    pub uploaded_at: String,
}

#[api_model]
pub struct ListResponse {
    /// The caller's objects ordered by key
    pub items: Vec<AssetRecord>,
}

#[api_model]
pub struct DeleteResponse {
    pub success: bool,
}

/// Query parameters of `/api/images`.
#[api_model(deny_unknown_fields = false)]
#[derive(Default)]
#[cfg_attr(feature = "server", derive(utoipa::IntoParams))]
#[cfg_attr(feature = "server", into_params(parameter_in = Query))]
pub struct ImageQuery {
    /// Explicit action: `upload`, `list` or `delete` (case-sensitive)
    pub action: Option<String>,
    /// Key to delete
    pub pathname: Option<String>,
    /// URL of the object to delete, used when `pathname` is absent
    pub url: Option<String>,
}

impl ImageQuery {
    /// The delete target: `pathname` if non-blank, else `url`.
    #[must_use]
    pub fn target(&self) -> Option<&str> {
        [self.pathname.as_deref(), self.url.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|t| !t.is_empty())
    }
}

/// Failure body shared by every error status.
#[api_model]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upload_request_uses_camel_case_and_tolerates_extras() {
        let req: UploadRequest =
            serde_json::from_str(r#"{"fileB64":"aGk=","fileName":"cat.jpg"}"#).unwrap();
        assert_eq!(req.file_b64.as_deref(), Some("aGk="));
    }

    #[test]
    fn record_serializes_uploaded_at_in_camel_case() {
        let record = AssetRecord {
            url: "u".to_owned(),
            pathname: "p".to_owned(),
            size: 3,
            uploaded_at: "2026-01-01T00:00:00.000Z".to_owned(),
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["uploadedAt"], "2026-01-01T00:00:00.000Z");
    }

    #[test]
    fn delete_target_prefers_pathname() {
        let query = ImageQuery {
            action: None,
            pathname: Some("  ".to_owned()),
            url: Some("https://x/files/images/a/1.png".to_owned()),
        };
        assert_eq!(query.target(), Some("https://x/files/images/a/1.png"));

        let query = ImageQuery { pathname: Some("images/a/1.png".to_owned()), ..query };
        assert_eq!(query.target(), Some("images/a/1.png"));

        assert_eq!(ImageQuery::default().target(), None);
    }

    #[test]
    fn error_body_omits_missing_details() {
        let body = ErrorResponse { error: "Forbidden".to_owned(), details: None };
        assert_eq!(serde_json::to_string(&body).unwrap(), r#"{"error":"Forbidden"}"#);
    }
}
