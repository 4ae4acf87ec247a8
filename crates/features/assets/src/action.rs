//! Dispatch for the single asset endpoint.

use crate::error::AssetError;
use std::str::FromStr;
use strum_macros::{AsRefStr, Display, EnumString};

/// The unit of dispatch of `/api/images`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum Action {
    Upload,
    List,
    Delete,
}

impl Action {
    /// The action a bare request selects when no hint is given.
    #[must_use]
    pub fn default_for(method: &str) -> Self {
        match method {
            "POST" => Self::Upload,
            "DELETE" => Self::Delete,
            _ => Self::List,
        }
    }

    /// The only HTTP method this action may be invoked with.
    #[must_use]
    pub const fn method(self) -> &'static str {
        match self {
            Self::Upload => "POST",
            Self::List => "GET",
            Self::Delete => "DELETE",
        }
    }
}

/// Selects the action for a request.
///
/// An explicit hint is taken verbatim (case-sensitive); otherwise the method decides. The
/// result must then agree with the method.
///
/// # Errors
/// Returns [`AssetError::Unsupported`] for unknown hints and for any action/method mismatch.
pub fn route(method: &str, explicit: Option<&str>) -> Result<Action, AssetError> {
    let action = match explicit {
        Some(hint) => Action::from_str(hint).map_err(|_| AssetError::Unsupported {
            message: format!("Unknown action '{hint}'").into(),
            context: None,
        })?,
        None => Action::default_for(method),
    };

    if action.method() != method {
        return Err(AssetError::Unsupported {
            message: format!("Action '{action}' requires {}, got {method}", action.method()).into(),
            context: None,
        });
    }

    Ok(action)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn methods_select_their_default_action() {
        assert_eq!(route("POST", None).unwrap(), Action::Upload);
        assert_eq!(route("GET", None).unwrap(), Action::List);
        assert_eq!(route("DELETE", None).unwrap(), Action::Delete);
    }

    #[test]
    fn matching_hints_are_accepted() {
        assert_eq!(route("GET", Some("list")).unwrap(), Action::List);
        assert_eq!(route("POST", Some("upload")).unwrap(), Action::Upload);
        assert_eq!(route("DELETE", Some("delete")).unwrap(), Action::Delete);
    }

    #[test]
    fn mismatched_hints_are_rejected() {
        for (method, hint) in [("POST", "delete"), ("GET", "upload"), ("DELETE", "list")] {
            assert!(
                matches!(route(method, Some(hint)), Err(AssetError::Unsupported { .. })),
                "{method} with {hint} must be rejected"
            );
        }
    }

    #[test]
    fn hints_are_case_sensitive_and_closed() {
        for hint in ["List", "LIST", "", "purge", " list"] {
            assert!(route("GET", Some(hint)).is_err(), "{hint:?} must be rejected");
        }
    }

    #[test]
    fn other_methods_fall_back_to_list_and_fail() {
        for method in ["PUT", "PATCH", "HEAD", "OPTIONS"] {
            assert!(matches!(route(method, None), Err(AssetError::Unsupported { .. })));
        }
    }
}
