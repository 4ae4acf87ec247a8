//! Anonymous caller identity.
//!
//! An [`Identity`] is a random UUID v4 that the client keeps in a long-lived cookie. It is
//! the only thing that scopes a caller's objects; the server keeps no record of it.

use cutout_domain::config::IdentityConfig;
use fxhash::FxHashMap;
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

/// Opaque token for one anonymous caller, always in canonical hyphenated lowercase form.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identity(Arc<str>);

impl Identity {
    /// Issues a fresh identity from the OS random source.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().hyphenated().to_string().into())
    }

    /// Accepts only a canonical hyphenated lowercase UUID.
    ///
    /// Anything else (braced, simple, uppercase, garbage) is treated as no identity at all.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        let uuid = Uuid::try_parse(value).ok()?;
        let canonical = uuid.hyphenated().to_string();
        (canonical == value).then(|| Self(canonical.into()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Identity {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Cookies already parsed by an upstream layer and attached to the request.
#[derive(Debug, Clone, Default)]
pub struct CookieJar(FxHashMap<String, String>);

impl CookieJar {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(name.into(), value.into());
        self
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }
}

/// Instruction for the client to persist a newly issued identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetIdentity {
    cookie_name: Arc<str>,
    identity: Identity,
    max_age_secs: u64,
}

impl SetIdentity {
    #[must_use]
    pub const fn identity(&self) -> &Identity {
        &self.identity
    }
}

impl fmt::Display for SetIdentity {
    /// Renders the `Set-Cookie` header value.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}={}; Max-Age={}; Path=/; SameSite=Strict; Secure; HttpOnly",
            self.cookie_name, self.identity, self.max_age_secs
        )
    }
}

/// Outcome of [`IdentityResolver::resolve`].
#[derive(Debug, Clone)]
pub struct Resolution {
    pub identity: Identity,
    /// Present only when the identity was issued by this resolution.
    pub directive: Option<SetIdentity>,
}

/// Reads the identity cookie or issues a new identity.
#[derive(Debug, Clone)]
pub struct IdentityResolver {
    cookie_name: Arc<str>,
    max_age_secs: u64,
}

impl IdentityResolver {
    #[must_use]
    pub fn new(cookie_name: impl Into<Arc<str>>, max_age_secs: u64) -> Self {
        Self { cookie_name: cookie_name.into(), max_age_secs }
    }

    #[must_use]
    pub fn from_config(config: &IdentityConfig) -> Self {
        Self::new(config.cookie_name.as_str(), config.max_age_secs)
    }

    #[must_use]
    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    /// Looks the identity up in the pre-parsed jar first, then in the raw `Cookie` headers.
    ///
    /// Never fails: a missing, malformed or non-UUID cookie results in a fresh identity and a
    /// [`SetIdentity`] directive.
    pub fn resolve<'a, I>(&self, jar: Option<&CookieJar>, raw_headers: I) -> Resolution
    where
        I: IntoIterator<Item = &'a str>,
    {
        if let Some(identity) = self.from_jar(jar).or_else(|| self.from_headers(raw_headers)) {
            return Resolution { identity, directive: None };
        }

        let identity = Identity::generate();
        tracing::debug!(identity = %identity, "Issued new anonymous identity");

        Resolution {
            directive: Some(SetIdentity {
                cookie_name: Arc::clone(&self.cookie_name),
                identity: identity.clone(),
                max_age_secs: self.max_age_secs,
            }),
            identity,
        }
    }

    fn from_jar(&self, jar: Option<&CookieJar>) -> Option<Identity> {
        jar?.get(&self.cookie_name).and_then(Identity::parse)
    }

    fn from_headers<'a, I>(&self, raw_headers: I) -> Option<Identity>
    where
        I: IntoIterator<Item = &'a str>,
    {
        raw_headers
            .into_iter()
            .flat_map(cookie_pairs)
            .filter(|(name, _)| *name == &*self.cookie_name)
            .find_map(|(_, value)| Identity::parse(value))
    }
}

/// Splits one `Cookie` header into `(name, value)` pairs, skipping fragments without `=`.
fn cookie_pairs(header: &str) -> impl Iterator<Item = (&str, &str)> {
    header.split(';').filter_map(|pair| {
        let (name, value) = pair.split_once('=')?;
        let value = value.trim();
        let value = value
            .strip_prefix('"')
            .and_then(|v| v.strip_suffix('"'))
            .unwrap_or(value);
        Some((name.trim(), value))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const KNOWN: &str = "9b2f0c4e-1d7a-4e55-8c3b-2a6f4d1e0b77";

    fn resolver() -> IdentityResolver {
        IdentityResolver::new("cutout_id", 31_536_000)
    }

    #[test]
    fn parse_accepts_canonical_uuid_only() {
        assert!(Identity::parse(KNOWN).is_some());
        assert!(Identity::parse(&KNOWN.to_uppercase()).is_none());
        assert!(Identity::parse(&KNOWN.replace('-', "")).is_none());
        assert!(Identity::parse("images/../other").is_none());
        assert!(Identity::parse("").is_none());
    }

    #[test]
    fn generated_identities_are_unique_v4() {
        let a = Identity::generate();
        let b = Identity::generate();
        assert_ne!(a, b);
        assert_eq!(Uuid::try_parse(a.as_str()).unwrap().get_version_num(), 4);
        assert!(Identity::parse(a.as_str()).is_some());
    }

    #[test]
    fn existing_cookie_is_returned_without_directive() {
        let header = format!("theme=dark; cutout_id={KNOWN}; other=1");
        let res = resolver().resolve(None, [header.as_str()]);

        assert_eq!(res.identity.as_str(), KNOWN);
        assert!(res.directive.is_none());
    }

    #[test]
    fn jar_wins_over_raw_header() {
        let other = Identity::generate();
        let jar = CookieJar::new().with("cutout_id", other.as_str());
        let header = format!("cutout_id={KNOWN}");

        let res = resolver().resolve(Some(&jar), [header.as_str()]);
        assert_eq!(res.identity, other);
    }

    #[test]
    fn invalid_jar_value_falls_back_to_header() {
        let jar = CookieJar::new().with("cutout_id", "not-a-uuid");
        let header = format!("cutout_id={KNOWN}");

        let res = resolver().resolve(Some(&jar), [header.as_str()]);
        assert_eq!(res.identity.as_str(), KNOWN);
        assert!(res.directive.is_none());
    }

    #[test]
    fn later_header_lines_are_searched() {
        let second = format!("cutout_id=\"{KNOWN}\"");
        let res = resolver().resolve(None, ["a=1", "garbage;;;", second.as_str()]);
        assert_eq!(res.identity.as_str(), KNOWN);
    }

    #[test]
    fn stale_duplicate_does_not_shadow_valid_cookie() {
        let header = format!("cutout_id=stale; cutout_id={KNOWN}");
        let res = resolver().resolve(None, [header.as_str()]);
        assert_eq!(res.identity.as_str(), KNOWN);
        assert!(res.directive.is_none());
    }

    #[test]
    fn missing_or_malformed_cookie_issues_identity() {
        for header in ["", "cutout_id=", "cutout_id=../../etc", "cutout_idx=abc", ";;=;"] {
            let res = resolver().resolve(None, [header]);
            let directive = res.directive.expect("new identity must be persisted");
            assert_eq!(directive.identity(), &res.identity);
        }
    }

    #[test]
    fn directive_renders_cookie_attributes() {
        let res = resolver().resolve(None, std::iter::empty());
        let cookie = res.directive.unwrap().to_string();

        assert!(cookie.starts_with(&format!("cutout_id={}", res.identity)));
        for attr in ["Max-Age=31536000", "Path=/", "SameSite=Strict", "Secure", "HttpOnly"] {
            assert!(cookie.contains(attr), "{cookie} lacks {attr}");
        }
    }
}
