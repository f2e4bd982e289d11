//! Cross-origin allow-listing.
//!
//! [`AllowedOrigins`] is built once at startup from a list of origin strings
//! and never mutated afterwards. [`AllowedOrigins::decide`] turns a request's
//! `Origin` header and method into a [`CorsDecision`]; applying that decision
//! to HTTP responses is left to the API layer.

use std::collections::BTreeSet;

use thiserror::Error;
use url::Url;

/// Origin configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OriginError {
    #[error("empty CORS origin")]
    Empty,

    #[error("invalid CORS origin {0:?}")]
    Invalid(String),

    #[error("CORS origin must not contain a path: {0:?}")]
    HasPath(String),

    #[error("CORS origin must only include scheme and host: {0:?}")]
    ExtraComponents(String),

    #[error("at least one valid CORS origin is required")]
    NoneConfigured,
}

/// Outcome of evaluating a request against the allow-list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CorsDecision {
    /// Origin is allowed; echo the normalised origin back.
    Allow(String),
    /// Disallowed preflight; answer 403 without reaching the application.
    Deny,
    /// No `Origin`, or a disallowed non-preflight request: add no CORS headers.
    Ignore,
}

/// Immutable set of normalised origins (`scheme://host[:port]`, lower-case).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllowedOrigins {
    origins: BTreeSet<String>,
}

impl AllowedOrigins {
    /// Build the allow-list. Blank entries are skipped; any other entry that
    /// fails normalisation rejects the whole list, as does an empty result.
    pub fn new<I, S>(origins: I) -> Result<Self, OriginError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = BTreeSet::new();
        for origin in origins {
            let origin = origin.as_ref();
            if origin.trim().is_empty() {
                continue;
            }
            set.insert(normalize_origin(origin)?);
        }
        if set.is_empty() {
            return Err(OriginError::NoneConfigured);
        }
        Ok(Self { origins: set })
    }

    /// Parse a comma-separated list, e.g. the `CORS_ALLOWED_ORIGINS` variable.
    pub fn from_csv(list: &str) -> Result<Self, OriginError> {
        Self::new(list.split(','))
    }

    /// Whether a normalised origin is in the set.
    pub fn contains(&self, normalized: &str) -> bool {
        self.origins.contains(normalized)
    }

    /// Iterate the normalised origins in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.origins.iter().map(String::as_str)
    }

    /// Decide how to treat a request carrying `origin` (if any).
    pub fn decide(&self, origin: Option<&str>, is_preflight: bool) -> CorsDecision {
        let origin = match origin.map(str::trim) {
            None | Some("") => return CorsDecision::Ignore,
            Some(o) => o,
        };

        match normalize_origin(origin) {
            Ok(normalized) if self.contains(&normalized) => CorsDecision::Allow(normalized),
            _ if is_preflight => CorsDecision::Deny,
            _ => CorsDecision::Ignore,
        }
    }
}

/// Normalise an origin string to lower-case `scheme://host[:port]`.
///
/// Default ports are dropped (`https://a.example:443` → `https://a.example`).
pub fn normalize_origin(origin: &str) -> Result<String, OriginError> {
    let trimmed = origin.trim();
    if trimmed.is_empty() {
        return Err(OriginError::Empty);
    }

    let parsed = Url::parse(trimmed).map_err(|_| OriginError::Invalid(trimmed.to_string()))?;
    let host = match parsed.host_str() {
        Some(h) if !h.is_empty() => h,
        _ => return Err(OriginError::Invalid(trimmed.to_string())),
    };
    if parsed.cannot_be_a_base() {
        return Err(OriginError::Invalid(trimmed.to_string()));
    }
    if !matches!(parsed.path(), "" | "/") {
        return Err(OriginError::HasPath(trimmed.to_string()));
    }
    if parsed.query().is_some()
        || parsed.fragment().is_some()
        || !parsed.username().is_empty()
        || parsed.password().is_some()
    {
        return Err(OriginError::ExtraComponents(trimmed.to_string()));
    }

    let mut normalized = format!("{}://{}", parsed.scheme(), host).to_lowercase();
    if let Some(port) = parsed.port() {
        normalized.push_str(&format!(":{port}"));
    }
    Ok(normalized)
}
