//! Identity newtypes and generation identity derivation.

use chrono::{DateTime, Utc};
use folkreel_error::{PipelineError, PipelineErrorKind};
use serde::{Deserialize, Serialize};

/// Longest accepted country input, in characters.
pub const MAX_COUNTRY_LEN: usize = 100;

/// Account identity.
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
    derive_more::From,
)]
#[serde(transparent)]
pub struct AccountId(String);

impl AccountId {
    /// Wrap an account name.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw identity.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for AccountId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// API key issued to an account.
///
/// Display shows only a short prefix so keys never land in logs whole.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, derive_more::From)]
#[serde(transparent)]
pub struct CredentialId(String);

impl CredentialId {
    /// Wrap an API key.
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Borrow the raw key.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for CredentialId {
    fn from(key: &str) -> Self {
        Self(key.to_string())
    }
}

impl std::fmt::Display for CredentialId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let prefix: String = self.0.chars().take(6).collect();
        write!(f, "{prefix}…")
    }
}

impl std::fmt::Debug for CredentialId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CredentialId({self})")
    }
}

/// Identity of one generation: normalized country plus UTC creation second.
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use folkreel_core::GenerationId;
///
/// let at = Utc.with_ymd_and_hms(2024, 3, 9, 7, 5, 1).unwrap();
/// let id = GenerationId::derive("New  Zealand", at);
/// assert_eq!(id.as_str(), "new_zealand_20240309070501");
/// ```
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
    derive_more::From,
)]
#[serde(transparent)]
pub struct GenerationId(String);

impl GenerationId {
    /// Wrap an existing identity, e.g. one taken from a URL.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// `normalize(country) + "_" + %Y%m%d%H%M%S`.
    pub fn derive(country: &str, at: DateTime<Utc>) -> Self {
        Self(format!(
            "{}_{}",
            normalize_country(country),
            at.format("%Y%m%d%H%M%S")
        ))
    }

    /// Same identity with a collision suffix, `base_2`, `base_3`, ...
    pub fn with_suffix(&self, n: u32) -> Self {
        Self(format!("{}_{}", self.0, n))
    }

    /// Borrow the raw identity.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for GenerationId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Lower-case and collapse whitespace runs to a single underscore.
///
/// ```
/// use folkreel_core::normalize_country;
///
/// assert_eq!(normalize_country("  Côte d'Ivoire "), "côte_d'ivoire");
/// ```
pub fn normalize_country(country: &str) -> String {
    country
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("_")
}

/// Trim and check a country name; returns the trimmed form.
///
/// Rejects blank input, overlong input, path separators and control characters,
/// since the name becomes part of a storage path.
pub fn validate_country(country: &str) -> Result<&str, PipelineError> {
    let trimmed = country.trim();
    if trimmed.is_empty() {
        return Err(PipelineError::new(PipelineErrorKind::InvalidRequest(
            "Please enter a country name".to_string(),
        )));
    }
    if trimmed.chars().count() > MAX_COUNTRY_LEN {
        return Err(PipelineError::new(PipelineErrorKind::InvalidRequest(
            format!("Country name longer than {MAX_COUNTRY_LEN} characters"),
        )));
    }
    if trimmed
        .chars()
        .any(|c| c == '/' || c == '\\' || c.is_control())
        || trimmed.starts_with('.')
    {
        return Err(PipelineError::new(PipelineErrorKind::InvalidRequest(
            "Country name contains unsupported characters".to_string(),
        )));
    }
    Ok(trimmed)
}
