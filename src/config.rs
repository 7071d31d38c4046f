//! Alias configuration for query parameters.
//!
//! Each endpoint declares which parameter names a query may use. Names are
//! grouped into alias sets; the last name of a set is its canonical field, and
//! exactly one set is the *main* parameter that opens a new condition group.
//!
//! # Examples
//!
//! ```
//! use decklens::AliasConfig;
//!
//! let config = AliasConfig::from_toml_str(r#"
//!     [[alias]]
//!     names = ["card", "name", "cardname"]
//!     main = true
//!
//!     [[alias]]
//!     names = ["qty", "quantity"]
//! "#).unwrap();
//!
//! assert_eq!(config.main().canonical(), "cardname");
//! assert_eq!(config.resolve("QTY").canonical(), Some("quantity"));
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::Parameter;
use crate::error::ConfigError;

/// Interchangeable names for one logical field.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct AliasSet {
    /// Accepted names; the last entry is canonical.
    pub names: Vec<String>,

    /// Whether this set is the grouping (main) parameter.
    #[serde(default)]
    pub main: bool,
}

impl AliasSet {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { names: names.into_iter().map(Into::into).collect(), main: false }
    }

    pub fn main<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { main: true, ..Self::new(names) }
    }

    /// Canonical field name (last alias).
    pub fn canonical(&self) -> &str {
        self.names.last().map(String::as_str).unwrap_or_default()
    }

    /// Whether `raw` names this field. Comparison is case-insensitive; numeric
    /// aliases compare by value so `01` matches `1`.
    pub fn matches(&self, raw: &str) -> bool {
        let raw = raw.trim();
        self.names.iter().any(|alias| match (alias.parse::<f64>(), raw.parse::<f64>()) {
            (Ok(a), Ok(b)) => a == b,
            _ => alias.to_lowercase() == raw.to_lowercase(),
        })
    }
}

/// The alias sets of one query endpoint.
///
/// Deserializing goes through [`AliasConfig::new`], so a decoded value always
/// has exactly one main set.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(try_from = "RawAliasConfig")]
pub struct AliasConfig {
    #[serde(rename = "alias")]
    sets: Vec<AliasSet>,
    /// Index of the main set in `sets`.
    #[serde(skip)]
    main: usize,
}

#[derive(Deserialize)]
struct RawAliasConfig {
    #[serde(rename = "alias")]
    sets: Vec<AliasSet>,
}

impl TryFrom<RawAliasConfig> for AliasConfig {
    type Error = ConfigError;

    fn try_from(raw: RawAliasConfig) -> Result<Self, Self::Error> {
        Self::new(raw.sets)
    }
}

impl AliasConfig {
    /// Build a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when a set has no names or when the
    /// number of main sets is not exactly one.
    pub fn new(sets: Vec<AliasSet>) -> Result<Self, ConfigError> {
        let main = validate(&sets)?;
        Ok(Self { sets, main })
    }

    /// Card search aliases: card name (main), quantity and container.
    pub fn cards() -> Self {
        Self {
            sets: vec![
                AliasSet::main(["card", "name", "cardname"]),
                AliasSet::new(["qty", "quantity"]),
                AliasSet::new(["is", "c", "cont", "container"]),
            ],
            main: 0,
        }
    }

    /// Loads configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parses and validates configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let raw: RawAliasConfig = toml::from_str(s)?;
        Self::new(raw.sets)
    }

    pub fn sets(&self) -> &[AliasSet] {
        &self.sets
    }

    /// The main alias set.
    pub fn main(&self) -> &AliasSet {
        &self.sets[self.main]
    }

    /// Resolve a raw parameter name to its canonical field.
    ///
    /// The first matching set wins when aliases overlap.
    pub fn resolve(&self, raw: &str) -> Parameter {
        match self.sets.iter().find(|set| set.matches(raw)) {
            Some(set) => Parameter::Canonical(set.canonical().to_string()),
            None => {
                trace!(parameter = raw, "no alias set matched");
                Parameter::Unresolved
            }
        }
    }

    /// Every alias, lowercased. Used by the tokenizer to spot clause keywords.
    pub fn keywords(&self) -> impl Iterator<Item = String> + '_ {
        self.sets.iter().flat_map(|set| set.names.iter()).map(|name| name.to_lowercase())
    }
}

/// Index of the single main set.
fn validate(sets: &[AliasSet]) -> Result<usize, ConfigError> {
    if let Some(empty) = sets.iter().position(|set| set.names.iter().all(|n| n.trim().is_empty())) {
        return Err(ConfigError::Invalid(format!("alias set {} has no names", empty + 1)));
    }
    let mut mains = sets.iter().enumerate().filter(|(_, set)| set.main).map(|(idx, _)| idx);
    match (mains.next(), mains.count()) {
        (Some(idx), 0) => Ok(idx),
        (None, _) => Err(ConfigError::Invalid("no alias set is marked main".to_string())),
        (Some(_), rest) => Err(ConfigError::Invalid(format!("{} alias sets are marked main, expected one", rest + 1))),
    }
}

impl Default for AliasConfig {
    fn default() -> Self {
        Self::cards()
    }
}
