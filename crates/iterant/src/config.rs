//! Names and markers injected by the `each` helper.
//!
//! The defaults follow the Handlebars convention: metadata variables are
//! prefixed with `@`, and boolean markers are strings that are non-empty
//! when the condition holds and empty otherwise.
//!
//! | Variable | Sequence | Record | Value |
//! |----------|----------|--------|-------|
//! | `@index` | yes | | zero-based position |
//! | `@index_1` | yes | | one-based position |
//! | `@first` | yes | yes | `"first"` or `""` |
//! | `@last` | yes | | `"last"` or `""` |
//! | `@odd` | yes | | `"odd"` or `""` |
//! | `@even` | yes | | `"even"` or `""` |
//! | `@key` | | yes | field name |
//!
//! Both tables can be overridden from YAML; omitted entries keep their
//! defaults:
//!
//! ```rust
//! use iterant::EachConfig;
//!
//! let config = EachConfig::from_yaml(r#"
//! vars:
//!   index: "@i"
//! markers:
//!   first: "yes"
//! "#).unwrap();
//!
//! assert_eq!(config.vars.index, "@i");
//! assert_eq!(config.vars.index_1, "@index_1");
//! assert_eq!(config.markers.first, "yes");
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{RenderError, Result};

/// Variable names injected into each child scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VarNames {
    pub index: String,
    pub index_1: String,
    pub first: String,
    pub last: String,
    pub odd: String,
    pub even: String,
    pub key: String,
}

impl Default for VarNames {
    fn default() -> Self {
        Self {
            index: "@index".into(),
            index_1: "@index_1".into(),
            first: "@first".into(),
            last: "@last".into(),
            odd: "@odd".into(),
            even: "@even".into(),
            key: "@key".into(),
        }
    }
}

/// Strings bound to a marker variable when its condition holds.
///
/// The empty string is reserved for "does not hold", so markers must be
/// non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Markers {
    pub first: String,
    pub last: String,
    pub odd: String,
    pub even: String,
}

impl Default for Markers {
    fn default() -> Self {
        Self {
            first: "first".into(),
            last: "last".into(),
            odd: "odd".into(),
            even: "even".into(),
        }
    }
}

/// Configuration for [`EachHelper`](crate::EachHelper).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EachConfig {
    pub vars: VarNames,
    pub markers: Markers,
}

impl EachConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses and validates a YAML configuration.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: EachConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Replaces the variable names.
    pub fn vars(mut self, vars: VarNames) -> Self {
        self.vars = vars;
        self
    }

    /// Replaces the marker strings.
    pub fn markers(mut self, markers: Markers) -> Self {
        self.markers = markers;
        self
    }

    /// Checks that no variable name or marker is empty.
    pub fn validate(&self) -> Result<()> {
        let vars = [
            ("index", &self.vars.index),
            ("index_1", &self.vars.index_1),
            ("first", &self.vars.first),
            ("last", &self.vars.last),
            ("odd", &self.vars.odd),
            ("even", &self.vars.even),
            ("key", &self.vars.key),
        ];
        if let Some((slot, _)) = vars.iter().find(|(_, name)| name.is_empty()) {
            return Err(RenderError::Config(format!(
                "variable name for '{}' is empty",
                slot
            )));
        }

        let markers = [
            ("first", &self.markers.first),
            ("last", &self.markers.last),
            ("odd", &self.markers.odd),
            ("even", &self.markers.even),
        ];
        if let Some((slot, _)) = markers.iter().find(|(_, marker)| marker.is_empty()) {
            return Err(RenderError::Config(format!(
                "marker for '{}' is empty",
                slot
            )));
        }

        Ok(())
    }
}
