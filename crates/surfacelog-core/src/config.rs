//! Generation run configuration.
//!
//! Every field has a default, so an empty JSON object is a valid config.
//! Reading the document from disk is left to the caller.

use crate::changelog::{
    ChangelogStrategy, DeclaredVersionStrategy, DisabledStrategy, IdentityStrategy,
};
use crate::errors::{Result, SurfacelogError};
use serde::{Deserialize, Serialize};

/// Which built-in grouping strategy a run uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    #[default]
    Identity,
    DeclaredVersion,
    Disabled,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ChangelogConfig {
    pub strategy: StrategyKind,
    /// Field holding an entity's stable identity.
    pub identity_field: String,
    /// Type discriminator used to pick a layout.
    pub kind_field: String,
    /// Field the changelog is attached under.
    pub changelog_field: String,
    /// Field stamped with the release batch version by the identity strategy.
    pub release_version_field: String,
    /// Declared version field, used by the declared-version strategy.
    pub version_field: String,
    pub expand_ordered_arrays: bool,
}

impl Default for ChangelogConfig {
    fn default() -> Self {
        Self {
            strategy: StrategyKind::default(),
            identity_field: "uuid".to_string(),
            kind_field: "kind".to_string(),
            changelog_field: "changelog".to_string(),
            release_version_field: "releaseVersion".to_string(),
            version_field: "version".to_string(),
            expand_ordered_arrays: true,
        }
    }
}

impl ChangelogConfig {
    /// Parse a JSON config document.
    ///
    /// # Errors
    ///
    /// `InvalidConfig` on malformed JSON, unknown keys, or an empty field name.
    pub fn from_json_str(s: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(s).map_err(|e| SurfacelogError::InvalidConfig {
                message: e.to_string(),
            })?;
        config.validate()?;
        Ok(config)
    }

    /// # Errors
    ///
    /// `InvalidConfig` if any field name is empty.
    pub fn validate(&self) -> Result<()> {
        let names = [
            ("identity_field", &self.identity_field),
            ("kind_field", &self.kind_field),
            ("changelog_field", &self.changelog_field),
            ("release_version_field", &self.release_version_field),
            ("version_field", &self.version_field),
        ];
        match names.iter().find(|(_, value)| value.is_empty()) {
            Some((name, _)) => Err(SurfacelogError::InvalidConfig {
                message: format!("{name} must not be empty"),
            }),
            None => Ok(()),
        }
    }

    pub fn build_strategy(&self) -> Box<dyn ChangelogStrategy> {
        match self.strategy {
            StrategyKind::Identity => Box::new(IdentityStrategy::new(
                self.identity_field.clone(),
                self.release_version_field.clone(),
            )),
            StrategyKind::DeclaredVersion => Box::new(DeclaredVersionStrategy::new(
                self.identity_field.clone(),
                self.version_field.clone(),
            )),
            StrategyKind::Disabled => Box::new(DisabledStrategy),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_is_default() {
        assert_eq!(
            ChangelogConfig::from_json_str("{}").unwrap(),
            ChangelogConfig::default()
        );
    }

    #[test]
    fn test_build_strategy_uses_configured_fields() {
        let config = ChangelogConfig::from_json_str(
            r#"{"strategy": "declared_version", "version_field": "apiVersion"}"#,
        )
        .unwrap();
        let strategy = config.build_strategy();
        assert_eq!(strategy.name(), "declared_version");
        assert_eq!(strategy.version_key(), "apiVersion");

        assert_eq!(ChangelogConfig::default().build_strategy().version_key(), "releaseVersion");
    }

    #[test]
    fn test_unknown_key_rejected() {
        let err = ChangelogConfig::from_json_str(r#"{"stratgy": "identity"}"#).unwrap_err();
        assert!(matches!(err, SurfacelogError::InvalidConfig { .. }));
    }

    #[test]
    fn test_empty_field_name_rejected() {
        let err = ChangelogConfig::from_json_str(r#"{"kind_field": ""}"#).unwrap_err();
        assert_eq!(
            err,
            SurfacelogError::InvalidConfig {
                message: "kind_field must not be empty".to_string()
            }
        );
    }
}
