//! Configuration of the candidate store keys for each [`CollectionKind`].
//!
//! Which keys a framework records its truth collections under differs between jobs (generation, simulation,
//! overlay, derivations), so the lists are configuration. They are read once at startup, typically from a JSON
//! file:
//!
//! ```json
//! {
//!     "main": ["TruthEvent", "G4Truth"],
//!     "first_pileup": ["TruthEvent_PU"],
//!     "second_pileup": ["TruthEvent_HighPtPU"],
//!     "third_pileup": ["TruthEvent_Cavern"]
//! }
//! ```
//!
//! Omitted kinds fall back to the built-in keys. Order matters: earlier keys are tried first.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use truthlink_barcode::CollectionKind;

use crate::error::TruthLinkError;
use crate::HashMap;

const DEFAULT_MAIN_KEYS: [&str; 5] = [
    "TruthEvent",
    "G4Truth",
    "GEN_AOD",
    "GEN_EVENT",
    "Bkg_TruthEvent",
];
const DEFAULT_FIRST_PILEUP_KEYS: [&str; 1] = ["TruthEvent_PU"];
const DEFAULT_SECOND_PILEUP_KEYS: [&str; 1] = ["TruthEvent_HighPtPU"];
const DEFAULT_THIRD_PILEUP_KEYS: [&str; 1] = ["TruthEvent_Cavern"];

fn to_strings(keys: &[&str]) -> Vec<String> {
    keys.iter().map(ToString::to_string).collect()
}

fn default_main() -> Vec<String> {
    to_strings(&DEFAULT_MAIN_KEYS)
}

fn default_first_pileup() -> Vec<String> {
    to_strings(&DEFAULT_FIRST_PILEUP_KEYS)
}

fn default_second_pileup() -> Vec<String> {
    to_strings(&DEFAULT_SECOND_PILEUP_KEYS)
}

fn default_third_pileup() -> Vec<String> {
    to_strings(&DEFAULT_THIRD_PILEUP_KEYS)
}

/// The ordered candidate keys for every defined [`CollectionKind`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegistryConfig {
    #[serde(default = "default_main")]
    pub main: Vec<String>,
    #[serde(default = "default_first_pileup")]
    pub first_pileup: Vec<String>,
    #[serde(default = "default_second_pileup")]
    pub second_pileup: Vec<String>,
    #[serde(default = "default_third_pileup")]
    pub third_pileup: Vec<String>,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            main: default_main(),
            first_pileup: default_first_pileup(),
            second_pileup: default_second_pileup(),
            third_pileup: default_third_pileup(),
        }
    }
}

impl RegistryConfig {
    /// Parses and validates a configuration.
    pub fn from_json_str(json: &str) -> Result<Self, TruthLinkError> {
        let config: RegistryConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a configuration file.
    pub fn from_json_file(path: &Path) -> Result<Self, TruthLinkError> {
        let json = fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// The configured keys for `kind`. `Undefined` has none.
    #[must_use]
    pub fn keys_for(&self, kind: CollectionKind) -> &[String] {
        match kind {
            CollectionKind::Main => &self.main,
            CollectionKind::FirstPileup => &self.first_pileup,
            CollectionKind::SecondPileup => &self.second_pileup,
            CollectionKind::ThirdPileup => &self.third_pileup,
            CollectionKind::Undefined => &[],
        }
    }

    /// Every defined kind needs at least one non-empty key, and a key may belong to only one kind, since keys are
    /// also used to look kinds up by collection name.
    pub fn validate(&self) -> Result<(), TruthLinkError> {
        let mut owners: HashMap<&str, CollectionKind> = HashMap::default();
        for kind in CollectionKind::ALL {
            let keys = self.keys_for(kind);
            if keys.is_empty() {
                return Err(TruthLinkError::ConfigError(format!(
                    "no candidate keys configured for collection kind {kind}"
                )));
            }
            for key in keys {
                if key.is_empty() {
                    return Err(TruthLinkError::ConfigError(format!(
                        "empty candidate key configured for collection kind {kind}"
                    )));
                }
                if let Some(owner) = owners.insert(key.as_str(), kind) {
                    return Err(TruthLinkError::ConfigError(format!(
                        "key {key:?} is configured for both {owner} and {kind}"
                    )));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn default_config_is_valid() {
        let config = RegistryConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.keys_for(CollectionKind::Main)[0], "TruthEvent");
        assert_eq!(
            config.keys_for(CollectionKind::ThirdPileup),
            ["TruthEvent_Cavern".to_string()]
        );
        assert!(config.keys_for(CollectionKind::Undefined).is_empty());
    }

    #[test]
    fn omitted_kinds_use_defaults() {
        let config = RegistryConfig::from_json_str(r#"{ "main": ["MyTruth"] }"#).unwrap();
        assert_eq!(config.main, vec!["MyTruth".to_string()]);
        assert_eq!(config.first_pileup, default_first_pileup());
    }

    #[test]
    fn rejects_empty_kind() {
        let result = RegistryConfig::from_json_str(r#"{ "first_pileup": [] }"#);
        assert!(matches!(result, Err(TruthLinkError::ConfigError(_))));
    }

    #[test]
    fn rejects_shared_key() {
        let result =
            RegistryConfig::from_json_str(r#"{ "main": ["TruthEvent", "TruthEvent_PU"] }"#);
        match result {
            Err(TruthLinkError::ConfigError(msg)) => {
                assert!(msg.contains("TruthEvent_PU"), "{msg}");
            }
            other => panic!("expected a configuration error, got {other:?}"),
        }
    }

    #[test]
    fn rejects_unknown_fields() {
        let result = RegistryConfig::from_json_str(r#"{ "fourth_pileup": ["X"] }"#);
        assert!(matches!(result, Err(TruthLinkError::JsonError(_))));
    }

    #[test]
    fn reads_config_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{ "main": ["A", "B"], "first_pileup": ["C"], "second_pileup": ["D"], "third_pileup": ["E"] }}"#
        )
        .unwrap();

        let config = RegistryConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config.keys_for(CollectionKind::Main), ["A".to_string(), "B".to_string()]);
        assert_eq!(config.keys_for(CollectionKind::ThirdPileup), ["E".to_string()]);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = RegistryConfig::from_json_file(&dir.path().join("missing.json"));
        assert!(matches!(result, Err(TruthLinkError::IoError(_))));
    }
}
