//! Generator configuration.
//!
//! [`Settings`] mirrors the editor's `dart-data-class-generator.*` keys and
//! [`ProjectInfo`] holds the facts probed once from `pubspec.yaml`. Both are
//! bundled into an immutable [`Config`] that callers build at startup and
//! pass by reference.

use crate::error::DataClassError;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

pub const SETTINGS_PREFIX: &str = "dart-data-class-generator.";

/// How serialization keys are derived from member names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum KeyFormat {
    #[default]
    #[serde(rename = "default")]
    Default,
    #[serde(rename = "snake_case")]
    SnakeCase,
    #[serde(rename = "camelCase")]
    CamelCase,
}

/// Whether classes inferred from JSON go into one file or one file each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeparatePolicy {
    #[default]
    Ask,
    Separate,
    Single,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    #[serde(rename = "constructor.enabled")]
    pub constructor:           bool,
    #[serde(rename = "constructor.default_values")]
    pub constructor_defaults:  bool,
    #[serde(rename = "init.enabled")]
    pub init:                  bool,
    #[serde(rename = "copyWith.enabled")]
    pub copy_with:             bool,
    #[serde(rename = "copyWith.usesValueGetter")]
    pub copy_with_value_getter: bool,
    #[serde(rename = "toMap.enabled")]
    pub to_map:                bool,
    #[serde(rename = "fromMap.enabled")]
    pub from_map:              bool,
    /// Import added wherever generated `fromMap` code uses `ParsingUtils`.
    #[serde(rename = "fromMap.parsing_utils_import")]
    pub parsing_utils_import:  Option<String>,
    #[serde(rename = "toJson.enabled")]
    pub to_json:               bool,
    #[serde(rename = "fromJson.enabled")]
    pub from_json:             bool,
    #[serde(rename = "toString.enabled")]
    pub to_string:             bool,
    #[serde(rename = "equality.enabled")]
    pub equality:              bool,
    #[serde(rename = "hashCode.enabled")]
    pub hash_code:             bool,
    #[serde(rename = "hashCode.use_jenkins")]
    pub hash_code_jenkins:     bool,
    #[serde(rename = "useEquatable")]
    pub use_equatable:         bool,
    #[serde(rename = "override.manual")]
    pub override_manual:       bool,
    #[serde(rename = "quick_fixes")]
    pub quick_fixes:           bool,
    #[serde(rename = "json.key_format")]
    pub key_format:            KeyFormat,
    #[serde(rename = "json.separate")]
    pub separate:              SeparatePolicy,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            constructor:            true,
            constructor_defaults:   false,
            init:                   true,
            copy_with:              true,
            copy_with_value_getter: false,
            to_map:                 true,
            from_map:               true,
            parsing_utils_import:   None,
            to_json:                true,
            from_json:              true,
            to_string:              true,
            equality:               true,
            hash_code:              true,
            hash_code_jenkins:      false,
            use_equatable:          false,
            override_manual:        false,
            quick_fixes:            true,
            key_format:             KeyFormat::Default,
            separate:               SeparatePolicy::Ask,
        }
    }
}

impl Settings {
    /// Parses a JSON object of settings. Keys may carry the
    /// `dart-data-class-generator.` prefix; unrelated keys are ignored.
    pub fn from_json_str(text: &str) -> Result<Self, DataClassError> {
        let value: Value = serde_json::from_str(text)?;
        let Value::Object(entries) = value else {
            return Err(DataClassError::Settings(
                "expected a JSON object at the top level".to_string(),
            ));
        };

        let mut own = Map::new();
        for (key, value) in entries {
            let key = key.strip_prefix(SETTINGS_PREFIX).unwrap_or(&key).to_string();
            own.insert(key, value);
        }

        serde_json::from_value(Value::Object(own))
            .map_err(|e| DataClassError::Settings(e.to_string()))
    }

    pub fn from_file(path: &Path) -> Result<Self, DataClassError> {
        let text = fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Boolean lookup by dotted key, `false` for unknown keys.
    pub fn flag(&self, key: &str) -> bool {
        match key {
            "constructor.enabled" => self.constructor,
            "constructor.default_values" => self.constructor_defaults,
            "init.enabled" => self.init,
            "copyWith.enabled" => self.copy_with,
            "copyWith.usesValueGetter" => self.copy_with_value_getter,
            "toMap.enabled" => self.to_map,
            "fromMap.enabled" => self.from_map,
            "toJson.enabled" => self.to_json,
            "fromJson.enabled" => self.from_json,
            "toString.enabled" => self.to_string,
            "equality.enabled" => self.equality,
            "hashCode.enabled" => self.hash_code,
            "hashCode.use_jenkins" => self.hash_code_jenkins,
            "useEquatable" => self.use_equatable,
            "override.manual" => self.override_manual,
            "quick_fixes" => self.quick_fixes,
            _ => false,
        }
    }

    /// True if at least one of `keys` is enabled.
    pub fn any_flag(&self, keys: &[&str]) -> bool {
        keys.iter().any(|key| self.flag(key))
    }
}

/// The parts of `pubspec.yaml` the generator cares about.
#[derive(Debug, Deserialize)]
struct Pubspec {
    name:         Option<String>,
    dependencies: Option<serde_yaml::Value>,
}

/// Facts about the surrounding Dart project.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectInfo {
    pub name:       Option<String>,
    pub is_flutter: bool,
}

impl ProjectInfo {
    /// Reads `pubspec.yaml` from `dir`. A missing manifest is not an error:
    /// the project name then falls back to the directory name.
    pub fn probe(dir: &Path) -> Result<Self, DataClassError> {
        let pubspec = dir.join("pubspec.yaml");
        let mut info = if pubspec.is_file() {
            Self::from_pubspec(&fs::read_to_string(&pubspec)?)
        } else {
            Self::default()
        };

        if info.name.is_none() {
            info.name = dir
                .file_name()
                .map(|name| name.to_string_lossy().replace('-', "_"));
        }

        debug!(name = ?info.name, is_flutter = info.is_flutter, "probed project");
        Ok(info)
    }

    /// Reads the project name and whether `flutter` is an SDK dependency.
    /// A manifest that isn't valid YAML yields nothing.
    pub fn from_pubspec(content: &str) -> Self {
        if content.trim().is_empty() {
            return Self::default();
        }
        let pubspec: Pubspec = match serde_yaml::from_str(content) {
            Ok(Some(pubspec)) => pubspec,
            Ok(None) => return Self::default(),
            Err(e) => {
                warn!(error = %e, "ignoring malformed pubspec.yaml");
                return Self::default();
            }
        };

        let is_flutter = pubspec
            .dependencies
            .as_ref()
            .and_then(|deps| deps.get("flutter"))
            .and_then(|flutter| flutter.get("sdk"))
            .and_then(serde_yaml::Value::as_str)
            == Some("flutter");

        Self {
            name: pubspec.name.map(|name| name.trim().to_string()).filter(|name| !name.is_empty()),
            is_flutter,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Config {
    pub settings: Settings,
    pub project:  ProjectInfo,
}

impl Config {
    pub fn new(settings: Settings, project: ProjectInfo) -> Self {
        Self { settings, project }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_enable_every_member() {
        let s = Settings::default();
        assert!(s.constructor && s.copy_with && s.to_map && s.from_map);
        assert!(s.to_json && s.from_json && s.to_string && s.equality && s.hash_code);
        assert!(!s.use_equatable);
        assert_eq!(s.separate, SeparatePolicy::Ask);
    }

    #[test]
    fn test_settings_accept_prefixed_keys() {
        let s = Settings::from_json_str(
            r#"{
                "dart-data-class-generator.toString.enabled": false,
                "json.key_format": "snake_case",
                "dart-data-class-generator.json.separate": "single",
                "editor.tabSize": 2
            }"#,
        )
        .unwrap();
        assert!(!s.to_string);
        assert!(s.copy_with);
        assert!(s.init);
        assert_eq!(s.key_format, KeyFormat::SnakeCase);
        assert_eq!(s.separate, SeparatePolicy::Single);
        assert!(!s.flag("toString.enabled"));
        assert!(s.any_flag(&["toString.enabled", "toMap.enabled"]));
    }

    #[test]
    fn test_settings_reject_non_objects() {
        assert!(matches!(
            Settings::from_json_str("[1, 2]"),
            Err(DataClassError::Settings(_))
        ));
    }

    #[test]
    fn test_pubspec_probe() {
        let info = ProjectInfo::from_pubspec(
            "name: my_app\ndependencies:\n  flutter:\n    sdk: flutter\n",
        );
        assert_eq!(info.name.as_deref(), Some("my_app"));
        assert!(info.is_flutter);

        let plain = ProjectInfo::from_pubspec("name: cli_tool\nenvironment:\n  sdk: '>=3.0.0'\n");
        assert_eq!(plain.name.as_deref(), Some("cli_tool"));
        assert!(!plain.is_flutter);

        let quoted = ProjectInfo::from_pubspec(
            "# sdk: flutter\nname: 'app'\nflutter:\n  uses-material-design: true\n",
        );
        assert_eq!(quoted.name.as_deref(), Some("app"));
        assert!(!quoted.is_flutter);

        let hosted = ProjectInfo::from_pubspec("name: pkg\ndependencies:\n  flutter: ^1.0.0\n");
        assert!(!hosted.is_flutter);

        assert_eq!(ProjectInfo::from_pubspec(""), ProjectInfo::default());
        assert_eq!(ProjectInfo::from_pubspec("name: [unclosed"), ProjectInfo::default());
    }
}
