use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::content::ContentContext;
use crate::error::{CriError, Result};
use crate::importer::{ImporterOptions, MappingOptions, SkipPolicy};
use crate::preset::{PART_NAME_KEY, PRESET_NAME_KEY, PartSettings};

/// Default config file name inside the cri root.
pub const CONFIG_FILE_NAME: &str = "cri.toml";
/// Default database file name inside the cri root.
pub const DATABASE_FILE_NAME: &str = "cri.db";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub context: ContentContext,
    #[serde(default)]
    pub presets: BTreeMap<String, PresetConfig>,
    /// Directory relative source paths are resolved against.
    #[serde(skip)]
    pub base_dir: PathBuf,
}

impl Config {
    /// Load `<root>/cri.toml` (or `explicit_path`), then apply `CRI_*`
    /// environment overrides. A missing file yields the defaults.
    pub fn load(explicit_path: Option<&Path>, root: &Path) -> Result<Self> {
        let path = explicit_path.map_or_else(|| root.join(CONFIG_FILE_NAME), PathBuf::from);
        let mut config = Self {
            base_dir: path
                .parent()
                .filter(|parent| !parent.as_os_str().is_empty())
                .map_or_else(|| PathBuf::from("."), Path::to_path_buf),
            ..Self::default()
        };

        if let Some(patch) = Self::load_patch(&path)? {
            config.merge_patch(patch);
        } else {
            tracing::debug!(path = %path.display(), "config file not found, using defaults");
        }

        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    fn load_patch(path: &Path) -> Result<Option<ConfigPatch>> {
        if !path.exists() {
            return Ok(None);
        }

        let raw = std::fs::read_to_string(path)
            .map_err(|err| CriError::Config(format!("read config {}: {err}", path.display())))?;
        let patch = toml::from_str(&raw)
            .map_err(|err| CriError::Config(format!("parse config {}: {err}", path.display())))?;
        Ok(Some(patch))
    }

    fn merge_patch(&mut self, patch: ConfigPatch) {
        if let Some(patch) = patch.database {
            self.database.merge(patch);
        }
        if let Some(patch) = patch.context {
            if let Some(value) = patch.workspace_name {
                self.context.workspace_name = value;
            }
            if let Some(value) = patch.invisible_content_shown {
                self.context.invisible_content_shown = value;
            }
        }
        if let Some(presets) = patch.presets {
            self.presets.extend(presets);
        }
    }

    fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(value) = lookup("CRI_DATABASE_PATH") {
            self.database.path = Some(PathBuf::from(value));
        }
        if let Some(value) = lookup("CRI_WORKSPACE") {
            if value.trim().is_empty() {
                return Err(CriError::Config("CRI_WORKSPACE must not be empty".to_string()));
            }
            self.context.workspace_name = value;
        }
        if let Some(value) = lookup("CRI_INVISIBLE_CONTENT_SHOWN") {
            self.context.invisible_content_shown = parse_bool("CRI_INVISIBLE_CONTENT_SHOWN", &value)?;
        }
        Ok(())
    }

    /// Database file, relative paths resolved against `root`.
    pub fn database_path(&self, root: &Path) -> PathBuf {
        match &self.database.path {
            Some(path) if path.is_absolute() => path.clone(),
            Some(path) => root.join(path),
            None => root.join(DATABASE_FILE_NAME),
        }
    }

    pub fn preset(&self, name: &str) -> Result<&PresetConfig> {
        self.presets
            .get(name)
            .ok_or_else(|| CriError::PresetNotFound(name.to_string()))
    }

    pub fn part(&self, preset: &str, part: &str) -> Result<&PartConfig> {
        self.preset(preset)?
            .parts
            .iter()
            .find(|candidate| candidate.name == part)
            .ok_or_else(|| CriError::PartNotFound {
                preset: preset.to_string(),
                part: part.to_string(),
            })
    }

    /// Source file of `part`, relative paths resolved against the config
    /// file directory.
    pub fn source_path(&self, part: &PartConfig) -> PathBuf {
        if part.source.is_absolute() {
            part.source.clone()
        } else {
            self.base_dir.join(&part.source)
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Database file; defaults to `<root>/cri.db`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

impl DatabaseConfig {
    fn merge(&mut self, patch: DatabasePatch) {
        if let Some(path) = patch.path {
            self.path = Some(path);
        }
    }
}

/// A named group of parts imported together.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PresetConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Parts in import order.
    #[serde(default)]
    pub parts: Vec<PartConfig>,
}

/// One part of a preset.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartConfig {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Importer kind; `<preset>.<part>` when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub importer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch_size: Option<u64>,
    pub source: PathBuf,
    pub site_node_path: String,
    #[serde(default)]
    pub storage_path: String,
    pub node_type: String,
    pub identifier_field: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_name_field: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label_field: Option<String>,
    /// Node property name to record field.
    #[serde(default)]
    pub properties: BTreeMap<String, String>,
    #[serde(default = "default_true")]
    pub skip_existing_node: bool,
    #[serde(default = "default_true")]
    pub skip_already_processed: bool,
}

const fn default_true() -> bool {
    true
}

impl PartConfig {
    /// Reject parts whose required mapping keys are blank.
    pub fn validate(&self) -> Result<()> {
        let required = [
            ("siteNodePath", &self.site_node_path),
            ("nodeType", &self.node_type),
            ("identifierField", &self.identifier_field),
        ];
        for (key, value) in required {
            if value.trim().is_empty() {
                return Err(CriError::MissingConfig(format!("{key} of part {}", self.name)));
            }
        }
        Ok(())
    }

    /// Flat settings for a part definition, carrying the preset and part
    /// identity under the reserved keys.
    pub fn settings(&self, preset: &str) -> Result<PartSettings> {
        let mut settings = match serde_json::to_value(self)? {
            Value::Object(map) => map,
            _ => PartSettings::new(),
        };
        settings.insert(PRESET_NAME_KEY.to_string(), Value::String(preset.to_string()));
        settings.insert(PART_NAME_KEY.to_string(), Value::String(self.name.clone()));
        Ok(settings)
    }

    pub fn importer_kind(&self, preset: &str) -> String {
        self.importer
            .clone()
            .unwrap_or_else(|| format!("{preset}.{}", self.name))
    }

    pub fn importer_options(&self, context: &ContentContext) -> ImporterOptions {
        ImporterOptions {
            site_node_path: self.site_node_path.clone(),
            context: context.clone(),
        }
    }

    pub fn mapping(&self) -> MappingOptions {
        MappingOptions {
            storage_path: self.storage_path.clone(),
            node_type: self.node_type.clone(),
            identifier_field: self.identifier_field.clone(),
            node_name_field: self.node_name_field.clone(),
            label_field: self.label_field.clone(),
            properties: self.properties.clone(),
            skip: SkipPolicy {
                skip_existing_node: self.skip_existing_node,
                skip_already_processed: self.skip_already_processed,
            },
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
struct ConfigPatch {
    pub database: Option<DatabasePatch>,
    pub context: Option<ContextPatch>,
    pub presets: Option<BTreeMap<String, PresetConfig>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct DatabasePatch {
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct ContextPatch {
    pub workspace_name: Option<String>,
    pub invisible_content_shown: Option<bool>,
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(CriError::Config(format!("invalid {key} value {value}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    const SAMPLE: &str = r#"
[database]
path = "data/import.db"

[context]
workspace_name = "staging"

[presets.catalog]
label = "Catalog"

[[presets.catalog.parts]]
name = "categories"
source = "categories.json"
siteNodePath = "/sites/demo"
storagePath = "categories"
nodeType = "category"
identifierField = "id"

[[presets.catalog.parts]]
name = "products"
label = "Products"
importer = "ProductImporter"
batchSize = 50
source = "feeds/products.jsonl"
siteNodePath = "/sites/demo"
storagePath = "catalog/products"
nodeType = "product"
identifierField = "sku"
labelField = "title"
skipExistingNode = false

[presets.catalog.parts.properties]
title = "title"
price = "price"
"#;

    fn write_sample(dir: &Path) -> PathBuf {
        let path = dir.join(CONFIG_FILE_NAME);
        std::fs::write(&path, SAMPLE).unwrap();
        path
    }

    fn no_env(_: &str) -> Option<String> {
        None
    }

    // =========================================================================
    // Loading
    // =========================================================================

    #[test]
    fn missing_file_yields_defaults() {
        let temp = TempDir::new().unwrap();
        let config = Config::load(None, temp.path()).unwrap();

        assert!(config.presets.is_empty());
        assert_eq!(config.context, ContentContext::default());
        assert_eq!(config.database_path(temp.path()), temp.path().join("cri.db"));
    }

    #[test]
    fn loads_presets_in_part_order() {
        let temp = TempDir::new().unwrap();
        write_sample(temp.path());
        let config = Config::load(None, temp.path()).unwrap();

        let preset = config.preset("catalog").unwrap();
        let names: Vec<&str> = preset.parts.iter().map(|part| part.name.as_str()).collect();
        assert_eq!(names, vec!["categories", "products"]);
        assert_eq!(config.context.workspace_name, "staging");
        assert!(config.context.invisible_content_shown);
        assert_eq!(
            config.database_path(temp.path()),
            temp.path().join("data/import.db")
        );
    }

    #[test]
    fn explicit_path_sets_source_base() {
        let temp = TempDir::new().unwrap();
        let path = write_sample(temp.path());
        let config = Config::load(Some(path.as_path()), Path::new("/elsewhere")).unwrap();

        let part = config.part("catalog", "products").unwrap();
        assert_eq!(
            config.source_path(part),
            temp.path().join("feeds/products.jsonl")
        );
    }

    #[test]
    fn invalid_toml_is_config_error() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join(CONFIG_FILE_NAME), "[presets.catalog\n").unwrap();

        let err = Config::load(None, temp.path()).unwrap_err();
        assert!(matches!(err, CriError::Config(msg) if msg.contains("parse config")));
    }

    #[test]
    fn missing_required_part_field_is_config_error() {
        let temp = TempDir::new().unwrap();
        std::fs::write(
            temp.path().join(CONFIG_FILE_NAME),
            "[[presets.catalog.parts]]\nname = \"products\"\n",
        )
        .unwrap();

        let err = Config::load(None, temp.path()).unwrap_err();
        assert!(matches!(err, CriError::Config(_)));
    }

    // =========================================================================
    // Lookup
    // =========================================================================

    #[test]
    fn unknown_preset_and_part() {
        let temp = TempDir::new().unwrap();
        write_sample(temp.path());
        let config = Config::load(None, temp.path()).unwrap();

        assert!(matches!(
            config.preset("missing").unwrap_err(),
            CriError::PresetNotFound(name) if name == "missing"
        ));
        assert!(matches!(
            config.part("catalog", "missing").unwrap_err(),
            CriError::PartNotFound { .. }
        ));
    }

    // =========================================================================
    // Part conversion
    // =========================================================================

    #[test]
    fn part_settings_carry_identity_keys() {
        let temp = TempDir::new().unwrap();
        write_sample(temp.path());
        let config = Config::load(None, temp.path()).unwrap();
        let part = config.part("catalog", "products").unwrap();

        let settings = part.settings("catalog").unwrap();
        assert_eq!(settings[PRESET_NAME_KEY], "catalog");
        assert_eq!(settings[PART_NAME_KEY], "products");
        assert_eq!(settings["batchSize"], 50);
        assert_eq!(settings["label"], "Products");
    }

    #[test]
    fn importer_kind_defaults_to_preset_and_part() {
        let temp = TempDir::new().unwrap();
        write_sample(temp.path());
        let config = Config::load(None, temp.path()).unwrap();

        assert_eq!(
            config.part("catalog", "products").unwrap().importer_kind("catalog"),
            "ProductImporter"
        );
        assert_eq!(
            config.part("catalog", "categories").unwrap().importer_kind("catalog"),
            "catalog.categories"
        );
    }

    #[test]
    fn blank_required_key_is_missing_config() {
        let temp = TempDir::new().unwrap();
        write_sample(temp.path());
        let config = Config::load(None, temp.path()).unwrap();
        let mut part = config.part("catalog", "products").unwrap().clone();
        assert!(part.validate().is_ok());

        part.identifier_field = " ".to_string();
        let err = part.validate().unwrap_err();
        assert!(matches!(err, CriError::MissingConfig(key) if key.starts_with("identifierField")));
    }

    #[test]
    fn mapping_reflects_part() {
        let temp = TempDir::new().unwrap();
        write_sample(temp.path());
        let config = Config::load(None, temp.path()).unwrap();
        let mapping = config.part("catalog", "products").unwrap().mapping();

        assert_eq!(mapping.storage_path, "catalog/products");
        assert_eq!(mapping.label_field.as_deref(), Some("title"));
        assert_eq!(mapping.properties.len(), 2);
        assert!(!mapping.skip.skip_existing_node);
        assert!(mapping.skip.skip_already_processed);
    }

    // =========================================================================
    // Environment overrides
    // =========================================================================

    #[test]
    fn env_overrides_apply() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("CRI_DATABASE_PATH", "/tmp/other.db"),
            ("CRI_WORKSPACE", "user-admin"),
            ("CRI_INVISIBLE_CONTENT_SHOWN", "off"),
        ]);
        let mut config = Config::default();
        config
            .apply_env_overrides(|key| vars.get(key).map(ToString::to_string))
            .unwrap();

        assert_eq!(config.database_path(Path::new("/root")), PathBuf::from("/tmp/other.db"));
        assert_eq!(config.context.workspace_name, "user-admin");
        assert!(!config.context.invisible_content_shown);
    }

    #[test]
    fn env_override_rejects_bad_bool() {
        let mut config = Config::default();
        let err = config
            .apply_env_overrides(|key| {
                (key == "CRI_INVISIBLE_CONTENT_SHOWN").then(|| "maybe".to_string())
            })
            .unwrap_err();
        assert!(matches!(err, CriError::Config(_)));
    }

    #[test]
    fn no_env_leaves_defaults() {
        let mut config = Config::default();
        config.apply_env_overrides(no_env).unwrap();
        assert_eq!(config.context, ContentContext::default());
    }
}
