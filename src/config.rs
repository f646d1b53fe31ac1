//! Deploy-time configuration.
//!
//! Everything that shapes the emitted document is read from one JSON file so
//! that a scheduled run depends only on the config and the run date.
use crate::templates;
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_SCHEMA_VERSION: u32 = 1;
pub const DEFAULT_MAX_HISTORY_DAYS: u32 = 3000;
pub const DEFAULT_RESOURCE_ID_PREFIX: &str = "ZASOB";

/// Generator configuration as stored on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedConfig {
    pub schema_version: u32,
    /// Owner display name used in titles and descriptions.
    #[serde(default)]
    pub owner_name: String,
    /// Stable owner identifier; the dataset `extIdent`.
    #[serde(default)]
    pub owner_id: String,
    #[serde(default)]
    pub resource_base_url: String,
    #[serde(default)]
    pub data_filename: String,
    /// Days of history to keep; `null` keeps everything.
    #[serde(default = "default_max_history_days")]
    pub max_history_days: Option<u32>,
    #[serde(default = "default_resource_id_prefix")]
    pub resource_id_prefix: String,
    #[serde(default)]
    pub outputs: OutputPaths,
    #[serde(default)]
    pub dataset: DatasetMeta,
    #[serde(default)]
    pub resource: ResourceMeta,
    #[serde(default)]
    pub texts: Texts,
}

/// Artifact locations; relative entries resolve against the config directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputPaths {
    pub document: PathBuf,
    pub checksum: PathBuf,
    pub state: PathBuf,
}

impl Default for OutputPaths {
    fn default() -> Self {
        Self {
            document: PathBuf::from("dataset.xml"),
            checksum: PathBuf::from("dataset.md5"),
            state: PathBuf::from("history.json"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    pub lang: String,
    pub text: String,
}

/// Capability flags shared by the dataset and resource records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CapabilityFlags {
    pub has_dynamic_data: bool,
    pub has_high_value_data: bool,
    pub has_high_value_data_from_ec_list: bool,
    pub has_research_data: bool,
}

impl Default for CapabilityFlags {
    fn default() -> Self {
        Self {
            has_dynamic_data: false,
            has_high_value_data: true,
            has_high_value_data_from_ec_list: false,
            has_research_data: false,
        }
    }
}

/// Dataset-level fixed metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetMeta {
    pub category: String,
    pub update_frequency: String,
    pub tags: Vec<Tag>,
    pub flags: CapabilityFlags,
}

impl Default for DatasetMeta {
    fn default() -> Self {
        Self {
            category: "ECON".to_string(),
            update_frequency: "daily".to_string(),
            tags: vec![Tag {
                lang: "pl".to_string(),
                text: "Deweloper".to_string(),
            }],
            flags: CapabilityFlags::default(),
        }
    }
}

/// Resource-level fixed metadata, identical for every daily entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceMeta {
    pub availability: String,
    pub special_signs: Vec<String>,
    pub flags: CapabilityFlags,
    pub contains_protected_data: bool,
}

impl Default for ResourceMeta {
    fn default() -> Self {
        Self {
            availability: "local".to_string(),
            special_signs: vec!["X".to_string()],
            flags: CapabilityFlags::default(),
            contains_protected_data: false,
        }
    }
}

/// Polish/English text pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bilingual {
    pub polish: String,
    pub english: String,
}

impl Bilingual {
    fn new(polish: &str, english: &str) -> Self {
        Self {
            polish: polish.to_string(),
            english: english.to_string(),
        }
    }
}

/// Presentation templates; see [`templates`] for placeholders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Texts {
    pub dataset_title: Bilingual,
    pub dataset_description: Bilingual,
    pub resource_title: Bilingual,
    pub resource_description: Bilingual,
}

impl Default for Texts {
    fn default() -> Self {
        Self {
            dataset_title: Bilingual::new(templates::DATASET_TITLE_PL, templates::DATASET_TITLE_EN),
            dataset_description: Bilingual::new(
                templates::DATASET_DESCRIPTION_PL,
                templates::DATASET_DESCRIPTION_EN,
            ),
            resource_title: Bilingual::new(
                templates::RESOURCE_TITLE_PL,
                templates::RESOURCE_TITLE_EN,
            ),
            resource_description: Bilingual::new(
                templates::RESOURCE_DESCRIPTION_PL,
                templates::RESOURCE_DESCRIPTION_EN,
            ),
        }
    }
}

fn default_max_history_days() -> Option<u32> {
    Some(DEFAULT_MAX_HISTORY_DAYS)
}

fn default_resource_id_prefix() -> String {
    DEFAULT_RESOURCE_ID_PREFIX.to_string()
}

impl FeedConfig {
    /// URL of the externally hosted data file, joined with a single `/`.
    pub fn resource_url(&self) -> String {
        format!(
            "{}/{}",
            self.resource_base_url.trim_end_matches('/'),
            self.data_filename.trim_start_matches('/')
        )
    }
}

/// Build the config written by `init`; required fields are left blank
/// unless provided.
pub fn default_config(owner_name: Option<&str>, owner_id: Option<&str>) -> FeedConfig {
    FeedConfig {
        schema_version: CONFIG_SCHEMA_VERSION,
        owner_name: owner_name.unwrap_or_default().to_string(),
        owner_id: owner_id.unwrap_or_default().to_string(),
        resource_base_url: String::new(),
        data_filename: String::new(),
        max_history_days: default_max_history_days(),
        resource_id_prefix: default_resource_id_prefix(),
        outputs: OutputPaths::default(),
        dataset: DatasetMeta::default(),
        resource: ResourceMeta::default(),
        texts: Texts::default(),
    }
}

/// Load a config file.
pub fn load_config(path: &Path) -> Result<FeedConfig> {
    let bytes = fs::read(path).with_context(|| format!("read config {}", path.display()))?;
    let config: FeedConfig = serde_json::from_slice(&bytes)
        .with_context(|| format!("parse config JSON {}", path.display()))?;
    Ok(config)
}

/// Persist a config in a stable JSON format.
pub fn write_config(path: &Path, config: &FeedConfig) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
    }
    let mut text = serde_json::to_string_pretty(config).context("serialize config")?;
    text.push('\n');
    fs::write(path, text.as_bytes()).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

/// Reject configs that would produce an invalid document.
pub fn validate_config(config: &FeedConfig) -> Result<()> {
    if config.schema_version != CONFIG_SCHEMA_VERSION {
        return Err(anyhow!(
            "unsupported config schema_version {}",
            config.schema_version
        ));
    }
    for (label, value) in [
        ("owner_name", &config.owner_name),
        ("owner_id", &config.owner_id),
        ("resource_base_url", &config.resource_base_url),
        ("data_filename", &config.data_filename),
    ] {
        if value.trim().is_empty() {
            return Err(anyhow!("{label} must be non-empty"));
        }
    }
    if config.owner_id.chars().any(char::is_whitespace) {
        return Err(anyhow!(
            "owner_id must not contain whitespace (got {:?})",
            config.owner_id
        ));
    }
    if config.resource_id_prefix.chars().any(char::is_whitespace) {
        return Err(anyhow!(
            "resource_id_prefix must not contain whitespace (got {:?})",
            config.resource_id_prefix
        ));
    }
    for (label, path) in [
        ("outputs.document", &config.outputs.document),
        ("outputs.checksum", &config.outputs.checksum),
        ("outputs.state", &config.outputs.state),
    ] {
        if path.as_os_str().is_empty() {
            return Err(anyhow!("{label} must be non-empty"));
        }
    }
    let outputs = &config.outputs;
    if outputs.document == outputs.checksum
        || outputs.document == outputs.state
        || outputs.checksum == outputs.state
    {
        return Err(anyhow!("outputs.document, outputs.checksum and outputs.state must differ"));
    }
    Ok(())
}

/// Resolved artifact locations for one config file.
#[derive(Debug, Clone)]
pub struct FeedPaths {
    document: PathBuf,
    checksum: PathBuf,
    state: PathBuf,
}

impl FeedPaths {
    /// Resolve output paths relative to the directory holding the config.
    pub fn resolve(config_path: &Path, config: &FeedConfig) -> Self {
        let base = config_path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        Self {
            document: base.join(&config.outputs.document),
            checksum: base.join(&config.outputs.checksum),
            state: base.join(&config.outputs.state),
        }
    }

    /// Return the document artifact path.
    pub fn document_path(&self) -> &Path {
        &self.document
    }

    /// Return the checksum artifact path.
    pub fn checksum_path(&self) -> &Path {
        &self.checksum
    }

    /// Return the persisted history path.
    pub fn state_path(&self) -> &Path {
        &self.state
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
