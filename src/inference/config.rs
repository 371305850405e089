use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

pub const TEXT_MODEL_DIR_NAME: &str = "bart-large-cnn";
pub const IMAGE_MODEL_DIR_NAME: &str = "detr-resnet-50";

/// Default score below which detections are dropped
pub const DEFAULT_DETECTION_THRESHOLD: f32 = 0.5;

#[derive(Debug, Error)]
pub enum ModelLoadError {
    #[error("could not determine home directory (neither HOME nor USERPROFILE is set)")]
    NoHomeDir,

    #[error("model files not found in {}. Expected:\n{}", .dir.display(), bullet_list(.missing))]
    MissingFiles { dir: PathBuf, missing: Vec<PathBuf> },

    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid model config {}: {source}", .path.display())]
    InvalidConfig {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

fn bullet_list(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| format!("  - {}", p.display()))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Where the models live and how they are run
#[derive(Debug, Clone)]
pub struct InferenceConfig {
    pub text_model_dir: PathBuf,
    pub image_model_dir: PathBuf,
    pub detection_threshold: f32,
}

impl InferenceConfig {
    /// Model directories under the standard cache location
    pub fn from_cache_dir() -> Result<Self, ModelLoadError> {
        let cache_dir = default_cache_dir()?;
        Ok(Self {
            text_model_dir: cache_dir.join(TEXT_MODEL_DIR_NAME),
            image_model_dir: cache_dir.join(IMAGE_MODEL_DIR_NAME),
            detection_threshold: DEFAULT_DETECTION_THRESHOLD,
        })
    }
}

/// `~/.cache/pipeline-desk`
pub fn default_cache_dir() -> Result<PathBuf, ModelLoadError> {
    let home_dir = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .map_err(|_| ModelLoadError::NoHomeDir)?;
    Ok(Path::new(&home_dir).join(".cache/pipeline-desk"))
}

/// Resolve `files` inside `dir`, failing with every missing path listed
pub fn require_files<const N: usize>(
    dir: &Path,
    files: [&str; N],
) -> Result<[PathBuf; N], ModelLoadError> {
    let paths = files.map(|name| dir.join(name));
    let missing: Vec<PathBuf> = paths.iter().filter(|p| !p.exists()).cloned().collect();
    if !missing.is_empty() {
        return Err(ModelLoadError::MissingFiles {
            dir: dir.to_path_buf(),
            missing,
        });
    }
    Ok(paths)
}

pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, ModelLoadError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ModelLoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| ModelLoadError::InvalidConfig {
        path: path.to_path_buf(),
        source,
    })
}

/// Generation settings from a BART `config.json`
#[derive(Debug, Clone, Deserialize)]
pub struct BartConfig {
    #[serde(default = "default_decoder_start")]
    pub decoder_start_token_id: u32,
    #[serde(default)]
    pub forced_bos_token_id: Option<u32>,
    #[serde(default = "default_eos")]
    pub eos_token_id: u32,
    #[serde(default = "default_max_length")]
    pub max_length: usize,
    #[serde(default)]
    pub min_length: usize,
    #[serde(default)]
    pub no_repeat_ngram_size: usize,
    #[serde(default = "default_max_positions")]
    pub max_position_embeddings: usize,
}

fn default_decoder_start() -> u32 {
    2
}

fn default_eos() -> u32 {
    2
}

fn default_max_length() -> usize {
    142
}

fn default_max_positions() -> usize {
    1024
}

/// Label table from a DETR `config.json`
#[derive(Debug, Clone, Deserialize)]
pub struct DetrConfig {
    #[serde(default)]
    pub id2label: HashMap<String, String>,
}

impl DetrConfig {
    pub fn label(&self, class_id: usize) -> String {
        self.id2label
            .get(&class_id.to_string())
            .cloned()
            .unwrap_or_else(|| format!("LABEL_{}", class_id))
    }
}
