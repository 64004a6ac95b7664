use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::pipeline::DEFAULT_EXTENSIONS;

/// Run configuration, loadable from YAML. CLI flags override these values.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunCfg {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    /// Style name, or "random" for a fresh draw per image.
    pub style: String,
    /// Pool used by "random"; empty means all styles.
    pub styles: Vec<String>,
    pub extensions: Vec<String>,
    pub max_images: Option<usize>,
    pub seed: u64,
    /// 0 means one worker per CPU.
    pub concurrency: usize,
}

impl Default for RunCfg {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("input"),
            output_dir: PathBuf::from("output"),
            style: "random".to_owned(),
            styles: Vec::new(),
            extensions: DEFAULT_EXTENSIONS.iter().map(|s| s.to_string()).collect(),
            max_images: None,
            seed: 42,
            concurrency: 0,
        }
    }
}

pub fn load(path: &Path) -> anyhow::Result<RunCfg> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read config {}", path.display()))?;
    serde_yaml::from_str(&raw).with_context(|| format!("malformed config {}", path.display()))
}
