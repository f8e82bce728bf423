// src/config.rs
//! Engine configuration loaded from TOML at startup.
//!
//! The clustering knobs are fixed in the reference pipeline; the config
//! file only exists so operators can tune them without a rebuild. A
//! missing file or missing keys fall back to the built-in defaults. Odd
//! values are hardened rather than rejected.

use serde::Deserialize;
use std::fs;
use std::path::PathBuf;

use crate::cluster::ClusterParams;

pub const DEFAULT_CONFIG_PATH: &str = "config/engine.toml";
pub const ENV_CONFIG_PATH: &str = "NARRATIVE_CONFIG_PATH";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub cluster: ClusterSection,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClusterSection {
    pub min_cluster_size: usize,
    pub similarity_threshold: f32,
    pub max_narratives: usize,
}

impl Default for ClusterSection {
    fn default() -> Self {
        let d = ClusterParams::default();
        Self {
            min_cluster_size: d.min_cluster_size,
            similarity_threshold: d.similarity_threshold,
            max_narratives: d.max_narratives,
        }
    }
}

impl EngineConfig {
    /// Load from `NARRATIVE_CONFIG_PATH` or the default path. A missing
    /// file is not an error; defaults apply.
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var(ENV_CONFIG_PATH)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH));

        match fs::read_to_string(&path) {
            Ok(content) => Self::from_toml_str(&content),
            Err(_) => Ok(Self::default()),
        }
    }

    /// Parse from a TOML string.
    pub fn from_toml_str(toml_str: &str) -> anyhow::Result<Self> {
        let mut cfg: EngineConfig = toml::from_str(toml_str)?;

        // harden: a zero/garbage threshold would glue everything together
        if !cfg.cluster.similarity_threshold.is_finite() || cfg.cluster.similarity_threshold <= 0.0
        {
            cfg.cluster.similarity_threshold = ClusterParams::default().similarity_threshold;
        }
        if cfg.cluster.min_cluster_size == 0 {
            cfg.cluster.min_cluster_size = ClusterParams::default().min_cluster_size;
        }
        if cfg.cluster.max_narratives == 0 {
            cfg.cluster.max_narratives = ClusterParams::default().max_narratives;
        }
        Ok(cfg)
    }

    pub fn cluster_params(&self) -> ClusterParams {
        ClusterParams {
            min_cluster_size: self.cluster.min_cluster_size,
            similarity_threshold: self.cluster.similarity_threshold,
            max_narratives: self.cluster.max_narratives,
        }
    }
}
