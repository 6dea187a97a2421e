//! Layered settings: defaults, optional `config/{run_mode}` files, then
//! `RECAP__`-prefixed environment variables.

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Settings {
    pub github: GitHubConfig,
    pub openai: OpenAiSettings,
    pub memory: MemoryConfig,
    #[serde(default)]
    pub analysis: AnalysisConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct GitHubConfig {
    pub token: String,
    pub api_base: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct OpenAiSettings {
    pub api_key: String,
    pub model: String,
    pub api_base: String,
    pub timeout_seconds: u64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct MemoryConfig {
    /// Path of the single JSON document backing the memory store.
    pub path: String,
}

/// Structural-analysis policy knobs.
///
/// The complexity thresholds are policy constants, not physical laws; they are
/// exposed here so deployments can tune them.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AnalysisConfig {
    /// Chunk count above which a change is high complexity.
    pub high_chunks: usize,
    /// File count above which a change is high complexity.
    pub high_files: usize,
    /// Chunk count above which a change is at least medium complexity.
    pub medium_chunks: usize,
    /// File count above which a change is at least medium complexity.
    pub medium_files: usize,
    /// Glob patterns excluding diff entries from analysis entirely.
    #[serde(default)]
    pub exclude: Vec<String>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            high_chunks: 50,
            high_files: 10,
            medium_chunks: 20,
            medium_files: 5,
            exclude: Vec::new(),
        }
    }
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = Config::builder()
            .set_default("github.token", "")?
            .set_default("github.api_base", "https://api.github.com")?
            .set_default("openai.api_key", "")?
            .set_default("openai.model", "gpt-4o")?
            .set_default("openai.api_base", "https://api.openai.com/v1")?
            .set_default("openai.timeout_seconds", 60)?
            .set_default("memory.path", ".agent-memory.json")?
            .set_default("analysis.high_chunks", 50)?
            .set_default("analysis.high_files", 10)?
            .set_default("analysis.medium_chunks", 20)?
            .set_default("analysis.medium_files", 5)?
            .set_default("analysis.exclude", Vec::<String>::new())?
            .add_source(File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(File::with_name("config/local").required(false))
            .add_source(Environment::with_prefix("RECAP").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
