use std::fs;
use std::path::{Path, PathBuf};

use planlens::{AlignStrategy, CostKnobs, ExplainerOptions, NormalizerOptions};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Effective CLI configuration: file values layered over library defaults.
#[derive(Debug)]
pub struct CliConfig {
    path: Option<PathBuf>,
    loaded: bool,
    options: ExplainerOptions,
}

impl CliConfig {
    pub fn load(explicit: Option<PathBuf>) -> Result<Self, ConfigError> {
        let path = explicit.or_else(default_config_path);
        let (data, loaded) = match path.as_ref() {
            Some(config_path) if config_path.exists() => (read_file(config_path)?, true),
            _ => (RawConfig::default(), false),
        };
        let options = resolve(&data)?;
        Ok(Self {
            path,
            loaded,
            options,
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Whether a file was found and read.
    pub fn loaded(&self) -> bool {
        self.loaded
    }

    pub fn options(&self) -> &ExplainerOptions {
        &self.options
    }

    /// The effective settings in the file's own layout.
    pub fn to_raw(&self) -> RawConfig {
        RawConfig {
            knobs: KnobsSection {
                baseline: Some(self.options.baseline),
                alternatives: Some(self.options.alternatives.clone()),
            },
            align: AlignSection {
                strategy: Some(self.options.strategy.as_str().to_string()),
            },
            limits: LimitsSection {
                max_visits: Some(self.options.normalizer.max_visits),
                max_depth: Some(self.options.normalizer.max_depth),
            },
        }
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(&self.to_raw()).map_err(|source| ConfigError::Serialize { source })
    }
}

fn read_file(path: &Path) -> Result<RawConfig, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn resolve(data: &RawConfig) -> Result<ExplainerOptions, ConfigError> {
    let defaults = ExplainerOptions::default();

    let baseline = data.knobs.baseline.unwrap_or(defaults.baseline);
    check_knobs("baseline", baseline)?;

    let alternatives = data
        .knobs
        .alternatives
        .clone()
        .unwrap_or(defaults.alternatives);
    for (position, knobs) in alternatives.iter().enumerate() {
        check_knobs(&format!("alternative #{}", position + 1), *knobs)?;
    }

    let strategy = match data.align.strategy.as_deref() {
        Some(name) => name
            .parse::<AlignStrategy>()
            .map_err(|_| ConfigError::InvalidStrategy {
                value: name.to_string(),
            })?,
        None => defaults.strategy,
    };

    let normalizer = NormalizerOptions {
        max_visits: data
            .limits
            .max_visits
            .unwrap_or(defaults.normalizer.max_visits),
        max_depth: data
            .limits
            .max_depth
            .unwrap_or(defaults.normalizer.max_depth),
    };
    if normalizer.max_visits == 0 {
        return Err(ConfigError::InvalidLimit { name: "max_visits" });
    }

    Ok(ExplainerOptions {
        baseline,
        alternatives,
        strategy,
        normalizer,
    })
}

fn check_knobs(name: &str, knobs: CostKnobs) -> Result<(), ConfigError> {
    if knobs.is_valid() {
        Ok(())
    } else {
        Err(ConfigError::InvalidKnobs {
            name: name.to_string(),
            seq_page_cost: knobs.seq_page_cost,
            random_page_cost: knobs.random_page_cost,
        })
    }
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct RawConfig {
    #[serde(default)]
    knobs: KnobsSection,
    #[serde(default)]
    align: AlignSection,
    #[serde(default)]
    limits: LimitsSection,
}

#[derive(Debug, Default, Deserialize, Serialize)]
struct KnobsSection {
    baseline: Option<CostKnobs>,
    #[serde(rename = "alternative")]
    alternatives: Option<Vec<CostKnobs>>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
struct AlignSection {
    strategy: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
struct LimitsSection {
    max_visits: Option<usize>,
    max_depth: Option<usize>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read CLI config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse CLI config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("failed to serialize CLI config: {source}")]
    Serialize { source: toml::ser::Error },
    #[error("alignment strategy '{value}' is invalid (expected 'structural' or 'index')")]
    InvalidStrategy { value: String },
    #[error(
        "cost knobs for {name} must be finite and non-negative \
         (seq_page_cost={seq_page_cost}, random_page_cost={random_page_cost})"
    )]
    InvalidKnobs {
        name: String,
        seq_page_cost: f64,
        random_page_cost: f64,
    },
    #[error("limit '{name}' must be greater than zero")]
    InvalidLimit { name: &'static str },
}

pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|base| base.join("planlens").join("config.toml"))
}
