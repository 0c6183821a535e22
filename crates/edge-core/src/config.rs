//! Server and rendering configuration.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// How a page is delivered to the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderMode {
    /// Shell first, then each section as soon as it (and everything before it) is ready.
    #[default]
    Streaming,
    /// Wait for every section, then write the whole page at once.
    Buffered,
}

impl RenderMode {
    /// Name used in response headers and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Streaming => "streaming",
            Self::Buffered => "buffered",
        }
    }
}

impl std::fmt::Display for RenderMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inclusive bounds for a simulated fetch latency, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LatencyRange {
    /// Lower bound.
    pub min_ms: u64,
    /// Upper bound.
    pub max_ms: u64,
}

impl LatencyRange {
    /// Create a latency range.
    pub fn new(min_ms: u64, max_ms: u64) -> Self {
        Self { min_ms, max_ms }
    }

    /// A range that always yields the same delay.
    pub fn fixed(ms: u64) -> Self {
        Self::new(ms, ms)
    }

    /// Check that the bounds are not inverted.
    pub fn is_valid(&self) -> bool {
        self.min_ms <= self.max_ms
    }

    /// Draw a delay from the range.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        if self.min_ms >= self.max_ms {
            return Duration::from_millis(self.min_ms);
        }
        Duration::from_millis(rng.gen_range(self.min_ms..=self.max_ms))
    }
}

/// Simulated latency per demo section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectionLatencies {
    #[serde(default = "default_profile_latency")]
    pub profile: LatencyRange,
    #[serde(default = "default_products_latency")]
    pub products: LatencyRange,
    #[serde(default = "default_categories_latency")]
    pub categories: LatencyRange,
}

fn default_profile_latency() -> LatencyRange {
    LatencyRange::new(0, 1000)
}

fn default_products_latency() -> LatencyRange {
    LatencyRange::new(0, 4000)
}

fn default_categories_latency() -> LatencyRange {
    LatencyRange::new(0, 3000)
}

impl Default for SectionLatencies {
    fn default() -> Self {
        Self {
            profile: default_profile_latency(),
            products: default_products_latency(),
            categories: default_categories_latency(),
        }
    }
}

/// Per-run server configuration. Nothing here is persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address the HTTP server binds to.
    #[serde(default = "default_bind")]
    pub bind: SocketAddr,
    /// Directory served under `/static/`.
    #[serde(default = "default_static_dir")]
    pub static_dir: PathBuf,
    /// Page title used in the shell.
    #[serde(default = "default_title")]
    pub title: String,
    /// Simulated latency bounds.
    #[serde(default)]
    pub latency: SectionLatencies,
}

fn default_bind() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 1337))
}

fn default_static_dir() -> PathBuf {
    PathBuf::from("static")
}

fn default_title() -> String {
    "Hello World".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            static_dir: default_static_dir(),
            title: default_title(),
            latency: SectionLatencies::default(),
        }
    }
}

impl ServerConfig {
    /// Load config from a TOML file (or JSON when the path ends in `.json`).
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = if path.extension().is_some_and(|ext| ext == "json") {
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse JSON config: {}", path.display()))?
        } else {
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse TOML config: {}", path.display()))?
        };

        config.validate()?;
        Ok(config)
    }

    /// Reject inverted latency ranges.
    pub fn validate(&self) -> Result<()> {
        let ranges = [
            ("profile", self.latency.profile),
            ("products", self.latency.products),
            ("categories", self.latency.categories),
        ];
        for (name, range) in ranges {
            if !range.is_valid() {
                anyhow::bail!(
                    "Invalid latency for '{}': min {}ms is greater than max {}ms",
                    name,
                    range.min_ms,
                    range.max_ms
                );
            }
        }
        Ok(())
    }
}
