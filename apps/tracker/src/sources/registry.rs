use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::error;

/// One configured source: a provider and the board identifier on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRef {
    pub provider: String,
    pub id: String,
}

impl std::fmt::Display for SourceRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.provider, self.id)
    }
}

/// Location targeting. An empty list accepts every location.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Targeting {
    #[serde(default)]
    pub locations: Vec<String>,
}

impl Targeting {
    pub fn accepts_location(&self, location: &str) -> bool {
        if self.locations.is_empty() {
            return true;
        }
        let location = location.to_lowercase();
        self.locations
            .iter()
            .any(|wanted| location.contains(&wanted.to_lowercase()))
    }
}

#[derive(Debug, Deserialize)]
struct RegistryFile {
    #[serde(default)]
    target_platforms: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    targeting: Targeting,
}

/// Ordered list of sources the discovery run walks through.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceRegistry {
    sources: Vec<SourceRef>,
    targeting: Targeting,
}

impl SourceRegistry {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read source registry {}", path.display()))?;
        Self::from_json(&raw)
            .with_context(|| format!("Invalid source registry {}", path.display()))
    }

    /// Like `load`, but a missing or malformed file is logged and yields an
    /// empty registry. A discovery run only aborts on persistence failures.
    pub fn load_or_empty(path: impl AsRef<Path>) -> Self {
        Self::load(path).unwrap_or_else(|e| {
            error!("{e:#}; running with no sources");
            Self::default()
        })
    }

    /// Providers are taken in name order, identifiers in file order.
    /// Blank identifiers are dropped and repeats within a provider are kept once.
    pub fn from_json(raw: &str) -> Result<Self> {
        let file: RegistryFile = serde_json::from_str(raw)?;

        let mut sources = Vec::new();
        for (provider, ids) in file.target_platforms {
            let provider = provider.trim().to_lowercase();
            for id in ids {
                let id = id.trim();
                if id.is_empty() {
                    continue;
                }
                let source = SourceRef {
                    provider: provider.clone(),
                    id: id.to_string(),
                };
                if !sources.contains(&source) {
                    sources.push(source);
                }
            }
        }

        Ok(Self {
            sources,
            targeting: file.targeting,
        })
    }

    pub fn sources(&self) -> &[SourceRef] {
        &self.sources
    }

    pub fn targeting(&self) -> &Targeting {
        &self.targeting
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}
