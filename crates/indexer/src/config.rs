//! Project configuration loaded from `.docsync/config.toml`.

use crate::error::Result;
use docsync_graph::{DEFAULT_CHAIN_DEPTH, DEFAULT_IMPACT_DEPTH, DEFAULT_PRD_PATH};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CONFIG_DIR: &str = ".docsync";
pub const CONFIG_FILE_NAME: &str = "config.toml";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocsyncConfig {
    /// Corpus directory, relative to the project root.
    pub docs_root: String,
    /// Root PRD document, relative to `docs_root`.
    pub prd_path: String,
    pub index_path: String,
    pub state_path: String,
    pub store_path: String,
    pub traversal: TraversalConfig,
    pub search: SearchConfig,
}

impl Default for DocsyncConfig {
    fn default() -> Self {
        Self {
            docs_root: "docs".to_string(),
            prd_path: DEFAULT_PRD_PATH.to_string(),
            index_path: format!("{CONFIG_DIR}/index.json"),
            state_path: format!("{CONFIG_DIR}/state.json"),
            store_path: format!("{CONFIG_DIR}/store.json"),
            traversal: TraversalConfig::default(),
            search: SearchConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TraversalConfig {
    pub impact_depth: usize,
    pub chain_depth: usize,
}

impl Default for TraversalConfig {
    fn default() -> Self {
        Self {
            impact_depth: DEFAULT_IMPACT_DEPTH,
            chain_depth: DEFAULT_CHAIN_DEPTH,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub limit: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self { limit: 10 }
    }
}

impl DocsyncConfig {
    #[must_use]
    pub fn path_for_project(project_root: &Path) -> PathBuf {
        project_root.join(CONFIG_DIR).join(CONFIG_FILE_NAME)
    }

    /// Load the project's config file; a missing file yields the defaults.
    pub async fn load(project_root: &Path) -> Result<Self> {
        let path = Self::path_for_project(project_root);
        if !path.exists() {
            log::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let content = tokio::fs::read_to_string(&path).await?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let mut config: Self = toml::from_str(content)?;
        config.normalize();
        Ok(config)
    }

    /// Zero depths and limits fall back to the defaults.
    fn normalize(&mut self) {
        let defaults = Self::default();
        if self.traversal.impact_depth == 0 {
            self.traversal.impact_depth = defaults.traversal.impact_depth;
        }
        if self.traversal.chain_depth == 0 {
            self.traversal.chain_depth = defaults.traversal.chain_depth;
        }
        if self.search.limit == 0 {
            self.search.limit = defaults.search.limit;
        }
    }

    #[must_use]
    pub fn docs_dir(&self, project_root: &Path) -> PathBuf {
        project_root.join(&self.docs_root)
    }

    #[must_use]
    pub fn index_file(&self, project_root: &Path) -> PathBuf {
        project_root.join(&self.index_path)
    }

    #[must_use]
    pub fn state_file(&self, project_root: &Path) -> PathBuf {
        project_root.join(&self.state_path)
    }

    #[must_use]
    pub fn store_file(&self, project_root: &Path) -> PathBuf {
        project_root.join(&self.store_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::IndexerError;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn empty_file_is_all_defaults() {
        assert_eq!(DocsyncConfig::from_toml("").unwrap(), DocsyncConfig::default());
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = DocsyncConfig::from_toml(
            "docs_root = \"documentation\"\n\n[traversal]\nimpact_depth = 4\nchain_depth = 0\n",
        )
        .unwrap();
        assert_eq!(config.docs_root, "documentation");
        assert_eq!(config.prd_path, "prd.md");
        assert_eq!(config.traversal.impact_depth, 4);
        assert_eq!(config.traversal.chain_depth, DEFAULT_CHAIN_DEPTH);
        assert_eq!(config.search.limit, 10);
    }

    #[test]
    fn malformed_toml_is_an_error() {
        let err = DocsyncConfig::from_toml("docs_root = [unclosed").unwrap_err();
        assert!(matches!(err, IndexerError::Config(_)));
    }

    #[tokio::test]
    async fn missing_file_loads_defaults() {
        let temp = TempDir::new().unwrap();
        let config = DocsyncConfig::load(temp.path()).await.unwrap();
        assert_eq!(config, DocsyncConfig::default());
        assert_eq!(
            config.store_file(temp.path()),
            temp.path().join(".docsync/store.json")
        );
    }

    #[tokio::test]
    async fn loads_file_from_project_root() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir_all(temp.path().join(CONFIG_DIR)).unwrap();
        std::fs::write(
            DocsyncConfig::path_for_project(temp.path()),
            "[search]\nlimit = 25\n",
        )
        .unwrap();
        let config = DocsyncConfig::load(temp.path()).await.unwrap();
        assert_eq!(config.search.limit, 25);
    }
}
