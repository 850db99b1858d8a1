use super::Config;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const CONFIG_FILE_NAME: &str = "workervisor.json";

/// Config loader with auto-discovery
pub struct ConfigLoader {
    search_paths: Vec<PathBuf>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self {
            search_paths: vec![PathBuf::from("."), PathBuf::from("./config")],
        }
    }
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// A loader that only looks in the given directories.
    pub fn with_search_paths(paths: impl IntoIterator<Item = impl Into<PathBuf>>) -> Self {
        Self {
            search_paths: paths.into_iter().map(Into::into).collect(),
        }
    }

    pub fn with_search_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.search_paths.push(path.into());
        self
    }

    /// Load `path` when given, otherwise the first `workervisor.json` found
    /// in the search paths.
    pub fn load(&self, path: Option<&Path>) -> crate::Result<Config> {
        if let Some(path) = path {
            return self.load_file(path);
        }

        for dir in &self.search_paths {
            let candidate = dir.join(CONFIG_FILE_NAME);
            if candidate.exists() {
                return self.load_file(&candidate);
            }
        }

        let searched: Vec<String> = self
            .search_paths
            .iter()
            .map(|p| p.display().to_string())
            .collect();
        Err(crate::Error::Config(format!(
            "No {} found (searched: {})",
            CONFIG_FILE_NAME,
            searched.join(", ")
        )))
    }

    /// Load a specific config file
    pub fn load_file(&self, path: &Path) -> crate::Result<Config> {
        debug!("Loading configuration from {:?}", path);
        let content = std::fs::read_to_string(path)?;
        Config::from_json(&content)
    }
}
