/**
 * Run configuration and root path validation
 */

use std::path::PathBuf;

use crate::error::ConfigError;
use crate::resolver::UnresolvedPolicy;

#[derive(Debug, Clone)]
pub struct Settings {
    pub root: Option<PathBuf>,
    pub policy: UnresolvedPolicy,
    /// Directory groups processed at once; 1 means fully sequential.
    pub workers: usize,
    /// Extra extensions to leave alone, on top of the built-in skip list.
    pub skip_extensions: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            root: None,
            policy: UnresolvedPolicy::default(),
            workers: 1,
            skip_extensions: Vec::new(),
        }
    }
}

impl Settings {
    /// The root directory, checked to be present, existing and a directory.
    pub fn validated_root(&self) -> Result<PathBuf, ConfigError> {
        let root = match &self.root {
            Some(root) if !root.as_os_str().is_empty() => root,
            _ => return Err(ConfigError::MissingRoot),
        };
        if !root.exists() {
            return Err(ConfigError::RootNotFound(root.clone()));
        }
        if !root.is_dir() {
            return Err(ConfigError::RootNotDirectory(root.clone()));
        }
        Ok(root.clone())
    }
}
