use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::{Config, Result, config_path};

/// Where the current merchant context is persisted
pub trait ContextStore {
    fn current_merchant_code(&self) -> Result<Option<String>>;

    /// `None` clears the context
    fn set_current_merchant_code(&self, code: Option<&str>) -> Result<()>;
}

/// Context kept in the JSON config file
#[derive(Debug, Clone)]
pub struct FileContextStore {
    path: PathBuf,
}

impl FileContextStore {
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store backed by the platform config file
    pub fn from_default_location() -> Result<Self> {
        Ok(Self::at(config_path()?))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ContextStore for FileContextStore {
    fn current_merchant_code(&self) -> Result<Option<String>> {
        Ok(Config::load_from(&self.path)?.current_merchant_code)
    }

    fn set_current_merchant_code(&self, code: Option<&str>) -> Result<()> {
        // Load first so unrelated settings survive the rewrite
        let mut config = Config::load_from(&self.path)?;
        config.current_merchant_code = code.filter(|c| !c.is_empty()).map(str::to_string);
        config.save_to(&self.path)
    }
}

/// In-memory store for tests and dry runs
#[derive(Debug, Default)]
pub struct MemoryContextStore {
    code: Mutex<Option<String>>,
}

impl MemoryContextStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_code(code: impl Into<String>) -> Self {
        Self {
            code: Mutex::new(Some(code.into())),
        }
    }
}

impl ContextStore for MemoryContextStore {
    fn current_merchant_code(&self) -> Result<Option<String>> {
        Ok(self
            .code
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone())
    }

    fn set_current_merchant_code(&self, code: Option<&str>) -> Result<()> {
        *self
            .code
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = code.map(str::to_string);
        Ok(())
    }
}
