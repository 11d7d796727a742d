// config.rs -- Where the engine artifact lives and what it exports
//
// The build pipeline drops the compiled engine somewhere on disk; this module
// only finds it. Resolution order: explicit path, then each search directory.

use std::env;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use angle_validator_sys as sys;

use crate::error::LoadError;

/// Explicit path to the engine artifact.
pub const LIBRARY_PATH_VAR: &str = "ANGLE_VALIDATOR_LIB";
/// Extra directory searched before the defaults.
pub const LIBRARY_DIR_VAR: &str = "ANGLE_VALIDATOR_DIR";

/// Directories searched when no explicit path is configured.
pub const DEFAULT_SEARCH_DIRS: [&str; 2] = [".", "out"];

/// Names of the symbols resolved from the artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineSymbols {
    pub validate: String,
    pub allocate: String,
    pub release: String,
}

impl Default for EngineSymbols {
    fn default() -> Self {
        Self {
            validate: sys::VALIDATE_SHADER_SYMBOL.to_string(),
            allocate: sys::MALLOC_SYMBOL.to_string(),
            release: sys::FREE_SYMBOL.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    pub library_path: Option<PathBuf>,
    pub search_dirs: Vec<PathBuf>,
    pub symbols: EngineSymbols,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            library_path: None,
            search_dirs: DEFAULT_SEARCH_DIRS.iter().map(PathBuf::from).collect(),
            symbols: EngineSymbols::default(),
        }
    }
}

impl EngineConfig {
    /// Use exactly this artifact.
    pub fn with_library(path: impl Into<PathBuf>) -> Self {
        Self {
            library_path: Some(path.into()),
            ..Self::default()
        }
    }

    /// Defaults overridden by `ANGLE_VALIDATOR_LIB` / `ANGLE_VALIDATOR_DIR`.
    pub fn from_env() -> Self {
        Self::from_vars(|name| env::var_os(name))
    }

    fn from_vars(lookup: impl Fn(&str) -> Option<OsString>) -> Self {
        let mut config = Self::default();
        if let Some(path) = lookup(LIBRARY_PATH_VAR).filter(|p| !p.is_empty()) {
            config.library_path = Some(PathBuf::from(path));
        }
        if let Some(dir) = lookup(LIBRARY_DIR_VAR).filter(|d| !d.is_empty()) {
            config.search_dirs.insert(0, PathBuf::from(dir));
        }
        config
    }

    /// Resolve the artifact path.
    ///
    /// An explicit path that does not exist is an error; it never falls back
    /// to the search directories.
    pub fn locate(&self) -> Result<PathBuf, LoadError> {
        if let Some(path) = &self.library_path {
            return if path.is_file() {
                Ok(path.clone())
            } else {
                Err(LoadError::NotFound {
                    searched: vec![path.clone()],
                })
            };
        }

        let mut searched = Vec::with_capacity(self.search_dirs.len());
        for dir in &self.search_dirs {
            if let Some(path) = find_engine_library(dir) {
                return Ok(path);
            }
            searched.push(dir.join(engine_library_filename()));
        }
        Err(LoadError::NotFound { searched })
    }
}

/// Platform file name of the engine artifact (`libangle_validator.so`, `angle_validator.dll`, ...).
pub fn engine_library_filename() -> OsString {
    libloading::library_filename(sys::ENGINE_LIBRARY_NAME)
}

/// Look for the engine artifact directly inside `dir`.
pub fn find_engine_library(dir: &Path) -> Option<PathBuf> {
    let path = dir.join(engine_library_filename());
    path.is_file().then_some(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::fs;

    #[test]
    fn test_find_engine_library_nonexistent() {
        assert!(find_engine_library(Path::new("nonexistent_directory")).is_none());
    }

    #[test]
    fn test_find_engine_library_in_dir() {
        let dir = tempfile::tempdir().unwrap();
        assert!(find_engine_library(dir.path()).is_none());

        let lib = dir.path().join(engine_library_filename());
        fs::write(&lib, b"").unwrap();
        assert_eq!(find_engine_library(dir.path()), Some(lib));
    }

    #[test]
    fn test_locate_searches_dirs_in_order() {
        let first = tempfile::tempdir().unwrap();
        let second = tempfile::tempdir().unwrap();
        let lib = second.path().join(engine_library_filename());
        fs::write(&lib, b"").unwrap();

        let config = EngineConfig {
            library_path: None,
            search_dirs: vec![first.path().to_path_buf(), second.path().to_path_buf()],
            symbols: EngineSymbols::default(),
        };
        assert_eq!(config.locate().unwrap(), lib);

        fs::write(first.path().join(engine_library_filename()), b"").unwrap();
        assert_eq!(
            config.locate().unwrap(),
            first.path().join(engine_library_filename())
        );
    }

    #[test]
    fn test_locate_explicit_missing_path() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.so");
        let config = EngineConfig::with_library(&missing);
        match config.locate() {
            Err(LoadError::NotFound { searched }) => assert_eq!(searched, vec![missing]),
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn test_locate_reports_everything_searched() {
        let dir = tempfile::tempdir().unwrap();
        let config = EngineConfig {
            search_dirs: vec![dir.path().to_path_buf()],
            ..EngineConfig::default()
        };
        match config.locate() {
            Err(LoadError::NotFound { searched }) => {
                assert_eq!(searched, vec![dir.path().join(engine_library_filename())])
            }
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn test_from_vars() {
        let vars: HashMap<&str, OsString> = [
            (LIBRARY_PATH_VAR, OsString::from("/opt/angle/libangle_validator.so")),
            (LIBRARY_DIR_VAR, OsString::from("/opt/angle")),
        ]
        .into_iter()
        .collect();
        let config = EngineConfig::from_vars(|name| vars.get(name).cloned());
        assert_eq!(
            config.library_path,
            Some(PathBuf::from("/opt/angle/libangle_validator.so"))
        );
        assert_eq!(config.search_dirs[0], PathBuf::from("/opt/angle"));
        assert_eq!(config.search_dirs.len(), DEFAULT_SEARCH_DIRS.len() + 1);
    }

    #[test]
    fn test_from_vars_ignores_empty() {
        let config = EngineConfig::from_vars(|_| Some(OsString::new()));
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn test_default_symbols() {
        let symbols = EngineSymbols::default();
        assert_eq!(symbols.validate, "ValidateShader");
        assert_eq!(symbols.allocate, "malloc");
        assert_eq!(symbols.release, "free");
    }
}
