// error.rs -- Error taxonomy for the validator boundary
//
// Configuration and resource failures abort a call. A non-zero native status
// is not an error: it is reported through `EngineStatus` on the result.

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ValidatorError>;

/// The caller asked for something the wire contract cannot express.
///
/// Always raised before any foreign allocation or native call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    #[error("unknown input spec tag {0}")]
    UnknownInputTag(i32),

    #[error("unknown output spec tag {0}")]
    UnknownOutputTag(i32),

    #[error("{dialect} input does not support version {version}")]
    UnsupportedInputVersion { dialect: &'static str, version: u32 },

    #[error("{dialect} output does not support version {version}")]
    UnsupportedOutputVersion { dialect: &'static str, version: u32 },

    #[error("unknown shader type 0x{0:04X}")]
    UnknownShaderType(u32),

    #[error("option `{field}` expects a {expected} value")]
    OptionKind {
        field: &'static str,
        expected: &'static str,
    },

    #[error("option `{field}` count {value} does not fit a 32-bit slot")]
    CountOutOfRange { field: &'static str, value: u32 },

    #[error("shader source contains a NUL byte at offset {position}")]
    InteriorNul { position: usize },
}

/// The engine heap refused an allocation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResourceError {
    #[error("foreign allocation of {size} bytes failed")]
    AllocationFailed { size: usize },
}

/// The engine artifact could not be brought into the process.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("validator library not found (searched: {searched:?})")]
    NotFound { searched: Vec<PathBuf> },

    #[error("failed to load validator library '{}': {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: libloading::Error,
    },

    #[error("symbol `{symbol}` not found in '{}': {source}", .path.display())]
    MissingSymbol {
        path: PathBuf,
        symbol: String,
        #[source]
        source: libloading::Error,
    },
}

#[derive(Debug, Error)]
pub enum ValidatorError {
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("resource error: {0}")]
    Resource(#[from] ResourceError),

    #[error("load error: {0}")]
    Load(#[from] LoadError),
}
