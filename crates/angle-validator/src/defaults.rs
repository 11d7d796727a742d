// defaults.rs -- Default resolution for every request field
//
// Omitted options resolve to false / 0. Omitted specs and versions resolve per
// dialect. Explicit versions must come from the supported set of their dialect.

use crate::dialect::{InputSpec, OutputSpec};
use crate::error::ConfigurationError;

// ============================================================
// Option defaults
// ============================================================

pub const DEFAULT_FLAG: bool = false;
pub const DEFAULT_COUNT: u32 = 0;

// ============================================================
// Dialect defaults
// ============================================================

/// Input used when a request names none.
pub const DEFAULT_INPUT: InputSpec = InputSpec::Gles {
    version: Some(DEFAULT_GLES_INPUT_VERSION),
};

/// Output used when a request names none (validation only).
pub const DEFAULT_OUTPUT: OutputSpec = OutputSpec::Gles;

pub const DEFAULT_GLES_INPUT_VERSION: u32 = 2;
pub const DEFAULT_WEBGL_INPUT_VERSION: u32 = 1;

/// Version slot value sent for GLSL output with no explicit version.
///
/// This is the value the engine receives today and maps to its default desktop
/// GLSL output. It is outside `GLSL_OUTPUT_VERSIONS`, so callers cannot
/// request it explicitly.
pub const DEFAULT_GLSL_OUTPUT_VERSION: u32 = 2;
pub const DEFAULT_HLSL_OUTPUT_VERSION: u32 = 9;

/// Placeholder in the version slot of GLES output, which has no version.
pub const GLES_OUTPUT_VERSION: u32 = 0;

pub const GLES_INPUT_VERSIONS: [u32; 3] = [2, 3, 31];
pub const WEBGL_INPUT_VERSIONS: [u32; 3] = [1, 2, 3];
pub const GLSL_OUTPUT_VERSIONS: [u32; 10] = [130, 140, 150, 330, 400, 410, 420, 430, 440, 450];
pub const HLSL_OUTPUT_VERSIONS: [u32; 2] = [9, 11];

/// A spec reduced to its two wire slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedSpec {
    pub tag: i32,
    pub version: u32,
}

/// Resolve an optional input spec to its tag and concrete version.
pub fn resolve_input(spec: Option<&InputSpec>) -> Result<ResolvedSpec, ConfigurationError> {
    let spec = spec.copied().unwrap_or(DEFAULT_INPUT);
    let version = match spec {
        InputSpec::Gles { version } => {
            input_version(&spec, version, DEFAULT_GLES_INPUT_VERSION, &GLES_INPUT_VERSIONS)?
        }
        InputSpec::WebGl { version } => {
            input_version(&spec, version, DEFAULT_WEBGL_INPUT_VERSION, &WEBGL_INPUT_VERSIONS)?
        }
    };
    Ok(ResolvedSpec {
        tag: spec.tag(),
        version,
    })
}

/// Resolve an optional output spec to its tag and concrete version.
pub fn resolve_output(spec: Option<&OutputSpec>) -> Result<ResolvedSpec, ConfigurationError> {
    let spec = spec.copied().unwrap_or(DEFAULT_OUTPUT);
    let version = match spec {
        OutputSpec::Gles => GLES_OUTPUT_VERSION,
        OutputSpec::Glsl { version } => {
            output_version(&spec, version, DEFAULT_GLSL_OUTPUT_VERSION, &GLSL_OUTPUT_VERSIONS)?
        }
        OutputSpec::Hlsl { version } => {
            output_version(&spec, version, DEFAULT_HLSL_OUTPUT_VERSION, &HLSL_OUTPUT_VERSIONS)?
        }
    };
    Ok(ResolvedSpec {
        tag: spec.tag(),
        version,
    })
}

fn input_version(
    spec: &InputSpec,
    version: Option<u32>,
    default: u32,
    supported: &[u32],
) -> Result<u32, ConfigurationError> {
    match version {
        None => Ok(default),
        Some(v) if supported.contains(&v) => Ok(v),
        Some(v) => Err(ConfigurationError::UnsupportedInputVersion {
            dialect: spec.dialect_name(),
            version: v,
        }),
    }
}

fn output_version(
    spec: &OutputSpec,
    version: Option<u32>,
    default: u32,
    supported: &[u32],
) -> Result<u32, ConfigurationError> {
    match version {
        None => Ok(default),
        Some(v) if supported.contains(&v) => Ok(v),
        Some(v) => Err(ConfigurationError::UnsupportedOutputVersion {
            dialect: spec.dialect_name(),
            version: v,
        }),
    }
}
