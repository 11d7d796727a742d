// dialect.rs -- Source and target shading-language dialects
//
// Each variant carries an optional version. `None` means "use the default for
// this dialect" (see defaults.rs); an explicit version is checked against the
// supported set when the spec is encoded.

use std::fmt;

use angle_validator_sys as sys;

use crate::error::ConfigurationError;

/// Dialect and version the shader source is written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputSpec {
    /// OpenGL ES shading language; versions 2, 3, 31.
    Gles { version: Option<u32> },
    /// WebGL shading language; versions 1, 2, 3.
    WebGl { version: Option<u32> },
}

impl InputSpec {
    pub fn gles(version: u32) -> Self {
        InputSpec::Gles {
            version: Some(version),
        }
    }

    pub fn webgl(version: u32) -> Self {
        InputSpec::WebGl {
            version: Some(version),
        }
    }

    /// Wire tag stored in slot 0 of the input buffer.
    pub fn tag(&self) -> i32 {
        match self {
            InputSpec::Gles { .. } => sys::SH_INPUT_GLES,
            InputSpec::WebGl { .. } => sys::SH_INPUT_WEBGL,
        }
    }

    pub fn version(&self) -> Option<u32> {
        match *self {
            InputSpec::Gles { version } | InputSpec::WebGl { version } => version,
        }
    }

    pub fn dialect_name(&self) -> &'static str {
        match self {
            InputSpec::Gles { .. } => "GLES",
            InputSpec::WebGl { .. } => "WebGL",
        }
    }

    /// Build an input spec from a loosely typed tag/version pair.
    pub fn from_raw(tag: i32, version: Option<u32>) -> Result<Self, ConfigurationError> {
        match tag {
            sys::SH_INPUT_GLES => Ok(InputSpec::Gles { version }),
            sys::SH_INPUT_WEBGL => Ok(InputSpec::WebGl { version }),
            other => Err(ConfigurationError::UnknownInputTag(other)),
        }
    }
}

impl fmt::Display for InputSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.version() {
            Some(v) => write!(f, "{} {}", self.dialect_name(), v),
            None => write!(f, "{} (default version)", self.dialect_name()),
        }
    }
}

/// Dialect and version to translate to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputSpec {
    /// OpenGL ES output; carries no version.
    Gles,
    /// Desktop GLSL; versions 130, 140, 150, 330, 400, 410, 420, 430, 440, 450.
    Glsl { version: Option<u32> },
    /// HLSL; shader model 9 or 11.
    Hlsl { version: Option<u32> },
}

impl OutputSpec {
    pub fn glsl(version: u32) -> Self {
        OutputSpec::Glsl {
            version: Some(version),
        }
    }

    pub fn hlsl(version: u32) -> Self {
        OutputSpec::Hlsl {
            version: Some(version),
        }
    }

    /// Wire tag stored in slot 0 of the output buffer.
    pub fn tag(&self) -> i32 {
        match self {
            OutputSpec::Gles => sys::SH_OUTPUT_GLES,
            OutputSpec::Glsl { .. } => sys::SH_OUTPUT_GLSL,
            OutputSpec::Hlsl { .. } => sys::SH_OUTPUT_HLSL,
        }
    }

    pub fn version(&self) -> Option<u32> {
        match *self {
            OutputSpec::Gles => None,
            OutputSpec::Glsl { version } | OutputSpec::Hlsl { version } => version,
        }
    }

    pub fn dialect_name(&self) -> &'static str {
        match self {
            OutputSpec::Gles => "GLES",
            OutputSpec::Glsl { .. } => "GLSL",
            OutputSpec::Hlsl { .. } => "HLSL",
        }
    }

    /// Build an output spec from a loosely typed tag/version pair.
    ///
    /// GLES output has no version, so any version passed with the GLES tag
    /// is rejected.
    pub fn from_raw(tag: i32, version: Option<u32>) -> Result<Self, ConfigurationError> {
        match tag {
            sys::SH_OUTPUT_GLES => match version {
                None => Ok(OutputSpec::Gles),
                Some(version) => Err(ConfigurationError::UnsupportedOutputVersion {
                    dialect: "GLES",
                    version,
                }),
            },
            sys::SH_OUTPUT_GLSL => Ok(OutputSpec::Glsl { version }),
            sys::SH_OUTPUT_HLSL => Ok(OutputSpec::Hlsl { version }),
            other => Err(ConfigurationError::UnknownOutputTag(other)),
        }
    }
}

impl fmt::Display for OutputSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self, self.version()) {
            (OutputSpec::Gles, _) => f.write_str("GLES"),
            (_, Some(v)) => write!(f, "{} {}", self.dialect_name(), v),
            (_, None) => write!(f, "{} (default version)", self.dialect_name()),
        }
    }
}
