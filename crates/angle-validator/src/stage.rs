// stage.rs -- Shader stages and their GL enum codes

use std::fmt;

use angle_validator_sys as sys;

use crate::error::ConfigurationError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    #[default]
    Fragment,
    Vertex,
    Compute,
    Geometry,
}

impl ShaderStage {
    pub const ALL: [ShaderStage; 4] = [
        ShaderStage::Fragment,
        ShaderStage::Vertex,
        ShaderStage::Compute,
        ShaderStage::Geometry,
    ];

    /// The GL shader-type enum passed as the entry point's stage argument.
    pub fn gl_enum(self) -> sys::GLenum {
        match self {
            ShaderStage::Fragment => sys::GL_FRAGMENT_SHADER,
            ShaderStage::Vertex => sys::GL_VERTEX_SHADER,
            ShaderStage::Compute => sys::GL_COMPUTE_SHADER,
            ShaderStage::Geometry => sys::GL_GEOMETRY_SHADER_EXT,
        }
    }

    pub fn from_gl_enum(value: sys::GLenum) -> Result<Self, ConfigurationError> {
        ShaderStage::ALL
            .into_iter()
            .find(|stage| stage.gl_enum() == value)
            .ok_or(ConfigurationError::UnknownShaderType(value))
    }

    /// Deduce the stage from a file name.
    ///
    /// The last extension is matched by prefix, so `.frag`, `.fragment` and
    /// `.frag2` all select the fragment stage. Anything unrecognized is
    /// treated as a fragment shader.
    pub fn from_file_name(name: &str) -> Self {
        let Some(dot) = name.rfind('.') else {
            return ShaderStage::Fragment;
        };
        let ext = &name[dot..];
        if ext.starts_with(".vert") {
            ShaderStage::Vertex
        } else if ext.starts_with(".comp") {
            ShaderStage::Compute
        } else if ext.starts_with(".geom") {
            ShaderStage::Geometry
        } else {
            ShaderStage::Fragment
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ShaderStage::Fragment => "fragment",
            ShaderStage::Vertex => "vertex",
            ShaderStage::Compute => "compute",
            ShaderStage::Geometry => "geometry",
        }
    }
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
