// options.rs -- CompileOptions record and its wire schema
//
// `OptionField::ALL` is the layout of the 13-slot options buffer. Changing the
// order or the length of that array is a protocol change and requires bumping
// `OPTIONS_LAYOUT_VERSION` together with the engine.

use std::fmt;

use angle_validator_sys as sys;

use crate::defaults::{DEFAULT_COUNT, DEFAULT_FLAG};
use crate::error::ConfigurationError;

/// Version of the `OptionField::ALL` layout.
pub const OPTIONS_LAYOUT_VERSION: u32 = sys::PROTOCOL_VERSION;

/// How a field is written into its slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Boolean, encoded as 0 or 1.
    Flag,
    /// Small non-negative count, encoded directly; 0 disables.
    Count,
}

impl FieldKind {
    fn describe(self) -> &'static str {
        match self {
            FieldKind::Flag => "boolean",
            FieldKind::Count => "count",
        }
    }
}

/// A value supplied for one option.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionValue {
    Flag(bool),
    Count(u32),
}

impl From<bool> for OptionValue {
    fn from(v: bool) -> Self {
        OptionValue::Flag(v)
    }
}

impl From<u32> for OptionValue {
    fn from(v: u32) -> Self {
        OptionValue::Count(v)
    }
}

/// One slot of the options buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OptionField {
    UsePrecisionEmulation,
    OesEglImageExternal,
    OesStandardDerivatives,
    ArbTextureRectangle,
    ExtFragDepth,
    ExtShaderTextureLod,
    ExtShaderFramebufferFetch,
    NvShaderFramebufferFetch,
    ArmShaderFramebufferFetch,
    OvrMultiview,
    YuvTarget,
    ExtBlendFuncExtended,
    ExtDrawBuffers,
}

impl OptionField {
    /// Wire order of the options buffer.
    pub const ALL: [OptionField; sys::COMPILE_OPTIONS_LEN] = [
        OptionField::UsePrecisionEmulation,
        OptionField::OesEglImageExternal,
        OptionField::OesStandardDerivatives,
        OptionField::ArbTextureRectangle,
        OptionField::ExtFragDepth,
        OptionField::ExtShaderTextureLod,
        OptionField::ExtShaderFramebufferFetch,
        OptionField::NvShaderFramebufferFetch,
        OptionField::ArmShaderFramebufferFetch,
        OptionField::OvrMultiview,
        OptionField::YuvTarget,
        OptionField::ExtBlendFuncExtended,
        OptionField::ExtDrawBuffers,
    ];

    /// Canonical wire name.
    pub fn name(self) -> &'static str {
        match self {
            OptionField::UsePrecisionEmulation => "use_precision_emulation",
            OptionField::OesEglImageExternal => "GL_OES_EGL_image_external",
            OptionField::OesStandardDerivatives => "GL_OES_EGL_standard_derivatives",
            OptionField::ArbTextureRectangle => "ARB_texture_rectangle",
            OptionField::ExtFragDepth => "EXT_frag_depth",
            OptionField::ExtShaderTextureLod => "EXT_shader_texture_lod",
            OptionField::ExtShaderFramebufferFetch => "EXT_shader_framebuffer_fetch",
            OptionField::NvShaderFramebufferFetch => "NV_shader_framebuffer_fetch",
            OptionField::ArmShaderFramebufferFetch => "ARM_shader_framebuffer_fetch",
            OptionField::OvrMultiview => "OVR_multiview",
            OptionField::YuvTarget => "YUV_target",
            OptionField::ExtBlendFuncExtended => "EXT_blend_func_extended",
            OptionField::ExtDrawBuffers => "EXT_draw_buffers",
        }
    }

    pub fn kind(self) -> FieldKind {
        match self {
            OptionField::ExtBlendFuncExtended | OptionField::ExtDrawBuffers => FieldKind::Count,
            _ => FieldKind::Flag,
        }
    }

    pub fn default_value(self) -> OptionValue {
        match self.kind() {
            FieldKind::Flag => OptionValue::Flag(DEFAULT_FLAG),
            FieldKind::Count => OptionValue::Count(DEFAULT_COUNT),
        }
    }

    /// Look a field up by its canonical wire name.
    pub fn from_name(name: &str) -> Option<OptionField> {
        OptionField::ALL.iter().copied().find(|f| f.name() == name)
    }
}

impl fmt::Display for OptionField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Extension and behavior switches for one compile.
///
/// Every field is optional; `None` resolves to the documented default (false
/// or 0) at encoding time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompileOptions {
    pub use_precision_emulation: Option<bool>,
    pub oes_egl_image_external: Option<bool>,
    pub oes_standard_derivatives: Option<bool>,
    pub arb_texture_rectangle: Option<bool>,
    pub ext_frag_depth: Option<bool>,
    pub ext_shader_texture_lod: Option<bool>,
    pub ext_shader_framebuffer_fetch: Option<bool>,
    pub nv_shader_framebuffer_fetch: Option<bool>,
    pub arm_shader_framebuffer_fetch: Option<bool>,
    pub ovr_multiview: Option<bool>,
    pub yuv_target: Option<bool>,
    /// Number of dual-source draw buffers; 0 disables the extension.
    pub ext_blend_func_extended: Option<u32>,
    /// Number of draw buffers; 0 disables the extension.
    pub ext_draw_buffers: Option<u32>,
}

impl CompileOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every field set explicitly to its default.
    pub fn all_defaults() -> Self {
        let mut options = Self::default();
        for field in OptionField::ALL {
            options.slot_mut(field).set(field.default_value());
        }
        options
    }

    /// The supplied value for `field`, if any.
    pub fn get(&self, field: OptionField) -> Option<OptionValue> {
        match field {
            OptionField::UsePrecisionEmulation => self.use_precision_emulation.map(OptionValue::Flag),
            OptionField::OesEglImageExternal => self.oes_egl_image_external.map(OptionValue::Flag),
            OptionField::OesStandardDerivatives => self.oes_standard_derivatives.map(OptionValue::Flag),
            OptionField::ArbTextureRectangle => self.arb_texture_rectangle.map(OptionValue::Flag),
            OptionField::ExtFragDepth => self.ext_frag_depth.map(OptionValue::Flag),
            OptionField::ExtShaderTextureLod => self.ext_shader_texture_lod.map(OptionValue::Flag),
            OptionField::ExtShaderFramebufferFetch => {
                self.ext_shader_framebuffer_fetch.map(OptionValue::Flag)
            }
            OptionField::NvShaderFramebufferFetch => {
                self.nv_shader_framebuffer_fetch.map(OptionValue::Flag)
            }
            OptionField::ArmShaderFramebufferFetch => {
                self.arm_shader_framebuffer_fetch.map(OptionValue::Flag)
            }
            OptionField::OvrMultiview => self.ovr_multiview.map(OptionValue::Flag),
            OptionField::YuvTarget => self.yuv_target.map(OptionValue::Flag),
            OptionField::ExtBlendFuncExtended => self.ext_blend_func_extended.map(OptionValue::Count),
            OptionField::ExtDrawBuffers => self.ext_draw_buffers.map(OptionValue::Count),
        }
    }

    /// The supplied value for `field`, or its default.
    pub fn resolved(&self, field: OptionField) -> OptionValue {
        self.get(field).unwrap_or_else(|| field.default_value())
    }

    /// Set a field, checking the value kind against the schema.
    pub fn set_field(
        &mut self,
        field: OptionField,
        value: impl Into<OptionValue>,
    ) -> Result<(), ConfigurationError> {
        let value = value.into();
        let matches = matches!(
            (field.kind(), value),
            (FieldKind::Flag, OptionValue::Flag(_)) | (FieldKind::Count, OptionValue::Count(_))
        );
        if !matches {
            return Err(ConfigurationError::OptionKind {
                field: field.name(),
                expected: field.kind().describe(),
            });
        }
        self.slot_mut(field).set(value);
        Ok(())
    }

    /// Set a field by its canonical wire name.
    ///
    /// Names outside the schema are ignored and reported as `Ok(false)`, so
    /// extra keys never change the encoded buffer.
    pub fn set(&mut self, name: &str, value: impl Into<OptionValue>) -> Result<bool, ConfigurationError> {
        match OptionField::from_name(name) {
            Some(field) => {
                self.set_field(field, value)?;
                Ok(true)
            }
            None => {
                tracing::debug!(option = name, "ignoring unknown compile option");
                Ok(false)
            }
        }
    }

    /// Builder form of [`CompileOptions::set_field`].
    pub fn with(mut self, field: OptionField, value: impl Into<OptionValue>) -> Result<Self, ConfigurationError> {
        self.set_field(field, value)?;
        Ok(self)
    }

    /// Build from name/value pairs, ignoring unknown names.
    pub fn from_pairs<'a, I, V>(pairs: I) -> Result<Self, ConfigurationError>
    where
        I: IntoIterator<Item = (&'a str, V)>,
        V: Into<OptionValue>,
    {
        let mut options = Self::default();
        for (name, value) in pairs {
            options.set(name, value)?;
        }
        Ok(options)
    }

    fn slot_mut(&mut self, field: OptionField) -> Slot<'_> {
        match field {
            OptionField::UsePrecisionEmulation => Slot::Flag(&mut self.use_precision_emulation),
            OptionField::OesEglImageExternal => Slot::Flag(&mut self.oes_egl_image_external),
            OptionField::OesStandardDerivatives => Slot::Flag(&mut self.oes_standard_derivatives),
            OptionField::ArbTextureRectangle => Slot::Flag(&mut self.arb_texture_rectangle),
            OptionField::ExtFragDepth => Slot::Flag(&mut self.ext_frag_depth),
            OptionField::ExtShaderTextureLod => Slot::Flag(&mut self.ext_shader_texture_lod),
            OptionField::ExtShaderFramebufferFetch => Slot::Flag(&mut self.ext_shader_framebuffer_fetch),
            OptionField::NvShaderFramebufferFetch => Slot::Flag(&mut self.nv_shader_framebuffer_fetch),
            OptionField::ArmShaderFramebufferFetch => Slot::Flag(&mut self.arm_shader_framebuffer_fetch),
            OptionField::OvrMultiview => Slot::Flag(&mut self.ovr_multiview),
            OptionField::YuvTarget => Slot::Flag(&mut self.yuv_target),
            OptionField::ExtBlendFuncExtended => Slot::Count(&mut self.ext_blend_func_extended),
            OptionField::ExtDrawBuffers => Slot::Count(&mut self.ext_draw_buffers),
        }
    }
}

enum Slot<'a> {
    Flag(&'a mut Option<bool>),
    Count(&'a mut Option<u32>),
}

impl Slot<'_> {
    // Kind has been checked by the caller; a mismatch leaves the slot alone.
    fn set(self, value: OptionValue) {
        match (self, value) {
            (Slot::Flag(slot), OptionValue::Flag(v)) => *slot = Some(v),
            (Slot::Count(slot), OptionValue::Count(v)) => *slot = Some(v),
            _ => {}
        }
    }
}
