// encoder.rs -- Request to fixed-layout int buffers
//
// Pure functions: no I/O, no foreign memory. Identical input always produces
// byte-identical buffers.

use std::os::raw::c_int;

use angle_validator_sys as sys;

use crate::defaults::{resolve_input, resolve_output};
use crate::dialect::{InputSpec, OutputSpec};
use crate::error::ConfigurationError;
use crate::options::{CompileOptions, OptionField, OptionValue};
use crate::request::CompileRequest;

/// A fixed-length run of 32-bit slots in the layout the engine reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct EncodedBuffer<const N: usize>([c_int; N]);

impl<const N: usize> EncodedBuffer<N> {
    pub fn slots(&self) -> &[c_int; N] {
        &self.0
    }

    /// Native-endian bytes exactly as the engine sees them.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.0[..])
    }

    pub fn as_ptr(&self) -> *const c_int {
        self.0.as_ptr()
    }
}

pub type InputBuffer = EncodedBuffer<{ sys::INPUT_SPEC_LEN }>;
pub type OutputBuffer = EncodedBuffer<{ sys::OUTPUT_SPEC_LEN }>;
pub type OptionsBuffer = EncodedBuffer<{ sys::COMPILE_OPTIONS_LEN }>;

/// Encode options in `OptionField::ALL` order, filling omitted fields with defaults.
pub fn encode_compile_options(options: &CompileOptions) -> Result<OptionsBuffer, ConfigurationError> {
    let mut slots = [0 as c_int; sys::COMPILE_OPTIONS_LEN];
    for (slot, field) in slots.iter_mut().zip(OptionField::ALL) {
        *slot = match options.resolved(field) {
            OptionValue::Flag(v) => c_int::from(v),
            OptionValue::Count(v) => c_int::try_from(v).map_err(|_| {
                ConfigurationError::CountOutOfRange {
                    field: field.name(),
                    value: v,
                }
            })?,
        };
    }
    Ok(EncodedBuffer(slots))
}

/// `[tag, version]` for the input dialect; `None` means GLES 2.
pub fn encode_input_spec(spec: Option<&InputSpec>) -> Result<InputBuffer, ConfigurationError> {
    let resolved = resolve_input(spec)?;
    Ok(EncodedBuffer([resolved.tag, version_slot(resolved.version)]))
}

/// `[tag, version]` for the output dialect; `None` means GLES (version slot 0).
pub fn encode_output_spec(spec: Option<&OutputSpec>) -> Result<OutputBuffer, ConfigurationError> {
    let resolved = resolve_output(spec)?;
    Ok(EncodedBuffer([resolved.tag, version_slot(resolved.version)]))
}

// Resolved versions all come from the small supported tables.
fn version_slot(version: u32) -> c_int {
    version as c_int
}

/// All three buffers for one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodedRequest {
    pub input: InputBuffer,
    pub output: OutputBuffer,
    pub options: OptionsBuffer,
}

impl EncodedRequest {
    /// Encode every buffer, failing before anything is produced if any part is invalid.
    pub fn encode(request: &CompileRequest) -> Result<Self, ConfigurationError> {
        Ok(Self {
            input: encode_input_spec(request.input.as_ref())?,
            output: encode_output_spec(request.target.output_spec())?,
            options: encode_compile_options(&request.options)?,
        })
    }
}
