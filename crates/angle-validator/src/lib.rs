//! Safe marshaling layer for the ANGLE shader validator.
//!
//! A [`CompileRequest`] is encoded into the three fixed-layout buffers the
//! engine's `ValidateShader` entry point reads, the entry point is called, and
//! the log string it hands back is decoded and released.
//!
//! ```ignore
//! use angle_validator::{CompileRequest, InputSpec, OutputSpec, ShaderStage, Validator};
//!
//! let validator = Validator::from_env()?;
//! let output = validator.invoke(
//!     &CompileRequest::new(source)
//!         .stage(ShaderStage::Fragment)
//!         .input(InputSpec::webgl(1))
//!         .translate_to(OutputSpec::hlsl(11)),
//! )?;
//! println!("{}", output.translated_code().unwrap_or(""));
//! ```

pub mod config;
pub mod defaults;
pub mod dialect;
pub mod encoder;
pub mod engine;
pub mod error;
pub mod foreign;
pub mod invoker;
pub mod library;
pub mod log;
pub mod options;
pub mod request;
pub mod stage;

pub use config::{EngineConfig, EngineSymbols};
pub use dialect::{InputSpec, OutputSpec};
pub use encoder::{
    encode_compile_options, encode_input_spec, encode_output_spec, EncodedBuffer, EncodedRequest,
};
pub use engine::Engine;
pub use error::{ConfigurationError, LoadError, ResourceError, Result, ValidatorError};
pub use invoker::{invoke, CompileOutput, EngineStatus, Validator};
pub use library::NativeEngine;
pub use log::{DiagnosticLog, LogSection, SectionKind};
pub use options::{CompileOptions, FieldKind, OptionField, OptionValue};
pub use request::{CompileRequest, OutputTarget};
pub use stage::ShaderStage;
