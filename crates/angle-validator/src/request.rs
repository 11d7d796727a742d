// request.rs -- One compile request, built fresh per call

use crate::dialect::{InputSpec, OutputSpec};
use crate::options::CompileOptions;
use crate::stage::ShaderStage;

/// What the caller wants back besides diagnostics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputTarget {
    /// Check the source only. The GLES default output spec is still sent,
    /// but any translated code the engine produces is dropped.
    #[default]
    ValidateOnly,
    /// Translate to the given dialect and return the object code.
    Translate(OutputSpec),
}

impl OutputTarget {
    /// Spec to encode; `None` for validation only.
    pub fn output_spec(&self) -> Option<&OutputSpec> {
        match self {
            OutputTarget::ValidateOnly => None,
            OutputTarget::Translate(spec) => Some(spec),
        }
    }

    pub fn wants_object_code(&self) -> bool {
        matches!(self, OutputTarget::Translate(_))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompileRequest {
    pub source: String,
    pub stage: ShaderStage,
    /// `None` compiles as GLES 2.
    pub input: Option<InputSpec>,
    pub target: OutputTarget,
    pub options: CompileOptions,
}

impl CompileRequest {
    /// A fragment-shader validation request with every other field defaulted.
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            ..Default::default()
        }
    }

    pub fn stage(mut self, stage: ShaderStage) -> Self {
        self.stage = stage;
        self
    }

    pub fn input(mut self, input: InputSpec) -> Self {
        self.input = Some(input);
        self
    }

    pub fn target(mut self, target: OutputTarget) -> Self {
        self.target = target;
        self
    }

    /// Shorthand for `target(OutputTarget::Translate(output))`.
    pub fn translate_to(self, output: OutputSpec) -> Self {
        self.target(OutputTarget::Translate(output))
    }

    pub fn options(mut self, options: CompileOptions) -> Self {
        self.options = options;
        self
    }
}
