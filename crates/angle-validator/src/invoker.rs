// invoker.rs -- One request through the engine entry point
//
// Sequence per call:
//   1. encode the request (configuration errors stop here, nothing allocated)
//   2. allocate the result slot on the engine heap, initialized to null
//   3. call the entry point
//   4. adopt the string the engine stored in the slot, if any
//   5. decode it, releasing the string
//   6. release the slot
//   7. split the decoded text into sections
//
// The status returned by the engine never gates decoding.

use std::ffi::{CStr, CString};
use std::fmt;
use std::os::raw::c_int;

use angle_validator_sys as sys;
use parking_lot::Mutex;

use crate::config::EngineConfig;
use crate::encoder::EncodedRequest;
use crate::engine::Engine;
use crate::error::{ConfigurationError, ResourceError, Result};
use crate::foreign::{ForeignString, ResultSlot};
use crate::library::NativeEngine;
use crate::log::{DiagnosticLog, SectionKind};
use crate::request::CompileRequest;
use crate::stage::ShaderStage;

// ============================================================
// Results
// ============================================================

/// Status code returned by the entry point. Informational only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineStatus {
    Success,
    /// The engine did not understand the request.
    Usage,
    /// The shader failed to compile; details are in the info log.
    Compile,
    /// The engine could not build a compiler for the stage/spec/output combination.
    CompilerCreate,
    Other(i32),
}

impl From<c_int> for EngineStatus {
    fn from(code: c_int) -> Self {
        match code {
            sys::ESUCCESS => EngineStatus::Success,
            sys::EFAIL_USAGE => EngineStatus::Usage,
            sys::EFAIL_COMPILE => EngineStatus::Compile,
            sys::EFAIL_COMPILER_CREATE => EngineStatus::CompilerCreate,
            other => EngineStatus::Other(other),
        }
    }
}

impl EngineStatus {
    pub fn code(self) -> c_int {
        match self {
            EngineStatus::Success => sys::ESUCCESS,
            EngineStatus::Usage => sys::EFAIL_USAGE,
            EngineStatus::Compile => sys::EFAIL_COMPILE,
            EngineStatus::CompilerCreate => sys::EFAIL_COMPILER_CREATE,
            EngineStatus::Other(code) => code,
        }
    }
}

impl fmt::Display for EngineStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineStatus::Success => f.write_str("success"),
            EngineStatus::Usage => f.write_str("usage error"),
            EngineStatus::Compile => f.write_str("compile failed"),
            EngineStatus::CompilerCreate => f.write_str("compiler creation failed"),
            EngineStatus::Other(code) => write!(f, "status {}", code),
        }
    }
}

/// Decoded result of one call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileOutput {
    pub status: EngineStatus,
    pub log: DiagnosticLog,
}

impl CompileOutput {
    /// INFO LOG text (errors and warnings), if the engine produced the section.
    pub fn error_log(&self) -> Option<&str> {
        self.log.info_log()
    }

    /// OBJ CODE text; always `None` for validation-only requests.
    pub fn translated_code(&self) -> Option<&str> {
        self.log.object_code()
    }

    pub fn variables(&self) -> Option<&str> {
        self.log.variables()
    }

    pub fn is_success(&self) -> bool {
        self.status == EngineStatus::Success
    }

    /// `(error_log, translated_code)`.
    pub fn into_parts(self) -> (Option<String>, Option<String>) {
        let mut error_log = None;
        let mut translated = None;
        for section in self.log.sections {
            match section.kind {
                SectionKind::InfoLog if error_log.is_none() => error_log = Some(section.text),
                SectionKind::ObjectCode if translated.is_none() => translated = Some(section.text),
                _ => {}
            }
        }
        (error_log, translated)
    }
}

// ============================================================
// Invocation
// ============================================================

/// A request that has passed every configuration check.
pub struct PreparedCall {
    source: CString,
    stage: ShaderStage,
    encoded: EncodedRequest,
    keep_object_code: bool,
}

impl PreparedCall {
    pub fn new(request: &CompileRequest) -> std::result::Result<Self, ConfigurationError> {
        let encoded = EncodedRequest::encode(request)?;
        let source = CString::new(request.source.as_bytes())
            .map_err(|e| ConfigurationError::InteriorNul {
                position: e.nul_position(),
            })?;
        Ok(Self {
            source,
            stage: request.stage,
            encoded,
            keep_object_code: request.target.wants_object_code(),
        })
    }

    pub fn encoded(&self) -> &EncodedRequest {
        &self.encoded
    }

    /// Run the call against `engine`. Both engine-heap blocks are released
    /// before this returns, whatever the outcome.
    pub fn run<E: Engine + ?Sized>(&self, engine: &E) -> std::result::Result<CompileOutput, ResourceError> {
        tracing::debug!(
            stage = %self.stage,
            input = ?self.encoded.input.slots(),
            output = ?self.encoded.output.slots(),
            "invoking validator"
        );

        let (code, raw) = call_entry_point(engine, &self.source, self.stage, &self.encoded)?;

        let status = EngineStatus::from(code);
        if status != EngineStatus::Success {
            tracing::warn!(%status, code, stage = %self.stage, "validator reported failure");
        }

        let mut log = DiagnosticLog::parse(&raw);
        if !self.keep_object_code {
            log.remove(&SectionKind::ObjectCode);
        }
        Ok(CompileOutput { status, log })
    }
}

fn call_entry_point<E: Engine + ?Sized>(
    engine: &E,
    source: &CStr,
    stage: ShaderStage,
    encoded: &EncodedRequest,
) -> std::result::Result<(c_int, String), ResourceError> {
    let mut slot = ResultSlot::allocate(engine)?;

    let code = unsafe {
        engine.validate(
            source.as_ptr(),
            stage.gl_enum() as c_int,
            encoded.input.as_ptr(),
            encoded.output.as_ptr(),
            encoded.options.as_ptr(),
            slot.as_out_ptr(),
        )
    };

    // The engine hands over ownership of whatever it stored in the slot.
    let log = unsafe { slot.take() }.map(ForeignString::into_string);
    if log.is_none() {
        tracing::warn!(stage = %stage, "validator returned no log");
    }
    Ok((code, log.unwrap_or_default()))
}

/// Run one request against `engine` without any locking.
pub fn invoke<E: Engine + ?Sized>(engine: &E, request: &CompileRequest) -> Result<CompileOutput> {
    let call = PreparedCall::new(request)?;
    Ok(call.run(engine)?)
}

// ============================================================
// Validator
// ============================================================

/// An engine instance with calls serialized behind a lock.
///
/// The engine is not reentrant; callers that need parallelism should create
/// one `Validator` per engine instance.
pub struct Validator<E: Engine = NativeEngine> {
    engine: Mutex<E>,
}

impl Validator<NativeEngine> {
    /// Load the engine described by `config`.
    pub fn load(config: &EngineConfig) -> Result<Self> {
        Ok(Self::new(NativeEngine::load(config)?))
    }

    /// Load the engine located through the environment.
    pub fn from_env() -> Result<Self> {
        Self::load(&EngineConfig::from_env())
    }
}

impl<E: Engine> Validator<E> {
    pub fn new(engine: E) -> Self {
        Self {
            engine: Mutex::new(engine),
        }
    }

    /// Encode, call and decode one request.
    ///
    /// Configuration errors are raised before the engine lock is taken.
    pub fn invoke(&self, request: &CompileRequest) -> Result<CompileOutput> {
        let call = PreparedCall::new(request)?;
        let engine = self.engine.lock();
        Ok(call.run(&*engine)?)
    }

    /// Validate `source` as `stage` with every other setting defaulted.
    pub fn validate(&self, stage: ShaderStage, source: &str) -> Result<CompileOutput> {
        self.invoke(&CompileRequest::new(source).stage(stage))
    }

    pub fn into_inner(self) -> E {
        self.engine.into_inner()
    }
}

// ============================================================
// Tests
// ============================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::c_void;
    use std::os::raw::c_char;

    use crate::dialect::{InputSpec, OutputSpec};
    use crate::engine::mock::{HeapEvent, MockEngine};
    use crate::error::ValidatorError;
    use crate::options::CompileOptions;

    const INFO_AND_CODE: &str = "#### BEGIN COMPILER 0 INFO LOG ####\n\n\n#### END COMPILER 0 INFO LOG ####\n\n\n\
#### BEGIN COMPILER 0 OBJ CODE ####\nvoid main(){}\n\n\n#### END COMPILER 0 OBJ CODE ####\n\n\n";

    const COMPILE_ERROR: &str = "#### BEGIN COMPILER 0 INFO LOG ####\nERROR: 0:1: 'foo' : syntax error\n\n\n#### END COMPILER 0 INFO LOG ####\n\n\n";

    fn assert_balanced(engine: &MockEngine) {
        assert_eq!(engine.allocations(), engine.releases());
        assert_eq!(engine.outstanding(), 0);
    }

    #[test]
    fn test_translate_returns_both_sections() {
        let engine = MockEngine::new(Some(INFO_AND_CODE), sys::ESUCCESS);
        let request = CompileRequest::new("void main(){}").translate_to(OutputSpec::Gles);
        let output = invoke(&engine, &request).unwrap();

        assert!(output.is_success());
        assert_eq!(output.error_log(), Some(""));
        assert_eq!(output.translated_code(), Some("void main(){}\n"));

        // slot + engine string
        assert_eq!(engine.allocations(), 2);
        assert_balanced(&engine);
    }

    #[test]
    fn test_validate_only_drops_object_code() {
        let engine = MockEngine::new(Some(INFO_AND_CODE), sys::ESUCCESS);
        let output = invoke(&engine, &CompileRequest::new("void main(){}")).unwrap();
        assert_eq!(output.translated_code(), None);
        assert!(output.error_log().is_some());
        assert_eq!(engine.calls()[0].output, vec![0, 0]);
    }

    #[test]
    fn test_buffers_reach_the_engine() {
        let engine = MockEngine::new(None, sys::ESUCCESS);
        let options = CompileOptions {
            ovr_multiview: Some(true),
            ext_draw_buffers: Some(2),
            ..Default::default()
        };
        let request = CompileRequest::new("#version 300 es\nvoid main(){}")
            .stage(ShaderStage::Vertex)
            .input(InputSpec::webgl(2))
            .translate_to(OutputSpec::hlsl(9))
            .options(options);
        invoke(&engine, &request).unwrap();

        let calls = engine.calls();
        assert_eq!(calls.len(), 1);
        let call = &calls[0];
        assert_eq!(call.source, "#version 300 es\nvoid main(){}");
        assert_eq!(call.shader_type, sys::GL_VERTEX_SHADER as c_int);
        assert_eq!(call.input, vec![1, 2]);
        assert_eq!(call.output, vec![2, 9]);
        assert_eq!(call.options, vec![0, 0, 0, 0, 0, 0, 0, 0, 0, 1, 0, 0, 2]);
    }

    #[test]
    fn test_failure_status_still_decodes() {
        let engine = MockEngine::new(Some(COMPILE_ERROR), sys::EFAIL_COMPILE);
        let output = invoke(&engine, &CompileRequest::new("foo")).unwrap();
        assert_eq!(output.status, EngineStatus::Compile);
        assert!(!output.is_success());
        assert_eq!(output.error_log(), Some("ERROR: 0:1: 'foo' : syntax error\n"));
        assert_balanced(&engine);
    }

    #[test]
    fn test_no_log_is_empty_not_null_deref() {
        let engine = MockEngine::new(None, sys::ESUCCESS);
        let output = invoke(&engine, &CompileRequest::new("void main(){}")).unwrap();
        assert!(output.log.is_empty());
        assert_eq!(output.error_log(), None);
        assert_eq!(engine.allocations(), 1);
        assert_balanced(&engine);
    }

    #[test]
    fn test_configuration_error_makes_no_call() {
        let engine = MockEngine::new(Some(INFO_AND_CODE), sys::ESUCCESS);
        let request = CompileRequest::new("void main(){}").translate_to(OutputSpec::glsl(100));
        let err = invoke(&engine, &request).err().unwrap();
        assert!(matches!(
            err,
            ValidatorError::Configuration(ConfigurationError::UnsupportedOutputVersion { .. })
        ));
        assert_eq!(engine.allocations(), 0);
        assert!(engine.calls().is_empty());
    }

    #[test]
    fn test_interior_nul_rejected() {
        let engine = MockEngine::new(None, sys::ESUCCESS);
        let err = invoke(&engine, &CompileRequest::new("void\0main")).err().unwrap();
        assert!(matches!(
            err,
            ValidatorError::Configuration(ConfigurationError::InteriorNul { position: 4 })
        ));
        assert_eq!(engine.allocations(), 0);
    }

    #[test]
    fn test_allocation_failure_makes_no_call() {
        let engine = MockEngine::failing_allocations();
        let err = invoke(&engine, &CompileRequest::new("void main(){}")).err().unwrap();
        assert!(matches!(err, ValidatorError::Resource(_)));
        assert!(engine.calls().is_empty());
        assert_balanced(&engine);
    }

    #[test]
    fn test_release_order() {
        let engine = MockEngine::new(Some(COMPILE_ERROR), sys::EFAIL_COMPILE);
        invoke(&engine, &CompileRequest::new("foo")).unwrap();

        let events = engine.events();
        assert_eq!(events.len(), 5);
        let (slot, string) = match (events[0], events[2]) {
            (HeapEvent::Allocate(slot), HeapEvent::Allocate(string)) => (slot, string),
            other => panic!("unexpected events {:?}", other),
        };
        assert_eq!(events[1], HeapEvent::Validate);
        assert_eq!(events[3], HeapEvent::Release(string));
        assert_eq!(events[4], HeapEvent::Release(slot));
    }

    #[test]
    fn test_into_parts() {
        let engine = MockEngine::new(Some(INFO_AND_CODE), sys::ESUCCESS);
        let output = invoke(
            &engine,
            &CompileRequest::new("void main(){}").translate_to(OutputSpec::hlsl(11)),
        )
        .unwrap();
        let (errors, code) = output.into_parts();
        assert_eq!(errors.as_deref(), Some(""));
        assert_eq!(code.as_deref(), Some("void main(){}\n"));
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(EngineStatus::from(0), EngineStatus::Success);
        assert_eq!(EngineStatus::from(1), EngineStatus::Usage);
        assert_eq!(EngineStatus::from(2), EngineStatus::Compile);
        assert_eq!(EngineStatus::from(3), EngineStatus::CompilerCreate);
        assert_eq!(EngineStatus::from(-5), EngineStatus::Other(-5));
        assert_eq!(EngineStatus::Other(-5).code(), -5);
    }

    #[test]
    fn test_validator_serializes_concurrent_calls() {
        let validator = Validator::new(MockEngine::new(Some(INFO_AND_CODE), sys::ESUCCESS));
        std::thread::scope(|scope| {
            for i in 0..8 {
                let validator = &validator;
                scope.spawn(move || {
                    let stage = ShaderStage::ALL[i % ShaderStage::ALL.len()];
                    let output = validator.validate(stage, "void main(){}").unwrap();
                    assert!(output.is_success());
                });
            }
        });

        let engine = validator.into_inner();
        assert_eq!(engine.calls().len(), 8);
        assert_eq!(engine.allocations(), 16);
        assert_balanced(&engine);
    }

    #[test]
    fn test_validator_rejects_before_locking() {
        let validator = Validator::new(MockEngine::new(None, sys::ESUCCESS));
        let request = CompileRequest::new("x").input(InputSpec::gles(4));
        assert!(validator.invoke(&request).is_err());
        assert_eq!(validator.into_inner().allocations(), 0);
    }

    /// Stores its log, then unwinds out of the entry point.
    struct UnwindingEngine(MockEngine);

    impl Engine for UnwindingEngine {
        fn allocate(&self, size: usize) -> *mut c_void {
            self.0.allocate(size)
        }

        unsafe fn release(&self, ptr: *mut c_void) {
            self.0.release(ptr)
        }

        unsafe fn validate(
            &self,
            source: *const c_char,
            shader_type: c_int,
            input: *const c_int,
            output: *const c_int,
            options: *const c_int,
            out_log: *mut *mut c_char,
        ) -> c_int {
            self.0.validate(source, shader_type, input, output, options, out_log);
            panic!("engine aborted mid-call");
        }
    }

    #[test]
    fn test_unwinding_engine_releases_everything() {
        let engine = UnwindingEngine(MockEngine::new(Some(COMPILE_ERROR), sys::ESUCCESS));
        let request = CompileRequest::new("void main(){}");
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| invoke(&engine, &request)));
        assert!(result.is_err());

        assert_eq!(engine.0.allocations(), 2);
        assert_balanced(&engine.0);
    }

    // ============================================================
    // C ABI path
    // ============================================================

    mod c_abi {
        use super::*;
        use std::alloc::{self, Layout};
        use std::ffi::{c_void, CStr};
        use std::os::raw::{c_char, c_int};

        use angle_validator_sys as sys;
        use std::sync::atomic::{AtomicIsize, Ordering};

        const HEADER: usize = 16;

        static LIVE_BLOCKS: AtomicIsize = AtomicIsize::new(0);

        unsafe extern "C" fn test_malloc(size: usize) -> *mut c_void {
            let layout = match Layout::from_size_align(size + HEADER, HEADER) {
                Ok(layout) => layout,
                Err(_) => return std::ptr::null_mut(),
            };
            let base = alloc::alloc_zeroed(layout);
            if base.is_null() {
                return std::ptr::null_mut();
            }
            (base as *mut usize).write(size);
            LIVE_BLOCKS.fetch_add(1, Ordering::SeqCst);
            base.add(HEADER) as *mut c_void
        }

        unsafe extern "C" fn test_free(ptr: *mut c_void) {
            if ptr.is_null() {
                return;
            }
            let base = (ptr as *mut u8).sub(HEADER);
            let size = (base as *mut usize).read();
            LIVE_BLOCKS.fetch_sub(1, Ordering::SeqCst);
            alloc::dealloc(base, Layout::from_size_align_unchecked(size + HEADER, HEADER));
        }

        // Echoes the request back as object code.
        unsafe extern "C" fn echo_validate(
            source: *const c_char,
            shader_type: c_int,
            input: *const c_int,
            output: *const c_int,
            options: *const c_int,
            out_log: *mut *mut c_char,
        ) -> c_int {
            let source = CStr::from_ptr(source).to_string_lossy();
            let input = std::slice::from_raw_parts(input, sys::INPUT_SPEC_LEN);
            let output = std::slice::from_raw_parts(output, sys::OUTPUT_SPEC_LEN);
            let options = std::slice::from_raw_parts(options, sys::COMPILE_OPTIONS_LEN);
            let log = format!(
                "#### BEGIN COMPILER 0 INFO LOG ####\n\n\n#### END COMPILER 0 INFO LOG ####\n\n\n\
#### BEGIN COMPILER 0 OBJ CODE ####\n// type={:#x} input={:?} output={:?} options={:?}\n{}\n\n#### END COMPILER 0 OBJ CODE ####\n\n\n",
                shader_type, input, output, options, source
            );
            let block = test_malloc(log.len() + 1) as *mut u8;
            std::ptr::copy_nonoverlapping(log.as_ptr(), block, log.len());
            *out_log = block as *mut c_char;
            if source.contains("error") {
                sys::EFAIL_COMPILE
            } else {
                sys::ESUCCESS
            }
        }

        #[test]
        fn test_native_engine_round_trip() {
            let before = LIVE_BLOCKS.load(Ordering::SeqCst);
            let validator = Validator::new(unsafe {
                NativeEngine::from_raw_parts(echo_validate, test_malloc, test_free)
            });
            assert!(validator.into_inner().path().is_none());

            let validator = Validator::new(unsafe {
                NativeEngine::from_raw_parts(echo_validate, test_malloc, test_free)
            });
            let request = CompileRequest::new("void main(){}")
                .stage(ShaderStage::Compute)
                .input(InputSpec::gles(31))
                .translate_to(OutputSpec::glsl(450));
            let output = validator.invoke(&request).unwrap();
            assert!(output.is_success());
            assert_eq!(
                output.translated_code(),
                Some(
                    "// type=0x91b9 input=[0, 31] output=[1, 450] options=[0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]\nvoid main(){}"
                )
            );
            assert_eq!(LIVE_BLOCKS.load(Ordering::SeqCst), before);

            let output = validator
                .invoke(&CompileRequest::new("an error here"))
                .unwrap();
            assert_eq!(output.status, EngineStatus::Compile);
            assert_eq!(output.translated_code(), None);
            assert_eq!(output.error_log(), Some(""));
            assert_eq!(LIVE_BLOCKS.load(Ordering::SeqCst), before);
        }
    }
}
