//! GCN → SPIR-V translation.
//!
//! One [`GcnTranslator`] instance compiles one shader: construction declares
//! the stage interface from the host-provided descriptors, the caller feeds
//! each decoded instruction to [`GcnTranslator::process`], and
//! [`GcnTranslator::finalize`] wraps the stage entry point and assembles the
//! binary. The translator owns the module builder exclusively and keeps no
//! global state; concurrent compilation uses one instance per shader.

use std::collections::{HashMap, HashSet};

use rspirv::binary::Assemble;
use rspirv::dr;
use rspirv::spirv::{self, Word};
use tracing::{debug, warn};

use crate::gcn::{ProgramInfo, ShaderKey, ShaderStage};
use crate::gcn_ir::{
    DataShareInst, DebugProfileInst, GcnInstruction, ScalarMemInst, VectorInterpInst,
    VectorMemInst,
};
use crate::input::{AnalysisInfo, ShaderInput};
use crate::value::{ScalarType, SpirvPointer};

mod alu;
mod exp;
mod flow;
mod regs;
mod stage;
mod typed;

use flow::FlowState;
use regs::{ConstValue, StateRegisters};
use stage::VertexContext;

/// Fatal translation failures.
///
/// Everything else — unhandled categories, unknown opcodes, operand codes
/// outside the documented ranges — is logged and skipped, so a module can
/// still be produced (possibly semantically incomplete) for triage.
#[derive(Debug, thiserror::Error)]
pub enum TranslateError {
    #[error("read of {bank}{index} before any write")]
    UnwrittenRegister { bank: char, index: u32 },
    #[error("bitcast of {count}x {from:?} to {to:?} does not preserve width")]
    IncompatibleBitcast {
        from: ScalarType,
        count: u8,
        to: ScalarType,
    },
    #[error("write mask {mask:#06b} selects more lanes than the {ccount}-component destination")]
    MaskWiderThanDestination { mask: u8, ccount: u8 },
    #[error("SPIR-V builder error: {0}")]
    Builder(#[from] dr::Error),
}

/// A finished translation: the assembled SPIR-V words plus the identity the
/// host needs to wrap them into a pipeline-cache entry.
#[derive(Debug, Clone)]
pub struct ShaderTranslation {
    pub stage: ShaderStage,
    pub spirv: Vec<u32>,
    pub key: ShaderKey,
}

impl ShaderTranslation {
    /// Little-endian byte view of the module, as consumed by
    /// `vkCreateShaderModule`.
    pub fn bytes(&self) -> Vec<u8> {
        bytemuck::cast_slice::<u32, u8>(&self.spirv).to_vec()
    }
}

/// Stateful translator for a single shader program.
pub struct GcnTranslator<'a> {
    builder: dr::Builder,
    program: ProgramInfo,
    analysis: &'a AnalysisInfo,

    /// Imported GLSL.std.450 instruction set (abs/min/max live there).
    glsl_ext: Word,
    /// Entry-point id, allocated up front so the execution mode and debug
    /// name can reference it before the wrapper function exists.
    entry_point: Word,
    /// Input/Output variables referenced by the module, in declaration
    /// order; becomes the OpEntryPoint interface list.
    interfaces: Vec<Word>,
    /// Capabilities already declared, so each appears once in the module.
    caps: HashSet<spirv::Capability>,
    inside_function: bool,

    /// Scalar and vector GPR banks. A slot is absent until its first write,
    /// which fixes the slot's type and declares the backing variable.
    sgprs: HashMap<u32, SpirvPointer>,
    vgprs: HashMap<u32, SpirvPointer>,
    state_regs: StateRegisters,
    /// Ids minted from inline/literal constants, so later stores to VCC/M0
    /// can recognize a compile-time-known source.
    const_values: HashMap<Word, ConstValue>,

    /// Uniform-buffer block types keyed by stride, decorated exactly once.
    ubo_types: HashMap<u32, Word>,
    vs: VertexContext,
    flow: FlowState,
}

impl<'a> GcnTranslator<'a> {
    /// Builds the translator and declares the stage interface.
    ///
    /// The resource descriptors inside `input` are read here and not
    /// retained; they may be released once construction returns.
    pub fn new(
        program: ProgramInfo,
        analysis: &'a AnalysisInfo,
        input: &ShaderInput<'_>,
    ) -> Result<Self, TranslateError> {
        let mut builder = dr::Builder::new();
        builder.set_version(1, 0);

        let glsl_ext = builder.ext_inst_import("GLSL.std.450");
        let entry_point = builder.id();

        // Record the shader key as the debug source so the module can be
        // matched back to its cache entry in a frame capture.
        let key_string = builder.string(program.key.to_string());
        builder.source(
            spirv::SourceLanguage::Unknown,
            0,
            Some(key_string),
            None::<String>,
        );

        builder.memory_model(spirv::AddressingModel::Logical, spirv::MemoryModel::GLSL450);

        let mut translator = Self {
            builder,
            program,
            analysis,
            glsl_ext,
            entry_point,
            interfaces: Vec::new(),
            caps: HashSet::new(),
            inside_function: false,
            sgprs: HashMap::new(),
            vgprs: HashMap::new(),
            state_regs: StateRegisters::default(),
            const_values: HashMap::new(),
            ubo_types: HashMap::new(),
            vs: VertexContext::default(),
            flow: FlowState::default(),
        };
        translator.emit_init(input)?;
        Ok(translator)
    }

    /// Translates one decoded instruction, in program order.
    pub fn process(&mut self, ins: &GcnInstruction) -> Result<(), TranslateError> {
        self.flow_pre_instruction()?;

        match ins {
            GcnInstruction::ScalarAlu(i) => self.emit_scalar_alu(i)?,
            GcnInstruction::ScalarMemory(i) => self.emit_scalar_memory(i),
            GcnInstruction::VectorAlu(i) => self.emit_vector_alu(i)?,
            GcnInstruction::VectorMemory(i) => self.emit_vector_memory(i),
            GcnInstruction::FlowControl(i) => self.emit_flow_control(i)?,
            GcnInstruction::DataShare(i) => self.emit_data_share(i),
            GcnInstruction::VectorInterp(i) => self.emit_vector_interp(i),
            GcnInstruction::Export(i) => self.emit_export(i)?,
            GcnInstruction::DebugProfile(i) => self.emit_debug_profile(i),
            GcnInstruction::Unknown { encoding } => {
                warn!(encoding = *encoding, "unrecognized instruction encoding; skipping");
            }
        }

        self.flow.pc += 1;
        Ok(())
    }

    /// Emits the stage entry-point wrapper and assembles the module.
    pub fn finalize(mut self) -> Result<ShaderTranslation, TranslateError> {
        match self.program.stage {
            ShaderStage::Vertex => self.emit_vs_finalize()?,
            // The remaining stages have no lowering yet; give them an empty
            // `main` so the entry point always names a defined function.
            _ => self.emit_empty_main()?,
        }

        let interfaces = std::mem::take(&mut self.interfaces);
        self.builder.entry_point(
            self.program.execution_model,
            self.entry_point,
            "main",
            interfaces,
        );
        self.builder.name(self.entry_point, "main");

        let module = self.builder.module();
        Ok(ShaderTranslation {
            stage: self.program.stage,
            spirv: module.assemble(),
            key: self.program.key,
        })
    }

    // Categories without a lowering yet. Each is reachable and reports the
    // decoded operands, then produces no SPIR-V for the instruction.

    fn emit_scalar_memory(&mut self, ins: &ScalarMemInst) {
        warn!(
            opcode = ins.opcode,
            sbase = ins.sbase,
            sdst = ins.sdst,
            offset = ins.offset,
            "scalar memory instruction not handled yet"
        );
    }

    fn emit_vector_memory(&mut self, ins: &VectorMemInst) {
        warn!(
            opcode = ins.opcode,
            vaddr = ins.vaddr,
            vdata = ins.vdata,
            srsrc = ins.srsrc,
            "vector memory instruction not handled yet"
        );
    }

    fn emit_data_share(&mut self, ins: &DataShareInst) {
        warn!(
            opcode = ins.opcode,
            addr = ins.addr,
            "LDS/GDS instruction not handled yet"
        );
    }

    fn emit_vector_interp(&mut self, ins: &VectorInterpInst) {
        warn!(
            opcode = ins.opcode,
            attr = ins.attr,
            chan = ins.chan,
            "interpolation instruction not handled yet"
        );
    }

    fn emit_debug_profile(&mut self, ins: &DebugProfileInst) {
        debug!(
            opcode = ins.opcode,
            simm = ins.simm,
            "debug/profile instruction ignored"
        );
    }
}
