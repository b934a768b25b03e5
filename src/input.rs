//! Translator inputs gathered by the host: vertex-attribute semantics,
//! bound resource descriptors and the results of the pre-translation
//! analysis pass.

use crate::gcn_ir::ExportTarget;
use crate::sharp::{BufferSharp, SamplerSharp, TextureSharp};

/// One vertex-attribute semantic remapped by the fetch shader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexInputSemantic {
    /// Semantic index; doubles as the input location.
    pub semantic: u32,
    /// First VGPR the attribute is fetched into.
    pub vgpr: u32,
    /// Number of 32-bit elements, 1..=4.
    pub size_in_elements: u32,
}

/// A resource descriptor bound to the shader.
#[derive(Debug, Clone, Copy)]
pub enum ResourceKind<'a> {
    Buffer(&'a BufferSharp),
    Sampler(&'a SamplerSharp),
    Texture(&'a TextureSharp),
}

#[derive(Debug, Clone, Copy)]
pub struct ResourceBinding<'a> {
    pub kind: ResourceKind<'a>,
}

/// Everything the host knows about the shader's inputs.
///
/// Descriptors are borrowed read-only; they must not change while the
/// translator declares the shader interface.
#[derive(Debug, Clone, Default)]
pub struct ShaderInput<'a> {
    /// Present for vertex shaders driven by a fetch shader.
    pub vs_input_semantics: Option<Vec<VertexInputSemantic>>,
    pub resources: Vec<ResourceBinding<'a>>,
}

/// One export-parameter record discovered by the analysis pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportParam {
    pub target: ExportTarget,
    /// VGPR component indices the shader exports to this target.
    pub reg_indices: Vec<u32>,
}

/// Results of the whole-program analysis pass.
#[derive(Debug, Clone, Default)]
pub struct AnalysisInfo {
    /// Export targets the shader writes, with their used components.
    pub exp_params: Vec<ExportParam>,
    /// Instruction indices that are targets of backward branches. Structured
    /// loop constructs must be opened before the header instruction is
    /// emitted, so the analysis pass marks them up front.
    pub loop_headers: Vec<usize>,
}
