//! Program-level GCN shader metadata: stage, execution model and the
//! content-addressed key used for debug naming and caching.

use core::fmt;

use rspirv::spirv;

pub mod operand;

/// Shader stage declared by the program header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Hull,
    Domain,
    Geometry,
    Pixel,
    Compute,
}

impl ShaderStage {
    /// SPIR-V execution model corresponding to this stage.
    pub fn execution_model(self) -> spirv::ExecutionModel {
        match self {
            ShaderStage::Vertex => spirv::ExecutionModel::Vertex,
            ShaderStage::Hull => spirv::ExecutionModel::TessellationControl,
            ShaderStage::Domain => spirv::ExecutionModel::TessellationEvaluation,
            ShaderStage::Geometry => spirv::ExecutionModel::Geometry,
            ShaderStage::Pixel => spirv::ExecutionModel::Fragment,
            ShaderStage::Compute => spirv::ExecutionModel::GLCompute,
        }
    }
}

/// Content-addressed shader identifier.
///
/// The key participates in pipeline-cache lookups on the host side and is
/// embedded in the emitted module as its debug source string, so individual
/// shaders can be recognized in a frame capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShaderKey(pub u64);

impl fmt::Display for ShaderKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

/// Program header information for one shader binary.
#[derive(Debug, Clone, Copy)]
pub struct ProgramInfo {
    pub stage: ShaderStage,
    pub execution_model: spirv::ExecutionModel,
    pub key: ShaderKey,
}

impl ProgramInfo {
    pub fn new(stage: ShaderStage, key: ShaderKey) -> Self {
        Self {
            stage,
            execution_model: stage.execution_model(),
            key,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_formats_as_fixed_width_hex() {
        assert_eq!(ShaderKey(0xab).to_string(), "00000000000000ab");
    }

    #[test]
    fn program_info_derives_execution_model() {
        let info = ProgramInfo::new(ShaderStage::Pixel, ShaderKey(1));
        assert_eq!(info.execution_model, spirv::ExecutionModel::Fragment);
    }
}
