//! Typed wrappers over raw SPIR-V SSA ids.
//!
//! GCN registers are untyped 32-bit lanes while SPIR-V is a strictly typed
//! SSA graph; every id the translator hands around therefore carries its
//! scalar type and component count so the emission helpers can insert
//! bitcasts, broadcasts and shuffles where the two models disagree.

use rspirv::spirv::Word;

/// Scalar component type of a value or pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarType {
    Bool,
    Sint32,
    Sint64,
    Uint32,
    Uint64,
    Float32,
    Float64,
    /// Placeholder for ids whose type has not been established.
    Unknown,
}

impl ScalarType {
    /// 64-bit types occupy two GCN register lanes.
    pub fn is_wide(self) -> bool {
        matches!(
            self,
            ScalarType::Sint64 | ScalarType::Uint64 | ScalarType::Float64
        )
    }

    /// Bit width, when the type has one.
    pub fn bit_width(self) -> Option<u32> {
        match self {
            ScalarType::Sint32 | ScalarType::Uint32 | ScalarType::Float32 => Some(32),
            ScalarType::Sint64 | ScalarType::Uint64 | ScalarType::Float64 => Some(64),
            ScalarType::Bool | ScalarType::Unknown => None,
        }
    }
}

/// A scalar or vector type: component type plus component count (1..=4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VectorType {
    pub ctype: ScalarType,
    pub ccount: u8,
}

impl VectorType {
    pub fn scalar(ctype: ScalarType) -> Self {
        Self { ctype, ccount: 1 }
    }

    pub fn vec(ctype: ScalarType, ccount: u8) -> Self {
        debug_assert!((1..=4).contains(&ccount));
        Self { ctype, ccount }
    }

    pub fn is_scalar(self) -> bool {
        self.ccount == 1
    }
}

/// An SSA result already materialized in the module.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpirvValue {
    pub vtype: VectorType,
    pub id: Word,
}

impl SpirvValue {
    pub fn new(vtype: VectorType, id: Word) -> Self {
        Self { vtype, id }
    }
}

/// A typed pointer SSA id, the target of loads and stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpirvPointer {
    pub vtype: VectorType,
    pub id: Word,
}

impl SpirvPointer {
    pub fn new(vtype: VectorType, id: Word) -> Self {
        Self { vtype, id }
    }
}
