//! Decoded GCN instruction model.
//!
//! The binary decoder that produces these values lives outside this crate;
//! the translator only sees category-tagged instructions. The model is
//! intentionally narrow: it covers the scalar/vector ALU, flow control and
//! export features needed for vertex-shader bring-up, plus decoded shells
//! for the remaining categories so unhandled opcodes can be reported with a
//! precise payload instead of rejecting the whole shader up front.

/// Instruction category, as tagged by the decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstructionCategory {
    ScalarAlu,
    ScalarMemory,
    VectorAlu,
    VectorMemory,
    FlowControl,
    DataShare,
    VectorInterp,
    Export,
    DebugProfile,
    Unknown,
}

/// A single decoded GCN instruction.
#[derive(Debug, Clone, PartialEq)]
pub enum GcnInstruction {
    ScalarAlu(ScalarAluInst),
    ScalarMemory(ScalarMemInst),
    VectorAlu(VectorAluInst),
    VectorMemory(VectorMemInst),
    FlowControl(FlowControlInst),
    DataShare(DataShareInst),
    VectorInterp(VectorInterpInst),
    Export(ExportInst),
    DebugProfile(DebugProfileInst),
    /// An encoding the decoder did not recognize.
    Unknown { encoding: u32 },
}

impl GcnInstruction {
    pub fn category(&self) -> InstructionCategory {
        match self {
            GcnInstruction::ScalarAlu(_) => InstructionCategory::ScalarAlu,
            GcnInstruction::ScalarMemory(_) => InstructionCategory::ScalarMemory,
            GcnInstruction::VectorAlu(_) => InstructionCategory::VectorAlu,
            GcnInstruction::VectorMemory(_) => InstructionCategory::VectorMemory,
            GcnInstruction::FlowControl(_) => InstructionCategory::FlowControl,
            GcnInstruction::DataShare(_) => InstructionCategory::DataShare,
            GcnInstruction::VectorInterp(_) => InstructionCategory::VectorInterp,
            GcnInstruction::Export(_) => InstructionCategory::Export,
            GcnInstruction::DebugProfile(_) => InstructionCategory::DebugProfile,
            GcnInstruction::Unknown { .. } => InstructionCategory::Unknown,
        }
    }
}

/// Scalar ALU operation (SOP1/SOP2/SOPC subset).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarAluOp {
    Mov,
    Add,
    Sub,
    Mul,
    And,
    Or,
    Xor,
    Not,
    CmpEq,
    CmpLg,
}

/// A decoded scalar ALU instruction.
///
/// `dst` is a raw 7-bit SDST code, `src0`/`src1` raw 8-bit SSRC codes; the
/// register index is the code itself within the GPR ranges. `literal`
/// carries the trailing 32-bit payload when either source is the literal
/// code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScalarAluInst {
    pub op: ScalarAluOp,
    pub dst: u32,
    pub src0: u32,
    pub src1: Option<u32>,
    pub literal: Option<u32>,
}

/// Vector ALU operation (VOP1/VOP2 subset, float unless noted).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VectorAluOp {
    /// Bit-preserving move.
    Mov,
    Add,
    Sub,
    Mul,
    /// `vdst = src0 * src1 + vdst`.
    Mac,
    Min,
    Max,
}

/// One vector-instruction source: a 9-bit SRC code plus VOP3-style input
/// modifiers. 8-bit VSRC fields are normalized by the decoder to the 9-bit
/// VGPR range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SrcOperand {
    pub field: u32,
    pub neg: bool,
    pub abs: bool,
}

impl SrcOperand {
    pub fn new(field: u32) -> Self {
        Self {
            field,
            neg: false,
            abs: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VectorAluInst {
    pub op: VectorAluOp,
    /// Destination VGPR index.
    pub vdst: u32,
    pub src0: SrcOperand,
    pub src1: Option<SrcOperand>,
    pub literal: Option<u32>,
}

/// Flow-control operation (SOPP subset).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowControlOp {
    Nop,
    Endpgm,
    Branch,
    CbranchScc0,
    CbranchScc1,
    CbranchVccz,
    CbranchVccnz,
    CbranchExecz,
    CbranchExecnz,
}

/// A decoded flow-control instruction.
///
/// `target` is the signed branch offset in instructions, relative to the
/// instruction that follows the branch (the decoder converts the ISA's word
/// offset).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlowControlInst {
    pub op: FlowControlOp,
    pub target: Option<isize>,
}

/// Where an EXP instruction sends its data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportTarget {
    /// Color attachment 0..=7.
    Mrt(u8),
    MrtZ,
    Null,
    /// Position 0..=3; position 0 is the vertex position.
    Pos(u8),
    /// User parameter 0..=31.
    Param(u8),
}

impl ExportTarget {
    /// Decodes the 6-bit TGT field of the EXP encoding.
    pub fn from_raw(raw: u32) -> Option<Self> {
        match raw {
            0..=7 => Some(ExportTarget::Mrt(raw as u8)),
            8 => Some(ExportTarget::MrtZ),
            9 => Some(ExportTarget::Null),
            12..=15 => Some(ExportTarget::Pos((raw - 12) as u8)),
            32..=63 => Some(ExportTarget::Param((raw - 32) as u8)),
            _ => None,
        }
    }
}

/// A decoded EXP instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportInst {
    pub target: ExportTarget,
    /// Component enable mask; lane `i` takes `vsrc[i]`.
    pub en: RegMask,
    pub vsrc: [u32; 4],
    /// Half-packed export (two 16-bit values per VGPR).
    pub compressed: bool,
    /// Last export of this type in the program.
    pub done: bool,
}

/// Decoded shells for the categories the translator does not lower yet.
/// Fields mirror the common encodings so diagnostics can name the operands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScalarMemInst {
    pub opcode: u32,
    pub sbase: u32,
    pub sdst: u32,
    pub offset: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VectorMemInst {
    pub opcode: u32,
    pub vaddr: u32,
    pub vdata: u32,
    pub srsrc: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataShareInst {
    pub opcode: u32,
    pub addr: u32,
    pub data0: u32,
    pub vdst: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VectorInterpInst {
    pub opcode: u32,
    pub vdst: u32,
    pub attr: u32,
    pub chan: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DebugProfileInst {
    pub opcode: u32,
    pub simm: u32,
}

/// 4-bit write mask selecting active components of a 4-wide destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RegMask(pub u8);

impl RegMask {
    pub const XYZW: Self = Self(0b1111);
    pub const X: Self = Self(0b0001);

    /// Mask selecting the first `count` lanes.
    pub fn first_n(count: u8) -> Self {
        Self(((1u16 << count) - 1) as u8)
    }

    pub fn bit(self, lane: u32) -> bool {
        (self.0 >> lane) & 1 != 0
    }

    pub fn pop_count(self) -> u32 {
        (self.0 & 0xF).count_ones()
    }

    /// Index of the lowest set lane. Meaningless for an empty mask.
    pub fn first_set(self) -> u32 {
        (self.0 & 0xF).trailing_zeros()
    }

    pub fn is_empty(self) -> bool {
        self.0 & 0xF == 0
    }
}

/// Four 2-bit indices naming the source component for each destination lane.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegSwizzle(pub [u8; 4]);

impl RegSwizzle {
    pub const IDENTITY: Self = Self([0, 1, 2, 3]);

    pub fn lane(self, i: u32) -> u32 {
        self.0[i as usize] as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mask_first_n_selects_low_lanes() {
        assert_eq!(RegMask::first_n(0), RegMask(0));
        assert_eq!(RegMask::first_n(1), RegMask(0b0001));
        assert_eq!(RegMask::first_n(4), RegMask(0b1111));
    }

    #[test]
    fn mask_queries() {
        let m = RegMask(0b0110);
        assert_eq!(m.pop_count(), 2);
        assert_eq!(m.first_set(), 1);
        assert!(!m.bit(0));
        assert!(m.bit(1));
        assert!(m.bit(2));
        assert!(!m.bit(3));
    }

    #[test]
    fn export_target_decoding() {
        assert_eq!(ExportTarget::from_raw(0), Some(ExportTarget::Mrt(0)));
        assert_eq!(ExportTarget::from_raw(8), Some(ExportTarget::MrtZ));
        assert_eq!(ExportTarget::from_raw(12), Some(ExportTarget::Pos(0)));
        assert_eq!(ExportTarget::from_raw(35), Some(ExportTarget::Param(3)));
        assert_eq!(ExportTarget::from_raw(10), None);
    }
}
