//! Virtual register file.
//!
//! SGPR/VGPR slots are lazily declared `Private` variables: a slot does not
//! exist until its first write, and that write fixes the slot's type. Loads
//! from a slot that was never written are a translation bug and fail hard.
//!
//! The special registers (VCC, M0, EXEC, SCC) are recorded host-side while
//! every observed write carries a compile-time-known value; promoting them
//! to SSA variables is the planned follow-up once non-constant writers
//! appear in real shaders.

use rspirv::spirv;
use tracing::warn;

use super::{GcnTranslator, TranslateError};
use crate::gcn::operand::{self, OperandKind};
use crate::gcn_ir::RegMask;
use crate::value::{ScalarType, SpirvPointer, SpirvValue, VectorType};

/// Host-side record of the hardware state registers.
#[derive(Debug, Clone, Copy)]
pub(crate) struct StateRegisters {
    pub vcc: u64,
    pub m0: u32,
    pub exec: u64,
    /// `None` while no write with a knowable value has been seen.
    pub scc: Option<bool>,
}

impl Default for StateRegisters {
    fn default() -> Self {
        Self {
            vcc: 0,
            m0: 0,
            // All lanes start active.
            exec: u64::MAX,
            scc: None,
        }
    }
}

/// A constant recognized in the instruction stream, keyed by its SSA id in
/// the translator's constant table.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ConstValue {
    pub ctype: ScalarType,
    pub bits: u64,
}

impl GcnTranslator<'_> {
    pub(crate) fn load_sgpr(&mut self, index: u32) -> Result<SpirvValue, TranslateError> {
        let ptr = *self
            .sgprs
            .get(&index)
            .ok_or(TranslateError::UnwrittenRegister { bank: 's', index })?;
        self.emit_value_load(ptr)
    }

    pub(crate) fn load_vgpr(&mut self, index: u32) -> Result<SpirvValue, TranslateError> {
        let ptr = *self
            .vgprs
            .get(&index)
            .ok_or(TranslateError::UnwrittenRegister { bank: 'v', index })?;
        self.emit_value_load(ptr)
    }

    pub(crate) fn store_sgpr(
        &mut self,
        index: u32,
        value: SpirvValue,
    ) -> Result<(), TranslateError> {
        let ptr = match self.sgprs.get(&index) {
            Some(ptr) => *ptr,
            None => {
                let ptr = self.declare_register('s', index, value.vtype);
                self.sgprs.insert(index, ptr);
                ptr
            }
        };
        self.emit_value_store(ptr, value, RegMask::X)
    }

    pub(crate) fn store_vgpr(
        &mut self,
        index: u32,
        value: SpirvValue,
    ) -> Result<(), TranslateError> {
        let ptr = match self.vgprs.get(&index) {
            Some(ptr) => *ptr,
            None => {
                let ptr = self.declare_register('v', index, value.vtype);
                self.vgprs.insert(index, ptr);
                ptr
            }
        };
        self.emit_value_store(ptr, value, RegMask::X)
    }

    fn declare_register(&mut self, bank: char, index: u32, vtype: VectorType) -> SpirvPointer {
        self.emit_dcl_vector_var(
            vtype,
            spirv::StorageClass::Private,
            &format!("{bank}{index}"),
        )
    }

    /// Decodes one SDST/SSRC/SRC operand field and materializes its value.
    ///
    /// `Ok(None)` means the operand was reported (FIXME) and the caller
    /// should skip the instruction.
    pub(crate) fn load_scalar_operand(
        &mut self,
        code: u32,
        reg_index: u32,
        literal: u32,
    ) -> Result<Option<SpirvValue>, TranslateError> {
        let value = match operand::classify(code) {
            OperandKind::Sgpr(_) => Some(self.load_sgpr(reg_index)?),
            OperandKind::Vgpr(_) => Some(self.load_vgpr(reg_index)?),
            OperandKind::VccLo => Some(self.const_u32_value(self.state_regs.vcc as u32)),
            OperandKind::VccHi => Some(self.const_u32_value((self.state_regs.vcc >> 32) as u32)),
            OperandKind::M0 => Some(self.const_u32_value(self.state_regs.m0)),
            OperandKind::ExecLo => Some(self.const_u32_value(self.state_regs.exec as u32)),
            OperandKind::ExecHi => Some(self.const_u32_value((self.state_regs.exec >> 32) as u32)),
            OperandKind::Vccz => Some(self.const_bool_value(self.state_regs.vcc == 0)),
            OperandKind::Execz => Some(self.const_bool_value(self.state_regs.exec == 0)),
            OperandKind::Scc => {
                let scc = self.state_regs.scc.unwrap_or_else(|| {
                    warn!("SCC read before any recorded write; assuming clear");
                    false
                });
                Some(self.const_bool_value(scc))
            }
            OperandKind::LdsDirect => {
                warn!("LDS-direct operand reads not handled yet");
                None
            }
            OperandKind::InlineInt(v) => Some(self.emit_inline_const_i32(v)),
            OperandKind::InlineFloat(v) => Some(self.emit_inline_const_f32(v)),
            OperandKind::Literal => Some(self.emit_literal_const(literal)),
            OperandKind::Reserved(code) => {
                warn!(code, "operand code outside the documented ranges");
                None
            }
        };
        Ok(value)
    }

    /// Loads a raw SRC field, deriving the register index from the code.
    pub(crate) fn load_src_field(
        &mut self,
        field: u32,
        literal: Option<u32>,
    ) -> Result<Option<SpirvValue>, TranslateError> {
        let reg_index = match operand::classify(field) {
            OperandKind::Sgpr(index) | OperandKind::Vgpr(index) => index,
            _ => 0,
        };
        self.load_scalar_operand(field, reg_index, literal.unwrap_or(0))
    }

    /// Dispatches an SDST operand store.
    pub(crate) fn store_scalar_operand(
        &mut self,
        code: u32,
        reg_index: u32,
        value: SpirvValue,
    ) -> Result<(), TranslateError> {
        match operand::classify(code) {
            OperandKind::Sgpr(_) => self.store_sgpr(reg_index, value),
            OperandKind::VccLo => {
                self.store_vcc(value, false);
                Ok(())
            }
            OperandKind::VccHi => {
                self.store_vcc(value, true);
                Ok(())
            }
            OperandKind::M0 => {
                self.store_m0(value);
                Ok(())
            }
            OperandKind::ExecLo => {
                self.store_exec(value, false);
                Ok(())
            }
            OperandKind::ExecHi => {
                self.store_exec(value, true);
                Ok(())
            }
            other => {
                warn!(code, ?other, "invalid scalar destination operand");
                Ok(())
            }
        }
    }

    pub(crate) fn store_vector_operand(
        &mut self,
        index: u32,
        value: SpirvValue,
    ) -> Result<(), TranslateError> {
        self.store_vgpr(index, value)
    }

    // VCC selects lanes for vector compares and carries; M0 indexes LDS/GDS
    // and message sends. Neither has hardware-visible consumers in the
    // lowered module yet, so known-constant writes are recorded and anything
    // else is reported as a gap.

    fn store_vcc(&mut self, value: SpirvValue, high_half: bool) {
        match self.const_values.get(&value.id) {
            Some(constant) => {
                let bits = constant.bits as u32 as u64;
                self.state_regs.vcc = if high_half {
                    (self.state_regs.vcc & 0xFFFF_FFFF) | (bits << 32)
                } else {
                    (self.state_regs.vcc & !0xFFFF_FFFF) | bits
                };
            }
            None => warn!("VCC write from a non-constant source is not modeled yet"),
        }
    }

    fn store_m0(&mut self, value: SpirvValue) {
        match self.const_values.get(&value.id) {
            Some(constant) => self.state_regs.m0 = constant.bits as u32,
            None => warn!("M0 write from a non-constant source is not modeled yet"),
        }
    }

    fn store_exec(&mut self, value: SpirvValue, high_half: bool) {
        match self.const_values.get(&value.id) {
            Some(constant) => {
                let bits = constant.bits as u32 as u64;
                self.state_regs.exec = if high_half {
                    (self.state_regs.exec & 0xFFFF_FFFF) | (bits << 32)
                } else {
                    (self.state_regs.exec & !0xFFFF_FFFF) | bits
                };
            }
            None => warn!("EXEC write from a non-constant source is not modeled yet"),
        }
    }

    // Constant materialization. Each id minted here lands in the constant
    // table so downstream special-register stores can recognize it.

    pub(crate) fn emit_inline_const_i32(&mut self, value: i32) -> SpirvValue {
        let type_id = self.scalar_type_id(ScalarType::Sint32);
        let id = self.builder.constant_bit32(type_id, value as u32);
        self.const_values.insert(
            id,
            ConstValue {
                ctype: ScalarType::Sint32,
                bits: value as u32 as u64,
            },
        );
        SpirvValue::new(VectorType::scalar(ScalarType::Sint32), id)
    }

    pub(crate) fn emit_inline_const_f32(&mut self, value: f32) -> SpirvValue {
        let type_id = self.scalar_type_id(ScalarType::Float32);
        let id = self.builder.constant_bit32(type_id, value.to_bits());
        self.const_values.insert(
            id,
            ConstValue {
                ctype: ScalarType::Float32,
                bits: value.to_bits() as u64,
            },
        );
        SpirvValue::new(VectorType::scalar(ScalarType::Float32), id)
    }

    pub(crate) fn emit_literal_const(&mut self, literal: u32) -> SpirvValue {
        let type_id = self.scalar_type_id(ScalarType::Uint32);
        let id = self.builder.constant_bit32(type_id, literal);
        self.const_values.insert(
            id,
            ConstValue {
                ctype: ScalarType::Uint32,
                bits: literal as u64,
            },
        );
        SpirvValue::new(VectorType::scalar(ScalarType::Uint32), id)
    }

    fn const_u32_value(&mut self, value: u32) -> SpirvValue {
        let type_id = self.scalar_type_id(ScalarType::Uint32);
        let id = self.builder.constant_bit32(type_id, value);
        SpirvValue::new(VectorType::scalar(ScalarType::Uint32), id)
    }

    pub(crate) fn const_bool_value(&mut self, value: bool) -> SpirvValue {
        let type_id = self.scalar_type_id(ScalarType::Bool);
        let id = if value {
            self.builder.constant_true(type_id)
        } else {
            self.builder.constant_false(type_id)
        };
        SpirvValue::new(VectorType::scalar(ScalarType::Bool), id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gcn::{ProgramInfo, ShaderKey, ShaderStage};
    use crate::input::{AnalysisInfo, ShaderInput};

    fn vertex_translator(analysis: &AnalysisInfo) -> GcnTranslator<'_> {
        let program = ProgramInfo::new(ShaderStage::Vertex, ShaderKey(0));
        GcnTranslator::new(program, analysis, &ShaderInput::default()).expect("translator")
    }

    #[test]
    fn load_of_unwritten_sgpr_is_fatal() {
        let analysis = AnalysisInfo::default();
        let mut t = vertex_translator(&analysis);

        let err = t.load_sgpr(3);
        assert!(matches!(
            err,
            Err(TranslateError::UnwrittenRegister { bank: 's', index: 3 })
        ));
    }

    #[test]
    fn store_fixes_slot_type_and_load_round_trips() {
        let analysis = AnalysisInfo::default();
        let mut t = vertex_translator(&analysis);

        let value = t.emit_inline_const_f32(2.0);
        t.store_sgpr(0, value).unwrap();
        let loaded = t.load_sgpr(0).unwrap();
        assert_eq!(loaded.vtype, VectorType::scalar(ScalarType::Float32));
    }

    #[test]
    fn literal_constants_are_recorded() {
        let analysis = AnalysisInfo::default();
        let mut t = vertex_translator(&analysis);

        let value = t.emit_literal_const(0xdead_beef);
        let recorded = t.const_values.get(&value.id).unwrap();
        assert_eq!(recorded.ctype, ScalarType::Uint32);
        assert_eq!(recorded.bits, 0xdead_beef);
    }

    #[test]
    fn vcc_halves_merge_on_constant_writes() {
        let analysis = AnalysisInfo::default();
        let mut t = vertex_translator(&analysis);

        let lo = t.emit_literal_const(0x1111_2222);
        t.store_scalar_operand(operand::VCC_LO, 0, lo).unwrap();
        assert_eq!(t.state_regs.vcc, 0x1111_2222);

        let hi = t.emit_literal_const(0x3333_4444);
        t.store_scalar_operand(operand::VCC_HI, 0, hi).unwrap();
        assert_eq!(t.state_regs.vcc, 0x3333_4444_1111_2222);
    }

    #[test]
    fn m0_records_constant_writes() {
        let analysis = AnalysisInfo::default();
        let mut t = vertex_translator(&analysis);

        let value = t.emit_literal_const(16);
        t.store_scalar_operand(operand::M0, 0, value).unwrap();
        assert_eq!(t.state_regs.m0, 16);
    }

    #[test]
    fn inline_operand_loads_mint_typed_constants() {
        let analysis = AnalysisInfo::default();
        let mut t = vertex_translator(&analysis);

        let int = t.load_src_field(operand::CONST_ZERO + 5, None).unwrap().unwrap();
        assert_eq!(int.vtype, VectorType::scalar(ScalarType::Sint32));

        let float = t
            .load_src_field(operand::FLOAT_NEG_2_0, None)
            .unwrap()
            .unwrap();
        assert_eq!(float.vtype, VectorType::scalar(ScalarType::Float32));
    }

    #[test]
    fn reserved_operand_codes_are_skipped() {
        let analysis = AnalysisInfo::default();
        let mut t = vertex_translator(&analysis);

        assert!(t.load_src_field(110, None).unwrap().is_none());
    }
}
