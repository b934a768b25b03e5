//! Scalar and vector ALU emitters.
//!
//! Each emitter is a flat decode → load → compute → store sequence; the
//! only state it touches is the register file and the recorded state
//! registers. Arithmetic opcode selection is type-driven: GCN registers do
//! not distinguish float from integer bits, so the operation follows the
//! scalar type the first operand happens to carry, bitcasting the other
//! side to match.

use tracing::{debug, warn};

use super::typed::{GLSL_FMAX, GLSL_FMIN};
use super::{GcnTranslator, TranslateError};
use crate::gcn::operand::{self, OperandKind};
use crate::gcn_ir::{ScalarAluInst, ScalarAluOp, SrcOperand, VectorAluInst, VectorAluOp};
use crate::value::{ScalarType, SpirvValue};

impl GcnTranslator<'_> {
    pub(crate) fn emit_scalar_alu(&mut self, ins: &ScalarAluInst) -> Result<(), TranslateError> {
        let Some(src0) = self.load_src_field(ins.src0, ins.literal)? else {
            return Ok(());
        };

        match ins.op {
            ScalarAluOp::Mov => self.store_scalar_dst(ins, src0),
            ScalarAluOp::Not => {
                let value = self.emit_register_bitcast(src0, ScalarType::Uint32)?;
                let type_id = self.vector_type_id(value.vtype);
                let id = self.builder.not(type_id, None, value.id)?;
                self.state_regs.scc = None;
                self.store_scalar_dst(ins, SpirvValue::new(value.vtype, id))
            }
            ScalarAluOp::Add
            | ScalarAluOp::Sub
            | ScalarAluOp::Mul
            | ScalarAluOp::And
            | ScalarAluOp::Or
            | ScalarAluOp::Xor => {
                let Some(src1_field) = ins.src1 else {
                    warn!(op = ?ins.op, "two-operand scalar ALU instruction without src1");
                    return Ok(());
                };
                let Some(src1) = self.load_src_field(src1_field, ins.literal)? else {
                    return Ok(());
                };
                let result = self.emit_scalar_binary(ins.op, src0, src1)?;
                // The carry/condition output is not evaluated here, so the
                // recorded SCC becomes unknown.
                self.state_regs.scc = None;
                self.store_scalar_dst(ins, result)
            }
            ScalarAluOp::CmpEq | ScalarAluOp::CmpLg => {
                let Some(src1_field) = ins.src1 else {
                    warn!(op = ?ins.op, "scalar compare without src1");
                    return Ok(());
                };
                let Some(src1) = self.load_src_field(src1_field, ins.literal)? else {
                    return Ok(());
                };
                self.record_scalar_compare(ins.op, src0, src1);
                Ok(())
            }
        }
    }

    fn store_scalar_dst(
        &mut self,
        ins: &ScalarAluInst,
        value: SpirvValue,
    ) -> Result<(), TranslateError> {
        let reg_index = match operand::classify(ins.dst) {
            OperandKind::Sgpr(index) => index,
            _ => 0,
        };
        self.store_scalar_operand(ins.dst, reg_index, value)
    }

    fn emit_scalar_binary(
        &mut self,
        op: ScalarAluOp,
        a: SpirvValue,
        b: SpirvValue,
    ) -> Result<SpirvValue, TranslateError> {
        match op {
            ScalarAluOp::And | ScalarAluOp::Or | ScalarAluOp::Xor => {
                let a = self.emit_register_bitcast(a, ScalarType::Uint32)?;
                let b = self.emit_register_bitcast(b, ScalarType::Uint32)?;
                let type_id = self.vector_type_id(a.vtype);
                let id = match op {
                    ScalarAluOp::And => self.builder.bitwise_and(type_id, None, a.id, b.id)?,
                    ScalarAluOp::Or => self.builder.bitwise_or(type_id, None, a.id, b.id)?,
                    _ => self.builder.bitwise_xor(type_id, None, a.id, b.id)?,
                };
                Ok(SpirvValue::new(a.vtype, id))
            }
            ScalarAluOp::Add | ScalarAluOp::Sub | ScalarAluOp::Mul => {
                match a.vtype.ctype {
                    ScalarType::Float32 | ScalarType::Float64 => {
                        let b = self.emit_register_bitcast(b, a.vtype.ctype)?;
                        let type_id = self.vector_type_id(a.vtype);
                        let id = match op {
                            ScalarAluOp::Add => self.builder.f_add(type_id, None, a.id, b.id)?,
                            ScalarAluOp::Sub => self.builder.f_sub(type_id, None, a.id, b.id)?,
                            _ => self.builder.f_mul(type_id, None, a.id, b.id)?,
                        };
                        Ok(SpirvValue::new(a.vtype, id))
                    }
                    ScalarType::Sint32
                    | ScalarType::Sint64
                    | ScalarType::Uint32
                    | ScalarType::Uint64 => {
                        let b = self.emit_register_bitcast(b, a.vtype.ctype)?;
                        let type_id = self.vector_type_id(a.vtype);
                        let id = match op {
                            ScalarAluOp::Add => self.builder.i_add(type_id, None, a.id, b.id)?,
                            ScalarAluOp::Sub => self.builder.i_sub(type_id, None, a.id, b.id)?,
                            _ => self.builder.i_mul(type_id, None, a.id, b.id)?,
                        };
                        Ok(SpirvValue::new(a.vtype, id))
                    }
                    other => {
                        warn!(?other, ?op, "scalar arithmetic on an unsupported type");
                        Ok(a)
                    }
                }
            }
            _ => unreachable!("caller matched a binary opcode"),
        }
    }

    /// Compares record SCC when both sides are compile-time constants;
    /// anything else leaves it unknown until SCC is promoted to SSA.
    fn record_scalar_compare(&mut self, op: ScalarAluOp, a: SpirvValue, b: SpirvValue) {
        let (Some(ca), Some(cb)) = (
            self.const_values.get(&a.id).copied(),
            self.const_values.get(&b.id).copied(),
        ) else {
            debug!(?op, "scalar compare with non-constant operands leaves SCC unknown");
            self.state_regs.scc = None;
            return;
        };
        let equal = ca.bits as u32 == cb.bits as u32;
        self.state_regs.scc = Some(match op {
            ScalarAluOp::CmpEq => equal,
            _ => !equal,
        });
    }

    pub(crate) fn emit_vector_alu(&mut self, ins: &VectorAluInst) -> Result<(), TranslateError> {
        let Some(src0) = self.load_vector_src(ins.src0, ins.literal)? else {
            return Ok(());
        };

        match ins.op {
            // Bit-preserving; the destination slot takes the source type.
            VectorAluOp::Mov => self.store_vector_operand(ins.vdst, src0),
            VectorAluOp::Add
            | VectorAluOp::Sub
            | VectorAluOp::Mul
            | VectorAluOp::Min
            | VectorAluOp::Max
            | VectorAluOp::Mac => {
                let Some(src1_field) = ins.src1 else {
                    warn!(op = ?ins.op, "two-operand vector ALU instruction without src1");
                    return Ok(());
                };
                let Some(src1) = self.load_vector_src(src1_field, ins.literal)? else {
                    return Ok(());
                };

                let a = self.emit_register_bitcast(src0, ScalarType::Float32)?;
                let b = self.emit_register_bitcast(src1, ScalarType::Float32)?;
                let type_id = self.vector_type_id(a.vtype);
                let id = match ins.op {
                    VectorAluOp::Add => self.builder.f_add(type_id, None, a.id, b.id)?,
                    VectorAluOp::Sub => self.builder.f_sub(type_id, None, a.id, b.id)?,
                    VectorAluOp::Mul => self.builder.f_mul(type_id, None, a.id, b.id)?,
                    VectorAluOp::Min => {
                        return self
                            .emit_glsl_binary(GLSL_FMIN, a, b)
                            .and_then(|v| self.store_vector_operand(ins.vdst, v));
                    }
                    VectorAluOp::Max => {
                        return self
                            .emit_glsl_binary(GLSL_FMAX, a, b)
                            .and_then(|v| self.store_vector_operand(ins.vdst, v));
                    }
                    VectorAluOp::Mac => {
                        let acc = self.load_vgpr(ins.vdst)?;
                        let acc = self.emit_register_bitcast(acc, ScalarType::Float32)?;
                        let product = self.builder.f_mul(type_id, None, a.id, b.id)?;
                        self.builder.f_add(type_id, None, product, acc.id)?
                    }
                    _ => unreachable!("caller matched an arithmetic opcode"),
                };
                self.store_vector_operand(ins.vdst, SpirvValue::new(a.vtype, id))
            }
        }
    }

    /// Loads one vector-instruction source and applies its input modifiers.
    /// Modifiers are float operations, so a modified source is first
    /// reinterpreted as float bits.
    fn load_vector_src(
        &mut self,
        src: SrcOperand,
        literal: Option<u32>,
    ) -> Result<Option<SpirvValue>, TranslateError> {
        let Some(value) = self.load_src_field(src.field, literal)? else {
            return Ok(None);
        };
        if !src.abs && !src.neg {
            return Ok(Some(value));
        }

        let mut value = self.emit_register_bitcast(value, ScalarType::Float32)?;
        if src.abs {
            value = self.emit_register_absolute(value)?;
        }
        if src.neg {
            value = self.emit_register_negate(value)?;
        }
        Ok(Some(value))
    }
}
