//! Export lowering.
//!
//! EXP instructions move VGPR lanes to the shader's outputs: position
//! exports go through the per-vertex block, parameter exports to the output
//! vectors declared from the analysis info. Color/depth targets belong to
//! the pixel stage and stay unhandled until it gets an interface pass.

use rspirv::spirv;
use tracing::warn;

use super::stage::PER_VERTEX_POSITION;
use super::{GcnTranslator, TranslateError};
use crate::gcn_ir::{ExportInst, ExportTarget};
use crate::value::{ScalarType, SpirvPointer, SpirvValue, VectorType};

impl GcnTranslator<'_> {
    pub(crate) fn emit_export(&mut self, ins: &ExportInst) -> Result<(), TranslateError> {
        if ins.compressed {
            warn!("compressed (half-packed) exports not handled yet");
            return Ok(());
        }
        if ins.en.is_empty() {
            return Ok(());
        }

        match ins.target {
            ExportTarget::Pos(0) => {
                let Some(block) = self.vs.per_vertex else {
                    warn!("position export without a per-vertex output block");
                    return Ok(());
                };
                let Some(value) = self.gather_export_lanes(ins)? else {
                    return Ok(());
                };

                let vec4 = VectorType::vec(ScalarType::Float32, 4);
                let type_id = self.vector_type_id(vec4);
                let ptr_type =
                    self.builder
                        .type_pointer(None, spirv::StorageClass::Output, type_id);
                let uint_type = self.builder.type_int(32, 0);
                let member = self.builder.constant_bit32(uint_type, PER_VERTEX_POSITION);
                let chain = self.builder.access_chain(ptr_type, None, block, [member])?;

                self.emit_value_store(SpirvPointer::new(vec4, chain), value, ins.en)
            }
            ExportTarget::Pos(index) => {
                warn!(index, "only position 0 is lowered");
                Ok(())
            }
            ExportTarget::Param(_) => {
                let Some(output) = self.vs.outputs.get(&ins.target).copied() else {
                    warn!(export = ?ins.target, "export target was not declared by the analysis pass");
                    return Ok(());
                };
                let Some(value) = self.gather_export_lanes(ins)? else {
                    return Ok(());
                };
                self.emit_value_store(output, value, ins.en)
            }
            ExportTarget::Null => Ok(()),
            ExportTarget::Mrt(_) | ExportTarget::MrtZ => {
                warn!(export = ?ins.target, "color/depth exports not handled yet");
                Ok(())
            }
        }
    }

    /// Loads the enabled source VGPRs and packs them into one float value,
    /// lane order matching the enable mask.
    fn gather_export_lanes(
        &mut self,
        ins: &ExportInst,
    ) -> Result<Option<SpirvValue>, TranslateError> {
        let mut lanes = Vec::with_capacity(4);
        for lane in 0..4u32 {
            if !ins.en.bit(lane) {
                continue;
            }
            let value = self.load_vgpr(ins.vsrc[lane as usize])?;
            let value = self.emit_register_bitcast(value, ScalarType::Float32)?;
            lanes.push(value.id);
        }

        match lanes.len() {
            0 => Ok(None),
            1 => Ok(Some(SpirvValue::new(
                VectorType::scalar(ScalarType::Float32),
                lanes[0],
            ))),
            count => {
                let vtype = VectorType::vec(ScalarType::Float32, count as u8);
                let type_id = self.vector_type_id(vtype);
                let id = self.builder.composite_construct(type_id, None, lanes)?;
                Ok(Some(SpirvValue::new(vtype, id)))
            }
        }
    }
}
