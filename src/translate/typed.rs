//! Typed value layer over the module builder.
//!
//! GCN register lanes are untyped bit patterns; SPIR-V values are not. The
//! helpers here keep the emitted SSA graph well-typed by inserting bitcasts,
//! broadcasts, extracts and shuffles exactly where the two models disagree,
//! and by eliding them when a swizzle or extension turns out to be a no-op.

use rspirv::dr;
use rspirv::spirv::{self, Word};
use tracing::warn;

use super::{GcnTranslator, TranslateError};
use crate::gcn_ir::{RegMask, RegSwizzle};
use crate::value::{ScalarType, SpirvPointer, SpirvValue, VectorType};

// GLSL.std.450 extended instruction numbers.
pub(crate) const GLSL_FABS: u32 = 4;
pub(crate) const GLSL_SABS: u32 = 5;
pub(crate) const GLSL_FMIN: u32 = 37;
pub(crate) const GLSL_FMAX: u32 = 40;

/// Which zero comparison [`GcnTranslator::emit_register_zero_test`] emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ZeroTest {
    Zero,
    NonZero,
}

impl GcnTranslator<'_> {
    /// Declares a capability at most once per module.
    pub(crate) fn enable_capability(&mut self, cap: spirv::Capability) {
        if self.caps.insert(cap) {
            self.builder.capability(cap);
        }
    }

    /// Type id for a scalar type, enabling 64-bit capabilities on demand.
    pub(crate) fn scalar_type_id(&mut self, ctype: ScalarType) -> Word {
        if ctype == ScalarType::Float64 {
            self.enable_capability(spirv::Capability::Float64);
        }
        if matches!(ctype, ScalarType::Sint64 | ScalarType::Uint64) {
            self.enable_capability(spirv::Capability::Int64);
        }

        match ctype {
            ScalarType::Bool => self.builder.type_bool(),
            ScalarType::Sint32 => self.builder.type_int(32, 1),
            ScalarType::Sint64 => self.builder.type_int(64, 1),
            ScalarType::Uint32 => self.builder.type_int(32, 0),
            ScalarType::Uint64 => self.builder.type_int(64, 0),
            ScalarType::Float32 => self.builder.type_float(32),
            ScalarType::Float64 => self.builder.type_float(64),
            ScalarType::Unknown => {
                warn!("type id requested for an unknown scalar type");
                self.builder.type_int(32, 0)
            }
        }
    }

    pub(crate) fn vector_type_id(&mut self, vtype: VectorType) -> Word {
        let scalar = self.scalar_type_id(vtype.ctype);
        if vtype.ccount > 1 {
            self.builder.type_vector(scalar, vtype.ccount as u32)
        } else {
            scalar
        }
    }

    pub(crate) fn emit_value_load(
        &mut self,
        ptr: SpirvPointer,
    ) -> Result<SpirvValue, TranslateError> {
        let type_id = self.vector_type_id(ptr.vtype);
        let id = self.builder.load(type_id, None, ptr.id, None, vec![])?;
        Ok(SpirvValue::new(ptr.vtype, id))
    }

    /// Stores `value` into the lanes of `ptr` selected by `mask`.
    ///
    /// Mismatched scalar types bitcast; a scalar source broadcasts to the
    /// selected lane count; a partial mask load-modifies the destination so
    /// untouched lanes survive.
    pub(crate) fn emit_value_store(
        &mut self,
        ptr: SpirvPointer,
        value: SpirvValue,
        mask: RegMask,
    ) -> Result<(), TranslateError> {
        if (ptr.vtype.ccount as u32) < mask.pop_count() {
            return Err(TranslateError::MaskWiderThanDestination {
                mask: mask.0,
                ccount: ptr.vtype.ccount,
            });
        }

        let mut value = value;
        if value.vtype.ctype != ptr.vtype.ctype {
            value = self.emit_register_bitcast(value, ptr.vtype.ctype)?;
        }
        if value.vtype.ccount == 1 {
            value = self.emit_register_extend(value, mask.pop_count())?;
        }

        if ptr.vtype.ccount as u32 == mask.pop_count() {
            self.builder.store(ptr.id, value.id, None, vec![])?;
        } else {
            let current = self.emit_value_load(ptr)?;
            let merged = self.emit_register_insert(current, value, mask)?;
            self.builder.store(ptr.id, merged.id, None, vec![])?;
        }
        Ok(())
    }

    /// Reinterprets `value` as `dst_type`, adjusting the component count
    /// when exactly one side is a 64-bit type.
    pub(crate) fn emit_register_bitcast(
        &mut self,
        value: SpirvValue,
        dst_type: ScalarType,
    ) -> Result<SpirvValue, TranslateError> {
        if value.vtype.ctype == dst_type {
            return Ok(value);
        }

        let incompatible = || TranslateError::IncompatibleBitcast {
            from: value.vtype.ctype,
            count: value.vtype.ccount,
            to: dst_type,
        };
        let src_width = value.vtype.ctype.bit_width().ok_or_else(incompatible)?;
        let dst_width = dst_type.bit_width().ok_or_else(incompatible)?;

        let total_bits = src_width * value.vtype.ccount as u32;
        if total_bits % dst_width != 0 {
            return Err(incompatible());
        }
        let ccount = total_bits / dst_width;
        if !(1..=4).contains(&ccount) {
            return Err(incompatible());
        }

        let vtype = VectorType::vec(dst_type, ccount as u8);
        let type_id = self.vector_type_id(vtype);
        let id = self.builder.bitcast(type_id, None, value.id)?;
        Ok(SpirvValue::new(vtype, id))
    }

    /// Builds a `pop_count(mask)`-wide vector taking `swizzle[i]` for each
    /// selected lane. A scalar input broadcasts instead; an identity
    /// selection over the full input returns the input unchanged.
    pub(crate) fn emit_register_swizzle(
        &mut self,
        value: SpirvValue,
        swizzle: RegSwizzle,
        mask: RegMask,
    ) -> Result<SpirvValue, TranslateError> {
        if value.vtype.ccount == 1 {
            return self.emit_register_extend(value, mask.pop_count());
        }

        let mut indices = [0u32; 4];
        let mut count = 0usize;
        for lane in 0..4 {
            if mask.bit(lane) {
                indices[count] = swizzle.lane(lane);
                count += 1;
            }
        }
        if count == 0 {
            return Ok(value);
        }

        let identity = count as u8 == value.vtype.ccount
            && indices[..count].iter().enumerate().all(|(i, &c)| c == i as u32);
        if identity {
            return Ok(value);
        }

        let vtype = VectorType::vec(value.vtype.ctype, count as u8);
        let type_id = self.vector_type_id(vtype);
        let id = if count == 1 {
            self.builder
                .composite_extract(type_id, None, value.id, [indices[0]])?
        } else {
            self.builder.vector_shuffle(
                type_id,
                None,
                value.id,
                value.id,
                indices[..count].to_vec(),
            )?
        };
        Ok(SpirvValue::new(vtype, id))
    }

    pub(crate) fn emit_register_extract(
        &mut self,
        value: SpirvValue,
        mask: RegMask,
    ) -> Result<SpirvValue, TranslateError> {
        self.emit_register_swizzle(value, RegSwizzle::IDENTITY, mask)
    }

    /// Replaces the `mask`-selected lanes of `dst` with the lanes of `src`,
    /// keeping `dst`'s type.
    pub(crate) fn emit_register_insert(
        &mut self,
        dst: SpirvValue,
        src: SpirvValue,
        mask: RegMask,
    ) -> Result<SpirvValue, TranslateError> {
        let vtype = dst.vtype;
        if mask.is_empty() {
            return Ok(dst);
        }
        if vtype.ccount == 1 {
            // Both sides are scalar; the first mask bit picks the survivor.
            return Ok(if mask.bit(0) {
                SpirvValue::new(vtype, src.id)
            } else {
                dst
            });
        }

        let type_id = self.vector_type_id(vtype);
        let id = if src.vtype.ccount == 1 {
            // VectorShuffle needs two vectors, so a scalar source goes in
            // through CompositeInsert at the selected lane.
            self.builder
                .composite_insert(type_id, None, src.id, dst.id, [mask.first_set()])?
        } else {
            let mut components = [0u32; 4];
            let mut next_src = vtype.ccount as u32;
            for lane in 0..vtype.ccount as u32 {
                components[lane as usize] = if mask.bit(lane) {
                    let c = next_src;
                    next_src += 1;
                    c
                } else {
                    lane
                };
            }
            self.builder.vector_shuffle(
                type_id,
                None,
                dst.id,
                src.id,
                components[..vtype.ccount as usize].to_vec(),
            )?
        };
        Ok(SpirvValue::new(vtype, id))
    }

    pub(crate) fn emit_register_concat(
        &mut self,
        a: SpirvValue,
        b: SpirvValue,
    ) -> Result<SpirvValue, TranslateError> {
        let vtype = VectorType::vec(a.vtype.ctype, a.vtype.ccount + b.vtype.ccount);
        let type_id = self.vector_type_id(vtype);
        let id = self
            .builder
            .composite_construct(type_id, None, [a.id, b.id])?;
        Ok(SpirvValue::new(vtype, id))
    }

    /// Broadcasts a scalar to `lanes` components; `lanes == 1` is a no-op.
    pub(crate) fn emit_register_extend(
        &mut self,
        value: SpirvValue,
        lanes: u32,
    ) -> Result<SpirvValue, TranslateError> {
        if lanes == 1 {
            return Ok(value);
        }
        debug_assert!((2..=4).contains(&lanes));
        let vtype = VectorType::vec(value.vtype.ctype, lanes as u8);
        let type_id = self.vector_type_id(vtype);
        let ids = vec![value.id; lanes as usize];
        let id = self.builder.composite_construct(type_id, None, ids)?;
        Ok(SpirvValue::new(vtype, id))
    }

    pub(crate) fn emit_register_absolute(
        &mut self,
        value: SpirvValue,
    ) -> Result<SpirvValue, TranslateError> {
        match value.vtype.ctype {
            ScalarType::Float32 | ScalarType::Float64 => self.emit_glsl_unary(GLSL_FABS, value),
            ScalarType::Sint32 | ScalarType::Sint64 => self.emit_glsl_unary(GLSL_SABS, value),
            other => {
                warn!(?other, "cannot take the absolute value of this type");
                Ok(value)
            }
        }
    }

    pub(crate) fn emit_register_negate(
        &mut self,
        value: SpirvValue,
    ) -> Result<SpirvValue, TranslateError> {
        let type_id = self.vector_type_id(value.vtype);
        let id = match value.vtype.ctype {
            ScalarType::Float32 | ScalarType::Float64 => {
                self.builder.f_negate(type_id, None, value.id)?
            }
            ScalarType::Sint32 | ScalarType::Sint64 => {
                self.builder.s_negate(type_id, None, value.id)?
            }
            other => {
                warn!(?other, "cannot negate this type");
                return Ok(value);
            }
        };
        Ok(SpirvValue::new(value.vtype, id))
    }

    /// Compares an integer value against zero; the result is a Bool.
    pub(crate) fn emit_register_zero_test(
        &mut self,
        value: SpirvValue,
        test: ZeroTest,
    ) -> Result<SpirvValue, TranslateError> {
        let bool_type = VectorType::scalar(ScalarType::Bool);
        let type_id = self.vector_type_id(bool_type);

        let zero = if value.vtype.ctype.bit_width() == Some(64) {
            let u64_type = self.scalar_type_id(ScalarType::Uint64);
            self.builder.constant_bit64(u64_type, 0)
        } else {
            let u32_type = self.scalar_type_id(ScalarType::Uint32);
            self.builder.constant_bit32(u32_type, 0)
        };

        let id = match test {
            ZeroTest::Zero => self.builder.i_equal(type_id, None, value.id, zero)?,
            ZeroTest::NonZero => self.builder.i_not_equal(type_id, None, value.id, zero)?,
        };
        Ok(SpirvValue::new(bool_type, id))
    }

    /// Bitwise-ANDs every component with `mask`.
    pub(crate) fn emit_register_mask_bits(
        &mut self,
        value: SpirvValue,
        mask: u32,
    ) -> Result<SpirvValue, TranslateError> {
        let mask_vector = self.emit_build_const_vecu32(
            mask,
            mask,
            mask,
            mask,
            RegMask::first_n(value.vtype.ccount),
        );
        let type_id = self.vector_type_id(value.vtype);
        let id = self
            .builder
            .bitwise_and(type_id, None, value.id, mask_vector.id)?;
        Ok(SpirvValue::new(value.vtype, id))
    }

    pub(crate) fn emit_build_const_vecf32(
        &mut self,
        x: f32,
        y: f32,
        z: f32,
        w: f32,
        mask: RegMask,
    ) -> SpirvValue {
        let lanes = [x, y, z, w];
        let float_type = self.scalar_type_id(ScalarType::Float32);
        let mut ids = [0u32; 4];
        let mut count = 0usize;
        for (lane, v) in lanes.iter().enumerate() {
            if mask.bit(lane as u32) {
                ids[count] = self.builder.constant_bit32(float_type, v.to_bits());
                count += 1;
            }
        }
        self.finish_const_vector(ScalarType::Float32, &ids[..count])
    }

    pub(crate) fn emit_build_const_vecu32(
        &mut self,
        x: u32,
        y: u32,
        z: u32,
        w: u32,
        mask: RegMask,
    ) -> SpirvValue {
        let lanes = [x, y, z, w];
        let uint_type = self.scalar_type_id(ScalarType::Uint32);
        let mut ids = [0u32; 4];
        let mut count = 0usize;
        for (lane, v) in lanes.iter().enumerate() {
            if mask.bit(lane as u32) {
                ids[count] = self.builder.constant_bit32(uint_type, *v);
                count += 1;
            }
        }
        self.finish_const_vector(ScalarType::Uint32, &ids[..count])
    }

    pub(crate) fn emit_build_const_veci32(
        &mut self,
        x: i32,
        y: i32,
        z: i32,
        w: i32,
        mask: RegMask,
    ) -> SpirvValue {
        let lanes = [x, y, z, w];
        let int_type = self.scalar_type_id(ScalarType::Sint32);
        let mut ids = [0u32; 4];
        let mut count = 0usize;
        for (lane, v) in lanes.iter().enumerate() {
            if mask.bit(lane as u32) {
                ids[count] = self.builder.constant_bit32(int_type, *v as u32);
                count += 1;
            }
        }
        self.finish_const_vector(ScalarType::Sint32, &ids[..count])
    }

    /// Doubles are built from lane pairs: `xy` covers mask lanes 0/1, `zw`
    /// lanes 2/3.
    pub(crate) fn emit_build_const_vecf64(
        &mut self,
        xy: f64,
        zw: f64,
        mask: RegMask,
    ) -> SpirvValue {
        let double_type = self.scalar_type_id(ScalarType::Float64);
        let mut ids = [0u32; 2];
        let mut count = 0usize;
        if mask.bit(0) && mask.bit(1) {
            ids[count] = self.builder.constant_bit64(double_type, xy.to_bits());
            count += 1;
        }
        if mask.bit(2) && mask.bit(3) {
            ids[count] = self.builder.constant_bit64(double_type, zw.to_bits());
            count += 1;
        }
        self.finish_const_vector(ScalarType::Float64, &ids[..count])
    }

    fn finish_const_vector(&mut self, ctype: ScalarType, ids: &[Word]) -> SpirvValue {
        debug_assert!(!ids.is_empty());
        let vtype = VectorType::vec(ctype, ids.len().max(1) as u8);
        let id = if ids.len() > 1 {
            let type_id = self.vector_type_id(vtype);
            self.builder.constant_composite(type_id, ids.to_vec())
        } else {
            ids[0]
        };
        SpirvValue::new(vtype, id)
    }

    pub(crate) fn emit_glsl_unary(
        &mut self,
        instruction: u32,
        value: SpirvValue,
    ) -> Result<SpirvValue, TranslateError> {
        let type_id = self.vector_type_id(value.vtype);
        let id = self.builder.ext_inst(
            type_id,
            None,
            self.glsl_ext,
            instruction,
            [dr::Operand::IdRef(value.id)],
        )?;
        Ok(SpirvValue::new(value.vtype, id))
    }

    pub(crate) fn emit_glsl_binary(
        &mut self,
        instruction: u32,
        a: SpirvValue,
        b: SpirvValue,
    ) -> Result<SpirvValue, TranslateError> {
        let type_id = self.vector_type_id(a.vtype);
        let id = self.builder.ext_inst(
            type_id,
            None,
            self.glsl_ext,
            instruction,
            [dr::Operand::IdRef(a.id), dr::Operand::IdRef(b.id)],
        )?;
        Ok(SpirvValue::new(a.vtype, id))
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
    fn identity_swizzle_returns_input_unchanged() {
        let analysis = AnalysisInfo::default();
        let mut t = vertex_translator(&analysis);

        let v = t.emit_build_const_vecf32(1.0, 2.0, 3.0, 4.0, RegMask::XYZW);
        let swizzled = t
            .emit_register_swizzle(v, RegSwizzle::IDENTITY, RegMask::XYZW)
            .unwrap();
        assert_eq!(swizzled.id, v.id);
        assert_eq!(swizzled.vtype, v.vtype);
    }

    #[test]
    fn bitcast_round_trip_is_typed_equivalent() {
        let analysis = AnalysisInfo::default();
        let mut t = vertex_translator(&analysis);

        let v = t.emit_build_const_vecu32(0x3f80_0000, 0, 0, 0, RegMask::X);
        let cast = t.emit_register_bitcast(v, ScalarType::Float32).unwrap();
        assert_eq!(cast.vtype, VectorType::scalar(ScalarType::Float32));
        let back = t.emit_register_bitcast(cast, ScalarType::Uint32).unwrap();
        assert_eq!(back.vtype, v.vtype);
    }

    #[test]
    fn bitcast_same_type_is_identity() {
        let analysis = AnalysisInfo::default();
        let mut t = vertex_translator(&analysis);

        let v = t.emit_build_const_vecu32(7, 0, 0, 0, RegMask::X);
        let cast = t.emit_register_bitcast(v, ScalarType::Uint32).unwrap();
        assert_eq!(cast.id, v.id);
    }

    #[test]
    fn bitcast_adjusts_component_count_across_widths() {
        let analysis = AnalysisInfo::default();
        let mut t = vertex_translator(&analysis);

        let v = t.emit_build_const_vecu32(1, 2, 0, 0, RegMask::first_n(2));
        let wide = t.emit_register_bitcast(v, ScalarType::Uint64).unwrap();
        assert_eq!(wide.vtype, VectorType::scalar(ScalarType::Uint64));
        let narrow = t.emit_register_bitcast(wide, ScalarType::Float32).unwrap();
        assert_eq!(narrow.vtype, VectorType::vec(ScalarType::Float32, 2));
    }

    #[test]
    fn bitcast_of_bool_is_fatal() {
        let analysis = AnalysisInfo::default();
        let mut t = vertex_translator(&analysis);

        let v = t.emit_build_const_vecu32(1, 0, 0, 0, RegMask::X);
        let zero = t.emit_register_zero_test(v, ZeroTest::Zero).unwrap();
        let err = t.emit_register_bitcast(zero, ScalarType::Uint32);
        assert!(matches!(
            err,
            Err(TranslateError::IncompatibleBitcast { .. })
        ));
    }

    #[test]
    fn insert_with_empty_mask_returns_destination() {
        let analysis = AnalysisInfo::default();
        let mut t = vertex_translator(&analysis);

        let dst = t.emit_build_const_vecf32(1.0, 2.0, 3.0, 4.0, RegMask::XYZW);
        let src = t.emit_build_const_vecf32(9.0, 0.0, 0.0, 0.0, RegMask::X);
        let merged = t.emit_register_insert(dst, src, RegMask(0)).unwrap();
        assert_eq!(merged.id, dst.id);
    }

    #[test]
    fn extend_to_one_lane_returns_input() {
        let analysis = AnalysisInfo::default();
        let mut t = vertex_translator(&analysis);

        let v = t.emit_build_const_vecf32(5.0, 0.0, 0.0, 0.0, RegMask::X);
        let extended = t.emit_register_extend(v, 1).unwrap();
        assert_eq!(extended.id, v.id);
    }

    #[test]
    fn extract_single_lane_is_scalar() {
        let analysis = AnalysisInfo::default();
        let mut t = vertex_translator(&analysis);

        let v = t.emit_build_const_vecf32(1.0, 2.0, 3.0, 4.0, RegMask::XYZW);
        let lane = t.emit_register_extract(v, RegMask(0b0100)).unwrap();
        assert_eq!(lane.vtype, VectorType::scalar(ScalarType::Float32));
        assert_ne!(lane.id, v.id);
    }

    #[test]
    fn concat_widens_component_count() {
        let analysis = AnalysisInfo::default();
        let mut t = vertex_translator(&analysis);

        let a = t.emit_build_const_vecf32(1.0, 2.0, 0.0, 0.0, RegMask::first_n(2));
        let b = t.emit_build_const_vecf32(3.0, 0.0, 0.0, 0.0, RegMask::X);
        let joined = t.emit_register_concat(a, b).unwrap();
        assert_eq!(joined.vtype, VectorType::vec(ScalarType::Float32, 3));
    }

    #[test]
    fn double_constants_build_from_lane_pairs() {
        let analysis = AnalysisInfo::default();
        let mut t = vertex_translator(&analysis);

        let pair = t.emit_build_const_vecf64(1.5, -2.5, RegMask::XYZW);
        assert_eq!(pair.vtype, VectorType::vec(ScalarType::Float64, 2));

        let single = t.emit_build_const_vecf64(3.0, 0.0, RegMask::first_n(2));
        assert_eq!(single.vtype, VectorType::scalar(ScalarType::Float64));
    }

    #[test]
    fn mask_bits_preserves_the_value_type() {
        let analysis = AnalysisInfo::default();
        let mut t = vertex_translator(&analysis);

        let v = t.emit_build_const_vecu32(1, 2, 3, 4, RegMask::XYZW);
        let masked = t.emit_register_mask_bits(v, 0xffff_ffff).unwrap();
        assert_eq!(masked.vtype, v.vtype);
        assert_ne!(masked.id, v.id);
    }

    fn emitted_ops(t: GcnTranslator<'_>) -> Vec<spirv::Op> {
        let shader = t.finalize().unwrap();
        let module = rspirv::dr::load_words(&shader.spirv).unwrap();
        module
            .functions
            .iter()
            .flat_map(|f| f.blocks.iter())
            .flat_map(|b| b.instructions.iter())
            .map(|i| i.class.opcode)
            .collect()
    }

    #[test]
    fn masked_scalar_store_bitcasts_then_injects() {
        let analysis = AnalysisInfo::default();
        let mut t = vertex_translator(&analysis);

        let dst = t.emit_dcl_vector_var(
            VectorType::vec(ScalarType::Float32, 4),
            spirv::StorageClass::Private,
            "dst",
        );
        let value = t.emit_build_const_veci32(7, 0, 0, 0, RegMask::X);
        t.emit_value_store(dst, value, RegMask(0b0010)).unwrap();

        let ops = emitted_ops(t);
        assert!(ops.contains(&spirv::Op::Bitcast));
        assert!(ops.contains(&spirv::Op::Load));
        assert!(ops.contains(&spirv::Op::CompositeInsert));
        assert!(ops.contains(&spirv::Op::Store));
        assert!(!ops.contains(&spirv::Op::VectorShuffle));
    }

    #[test]
    fn masked_multi_lane_scalar_store_broadcasts_then_shuffles() {
        let analysis = AnalysisInfo::default();
        let mut t = vertex_translator(&analysis);

        let dst = t.emit_dcl_vector_var(
            VectorType::vec(ScalarType::Float32, 4),
            spirv::StorageClass::Private,
            "dst",
        );
        let value = t.emit_build_const_veci32(7, 0, 0, 0, RegMask::X);
        t.emit_value_store(dst, value, RegMask(0b0110)).unwrap();

        let ops = emitted_ops(t);
        assert!(ops.contains(&spirv::Op::Bitcast));
        assert!(ops.contains(&spirv::Op::CompositeConstruct));
        assert!(ops.contains(&spirv::Op::Load));
        assert!(ops.contains(&spirv::Op::VectorShuffle));
        assert!(ops.contains(&spirv::Op::Store));
    }

    #[test]
    fn store_mask_wider_than_destination_is_fatal() {
        let analysis = AnalysisInfo::default();
        let mut t = vertex_translator(&analysis);

        let dst = t.emit_dcl_vector_var(
            VectorType::scalar(ScalarType::Float32),
            spirv::StorageClass::Private,
            "dst",
        );
        let value = t.emit_build_const_vecf32(1.0, 0.0, 0.0, 0.0, RegMask::X);
        let err = t.emit_value_store(dst, value, RegMask(0b0011));
        assert!(matches!(
            err,
            Err(TranslateError::MaskWiderThanDestination { .. })
        ));
    }
}
