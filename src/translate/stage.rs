//! Per-stage module setup and entry-point wrapping.
//!
//! Every stage shares the same scaffold: common capabilities at
//! construction, a stage-specific interface declaration pass, and a
//! `main` wrapper emitted at finalize. Only the vertex stage has a full
//! lowering; the other stages produce a valid, functionally-empty module
//! until their interface passes are written.

use std::collections::HashMap;

use rspirv::dr::{self, Operand};
use rspirv::spirv::{self, Word};
use tracing::warn;

use super::{GcnTranslator, TranslateError};
use crate::gcn::ShaderStage;
use crate::gcn_ir::ExportTarget;
use crate::input::{ResourceKind, ShaderInput};
use crate::value::{ScalarType, SpirvPointer, VectorType};

/// Member index of `gl_Position` in the per-vertex output block. Point
/// size and the clip/cull distance arrays are reserved follow-on members.
pub(crate) const PER_VERTEX_POSITION: u32 = 0;

/// Vertex-stage state built up during interface declaration.
#[derive(Default)]
pub(crate) struct VertexContext {
    pub fetch_fn: Option<Word>,
    pub main_fn: Option<Word>,
    /// Input variables keyed by semantic index.
    pub inputs: HashMap<u32, SpirvPointer>,
    /// Output variables keyed by export target.
    pub outputs: HashMap<ExportTarget, SpirvPointer>,
    /// The per-vertex output block variable.
    pub per_vertex: Option<Word>,
    /// Uniform-buffer variables keyed by resource index.
    pub ubos: HashMap<u32, Word>,
}

impl GcnTranslator<'_> {
    pub(crate) fn emit_init(&mut self, input: &ShaderInput<'_>) -> Result<(), TranslateError> {
        self.enable_capability(spirv::Capability::Shader);
        self.enable_capability(spirv::Capability::ImageQuery);

        match self.program.stage {
            ShaderStage::Vertex => self.emit_vs_init(input),
            // Interface lowering for the remaining stages has not been
            // written; their modules stay functionally empty.
            ShaderStage::Hull
            | ShaderStage::Domain
            | ShaderStage::Geometry
            | ShaderStage::Pixel
            | ShaderStage::Compute => Ok(()),
        }
    }

    fn emit_vs_init(&mut self, input: &ShaderInput<'_>) -> Result<(), TranslateError> {
        self.enable_capability(spirv::Capability::DrawParameters);
        self.builder.extension("SPV_KHR_shader_draw_parameters");

        self.emit_dcl_vertex_input(input);
        self.emit_dcl_vertex_output();
        self.emit_dcl_uniform_buffers(input);
        self.emit_fetch_shader(input)?;

        // The user main function; translated instructions stream into it.
        let main_fn = self.builder.id();
        self.builder.name(main_fn, "vsMain");
        self.vs.main_fn = Some(main_fn);
        self.emit_function_begin(main_fn)?;

        if let Some(fetch_fn) = self.vs.fetch_fn {
            let void = self.builder.type_void();
            self.builder.function_call(void, None, fetch_fn, vec![])?;
        }
        Ok(())
    }

    fn emit_dcl_vertex_input(&mut self, input: &ShaderInput<'_>) {
        let Some(semantics) = input.vs_input_semantics.as_ref() else {
            return;
        };

        for semantic in semantics {
            // Attributes are declared as floats; typed formats come from
            // the V# once buffer loads are lowered.
            let width = semantic.size_in_elements.clamp(1, 4) as u8;
            let vtype = VectorType::vec(ScalarType::Float32, width);
            let name = format!("inParam{}", semantic.semantic);
            let reg = self.emit_dcl_vector_var(vtype, spirv::StorageClass::Input, &name);

            // The semantic index doubles as the location; the pipeline's
            // vertex-input state must match.
            self.builder.decorate(
                reg.id,
                spirv::Decoration::Location,
                [Operand::LiteralBit32(semantic.semantic)],
            );
            self.vs.inputs.insert(semantic.semantic, reg);
            self.interfaces.push(reg.id);
        }
    }

    fn emit_dcl_vertex_output(&mut self) {
        // The per-vertex block receives the position export.
        let block_type = self.per_vertex_block_type();
        let ptr_type = self
            .builder
            .type_pointer(None, spirv::StorageClass::Output, block_type);
        let var = self.declare_global_variable(ptr_type, spirv::StorageClass::Output);
        self.builder.name(var, "vsVertexOut");
        self.vs.per_vertex = Some(var);
        self.interfaces.push(var);

        // Remaining analyzed exports (normals, texture coordinates, ...)
        // become plain output vectors with consecutive locations.
        let analysis = self.analysis;
        let mut location = 0u32;
        for exp in &analysis.exp_params {
            if matches!(exp.target, ExportTarget::Pos(0)) {
                continue;
            }
            let width = exp.reg_indices.len().clamp(1, 4) as u8;
            let vtype = VectorType::vec(ScalarType::Float32, width);
            let name = format!("outParam{location}");
            let reg = self.emit_dcl_vector_var(vtype, spirv::StorageClass::Output, &name);
            self.builder.decorate(
                reg.id,
                spirv::Decoration::Location,
                [Operand::LiteralBit32(location)],
            );
            self.vs.outputs.insert(exp.target, reg);
            self.interfaces.push(reg.id);
            location += 1;
        }
    }

    fn per_vertex_block_type(&mut self) -> Word {
        let float_type = self.builder.type_float(32);
        let vec4_type = self.builder.type_vector(float_type, 4);
        let struct_type = self.builder.type_struct([vec4_type]);

        self.builder.member_decorate(
            struct_type,
            PER_VERTEX_POSITION,
            spirv::Decoration::BuiltIn,
            [Operand::BuiltIn(spirv::BuiltIn::Position)],
        );
        self.builder.decorate(struct_type, spirv::Decoration::Block, []);
        self.builder.name(struct_type, "gl_PerVertex");
        self.builder
            .member_name(struct_type, PER_VERTEX_POSITION, "gl_Position");
        struct_type
    }

    fn emit_dcl_uniform_buffers(&mut self, input: &ShaderInput<'_>) {
        for (index, resource) in input.resources.iter().enumerate() {
            let index = index as u32;
            match resource.kind {
                ResourceKind::Buffer(sharp) => {
                    let block_type = self.ubo_block_type(sharp.stride);
                    let ptr_type =
                        self.builder
                            .type_pointer(None, spirv::StorageClass::Uniform, block_type);
                    let var = self.declare_global_variable(ptr_type, spirv::StorageClass::Uniform);
                    self.builder.decorate(
                        var,
                        spirv::Decoration::DescriptorSet,
                        [Operand::LiteralBit32(index)],
                    );
                    self.builder.decorate(
                        var,
                        spirv::Decoration::Binding,
                        [Operand::LiteralBit32(index)],
                    );
                    self.builder.name(var, "ubo");
                    self.vs.ubos.insert(index, var);
                }
                // S#/T# declarations land together with image sampling.
                ResourceKind::Sampler(_) | ResourceKind::Texture(_) => {}
            }
        }
    }

    /// Block type for a V# of the given stride, created and decorated once.
    ///
    /// The shader may address any dword of a bound buffer (for example a
    /// mat3x3 slice out of a mat4x4), which rules out member-accurate block
    /// layouts; the whole record is exposed as one dword array instead.
    fn ubo_block_type(&mut self, stride: u32) -> Word {
        if let Some(&block_type) = self.ubo_types.get(&stride) {
            return block_type;
        }

        let dwords = stride / 4;
        if dwords == 0 {
            warn!(stride, "V# stride smaller than one dword");
        }
        let float_type = self.builder.type_float(32);
        let uint_type = self.builder.type_int(32, 0);
        let length = self.builder.constant_bit32(uint_type, dwords.max(1));
        let array_type = self.builder.type_array(float_type, length);
        self.builder.decorate(
            array_type,
            spirv::Decoration::ArrayStride,
            [Operand::LiteralBit32(stride)],
        );

        let struct_type = self.builder.type_struct([array_type]);
        self.builder.decorate(struct_type, spirv::Decoration::Block, []);
        self.builder.member_decorate(
            struct_type,
            0,
            spirv::Decoration::Offset,
            [Operand::LiteralBit32(0)],
        );
        self.builder.name(struct_type, "UniformBufferObject");
        self.builder.member_name(struct_type, 0, "data");

        self.ubo_types.insert(stride, struct_type);
        struct_type
    }

    /// Synthesizes `vsFetch`, the prelude that copies vertex attributes
    /// into fresh VGPR variables before user code runs. The function always
    /// exists so `vsMain` has something defined to call.
    fn emit_fetch_shader(&mut self, input: &ShaderInput<'_>) -> Result<(), TranslateError> {
        let fetch_fn = self.builder.id();
        self.builder.name(fetch_fn, "vsFetch");
        self.vs.fetch_fn = Some(fetch_fn);
        self.emit_function_begin(fetch_fn)?;

        if let Some(semantics) = input.vs_input_semantics.as_ref() {
            for semantic in semantics {
                let Some(src) = self.vs.inputs.get(&semantic.semantic).copied() else {
                    continue;
                };
                for element in 0..semantic.size_in_elements {
                    let vgpr = semantic.vgpr + element;
                    let name = format!("v{vgpr}");
                    let reg = self.emit_dcl_vector_var(
                        VectorType::scalar(ScalarType::Float32),
                        spirv::StorageClass::Private,
                        &name,
                    );

                    let float_type = self.builder.type_float(32);
                    let loaded = if src.vtype.ccount > 1 {
                        let element_ptr_type = self.builder.type_pointer(
                            None,
                            spirv::StorageClass::Input,
                            float_type,
                        );
                        let uint_type = self.builder.type_int(32, 0);
                        let index = self.builder.constant_bit32(uint_type, element);
                        let chain =
                            self.builder
                                .access_chain(element_ptr_type, None, src.id, [index])?;
                        self.builder.load(float_type, None, chain, None, vec![])?
                    } else {
                        self.builder.load(float_type, None, src.id, None, vec![])?
                    };
                    self.builder.store(reg.id, loaded, None, vec![])?;

                    self.vgprs.insert(vgpr, reg);
                }
            }
        }

        self.emit_function_end()
    }

    /// Declares a module-scope variable of the given type and storage class.
    pub(crate) fn emit_dcl_vector_var(
        &mut self,
        vtype: VectorType,
        storage: spirv::StorageClass,
        name: &str,
    ) -> SpirvPointer {
        let type_id = self.vector_type_id(vtype);
        let ptr_type = self.builder.type_pointer(None, storage, type_id);
        let var = self.declare_global_variable(ptr_type, storage);
        if !name.is_empty() {
            self.builder.name(var, name);
        }
        SpirvPointer::new(vtype, var)
    }

    /// Emits an `OpVariable` into the module's global section.
    ///
    /// The builder's own `variable()` routes into the currently selected
    /// block when one is open; registers and interface variables are
    /// declared lazily from inside function bodies, so the instruction is
    /// pushed to the global section directly.
    pub(crate) fn declare_global_variable(
        &mut self,
        pointer_type: Word,
        storage: spirv::StorageClass,
    ) -> Word {
        let id = self.builder.id();
        let variable = dr::Instruction::new(
            spirv::Op::Variable,
            Some(pointer_type),
            Some(id),
            vec![Operand::StorageClass(storage)],
        );
        self.builder.module_mut().types_global_values.push(variable);
        id
    }

    pub(crate) fn emit_vs_finalize(&mut self) -> Result<(), TranslateError> {
        self.flow_close_all()?;

        let entry_point = self.entry_point;
        self.emit_function_begin(entry_point)?;

        if let Some(main_fn) = self.vs.main_fn {
            let void = self.builder.type_void();
            self.builder.function_call(void, None, main_fn, vec![])?;
        }
        // Attribute unpacking and per-vertex block fixups hook in here once
        // typed vertex formats are lowered.

        self.emit_function_end()
    }

    /// Entry-point wrapper for stages without a lowering: an empty `main`,
    /// so the entry point always names a defined function.
    pub(crate) fn emit_empty_main(&mut self) -> Result<(), TranslateError> {
        let entry_point = self.entry_point;
        self.emit_function_begin(entry_point)?;
        self.emit_function_end()
    }

    /// Opens a void() function, closing any function left open.
    pub(crate) fn emit_function_begin(&mut self, id: Word) -> Result<(), TranslateError> {
        self.emit_function_end()?;

        let void = self.builder.type_void();
        let fn_type = self.builder.type_function(void, vec![]);
        self.builder
            .begin_function(void, Some(id), spirv::FunctionControl::NONE, fn_type)?;
        self.builder.begin_block(None)?;
        self.inside_function = true;
        Ok(())
    }

    pub(crate) fn emit_function_end(&mut self) -> Result<(), TranslateError> {
        if self.inside_function {
            self.builder.ret()?;
            self.builder.end_function()?;
        }
        self.inside_function = false;
        Ok(())
    }
}
