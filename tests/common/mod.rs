//! Shared introspection helpers for `gcn-spirv` integration tests.
//!
//! Tests reparse the assembled words with `rspirv::dr` and assert on the
//! recovered module structure rather than on raw word offsets.

use rspirv::dr::{Instruction, Module, Operand};
use rspirv::spirv::{self, Op, Word};

pub fn load(words: &[u32]) -> Module {
    rspirv::dr::load_words(words).expect("emitted module must reparse")
}

pub fn has_capability(module: &Module, cap: spirv::Capability) -> bool {
    module.capabilities.iter().any(|inst| {
        matches!(inst.operands.first(), Some(Operand::Capability(c)) if *c == cap)
    })
}

/// Resolves a debug name (`OpName`) to the id it targets.
pub fn id_named(module: &Module, name: &str) -> Option<Word> {
    module.debug_names.iter().find_map(|inst| {
        if inst.class.opcode != Op::Name {
            return None;
        }
        match (&inst.operands[0], &inst.operands[1]) {
            (Operand::IdRef(id), Operand::LiteralString(s)) if s == name => Some(*id),
            _ => None,
        }
    })
}

/// Storage class of a module-scope `OpVariable`.
pub fn global_variable_storage(module: &Module, id: Word) -> Option<spirv::StorageClass> {
    module.types_global_values.iter().find_map(|inst| {
        if inst.class.opcode != Op::Variable || inst.result_id != Some(id) {
            return None;
        }
        match inst.operands.first() {
            Some(Operand::StorageClass(sc)) => Some(*sc),
            _ => None,
        }
    })
}

/// Whether `id` carries the decoration (with the given literal operand, if
/// any).
pub fn has_decoration(
    module: &Module,
    id: Word,
    decoration: spirv::Decoration,
    literal: Option<u32>,
) -> bool {
    module.annotations.iter().any(|inst| {
        if inst.class.opcode != Op::Decorate {
            return false;
        }
        let target = matches!(inst.operands.first(), Some(Operand::IdRef(t)) if *t == id);
        let deco = matches!(inst.operands.get(1), Some(Operand::Decoration(d)) if *d == decoration);
        let lit = match literal {
            None => true,
            Some(v) => {
                matches!(inst.operands.get(2), Some(Operand::LiteralBit32(l)) if *l == v)
            }
        };
        target && deco && lit
    })
}

/// The single `OpEntryPoint` of the module: (execution model, name,
/// interface ids).
pub fn entry_point(module: &Module) -> (spirv::ExecutionModel, String, Vec<Word>) {
    assert_eq!(module.entry_points.len(), 1, "expected exactly one entry point");
    let inst = &module.entry_points[0];
    let model = match inst.operands[0] {
        Operand::ExecutionModel(m) => m,
        _ => panic!("malformed OpEntryPoint"),
    };
    let name = match &inst.operands[2] {
        Operand::LiteralString(s) => s.clone(),
        _ => panic!("malformed OpEntryPoint"),
    };
    let interface = inst.operands[3..]
        .iter()
        .map(|op| match op {
            Operand::IdRef(id) => *id,
            other => panic!("unexpected interface operand {other:?}"),
        })
        .collect();
    (model, name, interface)
}

/// All instructions inside function bodies, in emission order.
pub fn function_instructions(module: &Module) -> Vec<&Instruction> {
    module
        .functions
        .iter()
        .flat_map(|f| f.blocks.iter())
        .flat_map(|b| b.instructions.iter())
        .collect()
}

pub fn count_op(module: &Module, op: Op) -> usize {
    function_instructions(module)
        .iter()
        .filter(|inst| inst.class.opcode == op)
        .count()
}

/// Value of a 32-bit `OpConstant`, if `id` is one.
pub fn constant_u32_value(module: &Module, id: Word) -> Option<u32> {
    module.types_global_values.iter().find_map(|inst| {
        if inst.class.opcode != Op::Constant || inst.result_id != Some(id) {
            return None;
        }
        match inst.operands.first() {
            Some(Operand::LiteralBit32(v)) => Some(*v),
            _ => None,
        }
    })
}

/// Whether the module holds a 32-bit float `OpConstant` with these bits.
pub fn has_f32_constant(module: &Module, value: f32) -> bool {
    let float_type = module.types_global_values.iter().find_map(|inst| {
        if inst.class.opcode == Op::TypeFloat
            && matches!(inst.operands.first(), Some(Operand::LiteralBit32(32)))
        {
            inst.result_id
        } else {
            None
        }
    });
    let Some(float_type) = float_type else {
        return false;
    };
    module.types_global_values.iter().any(|inst| {
        inst.class.opcode == Op::Constant
            && inst.result_type == Some(float_type)
            && matches!(
                inst.operands.first(),
                Some(Operand::LiteralBit32(bits)) if *bits == value.to_bits()
            )
    })
}

/// Ids of all `OpStore` destinations in function bodies.
pub fn store_targets(module: &Module) -> Vec<Word> {
    function_instructions(module)
        .iter()
        .filter(|inst| inst.class.opcode == Op::Store)
        .filter_map(|inst| match inst.operands.first() {
            Some(Operand::IdRef(id)) => Some(*id),
            _ => None,
        })
        .collect()
}

/// Ids of all `OpLoad` sources in function bodies.
pub fn load_sources(module: &Module) -> Vec<Word> {
    function_instructions(module)
        .iter()
        .filter(|inst| inst.class.opcode == Op::Load)
        .filter_map(|inst| match inst.operands.first() {
            Some(Operand::IdRef(id)) => Some(*id),
            _ => None,
        })
        .collect()
}
