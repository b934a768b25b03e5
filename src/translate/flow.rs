//! Structured flow control.
//!
//! GCN expresses control flow as branches over a linear instruction stream;
//! SPIR-V requires properly nested structured constructs that cannot be
//! opened after the fact. The emitter therefore keeps a stack of open
//! constructs: forward branches open a selection whose merge block sits at
//! the branch target, and analysis-marked loop headers open a loop
//! construct whose backedge is taken by the backward branch targeting the
//! header.
//!
//! Branch conditions come from the recorded state registers, so they are
//! compile-time booleans for now; per-lane divergence via a live EXEC mask
//! is explicitly out of scope and the constructs assume uniform execution.

use rspirv::spirv::{self, Word};
use tracing::{debug, warn};

use super::{GcnTranslator, TranslateError};
use crate::gcn_ir::{FlowControlInst, FlowControlOp};

#[derive(Debug, Default)]
pub(crate) struct FlowState {
    /// Index of the instruction currently being processed.
    pub pc: usize,
    pub stack: Vec<FlowConstruct>,
}

#[derive(Debug, Clone, Copy)]
pub(crate) enum FlowConstruct {
    /// A forward-branch region; `end` is the instruction index of the merge
    /// point.
    Selection { merge: Word, end: usize },
    /// A loop opened at `header_index`, waiting for its backedge.
    Loop {
        header_index: usize,
        header: Word,
        cont: Word,
        merge: Word,
    },
}

impl GcnTranslator<'_> {
    /// Book-keeping that runs before each instruction: close selections
    /// whose merge point is here, then open a loop if the analysis marked
    /// this instruction as a loop header.
    pub(crate) fn flow_pre_instruction(&mut self) -> Result<(), TranslateError> {
        loop {
            match self.flow.stack.last() {
                Some(&FlowConstruct::Selection { merge, end }) if end == self.flow.pc => {
                    self.flow.stack.pop();
                    self.builder.branch(merge)?;
                    self.builder.begin_block(Some(merge))?;
                }
                _ => break,
            }
        }

        if self.analysis.loop_headers.contains(&self.flow.pc) {
            let header = self.builder.id();
            let merge = self.builder.id();
            let cont = self.builder.id();
            let body = self.builder.id();

            self.builder.branch(header)?;
            self.builder.begin_block(Some(header))?;
            self.builder
                .loop_merge(merge, cont, spirv::LoopControl::NONE, vec![])?;
            self.builder.branch(body)?;
            self.builder.begin_block(Some(body))?;

            self.flow.stack.push(FlowConstruct::Loop {
                header_index: self.flow.pc,
                header,
                cont,
                merge,
            });
        }
        Ok(())
    }

    pub(crate) fn emit_flow_control(
        &mut self,
        ins: &FlowControlInst,
    ) -> Result<(), TranslateError> {
        match ins.op {
            FlowControlOp::Nop => return Ok(()),
            FlowControlOp::Endpgm => {
                // The entry wrapper emits the actual function return.
                debug!("program end");
                return Ok(());
            }
            _ => {}
        }

        let Some(offset) = ins.target else {
            warn!(op = ?ins.op, "branch without a decoded target; skipping");
            return Ok(());
        };
        let target = self.flow.pc as isize + 1 + offset;
        if target < 0 {
            warn!(offset, "branch target before the program start; skipping");
            return Ok(());
        }
        let target = target as usize;

        if target <= self.flow.pc {
            return self.emit_backedge(ins.op, target);
        }
        self.emit_forward_branch(ins.op, target)
    }

    fn emit_forward_branch(
        &mut self,
        op: FlowControlOp,
        target: usize,
    ) -> Result<(), TranslateError> {
        match op {
            FlowControlOp::Branch => {
                // The skipped region still gets emitted (it may be a merge
                // target of its own); only the edge into it is bypassed.
                let merge = self.builder.id();
                let skipped = self.builder.id();
                self.builder.branch(merge)?;
                self.builder.begin_block(Some(skipped))?;
                self.flow.stack.push(FlowConstruct::Selection {
                    merge,
                    end: target,
                });
            }
            _ => {
                let Some(taken) = self.branch_condition(op) else {
                    warn!(?op, "conditional branch on unknown SCC; falling through");
                    return Ok(());
                };
                let condition = self.const_bool_value(taken);

                // A taken GCN branch skips ahead, so the true edge goes to
                // the merge block and the false edge into the region body.
                let merge = self.builder.id();
                let body = self.builder.id();
                self.builder
                    .selection_merge(merge, spirv::SelectionControl::NONE)?;
                self.builder
                    .branch_conditional(condition.id, merge, body, vec![])?;
                self.builder.begin_block(Some(body))?;
                self.flow.stack.push(FlowConstruct::Selection {
                    merge,
                    end: target,
                });
            }
        }
        Ok(())
    }

    fn emit_backedge(&mut self, op: FlowControlOp, target: usize) -> Result<(), TranslateError> {
        match self.flow.stack.last().copied() {
            Some(FlowConstruct::Loop {
                header_index,
                header,
                cont,
                merge,
            }) if header_index == target => {
                self.flow.stack.pop();

                let taken = match op {
                    FlowControlOp::Branch => true,
                    _ => self.branch_condition(op).unwrap_or_else(|| {
                        warn!(?op, "loop backedge on unknown SCC; exiting the loop");
                        false
                    }),
                };
                let condition = self.const_bool_value(taken);

                self.builder.branch(cont)?;
                self.builder.begin_block(Some(cont))?;
                self.builder
                    .branch_conditional(condition.id, header, merge, vec![])?;
                self.builder.begin_block(Some(merge))?;
                Ok(())
            }
            _ => {
                warn!(
                    target_index = target,
                    "backward branch without a marked loop header; skipping"
                );
                Ok(())
            }
        }
    }

    /// Whether the branch is taken, when the recorded state can tell.
    fn branch_condition(&self, op: FlowControlOp) -> Option<bool> {
        match op {
            FlowControlOp::CbranchScc0 => self.state_regs.scc.map(|scc| !scc),
            FlowControlOp::CbranchScc1 => self.state_regs.scc,
            FlowControlOp::CbranchVccz => Some(self.state_regs.vcc == 0),
            FlowControlOp::CbranchVccnz => Some(self.state_regs.vcc != 0),
            FlowControlOp::CbranchExecz => Some(self.state_regs.exec == 0),
            FlowControlOp::CbranchExecnz => Some(self.state_regs.exec != 0),
            FlowControlOp::Branch | FlowControlOp::Nop | FlowControlOp::Endpgm => None,
        }
    }

    /// Closes every construct still open when the program ends, so the
    /// final block always has a terminator. A shader that needs this is
    /// malformed, but the module should still assemble for triage.
    pub(crate) fn flow_close_all(&mut self) -> Result<(), TranslateError> {
        while let Some(construct) = self.flow.stack.pop() {
            warn!(
                ?construct,
                "control-flow construct still open at program end"
            );
            match construct {
                FlowConstruct::Selection { merge, .. } => {
                    self.builder.branch(merge)?;
                    self.builder.begin_block(Some(merge))?;
                }
                FlowConstruct::Loop {
                    header,
                    cont,
                    merge,
                    ..
                } => {
                    let condition = self.const_bool_value(false);
                    self.builder.branch(cont)?;
                    self.builder.begin_block(Some(cont))?;
                    self.builder
                        .branch_conditional(condition.id, header, merge, vec![])?;
                    self.builder.begin_block(Some(merge))?;
                }
            }
        }
        Ok(())
    }
}
