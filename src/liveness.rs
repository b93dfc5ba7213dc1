use tracing::debug;

use crate::function::Function;
use crate::ir::{InstrList, IrArena, JumpKind, NodeId, NodeKind};
use crate::scope::ScopeStack;
use crate::types::Modifiers;

/// Index reserved for "never written / never read".
pub const INDEX_UNUSED: u32 = 0;
/// Index reserved for the function-entry event (parameter and global
/// writes happen "at" this index).
pub const INDEX_ENTRY: u32 = 1;

/// Assigns a strictly increasing program-order index to every instruction
/// reachable from `list`, descending into branch and loop bodies. Each loop
/// node is annotated with the index of the first instruction after it.
/// Returns the next unassigned index.
pub fn index_instructions(ir: &mut IrArena, list: &InstrList, mut counter: u32) -> u32 {
    for &id in list {
        ir.get_mut(id).index = counter;
        counter += 1;
        match ir.get(id).kind.clone() {
            NodeKind::If {
                then_body,
                else_body,
                ..
            } => {
                counter = index_instructions(ir, &then_body, counter);
                if let Some(else_body) = &else_body {
                    counter = index_instructions(ir, else_body, counter);
                }
            }
            NodeKind::Loop { body, .. } => {
                counter = index_instructions(ir, &body, counter);
                if let NodeKind::Loop { next_index, .. } = &mut ir.get_mut(id).kind {
                    *next_index = counter;
                }
            }
            _ => {}
        }
    }
    counter
}

/// Computes `first_write`/`last_read` for every variable the entry function
/// touches. Reads inside a loop extend to the whole loop, because an
/// iteration may observe a value written by the previous one; anonymous
/// expression nodes never live across iterations and take plain indices.
pub fn compute_liveness(ir: &mut IrArena, scopes: &mut ScopeStack, entry: &Function) {
    let globals = scopes.globals().to_vec();
    for global in globals {
        scopes.var_mut(global).first_write = INDEX_ENTRY;
    }
    for &param in &entry.params {
        let var = scopes.var_mut(param);
        if var.modifiers.contains(Modifiers::IN) {
            var.first_write = INDEX_ENTRY;
        }
        if var.modifiers.contains(Modifiers::OUT) {
            var.last_read = u32::MAX;
        }
    }
    if let Some(body) = &entry.body {
        liveness_recurse(ir, scopes, body, 0, 0);
    }
    debug!(vars = scopes.var_count(), "liveness computed");
}

/// Marks `node` read at `idx`. When the read roots at a variable and we are
/// inside a loop, the read extends to the loop's exit index.
fn mark_read(ir: &mut IrArena, scopes: &mut ScopeStack, node: NodeId, idx: u32, loop_exit: u32) {
    let n = ir.get_mut(node);
    n.last_read = n.last_read.max(idx);
    if let Some(var) = ir.root_var(node) {
        let read = if loop_exit > 0 { idx.max(loop_exit) } else { idx };
        let var = scopes.var_mut(var);
        var.last_read = var.last_read.max(read);
    }
}

fn liveness_recurse(
    ir: &mut IrArena,
    scopes: &mut ScopeStack,
    list: &InstrList,
    loop_first: u32,
    loop_exit: u32,
) {
    for &id in list {
        let idx = ir.get(id).index;
        match ir.get(id).kind.clone() {
            NodeKind::Constant(_) => {}
            NodeKind::VarDeref(var) => {
                let read = if loop_exit > 0 { idx.max(loop_exit) } else { idx };
                let var = scopes.var_mut(var);
                var.last_read = var.last_read.max(read);
            }
            NodeKind::RecordDeref { base, .. } => {
                mark_read(ir, scopes, base, idx, loop_exit);
            }
            NodeKind::ArrayDeref { base, index } => {
                mark_read(ir, scopes, base, idx, loop_exit);
                mark_read(ir, scopes, index, idx, loop_exit);
            }
            NodeKind::Swizzle { base, .. } => {
                mark_read(ir, scopes, base, idx, loop_exit);
            }
            NodeKind::Constructor { args } => {
                for arg in args {
                    mark_read(ir, scopes, arg, idx, loop_exit);
                }
            }
            NodeKind::Expr { operands, .. } => {
                for operand in operands.into_iter().flatten() {
                    mark_read(ir, scopes, operand, idx, loop_exit);
                }
            }
            NodeKind::Assignment { lhs, rhs, .. } => {
                if let Some(var) = ir.root_var(lhs) {
                    let var = scopes.var_mut(var);
                    if var.first_write == INDEX_UNUSED {
                        var.first_write = if loop_first > 0 {
                            idx.min(loop_first)
                        } else {
                            idx
                        };
                    }
                }
                // Store addresses are computed from reads too: any index
                // expression in the target chain is a use.
                let mut cur = lhs;
                loop {
                    match ir.get(cur).kind {
                        NodeKind::ArrayDeref { base, index } => {
                            mark_read(ir, scopes, index, idx, loop_exit);
                            cur = base;
                        }
                        NodeKind::RecordDeref { base, .. }
                        | NodeKind::Swizzle { base, .. } => cur = base,
                        _ => break,
                    }
                }
                mark_read(ir, scopes, rhs, idx, loop_exit);
            }
            NodeKind::If {
                condition,
                then_body,
                else_body,
            } => {
                mark_read(ir, scopes, condition, idx, loop_exit);
                liveness_recurse(ir, scopes, &then_body, loop_first, loop_exit);
                if let Some(else_body) = &else_body {
                    liveness_recurse(ir, scopes, else_body, loop_first, loop_exit);
                }
            }
            NodeKind::Loop { body, next_index } => {
                let first = if loop_first > 0 { loop_first } else { idx };
                let exit = if loop_exit > 0 { loop_exit } else { next_index };
                liveness_recurse(ir, scopes, &body, first, exit);
            }
            NodeKind::Jump(JumpKind::Return(Some(value))) => {
                mark_read(ir, scopes, value, idx, loop_exit);
            }
            NodeKind::Jump(_) => {}
        }
    }
}
