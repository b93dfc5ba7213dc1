use std::collections::HashMap;

use crate::intern::Symbol;
use crate::ir::InstrList;
use crate::scope::VarId;
use crate::token::SourceLoc;
use crate::types::{TypeId, TypeRegistry};

/// One declared function (or one overload of a set). `param_types` is the
/// overload key; `params` keeps the parameter variables for the liveness
/// pass over the entry function.
#[derive(Debug, Clone)]
pub struct Function {
    pub name: Symbol,
    pub params: Vec<VarId>,
    pub param_types: Vec<TypeId>,
    pub return_type: TypeId,
    pub semantic: Option<Symbol>,
    pub loc: SourceLoc,
    pub body: Option<InstrList>,
    pub intrinsic: bool,
}

/// Outcome of merging a declaration into the table.
#[derive(Debug, PartialEq, Eq)]
pub enum AddResult {
    Added,
    /// Second definition with a body for the same signature.
    Redefined { prior_loc: SourceLoc },
    /// Same signature, different return type.
    ReturnMismatch { prior_loc: SourceLoc },
}

/// All functions of one compilation, keyed by name; each entry is the set of
/// overloads keyed by parameter signature.
pub struct FunctionTable {
    map: HashMap<Symbol, Vec<Function>>,
}

impl FunctionTable {
    pub fn new() -> Self {
        FunctionTable {
            map: HashMap::new(),
        }
    }

    pub fn contains(&self, name: Symbol) -> bool {
        self.map.contains_key(&name)
    }

    /// Merges `func` into the overload set for its name. A prototype
    /// followed by a definition (or the reverse) folds into one entry.
    pub fn add(&mut self, func: Function, types: &TypeRegistry) -> AddResult {
        let overloads = self.map.entry(func.name).or_default();
        for existing in overloads.iter_mut() {
            let same_signature = existing.param_types.len() == func.param_types.len()
                && existing
                    .param_types
                    .iter()
                    .zip(func.param_types.iter())
                    .all(|(&a, &b)| types.equal(a, b));
            if !same_signature {
                continue;
            }
            if !types.equal(existing.return_type, func.return_type) {
                return AddResult::ReturnMismatch {
                    prior_loc: existing.loc,
                };
            }
            if existing.body.is_some() && func.body.is_some() {
                return AddResult::Redefined {
                    prior_loc: existing.loc,
                };
            }
            if func.body.is_some() {
                *existing = func;
            }
            return AddResult::Added;
        }
        overloads.push(func);
        AddResult::Added
    }

    /// Looks up the overload set for a name.
    pub fn overloads(&self, name: Symbol) -> Option<&[Function]> {
        self.map.get(&name).map(|v| v.as_slice())
    }

    /// Selects the entry function: the unique overload with a body under the
    /// given name. Ambiguity resolves to the first defined overload.
    pub fn entry(&self, name: Symbol) -> Option<&Function> {
        self.map
            .get(&name)
            .and_then(|overloads| overloads.iter().find(|f| f.body.is_some()))
    }
}

impl Default for FunctionTable {
    fn default() -> Self {
        Self::new()
    }
}
