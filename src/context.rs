use thiserror::Error;

use crate::diag::DiagSink;
use crate::function::FunctionTable;
use crate::intern::{FilePool, Interner};
use crate::ir::IrArena;
use crate::scope::ScopeStack;
use crate::token::SourceLoc;
use crate::types::{Modifiers, TypeId, TypeRegistry};

/// Errors surfaced by the crate-level API, distinct from in-source
/// diagnostics (which accumulate in the sink and never abort the pipeline).
#[derive(Debug, Error)]
pub enum CompileError {
    #[error("entry point name must not be empty")]
    EmptyEntryPoint,
    #[error("unsupported shader model {major}.{minor}")]
    UnsupportedModel { major: u32, minor: u32 },
}

/// Owns every table and arena of one compilation: interner, file pool, type
/// registry, scope stack, function table, IR arena, and the diagnostic sink.
/// Dropping the context releases all of it; nothing escapes by reference.
pub struct CompileContext {
    pub interner: Interner,
    pub files: FilePool,
    pub types: TypeRegistry,
    pub scopes: ScopeStack,
    pub functions: FunctionTable,
    pub ir: IrArena,
    pub diag: DiagSink,
    /// Majority injected into matrix declarations that specify neither bit.
    pub default_majority: Modifiers,
}

impl CompileContext {
    /// Fresh context with the predefined types seeded into the global scope.
    pub fn new(main_file: &str) -> Self {
        let mut interner = Interner::new();
        let mut types = TypeRegistry::new();
        let mut scopes = ScopeStack::new();
        for (name, id) in types.seed_predefined(&mut interner) {
            // Aliases can map several names onto one descriptor; the global
            // scope starts empty, so plain names never collide here.
            let _ = scopes.declare_type(name, id);
        }
        CompileContext {
            interner,
            files: FilePool::new(main_file),
            types,
            scopes,
            functions: FunctionTable::new(),
            ir: IrArena::new(),
            diag: DiagSink::new(),
            default_majority: Modifiers::COLUMN_MAJOR,
        }
    }

    pub fn error(&mut self, loc: SourceLoc, message: String) {
        self.diag.error(&self.files, loc, message);
    }

    pub fn warning(&mut self, loc: SourceLoc, message: String) {
        self.diag.warning(&self.files, loc, message);
    }

    pub fn note(&mut self, loc: SourceLoc, message: String) {
        self.diag.note(&self.files, loc, message);
    }

    /// Features consumed by the grammar but not lowered. Notes keep the
    /// status untouched while still landing in the buffer.
    pub fn unimplemented(&mut self, loc: SourceLoc, what: &str) {
        self.diag
            .note(&self.files, loc, format!("unimplemented: {}", what));
    }

    /// Diagnostic rendering of a type.
    pub fn type_name(&self, id: TypeId) -> String {
        self.types.describe(id, &self.interner)
    }
}
