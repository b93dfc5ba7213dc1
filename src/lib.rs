//! Front-end of an HLSL shader compiler.
//!
//! Consumes preprocessed HLSL source (with `#line` directives) and produces
//! a typed, scoped, lowered IR: declarations resolved against a scope stack,
//! expressions flattened into instruction lists, control flow lowered to a
//! uniform loop/branch shape, and every instruction indexed and annotated
//! with variable liveness. Code generation consumes the result; it is not
//! part of this crate.

pub mod context;
pub mod diag;
pub mod function;
pub mod intern;
pub mod ir;
pub mod lexer;
pub mod liveness;
pub mod parser;
pub mod scope;
pub mod token;
pub mod types;

use serde::{Deserialize, Serialize};
use tracing::debug;

pub use context::{CompileContext, CompileError};
pub use diag::{DiagSink, Diagnostic, Level, Status};
pub use function::{Function, FunctionTable};
pub use intern::{FileId, FilePool, Interner, Symbol};
pub use ir::{
    AssignOp, ConstValue, ExprOp, InstrList, IrArena, JumpKind, Node, NodeId, NodeKind,
    SwizzleMask,
};
pub use lexer::Lexer;
pub use parser::Parser;
pub use scope::{ClassifyIdent, IdentClass, RegKind, RegReservation, ScopeStack, VarId, Variable};
pub use token::{SourceLoc, Token, TokenType};
pub use types::{
    BaseType, Modifiers, SamplerDim, StructField, Type, TypeClass, TypeId, TypeRegistry,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShaderType {
    Pixel,
    Vertex,
}

#[derive(Debug, Clone)]
pub struct CompileOptions {
    pub entry_point: String,
    pub shader_type: ShaderType,
    pub major_version: u32,
    pub minor_version: u32,
    /// Name reported for locations before the first `#line` directive.
    pub source_name: String,
}

impl CompileOptions {
    pub fn new(entry_point: &str, shader_type: ShaderType, major: u32, minor: u32) -> Self {
        CompileOptions {
            entry_point: entry_point.to_string(),
            shader_type,
            major_version: major,
            minor_version: minor,
            source_name: "shader.hlsl".to_string(),
        }
    }
}

/// The fully built IR of one compiled shader: the context owning all types,
/// variables, and nodes, plus the selected entry function (indexed and
/// liveness-annotated).
pub struct ShaderIr {
    pub ctx: CompileContext,
    pub entry: Function,
    pub shader_type: ShaderType,
    pub major_version: u32,
    pub minor_version: u32,
}

impl ShaderIr {
    pub fn body(&self) -> &InstrList {
        // The entry function always has a body; selection rejects
        // prototypes.
        self.entry.body.as_ref().expect("entry function has a body")
    }
}

pub struct CompileOutput {
    pub status: Status,
    /// One `<file>:<line>:<col>: <level>: <message>` line per diagnostic.
    pub diagnostics: String,
    pub records: Vec<Diagnostic>,
    /// Present only when no error was recorded; partial IR never escapes.
    pub shader: Option<ShaderIr>,
}

impl CompileOutput {
    /// Structured diagnostics for embedders, as a JSON array.
    pub fn records_json(&self) -> String {
        serde_json::to_string(&self.records).unwrap_or_else(|_| "[]".to_string())
    }
}

/// Compiles one translation unit. In-source problems land in the returned
/// diagnostics; only API misuse (empty entry name, unknown shader model)
/// surfaces as `CompileError`.
pub fn compile(source: &str, options: &CompileOptions) -> Result<CompileOutput, CompileError> {
    if options.entry_point.is_empty() {
        return Err(CompileError::EmptyEntryPoint);
    }
    if !(1..=3).contains(&options.major_version) || options.minor_version > 4 {
        return Err(CompileError::UnsupportedModel {
            major: options.major_version,
            minor: options.minor_version,
        });
    }
    debug!(
        entry = %options.entry_point,
        shader_type = ?options.shader_type,
        major = options.major_version,
        minor = options.minor_version,
        "compile start"
    );

    let mut cx = CompileContext::new(&options.source_name);
    {
        let mut parser = Parser::new(&mut cx, source);
        parser.parse_program();
    }

    let entry = cx
        .interner
        .lookup(&options.entry_point)
        .and_then(|sym| cx.functions.entry(sym))
        .cloned();
    let entry = match entry {
        Some(f) => Some(f),
        None => {
            let loc = SourceLoc::new(cx.files.main_file(), 1, 1);
            cx.error(
                loc,
                format!("entry function '{}' is not defined", options.entry_point),
            );
            None
        }
    };

    if cx.diag.status() != Status::Err {
        if let Some(entry) = entry {
            let body = entry.body.clone().unwrap_or_default();
            let next = liveness::index_instructions(&mut cx.ir, &body, liveness::INDEX_ENTRY + 1);
            liveness::compute_liveness(&mut cx.ir, &mut cx.scopes, &entry);
            debug!(instructions = next - 2, "entry function lowered");
            let diagnostics = cx.diag.text().to_string();
            let records = cx.diag.records().to_vec();
            let status = cx.diag.status();
            return Ok(CompileOutput {
                status,
                diagnostics,
                records,
                shader: Some(ShaderIr {
                    ctx: cx,
                    entry,
                    shader_type: options.shader_type,
                    major_version: options.major_version,
                    minor_version: options.minor_version,
                }),
            });
        }
    }

    Ok(CompileOutput {
        status: cx.diag.status(),
        diagnostics: cx.diag.text().to_string(),
        records: cx.diag.records().to_vec(),
        shader: None,
    })
}
