mod decl;
mod expr;
mod stmt;

#[cfg(test)]
mod tests;

use tracing::debug;

use crate::context::CompileContext;
use crate::intern::Symbol;
use crate::ir::{ExprOp, InstrList, NodeId, NodeKind};
use crate::lexer::Lexer;
use crate::token::{SourceLoc, Token, TokenType};
use crate::types::TypeId;

/// Marker for an unrecoverable local syntax error. The diagnostic has
/// already been reported when this is returned; callers unwind to the
/// nearest statement or global-declaration boundary and resynchronize.
pub(super) struct SyntaxAbort;

pub(super) type ParseResult<T> = Result<T, SyntaxAbort>;

/// Recursive-descent grammar driver. Reductions invoke the IR builder
/// directly: expression productions append nodes to instruction lists, and
/// statement productions stitch those lists into control-flow shapes.
pub struct Parser<'cx, 'src> {
    pub(super) cx: &'cx mut CompileContext,
    lexer: Lexer<'src>,
    lookahead: Vec<Token>,
    /// Return type of the function body being parsed, if any.
    pub(super) return_type: Option<TypeId>,
}

impl<'cx, 'src> Parser<'cx, 'src> {
    pub fn new(cx: &'cx mut CompileContext, source: &'src str) -> Self {
        let lexer = Lexer::new(source, &cx.files);
        Parser {
            cx,
            lexer,
            lookahead: Vec::new(),
            return_type: None,
        }
    }

    fn fill(&mut self, n: usize) {
        while self.lookahead.len() < n {
            let cx = &mut *self.cx;
            let tok = self
                .lexer
                .next_token(&mut cx.interner, &mut cx.files, &cx.scopes, &mut cx.diag);
            self.lookahead.push(tok);
        }
    }

    pub(super) fn peek(&mut self) -> Token {
        self.fill(1);
        self.lookahead[0]
    }

    pub(super) fn peek2(&mut self) -> Token {
        self.fill(2);
        self.lookahead[1]
    }

    pub(super) fn peek3(&mut self) -> Token {
        self.fill(3);
        self.lookahead[2]
    }

    pub(super) fn bump(&mut self) -> Token {
        self.fill(1);
        self.lookahead.remove(0)
    }

    /// Consumes the next token if it matches `kind`.
    pub(super) fn eat(&mut self, kind: TokenType) -> bool {
        if self.peek().kind == kind {
            self.bump();
            true
        } else {
            false
        }
    }

    pub(super) fn expect(&mut self, kind: TokenType) -> ParseResult<Token> {
        let tok = self.peek();
        if tok.kind == kind {
            Ok(self.bump())
        } else {
            Err(self.syntax_error(tok, kind.describe()))
        }
    }

    pub(super) fn syntax_error(&mut self, found: Token, expected: &str) -> SyntaxAbort {
        self.cx.error(
            found.loc,
            format!("syntax error: expected {}, found {}", expected, found.kind.describe()),
        );
        SyntaxAbort
    }

    /// Pulls the symbol out of any identifier-class token: declarator names
    /// may shadow outer variables or types, so all three classes qualify.
    pub(super) fn expect_any_ident(&mut self) -> ParseResult<(Symbol, SourceLoc)> {
        let tok = self.peek();
        match tok.kind {
            TokenType::NewIdent(sym) | TokenType::VarName(sym) | TokenType::TypeName(sym) => {
                self.bump();
                Ok((sym, tok.loc))
            }
            _ => Err(self.syntax_error(tok, "identifier")),
        }
    }

    /// Skips ahead to the next statement/declaration boundary after a syntax
    /// error: past the next `;`, or past the matching `}` of any block the
    /// error occurred inside.
    pub(super) fn synchronize(&mut self) {
        let mut depth = 0u32;
        loop {
            let tok = self.peek();
            match tok.kind {
                TokenType::Eof => return,
                TokenType::Semicolon if depth == 0 => {
                    self.bump();
                    return;
                }
                TokenType::LBrace => {
                    depth += 1;
                    self.bump();
                }
                TokenType::RBrace => {
                    self.bump();
                    if depth <= 1 {
                        return;
                    }
                    depth -= 1;
                }
                _ => {
                    self.bump();
                }
            }
        }
    }

    /// Parses the whole translation unit, recovering at top-level
    /// boundaries so one bad declaration does not hide the rest.
    pub fn parse_program(&mut self) {
        debug!("parse start");
        loop {
            let tok = self.peek();
            match tok.kind {
                TokenType::Eof => break,
                TokenType::Typedef => {
                    if self.parse_typedef().is_err() {
                        self.synchronize();
                    }
                }
                TokenType::Technique | TokenType::Pass => {
                    self.cx.error(
                        tok.loc,
                        format!("{} blocks are not supported", tok.kind.describe()),
                    );
                    self.bump();
                    self.synchronize();
                }
                kind if kind.is_modifier() => {
                    self.global_declaration();
                }
                TokenType::TypeName(_) | TokenType::Struct => {
                    self.global_declaration();
                }
                _ => {
                    self.syntax_error(tok, "declaration");
                    self.bump();
                    self.synchronize();
                }
            }
        }
        debug!(
            nodes = self.cx.ir.len(),
            vars = self.cx.scopes.var_count(),
            "parse finished"
        );
    }

    fn global_declaration(&mut self) {
        // Global variable initializers lower into a list nothing executes;
        // the bytecode writer reads defaults off the variables instead.
        let mut discard = InstrList::new();
        if self.parse_declaration(&mut discard).is_err() {
            self.synchronize();
        }
    }

    /// Converts the last node of `list` to `dst`, appending a cast node when
    /// the types differ. Incompatible types report an error; the cast is
    /// still materialized so downstream invariants hold while diagnostics
    /// accumulate.
    pub(super) fn implicit_conversion(
        &mut self,
        list: &mut InstrList,
        dst: TypeId,
        loc: SourceLoc,
    ) -> NodeId {
        let node = *list.last().expect("conversion of an empty expression");
        let src = self.cx.ir.get(node).ty;
        if self.cx.types.equal(src, dst) {
            return node;
        }
        if !self.cx.types.compatible(src, dst) {
            let from = self.cx.type_name(src);
            let to = self.cx.type_name(dst);
            self.cx
                .error(loc, format!("can't implicitly convert from {} to {}", from, to));
        }
        let cast = self.cx.ir.alloc(
            NodeKind::Expr {
                op: ExprOp::Cast,
                operands: [Some(node), None, None],
            },
            loc,
            dst,
        );
        list.push(cast);
        cast
    }
}
