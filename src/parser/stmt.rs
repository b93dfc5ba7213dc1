use super::{ParseResult, Parser};
use crate::ir::{ExprOp, InstrList, JumpKind, NodeKind};
use crate::token::{SourceLoc, TokenType};

enum LoopKind {
    While,
    DoWhile,
    For,
}

impl<'cx, 'src> Parser<'cx, 'src> {
    /// `{ statement* }` without scope handling; callers that need a fresh
    /// scope push it first (function bodies own their parameter scope).
    pub(super) fn parse_block_body(&mut self) -> ParseResult<InstrList> {
        self.expect(TokenType::LBrace)?;
        let mut list = InstrList::new();
        loop {
            let tok = self.peek();
            match tok.kind {
                TokenType::RBrace => {
                    self.bump();
                    return Ok(list);
                }
                TokenType::Eof => return Err(self.syntax_error(tok, "'}'")),
                _ => {
                    if self.parse_statement(&mut list).is_err() {
                        self.synchronize_statement();
                    }
                }
            }
        }
    }

    /// Error recovery inside a block: skip to just past the next `;`, or
    /// stop before the enclosing `}` so the block parser can close it.
    fn synchronize_statement(&mut self) {
        loop {
            let tok = self.peek();
            match tok.kind {
                TokenType::Eof | TokenType::RBrace => return,
                TokenType::Semicolon => {
                    self.bump();
                    return;
                }
                TokenType::LBrace => {
                    let _ = self.skip_braced();
                }
                _ => {
                    self.bump();
                }
            }
        }
    }

    pub(super) fn parse_statement(&mut self, list: &mut InstrList) -> ParseResult<()> {
        let tok = self.peek();
        match tok.kind {
            TokenType::LBrace => {
                self.cx.scopes.push_scope();
                let body = self.parse_block_body();
                self.cx.scopes.pop_scope();
                list.extend(body?);
                Ok(())
            }
            TokenType::If => self.parse_if(list),
            TokenType::While => self.parse_while(list),
            TokenType::Do => self.parse_do_while(list),
            TokenType::For => self.parse_for(list),
            TokenType::Return => self.parse_return(list),
            TokenType::Break => {
                self.bump();
                self.expect(TokenType::Semicolon)?;
                let ty = self.cx.types.void();
                let node = self
                    .cx
                    .ir
                    .alloc(NodeKind::Jump(JumpKind::Break), tok.loc, ty);
                list.push(node);
                Ok(())
            }
            TokenType::Continue => {
                self.bump();
                self.expect(TokenType::Semicolon)?;
                let ty = self.cx.types.void();
                let node = self
                    .cx
                    .ir
                    .alloc(NodeKind::Jump(JumpKind::Continue), tok.loc, ty);
                list.push(node);
                Ok(())
            }
            TokenType::Typedef => self.parse_typedef(),
            TokenType::Struct => self.parse_declaration(list),
            kind if kind.is_modifier() => self.parse_declaration(list),
            TokenType::TypeName(_) if self.peek2().kind != TokenType::LParen => {
                self.parse_declaration(list)
            }
            TokenType::Semicolon => {
                self.bump();
                Ok(())
            }
            _ => {
                let expr = self.parse_expr()?;
                self.expect(TokenType::Semicolon)?;
                list.extend(expr);
                Ok(())
            }
        }
    }

    fn parse_if(&mut self, list: &mut InstrList) -> ParseResult<()> {
        let kw = self.expect(TokenType::If)?;
        self.expect(TokenType::LParen)?;
        let cond = self.parse_expr()?;
        self.expect(TokenType::RParen)?;
        let cond_node = self.last_node(&cond);
        self.check_scalar_condition(cond_node, kw.loc, "if condition requires a scalar");

        let mut then_body = InstrList::new();
        self.parse_statement(&mut then_body)?;
        let else_body = if self.eat(TokenType::Else) {
            let mut body = InstrList::new();
            self.parse_statement(&mut body)?;
            Some(body)
        } else {
            None
        };

        list.extend(cond);
        let ty = self.cx.types.void();
        let node = self.cx.ir.alloc(
            NodeKind::If {
                condition: cond_node,
                then_body,
                else_body,
            },
            kw.loc,
            ty,
        );
        list.push(node);
        Ok(())
    }

    fn check_scalar_condition(&mut self, node: crate::ir::NodeId, loc: SourceLoc, msg: &str) {
        let ty = self.cx.ir.get(node).ty;
        if !self.cx.types.get(ty).is_scalar() {
            self.cx.error(loc, msg.to_string());
        }
    }

    fn parse_while(&mut self, list: &mut InstrList) -> ParseResult<()> {
        let kw = self.expect(TokenType::While)?;
        self.expect(TokenType::LParen)?;
        let cond = self.parse_expr()?;
        self.expect(TokenType::RParen)?;
        self.check_scalar_condition(
            self.last_node(&cond),
            kw.loc,
            "loop condition requires a scalar",
        );
        let mut body = InstrList::new();
        self.parse_statement(&mut body)?;
        self.lower_loop(
            LoopKind::While,
            InstrList::new(),
            cond,
            body,
            InstrList::new(),
            kw.loc,
            list,
        );
        Ok(())
    }

    fn parse_do_while(&mut self, list: &mut InstrList) -> ParseResult<()> {
        let kw = self.expect(TokenType::Do)?;
        let mut body = InstrList::new();
        self.parse_statement(&mut body)?;
        self.expect(TokenType::While)?;
        self.expect(TokenType::LParen)?;
        let cond = self.parse_expr()?;
        self.expect(TokenType::RParen)?;
        self.expect(TokenType::Semicolon)?;
        self.check_scalar_condition(
            self.last_node(&cond),
            kw.loc,
            "loop condition requires a scalar",
        );
        self.lower_loop(
            LoopKind::DoWhile,
            InstrList::new(),
            cond,
            body,
            InstrList::new(),
            kw.loc,
            list,
        );
        Ok(())
    }

    fn parse_for(&mut self, list: &mut InstrList) -> ParseResult<()> {
        let kw = self.expect(TokenType::For)?;
        self.expect(TokenType::LParen)?;
        self.cx.scopes.push_scope();
        let result = self.parse_for_tail(kw.loc, list);
        self.cx.scopes.pop_scope();
        result
    }

    fn parse_for_tail(&mut self, loc: SourceLoc, list: &mut InstrList) -> ParseResult<()> {
        let mut init = InstrList::new();
        let tok = self.peek();
        match tok.kind {
            TokenType::Semicolon => {
                self.bump();
            }
            TokenType::Struct => self.parse_declaration(&mut init)?,
            kind if kind.is_modifier() => self.parse_declaration(&mut init)?,
            TokenType::TypeName(_) if self.peek2().kind != TokenType::LParen => {
                self.parse_declaration(&mut init)?
            }
            _ => {
                let expr = self.parse_expr()?;
                self.expect(TokenType::Semicolon)?;
                init.extend(expr);
            }
        }

        let cond = if self.peek().kind != TokenType::Semicolon {
            let cond = self.parse_expr()?;
            self.check_scalar_condition(
                self.last_node(&cond),
                loc,
                "loop condition requires a scalar",
            );
            cond
        } else {
            InstrList::new()
        };
        self.expect(TokenType::Semicolon)?;

        let iter = if self.peek().kind != TokenType::RParen {
            self.parse_expr()?
        } else {
            InstrList::new()
        };
        self.expect(TokenType::RParen)?;

        let mut body = InstrList::new();
        self.parse_statement(&mut body)?;
        self.lower_loop(LoopKind::For, init, cond, body, iter, loc, list);
        Ok(())
    }

    /// All three loop forms share one shape: any initializer instructions,
    /// then a single loop node. The body starts (while/for) or ends
    /// (do-while) with a negated-condition `if` holding a `break`; an empty
    /// condition leaves an unconditional infinite loop.
    fn lower_loop(
        &mut self,
        kind: LoopKind,
        init: InstrList,
        cond: InstrList,
        body: InstrList,
        iter: InstrList,
        loc: SourceLoc,
        list: &mut InstrList,
    ) {
        let cond_break = |parser: &mut Self, cond: InstrList| -> InstrList {
            if cond.is_empty() {
                return cond;
            }
            let cond_node = *cond.last().expect("checked non-empty");
            let cond_ty = parser.cx.ir.get(cond_node).ty;
            let mut out = cond;
            let not = parser.cx.ir.alloc(
                NodeKind::Expr {
                    op: ExprOp::LogicNot,
                    operands: [Some(cond_node), None, None],
                },
                loc,
                cond_ty,
            );
            out.push(not);
            let void = parser.cx.types.void();
            let brk = parser
                .cx
                .ir
                .alloc(NodeKind::Jump(JumpKind::Break), loc, void);
            let guard = parser.cx.ir.alloc(
                NodeKind::If {
                    condition: not,
                    then_body: vec![brk],
                    else_body: None,
                },
                loc,
                void,
            );
            out.push(guard);
            out
        };

        let mut loop_body = InstrList::new();
        match kind {
            LoopKind::While | LoopKind::For => {
                loop_body.extend(cond_break(self, cond));
                loop_body.extend(body);
                loop_body.extend(iter);
            }
            LoopKind::DoWhile => {
                loop_body.extend(body);
                loop_body.extend(cond_break(self, cond));
            }
        }

        list.extend(init);
        let void = self.cx.types.void();
        let node = self.cx.ir.alloc(
            NodeKind::Loop {
                body: loop_body,
                next_index: 0,
            },
            loc,
            void,
        );
        list.push(node);
    }

    fn parse_return(&mut self, list: &mut InstrList) -> ParseResult<()> {
        let kw = self.expect(TokenType::Return)?;
        let ret_ty = self.return_type.unwrap_or_else(|| self.cx.types.void());
        let returns_void = self.cx.types.get(ret_ty).is_void();
        let void = self.cx.types.void();

        if self.eat(TokenType::Semicolon) {
            if !returns_void {
                self.cx.error(
                    kw.loc,
                    "non-void functions must return a value".to_string(),
                );
            }
            let node = self
                .cx
                .ir
                .alloc(NodeKind::Jump(JumpKind::Return(None)), kw.loc, void);
            list.push(node);
            return Ok(());
        }

        let mut value = self.parse_expr()?;
        self.expect(TokenType::Semicolon)?;
        if returns_void {
            self.cx
                .error(kw.loc, "void functions cannot return a value".to_string());
            list.extend(value);
            let node = self
                .cx
                .ir
                .alloc(NodeKind::Jump(JumpKind::Return(None)), kw.loc, void);
            list.push(node);
            return Ok(());
        }
        let converted = self.implicit_conversion(&mut value, ret_ty, kw.loc);
        list.extend(value);
        let node = self.cx.ir.alloc(
            NodeKind::Jump(JumpKind::Return(Some(converted))),
            kw.loc,
            void,
        );
        list.push(node);
        Ok(())
    }
}
