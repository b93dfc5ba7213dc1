use super::{ParseResult, Parser};
use crate::ir::{AssignOp, ConstValue, ExprOp, InstrList, NodeId, NodeKind, SwizzleMask};
use crate::token::{SourceLoc, TokenType};
use crate::types::{BaseType, Modifiers, TypeClass, TypeId};

/// Selects the source components named by a dotted vector suffix: 1 to 4
/// characters from one of the two component alphabets, never mixed, each
/// naming a component the operand actually has.
fn vector_swizzle(text: &str, dimx: u32) -> Option<SwizzleMask> {
    if text.is_empty() || text.len() > 4 {
        return None;
    }
    let mut components = Vec::with_capacity(text.len());
    let mut set: Option<bool> = None; // true = xyzw, false = rgba
    for c in text.chars() {
        let (xyzw, idx) = match c {
            'x' => (true, 0u8),
            'y' => (true, 1),
            'z' => (true, 2),
            'w' => (true, 3),
            'r' => (false, 0),
            'g' => (false, 1),
            'b' => (false, 2),
            'a' => (false, 3),
            _ => return None,
        };
        match set {
            None => set = Some(xyzw),
            Some(s) if s != xyzw => return None,
            _ => {}
        }
        if u32::from(idx) >= dimx {
            return None;
        }
        components.push(idx);
    }
    Some(SwizzleMask::vector(&components))
}

/// Matrix swizzles: `_mRC` groups (zero-based) or `_RC` groups (one-based),
/// repeated up to four times, one form per suffix.
fn matrix_swizzle(text: &str, dimx: u32, dimy: u32) -> Option<SwizzleMask> {
    let bytes = text.as_bytes();
    let mut cells = Vec::new();
    let mut zero_based: Option<bool> = None;
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] != b'_' {
            return None;
        }
        i += 1;
        let zb = if bytes.get(i) == Some(&b'm') {
            i += 1;
            true
        } else {
            false
        };
        match zero_based {
            None => zero_based = Some(zb),
            Some(prev) if prev != zb => return None,
            _ => {}
        }
        let row_digit = *bytes.get(i)? as char;
        let col_digit = *bytes.get(i + 1)? as char;
        i += 2;
        let (mut row, mut col) = (row_digit.to_digit(10)?, col_digit.to_digit(10)?);
        if !zb {
            if row == 0 || col == 0 {
                return None;
            }
            row -= 1;
            col -= 1;
        }
        if row >= dimy || col >= dimx {
            return None;
        }
        if cells.len() == 4 {
            return None;
        }
        cells.push((row as u8, col as u8));
    }
    if cells.is_empty() {
        return None;
    }
    Some(SwizzleMask::matrix(&cells))
}

fn assign_op_for(kind: TokenType) -> Option<AssignOp> {
    match kind {
        TokenType::Assign => Some(AssignOp::Assign),
        TokenType::AddAssign => Some(AssignOp::Add),
        TokenType::SubAssign => Some(AssignOp::Sub),
        TokenType::MulAssign => Some(AssignOp::Mul),
        TokenType::DivAssign => Some(AssignOp::Div),
        TokenType::ModAssign => Some(AssignOp::Mod),
        TokenType::ShlAssign => Some(AssignOp::Shl),
        TokenType::ShrAssign => Some(AssignOp::Shr),
        TokenType::AndAssign => Some(AssignOp::And),
        TokenType::OrAssign => Some(AssignOp::Or),
        TokenType::XorAssign => Some(AssignOp::Xor),
        _ => None,
    }
}

impl<'cx, 'src> Parser<'cx, 'src> {
    /// Full expression. Lowered form: an instruction list whose last node is
    /// the expression's result.
    pub(super) fn parse_expr(&mut self) -> ParseResult<InstrList> {
        self.parse_assignment_expr()
    }

    pub(super) fn parse_assignment_expr(&mut self) -> ParseResult<InstrList> {
        let lhs = self.parse_conditional()?;
        let Some(op) = assign_op_for(self.peek().kind) else {
            return Ok(lhs);
        };
        let tok = self.bump();
        let rhs = self.parse_assignment_expr()?;
        self.lower_assignment(lhs, op, rhs, tok.loc)
    }

    pub(super) fn last_node(&self, list: &InstrList) -> NodeId {
        *list.last().expect("expression lists are never empty")
    }

    fn node_ty(&self, list: &InstrList) -> TypeId {
        self.cx.ir.get(self.last_node(list)).ty
    }

    fn is_lvalue(&self, node: NodeId) -> bool {
        match self.cx.ir.get(node).kind {
            NodeKind::VarDeref(_) => true,
            NodeKind::RecordDeref { base, .. }
            | NodeKind::ArrayDeref { base, .. }
            | NodeKind::Swizzle { base, .. } => self.is_lvalue(base),
            _ => false,
        }
    }

    /// A deref chain is a const lvalue if any link's type carries `const`.
    fn lvalue_is_const(&self, node: NodeId) -> bool {
        let n = self.cx.ir.get(node);
        if self
            .cx
            .types
            .get(n.ty)
            .modifiers
            .contains(Modifiers::CONST)
        {
            return true;
        }
        match n.kind {
            NodeKind::RecordDeref { base, .. }
            | NodeKind::ArrayDeref { base, .. }
            | NodeKind::Swizzle { base, .. } => self.lvalue_is_const(base),
            _ => false,
        }
    }

    fn propagate_const(&mut self, ty: TypeId, from: TypeId) -> TypeId {
        if self
            .cx
            .types
            .get(from)
            .modifiers
            .contains(Modifiers::CONST)
        {
            self.cx.types.with_modifiers(ty, Modifiers::CONST)
        } else {
            ty
        }
    }

    fn lower_assignment(
        &mut self,
        mut lhs: InstrList,
        op: AssignOp,
        mut rhs: InstrList,
        loc: SourceLoc,
    ) -> ParseResult<InstrList> {
        let lhs_node = self.last_node(&lhs);
        if self.lvalue_is_const(lhs_node) {
            // The store is not lowered; the rest of the expression still is.
            self.cx.error(loc, "l-value is const".to_string());
            lhs.append(&mut rhs);
            return Ok(lhs);
        }
        if !self.is_lvalue(lhs_node) {
            self.cx.error(loc, "invalid lvalue".to_string());
            lhs.append(&mut rhs);
            return Ok(lhs);
        }
        let target_ty = self.cx.ir.get(lhs_node).ty;
        // The store target is owned by the assignment, not the list; only
        // its index computations stay listed as instructions.
        self.unlist_store_target(&mut lhs, lhs_node);
        lhs.append(&mut rhs);
        let rhs_node = self.implicit_conversion(&mut lhs, target_ty, loc);
        let assign = self.cx.ir.alloc(
            NodeKind::Assignment {
                lhs: lhs_node,
                op,
                rhs: rhs_node,
            },
            loc,
            target_ty,
        );
        lhs.push(assign);
        Ok(lhs)
    }

    pub(super) fn unlist_store_target(&self, list: &mut InstrList, lhs: NodeId) {
        let mut chain = Vec::new();
        let mut cur = Some(lhs);
        while let Some(id) = cur {
            chain.push(id);
            cur = match self.cx.ir.get(id).kind {
                NodeKind::RecordDeref { base, .. }
                | NodeKind::Swizzle { base, .. }
                | NodeKind::ArrayDeref { base, .. } => Some(base),
                _ => None,
            };
        }
        list.retain(|id| !chain.contains(id));
    }

    fn parse_conditional(&mut self) -> ParseResult<InstrList> {
        let mut cond = self.parse_logic_or()?;
        if !self.eat(TokenType::Question) {
            return Ok(cond);
        }
        let loc = self.cx.ir.get(self.last_node(&cond)).loc;
        let cond_node = self.last_node(&cond);
        let cond_ty = self.cx.types.get(self.cx.ir.get(cond_node).ty).clone();
        if !cond_ty.is_scalar() {
            self.cx
                .error(loc, "ternary condition requires a scalar".to_string());
        }
        let mut then_list = self.parse_assignment_expr()?;
        self.expect(TokenType::Colon)?;
        let mut else_list = self.parse_conditional()?;

        let then_ty = self.node_ty(&then_list);
        let else_ty = self.node_ty(&else_list);
        let common = match self.cx.types.common_numeric(then_ty, else_ty) {
            Some(c) => c,
            None => {
                let a = self.cx.type_name(then_ty);
                let b = self.cx.type_name(else_ty);
                self.cx.error(
                    loc,
                    format!("incompatible ternary operand types {} and {}", a, b),
                );
                then_ty
            }
        };
        let then_node = self.implicit_conversion(&mut then_list, common, loc);
        let else_node = self.implicit_conversion(&mut else_list, common, loc);
        cond.append(&mut then_list);
        cond.append(&mut else_list);
        let node = self.cx.ir.alloc(
            NodeKind::Expr {
                op: ExprOp::Select,
                operands: [Some(cond_node), Some(then_node), Some(else_node)],
            },
            loc,
            common,
        );
        cond.push(node);
        Ok(cond)
    }

    fn parse_binary_chain(
        &mut self,
        ops: &[(TokenType, ExprOp)],
        next: fn(&mut Self) -> ParseResult<InstrList>,
    ) -> ParseResult<InstrList> {
        let mut lhs = next(self)?;
        loop {
            let kind = self.peek().kind;
            let Some(&(_, op)) = ops.iter().find(|(t, _)| *t == kind) else {
                return Ok(lhs);
            };
            let tok = self.bump();
            let rhs = next(self)?;
            lhs = self.lower_binary(op, lhs, rhs, tok.loc)?;
        }
    }

    fn parse_logic_or(&mut self) -> ParseResult<InstrList> {
        self.parse_binary_chain(&[(TokenType::OrOr, ExprOp::LogicOr)], Self::parse_logic_and)
    }

    fn parse_logic_and(&mut self) -> ParseResult<InstrList> {
        self.parse_binary_chain(&[(TokenType::AndAnd, ExprOp::LogicAnd)], Self::parse_bit_or)
    }

    fn parse_bit_or(&mut self) -> ParseResult<InstrList> {
        self.parse_binary_chain(&[(TokenType::Pipe, ExprOp::BitOr)], Self::parse_bit_xor)
    }

    fn parse_bit_xor(&mut self) -> ParseResult<InstrList> {
        self.parse_binary_chain(&[(TokenType::Caret, ExprOp::BitXor)], Self::parse_bit_and)
    }

    fn parse_bit_and(&mut self) -> ParseResult<InstrList> {
        self.parse_binary_chain(&[(TokenType::Amp, ExprOp::BitAnd)], Self::parse_equality)
    }

    fn parse_equality(&mut self) -> ParseResult<InstrList> {
        self.parse_binary_chain(
            &[(TokenType::EqEq, ExprOp::Eq), (TokenType::Ne, ExprOp::Ne)],
            Self::parse_relational,
        )
    }

    fn parse_relational(&mut self) -> ParseResult<InstrList> {
        self.parse_binary_chain(
            &[
                (TokenType::Lt, ExprOp::Lt),
                (TokenType::Gt, ExprOp::Gt),
                (TokenType::Le, ExprOp::Le),
                (TokenType::Ge, ExprOp::Ge),
            ],
            Self::parse_shift,
        )
    }

    fn parse_shift(&mut self) -> ParseResult<InstrList> {
        self.parse_binary_chain(
            &[(TokenType::Shl, ExprOp::Shl), (TokenType::Shr, ExprOp::Shr)],
            Self::parse_additive,
        )
    }

    fn parse_additive(&mut self) -> ParseResult<InstrList> {
        self.parse_binary_chain(
            &[(TokenType::Plus, ExprOp::Add), (TokenType::Minus, ExprOp::Sub)],
            Self::parse_multiplicative,
        )
    }

    fn parse_multiplicative(&mut self) -> ParseResult<InstrList> {
        self.parse_binary_chain(
            &[
                (TokenType::Star, ExprOp::Mul),
                (TokenType::Slash, ExprOp::Div),
                (TokenType::Percent, ExprOp::Mod),
            ],
            Self::parse_unary,
        )
    }

    fn lower_binary(
        &mut self,
        op: ExprOp,
        mut lhs: InstrList,
        mut rhs: InstrList,
        loc: SourceLoc,
    ) -> ParseResult<InstrList> {
        let a_ty = self.node_ty(&lhs);
        let b_ty = self.node_ty(&rhs);

        if op.is_bitwise() {
            let a_ok = self.cx.types.get(a_ty).base.is_integral();
            let b_ok = self.cx.types.get(b_ty).base.is_integral();
            if !a_ok || !b_ok {
                self.cx.error(
                    loc,
                    "bitwise operations require integral operands".to_string(),
                );
            }
        }

        let common = match self.cx.types.common_numeric(a_ty, b_ty) {
            Some(c) => c,
            None => {
                let a = self.cx.type_name(a_ty);
                let b = self.cx.type_name(b_ty);
                self.cx.error(
                    loc,
                    format!("invalid operands {} and {} to binary operator", a, b),
                );
                // Recover with the left operand's type.
                let a_node = self.last_node(&lhs);
                let b_node = self.last_node(&rhs);
                lhs.append(&mut rhs);
                let node = self.cx.ir.alloc(
                    NodeKind::Expr {
                        op,
                        operands: [Some(a_node), Some(b_node), None],
                    },
                    loc,
                    a_ty,
                );
                lhs.push(node);
                return Ok(lhs);
            }
        };

        let result_ty = if op.is_comparison() || matches!(op, ExprOp::LogicAnd | ExprOp::LogicOr) {
            let c = self.cx.types.get(common).clone();
            self.cx.types.numeric(BaseType::Bool, c.dimx, c.dimy)
        } else {
            common
        };
        // Logical operators evaluate their operands as booleans.
        let operand_ty = if matches!(op, ExprOp::LogicAnd | ExprOp::LogicOr) {
            result_ty
        } else {
            common
        };

        let a_node = self.implicit_conversion(&mut lhs, operand_ty, loc);
        lhs.append(&mut rhs);
        let b_node = self.implicit_conversion(&mut lhs, operand_ty, loc);
        let node = self.cx.ir.alloc(
            NodeKind::Expr {
                op,
                operands: [Some(a_node), Some(b_node), None],
            },
            loc,
            result_ty,
        );
        lhs.push(node);
        Ok(lhs)
    }

    fn parse_unary(&mut self) -> ParseResult<InstrList> {
        let tok = self.peek();
        match tok.kind {
            TokenType::Plus => {
                self.bump();
                self.parse_unary()
            }
            TokenType::Minus => {
                self.bump();
                let mut operand = self.parse_unary()?;
                let ty = self.node_ty(&operand);
                if !self.cx.types.get(ty).is_numeric() {
                    let text = self.cx.type_name(ty);
                    self.cx
                        .error(tok.loc, format!("invalid operand {} to unary '-'", text));
                }
                let node = self.last_node(&operand);
                let neg = self.cx.ir.alloc(
                    NodeKind::Expr {
                        op: ExprOp::Neg,
                        operands: [Some(node), None, None],
                    },
                    tok.loc,
                    ty,
                );
                operand.push(neg);
                Ok(operand)
            }
            TokenType::Not => {
                self.bump();
                let mut operand = self.parse_unary()?;
                let ty = self.cx.types.get(self.node_ty(&operand)).clone();
                if !ty.is_numeric() {
                    self.cx
                        .error(tok.loc, "invalid operand to '!'".to_string());
                }
                let result_ty = self.cx.types.numeric(BaseType::Bool, ty.dimx, ty.dimy);
                let node = self.last_node(&operand);
                let not = self.cx.ir.alloc(
                    NodeKind::Expr {
                        op: ExprOp::LogicNot,
                        operands: [Some(node), None, None],
                    },
                    tok.loc,
                    result_ty,
                );
                operand.push(not);
                Ok(operand)
            }
            TokenType::Tilde => {
                self.bump();
                let mut operand = self.parse_unary()?;
                let ty = self.node_ty(&operand);
                if !self.cx.types.get(ty).base.is_integral() {
                    self.cx.error(
                        tok.loc,
                        "bitwise operations require integral operands".to_string(),
                    );
                }
                let node = self.last_node(&operand);
                let inv = self.cx.ir.alloc(
                    NodeKind::Expr {
                        op: ExprOp::BitNot,
                        operands: [Some(node), None, None],
                    },
                    tok.loc,
                    ty,
                );
                operand.push(inv);
                Ok(operand)
            }
            TokenType::Inc => {
                self.bump();
                let operand = self.parse_unary()?;
                self.lower_incdec(ExprOp::PreInc, operand, tok.loc)
            }
            TokenType::Dec => {
                self.bump();
                let operand = self.parse_unary()?;
                self.lower_incdec(ExprOp::PreDec, operand, tok.loc)
            }
            TokenType::LParen => {
                // `(T) expr` is a cast; `(T(...)` starts a parenthesized
                // constructor expression instead.
                if let TokenType::TypeName(sym) = self.peek2().kind {
                    if self.peek3().kind == TokenType::RParen {
                        self.bump();
                        let ty_tok = self.bump();
                        self.expect(TokenType::RParen)?;
                        let mut operand = self.parse_unary()?;
                        let src_ty = self.node_ty(&operand);
                        let dst = match self.cx.scopes.lookup_type(sym) {
                            Some(id) => id,
                            None => {
                                let text = self.cx.interner.resolve(sym).to_string();
                                self.cx
                                    .error(ty_tok.loc, format!("unknown type '{}'", text));
                                return Ok(operand);
                            }
                        };
                        let default = self.cx.default_majority;
                        let dst = self.cx.types.finalize_majority(dst, default);
                        if !self.cx.types.compatible(src_ty, dst) {
                            let from = self.cx.type_name(src_ty);
                            let to = self.cx.type_name(dst);
                            self.cx
                                .error(ty_tok.loc, format!("can't cast from {} to {}", from, to));
                        }
                        let node = self.last_node(&operand);
                        let cast = self.cx.ir.alloc(
                            NodeKind::Expr {
                                op: ExprOp::Cast,
                                operands: [Some(node), None, None],
                            },
                            ty_tok.loc,
                            dst,
                        );
                        operand.push(cast);
                        return Ok(operand);
                    }
                }
                self.parse_postfix()
            }
            _ => self.parse_postfix(),
        }
    }

    fn lower_incdec(
        &mut self,
        op: ExprOp,
        mut operand: InstrList,
        loc: SourceLoc,
    ) -> ParseResult<InstrList> {
        let node = self.last_node(&operand);
        if self.lvalue_is_const(node) {
            self.cx.error(loc, "l-value is const".to_string());
            return Ok(operand);
        }
        if !self.is_lvalue(node) {
            self.cx.error(loc, "invalid lvalue".to_string());
            return Ok(operand);
        }
        let ty = self.cx.ir.get(node).ty;
        // Post-increment results are const-adorned so they reject stores.
        let result_ty = if matches!(op, ExprOp::PostInc | ExprOp::PostDec) {
            self.cx.types.with_modifiers(ty, Modifiers::CONST)
        } else {
            ty
        };
        let expr = self.cx.ir.alloc(
            NodeKind::Expr {
                op,
                operands: [Some(node), None, None],
            },
            loc,
            result_ty,
        );
        operand.push(expr);
        Ok(operand)
    }

    fn parse_postfix(&mut self) -> ParseResult<InstrList> {
        let mut list = self.parse_primary()?;
        loop {
            let tok = self.peek();
            match tok.kind {
                TokenType::Dot => {
                    self.bump();
                    let (field, loc) = self.expect_any_ident()?;
                    let text = self.cx.interner.resolve(field).to_string();
                    self.lower_field_access(&mut list, &text, loc);
                }
                TokenType::LBracket => {
                    self.bump();
                    let index = self.parse_expr()?;
                    self.expect(TokenType::RBracket)?;
                    self.lower_index(&mut list, index, tok.loc);
                }
                TokenType::Inc => {
                    self.bump();
                    list = self.lower_incdec(ExprOp::PostInc, list, tok.loc)?;
                }
                TokenType::Dec => {
                    self.bump();
                    list = self.lower_incdec(ExprOp::PostDec, list, tok.loc)?;
                }
                _ => return Ok(list),
            }
        }
    }

    /// `.suffix` on structs, vectors, and matrices.
    fn lower_field_access(&mut self, list: &mut InstrList, text: &str, loc: SourceLoc) {
        let base_node = self.last_node(list);
        let base_ty_id = self.cx.ir.get(base_node).ty;
        let base_ty = self.cx.types.get(base_ty_id).clone();
        match base_ty.class {
            TypeClass::Struct => {
                let sym = self.cx.interner.intern(text);
                let Some(index) = base_ty.fields.iter().position(|f| f.name == sym) else {
                    self.cx
                        .error(loc, format!("invalid field name '{}'", text));
                    return;
                };
                let field_ty = self.propagate_const(base_ty.fields[index].ty, base_ty_id);
                let node = self.cx.ir.alloc(
                    NodeKind::RecordDeref {
                        base: base_node,
                        field: index as u32,
                    },
                    loc,
                    field_ty,
                );
                list.push(node);
            }
            TypeClass::Scalar | TypeClass::Vector => {
                let Some(mask) = vector_swizzle(text, base_ty.dimx) else {
                    self.cx.error(loc, format!("invalid swizzle '{}'", text));
                    return;
                };
                let ty = self
                    .cx
                    .types
                    .numeric(base_ty.base, mask.count as u32, 1);
                let ty = self.propagate_const(ty, base_ty_id);
                let node = self.cx.ir.alloc(
                    NodeKind::Swizzle {
                        base: base_node,
                        mask,
                    },
                    loc,
                    ty,
                );
                list.push(node);
            }
            TypeClass::Matrix => {
                let Some(mask) = matrix_swizzle(text, base_ty.dimx, base_ty.dimy) else {
                    self.cx.error(loc, format!("invalid swizzle '{}'", text));
                    return;
                };
                let ty = self
                    .cx
                    .types
                    .numeric(base_ty.base, mask.count as u32, 1);
                let ty = self.propagate_const(ty, base_ty_id);
                let node = self.cx.ir.alloc(
                    NodeKind::Swizzle {
                        base: base_node,
                        mask,
                    },
                    loc,
                    ty,
                );
                list.push(node);
            }
            _ => {
                self.cx
                    .error(loc, format!("invalid subscript '{}'", text));
            }
        }
    }

    /// `[index]` on arrays, matrices (row vector), and vectors (scalar).
    fn lower_index(&mut self, list: &mut InstrList, mut index: InstrList, loc: SourceLoc) {
        let index_node = self.last_node(&index);
        let index_ty = self.cx.types.get(self.cx.ir.get(index_node).ty).clone();
        if !index_ty.is_scalar() || !index_ty.is_numeric() {
            self.cx
                .error(loc, "array index is not scalar".to_string());
        }
        let base_node = self.last_node(list);
        let base_ty_id = self.cx.ir.get(base_node).ty;
        let base_ty = self.cx.types.get(base_ty_id).clone();
        let elem_ty = match base_ty.class {
            TypeClass::Array => match base_ty.element {
                Some(e) => e,
                None => return,
            },
            TypeClass::Matrix => self.cx.types.numeric(base_ty.base, base_ty.dimx, 1),
            TypeClass::Vector => self.cx.types.numeric(base_ty.base, 1, 1),
            TypeClass::Scalar => {
                self.cx
                    .error(loc, "scalar expressions cannot be array-indexed".to_string());
                return;
            }
            _ => {
                let text = self.cx.type_name(base_ty_id);
                self.cx
                    .error(loc, format!("{} expressions cannot be array-indexed", text));
                return;
            }
        };
        let elem_ty = self.propagate_const(elem_ty, base_ty_id);
        list.append(&mut index);
        let node = self.cx.ir.alloc(
            NodeKind::ArrayDeref {
                base: base_node,
                index: index_node,
            },
            loc,
            elem_ty,
        );
        list.push(node);
    }

    fn parse_primary(&mut self) -> ParseResult<InstrList> {
        let tok = self.peek();
        match tok.kind {
            TokenType::IntConst(v) => {
                self.bump();
                let ty = self.cx.types.int();
                let node = self
                    .cx
                    .ir
                    .alloc(NodeKind::Constant(ConstValue::Int(v)), tok.loc, ty);
                Ok(vec![node])
            }
            TokenType::FloatConst(v) => {
                self.bump();
                let ty = self.cx.types.float();
                let node = self
                    .cx
                    .ir
                    .alloc(NodeKind::Constant(ConstValue::Float(v)), tok.loc, ty);
                Ok(vec![node])
            }
            TokenType::BoolConst(v) => {
                self.bump();
                let ty = self.cx.types.bool();
                let node = self
                    .cx
                    .ir
                    .alloc(NodeKind::Constant(ConstValue::Bool(v)), tok.loc, ty);
                Ok(vec![node])
            }
            TokenType::VarName(sym) => {
                self.bump();
                match self.cx.scopes.lookup_var(sym) {
                    Some(var) => {
                        let ty = self.cx.scopes.var(var).ty;
                        let node = self.cx.ir.alloc(NodeKind::VarDeref(var), tok.loc, ty);
                        Ok(vec![node])
                    }
                    None => {
                        let text = self.cx.interner.resolve(sym).to_string();
                        self.cx
                            .error(tok.loc, format!("undeclared identifier '{}'", text));
                        Ok(vec![self.error_node(tok.loc)])
                    }
                }
            }
            TokenType::TypeName(_) => {
                if self.peek2().kind == TokenType::LParen {
                    self.parse_constructor()
                } else {
                    Err(self.syntax_error(tok, "expression"))
                }
            }
            TokenType::NewIdent(sym) => {
                self.bump();
                let text = self.cx.interner.resolve(sym).to_string();
                if self.peek().kind == TokenType::LParen {
                    if self.cx.functions.contains(sym) {
                        self.cx.error(
                            tok.loc,
                            format!("call to function '{}' is not supported", text),
                        );
                    } else {
                        self.cx.error(
                            tok.loc,
                            format!("call to undefined function '{}'", text),
                        );
                    }
                    self.skip_parenthesized()?;
                } else {
                    self.cx
                        .error(tok.loc, format!("undeclared identifier '{}'", text));
                }
                Ok(vec![self.error_node(tok.loc)])
            }
            TokenType::LParen => {
                self.bump();
                let list = self.parse_expr()?;
                self.expect(TokenType::RParen)?;
                Ok(list)
            }
            _ => Err(self.syntax_error(tok, "expression")),
        }
    }

    /// Placeholder node used to keep lowering going after an error; the
    /// final IR is suppressed anyway once an error is recorded.
    fn error_node(&mut self, loc: SourceLoc) -> NodeId {
        let ty = self.cx.types.float();
        self.cx
            .ir
            .alloc(NodeKind::Constant(ConstValue::Float(0.0)), loc, ty)
    }

    fn skip_parenthesized(&mut self) -> ParseResult<()> {
        self.expect(TokenType::LParen)?;
        let mut depth = 1u32;
        loop {
            let tok = self.bump();
            match tok.kind {
                TokenType::LParen => depth += 1,
                TokenType::RParen => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(());
                    }
                }
                TokenType::Eof => return Err(self.syntax_error(tok, "')'")),
                _ => {}
            }
        }
    }

    /// `T(args...)` where `T` is a numeric type and the argument components
    /// exactly fill it.
    fn parse_constructor(&mut self) -> ParseResult<InstrList> {
        let tok = self.bump();
        let TokenType::TypeName(sym) = tok.kind else {
            return Err(self.syntax_error(tok, "type name"));
        };
        let Some(ty0) = self.cx.scopes.lookup_type(sym) else {
            let text = self.cx.interner.resolve(sym).to_string();
            self.cx.error(tok.loc, format!("unknown type '{}'", text));
            return Err(super::SyntaxAbort);
        };

        self.expect(TokenType::LParen)?;
        let mut args: Vec<InstrList> = Vec::new();
        if !self.eat(TokenType::RParen) {
            loop {
                args.push(self.parse_assignment_expr()?);
                if !self.eat(TokenType::Comma) {
                    break;
                }
            }
            self.expect(TokenType::RParen)?;
        }

        let ty_desc = self.cx.types.get(ty0).clone();
        if !ty_desc.is_numeric() {
            let text = self.cx.type_name(ty0);
            self.cx.error(
                tok.loc,
                format!("constructors are only defined for numeric types, not {}", text),
            );
        }
        if !ty_desc.modifiers.is_empty() {
            self.cx.error(
                tok.loc,
                "modifiers are not allowed on constructors".to_string(),
            );
        }

        let want = self.cx.types.component_count(ty0);
        let mut got = 0u32;
        let mut list = InstrList::new();
        let mut nodes = Vec::with_capacity(args.len());
        for (i, mut arg) in args.into_iter().enumerate() {
            let node = self.last_node(&arg);
            let arg_ty = self.cx.ir.get(node).ty;
            if !self.cx.types.get(arg_ty).is_numeric() {
                let text = self.cx.type_name(arg_ty);
                self.cx.error(
                    tok.loc,
                    format!("wrong type {} for argument {} of constructor", text, i + 1),
                );
            } else {
                got += self.cx.types.component_count(arg_ty);
            }
            list.append(&mut arg);
            nodes.push(node);
        }
        if ty_desc.is_numeric() && got != want {
            self.cx.error(
                tok.loc,
                format!(
                    "wrong number of components in constructor: expected {}, got {}",
                    want, got
                ),
            );
        }
        let default = self.cx.default_majority;
        let ty = self.cx.types.finalize_majority(ty0, default);
        let node = self
            .cx
            .ir
            .alloc(NodeKind::Constructor { args: nodes }, tok.loc, ty);
        list.push(node);
        Ok(list)
    }
}
