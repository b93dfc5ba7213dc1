use tracing::debug;

use super::{ParseResult, Parser};
use crate::function::{AddResult, Function};
use crate::intern::Symbol;
use crate::ir::{InstrList, NodeKind, SwizzleMask};
use crate::scope::{RegKind, RegReservation, VarId, Variable};
use crate::token::{SourceLoc, TokenType};
use crate::types::{Modifiers, StructField, TypeClass, TypeId};

/// A parsed parameter, held back until we know whether a body follows;
/// prototypes never declare parameter variables.
struct ParamDecl {
    name: Symbol,
    ty: TypeId,
    modifiers: Modifiers,
    semantic: Option<Symbol>,
    loc: SourceLoc,
}

impl<'cx, 'src> Parser<'cx, 'src> {
    pub(super) fn parse_modifiers(&mut self) -> ParseResult<Modifiers> {
        let mut mods = Modifiers::empty();
        loop {
            let tok = self.peek();
            let bit = match tok.kind {
                TokenType::Extern => Modifiers::EXTERN,
                TokenType::Static => Modifiers::STATIC,
                TokenType::Uniform => Modifiers::UNIFORM,
                TokenType::Volatile => Modifiers::VOLATILE,
                TokenType::Const => Modifiers::CONST,
                TokenType::Precise => Modifiers::PRECISE,
                TokenType::Shared => Modifiers::SHARED,
                TokenType::Groupshared => Modifiers::GROUPSHARED,
                TokenType::Nointerpolation => Modifiers::NOINTERPOLATION,
                TokenType::RowMajor => Modifiers::ROW_MAJOR,
                TokenType::ColumnMajor => Modifiers::COLUMN_MAJOR,
                TokenType::In => Modifiers::IN,
                TokenType::Out => Modifiers::OUT,
                TokenType::Inout => Modifiers::IN.union(Modifiers::OUT),
                _ => break,
            };
            self.bump();
            if mods.contains(bit) {
                self.cx.error(
                    tok.loc,
                    format!("modifier {} was already specified", tok.kind.describe()),
                );
            }
            mods |= bit;
        }
        Ok(mods)
    }

    /// A type-specifier: a known type name, or an inline struct.
    pub(super) fn parse_base_type(&mut self) -> ParseResult<TypeId> {
        let tok = self.peek();
        match tok.kind {
            TokenType::TypeName(sym) => {
                self.bump();
                match self.cx.scopes.lookup_type(sym) {
                    Some(id) => Ok(id),
                    // The classifier and the scope map can only disagree if
                    // the scope that defined the name was popped in between.
                    None => {
                        let name = self.cx.interner.resolve(sym).to_string();
                        self.cx
                            .error(tok.loc, format!("unknown type '{}'", name));
                        Err(super::SyntaxAbort)
                    }
                }
            }
            TokenType::Struct => self.parse_struct_spec(),
            _ => Err(self.syntax_error(tok, "type name")),
        }
    }

    /// `struct [name] { fields }` or a reference to a named struct type.
    fn parse_struct_spec(&mut self) -> ParseResult<TypeId> {
        self.expect(TokenType::Struct)?;
        let tok = self.peek();
        let name = match tok.kind {
            TokenType::NewIdent(sym) | TokenType::VarName(sym) | TokenType::TypeName(sym) => {
                self.bump();
                Some((sym, tok.loc))
            }
            _ => None,
        };
        if self.peek().kind != TokenType::LBrace {
            // `struct S var;` — reference to an existing struct type.
            if let Some((sym, loc)) = name {
                if let Some(id) = self.cx.scopes.lookup_type(sym) {
                    if self.cx.types.get(id).class == TypeClass::Struct {
                        return Ok(id);
                    }
                }
                let text = self.cx.interner.resolve(sym).to_string();
                self.cx.error(loc, format!("undefined struct '{}'", text));
                return Err(super::SyntaxAbort);
            }
            let tok = self.peek();
            return Err(self.syntax_error(tok, "'{'"));
        }
        let fields = self.parse_struct_fields()?;
        let mut ty = crate::types::Type::numeric(TypeClass::Struct, crate::types::BaseType::Void, 1, 1);
        ty.name = name.map(|(sym, _)| sym);
        ty.fields = fields;
        let id = self.cx.types.alloc(ty);
        if let Some((sym, loc)) = name {
            if self.cx.scopes.declare_type(sym, id).is_err() {
                let text = self.cx.interner.resolve(sym).to_string();
                self.cx
                    .error(loc, format!("redefinition of struct '{}'", text));
            }
        }
        Ok(id)
    }

    /// Declared type of one declarator/field/parameter: the base with the
    /// declaration's type-modifier bits overlaid, exactly one majority bit
    /// on matrices, and any array suffix applied. A typedef'd majority
    /// colliding with a declared one is caught here.
    fn declared_type(
        &mut self,
        base: TypeId,
        mods: Modifiers,
        loc: SourceLoc,
        array: Option<u32>,
    ) -> TypeId {
        let extra = mods & Modifiers::TYPE_MODIFIERS;
        let mut ty = self.cx.types.with_modifiers(base, extra);
        if self.cx.types.get(ty).modifiers.contains(Modifiers::MAJORITY) {
            self.cx.error(
                loc,
                "'row_major' and 'column_major' modifiers are mutually exclusive".to_string(),
            );
            // `with_modifiers` cloned the descriptor (the conflict needs a
            // non-empty overlay), so stripping a bit is safe here.
            self.cx
                .types
                .get_mut(ty)
                .modifiers
                .remove(Modifiers::ROW_MAJOR);
        }
        let default = self.cx.default_majority;
        ty = self.cx.types.finalize_majority(ty, default);
        if let Some(n) = array {
            ty = self.cx.types.array_of(ty, n);
        }
        ty
    }

    fn parse_struct_fields(&mut self) -> ParseResult<Vec<StructField>> {
        self.expect(TokenType::LBrace)?;
        let mut fields: Vec<StructField> = Vec::new();
        while !self.eat(TokenType::RBrace) {
            let tok = self.peek();
            if tok.kind == TokenType::Eof {
                return Err(self.syntax_error(tok, "'}'"));
            }
            let mods = self.parse_modifiers()?;
            let illegal = mods & !(Modifiers::TYPE_MODIFIERS | Modifiers::NOINTERPOLATION);
            if !illegal.is_empty() {
                self.cx.error(
                    tok.loc,
                    format!(
                        "modifier '{}' is not allowed on struct fields",
                        illegal.describe_first()
                    ),
                );
            }
            let base = self.parse_base_type()?;
            loop {
                let (name, loc) = self.expect_any_ident()?;
                let array = self.parse_array_size()?;
                let ty = self.declared_type(base, mods, loc, array);
                let mut semantic = None;
                if self.eat(TokenType::Colon) {
                    let (sem, _) = self.expect_any_ident()?;
                    semantic = Some(sem);
                }
                if fields.iter().any(|f| f.name == name) {
                    let text = self.cx.interner.resolve(name).to_string();
                    self.cx
                        .error(loc, format!("field '{}' is already defined", text));
                } else {
                    fields.push(StructField {
                        name,
                        ty,
                        modifiers: mods,
                        semantic,
                        reg_offset: 0,
                    });
                }
                if !self.eat(TokenType::Comma) {
                    break;
                }
            }
            self.expect(TokenType::Semicolon)?;
        }
        self.cx.types.layout_fields(&mut fields);
        Ok(fields)
    }

    /// `[ constant-expression ]` suffix on a declarator, constant-folded to
    /// a positive in-range length.
    pub(super) fn parse_array_size(&mut self) -> ParseResult<Option<u32>> {
        if !self.eat(TokenType::LBracket) {
            return Ok(None);
        }
        let loc = self.peek().loc;
        let size_expr = self.parse_expr()?;
        self.expect(TokenType::RBracket)?;
        let node = *size_expr.last().expect("expression lists are never empty");
        match self.cx.ir.fold_int(node) {
            Some(v) if (1..=65536).contains(&v) => Ok(Some(v as u32)),
            Some(v) => {
                self.cx.error(
                    loc,
                    format!("array size {} is out of range (1 to 65536)", v),
                );
                Ok(Some(1))
            }
            None => {
                self.cx
                    .error(loc, "array size is not a constant expression".to_string());
                Ok(Some(1))
            }
        }
    }

    /// `typedef [modifiers] base name[...] (',' name[...])* ';'`
    pub(super) fn parse_typedef(&mut self) -> ParseResult<()> {
        let kw = self.expect(TokenType::Typedef)?;
        let mods = self.parse_modifiers()?;
        let storage = mods & !Modifiers::TYPE_MODIFIERS;
        if !storage.is_empty() {
            self.cx.error(
                kw.loc,
                format!(
                    "storage modifier '{}' is not allowed on typedefs",
                    storage.describe_first()
                ),
            );
        }
        let mods = self.check_majority_conflict(mods, kw.loc);
        let base = self.parse_base_type()?;
        loop {
            let (name, loc) = self.expect_any_ident()?;
            let array = self.parse_array_size()?;
            let mut ty = self.cx.types.get(base).clone();
            ty.modifiers |= mods & Modifiers::TYPE_MODIFIERS;
            if ty.modifiers.contains(Modifiers::MAJORITY) {
                self.cx.error(
                    loc,
                    "'row_major' and 'column_major' modifiers are mutually exclusive".to_string(),
                );
                ty.modifiers.remove(Modifiers::ROW_MAJOR);
            }
            ty.name = Some(name);
            let mut id = self.cx.types.alloc(ty);
            if let Some(n) = array {
                id = self.cx.types.array_of(id, n);
                self.cx.types.get_mut(id).name = Some(name);
            }
            if self.cx.scopes.declare_type(name, id).is_err() {
                let text = self.cx.interner.resolve(name).to_string();
                self.cx.error(loc, format!("redefinition of '{}'", text));
            }
            if !self.eat(TokenType::Comma) {
                break;
            }
        }
        self.expect(TokenType::Semicolon)?;
        Ok(())
    }

    pub(super) fn check_majority_conflict(&mut self, mods: Modifiers, loc: SourceLoc) -> Modifiers {
        if mods.contains(Modifiers::MAJORITY) {
            self.cx.error(
                loc,
                "'row_major' and 'column_major' modifiers are mutually exclusive".to_string(),
            );
            return mods & !Modifiers::ROW_MAJOR;
        }
        mods
    }

    /// One declaration: `[modifiers] type declarators ';'`, or a function
    /// when an identifier-plus-parenthesis follows at global scope.
    pub(super) fn parse_declaration(&mut self, list: &mut InstrList) -> ParseResult<()> {
        let start = self.peek();
        let mods = self.parse_modifiers()?;
        let mods = self.check_majority_conflict(mods, start.loc);
        let base = self.parse_base_type()?;

        if self.cx.scopes.in_global_scope() {
            let name_tok = self.peek();
            let is_ident = matches!(
                name_tok.kind,
                TokenType::NewIdent(_) | TokenType::VarName(_) | TokenType::TypeName(_)
            );
            if is_ident && self.peek2().kind == TokenType::LParen {
                let (name, loc) = self.expect_any_ident()?;
                return self.parse_function(mods, base, name, loc);
            }
        }

        // `struct S { ... };` declares only the type.
        if self.eat(TokenType::Semicolon) {
            return Ok(());
        }

        loop {
            self.parse_declarator(mods, base, list)?;
            if !self.eat(TokenType::Comma) {
                break;
            }
        }
        self.expect(TokenType::Semicolon)?;
        Ok(())
    }

    fn parse_declarator(
        &mut self,
        mods: Modifiers,
        base: TypeId,
        list: &mut InstrList,
    ) -> ParseResult<()> {
        let (name, loc) = self.expect_any_ident()?;
        let local = !self.cx.scopes.in_global_scope();
        let array = self.parse_array_size()?;
        let ty = self.declared_type(base, mods, loc, array);

        let mut var_mods = mods;
        if !local {
            // File-scope variables are uniforms unless told otherwise.
            var_mods |= Modifiers::UNIFORM;
        }

        let mut semantic = None;
        let mut reservation = None;
        while self.eat(TokenType::Colon) {
            if self.peek().kind == TokenType::Register {
                reservation = self.parse_register_reservation()?;
            } else {
                let (sem, sem_loc) = self.expect_any_ident()?;
                if local {
                    self.cx.error(
                        sem_loc,
                        "semantics are not allowed on local variables".to_string(),
                    );
                } else {
                    semantic = Some(sem);
                }
            }
        }

        if local && var_mods.intersects(Modifiers::NON_LOCAL) {
            self.cx.error(
                loc,
                format!(
                    "modifier '{}' is invalid for local variables",
                    (var_mods & Modifiers::NON_LOCAL).describe_first()
                ),
            );
        }

        let var_id = if self.cx.functions.contains(name) {
            let text = self.cx.interner.resolve(name).to_string();
            let prior_loc = self
                .cx
                .functions
                .overloads(name)
                .and_then(|o| o.first())
                .map(|f| f.loc);
            self.cx
                .error(loc, format!("redefinition of '{}' as a variable", text));
            if let Some(prior) = prior_loc {
                let text = self.cx.interner.resolve(name).to_string();
                self.cx
                    .note(prior, format!("'{}' was previously declared here", text));
            }
            None
        } else {
            let mut var = Variable::new(name, ty, loc, var_mods);
            var.semantic = semantic;
            var.reservation = reservation;
            match self.cx.scopes.declare_var(var) {
                Ok(id) => Some(id),
                Err(prior) => {
                    let text = self.cx.interner.resolve(name).to_string();
                    let prior_loc = self.cx.scopes.var(prior).loc;
                    self.cx.error(loc, format!("redefinition of '{}'", text));
                    self.cx
                        .note(prior_loc, format!("'{}' was previously declared here", text));
                    None
                }
            }
        };

        let has_initializer = self.peek().kind == TokenType::Assign;
        if has_initializer {
            self.bump();
            self.parse_variable_init(var_id, ty, loc, list)?;
        }

        let is_const = self.cx.types.get(ty).modifiers.contains(Modifiers::CONST)
            || var_mods.contains(Modifiers::CONST);
        if is_const && !var_mods.contains(Modifiers::UNIFORM) && !has_initializer {
            self.cx
                .error(loc, "const variable without initializer".to_string());
        }
        Ok(())
    }

    /// The right-hand side of `= ...` in a declarator: a single expression
    /// or a braced list, lowered into stores by the declared type's class.
    fn parse_variable_init(
        &mut self,
        var_id: Option<VarId>,
        ty: TypeId,
        loc: SourceLoc,
        list: &mut InstrList,
    ) -> ParseResult<()> {
        let mut args: Vec<InstrList> = Vec::new();
        let mut nested = false;
        if self.eat(TokenType::LBrace) {
            loop {
                if self.peek().kind == TokenType::LBrace {
                    // Nested compound initializers are consumed, flagged,
                    // and not lowered.
                    nested = true;
                    self.skip_braced()?;
                } else {
                    args.push(self.parse_assignment_expr()?);
                }
                if !self.eat(TokenType::Comma) {
                    break;
                }
                if self.peek().kind == TokenType::RBrace {
                    break;
                }
            }
            self.expect(TokenType::RBrace)?;
        } else {
            args.push(self.parse_assignment_expr()?);
        }

        let Some(var) = var_id else {
            return Ok(());
        };
        if nested {
            self.cx
                .unimplemented(loc, "nested compound initializers");
            return Ok(());
        }

        let class = self.cx.types.get(ty).class;
        match class {
            TypeClass::Scalar | TypeClass::Vector | TypeClass::Matrix => {
                self.lower_numeric_init(var, ty, loc, args, list)?;
            }
            TypeClass::Struct => self.lower_struct_init(var, ty, loc, args, list)?,
            TypeClass::Array => {
                if args.len() == 1 {
                    let rhs = args.into_iter().next().unwrap_or_default();
                    self.lower_init_assign(NodeKind::VarDeref(var), ty, rhs, loc, list);
                } else {
                    self.cx.unimplemented(loc, "array initializers");
                }
            }
            TypeClass::Object => {
                // Object initializers (sampler_state blocks and friends)
                // come from the effect framework; plain expressions assign.
                if args.len() == 1 {
                    let rhs = args.into_iter().next().unwrap_or_default();
                    self.lower_init_assign(NodeKind::VarDeref(var), ty, rhs, loc, list);
                } else {
                    self.cx.unimplemented(loc, "object initializers");
                }
            }
        }
        Ok(())
    }

    pub(super) fn skip_braced(&mut self) -> ParseResult<()> {
        self.expect(TokenType::LBrace)?;
        let mut depth = 1u32;
        loop {
            let tok = self.bump();
            match tok.kind {
                TokenType::LBrace => depth += 1,
                TokenType::RBrace => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(());
                    }
                }
                TokenType::Eof => return Err(self.syntax_error(tok, "'}'")),
                _ => {}
            }
        }
    }

    /// Appends `rhs`, converts its result to `ty`, and stores to `target`.
    fn lower_init_assign(
        &mut self,
        target_kind: NodeKind,
        ty: TypeId,
        mut rhs: InstrList,
        loc: SourceLoc,
        list: &mut InstrList,
    ) {
        let rhs_node = self.implicit_conversion(&mut rhs, ty, loc);
        list.extend(rhs);
        // Store targets are owned by the assignment, never listed.
        let target = self.cx.ir.alloc(target_kind, loc, ty);
        let assign = self.cx.ir.alloc(
            NodeKind::Assignment {
                lhs: target,
                op: crate::ir::AssignOp::Assign,
                rhs: rhs_node,
            },
            loc,
            ty,
        );
        list.push(assign);
    }

    fn lower_numeric_init(
        &mut self,
        var: VarId,
        ty: TypeId,
        loc: SourceLoc,
        args: Vec<InstrList>,
        list: &mut InstrList,
    ) -> ParseResult<()> {
        let want = self.cx.types.component_count(ty);
        let counts: Vec<u32> = args
            .iter()
            .map(|a| {
                let node = *a.last().expect("expression lists are never empty");
                self.cx.ir.get(node).ty
            })
            .map(|t| self.cx.types.component_count(t))
            .collect();
        let got: u32 = counts.iter().sum();

        if args.len() == 1 && counts[0] == 1 && want > 1 {
            // Single scalar initializer: broadcast through a constructor
            // that repeats the component.
            let mut rhs = args.into_iter().next().unwrap_or_default();
            let scalar = *rhs.last().expect("expression lists are never empty");
            list.append(&mut rhs);
            let ctor_args = vec![scalar; want as usize];
            let ctor = self.cx.ir.alloc(
                NodeKind::Constructor { args: ctor_args },
                loc,
                ty,
            );
            list.push(ctor);
            let target = self.cx.ir.alloc(NodeKind::VarDeref(var), loc, ty);
            let assign = self.cx.ir.alloc(
                NodeKind::Assignment {
                    lhs: target,
                    op: crate::ir::AssignOp::Assign,
                    rhs: ctor,
                },
                loc,
                ty,
            );
            list.push(assign);
            return Ok(());
        }

        if got != want {
            self.cx.error(
                loc,
                format!("expected {} components in initializer, but got {}", want, got),
            );
            return Ok(());
        }

        if args.len() == 1 {
            let target = NodeKind::VarDeref(var);
            let rhs = args.into_iter().next().unwrap_or_default();
            self.lower_init_assign(target, ty, rhs, loc, list);
            return Ok(());
        }

        // Braced numeric initializer with matching total size lowers to a
        // constructor over the flattened arguments.
        let mut nodes = Vec::with_capacity(args.len());
        for mut arg in args {
            let node = *arg.last().expect("expression lists are never empty");
            let arg_ty = self.cx.ir.get(node).ty;
            if !self.cx.types.get(arg_ty).is_numeric() {
                let text = self.cx.type_name(arg_ty);
                self.cx
                    .error(loc, format!("wrong type {} in numeric initializer", text));
            }
            list.append(&mut arg);
            nodes.push(node);
        }
        let ctor = self.cx.ir.alloc(NodeKind::Constructor { args: nodes }, loc, ty);
        list.push(ctor);
        let target = self.cx.ir.alloc(NodeKind::VarDeref(var), loc, ty);
        let assign = self.cx.ir.alloc(
            NodeKind::Assignment {
                lhs: target,
                op: crate::ir::AssignOp::Assign,
                rhs: ctor,
            },
            loc,
            ty,
        );
        list.push(assign);
        Ok(())
    }

    /// Braced struct initializers lower to one store per field; a
    /// multi-component field fed by scalars gets per-component stores.
    fn lower_struct_init(
        &mut self,
        var: VarId,
        ty: TypeId,
        loc: SourceLoc,
        args: Vec<InstrList>,
        list: &mut InstrList,
    ) -> ParseResult<()> {
        if args.len() == 1 {
            let arg = args.into_iter().next().unwrap_or_default();
            let node = *arg.last().expect("expression lists are never empty");
            let arg_ty = self.cx.ir.get(node).ty;
            if self.cx.types.equal(arg_ty, ty) {
                self.lower_init_assign(NodeKind::VarDeref(var), ty, arg, loc, list);
            } else {
                let text = self.cx.type_name(arg_ty);
                let want = self.cx.type_name(ty);
                self.cx
                    .error(loc, format!("cannot initialize {} from {}", want, text));
            }
            return Ok(());
        }

        let want = self.cx.types.component_count(ty);
        let mut arg_nodes = Vec::with_capacity(args.len());
        let mut got = 0u32;
        for mut arg in args {
            let node = *arg.last().expect("expression lists are never empty");
            got += self.cx.types.component_count(self.cx.ir.get(node).ty);
            list.append(&mut arg);
            arg_nodes.push(node);
        }
        if got != want {
            self.cx.error(
                loc,
                format!("expected {} components in initializer, but got {}", want, got),
            );
            return Ok(());
        }

        let fields = self.cx.types.get(ty).fields.clone();
        let mut cursor = 0usize;
        for (field_index, field) in fields.iter().enumerate() {
            if cursor >= arg_nodes.len() {
                break;
            }
            let field_size = self.cx.types.component_count(field.ty);
            let arg = arg_nodes[cursor];
            let arg_size = self.cx.types.component_count(self.cx.ir.get(arg).ty);

            if arg_size == field_size {
                let base = self.cx.ir.alloc(NodeKind::VarDeref(var), loc, ty);
                let target = self.cx.ir.alloc(
                    NodeKind::RecordDeref {
                        base,
                        field: field_index as u32,
                    },
                    loc,
                    field.ty,
                );
                let assign = self.cx.ir.alloc(
                    NodeKind::Assignment {
                        lhs: target,
                        op: crate::ir::AssignOp::Assign,
                        rhs: arg,
                    },
                    loc,
                    field.ty,
                );
                list.push(assign);
                cursor += 1;
                continue;
            }

            let field_ty = self.cx.types.get(field.ty).clone();
            let scalars_fit = field_ty.is_numeric()
                && field_size > 1
                && arg_nodes.len() - cursor >= field_size as usize
                && arg_nodes[cursor..cursor + field_size as usize].iter().all(|&n| {
                    let t = self.cx.ir.get(n).ty;
                    self.cx.types.component_count(t) == 1
                });
            if !scalars_fit {
                self.cx.unimplemented(
                    loc,
                    "initializing struct fields with mismatched component sizes",
                );
                cursor += 1;
                continue;
            }

            // One store per component of the field.
            let scalar_ty = self
                .cx
                .types
                .numeric(field_ty.base, 1, 1);
            for comp in 0..field_size {
                let rhs = arg_nodes[cursor];
                cursor += 1;
                let base = self.cx.ir.alloc(NodeKind::VarDeref(var), loc, ty);
                let record = self.cx.ir.alloc(
                    NodeKind::RecordDeref {
                        base,
                        field: field_index as u32,
                    },
                    loc,
                    field.ty,
                );
                let mask = if field_ty.class == TypeClass::Matrix {
                    let row = (comp / field_ty.dimx) as u8;
                    let col = (comp % field_ty.dimx) as u8;
                    SwizzleMask::matrix(&[(row, col)])
                } else {
                    SwizzleMask::vector(&[comp as u8])
                };
                let target = self.cx.ir.alloc(
                    NodeKind::Swizzle { base: record, mask },
                    loc,
                    scalar_ty,
                );
                let assign = self.cx.ir.alloc(
                    NodeKind::Assignment {
                        lhs: target,
                        op: crate::ir::AssignOp::Assign,
                        rhs,
                    },
                    loc,
                    scalar_ty,
                );
                list.push(assign);
            }
        }
        Ok(())
    }

    /// `: register(<tag><num>)`, with an optional tolerated-but-ignored
    /// target-profile second argument.
    fn parse_register_reservation(&mut self) -> ParseResult<Option<RegReservation>> {
        self.expect(TokenType::Register)?;
        self.expect(TokenType::LParen)?;
        let (first, first_loc) = self.expect_any_ident()?;
        if self.eat(TokenType::Comma) {
            let (second, second_loc) = self.expect_any_ident()?;
            let text = self.cx.interner.resolve(second).to_string();
            self.cx.warning(
                second_loc,
                format!("shader target specifier '{}' in register reservation is ignored", text),
            );
        }
        self.expect(TokenType::RParen)?;

        let (sym, loc) = (first, first_loc);
        let text = self.cx.interner.resolve(sym).to_string();
        let mut chars = text.chars();
        let Some(tag) = chars.next() else {
            return Ok(None);
        };
        let rest: String = chars.collect();
        match RegKind::from_tag(tag) {
            Some(kind) => match rest.parse::<u32>() {
                Ok(index) => Ok(Some(RegReservation { kind, index })),
                Err(_) => {
                    self.cx.warning(
                        loc,
                        format!("malformed register reservation '{}'", text),
                    );
                    Ok(None)
                }
            },
            None => {
                self.cx
                    .warning(loc, format!("unsupported register type '{}'", tag));
                Ok(None)
            }
        }
    }

    /// A function declaration or definition following `[mods] ret name`.
    fn parse_function(
        &mut self,
        mods: Modifiers,
        ret: TypeId,
        name: Symbol,
        name_loc: SourceLoc,
    ) -> ParseResult<()> {
        let _ = mods;
        if self.cx.scopes.lookup_var(name).is_some() {
            let text = self.cx.interner.resolve(name).to_string();
            let prior = self.cx.scopes.lookup_var(name).map(|v| self.cx.scopes.var(v).loc);
            self.cx
                .error(name_loc, format!("redefinition of '{}' as a function", text));
            if let Some(prior_loc) = prior {
                let text = self.cx.interner.resolve(name).to_string();
                self.cx
                    .note(prior_loc, format!("'{}' was previously declared here", text));
            }
        }

        self.expect(TokenType::LParen)?;
        let mut params: Vec<ParamDecl> = Vec::new();
        if !self.eat(TokenType::RParen) {
            let void_list = match self.peek().kind {
                TokenType::TypeName(sym) if self.peek2().kind == TokenType::RParen => {
                    self.cx.scopes.lookup_type(sym) == Some(self.cx.types.void())
                }
                _ => false,
            };
            if void_list {
                self.bump();
                self.expect(TokenType::RParen)?;
            } else {
                loop {
                    params.push(self.parse_parameter()?);
                    if !self.eat(TokenType::Comma) {
                        break;
                    }
                }
                self.expect(TokenType::RParen)?;
            }
        }

        let mut semantic = None;
        while self.eat(TokenType::Colon) {
            if self.peek().kind == TokenType::Register {
                let loc = self.peek().loc;
                let _ = self.parse_register_reservation()?;
                self.cx.warning(
                    loc,
                    "register reservations are not supported on functions; ignoring".to_string(),
                );
            } else {
                let (sem, sem_loc) = self.expect_any_ident()?;
                semantic = Some(sem);
                if self.cx.types.get(ret).is_void() {
                    self.cx.error(
                        sem_loc,
                        "void functions cannot have a semantic".to_string(),
                    );
                    semantic = None;
                }
            }
        }

        let param_types: Vec<TypeId> = params.iter().map(|p| p.ty).collect();
        let tok = self.peek();
        let (body, param_vars) = match tok.kind {
            TokenType::Semicolon => {
                self.bump();
                (None, Vec::new())
            }
            TokenType::LBrace => {
                self.cx.scopes.push_scope();
                let mut param_vars = Vec::with_capacity(params.len());
                for p in &params {
                    let mut var = Variable::new(p.name, p.ty, p.loc, p.modifiers);
                    var.semantic = p.semantic;
                    match self.cx.scopes.declare_var(var) {
                        Ok(id) => param_vars.push(id),
                        Err(prior) => {
                            let text = self.cx.interner.resolve(p.name).to_string();
                            let prior_loc = self.cx.scopes.var(prior).loc;
                            self.cx
                                .error(p.loc, format!("redefinition of parameter '{}'", text));
                            self.cx.note(
                                prior_loc,
                                format!("'{}' was previously declared here", text),
                            );
                        }
                    }
                }
                self.return_type = Some(ret);
                let body = self.parse_block_body();
                self.return_type = None;
                self.cx.scopes.pop_scope();
                (Some(body?), param_vars)
            }
            _ => return Err(self.syntax_error(tok, "';' or function body")),
        };

        let text = self.cx.interner.resolve(name).to_string();
        debug!(function = %text, params = params.len(), has_body = body.is_some(), "function parsed");
        let func = Function {
            name,
            params: param_vars,
            param_types,
            return_type: ret,
            semantic,
            loc: name_loc,
            body,
            intrinsic: false,
        };
        match self.cx.functions.add(func, &self.cx.types) {
            AddResult::Added => {}
            AddResult::Redefined { prior_loc } => {
                self.cx
                    .error(name_loc, format!("redefinition of '{}'", text));
                self.cx
                    .note(prior_loc, format!("'{}' was previously defined here", text));
            }
            AddResult::ReturnMismatch { prior_loc } => {
                self.cx.error(
                    name_loc,
                    format!("'{}' redeclared with a different return type", text),
                );
                self.cx
                    .note(prior_loc, format!("'{}' was previously declared here", text));
            }
        }
        Ok(())
    }

    fn parse_parameter(&mut self) -> ParseResult<ParamDecl> {
        let start = self.peek();
        let mods = self.parse_modifiers()?;
        let mods = self.check_majority_conflict(mods, start.loc);
        let base = self.parse_base_type()?;
        let (name, loc) = self.expect_any_ident()?;
        let array = self.parse_array_size()?;
        let mut semantic = None;
        if self.eat(TokenType::Colon) {
            let (sem, _) = self.expect_any_ident()?;
            semantic = Some(sem);
        }

        let mut modifiers = mods;
        if !modifiers.intersects(Modifiers::IN | Modifiers::OUT) {
            // Parameters are inputs unless declared otherwise.
            modifiers |= Modifiers::IN;
        }
        let ty = self.declared_type(base, mods, loc, array);
        Ok(ParamDecl {
            name,
            ty,
            modifiers,
            semantic,
            loc,
        })
    }
}
