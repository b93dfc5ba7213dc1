use super::Parser;
use crate::context::CompileContext;
use crate::diag::Status;
use crate::ir::NodeKind;
use crate::scope::RegKind;
use crate::types::{Modifiers, TypeClass};

fn parse(source: &str) -> CompileContext {
    let mut cx = CompileContext::new("test.hlsl");
    let mut parser = Parser::new(&mut cx, source);
    parser.parse_program();
    cx
}

fn var_of<'a>(cx: &'a CompileContext, name: &str) -> &'a crate::scope::Variable {
    let sym = cx.interner.lookup(name).expect("name was interned");
    let id = cx.scopes.lookup_var(sym).expect("variable was declared");
    cx.scopes.var(id)
}

fn count_assignments(cx: &CompileContext) -> usize {
    cx.ir
        .iter()
        .filter(|n| matches!(n.kind, NodeKind::Assignment { .. }))
        .count()
}

// ═══════════════════════════════════════════════════════════════════
// Variable declarations
// ═══════════════════════════════════════════════════════════════════

#[test]
fn global_variables_become_uniform() {
    let cx = parse("float4 color;");
    assert_eq!(cx.diag.status(), Status::Ok, "{}", cx.diag.text());
    let var = var_of(&cx, "color");
    assert!(var.modifiers.contains(Modifiers::UNIFORM));
}

#[test]
fn local_variables_are_not_uniform() {
    let cx = parse("void f() { float x; }");
    assert_eq!(cx.diag.status(), Status::Ok, "{}", cx.diag.text());
    let var = var_of(&cx, "x");
    assert!(!var.modifiers.contains(Modifiers::UNIFORM));
}

#[test]
fn local_extern_is_rejected() {
    let cx = parse("void f() { extern float x; }");
    assert!(cx.diag.text().contains("'extern' is invalid for local variables"));
}

#[test]
fn local_groupshared_is_rejected() {
    let cx = parse("void f() { groupshared float x; }");
    assert!(cx.diag.text().contains("invalid for local variables"));
}

#[test]
fn local_semantic_is_rejected() {
    let cx = parse("void f() { float x : TEXCOORD0; }");
    assert!(cx
        .diag
        .text()
        .contains("semantics are not allowed on local variables"));
}

#[test]
fn global_semantic_is_recorded() {
    let cx = parse("float4 pos : POSITION;");
    let var = var_of(&cx, "pos");
    let sem = var.semantic.expect("semantic recorded");
    assert_eq!(cx.interner.resolve(sem), "POSITION");
}

#[test]
fn const_without_initializer_is_rejected() {
    let cx = parse("void f() { const int x; }");
    assert_eq!(cx.diag.status(), Status::Err);
    assert!(cx.diag.text().contains("const variable without initializer"));
}

#[test]
fn const_with_initializer_is_accepted() {
    let cx = parse("void f() { const int x = 4; }");
    assert_eq!(cx.diag.status(), Status::Ok, "{}", cx.diag.text());
}

#[test]
fn const_global_without_initializer_is_accepted() {
    // Globals are uniform, and uniform const needs no initializer.
    let cx = parse("const float scale;");
    assert_eq!(cx.diag.status(), Status::Ok, "{}", cx.diag.text());
}

#[test]
fn variable_redefinition_reports_error_and_note() {
    let cx = parse("void f() { float x; int x; }");
    assert_eq!(cx.diag.status(), Status::Err);
    assert!(cx.diag.text().contains("redefinition of 'x'"));
    assert!(cx.diag.text().contains("note: 'x' was previously declared here"));
}

#[test]
fn shadowing_in_inner_scope_is_allowed() {
    let cx = parse("void f() { float x; { int x; } }");
    assert_eq!(cx.diag.status(), Status::Ok, "{}", cx.diag.text());
}

#[test]
fn variable_colliding_with_function_is_rejected() {
    let cx = parse("float g() { return 0.0; }\nfloat g;");
    assert_eq!(cx.diag.status(), Status::Err);
    assert!(cx.diag.text().contains("redefinition of 'g' as a variable"));
}

#[test]
fn array_declarator_builds_array_type() {
    let cx = parse("float arr[8];");
    let var = var_of(&cx, "arr");
    let ty = cx.types.get(var.ty);
    assert_eq!(ty.class, TypeClass::Array);
    assert_eq!(ty.len, 8);
}

#[test]
fn array_size_can_be_a_constant_expression() {
    let cx = parse("float arr[2 * 3 + 1];");
    let var = var_of(&cx, "arr");
    assert_eq!(cx.types.get(var.ty).len, 7);
}

#[test]
fn array_size_out_of_range_is_rejected() {
    let cx = parse("float arr[65537];");
    assert!(cx.diag.text().contains("out of range"));
    let cx = parse("float arr[0];");
    assert!(cx.diag.text().contains("out of range"));
}

#[test]
fn non_constant_array_size_is_rejected() {
    let cx = parse("float n; float arr[n];");
    assert!(cx.diag.text().contains("array size is not a constant expression"));
}

// ═══════════════════════════════════════════════════════════════════
// Matrix majority
// ═══════════════════════════════════════════════════════════════════

#[test]
fn matrix_declarations_get_default_majority() {
    let cx = parse("float4x4 m;");
    let var = var_of(&cx, "m");
    let ty = cx.types.get(var.ty);
    assert!(ty.modifiers.contains(Modifiers::COLUMN_MAJOR));
    assert!(!ty.modifiers.contains(Modifiers::ROW_MAJOR));
}

#[test]
fn explicit_row_major_is_kept() {
    let cx = parse("row_major float2x3 m;");
    let var = var_of(&cx, "m");
    let ty = cx.types.get(var.ty);
    assert!(ty.modifiers.contains(Modifiers::ROW_MAJOR));
    assert!(!ty.modifiers.contains(Modifiers::COLUMN_MAJOR));
}

#[test]
fn conflicting_majority_modifiers_are_rejected() {
    let cx = parse("row_major column_major float4x4 m;");
    assert_eq!(cx.diag.status(), Status::Err);
    assert!(cx.diag.text().contains("mutually exclusive"));
}

#[test]
fn declared_matrix_carries_exactly_one_majority_bit() {
    for src in ["float4x4 m;", "row_major float4x4 m;", "column_major float4x4 m;"] {
        let cx = parse(src);
        let var = var_of(&cx, "m");
        let mods = cx.types.get(var.ty).modifiers & Modifiers::MAJORITY;
        assert_eq!(mods.bits().count_ones(), 1, "source: {}", src);
    }
}

// ═══════════════════════════════════════════════════════════════════
// Typedefs
// ═══════════════════════════════════════════════════════════════════

#[test]
fn typedef_introduces_a_type_name() {
    let cx = parse("typedef float2 vec2;\nvec2 uv;");
    assert_eq!(cx.diag.status(), Status::Ok, "{}", cx.diag.text());
    let var = var_of(&cx, "uv");
    let ty = cx.types.get(var.ty);
    assert_eq!(ty.class, TypeClass::Vector);
    assert_eq!(ty.dimx, 2);
}

#[test]
fn typedef_with_storage_modifier_is_rejected() {
    let cx = parse("typedef extern float err;");
    assert!(cx
        .diag
        .text()
        .contains("storage modifier 'extern' is not allowed on typedefs"));
}

#[test]
fn typedef_const_modifier_is_kept() {
    let cx = parse("typedef const float cfloat;\nvoid f() { cfloat x = 1.0; }");
    let var = var_of(&cx, "x");
    assert!(cx.types.get(var.ty).modifiers.contains(Modifiers::CONST));
}

#[test]
fn typedef_redefinition_is_rejected() {
    let cx = parse("typedef float2 v; typedef float3 v;");
    assert_eq!(cx.diag.status(), Status::Err);
    assert!(cx.diag.text().contains("redefinition of 'v'"));
}

#[test]
fn array_typedef_builds_array_type() {
    let cx = parse("typedef float4 palette[16];\npalette p;");
    let var = var_of(&cx, "p");
    let ty = cx.types.get(var.ty);
    assert_eq!(ty.class, TypeClass::Array);
    assert_eq!(ty.len, 16);
}

// ═══════════════════════════════════════════════════════════════════
// Structs
// ═══════════════════════════════════════════════════════════════════

#[test]
fn named_struct_declares_a_type() {
    let cx = parse("struct S { float a; };\nvoid f() { S s; }");
    assert_eq!(cx.diag.status(), Status::Ok, "{}", cx.diag.text());
    let var = var_of(&cx, "s");
    assert_eq!(cx.types.get(var.ty).class, TypeClass::Struct);
}

#[test]
fn anonymous_struct_declares_only_the_variable() {
    let cx = parse("struct { float a; } blob;");
    assert_eq!(cx.diag.status(), Status::Ok, "{}", cx.diag.text());
    let var = var_of(&cx, "blob");
    assert_eq!(cx.types.get(var.ty).class, TypeClass::Struct);
}

#[test]
fn struct_field_register_offsets_accumulate() {
    let cx = parse("struct S { float a; float3 b; row_major float3x2 m; float tail; };");
    let sym = cx.interner.lookup("S").unwrap();
    let id = cx.scopes.lookup_type(sym).unwrap();
    let ty = cx.types.get(id);
    let offsets: Vec<u32> = ty.fields.iter().map(|f| f.reg_offset).collect();
    // scalar: 1 reg, vector: 1 reg, row_major 3x2: 2 regs
    assert_eq!(offsets, vec![0, 1, 2, 4]);
}

#[test]
fn duplicate_struct_field_is_rejected() {
    let cx = parse("struct S { float a; float a; };");
    assert_eq!(cx.diag.status(), Status::Err);
    assert!(cx.diag.text().contains("field 'a' is already defined"));
}

#[test]
fn struct_redefinition_is_rejected() {
    let cx = parse("struct S { float a; };\nstruct S { float b; };");
    assert_eq!(cx.diag.status(), Status::Err);
    assert!(cx.diag.text().contains("redefinition of struct 'S'"));
}

#[test]
fn struct_field_semantics_are_recorded() {
    let cx = parse("struct VS_OUT { float4 pos : POSITION; float4 color : COLOR0; };");
    let sym = cx.interner.lookup("VS_OUT").unwrap();
    let id = cx.scopes.lookup_type(sym).unwrap();
    let ty = cx.types.get(id);
    let sem = ty.fields[1].semantic.expect("semantic recorded");
    assert_eq!(cx.interner.resolve(sem), "COLOR0");
}

// ═══════════════════════════════════════════════════════════════════
// Register reservations
// ═══════════════════════════════════════════════════════════════════

#[test]
fn register_reservation_maps_tags() {
    let cx = parse("float4 c : register(c12);\nsampler s : register(s3);");
    let c = var_of(&cx, "c").reservation.expect("reservation");
    assert_eq!(c.kind, RegKind::Const);
    assert_eq!(c.index, 12);
    let s = var_of(&cx, "s").reservation.expect("reservation");
    assert_eq!(s.kind, RegKind::Sampler);
    assert_eq!(s.index, 3);
}

#[test]
fn unknown_register_tag_warns_and_clears_reservation() {
    let cx = parse("float4 c : register(x7);");
    assert_eq!(cx.diag.status(), Status::Warn);
    assert!(cx.diag.text().contains("unsupported register type 'x'"));
    assert!(var_of(&cx, "c").reservation.is_none());
}

#[test]
fn register_target_argument_is_ignored_with_diagnostic() {
    let cx = parse("float4 c : register(c4, ps_2_0);");
    assert_eq!(cx.diag.status(), Status::Warn);
    assert!(cx.diag.text().contains("ignored"));
    let r = var_of(&cx, "c").reservation.expect("reservation kept");
    assert_eq!(r.index, 4);
}

#[test]
fn register_on_function_is_discarded_with_diagnostic() {
    let cx = parse("float4 main() : register(c0) { return 0.0; }");
    assert!(cx
        .diag
        .text()
        .contains("register reservations are not supported on functions"));
}

// ═══════════════════════════════════════════════════════════════════
// Functions
// ═══════════════════════════════════════════════════════════════════

#[test]
fn prototype_then_definition_is_accepted() {
    let cx = parse("float f(float x);\nfloat f(float x) { return x; }");
    assert_eq!(cx.diag.status(), Status::Ok, "{}", cx.diag.text());
}

#[test]
fn function_redefinition_is_rejected() {
    let cx = parse("float f() { return 0.0; }\nfloat f() { return 1.0; }");
    assert_eq!(cx.diag.status(), Status::Err);
    assert!(cx.diag.text().contains("redefinition of 'f'"));
    assert!(cx.diag.text().contains("previously defined here"));
}

#[test]
fn return_type_mismatch_is_rejected_with_note() {
    let cx = parse("float f(int x);\nint f(int x) { return x; }");
    assert_eq!(cx.diag.status(), Status::Err);
    assert!(cx.diag.text().contains("different return type"));
    assert!(cx.diag.text().contains("note:"));
}

#[test]
fn overloads_by_signature_are_accepted() {
    let cx = parse("float f(float x) { return x; }\nfloat f(int x) { return 1.0; }");
    assert_eq!(cx.diag.status(), Status::Ok, "{}", cx.diag.text());
}

#[test]
fn void_function_with_semantic_is_rejected() {
    let cx = parse("void f() : COLOR { }");
    assert_eq!(cx.diag.status(), Status::Err);
    assert!(cx.diag.text().contains("void functions cannot have a semantic"));
}

#[test]
fn void_parameter_list_is_empty() {
    let cx = parse("float f(void) { return 0.0; }");
    assert_eq!(cx.diag.status(), Status::Ok, "{}", cx.diag.text());
    let sym = cx.interner.lookup("f").unwrap();
    assert!(cx.functions.overloads(sym).unwrap()[0].param_types.is_empty());
}

#[test]
fn parameters_default_to_in() {
    let cx = parse("float f(float x) { return x; }");
    let sym = cx.interner.lookup("f").unwrap();
    let func = &cx.functions.overloads(sym).unwrap()[0];
    let param = cx.scopes.var(func.params[0]);
    assert!(param.modifiers.contains(Modifiers::IN));
    assert!(!param.modifiers.contains(Modifiers::OUT));
}

#[test]
fn in_out_parameter_is_inout() {
    let cx = parse("void f(in out float x) { x = 1.0; }");
    assert_eq!(cx.diag.status(), Status::Ok, "{}", cx.diag.text());
    let sym = cx.interner.lookup("f").unwrap();
    let func = &cx.functions.overloads(sym).unwrap()[0];
    let param = cx.scopes.var(func.params[0]);
    assert!(param.modifiers.contains(Modifiers::IN | Modifiers::OUT));
}

#[test]
fn duplicate_input_modifier_is_rejected() {
    let cx = parse("void f(in in float x) { }");
    assert_eq!(cx.diag.status(), Status::Err);
    assert!(cx.diag.text().contains("already specified"));
}

#[test]
fn return_value_in_void_function_is_rejected() {
    let cx = parse("void f() { return 1.0; }");
    assert!(cx.diag.text().contains("void functions cannot return a value"));
}

#[test]
fn missing_return_value_is_rejected() {
    let cx = parse("float f() { return; }");
    assert!(cx.diag.text().contains("non-void functions must return a value"));
}

// ═══════════════════════════════════════════════════════════════════
// Initializers
// ═══════════════════════════════════════════════════════════════════

#[test]
fn scalar_broadcast_lowers_to_repeating_constructor() {
    let cx = parse("void f() { float4 v = 1.0; }");
    assert_eq!(cx.diag.status(), Status::Ok, "{}", cx.diag.text());
    let ctor = cx
        .ir
        .iter()
        .find_map(|n| match &n.kind {
            NodeKind::Constructor { args } => Some(args.clone()),
            _ => None,
        })
        .expect("broadcast constructor");
    assert_eq!(ctor.len(), 4);
    assert!(ctor.iter().all(|&a| a == ctor[0]));
}

#[test]
fn braced_numeric_initializer_with_matching_count() {
    let cx = parse("void f() { float2 v = {1.0, 2.0}; }");
    assert_eq!(cx.diag.status(), Status::Ok, "{}", cx.diag.text());
    assert_eq!(count_assignments(&cx), 1);
}

#[test]
fn initializer_component_mismatch_is_rejected() {
    let cx = parse("void f() { float3 v = {1.0, 2.0}; }");
    assert_eq!(cx.diag.status(), Status::Err);
    assert!(cx
        .diag
        .text()
        .contains("expected 3 components in initializer, but got 2"));
}

#[test]
fn struct_initializer_lowers_to_field_stores() {
    let cx = parse("struct S { float a; float2 b; };\nvoid f() { S s = {1.0, 2.0, 3.0}; }");
    assert_eq!(cx.diag.status(), Status::Ok, "{}", cx.diag.text());
    // a gets one store; b gets one per component.
    assert_eq!(count_assignments(&cx), 3);
}

#[test]
fn struct_initializer_with_matching_vector_field() {
    let cx = parse("struct S { float a; float2 b; };\nvoid f() { S s = {1.0, float2(2.0, 3.0)}; }");
    assert_eq!(cx.diag.status(), Status::Ok, "{}", cx.diag.text());
    assert_eq!(count_assignments(&cx), 2);
}

#[test]
fn struct_initializer_total_mismatch_is_rejected() {
    let cx = parse("struct S { float a; float2 b; };\nvoid f() { S s = {1.0, 2.0}; }");
    assert_eq!(cx.diag.status(), Status::Err);
    assert!(cx.diag.text().contains("expected 3 components"));
}

#[test]
fn array_initializer_is_noted_unimplemented() {
    let cx = parse("void f() { float arr[2] = {1.0, 2.0}; }");
    assert_ne!(cx.diag.status(), Status::Err, "{}", cx.diag.text());
    assert!(cx.diag.text().contains("unimplemented"));
}

#[test]
fn nested_braces_are_noted_unimplemented() {
    let cx = parse("void f() { float4 v = {{1.0, 2.0}, 3.0, 4.0}; }");
    assert_ne!(cx.diag.status(), Status::Err, "{}", cx.diag.text());
    assert!(cx.diag.text().contains("unimplemented"));
}

// ═══════════════════════════════════════════════════════════════════
// Statements and expressions
// ═══════════════════════════════════════════════════════════════════

#[test]
fn non_scalar_if_condition_is_rejected() {
    let cx = parse("void f() { float4 v; if (v) { } }");
    assert_eq!(cx.diag.status(), Status::Err);
    assert!(cx.diag.text().contains("if condition requires a scalar"));
}

#[test]
fn assignment_to_const_is_rejected_and_not_lowered() {
    let cx = parse("void f() { const float x = 1.0; x = 2.0; }");
    assert_eq!(cx.diag.status(), Status::Err);
    assert!(cx.diag.text().contains("l-value is const"));
    // Only the initializer store exists.
    assert_eq!(count_assignments(&cx), 1);
}

#[test]
fn const_swizzle_target_is_still_const() {
    let cx = parse("void f() { const float4 v = 1.0; v.x = 2.0; }");
    assert_eq!(cx.diag.status(), Status::Err);
    assert!(cx.diag.text().contains("l-value is const"));
}

#[test]
fn assignment_to_rvalue_is_rejected() {
    let cx = parse("void f() { float x; x + 1.0 = 2.0; }");
    assert_eq!(cx.diag.status(), Status::Err);
    assert!(cx.diag.text().contains("invalid lvalue"));
}

#[test]
fn postincrement_result_cannot_be_assigned() {
    let cx = parse("void f() { float x = 0.0; x++ = 2.0; }");
    assert_eq!(cx.diag.status(), Status::Err);
    assert!(cx.diag.text().contains("l-value is const"));
}

#[test]
fn undeclared_identifier_is_rejected() {
    let cx = parse("void f() { x = 1.0; }");
    assert_eq!(cx.diag.status(), Status::Err);
    assert!(cx.diag.text().contains("undeclared identifier 'x'"));
}

#[test]
fn constructor_with_wrong_component_count_is_rejected() {
    let cx = parse("void f() { float4 v = float4(1.0, 2.0); }");
    assert_eq!(cx.diag.status(), Status::Err);
    assert!(cx
        .diag
        .text()
        .contains("wrong number of components in constructor"));
}

#[test]
fn constructor_on_struct_type_is_rejected() {
    let cx = parse("struct S { float a; };\nvoid f() { S s = S(1.0); }");
    assert_eq!(cx.diag.status(), Status::Err);
    assert!(cx
        .diag
        .text()
        .contains("constructors are only defined for numeric types"));
}

#[test]
fn invalid_cast_is_rejected() {
    let cx = parse("struct S { float a; };\nvoid f() { S s; float x = (float)s; }");
    assert_eq!(cx.diag.status(), Status::Err);
    assert!(cx.diag.text().contains("can't cast from"));
}

#[test]
fn vector_truncation_cast_is_accepted() {
    let cx = parse("void f() { float4 v; float2 w = (float2)v; }");
    assert_eq!(cx.diag.status(), Status::Ok, "{}", cx.diag.text());
}

#[test]
fn invalid_field_name_is_rejected() {
    let cx = parse("struct S { float a; };\nvoid f() { S s; float x = s.b; }");
    assert_eq!(cx.diag.status(), Status::Err);
    assert!(cx.diag.text().contains("invalid field name 'b'"));
}

#[test]
fn invalid_swizzle_is_rejected() {
    let cx = parse("float main() : COLOR { float3 v; return v.abcd; }");
    assert_eq!(cx.diag.status(), Status::Err);
    assert!(cx.diag.text().contains("invalid swizzle"));
}

#[test]
fn indexing_a_scalar_is_rejected() {
    let cx = parse("void f() { float x; float y = x[0]; }");
    assert_eq!(cx.diag.status(), Status::Err);
    assert!(cx.diag.text().contains("cannot be array-indexed"));
}

#[test]
fn non_scalar_index_is_rejected() {
    let cx = parse("void f() { float4 v; float2 i; float x = v[i]; }");
    assert_eq!(cx.diag.status(), Status::Err);
    assert!(cx.diag.text().contains("array index is not scalar"));
}

#[test]
fn matrix_indexing_yields_a_row_vector() {
    let cx = parse("void f() { float3x2 m; float3 row = m[1]; }");
    assert_eq!(cx.diag.status(), Status::Ok, "{}", cx.diag.text());
}

#[test]
fn vector_indexing_yields_a_scalar() {
    let cx = parse("void f() { float4 v; float x = v[2]; }");
    assert_eq!(cx.diag.status(), Status::Ok, "{}", cx.diag.text());
}

#[test]
fn function_call_is_reported() {
    let cx = parse("float helper() { return 1.0; }\nvoid f() { float x = helper(); }");
    assert_eq!(cx.diag.status(), Status::Err);
    assert!(cx
        .diag
        .text()
        .contains("call to function 'helper' is not supported"));
}

#[test]
fn shift_of_float_operands_is_rejected() {
    let cx = parse("void f() { float x; float y = x << 2; }");
    assert_eq!(cx.diag.status(), Status::Err);
    assert!(cx
        .diag
        .text()
        .contains("bitwise operations require integral operands"));
}

#[test]
fn integer_shift_is_lowered() {
    let cx = parse("void f() { int x = 1; int y = x << 2; }");
    assert_eq!(cx.diag.status(), Status::Ok, "{}", cx.diag.text());
    assert!(cx
        .ir
        .iter()
        .any(|n| matches!(n.kind, NodeKind::Expr { op: crate::ir::ExprOp::Shl, .. })));
}

#[test]
fn logical_and_produces_bool_result() {
    let cx = parse("void f() { float a; float b; if (a < 1.0 && b < 2.0) { } }");
    assert_eq!(cx.diag.status(), Status::Ok, "{}", cx.diag.text());
    let node = cx
        .ir
        .iter()
        .find(|n| matches!(n.kind, NodeKind::Expr { op: crate::ir::ExprOp::LogicAnd, .. }))
        .expect("logical and lowered");
    assert_eq!(cx.types.get(node.ty).base, crate::types::BaseType::Bool);
}

#[test]
fn ternary_with_non_scalar_condition_is_rejected() {
    let cx = parse("void f() { float4 v; float x = v ? 1.0 : 2.0; }");
    assert_eq!(cx.diag.status(), Status::Err);
    assert!(cx.diag.text().contains("ternary condition requires a scalar"));
}

#[test]
fn ternary_is_lowered_to_select() {
    let cx = parse("void f() { float c; float x = c < 1.0 ? 2.0 : 3.0; }");
    assert_eq!(cx.diag.status(), Status::Ok, "{}", cx.diag.text());
    assert!(cx
        .ir
        .iter()
        .any(|n| matches!(n.kind, NodeKind::Expr { op: crate::ir::ExprOp::Select, .. })));
}

#[test]
fn compound_assignment_keeps_operator_tag() {
    let cx = parse("void f() { float x = 1.0; x += 2.0; }");
    assert_eq!(cx.diag.status(), Status::Ok, "{}", cx.diag.text());
    assert!(cx
        .ir
        .iter()
        .any(|n| matches!(n.kind, NodeKind::Assignment { op: crate::ir::AssignOp::Add, .. })));
}

#[test]
fn swizzle_store_broadcasts_scalar() {
    let cx = parse("float4 main() : COLOR { float4 v; v.xy = 1.0; return v; }");
    assert_eq!(cx.diag.status(), Status::Ok, "{}", cx.diag.text());
}

#[test]
fn statement_starting_with_constructor_is_an_expression() {
    let cx = parse("void f() { float4(1.0, 2.0, 3.0, 4.0); }");
    assert_eq!(cx.diag.status(), Status::Ok, "{}", cx.diag.text());
}

#[test]
fn technique_blocks_are_rejected() {
    let cx = parse("technique T { pass P { } }");
    assert_eq!(cx.diag.status(), Status::Err);
    assert!(cx.diag.text().contains("not supported"));
}

#[test]
fn syntax_error_recovery_continues_parsing() {
    let cx = parse("float4 @@;\nfloat4 ok;");
    assert_eq!(cx.diag.status(), Status::Err);
    // The second declaration still lands.
    assert!(cx.interner.lookup("ok").and_then(|s| cx.scopes.lookup_var(s)).is_some());
}
