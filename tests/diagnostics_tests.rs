use hlslc::{compile, CompileOptions, Level, ShaderType, Status};

fn pixel(entry: &str) -> CompileOptions {
    CompileOptions::new(entry, ShaderType::Pixel, 2, 0)
}

#[test]
fn diagnostics_use_file_line_col_level_message_lines() {
    let out = compile(
        "float4 main() : COLOR {\n    return bogus;\n}\n",
        &pixel("main"),
    )
    .unwrap();
    assert_eq!(out.status, Status::Err);
    let line = out
        .diagnostics
        .lines()
        .find(|l| l.contains("undeclared identifier"))
        .expect("diagnostic emitted");
    // shader.hlsl:2:12: error: undeclared identifier 'bogus'
    assert!(line.starts_with("shader.hlsl:2:"), "line was: {}", line);
    assert!(line.contains(": error: "), "line was: {}", line);
    assert!(line.ends_with("undeclared identifier 'bogus'"));
}

#[test]
fn line_directives_relocate_diagnostics() {
    let source = "#line 120 \"lighting.fxh\"\nfloat4 main() : COLOR { return bogus; }\n";
    let out = compile(source, &pixel("main")).unwrap();
    assert!(
        out.diagnostics.contains("lighting.fxh:120:"),
        "diagnostics were:\n{}",
        out.diagnostics
    );
}

#[test]
fn errors_suppress_ir_but_keep_collecting() {
    let source = "float4 main() : COLOR {\n\
         float4 v = {1.0, 2.0};\n\
         return w.abcd;\n\
         }";
    let out = compile(source, &pixel("main")).unwrap();
    assert_eq!(out.status, Status::Err);
    assert!(out.shader.is_none(), "partial IR must never surface");
    // Both independent problems are reported.
    assert!(out.diagnostics.contains("expected 4 components"));
    assert!(out.diagnostics.contains("undeclared identifier 'w'"));
}

#[test]
fn warnings_do_not_suppress_ir() {
    let source = "float4 tint : register(q0);\nfloat4 main() : COLOR { return tint; }";
    let out = compile(source, &pixel("main")).unwrap();
    assert_eq!(out.status, Status::Warn);
    assert!(out.diagnostics.contains("warning: unsupported register type 'q'"));
    assert!(out.shader.is_some(), "warnings keep the IR");
}

#[test]
fn notes_alone_leave_status_ok() {
    let source = "float4 main() : COLOR { float arr[2] = {1.0, 2.0}; return 0.0; }";
    let out = compile(source, &pixel("main")).unwrap();
    assert_eq!(out.status, Status::Ok, "{}", out.diagnostics);
    assert!(out.diagnostics.contains("note: unimplemented"));
}

#[test]
fn redefinition_note_follows_the_error() {
    let source = "float4 main() : COLOR { float x; float x; return 0.0; }";
    let out = compile(source, &pixel("main")).unwrap();
    let mut lines = out.diagnostics.lines();
    let error_pos = lines
        .position(|l| l.contains("error: redefinition of 'x'"))
        .expect("error line");
    let note_pos = out
        .diagnostics
        .lines()
        .position(|l| l.contains("note: 'x' was previously declared here"))
        .expect("note line");
    assert!(note_pos > error_pos, "note must follow its error");
}

#[test]
fn structured_records_match_the_text() {
    let out = compile("float4 main() : COLOR { return bogus; }", &pixel("main")).unwrap();
    let record = out
        .records
        .iter()
        .find(|r| r.message.contains("undeclared identifier"))
        .expect("record present");
    assert_eq!(record.level, Level::Error);
    assert_eq!(record.file, "shader.hlsl");
    assert!(out
        .diagnostics
        .contains(&format!("{}:{}:{}", record.file, record.line, record.col)));
}

#[test]
fn multiple_errors_accumulate_in_order() {
    let source = "void main() {\n\
         const int a;\n\
         const int b;\n\
         }";
    let out = compile(source, &pixel("main")).unwrap();
    let errors: Vec<&str> = out
        .diagnostics
        .lines()
        .filter(|l| l.contains("const variable without initializer"))
        .collect();
    assert_eq!(errors.len(), 2);
    assert!(errors[0].contains(":2:"));
    assert!(errors[1].contains(":3:"));
}

#[test]
fn custom_source_name_is_used_for_locations() {
    let mut options = pixel("main");
    options.source_name = "effects/water.hlsl".to_string();
    let out = compile("float4 main() : COLOR { return bogus; }", &options).unwrap();
    assert!(out.diagnostics.contains("effects/water.hlsl:1:"));
}
