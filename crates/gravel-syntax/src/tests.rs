use pretty_assertions::assert_eq;

use crate::tree::*;
use crate::{lex, parse, ParseFailure, ParseOptions, PredictionCache, PredictionMode, SyntaxKind};

fn parse_ok(text: &str) -> CompilationUnit {
    match parse(text, &ParseOptions::default(), &PredictionCache::new()) {
        Ok(out) => out.unit,
        Err(err) => panic!("failed to parse {text:?}: {err:?}"),
    }
}

fn only_type(unit: &CompilationUnit) -> &TypeDecl {
    match unit.statements.as_slice() {
        [ScriptStatement::Type(decl)] => decl,
        other => panic!("expected a single type declaration, got {other:?}"),
    }
}

#[test]
fn tokens_are_contiguous_with_source_order() {
    let text = "def s = \"a ${b} c\"\nx = /re/ + 1";
    let tokens = lex(text).unwrap();
    assert_eq!(tokens.last().map(|t| t.kind), Some(SyntaxKind::Eof));
    for pair in tokens.windows(2) {
        assert!(pair[0].range.end <= pair[1].range.start, "{pair:?}");
    }
}

#[test]
fn class_members() {
    let unit = parse_ok(
        "class Point {\n  int x, y\n  Point(int x) { this.x = x }\n  String toString() { \"$x\" }\n  static class Inner {}\n}",
    );
    let decl = only_type(&unit);
    assert_eq!(decl.kind, TypeDeclKind::Class);
    assert_eq!(decl.name.text, "Point");
    let kinds: Vec<&str> = decl
        .body
        .members
        .iter()
        .map(|member| match member {
            ClassBodyDecl::Field(_) => "field",
            ClassBodyDecl::Method(_) => "method",
            ClassBodyDecl::Type(_) => "type",
            ClassBodyDecl::Initializer { .. } => "init",
        })
        .collect();
    assert_eq!(kinds, vec!["field", "method", "method", "type"]);
}

#[test]
fn enum_constants_with_bodies() {
    let unit = parse_ok("enum Color { RED, GREEN(2), BLUE { int v() { 3 } }\n  int v() { 1 } }");
    let decl = only_type(&unit);
    assert_eq!(decl.kind, TypeDeclKind::Enum);
    assert_eq!(decl.body.enum_constants.len(), 3);
    assert!(decl.body.enum_constants[1].arguments.is_some());
    assert!(decl.body.enum_constants[2].body.is_some());
    assert_eq!(decl.body.members.len(), 1);
}

#[test]
fn script_method_declarations() {
    let unit = parse_ok("def greet(name) {\n  println \"hi $name\"\n}\ngreet 'you'");
    assert!(matches!(
        unit.statements[0],
        ScriptStatement::Statement(Statement::Method(_))
    ));
    assert!(matches!(
        unit.statements[1],
        ScriptStatement::Statement(Statement::Expression(_))
    ));
}

#[test]
fn gstring_values() {
    let unit = parse_ok("s = \"$a.b and ${c + 1}\"");
    let Some(ScriptStatement::Statement(Statement::Expression(cmd))) = unit.statements.first()
    else {
        panic!("expected expression");
    };
    let Expr::Assignment { rhs, .. } = &cmd.expr else {
        panic!("expected assignment");
    };
    let StatementExpr::Command(rhs) = rhs.as_ref() else {
        panic!("expected command");
    };
    let Expr::Path(PathExpr {
        primary: Primary::GString(gstring),
        ..
    }) = &rhs.expr
    else {
        panic!("expected gstring");
    };
    assert_eq!(gstring.values.len(), 2);
    assert_eq!(gstring.parts.len(), 1);
    assert!(matches!(
        &gstring.values[0],
        GStringValue::Path { parts, .. } if parts.len() == 1
    ));
    assert!(matches!(gstring.values[1], GStringValue::Closure(_)));
}

#[test]
fn array_creators_and_initializers() {
    let unit = parse_ok("def a = new int[3][]\ndef b = new String[] { 'x', 'y' }");
    assert_eq!(unit.statements.len(), 2);
}

#[test]
fn slow_mode_reports_every_broken_statement() {
    let err = parse("class A {\n  def x = \n}\ndef y = [1,,2]\n", &ParseOptions::default(), &PredictionCache::new())
        .unwrap_err();
    let ParseFailure::Syntax(errors) = err else {
        panic!("expected syntax errors");
    };
    assert!(errors.len() >= 2, "{errors:?}");
}

#[test]
fn concurrent_parses_share_the_cache() {
    let cache = PredictionCache::new();
    let sources = [
        "String a = 'x'\nfoo((int) 1)",
        "List<String> l = []\nl.each { s -> println s }",
        "def f = (x) -> x * 2\nprintln f(2)",
        "Map m = [a: 1]\nm?.a",
    ];
    std::thread::scope(|scope| {
        for text in sources {
            let cache = cache.clone();
            scope.spawn(move || {
                let out = parse(text, &ParseOptions::default(), &cache).unwrap();
                assert_eq!(out.mode, PredictionMode::Sll);
            });
        }
    });
    assert!(!cache.is_empty());
}
