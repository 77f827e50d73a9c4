// Integration tests for the COOL parser

use cool_front::parser::ast::{Expression, Feature, Node};
use cool_front::parser::lexer::{Lexer, TokenKind};
use cool_front::parser::{parse, DiagnosticKind, Parser, ParserConfig, MAX_NESTING_DEPTH};

#[test]
fn test_empty_class() {
    let (program, diagnostics) = parse("class Main { };");

    assert!(diagnostics.is_empty());
    assert_eq!(program.classes.len(), 1);
    assert_eq!(program.classes[0].name.value, "Main");
    assert!(program.classes[0].features.is_empty());
}

#[test]
fn test_attribute_and_method() {
    let (program, diagnostics) = parse("class Main { x : Int <- 5; f(y : Int) : Int { y }; };");
    assert!(diagnostics.is_empty(), "unexpected diagnostics: {:?}", diagnostics);

    let class = &program.classes[0];
    assert_eq!(class.features.len(), 2);

    let Feature::Attribute(attr) = &class.features[0] else {
        panic!("Expected attribute, got {:?}", class.features[0]);
    };
    assert_eq!(attr.name.value, "x");
    assert_eq!(attr.decl_type.value, "Int");
    assert!(matches!(
        attr.init,
        Some(Expression::IntegerLiteral { value: 5, .. })
    ));

    let Feature::Method(method) = &class.features[1] else {
        panic!("Expected method, got {:?}", class.features[1]);
    };
    assert_eq!(method.name.value, "f");
    assert_eq!(method.formals.len(), 1);
    assert_eq!(method.formals[0].to_string(), "y : Int");
    assert_eq!(method.return_type.value, "Int");
    assert!(matches!(&method.body, Expression::Identifier(ident) if ident.value == "y"));
}

#[test]
fn test_missing_closing_brace_reports_and_returns() {
    let (program, diagnostics) = parse("class Main { x : Int <- 5;");

    assert!(program.classes.is_empty());
    assert!(!diagnostics.is_empty());
    let message = diagnostics[0].to_string();
    assert!(
        message.contains("RBRACE") || message.contains("SEMI"),
        "unexpected message: {}",
        message
    );
}

#[test]
fn test_two_formals_in_order() {
    let (program, diagnostics) = parse("class A { g(a: Int, b: Int): Int { a }; };");
    assert!(diagnostics.is_empty());

    let Feature::Method(method) = &program.classes[0].features[0] else {
        panic!("Expected method");
    };
    let names: Vec<_> = method.formals.iter().map(|f| f.name.value.as_str()).collect();
    assert_eq!(names, vec!["a", "b"]);
}

#[test]
fn test_expression_shapes() {
    let source = "class A {\n  \
                  p : Int <- 1 + 2 * 3;\n  \
                  q : Int <- a - b - c;\n  \
                  r : Bool <- not x = y;\n  \
                  f() : Object { if c then a else b fi };\n  \
                  g() : Object { { a; b; } };\n\
                  };";
    let (program, diagnostics) = parse(source);
    assert!(diagnostics.is_empty(), "unexpected diagnostics: {:?}", diagnostics);

    let rendered: Vec<_> = program.classes[0]
        .features
        .iter()
        .map(|f| f.to_string())
        .collect();
    assert_eq!(
        rendered,
        vec![
            "p : Int <- (1 + (2 * 3));",
            "q : Int <- ((a - b) - c);",
            "r : Bool <- (not (x = y));",
            "f() : Object { if c then a else b fi };",
            "g() : Object { { a; b; } };",
        ]
    );

    let Feature::Method(g) = &program.classes[0].features[4] else {
        panic!("Expected method");
    };
    assert!(matches!(&g.body, Expression::Block { body, .. } if body.len() == 2));
}

#[test]
fn test_non_associative_comparison() {
    let (_, diagnostics) = parse("class A { x : Bool <- a < b < c; };");

    assert_eq!(diagnostics.len(), 1);
    assert_eq!(
        diagnostics[0].kind,
        DiagnosticKind::NonAssociative {
            operator: "<".to_string()
        }
    );
}

#[test]
fn test_recovery_keeps_later_features_and_classes() {
    let source = r#"
        class A {
            broken : ;
            ok : Int;
            worse() : Int { while x loop y };
            fine() : Int { 0 };
        };
        class B {
            z : Int <- 3;
        };
    "#;
    let (program, diagnostics) = parse(source);

    assert_eq!(diagnostics.len(), 2, "diagnostics: {:?}", diagnostics);
    assert_eq!(program.classes.len(), 2);

    let names: Vec<_> = program.classes[0].features.iter().map(|f| f.name()).collect();
    assert_eq!(names, vec!["ok", "fine"]);
    assert_eq!(program.classes[1].features[0].name(), "z");

    assert_eq!(
        diagnostics[1].kind,
        DiagnosticKind::UnexpectedToken {
            expected: TokenKind::Pool,
            found: TokenKind::RBrace,
        }
    );
    assert_eq!(diagnostics[1].location.line, 5);
}

#[test]
fn test_diagnostic_rendering() {
    let config = ParserConfig::new().with_source_file("hello.cl");
    let (_, diagnostics) = Parser::with_config("class Main {\n  x : int;\n};", config).parse_program();

    assert_eq!(diagnostics.len(), 1);
    assert_eq!(
        diagnostics[0].to_string(),
        "hello.cl:2:7: expected `TYPEID`, got `OBJECTID`"
    );
}

#[test]
fn test_parser_over_streaming_lexer() {
    let source: Vec<char> = "class Main { main() : Int { 42 }; };".chars().collect();
    let lexer = Lexer::from_chars(source);
    let (program, diagnostics) = Parser::from_lexer(lexer, ParserConfig::default()).parse_program();

    assert!(diagnostics.is_empty());
    let Feature::Method(main) = &program.classes[0].features[0] else {
        panic!("Expected method");
    };
    assert_eq!(main.body.token_literal(), "42");
}

#[test]
fn test_program_display() {
    let (program, _) = parse("class A { x : Int; }; class B { f(a : Int) : Int { a + 1 }; };");

    assert_eq!(
        program.to_string(),
        "class A {\n    x : Int;\n};\n\nclass B {\n    f(a : Int) : Int { (a + 1) };\n};\n"
    );
}

#[test]
fn test_malformed_last_feature_keeps_class() {
    let (program, diagnostics) = parse("class A { y : Int; x : Int <- }; class B { };");

    assert_eq!(diagnostics.len(), 1, "diagnostics: {:?}", diagnostics);
    assert_eq!(diagnostics[0].location.column, 31);
    assert_eq!(program.classes.len(), 2);
    assert_eq!(program.classes[0].name.value, "A");
    assert_eq!(program.classes[0].features[0].name(), "y");
}

#[test]
fn test_deeply_nested_initializer_is_reported() {
    let depth = 200_000;
    let source = format!(
        "class A {{ x : Int <- {}1{}; y : Int; }};",
        "(".repeat(depth),
        ")".repeat(depth)
    );
    let (program, diagnostics) = parse(&source);

    assert_eq!(
        diagnostics.iter().map(|d| &d.kind).collect::<Vec<_>>(),
        vec![&DiagnosticKind::NestingTooDeep {
            limit: MAX_NESTING_DEPTH
        }]
    );
    let features: Vec<_> = program.classes[0].features.iter().map(|f| f.name()).collect();
    assert_eq!(features, vec!["y"]);
}
