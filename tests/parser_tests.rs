use monkey::ast::{Expression, InfixOperator, PrefixOperator, Program, Statement};
use monkey::parser::{self, Parser};
use monkey::Lexer;
use pretty_assertions::assert_eq;

fn parse_ok(source: &str) -> Program {
    match parser::parse(source) {
        Ok(program) => program,
        Err(errors) => panic!("parse errors for {:?}: {:?}", source, errors),
    }
}

fn render(source: &str) -> String {
    parse_ok(source).to_string()
}

fn single_expression(source: &str) -> Expression {
    let mut program = parse_ok(source);
    assert_eq!(program.statements.len(), 1, "expected one statement in {:?}", source);
    match program.statements.remove(0) {
        Statement::Expression { expression, .. } => expression,
        other => panic!("expected expression statement, got {:?}", other),
    }
}

#[test]
fn operator_precedence() {
    let cases = [
        ("-a * b", "((-a) * b)"),
        ("!-a", "(!(-a))"),
        ("a + b + c", "((a + b) + c)"),
        ("a + b - c", "((a + b) - c)"),
        ("a * b * c", "((a * b) * c)"),
        ("a * b / c", "((a * b) / c)"),
        ("a + b / c", "(a + (b / c))"),
        ("a % b * c", "((a % b) * c)"),
        ("a + b * c + d / e - f", "(((a + (b * c)) + (d / e)) - f)"),
        ("3 + 4; -5 * 5", "(3 + 4); ((-5) * 5)"),
        ("5 > 4 == 3 < 4", "((5 > 4) == (3 < 4))"),
        ("5 <= 4 != 3 >= 4", "((5 <= 4) != (3 >= 4))"),
        ("3 + 4 * 5 == 3 * 1 + 4 * 5", "((3 + (4 * 5)) == ((3 * 1) + (4 * 5)))"),
        ("3 > 5 == false", "((3 > 5) == false)"),
        ("1 + (2 + 3) + 4", "((1 + (2 + 3)) + 4)"),
        ("(5 + 5) * 2", "((5 + 5) * 2)"),
        ("-(5 + 5)", "(-(5 + 5))"),
        ("!(true == true)", "(!(true == true))"),
        ("a | b ^ c & d", "(a | (b ^ (c & d)))"),
        ("a & b == c", "((a & b) == c)"),
        ("a < b | c", "(a < (b | c))"),
        ("a & b + c", "(a & (b + c))"),
        ("a + add(b * c) + d", "((a + add((b * c))) + d)"),
        (
            "add(a, b, 1, 2 * 3, 4 + 5, add(6, 7 * 8))",
            "add(a, b, 1, (2 * 3), (4 + 5), add(6, (7 * 8)))",
        ),
        ("a * [1, 2, 3, 4][b * c] * d", "((a * ([1, 2, 3, 4][(b * c)])) * d)"),
        (
            "add(a * b[2], b[1], 2 * [1, 2][1])",
            "add((a * (b[2])), (b[1]), (2 * ([1, 2][1])))",
        ),
        ("x = 1 + 2", "(x = (1 + 2))"),
        ("x = y = 5", "(x = (y = 5))"),
        ("adder(1)(2)", "adder(1)(2)"),
    ];

    for (input, expected) in cases {
        assert_eq!(render(input), expected, "input: {}", input);
    }
}

#[test]
fn statement_rendering() {
    let cases = [
        ("var x = 5;", "var x = 5"),
        ("val y = true;", "val y = true"),
        ("return x + 1;", "return (x + 1)"),
        ("var a = 1; val b = 2; a + b;", "var a = 1; val b = 2; (a + b)"),
        ("if (x < y) { x }", "if (x < y) { x }"),
        ("if (x < y) { x } else { y }", "if (x < y) { x } else { y }"),
        ("if (a) { 1 } else if (b) { 2 }", "if a { 1 } else { if b { 2 } }"),
        ("while (i < 3) { i = i + 1; }", "while (i < 3) { (i = (i + 1)) }"),
        ("func(x, y) { x + y; }", "func(x, y) { (x + y) }"),
        ("func() { }", "func() { }"),
        ("func(x) { var y = x; return y; }", "func(x) { var y = x; return y }"),
        ("{\"one\": 1, \"two\": 2}", "{\"one\": 1, \"two\": 2}"),
        ("{}", "{}"),
        ("[]", "[]"),
        ("\"hello world\"", "\"hello world\""),
    ];

    for (input, expected) in cases {
        assert_eq!(render(input), expected, "input: {}", input);
    }
}

#[test]
fn rendered_programs_parse_back_to_the_same_rendering() {
    let sources = [
        "var adder = func(x) { func(y) { x + y } }; adder(2)(3);",
        "var i = 0; while (i < 3) { i = i + 1; } i;",
        "if (1 < 2) { \"yes\" } else if (false) { \"maybe\" } else { \"no\" }",
        "val h = {\"a\": [1, 2 * 3], true: -4}; h[\"a\"][1] + h[true];",
        "x = y = 5 % 3 | 1 ^ 2 & 3;",
        "func() { return 1; }()",
    ];

    for source in sources {
        let once = render(source);
        let twice = render(&once);
        assert_eq!(twice, once, "source: {}", source);
    }
}

#[test]
fn declarations() {
    let program = parse_ok("var x = 5; val y = x;");
    assert_eq!(program.token_literal(), "var");

    match &program.statements[0] {
        Statement::Var { name, value, .. } => {
            assert_eq!(name.value, "x");
            assert!(matches!(value, Expression::IntegerLiteral { value: 5, .. }));
        }
        other => panic!("expected var, got {:?}", other),
    }
    match &program.statements[1] {
        Statement::Val { name, value, .. } => {
            assert_eq!(name.value, "y");
            assert!(matches!(value, Expression::Identifier(ident) if ident.value == "x"));
        }
        other => panic!("expected val, got {:?}", other),
    }
}

#[test]
fn prefix_and_infix_shapes() {
    match single_expression("-15") {
        Expression::Prefix { operator, right, .. } => {
            assert_eq!(operator, PrefixOperator::Negate);
            assert!(matches!(*right, Expression::IntegerLiteral { value: 15, .. }));
        }
        other => panic!("expected prefix, got {:?}", other),
    }

    match single_expression("5 >= 3") {
        Expression::Infix { operator, .. } => assert_eq!(operator, InfixOperator::GreaterEqual),
        other => panic!("expected infix, got {:?}", other),
    }
}

#[test]
fn function_literal_shape() {
    match single_expression("func(x, y) { x + y; }") {
        Expression::FunctionLiteral { parameters, body, .. } => {
            let names: Vec<&str> = parameters.iter().map(|p| p.value.as_str()).collect();
            assert_eq!(names, vec!["x", "y"]);
            assert_eq!(body.statements.len(), 1);
        }
        other => panic!("expected function literal, got {:?}", other),
    }
}

#[test]
fn else_if_becomes_nested_if() {
    match single_expression("if (a) { 1 } else if (b) { 2 } else { 3 }") {
        Expression::If { alternative, .. } => {
            let alternative = alternative.expect("else branch");
            assert_eq!(alternative.statements.len(), 1);
            assert!(matches!(
                &alternative.statements[0],
                Statement::Expression {
                    expression: Expression::If { alternative: Some(_), .. },
                    ..
                }
            ));
        }
        other => panic!("expected if, got {:?}", other),
    }
}

#[test]
fn hash_literal_keeps_source_order() {
    match single_expression("{\"b\": 2, \"a\": 1, 3: true}") {
        Expression::HashLiteral { pairs, .. } => {
            let keys: Vec<String> = pairs.iter().map(|(k, _)| k.to_string()).collect();
            assert_eq!(keys, vec!["\"b\"", "\"a\"", "3"]);
        }
        other => panic!("expected hash literal, got {:?}", other),
    }
}

#[test]
fn missing_declaration_name_is_one_error() {
    let errors = parser::parse("var = 5;").unwrap_err();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].message.contains("IDENT"), "{}", errors[0].message);
}

#[test]
fn parsing_continues_after_errors() {
    let mut parser = Parser::new(Lexer::new("var = 1; var y 2; val = 3; var ok = 4;"));
    let program = parser.parse_program();

    assert_eq!(parser.errors().len(), 3);
    assert_eq!(program.statements.len(), 1);
    assert_eq!(program.to_string(), "var ok = 4");
}

#[test]
fn errors_carry_positions() {
    let errors = parser::parse("var x = 1;\nvar = 2;").unwrap_err();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].line, 2);
    assert_eq!(errors[0].column, 5);
    assert_eq!(
        errors[0].to_string(),
        "[2:5] expected next token to be IDENT, got = instead"
    );
}

fn render_report(source: &str, filename: Option<&str>) -> String {
    let errors = parser::parse(source).unwrap_err();
    let mut out = Vec::new();
    errors[0].write_report(&mut out, source, filename).unwrap();
    String::from_utf8(out).unwrap()
}

#[test]
fn fancy_report_shows_file_message_and_position() {
    let rendered = render_report("var x = 1;\nvar = 2;", Some("script.mk"));

    assert!(rendered.contains("script.mk"), "{}", rendered);
    assert!(rendered.contains("expected next token to be IDENT, got = instead"), "{}", rendered);
    assert!(rendered.contains("at line 2, column 5"), "{}", rendered);
}

#[test]
fn fancy_report_at_end_of_input() {
    let rendered = render_report("(1 + 2", None);

    assert!(rendered.contains("<repl>"), "{}", rendered);
    assert!(rendered.contains("expected next token to be ), got EOF instead"), "{}", rendered);
}

#[test]
fn prefix_and_infix_registries() {
    use monkey::TokenType;

    assert!(Parser::prefix_fn(TokenType::Identifier).is_some());
    assert!(Parser::prefix_fn(TokenType::Func).is_some());
    assert!(Parser::prefix_fn(TokenType::RightParen).is_none());
    assert!(Parser::infix_fn(TokenType::LeftBracket).is_some());
    assert!(Parser::infix_fn(TokenType::Bang).is_none());
}
