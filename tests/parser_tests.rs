// tests/parser_tests.rs

use jstl_el::ast::{BinOp, Expr, UnaryOp};
use jstl_el::implicit::ImplicitObject;
use jstl_el::parser::{ParseError, Template, TemplatePart, parse_expression, parse_template};
use jstl_el::value::Value;
use pretty_assertions::assert_eq;
use rstest::rstest;

fn var(name: &str) -> Expr {
    Expr::Variable(name.to_string())
}

fn int(n: i64) -> Expr {
    Expr::Literal(Value::Integer(n))
}

fn key(name: &str) -> Expr {
    Expr::Literal(Value::String(name.to_string()))
}

// ============================================================================
// Primaries
// ============================================================================

#[test]
fn test_literals() {
    assert_eq!(parse_expression("42").unwrap(), int(42));
    assert_eq!(parse_expression("2.5").unwrap(), Expr::Literal(Value::Float(2.5)));
    assert_eq!(parse_expression("'hi'").unwrap(), key("hi"));
    assert_eq!(parse_expression("true").unwrap(), Expr::Literal(Value::Boolean(true)));
    assert_eq!(parse_expression("null").unwrap(), Expr::Literal(Value::Null));
}

#[test]
fn test_identifiers_and_implicit_objects() {
    assert_eq!(parse_expression("user").unwrap(), var("user"));
    assert_eq!(
        parse_expression("param").unwrap(),
        Expr::ImplicitObject(ImplicitObject::Param)
    );
    assert_eq!(
        parse_expression("pageContext").unwrap(),
        Expr::ImplicitObject(ImplicitObject::PageContext)
    );
}

#[test]
fn test_implicit_name_as_property_is_plain_key() {
    assert_eq!(
        parse_expression("form.param").unwrap(),
        Expr::access(var("form"), key("param"))
    );
}

// ============================================================================
// Access chains
// ============================================================================

#[test]
fn test_dot_and_bracket_are_equivalent() {
    assert_eq!(
        parse_expression("user.name").unwrap(),
        parse_expression("user['name']").unwrap()
    );
}

#[test]
fn test_access_chain_is_left_associative() {
    // a.b[c].d → ((a.b)[c]).d
    let expected = Expr::access(
        Expr::access(Expr::access(var("a"), key("b")), var("c")),
        key("d"),
    );
    assert_eq!(parse_expression("a.b[c].d").unwrap(), expected);
}

#[test]
fn test_computed_index() {
    assert_eq!(
        parse_expression("items[i + 1]").unwrap(),
        Expr::access(var("items"), Expr::binary(BinOp::Add, var("i"), int(1)))
    );
}

// ============================================================================
// Precedence
// ============================================================================

#[test]
fn test_arithmetic_precedence() {
    // 1 + 2 * 3 → 1 + (2 * 3)
    assert_eq!(
        parse_expression("1 + 2 * 3").unwrap(),
        Expr::binary(BinOp::Add, int(1), Expr::binary(BinOp::Multiply, int(2), int(3)))
    );
}

#[test]
fn test_parentheses() {
    assert_eq!(
        parse_expression("(1 + 2) * 3").unwrap(),
        Expr::binary(BinOp::Multiply, Expr::binary(BinOp::Add, int(1), int(2)), int(3))
    );
}

#[test]
fn test_subtraction_is_left_associative() {
    assert_eq!(
        parse_expression("10 - 4 - 3").unwrap(),
        Expr::binary(BinOp::Subtract, Expr::binary(BinOp::Subtract, int(10), int(4)), int(3))
    );
}

#[test]
fn test_relational_binds_tighter_than_equality() {
    // a < b == c < d → (a < b) == (c < d)
    assert_eq!(
        parse_expression("a < b == c < d").unwrap(),
        Expr::binary(
            BinOp::Equal,
            Expr::binary(BinOp::LessThan, var("a"), var("b")),
            Expr::binary(BinOp::LessThan, var("c"), var("d")),
        )
    );
}

#[test]
fn test_and_binds_tighter_than_or() {
    assert_eq!(
        parse_expression("a || b && c").unwrap(),
        Expr::binary(BinOp::Or, var("a"), Expr::binary(BinOp::And, var("b"), var("c")))
    );
}

#[test]
fn test_keyword_operators_match_symbols() {
    assert_eq!(
        parse_expression("a eq 1 and not b or c ge 2").unwrap(),
        parse_expression("a == 1 && !b || c >= 2").unwrap()
    );
    assert_eq!(
        parse_expression("a div b mod c").unwrap(),
        parse_expression("a / b % c").unwrap()
    );
}

#[test]
fn test_empty_binds_looser_than_access() {
    assert_eq!(
        parse_expression("empty a.b").unwrap(),
        Expr::unary(UnaryOp::Empty, Expr::access(var("a"), key("b")))
    );
}

#[test]
fn test_empty_binds_tighter_than_binary() {
    // empty a == false → (empty a) == false
    assert_eq!(
        parse_expression("empty a == false").unwrap(),
        Expr::binary(
            BinOp::Equal,
            Expr::unary(UnaryOp::Empty, var("a")),
            Expr::Literal(Value::Boolean(false)),
        )
    );
}

#[test]
fn test_stacked_prefix_operators() {
    assert_eq!(
        parse_expression("not empty -x").unwrap(),
        Expr::unary(
            UnaryOp::Not,
            Expr::unary(UnaryOp::Empty, Expr::unary(UnaryOp::Negate, var("x")))
        )
    );
}

#[test]
fn test_negation_in_arithmetic() {
    assert_eq!(
        parse_expression("-2 * 3").unwrap(),
        Expr::binary(BinOp::Multiply, Expr::unary(UnaryOp::Negate, int(2)), int(3))
    );
}

#[test]
fn test_ternary_is_right_associative() {
    let expected = Expr::Conditional {
        condition: Box::new(var("a")),
        then_branch: Box::new(int(1)),
        else_branch: Box::new(Expr::Conditional {
            condition: Box::new(var("b")),
            then_branch: Box::new(int(2)),
            else_branch: Box::new(int(3)),
        }),
    };
    assert_eq!(parse_expression("a ? 1 : b ? 2 : 3").unwrap(), expected);
}

#[test]
fn test_ternary_is_lowest() {
    match parse_expression("x > 1 || y ? 'big' : 'small'").unwrap() {
        Expr::Conditional { condition, .. } => {
            assert!(matches!(*condition, Expr::BinaryOp { op: BinOp::Or, .. }));
        }
        other => panic!("Expected conditional, got {:?}", other),
    }
}

// ============================================================================
// Syntax errors
// ============================================================================

#[test]
fn test_double_dot_in_template() {
    let err = parse_template("${a..b}").unwrap_err();
    assert_eq!(err.position(), 4);
    assert!(matches!(err, ParseError::UnexpectedToken { .. }));
}

#[test]
fn test_double_dot_raw() {
    let err = parse_expression("a..b").unwrap_err();
    assert_eq!(err.position(), 2);
}

#[rstest]
#[case("(a + b", 6)]
#[case("a[1", 3)]
#[case("a +", 3)]
#[case("a ? b", 5)]
fn test_unexpected_end(#[case] input: &str, #[case] position: usize) {
    let err = parse_expression(input).unwrap_err();
    assert_eq!(err, ParseError::UnexpectedEof { position }, "Failed for input: {}", input);
}

#[rstest]
#[case("a b", 2)]
#[case("a + )", 4)]
#[case("a.1", 1)]
#[case("a]", 1)]
#[case("* a", 0)]
fn test_unexpected_token(#[case] input: &str, #[case] position: usize) {
    let err = parse_expression(input).unwrap_err();
    assert!(
        matches!(err, ParseError::UnexpectedToken { .. }),
        "Expected unexpected-token error for {}, got {:?}",
        input,
        err
    );
    assert_eq!(err.position(), position, "Failed for input: {}", input);
}

#[test]
fn test_lex_error_surfaces_with_template_offset() {
    let err = parse_template("x ${'open}").unwrap_err();
    assert!(matches!(err, ParseError::UnterminatedExpression { .. } | ParseError::Lex(_)));

    let err = parse_template("ab${a # b}").unwrap_err();
    assert!(matches!(err, ParseError::Lex(_)));
    assert_eq!(err.position(), 6);
}

#[test]
fn test_error_message_mentions_position() {
    let err = parse_expression("a..b").unwrap_err();
    let message = err.to_string();
    assert!(message.contains("position 2"), "{}", message);
}

// ============================================================================
// Templates
// ============================================================================

#[test]
fn test_composite_template() {
    let template = parse_template("Hello ${user.name}, you have ${count} items").unwrap();
    assert_eq!(
        template,
        Template::Composite(vec![
            TemplatePart::Text("Hello ".into()),
            TemplatePart::Expression(Expr::access(var("user"), key("name"))),
            TemplatePart::Text(", you have ".into()),
            TemplatePart::Expression(var("count")),
            TemplatePart::Text(" items".into()),
        ])
    );
}

#[test]
fn test_single_expression_template() {
    assert_eq!(parse_template("${1}").unwrap(), Template::Expression(int(1)));
}

#[test]
fn test_dollar_without_brace_is_text() {
    assert_eq!(
        parse_template("costs $5").unwrap(),
        Template::Literal("costs $5".into())
    );
}

// ============================================================================
// Display
// ============================================================================

#[test]
fn test_display_round_trips_through_parser() {
    for src in [
        "a.b[c].d",
        "-x + 2 * y",
        "empty param.q ? 'none' : param.q",
        "a['with space']",
        "a['and']",
        "a['empty'].b",
        "(-a).b",
        "(not a)[0]",
        "(a + b).c",
    ] {
        let expr = parse_expression(src).unwrap();
        let reparsed = parse_expression(&expr.to_string()).unwrap();
        assert_eq!(expr, reparsed, "Failed for {}", src);
    }
}

#[test]
fn test_display_keeps_keyword_keys_bracketed() {
    let expr = parse_expression("a['and']").unwrap();
    assert_eq!(expr.to_string(), r#"a["and"]"#);
    assert_eq!(parse_expression("a.android").unwrap().to_string(), "a.android");
}

#[test]
fn test_display_parenthesizes_prefix_operand_of_access() {
    let grouped = parse_expression("(-a).b").unwrap();
    assert_eq!(grouped.to_string(), "(-a).b");
    assert_eq!(parse_expression("-a.b").unwrap().to_string(), "-a.b");
    assert!(grouped != parse_expression("-a.b").unwrap());
}
