// tests/parser_tests.rs

use chrono::{TimeZone, Utc};
use rql::{
    parse, walk_query, Argument, ConversionError, OperatorNode, ParseError, RqlError, Value,
};

fn s(text: &str) -> Argument {
    Argument::Value(Value::String(text.to_string()))
}

fn n(number: f64) -> Argument {
    Argument::Value(Value::Number(number))
}

fn call(name: &str, args: Vec<Argument>) -> OperatorNode {
    OperatorNode::with_args(name, args)
}

fn op(name: &str, args: Vec<Argument>) -> Argument {
    Argument::Operator(call(name, args))
}

// ============================================================================
// Simple calls
// ============================================================================

#[test]
fn test_single_call() {
    let node = parse("eq(foo,bar)").unwrap();
    assert_eq!(node, call("eq", vec![s("foo"), s("bar")]));
}

#[test]
fn test_call_without_arguments() {
    let node = parse("distinct()").unwrap();
    assert_eq!(node, call("distinct", vec![]));
}

#[test]
fn test_number_argument() {
    let node = parse("limit(10,20)").unwrap();
    assert_eq!(node, call("limit", vec![n(10.0), n(20.0)]));
}

#[test]
fn test_whitespace_around_arguments() {
    let node = parse("eq( foo , bar )").unwrap();
    assert_eq!(node, call("eq", vec![s("foo"), s("bar")]));
}

#[test]
fn test_walk_query_skips_normalization() {
    let node = walk_query("eq(foo,bar)").unwrap();
    assert_eq!(node, call("eq", vec![s("foo"), s("bar")]));
}

// ============================================================================
// Aggregates and precedence
// ============================================================================

#[test]
fn test_and_joiner() {
    let node = parse("eq(foo,bar)&limit(10)").unwrap();
    assert_eq!(
        node,
        call(
            "and",
            vec![op("eq", vec![s("foo"), s("bar")]), op("limit", vec![n(10.0)])]
        )
    );
}

#[test]
fn test_comma_is_and() {
    let node = parse("eq(a,1),eq(b,2),eq(c,3)").unwrap();
    assert_eq!(node.name, "and");
    assert_eq!(node.args.len(), 3);
    assert!(node.args.iter().all(|arg| arg.as_operator().is_some_and(|o| o.name == "eq")));
}

#[test]
fn test_pipes_only_build_flat_or() {
    let node = parse("eq(a,1)|eq(b,2)|eq(c,3)").unwrap();
    assert_eq!(node.name, "or");
    assert_eq!(node.args.len(), 3);
}

#[test]
fn test_or_first_nests_and_run() {
    let node = parse("eq(foo,bar)|eq(fizz,buzz)&limit(10)").unwrap();
    assert_eq!(
        node,
        call(
            "or",
            vec![
                op("eq", vec![s("foo"), s("bar")]),
                op(
                    "and",
                    vec![op("eq", vec![s("fizz"), s("buzz")]), op("limit", vec![n(10.0)])]
                ),
            ]
        )
    );
}

#[test]
fn test_and_first_nests_or_run() {
    let node = parse("a(1)&b(2)|c(3)").unwrap();
    assert_eq!(
        node,
        call(
            "and",
            vec![
                op("a", vec![n(1.0)]),
                op("or", vec![op("b", vec![n(2.0)]), op("c", vec![n(3.0)])]),
            ]
        )
    );
}

#[test]
fn test_first_joiner_owns_the_level() {
    let node = parse("a(1)|b(2)&c(3)&d(4)").unwrap();
    assert_eq!(node.name, "or");
    assert_eq!(node.args.len(), 2);

    let nested = node.args[1].as_operator().unwrap();
    assert_eq!(nested.name, "and");
    assert_eq!(nested.args.len(), 3);
}

#[test]
fn test_explicit_aggregate_call() {
    let node = parse("and(eq(a,1),lt(b,2))").unwrap();
    assert_eq!(
        node,
        call(
            "and",
            vec![op("eq", vec![s("a"), n(1.0)]), op("lt", vec![s("b"), n(2.0)])]
        )
    );
}

// ============================================================================
// Arrays and nested calls
// ============================================================================

#[test]
fn test_array_argument() {
    let node = parse("in(foo,(bar,foo,moo))").unwrap();
    assert_eq!(
        node,
        call(
            "in",
            vec![s("foo"), Argument::Array(vec![s("bar"), s("foo"), s("moo")])]
        )
    );
}

#[test]
fn test_nested_arrays() {
    let node = parse("in(x,((1,2),(3)))").unwrap();
    assert_eq!(
        node.args[1],
        Argument::Array(vec![
            Argument::Array(vec![n(1.0), n(2.0)]),
            Argument::Array(vec![n(3.0)]),
        ])
    );
}

#[test]
fn test_empty_array() {
    let node = parse("in(x,())").unwrap();
    assert_eq!(node.args[1], Argument::Array(vec![]));
}

#[test]
fn test_call_inside_array() {
    let node = parse("or((eq(a,1),eq(b,2)))").unwrap();
    assert_eq!(
        node.args[0],
        Argument::Array(vec![op("eq", vec![s("a"), n(1.0)]), op("eq", vec![s("b"), n(2.0)])])
    );
}

#[test]
fn test_deeply_nested_calls() {
    let node = parse("not(and(eq(a,1),not(eq(b,2))))").unwrap();
    let and = node.args[0].as_operator().unwrap();
    let inner_not = and.args[1].as_operator().unwrap();
    assert_eq!(inner_not.name, "not");
    assert_eq!(inner_not.args[0], op("eq", vec![s("b"), n(2.0)]));
}

// ============================================================================
// Infix shorthand
// ============================================================================

#[test]
fn test_infix_comparisons() {
    let node = parse("foo=bar&price>10").unwrap();
    assert_eq!(
        node,
        call(
            "and",
            vec![op("eq", vec![s("foo"), s("bar")]), op("gt", vec![s("price"), n(10.0)])]
        )
    );
}

#[test]
fn test_infix_inside_call() {
    let node = parse("or(foo=1,bar<=2)").unwrap();
    assert_eq!(
        node,
        call(
            "or",
            vec![op("eq", vec![s("foo"), n(1.0)]), op("le", vec![s("bar"), n(2.0)])]
        )
    );
}

#[test]
fn test_percent_encoded_angle_brackets() {
    let node = parse("price%3C=10").unwrap();
    assert_eq!(node, call("le", vec![s("price"), n(10.0)]));
}

// ============================================================================
// Leaves
// ============================================================================

#[test]
fn test_literal_table() {
    let node = parse("f(true,false,null,undefined,Infinity,-Infinity)").unwrap();
    assert_eq!(
        node.args,
        vec![
            Argument::Value(Value::Boolean(true)),
            Argument::Value(Value::Boolean(false)),
            Argument::Value(Value::Null),
            Argument::Value(Value::Undefined),
            n(f64::INFINITY),
            n(f64::NEG_INFINITY),
        ]
    );
}

#[test]
fn test_tagged_string_keeps_digits() {
    let node = parse("eq(code,string:10)").unwrap();
    assert_eq!(node.args[1], s("10"));
}

#[test]
fn test_tagged_date() {
    let node = parse("gt(created,date:2020-01-02T03:04:05Z)").unwrap();
    let expected = Utc.with_ymd_and_hms(2020, 1, 2, 3, 4, 5).unwrap();
    assert_eq!(node.args[1], Argument::Value(Value::Date(expected)));
}

#[test]
fn test_quoted_argument_keeps_comma() {
    let node = parse("eq(name,'a,b')").unwrap();
    assert_eq!(node.args[1], s("a,b"));
}

#[test]
fn test_quotes_do_not_force_string_type() {
    let node = parse("eq(a,'10')").unwrap();
    assert_eq!(node.args[1], n(10.0));
}

#[test]
fn test_percent_encoded_parens() {
    let node = parse("eq(foo,%28x%29)").unwrap();
    assert_eq!(node.args[1], s("(x)"));
}

#[test]
fn test_percent_encoded_single_quotes_read_as_json_string() {
    let node = parse("eq(a,%27hi%5Cnthere%27)").unwrap();
    assert_eq!(node.args[1], s("hi\nthere"));
}

#[test]
fn test_escaped_comma() {
    let node = parse(r"eq(a,x\,y)").unwrap();
    assert_eq!(node.args[1], s("x,y"));
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn test_empty_query() {
    assert_eq!(parse(""), Err(RqlError::Parse(ParseError::EmptyQuery)));
}

#[test]
fn test_leading_question_mark() {
    assert_eq!(
        parse("?eq(foo,3)"),
        Err(RqlError::Parse(ParseError::LeadingQuestionMark))
    );
}

#[test]
fn test_illegal_operator() {
    assert_eq!(
        parse("foo>==bar"),
        Err(RqlError::Parse(ParseError::IllegalOperator(">==".to_string())))
    );
}

#[test]
fn test_unclosed_paren() {
    assert!(matches!(
        parse("eq(a,b"),
        Err(RqlError::Parse(ParseError::UnclosedParen(_)))
    ));
}

#[test]
fn test_unclosed_nested_array() {
    assert!(matches!(
        parse("in(a,(b,c)"),
        Err(RqlError::Parse(ParseError::UnclosedParen(_)))
    ));
}

#[test]
fn test_unknown_converter() {
    assert_eq!(
        parse("eq(a,foo:bar)"),
        Err(RqlError::Parse(ParseError::UnknownConverter("foo".to_string())))
    );
}

#[test]
fn test_bad_number_is_conversion_error() {
    assert_eq!(
        parse("eq(a,number:abc)"),
        Err(RqlError::Conversion(ConversionError::InvalidNumber("abc".to_string())))
    );
}

#[test]
fn test_bad_regex_is_conversion_error() {
    let err = parse("match(a,re:%28abc)").unwrap_err();
    assert!(err.is_conversion());
    assert!(matches!(
        err,
        RqlError::Conversion(ConversionError::InvalidRegex { ref pattern, .. }) if pattern == "(abc"
    ));
}
