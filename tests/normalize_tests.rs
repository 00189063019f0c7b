// tests/normalize_tests.rs

use rql::{normalize_syntax, ParseError};

fn normalize(text: &str) -> String {
    normalize_syntax(text).unwrap()
}

// ============================================================================
// Shorthand comparisons
// ============================================================================

#[test]
fn test_greater_equal() {
    assert_eq!(normalize("foo>=bar"), "ge(foo,bar)");
}

#[test]
fn test_joined_comparisons() {
    assert_eq!(normalize("a<b&c>d|e=f"), "lt(a,b)&gt(c,d)|eq(e,f)");
}

#[test]
fn test_comparisons_inside_calls() {
    assert_eq!(normalize("and(a=1,b!=2)"), "and(eq(a,1),ne(b,2))");
}

#[test]
fn test_values_keep_tags_and_encoding() {
    assert_eq!(
        normalize("created>date:2020-01-01"),
        "gt(created,date:2020-01-01)"
    );
    assert_eq!(normalize("name=foo%20bar"), "eq(name,foo%20bar)");
    assert_eq!(
        normalize("at>=2020-01-01T00:00:00Z"),
        "ge(at,2020-01-01T00:00:00Z)"
    );
}

#[test]
fn test_negative_and_decimal_values() {
    assert_eq!(normalize("price>-1.5"), "gt(price,-1.5)");
}

// ============================================================================
// Percent-encoded angle brackets
// ============================================================================

#[test]
fn test_encoded_angle_brackets() {
    let cases = vec![
        ("price%3C10", "lt(price,10)"),
        ("price%3C=10", "le(price,10)"),
        ("price%3E10", "gt(price,10)"),
        ("price%3E=10", "ge(price,10)"),
    ];

    for (input, expected) in cases {
        assert_eq!(normalize(input), expected, "Failed for input: {}", input);
    }
}

// ============================================================================
// Bracketed operators and groups
// ============================================================================

#[test]
fn test_bracketed_operator_names() {
    assert_eq!(normalize("date=lt=2020"), "lt(date,2020)");
    assert_eq!(normalize("tags=contains=new"), "contains(tags,new)");
}

#[test]
fn test_group_on_either_side() {
    assert_eq!(normalize("tag=in=(a,b,c)"), "in(tag,(a,b,c))");
    assert_eq!(normalize("(a,b)=in=(x,y)"), "in((a,b),(x,y))");
}

// ============================================================================
// Passthrough and idempotence
// ============================================================================

#[test]
fn test_prefix_syntax_passes_through() {
    let queries = vec![
        "eq(foo,bar)",
        "and(eq(a,1),or(lt(b,2),gt(c,3)))",
        "in(tag,(new,sale))&limit(10)",
        "sort(+price,-name)",
        "",
    ];

    for query in queries {
        assert_eq!(normalize(query), query, "Failed for input: {}", query);
    }
}

#[test]
fn test_normalizing_twice_changes_nothing() {
    let queries = vec!["a=1&b>2", "x=in=(1,2)|y<=3", "price%3C=10"];

    for query in queries {
        let once = normalize(query);
        assert_eq!(normalize(&once), once, "Failed for input: {}", query);
    }
}

// ============================================================================
// Illegal operators
// ============================================================================

#[test]
fn test_chained_comparison_fails() {
    assert_eq!(
        normalize_syntax("foo>==bar"),
        Err(ParseError::IllegalOperator(">==".to_string()))
    );
}

#[test]
fn test_prefixed_bracket_form_fails() {
    assert_eq!(
        normalize_syntax("foo!=x=bar"),
        Err(ParseError::IllegalOperator("!=x=".to_string()))
    );
    assert!(normalize_syntax("a<=b=c").is_err());
}
