use super::api::Rule;
use super::api::ScriptParser;

use pest::{consumes_to, parses_to};
use pest::Parser;

#[test]
fn test_number_literal_with_fraction() {
    parses_to! {
        parser: ScriptParser,
        input: "10.5",
        rule: Rule::number_literal,
        tokens: [
            number_literal(0, 4)
        ]
    };
}

#[test]
fn test_single_quoted_string() {
    parses_to! {
        parser: ScriptParser,
        input: "'abc'",
        rule: Rule::string_literal,
        tokens: [
            string_literal(0, 5, [
                single_quoted(1, 4)
            ])
        ]
    };
}

#[test]
fn test_member_dot_accepts_keyword_names() {
    parses_to! {
        parser: ScriptParser,
        input: ".new",
        rule: Rule::member_dot,
        tokens: [
            member_dot(0, 4, [
                property_name(1, 4)
            ])
        ]
    };
}

#[test]
fn test_assign_operator_is_not_arrow_or_equality() {
    parses_to! {
        parser: ScriptParser,
        input: "+=",
        rule: Rule::assign_operator,
        tokens: [
            assign_operator(0, 2)
        ]
    };
    assert!(ScriptParser::parse(Rule::assign_operator, "=>").is_err());
    assert!(ScriptParser::parse(Rule::assign_operator, "===").is_err());
}

#[test]
fn test_identifier_rejects_keywords() {
    assert!(ScriptParser::parse(Rule::identifier, "this").is_err());
    assert!(ScriptParser::parse(Rule::identifier, "new").is_err());
    let pair = ScriptParser::parse(Rule::identifier, "thisValue")
        .unwrap()
        .next()
        .unwrap();
    assert_eq!(pair.as_str(), "thisValue");
    let pair = ScriptParser::parse(Rule::identifier, "$name_1")
        .unwrap()
        .next()
        .unwrap();
    assert_eq!(pair.as_str(), "$name_1");
}

#[test]
fn test_script_skips_comments() {
    let pairs = ScriptParser::parse(
        Rule::script,
        "// leading\nvar a = 1; /* block\n comment */ a;",
    )
    .unwrap();
    let statements = pairs
        .flat_map(|p| p.into_inner())
        .filter(|p| p.as_rule() == Rule::statement)
        .count();
    assert_eq!(statements, 2);
}
