use std::rc::Rc;

use pest::error::{Error, ErrorVariant};
use pest::iterators::{Pair, Pairs};
use pest::{Parser, Span};
use pest_derive::Parser;

use super::ast::*;
use crate::runner::ds::error::JErrorType;
use crate::runner::ds::value::format_number;

#[derive(Parser)]
#[grammar = "parser/script_grammar.pest"] // relative to src
pub struct ScriptParser;

const TAB_WIDTH: usize = 2;

type BuildResult<T> = Result<T, Error<Rule>>;

impl ScriptParser {
    pub fn parse_to_ast_from_str(script: &str) -> Result<ProgramData, JErrorType> {
        parse_to_ast(script).map_err(|e| JErrorType::SyntaxError(e.to_string()))
    }
}

/// Renders the raw pest token tree, one rule per line, indented by depth.
pub fn parse_to_token_tree(script: &str) -> Result<String, JErrorType> {
    let pairs = ScriptParser::parse(Rule::script, script)
        .map_err(|e| JErrorType::SyntaxError(e.to_string()))?;
    let mut tree = vec![];
    for pair in pairs {
        tree.push(pair_to_string(pair, 0).join("\n"));
    }
    Ok(tree.join("\n"))
}

fn pair_to_string(pair: Pair<Rule>, level: usize) -> Vec<String> {
    let mut tree = vec![];
    let span = pair.as_span();
    let rule_name = format!(
        "{:?} => ({},{}) #{:?}",
        pair.as_rule(),
        span.start(),
        span.end(),
        span.as_str()
    );
    tree.push(format!("{}{}", " ".repeat(level * TAB_WIDTH), rule_name));
    for child_pair in pair.into_inner() {
        tree.append(pair_to_string(child_pair, level + 1).as_mut());
    }
    tree
}

pub fn parse_to_ast(script: &str) -> BuildResult<ProgramData> {
    let mut pairs = ScriptParser::parse(Rule::script, script)?;
    match pairs.next() {
        Some(script_pair) => Ok(ProgramData {
            body: build_statement_list(script_pair.into_inner())?,
        }),
        None => Ok(ProgramData { body: vec![] }),
    }
}

fn get_unexpected_error(pair: &Pair<Rule>) -> Error<Rule> {
    Error::new_from_span(
        ErrorVariant::CustomError {
            message: format!("Unexpected {:?}", pair.as_rule()),
        },
        pair.as_span(),
    )
}

fn expect_pair<'i>(next: Option<Pair<'i, Rule>>, span: Span<'i>) -> BuildResult<Pair<'i, Rule>> {
    next.ok_or_else(|| {
        Error::new_from_span(
            ErrorVariant::CustomError {
                message: "Incomplete syntax".to_string(),
            },
            span,
        )
    })
}

fn first_inner(pair: Pair<Rule>) -> BuildResult<Pair<Rule>> {
    let span = pair.as_span();
    expect_pair(pair.into_inner().next(), span)
}

fn is_keyword(rule: Rule) -> bool {
    matches!(
        rule,
        Rule::kw_function
            | Rule::kw_var
            | Rule::kw_let
            | Rule::kw_const
            | Rule::kw_return
            | Rule::kw_if
            | Rule::kw_else
            | Rule::kw_new
            | Rule::kw_this
            | Rule::kw_typeof
            | Rule::kw_instanceof
    )
}

/// Children of `pair` without the keyword tokens.
fn significant(pair: Pair<Rule>) -> impl Iterator<Item = Pair<Rule>> {
    pair.into_inner().filter(|p| !is_keyword(p.as_rule()))
}

fn meta_of(pair: &Pair<Rule>) -> Meta {
    let span = pair.as_span();
    Meta {
        start_index: span.start(),
        end_index: span.end(),
    }
}

fn build_statement_list(pairs: Pairs<Rule>) -> BuildResult<Vec<StatementType>> {
    let mut s = vec![];
    for pair in pairs {
        match pair.as_rule() {
            Rule::statement => s.push(build_statement(pair)?),
            Rule::EOI => {}
            _ => return Err(get_unexpected_error(&pair)),
        }
    }
    Ok(s)
}

fn build_statement(pair: Pair<Rule>) -> BuildResult<StatementType> {
    let inner = first_inner(pair)?;
    let meta = meta_of(&inner);
    let span = inner.as_span();
    match inner.as_rule() {
        Rule::function_declaration => Ok(StatementType::FunctionDeclaration(Rc::new(
            build_function(inner)?,
        ))),
        Rule::variable_declaration => build_variable_declaration(inner),
        Rule::return_statement => {
            let argument = match significant(inner).next() {
                Some(p) => Some(build_expression(p)?),
                None => None,
            };
            Ok(StatementType::ReturnStatement { meta, argument })
        }
        Rule::if_statement => {
            let mut parts = significant(inner);
            let test = build_expression(expect_pair(parts.next(), span)?)?;
            let consequent = Box::new(build_statement(expect_pair(parts.next(), span)?)?);
            let alternate = match parts.next() {
                Some(p) => Some(Box::new(build_statement(p)?)),
                None => None,
            };
            Ok(StatementType::IfStatement {
                meta,
                test,
                consequent,
                alternate,
            })
        }
        Rule::block_statement => Ok(StatementType::BlockStatement {
            meta,
            body: build_statement_list(inner.into_inner())?,
        }),
        Rule::empty_statement => Ok(StatementType::EmptyStatement { meta }),
        Rule::expression_statement => Ok(StatementType::ExpressionStatement {
            meta,
            expression: build_expression(first_inner(inner)?)?,
        }),
        _ => Err(get_unexpected_error(&inner)),
    }
}

fn build_variable_declaration(pair: Pair<Rule>) -> BuildResult<StatementType> {
    let meta = meta_of(&pair);
    let span = pair.as_span();
    let mut parts = significant(pair);
    let kind_pair = first_inner(expect_pair(parts.next(), span)?)?;
    let kind = match kind_pair.as_rule() {
        Rule::kw_var => VariableDeclarationKind::Var,
        Rule::kw_let => VariableDeclarationKind::Let,
        Rule::kw_const => VariableDeclarationKind::Const,
        _ => return Err(get_unexpected_error(&kind_pair)),
    };
    let mut declarations = vec![];
    for declarator in parts {
        let declarator_span = declarator.as_span();
        let mut inner = declarator.into_inner();
        let name = expect_pair(inner.next(), declarator_span)?.as_str().to_string();
        let init = match inner.next() {
            Some(p) => Some(build_expression(p)?),
            None => None,
        };
        if init.is_none() && kind == VariableDeclarationKind::Const {
            return Err(Error::new_from_span(
                ErrorVariant::CustomError {
                    message: "Missing initializer in const declaration".to_string(),
                },
                declarator_span,
            ));
        }
        declarations.push(VariableDeclaratorData { name, init });
    }
    Ok(StatementType::VariableDeclaration {
        meta,
        kind,
        declarations,
    })
}

fn build_params(pair: Pair<Rule>) -> Vec<String> {
    pair.into_inner().map(|p| p.as_str().to_string()).collect()
}

/// Handles `function_declaration`, `function_expression` and `method_property`.
fn build_function(pair: Pair<Rule>) -> BuildResult<FunctionData> {
    let meta = meta_of(&pair);
    let span = pair.as_span();
    let mut name = None;
    let mut params = vec![];
    let mut body = None;
    for p in significant(pair) {
        match p.as_rule() {
            Rule::identifier => name = Some(p.as_str().to_string()),
            Rule::property_key => name = Some(build_property_key(p)?),
            Rule::formal_parameters => params = build_params(p),
            Rule::function_body => {
                body = Some(FunctionBodyData::Block(build_statement_list(
                    p.into_inner(),
                )?))
            }
            _ => return Err(get_unexpected_error(&p)),
        }
    }
    let body = expect_body(body, span)?;
    Ok(FunctionData {
        meta,
        name,
        params,
        body,
        is_arrow: false,
    })
}

fn expect_body(body: Option<FunctionBodyData>, span: Span) -> BuildResult<FunctionBodyData> {
    body.ok_or_else(|| {
        Error::new_from_span(
            ErrorVariant::CustomError {
                message: "Missing function body".to_string(),
            },
            span,
        )
    })
}

fn build_arrow_function(pair: Pair<Rule>) -> BuildResult<FunctionData> {
    let meta = meta_of(&pair);
    let span = pair.as_span();
    let mut inner = pair.into_inner();
    let params_pair = first_inner(expect_pair(inner.next(), span)?)?;
    let params = match params_pair.as_rule() {
        Rule::identifier => vec![params_pair.as_str().to_string()],
        Rule::formal_parameters => build_params(params_pair),
        _ => return Err(get_unexpected_error(&params_pair)),
    };
    let body_pair = expect_pair(inner.next(), span)?;
    let body = match body_pair.as_rule() {
        Rule::function_body => FunctionBodyData::Block(build_statement_list(body_pair.into_inner())?),
        _ => FunctionBodyData::Expression(Box::new(build_expression(body_pair)?)),
    };
    Ok(FunctionData {
        meta,
        name: None,
        params,
        body,
        is_arrow: true,
    })
}

fn build_expression(pair: Pair<Rule>) -> BuildResult<ExpressionType> {
    match pair.as_rule() {
        Rule::expression | Rule::primary_expression | Rule::parenthesized => {
            build_expression(first_inner(pair)?)
        }
        Rule::arrow_function => Ok(ExpressionType::FunctionExpression(Rc::new(
            build_arrow_function(pair)?,
        ))),
        Rule::assignment => build_assignment(pair),
        Rule::conditional_expression => build_conditional(pair),
        Rule::logical_or
        | Rule::logical_and
        | Rule::equality
        | Rule::relational
        | Rule::additive
        | Rule::multiplicative => build_binary_chain(pair),
        Rule::unary => build_unary(pair),
        Rule::postfix_expression => build_postfix(pair),
        Rule::new_expression => build_new(pair),
        Rule::function_expression => Ok(ExpressionType::FunctionExpression(Rc::new(
            build_function(pair)?,
        ))),
        Rule::object_literal => build_object(pair),
        Rule::array_literal => Ok(ExpressionType::ArrayExpression(
            pair.into_inner()
                .map(build_expression)
                .collect::<BuildResult<Vec<ExpressionType>>>()?,
        )),
        Rule::template_literal => build_template(pair),
        Rule::literal => Ok(ExpressionType::Literal(build_literal(first_inner(pair)?)?)),
        Rule::this_expression => Ok(ExpressionType::ThisExpression),
        Rule::identifier => Ok(ExpressionType::Identifier(pair.as_str().to_string())),
        _ => Err(get_unexpected_error(&pair)),
    }
}

fn build_assignment(pair: Pair<Rule>) -> BuildResult<ExpressionType> {
    let span = pair.as_span();
    let mut inner = pair.into_inner();
    let target_pair = expect_pair(inner.next(), span)?;
    let target_span = target_pair.as_span();
    let left = build_expression(target_pair)?;
    match left {
        ExpressionType::Identifier(_) | ExpressionType::MemberExpression(_) => {}
        _ => {
            return Err(Error::new_from_span(
                ErrorVariant::CustomError {
                    message: "Invalid left-hand side in assignment".to_string(),
                },
                target_span,
            ))
        }
    }
    let operator = match expect_pair(inner.next(), span)?.as_str() {
        "+=" => AssignmentOperator::AddEquals,
        "-=" => AssignmentOperator::SubtractEquals,
        _ => AssignmentOperator::Equals,
    };
    let right = build_expression(expect_pair(inner.next(), span)?)?;
    Ok(ExpressionType::AssignmentExpression {
        operator,
        left: Box::new(left),
        right: Box::new(right),
    })
}

fn build_conditional(pair: Pair<Rule>) -> BuildResult<ExpressionType> {
    let span = pair.as_span();
    let mut inner = pair.into_inner();
    let test = build_expression(expect_pair(inner.next(), span)?)?;
    match inner.next() {
        None => Ok(test),
        Some(consequent) => {
            let consequent = build_expression(consequent)?;
            let alternate = build_expression(expect_pair(inner.next(), span)?)?;
            Ok(ExpressionType::ConditionalExpression {
                test: Box::new(test),
                consequent: Box::new(consequent),
                alternate: Box::new(alternate),
            })
        }
    }
}

fn binary_operator(op: &Pair<Rule>) -> BuildResult<BinaryOperator> {
    Ok(match op.as_str() {
        "===" => BinaryOperator::StrictlyEqual,
        "!==" => BinaryOperator::StrictlyUnequal,
        "==" => BinaryOperator::LooselyEqual,
        "!=" => BinaryOperator::LooselyUnequal,
        "<" => BinaryOperator::LessThan,
        "<=" => BinaryOperator::LessThanEqual,
        ">" => BinaryOperator::GreaterThan,
        ">=" => BinaryOperator::GreaterThanEqual,
        "instanceof" => BinaryOperator::InstanceOf,
        "+" => BinaryOperator::Add,
        "-" => BinaryOperator::Subtract,
        "*" => BinaryOperator::Multiply,
        "/" => BinaryOperator::Divide,
        "%" => BinaryOperator::Modulo,
        _ => return Err(get_unexpected_error(op)),
    })
}

fn build_binary_chain(pair: Pair<Rule>) -> BuildResult<ExpressionType> {
    let span = pair.as_span();
    let mut inner = pair.into_inner();
    let mut left = build_expression(expect_pair(inner.next(), span)?)?;
    while let Some(op) = inner.next() {
        let right = build_expression(expect_pair(inner.next(), span)?)?;
        left = match op.as_rule() {
            Rule::or_operator => ExpressionType::LogicalExpression {
                operator: LogicalOperator::Or,
                left: Box::new(left),
                right: Box::new(right),
            },
            Rule::and_operator => ExpressionType::LogicalExpression {
                operator: LogicalOperator::And,
                left: Box::new(left),
                right: Box::new(right),
            },
            _ => ExpressionType::BinaryExpression {
                operator: binary_operator(&op)?,
                left: Box::new(left),
                right: Box::new(right),
            },
        };
    }
    Ok(left)
}

fn build_unary(pair: Pair<Rule>) -> BuildResult<ExpressionType> {
    let mut operators = vec![];
    let mut operand = None;
    for p in pair.into_inner() {
        match p.as_rule() {
            Rule::unary_operator => operators.push(match p.as_str() {
                "!" => UnaryOperator::Not,
                "-" => UnaryOperator::Minus,
                _ => UnaryOperator::TypeOf,
            }),
            _ => operand = Some(build_expression(p)?),
        }
    }
    let mut expr = match operand {
        Some(e) => e,
        None => return Ok(ExpressionType::Literal(LiteralType::NullLiteral)),
    };
    for operator in operators.into_iter().rev() {
        expr = ExpressionType::UnaryExpression {
            operator,
            argument: Box::new(expr),
        };
    }
    Ok(expr)
}

fn apply_suffix(expr: ExpressionType, suffix: Pair<Rule>) -> BuildResult<ExpressionType> {
    match suffix.as_rule() {
        Rule::arguments => Ok(ExpressionType::CallExpression {
            callee: Box::new(expr),
            arguments: build_arguments(suffix)?,
        }),
        Rule::member_dot => Ok(ExpressionType::MemberExpression(
            MemberExpressionType::SimpleMemberExpression {
                object: Box::new(expr),
                property: first_inner(suffix)?.as_str().to_string(),
            },
        )),
        Rule::member_index => Ok(ExpressionType::MemberExpression(
            MemberExpressionType::ComputedMemberExpression {
                object: Box::new(expr),
                property: Box::new(build_expression(first_inner(suffix)?)?),
            },
        )),
        _ => Err(get_unexpected_error(&suffix)),
    }
}

fn build_arguments(pair: Pair<Rule>) -> BuildResult<Vec<ExpressionType>> {
    pair.into_inner().map(build_expression).collect()
}

fn build_postfix(pair: Pair<Rule>) -> BuildResult<ExpressionType> {
    let span = pair.as_span();
    let mut inner = pair.into_inner();
    let mut expr = build_expression(expect_pair(inner.next(), span)?)?;
    for suffix in inner {
        expr = apply_suffix(expr, first_inner(suffix)?)?;
    }
    Ok(expr)
}

fn build_new(pair: Pair<Rule>) -> BuildResult<ExpressionType> {
    let span = pair.as_span();
    let mut parts = significant(pair);
    let callee_pair = expect_pair(parts.next(), span)?;
    let callee_span = callee_pair.as_span();
    let mut callee_parts = callee_pair.into_inner();
    let mut callee = build_expression(expect_pair(callee_parts.next(), callee_span)?)?;
    for suffix in callee_parts {
        callee = apply_suffix(callee, suffix)?;
    }
    let arguments = match parts.next() {
        Some(args) => build_arguments(args)?,
        None => vec![],
    };
    Ok(ExpressionType::NewExpression {
        callee: Box::new(callee),
        arguments,
    })
}

fn build_object(pair: Pair<Rule>) -> BuildResult<ExpressionType> {
    let mut properties = vec![];
    for property in pair.into_inner() {
        let inner = first_inner(property)?;
        let span = inner.as_span();
        match inner.as_rule() {
            Rule::method_property => {
                let function = build_function(inner)?;
                properties.push(PropertyData {
                    key: function.name.clone().unwrap_or_default(),
                    value: ExpressionType::FunctionExpression(Rc::new(function)),
                });
            }
            Rule::key_value_property => {
                let mut parts = inner.into_inner();
                let key = build_property_key(expect_pair(parts.next(), span)?)?;
                let value = build_expression(expect_pair(parts.next(), span)?)?;
                properties.push(PropertyData { key, value });
            }
            Rule::shorthand_property => {
                let name = inner.as_str().to_string();
                properties.push(PropertyData {
                    key: name.clone(),
                    value: ExpressionType::Identifier(name),
                });
            }
            _ => return Err(get_unexpected_error(&inner)),
        }
    }
    Ok(ExpressionType::ObjectExpression(properties))
}

fn build_property_key(pair: Pair<Rule>) -> BuildResult<String> {
    let inner = first_inner(pair)?;
    match inner.as_rule() {
        Rule::property_name => Ok(inner.as_str().to_string()),
        Rule::string_literal => Ok(unescape(first_inner(inner)?.as_str())),
        Rule::number_literal => Ok(format_number(parse_number(&inner)?)),
        _ => Err(get_unexpected_error(&inner)),
    }
}

fn build_template(pair: Pair<Rule>) -> BuildResult<ExpressionType> {
    let mut parts = vec![];
    for p in pair.into_inner() {
        match p.as_rule() {
            Rule::template_chars => parts.push(TemplatePart::Text(unescape(p.as_str()))),
            Rule::template_substitution => {
                parts.push(TemplatePart::Substitution(build_expression(first_inner(p)?)?))
            }
            _ => return Err(get_unexpected_error(&p)),
        }
    }
    Ok(ExpressionType::TemplateLiteral(parts))
}

fn parse_number(pair: &Pair<Rule>) -> BuildResult<f64> {
    pair.as_str().parse::<f64>().map_err(|e| {
        Error::new_from_span(
            ErrorVariant::CustomError {
                message: format!("Invalid number: {}", e),
            },
            pair.as_span(),
        )
    })
}

fn build_literal(pair: Pair<Rule>) -> BuildResult<LiteralType> {
    match pair.as_rule() {
        Rule::null_literal => Ok(LiteralType::NullLiteral),
        Rule::boolean_literal => Ok(LiteralType::BooleanLiteral(pair.as_str() == "true")),
        Rule::number_literal => Ok(LiteralType::NumberLiteral(parse_number(&pair)?)),
        Rule::string_literal => Ok(LiteralType::StringLiteral(unescape(
            first_inner(pair)?.as_str(),
        ))),
        _ => Err(get_unexpected_error(&pair)),
    }
}

/// Resolves backslash escapes in string and template text.
fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('0') => out.push('\0'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}
