//! Attribute query language used by the node and edge filters.
//!
//! Queries are boolean expressions over the attributes of a single record,
//! close to the dataframe query syntax the dashboard has always accepted:
//!
//! ```text
//! kind == 'org' and weight >= 2.5
//! not (team in ['core', 'infra']) | `first name`.str.contains('an')
//! 0 < score < 10
//! ```
//!
//! Supported: literals (numbers, quoted strings, `True`/`False`, `None`),
//! attribute names (back-quote names containing spaces), list literals,
//! arithmetic `+ - * /`, comparisons (chainable) `== != < <= > >=`,
//! membership `in` / `not in`, `.str.contains/startswith/endswith(...)`, and
//! the connectives `and`/`&`, `or`/`|`, `not`/`~`. Nothing is ever evaluated
//! as host code.

use crate::error::{JaalError, Result};
use crate::model::{AttrValue, Record};
use nom::IResult;
use nom::Parser;
use nom::branch::alt;
use nom::bytes::complete::{escaped_transform, is_not, tag, take_while};
use nom::character::complete::{char as pchar, digit1, multispace0, one_of, satisfy};
use nom::combinator::{cut, map, map_res, not, opt, recognize, value, verify};
use nom::error::{ContextError, ErrorKind, FromExternalError, ParseError, context};
use nom::multi::{many0, separated_list0};
use nom::sequence::{delimited, pair, preceded, terminated, tuple};
use std::cmp::Ordering;
use std::str::FromStr;

/// Parentheses, lists, prefix operators and `.str` calls each open one level.
pub const MAX_NESTING: usize = 64;

const RESERVED: [&str; 9] = [
    "and", "or", "not", "in", "True", "true", "False", "false", "None",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    In,
    NotIn,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ArithOp {
    Add,
    Sub,
    Mul,
    Div,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StrMethod {
    Contains,
    StartsWith,
    EndsWith,
}

/// Operator chains are kept flat so a long `a or b or ...` stays shallow.
#[derive(Debug, Clone, PartialEq)]
enum Expr {
    Literal(AttrValue),
    Attribute(String),
    List(Vec<Expr>),
    Not(Box<Expr>),
    Neg(Box<Expr>),
    And(Vec<Expr>),
    Or(Vec<Expr>),
    Arith(Box<Expr>, Vec<(ArithOp, Expr)>),
    Compare(Box<Expr>, Vec<(CompareOp, Expr)>),
    Str(StrMethod, Box<Expr>, Box<Expr>),
}

// =============================================================================
// Parsing
// =============================================================================

/// Parser error: the unparsed input where it stopped, plus an optional
/// message attached with `context`.
#[derive(Debug, Clone, PartialEq)]
struct SyntaxError<'a> {
    input: &'a str,
    message: Option<&'static str>,
}

impl<'a> ParseError<&'a str> for SyntaxError<'a> {
    fn from_error_kind(input: &'a str, _kind: ErrorKind) -> Self {
        Self {
            input,
            message: None,
        }
    }

    fn append(_input: &'a str, _kind: ErrorKind, other: Self) -> Self {
        other
    }

    // report the alternative that got furthest
    fn or(self, other: Self) -> Self {
        if other.input.len() <= self.input.len() {
            other
        } else {
            self
        }
    }
}

impl<'a> ContextError<&'a str> for SyntaxError<'a> {
    fn add_context(_input: &'a str, ctx: &'static str, mut other: Self) -> Self {
        other.message.get_or_insert(ctx);
        other
    }
}

impl<'a, E> FromExternalError<&'a str, E> for SyntaxError<'a> {
    fn from_external_error(input: &'a str, _kind: ErrorKind, _e: E) -> Self {
        Self {
            input,
            message: Some("invalid number"),
        }
    }
}

impl SyntaxError<'_> {
    fn into_query_error(self, source: &str) -> JaalError {
        let message = match (self.message, self.input.chars().next()) {
            (Some(message), _) => message.to_string(),
            (None, Some(c)) => format!("unexpected '{}'", c),
            (None, None) => "unexpected end of query".to_string(),
        };
        parse_error(source.len() - self.input.len(), message)
    }
}

type PResult<'a, O> = IResult<&'a str, O, SyntaxError<'a>>;

fn parse_error(position: usize, message: impl Into<String>) -> JaalError {
    JaalError::QueryParse {
        position,
        message: message.into(),
    }
}

fn ws<'a, O, F>(inner: F) -> impl FnMut(&'a str) -> PResult<'a, O>
where
    F: Parser<&'a str, O, SyntaxError<'a>>,
{
    preceded(multispace0, inner)
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

fn is_ident_continue(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn keyword<'a>(word: &'static str) -> impl FnMut(&'a str) -> PResult<'a, &'a str> {
    terminated(tag(word), not(satisfy(is_ident_continue)))
}

/// Opens one nesting level, failing hard once `MAX_NESTING` is reached.
fn nested(input: &str, depth: usize) -> PResult<'_, usize> {
    if depth >= MAX_NESTING {
        return Err(nom::Err::Failure(SyntaxError {
            input,
            message: Some("expression nested too deeply"),
        }));
    }
    Ok((input, depth + 1))
}

fn identifier(input: &str) -> PResult<'_, String> {
    let bare = verify(
        recognize(pair(satisfy(is_ident_start), take_while(is_ident_continue))),
        |word: &str| !RESERVED.contains(&word),
    );
    let backquoted = preceded(
        pchar('`'),
        cut(terminated(
            context("expected a name inside back-quotes", is_not("`")),
            context("unterminated back-quoted name", pchar('`')),
        )),
    );
    map(alt((bare, backquoted)), |name: &str| name.to_string())(input)
}

fn quoted<'a>(quote: char) -> impl FnMut(&'a str) -> PResult<'a, String> {
    let forbidden = if quote == '\'' { "\\'" } else { "\\\"" };
    let body = escaped_transform(
        is_not(forbidden),
        '\\',
        alt((
            value("\n", pchar('n')),
            value("\t", pchar('t')),
            value("\\", pchar('\\')),
            value("'", pchar('\'')),
            value("\"", pchar('"')),
        )),
    );
    preceded(
        pchar(quote),
        cut(terminated(
            map(opt(body), Option::unwrap_or_default),
            context("unterminated string literal", pchar(quote)),
        )),
    )
}

fn digits(input: &str) -> PResult<'_, &str> {
    recognize(pair(
        digit1,
        take_while(|c: char| c.is_ascii_digit() || c == '_'),
    ))(input)
}

fn number(input: &str) -> PResult<'_, f64> {
    let mantissa = alt((
        recognize(pair(digits, opt(pair(pchar('.'), opt(digits))))),
        recognize(pair(pchar('.'), digits)),
    ));
    let exponent = tuple((one_of("eE"), opt(one_of("+-")), digit1));
    map_res(recognize(pair(mantissa, opt(exponent))), |text: &str| {
        text.replace('_', "").parse::<f64>()
    })(input)
}

fn constant(input: &str) -> PResult<'_, AttrValue> {
    alt((
        value(AttrValue::Bool(true), alt((keyword("True"), keyword("true")))),
        value(AttrValue::Bool(false), alt((keyword("False"), keyword("false")))),
        value(AttrValue::Null, keyword("None")),
    ))(input)
}

/// Comma separated expressions, trailing comma allowed.
fn items<'a>(input: &'a str, depth: usize) -> PResult<'a, Vec<Expr>> {
    terminated(
        separated_list0(ws(pchar(',')), move |i: &'a str| disjunction(i, depth)),
        opt(ws(pchar(','))),
    )(input)
}

fn list<'a>(input: &'a str, depth: usize) -> PResult<'a, Expr> {
    let (input, _) = pchar('[')(input)?;
    let (input, depth) = nested(input, depth)?;
    let (input, elements) = items(input, depth)?;
    let (input, _) = cut(context("expected ']'", ws(pchar(']'))))(input)?;
    Ok((input, Expr::List(elements)))
}

/// A parenthesised expression, or a tuple when a comma follows the first
/// element.
fn group<'a>(input: &'a str, depth: usize) -> PResult<'a, Expr> {
    let (input, _) = pchar('(')(input)?;
    let (input, depth) = nested(input, depth)?;
    let (input, first) = cut(move |i: &'a str| disjunction(i, depth))(input)?;
    let (input, tail) = opt(preceded(ws(pchar(',')), move |i: &'a str| items(i, depth)))(input)?;
    let (input, _) = cut(context("expected ')'", ws(pchar(')'))))(input)?;

    let expr = match tail {
        None => first,
        Some(rest) => {
            let mut elements = vec![first];
            elements.extend(rest);
            Expr::List(elements)
        }
    };
    Ok((input, expr))
}

fn primary<'a>(input: &'a str, depth: usize) -> PResult<'a, Expr> {
    ws(alt((
        move |i: &'a str| group(i, depth),
        move |i: &'a str| list(i, depth),
        map(quoted('\''), |s| Expr::Literal(AttrValue::Text(s))),
        map(quoted('"'), |s| Expr::Literal(AttrValue::Text(s))),
        map(number, |n| Expr::Literal(AttrValue::Number(n))),
        map(constant, Expr::Literal),
        map(identifier, Expr::Attribute),
    )))(input)
}

/// `.str.<method>(`
fn str_call(input: &str) -> PResult<'_, StrMethod> {
    let (input, _) = ws(pchar('.'))(input)?;
    cut(delimited(
        context(
            "only the '.str' accessor is supported",
            pair(tag("str"), pchar('.')),
        ),
        context(
            "unsupported string method",
            alt((
                value(StrMethod::Contains, tag("contains")),
                value(StrMethod::StartsWith, tag("startswith")),
                value(StrMethod::EndsWith, tag("endswith")),
            )),
        ),
        context("expected '('", ws(pchar('('))),
    ))(input)
}

fn postfix<'a>(input: &'a str, depth: usize) -> PResult<'a, Expr> {
    let (mut input, mut expr) = primary(input, depth)?;
    let mut depth = depth;
    loop {
        let (rest, method) = match str_call(input) {
            Ok(parsed) => parsed,
            Err(nom::Err::Error(_)) => return Ok((input, expr)),
            Err(e) => return Err(e),
        };
        let (rest, next) = nested(rest, depth)?;
        let (rest, arg) = cut(terminated(
            move |i: &'a str| disjunction(i, next),
            context("expected ')'", ws(pchar(')'))),
        ))(rest)?;
        expr = Expr::Str(method, Box::new(expr), Box::new(arg));
        depth = next;
        input = rest;
    }
}

fn unary<'a>(input: &'a str, depth: usize) -> PResult<'a, Expr> {
    match ws(one_of("-+"))(input) {
        Ok((rest, sign)) => {
            let (rest, depth) = nested(rest, depth)?;
            let (rest, operand) = cut(move |i: &'a str| unary(i, depth))(rest)?;
            let expr = if sign == '-' {
                Expr::Neg(Box::new(operand))
            } else {
                operand
            };
            Ok((rest, expr))
        }
        Err(nom::Err::Error(_)) => postfix(input, depth),
        Err(e) => Err(e),
    }
}

fn multiplicative_op(input: &str) -> PResult<'_, ArithOp> {
    ws(alt((
        value(ArithOp::Mul, pchar('*')),
        value(ArithOp::Div, pchar('/')),
    )))(input)
}

fn additive_op(input: &str) -> PResult<'_, ArithOp> {
    ws(alt((
        value(ArithOp::Add, pchar('+')),
        value(ArithOp::Sub, pchar('-')),
    )))(input)
}

fn arith_chain<'a>(
    input: &'a str,
    depth: usize,
    operand: fn(&'a str, usize) -> PResult<'a, Expr>,
    operator: fn(&'a str) -> PResult<'a, ArithOp>,
) -> PResult<'a, Expr> {
    let (input, first) = operand(input, depth)?;
    let (input, rest) = many0(pair(operator, cut(move |i: &'a str| operand(i, depth))))(input)?;
    if rest.is_empty() {
        Ok((input, first))
    } else {
        Ok((input, Expr::Arith(Box::new(first), rest)))
    }
}

fn term<'a>(input: &'a str, depth: usize) -> PResult<'a, Expr> {
    arith_chain(input, depth, unary, multiplicative_op)
}

fn additive<'a>(input: &'a str, depth: usize) -> PResult<'a, Expr> {
    arith_chain(input, depth, term, additive_op)
}

fn compare_op(input: &str) -> PResult<'_, CompareOp> {
    ws(alt((
        value(CompareOp::NotIn, pair(keyword("not"), ws(keyword("in")))),
        value(CompareOp::In, keyword("in")),
        value(CompareOp::Eq, tag("==")),
        value(CompareOp::Ne, tag("!=")),
        value(CompareOp::Le, tag("<=")),
        value(CompareOp::Ge, tag(">=")),
        value(CompareOp::Lt, tag("<")),
        value(CompareOp::Gt, tag(">")),
    )))(input)
}

fn comparison<'a>(input: &'a str, depth: usize) -> PResult<'a, Expr> {
    let (input, first) = additive(input, depth)?;
    let (input, rest) =
        many0(pair(compare_op, cut(move |i: &'a str| additive(i, depth))))(input)?;
    if rest.is_empty() {
        Ok((input, first))
    } else {
        Ok((input, Expr::Compare(Box::new(first), rest)))
    }
}

fn negation<'a>(input: &'a str, depth: usize) -> PResult<'a, Expr> {
    match ws(alt((keyword("not"), tag("~"))))(input) {
        Ok((rest, _)) => {
            let (rest, depth) = nested(rest, depth)?;
            let (rest, inner) = cut(move |i: &'a str| negation(i, depth))(rest)?;
            Ok((rest, Expr::Not(Box::new(inner))))
        }
        Err(nom::Err::Error(_)) => comparison(input, depth),
        Err(e) => Err(e),
    }
}

fn conjunction<'a>(input: &'a str, depth: usize) -> PResult<'a, Expr> {
    let (input, first) = negation(input, depth)?;
    let (input, rest) = many0(preceded(
        ws(alt((keyword("and"), tag("&")))),
        cut(move |i: &'a str| negation(i, depth)),
    ))(input)?;
    Ok((input, chain(first, rest, Expr::And)))
}

fn disjunction<'a>(input: &'a str, depth: usize) -> PResult<'a, Expr> {
    let (input, first) = conjunction(input, depth)?;
    let (input, rest) = many0(preceded(
        ws(alt((keyword("or"), tag("|")))),
        cut(move |i: &'a str| conjunction(i, depth)),
    ))(input)?;
    Ok((input, chain(first, rest, Expr::Or)))
}

fn chain(first: Expr, rest: Vec<Expr>, build: fn(Vec<Expr>) -> Expr) -> Expr {
    if rest.is_empty() {
        return first;
    }
    let mut terms = Vec::with_capacity(rest.len() + 1);
    terms.push(first);
    terms.extend(rest);
    build(terms)
}

fn expression(input: &str) -> PResult<'_, Expr> {
    disjunction(input, 0)
}

/// Parses a whole query; anything left over is an error at its offset.
fn parse_expr(source: &str) -> Result<Expr> {
    if source.trim().is_empty() {
        return Err(parse_error(0, "empty query"));
    }
    match terminated(expression, multispace0)(source) {
        Ok(("", expr)) => Ok(expr),
        Ok((rest, _)) => {
            let message = (rest.starts_with('=') && !rest.starts_with("=="))
                .then_some("use '==' to compare values");
            Err(SyntaxError {
                input: rest,
                message,
            }
            .into_query_error(source))
        }
        Err(nom::Err::Error(e) | nom::Err::Failure(e)) => Err(e.into_query_error(source)),
        Err(nom::Err::Incomplete(_)) => Err(parse_error(source.len(), "incomplete query")),
    }
}

// =============================================================================
// Evaluation
// =============================================================================

/// Result of evaluating a sub-expression.
#[derive(Debug, Clone, PartialEq)]
enum Operand {
    Scalar(AttrValue),
    List(Vec<AttrValue>),
}

fn eval_error(message: impl Into<String>) -> JaalError {
    JaalError::QueryEval(message.into())
}

fn scalar(operand: Operand, context: &str) -> Result<AttrValue> {
    match operand {
        Operand::Scalar(value) => Ok(value),
        Operand::List(_) => Err(eval_error(format!("a list cannot be used {}", context))),
    }
}

fn truth(value: &AttrValue, context: &str) -> Result<bool> {
    match value {
        AttrValue::Bool(b) => Ok(*b),
        other => Err(eval_error(format!(
            "expected a boolean {}, found {} '{}'",
            context,
            other.type_name(),
            other
        ))),
    }
}

fn numeric(value: &AttrValue) -> Option<f64> {
    match value {
        AttrValue::Number(n) => Some(*n),
        AttrValue::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    }
}

/// Equality as a dataframe query sees it: null never equals anything and
/// booleans compare numerically against numbers.
fn loose_eq(left: &AttrValue, right: &AttrValue) -> bool {
    match (left, right) {
        (AttrValue::Null, _) | (_, AttrValue::Null) => false,
        (AttrValue::Text(a), AttrValue::Text(b)) => a == b,
        (AttrValue::Text(_), _) | (_, AttrValue::Text(_)) => false,
        _ => match (numeric(left), numeric(right)) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        },
    }
}

fn ordering(left: &AttrValue, right: &AttrValue) -> Result<Option<Ordering>> {
    match (left, right) {
        (AttrValue::Null, _) | (_, AttrValue::Null) => Ok(None),
        (AttrValue::Text(a), AttrValue::Text(b)) => Ok(Some(a.cmp(b))),
        _ => match (numeric(left), numeric(right)) {
            (Some(a), Some(b)) => Ok(a.partial_cmp(&b)),
            _ => Err(eval_error(format!(
                "cannot order {} '{}' against {} '{}'",
                left.type_name(),
                left,
                right.type_name(),
                right
            ))),
        },
    }
}

fn contains(haystack: &Operand, needle: &AttrValue) -> Result<bool> {
    match haystack {
        Operand::List(items) => Ok(items.iter().any(|item| loose_eq(needle, item))),
        Operand::Scalar(AttrValue::Text(text)) => match needle {
            AttrValue::Text(sub) => Ok(text.contains(sub.as_str())),
            AttrValue::Null => Ok(false),
            other => Err(eval_error(format!(
                "'in <text>' requires a text operand, found {}",
                other.type_name()
            ))),
        },
        Operand::Scalar(other) => Err(eval_error(format!(
            "'in' requires a list or text on the right, found {}",
            other.type_name()
        ))),
    }
}

fn compare(op: CompareOp, left: &Operand, right: &Operand) -> Result<bool> {
    if let CompareOp::In | CompareOp::NotIn = op {
        let needle = scalar(left.clone(), "on the left of a membership test")?;
        let found = contains(right, &needle)?;
        return Ok(if op == CompareOp::In { found } else { !found });
    }

    let l = scalar(left.clone(), "in a comparison")?;
    let r = scalar(right.clone(), "in a comparison")?;
    let result = match op {
        CompareOp::Eq => loose_eq(&l, &r),
        CompareOp::Ne => !loose_eq(&l, &r),
        CompareOp::Lt => ordering(&l, &r)? == Some(Ordering::Less),
        CompareOp::Le => matches!(ordering(&l, &r)?, Some(Ordering::Less | Ordering::Equal)),
        CompareOp::Gt => ordering(&l, &r)? == Some(Ordering::Greater),
        CompareOp::Ge | CompareOp::In | CompareOp::NotIn => {
            matches!(ordering(&l, &r)?, Some(Ordering::Greater | Ordering::Equal))
        }
    };
    Ok(result)
}

fn arith(op: ArithOp, left: AttrValue, right: AttrValue) -> Result<AttrValue> {
    if left.is_null() || right.is_null() {
        return Ok(AttrValue::Null);
    }
    if let (ArithOp::Add, AttrValue::Text(a), AttrValue::Text(b)) = (op, &left, &right) {
        return Ok(AttrValue::Text(format!("{}{}", a, b)));
    }
    match (numeric(&left), numeric(&right)) {
        (Some(a), Some(b)) => Ok(AttrValue::Number(match op {
            ArithOp::Add => a + b,
            ArithOp::Sub => a - b,
            ArithOp::Mul => a * b,
            ArithOp::Div => a / b,
        })),
        _ => Err(eval_error(format!(
            "arithmetic is not defined between {} and {}",
            left.type_name(),
            right.type_name()
        ))),
    }
}

fn connective<R: Record>(terms: &[Expr], record: &R, name: &str) -> Result<Vec<bool>> {
    let (with, operand) = (format!("with {}", name), format!("for {}", name));
    terms
        .iter()
        .map(|term| {
            let value = scalar(eval(term, record)?, &with)?;
            truth(&value, &operand)
        })
        .collect()
}

fn eval<R: Record>(expr: &Expr, record: &R) -> Result<Operand> {
    match expr {
        Expr::Literal(value) => Ok(Operand::Scalar(value.clone())),
        Expr::Attribute(name) => record
            .attribute(name)
            .map(Operand::Scalar)
            .ok_or_else(|| JaalError::UnknownAttribute(name.clone())),
        Expr::List(items) => items
            .iter()
            .map(|item| eval(item, record).and_then(|v| scalar(v, "inside a list")))
            .collect::<Result<Vec<_>>>()
            .map(Operand::List),
        Expr::Not(inner) => {
            let value = scalar(eval(inner, record)?, "with 'not'")?;
            Ok(Operand::Scalar(AttrValue::Bool(!truth(&value, "after 'not'")?)))
        }
        Expr::Neg(inner) => {
            let value = scalar(eval(inner, record)?, "with unary '-'")?;
            match value {
                AttrValue::Null => Ok(Operand::Scalar(AttrValue::Null)),
                other => numeric(&other)
                    .map(|n| Operand::Scalar(AttrValue::Number(-n)))
                    .ok_or_else(|| eval_error(format!("cannot negate {}", other.type_name()))),
            }
        }
        // Every operand is evaluated so an unknown attribute fails the query
        // regardless of which records happen to match.
        Expr::And(terms) => {
            let values = connective(terms, record, "'and'")?;
            Ok(Operand::Scalar(AttrValue::Bool(values.iter().all(|v| *v))))
        }
        Expr::Or(terms) => {
            let values = connective(terms, record, "'or'")?;
            Ok(Operand::Scalar(AttrValue::Bool(values.iter().any(|v| *v))))
        }
        Expr::Arith(first, rest) => {
            let mut total = scalar(eval(first, record)?, "in arithmetic")?;
            for (op, operand) in rest {
                let value = scalar(eval(operand, record)?, "in arithmetic")?;
                total = arith(*op, total, value)?;
            }
            Ok(Operand::Scalar(total))
        }
        Expr::Compare(first, rest) => {
            let mut left = eval(first, record)?;
            let mut result = true;
            for (op, right_expr) in rest {
                let right = eval(right_expr, record)?;
                result &= compare(*op, &left, &right)?;
                left = right;
            }
            Ok(Operand::Scalar(AttrValue::Bool(result)))
        }
        Expr::Str(method, target, arg) => {
            let target = scalar(eval(target, record)?, "with '.str'")?;
            let arg = scalar(eval(arg, record)?, "as a string method argument")?;
            let AttrValue::Text(pattern) = arg else {
                return Err(eval_error(format!(
                    "string methods take a text argument, found {}",
                    arg.type_name()
                )));
            };
            let matched = match target {
                AttrValue::Null => false,
                AttrValue::Text(text) => match method {
                    StrMethod::Contains => text.contains(pattern.as_str()),
                    StrMethod::StartsWith => text.starts_with(pattern.as_str()),
                    StrMethod::EndsWith => text.ends_with(pattern.as_str()),
                },
                other => {
                    return Err(eval_error(format!(
                        "the '.str' accessor needs text values, found {}",
                        other.type_name()
                    )));
                }
            };
            Ok(Operand::Scalar(AttrValue::Bool(matched)))
        }
    }
}

/// A parsed attribute query.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    expr: Expr,
}

impl Query {
    pub fn parse(source: &str) -> Result<Self> {
        parse_expr(source).map(|expr| Self { expr })
    }

    /// Evaluates the query against one record; the result must be boolean.
    pub fn matches<R: Record>(&self, record: &R) -> Result<bool> {
        let value = scalar(eval(&self.expr, record)?, "as a query result")?;
        truth(&value, "as the query result")
    }

    /// Ids of the matching records, in record order. Any evaluation error
    /// fails the whole selection.
    pub fn select<'a, R: Record>(&self, records: &'a [R]) -> Result<Vec<&'a str>> {
        let mut ids = Vec::new();
        for record in records {
            if self.matches(record)? {
                ids.push(record.id());
            }
        }
        Ok(ids)
    }
}

impl FromStr for Query {
    type Err = JaalError;

    fn from_str(s: &str) -> Result<Self> {
        Query::parse(s)
    }
}
