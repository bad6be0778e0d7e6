//! Integer expression evaluation for `.align`.
//!
//! The grammar lives in `expr.pest` and only knows integer literals,
//! parentheses and arithmetic/bitwise operators, so nothing evaluated here can
//! reach a symbol table or run code. Operator precedence is resolved with a
//! Pratt parser over the flat `expr` pairs.
//!
//! Integer semantics follow the tool this replaces: `/` and `//` both floor,
//! `%` takes the sign of the divisor and `>>` shifts arithmetically. Every
//! operation is checked, overflow is an error rather than a wrap.
use crate::{
    error::*,
    expr_parser::{AlignExprParser, Rule},
};
use pest::{
    error::LineColLocation,
    iterators::{Pair, Pairs},
    pratt_parser::{Assoc, Op, PrattParser},
    Parser,
};
use std::sync::LazyLock;

static PRATT: LazyLock<PrattParser<Rule>> = LazyLock::new(|| {
    // lowest precedence first
    PrattParser::new()
        .op(Op::infix(Rule::bit_xor, Assoc::Left))
        .op(Op::infix(Rule::bit_and, Assoc::Left))
        .op(Op::infix(Rule::shl, Assoc::Left) | Op::infix(Rule::shr, Assoc::Left))
        .op(Op::infix(Rule::add, Assoc::Left) | Op::infix(Rule::sub, Assoc::Left))
        .op(Op::infix(Rule::mul, Assoc::Left)
            | Op::infix(Rule::div, Assoc::Left)
            | Op::infix(Rule::floor_div, Assoc::Left)
            | Op::infix(Rule::rem, Assoc::Left))
        .op(Op::prefix(Rule::neg) | Op::prefix(Rule::pos) | Op::prefix(Rule::bit_not))
        .op(Op::infix(Rule::pow, Assoc::Right))
});

fn invalid(msg: impl Into<String>) -> Error {
    Error::InvalidExpr { msg: msg.into() }
}

fn overflow(op: &str) -> Error {
    invalid(format!("integer overflow in \"{}\"", op))
}

fn parse_integer(pair: Pair<Rule>) -> Result<i64> {
    let text = pair.as_str();
    let (digits, radix) = match pair.as_rule() {
        Rule::hex_int => (&text[2..], 16),
        Rule::oct_int => (&text[2..], 8),
        Rule::bin_int => (&text[2..], 2),
        Rule::zero_oct_int => {
            let digits = &text[1..];
            if !digits.bytes().all(|b| (b'0'..=b'7').contains(&b)) {
                return Err(invalid(format!("invalid octal literal \"{}\"", text)));
            }
            (digits, 8)
        },
        _ => (text, 10),
    };
    Ok(i64::from_str_radix(digits, radix)?)
}

fn floor_div(lhs: i64, rhs: i64) -> Result<i64> {
    if rhs == 0 {
        return Err(invalid("division by zero"));
    }
    let q = lhs.checked_div(rhs).ok_or_else(|| overflow("/"))?;
    if lhs % rhs != 0 && ((lhs < 0) != (rhs < 0)) {
        Ok(q - 1)
    } else {
        Ok(q)
    }
}

fn floor_rem(lhs: i64, rhs: i64) -> Result<i64> {
    if rhs == 0 {
        return Err(invalid("modulo by zero"));
    }
    if rhs == -1 {
        return Ok(0);
    }
    let r = lhs.checked_rem(rhs).ok_or_else(|| overflow("%"))?;
    if r != 0 && ((r < 0) != (rhs < 0)) {
        Ok(r + rhs)
    } else {
        Ok(r)
    }
}

fn pow(base: i64, exp: i64) -> Result<i64> {
    if exp < 0 {
        return Err(invalid("negative exponent does not produce an integer"));
    }
    match base {
        0 if exp > 0 => return Ok(0),
        1 => return Ok(1),
        -1 => return Ok(if exp % 2 == 0 { 1 } else { -1 }),
        _ => {},
    }
    let exp = u32::try_from(exp).map_err(|_| overflow("**"))?;
    base.checked_pow(exp).ok_or_else(|| overflow("**"))
}

fn shift_left(lhs: i64, rhs: i64) -> Result<i64> {
    if rhs < 0 {
        return Err(invalid("negative shift count"));
    }
    if lhs == 0 {
        return Ok(0);
    }
    if rhs >= 64 {
        return Err(overflow("<<"));
    }
    i64::try_from((lhs as i128) << rhs).map_err(|_| overflow("<<"))
}

fn shift_right(lhs: i64, rhs: i64) -> Result<i64> {
    if rhs < 0 {
        return Err(invalid("negative shift count"));
    }
    if rhs >= 64 {
        return Ok(if lhs < 0 { -1 } else { 0 });
    }
    Ok(lhs >> rhs)
}

fn apply_prefix(op: Rule, rhs: i64) -> Result<i64> {
    match op {
        Rule::neg => rhs.checked_neg().ok_or_else(|| overflow("-")),
        Rule::pos => Ok(rhs),
        Rule::bit_not => Ok(!rhs),
        rule => unreachable!("prefix operator expected, found {:?}", rule),
    }
}

fn apply_infix(lhs: i64, op: Rule, rhs: i64) -> Result<i64> {
    match op {
        Rule::add => lhs.checked_add(rhs).ok_or_else(|| overflow("+")),
        Rule::sub => lhs.checked_sub(rhs).ok_or_else(|| overflow("-")),
        Rule::mul => lhs.checked_mul(rhs).ok_or_else(|| overflow("*")),
        Rule::div | Rule::floor_div => floor_div(lhs, rhs),
        Rule::rem => floor_rem(lhs, rhs),
        Rule::pow => pow(lhs, rhs),
        Rule::shl => shift_left(lhs, rhs),
        Rule::shr => shift_right(lhs, rhs),
        Rule::bit_and => Ok(lhs & rhs),
        Rule::bit_xor => Ok(lhs ^ rhs),
        rule => unreachable!("infix operator expected, found {:?}", rule),
    }
}

fn eval_pairs(pairs: Pairs<Rule>) -> Result<i64> {
    PRATT
        .map_primary(|primary| match primary.as_rule() {
            Rule::expr => eval_pairs(primary.into_inner()),
            _ => parse_integer(primary),
        })
        .map_prefix(|op, rhs| apply_prefix(op.as_rule(), rhs?))
        .map_infix(|lhs, op, rhs| apply_infix(lhs?, op.as_rule(), rhs?))
        .parse(pairs)
}

/// Evaluate `src` as an integer expression.
///
/// Any failure (syntax, disallowed content, division by zero, overflow) is
/// reported as [`Error::InvalidExpr`] or [`Error::ParseIntError`].
pub fn evaluate(src: &str) -> Result<i64> {
    let mut pairs = AlignExprParser::parse(Rule::align_expr, src).map_err(|e| {
        let col = match e.line_col {
            LineColLocation::Pos((_, col)) => col,
            LineColLocation::Span((_, col), _) => col,
        };
        invalid(format!("syntax error at column {}: {}", col, e.variant.message()))
    })?;
    let expr = pairs
        .next()
        .and_then(|root| root.into_inner().next())
        .ok_or_else(|| invalid("empty expression"))?;
    let value = eval_pairs(expr.into_inner())?;
    tracing::trace!(expression = src, value, "expression evaluated");
    Ok(value)
}
