use crate::{
    error::*,
    expr,
};
use regex::Regex;
use std::sync::LazyLock;

/// Alignment used by a bare `.align`.
pub const DEFAULT_ALIGNMENT: i64 = 4;

static ALIGN_EXPRESSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\.align\s*(?P<expression>.*)").unwrap());

/// Resolve the alignment requested by the stripped `.align` line.
pub fn parse_align(line: &str, line_num: usize) -> Result<i64> {
    let expression = ALIGN_EXPRESSION
        .captures(line)
        .and_then(|caps| caps.name("expression"))
        .map_or("", |m| m.as_str().trim());
    if expression.is_empty() {
        return Ok(DEFAULT_ALIGNMENT);
    }

    expr::evaluate(expression).map_err(|e| Error::MalformedExpression {
        expression: expression.to_string(),
        line_num,
        msg: match e {
            Error::InvalidExpr { msg } => msg,
            other => other.to_string(),
        },
    })
}

#[test]
fn test_parse_align() {
    assert_eq!(parse_align(".align", 1).unwrap(), 4);
    assert_eq!(parse_align(".align 2+2", 1).unwrap(), 4);
    assert_eq!(parse_align(".align 16", 1).unwrap(), 16);
    assert_eq!(parse_align(".align (1 << 3) * 2", 1).unwrap(), 16);
    assert_eq!(parse_align("data: .align 0x100", 1).unwrap(), 256);
    assert_eq!(parse_align(".align 010", 1).unwrap(), 8);
}

#[test]
fn test_parse_align_malformed() {
    match parse_align(".align 1/0", 12) {
        Err(Error::MalformedExpression { expression, line_num, msg }) => {
            assert_eq!(expression, "1/0");
            assert_eq!(line_num, 12);
            assert_eq!(msg, "division by zero");
        },
        other => panic!("unexpected {:?}", other),
    }

    let e = parse_align(".align 09", 3).unwrap_err();
    assert_eq!(e.kind(), ErrorKind::MalformedExpression);

    let e = parse_align(".align WORD", 3).unwrap_err();
    assert_eq!(e.kind(), ErrorKind::MalformedExpression);
    assert_eq!(e.line_num(), Some(3));
}
