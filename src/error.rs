use std::{
    fmt,
    num::ParseIntError
};
use snailquote::UnescapeError;

/// Coarse classification of an [`Error`], for callers that want to match on
/// what went wrong without caring about the payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    MalformedExpression,
    MalformedMacro,
    UnrecognizedDirective,
    InvalidStringLiteral,
}

#[derive(Debug)]
pub enum Error {
    /// `.align` expression could not be parsed or evaluated
    MalformedExpression {
        expression: String,
        line_num: usize,
        msg: String,
    },
    /// `.macro` line does not follow `name(args) body`
    MalformedMacro {
        line: String,
        line_num: usize,
    },
    UnrecognizedDirective {
        directive: String,
        line_num: usize,
    },
    /// evaluator failure, not yet tied to a source line
    InvalidExpr {
        msg: String
    },
    InvalidStringLiteral(UnescapeError),
    ParseIntError(ParseIntError),
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::MalformedExpression { .. }
            | Error::InvalidExpr { .. }
            | Error::ParseIntError(_) => ErrorKind::MalformedExpression,
            Error::MalformedMacro { .. } => ErrorKind::MalformedMacro,
            Error::UnrecognizedDirective { .. } => ErrorKind::UnrecognizedDirective,
            Error::InvalidStringLiteral(_) => ErrorKind::InvalidStringLiteral,
        }
    }

    /// 1-based source line the error came from, if it is tied to one.
    pub fn line_num(&self) -> Option<usize> {
        match self {
            Error::MalformedExpression { line_num, .. }
            | Error::MalformedMacro { line_num, .. }
            | Error::UnrecognizedDirective { line_num, .. } => Some(*line_num),
            _ => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::MalformedExpression {
                expression, line_num, msg
            } => write!(f, "line {}: malformed expression \"{}\": {}", line_num, expression, msg),
            Error::MalformedMacro {
                line, line_num
            } => write!(f, "line {}: malformed macro \"{}\", expected .macro name(args) body", line_num, line),
            Error::UnrecognizedDirective {
                directive, line_num
            } => write!(f, "line {}: unrecognized directive .{}", line_num, directive),
            Error::InvalidExpr { msg } => write!(f, "invalid expression: {}", msg),
            Error::InvalidStringLiteral(e) => write!(f, "invalid string literal: {}", e),
            Error::ParseIntError(e) => write!(f, "integer literal rejected: {}, only 64-bit signed values are supported", e),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::ParseIntError(e) => Some(e),
            Self::InvalidStringLiteral(e) => Some(e),
            _ => None
        }
    }
}

impl From<ParseIntError> for Error {
    fn from(err: ParseIntError) -> Self {
        Self::ParseIntError(err)
    }
}

impl From<UnescapeError> for Error {
    fn from(err: UnescapeError) -> Self {
        Self::InvalidStringLiteral(err)
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[test]
fn test_error_classification() {
    let e = Error::UnrecognizedDirective {
        directive: "foo".to_string(),
        line_num: 7,
    };
    assert_eq!(e.kind(), ErrorKind::UnrecognizedDirective);
    assert_eq!(e.line_num(), Some(7));
    assert_eq!(e.to_string(), "line 7: unrecognized directive .foo");

    let e = Error::InvalidExpr { msg: "division by zero".to_string() };
    assert_eq!(e.kind(), ErrorKind::MalformedExpression);
    assert_eq!(e.line_num(), None);
}
