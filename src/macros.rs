//! `.macro name(params) body` signatures.
use crate::error::*;
use regex::Regex;
use std::sync::LazyLock;

static MACRO_SIGNATURE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"\.macro\s*",
        r"(?P<name>[A-Za-z0-9_]+)\s*",
        r"\((?P<args>[A-Za-z0-9_,\s]*)\)\s+",
        r"(?P<body>.*)",
    ))
    .unwrap()
});

/// A macro as written on its definition line. The body is kept as raw text;
/// expanding it is up to whoever stores the definition.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MacroDefinition {
    pub name: String,
    /// Parameter names in order. Empty names from `(a,,b)` or `(a,)` are kept.
    pub params: Vec<String>,
    pub body: String,
}

impl MacroDefinition {
    pub fn arity(&self) -> usize {
        self.params.len()
    }
}

fn split_params(args: &str) -> Vec<String> {
    if args.trim().is_empty() {
        return Vec::new();
    }
    args.split(',').map(|arg| arg.trim().to_string()).collect()
}

/// Parse the `.macro` signature contained in the stripped `line`.
///
/// The signature is searched for, not anchored at the start of `line`, so
/// `.macro foo .macro bar(a) x` defines `bar`; see `MatchMode` for the same
/// first-match rule on directive tokens.
pub fn parse_macro(line: &str, line_num: usize) -> Result<MacroDefinition> {
    let caps = MACRO_SIGNATURE.captures(line).ok_or_else(|| Error::MalformedMacro {
        line: line.to_string(),
        line_num,
    })?;
    Ok(MacroDefinition {
        name: caps["name"].to_string(),
        params: split_params(&caps["args"]),
        body: caps["body"].trim().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn def(name: &str, params: &[&str], body: &str) -> MacroDefinition {
        MacroDefinition {
            name: name.to_string(),
            params: params.iter().map(|p| p.to_string()).collect(),
            body: body.to_string(),
        }
    }

    #[test]
    fn test_parse_macro() {
        assert_eq!(parse_macro(".macro foo(a, b) mov a, b", 1).unwrap(), def("foo", &["a", "b"], "mov a, b"));
        assert_eq!(parse_macro(".macro foo() nop", 1).unwrap(), def("foo", &[], "nop"));
        assert_eq!(parse_macro(".macro  LONG (x)   LONG(x)", 1).unwrap(), def("LONG", &["x"], "LONG(x)"));
        assert_eq!(parse_macro(".macro inc(  ra  ) ADDC(ra, 1, ra)", 1).unwrap(), def("inc", &["ra"], "ADDC(ra, 1, ra)"));
    }

    #[test]
    fn test_signature_is_searched() {
        assert_eq!(parse_macro(".macro foo .macro bar(a) x", 1).unwrap(), def("bar", &["a"], "x"));
    }

    #[test]
    fn test_empty_params_are_kept() {
        assert_eq!(parse_macro(".macro m(a,,b) x", 1).unwrap().params, vec!["a", "", "b"]);
        assert_eq!(parse_macro(".macro m(a,) x", 1).unwrap().params, vec!["a", ""]);
        assert_eq!(parse_macro(".macro m( , ) x", 1).unwrap().arity(), 2);
    }

    #[test]
    fn test_malformed_macro() {
        for (line_num, line) in [
            ".macro foo mov a,b",
            ".macro (a) body",
            ".macro foo(a-b) body",
            ".macro foo(a)",
            ".macro foo(a",
        ].iter().enumerate() {
            match parse_macro(line, line_num + 1) {
                Err(Error::MalformedMacro { line_num: n, .. }) => assert_eq!(n, line_num + 1),
                other => panic!("{:?} parsed as {:?}", line, other),
            }
        }
    }
}
