use crate::{
    align::parse_align,
    comment::strip_comment,
    directive::*,
    error::*,
    macros::{parse_macro, MacroDefinition},
};
use tracing::{debug, trace, warn};

/// One physical line of source, numbered from 1.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SourceLine<'a> {
    pub text: &'a str,
    pub line_num: usize,
}

impl<'a> SourceLine<'a> {
    pub fn new(text: &'a str, line_num: usize) -> Self {
        Self { text, line_num }
    }

    pub fn enumerate(src: &'a str) -> impl Iterator<Item = SourceLine<'a>> {
        src.lines()
            .enumerate()
            .map(|(idx, text)| SourceLine::new(text, idx + 1))
    }
}

/// What a single line turned out to be.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Directive {
    /// plain instruction, label or blank line
    NoDirective,
    Include {
        target: String,
    },
    Align {
        value: i64,
    },
    Ascii {
        payload: String,
    },
    Text {
        payload: String,
    },
    Macro {
        definition: MacroDefinition,
    },
}

impl Directive {
    pub fn kind(&self) -> Option<DirectiveKind> {
        match self {
            Directive::NoDirective => None,
            Directive::Include { .. } => Some(DirectiveKind::Include),
            Directive::Align { .. } => Some(DirectiveKind::Align),
            Directive::Ascii { .. } => Some(DirectiveKind::Ascii),
            Directive::Text { .. } => Some(DirectiveKind::Text),
            Directive::Macro { .. } => Some(DirectiveKind::Macro),
        }
    }

    /// Decode the quoted operand of `.include`, `.ascii` or `.text`, e.g.
    /// `"a\tb"` becomes `a<TAB>b`. Other directives have no such operand.
    pub fn unquoted_payload(&self) -> Result<Option<String>> {
        match self {
            Directive::Include { target: s }
            | Directive::Ascii { payload: s }
            | Directive::Text { payload: s } => Ok(Some(snailquote::unescape(s)?)),
            _ => Ok(None),
        }
    }
}

/// What happens to the rest of the source once a line fails.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorPolicy {
    /// stop at the first error
    #[default]
    Abort,
    /// record the error, skip the line and keep going
    Collect,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Options {
    pub match_mode: MatchMode,
    pub error_policy: ErrorPolicy,
}

impl Options {
    pub fn with_match_mode(mut self, match_mode: MatchMode) -> Self {
        self.match_mode = match_mode;
        self
    }

    pub fn with_error_policy(mut self, error_policy: ErrorPolicy) -> Self {
        self.error_policy = error_policy;
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessedLine {
    pub line_num: usize,
    /// source text with the comment removed
    pub text: String,
    pub directive: Directive,
}

#[derive(Debug, Default)]
pub struct Preprocessed {
    /// every line that went through cleanly, in source order
    pub lines: Vec<ProcessedLine>,
    /// only ever filled under `ErrorPolicy::Collect`
    pub errors: Vec<Error>,
}

impl Preprocessed {
    pub fn directives(&self) -> impl Iterator<Item = &ProcessedLine> {
        self.lines
            .iter()
            .filter(|line| line.directive != Directive::NoDirective)
    }

    pub fn macros(&self) -> impl Iterator<Item = &MacroDefinition> {
        self.lines.iter().filter_map(|line| match &line.directive {
            Directive::Macro { definition } => Some(definition),
            _ => None,
        })
    }
}

/// Route the directive `found` in the stripped `line` to its parser.
///
/// This is the only place that knows directive names: a new directive is a
/// new arm here.
pub fn dispatch(line: &str, found: DirectiveMatch<'_>, line_num: usize) -> Result<Directive> {
    let kind = DirectiveKind::from_name(found.name).ok_or_else(|| Error::UnrecognizedDirective {
        directive: found.name.to_string(),
        line_num,
    })?;
    debug!(line_num, directive = %kind, "dispatching directive");

    let from_token = &line[found.start..];
    let rest = line[found.end..].trim().to_string();
    let directive = match kind {
        DirectiveKind::Include => Directive::Include { target: rest },
        DirectiveKind::Align => Directive::Align {
            value: parse_align(from_token, line_num)?,
        },
        DirectiveKind::Ascii => Directive::Ascii { payload: rest },
        DirectiveKind::Text => Directive::Text { payload: rest },
        DirectiveKind::Macro => Directive::Macro {
            definition: parse_macro(from_token, line_num)?,
        },
    };

    Ok(directive)
}

/// Strip, match and dispatch a single line.
pub fn preprocess_line(source: SourceLine<'_>, match_mode: MatchMode) -> Result<ProcessedLine> {
    let text = strip_comment(source.text);
    trace!(line_num = source.line_num, text, "scanning line");

    let directive = match find_directive(text, match_mode) {
        Some(found) => dispatch(text, found, source.line_num)?,
        None => Directive::NoDirective,
    };

    Ok(ProcessedLine {
        line_num: source.line_num,
        text: text.to_string(),
        directive,
    })
}

/// Run every line of `src` through the preprocessor.
///
/// Under `ErrorPolicy::Abort` the first failing line is returned as `Err`;
/// under `ErrorPolicy::Collect` failures end up in `Preprocessed::errors`.
pub fn preprocess(src: &str, options: &Options) -> Result<Preprocessed> {
    let mut preprocessed = Preprocessed::default();

    for source in SourceLine::enumerate(src) {
        match preprocess_line(source, options.match_mode) {
            Ok(line) => preprocessed.lines.push(line),
            Err(e) => match options.error_policy {
                ErrorPolicy::Abort => return Err(e),
                ErrorPolicy::Collect => {
                    warn!(line_num = source.line_num, error = %e, "skipping line");
                    preprocessed.errors.push(e);
                },
            },
        }
    }

    debug!(
        lines = preprocessed.lines.len(),
        errors = preprocessed.errors.len(),
        "preprocessing finished"
    );
    Ok(preprocessed)
}

#[test]
fn test_preprocess() {
    let s = r#"| beta test program
.include "beta.uasm"
.align
.align 2+2 | word aligned
.ascii "hello"
.text "world\n"
.macro foo(a, b) mov a, b
ADDC(r0, 1, r1)"#;
    let res = preprocess(s, &Options::default()).unwrap();
    assert!(res.errors.is_empty());
    assert_eq!(res.lines.len(), 8);
    assert_eq!(res.lines[0].directive, Directive::NoDirective);
    assert_eq!(res.lines[1].directive, Directive::Include { target: "\"beta.uasm\"".to_string() });
    assert_eq!(res.lines[2].directive, Directive::Align { value: 4 });
    assert_eq!(res.lines[3].directive, Directive::Align { value: 4 });
    assert_eq!(res.lines[3].text, ".align 2+2");
    assert_eq!(res.lines[4].directive, Directive::Ascii { payload: "\"hello\"".to_string() });
    assert_eq!(res.lines[5].directive, Directive::Text { payload: "\"world\\n\"".to_string() });
    assert_eq!(res.lines[6].directive, Directive::Macro {
        definition: MacroDefinition {
            name: "foo".to_string(),
            params: vec!["a".to_string(), "b".to_string()],
            body: "mov a, b".to_string(),
        }
    });
    assert_eq!(res.lines[7].directive, Directive::NoDirective);
    assert_eq!(res.lines[7].line_num, 8);
    assert_eq!(res.directives().count(), 6);
    assert_eq!(res.macros().map(|m| m.name.as_str()).collect::<Vec<_>>(), vec!["foo"]);
}

#[test]
fn test_preprocess_abort() {
    let s = ".align 8\n.bogus 1\n.align 1/0";
    match preprocess(s, &Options::default()) {
        Err(Error::UnrecognizedDirective { directive, line_num }) => {
            assert_eq!(directive, "bogus");
            assert_eq!(line_num, 2);
        },
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn test_preprocess_collect() {
    let s = ".align 8\n.bogus 1\n.align 1/0\n.macro broken\n.text \"ok\"";
    let options = Options::default().with_error_policy(ErrorPolicy::Collect);
    let res = preprocess(s, &options).unwrap();
    assert_eq!(res.lines.iter().map(|l| l.line_num).collect::<Vec<_>>(), vec![1, 5]);
    assert_eq!(
        res.errors.iter().map(|e| (e.kind(), e.line_num())).collect::<Vec<_>>(),
        vec![
            (ErrorKind::UnrecognizedDirective, Some(2)),
            (ErrorKind::MalformedExpression, Some(3)),
            (ErrorKind::MalformedMacro, Some(4)),
        ]
    );
}

#[test]
fn test_match_mode() {
    let s = "LD(r31, .data, r1)";
    assert!(preprocess(s, &Options::default()).is_err());

    let options = Options::default().with_match_mode(MatchMode::LineStart);
    let res = preprocess(s, &options).unwrap();
    assert_eq!(res.lines[0].directive, Directive::NoDirective);
}

#[test]
fn test_unquoted_payload() {
    let d = Directive::Text { payload: "\"a\\tb\"".to_string() };
    assert_eq!(d.unquoted_payload().unwrap(), Some("a\tb".to_string()));
    assert_eq!(Directive::Align { value: 4 }.unquoted_payload().unwrap(), None);

    let d = Directive::Ascii { payload: "\"bad \\q escape\"".to_string() };
    assert_eq!(d.unquoted_payload().unwrap_err().kind(), ErrorKind::InvalidStringLiteral);
}
