use regex::Regex;
use std::{fmt, sync::LazyLock};

static DIRECTIVE_ANYWHERE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\.(?P<name>[A-Za-z0-9_]+)").unwrap());
static DIRECTIVE_LINE_START: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\.(?P<name>[A-Za-z0-9_]+)").unwrap());

/// The directives the preprocessor knows about.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DirectiveKind {
    Include,
    Align,
    Ascii,
    Text,
    Macro,
}

impl DirectiveKind {
    pub const ALL: [DirectiveKind; 5] = [
        DirectiveKind::Include,
        DirectiveKind::Align,
        DirectiveKind::Ascii,
        DirectiveKind::Text,
        DirectiveKind::Macro,
    ];

    /// Case-sensitive lookup of a matched directive name (without the `.`).
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    pub fn name(&self) -> &'static str {
        match self {
            DirectiveKind::Include => "include",
            DirectiveKind::Align => "align",
            DirectiveKind::Ascii => "ascii",
            DirectiveKind::Text => "text",
            DirectiveKind::Macro => "macro",
        }
    }
}

impl fmt::Display for DirectiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, ".{}", self.name())
    }
}

/// Where a directive token may appear in a stripped line.
///
/// `Anywhere` takes the first `.word` in the line, so an operand such as
/// `ld r1, .data` is read as a `.data` directive. That is how uasm has always
/// scanned; `LineStart` only accepts a token that opens the line.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchMode {
    #[default]
    Anywhere,
    LineStart,
}

/// A directive token found in a line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DirectiveMatch<'a> {
    /// name without the leading `.`
    pub name: &'a str,
    /// byte offset of the `.`
    pub start: usize,
    /// byte offset just past the token
    pub end: usize,
}

/// Find the first directive token in `line`, if any.
pub fn find_directive(line: &str, mode: MatchMode) -> Option<DirectiveMatch<'_>> {
    let re = match mode {
        MatchMode::Anywhere => &*DIRECTIVE_ANYWHERE,
        MatchMode::LineStart => &*DIRECTIVE_LINE_START,
    };
    let caps = re.captures(line)?;
    let token = caps.get(0)?;
    let name = caps.name("name")?;
    Some(DirectiveMatch {
        name: name.as_str(),
        start: token.start(),
        end: token.end(),
    })
}

#[test]
fn test_find_directive() {
    let find = |s| find_directive(s, MatchMode::Anywhere).map(|m| m.name);

    assert_eq!(find(".align 8"), Some("align"));
    assert_eq!(find(".macro foo(a) add a, a, a"), Some("macro"));
    assert_eq!(find("label: .ascii \"hi\""), Some("ascii"));
    assert_eq!(find("ld r1, .data"), Some("data"));
    assert_eq!(find(".include a.uasm"), Some("include"));
    assert_eq!(find("ADDC(r0, 1, r2)"), None);
    assert_eq!(find(""), None);
    assert_eq!(find(". align"), None);
}

#[test]
fn test_find_directive_line_start() {
    let find = |s| find_directive(s, MatchMode::LineStart).map(|m| m.name);

    assert_eq!(find(".text \"x\""), Some("text"));
    assert_eq!(find("ld r1, .data"), None);
    assert_eq!(find("label: .ascii \"hi\""), None);
}

#[test]
fn test_match_end() {
    let m = find_directive("x .align 2*4", MatchMode::Anywhere).unwrap();
    assert_eq!(&"x .align 2*4"[m.start..m.end], ".align");
    assert_eq!(&"x .align 2*4"[m.end..], " 2*4");
}

#[test]
fn test_directive_kind_names() {
    for kind in DirectiveKind::ALL {
        assert_eq!(DirectiveKind::from_name(kind.name()), Some(kind));
    }
    assert_eq!(DirectiveKind::from_name("ALIGN"), None);
    assert_eq!(DirectiveKind::from_name("unknown_directive"), None);
    assert_eq!(DirectiveKind::Macro.to_string(), ".macro");
}
