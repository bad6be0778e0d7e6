/// Comment delimiter of uasm source.
pub const COMMENT_DELIMITER: char = '|';

/// Cut `line` at the first unescaped `|` and trim what is left.
///
/// `\|` does not open a comment and is kept verbatim. Applying this twice is
/// the same as applying it once.
pub fn strip_comment(line: &str) -> &str {
    let mut escaped = false;
    for (idx, c) in line.char_indices() {
        match c {
            COMMENT_DELIMITER if !escaped => return line[..idx].trim(),
            '\\' => escaped = !escaped,
            _ => escaped = false,
        }
    }
    line.trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_strip_comment() {
        assert_eq!(strip_comment("mov r0, r1 | load"), "mov r0, r1");
        assert_eq!(strip_comment("  .align 8   "), ".align 8");
        assert_eq!(strip_comment("| whole line"), "");
        assert_eq!(strip_comment(""), "");
        assert_eq!(strip_comment("a | b | c"), "a");
    }

    #[test]
    fn test_escaped_delimiter() {
        assert_eq!(strip_comment(r#".ascii "a\|b" | tail"#), r#".ascii "a\|b""#);
        assert_eq!(strip_comment(r"x \\| y"), r"x \\");
    }

    proptest! {
        #[test]
        fn strip_is_idempotent(line in ".*") {
            let once = strip_comment(&line);
            prop_assert_eq!(strip_comment(once), once);
        }

        #[test]
        fn nothing_after_delimiter_survives(head in "[a-z0-9 ,]*", tail in ".*") {
            let line = format!("{}|{}", head, tail);
            prop_assert_eq!(strip_comment(&line), head.trim());
        }
    }
}
