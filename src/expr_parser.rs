use pest::Parser;

#[derive(Parser)]
#[grammar = "expr.pest"]
pub struct AlignExprParser;

#[cfg(test)]
fn test_parse(s: &str, rule: Rule, do_print: bool) -> bool {
    let res = AlignExprParser::parse(rule, s);
    if do_print {
        if let Err(e) = res.clone() {
            println!("{}", e);
        } else {
            println!("{}", res.as_ref().unwrap());
        }
    }
    res.is_ok()
}

#[test]
fn test_align_expr_parse() {
    let parse = |s| test_parse(s, Rule::align_expr, true);

    assert!(parse("4"));
    assert!(parse("2 + 2"));
    assert!(parse("-(0x10 << 2) // 3 ** 2"));
    assert!(parse("~0b1010 & 0o17 ^ 1"));
}

#[test]
fn test_align_expr_reject() {
    let parse = |s| test_parse(s, Rule::align_expr, false);

    assert!(!parse(""));
    assert!(!parse("2 +"));
    assert!(!parse("(1"));
    assert!(!parse("1.5"));
    assert!(!parse("__import__('os')"));
    assert!(!parse("WORD_SIZE * 2"));
    assert!(!parse("0x"));
}
