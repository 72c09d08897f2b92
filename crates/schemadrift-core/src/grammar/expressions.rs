#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum QuoteState {
    Unquoted,
    Single,
    Double,
}

/// Split a comma-separated SQL expression list without breaking on commas
/// inside quotes or parentheses.
///
/// Quote escaping is the SQL doubled-quote-char form, not backslashes. The
/// parenthesis depth counter is clamped at zero so a stray closing paren in
/// catalog-returned text never panics the scanner or corrupts later splits.
pub fn split_expressions(input: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut state = QuoteState::Unquoted;
    let mut depth: usize = 0;

    let mut chars = input.chars().peekable();
    while let Some(ch) = chars.next() {
        match state {
            QuoteState::Unquoted => match ch {
                '\'' => {
                    state = QuoteState::Single;
                    current.push(ch);
                }
                '"' => {
                    state = QuoteState::Double;
                    current.push(ch);
                }
                '(' => {
                    depth += 1;
                    current.push(ch);
                }
                ')' => {
                    depth = depth.saturating_sub(1);
                    current.push(ch);
                }
                ',' if depth == 0 => {
                    parts.push(current.trim().to_string());
                    current = String::new();
                }
                _ => current.push(ch),
            },
            QuoteState::Single => {
                current.push(ch);
                if ch == '\'' {
                    if chars.peek() == Some(&'\'') {
                        chars.next();
                        current.push('\'');
                    } else {
                        state = QuoteState::Unquoted;
                    }
                }
            }
            QuoteState::Double => {
                current.push(ch);
                if ch == '"' {
                    if chars.peek() == Some(&'"') {
                        chars.next();
                        current.push('"');
                    } else {
                        state = QuoteState::Unquoted;
                    }
                }
            }
        }
    }

    let last = current.trim();
    if !last.is_empty() || !parts.is_empty() {
        parts.push(last.to_string());
    }
    parts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_top_level_commas() {
        assert_eq!(split_expressions("a, b, c"), vec!["a", "b", "c"]);
    }

    #[test]
    fn commas_inside_quotes_and_parens_are_literal() {
        assert_eq!(
            split_expressions("a, concat('x,y', b), c"),
            vec!["a", "concat('x,y', b)", "c"]
        );
        assert_eq!(
            split_expressions(r#"lower("first,last"), other"#),
            vec![r#"lower("first,last")"#, "other"]
        );
    }

    #[test]
    fn doubled_quotes_do_not_close_the_string() {
        assert_eq!(
            split_expressions("'it''s, fine', next"),
            vec!["'it''s, fine'", "next"]
        );
    }

    #[test]
    fn unmatched_close_paren_is_tolerated() {
        assert_eq!(split_expressions("a), b"), vec!["a)", "b"]);
    }

    #[test]
    fn single_quote_inside_double_quotes_is_literal() {
        assert_eq!(
            split_expressions(r#""o'brien", x"#),
            vec![r#""o'brien""#, "x"]
        );
    }

    #[test]
    fn empty_input_yields_no_parts() {
        assert!(split_expressions("").is_empty());
        assert!(split_expressions("   ").is_empty());
    }
}
