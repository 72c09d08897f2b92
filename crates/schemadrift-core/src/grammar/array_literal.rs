use crate::error::{Error, Result};

/// One element of a Postgres array literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArrayItem {
    Value(String),
    Null,
    Array(Vec<ArrayItem>),
}

/// Recursive-descent parser for Postgres array literals.
///
/// Recognizes nested arrays, double-quoted elements (with `\\` and `\"`
/// escapes), unquoted elements, and the bare `NULL` marker. The whole input
/// must be consumed; anything else is a parse error echoing the input.
pub fn parse_array_literal(input: &str) -> Result<Vec<ArrayItem>> {
    let bytes: Vec<char> = input.trim().chars().collect();
    let mut pos = 0usize;
    let items = parse_array(&bytes, &mut pos).map_err(|_| malformed(input))?;
    skip_spaces(&bytes, &mut pos);
    if pos != bytes.len() {
        return Err(malformed(input));
    }
    Ok(items)
}

fn malformed(input: &str) -> Error {
    Error::Parse(format!("malformed array literal: {input}"))
}

struct NoMatch;

fn parse_array(chars: &[char], pos: &mut usize) -> std::result::Result<Vec<ArrayItem>, NoMatch> {
    expect(chars, pos, '{')?;
    skip_spaces(chars, pos);
    let mut items = Vec::new();

    if peek(chars, *pos) == Some('}') {
        *pos += 1;
        return Ok(items);
    }

    loop {
        skip_spaces(chars, pos);
        items.push(parse_item(chars, pos)?);
        skip_spaces(chars, pos);
        match peek(chars, *pos) {
            Some(',') => {
                *pos += 1;
            }
            Some('}') => {
                *pos += 1;
                return Ok(items);
            }
            _ => return Err(NoMatch),
        }
    }
}

fn parse_item(chars: &[char], pos: &mut usize) -> std::result::Result<ArrayItem, NoMatch> {
    match peek(chars, *pos) {
        Some('{') => Ok(ArrayItem::Array(parse_array(chars, pos)?)),
        Some('"') => parse_quoted(chars, pos).map(ArrayItem::Value),
        Some(_) => parse_unquoted(chars, pos),
        None => Err(NoMatch),
    }
}

fn parse_quoted(chars: &[char], pos: &mut usize) -> std::result::Result<String, NoMatch> {
    expect(chars, pos, '"')?;
    let mut value = String::new();
    loop {
        match peek(chars, *pos) {
            Some('\\') => {
                // Escaped backslash or quote: the next char is literal.
                *pos += 1;
                match peek(chars, *pos) {
                    Some(escaped) => {
                        value.push(escaped);
                        *pos += 1;
                    }
                    None => return Err(NoMatch),
                }
            }
            Some('"') => {
                *pos += 1;
                return Ok(value);
            }
            Some(ch) => {
                value.push(ch);
                *pos += 1;
            }
            None => return Err(NoMatch),
        }
    }
}

fn parse_unquoted(chars: &[char], pos: &mut usize) -> std::result::Result<ArrayItem, NoMatch> {
    let mut value = String::new();
    while let Some(ch) = peek(chars, *pos) {
        if ch == ',' || ch == '}' || ch == '{' || ch == '"' {
            break;
        }
        value.push(ch);
        *pos += 1;
    }
    let value = value.trim().to_string();
    if value.is_empty() {
        return Err(NoMatch);
    }
    if value == "NULL" {
        Ok(ArrayItem::Null)
    } else {
        Ok(ArrayItem::Value(value))
    }
}

fn expect(chars: &[char], pos: &mut usize, wanted: char) -> std::result::Result<(), NoMatch> {
    if peek(chars, *pos) == Some(wanted) {
        *pos += 1;
        Ok(())
    } else {
        Err(NoMatch)
    }
}

fn skip_spaces(chars: &[char], pos: &mut usize) {
    while peek(chars, *pos).is_some_and(|ch| ch == ' ') {
        *pos += 1;
    }
}

fn peek(chars: &[char], pos: usize) -> Option<char> {
    chars.get(pos).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn value(v: &str) -> ArrayItem {
        ArrayItem::Value(v.to_string())
    }

    #[test]
    fn parses_flat_and_nested_arrays() {
        assert_eq!(
            parse_array_literal("{1,2,{3,4}}").unwrap(),
            vec![
                value("1"),
                value("2"),
                ArrayItem::Array(vec![value("3"), value("4")]),
            ]
        );
    }

    #[test]
    fn parses_quoted_null_and_unquoted_elements() {
        assert_eq!(
            parse_array_literal(r#"{"a,b", NULL, c}"#).unwrap(),
            vec![value("a,b"), ArrayItem::Null, value("c")]
        );
    }

    #[test]
    fn quoted_null_is_the_string_null() {
        assert_eq!(
            parse_array_literal(r#"{"NULL"}"#).unwrap(),
            vec![value("NULL")]
        );
    }

    #[test]
    fn backslash_escapes_in_quoted_elements() {
        assert_eq!(
            parse_array_literal(r#"{"a\"b","c\\d"}"#).unwrap(),
            vec![value(r#"a"b"#), value(r"c\d")]
        );
    }

    #[test]
    fn empty_array_parses() {
        assert_eq!(parse_array_literal("{}").unwrap(), vec![]);
    }

    #[test]
    fn unbalanced_braces_fail_with_input_echoed() {
        let err = parse_array_literal("{1,2").unwrap_err();
        assert!(err.to_string().contains("{1,2"));
        assert!(parse_array_literal("{1,2}}").is_err());
        assert!(parse_array_literal("1,2").is_err());
    }
}
