use nom::IResult;
use nom::branch::alt;
use nom::bytes::complete::{escaped_transform, is_not};
use nom::character::complete::{char, multispace1};
use nom::combinator::{map, opt, value, verify};
use nom::multi::separated_list0;
use nom::sequence::delimited;

use crate::error::DecodeError;

/// Splits one event line into whitespace-separated tokens.
///
/// The later log format double-quotes fields that may contain spaces (player
/// names, vector tokens), with `\"` and `\\` escapes inside. Quotes around a
/// token are stripped; an unterminated quote is a [`DecodeError::MalformedQuoting`].
pub fn tokenize(line: &str) -> Result<Vec<String>, DecodeError> {
    let trimmed = line.trim();
    let result: IResult<&str, Vec<String>> = separated_list0(multispace1, token)(trimmed);
    match result {
        Ok(("", tokens)) => Ok(tokens),
        Ok((rest, _)) => Err(DecodeError::MalformedQuoting {
            rest: rest.to_string(),
        }),
        Err(_) => Err(DecodeError::MalformedQuoting {
            rest: trimmed.to_string(),
        }),
    }
}

fn token(input: &str) -> IResult<&str, String> {
    alt((quoted, bare))(input)
}

fn quoted(input: &str) -> IResult<&str, String> {
    delimited(
        char('"'),
        map(
            opt(escaped_transform(
                is_not("\\\""),
                '\\',
                alt((value("\\", char('\\')), value("\"", char('"')))),
            )),
            Option::unwrap_or_default,
        ),
        char('"'),
    )(input)
}

// A bare token may not start with a quote; that way a dangling quote is
// reported instead of being swallowed into a token.
fn bare(input: &str) -> IResult<&str, String> {
    map(
        verify(is_not(" \t"), |s: &str| !s.starts_with('"')),
        str::to_string,
    )(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_whitespace() {
        assert_eq!(
            tokenize("LOGIN 1.5 12 0 Fish").unwrap(),
            vec!["LOGIN", "1.5", "12", "0", "Fish"]
        );
    }

    #[test]
    fn quoted_tokens_keep_embedded_spaces() {
        assert_eq!(
            tokenize(r#"LOGIN 1.5 12 0 "Sgt. Fish""#).unwrap(),
            vec!["LOGIN", "1.5", "12", "0", "Sgt. Fish"]
        );
    }

    #[test]
    fn escapes_inside_quotes() {
        assert_eq!(
            tokenize(r#"SPAWN 2.0 "a \"b\" c" "x\\y""#).unwrap(),
            vec!["SPAWN", "2.0", "a \"b\" c", "x\\y"]
        );
    }

    #[test]
    fn empty_quoted_token() {
        assert_eq!(tokenize(r#"LOGIN 1.0 3 0 """#).unwrap(), vec![
            "LOGIN", "1.0", "3", "0", ""
        ]);
    }

    #[test]
    fn unterminated_quote_is_an_error() {
        assert!(matches!(
            tokenize(r#"LOGIN 1.0 3 0 "Fish"#),
            Err(DecodeError::MalformedQuoting { .. })
        ));
    }

    #[test]
    fn blank_line_yields_no_tokens() {
        assert!(tokenize("   ").unwrap().is_empty());
    }
}
