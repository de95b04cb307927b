//! Source normalization and lexing.
//!
//! Lexing happens in two passes. The `cleanse` pre-pass rewrites the script
//! so that a plain whitespace split yields one token per word: quoted
//! literals have their spaces protected, and operator/punctuation
//! characters are padded so they stand alone.

use super::{Keyword, Token};
use crate::error::{Error, Result};

/// Characters padded with spaces outside of quotes so they lex alone.
const PADDED: &str = "()+-*/,;=<>";

/// Normalizes a script for whitespace splitting.
///
/// Inside single quotes, spaces and newlines become `_` so a quoted literal
/// survives the split as a single token; outside, newlines become plain
/// spaces and each character of `()+-*/,;=<>` gains surrounding spaces.
///
/// # Errors
///
/// Returns an error when a quote is still open at the end of the input.
pub fn cleanse(input: &str) -> Result<String> {
    let mut out = String::with_capacity(input.len() * 2);
    let mut in_quote = false;
    for c in input.chars() {
        if c == '\'' {
            in_quote = !in_quote;
            out.push(c);
        } else if in_quote {
            if c == ' ' || c == '\n' {
                out.push('_');
            } else {
                out.push(c);
            }
        } else if c == '\n' {
            out.push(' ');
        } else if PADDED.contains(c) {
            out.push(' ');
            out.push(c);
            out.push(' ');
        } else {
            out.push(c);
        }
    }
    if in_quote {
        return Err(Error::UnterminatedString);
    }
    Ok(out)
}

/// Cleanses and lexes a script into a token stream.
///
/// # Errors
///
/// Returns an error for an unterminated string literal.
pub fn tokenize(input: &str) -> Result<Vec<Token>> {
    let cleansed = cleanse(input)?;
    Ok(cleansed.split_whitespace().map(lex_word).collect())
}

fn lex_word(word: &str) -> Token {
    if let Some(keyword) = Keyword::from_str(word) {
        return Token::Keyword(keyword);
    }
    let first = word.chars().next().unwrap_or(' ');
    if first == '\'' && word.len() >= 2 {
        let inner = word[1..word.len() - 1].replace('_', " ");
        return Token::Text(inner);
    }
    if "(),;".contains(first) {
        return Token::Punct(first);
    }
    if "=<>+-*/".contains(first) {
        return Token::Operator(first);
    }
    if first.is_ascii_digit() || first == '.' {
        return Token::Number(word.to_string());
    }
    Token::Identifier(word.to_string())
}
