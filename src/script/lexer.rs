//! Tokenizer for the supported JavaScript subset.
//!
//! Produces span-carrying tokens over the original source so the
//! transform can splice bytes without re-emitting anything it did not
//! touch. String literals, template literals (including nested `${}`
//! substitutions), and both comment styles are consumed as opaque units
//! so punctuation inside them never confuses bracket tracking.

// ============================================================================
// Imports
// ============================================================================

use crate::error::{Error, Result};

// ============================================================================
// Token Types
// ============================================================================

/// Kind of one lexed token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Identifier or keyword.
    Ident,
    /// Numeric literal.
    Number,
    /// String literal (single or double quoted).
    Str,
    /// Template literal, substitutions included.
    Template,
    /// The `=>` arrow.
    Arrow,
    /// The `...` spread/rest marker.
    Ellipsis,
    /// Any single punctuation character.
    Punct(char),
}

/// One token with its byte span in the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    /// Token kind.
    pub kind: TokenKind,
    /// Byte offset of the first character.
    pub start: usize,
    /// Byte offset one past the last character.
    pub end: usize,
}

impl Token {
    /// Returns the token's text slice.
    #[inline]
    #[must_use]
    pub fn text<'a>(&self, source: &'a str) -> &'a str {
        &source[self.start..self.end]
    }

    /// Returns `true` if this is the identifier `word`.
    #[inline]
    #[must_use]
    pub fn is_ident(&self, source: &str, word: &str) -> bool {
        self.kind == TokenKind::Ident && self.text(source) == word
    }
}

// ============================================================================
// Lexer
// ============================================================================

/// Tokenizes `source`, skipping whitespace and comments.
///
/// # Errors
///
/// Returns [`Error::UnsupportedScript`] for unterminated strings,
/// templates, or block comments.
pub fn tokenize(source: &str) -> Result<Vec<Token>> {
    let bytes = source.as_bytes();
    let mut tokens = Vec::new();
    let mut pos = 0;

    while pos < bytes.len() {
        let c = bytes[pos] as char;

        // Whitespace
        if c.is_ascii_whitespace() {
            pos += 1;
            continue;
        }

        // Comments
        if c == '/' && pos + 1 < bytes.len() {
            match bytes[pos + 1] as char {
                '/' => {
                    while pos < bytes.len() && bytes[pos] != b'\n' {
                        pos += 1;
                    }
                    continue;
                }
                '*' => {
                    pos = skip_block_comment(source, pos)?;
                    continue;
                }
                _ => {}
            }
        }

        // Identifiers and keywords
        if c.is_ascii_alphabetic() || c == '_' || c == '$' || !c.is_ascii() {
            let start = pos;
            pos = scan_ident(source, pos);
            tokens.push(Token {
                kind: TokenKind::Ident,
                start,
                end: pos,
            });
            continue;
        }

        // Numbers
        if c.is_ascii_digit() {
            let start = pos;
            while pos < bytes.len()
                && (bytes[pos].is_ascii_alphanumeric() || bytes[pos] == b'.' || bytes[pos] == b'_')
            {
                pos += 1;
            }
            tokens.push(Token {
                kind: TokenKind::Number,
                start,
                end: pos,
            });
            continue;
        }

        // String literals
        if c == '\'' || c == '"' {
            let start = pos;
            pos = skip_string(source, pos, c)?;
            tokens.push(Token {
                kind: TokenKind::Str,
                start,
                end: pos,
            });
            continue;
        }

        // Template literals
        if c == '`' {
            let start = pos;
            pos = skip_template(source, pos)?;
            tokens.push(Token {
                kind: TokenKind::Template,
                start,
                end: pos,
            });
            continue;
        }

        // Arrow
        if c == '=' && pos + 1 < bytes.len() && bytes[pos + 1] == b'>' {
            tokens.push(Token {
                kind: TokenKind::Arrow,
                start: pos,
                end: pos + 2,
            });
            pos += 2;
            continue;
        }

        // Ellipsis
        if c == '.' && bytes[pos..].starts_with(b"...") {
            tokens.push(Token {
                kind: TokenKind::Ellipsis,
                start: pos,
                end: pos + 3,
            });
            pos += 3;
            continue;
        }

        // Everything else is single-character punctuation.
        tokens.push(Token {
            kind: TokenKind::Punct(c),
            start: pos,
            end: pos + c.len_utf8(),
        });
        pos += c.len_utf8();
    }

    Ok(tokens)
}

// ============================================================================
// Scanners
// ============================================================================

/// Advances past an identifier starting at `pos`.
fn scan_ident(source: &str, pos: usize) -> usize {
    source[pos..]
        .char_indices()
        .find(|(_, c)| !(c.is_alphanumeric() || *c == '_' || *c == '$'))
        .map_or(source.len(), |(i, _)| pos + i)
}

/// Advances past a `/* ... */` comment.
fn skip_block_comment(source: &str, start: usize) -> Result<usize> {
    source[start + 2..]
        .find("*/")
        .map(|i| start + 2 + i + 2)
        .ok_or_else(|| Error::unsupported_script("unterminated block comment"))
}

/// Advances past a quoted string, honoring backslash escapes.
fn skip_string(source: &str, start: usize, quote: char) -> Result<usize> {
    let bytes = source.as_bytes();
    let mut pos = start + 1;

    while pos < bytes.len() {
        match bytes[pos] {
            b'\\' => pos += 2,
            b if b as char == quote => return Ok(pos + 1),
            _ => pos += 1,
        }
    }

    Err(Error::unsupported_script("unterminated string literal"))
}

/// Advances past a template literal, descending into `${...}`
/// substitutions so braces inside them stay balanced.
fn skip_template(source: &str, start: usize) -> Result<usize> {
    let bytes = source.as_bytes();
    let mut pos = start + 1;

    while pos < bytes.len() {
        match bytes[pos] {
            b'\\' => pos += 2,
            b'`' => return Ok(pos + 1),
            b'$' if pos + 1 < bytes.len() && bytes[pos + 1] == b'{' => {
                pos = skip_substitution(source, pos + 1)?;
            }
            _ => pos += 1,
        }
    }

    Err(Error::unsupported_script("unterminated template literal"))
}

/// Advances past a brace-balanced `${...}` body starting at the `{`.
fn skip_substitution(source: &str, open: usize) -> Result<usize> {
    let bytes = source.as_bytes();
    let mut pos = open + 1;
    let mut depth = 1usize;

    while pos < bytes.len() {
        match bytes[pos] as char {
            '{' => {
                depth += 1;
                pos += 1;
            }
            '}' => {
                depth -= 1;
                pos += 1;
                if depth == 0 {
                    return Ok(pos);
                }
            }
            '\'' | '"' => pos = skip_string(source, pos, bytes[pos] as char)?,
            '`' => pos = skip_template(source, pos)?,
            _ => pos += 1,
        }
    }

    Err(Error::unsupported_script("unterminated template substitution"))
}

// ============================================================================
// Tests
// ============================================================================
