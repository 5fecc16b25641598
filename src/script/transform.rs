//! First-parameter removal transform.
//!
//! Classifies the single top-level function-like shape in the source,
//! locates its parameter list, and splices out exactly the first formal
//! parameter. Parameters 2..n shift left but keep their default values,
//! rest syntax, and destructuring patterns verbatim, because the output
//! is the original source minus one byte range — nothing is re-printed.
//!
//! Recognized top-level shapes:
//!
//! - function declarations and (async) function expressions, optionally
//!   wrapped in parentheses
//! - (async) arrow expressions, with or without parameter parens
//! - `const` / `let` / `var` declarations initialized to one of the above
//!
//! Anything else is a caller error; there is no partial recovery.

// ============================================================================
// Imports
// ============================================================================

use crate::error::{Error, Result};

use super::lexer::{Token, TokenKind, tokenize};

// ============================================================================
// Parameter List
// ============================================================================

/// Location of the function's parameter list, as token indices.
#[derive(Debug, Clone, Copy)]
enum Params {
    /// `(a, b, ...)` — indices of the opening and closing parens.
    Parenthesized { open: usize, close: usize },
    /// Paren-less single-parameter arrow — index of the identifier.
    Bare { ident: usize },
}

// ============================================================================
// Transform
// ============================================================================

/// Removes the first formal parameter from a function's source text.
///
/// A function with no parameters is returned unchanged. A paren-less
/// single-parameter arrow becomes `() =>`.
///
/// # Example
///
/// ```
/// use electron_debugger::script::strip_first_parameter;
///
/// let out = strip_first_parameter("(electron, a, b) => a + b").unwrap();
/// assert_eq!(out, "(a, b) => a + b");
/// ```
///
/// # Errors
///
/// Returns [`Error::UnsupportedScript`] for unparsable source or a
/// top-level shape outside the recognized set.
pub fn strip_first_parameter(source: &str) -> Result<String> {
    let tokens = tokenize(source)?;
    if tokens.is_empty() {
        return Err(Error::unsupported_script("empty script"));
    }

    let params = locate_params(source, &tokens)?;

    match params {
        Params::Bare { ident } => {
            let token = tokens[ident];
            Ok(format!(
                "{}(){}",
                &source[..token.start],
                &source[token.end..]
            ))
        }

        Params::Parenthesized { open, close } => {
            // Empty parameter list: nothing to remove.
            if close == open + 1 {
                return Ok(source.to_string());
            }

            let removal_start = tokens[open + 1].start;
            let removal_end = match first_top_level_comma(&tokens, open, close) {
                // Cut through the comma up to the start of parameter 2,
                // so everything from there on survives verbatim.
                Some(comma) => tokens[comma + 1].start,
                // Sole parameter: cut up to the closing paren.
                None => tokens[close].start,
            };

            Ok(format!(
                "{}{}",
                &source[..removal_start],
                &source[removal_end..]
            ))
        }
    }
}

// ============================================================================
// Classification
// ============================================================================

/// Walks the leading tokens to find the function node's parameter list.
fn locate_params(source: &str, tokens: &[Token]) -> Result<Params> {
    let mut pos = 0;

    loop {
        let Some(token) = tokens.get(pos) else {
            return Err(Error::unsupported_script("no function found in script"));
        };

        // `async` prefixes both function expressions and arrows.
        if token.is_ident(source, "async") {
            pos += 1;
            continue;
        }

        if token.is_ident(source, "function") {
            pos += 1;
            // Generator marker.
            if matches!(tokens.get(pos), Some(t) if t.kind == TokenKind::Punct('*')) {
                pos += 1;
            }
            // Optional name.
            if matches!(tokens.get(pos), Some(t) if t.kind == TokenKind::Ident) {
                pos += 1;
            }
            return match tokens.get(pos) {
                Some(t) if t.kind == TokenKind::Punct('(') => {
                    let close = matching_paren(tokens, pos)?;
                    Ok(Params::Parenthesized { open: pos, close })
                }
                _ => Err(Error::unsupported_script(
                    "function keyword without parameter list",
                )),
            };
        }

        // Variable declaration initialized to a function or arrow.
        if token.is_ident(source, "const")
            || token.is_ident(source, "let")
            || token.is_ident(source, "var")
        {
            let name = tokens.get(pos + 1);
            let equals = tokens.get(pos + 2);
            match (name, equals) {
                (Some(n), Some(e))
                    if n.kind == TokenKind::Ident && e.kind == TokenKind::Punct('=') =>
                {
                    pos += 3;
                    continue;
                }
                _ => {
                    return Err(Error::unsupported_script(
                        "variable declaration without a function initializer",
                    ));
                }
            }
        }

        match token.kind {
            TokenKind::Punct('(') => {
                let close = matching_paren(tokens, pos)?;
                // Arrow parameter list, or just a parenthesized function
                // expression to descend into.
                if matches!(tokens.get(close + 1), Some(t) if t.kind == TokenKind::Arrow) {
                    return Ok(Params::Parenthesized { open: pos, close });
                }
                pos += 1;
            }

            TokenKind::Ident => {
                return match tokens.get(pos + 1) {
                    Some(t) if t.kind == TokenKind::Arrow => Ok(Params::Bare { ident: pos }),
                    _ => Err(Error::unsupported_script("unsupported function type")),
                };
            }

            _ => return Err(Error::unsupported_script("unsupported function type")),
        }
    }
}

// ============================================================================
// Token Helpers
// ============================================================================

/// Returns the index of the `)` matching the `(` at `open`.
fn matching_paren(tokens: &[Token], open: usize) -> Result<usize> {
    let mut depth = 0usize;

    for (i, token) in tokens.iter().enumerate().skip(open) {
        match token.kind {
            TokenKind::Punct('(') => depth += 1,
            TokenKind::Punct(')') => {
                depth -= 1;
                if depth == 0 {
                    return Ok(i);
                }
            }
            _ => {}
        }
    }

    Err(Error::unsupported_script("unbalanced parentheses"))
}

/// Finds the first comma between `open` and `close` that belongs to the
/// parameter list itself, not to a nested bracket group.
fn first_top_level_comma(tokens: &[Token], open: usize, close: usize) -> Option<usize> {
    let mut depth = 0usize;

    for (i, token) in tokens.iter().enumerate().take(close).skip(open + 1) {
        match token.kind {
            TokenKind::Punct('(') | TokenKind::Punct('[') | TokenKind::Punct('{') => depth += 1,
            TokenKind::Punct(')') | TokenKind::Punct(']') | TokenKind::Punct('}') => {
                depth = depth.saturating_sub(1);
            }
            TokenKind::Punct(',') if depth == 0 => return Some(i),
            _ => {}
        }
    }

    None
}

// ============================================================================
// Tests
// ============================================================================
