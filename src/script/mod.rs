//! Remote script marshaling.
//!
//! Callers hand over ordinary JavaScript functions as source text. By
//! convention the first formal parameter stands for the remote process's
//! main API object, which exists as an implicit global on the remote side
//! and must not be serialized across the wire — so before the source
//! becomes a `functionDeclaration`, that parameter is stripped.
//!
//! The grammar subset needed here is tiny (one top-level function-like
//! shape), so the transform is built on a small hand-rolled tokenizer
//! rather than a full parser: tokenize, locate the parameter list, splice
//! out the first parameter's byte range, and hand back the otherwise
//! untouched source.
//!
//! | Module | Description |
//! |--------|-------------|
//! | `lexer` | Tokenizer aware of strings, templates, and comments |
//! | `transform` | Top-level shape classification and the splice |

// ============================================================================
// Submodules
// ============================================================================

/// Tokenizer for the supported JavaScript subset.
pub mod lexer;

/// First-parameter removal transform.
pub mod transform;

// ============================================================================
// Re-exports
// ============================================================================

pub use transform::strip_first_parameter;
