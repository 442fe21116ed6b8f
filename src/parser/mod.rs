//! Python source parsing utilities.
//!
//! This module provides the infrastructure for reading and tokenizing Python source:
//! - [`tokenize`]: Splits source text into typed tokens with exact positions
//! - [`LogicalLine`]: Rebuilds one statement from its tokens, with string contents masked
//! - [`patterns`]: Precompiled regex patterns for the tokenizer and the style rules
//!
//! No syntax tree is ever built. Tokens are only regrouped into
//! whitespace-normalized statements so rules can match against them.

pub mod logical;
pub mod patterns;
pub mod token;
pub mod tokenizer;

pub use logical::{expand_indent, mute_string, LogicalLine};
pub use token::{Position, Token, TokenKind};
pub use tokenizer::{split_lines, tokenize};
