//! Property-based tests
//!
//! Invariants checked with proptest across generated inputs:
//!
//! - `completion_props`: stage completion arithmetic and board navigation
//! - `tag_props`: the inline tag formatter on tag-free and tagged text
//! - `source_props`: book id to source code mapping

mod completion_props;
mod source_props;
mod tag_props;
