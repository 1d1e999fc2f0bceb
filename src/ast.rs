//! # Residual Query Tree
//!
//! This module defines the data model for the output of a policy engine's
//! *partial evaluation* step: a set of residual queries over the inputs that
//! were declared unknown.
//!
//! ## Architecture Overview
//!
//! - **[tokens]** - Lexical tokens produced by the lexer for the textual form
//! - **[term]** - Terms: literals, variables, references, collections and calls
//! - **[query]** - Expressions, queries and the full partial query set
//!
//! ## Shape
//!
//! ```text
//! "bob" = input.post.author; input.post.deleted
//! internal.member_2(input.post.can, ["edit", "*"])
//! ```
//!
//! Every line is one query (a conjunction of expressions separated by `;`),
//! and the whole set is a disjunction of its queries. An empty set means the
//! policy can never hold; a set containing an empty query means it always
//! holds.
//!
//! ## References
//!
//! A reference is an ordered list of terms. The head is always a variable
//! (`input`), followed by string segments for static field names, numbers
//! for indices, and variables for positions the policy iterated over:
//!
//! ```text
//! input.post.moderators[_]      // [Var(input), "post", "moderators", Var(_)]
//! input.post.authors["name"]    // [Var(input), "post", "authors", "name"]
//! input.post.list[0]            // [Var(input), "post", "list", 0]
//! ```
pub mod query;
pub mod term;
pub mod tokens;

pub use query::{Expr, ExprTerms, PartialQueries, Query};
pub use term::Term;
pub use tokens::Token;
