//! # SQL Predicate AST
//!
//! A small AST for SQL boolean and scalar expressions, and the code that
//! renders it to text.
//!
//! - **[node]** - Node variants and their canonical [`Kind`]
//! - **[generator]** - The per-compilation [`SqlGenerator`] context that collects errors
//! - **[dispatch]** - Equality and membership resolution between two operands
//!
//! ## Rendering never fails
//!
//! [`Node::render`] always returns text. When no strategy exists for a pair
//! of operands, the node records a [`GenerateError`] in the generator and
//! renders a placeholder (`EqualityError`, `MemberOfError`). Sibling branches
//! keep rendering, so one pass reports every unsupported construct. Callers
//! must check [`SqlGenerator::has_errors`] before using the text.
//!
//! ```
//! use regosql::sql::{Node, SqlGenerator};
//!
//! let node = Node::equality(false, Node::string("bob"), Node::number("1"));
//! let mut generator = SqlGenerator::new();
//! assert_eq!(node.render(&mut generator), "EqualityError");
//! assert!(generator.has_errors());
//! ```
pub mod dispatch;
pub mod generator;
pub mod node;

pub use generator::{GenerateError, SqlGenerator};
pub use node::{Column, ColumnScope, Kind, Node};
