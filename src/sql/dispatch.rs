//! Comparison strategies between two operands.
//!
//! Equality is symmetric, so [`render_equality`] asks the left operand first
//! and falls back to the swapped pair. Each attempt matches on the canonical
//! [`Kind`] of both operands; adding a node kind means adding rows to the
//! match in [`compare`], not touching the other variants.

use crate::sql::{GenerateError, Kind, Node, SqlGenerator};

/// Placeholder rendered for an unsupported equality.
pub const EQUALITY_ERROR: &str = "EqualityError";

/// Placeholder rendered for an unsupported membership test.
pub const MEMBER_OF_ERROR: &str = "MemberOfError";

pub fn equals_op(negate: bool) -> &'static str {
    if negate { "!=" } else { "=" }
}

/// Render `this = other` with `this` supplying the comparison.
///
/// Returns `None` when `this` has no strategy for `other`; nothing is
/// rendered or recorded in that case, so the caller can try the swapped pair.
pub fn compare(generator: &mut SqlGenerator, negate: bool, this: &Node, other: &Node) -> Option<String> {
    let op = equals_op(negate);
    let sql = match (this.kind(), other.kind()) {
        (Kind::Number, Kind::Number)
        | (Kind::String, Kind::String)
        | (Kind::Boolean, Kind::Boolean)
        | (Kind::Array, Kind::Array) => {
            format!("{} {} {}", this.render(generator), op, other.render(generator))
        }
        // No parens around a bare boolean literal
        (Kind::Predicate, Kind::Boolean) => {
            format!("({}) {} {}", this.render(generator), op, other.render(generator))
        }
        (Kind::Predicate, Kind::Predicate) => {
            format!("({}) {} ({})", this.render(generator), op, other.render(generator))
        }
        (Kind::String | Kind::Number | Kind::Boolean, Kind::AnyElement) => {
            format!("{} {} ANY({})", this.render(generator), op, other.render(generator))
        }
        _ => return None,
    };
    Some(sql)
}

/// Render an equality, trying `left = right` then `right = left`.
///
/// A literal never leads when the other operand is not one, so `"bob" = x`
/// and `x = "bob"` render the same text.
pub fn render_equality(generator: &mut SqlGenerator, negate: bool, left: &Node, right: &Node) -> String {
    let (first, second) = if left.is_literal() && !right.is_literal() {
        (right, left)
    } else {
        (left, right)
    };

    if let Some(sql) = compare(generator, negate, first, second) {
        return sql;
    }
    if let Some(sql) = compare(generator, negate, second, first) {
        return sql;
    }

    generator.add_error(GenerateError::Equality {
        left: left.describe(),
        op: equals_op(negate),
        right: right.describe(),
    });
    EQUALITY_ERROR.to_string()
}

/// A predicate binds looser than `=`, so it is wrapped before comparison.
fn scalar_operand(generator: &mut SqlGenerator, element: &Node) -> String {
    match element.kind() {
        Kind::Predicate => format!("({})", element.render(generator)),
        _ => element.render(generator),
    }
}

/// Render a membership test.
///
/// The strategy follows the declared type of the element, not its shape:
/// an array-typed element against a literal array is an overlap test
/// (`tags && ARRAY[...]`), a scalar element is a set membership test
/// (`tag = ANY(ARRAY[...])`).
pub fn render_member_of(generator: &mut SqlGenerator, element: &Node, collection: &Node) -> String {
    let element_is_array = element.declared_type().is_some_and(|ty| ty.is_array());
    let element_is_scalar = element.kind().is_scalar() && !element_is_array;

    match collection {
        Node::Array { elements, .. } if elements.is_empty() && (element_is_array || element_is_scalar) => {
            "false".to_string()
        }
        Node::Array { .. } if element_is_array => {
            format!("{} && {}", element.render(generator), collection.render(generator))
        }
        Node::Array { .. } if element_is_scalar => {
            format!("{} = ANY({})", scalar_operand(generator, element), collection.render(generator))
        }
        Node::Column(_) if collection.kind() == Kind::Array && element_is_scalar => {
            format!("{} = ANY({})", scalar_operand(generator, element), collection.render(generator))
        }
        _ => {
            generator.add_error(GenerateError::Membership {
                element: element.describe(),
                collection: collection.describe(),
            });
            MEMBER_OF_ERROR.to_string()
        }
    }
}
