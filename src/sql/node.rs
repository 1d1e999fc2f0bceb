use crate::{
    sql::{SqlGenerator, dispatch},
    types::VarType,
};

/// Canonical category of a node, used for dispatch between operands.
///
/// The kind decouples how a node is compared from its concrete variant: a
/// boolean column and an equality both behave as a [`Kind::Predicate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    /// Boolean literal (`true` / `false`)
    Boolean,
    /// Boolean-valued expression
    Predicate,
    String,
    Number,
    /// Array-valued expression
    Array,
    /// Some element of an array column (`moderators[_]`)
    AnyElement,
    /// Map-valued expression
    Map,
}

impl Kind {
    /// True for literal-comparable scalar kinds.
    pub fn is_scalar(self) -> bool {
        matches!(self, Kind::Boolean | Kind::Predicate | Kind::String | Kind::Number)
    }
}

/// How much of a column an expression addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnScope {
    /// The column value itself
    Whole,
    /// Any one element of an array column
    AnyElement,
}

/// A pre-rendered column reference produced by the variable converter.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    /// SQL text: a column name, a cast, a JSON projection...
    pub sql: String,
    /// Declared type of the column value
    pub ty: VarType,
    pub scope: ColumnScope,
}

impl Column {
    pub fn kind(&self) -> Kind {
        if self.scope == ColumnScope::AnyElement {
            return Kind::AnyElement;
        }
        match self.ty {
            VarType::Boolean => Kind::Predicate,
            VarType::String => Kind::String,
            VarType::Number => Kind::Number,
            VarType::Array(_) => Kind::Array,
            VarType::Map(_) => Kind::Map,
        }
    }
}

/// SQL expression node.
///
/// Nodes are built bottom-up by the compiler and never mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    // Literals
    /// `true` / `false`
    Boolean(bool),

    /// String literal, rendered single-quoted
    String(String),

    /// Number literal, rendered verbatim
    Number(String),

    /// Array constructor
    ///
    /// # Example
    /// ```text
    /// ARRAY['edit', '*']
    /// ```
    Array { source: String, elements: Vec<Node> },

    // Predicates
    /// `left = right` or `left != right`; either operand may supply the comparison
    Equality {
        left: Box<Node>,
        right: Box<Node>,
        negate: bool,
    },

    /// `element` is a member of `collection`
    MemberOf {
        element: Box<Node>,
        collection: Box<Node>,
    },

    /// Conjunction; `source` is the residual query it came from
    And { source: String, children: Vec<Node> },

    /// Disjunction; `source` is the residual query set it came from
    Or { source: String, children: Vec<Node> },

    /// Column reference
    Column(Column),
}

/// Single-quote a string literal, doubling embedded quotes.
pub fn quote_literal(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

impl Node {
    pub fn bool(value: bool) -> Self {
        Node::Boolean(value)
    }

    pub fn string(value: &str) -> Self {
        Node::String(value.to_string())
    }

    pub fn number(text: &str) -> Self {
        Node::Number(text.to_string())
    }

    pub fn array(source: impl Into<String>, elements: Vec<Node>) -> Self {
        Node::Array {
            source: source.into(),
            elements,
        }
    }

    pub fn equality(negate: bool, left: Node, right: Node) -> Self {
        Node::Equality {
            left: Box::new(left),
            right: Box::new(right),
            negate,
        }
    }

    pub fn member_of(element: Node, collection: Node) -> Self {
        Node::MemberOf {
            element: Box::new(element),
            collection: Box::new(collection),
        }
    }

    pub fn and(source: impl Into<String>, children: Vec<Node>) -> Self {
        Node::And {
            source: source.into(),
            children,
        }
    }

    pub fn or(source: impl Into<String>, children: Vec<Node>) -> Self {
        Node::Or {
            source: source.into(),
            children,
        }
    }

    /// Reference to a whole column.
    pub fn column(sql: impl Into<String>, ty: VarType) -> Self {
        Node::Column(Column {
            sql: sql.into(),
            ty,
            scope: ColumnScope::Whole,
        })
    }

    /// Reference to any one element of an array column.
    pub fn any_element(sql: impl Into<String>, ty: VarType) -> Self {
        Node::Column(Column {
            sql: sql.into(),
            ty,
            scope: ColumnScope::AnyElement,
        })
    }

    pub fn kind(&self) -> Kind {
        match self {
            Node::Boolean(_) => Kind::Boolean,
            Node::String(_) => Kind::String,
            Node::Number(_) => Kind::Number,
            Node::Array { .. } => Kind::Array,
            Node::Equality { .. } | Node::MemberOf { .. } | Node::And { .. } | Node::Or { .. } => {
                Kind::Predicate
            }
            Node::Column(column) => column.kind(),
        }
    }

    /// True for literal values, arrays of literals included.
    pub fn is_literal(&self) -> bool {
        matches!(
            self,
            Node::Boolean(_) | Node::String(_) | Node::Number(_) | Node::Array { .. }
        )
    }

    /// True if the node renders as a boolean-valued SQL expression.
    pub fn is_boolean(&self) -> bool {
        matches!(self.kind(), Kind::Boolean | Kind::Predicate)
    }

    /// Declared type, known only for column references.
    pub fn declared_type(&self) -> Option<&VarType> {
        match self {
            Node::Column(column) => Some(&column.ty),
            _ => None,
        }
    }

    /// Short description used in error messages.
    pub fn describe(&self) -> String {
        match self {
            Node::Boolean(_) => "boolean literal".to_string(),
            Node::String(_) => "string literal".to_string(),
            Node::Number(_) => "number literal".to_string(),
            Node::Array { .. } => "array literal".to_string(),
            Node::Equality { .. } => "equality".to_string(),
            Node::MemberOf { .. } => "membership".to_string(),
            Node::And { .. } => "conjunction".to_string(),
            Node::Or { .. } => "disjunction".to_string(),
            Node::Column(Column {
                sql,
                ty,
                scope: ColumnScope::Whole,
            }) => format!("column {} ({})", sql, ty),
            Node::Column(Column {
                sql,
                ty,
                scope: ColumnScope::AnyElement,
            }) => format!("element of column {} ({})", sql, ty),
        }
    }

    /// Whether the rendered text must be parenthesized inside an `AND` chain.
    fn needs_parens_in_and(&self) -> bool {
        match self {
            Node::Or { children, .. } => match children.as_slice() {
                [only] => only.needs_parens_in_and(),
                _ => children.len() > 1,
            },
            Node::And { children, .. } => match children.as_slice() {
                [only] => only.needs_parens_in_and(),
                _ => false,
            },
            _ => false,
        }
    }

    /// Render this node to SQL text.
    ///
    /// Never fails: unsupported operand pairs are recorded in `generator`
    /// and rendered as a placeholder.
    pub fn render(&self, generator: &mut SqlGenerator) -> String {
        match self {
            Node::Boolean(b) => b.to_string(),
            Node::String(s) => quote_literal(s),
            Node::Number(n) => n.clone(),
            Node::Array { elements, .. } => {
                let items: Vec<String> = elements.iter().map(|e| e.render(generator)).collect();
                format!("ARRAY[{}]", items.join(", "))
            }
            Node::Equality {
                left,
                right,
                negate,
            } => dispatch::render_equality(generator, *negate, left, right),
            Node::MemberOf {
                element,
                collection,
            } => dispatch::render_member_of(generator, element, collection),
            Node::And { children, .. } => match children.as_slice() {
                [] => "true".to_string(),
                [only] => only.render(generator),
                _ => {
                    let parts: Vec<String> = children
                        .iter()
                        .map(|child| {
                            let sql = child.render(generator);
                            if child.needs_parens_in_and() {
                                format!("({})", sql)
                            } else {
                                sql
                            }
                        })
                        .collect();
                    parts.join(" AND ")
                }
            },
            Node::Or { children, .. } => match children.as_slice() {
                [] => "false".to_string(),
                [only] => only.render(generator),
                _ => {
                    let parts: Vec<String> = children.iter().map(|c| c.render(generator)).collect();
                    parts.join(" OR ")
                }
            },
            Node::Column(column) => column.sql.clone(),
        }
    }
}
