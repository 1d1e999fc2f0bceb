use thiserror::Error;

/// A rendering failure: no strategy exists for an operand pair.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerateError {
    #[error("unsupported equality: {left} {op} {right}")]
    Equality {
        left: String,
        op: &'static str,
        right: String,
    },

    #[error("unsupported membership: {element} in {collection}")]
    Membership { element: String, collection: String },
}

/// Rendering context for one compilation.
///
/// The only mutable state while rendering. It is owned by a single
/// compilation call and must not be shared between compilations.
#[derive(Debug, Default)]
pub struct SqlGenerator {
    errors: Vec<GenerateError>,
}

impl SqlGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_error(&mut self, error: GenerateError) {
        log::trace!("sql generation error: {}", error);
        self.errors.push(error);
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn errors(&self) -> &[GenerateError] {
        &self.errors
    }

    pub fn into_errors(self) -> Vec<GenerateError> {
        self.errors
    }
}
