use crate::model::{SecurityScheme, ServiceModel};

/// Table of security schemes a resolution run may reference.
///
/// Passed explicitly to [`resolve`](super::resolve) so independent runs never
/// share registration state.
#[derive(Debug, Clone, Default)]
pub struct SchemeRegistry {
    schemes: Vec<SecurityScheme>,
}

impl SchemeRegistry {
    #[must_use]
    pub fn new(schemes: Vec<SecurityScheme>) -> Self {
        Self { schemes }
    }

    /// Registry holding the schemes declared by the model.
    #[must_use]
    pub fn from_model(model: &ServiceModel) -> Self {
        Self::new(model.security_schemes().to_vec())
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&SecurityScheme> {
        self.schemes.iter().find(|s| s.name == name)
    }

    /// Schemes in declaration order.
    #[must_use]
    pub fn schemes(&self) -> &[SecurityScheme] {
        &self.schemes
    }
}
