use std::fmt;

/// Category of a binding failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionErrorKind {
    ConflictingLocation,
    DuplicateRoute,
    MissingPathAttribute,
    NonScalarPathParam,
    UnknownAttribute,
    UnknownSecurityScheme,
    UnknownScope,
    InvalidRoute,
    InvalidDirective,
}

impl fmt::Display for ResolutionErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ResolutionErrorKind::ConflictingLocation => "conflicting_location",
            ResolutionErrorKind::DuplicateRoute => "duplicate_route",
            ResolutionErrorKind::MissingPathAttribute => "missing_path_attribute",
            ResolutionErrorKind::NonScalarPathParam => "non_scalar_path_param",
            ResolutionErrorKind::UnknownAttribute => "unknown_attribute",
            ResolutionErrorKind::UnknownSecurityScheme => "unknown_security_scheme",
            ResolutionErrorKind::UnknownScope => "unknown_scope",
            ResolutionErrorKind::InvalidRoute => "invalid_route",
            ResolutionErrorKind::InvalidDirective => "invalid_directive",
        };
        f.write_str(s)
    }
}

/// A method (or static mount) that could not be bound to HTTP.
///
/// Resolution errors are collected per method; the rest of the service keeps
/// resolving.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("[{kind}] {}: {message}", join_location(.service, .method, .attribute))]
pub struct ResolutionError {
    pub service: String,
    /// `None` for failures of static file mounts.
    pub method: Option<String>,
    pub attribute: Option<String>,
    pub kind: ResolutionErrorKind,
    pub message: String,
}

impl ResolutionError {
    pub fn new(
        service: impl Into<String>,
        method: Option<String>,
        kind: ResolutionErrorKind,
        message: impl Into<String>,
    ) -> Self {
        Self {
            service: service.into(),
            method,
            attribute: None,
            kind,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn with_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.attribute = Some(attribute.into());
        self
    }

    /// `service.method.attribute` with absent parts left out.
    #[must_use]
    pub fn location(&self) -> String {
        join_location(&self.service, &self.method, &self.attribute)
    }
}

fn join_location(service: &str, method: &Option<String>, attribute: &Option<String>) -> String {
    let mut out = service.to_string();
    for part in [method, attribute].into_iter().flatten() {
        out.push('.');
        out.push_str(part);
    }
    out
}

pub fn print_issues(issues: &[ResolutionError]) {
    eprintln!(
        "\n❌ HTTP binding resolution failed. {} issue(s) found:\n",
        issues.len()
    );
    for issue in issues {
        eprintln!("{issue}");
    }
    eprintln!("\nFailed methods were not generated. Fix the model and run again.\n");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_location() {
        let err = ResolutionError::new(
            "items",
            Some("get".into()),
            ResolutionErrorKind::NonScalarPathParam,
            "path parameter must be a primitive",
        )
        .with_attribute("filter");
        assert_eq!(
            err.to_string(),
            "[non_scalar_path_param] items.get.filter: path parameter must be a primitive"
        );
    }
}
