use crate::binding::Resolution;
use crate::model::ServiceModel;
use http::Method;
use std::fmt;

/// What a mount dispatches to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MountTarget {
    /// A service method.
    Endpoint { method: String },
    /// Files under `source`, served by an external file server.
    Static { source: String },
}

/// One (target, verb, path) association.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountRecord {
    pub service: String,
    pub target: MountTarget,
    pub verb: Method,
    /// Fully composed path template.
    pub path: String,
}

impl MountRecord {
    pub fn endpoint(
        service: impl Into<String>,
        method: impl Into<String>,
        verb: Method,
        path: impl Into<String>,
    ) -> Self {
        Self {
            service: service.into(),
            target: MountTarget::Endpoint {
                method: method.into(),
            },
            verb,
            path: path.into(),
        }
    }

    /// Static mounts are always `GET`.
    pub fn file_server(
        service: impl Into<String>,
        source: impl Into<String>,
        path: impl Into<String>,
    ) -> Self {
        Self {
            service: service.into(),
            target: MountTarget::Static {
                source: source.into(),
            },
            verb: Method::GET,
            path: path.into(),
        }
    }

    /// `service.method` for endpoints, `None` for static mounts.
    #[must_use]
    pub fn operation(&self) -> Option<String> {
        match &self.target {
            MountTarget::Endpoint { method } => Some(format!("{}.{method}", self.service)),
            MountTarget::Static { .. } => None,
        }
    }
}

impl fmt::Display for MountRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.target {
            MountTarget::Endpoint { method } => {
                write!(f, "{:<7} {} -> {}.{method}", self.verb.as_str(), self.path, self.service)
            }
            MountTarget::Static { source } => {
                write!(
                    f,
                    "{:<7} {} -> {} (files: {source})",
                    self.verb.as_str(),
                    self.path,
                    self.service
                )
            }
        }
    }
}

/// Ordered mount records: services in declaration order, each service's
/// methods in declaration order (alternative routes in route order)
/// followed by its static mounts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MountTable {
    pub records: Vec<MountRecord>,
}

impl MountTable {
    #[must_use]
    pub fn new(records: Vec<MountRecord>) -> Self {
        Self { records }
    }

    /// Table of every resolved endpoint and static mount. Failed methods
    /// are absent.
    #[must_use]
    pub fn from_resolution(model: &ServiceModel, resolution: &Resolution) -> Self {
        let mut records = Vec::new();
        for service in model.services() {
            for ep in resolution.endpoints_of(service.id) {
                for route in &ep.routes {
                    records.push(MountRecord::endpoint(
                        &ep.service_name,
                        &ep.method_name,
                        route.verb.clone(),
                        &route.pattern,
                    ));
                }
            }
            for mount in resolution.mounts_of(service.id) {
                records.push(MountRecord::file_server(
                    &mount.service_name,
                    &mount.source,
                    &mount.path,
                ));
            }
        }
        Self { records }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records of one service, in table order.
    pub fn service<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a MountRecord> + 'a {
        self.records.iter().filter(move |r| r.service == name)
    }

    /// Diagnostic listing, one record per line.
    #[must_use]
    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for MountTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for record in &self.records {
            writeln!(f, "{record}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_render_targets() {
        let table = MountTable::new(vec![
            MountRecord::endpoint("items", "show", Method::GET, "/items/{id}"),
            MountRecord::file_server("items", "public/", "/static/{*path}"),
        ]);
        let listing = table.render();
        let lines: Vec<&str> = listing.lines().collect();
        assert_eq!(lines[0], "GET     /items/{id} -> items.show");
        assert_eq!(lines[1], "GET     /static/{*path} -> items (files: public/)");
        assert_eq!(table.records[0].operation().as_deref(), Some("items.show"));
        assert_eq!(table.records[1].operation(), None);
    }
}
