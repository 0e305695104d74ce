//! Request matcher compiled from a [`MountTable`].

use super::table::{MountRecord, MountTable};
use crate::binding::PARAM_RE;
use http::Method;
use regex::Regex;
use smallvec::SmallVec;
use std::sync::Arc;
use tracing::{debug, info};

/// Maximum number of path parameters before heap allocation.
pub const MAX_INLINE_PARAMS: usize = 8;

/// Captured path parameters, raw (still percent-escaped) and in template
/// order. Names are shared with the compiled route.
pub type ParamVec = SmallVec<[(Arc<str>, String); MAX_INLINE_PARAMS]>;

/// A matched mount and its captures.
#[derive(Debug, Clone)]
pub struct RouteMatch {
    pub record: Arc<MountRecord>,
    /// Position of the record in the table.
    pub index: usize,
    pub path_params: ParamVec,
}

impl RouteMatch {
    /// Last capture named `name`.
    #[inline]
    #[must_use]
    pub fn get_path_param(&self, name: &str) -> Option<&str> {
        self.path_params
            .iter()
            .rfind(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Debug, Clone)]
struct CompiledRoute {
    verb: Method,
    regex: Regex,
    params: Vec<Arc<str>>,
    record: Arc<MountRecord>,
}

/// Matches (verb, path) against mounts in table order; the first match wins.
#[derive(Debug, Clone)]
pub struct Router {
    routes: Vec<CompiledRoute>,
}

impl Router {
    /// # Errors
    ///
    /// Fails when a path template produces an invalid regular expression.
    pub fn new(table: &MountTable) -> Result<Self, regex::Error> {
        let routes = table
            .records
            .iter()
            .map(|record| {
                let (regex, params) = path_to_regex(&record.path)?;
                Ok(CompiledRoute {
                    verb: record.verb.clone(),
                    regex,
                    params: params.into_iter().map(Arc::from).collect(),
                    record: Arc::new(record.clone()),
                })
            })
            .collect::<Result<Vec<_>, regex::Error>>()?;
        info!(routes_count = routes.len(), "routing table compiled");
        Ok(Self { routes })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    #[must_use]
    pub fn route(&self, verb: &Method, path: &str) -> Option<RouteMatch> {
        for (index, route) in self.routes.iter().enumerate() {
            if route.verb != *verb {
                continue;
            }
            let Some(caps) = route.regex.captures(path) else {
                continue;
            };
            let path_params: ParamVec = route
                .params
                .iter()
                .enumerate()
                .filter_map(|(i, name)| {
                    caps.get(i + 1)
                        .map(|m| (Arc::clone(name), m.as_str().to_string()))
                })
                .collect();
            debug!(method = %verb, path = %path, route = %route.record.path, "route matched");
            return Some(RouteMatch {
                record: Arc::clone(&route.record),
                index,
                path_params,
            });
        }
        debug!(method = %verb, path = %path, "no route matched");
        None
    }
}

/// Regex for a path template and its parameter names in order.
///
/// `{name}` matches one segment, a trailing `{*name}` the rest of the path.
pub(crate) fn path_to_regex(path: &str) -> Result<(Regex, Vec<String>), regex::Error> {
    let param_re = PARAM_RE.as_ref().map_err(Clone::clone)?;
    let mut pattern = String::with_capacity(path.len() + 8);
    pattern.push('^');
    let mut names = Vec::new();
    let mut last = 0;
    for caps in param_re.captures_iter(path) {
        let Some(whole) = caps.get(0) else { continue };
        pattern.push_str(&regex::escape(&path[last..whole.start()]));
        pattern.push_str(if caps[1].is_empty() { "([^/]+)" } else { "(.+)" });
        names.push(caps[2].to_string());
        last = whole.end();
    }
    pattern.push_str(&regex::escape(&path[last..]));
    pattern.push('$');
    Ok((Regex::new(&pattern)?, names))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]
    use super::*;

    fn router() -> Router {
        Router::new(&MountTable::new(vec![
            MountRecord::endpoint("items", "list", Method::GET, "/items"),
            MountRecord::endpoint("items", "show", Method::GET, "/items/{id}"),
            MountRecord::endpoint("items", "update", Method::PUT, "/items/{id}"),
            MountRecord::endpoint("items", "version", Method::GET, "/items/{id}/v{version}"),
            MountRecord::file_server("items", "public/", "/static/{*path}"),
        ]))
        .unwrap()
    }

    #[test]
    fn matches_verb_and_path() {
        let r = router();
        let m = r.route(&Method::GET, "/items/42").unwrap();
        assert_eq!(m.record.operation().as_deref(), Some("items.show"));
        assert_eq!(m.get_path_param("id"), Some("42"));
        assert_eq!(r.route(&Method::PUT, "/items/42").unwrap().index, 2);
        assert!(r.route(&Method::DELETE, "/items/42").is_none());
        assert!(r.route(&Method::GET, "/items/42/extra").is_none());
    }

    #[test]
    fn partial_segments_and_wildcards() {
        let r = router();
        let m = r.route(&Method::GET, "/items/7/v3").unwrap();
        assert_eq!(m.get_path_param("version"), Some("3"));
        let m = r.route(&Method::GET, "/static/css/site.css").unwrap();
        assert_eq!(m.get_path_param("path"), Some("css/site.css"));
    }

    #[test]
    fn literal_characters_are_escaped() {
        let (re, names) = path_to_regex("/a.b/{x}").unwrap();
        assert!(names == ["x"]);
        assert!(re.is_match("/a.b/1"));
        assert!(!re.is_match("/aXb/1"));
    }
}
