//! Path composition and path template inspection.

use once_cell::sync::Lazy;
use regex::Regex;

pub(crate) static PARAM_RE: Lazy<Result<Regex, regex::Error>> =
    Lazy::new(|| Regex::new(r"\{(\*?)([A-Za-z_][A-Za-z0-9_]*)\}"));

/// A `{name}` or `{*name}` placeholder in a path template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathParam {
    pub name: String,
    pub wildcard: bool,
}

/// Join the API base path, the service base path and a method path.
///
/// Segments are cleaned (`.` dropped, `..` pops, repeated slashes collapse)
/// and the result always starts with `/`. The trailing slash survives when the
/// method path ends with one (and is not just `/`), or when the method path is
/// `/` and the innermost non-empty base ends with one. A method path starting
/// with `//` ignores the bases.
///
/// # Examples
///
/// ```
/// use httpbind::binding::join_paths;
///
/// assert_eq!(join_paths(&["foo"], "/"), "/foo");
/// assert_eq!(join_paths(&["foo/"], "/"), "/foo/");
/// assert_eq!(join_paths(&[], "/foo/"), "/foo/");
/// assert_eq!(join_paths(&["/foo"], "/./"), "/foo/");
/// ```
#[must_use]
pub fn join_paths(bases: &[&str], path: &str) -> String {
    let (bases, path): (&[&str], &str) = match path.strip_prefix("//") {
        Some(rest) => (&[], rest),
        None => (bases, path),
    };

    let mut segments: Vec<&str> = Vec::new();
    for part in bases.iter().copied().chain(std::iter::once(path)) {
        for seg in part.split('/') {
            match seg {
                "" | "." => {}
                ".." => {
                    segments.pop();
                }
                s => segments.push(s),
            }
        }
    }

    let trailing = if path.is_empty() || path == "/" {
        bases
            .iter()
            .rev()
            .find(|b| !b.is_empty())
            .is_some_and(|b| b.ends_with('/'))
    } else {
        path.ends_with('/')
    };

    let mut out = String::with_capacity(path.len() + 16);
    for seg in &segments {
        out.push('/');
        out.push_str(seg);
    }
    if out.is_empty() || trailing {
        out.push('/');
    }
    out
}

/// Placeholders of a path template in template order.
#[must_use]
pub fn path_params(pattern: &str) -> Vec<PathParam> {
    let Ok(re) = PARAM_RE.as_ref() else {
        return Vec::new();
    };
    re.captures_iter(pattern)
        .map(|c| PathParam {
            wildcard: !c[1].is_empty(),
            name: c[2].to_string(),
        })
        .collect()
}

/// Template with parameter names erased, so `/items/{id}` and
/// `/items/{item_id}` compare equal.
#[must_use]
pub fn canonical_pattern(pattern: &str) -> String {
    match PARAM_RE.as_ref() {
        Ok(re) => re
            .replace_all(pattern, |c: &regex::Captures<'_>| {
                if c[1].is_empty() {
                    "{}".to_string()
                } else {
                    "{*}".to_string()
                }
            })
            .into_owned(),
        Err(_) => pattern.to_string(),
    }
}

/// Path with wildcards written the way API documents expect (`{*p}` → `{p}`).
#[must_use]
pub fn document_path(pattern: &str) -> String {
    pattern.replace("{*", "{")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slash_normalization() {
        assert_eq!(join_paths(&["foo"], "/"), "/foo");
        assert_eq!(join_paths(&["foo/"], "/"), "/foo/");
        assert_eq!(join_paths(&[], "/foo/"), "/foo/");
        assert_eq!(join_paths(&["/foo"], "/./"), "/foo/");
        assert_eq!(join_paths(&["foo"], "/bar/"), "/foo/bar/");
    }

    #[test]
    fn nested_bases_and_cleanup() {
        assert_eq!(join_paths(&["/api", "items"], "/{id}"), "/api/items/{id}");
        assert_eq!(join_paths(&["/api/", "items/"], "/"), "/api/items/");
        assert_eq!(join_paths(&["/api", ""], "/"), "/api");
        assert_eq!(join_paths(&["/api"], "a//b/../c"), "/api/a/c");
        assert_eq!(join_paths(&[], "/"), "/");
        assert_eq!(join_paths(&[], ""), "/");
    }

    #[test]
    fn absolute_paths_ignore_bases() {
        assert_eq!(join_paths(&["/api", "items"], "//health"), "/health");
    }

    #[test]
    fn params_in_template_order() {
        let params = path_params("/a/{b}/c/{a}/{*rest}");
        let names: Vec<_> = params.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["b", "a", "rest"]);
        assert!(params[2].wildcard);
        assert!(!params[0].wildcard);
    }

    #[test]
    fn canonical_erases_names() {
        assert_eq!(
            canonical_pattern("/items/{id}"),
            canonical_pattern("/items/{item_id}")
        );
        assert_eq!(canonical_pattern("/s/{*path}"), "/s/{*}");
    }
}
