/// Ordered metadata attached to API, service, method, tag or attribute
/// declarations.
///
/// Keys may repeat; lookups honour declaration order (the last value of a key
/// wins for scalar reads).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Meta {
    entries: Vec<(String, Vec<String>)>,
}

/// Metadata key that suppresses a method, service or tag from API documents.
pub const META_GENERATE: &str = "openapi:generate";
/// Prefix for tag assignment keys (`openapi:tag:<Name>`).
pub const META_TAG_PREFIX: &str = "openapi:tag:";
/// Prefix for document extension keys (`openapi:extension:x-...`).
pub const META_EXTENSION_PREFIX: &str = "openapi:extension:";
/// Overrides the generated operation summary.
pub const META_SUMMARY: &str = "openapi:summary";
/// Overrides the generated operation id.
pub const META_OPERATION_ID: &str = "openapi:operationId";

impl Meta {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, key: impl Into<String>, values: Vec<String>) {
        self.entries.push((key.into(), values));
    }

    /// Builder form of [`Meta::push`] for a single value.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.push(key, vec![value.into()]);
        self
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Last value declared for `key`.
    #[must_use]
    pub fn last(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .and_then(|(_, v)| v.last())
            .map(String::as_str)
    }

    /// Entries whose key starts with `prefix`, with the prefix stripped.
    pub fn with_prefix<'a>(
        &'a self,
        prefix: &'a str,
    ) -> impl Iterator<Item = (&'a str, &'a [String])> + 'a {
        self.entries.iter().filter_map(move |(k, v)| {
            k.strip_prefix(prefix).map(|rest| (rest, v.as_slice()))
        })
    }

    /// True unless `openapi:generate` is explicitly set to `false`.
    #[must_use]
    pub fn generates(&self) -> bool {
        !matches!(self.last(META_GENERATE), Some(v) if v.eq_ignore_ascii_case("false"))
    }
}
