//! Tags, extensions and suppression read from metadata.

use super::OrderedMap;
use crate::model::{Meta, ServiceModel, META_EXTENSION_PREFIX, META_TAG_PREFIX};
use serde_json::Value;

/// Value of an extension: JSON when the text parses as JSON, else a string.
/// Several values become an array.
fn extension_value(values: &[String]) -> Value {
    let parse = |v: &String| serde_json::from_str(v).unwrap_or_else(|_| Value::String(v.clone()));
    match values {
        [] => Value::Null,
        [single] => parse(single),
        many => Value::Array(many.iter().map(parse).collect()),
    }
}

/// Extensions of the scopes, widest first. A narrower scope replaces a key
/// set by a wider one.
#[must_use]
pub fn merged_extensions(scopes: &[&Meta]) -> OrderedMap<Value> {
    let mut out = OrderedMap::new();
    for meta in scopes {
        for (key, values) in meta.with_prefix(META_EXTENSION_PREFIX) {
            if key.starts_with("x-") {
                out.insert(key, extension_value(values));
            }
        }
    }
    out
}

/// Tag names of the scopes, widest first, without duplicates.
#[must_use]
pub fn tag_names(scopes: &[&Meta]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for meta in scopes {
        for (key, _) in meta.with_prefix(META_TAG_PREFIX) {
            let name = key.split(':').next().unwrap_or(key);
            if !name.is_empty() && !out.iter().any(|t| t == name) {
                out.push(name.to_string());
            }
        }
    }
    out
}

/// Whether any of `tags` is declared with `openapi:generate: false`.
#[must_use]
pub fn has_suppressed_tag(model: &ServiceModel, tags: &[String]) -> bool {
    model
        .api
        .tags
        .iter()
        .any(|t| !t.meta.generates() && tags.contains(&t.name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn narrower_scalar_wins_and_tags_accumulate() {
        let api = Meta::new()
            .with("openapi:extension:x-owner", "platform")
            .with("openapi:extension:x-rate", "10")
            .with("openapi:tag:Public", "");
        let service = Meta::new()
            .with("openapi:extension:x-owner", "items-team")
            .with("openapi:tag:Items", "")
            .with("openapi:tag:Public", "");
        let method = Meta::new()
            .with("openapi:extension:x-rate", "{\"burst\": 5}")
            .with("openapi:tag:Items:desc", "Item operations");

        let ext = merged_extensions(&[&api, &service, &method]);
        assert_eq!(ext.get("x-owner"), Some(&json!("items-team")));
        assert_eq!(ext.get("x-rate"), Some(&json!({"burst": 5})));
        assert_eq!(ext.keys().collect::<Vec<_>>(), vec!["x-owner", "x-rate"]);

        let tags = tag_names(&[&api, &service, &method]);
        assert_eq!(tags, vec!["Public".to_string(), "Items".to_string()]);
    }
}
