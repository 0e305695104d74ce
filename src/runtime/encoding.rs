//! Body encoders and content negotiation.

use super::error::{DecodeError, EncodeError};
use serde_json::Value;

pub const JSON: &str = "application/json";
pub const XML: &str = "application/xml";
pub const YAML: &str = "application/yaml";

/// Encodes and decodes bodies for one media type.
pub trait Encoder: Send + Sync {
    fn content_type(&self) -> &'static str;

    /// Whether this encoder handles `media_type` (parameters already
    /// stripped, lowercase).
    fn accepts(&self, media_type: &str) -> bool;

    /// # Errors
    ///
    /// Fails when the value cannot be represented in this format.
    fn encode(&self, value: &Value) -> Result<Vec<u8>, EncodeError>;

    /// # Errors
    ///
    /// Returns [`DecodeError::InvalidBody`] for malformed input.
    fn decode(&self, body: &[u8]) -> Result<Value, DecodeError>;

    /// Text formats that cannot distinguish `"1"` from `1`.
    fn is_lenient(&self) -> bool {
        false
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct JsonEncoder;

impl Encoder for JsonEncoder {
    fn content_type(&self) -> &'static str {
        JSON
    }

    fn accepts(&self, media_type: &str) -> bool {
        media_type == JSON || media_type.ends_with("+json") || media_type == "text/json"
    }

    fn encode(&self, value: &Value) -> Result<Vec<u8>, EncodeError> {
        Ok(serde_json::to_vec(value)?)
    }

    fn decode(&self, body: &[u8]) -> Result<Value, DecodeError> {
        serde_json::from_slice(body).map_err(|e| DecodeError::InvalidBody {
            reason: e.to_string(),
        })
    }
}

/// XML bodies, rooted at a configurable element.
#[derive(Debug, Clone)]
pub struct XmlEncoder {
    root: String,
}

impl Default for XmlEncoder {
    fn default() -> Self {
        Self {
            root: "response".to_string(),
        }
    }
}

impl XmlEncoder {
    #[must_use]
    pub fn with_root(root: impl Into<String>) -> Self {
        Self { root: root.into() }
    }
}

impl Encoder for XmlEncoder {
    fn content_type(&self) -> &'static str {
        XML
    }

    fn accepts(&self, media_type: &str) -> bool {
        media_type == XML || media_type == "text/xml" || media_type.ends_with("+xml")
    }

    fn encode(&self, value: &Value) -> Result<Vec<u8>, EncodeError> {
        quick_xml::se::to_string_with_root(&self.root, value)
            .map(String::into_bytes)
            .map_err(|e| EncodeError::Xml(e.to_string()))
    }

    fn decode(&self, body: &[u8]) -> Result<Value, DecodeError> {
        quick_xml::de::from_reader(body).map_err(|e: quick_xml::DeError| DecodeError::InvalidBody {
            reason: e.to_string(),
        })
    }

    fn is_lenient(&self) -> bool {
        true
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct YamlEncoder;

impl Encoder for YamlEncoder {
    fn content_type(&self) -> &'static str {
        YAML
    }

    fn accepts(&self, media_type: &str) -> bool {
        matches!(
            media_type,
            YAML | "application/x-yaml" | "text/yaml" | "text/x-yaml"
        )
    }

    fn encode(&self, value: &Value) -> Result<Vec<u8>, EncodeError> {
        Ok(serde_yaml::to_string(value)?.into_bytes())
    }

    fn decode(&self, body: &[u8]) -> Result<Value, DecodeError> {
        serde_yaml::from_slice(body).map_err(|e| DecodeError::InvalidBody {
            reason: e.to_string(),
        })
    }
}

/// Ordered set of encoders. The first one is the default.
pub struct EncoderSet {
    encoders: Vec<Box<dyn Encoder>>,
}

impl Default for EncoderSet {
    /// JSON (default), XML and YAML.
    fn default() -> Self {
        Self::new(vec![
            Box::new(JsonEncoder),
            Box::new(XmlEncoder::default()),
            Box::new(YamlEncoder),
        ])
    }
}

impl std::fmt::Debug for EncoderSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.encoders.iter().map(|e| e.content_type()))
            .finish()
    }
}

/// Lowercase media type without parameters.
fn media_type(value: &str) -> String {
    value
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

impl EncoderSet {
    /// An empty list falls back to JSON alone.
    #[must_use]
    pub fn new(encoders: Vec<Box<dyn Encoder>>) -> Self {
        if encoders.is_empty() {
            return Self {
                encoders: vec![Box::new(JsonEncoder)],
            };
        }
        Self { encoders }
    }

    #[must_use]
    pub fn default_encoder(&self) -> &dyn Encoder {
        &*self.encoders[0]
    }

    /// Encoder handling `content_type`, if any.
    #[must_use]
    pub fn for_content_type(&self, content_type: &str) -> Option<&dyn Encoder> {
        let mt = media_type(content_type);
        self.encoders
            .iter()
            .find(|e| e.accepts(&mt))
            .map(|e| &**e)
    }

    /// Pick the response encoder for an `Accept` header.
    ///
    /// Media ranges are tried in descending `q` order (ties keep header
    /// order); `*/*`, a missing header or no match select the default.
    #[must_use]
    pub fn negotiate(&self, accept: Option<&str>) -> &dyn Encoder {
        let Some(accept) = accept else {
            return self.default_encoder();
        };
        let mut ranges: Vec<(f32, String)> = accept
            .split(',')
            .filter_map(|part| {
                let mut pieces = part.split(';');
                let mt = pieces.next()?.trim().to_ascii_lowercase();
                if mt.is_empty() {
                    return None;
                }
                let q = pieces
                    .filter_map(|p| p.trim().strip_prefix("q="))
                    .find_map(|q| q.parse::<f32>().ok())
                    .unwrap_or(1.0);
                Some((q, mt))
            })
            .filter(|(q, _)| *q > 0.0)
            .collect();
        ranges.sort_by(|a, b| b.0.total_cmp(&a.0));
        for (_, mt) in &ranges {
            if mt == "*/*" {
                return self.default_encoder();
            }
            if let Some(enc) = self.encoders.iter().find(|e| e.accepts(mt)) {
                return &**enc;
            }
            if let Some(prefix) = mt.strip_suffix("/*") {
                if let Some(enc) = self
                    .encoders
                    .iter()
                    .find(|e| e.content_type().starts_with(prefix))
                {
                    return &**enc;
                }
            }
        }
        self.default_encoder()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]
    use super::*;
    use serde_json::json;

    #[test]
    fn negotiation_honours_quality() {
        let set = EncoderSet::default();
        assert_eq!(set.negotiate(None).content_type(), JSON);
        assert_eq!(set.negotiate(Some("application/xml")).content_type(), XML);
        assert_eq!(
            set.negotiate(Some("application/xml;q=0.5, application/yaml")).content_type(),
            YAML
        );
        assert_eq!(set.negotiate(Some("text/html")).content_type(), JSON);
        assert_eq!(set.negotiate(Some("*/*")).content_type(), JSON);
        assert_eq!(
            set.negotiate(Some("application/problem+json")).content_type(),
            JSON
        );
    }

    #[test]
    fn content_type_lookup_strips_parameters() {
        let set = EncoderSet::default();
        let enc = set.for_content_type("application/json; charset=utf-8").unwrap();
        assert_eq!(enc.content_type(), JSON);
        assert!(set.for_content_type("multipart/form-data").is_none());
    }

    #[test]
    fn xml_encodes_objects_under_root() {
        let body = XmlEncoder::with_root("error")
            .encode(&json!({"message": "nope"}))
            .unwrap();
        let text = String::from_utf8(body).unwrap();
        assert!(text.starts_with("<error>"), "{text}");
        assert!(text.contains("<message>nope</message>"), "{text}");
    }

    #[test]
    fn yaml_round_trips_objects() {
        let enc = YamlEncoder;
        let value = json!({"a": 1, "b": ["x"]});
        let back = enc.decode(&enc.encode(&value).unwrap()).unwrap();
        assert_eq!(back, value);
    }
}
