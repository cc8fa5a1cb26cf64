//! Model definition documents
//!
//! A model definition is a YAML mapping with a `name` and optional `encoder`
//! and `decoder` sections. Each section is either a mapping or a list of
//! mappings; artifact URLs live under keys containing `model_path`.
//!
//! Lists are only iterated at the section level. A list nested deeper inside a
//! section is not searched, so URLs inside such lists are never found.
//!
//! A key repeated within one mapping is not an error: the last occurrence
//! wins, at the position of the first.

use std::fmt;
use std::path::{Path, PathBuf};
use anyhow::{Context, Result};
use serde::de::{Deserialize, Deserializer, EnumAccess, MapAccess, SeqAccess, VariantAccess, Visitor};
use serde_yaml::value::{Tag, TaggedValue};
use serde_yaml::{Mapping, Value};
use tracing::debug;

use common::error::Error;

/// Output directory label for documents without a usable `name`
pub const UNKNOWN_MODEL_NAME: &str = "unknown";

/// Key fragment that marks an artifact location
pub const MODEL_PATH_KEY: &str = "model_path";

/// Top-level sections searched for artifact URLs, in order
pub const MODEL_SECTIONS: [&str; 2] = ["encoder", "decoder"];

/// A parsed model definition document
#[derive(Debug, Clone)]
pub struct ModelDocument {
    /// File the document was read from
    source: Option<PathBuf>,

    /// Root mapping
    root: Mapping,
}

impl ModelDocument {
    /// Parses a document from YAML text
    pub fn parse(text: &str) -> Result<Self> {
        let LastWins(value) = serde_yaml::from_str(text)
            .map_err(|e| Error::Document(format!("Invalid YAML: {}", e)))?;

        match value {
            Value::Mapping(root) => Ok(Self { source: None, root }),
            other => Err(Error::Document(format!(
                "Expected a mapping at the document root, found {}",
                value_kind(&other)
            )).into()),
        }
    }

    /// Reads and parses a document from disk
    pub async fn load(path: &Path) -> Result<Self> {
        let text = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;

        let mut document = Self::parse(&text)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        document.source = Some(path.to_path_buf());

        Ok(document)
    }

    /// Gets the file the document was read from
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// Gets the declared model name, used as the output directory label
    ///
    /// Numbers and booleans are rendered as text. A missing, empty, or
    /// structured `name` falls back to [`UNKNOWN_MODEL_NAME`].
    pub fn name(&self) -> String {
        let name = match self.root.get("name") {
            Some(Value::String(name)) => name.clone(),
            Some(Value::Number(number)) => number.to_string(),
            Some(Value::Bool(flag)) => flag.to_string(),
            _ => String::new(),
        };

        if name.is_empty() {
            UNKNOWN_MODEL_NAME.to_string()
        } else {
            name
        }
    }

    /// Collects artifact URLs from the `encoder` and `decoder` sections
    ///
    /// URLs are returned in document order, duplicates included.
    pub fn model_urls(&self) -> Vec<String> {
        let mut urls = Vec::new();

        for section in MODEL_SECTIONS {
            match self.root.get(section) {
                Some(Value::Mapping(mapping)) => collect_urls(mapping, &mut urls),
                Some(Value::Sequence(items)) => {
                    for item in items {
                        if let Value::Mapping(mapping) = item {
                            collect_urls(mapping, &mut urls);
                        }
                    }
                }
                Some(other) => {
                    debug!("Ignoring {} section of kind {}", section, value_kind(other));
                }
                None => {}
            }
        }

        urls
    }
}

/// Recursively extracts artifact URLs from a mapping
pub fn extract_urls(mapping: &Mapping) -> Vec<String> {
    let mut urls = Vec::new();
    collect_urls(mapping, &mut urls);
    urls
}

fn collect_urls(mapping: &Mapping, urls: &mut Vec<String>) {
    for (key, value) in mapping {
        match value {
            Value::String(candidate) => {
                let is_model_path = key.as_str().map_or(false, is_model_path_key);
                if is_model_path && is_remote_url(candidate) {
                    urls.push(candidate.clone());
                }
            }
            Value::Mapping(nested) => collect_urls(nested, urls),
            _ => {}
        }
    }
}

/// Checks whether a key names an artifact location
pub fn is_model_path_key(key: &str) -> bool {
    key.to_lowercase().contains(MODEL_PATH_KEY)
}

/// Checks whether a value is an absolute HTTP(S) URL
pub fn is_remote_url(value: &str) -> bool {
    value.starts_with("http://") || value.starts_with("https://")
}

/// YAML value whose mappings keep the last of any repeated keys
struct LastWins(Value);

impl<'de> Deserialize<'de> for LastWins {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(LastWinsVisitor).map(LastWins)
    }
}

struct LastWinsVisitor;

impl<'de> Visitor<'de> for LastWinsVisitor {
    type Value = Value;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("any YAML value")
    }

    fn visit_bool<E>(self, v: bool) -> std::result::Result<Value, E> {
        Ok(Value::Bool(v))
    }

    fn visit_i64<E>(self, v: i64) -> std::result::Result<Value, E> {
        Ok(Value::Number(v.into()))
    }

    fn visit_u64<E>(self, v: u64) -> std::result::Result<Value, E> {
        Ok(Value::Number(v.into()))
    }

    fn visit_f64<E>(self, v: f64) -> std::result::Result<Value, E> {
        Ok(Value::Number(v.into()))
    }

    fn visit_str<E>(self, v: &str) -> std::result::Result<Value, E> {
        Ok(Value::String(v.to_owned()))
    }

    fn visit_string<E>(self, v: String) -> std::result::Result<Value, E> {
        Ok(Value::String(v))
    }

    fn visit_unit<E>(self) -> std::result::Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_none<E>(self) -> std::result::Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_some<D>(self, deserializer: D) -> std::result::Result<Value, D::Error>
    where
        D: Deserializer<'de>,
    {
        LastWins::deserialize(deserializer).map(|LastWins(value)| value)
    }

    fn visit_seq<A>(self, mut seq: A) -> std::result::Result<Value, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let mut items = Vec::new();
        while let Some(LastWins(item)) = seq.next_element()? {
            items.push(item);
        }
        Ok(Value::Sequence(items))
    }

    fn visit_map<A>(self, mut map: A) -> std::result::Result<Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut mapping = Mapping::new();
        while let Some((LastWins(key), LastWins(value))) = map.next_entry()? {
            mapping.insert(key, value);
        }
        Ok(Value::Mapping(mapping))
    }

    fn visit_enum<A>(self, data: A) -> std::result::Result<Value, A::Error>
    where
        A: EnumAccess<'de>,
    {
        let (tag, variant): (String, _) = data.variant()?;
        let LastWins(value) = variant.newtype_variant()?;
        Ok(Value::Tagged(Box::new(TaggedValue { tag: Tag::new(tag), value })))
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Sequence(_) => "sequence",
        Value::Mapping(_) => "mapping",
        Value::Tagged(_) => "tagged value",
    }
}
