//! Typed property-list node tree and its conversion to [`plist::Value`].

use crate::bundler::error::{Error, Result};
use plist::Value;

/// One property-list node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PlistValue {
    /// `<string>`
    String(String),
    /// `<true/>` or `<false/>`
    Bool(bool),
    /// `<array>`
    Array(Vec<PlistValue>),
    /// `<dict>` with keys in insertion order
    Dict(Dict),
    /// Caller-typed scalar, e.g. `<integer>3</integer>`
    Typed {
        /// Element name
        kind: String,
        /// Text content
        value: String,
    },
}

impl PlistValue {
    /// Array of strings.
    pub fn strings<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        PlistValue::Array(
            values
                .into_iter()
                .map(|v| PlistValue::String(v.into()))
                .collect(),
        )
    }
}

/// Ordered dictionary node.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Dict(Vec<(String, PlistValue)>);

impl Dict {
    /// Empty dictionary.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an entry.
    pub fn insert(&mut self, key: impl Into<String>, value: PlistValue) -> &mut Self {
        self.0.push((key.into(), value));
        self
    }

    /// Appends a string entry.
    pub fn string(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.insert(key, PlistValue::String(value.into()))
    }

    /// Appends a string entry when `value` is set.
    pub fn string_opt(&mut self, key: &str, value: Option<&str>) -> &mut Self {
        if let Some(value) = value {
            self.string(key, value);
        }
        self
    }

    /// Appends a boolean entry.
    pub fn bool(&mut self, key: impl Into<String>, value: bool) -> &mut Self {
        self.insert(key, PlistValue::Bool(value))
    }

    /// Appends a string array when `values` is set.
    pub fn strings_opt(&mut self, key: &str, values: Option<&[String]>) -> &mut Self {
        if let Some(values) = values {
            self.insert(key, PlistValue::strings(values.iter().cloned()));
        }
        self
    }

    /// Keys in write order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(k, _)| k.as_str())
    }

    /// Converts to a [`plist::Dictionary`], keeping insertion order.
    pub fn to_dictionary(&self) -> Result<plist::Dictionary> {
        let mut dict = plist::Dictionary::new();
        for (key, value) in &self.0 {
            dict.insert(key.clone(), value.to_value()?);
        }
        Ok(dict)
    }

    /// Serializes a complete XML property-list document with this dict as root.
    pub fn to_xml(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        Value::Dictionary(self.to_dictionary()?).to_writer_xml(&mut buf)?;
        Ok(buf)
    }
}

impl PlistValue {
    /// Converts to a [`plist::Value`].
    ///
    /// Typed scalars accept `integer`, `real` and `string`; their text must
    /// parse as that kind.
    pub fn to_value(&self) -> Result<Value> {
        Ok(match self {
            PlistValue::String(s) => Value::String(s.clone()),
            PlistValue::Bool(b) => Value::Boolean(*b),
            PlistValue::Array(items) => Value::Array(
                items
                    .iter()
                    .map(PlistValue::to_value)
                    .collect::<Result<Vec<_>>>()?,
            ),
            PlistValue::Dict(dict) => Value::Dictionary(dict.to_dictionary()?),
            PlistValue::Typed { kind, value } => typed_scalar(kind, value)?,
        })
    }
}

fn typed_scalar(kind: &str, value: &str) -> Result<Value> {
    let invalid = || Error::Configuration(format!("plist entry value {value:?} is not a valid {kind}"));
    match kind {
        "integer" => value
            .trim()
            .parse::<i64>()
            .map(|n| Value::Integer(n.into()))
            .map_err(|_| invalid()),
        "real" => value
            .trim()
            .parse::<f64>()
            .map(Value::Real)
            .map_err(|_| invalid()),
        "string" => Ok(Value::String(value.to_string())),
        other => Err(Error::Configuration(format!(
            "unsupported plist entry type {other:?}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_has_apple_header_and_ordered_keys() {
        let mut root = Dict::new();
        root.string("CFBundleName", "Foo").bool("LSUIElement", true);
        root.insert("Empty", PlistValue::Dict(Dict::new()));
        root.insert(
            "FooLevel",
            PlistValue::Typed {
                kind: "integer".into(),
                value: "3".into(),
            },
        );

        let xml = String::from_utf8(root.to_xml().unwrap()).unwrap();
        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(xml.contains("<!DOCTYPE plist PUBLIC \"-//Apple//DTD PLIST 1.0//EN\""));
        assert!(xml.contains("<plist version=\"1.0\">"));
        assert!(xml.contains("<true/>"));
        assert!(xml.contains("<integer>3</integer>"));

        let parsed = Value::from_reader_xml(xml.as_bytes()).unwrap();
        let keys: Vec<&str> = parsed
            .as_dictionary()
            .unwrap()
            .keys()
            .map(|k| k.as_str())
            .collect();
        assert_eq!(keys, vec!["CFBundleName", "LSUIElement", "Empty", "FooLevel"]);
    }

    #[test]
    fn text_is_escaped() {
        let mut root = Dict::new();
        root.string("NSHumanReadableCopyright", "<Foo & \"Bar\">");
        let xml = root.to_xml().unwrap();
        let parsed = Value::from_reader_xml(xml.as_slice()).unwrap();
        assert_eq!(
            parsed
                .as_dictionary()
                .and_then(|d| d.get("NSHumanReadableCopyright"))
                .and_then(|v| v.as_string()),
            Some("<Foo & \"Bar\">")
        );
    }

    #[test]
    fn typed_entries_must_parse() {
        let real = PlistValue::Typed {
            kind: "real".into(),
            value: "1.5".into(),
        };
        assert_eq!(real.to_value().unwrap(), Value::Real(1.5));

        let bad = PlistValue::Typed {
            kind: "integer".into(),
            value: "three".into(),
        };
        assert!(matches!(bad.to_value(), Err(Error::Configuration(_))));

        let unknown = PlistValue::Typed {
            kind: "date".into(),
            value: "2017".into(),
        };
        assert!(matches!(unknown.to_value(), Err(Error::Configuration(_))));
    }
}
