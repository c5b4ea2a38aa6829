//! Parsed header model
//!
//! A header is an ordered map of entries. Keys are unique; writing an
//! existing key replaces its entry in place.

use std::fmt;

use serde::ser::{Serialize, SerializeMap, Serializer};

use super::value::{coerce, Value};
use super::SEPARATOR;
use crate::error::{KpfError, KpfResult};

/// One header entry
#[derive(Debug, Clone, PartialEq)]
pub enum Entry {
    /// `@key value`
    Value(Value),
    /// `@key enable#~>type`, addressable as the mapping `{enable, type}`
    Flagged { enable: Value, kind: String },
}

impl Entry {
    /// Build an entry from the raw text after the key
    pub fn from_raw(raw: &str) -> Self {
        match raw.split_once(SEPARATOR) {
            Some((enable, kind)) => Entry::Flagged {
                enable: coerce(enable.trim()),
                kind: kind.trim().to_string(),
            },
            None => Entry::Value(coerce(raw)),
        }
    }

    /// Get the plain value, if this entry is not a mapping
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Entry::Value(v) => Some(v),
            Entry::Flagged { .. } => None,
        }
    }

    /// Check if this entry can be descended into
    pub fn is_mapping(&self) -> bool {
        matches!(self, Entry::Flagged { .. })
    }

    /// Resolve one field of a mapping-shaped entry
    ///
    /// The type tag is returned as a string value.
    pub fn field(&self, name: &str) -> Option<Entry> {
        match self {
            Entry::Flagged { enable, kind } => match name {
                "enable" => Some(Entry::Value(enable.clone())),
                "type" => Some(Entry::Value(Value::Str(kind.clone()))),
                _ => None,
            },
            Entry::Value(_) => None,
        }
    }

    fn validate(&self) -> KpfResult<()> {
        match self {
            Entry::Value(value) => validate_value(value),
            Entry::Flagged { enable, kind } => {
                validate_value(enable)?;
                if kind.is_empty() || kind.trim() != kind.as_str() || kind.contains(is_line_break) {
                    return Err(KpfError::Validation(format!(
                        "Invalid type tag '{}'",
                        kind
                    )));
                }
                Ok(())
            }
        }
    }
}

/// Values must survive a write/parse cycle unchanged
fn validate_value(value: &Value) -> KpfResult<()> {
    let text = value.to_string();
    if text.is_empty()
        || text.trim() != text
        || text.contains(is_line_break)
        || text.contains(SEPARATOR)
    {
        return Err(KpfError::Validation(format!(
            "Value '{}' cannot be written on a header line",
            text
        )));
    }
    if &coerce(&text) != value {
        return Err(KpfError::Validation(format!(
            "Value '{}' would be read back as a {}",
            text,
            coerce(&text).kind()
        )));
    }
    Ok(())
}

fn is_line_break(c: char) -> bool {
    c == '\n' || c == '\r'
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Entry::Value(v) => write!(f, "{}", v),
            Entry::Flagged { enable, kind } => write!(f, "{}{}{}", enable, SEPARATOR, kind),
        }
    }
}

impl From<Value> for Entry {
    fn from(value: Value) -> Self {
        Entry::Value(value)
    }
}

impl Serialize for Entry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Entry::Value(v) => v.serialize(serializer),
            Entry::Flagged { enable, kind } => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("enable", enable)?;
                map.serialize_entry("type", kind)?;
                map.end()
            }
        }
    }
}

/// Ordered collection of header entries
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Header {
    entries: Vec<(String, Entry)>,
}

impl Header {
    /// Create an empty header
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entry after checking that it can be serialized and read back
    pub fn insert(&mut self, key: impl Into<String>, entry: impl Into<Entry>) -> KpfResult<()> {
        let key = key.into();
        let entry = entry.into();

        if key.is_empty() || key.chars().any(char::is_whitespace) || key.contains(SEPARATOR) {
            return Err(KpfError::Validation(format!("Invalid header key '{}'", key)));
        }
        entry.validate()?;

        self.set(key, entry);
        Ok(())
    }

    /// Insert without validation; a later duplicate replaces the earlier entry
    pub(crate) fn set(&mut self, key: String, entry: Entry) {
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = entry,
            None => self.entries.push((key, entry)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Entry> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, e)| e)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn remove(&mut self, key: &str) -> Option<Entry> {
        let index = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(index).1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate entries in header order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Entry)> {
        self.entries.iter().map(|(k, e)| (k.as_str(), e))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }
}

impl Serialize for Header {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, entry) in &self.entries {
            map.serialize_entry(key, entry)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_from_raw() {
        assert_eq!(Entry::from_raw("true"), Entry::Value(Value::Bool(true)));
        assert_eq!(
            Entry::from_raw("3 #~> int"),
            Entry::Flagged {
                enable: Value::Int(3),
                kind: "int".into()
            }
        );
        // Only the first separator splits
        assert_eq!(
            Entry::from_raw("x#~>a#~>b"),
            Entry::Flagged {
                enable: Value::Str("x".into()),
                kind: "a#~>b".into()
            }
        );
    }

    #[test]
    fn test_entry_fields() {
        let entry = Entry::from_raw("true#~>AES-256-cbc");
        assert_eq!(entry.field("enable"), Some(Entry::Value(Value::Bool(true))));
        assert_eq!(
            entry.field("type"),
            Some(Entry::Value(Value::Str("AES-256-cbc".into())))
        );
        assert_eq!(entry.field("other"), None);
        assert_eq!(Entry::from_raw("5").field("enable"), None);
    }

    #[test]
    fn test_duplicate_key_overwrites_in_place() {
        let mut header = Header::new();
        header.set("a".into(), Entry::from_raw("1"));
        header.set("b".into(), Entry::from_raw("2"));
        header.set("a".into(), Entry::from_raw("3"));

        let keys: Vec<_> = header.keys().collect();
        assert_eq!(keys, vec!["a", "b"]);
        assert_eq!(header.get("a"), Some(&Entry::Value(Value::Int(3))));
    }

    #[test]
    fn test_insert_rejects_bad_keys() {
        let mut header = Header::new();
        assert!(header.insert("", Value::Int(1)).is_err());
        assert!(header.insert("two words", Value::Int(1)).is_err());
        assert!(header.insert("a#~>b", Value::Int(1)).is_err());
        assert!(header.insert("ok", Value::Int(1)).is_ok());
    }

    #[test]
    fn test_insert_rejects_unreadable_values() {
        let mut header = Header::new();
        assert!(header.insert("k", Value::Str(String::new())).is_err());
        assert!(header.insert("k", Value::Str("a\nb".into())).is_err());
        assert!(header.insert("k", Value::Str("3".into())).is_err());
        assert!(header.insert("k", Value::Str(" padded".into())).is_err());
        assert!(header
            .insert(
                "k",
                Entry::Flagged {
                    enable: Value::Bool(true),
                    kind: String::new()
                }
            )
            .is_err());
        assert!(header.is_empty());
    }

    #[test]
    fn test_serialize_preserves_order() {
        let mut header = Header::new();
        header.insert("zeta", Value::Bool(true)).unwrap();
        header
            .insert(
                "alpha",
                Entry::Flagged {
                    enable: Value::Int(3),
                    kind: "int".into(),
                },
            )
            .unwrap();

        let json = serde_json::to_string(&header).unwrap();
        assert_eq!(json, r#"{"zeta":true,"alpha":{"enable":3,"type":"int"}}"#);
    }

    #[test]
    fn test_remove() {
        let mut header = Header::new();
        header.insert("a", Value::Int(1)).unwrap();
        assert_eq!(header.remove("a"), Some(Entry::Value(Value::Int(1))));
        assert_eq!(header.remove("a"), None);
    }
}
