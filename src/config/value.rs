// ABOUTME: Dynamically typed configuration values.
// ABOUTME: Parsed from YAML/JSON descriptors and snapshotted into deployment history.

use serde::de::{self, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A mapping of string keys to values. Ordered so snapshots are deterministic.
pub type Mapping = BTreeMap<String, Value>;

/// A configuration value as found in a deployment descriptor.
///
/// Mapping keys are always strings: scalar keys such as `8080:` or `true:`
/// are read as their textual form.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    Sequence(Vec<Value>),
    Mapping(Mapping),
}

/// The variant of a [`Value`], used in type mismatch errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Null,
    Bool,
    Integer,
    Float,
    String,
    Sequence,
    Mapping,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueKind::Null => "null",
            ValueKind::Bool => "boolean",
            ValueKind::Integer => "integer",
            ValueKind::Float => "float",
            ValueKind::String => "string",
            ValueKind::Sequence => "sequence",
            ValueKind::Mapping => "mapping",
        };
        f.write_str(name)
    }
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Null => ValueKind::Null,
            Value::Bool(_) => ValueKind::Bool,
            Value::Integer(_) => ValueKind::Integer,
            Value::Float(_) => ValueKind::Float,
            Value::String(_) => ValueKind::String,
            Value::Sequence(_) => ValueKind::Sequence,
            Value::Mapping(_) => ValueKind::Mapping,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_mapping(&self) -> Option<&Mapping> {
        match self {
            Value::Mapping(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[Value]> {
        match self {
            Value::Sequence(s) => Some(s),
            _ => None,
        }
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(ValueVisitor)
    }
}

struct ValueVisitor;

impl<'de> Visitor<'de> for ValueVisitor {
    type Value = Value;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a configuration value")
    }

    fn visit_unit<E: de::Error>(self) -> Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_none<E: de::Error>(self) -> Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_some<D>(self, deserializer: D) -> Result<Value, D::Error>
    where
        D: Deserializer<'de>,
    {
        Value::deserialize(deserializer)
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<Value, E> {
        Ok(Value::Bool(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Value, E> {
        Ok(Value::Integer(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Value, E> {
        Ok(i64::try_from(v).map_or(Value::Float(v as f64), Value::Integer))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Value, E> {
        Ok(Value::Float(v))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Value, E> {
        Ok(Value::String(v.to_owned()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<Value, E> {
        Ok(Value::String(v))
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<Value, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(item) = seq.next_element()? {
            items.push(item);
        }
        Ok(Value::Sequence(items))
    }

    fn visit_map<A>(self, mut map: A) -> Result<Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut entries = Mapping::new();
        while let Some((MapKey(key), value)) = map.next_entry()? {
            entries.insert(key, value);
        }
        Ok(Value::Mapping(entries))
    }
}

/// A mapping key, stringified if the document used a scalar.
struct MapKey(String);

impl<'de> Deserialize<'de> for MapKey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(MapKeyVisitor).map(MapKey)
    }
}

struct MapKeyVisitor;

impl Visitor<'_> for MapKeyVisitor {
    type Value = String;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a scalar mapping key")
    }

    fn visit_unit<E: de::Error>(self) -> Result<String, E> {
        Ok("null".to_string())
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<String, E> {
        Ok(v.to_string())
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<String, E> {
        Ok(v.to_string())
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<String, E> {
        Ok(v.to_string())
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<String, E> {
        Ok(v.to_string())
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<String, E> {
        Ok(v.to_owned())
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<String, E> {
        Ok(v)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Integer(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::String(s) => f.write_str(s),
            Value::Sequence(_) | Value::Mapping(_) => match serde_json::to_string(self) {
                Ok(json) => f.write_str(&json),
                Err(_) => write!(f, "<{}>", self.kind()),
            },
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<Mapping> for Value {
    fn from(m: Mapping) -> Self {
        Value::Mapping(m)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_yaml_scalars_and_collections() {
        let yaml = r#"
type: docker
port: 8080
auto_approve: true
ratio: 0.5
missing: ~
pre_deploy:
  - type: file_check
    path: Dockerfile
build:
  dockerfile: Dockerfile.prod
"#;
        let value: Value = serde_yaml::from_str(yaml).unwrap();
        let map = value.as_mapping().unwrap();

        assert_eq!(map["type"].as_str(), Some("docker"));
        assert_eq!(map["port"].as_i64(), Some(8080));
        assert_eq!(map["auto_approve"].as_bool(), Some(true));
        assert_eq!(map["ratio"].kind(), ValueKind::Float);
        assert_eq!(map["missing"], Value::Null);
        assert_eq!(map["pre_deploy"].as_sequence().unwrap().len(), 1);
        assert_eq!(
            map["build"].as_mapping().unwrap()["dockerfile"].as_str(),
            Some("Dockerfile.prod")
        );
    }

    #[test]
    fn scalar_keys_become_strings() {
        let yaml = r#"
ports:
  8080: 80
  8443: 443
flags:
  true: enabled
nested:
  listeners:
    - 9000: metrics
"#;
        let value: Value = serde_yaml::from_str(yaml).unwrap();
        let map = value.as_mapping().unwrap();

        let ports = map["ports"].as_mapping().unwrap();
        assert_eq!(ports["8080"].as_i64(), Some(80));
        assert_eq!(ports["8443"].as_i64(), Some(443));
        assert_eq!(map["flags"].as_mapping().unwrap()["true"].as_str(), Some("enabled"));

        let listeners = map["nested"].as_mapping().unwrap()["listeners"]
            .as_sequence()
            .unwrap();
        assert_eq!(
            listeners[0].as_mapping().unwrap()["9000"].as_str(),
            Some("metrics")
        );
    }

    #[test]
    fn reads_history_snapshot_json() {
        let value: Value =
            serde_json::from_str(r#"{"replicas": 3, "ratio": 0.25, "tags": ["a", null]}"#).unwrap();
        let map = value.as_mapping().unwrap();

        assert_eq!(map["replicas"], Value::Integer(3));
        assert_eq!(map["ratio"], Value::Float(0.25));
        assert_eq!(
            map["tags"],
            Value::Sequence(vec![Value::from("a"), Value::Null])
        );
    }

    #[test]
    fn accessors_reject_other_variants() {
        let value = Value::from("8080");
        assert_eq!(value.as_i64(), None);
        assert_eq!(value.as_bool(), None);
        assert!(value.as_mapping().is_none());
    }

    #[test]
    fn serializes_to_plain_json() {
        let mut map = Mapping::new();
        map.insert("port".to_string(), Value::from(8080));
        map.insert("type".to_string(), Value::from("docker"));

        let json = serde_json::to_string(&Value::Mapping(map)).unwrap();
        assert_eq!(json, r#"{"port":8080,"type":"docker"}"#);
    }
}
