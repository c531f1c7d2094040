use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Named physical coefficients (per fiber or amplifier type) in declaration order.
///
/// Order matters: an unknown type falls back to the first entry.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParameterTable {
    entries: Vec<(String, f64)>,
}

impl ParameterTable {
    pub fn new(entries: &[(&str, f64)]) -> Self {
        let mut table = ParameterTable::default();
        for (name, value) in entries {
            table.insert(name, *value);
        }
        table
    }

    /// Replaces the value of an existing entry in place, or appends a new one.
    pub fn insert(&mut self, name: &str, value: f64) {
        match self.entries.iter_mut().find(|(n, _)| n == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name.to_string(), value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, v)| *v)
    }

    pub fn first(&self) -> Option<f64> {
        self.entries.first().map(|(_, v)| *v)
    }

    /// Value for `name`, or the first entry when `name` is not configured.
    /// `None` only when the table is empty.
    pub fn lookup_or_first(&self, name: &str, table_name: &str) -> Option<f64> {
        self.get(name).or_else(|| {
            log::warn!("Illegal config detected. {} has no entry for type '{}', using the first entry.", table_name, name);
            self.first()
        })
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), *v))
    }
}

impl Serialize for ParameterTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

struct ParameterTableVisitor;

impl<'de> Visitor<'de> for ParameterTableVisitor {
    type Value = ParameterTable;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a map of type names to numbers")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> std::result::Result<Self::Value, A::Error> {
        let mut table = ParameterTable::default();
        while let Some((name, value)) = access.next_entry::<String, f64>()? {
            table.insert(&name, value);
        }
        Ok(table)
    }
}

impl<'de> Deserialize<'de> for ParameterTable {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_map(ParameterTableVisitor)
    }
}
