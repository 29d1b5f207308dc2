//! The versioned document and its total order.

use crate::error::{CodecError, CodecResult, ComparisonError};
use crate::json;
use crate::value::Value;
use serde::de::{Deserialize, Deserializer};
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Key of the stable document identifier.
pub const ID_FIELD: &str = "_id";
/// Key of the revision stamped by the owning store.
pub const REV_FIELD: &str = "_rev";
/// Key of the tombstone flag.
pub const DELETED_FIELD: &str = "_deleted";

/// Returns true for the keys the replication layer owns.
pub fn is_reserved(key: &str) -> bool {
    matches!(key, ID_FIELD | REV_FIELD | DELETED_FIELD)
}

/// A flat, versioned record.
///
/// Fields are kept in a `BTreeMap`, so iteration and serialization are in
/// sorted key order. A document always carries a string `_id`; `_rev`, when
/// present, is a non-negative integer and `_deleted` is a boolean. Every
/// mutator checks those rules, so an invalid document cannot be built.
///
/// Equality is structural. Use [`Document::compare`] for the replication
/// tie-break order.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Document {
    fields: BTreeMap<String, Value>,
}

impl Document {
    /// Creates a document holding only `_id`.
    pub fn new(id: impl Into<String>) -> Self {
        let mut fields = BTreeMap::new();
        fields.insert(ID_FIELD.to_string(), Value::Text(id.into()));
        Self { fields }
    }

    /// Builds a document from a field map, validating the reserved keys.
    pub fn from_fields(fields: BTreeMap<String, Value>) -> CodecResult<Self> {
        if !fields.contains_key(ID_FIELD) {
            return Err(CodecError::MissingId);
        }
        for (key, value) in &fields {
            check_reserved(key, value)?;
        }
        Ok(Self { fields })
    }

    /// Builder form of [`Document::set`].
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> CodecResult<Self> {
        self.set(key, value)?;
        Ok(self)
    }

    /// The document identifier.
    pub fn id(&self) -> &str {
        self.fields
            .get(ID_FIELD)
            .and_then(Value::as_text)
            .unwrap_or_default()
    }

    /// The stored revision, if one has been assigned.
    pub fn rev(&self) -> Option<u64> {
        self.fields
            .get(REV_FIELD)
            .and_then(Value::as_integer)
            .and_then(|n| u64::try_from(n).ok())
    }

    /// Stamps a revision.
    pub fn set_rev(&mut self, rev: u64) -> CodecResult<()> {
        let rev = i64::try_from(rev).map_err(|_| CodecError::RevisionOverflow { rev })?;
        self.fields.insert(REV_FIELD.to_string(), Value::Integer(rev));
        Ok(())
    }

    /// Removes the revision, marking the document as not yet stored.
    pub fn clear_rev(&mut self) {
        self.fields.remove(REV_FIELD);
    }

    /// Returns true if this document is a tombstone.
    pub fn is_deleted(&self) -> bool {
        self.fields
            .get(DELETED_FIELD)
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    /// Sets or clears the tombstone flag. Clearing removes the key.
    pub fn set_deleted(&mut self, deleted: bool) {
        if deleted {
            self.fields.insert(DELETED_FIELD.to_string(), Value::Bool(true));
        } else {
            self.fields.remove(DELETED_FIELD);
        }
    }

    /// Looks up a field.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Sets a field, returning the previous value.
    ///
    /// Reserved keys are accepted only with a value of the right kind.
    pub fn set(
        &mut self,
        key: impl Into<String>,
        value: impl Into<Value>,
    ) -> CodecResult<Option<Value>> {
        let key = key.into();
        let value = value.into();
        check_reserved(&key, &value)?;
        Ok(self.fields.insert(key, value))
    }

    /// Removes a field. `_id` cannot be removed.
    pub fn remove(&mut self, key: &str) -> CodecResult<Option<Value>> {
        if key == ID_FIELD {
            return Err(CodecError::MissingId);
        }
        Ok(self.fields.remove(key))
    }

    /// Number of fields, reserved ones included.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Always false: a document holds at least `_id`.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterates fields in sorted key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Borrows the underlying field map.
    pub fn fields(&self) -> &BTreeMap<String, Value> {
        &self.fields
    }

    /// Consumes the document, returning its field map.
    pub fn into_fields(self) -> BTreeMap<String, Value> {
        self.fields
    }

    /// Deterministic total order used to break revision ties.
    ///
    /// Documents with fewer fields sort first. With equal counts the sorted
    /// key lists are compared position by position. With identical keys the
    /// values are compared key by key, `null` sorting before any other
    /// value. Two non-null values of different kinds under one key have no
    /// order and produce a [`ComparisonError`].
    pub fn compare(&self, other: &Document) -> Result<Ordering, ComparisonError> {
        let by_len = self.fields.len().cmp(&other.fields.len());
        if by_len != Ordering::Equal {
            return Ok(by_len);
        }

        for (a, b) in self.fields.keys().zip(other.fields.keys()) {
            let by_key = a.cmp(b);
            if by_key != Ordering::Equal {
                return Ok(by_key);
            }
        }

        for ((key, a), b) in self.fields.iter().zip(other.fields.values()) {
            match a.partial_order(b) {
                Some(Ordering::Equal) => {}
                Some(order) => return Ok(order),
                None => {
                    return Err(ComparisonError {
                        key: key.clone(),
                        left: a.kind(),
                        right: b.kind(),
                    })
                }
            }
        }

        Ok(Ordering::Equal)
    }
}

fn check_reserved(key: &str, value: &Value) -> CodecResult<()> {
    let expected = match (key, value) {
        (ID_FIELD, Value::Text(_)) => return Ok(()),
        (ID_FIELD, _) => "a string",
        (REV_FIELD, Value::Integer(n)) if *n >= 0 => return Ok(()),
        (REV_FIELD, _) => "a non-negative integer",
        (DELETED_FIELD, Value::Bool(_)) => return Ok(()),
        (DELETED_FIELD, _) => "a boolean",
        _ => return Ok(()),
    };
    Err(CodecError::InvalidReservedField {
        field: key.to_string(),
        expected,
        found: value.kind(),
    })
}

impl Serialize for Document {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (key, value) in &self.fields {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Document {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = serde_json::Value::deserialize(deserializer)?;
        json::from_json_value(raw).map_err(serde::de::Error::custom)
    }
}
