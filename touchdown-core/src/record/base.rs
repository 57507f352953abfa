//! Base implementation of records.
use crate::error::TouchdownError;
use chrono::prelude::{DateTime, Local};
use std::collections::hash_map::{Iter, Keys};
use std::collections::HashMap;

/// Represents possible types of values that can be stored in a [`Record`].
#[derive(Debug, Clone, PartialEq)]
pub enum RecordValue {
    /// A single floating-point value, like an episode return.
    Scalar(f32),

    /// A timestamp with local timezone.
    DateTime(DateTime<Local>),

    /// A text value, like an episode outcome.
    String(String),
}

/// A container for storing key-value pairs of various data types.
#[derive(Debug, Clone, Default)]
pub struct Record(HashMap<String, RecordValue>);

impl Record {
    /// Creates an empty record.
    pub fn empty() -> Self {
        Self(HashMap::new())
    }

    /// Creates a record containing a single scalar value.
    pub fn from_scalar(name: impl Into<String>, value: f32) -> Self {
        let mut record = Self::empty();
        record.insert(name, RecordValue::Scalar(value));
        record
    }

    /// Creates a record from a slice of key-value pairs.
    pub fn from_slice<K: Into<String> + Clone>(s: &[(K, RecordValue)]) -> Self {
        Self(
            s.iter()
                .map(|(k, v)| (k.clone().into(), v.clone()))
                .collect(),
        )
    }

    /// Returns an iterator over the keys in the record.
    pub fn keys(&self) -> Keys<String, RecordValue> {
        self.0.keys()
    }

    /// Inserts a key-value pair into the record.
    pub fn insert(&mut self, k: impl Into<String>, v: RecordValue) {
        self.0.insert(k.into(), v);
    }

    /// Returns an iterator over the key-value pairs in the record.
    pub fn iter(&self) -> Iter<'_, String, RecordValue> {
        self.0.iter()
    }

    /// Gets a reference to the value associated with the given key.
    pub fn get(&self, k: &str) -> Option<&RecordValue> {
        self.0.get(k)
    }

    /// Merges another record into this one in place.
    ///
    /// Values of `record` overwrite the values of `self` with the same key.
    pub fn merge_inplace(&mut self, record: Record) {
        self.0.extend(record.0);
    }

    /// Gets a scalar value from the record.
    pub fn get_scalar(&self, k: &str) -> Result<f32, TouchdownError> {
        match self.0.get(k) {
            Some(RecordValue::Scalar(v)) => Ok(*v),
            Some(_) => Err(TouchdownError::RecordValueTypeError("Scalar".to_string())),
            None => Err(TouchdownError::RecordKeyError(k.to_string())),
        }
    }

    /// Gets a string value from the record.
    pub fn get_string(&self, k: &str) -> Result<String, TouchdownError> {
        match self.0.get(k) {
            Some(RecordValue::String(s)) => Ok(s.clone()),
            Some(_) => Err(TouchdownError::RecordValueTypeError("String".to_string())),
            None => Err(TouchdownError::RecordKeyError(k.to_string())),
        }
    }

    /// Returns the number of values.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Checks if the record is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_overwrites() {
        let a = Record::from_slice(&[
            ("loss", RecordValue::Scalar(1.0)),
            ("outcome", RecordValue::String("failure".into())),
        ]);
        let mut merged = a;
        merged.merge_inplace(Record::from_scalar("loss", 0.5));
        assert_eq!(merged.len(), 2);
        assert_eq!(merged.get_scalar("loss").unwrap(), 0.5);
        assert_eq!(merged.get_string("outcome").unwrap(), "failure");
    }

    #[test]
    fn test_typed_getters() {
        let record = Record::from_scalar("episode_return", -12.5);
        assert_eq!(
            record.get_string("episode_return"),
            Err(TouchdownError::RecordValueTypeError("String".to_string()))
        );
        assert_eq!(
            record.get_scalar("missing"),
            Err(TouchdownError::RecordKeyError("missing".to_string()))
        );
    }
}
