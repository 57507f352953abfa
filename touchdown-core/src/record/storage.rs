//! Record storage and aggregation.
use super::{Record, RecordValue};
use std::collections::BTreeSet;

/// A storage of records with aggregation.
///
/// Scalars are aggregated into `_min`, `_max`, `_mean` and `_median` when more
/// than one value was stored; for other types, the most recent value is kept.
#[derive(Default)]
pub struct RecordStorage {
    data: Vec<Record>,
}

fn min(vs: &[f32]) -> RecordValue {
    RecordValue::Scalar(vs.iter().copied().fold(f32::INFINITY, f32::min))
}

fn max(vs: &[f32]) -> RecordValue {
    RecordValue::Scalar(vs.iter().copied().fold(f32::NEG_INFINITY, f32::max))
}

fn mean(vs: &[f32]) -> RecordValue {
    RecordValue::Scalar(vs.iter().sum::<f32>() / vs.len() as f32)
}

fn median(mut vs: Vec<f32>) -> RecordValue {
    vs.sort_by(|x, y| x.total_cmp(y));
    RecordValue::Scalar(vs[vs.len() / 2])
}

impl RecordStorage {
    /// Creates a new empty record storage.
    pub fn new() -> Self {
        Self { data: vec![] }
    }

    /// Stores a record.
    pub fn store(&mut self, record: Record) {
        self.data.push(record);
    }

    /// Returns `true` if no record is stored.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    fn keys(&self) -> BTreeSet<String> {
        self.data
            .iter()
            .flat_map(|record| record.keys().cloned())
            .collect()
    }

    fn latest(&self, key: &str) -> Option<&RecordValue> {
        self.data.iter().rev().find_map(|record| record.get(key))
    }

    fn scalar(&self, key: &str) -> Record {
        let vs: Vec<f32> = self
            .data
            .iter()
            .filter_map(|record| match record.get(key) {
                Some(RecordValue::Scalar(v)) => Some(*v),
                _ => None,
            })
            .collect();

        match vs.len() {
            0 => Record::empty(),
            1 => Record::from_scalar(key, vs[0]),
            _ => Record::from_slice(&[
                (format!("{}_min", key), min(&vs)),
                (format!("{}_max", key), max(&vs)),
                (format!("{}_mean", key), mean(&vs)),
                (format!("{}_median", key), median(vs)),
            ]),
        }
    }

    /// Aggregates all stored records and clears the storage.
    pub fn aggregate(&mut self) -> Record {
        let mut record = Record::empty();

        for key in self.keys().iter() {
            match self.latest(key) {
                Some(RecordValue::Scalar(..)) => record.merge_inplace(self.scalar(key)),
                Some(value) => record.insert(key.clone(), value.clone()),
                None => {}
            }
        }

        self.data.clear();

        record
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aggregate_scalars_and_strings() {
        let mut storage = RecordStorage::new();
        for (len, outcome) in [(100.0, "failure"), (300.0, "success"), (200.0, "ongoing")].iter() {
            storage.store(Record::from_slice(&[
                ("episode_length", RecordValue::Scalar(*len)),
                ("outcome", RecordValue::String(outcome.to_string())),
            ]));
        }
        storage.store(Record::from_scalar("loss", 0.25));

        let record = storage.aggregate();
        assert_eq!(record.get_scalar("episode_length_min").unwrap(), 100.0);
        assert_eq!(record.get_scalar("episode_length_max").unwrap(), 300.0);
        assert_eq!(record.get_scalar("episode_length_mean").unwrap(), 200.0);
        assert_eq!(record.get_scalar("episode_length_median").unwrap(), 200.0);
        assert_eq!(record.get_scalar("loss").unwrap(), 0.25);
        assert_eq!(record.get_string("outcome").unwrap(), "ongoing");
        assert!(storage.is_empty());
    }
}
