use super::Record;

/// Stores records and writes values aggregated from them.
pub trait AggregateRecorder {
    /// Store the record.
    fn store(&mut self, record: Record);

    /// Writes values aggregated from the stored records.
    ///
    /// `step` is the number of environment steps simulated so far.
    fn flush(&mut self, step: i64);
}
