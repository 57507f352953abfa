//! Recorder of episode statistics.
use anyhow::Result;
use csv::{Writer, WriterBuilder};
use log::{info, warn};
use serde::Serialize;
use std::{convert::TryFrom, fs::File, path::Path};
use touchdown_core::record::{AggregateRecorder, Record, RecordStorage, RecordValue};

/// A row of the episode log.
#[derive(Debug, Serialize, PartialEq)]
pub struct EpisodeRow {
    episode: usize,
    episode_length: usize,
    episode_return: f32,
    forced_neutral_steps: usize,
    fuel_remaining: f32,
    outcome: String,
}

impl TryFrom<&Record> for EpisodeRow {
    type Error = anyhow::Error;

    fn try_from(record: &Record) -> Result<Self> {
        Ok(Self {
            episode: record.get_scalar("episode")? as _,
            episode_length: record.get_scalar("episode_length")? as _,
            episode_return: record.get_scalar("episode_return")?,
            forced_neutral_steps: record.get_scalar("forced_neutral_steps")? as _,
            fuel_remaining: record.get_scalar("fuel_remaining")?,
            outcome: record.get_string("outcome")?,
        })
    }
}

/// Logs aggregated records at every flush and optionally writes a CSV row per episode.
pub struct EpisodeLogRecorder {
    storage: RecordStorage,
    wtr: Option<Writer<File>>,
}

impl Default for EpisodeLogRecorder {
    fn default() -> Self {
        Self::new()
    }
}

impl EpisodeLogRecorder {
    /// Constructs a recorder without CSV output.
    pub fn new() -> Self {
        Self {
            storage: RecordStorage::new(),
            wtr: None,
        }
    }

    /// Constructs a recorder writing episodes to the CSV file at `path`.
    pub fn with_csv(path: impl AsRef<Path>) -> Result<Self> {
        let wtr = WriterBuilder::new().from_writer(File::create(path)?);
        Ok(Self {
            storage: RecordStorage::new(),
            wtr: Some(wtr),
        })
    }

    fn write_row(&mut self, record: &Record) -> Result<()> {
        if let Some(wtr) = self.wtr.as_mut() {
            if record.get("episode").is_some() {
                wtr.serialize(EpisodeRow::try_from(record)?)?;
            }
        }
        Ok(())
    }
}

fn format_record(record: &Record) -> String {
    let mut fields: Vec<String> = record
        .iter()
        .filter_map(|(k, v)| match v {
            RecordValue::Scalar(x) => Some(format!("{} = {:.3}", k, x)),
            RecordValue::String(s) => Some(format!("{} = {}", k, s)),
            _ => None,
        })
        .collect();
    fields.sort();
    fields.join(", ")
}

impl AggregateRecorder for EpisodeLogRecorder {
    fn store(&mut self, record: Record) {
        if let Err(e) = self.write_row(&record) {
            warn!("Failed to write an episode row: {}", e);
        }
        self.storage.store(record);
    }

    fn flush(&mut self, step: i64) {
        if let Some(wtr) = self.wtr.as_mut() {
            if let Err(e) = wtr.flush() {
                warn!("Failed to flush the episode log: {}", e);
            }
        }
        if self.storage.is_empty() {
            return;
        }
        let record = self.storage.aggregate();
        info!("Step {}: {}", step, format_record(&record));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempdir::TempDir;

    fn episode(ix: usize, outcome: &str) -> Record {
        Record::from_slice(&[
            ("episode", RecordValue::Scalar(ix as f32)),
            ("episode_length", RecordValue::Scalar(120.0)),
            ("episode_return", RecordValue::Scalar(-35.5)),
            ("forced_neutral_steps", RecordValue::Scalar(0.0)),
            ("fuel_remaining", RecordValue::Scalar(8.8)),
            ("outcome", RecordValue::String(outcome.to_string())),
        ])
    }

    #[test]
    fn test_episode_rows_written_to_csv() -> Result<()> {
        let dir = TempDir::new("episode_log")?;
        let path = dir.path().join("episodes.csv");
        let mut recorder = EpisodeLogRecorder::with_csv(&path)?;
        recorder.store(Record::from_scalar("num_timesteps", 1000.0));
        recorder.store(episode(1, "failure"));
        recorder.store(episode(2, "success"));
        recorder.flush(1000);

        let mut rdr = csv::Reader::from_path(&path)?;
        let headers = rdr.headers()?.clone();
        assert_eq!(&headers[0], "episode");
        assert_eq!(&headers[5], "outcome");
        let rows = rdr.records().collect::<Result<Vec<_>, _>>()?;
        assert_eq!(rows.len(), 2);
        assert_eq!(&rows[0][0], "1");
        assert_eq!(&rows[1][5], "success");
        Ok(())
    }

    #[test]
    fn test_format_record_is_sorted() {
        let record = Record::from_slice(&[
            ("b", RecordValue::Scalar(2.0)),
            ("a", RecordValue::String("x".to_string())),
            ("c", RecordValue::DateTime(chrono::Local::now())),
        ]);
        assert_eq!(format_record(&record), "a = x, b = 2.000");
    }

    #[test]
    fn test_episode_row_requires_all_keys() {
        assert!(EpisodeRow::try_from(&episode(3, "ongoing")).is_ok());
        assert!(EpisodeRow::try_from(&Record::from_scalar("episode", 1.0)).is_err());
    }
}
