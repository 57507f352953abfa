//! Types and traits for recording run statistics.
//!
//! * [`Record`] - A container of key-value pairs of various data types
//! * [`RecordValue`] - The values that can be stored in a [`Record`]
//! * [`AggregateRecorder`] - Destination of records
//! * [`RecordStorage`] - Aggregation of stored records
//! * [`BufferedRecorder`] - Keeps records in memory
//! * [`NullRecorder`] - Discards all records
//!
//! ```rust
//! use touchdown_core::record::{Record, RecordValue};
//!
//! let mut record = Record::empty();
//! record.insert("episode_length", RecordValue::Scalar(231.0));
//! record.insert("outcome", RecordValue::String("success".to_string()));
//! assert_eq!(record.get_scalar("episode_length").unwrap(), 231.0);
//! ```
//!
//! The [`EpisodeLoop`](crate::EpisodeLoop) stores a record at the end of every
//! episode and after every call of [`Agent::learn`](crate::Agent::learn), and
//! flushes the recorder after every block of simulated steps.
mod base;
mod buffered_recorder;
mod null_recorder;
mod recorder;
mod storage;

pub use base::{Record, RecordValue};
pub use buffered_recorder::BufferedRecorder;
pub use null_recorder::NullRecorder;
pub use recorder::AggregateRecorder;
pub use storage::RecordStorage;
