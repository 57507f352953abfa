//! Renderers and recorders of the `touchdown` monitor.
pub mod recorder;
pub mod renderer;
pub use recorder::{EpisodeLogRecorder, EpisodeRow};
#[cfg(feature = "window")]
pub use renderer::WindowRenderer;
pub use renderer::{frame_to_0rgb, LogRenderer};
