//! Display of counters, fuel and frames.
use anyhow::Result;
use log::info;
use touchdown_core::{Frame, StatsSink, TickPayload};

/// Converts an RGB frame into the `0RGB` pixels of a window buffer.
pub fn frame_to_0rgb(frame: &Frame, buf: &mut Vec<u32>) {
    buf.clear();
    buf.extend(frame.pixels().map(|p| {
        let [r, g, b] = p.0;
        (u32::from(r) << 16) | (u32::from(g) << 8) | u32::from(b)
    }));
}

/// Window title carrying the counters and the remaining fuel.
pub fn title_with_labels(title: &str, payload: &TickPayload) -> String {
    format!("{} | {}", title, payload.overlay_labels().join(" | "))
}

/// Headless sink logging the overlay labels whenever a counter changes.
#[derive(Default)]
pub struct LogRenderer {
    last: Option<(u64, u64)>,
    n_logged: usize,
}

impl LogRenderer {
    /// Constructs the renderer.
    pub fn new() -> Self {
        Self::default()
    }
}

impl StatsSink for LogRenderer {
    fn publish(&mut self, payload: &TickPayload) -> Result<()> {
        let counts = (payload.success_count, payload.failure_count);
        if self.last != Some(counts) {
            info!("{}", payload.overlay_labels().join(", "));
            self.last = Some(counts);
            self.n_logged += 1;
        }
        Ok(())
    }
}

#[cfg(feature = "window")]
pub use window::WindowRenderer;

#[cfg(feature = "window")]
mod window {
    use super::{frame_to_0rgb, title_with_labels};
    use anyhow::{anyhow, Result};
    use log::info;
    use minifb::{Window, WindowOptions};
    use touchdown_core::{CancelToken, StatsSink, TickPayload};

    /// Shows the frames in a window and writes the landing counters and the
    /// remaining fuel into the window title, not onto the frame.
    ///
    /// The window is opened at the first frame and sized to it. Closing the
    /// window cancels the run.
    pub struct WindowRenderer {
        title: String,
        window: Option<Window>,
        buf: Vec<u32>,
        caption: String,
        cancel: CancelToken,
    }

    impl WindowRenderer {
        /// Constructs the renderer. The window is not opened yet.
        pub fn new(title: impl Into<String>, cancel: CancelToken) -> Self {
            Self {
                title: title.into(),
                window: None,
                buf: vec![],
                caption: String::new(),
                cancel,
            }
        }

        fn open(&mut self, width: usize, height: usize) -> Result<&mut Window> {
            if self.window.is_none() {
                let window = Window::new(&self.title, width, height, WindowOptions::default())
                    .map_err(|e| anyhow!("Failed to open a window: {}", e))?;
                info!("Opened window {:?} of {}x{}", self.title, width, height);
                self.window = Some(window);
            }
            self.window
                .as_mut()
                .ok_or_else(|| anyhow!("Window is not opened"))
        }
    }

    impl StatsSink for WindowRenderer {
        fn publish(&mut self, payload: &TickPayload) -> Result<()> {
            let caption = title_with_labels(&self.title, payload);

            match payload.frame {
                Some(frame) => {
                    let (w, h) = (frame.width() as usize, frame.height() as usize);
                    let mut buf = std::mem::take(&mut self.buf);
                    frame_to_0rgb(frame, &mut buf);
                    let window = self.open(w, h)?;
                    window
                        .update_with_buffer(&buf, w, h)
                        .map_err(|e| anyhow!("Failed to update the window: {}", e))?;
                    self.buf = buf;
                }
                None => match self.window.as_mut() {
                    Some(window) => window.update(),
                    None => return Ok(()),
                },
            }

            if caption != self.caption {
                if let Some(window) = self.window.as_mut() {
                    window.set_title(&caption);
                }
                self.caption = caption;
            }

            let is_open = self.window.as_ref().map_or(true, |w| w.is_open());
            if !is_open && !self.cancel.is_cancelled() {
                info!("Window closed, stopping the run");
                self.cancel.cancel();
            }
            Ok(())
        }
    }
}
