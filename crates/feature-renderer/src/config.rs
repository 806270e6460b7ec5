//! Tuning knobs for render passes.

use std::time::Duration;

use crate::error::{RendererError, Result};

/// Default number of draw worker threads per pass.
pub const DEFAULT_DRAW_THREADS: usize = 4;

/// Default grace period given to a cancelled pass before its pool is dropped.
pub const DEFAULT_TERMINATE_TIMEOUT: Duration = Duration::from_millis(350);

/// Default delay before a synthetic "nothing to draw" completion is reported.
pub const DEFAULT_COMPLETION_DELAY: Duration = Duration::from_millis(550);

/// Configuration for a [`RenderDispatcher`](crate::RenderDispatcher).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderConfig {
    /// Worker threads per render pass. Independent of the feature count.
    pub draw_threads: usize,

    /// How long `cancel` waits for in-flight draw tasks.
    pub terminate_timeout: Duration,

    /// Delay before the synthetic 100% callback on early exits.
    pub completion_delay: Duration,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            draw_threads: DEFAULT_DRAW_THREADS,
            terminate_timeout: DEFAULT_TERMINATE_TIMEOUT,
            completion_delay: DEFAULT_COMPLETION_DELAY,
        }
    }
}

impl RenderConfig {
    /// Load configuration from environment variables.
    ///
    /// Unset or unparsable variables keep their defaults.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("RENDER_DRAW_THREADS") {
            if let Ok(threads) = val.parse() {
                config.draw_threads = threads;
            }
        }

        if let Ok(val) = std::env::var("RENDER_TERMINATE_TIMEOUT_MS") {
            if let Ok(ms) = val.parse() {
                config.terminate_timeout = Duration::from_millis(ms);
            }
        }

        if let Ok(val) = std::env::var("RENDER_COMPLETION_DELAY_MS") {
            if let Ok(ms) = val.parse() {
                config.completion_delay = Duration::from_millis(ms);
            }
        }

        config
    }

    /// Builder-style override of the worker thread count.
    pub fn with_draw_threads(mut self, threads: usize) -> Self {
        self.draw_threads = threads;
        self
    }

    pub fn with_terminate_timeout(mut self, timeout: Duration) -> Self {
        self.terminate_timeout = timeout;
        self
    }

    pub fn with_completion_delay(mut self, delay: Duration) -> Self {
        self.completion_delay = delay;
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.draw_threads == 0 {
            return Err(RendererError::InvalidConfig(
                "draw_threads must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}
