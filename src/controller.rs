//! Per-call failure state.

use crate::error::RpcError;

/// Carries the outcome of one outbound call.
///
/// A controller is owned by a single call. Reuse one for sequential calls by
/// calling [`reset`](Self::reset) in between.
///
/// Cancellation is not supported. The cancel hooks exist so that code written
/// against a cancellable controller still compiles, and they do nothing.
#[derive(Debug, Default)]
pub struct RpcController {
    failed: bool,
    error_text: String,
}

impl RpcController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear failure state for the next call.
    pub fn reset(&mut self) {
        self.failed = false;
        self.error_text.clear();
    }

    /// Whether the last call failed.
    pub fn failed(&self) -> bool {
        self.failed
    }

    /// Reason recorded by the most recent failure, empty if none.
    pub fn error_text(&self) -> &str {
        &self.error_text
    }

    /// Mark the call failed. A later failure overwrites the reason.
    pub fn set_failed(&mut self, reason: impl Into<String>) {
        self.failed = true;
        self.error_text = reason.into();
    }

    /// Mark the call failed with the error's display text.
    pub fn set_failed_from(&mut self, error: &RpcError) {
        self.set_failed(error.to_string());
    }

    /// No-op.
    pub fn start_cancel(&mut self) {}

    /// Always `false`.
    pub fn is_canceled(&self) -> bool {
        false
    }

    /// Accepts the callback and drops it without calling it.
    pub fn notify_on_cancel<F>(&mut self, callback: F)
    where
        F: FnOnce() + Send + 'static,
    {
        drop(callback);
    }
}
