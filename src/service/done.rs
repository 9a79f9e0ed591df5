//! Single-shot completion signal handed to method handlers.
//!
//! A handler fills in its response and then calls [`Done::run`] exactly once.
//! `run` consumes the signal, so calling it twice does not compile. If the
//! handler drops the signal without running it, the server sees
//! [`Completion`] resolve to an error and closes the connection without a
//! response. If the handler keeps the signal alive forever, the connection
//! stalls until the peer gives up.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::sync::oneshot;

/// Completion signal passed to a handler.
#[must_use = "a handler must call `Done::run` once its response is filled in"]
#[derive(Debug)]
pub struct Done {
    tx: oneshot::Sender<()>,
}

/// Server-side half of a [`Done`]; resolves when the handler finishes.
#[derive(Debug)]
pub struct Completion {
    rx: oneshot::Receiver<()>,
}

/// Returned by [`Completion`] when the handler dropped its [`Done`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Abandoned;

impl Done {
    /// Create a linked signal/completion pair.
    pub fn new() -> (Done, Completion) {
        let (tx, rx) = oneshot::channel();
        (Done { tx }, Completion { rx })
    }

    /// Signal that the response is ready to be sent.
    pub fn run(self) {
        // Receiver gone means the connection already went away.
        let _ = self.tx.send(());
    }
}

impl Completion {
    /// Non-blocking check, used right after a synchronous handler returns.
    pub fn try_complete(&mut self) -> Option<Result<(), Abandoned>> {
        match self.rx.try_recv() {
            Ok(()) => Some(Ok(())),
            Err(oneshot::error::TryRecvError::Empty) => None,
            Err(oneshot::error::TryRecvError::Closed) => Some(Err(Abandoned)),
        }
    }
}

impl Future for Completion {
    type Output = Result<(), Abandoned>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx).poll(cx).map(|r| r.map_err(|_| Abandoned))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_run_completes() {
        let (done, completion) = Done::new();
        done.run();
        assert_eq!(completion.await, Ok(()));
    }

    #[tokio::test]
    async fn test_drop_is_abandoned() {
        let (done, completion) = Done::new();
        drop(done);
        assert_eq!(completion.await, Err(Abandoned));
    }

    #[test]
    fn test_try_complete_states() {
        let (done, mut completion) = Done::new();
        assert_eq!(completion.try_complete(), None);

        done.run();
        assert_eq!(completion.try_complete(), Some(Ok(())));
    }

    #[tokio::test]
    async fn test_run_from_another_thread() {
        let (done, completion) = Done::new();
        std::thread::spawn(move || done.run());
        assert_eq!(completion.await, Ok(()));
    }

    #[test]
    fn test_run_after_completion_dropped() {
        let (done, completion) = Done::new();
        drop(completion);
        done.run();
    }
}
