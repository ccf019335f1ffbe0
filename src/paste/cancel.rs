//! Cancellation of in-flight pastes.

use tokio::sync::watch;

/// Create a linked cancellation pair for one paste.
///
/// The host keeps the [`CancelHandle`] (for example, tied to the lifetime of
/// the editing surface) and passes the [`CancelSignal`] with the paste event.
pub fn cancel_pair() -> (CancelHandle, CancelSignal) {
    let (tx, rx) = watch::channel(false);
    (CancelHandle { tx }, CancelSignal { rx })
}

/// Host side of a cancellation pair.
///
/// Dropping the handle without calling [`cancel`](Self::cancel) does
/// **not** cancel the paste.
#[derive(Debug)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelHandle {
    /// Abort the paste. Uploads still in flight are dropped and nothing is
    /// inserted.
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }
}

/// Paste side of a cancellation pair.
#[derive(Clone, Debug)]
pub struct CancelSignal {
    rx: watch::Receiver<bool>,
}

impl CancelSignal {
    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once the paste is cancelled; never resolves if the handle is
    /// dropped without cancelling.
    pub async fn cancelled(&mut self) {
        if self.rx.wait_for(|cancelled| *cancelled).await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}
