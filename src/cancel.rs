use tokio::sync::watch;

/// One-way cancellation flag shared between the orchestrator and its
/// playback / progress tasks. Once fired it stays fired; waiters that missed
/// the edge still observe the flag.
#[derive(Clone, Debug)]
pub struct CancelToken {
    tx: watch::Sender<bool>,
    rx: watch::Receiver<bool>,
}

impl CancelToken {
    pub fn new() -> Self {
        let (tx, rx) = watch::channel(false);
        Self { tx, rx }
    }

    pub fn cancel(&self) {
        // Receivers are held by clones of this token, so send cannot fail
        // while any waiter exists; a lost send with no waiters is harmless.
        let _ = self.tx.send(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves when (or immediately after) `cancel` has been called.
    pub async fn cancelled(&self) {
        let mut rx = self.rx.clone();
        while !*rx.borrow_and_update() {
            if rx.changed().await.is_err() {
                return;
            }
        }
    }
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}
