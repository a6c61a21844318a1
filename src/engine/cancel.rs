use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crossbeam::channel::{self, Receiver, Sender};

/// Cooperative cancellation passed through every long-lived operation
/// (flush loop, fan-out, hot-reload per §5). `CancellationHandle` is held
/// by the owner that can request a stop; `CancellationToken` is cloned into
/// the background task and exposes a channel a `select!` can block on so
/// cancellation wakes a sleeping loop immediately instead of waiting for
/// the next tick.
pub struct CancellationHandle {
    cancelled: Arc<AtomicBool>,
    sender: Sender<()>,
}

#[derive(Clone)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
    receiver: Receiver<()>,
}

pub fn cancellation_pair() -> (CancellationHandle, CancellationToken) {
    let (sender, receiver) = channel::bounded(1);
    let cancelled = Arc::new(AtomicBool::new(false));
    (
        CancellationHandle {
            cancelled: cancelled.clone(),
            sender,
        },
        CancellationToken { cancelled, receiver },
    )
}

impl CancellationHandle {
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
        let _ = self.sender.send(());
    }
}

impl CancellationToken {
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    pub fn receiver(&self) -> &Receiver<()> {
        &self.receiver
    }
}
