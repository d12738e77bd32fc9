use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use chrono::Utc;
use tracing::{debug, warn};

use crate::revocation::RevocationLedger;

/// Handle to control and join a background worker.
#[derive(Debug)]
pub struct WorkerHandle {
    shutdown: mpsc::Sender<()>,
    join: Option<thread::JoinHandle<()>>,
}

impl WorkerHandle {
    /// Request graceful shutdown and wait for the worker to stop.
    pub fn shutdown(mut self) {
        let _ = self.shutdown.send(());
        if let Some(j) = self.join.take() {
            let _ = j.join();
        }
    }
}

/// Periodically purges revocation entries older than the ledger's retention window.
///
/// - Runs on its own thread, independent of request handling
/// - Each purge is a single ledger call, so readers never observe a half-swept set
/// - Stops promptly when the handle is shut down or dropped
#[derive(Debug)]
pub struct RevocationSweeper;

impl RevocationSweeper {
    pub fn spawn<L>(ledger: L, interval: Duration) -> std::io::Result<WorkerHandle>
    where
        L: RevocationLedger + 'static,
    {
        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>();

        let join = thread::Builder::new()
            .name("revocation-sweeper".to_string())
            .spawn(move || sweep_loop(&ledger, interval, shutdown_rx))?;

        Ok(WorkerHandle {
            shutdown: shutdown_tx,
            join: Some(join),
        })
    }
}

fn sweep_loop<L>(ledger: &L, interval: Duration, shutdown_rx: mpsc::Receiver<()>)
where
    L: RevocationLedger,
{
    loop {
        match shutdown_rx.recv_timeout(interval) {
            Err(mpsc::RecvTimeoutError::Timeout) => match ledger.purge_expired(Utc::now()) {
                Ok(0) => {}
                Ok(purged) => debug!(purged, "revocation ledger swept"),
                Err(err) => warn!(error = %err, "revocation sweep failed"),
            },
            Ok(()) | Err(mpsc::RecvTimeoutError::Disconnected) => break,
        }
    }
}
