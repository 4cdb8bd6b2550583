//! Debounced session writer
//!
//! Coalesces rapid successive snapshots into one durable write: a scheduled
//! snapshot replaces any pending one, and the write happens after a quiet
//! window with no further mutations. A failed write keeps its snapshot
//! pending and is retried after the next quiet window; callers never see the
//! error. Teardown flushes whatever is pending before the task exits.

use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::adapter::PersistenceAdapter;
use crate::record::SessionRecord;

enum Msg {
    Save(SessionRecord),
    Flush(oneshot::Sender<()>),
    Shutdown(oneshot::Sender<()>),
}

pub struct DebouncedWriter {
    tx: mpsc::UnboundedSender<Msg>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl DebouncedWriter {
    /// Spawn the writer task. Must be called within a tokio runtime.
    pub fn spawn(adapter: PersistenceAdapter, quiet_window: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(run(adapter, rx, quiet_window));

        Self {
            tx,
            task: Mutex::new(Some(task)),
        }
    }

    /// Fire-and-forget: replace the pending snapshot and re-arm the quiet
    /// window. Never blocks the caller.
    pub fn schedule(&self, record: SessionRecord) {
        let _ = self.tx.send(Msg::Save(record));
    }

    /// Force an immediate write of the pending snapshot, if any, and wait
    /// for it to complete.
    pub async fn flush(&self) {
        let (ack_tx, ack_rx) = oneshot::channel();
        if self.tx.send(Msg::Flush(ack_tx)).is_ok() {
            let _ = ack_rx.await;
        }
    }

    /// Flush the pending snapshot and stop the task. Idempotent.
    pub async fn shutdown(&self) {
        let (ack_tx, ack_rx) = oneshot::channel();
        if self.tx.send(Msg::Shutdown(ack_tx)).is_ok() {
            let _ = ack_rx.await;
        }

        let task = self.task.lock().take();
        if let Some(task) = task {
            let _ = task.await;
        }
    }
}

async fn run(adapter: PersistenceAdapter, mut rx: mpsc::UnboundedReceiver<Msg>, quiet: Duration) {
    let mut pending: Option<SessionRecord> = None;

    loop {
        let msg = if pending.is_some() {
            match tokio::time::timeout(quiet, rx.recv()).await {
                Ok(msg) => msg,
                Err(_) => {
                    // Quiet window elapsed
                    if let Some(record) = pending.take() {
                        if let Err(e) = adapter.save(&record) {
                            tracing::warn!(error = %e, "Session write failed, retrying after next quiet window");
                            pending = Some(record);
                        }
                    }
                    continue;
                }
            }
        } else {
            rx.recv().await
        };

        match msg {
            Some(Msg::Save(record)) => pending = Some(record),
            Some(Msg::Flush(ack)) => {
                write_pending(&adapter, &mut pending);
                let _ = ack.send(());
            }
            Some(Msg::Shutdown(ack)) => {
                write_pending(&adapter, &mut pending);
                let _ = ack.send(());
                break;
            }
            // All senders dropped: final flush, then exit
            None => {
                write_pending(&adapter, &mut pending);
                break;
            }
        }
    }
}

/// Best-effort write on flush/teardown paths.
fn write_pending(adapter: &PersistenceAdapter, pending: &mut Option<SessionRecord>) {
    if let Some(record) = pending.take() {
        if let Err(e) = adapter.save(&record) {
            tracing::error!(error = %e, "Failed to flush session record");
        }
    }
}
