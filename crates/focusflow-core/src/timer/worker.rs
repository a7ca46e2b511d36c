//! Background effect execution.
//!
//! Storage calls block, and ticking must not wait on them. The worker owns the
//! executor on a blocking thread and receives effect batches over a channel;
//! each batch produces an [`EffectLog`] on the report channel.

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::effects::Effect;
use super::executor::{EffectExecutor, EffectLog};
use crate::error::{CoreError, Result};
use crate::storage::DataStore;

pub struct EffectWorker<S> {
    tx: mpsc::UnboundedSender<Vec<Effect>>,
    reports: mpsc::UnboundedReceiver<EffectLog>,
    handle: JoinHandle<EffectExecutor<S>>,
}

impl<S> EffectWorker<S>
where
    S: DataStore + Send + 'static,
{
    /// Move `executor` onto a blocking worker thread.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(executor: EffectExecutor<S>) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<Vec<Effect>>();
        let (report_tx, reports) = mpsc::unbounded_channel();

        let handle = tokio::task::spawn_blocking(move || {
            while let Some(batch) = rx.blocking_recv() {
                let log = executor.execute_batch(batch);
                // The receiver may already be gone during shutdown.
                let _ = report_tx.send(log);
            }
            executor
        });

        Self {
            tx,
            reports,
            handle,
        }
    }

    /// Queue a batch without waiting for it to run.
    pub fn submit(&self, effects: Vec<Effect>) {
        if effects.is_empty() {
            return;
        }
        if self.tx.send(effects).is_err() {
            tracing::warn!("effect worker has stopped; effects dropped");
        }
    }

    /// Logs of batches finished since the last call.
    pub fn drain_reports(&mut self) -> Vec<EffectLog> {
        let mut logs = Vec::new();
        while let Ok(log) = self.reports.try_recv() {
            logs.push(log);
        }
        logs
    }

    /// Finish every queued batch, then hand back the executor and the
    /// logs not yet drained.
    pub async fn shutdown(self) -> Result<(EffectExecutor<S>, Vec<EffectLog>)> {
        let Self {
            tx,
            mut reports,
            handle,
        } = self;
        drop(tx);
        let executor = handle
            .await
            .map_err(|e| CoreError::Custom(format!("effect worker panicked: {e}")))?;
        let mut logs = Vec::new();
        while let Ok(log) = reports.try_recv() {
            logs.push(log);
        }
        Ok((executor, logs))
    }
}
