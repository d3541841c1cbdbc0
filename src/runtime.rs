//! Runtime for dispatching chat messages
//!
//! Each active user gets one worker task fed by a channel, so a user's
//! messages are handled one at a time in arrival order while different users
//! proceed concurrently.

mod broadcast;
mod executor;
mod sessions;
pub mod traits;

#[cfg(test)]
pub mod testing;

pub use executor::{Dispatcher, Inbound};
pub use sessions::SessionStore;
pub use traits::*;

use crate::db::UserId;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, RwLock};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Type alias for the production router with concrete implementations
pub type ProductionRouter = SessionRouter<
    DatabaseStore,
    Arc<crate::responder::LlmResponder>,
    Arc<crate::telegram::TelegramClient>,
>;

/// Handle to a running per-user worker
struct WorkerHandle {
    generation: u64,
    tx: mpsc::UnboundedSender<Inbound>,
    task: JoinHandle<()>,
}

type Workers = Arc<RwLock<HashMap<UserId, WorkerHandle>>>;

/// Routes inbound messages to per-user workers
pub struct SessionRouter<S, R, N>
where
    S: RecordStore + 'static,
    R: Responder + 'static,
    N: Notifier + 'static,
{
    dispatcher: Arc<Dispatcher<S, R, N>>,
    workers: Workers,
    idle_timeout: Duration,
    next_generation: AtomicU64,
}

impl<S, R, N> SessionRouter<S, R, N>
where
    S: RecordStore + 'static,
    R: Responder + 'static,
    N: Notifier + 'static,
{
    /// Workers exit after `idle_timeout` without messages
    pub fn new(dispatcher: Dispatcher<S, R, N>, idle_timeout: Duration) -> Self {
        Self {
            dispatcher: Arc::new(dispatcher),
            workers: Arc::new(RwLock::new(HashMap::new())),
            idle_timeout,
            next_generation: AtomicU64::new(0),
        }
    }

    #[allow(dead_code)] // Used in tests
    pub fn dispatcher(&self) -> &Arc<Dispatcher<S, R, N>> {
        &self.dispatcher
    }

    /// Queue a message on its user's worker, starting one if needed.
    ///
    /// Never waits on a worker: a user with a long backlog does not hold up
    /// the caller. Sends happen under the worker map lock; a worker only
    /// retires while holding the write lock, so a queued message is never
    /// stranded.
    pub async fn dispatch(&self, inbound: Inbound) {
        let user = inbound.user;

        let inbound = {
            let workers = self.workers.read().await;
            match workers.get(&user) {
                Some(worker) => match worker.tx.send(inbound) {
                    Ok(()) => return,
                    Err(mpsc::error::SendError(returned)) => returned,
                },
                None => inbound,
            }
        };

        let mut workers = self.workers.write().await;
        let tx = match workers.get(&user) {
            Some(worker) if !worker.tx.is_closed() => worker.tx.clone(),
            _ => {
                let (tx, rx) = mpsc::unbounded_channel();
                let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);
                let task = tokio::spawn(run_worker(
                    user,
                    generation,
                    rx,
                    self.dispatcher.clone(),
                    self.workers.clone(),
                    self.idle_timeout,
                ));
                workers.insert(
                    user,
                    WorkerHandle {
                        generation,
                        tx: tx.clone(),
                        task,
                    },
                );
                tracing::debug!(user = %user, generation, "Started session worker");
                tx
            }
        };

        if tx.send(inbound).is_err() {
            tracing::error!(user = %user, "Session worker closed, message dropped");
        }
    }

    /// Stop accepting work and wait for every worker to finish its queue
    pub async fn shutdown(&self) {
        let tasks: Vec<JoinHandle<()>> = {
            let mut workers = self.workers.write().await;
            workers.drain().map(|(_, worker)| worker.task).collect()
        };
        tracing::info!(workers = tasks.len(), "Draining session workers");

        for result in futures::future::join_all(tasks).await {
            if let Err(e) = result {
                tracing::error!(error = %e, "Session worker failed during shutdown");
            }
        }
    }

    /// Number of live workers
    #[allow(dead_code)] // Used in tests
    pub async fn active_workers(&self) -> usize {
        self.workers.read().await.len()
    }
}

async fn run_worker<S, R, N>(
    user: UserId,
    generation: u64,
    mut rx: mpsc::UnboundedReceiver<Inbound>,
    dispatcher: Arc<Dispatcher<S, R, N>>,
    workers: Workers,
    idle_timeout: Duration,
) where
    S: RecordStore,
    R: Responder,
    N: Notifier,
{
    loop {
        match tokio::time::timeout(idle_timeout, rx.recv()).await {
            Ok(Some(inbound)) => {
                dispatcher.handle(inbound).await;
            }
            Ok(None) => break,
            Err(_) => {
                let mut map = workers.write().await;
                match rx.try_recv() {
                    Ok(inbound) => {
                        drop(map);
                        dispatcher.handle(inbound).await;
                    }
                    Err(_) => {
                        if map.get(&user).is_some_and(|w| w.generation == generation) {
                            map.remove(&user);
                        }
                        rx.close();
                        break;
                    }
                }
            }
        }
    }

    tracing::debug!(user = %user, generation, "Session worker retired");
}

/// Periodically drop sessions idle for longer than `ttl`
pub fn spawn_session_sweeper(
    sessions: Arc<SessionStore>,
    ttl: Duration,
    every: Duration,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                () = cancel.cancelled() => break,
                _ = ticker.tick() => {
                    let evicted = sessions.evict_idle(ttl).await;
                    if evicted > 0 {
                        tracing::info!(evicted, "Evicted idle sessions");
                    }
                }
            }
        }
    })
}
