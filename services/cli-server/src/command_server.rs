//! Line-oriented interactive server: a bounded `input` channel fed by a
//! stdin-reader task, a pool of worker tasks that dispatch each line to the
//! registered command table, and a stdout-writer task draining an
//! `output` channel. The worker pool resizes live via `workers-count <N>`,
//! canceling the most-recently-started workers first (LIFO) when shrinking.

use std::sync::Arc;

use oms::usecase::OrderUseCase;
use parking_lot::Mutex as SyncMutex;
use pvz_common::constants::COMMAND_SERVER_INPUT_BUFFER;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::{mpsc, oneshot, Mutex as AsyncMutex};
use tokio::task::JoinHandle;
use tracing::warn;

use crate::commands;

type WorkerCancel = oneshot::Sender<()>;

/// Shared state a worker needs to process one line and, for `workers-count`,
/// to resize the very pool it belongs to. Held behind an `Arc` so the
/// in-band resize command and [`CommandServer::resize`] operate on the same
/// worker stack.
struct WorkerPool {
    use_case: Arc<OrderUseCase>,
    input_rx: Arc<AsyncMutex<mpsc::Receiver<String>>>,
    output_tx: mpsc::Sender<String>,
    workers: SyncMutex<Vec<WorkerCancel>>,
}

impl WorkerPool {
    /// Resize to exactly `target` workers: spawn more, or cancel the
    /// most-recently-started ones (LIFO) if shrinking.
    fn resize(self: &Arc<Self>, target: usize) {
        let current = self.workers.lock().len();
        if target > current {
            for _ in current..target {
                self.spawn_worker();
            }
        } else {
            for _ in target..current {
                let cancel = self.workers.lock().pop();
                if let Some(cancel) = cancel {
                    let _ = cancel.send(());
                }
            }
        }
    }

    fn spawn_worker(self: &Arc<Self>) {
        let (cancel_tx, cancel_rx) = oneshot::channel();
        self.workers.lock().push(cancel_tx);
        tokio::spawn(worker_loop(self.clone(), cancel_rx));
    }

    fn worker_count(&self) -> usize {
        self.workers.lock().len()
    }

    fn cancel_all(&self) {
        let mut workers = self.workers.lock();
        while let Some(cancel) = workers.pop() {
            let _ = cancel.send(());
        }
    }
}

/// Owns the channels, worker pool, and background tasks of the command
/// server. Dropping this does not stop the server — call [`CommandServer::shutdown`]
/// for a clean stop, mirroring the two-step `Stop()` in the component design.
pub struct CommandServer {
    input_tx: mpsc::Sender<String>,
    pool: Arc<WorkerPool>,
    reader_task: JoinHandle<()>,
    writer_task: JoinHandle<()>,
}

impl CommandServer {
    /// Spawn the reader and writer tasks and an initial pool of
    /// `initial_workers` workers, bound to `use_case`.
    pub fn spawn(use_case: Arc<OrderUseCase>, initial_workers: usize) -> Self {
        let (input_tx, input_rx) = mpsc::channel(COMMAND_SERVER_INPUT_BUFFER);
        // tokio has no true rendezvous channel; buffer(1) is the closest
        // analogue to the unbuffered `output` channel in the component design.
        let (output_tx, output_rx) = mpsc::channel(1);

        let reader_task = tokio::spawn(read_stdin(input_tx.clone()));
        let writer_task = tokio::spawn(write_stdout(output_rx));

        let pool = Arc::new(WorkerPool {
            use_case,
            input_rx: Arc::new(AsyncMutex::new(input_rx)),
            output_tx,
            workers: SyncMutex::new(Vec::new()),
        });
        pool.resize(initial_workers);

        Self {
            input_tx,
            pool,
            reader_task,
            writer_task,
        }
    }

    /// Resize the worker pool to exactly `target` workers, spawning new ones
    /// or canceling the most-recently-started ones (LIFO) as needed.
    pub fn resize(&self, target: usize) {
        self.pool.resize(target);
    }

    /// Current worker pool size.
    #[must_use]
    pub fn worker_count(&self) -> usize {
        self.pool.worker_count()
    }

    /// Feed a line directly into `input`, as if it had arrived on stdin.
    /// Used by tests and by embedders that drive the server programmatically.
    pub async fn submit(&self, line: String) -> Result<(), mpsc::error::SendError<String>> {
        self.input_tx.send(line).await
    }

    /// Two-step shutdown: cancel every worker (LIFO), then abort the reader
    /// and writer tasks.
    pub fn shutdown(&self) {
        self.pool.cancel_all();
        self.reader_task.abort();
        self.writer_task.abort();
    }
}

async fn read_stdin(input_tx: mpsc::Sender<String>) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                if input_tx.send(line).await.is_err() {
                    break;
                }
            }
            Ok(None) => break,
            Err(e) => {
                warn!(error = %e, "stdin read failed");
                break;
            }
        }
    }
}

async fn write_stdout(mut output_rx: mpsc::Receiver<String>) {
    let mut stdout = tokio::io::stdout();
    while let Some(line) = output_rx.recv().await {
        if line.is_empty() {
            continue;
        }
        if stdout.write_all(line.as_bytes()).await.is_err() {
            break;
        }
        if stdout.write_all(b"\n").await.is_err() {
            break;
        }
        let _ = stdout.flush().await;
    }
}

async fn worker_loop(pool: Arc<WorkerPool>, mut cancel_rx: oneshot::Receiver<()>) {
    loop {
        let line = tokio::select! {
            biased;
            _ = &mut cancel_rx => break,
            line = async {
                let mut guard = pool.input_rx.lock().await;
                guard.recv().await
            } => match line {
                Some(line) => line,
                None => break,
            },
        };

        let response = dispatch(&line, &pool).await;
        if pool.output_tx.send(response).await.is_err() {
            break;
        }
    }
}

/// Parse `line` into `<name> <args…>` and route it to the matching handler,
/// the built-in `help`/`workers-count` commands, or an unknown-command
/// error listing the registered vocabulary.
async fn dispatch(line: &str, pool: &Arc<WorkerPool>) -> String {
    let mut parts = line.split_whitespace();
    let Some(name) = parts.next() else {
        return String::new();
    };
    let args: Vec<String> = parts.map(str::to_string).collect();

    match name {
        "help" => help_text(),
        "workers-count" => workers_count(&args, pool),
        _ => match commands::run(name, &args, &pool.use_case).await {
            Some(Ok(output)) => output,
            Some(Err(e)) => format!("error: {e}"),
            None => format!(
                "unknown command {name:?}; registered commands: help, workers-count, {}",
                commands::REGISTERED.join(", ")
            ),
        },
    }
}

/// `workers-count <N>`: resize the pool the calling worker itself belongs
/// to. A worker may cancel itself mid-shrink; it still finishes rendering
/// this response since cancellation only takes effect on the next loop
/// iteration.
fn workers_count(args: &[String], pool: &Arc<WorkerPool>) -> String {
    let [n] = args else {
        return "workers-count: expected <n>".to_string();
    };
    match n.parse::<usize>() {
        Ok(target) => {
            pool.resize(target);
            format!("worker pool resized to {target}")
        }
        Err(_) => format!("workers-count: {n:?} is not a non-negative integer"),
    }
}

fn help_text() -> String {
    format!(
        "registered commands: help, workers-count <n>, {}",
        commands::REGISTERED.join(", ")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use oms::cache::{EvictionPolicy, OrderCache};
    use oms::tx::TxManager;
    use pvz_common::PvzId;

    fn noop_pool() -> Arc<WorkerPool> {
        // A pool that is never connected: these tests only exercise the
        // dispatcher's parsing/routing, not a real use-case call.
        let pg_pool = sqlx::PgPool::connect_lazy("postgres://localhost/does-not-exist")
            .expect("lazy connect never touches the network");
        let tx = Arc::new(TxManager::new(pg_pool));
        let cache = Arc::new(OrderCache::new(Duration::seconds(1), 16, EvictionPolicy::Lru));
        let use_case = Arc::new(OrderUseCase::new(PvzId::from("pvz-test"), tx, cache));
        let (_input_tx, input_rx) = mpsc::channel(COMMAND_SERVER_INPUT_BUFFER);
        let (output_tx, _output_rx) = mpsc::channel(1);
        Arc::new(WorkerPool {
            use_case,
            input_rx: Arc::new(AsyncMutex::new(input_rx)),
            output_tx,
            workers: SyncMutex::new(Vec::new()),
        })
    }

    #[tokio::test]
    async fn unknown_command_lists_registered_vocabulary() {
        let pool = noop_pool();
        let response = dispatch("nonsense foo bar", &pool).await;
        assert!(response.starts_with("unknown command"));
        assert!(response.contains("accept-delivery"));
    }

    #[tokio::test]
    async fn help_lists_builtins_and_registered_commands() {
        let pool = noop_pool();
        let response = dispatch("help", &pool).await;
        assert!(response.contains("workers-count"));
        assert!(response.contains("get-returns"));
    }

    #[tokio::test]
    async fn blank_line_produces_no_response() {
        let pool = noop_pool();
        assert_eq!(dispatch("   ", &pool).await, "");
    }

    #[tokio::test]
    async fn workers_count_command_resizes_the_pool_in_band() {
        let pool = noop_pool();
        assert_eq!(pool.worker_count(), 0);
        let response = dispatch("workers-count 3", &pool).await;
        assert_eq!(response, "worker pool resized to 3");
        assert_eq!(pool.worker_count(), 3);
    }

    #[tokio::test]
    async fn workers_count_rejects_non_integer_argument() {
        let pool = noop_pool();
        let response = dispatch("workers-count many", &pool).await;
        assert!(response.contains("not a non-negative integer"));
        assert_eq!(pool.worker_count(), 0);
    }

    #[test]
    fn resize_grows_and_shrinks_the_worker_stack() {
        let rt = tokio::runtime::Runtime::new().unwrap();
        rt.block_on(async {
            let pg_pool = sqlx::PgPool::connect_lazy("postgres://localhost/does-not-exist")
                .expect("lazy connect never touches the network");
            let tx = Arc::new(TxManager::new(pg_pool));
            let cache = Arc::new(OrderCache::new(Duration::seconds(1), 16, EvictionPolicy::Lru));
            let use_case = Arc::new(OrderUseCase::new(PvzId::from("pvz-test"), tx, cache));
            let server = CommandServer::spawn(use_case, 2);
            assert_eq!(server.worker_count(), 2);
            server.resize(5);
            assert_eq!(server.worker_count(), 5);
            server.resize(1);
            assert_eq!(server.worker_count(), 1);
            server.shutdown();
        });
    }
}
