//! 线程池运行器
//!
//! 常驻的工作线程从有界通道中取任务，每个任务各自构造解释器。
//!
//! ```text
//!   run() ──> [ bounded channel (threads * 4) ] ──> worker 1 .. worker N
//!     ^                                                  │
//!     └──────────────── reply channel (1) <──────────────┘
//! ```
//!
//! 设置了超时时，超时的任务被标记为放弃，并补充一个新的工作线程；
//! 卡住的线程跑完手上的任务后自行退出。

use super::{run_in_place, RunRequest, RunResult, Runner};
use crate::error::ModuleError;
use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender};
use gauge_config::targets;
use parking_lot::Mutex;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, error, warn};

struct Job {
    request: RunRequest,
    reply: Sender<RunResult>,
    /// 调用方已经不再等待（超时）
    abandoned: Arc<AtomicBool>,
}

pub struct ThreadRunner {
    sender: Sender<Job>,
    /// 留着用来补充工作线程
    receiver: Receiver<Job>,
    timeout: Option<Duration>,
    threads: usize,
    live_workers: Arc<AtomicUsize>,
    next_worker_id: AtomicUsize,
    workers: Mutex<Vec<JoinHandle<()>>>,
}

impl ThreadRunner {
    /// 立即启动 `threads` 个工作线程
    pub fn new(threads: usize, timeout: Option<Duration>) -> Self {
        let threads = threads.max(1);
        let (sender, receiver) = bounded::<Job>(threads * 4);
        let runner = Self {
            sender,
            receiver,
            timeout,
            threads,
            live_workers: Arc::new(AtomicUsize::new(0)),
            next_worker_id: AtomicUsize::new(0),
            workers: Mutex::new(Vec::new()),
        };
        for _ in 0..threads {
            runner.spawn_worker();
        }
        runner
    }

    pub fn threads(&self) -> usize {
        self.threads
    }

    /// 当前存活的工作线程数
    pub fn live_workers(&self) -> usize {
        self.live_workers.load(Ordering::SeqCst)
    }

    fn spawn_worker(&self) {
        let id = self.next_worker_id.fetch_add(1, Ordering::SeqCst);
        let receiver = self.receiver.clone();
        let live = Arc::clone(&self.live_workers);
        live.fetch_add(1, Ordering::SeqCst);
        let spawned = thread::Builder::new()
            .name(format!("gauge-runner-{id}"))
            .spawn({
                let live = Arc::clone(&live);
                move || worker_loop(id, receiver, live)
            });
        match spawned {
            Ok(handle) => self.workers.lock().push(handle),
            Err(e) => {
                live.fetch_sub(1, Ordering::SeqCst);
                error!(target: targets::RUNNER, worker = id, error = %e, "Failed to spawn runner thread");
            }
        }
    }

    /// 关闭通道并等待所有工作线程退出
    pub fn shutdown(self) {
        let ThreadRunner {
            sender,
            receiver,
            workers,
            ..
        } = self;
        drop(sender);
        drop(receiver);
        for worker in workers.into_inner() {
            let _ = worker.join();
        }
    }
}

fn worker_loop(id: usize, receiver: Receiver<Job>, live: Arc<AtomicUsize>) {
    debug!(target: targets::RUNNER, worker = id, "Runner thread started");
    while let Ok(job) = receiver.recv() {
        if job.abandoned.load(Ordering::SeqCst) {
            // 已经有替补线程了
            break;
        }
        let result = panic::catch_unwind(AssertUnwindSafe(|| run_in_place(&job.request)))
            .unwrap_or_else(|_| Err(ModuleError::Internal("Runner thread panicked".to_string())));
        // 调用方可能已经超时离开
        let _ = job.reply.send(result);
        if job.abandoned.load(Ordering::SeqCst) {
            break;
        }
    }
    live.fetch_sub(1, Ordering::SeqCst);
    debug!(target: targets::RUNNER, worker = id, "Runner thread exited");
}

impl Runner for ThreadRunner {
    fn name(&self) -> &'static str {
        "thread"
    }

    fn run(&self, request: RunRequest) -> RunResult {
        if self.live_workers() == 0 {
            return Err(ModuleError::Internal("No runner threads available".to_string()));
        }
        let (reply, reply_receiver) = bounded(1);
        let abandoned = Arc::new(AtomicBool::new(false));
        let job = Job {
            request,
            reply,
            abandoned: Arc::clone(&abandoned),
        };
        if self.sender.send(job).is_err() {
            return Err(ModuleError::Internal("Runner has been shut down".to_string()));
        }

        let Some(timeout) = self.timeout else {
            return reply_receiver
                .recv()
                .unwrap_or_else(|_| Err(ModuleError::Internal("Runner thread exited".to_string())));
        };
        match reply_receiver.recv_timeout(timeout) {
            Ok(result) => result,
            Err(RecvTimeoutError::Timeout) => {
                abandoned.store(true, Ordering::SeqCst);
                warn!(
                    target: targets::RUNNER,
                    timeout_ms = timeout.as_millis() as u64,
                    "Run timed out, replacing runner thread"
                );
                self.spawn_worker();
                Err(ModuleError::Internal(format!(
                    "Run timed out after {} ms",
                    timeout.as_millis()
                )))
            }
            Err(RecvTimeoutError::Disconnected) => {
                Err(ModuleError::Internal("Runner thread exited".to_string()))
            }
        }
    }
}
