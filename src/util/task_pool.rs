use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::thread;

use super::Registration;
use crate::server_config::PoolConfig;

/// Manages the bounded set of connection worker threads.
///
/// Threads are started on demand while fewer than the configured minimum
/// are alive. Beyond that, submitted tasks wait in a bounded backlog
/// queue; a new thread is only started when the queue is full and the
/// maximum is not yet reached. Any idle thread above the minimum dies
/// after the configured idle timeout.
pub(crate) struct TaskPool {
    config: PoolConfig,
    sharing: Arc<Sharing>,
}

pub(crate) type TaskFn = Box<dyn FnMut() + Send>;

struct Sharing {
    // list of the queued tasks to be done by worker threads
    queue: Mutex<VecDeque<TaskFn>>,

    // condvar that will be notified whenever a task is added to `queue`
    condvar: Condvar,

    // flag to decide to run or exit
    run: AtomicBool,

    // number of idle worker threads
    threads_idle: Arc<AtomicUsize>,

    // number of total worker threads running
    threads_total: Arc<AtomicUsize>,
}

/// Submission failed: the backlog queue is at capacity and the pool
/// already runs the maximum number of worker threads.
#[derive(Debug)]
pub(crate) struct PoolSaturated;

impl std::error::Error for PoolSaturated {}

impl std::fmt::Display for PoolSaturated {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("worker pool saturated")
    }
}

impl TaskPool {
    pub(crate) fn new(config: PoolConfig) -> TaskPool {
        TaskPool {
            config,
            sharing: Arc::new(Sharing {
                queue: Mutex::new(VecDeque::new()),
                condvar: Condvar::new(),
                run: AtomicBool::from(true),
                threads_total: Arc::default(),
                threads_idle: Arc::default(),
            }),
        }
    }

    /// Submits a task to be executed by a worker thread.
    ///
    /// # Errors
    ///
    /// `PoolSaturated` when the queue is full and no further thread may
    /// be started. The task is dropped.
    pub(crate) fn try_spawn(&self, code: TaskFn) -> Result<(), PoolSaturated> {
        let mut queue = self.sharing.queue.lock().unwrap();

        let threads_total = self.sharing.threads_total.load(Ordering::Acquire);

        if threads_total < self.config.min_workers {
            self.add_thread(Some(code));
        } else if queue.len() < self.config.queue_capacity {
            queue.push_back(code);
            self.sharing.condvar.notify_one();
        } else if threads_total < self.config.max_workers {
            self.add_thread(Some(code));
        } else {
            return Err(PoolSaturated);
        }

        Ok(())
    }

    #[inline]
    fn add_thread(&self, initial_fn: Option<TaskFn>) {
        let sharing = Arc::clone(&self.sharing);
        let min_workers = self.config.min_workers;
        let idle_timeout = self.config.idle_timeout;

        // registered before the thread starts, while the caller still
        // holds the queue lock, so the submission policy never starts
        // more than `max_workers` threads
        let active_guard = Registration::new(Arc::clone(&self.sharing.threads_total));

        let _ = thread::spawn(move || {
            let mut active_guard = Some(active_guard);

            if let Some(mut f) = initial_fn {
                f();
            }

            loop {
                let mut task: TaskFn = {
                    let mut queue = sharing.queue.lock().unwrap();

                    let task;
                    loop {
                        if let Some(new_task) = queue.pop_front() {
                            task = new_task;
                            break;
                        }

                        // queue drained; exit once the pool shuts down
                        if !sharing.run.load(Ordering::Acquire) {
                            return;
                        }

                        let _waiting_guard =
                            Registration::new(Arc::clone(&sharing.threads_idle));

                        let received = if sharing.threads_total.load(Ordering::Acquire)
                            <= min_workers
                        {
                            queue = sharing.condvar.wait(queue).unwrap();
                            true
                        } else {
                            let (new_lock, wait_res) = sharing
                                .condvar
                                .wait_timeout(queue, idle_timeout)
                                .unwrap();
                            queue = new_lock;
                            !wait_res.timed_out()
                        };

                        if !received
                            && queue.is_empty()
                            && sharing.threads_total.load(Ordering::Acquire) > min_workers
                        {
                            // deregistered while still holding the queue
                            // lock, so parallel retirements never take
                            // the pool below its minimum
                            let _ = active_guard.take();
                            return;
                        }
                    }

                    task
                };

                task();
            }
        });
    }

    /// Number of total threads in pool
    #[inline]
    pub(crate) fn threads_total(&self) -> usize {
        self.sharing.threads_total.load(Ordering::Relaxed)
    }
}

impl Drop for TaskPool {
    fn drop(&mut self) {
        // workers drain the remaining backlog and then exit
        self.sharing.run.store(false, Ordering::Release);
        self.sharing.condvar.notify_all();
    }
}
