/*
 * // Copyright (c) the yuvops contributors. All rights reserved.
 * //
 * // Use of this source code is governed by a BSD-style
 * // license that can be found in the LICENSE file.
 */
use crate::checksum::crc32_checksum;
use crate::ConvertError;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::mpsc::{channel, Sender};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::JoinHandle;

type Job = Box<dyn FnOnce() + Send + 'static>;

#[derive(Default)]
struct QueueState {
    submitted: u64,
    completed: u64,
    worker_alive: bool,
}

struct QueueShared {
    state: Mutex<QueueState>,
    done: Condvar,
}

/// An ordered, asynchronous execution queue.
///
/// Work submitted to one queue runs on a single worker thread in submission
/// order; work on different queues has no ordering relationship. There is no
/// cancellation: once accepted, a job runs to completion or the queue is torn
/// down by dropping it, which waits for the worker to drain.
///
/// Buffers cross the queue boundary as `Arc<[u8]>`, so the shared reference
/// keeps caller memory alive until the work that reads it has finished.
pub struct ExecutionQueue {
    tx: Option<Sender<Job>>,
    worker: Option<JoinHandle<()>>,
    shared: Arc<QueueShared>,
}

/// Handle to a checksum result produced on an [`ExecutionQueue`].
///
/// The value is only guaranteed to be present after the owning queue has been
/// synchronized past the producing operation.
pub struct ChecksumTicket {
    slot: Arc<ChecksumSlot>,
}

struct ChecksumSlot {
    ready: AtomicBool,
    value: AtomicU32,
}

impl ChecksumTicket {
    /// Returns the checksum if the producing operation has completed.
    pub fn value(&self) -> Option<u32> {
        if self.slot.ready.load(Ordering::Acquire) {
            Some(self.slot.value.load(Ordering::Relaxed))
        } else {
            None
        }
    }
}

impl ExecutionQueue {
    /// Spawns the queue worker.
    ///
    /// # Errors
    ///
    /// [`ConvertError::LaunchFailure`] if the worker thread cannot be created.
    pub fn new() -> Result<ExecutionQueue, ConvertError> {
        let (tx, rx) = channel::<Job>();
        let shared = Arc::new(QueueShared {
            state: Mutex::new(QueueState {
                submitted: 0,
                completed: 0,
                worker_alive: true,
            }),
            done: Condvar::new(),
        });
        let worker_shared = Arc::clone(&shared);
        let worker = std::thread::Builder::new()
            .name("yuvops-queue".into())
            .spawn(move || {
                while let Ok(job) = rx.recv() {
                    // A panicking job must not wedge sync(); the slot it was
                    // going to fill simply stays empty.
                    let _ = catch_unwind(AssertUnwindSafe(job));
                    let mut state = worker_shared
                        .state
                        .lock()
                        .unwrap_or_else(PoisonError::into_inner);
                    state.completed += 1;
                    drop(state);
                    worker_shared.done.notify_all();
                }
                let mut state = worker_shared
                    .state
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner);
                state.worker_alive = false;
                drop(state);
                worker_shared.done.notify_all();
            })
            .map_err(|_| ConvertError::LaunchFailure("could not spawn queue worker"))?;
        Ok(ExecutionQueue {
            tx: Some(tx),
            worker: Some(worker),
            shared,
        })
    }

    fn lock_state(&self) -> MutexGuard<'_, QueueState> {
        self.shared
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Enqueues arbitrary work behind everything already submitted.
    ///
    /// # Errors
    ///
    /// [`ConvertError::LaunchFailure`] if the worker is gone; the job is not
    /// retried.
    pub fn submit<F>(&self, job: F) -> Result<(), ConvertError>
    where
        F: FnOnce() + Send + 'static,
    {
        let tx = self
            .tx
            .as_ref()
            .ok_or(ConvertError::LaunchFailure("queue is shut down"))?;
        {
            let mut state = self.lock_state();
            if !state.worker_alive {
                return Err(ConvertError::LaunchFailure("queue worker exited"));
            }
            state.submitted += 1;
        }
        if tx.send(Box::new(job)).is_err() {
            let mut state = self.lock_state();
            state.submitted -= 1;
            return Err(ConvertError::LaunchFailure("queue worker exited"));
        }
        Ok(())
    }

    /// Enqueues a checksum over `buffer` behind everything already submitted.
    ///
    /// The returned ticket holds the result once the operation completes;
    /// read it after [`ExecutionQueue::sync`] returns.
    ///
    /// # Errors
    ///
    /// [`ConvertError::LaunchFailure`] if the worker is gone.
    pub fn compute_checksum(&self, buffer: Arc<[u8]>) -> Result<ChecksumTicket, ConvertError> {
        let slot = Arc::new(ChecksumSlot {
            ready: AtomicBool::new(false),
            value: AtomicU32::new(0),
        });
        let task_slot = Arc::clone(&slot);
        self.submit(move || {
            let crc = crc32_checksum(&buffer);
            task_slot.value.store(crc, Ordering::Relaxed);
            task_slot.ready.store(true, Ordering::Release);
        })?;
        Ok(ChecksumTicket { slot })
    }

    /// Blocks until every operation submitted before this call has completed.
    ///
    /// # Errors
    ///
    /// [`ConvertError::LaunchFailure`] if the worker exited with work still
    /// pending.
    pub fn sync(&self) -> Result<(), ConvertError> {
        let mut state = self.lock_state();
        let target = state.submitted;
        while state.completed < target {
            if !state.worker_alive {
                return Err(ConvertError::LaunchFailure(
                    "queue worker exited with work pending",
                ));
            }
            state = self
                .shared
                .done
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
        Ok(())
    }
}

impl Drop for ExecutionQueue {
    fn drop(&mut self) {
        drop(self.tx.take());
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jobs_run_in_submission_order() {
        let queue = ExecutionQueue::new().unwrap();
        let log = Arc::new(Mutex::new(Vec::new()));
        for i in 0..64u32 {
            let log = Arc::clone(&log);
            queue.submit(move || log.lock().unwrap().push(i)).unwrap();
        }
        queue.sync().unwrap();
        let log = log.lock().unwrap();
        assert_eq!(*log, (0..64).collect::<Vec<_>>());
    }

    #[test]
    fn checksum_is_reproducible_across_submissions() {
        let queue = ExecutionQueue::new().unwrap();
        let buffer: Arc<[u8]> = (0..4096u32)
            .map(|i| (i * 17 + 3) as u8)
            .collect::<Vec<_>>()
            .into();
        let first = queue.compute_checksum(Arc::clone(&buffer)).unwrap();
        let second = queue.compute_checksum(Arc::clone(&buffer)).unwrap();
        queue.sync().unwrap();
        let first = first.value().expect("synced");
        let second = second.value().expect("synced");
        assert_eq!(first, second);
        assert_eq!(first, crc32_checksum(&buffer));
    }

    #[test]
    fn checksum_observes_writes_ordered_before_it() {
        let queue = ExecutionQueue::new().unwrap();
        let buffer = Arc::new(Mutex::new(vec![0u8; 1024]));

        let write_buffer = Arc::clone(&buffer);
        queue
            .submit(move || {
                for (i, b) in write_buffer.lock().unwrap().iter_mut().enumerate() {
                    *b = (i * 7) as u8;
                }
            })
            .unwrap();

        let read_buffer = Arc::clone(&buffer);
        let result = Arc::new(AtomicU32::new(0));
        let task_result = Arc::clone(&result);
        queue
            .submit(move || {
                let data = read_buffer.lock().unwrap();
                task_result.store(crc32_checksum(&data), Ordering::Release);
            })
            .unwrap();
        queue.sync().unwrap();

        let expected: Vec<u8> = (0..1024usize).map(|i| (i * 7) as u8).collect();
        assert_eq!(result.load(Ordering::Acquire), crc32_checksum(&expected));
    }

    #[test]
    fn sync_on_empty_queue_returns_immediately() {
        let queue = ExecutionQueue::new().unwrap();
        queue.sync().unwrap();
    }
}
