//! One background thread that runs searches in submission order.

use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};

use log::debug;

use crate::error::{EngineError, Result};

type Job = Box<dyn FnOnce() + Send + 'static>;

pub struct SearchWorker {
    tx: Option<Sender<Job>>,
    handle: Option<JoinHandle<()>>,
}

impl SearchWorker {
    pub fn spawn() -> Result<Self> {
        let (tx, rx) = mpsc::channel::<Job>();
        let handle = thread::Builder::new()
            .name("book-search".into())
            .spawn(move || {
                for job in rx { job(); }
                debug!("search worker exiting");
            })
            .map_err(EngineError::Spawn)?;
        Ok(Self { tx: Some(tx), handle: Some(handle) })
    }

    /// Queue `f` on the worker and return a handle to its result.
    pub fn submit<T, F>(&self, f: F) -> Result<PendingSearch<T>>
    where
        T: Send + 'static,
        F: FnOnce() -> T + Send + 'static,
    {
        let (rtx, rrx) = mpsc::sync_channel(1);
        let job: Job = Box::new(move || {
            // Receiver may already be gone if the engine is shutting down.
            let _ = rtx.send(f());
        });
        let tx = self.tx.as_ref().ok_or(EngineError::WorkerGone)?;
        tx.send(job).map_err(|_| EngineError::WorkerGone)?;
        Ok(PendingSearch { rx: rrx })
    }
}

impl Drop for SearchWorker {
    fn drop(&mut self) {
        drop(self.tx.take());
        if let Some(h) = self.handle.take() {
            let _ = h.join();
        }
    }
}

/// Result of a submitted search, retrievable once.
pub struct PendingSearch<T> {
    rx: Receiver<T>,
}

impl<T> PendingSearch<T> {
    /// Block until the worker delivers the result.
    pub fn wait(self) -> Result<T> {
        self.rx.recv().map_err(|_| EngineError::WorkerGone)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn jobs_run_in_order_on_one_thread() {
        let worker = SearchWorker::spawn().unwrap();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let seen = Arc::clone(&seen);
                worker
                    .submit(move || {
                        seen.lock().unwrap().push(i);
                        thread::current().name().map(str::to_owned)
                    })
                    .unwrap()
            })
            .collect();
        for h in handles {
            assert_eq!(h.wait().unwrap().as_deref(), Some("book-search"));
        }
        assert_eq!(*seen.lock().unwrap(), vec![0, 1, 2, 3]);
    }

    #[test]
    fn panicking_job_reports_worker_gone() {
        let worker = SearchWorker::spawn().unwrap();
        let pending = worker.submit(|| -> u32 { panic!("boom") }).unwrap();
        assert!(matches!(pending.wait(), Err(EngineError::WorkerGone)));
    }
}
