//! Single-worker computation service.
//!
//! One thread owns every computation. Callers on any thread send an index
//! over a channel and block on a per-request reply channel, so the engine
//! is never entered concurrently.

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{bounded, unbounded, Sender};
use fibdec_core::calculator::{Calculator, FibError};
use fibdec_core::decimal::DecimalBig;
use fibdec_core::options::Options;
use tracing::{debug, trace};

/// Errors from the service.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// The computation failed.
    #[error(transparent)]
    Fib(#[from] FibError),

    /// The worker is gone.
    #[error("service worker disconnected")]
    Disconnected,

    /// The worker thread could not be started.
    #[error("failed to start service worker: {0}")]
    Spawn(#[from] std::io::Error),
}

struct Request {
    index: u64,
    reply: Sender<Result<DecimalBig, FibError>>,
}

/// Handle to the worker. Dropping it drains the queue and joins the worker.
pub struct FibService {
    requests: Option<Sender<Request>>,
    worker: Option<JoinHandle<()>>,
}

impl FibService {
    /// Start the worker thread.
    pub fn spawn(calculator: Arc<dyn Calculator>, opts: Options) -> Result<Self, ServiceError> {
        let (tx, rx) = unbounded::<Request>();
        let worker = thread::Builder::new()
            .name("fibdec-worker".into())
            .spawn(move || {
                debug!(calculator = calculator.name(), "service worker started");
                for request in &rx {
                    trace!(index = request.index, "service request");
                    let result = calculator.calculate(request.index, &opts);
                    // The caller may have given up waiting.
                    let _ = request.reply.send(result);
                }
                debug!("service worker stopped");
            })?;
        Ok(Self {
            requests: Some(tx),
            worker: Some(worker),
        })
    }

    /// Compute F(`index`) on the worker and wait for the result.
    pub fn compute(&self, index: u64) -> Result<DecimalBig, ServiceError> {
        let requests = self.requests.as_ref().ok_or(ServiceError::Disconnected)?;
        let (reply, response) = bounded(1);
        requests
            .send(Request { index, reply })
            .map_err(|_| ServiceError::Disconnected)?;
        let result = response.recv().map_err(|_| ServiceError::Disconnected)?;
        Ok(result?)
    }
}

impl Drop for FibService {
    fn drop(&mut self) {
        // Closing the queue ends the worker loop.
        drop(self.requests.take());
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}
