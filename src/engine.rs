use crate::error::{FabricError, Result};
use crate::model::{LabelModel, LabelRequest, LabelResponse};
use std::{
    sync::{
        atomic::{AtomicU64, Ordering},
        mpsc,
    },
    thread::JoinHandle,
    time::{Duration, Instant},
};

type ReplySender<E> = mpsc::Sender<std::result::Result<LabelEngineResponse, E>>;

/// Internal job wrapper used by the engine to track label requests.
struct LabelEngineJob<E> {
    /// Unique identifier for this request.
    id: u64,
    /// The request to be processed by the model.
    request: LabelRequest,
    /// Where the worker delivers the outcome of this request.
    reply: ReplySender<E>,
}

/// Response returned by the engine containing both the model's response and telemetry data.
#[derive(Debug)]
pub struct LabelEngineResponse {
    /// Unique identifier assigned when the request was submitted.
    pub id: u64,
    /// Timestamp when the inference started.
    pub start_time: Instant,
    /// Total time taken for the inference.
    pub duration: Duration,
    /// The label produced by the model.
    pub label: String,
}

/// Owns a label model on a dedicated worker thread.
///
/// The model needs exclusive access while it runs, so requests from any number of
/// callers are queued on a channel and served one at a time. The engine itself is
/// shared read-only: callers submit through [`LabelEngine::infer`] and block until
/// their own reply arrives.
pub struct LabelEngine<M: LabelModel + Send + 'static> {
    req_tx: Option<mpsc::Sender<LabelEngineJob<M::Error>>>,
    worker: Option<JoinHandle<()>>,
    id_counter: AtomicU64,
}

impl<M: LabelModel + Send + 'static> LabelEngine<M> {
    /// Creates a new engine and moves `model` to its worker thread.
    ///
    /// A failed inference is reported to the caller that submitted it; the worker
    /// keeps serving subsequent requests.
    pub fn new(mut model: M) -> Self {
        let (req_tx, req_rx) = mpsc::channel::<LabelEngineJob<M::Error>>();

        let worker = std::thread::spawn(move || {
            while let Ok(job) = req_rx.recv() {
                log::debug!("Running label inference #{}", job.id);

                let start_time = Instant::now();
                let result = model.run(job.request).map(|LabelResponse { label }| {
                    LabelEngineResponse {
                        id: job.id,
                        start_time,
                        duration: start_time.elapsed(),
                        label,
                    }
                });

                match &result {
                    Ok(response) => log::debug!(
                        "Label inference #{} completed in {:?}",
                        response.id,
                        response.duration
                    ),
                    Err(e) => log::error!("Label inference #{} failed: {}", job.id, e),
                }

                // the caller may have gone away; nothing to do then
                let _ = job.reply.send(result);
            }
            log::debug!("Label engine worker stopped");
        });

        Self {
            req_tx: Some(req_tx),
            worker: Some(worker),
            id_counter: AtomicU64::new(0),
        }
    }

    /// Runs the model on `request` and waits for the result.
    ///
    /// # Errors
    /// Returns [`FabricError::InferenceFailure`] if the model fails, or if the
    /// engine was stopped or its worker died before replying.
    pub fn infer(&self, request: LabelRequest) -> Result<LabelEngineResponse> {
        let tx = self
            .req_tx
            .as_ref()
            .ok_or_else(|| FabricError::InferenceFailure("label engine is stopped".to_string()))?;

        let id = self.id_counter.fetch_add(1, Ordering::Relaxed);
        let (reply, reply_rx) = mpsc::channel();

        tx.send(LabelEngineJob { id, request, reply }).map_err(|_| {
            FabricError::InferenceFailure("label engine worker is not running".to_string())
        })?;

        match reply_rx.recv() {
            Ok(Ok(response)) => Ok(response),
            Ok(Err(e)) => Err(FabricError::InferenceFailure(e.to_string())),
            Err(_) => {
                log::error!("Label engine worker exited before replying to #{id}");
                Err(FabricError::InferenceFailure(
                    "label engine worker exited before replying".to_string(),
                ))
            }
        }
    }

    /// Number of requests submitted so far.
    pub fn submitted(&self) -> u64 {
        self.id_counter.load(Ordering::Relaxed)
    }

    /// Stops the engine and shuts down the worker thread.
    ///
    /// Closes the request channel and waits for the worker to finish the
    /// requests already queued.
    pub fn stop(&mut self) {
        self.req_tx.take();
        if let Some(handle) = self.worker.take() {
            let _ = handle.join();
        }
    }
}

impl<M: LabelModel + Send + 'static> Drop for LabelEngine<M> {
    fn drop(&mut self) {
        self.stop();
    }
}
