//! Lazily loaded shared model
//!
//! The slot is filled on first use and kept for the life of the process.
//! One lock guards both loading and use, so concurrent first callers trigger
//! a single load and inference on the shared instance is serialized. A failed
//! load leaves the slot empty and the next caller tries again.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use parking_lot::Mutex;

use super::{ClassifierError, ClassifierResult};

type Loader<M> = Box<dyn Fn() -> ClassifierResult<M> + Send + Sync>;

pub struct LazyModel<M> {
    slot: Mutex<Option<M>>,
    loader: Loader<M>,
    loaded: AtomicBool,
    load_attempts: AtomicU64,
    load_failures: AtomicU64,
}

impl<M> LazyModel<M> {
    pub fn new(loader: impl Fn() -> ClassifierResult<M> + Send + Sync + 'static) -> Self {
        Self {
            slot: Mutex::new(None),
            loader: Box::new(loader),
            loaded: AtomicBool::new(false),
            load_attempts: AtomicU64::new(0),
            load_failures: AtomicU64::new(0),
        }
    }

    /// Run `f` against the model, loading it first if needed.
    pub fn with<R>(&self, f: impl FnOnce(&mut M) -> ClassifierResult<R>) -> ClassifierResult<R> {
        let mut slot = self.slot.lock();

        if slot.is_none() {
            *slot = Some(self.load()?);
            self.loaded.store(true, Ordering::Release);
        }

        match slot.as_mut() {
            Some(model) => f(model),
            None => Err(ClassifierError::ModelLoad(
                "model slot empty after load".to_string(),
            )),
        }
    }

    fn load(&self) -> ClassifierResult<M> {
        let attempt = self.load_attempts.fetch_add(1, Ordering::Relaxed) + 1;
        tracing::info!(attempt, "Loading zero-shot model (first request)...");

        match (self.loader)() {
            Ok(model) => {
                tracing::info!("Model loaded");
                Ok(model)
            }
            Err(e) => {
                self.load_failures.fetch_add(1, Ordering::Relaxed);
                tracing::error!(attempt, error = %e, "Model load failed, will retry on next request");
                Err(e)
            }
        }
    }

    /// Does not wait on a load or inference in progress.
    pub fn is_loaded(&self) -> bool {
        self.loaded.load(Ordering::Acquire)
    }

    pub fn load_attempts(&self) -> u64 {
        self.load_attempts.load(Ordering::Relaxed)
    }

    pub fn load_failures(&self) -> u64 {
        self.load_failures.load(Ordering::Relaxed)
    }
}
