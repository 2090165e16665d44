use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::Notify;

use insightboard::dag::TaskRecord;
use insightboard::errors::InsightError;
use insightboard::extract::{ExtractFuture, ExtractorBackend};

/// Returns the same records for every transcript and counts its calls.
pub struct FixedExtractor {
    records: Vec<TaskRecord>,
    calls: Arc<AtomicUsize>,
}

impl FixedExtractor {
    pub fn new(records: Vec<TaskRecord>) -> Self {
        Self {
            records,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Shared call counter; clone it before handing the extractor over.
    pub fn calls(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }
}

impl ExtractorBackend for FixedExtractor {
    fn extract<'a>(&'a self, _transcript: &'a str) -> ExtractFuture<'a> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let records = self.records.clone();
        Box::pin(async move { Ok(records) })
    }
}

/// Always fails with an extraction error carrying `message`.
pub struct FailingExtractor {
    message: String,
}

impl FailingExtractor {
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}

impl ExtractorBackend for FailingExtractor {
    fn extract<'a>(&'a self, _transcript: &'a str) -> ExtractFuture<'a> {
        let message = self.message.clone();
        Box::pin(async move { Err(InsightError::Extraction(message)) })
    }
}

/// Panics inside extraction.
pub struct PanickingExtractor;

fn explode() -> Result<Vec<TaskRecord>, InsightError> {
    panic!("extractor blew up")
}

impl ExtractorBackend for PanickingExtractor {
    fn extract<'a>(&'a self, _transcript: &'a str) -> ExtractFuture<'a> {
        Box::pin(async move { explode() })
    }
}

/// Holds every extraction until `open()` is called, then returns its records.
///
/// Lets tests observe a job while it is still `processing`.
pub struct GatedExtractor {
    records: Vec<TaskRecord>,
    gate: Arc<Notify>,
    started: Arc<Notify>,
    extractions: Arc<AtomicUsize>,
}

impl GatedExtractor {
    pub fn new(records: Vec<TaskRecord>) -> Self {
        Self {
            records,
            gate: Arc::new(Notify::new()),
            started: Arc::new(Notify::new()),
            extractions: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Handle that releases waiting extractions.
    pub fn gate(&self) -> Arc<Notify> {
        Arc::clone(&self.gate)
    }

    /// Notified when an extraction has started and is waiting on the gate.
    pub fn started(&self) -> Arc<Notify> {
        Arc::clone(&self.started)
    }

    /// Number of extractions that have started so far.
    pub fn extractions(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.extractions)
    }
}

impl ExtractorBackend for GatedExtractor {
    fn extract<'a>(&'a self, _transcript: &'a str) -> ExtractFuture<'a> {
        let records = self.records.clone();
        let gate = Arc::clone(&self.gate);
        let started = Arc::clone(&self.started);
        let extractions = Arc::clone(&self.extractions);
        Box::pin(async move {
            extractions.fetch_add(1, Ordering::SeqCst);
            started.notify_one();
            gate.notified().await;
            Ok(records)
        })
    }
}
