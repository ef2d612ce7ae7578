//! Off-thread fetch execution and the per-screen fetch lifecycle.
//!
//! [`load`] runs one request on the tokio runtime and reports the outcome
//! through exactly one of two callbacks. Screens do not call it directly; they
//! go through a [`FetchSlot`], which tags every request with a generation and
//! posts the outcome as a [`Delivery`] into the renderer's channel. The renderer
//! hands deliveries back to the screen, and the screen only applies those its
//! slot still [accepts](FetchSlot::accepts).

use tokio::{sync::mpsc::UnboundedSender, task::JoinHandle};
use tracing::{debug, warn};

use crate::FetchError;

/// Result of one completed fetch, already reduced to what a screen shows.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome<T> {
    Success(T),
    Failure(String),
}

/// A fetch outcome on its way back to the rendering task.
#[derive(Debug, Clone, PartialEq)]
pub struct Delivery<T> {
    pub generation: u64,
    pub outcome: FetchOutcome<T>,
}

pub type DeliverySender<T> = UnboundedSender<Delivery<T>>;

/// Cancellation handle for a running fetch.
#[derive(Debug)]
pub struct FetchHandle {
    task: JoinHandle<()>,
}

impl FetchHandle {
    /// Aborts the fetch. A cancelled fetch never invokes its callbacks.
    pub fn cancel(&self) {
        self.task.abort();
    }
}

/// Spawns `request` and invokes `on_success` or `on_error` with the outcome.
///
/// Error callbacks receive the display form of the [`FetchError`]. Must be
/// called from within a tokio runtime.
pub fn load<T, Fut, S, E>(request: Fut, on_success: S, on_error: E) -> FetchHandle
where
    T: Send + 'static,
    Fut: Future<Output = Result<T, FetchError>> + Send + 'static,
    S: FnOnce(T) + Send + 'static,
    E: FnOnce(String) + Send + 'static,
{
    let task = tokio::spawn(async move {
        match request.await {
            Ok(value) => on_success(value),
            Err(err) => {
                warn!(error = %err, status = ?err.status_code(), "fetch failed");
                on_error(err.to_string());
            }
        }
    });

    FetchHandle { task }
}

/// Owns the single outstanding fetch of one screen.
#[derive(Debug, Default)]
pub struct FetchSlot {
    generation: u64,
    in_flight: Option<FetchHandle>,
    detached: bool,
}

impl FetchSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a fetch, superseding (and cancelling) any previous one.
    ///
    /// Returns the generation that the resulting [`Delivery`] will carry.
    pub fn start<T, Fut>(&mut self, request: Fut, tx: DeliverySender<T>) -> u64
    where
        T: Send + 'static,
        Fut: Future<Output = Result<T, FetchError>> + Send + 'static,
    {
        if let Some(previous) = self.in_flight.take() {
            debug!(generation = self.generation, "superseding in-flight fetch");
            previous.cancel();
        }

        self.generation += 1;
        self.detached = false;
        let generation = self.generation;

        let error_tx = tx.clone();
        let handle = load(
            request,
            move |value| post(&tx, Delivery { generation, outcome: FetchOutcome::Success(value) }),
            move |message| {
                post(&error_tx, Delivery { generation, outcome: FetchOutcome::Failure(message) })
            },
        );

        debug!(generation, "fetch started");
        self.in_flight = Some(handle);
        generation
    }

    /// True only for the latest started generation of a slot that is still attached.
    pub fn accepts(&self, generation: u64) -> bool {
        !self.detached && generation != 0 && generation == self.generation
    }

    /// Marks `generation` as delivered. Returns false for stale deliveries,
    /// which the caller must discard.
    pub fn settle(&mut self, generation: u64) -> bool {
        if !self.accepts(generation) {
            debug!(
                generation,
                current = self.generation,
                detached = self.detached,
                "dropping stale delivery"
            );
            return false;
        }

        self.in_flight = None;
        true
    }

    /// Teardown: cancels the outstanding fetch and rejects anything still queued.
    pub fn detach(&mut self) {
        if let Some(handle) = self.in_flight.take() {
            debug!(generation = self.generation, "cancelling fetch on detach");
            handle.cancel();
        }
        self.detached = true;
    }

    pub fn is_attached(&self) -> bool {
        !self.detached
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.is_some()
    }
}

impl Drop for FetchSlot {
    fn drop(&mut self) {
        if let Some(handle) = self.in_flight.take() {
            handle.cancel();
        }
    }
}

fn post<T>(tx: &DeliverySender<T>, delivery: Delivery<T>) {
    if tx.send(delivery).is_err() {
        debug!("renderer gone, discarding fetch outcome");
    }
}
