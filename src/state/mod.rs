/// Form mirror and its row bookkeeping.
pub mod form;
/// Transient user-facing messages.
pub mod notification;
mod sse;
/// Single-flight settlement submitter.
pub mod submission;

use std::{
    future::Future,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use tokio::sync::{Mutex as AsyncMutex, RwLock};
use tracing::{debug, warn};

use crate::{
    config::AppConfig,
    dao::{
        kv_store::KeyValueStore, models::StoreEntries, settlement_gateway::SettlementGateway,
        storage::StorageResult,
    },
    error::SettlementError,
    state::{
        form::FormState,
        notification::NotificationSink,
        submission::{SubmissionId, SubmissionMachine, SubmitControl},
    },
};

pub use self::sse::SseHub;

/// Handle to the application state shared by every handler.
pub type SharedState = Arc<AppState>;

const NOTIFICATION_CHANNEL_CAPACITY: usize = 16;

/// Central application state: the form mirror, its collaborators and the submitter.
pub struct AppState {
    store: Arc<dyn KeyValueStore>,
    gateway: Arc<dyn SettlementGateway>,
    form: RwLock<FormState>,
    form_writes: AsyncMutex<()>,
    submission: Mutex<SubmissionMachine>,
    notifications: NotificationSink,
    request_timeout: Duration,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    ///
    /// The form starts blank; restore it from the store before serving requests.
    pub fn new(
        config: &AppConfig,
        store: Arc<dyn KeyValueStore>,
        gateway: Arc<dyn SettlementGateway>,
    ) -> SharedState {
        Arc::new(Self {
            store,
            gateway,
            form: RwLock::new(FormState::default()),
            form_writes: AsyncMutex::new(()),
            submission: Mutex::new(SubmissionMachine::new()),
            notifications: NotificationSink::new(
                config.notification_ttl,
                NOTIFICATION_CHANNEL_CAPACITY,
            ),
            request_timeout: config.request_timeout,
        })
    }

    /// Durable key/value store backing the form.
    pub fn store(&self) -> Arc<dyn KeyValueStore> {
        self.store.clone()
    }

    /// Remote endpoint client.
    pub fn gateway(&self) -> Arc<dyn SettlementGateway> {
        self.gateway.clone()
    }

    /// Upper bound on one remote settlement call.
    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    /// User-facing message display.
    pub fn notifications(&self) -> &NotificationSink {
        &self.notifications
    }

    /// Run a read-only projection over the form.
    pub async fn read_form<R>(&self, f: impl FnOnce(&FormState) -> R) -> R {
        let guard = self.form.read().await;
        f(&guard)
    }

    /// Mutate the form under its write lock.
    pub async fn with_form_mut<R>(&self, f: impl FnOnce(&mut FormState) -> R) -> R {
        let mut guard = self.form.write().await;
        f(&mut guard)
    }

    /// Project the form into store entries and write them.
    ///
    /// Writers queue on one gate and take their snapshot only once admitted,
    /// so the store always ends with the latest form contents.
    pub async fn write_form(
        &self,
        entries: impl FnOnce(&FormState) -> StoreEntries,
    ) -> StorageResult<()> {
        let _gate = self.form_writes.lock().await;
        let entries = self.read_form(entries).await;
        self.store.set(entries).await
    }

    /// Whether a settlement attempt is running.
    pub fn is_submitting(&self) -> bool {
        self.submission_machine().is_in_flight()
    }

    /// Enabled state and label of the submit control.
    pub fn submit_control(&self) -> SubmitControl {
        self.submission_machine().control()
    }

    /// Run `work` as the single in-flight settlement attempt.
    ///
    /// Fails fast with [`SettlementError::AlreadyInFlight`] when another attempt
    /// is running. The submitter returns to idle on every exit path, including
    /// the future being dropped.
    pub async fn run_submission<F, Fut, T>(&self, work: F) -> Result<T, SettlementError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, SettlementError>>,
    {
        let id = self.submission_machine().begin()?;
        let _in_flight = InFlight { state: self, id };
        work().await
    }

    fn submission_machine(&self) -> MutexGuard<'_, SubmissionMachine> {
        self.submission
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

/// Returns the submitter to idle when dropped.
struct InFlight<'a> {
    state: &'a AppState,
    id: SubmissionId,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        match self.state.submission_machine().finish(self.id) {
            Ok(elapsed) => {
                debug!(submission_id = %self.id, elapsed = ?elapsed, "submitter released");
            }
            Err(err) => {
                warn!(submission_id = %self.id, error = %err, "failed to release submitter");
            }
        }
    }
}
