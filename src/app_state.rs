use std::sync::Arc;

use tokio::sync::Notify;

use crate::config::IntakeLimits;
use crate::services::intake::IntakeGateway;
use crate::services::job_store::JobStore;
use crate::services::printer::Printer;

/// Shared application state passed to all route handlers.
pub struct AppState<S, P> {
    pub store: Arc<S>,
    pub intake: Arc<IntakeGateway<S, P>>,
}

impl<S: JobStore, P: Printer> AppState<S, P> {
    /// `wakeup` is shared with the worker pool so inserts rouse an idle worker.
    pub fn new(store: Arc<S>, printer: Arc<P>, limits: IntakeLimits, wakeup: Arc<Notify>) -> Self {
        let intake = IntakeGateway::new(store.clone(), printer, limits, wakeup);
        Self {
            store,
            intake: Arc::new(intake),
        }
    }
}

impl<S, P> Clone for AppState<S, P> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            intake: self.intake.clone(),
        }
    }
}
