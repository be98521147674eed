pub mod telemetry;

use tokio::task::JoinHandle;
use tradebook_reminders_core::start_dispatch_job;
use tradebook_reminders_infra::TradebookContext;

pub use tradebook_reminders_core as usecases;
pub use tradebook_reminders_domain as domain;
pub use tradebook_reminders_infra as infra;

/// The reminder engine: owns the context and the background dispatch
/// loop. The embedding application keeps one of these alive for its
/// whole lifetime.
pub struct Engine {
    context: TradebookContext,
}

impl Engine {
    pub fn new(context: TradebookContext) -> Self {
        Self { context }
    }

    /// Starts the minute-aligned dispatch loop. The returned handle
    /// finishes only if the loop panics, so callers usually just hold
    /// onto it.
    pub fn start(&self) -> JoinHandle<()> {
        start_dispatch_job(self.context.clone())
    }

    pub fn context(&self) -> &TradebookContext {
        &self.context
    }
}
