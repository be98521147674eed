mod channels;
mod client_scheduler;
mod dispatcher;
mod eligibility;
mod error;
mod job_schedulers;
mod reminder;
mod shared;

pub use client_scheduler::{ClientScheduler, LocalAlert};
pub use dispatcher::{DispatchDueRemindersUseCase, DispatchReport};
pub use error::CoreError;
pub use job_schedulers::{get_start_delay, start_dispatch_job};
pub use reminder::{
    CancelReminderUseCase, CompleteReminderUseCase, CreateReminderUseCase,
    GetReminderHistoryUseCase, GetReminderUseCase, GetRemindersUseCase,
    ProvisionTemplateRemindersUseCase, UpdateReminderUseCase,
};
pub use shared::usecase::{execute, UseCase};
