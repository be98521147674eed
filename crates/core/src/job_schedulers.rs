use crate::dispatcher::DispatchDueRemindersUseCase;
use crate::shared::usecase::execute;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{interval, sleep_until, Instant};
use tracing::warn;
use tradebook_reminders_infra::TradebookContext;

/// Seconds until the next minute boundary minus `secs_before_min`.
pub fn get_start_delay(now_ts: usize, secs_before_min: usize) -> usize {
    let secs_to_next_minute = 60 - (now_ts / 1000) % 60;
    if secs_to_next_minute > secs_before_min {
        secs_to_next_minute - secs_before_min
    } else {
        secs_to_next_minute + (60 - secs_before_min)
    }
}

/// Spawns the background dispatch loop. The first tick is aligned to a
/// minute boundary, then ticks repeat every `dispatch_interval_secs`.
/// A cycle that outlives its interval is not stacked, the tick is
/// skipped instead.
pub fn start_dispatch_job(ctx: TradebookContext) -> JoinHandle<()> {
    tokio::spawn(async move {
        let now = ctx.sys.get_timestamp_millis();
        let secs_to_next_run = get_start_delay(now as usize, 0);
        let start = Instant::now() + Duration::from_secs(secs_to_next_run as u64);
        sleep_until(start).await;

        let running = Arc::new(Mutex::new(()));
        let mut dispatch_interval =
            interval(Duration::from_secs(ctx.config.dispatch_interval_secs));
        loop {
            dispatch_interval.tick().await;
            let context = ctx.clone();
            let running = running.clone();
            tokio::spawn(async move {
                let _guard = match running.try_lock() {
                    Ok(guard) => guard,
                    Err(_) => {
                        warn!("Dispatch cycle still running, skipping this tick");
                        return;
                    }
                };
                let _ = execute(DispatchDueRemindersUseCase, &context).await;
            });
        }
    })
}
