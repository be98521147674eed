use crate::channels;
use crate::eligibility;
use crate::error::CoreError;
use crate::shared::usecase::UseCase;
use tradebook_reminders_domain::{DeliveryRecord, RecurrenceError, Reminder, ReminderStatus};
use tradebook_reminders_infra::TradebookContext;
use tracing::info;

/// One dispatch cycle: pull due reminders, guard-filter, fan delivery
/// out, record history, advance recurrence or terminate.
///
/// At most one attempt is made per occurrence; a missed or failed fire
/// is never retried, the schedule simply moves on.
#[derive(Debug)]
pub struct DispatchDueRemindersUseCase;

/// Counters for one cycle, mostly for logs and tests.
#[derive(Debug, Default, PartialEq)]
pub struct DispatchReport {
    pub due: usize,
    pub fired: usize,
    pub skipped: usize,
    pub auto_completed: usize,
}

#[derive(Debug, PartialEq)]
pub enum UseCaseError {
    StorageError,
}

impl From<UseCaseError> for CoreError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::StorageError => Self::InternalError,
        }
    }
}

#[async_trait::async_trait]
impl UseCase for DispatchDueRemindersUseCase {
    type Response = DispatchReport;

    type Error = UseCaseError;

    const NAME: &'static str = "DispatchDueReminders";

    async fn execute(&mut self, ctx: &TradebookContext) -> Result<Self::Response, Self::Error> {
        let now = ctx.sys.get_timestamp_millis();

        // A store failure here aborts the whole cycle; nothing has
        // been mutated yet and the next interval retries.
        let due = ctx
            .repos
            .reminders
            .find_due(now)
            .await
            .map_err(|_| UseCaseError::StorageError)?;

        let mut report = DispatchReport {
            due: due.len(),
            ..Default::default()
        };

        for reminder in due {
            if !eligibility::should_fire(&reminder, ctx).await {
                report.skipped += 1;
                continue;
            }

            let channels_to_try = eligibility::allowed_channels(&reminder, ctx).await;
            let attempts = channels::send_all(&reminder, &channels_to_try, ctx).await;
            let any_success =
                attempts.is_empty() || attempts.iter().any(|a| a.result.is_ok());

            // The advanced schedule is persisted before the history
            // records. If the save fails the occurrence is simply
            // re-attempted next cycle; the reverse order would leave a
            // pending reminder whose own records block the Guard's
            // window check on every later cycle.
            let advanced = advance(reminder, any_success, now, &mut report);
            ctx.repos
                .reminders
                .save(&advanced)
                .await
                .map_err(|_| UseCaseError::StorageError)?;

            for attempt in &attempts {
                let record = match &attempt.result {
                    Ok(()) => DeliveryRecord::success(advanced.id.clone(), attempt.channel, now),
                    Err(reason) => DeliveryRecord::failure(
                        advanced.id.clone(),
                        attempt.channel,
                        now,
                        reason.clone(),
                    ),
                };
                ctx.repos
                    .delivery_records
                    .insert(&record)
                    .await
                    .map_err(|_| UseCaseError::StorageError)?;
            }
            report.fired += 1;
        }

        Ok(report)
    }
}

/// Applies the post-fire state transition. Recurring reminders stay
/// pending with an advanced `next_send_at`, even when every channel
/// failed; one-off reminders become sent.
fn advance(
    mut reminder: Reminder,
    any_success: bool,
    now: i64,
    report: &mut DispatchReport,
) -> Reminder {
    if any_success {
        reminder.last_sent_at = Some(now);
    }

    match &reminder.recurrence {
        Some(pattern) => match pattern.next_occurrence(now, reminder.timezone) {
            Ok(next) => reminder.next_send_at = Some(next),
            Err(RecurrenceError::NoFutureOccurrence) | Err(RecurrenceError::InvalidPattern(_)) => {
                info!(
                    "Recurrence of reminder {} is exhausted, auto-completing",
                    reminder.id
                );
                reminder.status = ReminderStatus::Completed;
                reminder.is_active = false;
                reminder.next_send_at = None;
                report.auto_completed += 1;
            }
        },
        None => {
            reminder.status = ReminderStatus::Sent;
            reminder.next_send_at = None;
        }
    }
    reminder.updated = now;
    reminder
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::reminder::{CancelReminderUseCase, CreateReminderUseCase};
    use crate::shared::usecase::execute;
    use chrono::prelude::*;
    use chrono_tz::UTC;
    use std::sync::Arc;
    use tradebook_reminders_domain::{
        DeliveryChannelKind, DeliveryOutcome, NotificationPreferences, Owner, Priority,
        ReminderCategory, ReminderSource, ID,
    };
    use tradebook_reminders_infra::{
        setup_context_inmemory, IReminderRepo, InMemoryMailer, InMemoryReminderRepo,
        ReminderQuery, StaticEligibilityPredicate, StaticSys, TradebookContext,
    };

    const HOUR: i64 = 1000 * 60 * 60;

    /// Wraps the in-memory reminder repo and fails a configurable
    /// number of upcoming calls, like a store losing its connection.
    struct FlakyReminderRepo {
        inner: InMemoryReminderRepo,
        failing_saves: std::sync::atomic::AtomicUsize,
        failing_finds: std::sync::atomic::AtomicUsize,
    }

    impl FlakyReminderRepo {
        fn new() -> Self {
            Self {
                inner: InMemoryReminderRepo::new(),
                failing_saves: Default::default(),
                failing_finds: Default::default(),
            }
        }

        fn fail_next_save(&self) {
            self.failing_saves
                .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        }

        fn fail_next_find_due(&self) {
            self.failing_finds
                .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        }

        fn take_failure(counter: &std::sync::atomic::AtomicUsize) -> bool {
            use std::sync::atomic::Ordering::SeqCst;
            if counter.load(SeqCst) > 0 {
                counter.fetch_sub(1, SeqCst);
                true
            } else {
                false
            }
        }
    }

    #[async_trait::async_trait]
    impl IReminderRepo for FlakyReminderRepo {
        async fn insert(&self, reminder: &Reminder) -> anyhow::Result<()> {
            self.inner.insert(reminder).await
        }

        async fn save(&self, reminder: &Reminder) -> anyhow::Result<()> {
            if Self::take_failure(&self.failing_saves) {
                anyhow::bail!("connection reset");
            }
            self.inner.save(reminder).await
        }

        async fn find(&self, reminder_id: &ID) -> Option<Reminder> {
            self.inner.find(reminder_id).await
        }

        async fn find_by_owner(
            &self,
            owner_id: &ID,
            query: ReminderQuery,
        ) -> Vec<Reminder> {
            self.inner.find_by_owner(owner_id, query).await
        }

        async fn find_due(
            &self,
            before: i64,
        ) -> anyhow::Result<Vec<Reminder>> {
            if Self::take_failure(&self.failing_finds) {
                anyhow::bail!("connection reset");
            }
            self.inner.find_due(before).await
        }
    }

    fn utc_ms(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> i64 {
        Utc.ymd(y, mo, d).and_hms(h, mi, 0).timestamp_millis()
    }

    async fn setup(now: i64) -> (TradebookContext, ID) {
        let mut ctx = setup_context_inmemory();
        ctx.sys = Arc::new(StaticSys(now));
        let owner = Owner::new(Some("trader@example.com".into()));
        let owner_id = owner.id.clone();
        ctx.repos.owners.insert(&owner).await.unwrap();
        (ctx, owner_id)
    }

    async fn insert_reminder(
        ctx: &TradebookContext,
        owner_id: ID,
        reminder_time: i64,
        recurrence: Option<&str>,
        source: ReminderSource,
    ) -> tradebook_reminders_domain::Reminder {
        execute(
            CreateReminderUseCase {
                owner_id,
                title: "Review the session".into(),
                description: "Write down what worked and what did not".into(),
                category: ReminderCategory::Trading,
                reminder_time,
                timezone: UTC,
                recurrence: recurrence.map(|p| p.parse().unwrap()),
                send_email: true,
                send_in_app: true,
                email_subject: None,
                email_body: None,
                priority: Priority::Medium,
                source,
            },
            ctx,
        )
        .await
        .unwrap()
    }

    async fn run_dispatch(ctx: &TradebookContext, at: i64) -> DispatchReport {
        let mut ctx = ctx.clone();
        ctx.sys = Arc::new(StaticSys(at));
        execute(DispatchDueRemindersUseCase, &ctx).await.unwrap()
    }

    // Scenario A: one-off reminder due for an hour, both channels
    // enabled: one record per channel, status becomes sent.
    #[tokio::test]
    async fn one_off_reminder_fires_once_on_both_channels() {
        let now = utc_ms(2021, 2, 17, 12, 0);
        let (ctx, owner_id) = setup(now).await;
        let reminder = insert_reminder(&ctx, owner_id, now + HOUR, None, ReminderSource::Owner).await;

        let report = run_dispatch(&ctx, now + 2 * HOUR).await;
        assert_eq!(report.fired, 1);

        let records = ctx
            .repos
            .delivery_records
            .find_by_reminder(&reminder.id)
            .await;
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.is_success()));

        let stored = ctx.repos.reminders.find(&reminder.id).await.unwrap();
        assert_eq!(stored.status, ReminderStatus::Sent);
        assert_eq!(stored.next_send_at, None);
        assert_eq!(stored.last_sent_at, Some(now + 2 * HOUR));

        // Never appears in a later due-query
        let report = run_dispatch(&ctx, now + 3 * HOUR).await;
        assert_eq!(report.due, 0);
    }

    #[tokio::test]
    async fn not_due_reminder_is_left_alone() {
        let now = utc_ms(2021, 2, 17, 12, 0);
        let (ctx, owner_id) = setup(now).await;
        insert_reminder(&ctx, owner_id, now + 2 * HOUR, None, ReminderSource::Owner).await;

        let report = run_dispatch(&ctx, now + HOUR).await;
        assert_eq!(report.due, 0);
        assert_eq!(report.fired, 0);
    }

    // Scenario C: a record already inside the tolerance window means
    // the guard skips and no channel is called.
    #[tokio::test]
    async fn repeated_dispatch_does_not_double_fire() {
        let now = utc_ms(2021, 2, 17, 12, 0);
        let (ctx, owner_id) = setup(now).await;
        let reminder = insert_reminder(&ctx, owner_id, now + HOUR, None, ReminderSource::Owner).await;

        let first = run_dispatch(&ctx, now + HOUR + 1).await;
        assert_eq!(first.fired, 1);

        // Status is already sent, so the reminder is not even due;
        // force it back to pending to exercise the window check alone.
        let mut stored = ctx.repos.reminders.find(&reminder.id).await.unwrap();
        stored.status = ReminderStatus::Pending;
        stored.is_active = true;
        stored.next_send_at = Some(now + HOUR);
        ctx.repos.reminders.save(&stored).await.unwrap();

        let second = run_dispatch(&ctx, now + HOUR + 2).await;
        assert_eq!(second.fired, 0);
        assert_eq!(second.skipped, 1);

        let records = ctx
            .repos
            .delivery_records
            .find_by_reminder(&reminder.id)
            .await;
        assert_eq!(records.len(), 2); // still only the first cycle's two channels
    }

    // Scenario D: email fails, in-app succeeds: one failed and one
    // successful record, and a recurring reminder still advances.
    #[tokio::test]
    async fn recurring_reminder_advances_past_failed_email() {
        let now = utc_ms(2021, 2, 17, 8, 0); // Wednesday
        let (mut ctx, owner_id) = setup(now).await;
        ctx.services.mailer = Arc::new(InMemoryMailer::failing());

        let reminder = insert_reminder(
            &ctx,
            owner_id,
            now + 1000 * 60,
            Some("15 9 * * 1-5"),
            ReminderSource::Owner,
        )
        .await;
        assert_eq!(reminder.next_send_at, Some(utc_ms(2021, 2, 17, 9, 15)));

        let fire_at = utc_ms(2021, 2, 17, 9, 16);
        let report = run_dispatch(&ctx, fire_at).await;
        assert_eq!(report.fired, 1);

        let records = ctx
            .repos
            .delivery_records
            .find_by_reminder(&reminder.id)
            .await;
        assert_eq!(records.len(), 2);
        let email = records
            .iter()
            .find(|r| r.channel == DeliveryChannelKind::Email)
            .unwrap();
        assert_eq!(email.outcome, DeliveryOutcome::Failure);
        assert!(email.error.is_some());
        let in_app = records
            .iter()
            .find(|r| r.channel == DeliveryChannelKind::InApp)
            .unwrap();
        assert_eq!(in_app.outcome, DeliveryOutcome::Success);

        let stored = ctx.repos.reminders.find(&reminder.id).await.unwrap();
        assert_eq!(stored.status, ReminderStatus::Pending);
        assert_eq!(stored.next_send_at, Some(utc_ms(2021, 2, 18, 9, 15)));
    }

    #[tokio::test]
    async fn recurring_reminder_fires_n_times_with_increasing_next_send_at() {
        let now = utc_ms(2021, 2, 15, 8, 0); // Monday
        let (ctx, owner_id) = setup(now).await;
        let reminder = insert_reminder(
            &ctx,
            owner_id,
            now + 1000 * 60,
            Some("15 9 * * 1-5"),
            ReminderSource::Owner,
        )
        .await;

        let mut fire_times = Vec::new();
        let mut cursor = now;
        for _ in 0..3 {
            let stored = ctx.repos.reminders.find(&reminder.id).await.unwrap();
            let next = stored.next_send_at.unwrap();
            assert!(next > cursor);
            cursor = next;
            let report = run_dispatch(&ctx, next + 1000).await;
            assert_eq!(report.fired, 1);
            fire_times.push(next);
        }

        let records = ctx
            .repos
            .delivery_records
            .find_by_reminder(&reminder.id)
            .await;
        // 3 fires, 2 channels each
        assert_eq!(records.len(), 6);
        assert!(records.iter().all(|r| r.is_success()));

        // Mon, Tue, Wed 09:15
        assert_eq!(fire_times[0], utc_ms(2021, 2, 15, 9, 15));
        assert_eq!(fire_times[1], utc_ms(2021, 2, 16, 9, 15));
        assert_eq!(fire_times[2], utc_ms(2021, 2, 17, 9, 15));
    }

    #[tokio::test]
    async fn cancelled_reminder_never_produces_records() {
        let now = utc_ms(2021, 2, 17, 12, 0);
        let (ctx, owner_id) = setup(now).await;
        let reminder =
            insert_reminder(&ctx, owner_id.clone(), now + HOUR, None, ReminderSource::Owner).await;

        execute(
            CancelReminderUseCase {
                reminder_id: reminder.id.clone(),
                owner_id,
            },
            &ctx,
        )
        .await
        .unwrap();

        let report = run_dispatch(&ctx, now + 2 * HOUR).await;
        assert_eq!(report.due, 0);

        let records = ctx
            .repos
            .delivery_records
            .find_by_reminder(&reminder.id)
            .await;
        assert!(records.is_empty());
    }

    // Scenario E: the global smart-reminders switch suppresses
    // template-driven reminders but not owner-created ones.
    #[tokio::test]
    async fn smart_reminders_preference_suppresses_templates_only() {
        let now = utc_ms(2021, 2, 17, 12, 0);
        let (ctx, owner_id) = setup(now).await;

        ctx.repos
            .preferences
            .save(
                &owner_id,
                &NotificationPreferences {
                    smart_reminders: false,
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let user_made =
            insert_reminder(&ctx, owner_id.clone(), now + HOUR, None, ReminderSource::Owner).await;
        let template_driven = insert_reminder(
            &ctx,
            owner_id,
            now + HOUR,
            None,
            ReminderSource::Template("journal_entry_nudge".into()),
        )
        .await;

        let report = run_dispatch(&ctx, now + 2 * HOUR).await;
        assert_eq!(report.fired, 1);
        assert_eq!(report.skipped, 1);

        assert_eq!(
            ctx.repos
                .delivery_records
                .find_by_reminder(&user_made.id)
                .await
                .len(),
            2
        );
        assert!(ctx
            .repos
            .delivery_records
            .find_by_reminder(&template_driven.id)
            .await
            .is_empty());
    }

    #[tokio::test]
    async fn failing_predicate_skips_template_driven_reminder() {
        let now = utc_ms(2021, 2, 17, 12, 0);
        let (mut ctx, owner_id) = setup(now).await;
        ctx.services.predicate = Arc::new(StaticEligibilityPredicate { eligible: false });

        insert_reminder(
            &ctx,
            owner_id,
            now + HOUR,
            None,
            ReminderSource::Template("weekly_performance_report".into()),
        )
        .await;

        let report = run_dispatch(&ctx, now + 2 * HOUR).await;
        assert_eq!(report.fired, 0);
        assert_eq!(report.skipped, 1);
    }

    #[tokio::test]
    async fn email_preference_disables_email_channel_only() {
        let now = utc_ms(2021, 2, 17, 12, 0);
        let (ctx, owner_id) = setup(now).await;

        ctx.repos
            .preferences
            .save(
                &owner_id,
                &NotificationPreferences {
                    email_notifications: false,
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let reminder =
            insert_reminder(&ctx, owner_id, now + HOUR, None, ReminderSource::Owner).await;
        let report = run_dispatch(&ctx, now + 2 * HOUR).await;
        assert_eq!(report.fired, 1);

        let records = ctx
            .repos
            .delivery_records
            .find_by_reminder(&reminder.id)
            .await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].channel, DeliveryChannelKind::InApp);
    }

    #[tokio::test]
    async fn exhausted_recurrence_auto_completes_after_final_fire() {
        let now = utc_ms(2021, 2, 17, 8, 0);
        let (ctx, owner_id) = setup(now).await;
        let reminder = insert_reminder(
            &ctx,
            owner_id,
            now + 1000 * 60,
            Some("15 9 * * 1-5"),
            ReminderSource::Owner,
        )
        .await;

        // Swap in a pattern with no satisfiable date, as if the owner
        // edited the schedule while an occurrence was already queued.
        let mut stored = ctx.repos.reminders.find(&reminder.id).await.unwrap();
        stored.recurrence = Some("0 12 31 2 *".parse().unwrap());
        ctx.repos.reminders.save(&stored).await.unwrap();

        let fire_at = utc_ms(2021, 2, 17, 9, 16);
        let report = run_dispatch(&ctx, fire_at).await;
        assert_eq!(report.fired, 1);
        assert_eq!(report.auto_completed, 1);

        let stored = ctx.repos.reminders.find(&reminder.id).await.unwrap();
        assert_eq!(stored.status, ReminderStatus::Completed);
        assert!(!stored.is_active);
        assert_eq!(stored.next_send_at, None);
        assert_eq!(stored.last_sent_at, Some(fire_at));
    }

    #[tokio::test]
    async fn find_due_failure_aborts_cycle_with_storage_error() {
        let now = utc_ms(2021, 2, 17, 12, 0);
        let (mut ctx, owner_id) = setup(now).await;
        let flaky = Arc::new(FlakyReminderRepo::new());
        ctx.repos.reminders = flaky.clone();
        insert_reminder(&ctx, owner_id, now + HOUR, None, ReminderSource::Owner).await;

        flaky.fail_next_find_due();
        let mut dispatch_ctx = ctx.clone();
        dispatch_ctx.sys = Arc::new(StaticSys(now + 2 * HOUR));
        let res = execute(DispatchDueRemindersUseCase, &dispatch_ctx).await;
        assert_eq!(res.unwrap_err(), UseCaseError::StorageError);

        // The next cycle proceeds normally
        let report = run_dispatch(&ctx, now + 2 * HOUR).await;
        assert_eq!(report.fired, 1);
    }

    // A reminder whose save fails after the channels were attempted
    // must stay cleanly retryable: no history rows for the failed
    // cycle, so the next cycle fires it instead of the window check
    // locking it out forever.
    #[tokio::test]
    async fn save_failure_leaves_occurrence_retryable() {
        let now = utc_ms(2021, 2, 17, 8, 0); // Wednesday
        let (mut ctx, owner_id) = setup(now).await;
        let flaky = Arc::new(FlakyReminderRepo::new());
        ctx.repos.reminders = flaky.clone();

        let recurring = insert_reminder(
            &ctx,
            owner_id.clone(),
            now + 1000 * 60,
            Some("15 9 * * 1-5"),
            ReminderSource::Owner,
        )
        .await;
        let untouched =
            insert_reminder(&ctx, owner_id, now + 2 * HOUR, None, ReminderSource::Owner).await;

        flaky.fail_next_save();
        let fire_at = utc_ms(2021, 2, 17, 9, 16);
        let mut dispatch_ctx = ctx.clone();
        dispatch_ctx.sys = Arc::new(StaticSys(fire_at));
        let res = execute(DispatchDueRemindersUseCase, &dispatch_ctx).await;
        assert_eq!(res.unwrap_err(), UseCaseError::StorageError);

        // Nothing was persisted for the aborted cycle
        assert!(ctx
            .repos
            .delivery_records
            .find_by_reminder(&recurring.id)
            .await
            .is_empty());
        let stored = ctx.repos.reminders.find(&recurring.id).await.unwrap();
        assert_eq!(stored.status, ReminderStatus::Pending);
        assert_eq!(stored.next_send_at, recurring.next_send_at);
        let stored = ctx.repos.reminders.find(&untouched.id).await.unwrap();
        assert_eq!(stored.next_send_at, untouched.next_send_at);

        // With the store healthy again the occurrence fires and the
        // schedule advances, minutes later and still on later days
        let retry_at = utc_ms(2021, 2, 17, 9, 18);
        let report = run_dispatch(&ctx, retry_at).await;
        assert_eq!(report.fired, 1);
        assert_eq!(
            ctx.repos
                .delivery_records
                .find_by_reminder(&recurring.id)
                .await
                .len(),
            2
        );
        let stored = ctx.repos.reminders.find(&recurring.id).await.unwrap();
        assert_eq!(stored.status, ReminderStatus::Pending);
        assert_eq!(stored.next_send_at, Some(utc_ms(2021, 2, 18, 9, 15)));

        let two_days_later = run_dispatch(&ctx, utc_ms(2021, 2, 19, 9, 16)).await;
        assert_eq!(two_days_later.fired, 2); // recurring + the one-off
    }

    #[tokio::test]
    async fn in_app_alert_reaches_subscribed_client() {
        let now = utc_ms(2021, 2, 17, 12, 0);
        let (ctx, owner_id) = setup(now).await;
        let reminder =
            insert_reminder(&ctx, owner_id.clone(), now + HOUR, None, ReminderSource::Owner).await;

        let mut rx = ctx.services.bus.subscribe(&owner_id);
        run_dispatch(&ctx, now + 2 * HOUR).await;

        let alert = rx.recv().await.unwrap();
        assert_eq!(alert.reminder_id, reminder.id);
        assert_eq!(alert.title, reminder.title);
        assert_eq!(alert.priority, Priority::Medium);
        assert_eq!(
            alert.display_millis,
            Priority::Medium.display_duration_millis()
        );
    }
}
