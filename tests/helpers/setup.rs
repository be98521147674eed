use chrono::prelude::*;
use std::sync::Arc;
use tradebook_reminders::Engine;
use tradebook_reminders_domain::{Owner, ID};
use tradebook_reminders_infra::{setup_context_inmemory, StaticSys, TradebookContext};

pub fn utc_ms(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> i64 {
    Utc.ymd(y, mo, d).and_hms(h, mi, 0).timestamp_millis()
}

// Engine over in-memory stores with a pinned clock, plus one owner
// with an email address on file
pub async fn spawn_engine(now: i64) -> (Engine, ID) {
    let mut ctx = setup_context_inmemory();
    ctx.sys = Arc::new(StaticSys(now));

    let owner = Owner::new(Some("trader@example.com".into()));
    let owner_id = owner.id.clone();
    ctx.repos
        .owners
        .insert(&owner)
        .await
        .expect("Expected owner insert to succeed");

    (Engine::new(ctx), owner_id)
}

/// The engine's context with the clock pinned to `now` instead.
pub fn ctx_at(engine: &Engine, now: i64) -> TradebookContext {
    let mut ctx = engine.context().clone();
    ctx.sys = Arc::new(StaticSys(now));
    ctx
}
