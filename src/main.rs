use tradebook_reminders::telemetry::{get_subscriber, init_subscriber};
use tradebook_reminders::Engine;
use tradebook_reminders_infra::setup_context;

#[tokio::main]
async fn main() {
    let subscriber = get_subscriber("tradebook_reminders".into(), "info".into());
    init_subscriber(subscriber);

    let context = setup_context();

    let engine = Engine::new(context);
    let job = engine.start();
    let _ = job.await;
}
