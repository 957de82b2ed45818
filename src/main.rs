use anyhow::Context;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use seathold::{config::Config, ReservationService};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Config::from_env();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&config.app.rust_log))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Seathold demo");

    let service = ReservationService::from_config(&config);
    info!(
        available = service.available_seat_count(),
        "Venue built from config"
    );

    // Короткий сценарий: бронь с подтверждением и бронь с отменой
    let hold = service
        .find_and_hold_seats(5, "alice@example.com")
        .context("holding 5 seats in a fresh venue")?;
    info!(hold_id = hold.id, total = hold.total_price, "Held 5 seats");

    let code = service
        .confirm_hold(hold.id, "alice@example.com")
        .context("confirming alice's hold")?;
    let commitment = service
        .commitment(&code)
        .context("confirmed code is always queryable")?;
    info!(
        commitment = %serde_json::to_string(&commitment)?,
        "Confirmed, seats are sold"
    );

    let hold = service
        .find_and_hold_seats(3, "bob@example.com")
        .context("holding 3 seats for bob")?;
    service
        .cancel_hold(hold.id, "bob@example.com")
        .context("cancelling bob's hold")?;

    info!(
        available = service.available_seat_count(),
        outstanding = service.outstanding_holds(),
        "Demo finished"
    );
    Ok(())
}
