//! `seed` subcommand: populate a running instance with synthetic accepted
//! orders, for manually exercising the command server and gateway without a
//! real warehouse feed.

use chrono::Duration;
use oms::domain::Packaging;
use oms::usecase::OrderUseCase;
use pvz_common::{OrderId, PvzResult, RecipientId};
use rand::distributions::{Alphanumeric, Distribution, Uniform};
use rand::{thread_rng, Rng};
use tracing::{info, warn};

const PACKAGING_CHOICES: [Packaging; 3] = [Packaging::Box, Packaging::Bag, Packaging::Film];

fn random_id(prefix: &str) -> String {
    let suffix: String = thread_rng()
        .sample_iter(&Alphanumeric)
        .take(10)
        .map(char::from)
        .collect();
    format!("{prefix}-{suffix}")
}

/// Create `count` random accepted orders against `use_case`, logging
/// progress and tolerating individual failures (an accidental ID collision
/// should not abort the whole batch).
pub async fn run(use_case: &OrderUseCase, count: usize) -> PvzResult<usize> {
    let cost_range = Uniform::from(1_000..=1_000_000);
    let weight_range = Uniform::from(10..=10_000);
    let storage_days = Uniform::from(1..=14);

    let mut created = 0;
    for _ in 0..count {
        let order_id = OrderId::from(random_id("ord"));
        let recipient_id = RecipientId::from(random_id("rcpt"));
        let mut rng = thread_rng();
        let cost = cost_range.sample(&mut rng);
        let weight = weight_range.sample(&mut rng);
        let packaging = PACKAGING_CHOICES[rng.gen_range(0..PACKAGING_CHOICES.len())];
        let additional_film = packaging != Packaging::Film && rng.gen_bool(0.5);
        let storage_time = Duration::days(storage_days.sample(&mut rng));

        match use_case
            .accept_order_delivery(
                order_id.clone(),
                recipient_id,
                storage_time,
                cost,
                weight,
                packaging,
                additional_film,
            )
            .await
        {
            Ok(_) => created += 1,
            Err(e) => warn!(%order_id, error = %e, "seed: failed to create order"),
        }
    }

    info!(created, requested = count, "seed: finished");
    Ok(created)
}
