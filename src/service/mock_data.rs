use chrono::{DateTime, Duration, Utc};
use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::{models::ambassadormodel::Ambassador, service::referral::generate_referral_code};

pub const MOCK_SEED: u64 = 42;
pub const MOCK_AMBASSADOR_COUNT: usize = 260;

const COUNTRIES: &[&str] = &[
    "United States", "United Kingdom", "Canada", "Australia", "Germany", "France",
    "Japan", "Brazil", "India", "Mexico", "Singapore", "UAE", "South Korea",
    "Netherlands", "Switzerland", "Sweden", "Norway", "Spain", "Italy", "Portugal",
    "Poland", "Turkey", "Thailand", "Vietnam", "Philippines", "Indonesia", "Malaysia",
    "Hong Kong", "Taiwan", "Argentina", "Chile", "Colombia", "Peru",
];

const FIRST_NAMES: &[&str] = &[
    "Alex", "Jordan", "Casey", "Morgan", "Riley", "Taylor", "Avery", "Quinn", "Blake",
    "Drew", "Cameron", "Dakota", "Skyler", "River", "Phoenix", "Sage", "Storm", "Raven",
    "Kai", "Ash",
];

const LAST_NAMES: &[&str] = &[
    "Chen", "Smith", "Johnson", "Williams", "Brown", "Jones", "Garcia", "Miller", "Davis",
    "Rodriguez", "Martinez", "Hernandez", "Lopez", "Gonzalez", "Wilson", "Anderson",
    "Thomas", "Taylor", "Moore", "Jackson",
];

/// Deterministic fixture rows for local development, sorted by score descending.
pub fn generate_mock_ambassadors() -> Vec<Ambassador> {
    generate_with_seed(MOCK_SEED, MOCK_AMBASSADOR_COUNT)
}

pub fn generate_with_seed(seed: u64, count: usize) -> Vec<Ambassador> {
    let mut rng = StdRng::seed_from_u64(seed);
    let base_time = DateTime::<Utc>::from_timestamp(1_735_689_600, 0).unwrap_or_default();

    let mut ambassadors: Vec<Ambassador> = (0..count)
        .map(|i| {
            let invites = (rng.random::<f64>() * 500.0).floor() as i32 + 10;
            let bonus_multiplier = ((rng.random::<f64>() * 2.0 + 0.5) * 100.0).round() / 100.0;
            let score = (invites as f64 * 10.0 + bonus_multiplier * 100.0).round() as i32;

            let first_name = FIRST_NAMES[rng.random_range(0..FIRST_NAMES.len())];
            let last_name = LAST_NAMES[rng.random_range(0..LAST_NAMES.len())];
            let handle = format!(
                "@{}{}",
                first_name.to_lowercase(),
                rng.random_range(0..1000)
            );
            let wallet = format!(
                "0x{:08x}...{:04x}",
                rng.random_range(0..0xffff_ffffu32),
                rng.random_range(0..0xffffu32)
            );
            let country = COUNTRIES[rng.random_range(0..COUNTRIES.len())];
            let created_at = base_time + Duration::hours(i as i64);

            Ambassador {
                id: format!("amb-{}", i + 1),
                name: format!("{} {}", first_name, last_name),
                handle,
                country: country.to_string(),
                invites,
                score,
                referral_code: generate_referral_code(&mut rng),
                wallet: Some(wallet),
                bonus_multiplier: Some(bonus_multiplier),
                created_at,
                updated_at: created_at,
            }
        })
        .collect();

    ambassadors.sort_by(|a, b| b.score.cmp(&a.score));
    ambassadors
}

#[cfg(test)]
pub fn sample_ambassador(id: &str, referral_code: &str, score: i32) -> Ambassador {
    let created_at = DateTime::<Utc>::from_timestamp(1_735_689_600, 0).unwrap_or_default();
    Ambassador {
        id: id.to_string(),
        name: format!("Ambassador {}", id),
        handle: format!("@{}", id.replace('-', "")),
        country: "Canada".to_string(),
        invites: score / 10,
        score,
        referral_code: referral_code.to_string(),
        wallet: None,
        bonus_multiplier: None,
        created_at,
        updated_at: created_at,
    }
}
