//! Random group generation.
//!
//! Builds groups with arbitrary members, purchases and transfers to
//! exercise the settlement engine at sizes no real money pool reaches.

use crate::core::currency::Currency;
use crate::core::error::LedgerError;
use crate::core::group::Group;
use crate::core::timestamp::TimeStamp;
use chrono::{Duration, NaiveDate};
use rand::seq::SliceRandom;
use rand::Rng;

/// Configuration for generating a random group.
#[derive(Debug, Clone)]
pub struct GroupConfig {
    /// Number of members.
    pub member_count: usize,
    /// Number of purchases.
    pub purchase_count: usize,
    /// Number of transfers.
    pub transfer_count: usize,
    /// Group currency.
    pub currency: Currency,
    /// Foreign currencies entries may use, with their exchange rates.
    pub foreign_rates: Vec<(Currency, f64)>,
    /// Minimum entry amount.
    pub min_amount: f64,
    /// Maximum entry amount.
    pub max_amount: f64,
}

impl Default for GroupConfig {
    fn default() -> Self {
        Self {
            member_count: 6,
            purchase_count: 30,
            transfer_count: 5,
            currency: Currency::Euro,
            foreign_rates: Vec::new(),
            min_amount: 1.0,
            max_amount: 500.0,
        }
    }
}

/// Generate a random group using the thread-local generator.
pub fn generate_random_group(config: &GroupConfig) -> Result<Group, LedgerError> {
    generate_random_group_with(config, &mut rand::thread_rng())
}

/// Generate a random group from the given generator.
///
/// With a seeded generator the result is reproducible.
pub fn generate_random_group_with<R: Rng>(
    config: &GroupConfig,
    rng: &mut R,
) -> Result<Group, LedgerError> {
    let mut group = Group::new(
        "Random group",
        format!(
            "{} members, {} purchases, {} transfers",
            config.member_count, config.purchase_count, config.transfer_count
        ),
        config.currency,
    );
    for (currency, rate) in &config.foreign_rates {
        group.set_exchange_rate(*currency, *rate)?;
    }

    let names: Vec<String> = (0..config.member_count)
        .map(|i| format!("member-{:03}", i))
        .collect();
    for name in &names {
        group.add_member(name.as_str())?;
    }
    if names.is_empty() {
        return Ok(group);
    }

    let currencies: Vec<Currency> = std::iter::once(config.currency)
        .chain(config.foreign_rates.iter().map(|(c, _)| *c))
        .collect();
    for i in 0..config.purchase_count {
        let purchaser = &names[rng.gen_range(0..names.len())];
        let recipient_count = rng.gen_range(1..=names.len());
        let recipients: Vec<&str> = names
            .choose_multiple(rng, recipient_count)
            .map(|n| n.as_str())
            .collect();
        let amount = random_amount(config, rng);
        let currency = currencies[rng.gen_range(0..currencies.len())];
        let date = random_date(rng);
        group.add_purchase(
            &format!("purchase-{:04}", i),
            purchaser,
            &recipients,
            amount,
            currency,
            date,
        )?;
    }

    for i in 0..config.transfer_count {
        let purchaser = &names[rng.gen_range(0..names.len())];
        let recipient = &names[rng.gen_range(0..names.len())];
        let amount = random_amount(config, rng);
        let currency = currencies[rng.gen_range(0..currencies.len())];
        let date = random_date(rng);
        group.add_transfer(
            &format!("transfer-{:04}", i),
            purchaser,
            recipient,
            amount,
            currency,
            date,
        )?;
    }

    Ok(group)
}

/// A date within 2024.
fn random_date<R: Rng>(rng: &mut R) -> TimeStamp {
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or(NaiveDate::MIN);
    TimeStamp::from_date(start + Duration::days(rng.gen_range(0..366)))
}

fn random_amount<R: Rng>(config: &GroupConfig, rng: &mut R) -> f64 {
    let low = config.min_amount.max(0.01);
    let high = config.max_amount.max(low + 0.01);
    (rng.gen_range(low..high) * 100.0).round() / 100.0
}
