//! Purchases in several currencies.
//!
//! Amounts stay in the currency they were paid in; balances convert them
//! with the rates configured at the time of the query.

use money_pool::core::currency::Currency;
use money_pool::core::group::Group;
use money_pool::core::timestamp::TimeStamp;
use money_pool::store::document::to_json;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("╔══════════════════════════════════════════╗");
    println!("║  money-pool: Foreign Currency Example    ║");
    println!("╚══════════════════════════════════════════╝\n");

    let mut group = Group::new("Interrail", "Three countries, one pool", Currency::Euro);
    for name in ["ana", "ben", "chloe"] {
        group.add_member(name)?;
    }
    let everyone = ["ana", "ben", "chloe"];
    let date: TimeStamp = "02.09.2024".parse()?;

    group.set_exchange_rate(Currency::CHF, 0.94)?;
    group.set_exchange_rate(Currency::CZK, 25.1)?;

    group.add_purchase("Train passes", "ana", &everyone, 750.0, Currency::Euro, date)?;
    group.add_purchase("Fondue", "ben", &everyone, 96.0, Currency::CHF, date)?;
    group.add_purchase("Hostel", "chloe", &everyone, 3_600.0, Currency::CZK, date)?;

    // --- Before and after a rate change ---
    println!("━━━ CZK at 25.1 ━━━\n");
    println!("{}", group.report()?);

    group.set_exchange_rate(Currency::CZK, 24.0)?;
    println!("━━━ CZK at 24.0 ━━━\n");
    println!("{}", group.report()?);
    println!("{}", group.settlement_plan()?);

    // --- A rate that was never configured ---
    let mut missing = group.clone();
    missing.add_purchase("Pastries", "ana", &["ana"], 12.0, Currency::DKK, date)?;
    match missing.balances() {
        Ok(_) => println!("unexpected: DKK converted without a rate"),
        Err(e) => println!("Without a DKK rate: {}\n", e),
    }

    // --- Persisted form ---
    println!("━━━ JSON ━━━\n");
    println!("{}", to_json(&group)?);

    Ok(())
}
