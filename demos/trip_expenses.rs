//! A weekend trip shared by four friends.
//!
//! Records purchases and one cash transfer, prints the group summary and
//! the payments that settle it, then records those payments.

use money_pool::core::currency::Currency;
use money_pool::core::group::Group;
use money_pool::core::timestamp::TimeStamp;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("╔══════════════════════════════════════════╗");
    println!("║  money-pool: Weekend Trip Example        ║");
    println!("╚══════════════════════════════════════════╝\n");

    let mut group = Group::new("Lake weekend", "Cabin, food and fuel", Currency::Euro);
    for name in ["alice", "bob", "carol", "dave"] {
        group.add_member(name)?;
    }
    let everyone = ["alice", "bob", "carol", "dave"];

    let friday: TimeStamp = "12.07.2024".parse()?;
    let saturday: TimeStamp = "13.07.2024 19:30:00".parse()?;

    group.add_purchase("Cabin", "alice", &everyone, 360.0, Currency::Euro, friday)?;
    group.add_purchase("Fuel", "bob", &["alice", "bob"], 64.0, Currency::Euro, friday)?;
    group.add_purchase("Groceries", "carol", &everyone, 118.4, Currency::Euro, friday)?;
    group.add_purchase("Dinner", "dave", &["carol", "dave"], 52.0, Currency::Euro, saturday)?;
    group.add_transfer("Cash for cabin", "dave", "alice", 50.0, Currency::Euro, saturday)?;

    // --- Summary ---
    println!("{}", group.summary()?);
    println!("{}", group.report()?);

    // --- Settlement ---
    println!("{}", group.settlement_plan()?);

    let recorded = group.settle_all()?;
    println!("Recorded {} settlement transfers.\n", recorded.len());
    println!("{}", group.report()?);

    Ok(())
}
