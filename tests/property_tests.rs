use money_pool::core::currency::Currency;
use money_pool::core::error::LedgerError;
use money_pool::core::group::Group;
use money_pool::core::timestamp::TimeStamp;
use money_pool::settlement::engine::{MemberBalance, SettlementEngine};
use proptest::prelude::*;

const MEMBERS: [&str; 6] = ["A", "B", "C", "D", "E", "F"];
const TOLERANCE: f64 = 1e-6;

/// One recorded entry, as indices into `MEMBERS`.
#[derive(Debug, Clone)]
enum Op {
    Purchase {
        purchaser: usize,
        recipients: Vec<usize>,
        cents: u32,
        foreign: bool,
    },
    Transfer {
        purchaser: usize,
        recipient: usize,
        cents: u32,
        foreign: bool,
    },
}

/// Random positive amount in cents (0.01 to 10,000.00).
fn arb_cents() -> impl Strategy<Value = u32> {
    1u32..1_000_000u32
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => (
            0..MEMBERS.len(),
            prop::collection::vec(0..MEMBERS.len(), 1..8),
            arb_cents(),
            any::<bool>(),
        )
            .prop_map(|(purchaser, recipients, cents, foreign)| Op::Purchase {
                purchaser,
                recipients,
                cents,
                foreign,
            }),
        1 => (0..MEMBERS.len(), 0..MEMBERS.len(), arb_cents(), any::<bool>()).prop_map(
            |(purchaser, recipient, cents, foreign)| Op::Transfer {
                purchaser,
                recipient,
                cents,
                foreign,
            }
        ),
    ]
}

/// A group of six members with a USD rate and 0..40 entries.
fn arb_group() -> impl Strategy<Value = Group> {
    (0.5f64..2.0f64, prop::collection::vec(arb_op(), 0..40)).prop_map(|(rate, ops)| {
        let mut group = Group::new("Random", "", Currency::Euro);
        group.set_exchange_rate(Currency::USD, rate).unwrap();
        for name in MEMBERS {
            group.add_member(name).unwrap();
        }
        let date = TimeStamp::now();
        for op in ops {
            match op {
                Op::Purchase {
                    purchaser,
                    recipients,
                    cents,
                    foreign,
                } => {
                    let recipients: Vec<&str> = recipients.iter().map(|r| MEMBERS[*r]).collect();
                    group
                        .add_purchase(
                            "p",
                            MEMBERS[purchaser],
                            &recipients,
                            f64::from(cents) / 100.0,
                            if foreign { Currency::USD } else { Currency::Euro },
                            date,
                        )
                        .unwrap();
                }
                Op::Transfer {
                    purchaser,
                    recipient,
                    cents,
                    foreign,
                } => {
                    group
                        .add_transfer(
                            "t",
                            MEMBERS[purchaser],
                            MEMBERS[recipient],
                            f64::from(cents) / 100.0,
                            if foreign { Currency::USD } else { Currency::Euro },
                            date,
                        )
                        .unwrap();
                }
            }
        }
        group
    })
}

/// Balances that sum to zero, built from arbitrary debts between members.
fn arb_balances() -> impl Strategy<Value = Vec<MemberBalance>> {
    prop::collection::vec((0..MEMBERS.len(), 0..MEMBERS.len(), arb_cents()), 0..30).prop_map(
        |debts| {
            let mut balances: Vec<MemberBalance> =
                MEMBERS.iter().map(|n| MemberBalance::new(*n, 0.0)).collect();
            for (debtor, creditor, cents) in debts {
                let amount = f64::from(cents) / 100.0;
                balances[debtor].balance -= amount;
                balances[creditor].balance += amount;
            }
            balances
        },
    )
}

proptest! {
    // ===================================================================
    // INVARIANT 1: Balances always sum to zero.
    //
    // Every entry credits its purchaser exactly what it debits from its
    // recipients, whatever the currency.
    // ===================================================================
    #[test]
    fn balances_sum_to_zero(group in arb_group()) {
        let total: f64 = group.balances().unwrap().iter().map(|b| b.balance).sum();
        prop_assert!(total.abs() < TOLERANCE, "balances sum to {}", total);
    }

    // ===================================================================
    // INVARIANT 2: Applying the pending balances settles the group.
    //
    // Recording every proposed payment as a transfer drives every
    // member's balance to zero.
    // ===================================================================
    #[test]
    fn settlement_is_sound(mut group in arb_group()) {
        let balances = group.balances().unwrap();
        let plan = group.settlement_plan().unwrap();
        prop_assert!(plan.is_sound(&balances, TOLERANCE));

        group.settle_all().unwrap();
        for balance in group.balances().unwrap() {
            prop_assert!(
                balance.balance.abs() < TOLERANCE,
                "{} left at {}",
                balance.name,
                balance.balance
            );
        }
    }

    // ===================================================================
    // INVARIANT 3: Proposed payments are positive.
    //
    // The engine never emits zero, negative or self payments.
    // ===================================================================
    #[test]
    fn payments_are_positive(balances in arb_balances()) {
        let plan = SettlementEngine::settle(&balances);
        for payment in plan.payments() {
            prop_assert!(payment.amount > 0.0);
            prop_assert_ne!(&payment.sender, &payment.receiver);
        }
        prop_assert!(plan.is_sound(&balances, TOLERANCE));
    }

    // ===================================================================
    // INVARIANT 4: Querying twice gives the same answer.
    //
    // Pending balances are derived, never stored; asking again without
    // a mutation in between yields the same payments in the same order.
    // ===================================================================
    #[test]
    fn pending_balances_are_stable(group in arb_group()) {
        let first = group.pending_balances().unwrap();
        let second = group.pending_balances().unwrap();
        prop_assert_eq!(first.len(), second.len());
        for (a, b) in first.iter().zip(&second) {
            prop_assert_eq!(a.purchaser(), b.purchaser());
            prop_assert_eq!(a.recipients(), b.recipients());
            prop_assert_eq!(a.amount(), b.amount());
        }
    }

    // ===================================================================
    // INVARIANT 5: Conversion is consistent with the rate.
    //
    // The base currency converts to itself; a foreign amount converted
    // and scaled back by its rate gives the amount back.
    // ===================================================================
    #[test]
    fn exchange_matches_rate(cents in arb_cents(), rate in 0.01f64..1000.0f64) {
        let amount = f64::from(cents) / 100.0;
        let mut group = Group::new("Rates", "", Currency::CHF);
        group.set_exchange_rate(Currency::JPY, rate).unwrap();

        prop_assert_eq!(group.exchange(amount, Currency::CHF).unwrap(), amount);
        let converted = group.exchange(amount, Currency::JPY).unwrap();
        prop_assert!((converted * rate - amount).abs() <= amount * 1e-12);
    }

    // ===================================================================
    // INVARIANT 6: Blank and duplicate names are rejected.
    //
    // A rejected name leaves the member list untouched.
    // ===================================================================
    #[test]
    fn invalid_member_names_are_rejected(name in "[a-z]{1,12}", blank in "[ \t]{0,4}") {
        let mut group = Group::new("Names", "", Currency::Euro);
        group.add_member(name.as_str()).unwrap();

        prop_assert_eq!(
            group.add_member(name.as_str()),
            Err(LedgerError::DuplicateName(name.clone()))
        );
        prop_assert_eq!(group.add_member(blank.as_str()), Err(LedgerError::InvalidName));
        prop_assert_eq!(group.member_count(), 1);
    }

    // ===================================================================
    // INVARIANT 7: Turnover is the sum of purchases.
    //
    // Transfers and settlement payments never count as turnover.
    // ===================================================================
    #[test]
    fn turnover_ignores_transfers(mut group in arb_group()) {
        let expected: f64 = group
            .purchases()
            .map(|p| p.amount_in_group_currency(group.exchange_rates()).unwrap())
            .sum();
        prop_assert!((group.turnover().unwrap() - expected).abs() < TOLERANCE);

        group.settle_all().unwrap();
        prop_assert!((group.turnover().unwrap() - expected).abs() < TOLERANCE);
    }
}
