use log::{debug, trace};
use serde::{Deserialize, Serialize};

/// Amounts at or below this are treated as zero when settling.
pub const SETTLEMENT_EPSILON: f64 = 1e-9;

/// A member's name and net balance at the moment of settlement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberBalance {
    pub name: String,
    pub balance: f64,
}

impl MemberBalance {
    pub fn new(name: impl Into<String>, balance: f64) -> Self {
        Self {
            name: name.into(),
            balance,
        }
    }
}

/// A suggested payment from `sender` to `receiver`, in group currency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub sender: String,
    pub receiver: String,
    pub amount: f64,
}

/// The ordered list of payments that settles a set of balances.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SettlementPlan {
    payments: Vec<Payment>,
}

impl SettlementPlan {
    /// Payments in emission order.
    pub fn payments(&self) -> &[Payment] {
        &self.payments
    }

    pub fn len(&self) -> usize {
        self.payments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.payments.is_empty()
    }

    /// Total amount moved by all payments.
    pub fn total_volume(&self) -> f64 {
        self.payments.iter().map(|p| p.amount).sum()
    }

    /// Balances after every payment of the plan has been made.
    ///
    /// A payment credits its sender and debits its receiver, exactly as a
    /// recorded transfer would.
    pub fn apply(&self, balances: &[MemberBalance]) -> Vec<MemberBalance> {
        let mut after = balances.to_vec();
        for payment in &self.payments {
            for position in after.iter_mut() {
                if position.name == payment.sender {
                    position.balance += payment.amount;
                } else if position.name == payment.receiver {
                    position.balance -= payment.amount;
                }
            }
        }
        after
    }

    /// Whether the plan brings every balance within `tolerance` of zero.
    pub fn is_sound(&self, balances: &[MemberBalance], tolerance: f64) -> bool {
        self.apply(balances)
            .iter()
            .all(|position| position.balance.abs() <= tolerance)
    }
}

impl std::fmt::Display for SettlementPlan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Settlement Plan ===")?;
        writeln!(f, "Payments:       {}", self.len())?;
        writeln!(f, "Total Volume:   {:.2}", self.total_volume())?;
        for payment in &self.payments {
            writeln!(
                f,
                "  {} -> {}: {:.2}",
                payment.sender, payment.receiver, payment.amount
            )?;
        }
        Ok(())
    }
}

/// Greedy debt netting.
///
/// Turns a snapshot of balances into payments that bring every balance
/// to zero. Fast and deterministic, but not guaranteed to use the fewest
/// payments possible.
pub struct SettlementEngine;

impl SettlementEngine {
    /// Compute the settlement plan for `balances`.
    ///
    /// # Algorithm
    ///
    /// 1. Rank members by balance, ascending (largest debtor first). The
    ///    sort is stable, so equal balances keep their input order.
    /// 2. For each sender in ascending order, walk the receivers in
    ///    descending order (largest creditor first).
    /// 3. Whenever the receiver is still owed money after the payments
    ///    decided so far, the sender pays the smaller of what it still
    ///    owes and what the receiver is still owed.
    ///
    /// Provisional payments are tracked in a side table, so the input is
    /// never modified. Every payment moves the same amount onto the
    /// sender and off the receiver, so the adjustments always sum to zero.
    /// Payments of `SETTLEMENT_EPSILON` or less are not emitted.
    pub fn settle(balances: &[MemberBalance]) -> SettlementPlan {
        let mut ranked: Vec<usize> = (0..balances.len()).collect();
        ranked.sort_by(|&a, &b| balances[a].balance.total_cmp(&balances[b].balance));

        let mut adjust = vec![0.0_f64; balances.len()];
        let mut payments = Vec::new();

        for &sender in &ranked {
            for &receiver in ranked.iter().rev() {
                if sender == receiver {
                    continue;
                }

                let sender_effective = balances[sender].balance + adjust[sender];
                let receiver_effective = balances[receiver].balance + adjust[receiver];
                if receiver_effective <= SETTLEMENT_EPSILON {
                    continue;
                }

                let amount = sender_effective.abs().min(receiver_effective);
                if amount <= SETTLEMENT_EPSILON {
                    trace!(
                        "skipping zero payment {} -> {}",
                        balances[sender].name,
                        balances[receiver].name
                    );
                    continue;
                }

                adjust[sender] += amount;
                adjust[receiver] -= amount;
                debug!(
                    "settle {} -> {}: {}",
                    balances[sender].name, balances[receiver].name, amount
                );
                payments.push(Payment {
                    sender: balances[sender].name.clone(),
                    receiver: balances[receiver].name.clone(),
                    amount,
                });
            }
        }

        SettlementPlan { payments }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn snapshot(entries: &[(&str, f64)]) -> Vec<MemberBalance> {
        entries
            .iter()
            .map(|(name, balance)| MemberBalance::new(*name, *balance))
            .collect()
    }

    fn pairs(plan: &SettlementPlan) -> Vec<(&str, &str, f64)> {
        plan.payments()
            .iter()
            .map(|p| (p.sender.as_str(), p.receiver.as_str(), p.amount))
            .collect()
    }

    #[test]
    fn test_two_members() {
        let balances = snapshot(&[("A", 50.0), ("B", -50.0)]);
        let plan = SettlementEngine::settle(&balances);
        assert_eq!(pairs(&plan), vec![("B", "A", 50.0)]);
        assert!(plan.is_sound(&balances, 1e-9));
    }

    #[test]
    fn test_single_creditor_equal_debtors_keep_input_order() {
        let balances = snapshot(&[("A", 60.0), ("B", -30.0), ("C", -30.0)]);
        let plan = SettlementEngine::settle(&balances);
        assert_eq!(pairs(&plan), vec![("B", "A", 30.0), ("C", "A", 30.0)]);
    }

    #[test]
    fn test_largest_debtor_pays_largest_creditor_first() {
        let balances = snapshot(&[
            ("A", 70.0),
            ("B", -100.0),
            ("C", 40.0),
            ("D", -10.0),
        ]);
        let plan = SettlementEngine::settle(&balances);
        assert_eq!(
            pairs(&plan),
            vec![("B", "A", 70.0), ("B", "C", 30.0), ("D", "C", 10.0)]
        );
        assert!(plan.is_sound(&balances, 1e-9));
        assert_relative_eq!(plan.total_volume(), 110.0);
    }

    #[test]
    fn test_one_debtor_many_creditors() {
        let balances = snapshot(&[("A", 10.0), ("B", 20.0), ("C", 30.0), ("D", -60.0)]);
        let plan = SettlementEngine::settle(&balances);
        assert_eq!(
            pairs(&plan),
            vec![("D", "C", 30.0), ("D", "B", 20.0), ("D", "A", 10.0)]
        );
    }

    #[test]
    fn test_settled_group_has_no_payments() {
        let balances = snapshot(&[("A", 0.0), ("B", 0.0), ("C", 0.0)]);
        assert!(SettlementEngine::settle(&balances).is_empty());
        assert!(SettlementEngine::settle(&[]).is_empty());
    }

    #[test]
    fn test_float_dust_is_not_emitted() {
        let third = 100.0 / 3.0;
        let balances = snapshot(&[
            ("A", 100.0 - third),
            ("B", -third),
            ("C", -third),
            ("D", 0.0),
        ]);
        let plan = SettlementEngine::settle(&balances);
        assert_eq!(plan.len(), 2);
        assert!(plan.payments().iter().all(|p| p.amount > SETTLEMENT_EPSILON));
        assert!(plan.is_sound(&balances, 1e-9));
    }

    #[test]
    fn test_settle_does_not_modify_input() {
        let balances = snapshot(&[("A", 25.0), ("B", -25.0)]);
        let copy = balances.clone();
        let first = SettlementEngine::settle(&balances);
        let second = SettlementEngine::settle(&balances);
        assert_eq!(balances, copy);
        assert_eq!(first, second);
    }

    #[test]
    fn test_apply() {
        let balances = snapshot(&[("A", 30.0), ("B", -30.0)]);
        let plan = SettlementEngine::settle(&balances);
        let after = plan.apply(&balances);
        assert_eq!(after, snapshot(&[("A", 0.0), ("B", 0.0)]));
    }

    #[test]
    fn test_display() {
        let plan = SettlementEngine::settle(&snapshot(&[("A", 12.5), ("B", -12.5)]));
        let text = plan.to_string();
        assert!(text.contains("Payments:       1"));
        assert!(text.contains("B -> A: 12.50"));
    }
}
