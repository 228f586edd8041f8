use crate::core::currency::Currency;
use crate::core::error::LedgerError;
use crate::core::group::Group;
use crate::settlement::engine::{MemberBalance, SETTLEMENT_EPSILON};
use serde::Serialize;
use std::fmt;

/// Whether a member is owed money, owes money, or is even.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PositionStatus {
    Creditor,
    Debtor,
    Settled,
}

impl PositionStatus {
    pub fn of(balance: f64) -> Self {
        if balance > SETTLEMENT_EPSILON {
            PositionStatus::Creditor
        } else if balance < -SETTLEMENT_EPSILON {
            PositionStatus::Debtor
        } else {
            PositionStatus::Settled
        }
    }
}

impl fmt::Display for PositionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PositionStatus::Creditor => "CREDITOR",
            PositionStatus::Debtor => "DEBTOR",
            PositionStatus::Settled => "SETTLED",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PositionLine {
    pub member: String,
    pub balance: f64,
    pub status: PositionStatus,
}

/// Net positions of every member of a group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BalanceReport {
    pub currency: Currency,
    pub positions: Vec<PositionLine>,
}

impl BalanceReport {
    pub fn new(currency: Currency, balances: Vec<MemberBalance>) -> Self {
        let positions = balances
            .into_iter()
            .map(|b| PositionLine {
                status: PositionStatus::of(b.balance),
                member: b.name,
                balance: b.balance,
            })
            .collect();
        Self {
            currency,
            positions,
        }
    }

    /// Total still owed to creditors (equals the total owed by debtors).
    pub fn outstanding(&self) -> f64 {
        self.positions
            .iter()
            .filter(|p| p.status == PositionStatus::Creditor)
            .map(|p| p.balance)
            .sum()
    }

    /// Sum of all positions; zero up to rounding for a consistent group.
    pub fn net_sum(&self) -> f64 {
        self.positions.iter().map(|p| p.balance).sum()
    }
}

impl fmt::Display for BalanceReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Balances ===")?;
        for line in &self.positions {
            writeln!(
                f,
                "  {:<15} {:>12.2} {}  [{}]",
                line.member, line.balance, self.currency, line.status
            )?;
        }
        writeln!(f, "Outstanding:    {:.2} {}", self.outstanding(), self.currency)
    }
}

/// Everything worth printing about a group, rendered up front.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupSummary {
    pub name: String,
    pub description: String,
    pub currency: Currency,
    pub turnover: f64,
    pub exchange_rates: Vec<(Currency, f64)>,
    pub members: Vec<String>,
    pub purchases: Vec<String>,
    pub transfers: Vec<String>,
    pub pending: Vec<String>,
}

impl GroupSummary {
    pub fn from_group(group: &Group) -> Result<Self, LedgerError> {
        let pending = group
            .pending_balances()?
            .iter()
            .map(|b| b.display(group).to_string())
            .collect();
        Ok(Self {
            name: group.name().to_string(),
            description: group.description().to_string(),
            currency: group.currency(),
            turnover: group.turnover()?,
            exchange_rates: group.exchange_rates().iter().collect(),
            members: group.member_names().iter().map(|n| n.to_string()).collect(),
            purchases: group
                .purchases()
                .map(|p| p.display(group).to_string())
                .collect(),
            transfers: group
                .transfers()
                .map(|t| t.display(group).to_string())
                .collect(),
            pending,
        })
    }
}

const WIDTH: usize = 80;

impl fmt::Display for GroupSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let main_rule = "=".repeat(WIDTH);
        let rule = "-".repeat(WIDTH);

        writeln!(f, "{}", main_rule)?;
        writeln!(f, "Summary for group: {}", self.name)?;
        if !self.description.is_empty() {
            writeln!(f, "{}", self.description)?;
        }
        writeln!(f, "{}", main_rule)?;
        writeln!(f, " * Turnover: {:.2}{}", self.turnover, self.currency)?;

        if !self.exchange_rates.is_empty() {
            writeln!(f, "{}", rule)?;
            writeln!(f, "Exchange rates:")?;
            for (currency, rate) in &self.exchange_rates {
                writeln!(f, " * 1{} -> {:.2}{}", self.currency, rate, currency)?;
            }
        }

        for (heading, lines) in [
            ("Members:", &self.members),
            ("Purchases:", &self.purchases),
            ("Transfers:", &self.transfers),
            ("Pending balances:", &self.pending),
        ] {
            writeln!(f, "{}", rule)?;
            writeln!(f, "{}", heading)?;
            for line in lines {
                writeln!(f, " * {}", line)?;
            }
        }

        writeln!(f, "{}", main_rule)
    }
}
