use crate::core::entry::EntryId;
use crate::core::error::LedgerError;
use crate::core::group::Group;
use crate::core::timestamp::TimeStamp;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Position of a member inside its group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemberId(pub(crate) usize);

impl MemberId {
    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "member#{}", self.0)
    }
}

/// A named participant of a group.
///
/// A member does not own entries. It keeps the ids of the entries it
/// takes part in, and its balance is derived from them on every call.
#[derive(Debug, Clone, PartialEq)]
pub struct Member {
    id: MemberId,
    name: String,
    created_at: TimeStamp,
    participations: Vec<EntryId>,
}

impl Member {
    pub(crate) fn new(id: MemberId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            created_at: TimeStamp::now(),
            participations: Vec::new(),
        }
    }

    pub fn id(&self) -> MemberId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn created_at(&self) -> TimeStamp {
        self.created_at
    }

    pub fn set_created_at(&mut self, stamp: TimeStamp) {
        self.created_at = stamp;
    }

    /// Entries this member pays for or benefits from, oldest first.
    pub fn participations(&self) -> &[EntryId] {
        &self.participations
    }

    pub(crate) fn add_participation(&mut self, entry: EntryId) {
        self.participations.push(entry);
    }

    /// Net amount in group currency.
    ///
    /// Positive means the group owes this member, negative means the
    /// member owes the group. A purchaser is credited the full converted
    /// amount; each recipient is debited an equal share. Both apply when
    /// the purchaser is also a recipient.
    pub fn balance(&self, group: &Group) -> Result<f64, LedgerError> {
        let rates = group.exchange_rates();
        let mut balance = 0.0;
        for id in &self.participations {
            let entry = group
                .entry(*id)
                .ok_or(LedgerError::UnknownEntry(id.index()))?;
            if entry.is_purchaser(self.id) {
                balance += entry.amount_in_group_currency(rates)?;
            }
            if entry.is_recipient(self.id) {
                balance -= entry.amount_per_recipient(rates)?;
            }
        }
        Ok(balance)
    }
}

impl fmt::Display for Member {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.created_at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::currency::Currency;
    use approx::assert_relative_eq;

    fn date() -> TimeStamp {
        "01.08.2022".parse().unwrap()
    }

    #[test]
    fn test_new_member_has_zero_balance() {
        let mut group = Group::new("Trip", "", Currency::Euro);
        let id = group.add_member("alice").unwrap();
        let member = group.member_by_id(id).unwrap();
        assert_eq!(member.name(), "alice");
        assert!(member.participations().is_empty());
        assert_eq!(member.balance(&group).unwrap(), 0.0);
    }

    #[test]
    fn test_purchaser_and_recipient_rules_add_up() {
        let mut group = Group::new("Trip", "", Currency::Euro);
        group.add_member("alice").unwrap();
        group.add_member("bob").unwrap();
        group
            .add_purchase("Fuel", "alice", &["alice", "bob"], 80.0, Currency::Euro, date())
            .unwrap();
        group
            .add_purchase("Snacks", "bob", &["alice"], 10.0, Currency::Euro, date())
            .unwrap();

        let alice = group.member("alice").unwrap();
        let bob = group.member("bob").unwrap();
        assert_eq!(alice.participations().len(), 2);
        assert_eq!(bob.participations().len(), 2);
        assert_relative_eq!(alice.balance(&group).unwrap(), 80.0 - 40.0 - 10.0);
        assert_relative_eq!(bob.balance(&group).unwrap(), -40.0 + 10.0);
    }

    #[test]
    fn test_balance_fails_without_exchange_rate() {
        let mut group = Group::new("Trip", "", Currency::Euro);
        group.add_member("alice").unwrap();
        group.add_member("bob").unwrap();
        group
            .add_purchase("Museum", "alice", &["bob"], 20.0, Currency::GBP, date())
            .unwrap();

        let alice = group.member("alice").unwrap();
        assert!(matches!(
            alice.balance(&group),
            Err(LedgerError::NoExchangeRate { .. })
        ));
    }
}
