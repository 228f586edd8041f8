use crate::core::currency::{Currency, ExchangeRates};
use crate::core::entry::{Entry, EntryId, EntryKind};
use crate::core::error::LedgerError;
use crate::core::member::{Member, MemberId};
use crate::core::timestamp::TimeStamp;
use crate::settlement::engine::{MemberBalance, SettlementEngine, SettlementPlan};
use crate::settlement::report::{BalanceReport, GroupSummary};
use log::debug;
use std::collections::HashMap;
use uuid::Uuid;

/// A money pool: its members, their purchases and transfers, and the
/// exchange rates that bring every entry into the group currency.
///
/// The group owns all members and entries. Entries and members refer to
/// each other by id only, and every entry carries the id of the group
/// that created it.
///
/// # Examples
///
/// ```
/// use money_pool::prelude::*;
///
/// let mut group = Group::new("Flat", "Shared groceries", Currency::Euro);
/// group.add_member("A").unwrap();
/// group.add_member("B").unwrap();
///
/// let date: TimeStamp = "01.03.2023".parse().unwrap();
/// group.add_purchase("Groceries", "A", &["A", "B"], 100.0, Currency::Euro, date).unwrap();
///
/// assert_eq!(group.balance("A").unwrap(), 50.0);
/// assert_eq!(group.balance("B").unwrap(), -50.0);
///
/// let pending = group.pending_balances().unwrap();
/// assert_eq!(pending.len(), 1);
/// assert_eq!(pending[0].amount(), 50.0);
/// ```
#[derive(Debug, Clone)]
pub struct Group {
    id: Uuid,
    name: String,
    description: String,
    rates: ExchangeRates,
    members: Vec<Member>,
    member_index: HashMap<String, MemberId>,
    entries: Vec<Entry>,
    created_at: TimeStamp,
}

impl Group {
    pub fn new(name: impl Into<String>, description: impl Into<String>, currency: Currency) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            description: description.into(),
            rates: ExchangeRates::new(currency),
            members: Vec::new(),
            member_index: HashMap::new(),
            entries: Vec::new(),
            created_at: TimeStamp::now(),
        }
    }

    // --- Accessors ---

    /// Identity of this group in memory. Not persisted.
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// The group (base) currency.
    pub fn currency(&self) -> Currency {
        self.rates.base()
    }

    pub fn created_at(&self) -> TimeStamp {
        self.created_at
    }

    pub fn set_created_at(&mut self, stamp: TimeStamp) {
        self.created_at = stamp;
    }

    // --- Currency ---

    pub fn exchange_rates(&self) -> &ExchangeRates {
        &self.rates
    }

    pub fn exchange_rate(&self, currency: Currency) -> Option<f64> {
        self.rates.rate(currency)
    }

    /// Set the amount of `currency` worth one unit of the group currency.
    ///
    /// Takes effect retroactively for every entry in `currency`.
    pub fn set_exchange_rate(&mut self, currency: Currency, rate: f64) -> Result<(), LedgerError> {
        self.rates.set_rate(currency, rate)?;
        debug!("group {}: 1 {} = {} {}", self.name, self.currency(), rate, currency);
        Ok(())
    }

    pub fn exchange(&self, amount: f64, currency: Currency) -> Result<f64, LedgerError> {
        self.rates.exchange(amount, currency)
    }

    // --- Members ---

    /// Add a member with a unique, non-blank name.
    pub fn add_member(&mut self, name: impl Into<String>) -> Result<MemberId, LedgerError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(LedgerError::InvalidName);
        }
        if self.member_index.contains_key(&name) {
            return Err(LedgerError::DuplicateName(name));
        }

        let id = MemberId(self.members.len());
        self.member_index.insert(name.clone(), id);
        self.members.push(Member::new(id, name));
        debug!("group {}: added member {}", self.name, self.members[id.0].name());
        Ok(id)
    }

    pub fn member(&self, name: &str) -> Result<&Member, LedgerError> {
        self.member_id(name).map(|id| &self.members[id.0])
    }

    pub fn member_id(&self, name: &str) -> Result<MemberId, LedgerError> {
        self.member_index
            .get(name)
            .copied()
            .ok_or_else(|| LedgerError::UnknownMember(name.to_string()))
    }

    pub fn member_by_id(&self, id: MemberId) -> Option<&Member> {
        self.members.get(id.0)
    }

    pub fn member_mut(&mut self, id: MemberId) -> Option<&mut Member> {
        self.members.get_mut(id.0)
    }

    /// Members in insertion order.
    pub fn members(&self) -> &[Member] {
        &self.members
    }

    pub fn member_names(&self) -> Vec<&str> {
        self.members.iter().map(|m| m.name()).collect()
    }

    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    // --- Entries ---

    /// Record a purchase paid by `purchaser` and split evenly across
    /// `recipients`.
    pub fn add_purchase<S: AsRef<str>>(
        &mut self,
        title: &str,
        purchaser: &str,
        recipients: &[S],
        amount: f64,
        currency: Currency,
        date: TimeStamp,
    ) -> Result<EntryId, LedgerError> {
        let purchaser = self.member_id(purchaser)?;
        let recipients = recipients
            .iter()
            .map(|r| self.member_id(r.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        self.record(EntryKind::Purchase, title, purchaser, recipients, amount, currency, date)
    }

    /// Record a direct payment from `purchaser` to `recipient`.
    pub fn add_transfer(
        &mut self,
        title: &str,
        purchaser: &str,
        recipient: &str,
        amount: f64,
        currency: Currency,
        date: TimeStamp,
    ) -> Result<EntryId, LedgerError> {
        let purchaser = self.member_id(purchaser)?;
        let recipient = self.member_id(recipient)?;
        self.record(EntryKind::Transfer, title, purchaser, vec![recipient], amount, currency, date)
    }

    /// Validate, store and link a new purchase or transfer.
    ///
    /// Nothing is touched until the entry has been fully validated.
    #[allow(clippy::too_many_arguments)]
    fn record(
        &mut self,
        kind: EntryKind,
        title: &str,
        purchaser: MemberId,
        recipients: Vec<MemberId>,
        amount: f64,
        currency: Currency,
        date: TimeStamp,
    ) -> Result<EntryId, LedgerError> {
        debug_assert!(kind.links(), "balances are never stored in a group");
        let entry = Entry::new(
            self.id, kind, title, purchaser, recipients, amount, currency, date,
        )?;

        let id = EntryId(self.entries.len());
        for participant in entry.participants() {
            self.members[participant.0].add_participation(id);
        }
        debug!(
            "group {}: recorded {} {} ({} {})",
            self.name, kind, id, amount, currency
        );
        self.entries.push(entry);
        Ok(id)
    }

    pub fn entry(&self, id: EntryId) -> Option<&Entry> {
        self.entries.get(id.0)
    }

    pub fn entry_mut(&mut self, id: EntryId) -> Option<&mut Entry> {
        self.entries.get_mut(id.0)
    }

    /// Purchases in insertion order.
    pub fn purchases(&self) -> impl Iterator<Item = &Entry> {
        self.entries_of(EntryKind::Purchase)
    }

    /// Transfers in insertion order.
    pub fn transfers(&self) -> impl Iterator<Item = &Entry> {
        self.entries_of(EntryKind::Transfer)
    }

    fn entries_of(&self, kind: EntryKind) -> impl Iterator<Item = &Entry> {
        self.entries.iter().filter(move |e| e.kind() == kind)
    }

    // --- Derived views ---

    /// Net balance of the named member in group currency.
    pub fn balance(&self, name: &str) -> Result<f64, LedgerError> {
        self.member(name)?.balance(self)
    }

    /// Every member's balance, in insertion order.
    pub fn balances(&self) -> Result<Vec<MemberBalance>, LedgerError> {
        self.members
            .iter()
            .map(|m| Ok::<_, LedgerError>(MemberBalance::new(m.name(), m.balance(self)?)))
            .collect()
    }

    /// Sum of all purchases in group currency. Transfers do not count.
    pub fn turnover(&self) -> Result<f64, LedgerError> {
        self.purchases()
            .map(|p| p.amount_in_group_currency(&self.rates))
            .sum()
    }

    /// The payments that would bring every balance to zero.
    pub fn settlement_plan(&self) -> Result<SettlementPlan, LedgerError> {
        Ok(SettlementEngine::settle(&self.balances()?))
    }

    /// Proposed settlement as unlinked balance entries, dated now.
    ///
    /// Recomputed on every call; nothing is stored in the group.
    pub fn pending_balances(&self) -> Result<Vec<Entry>, LedgerError> {
        let plan = self.settlement_plan()?;
        let now = TimeStamp::now();
        plan.payments()
            .iter()
            .map(|payment| {
                let sender = self.member_id(&payment.sender)?;
                let receiver = self.member_id(&payment.receiver)?;
                Entry::new(
                    self.id,
                    EntryKind::Balance,
                    EntryKind::Balance.default_title(),
                    sender,
                    vec![receiver],
                    payment.amount,
                    self.currency(),
                    now,
                )
            })
            .collect()
    }

    /// Record a pending balance as a real transfer.
    ///
    /// The balance itself stays unlinked. Balances change afterwards, so
    /// pending balances should be queried again.
    pub fn promote(&mut self, balance: &Entry) -> Result<EntryId, LedgerError> {
        if balance.kind() != EntryKind::Balance {
            return Err(LedgerError::NotABalance);
        }
        if balance.group() != self.id {
            return Err(LedgerError::ForeignBalance);
        }
        let recipient = balance.recipient().ok_or(LedgerError::InvalidRecipientCount {
            kind: EntryKind::Balance.label(),
            count: balance.recipients().len(),
        })?;
        for id in [balance.purchaser(), recipient] {
            if self.member_by_id(id).is_none() {
                return Err(LedgerError::UnknownMember(id.to_string()));
            }
        }
        self.record(
            EntryKind::Transfer,
            balance.title(),
            balance.purchaser(),
            vec![recipient],
            balance.amount(),
            balance.currency(),
            balance.date(),
        )
    }

    /// Promote every pending balance, returning the new transfers.
    pub fn settle_all(&mut self) -> Result<Vec<EntryId>, LedgerError> {
        let pending = self.pending_balances()?;
        let mut transfers = Vec::with_capacity(pending.len());
        for balance in &pending {
            transfers.push(self.promote(balance)?);
        }
        Ok(transfers)
    }

    pub fn report(&self) -> Result<BalanceReport, LedgerError> {
        Ok(BalanceReport::new(self.currency(), self.balances()?))
    }

    pub fn summary(&self) -> Result<GroupSummary, LedgerError> {
        GroupSummary::from_group(self)
    }
}

impl std::fmt::Display for Group {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} [{}] {} ({})",
            self.name,
            self.description,
            self.currency(),
            self.created_at
        )
    }
}
