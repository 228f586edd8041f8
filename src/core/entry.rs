use crate::core::currency::{Currency, ExchangeRates};
use crate::core::error::LedgerError;
use crate::core::group::Group;
use crate::core::member::MemberId;
use crate::core::timestamp::TimeStamp;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Position of an entry inside its group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(pub(crate) usize);

impl EntryId {
    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What an entry records.
///
/// - `Purchase`: one member pays on behalf of any number of recipients.
/// - `Transfer`: a purchase with exactly one recipient.
/// - `Balance`: a proposed transfer. It is never linked into a member's
///   participations and so never moves a balance until promoted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntryKind {
    Purchase,
    Transfer,
    Balance,
}

impl EntryKind {
    pub fn label(&self) -> &'static str {
        match self {
            EntryKind::Purchase => "purchase",
            EntryKind::Transfer => "transfer",
            EntryKind::Balance => "balance",
        }
    }

    /// Whether entries of this kind register with their participants.
    pub fn links(&self) -> bool {
        !matches!(self, EntryKind::Balance)
    }

    pub fn default_title(&self) -> &'static str {
        match self {
            EntryKind::Balance => "Pending balance",
            _ => "Untitled",
        }
    }

    fn single_recipient(&self) -> bool {
        !matches!(self, EntryKind::Purchase)
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A ledger record: who paid, for whom, how much, in which currency.
///
/// The amount is stored as entered. Conversion into the group currency
/// happens on every read against the group's current exchange rates.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    group: Uuid,
    kind: EntryKind,
    title: String,
    purchaser: MemberId,
    recipients: Vec<MemberId>,
    amount: f64,
    currency: Currency,
    date: TimeStamp,
    created_at: TimeStamp,
}

impl Entry {
    /// Build an entry, checking the amount and the recipient list.
    ///
    /// Repeated recipients collapse onto their first occurrence. Member
    /// ids are not resolved here; the group does that before calling and
    /// passes its own id as `group`.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        group: Uuid,
        kind: EntryKind,
        title: impl Into<String>,
        purchaser: MemberId,
        recipients: Vec<MemberId>,
        amount: f64,
        currency: Currency,
        date: TimeStamp,
    ) -> Result<Self, LedgerError> {
        if !amount.is_finite() || amount <= 0.0 {
            return Err(LedgerError::InvalidAmount(amount));
        }

        let mut unique = Vec::with_capacity(recipients.len());
        for recipient in recipients {
            if !unique.contains(&recipient) {
                unique.push(recipient);
            }
        }
        if unique.is_empty() {
            return Err(LedgerError::NoRecipients);
        }
        if kind.single_recipient() && unique.len() != 1 {
            return Err(LedgerError::InvalidRecipientCount {
                kind: kind.label(),
                count: unique.len(),
            });
        }

        let title = title.into();
        let title = if title.trim().is_empty() {
            kind.default_title().to_string()
        } else {
            title
        };

        Ok(Self {
            group,
            kind,
            title,
            purchaser,
            recipients: unique,
            amount,
            currency,
            date,
            created_at: TimeStamp::now(),
        })
    }

    /// Id of the group that created this entry.
    pub fn group(&self) -> Uuid {
        self.group
    }

    pub fn kind(&self) -> EntryKind {
        self.kind
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn purchaser(&self) -> MemberId {
        self.purchaser
    }

    pub fn recipients(&self) -> &[MemberId] {
        &self.recipients
    }

    /// The single recipient of a transfer or balance.
    pub fn recipient(&self) -> Option<MemberId> {
        match self.recipients.as_slice() {
            [only] => Some(*only),
            _ => None,
        }
    }

    /// Amount in the entry's own currency.
    pub fn amount(&self) -> f64 {
        self.amount
    }

    pub fn currency(&self) -> Currency {
        self.currency
    }

    pub fn date(&self) -> TimeStamp {
        self.date
    }

    pub fn created_at(&self) -> TimeStamp {
        self.created_at
    }

    pub fn set_created_at(&mut self, stamp: TimeStamp) {
        self.created_at = stamp;
    }

    pub fn is_purchaser(&self, member: MemberId) -> bool {
        self.purchaser == member
    }

    pub fn is_recipient(&self, member: MemberId) -> bool {
        self.recipients.contains(&member)
    }

    /// Every distinct participant, purchaser first.
    pub fn participants(&self) -> Vec<MemberId> {
        let mut participants = vec![self.purchaser];
        participants.extend(
            self.recipients
                .iter()
                .copied()
                .filter(|r| *r != self.purchaser),
        );
        participants
    }

    pub fn amount_in_group_currency(&self, rates: &ExchangeRates) -> Result<f64, LedgerError> {
        rates.exchange(self.amount, self.currency)
    }

    pub fn amount_per_recipient(&self, rates: &ExchangeRates) -> Result<f64, LedgerError> {
        Ok(self.amount_in_group_currency(rates)? / self.recipients.len() as f64)
    }

    /// Promote a pending balance into a real transfer of `group`.
    pub fn to_transfer(&self, group: &mut Group) -> Result<EntryId, LedgerError> {
        group.promote(self)
    }

    /// Render with member names resolved against `group`.
    pub fn display<'a>(&'a self, group: &'a Group) -> EntryDisplay<'a> {
        EntryDisplay { entry: self, group }
    }
}

/// `title (date) purchaser: 12.34Euro -> a, b`
pub struct EntryDisplay<'a> {
    entry: &'a Entry,
    group: &'a Group,
}

impl fmt::Display for EntryDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = |id: MemberId| {
            self.group
                .member_by_id(id)
                .map(|m| m.name().to_string())
                .unwrap_or_else(|| id.to_string())
        };
        let recipients: Vec<String> = self.entry.recipients.iter().map(|r| name(*r)).collect();
        write!(
            f,
            "{} ({}) {}: {:.2}{} -> {}",
            self.entry.title,
            self.entry.date,
            name(self.entry.purchaser),
            self.entry.amount,
            self.entry.currency,
            recipients.join(", ")
        )
    }
}
