//! # money-pool
//!
//! Shared expense ledger for households and trips.
//!
//! Members record purchases made on behalf of each other and direct
//! transfers. Every member's net balance is derived from the entries it
//! takes part in, and a greedy settlement engine suggests the payments
//! that would bring all balances back to zero.
//!
//! ## Architecture
//!
//! - **core**: Timestamps, currencies, members, ledger entries and the group
//! - **settlement**: Greedy settlement engine and balance reports
//! - **store**: JSON persistence of groups
//! - **simulation**: Random group generation for benchmarks and stress tests
//! - **prompt**: Interactive value providers for the command line

pub mod core;
pub mod prompt;
pub mod settlement;
pub mod simulation;
pub mod store;

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::core::currency::{Currency, ExchangeRates};
    pub use crate::core::entry::{Entry, EntryId, EntryKind};
    pub use crate::core::error::{LedgerError, ParseError};
    pub use crate::core::group::Group;
    pub use crate::core::member::{Member, MemberId};
    pub use crate::core::timestamp::TimeStamp;
    pub use crate::prompt::{PromptError, ScriptedPrompter, StdinPrompter, ValueProvider};
    pub use crate::settlement::engine::{MemberBalance, Payment, SettlementEngine, SettlementPlan};
    pub use crate::settlement::report::{BalanceReport, GroupSummary};
    pub use crate::store::document::StoreError;
}
