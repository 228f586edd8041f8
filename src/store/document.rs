//! JSON persistence for groups.
//!
//! A group is written as one document holding the group fields, its
//! exchange rates, members, purchases and transfers. Pending balances are
//! never stored; they are recomputed from the rest.

use crate::core::currency::Currency;
use crate::core::entry::Entry;
use crate::core::error::LedgerError;
use crate::core::group::Group;
use crate::core::member::MemberId;
use crate::core::timestamp::TimeStamp;
use log::info;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;
use thiserror::Error;

/// Errors arising while loading or saving a group document.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed group document: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error("transfer \"{title}\" must have exactly one recipient, found {count}")]
    InvalidTransfer { title: String, count: usize },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberRecord {
    pub name: String,
    pub stamp: TimeStamp,
}

/// A purchase or transfer as stored on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryRecord {
    pub title: String,
    pub purchaser: String,
    pub recipients: Vec<String>,
    pub amount: f64,
    pub currency: Currency,
    pub date: TimeStamp,
    pub stamp: TimeStamp,
}

/// On-disk shape of a group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupDocument {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub currency: Currency,
    pub stamp: TimeStamp,
    #[serde(default)]
    pub exchange_rates: BTreeMap<Currency, f64>,
    #[serde(default)]
    pub members: Vec<MemberRecord>,
    #[serde(default)]
    pub purchases: Vec<EntryRecord>,
    #[serde(default)]
    pub transfers: Vec<EntryRecord>,
}

impl GroupDocument {
    pub fn from_group(group: &Group) -> Self {
        let record = |entry: &Entry| EntryRecord {
            title: entry.title().to_string(),
            purchaser: member_name(group, entry.purchaser()),
            recipients: entry
                .recipients()
                .iter()
                .map(|r| member_name(group, *r))
                .collect(),
            amount: entry.amount(),
            currency: entry.currency(),
            date: entry.date(),
            stamp: entry.created_at(),
        };

        Self {
            name: group.name().to_string(),
            description: group.description().to_string(),
            currency: group.currency(),
            stamp: group.created_at(),
            exchange_rates: group.exchange_rates().iter().collect(),
            members: group
                .members()
                .iter()
                .map(|m| MemberRecord {
                    name: m.name().to_string(),
                    stamp: m.created_at(),
                })
                .collect(),
            purchases: group.purchases().map(record).collect(),
            transfers: group.transfers().map(record).collect(),
        }
    }

    /// Rebuild the group.
    ///
    /// Members must come before the entries that name them, so the order
    /// is: group fields, exchange rates, members, purchases, transfers.
    pub fn into_group(self) -> Result<Group, StoreError> {
        let mut group = Group::new(self.name, self.description, self.currency);
        group.set_created_at(self.stamp);

        for (foreign, rate) in self.exchange_rates {
            // Some writers include the base currency at 1.0.
            if foreign == self.currency {
                continue;
            }
            group.set_exchange_rate(foreign, rate)?;
        }

        for member in self.members {
            let id = group.add_member(member.name)?;
            if let Some(m) = group.member_mut(id) {
                m.set_created_at(member.stamp);
            }
        }

        for purchase in self.purchases {
            let id = group.add_purchase(
                &purchase.title,
                &purchase.purchaser,
                purchase.recipients.as_slice(),
                purchase.amount,
                purchase.currency,
                purchase.date,
            )?;
            if let Some(entry) = group.entry_mut(id) {
                entry.set_created_at(purchase.stamp);
            }
        }

        for transfer in self.transfers {
            let recipient = match transfer.recipients.as_slice() {
                [only] => only,
                other => {
                    return Err(StoreError::InvalidTransfer {
                        title: transfer.title.clone(),
                        count: other.len(),
                    })
                }
            };
            let id = group.add_transfer(
                &transfer.title,
                &transfer.purchaser,
                recipient,
                transfer.amount,
                transfer.currency,
                transfer.date,
            )?;
            if let Some(entry) = group.entry_mut(id) {
                entry.set_created_at(transfer.stamp);
            }
        }

        Ok(group)
    }
}

fn member_name(group: &Group, id: MemberId) -> String {
    group
        .member_by_id(id)
        .map(|m| m.name().to_string())
        .unwrap_or_default()
}

pub fn to_json(group: &Group) -> Result<String, StoreError> {
    Ok(serde_json::to_string_pretty(&GroupDocument::from_group(group))?)
}

pub fn from_json(json: &str) -> Result<Group, StoreError> {
    let document: GroupDocument = serde_json::from_str(json)?;
    document.into_group()
}

/// Read a group from a JSON file.
pub fn load(path: impl AsRef<Path>) -> Result<Group, StoreError> {
    let path = path.as_ref();
    let group = from_json(&fs::read_to_string(path)?)?;
    info!(
        "loaded group {} from {} ({} members)",
        group.name(),
        path.display(),
        group.member_count()
    );
    Ok(group)
}

fn write_document(group: &Group, path: &Path) -> Result<(), StoreError> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, &GroupDocument::from_group(group))?;
    writer.flush()?;
    writer.get_ref().sync_all()?;
    Ok(())
}

/// Write a group to a JSON file.
///
/// The document goes to a `.json.tmp` sibling first, is synced, and is
/// then renamed over `path`. On failure `path` keeps its previous content.
pub fn save(group: &Group, path: impl AsRef<Path>) -> Result<(), StoreError> {
    let path = path.as_ref();
    let temp_path = path.with_extension("json.tmp");

    let result = write_document(group, &temp_path)
        .and_then(|_| fs::rename(&temp_path, path).map_err(StoreError::from));
    if let Err(e) = result {
        let _ = fs::remove_file(&temp_path);
        return Err(e);
    }
    info!("saved group {} to {}", group.name(), path.display());
    Ok(())
}
