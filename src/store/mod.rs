use anyhow::Context;
use chrono::{NaiveDate, Utc};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::db::BlobStore;
use crate::error::{ImportError, StoreError};
use crate::models::*;

/// The store as the application runs it, backed by SQLite.
pub(crate) type Store = SubscriptionStore<crate::db::Database>;

/// Blob key the subscription list is kept under.
pub(crate) const STORAGE_KEY: &str = "my-subs";

/// User input for a new subscription, still unparsed.
#[derive(Debug, Clone, Default)]
pub(crate) struct SubscriptionDraft {
    pub(crate) name: String,
    pub(crate) price: String,
    pub(crate) start_date: String,
    pub(crate) cycle: String,
}

/// Fields to change on an existing subscription. `None` leaves a field as is.
#[derive(Debug, Clone, Default)]
pub(crate) struct SubscriptionPatch {
    pub(crate) name: Option<String>,
    pub(crate) price: Option<String>,
    pub(crate) start_date: Option<String>,
    pub(crate) cycle: Option<String>,
}

impl SubscriptionPatch {
    pub(crate) fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.price.is_none()
            && self.start_date.is_none()
            && self.cycle.is_none()
    }
}

/// The ordered list of subscriptions, mirrored to a blob store after every
/// change.
///
/// A mutation builds the next list, writes it, and only then replaces the
/// in-memory list, so a failed write leaves both sides as they were.
pub(crate) struct SubscriptionStore<B: BlobStore> {
    blobs: B,
    subs: Vec<Subscription>,
    last_issued_id: u64,
}

impl<B: BlobStore> SubscriptionStore<B> {
    /// Load the persisted list. Unreadable contents are moved aside under a
    /// `my-subs.corrupt-<unix time>` key and the store starts empty.
    pub(crate) fn load(mut blobs: B) -> anyhow::Result<Self> {
        let subs = match blobs.read(STORAGE_KEY)? {
            None => {
                log::info!("no saved subscriptions, starting empty");
                Vec::new()
            }
            Some(raw) => match decode_snapshot(raw.as_bytes()) {
                Ok(subs) => {
                    log::info!("loaded {} subscriptions", subs.len());
                    subs
                }
                Err(e) => {
                    let backup = format!("{STORAGE_KEY}.corrupt-{}", Utc::now().timestamp());
                    log::warn!("saved subscriptions are unreadable ({e}); starting empty");
                    match blobs.write(&backup, &raw) {
                        Ok(()) => {
                            log::warn!("unreadable data kept under '{backup}'");
                            // Later starts must not back the same data up again.
                            if let Err(err) = blobs.write(STORAGE_KEY, "[]") {
                                log::error!("could not reset saved subscriptions: {err:#}");
                            }
                        }
                        Err(err) => log::error!("could not back up unreadable data: {err:#}"),
                    }
                    Vec::new()
                }
            },
        };

        Ok(Self {
            blobs,
            subs,
            last_issued_id: 0,
        })
    }

    pub(crate) fn subscriptions(&self) -> &[Subscription] {
        &self.subs
    }

    pub(crate) fn get(&self, id: SubscriptionId) -> Option<&Subscription> {
        self.subs.iter().find(|s| s.id == id)
    }

    pub(crate) fn len(&self) -> usize {
        self.subs.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.subs.is_empty()
    }

    #[cfg(test)]
    pub(crate) fn blobs(&self) -> &B {
        &self.blobs
    }

    // ── Mutations ─────────────────────────────────────────────

    pub(crate) fn add(&mut self, draft: &SubscriptionDraft) -> Result<Subscription, StoreError> {
        let name = validate_name(&draft.name)?;
        let price = parse_price(&draft.price)?;
        let start_date = parse_start_date(&draft.start_date)?;
        let cycle = Cycle::parse(&draft.cycle)?;

        let sub = Subscription {
            id: self.issue_id(),
            name,
            price,
            start_date,
            cycle,
            color: PaletteColor::random(&mut rand::thread_rng()),
            cancelled: false,
        };

        let mut next = self.subs.clone();
        next.push(sub.clone());
        self.commit(next)?;
        log::info!("added subscription {} '{}'", sub.id, sub.name);
        Ok(sub)
    }

    pub(crate) fn update(
        &mut self,
        id: SubscriptionId,
        patch: &SubscriptionPatch,
    ) -> Result<Subscription, StoreError> {
        let name = patch.name.as_deref().map(validate_name).transpose()?;
        let price = patch.price.as_deref().map(parse_price).transpose()?;
        let start_date = patch.start_date.as_deref().map(parse_start_date).transpose()?;
        let cycle = patch.cycle.as_deref().map(Cycle::parse).transpose()?;

        let pos = self.position(id).ok_or(StoreError::NotFound(id))?;
        let mut next = self.subs.clone();
        let sub = &mut next[pos];
        if let Some(name) = name {
            sub.name = name;
        }
        if let Some(price) = price {
            sub.price = price;
        }
        if let Some(start_date) = start_date {
            sub.start_date = start_date;
        }
        if let Some(cycle) = cycle {
            sub.cycle = cycle;
        }
        let updated = sub.clone();

        self.commit(next)?;
        log::info!("updated subscription {id}");
        Ok(updated)
    }

    /// Returns `false` without writing when no subscription has this id.
    pub(crate) fn delete(&mut self, id: SubscriptionId) -> Result<bool, StoreError> {
        if self.position(id).is_none() {
            log::debug!("delete: no subscription {id}");
            return Ok(false);
        }
        let next = self.subs.iter().filter(|s| s.id != id).cloned().collect();
        self.commit(next)?;
        log::info!("deleted subscription {id}");
        Ok(true)
    }

    /// Returns `false` without writing when no subscription has this id.
    pub(crate) fn toggle_cancelled(&mut self, id: SubscriptionId) -> Result<bool, StoreError> {
        let Some(pos) = self.position(id) else {
            log::debug!("toggle: no subscription {id}");
            return Ok(false);
        };
        let mut next = self.subs.clone();
        next[pos].cancelled = !next[pos].cancelled;
        let cancelled = next[pos].cancelled;
        self.commit(next)?;
        log::info!("subscription {id} cancelled={cancelled}");
        Ok(true)
    }

    /// Out-of-palette colors are rejected before the id is looked up.
    pub(crate) fn recolor(&mut self, id: SubscriptionId, color: &str) -> Result<bool, StoreError> {
        let color = PaletteColor::parse(color)?;
        self.set_color(id, color)
    }

    pub(crate) fn set_color(
        &mut self,
        id: SubscriptionId,
        color: PaletteColor,
    ) -> Result<bool, StoreError> {
        let Some(pos) = self.position(id) else {
            log::debug!("recolor: no subscription {id}");
            return Ok(false);
        };
        let mut next = self.subs.clone();
        next[pos].color = color;
        self.commit(next)?;
        log::info!("subscription {id} color={color}");
        Ok(true)
    }

    // ── Snapshots ─────────────────────────────────────────────

    /// The whole list as a pretty-printed JSON array.
    pub(crate) fn export_snapshot(&self) -> Result<Vec<u8>, StoreError> {
        serde_json::to_vec_pretty(&self.subs).map_err(StoreError::Encode)
    }

    /// Replace the whole list with a previously exported one. Every record is
    /// validated; on any failure the store is left untouched.
    pub(crate) fn import_snapshot(&mut self, bytes: &[u8]) -> Result<usize, StoreError> {
        let subs = match decode_snapshot(bytes) {
            Ok(subs) => subs,
            Err(e) => {
                log::warn!("import rejected: {e}");
                return Err(e.into());
            }
        };
        let count = subs.len();
        self.commit(subs)?;
        log::info!("imported {count} subscriptions");
        Ok(count)
    }

    /// Write the export to `target`: into it when it is a directory, otherwise
    /// to that exact path.
    pub(crate) fn export_to_file(&self, target: &Path, today: NaiveDate) -> anyhow::Result<PathBuf> {
        let path = if target.is_dir() {
            target.join(export_file_name(today))
        } else {
            target.to_path_buf()
        };
        let bytes = self.export_snapshot()?;
        std::fs::write(&path, bytes)
            .with_context(|| format!("Failed to write export: {}", path.display()))?;
        log::info!("exported {} subscriptions to {}", self.subs.len(), path.display());
        Ok(path)
    }

    /// Read the whole file first, then import it.
    pub(crate) fn import_from_file(&mut self, path: &Path) -> anyhow::Result<usize> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("Failed to read import file: {}", path.display()))?;
        let count = self
            .import_snapshot(&bytes)
            .with_context(|| format!("Failed to import {}", path.display()))?;
        Ok(count)
    }

    // ── Internals ─────────────────────────────────────────────

    fn position(&self, id: SubscriptionId) -> Option<usize> {
        self.subs.iter().position(|s| s.id == id)
    }

    fn commit(&mut self, next: Vec<Subscription>) -> Result<(), StoreError> {
        let json = serde_json::to_string(&next).map_err(StoreError::Encode)?;
        self.blobs
            .write(STORAGE_KEY, &json)
            .map_err(StoreError::persistence)?;
        self.subs = next;
        Ok(())
    }

    /// Millisecond timestamps, bumped past every id already in use or handed
    /// out earlier, so ids never repeat even after deletes.
    fn issue_id(&mut self) -> SubscriptionId {
        let now = u64::try_from(Utc::now().timestamp_millis()).unwrap_or(0);
        let max_existing = self.subs.iter().map(|s| s.id.0).max().unwrap_or(0);
        let id = now
            .max(max_existing.saturating_add(1))
            .max(self.last_issued_id.saturating_add(1));
        self.last_issued_id = id;
        SubscriptionId(id)
    }
}

/// `subscriptions-YYYY-MM-DD.json`
pub(crate) fn export_file_name(today: NaiveDate) -> String {
    format!("subscriptions-{}.json", today.format("%Y-%m-%d"))
}

/// Parse and validate a serialized subscription list.
pub(crate) fn decode_snapshot(bytes: &[u8]) -> Result<Vec<Subscription>, ImportError> {
    let value: serde_json::Value = serde_json::from_slice(bytes).map_err(ImportError::Malformed)?;
    let serde_json::Value::Array(items) = value else {
        return Err(ImportError::NotAnArray);
    };

    let mut seen = HashSet::with_capacity(items.len());
    let mut subs = Vec::with_capacity(items.len());
    for (index, item) in items.into_iter().enumerate() {
        let sub: Subscription = serde_json::from_value(item)
            .map_err(|source| ImportError::Record { index, source })?;
        sub.validate()
            .map_err(|source| ImportError::Invalid { index, source })?;
        if !seen.insert(sub.id) {
            return Err(ImportError::DuplicateId { index, id: sub.id });
        }
        subs.push(sub);
    }
    Ok(subs)
}

#[cfg(test)]
mod tests;
