//! Read-modify-write helpers shared by the keyed collections.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::Result;
use crate::model::{Draft, Keyed, Record};
use crate::store::{load_or_default, save_json, KeyValueStore};

/// Replace the record with the draft's id in place, or prepend it.
///
/// Returns the stored record.
pub(crate) fn upsert_record<S, D>(
    store: &S,
    key: &str,
    draft: Draft<D>,
    now: DateTime<Utc>,
) -> Result<Record<D>>
where
    S: KeyValueStore + ?Sized,
    D: Keyed + Clone + Serialize + DeserializeOwned,
{
    let mut records: Vec<Record<D>> = load_or_default(store, key)?;
    let record = draft.stamp(now);

    match records.iter().position(|r| r.id() == record.id()) {
        Some(index) => records[index] = record.clone(),
        None => records.insert(0, record.clone()),
    }

    save_json(store, key, &records)?;
    Ok(record)
}

/// Find the first record with `id`.
pub(crate) fn find_record<S, D>(store: &S, key: &str, id: &str) -> Result<Option<Record<D>>>
where
    S: KeyValueStore + ?Sized,
    D: Keyed + DeserializeOwned,
{
    let records: Vec<Record<D>> = load_or_default(store, key)?;
    Ok(records.into_iter().find(|r| r.id() == id))
}
