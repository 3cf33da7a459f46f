//! The in-memory document store and its transaction handle.

use crate::filter::{compare, Filter, FindOptions, SortOrder};
use crate::{Document, StoreError};
use serde::Serialize;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

/// Collection name -> (document id -> document body).
type Collections = HashMap<String, BTreeMap<String, Value>>;

/// An in-memory JSON document store.
///
/// Single-document operations are atomic: every read-modify-write runs
/// under the store's write lock. Multi-document sequences that must be
/// all-or-nothing go through [`Store::transaction`].
#[derive(Debug, Default)]
pub struct Store {
    data: RwLock<Collections>,
}

impl Store {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a new document. Fails if the id is already taken.
    pub fn insert<T: Document>(&self, doc: &T) -> Result<(), StoreError> {
        let body = to_json(doc)?;
        let id = doc.id().to_string();
        let mut data = self.data.write().map_err(|_| StoreError::Poisoned)?;
        insert_in(&mut data, T::COLLECTION, id, body)
    }

    /// Insert or replace a document by id.
    pub fn save<T: Document>(&self, doc: &T) -> Result<(), StoreError> {
        let body = to_json(doc)?;
        let mut data = self.data.write().map_err(|_| StoreError::Poisoned)?;
        data.entry(T::COLLECTION.to_string())
            .or_default()
            .insert(doc.id().to_string(), body);
        Ok(())
    }

    /// Fetch a document by id.
    pub fn get<T: Document>(&self, id: &str) -> Result<Option<T>, StoreError> {
        let data = self.data.read().map_err(|_| StoreError::Poisoned)?;
        get_in(&data, T::COLLECTION, id)
    }

    /// Fetch the first document matching a filter.
    pub fn find_one<T: Document>(&self, filter: &Filter) -> Result<Option<T>, StoreError> {
        let data = self.data.read().map_err(|_| StoreError::Poisoned)?;
        find_one_in(&data, T::COLLECTION, filter)
    }

    /// Fetch all documents matching a filter, honoring sort/skip/limit.
    pub fn find<T: Document>(
        &self,
        filter: &Filter,
        options: &FindOptions,
    ) -> Result<Vec<T>, StoreError> {
        let data = self.data.read().map_err(|_| StoreError::Poisoned)?;
        find_in(&data, T::COLLECTION, filter, options)
    }

    /// Atomically read, modify, and write a document back.
    ///
    /// Returns `Ok(false)` if the document does not exist.
    pub fn update<T, F>(&self, id: &str, mutate: F) -> Result<bool, StoreError>
    where
        T: Document,
        F: FnOnce(&mut T),
    {
        let mut data = self.data.write().map_err(|_| StoreError::Poisoned)?;
        update_in(&mut data, id, mutate)
    }

    /// Delete a document by id. Returns whether it existed.
    pub fn delete<T: Document>(&self, id: &str) -> Result<bool, StoreError> {
        let mut data = self.data.write().map_err(|_| StoreError::Poisoned)?;
        Ok(data
            .get_mut(T::COLLECTION)
            .map(|coll| coll.remove(id).is_some())
            .unwrap_or(false))
    }

    /// Delete all documents matching a filter. Returns the number removed.
    pub fn delete_where<T: Document>(&self, filter: &Filter) -> Result<usize, StoreError> {
        let mut data = self.data.write().map_err(|_| StoreError::Poisoned)?;
        let Some(coll) = data.get_mut(T::COLLECTION) else {
            return Ok(0);
        };
        let before = coll.len();
        coll.retain(|_, body| !filter.matches(body));
        Ok(before - coll.len())
    }

    /// Count documents matching a filter.
    pub fn count<T: Document>(&self, filter: &Filter) -> Result<usize, StoreError> {
        let data = self.data.read().map_err(|_| StoreError::Poisoned)?;
        Ok(data
            .get(T::COLLECTION)
            .map(|coll| coll.values().filter(|body| filter.matches(body)).count())
            .unwrap_or(0))
    }

    /// Run a multi-document sequence with all-or-nothing commit.
    ///
    /// Writes are staged against a snapshot taken under the write lock;
    /// the snapshot replaces the live data only if the closure returns
    /// `Ok`. An `Err` discards every staged write.
    pub fn transaction<R, E, F>(&self, f: F) -> Result<R, E>
    where
        E: From<StoreError>,
        F: FnOnce(&mut Txn<'_>) -> Result<R, E>,
    {
        let mut data = self.data.write().map_err(|_| StoreError::Poisoned)?;
        let mut staged = data.clone();
        let mut txn = Txn { data: &mut staged };
        let result = f(&mut txn)?;
        *data = staged;
        Ok(result)
    }
}

/// Handle to a staged transaction.
///
/// Offers the same document operations as [`Store`]; none of them become
/// visible until the enclosing [`Store::transaction`] commits.
#[derive(Debug)]
pub struct Txn<'a> {
    data: &'a mut Collections,
}

impl Txn<'_> {
    /// Insert a new document. Fails if the id is already taken.
    pub fn insert<T: Document>(&mut self, doc: &T) -> Result<(), StoreError> {
        let body = to_json(doc)?;
        insert_in(self.data, T::COLLECTION, doc.id().to_string(), body)
    }

    /// Insert or replace a document by id.
    pub fn save<T: Document>(&mut self, doc: &T) -> Result<(), StoreError> {
        let body = to_json(doc)?;
        self.data
            .entry(T::COLLECTION.to_string())
            .or_default()
            .insert(doc.id().to_string(), body);
        Ok(())
    }

    /// Fetch a document by id, seeing staged writes.
    pub fn get<T: Document>(&self, id: &str) -> Result<Option<T>, StoreError> {
        get_in(self.data, T::COLLECTION, id)
    }

    /// Fetch the first document matching a filter, seeing staged writes.
    pub fn find_one<T: Document>(&self, filter: &Filter) -> Result<Option<T>, StoreError> {
        find_one_in(self.data, T::COLLECTION, filter)
    }

    /// Read, modify, and write a document back within the transaction.
    pub fn update<T, F>(&mut self, id: &str, mutate: F) -> Result<bool, StoreError>
    where
        T: Document,
        F: FnOnce(&mut T),
    {
        update_in(self.data, id, mutate)
    }

    /// Delete a document by id. Returns whether it existed.
    pub fn delete<T: Document>(&mut self, id: &str) -> Result<bool, StoreError> {
        Ok(self
            .data
            .get_mut(T::COLLECTION)
            .map(|coll| coll.remove(id).is_some())
            .unwrap_or(false))
    }
}

fn to_json<T: Serialize>(doc: &T) -> Result<Value, StoreError> {
    serde_json::to_value(doc).map_err(|e| StoreError::Serialize(e.to_string()))
}

fn from_json<T: serde::de::DeserializeOwned>(body: &Value) -> Result<T, StoreError> {
    serde_json::from_value(body.clone()).map_err(|e| StoreError::Deserialize(e.to_string()))
}

fn insert_in(
    data: &mut Collections,
    collection: &'static str,
    id: String,
    body: Value,
) -> Result<(), StoreError> {
    let coll = data.entry(collection.to_string()).or_default();
    if coll.contains_key(&id) {
        return Err(StoreError::DuplicateId { collection, id });
    }
    coll.insert(id, body);
    Ok(())
}

fn get_in<T: Document>(
    data: &Collections,
    collection: &str,
    id: &str,
) -> Result<Option<T>, StoreError> {
    match data.get(collection).and_then(|coll| coll.get(id)) {
        Some(body) => Ok(Some(from_json(body)?)),
        None => Ok(None),
    }
}

fn find_one_in<T: Document>(
    data: &Collections,
    collection: &str,
    filter: &Filter,
) -> Result<Option<T>, StoreError> {
    match data
        .get(collection)
        .and_then(|coll| coll.values().find(|body| filter.matches(body)))
    {
        Some(body) => Ok(Some(from_json(body)?)),
        None => Ok(None),
    }
}

fn update_in<T, F>(data: &mut Collections, id: &str, mutate: F) -> Result<bool, StoreError>
where
    T: Document,
    F: FnOnce(&mut T),
{
    let Some(body) = data.get_mut(T::COLLECTION).and_then(|coll| coll.get_mut(id)) else {
        return Ok(false);
    };
    let mut doc: T = from_json(body)?;
    mutate(&mut doc);
    *body = to_json(&doc)?;
    Ok(true)
}

fn find_in<T: Document>(
    data: &Collections,
    collection: &str,
    filter: &Filter,
    options: &FindOptions,
) -> Result<Vec<T>, StoreError> {
    let mut matches: Vec<&Value> = data
        .get(collection)
        .map(|coll| coll.values().filter(|body| filter.matches(body)).collect())
        .unwrap_or_default();

    if let Some((path, order)) = &options.sort {
        matches.sort_by(|a, b| {
            let ord = match (field(a, path), field(b, path)) {
                (Some(x), Some(y)) => compare(x, y).unwrap_or(std::cmp::Ordering::Equal),
                (Some(_), None) => std::cmp::Ordering::Greater,
                (None, Some(_)) => std::cmp::Ordering::Less,
                (None, None) => std::cmp::Ordering::Equal,
            };
            match order {
                SortOrder::Asc => ord,
                SortOrder::Desc => ord.reverse(),
            }
        });
    }

    matches
        .into_iter()
        .skip(options.skip)
        .take(options.limit.unwrap_or(usize::MAX))
        .map(from_json)
        .collect()
}

/// Look up a dotted path descending through objects only.
fn field<'a>(doc: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = doc;
    for segment in path.split('.') {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}
