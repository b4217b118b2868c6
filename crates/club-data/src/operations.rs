use async_trait::async_trait;

use crate::Result;

/// List records matching a filter. The default filter lists all.
#[async_trait]
pub trait Query<T> {
    type Filter;
    async fn query(&self, filter: &Self::Filter) -> Result<Vec<T>>;
}

/// Create a record. The id of the item is assigned by the store.
#[async_trait]
pub trait Insert<T> {
    async fn insert(&self, item: T) -> Result<T>;
}

/// Apply a set of changes to an existing record.
#[async_trait]
pub trait Update<T> {
    type Key;
    type Changes;
    async fn update(&self, key: Self::Key, changes: Self::Changes) -> Result<T>;
}

#[async_trait]
pub trait Retrieve<T> {
    type Key;
    async fn retrieve(&self, key: Self::Key) -> Result<T>;
}

/// Remove a record together with everything it owns.
/// Returns the removed record.
#[async_trait]
pub trait Delete<T> {
    type Key;
    async fn delete(&self, key: Self::Key) -> Result<T>;
}
