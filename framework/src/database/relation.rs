//! Relation inclusion
//!
//! Each entity lists the relations a filter may `include`. For every
//! inclusion the related rows of the whole result page are fetched with one
//! `IN (...)` query, grouped by key and attached to their owners in order.

use super::connection::DbConnection;
use super::filter::{Filter, Inclusion, Where};
use super::repository::{Repository, Resource};
use crate::error::FrameworkError;
use async_trait::async_trait;
use sea_orm::IntoActiveModel;
use serde::Serialize;
use serde_json::{Map, Value as Json};
use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::Arc;

/// How many related records an owner can have
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    /// Attached as an array, `[]` when there are none
    Many,
    /// Attached as an object, omitted when there is none
    One,
}

/// A named relation that can be loaded in batches
#[async_trait]
pub trait RelationResolver: Send + Sync {
    /// Name used in `include`
    fn name(&self) -> &str;

    fn cardinality(&self) -> Cardinality;

    /// Field on the owning record holding the join key
    fn source_field(&self) -> &str;

    /// Field on related records matched against the owner's key
    fn target_field(&self) -> &str;

    /// Load every related record whose `target_field` is in `keys`
    async fn load(
        &self,
        db: &DbConnection,
        keys: Vec<i64>,
        scope: Option<&Filter>,
    ) -> Result<Vec<Json>, FrameworkError>;
}

/// One owner, many related records (`TodoList` has many `Todo`)
pub struct HasMany<T> {
    name: &'static str,
    foreign_key: &'static str,
    target: PhantomData<fn() -> T>,
}

impl<T> HasMany<T>
where
    T: Resource + 'static,
    T::Model: Serialize + Sync + IntoActiveModel<T::Active>,
{
    /// `foreign_key` is the field on the related entity pointing back at the owner's `id`
    pub fn new(name: &'static str, foreign_key: &'static str) -> Arc<dyn RelationResolver> {
        Arc::new(Self {
            name,
            foreign_key,
            target: PhantomData,
        })
    }
}

/// Many owners, one related record (`Todo` belongs to `TodoList`)
pub struct BelongsTo<T> {
    name: &'static str,
    foreign_key: &'static str,
    target: PhantomData<fn() -> T>,
}

impl<T> BelongsTo<T>
where
    T: Resource + 'static,
    T::Model: Serialize + Sync + IntoActiveModel<T::Active>,
{
    /// `foreign_key` is the field on the owning entity holding the target's `id`
    pub fn new(name: &'static str, foreign_key: &'static str) -> Arc<dyn RelationResolver> {
        Arc::new(Self {
            name,
            foreign_key,
            target: PhantomData,
        })
    }
}

async fn load_related<T>(
    db: &DbConnection,
    field: &str,
    keys: Vec<i64>,
    scope: Option<&Filter>,
) -> Result<Vec<Json>, FrameworkError>
where
    T: Resource,
    T::Model: Serialize + Sync + IntoActiveModel<T::Active>,
{
    let keys = keys.into_iter().map(Json::from).collect();
    let filter = scope
        .cloned()
        .unwrap_or_default()
        .and_where(Where::inq(field, keys));

    Repository::<T>::new(db.clone())
        .find_with_relations(&filter)
        .await?
        .into_iter()
        .map(|record| serde_json::to_value(record).map_err(FrameworkError::from))
        .collect()
}

#[async_trait]
impl<T> RelationResolver for HasMany<T>
where
    T: Resource,
    T::Model: Serialize + Sync + IntoActiveModel<T::Active>,
{
    fn name(&self) -> &str {
        self.name
    }

    fn cardinality(&self) -> Cardinality {
        Cardinality::Many
    }

    fn source_field(&self) -> &str {
        "id"
    }

    fn target_field(&self) -> &str {
        self.foreign_key
    }

    async fn load(
        &self,
        db: &DbConnection,
        keys: Vec<i64>,
        scope: Option<&Filter>,
    ) -> Result<Vec<Json>, FrameworkError> {
        load_related::<T>(db, self.foreign_key, keys, scope).await
    }
}

#[async_trait]
impl<T> RelationResolver for BelongsTo<T>
where
    T: Resource,
    T::Model: Serialize + Sync + IntoActiveModel<T::Active>,
{
    fn name(&self) -> &str {
        self.name
    }

    fn cardinality(&self) -> Cardinality {
        Cardinality::One
    }

    fn source_field(&self) -> &str {
        self.foreign_key
    }

    fn target_field(&self) -> &str {
        "id"
    }

    async fn load(
        &self,
        db: &DbConnection,
        keys: Vec<i64>,
        scope: Option<&Filter>,
    ) -> Result<Vec<Json>, FrameworkError> {
        load_related::<T>(db, "id", keys, scope).await
    }
}

/// Record serialized as JSON with its included relations alongside
#[derive(Debug, Clone, Serialize)]
pub struct WithRelations<M> {
    #[serde(flatten)]
    pub record: M,
    #[serde(flatten)]
    pub relations: Map<String, Json>,
}

/// Resolve `inclusions` for `records`
///
/// Returns one relation map per record, in the same order.
pub async fn resolve(
    db: &DbConnection,
    entity: &str,
    records: &[Map<String, Json>],
    inclusions: &[Inclusion],
    resolvers: &[Arc<dyn RelationResolver>],
) -> Result<Vec<Map<String, Json>>, FrameworkError> {
    let mut attached = vec![Map::new(); records.len()];

    for inclusion in inclusions {
        let resolver = resolvers
            .iter()
            .find(|r| r.name() == inclusion.relation)
            .ok_or_else(|| {
                FrameworkError::invalid_filter(format!(
                    "unknown relation '{}' on {}",
                    inclusion.relation, entity
                ))
            })?;

        let owner_keys: Vec<Option<i64>> = records
            .iter()
            .map(|record| key_of(record, resolver.source_field()))
            .collect();

        let mut keys: Vec<i64> = owner_keys.iter().flatten().copied().collect();
        keys.sort_unstable();
        keys.dedup();

        let related = if keys.is_empty() {
            Vec::new()
        } else {
            resolver
                .load(db, keys, inclusion.scope.as_deref())
                .await?
        };

        let mut grouped: HashMap<i64, Vec<Json>> = HashMap::new();
        for item in related {
            let key = item
                .as_object()
                .and_then(|object| key_of(object, resolver.target_field()));
            if let Some(key) = key {
                grouped.entry(key).or_default().push(item);
            }
        }

        for (slot, key) in attached.iter_mut().zip(owner_keys) {
            let matches = key.and_then(|k| grouped.get(&k));
            match resolver.cardinality() {
                Cardinality::Many => {
                    let items = matches.cloned().unwrap_or_default();
                    slot.insert(resolver.name().to_string(), Json::Array(items));
                }
                Cardinality::One => {
                    if let Some(first) = matches.and_then(|items| items.first()) {
                        slot.insert(resolver.name().to_string(), first.clone());
                    }
                }
            }
        }
    }

    Ok(attached)
}

fn key_of(record: &Map<String, Json>, field: &str) -> Option<i64> {
    record.get(field).and_then(Json::as_i64)
}
