//! Postgres-backed document store
//!
//! Every collection lives in the single `documents` table, keyed by `collection`.
//! Bodies are JSONB; the handle is the row's `id` column and is attached as `_id`
//! when a row is read back. Results are ordered by insertion.
//!
//! Filters compile to:
//! - `Eq` -> `doc @> {"field": value}` (`Null` -> field missing or JSON null)
//! - `Contains` -> `doc @> {"field": [value]}`
//! - `Id` / `IdIn` -> `id = $n` / `id = ANY($n)`
//! - `Range` -> numeric cast of `doc ->> field`, guarded by `jsonb_typeof`
//!
//! Updates are one `UPDATE ... jsonb_set(...)` against the first matching row, so
//! each is atomic for that document.

use std::sync::Arc;

use async_trait::async_trait;
use docrel_core::pagination::Pagination;
use docrel_core::store::{
    Collection, Document, DocumentStore, Filter, StoreError, Update, UpdateOutcome, ID_FIELD,
};
use docrel_core::ObjectId;
use serde_json::{Map, Value};
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::debug;
use uuid::Uuid;

/// [`DocumentStore`] over a Postgres pool.
#[derive(Clone)]
pub struct PgDocumentStore {
    pool: PgPool,
}

impl PgDocumentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl DocumentStore for PgDocumentStore {
    fn collection(&self, name: &str) -> Arc<dyn Collection> {
        Arc::new(PgCollection {
            pool: self.pool.clone(),
            name: name.to_owned(),
        })
    }
}

/// One collection inside the `documents` table.
pub struct PgCollection {
    pool: PgPool,
    name: String,
}

fn to_i64(n: u64) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

/// Append `filter` as a boolean SQL expression.
fn push_filter(qb: &mut QueryBuilder<'_, Postgres>, filter: &Filter) {
    match filter {
        Filter::All => {
            qb.push("TRUE");
        }
        Filter::Id(id) => {
            qb.push("id = ").push_bind(*id.as_uuid());
        }
        Filter::IdIn(ids) => {
            let ids: Vec<Uuid> = ids.iter().map(|id| *id.as_uuid()).collect();
            qb.push("id = ANY(").push_bind(ids).push(")");
        }
        Filter::Eq(field, Value::Null) => {
            qb.push("(doc -> ")
                .push_bind(field.clone())
                .push(" IS NULL OR doc -> ")
                .push_bind(field.clone())
                .push(" = 'null'::jsonb)");
        }
        Filter::Eq(field, value) => {
            let mut probe = Map::new();
            probe.insert(field.clone(), value.clone());
            qb.push("doc @> ").push_bind(Value::Object(probe));
        }
        Filter::Contains(field, value) => {
            let mut probe = Map::new();
            probe.insert(field.clone(), Value::Array(vec![value.clone()]));
            qb.push("doc @> ").push_bind(Value::Object(probe));
        }
        Filter::Range { field, min, max } => {
            qb.push("(jsonb_typeof(doc -> ")
                .push_bind(field.clone())
                .push(") = 'number'");
            if let Some(min) = min {
                qb.push(" AND (doc ->> ")
                    .push_bind(field.clone())
                    .push(")::float8 >= ")
                    .push_bind(*min);
            }
            if let Some(max) = max {
                qb.push(" AND (doc ->> ")
                    .push_bind(field.clone())
                    .push(")::float8 <= ")
                    .push_bind(*max);
            }
            qb.push(")");
        }
        Filter::And(filters) => {
            if filters.is_empty() {
                qb.push("TRUE");
                return;
            }
            qb.push("(");
            for (i, sub) in filters.iter().enumerate() {
                if i > 0 {
                    qb.push(" AND ");
                }
                push_filter(qb, sub);
            }
            qb.push(")");
        }
    }
}

impl PgCollection {
    /// `FROM documents WHERE collection = $1 AND (<filter>)`
    fn push_scope(&self, qb: &mut QueryBuilder<'_, Postgres>, filter: &Filter) {
        qb.push(" FROM documents WHERE collection = ")
            .push_bind(self.name.clone())
            .push(" AND (");
        push_filter(qb, filter);
        qb.push(")");
    }

    /// `id = (SELECT id ... ORDER BY created_at, id LIMIT 1)`
    fn push_first_match(&self, qb: &mut QueryBuilder<'_, Postgres>, filter: &Filter) {
        qb.push("id = (SELECT id");
        self.push_scope(qb, filter);
        qb.push(" ORDER BY created_at, id LIMIT 1)");
    }

    fn attach_id(&self, id: Uuid, doc: Value) -> Result<Document, StoreError> {
        let mut doc: Document =
            serde_json::from_value(doc).map_err(|source| StoreError::Decode {
                collection: self.name.clone(),
                source,
            })?;
        doc.insert(ID_FIELD.to_owned(), Value::from(ObjectId::from_uuid(id)));
        Ok(doc)
    }
}

#[async_trait]
impl Collection for PgCollection {
    fn name(&self) -> &str {
        &self.name
    }

    async fn find_one(&self, filter: &Filter) -> Result<Option<Document>, StoreError> {
        let mut qb = QueryBuilder::new("SELECT id, doc");
        self.push_scope(&mut qb, filter);
        qb.push(" ORDER BY created_at, id LIMIT 1");

        let row: Option<(Uuid, Value)> = qb
            .build_query_as()
            .fetch_optional(&self.pool)
            .await
            .map_err(StoreError::backend)?;
        debug!(collection = %self.name, found = row.is_some(), "find_one");

        row.map(|(id, doc)| self.attach_id(id, doc)).transpose()
    }

    async fn find(&self, filter: &Filter, page: Pagination) -> Result<Vec<Document>, StoreError> {
        let mut qb = QueryBuilder::new("SELECT id, doc");
        self.push_scope(&mut qb, filter);
        qb.push(" ORDER BY created_at, id OFFSET ")
            .push_bind(to_i64(page.skip));
        if let Some(limit) = page.limit {
            qb.push(" LIMIT ").push_bind(to_i64(limit));
        }

        let rows: Vec<(Uuid, Value)> = qb
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(StoreError::backend)?;
        debug!(collection = %self.name, count = rows.len(), "find");

        rows.into_iter()
            .map(|(id, doc)| self.attach_id(id, doc))
            .collect()
    }

    async fn count(&self, filter: &Filter, limit: Option<u64>) -> Result<u64, StoreError> {
        let mut qb = QueryBuilder::new("SELECT COUNT(*) FROM (SELECT 1");
        self.push_scope(&mut qb, filter);
        if let Some(limit) = limit {
            qb.push(" LIMIT ").push_bind(to_i64(limit));
        }
        qb.push(") AS matched");

        let n: i64 = qb
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(StoreError::backend)?;
        Ok(u64::try_from(n).unwrap_or(0))
    }

    async fn insert_one(&self, mut doc: Document) -> Result<ObjectId, StoreError> {
        doc.remove(ID_FIELD);

        let id: Uuid = sqlx::query_scalar(
            "INSERT INTO documents (collection, doc) VALUES ($1, $2) RETURNING id",
        )
        .bind(&self.name)
        .bind(Value::Object(doc))
        .fetch_one(&self.pool)
        .await
        .map_err(StoreError::backend)?;
        debug!(collection = %self.name, %id, "insert_one");

        Ok(ObjectId::from_uuid(id))
    }

    async fn update_one(&self, filter: &Filter, update: &Update) -> Result<UpdateOutcome, StoreError> {
        let mut qb = QueryBuilder::new("UPDATE documents SET doc = ");
        match update {
            Update::Set { field, value } => {
                qb.push("jsonb_set(doc, ARRAY[")
                    .push_bind(field.clone())
                    .push("::text], ")
                    .push_bind(value.clone())
                    .push(", true)");
            }
            Update::Push { field, value } => {
                qb.push("jsonb_set(doc, ARRAY[")
                    .push_bind(field.clone())
                    .push("::text], COALESCE(NULLIF(doc -> ")
                    .push_bind(field.clone())
                    .push(", 'null'::jsonb), '[]'::jsonb) || jsonb_build_array(")
                    .push_bind(value.clone())
                    .push("), true)");
            }
        }
        qb.push(" WHERE ");
        self.push_first_match(&mut qb, filter);

        if let Update::Push { field, .. } = update {
            qb.push(" AND jsonb_typeof(COALESCE(doc -> ")
                .push_bind(field.clone())
                .push(", 'null'::jsonb)) IN ('array', 'null')");
        }

        let matched = qb
            .build()
            .execute(&self.pool)
            .await
            .map_err(StoreError::backend)?
            .rows_affected();

        if matched == 0 {
            if let Update::Push { field, .. } = update {
                // The guard also rejects scalar fields; tell that apart from no match.
                if self.count(filter, Some(1)).await? > 0 {
                    return Err(StoreError::NotAList {
                        collection: self.name.clone(),
                        field: field.clone(),
                    });
                }
            }
        }
        debug!(collection = %self.name, matched, "update_one");

        Ok(UpdateOutcome { matched })
    }

    async fn delete_one(&self, filter: &Filter) -> Result<u64, StoreError> {
        let mut qb = QueryBuilder::new("DELETE FROM documents WHERE ");
        self.push_first_match(&mut qb, filter);

        let deleted = qb
            .build()
            .execute(&self.pool)
            .await
            .map_err(StoreError::backend)?
            .rows_affected();
        debug!(collection = %self.name, deleted, "delete_one");

        Ok(deleted)
    }
}
