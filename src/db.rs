use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, types::Json, Executor, Pool, Postgres, Row};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    entities::{DeliveryOrder, DeliveryRecord},
    error::Error,
};

/// Read-modify-write step applied to a donation's delivery record while it is
/// locked. Receives `None` when the donation has no record yet.
pub type RecordUpdate =
    Box<dyn FnOnce(Option<DeliveryRecord>) -> Result<DeliveryRecord, Error> + Send>;

#[async_trait]
pub trait DeliveryStore: Send + Sync {
    async fn insert_order(&self, order: &DeliveryOrder) -> Result<(), Error>;
    async fn find_record(&self, donation_id: &str) -> Result<Option<DeliveryRecord>, Error>;
    async fn update_record(
        &self,
        donation_id: &str,
        update: RecordUpdate,
    ) -> Result<DeliveryRecord, Error>;
}

pub struct PgStore {
    pool: Pool<Postgres>,
}

impl PgStore {
    #[tracing::instrument(name = "PgStore::new", skip(db_uri))]
    pub async fn new(db_uri: &str, max_connections: u32) -> Result<Self, Error> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(db_uri)
            .await?;

        pool.execute("CREATE TABLE IF NOT EXISTS delivery_orders (id UUID PRIMARY KEY, donation_id VARCHAR NOT NULL, status VARCHAR NOT NULL, data JSONB NOT NULL)")
            .await?;
        pool.execute("CREATE TABLE IF NOT EXISTS delivery_records (donation_id VARCHAR PRIMARY KEY, status VARCHAR NOT NULL, data JSONB NOT NULL)")
            .await?;

        Ok(Self { pool })
    }
}

#[async_trait]
impl DeliveryStore for PgStore {
    #[tracing::instrument(skip(self))]
    async fn insert_order(&self, order: &DeliveryOrder) -> Result<(), Error> {
        let mut conn = self.pool.acquire().await?;

        conn.execute(
            sqlx::query(
                "INSERT INTO delivery_orders (id, donation_id, status, data) VALUES ($1, $2, $3, $4)",
            )
            .bind(order.id)
            .bind(&order.donation_id)
            .bind(order.status.name())
            .bind(Json(order)),
        )
        .await?;

        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn find_record(&self, donation_id: &str) -> Result<Option<DeliveryRecord>, Error> {
        let mut conn = self.pool.acquire().await?;

        let maybe_row = conn
            .fetch_optional(
                sqlx::query("SELECT data FROM delivery_records WHERE donation_id = $1")
                    .bind(donation_id),
            )
            .await?;

        match maybe_row {
            Some(row) => {
                let Json(record): Json<DeliveryRecord> = row.try_get("data")?;
                Ok(Some(record))
            }
            None => Ok(None),
        }
    }

    #[tracing::instrument(skip(self, update))]
    async fn update_record(
        &self,
        donation_id: &str,
        update: RecordUpdate,
    ) -> Result<DeliveryRecord, Error> {
        let mut tx = self.pool.begin().await?;

        let current = match tx
            .fetch_optional(
                sqlx::query("SELECT data FROM delivery_records WHERE donation_id = $1 FOR UPDATE")
                    .bind(donation_id),
            )
            .await?
        {
            Some(row) => {
                let Json(record): Json<DeliveryRecord> = row.try_get("data")?;
                Some(record)
            }
            None => None,
        };

        // dropping the transaction on error rolls it back
        let record = update(current)?;

        tx.execute(
            sqlx::query(
                "INSERT INTO delivery_records (donation_id, status, data) VALUES ($1, $2, $3)
                ON CONFLICT (donation_id) DO UPDATE SET status = EXCLUDED.status, data = EXCLUDED.data",
            )
            .bind(donation_id)
            .bind(record.status.name())
            .bind(Json(&record)),
        )
        .await?;

        tx.commit().await?;

        Ok(record)
    }
}

/// Process-local store used when no database is configured.
#[derive(Default)]
pub struct MemoryStore {
    orders: RwLock<HashMap<Uuid, DeliveryOrder>>,
    records: RwLock<HashMap<String, DeliveryRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DeliveryStore for MemoryStore {
    async fn insert_order(&self, order: &DeliveryOrder) -> Result<(), Error> {
        self.orders.write().await.insert(order.id, order.clone());
        Ok(())
    }

    async fn find_record(&self, donation_id: &str) -> Result<Option<DeliveryRecord>, Error> {
        Ok(self.records.read().await.get(donation_id).cloned())
    }

    async fn update_record(
        &self,
        donation_id: &str,
        update: RecordUpdate,
    ) -> Result<DeliveryRecord, Error> {
        let mut records = self.records.write().await;
        let record = update(records.get(donation_id).cloned())?;

        records.insert(donation_id.to_string(), record.clone());

        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use tokio_test::block_on;

    use crate::entities::{DeliveryMethod, DeliveryStatus, OrderRequest};
    use crate::error::invalid_state_error;

    #[test]
    fn memory_store_keeps_orders() {
        let store = MemoryStore::new();
        let order = DeliveryOrder::new(
            OrderRequest {
                donation_id: "donation-1".into(),
                ..Default::default()
            },
            Utc::now(),
        );

        block_on(store.insert_order(&order)).unwrap();

        let orders = block_on(store.orders.read());
        assert_eq!(orders.get(&order.id), Some(&order));
        assert_eq!(orders.len(), 1);
    }

    #[test]
    fn failed_update_leaves_record_untouched() {
        let store = MemoryStore::new();

        block_on(store.update_record(
            "donation-1",
            Box::new(|current: Option<DeliveryRecord>| {
                let mut record =
                    current.unwrap_or_else(|| DeliveryRecord::new("donation-1".into()));
                record.book(DeliveryMethod::Rapido, 75.0, 5.0, None, Utc::now())?;
                Ok(record)
            }),
        ))
        .unwrap();

        let err = block_on(store.update_record(
            "donation-1",
            Box::new(|_: Option<DeliveryRecord>| Err(invalid_state_error())),
        ))
        .unwrap_err();
        assert_eq!(err.code, 100);

        let record = block_on(store.find_record("donation-1")).unwrap().unwrap();
        assert_eq!(record.status, DeliveryStatus::Booked);
        assert_eq!(record.method, Some(DeliveryMethod::Rapido));
    }

    #[test]
    #[ignore = "requires a running postgres at DATABASE_URL"]
    fn pg_store_round_trips_records() {
        let uri = std::env::var("DATABASE_URL").unwrap();
        let store = block_on(PgStore::new(&uri, 2)).unwrap();
        let donation_id = Uuid::new_v4().to_string();
        let id = donation_id.clone();

        let record = block_on(store.update_record(
            &donation_id,
            Box::new(move |current: Option<DeliveryRecord>| {
                Ok(current.unwrap_or_else(|| DeliveryRecord::new(id)))
            }),
        ))
        .unwrap();

        assert_eq!(block_on(store.find_record(&donation_id)).unwrap(), Some(record));
    }
}
