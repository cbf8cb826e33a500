use crate::{
    config::{RuntimeConfiguration, StorageConfig},
    data::{StudentStore, memory::MemoryStudentStore, postgres::PostgresStudentStore},
    error::StudentsResult,
};
use sqlx::postgres::PgPoolOptions;
use std::{ops::Deref, sync::Arc};

#[derive(Clone, Debug)]
pub struct StudentsState {
    store: Arc<dyn StudentStore>,
}

impl StudentsState {
    pub async fn new(options: PgPoolOptions, config: &RuntimeConfiguration) -> StudentsResult<Self> {
        let store: Arc<dyn StudentStore> = match config.storage() {
            StorageConfig::Postgres(db_config) => {
                Arc::new(PostgresStudentStore::new(options, db_config).await?)
            }
            StorageConfig::Memory => {
                warn!("Using in-memory storage, nothing will survive a restart");
                Arc::new(MemoryStudentStore::new())
            }
        };

        Ok(Self::with_store(store))
    }

    pub fn with_store(store: Arc<dyn StudentStore>) -> Self {
        Self { store }
    }

    pub async fn sensible_shutdown(&self) {
        self.store.close().await;
        info!("Storage closed");
    }
}

impl Deref for StudentsState {
    type Target = dyn StudentStore;

    fn deref(&self) -> &Self::Target {
        self.store.as_ref()
    }
}
