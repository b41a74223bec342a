use std::sync::Arc;

use sqlx::types::Json;
use sqlx::{Error, Pool, Sqlite, Transaction};

use crate::configs::Storage;
use crate::models::Preset;

#[derive(Clone)]
pub struct PresetRepository {
    storage: Arc<Storage>,
}

impl PresetRepository {
    pub fn new(storage: Arc<Storage>) -> Self {
        Self { storage }
    }

    pub fn get_pool(&self) -> &Pool<Sqlite> {
        self.storage.get_pool()
    }
}

impl PresetRepository {
    pub async fn create(
        &self,
        item: &Preset,
        transaction: &mut Transaction<'_, Sqlite>,
    ) -> Result<i32, Error> {
        let id = sqlx::query(
            r#"
            INSERT INTO presets (name, description, devices, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(&item.name)
        .bind(&item.description)
        .bind(Json(&item.devices.0))
        .bind(item.created_at)
        .bind(item.updated_at)
        .execute(&mut **transaction)
        .await?
        .last_insert_rowid();

        i32::try_from(id).map_err(|e| Error::Decode(Box::new(e)))
    }

    pub async fn find_all(&self) -> Result<Vec<Preset>, Error> {
        let presets: Vec<Preset> = sqlx::query_as("SELECT * FROM presets ORDER BY id")
            .fetch_all(self.storage.get_pool())
            .await?;

        Ok(presets)
    }

    pub async fn find_by_id(&self, id: i32) -> Result<Option<Preset>, Error> {
        let preset: Option<Preset> = sqlx::query_as("SELECT * FROM presets WHERE id = $1")
            .bind(id)
            .fetch_optional(self.storage.get_pool())
            .await?;

        Ok(preset)
    }

    pub async fn update(
        &self,
        id: i32,
        item: &Preset,
        transaction: &mut Transaction<'_, Sqlite>,
    ) -> Result<(), Error> {
        sqlx::query(
            r#"
            UPDATE presets
            SET name = $1, description = $2, devices = $3, updated_at = $4
            WHERE id = $5
            "#,
        )
        .bind(&item.name)
        .bind(&item.description)
        .bind(Json(&item.devices.0))
        .bind(item.updated_at)
        .bind(id)
        .execute(&mut **transaction)
        .await?;

        Ok(())
    }

    pub async fn delete(
        &self,
        id: i32,
        transaction: &mut Transaction<'_, Sqlite>,
    ) -> Result<bool, Error> {
        let result = sqlx::query("DELETE FROM presets WHERE id = $1")
            .bind(id)
            .execute(&mut **transaction)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
