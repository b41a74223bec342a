use std::sync::Arc;

use sqlx::types::Json;
use sqlx::{Error, Pool, Sqlite, Transaction};

use crate::configs::Storage;
use crate::models::Device;

#[derive(Clone)]
pub struct DeviceRepository {
    storage: Arc<Storage>,
}

impl DeviceRepository {
    pub fn new(storage: Arc<Storage>) -> Self {
        Self { storage }
    }

    pub fn get_pool(&self) -> &Pool<Sqlite> {
        self.storage.get_pool()
    }
}

impl DeviceRepository {
    pub async fn create(
        &self,
        item: &Device,
        transaction: &mut Transaction<'_, Sqlite>,
    ) -> Result<i32, Error> {
        let id = sqlx::query(
            r#"
            INSERT INTO devices (device_type, name, settings, position_x, position_y, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(item.device_type.as_str())
        .bind(&item.name)
        .bind(Json(&item.settings.0))
        .bind(item.position_x)
        .bind(item.position_y)
        .bind(item.created_at)
        .bind(item.updated_at)
        .execute(&mut **transaction)
        .await?
        .last_insert_rowid();

        i32::try_from(id).map_err(|e| Error::Decode(Box::new(e)))
    }

    pub async fn find_all(&self) -> Result<Vec<Device>, Error> {
        let devices: Vec<Device> = sqlx::query_as("SELECT * FROM devices ORDER BY id")
            .fetch_all(self.storage.get_pool())
            .await?;

        Ok(devices)
    }

    pub async fn find_by_id(&self, id: i32) -> Result<Option<Device>, Error> {
        let device: Option<Device> = sqlx::query_as("SELECT * FROM devices WHERE id = $1")
            .bind(id)
            .fetch_optional(self.storage.get_pool())
            .await?;

        Ok(device)
    }

    pub async fn update(
        &self,
        id: i32,
        item: &Device,
        transaction: &mut Transaction<'_, Sqlite>,
    ) -> Result<(), Error> {
        sqlx::query(
            r#"
            UPDATE devices
            SET device_type = $1, name = $2, settings = $3, position_x = $4, position_y = $5, updated_at = $6
            WHERE id = $7
            "#,
        )
        .bind(item.device_type.as_str())
        .bind(&item.name)
        .bind(Json(&item.settings.0))
        .bind(item.position_x)
        .bind(item.position_y)
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
        let result = sqlx::query("DELETE FROM devices WHERE id = $1")
            .bind(id)
            .execute(&mut **transaction)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Removes every device in the shared sandbox, returning how many were removed.
    pub async fn delete_all(&self, transaction: &mut Transaction<'_, Sqlite>) -> Result<u64, Error> {
        let result = sqlx::query("DELETE FROM devices")
            .execute(&mut **transaction)
            .await?;

        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use homesim_api::models::DeviceType;
    use serde_json::json;
    use time::OffsetDateTime;

    use crate::configs::{Database, SchemaManager};

    use super::*;

    async fn setup_test_db() -> Arc<Storage> {
        Arc::new(
            Storage::new(
                Database {
                    migration_path: None,
                    clean_start: true,
                    url: String::from("sqlite::memory:"),
                },
                SchemaManager::default(),
            )
            .await
            .unwrap(),
        )
    }

    fn test_device(device_type: DeviceType, name: &str) -> Device {
        let now = OffsetDateTime::now_utc();
        Device {
            id: 0,
            device_type,
            name: name.to_string(),
            settings: Json(device_type.default_settings()),
            position_x: Some(120),
            position_y: None,
            created_at: now,
            updated_at: now,
        }
    }

    async fn insert(repo: &DeviceRepository, device: &Device) -> i32 {
        let mut tx = repo.get_pool().begin().await.unwrap();
        let id = repo.create(device, &mut tx).await.unwrap();
        tx.commit().await.unwrap();
        id
    }

    #[tokio::test]
    async fn test_create_and_find_device() {
        let storage = setup_test_db().await;
        let repo = DeviceRepository::new(storage.clone());

        let id = insert(&repo, &test_device(DeviceType::Light, "Desk Lamp")).await;

        let found = repo.find_by_id(id).await.unwrap().unwrap();
        assert_eq!(found.device_type, DeviceType::Light);
        assert_eq!(found.name, "Desk Lamp");
        assert_eq!(found.settings.0["colorTemp"], json!("warm"));
        assert_eq!(found.position_x, Some(120));
        assert_eq!(found.position_y, None);
    }

    #[tokio::test]
    async fn test_update_device() {
        let storage = setup_test_db().await;
        let repo = DeviceRepository::new(storage.clone());

        let id = insert(&repo, &test_device(DeviceType::Fan, "Ceiling Fan")).await;

        let mut device = repo.find_by_id(id).await.unwrap().unwrap();
        device.settings.0.insert("speed".into(), json!(75));
        device.position_x = None;

        let mut tx = storage.get_pool().begin().await.unwrap();
        repo.update(id, &device, &mut tx).await.unwrap();
        tx.commit().await.unwrap();

        let found = repo.find_by_id(id).await.unwrap().unwrap();
        assert_eq!(found.settings.0["speed"], json!(75));
        assert_eq!(found.position_x, None);
        assert_eq!(found.name, "Ceiling Fan");
    }

    #[tokio::test]
    async fn test_delete_and_delete_all() {
        let storage = setup_test_db().await;
        let repo = DeviceRepository::new(storage.clone());

        let first = insert(&repo, &test_device(DeviceType::Light, "A")).await;
        insert(&repo, &test_device(DeviceType::Fan, "B")).await;
        insert(&repo, &test_device(DeviceType::Fan, "C")).await;

        let mut tx = storage.get_pool().begin().await.unwrap();
        assert!(repo.delete(first, &mut tx).await.unwrap());
        assert!(!repo.delete(first, &mut tx).await.unwrap());
        tx.commit().await.unwrap();

        let mut tx = storage.get_pool().begin().await.unwrap();
        assert_eq!(repo.delete_all(&mut tx).await.unwrap(), 2);
        tx.commit().await.unwrap();

        assert!(repo.find_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_rejects_ids_beyond_i32() {
        let storage = setup_test_db().await;
        let repo = DeviceRepository::new(storage.clone());

        sqlx::query(
            r#"
            INSERT INTO devices (id, device_type, name, settings, created_at, updated_at)
            VALUES ($1, 'fan', 'Last', '{}', $2, $2)
            "#,
        )
        .bind(i32::MAX)
        .bind(OffsetDateTime::now_utc())
        .execute(storage.get_pool())
        .await
        .unwrap();

        let mut tx = storage.get_pool().begin().await.unwrap();
        let result = repo.create(&test_device(DeviceType::Light, "Overflow"), &mut tx).await;
        assert!(matches!(result, Err(Error::Decode(_))));
        drop(tx);

        let devices = repo.find_all().await.unwrap();
        assert_eq!(devices.len(), 1);
        assert_eq!(devices[0].id, i32::MAX);
    }
}
