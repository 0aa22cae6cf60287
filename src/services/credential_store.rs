use crate::{database::MongoDB, models::UserRecord, utils::StoreError};
use async_trait::async_trait;
use mongodb::bson::{doc, oid::ObjectId};
use mongodb::Collection;

pub const USERS_COLLECTION: &str = "users";

/// Persistent lookup of user records.
///
/// Email uniqueness must be enforced by the store itself: `insert` returns
/// `StoreError::DuplicateKey` when the email is taken.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError>;

    async fn find_by_refresh_token(&self, token: &str) -> Result<Option<UserRecord>, StoreError>;

    /// Returns the store-assigned id.
    async fn insert(&self, record: UserRecord) -> Result<ObjectId, StoreError>;

    /// `StoreError::RecordMissing` when no record has this id.
    async fn update_refresh_token(&self, id: &ObjectId, token: &str) -> Result<(), StoreError>;
}

/// "users" collection backed store.
#[derive(Clone)]
pub struct MongoCredentialStore {
    users: Collection<UserRecord>,
}

impl MongoCredentialStore {
    pub fn new(db: &MongoDB) -> Self {
        Self {
            users: db.collection::<UserRecord>(USERS_COLLECTION),
        }
    }
}

#[async_trait]
impl CredentialStore for MongoCredentialStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError> {
        Ok(self.users.find_one(doc! { "email": email }).await?)
    }

    async fn find_by_refresh_token(&self, token: &str) -> Result<Option<UserRecord>, StoreError> {
        Ok(self.users.find_one(doc! { "refresh_token": token }).await?)
    }

    async fn insert(&self, record: UserRecord) -> Result<ObjectId, StoreError> {
        let result = self.users.insert_one(&record).await?;
        result
            .inserted_id
            .as_object_id()
            .ok_or_else(|| StoreError::InvalidId(result.inserted_id.to_string()))
    }

    async fn update_refresh_token(&self, id: &ObjectId, token: &str) -> Result<(), StoreError> {
        let result = self
            .users
            .update_one(doc! { "_id": *id }, doc! { "$set": { "refresh_token": token } })
            .await?;

        if result.matched_count == 0 {
            log::warn!("⚠️ Refresh token not stored, user {} no longer exists", id);
            return Err(StoreError::RecordMissing(id.to_hex()));
        }
        Ok(())
    }
}


#[cfg(test)]
mod tests {
    use super::memory::MemoryCredentialStore;
    use super::*;

    #[tokio::test]
    async fn test_memory_store_rejects_duplicate_email() {
        let store = MemoryCredentialStore::new();
        store
            .insert(UserRecord::new("Ada".into(), "ada@example.com".into(), "h".into()))
            .await
            .unwrap();

        let second = store
            .insert(UserRecord::new("Eve".into(), "ada@example.com".into(), "h".into()))
            .await;
        assert!(matches!(second, Err(StoreError::DuplicateKey)));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_memory_store_refresh_token_lookup() {
        let store = MemoryCredentialStore::new();
        let id = store
            .insert(UserRecord::new("Ada".into(), "ada@example.com".into(), "h".into()))
            .await
            .unwrap();

        assert!(store.find_by_refresh_token("t1").await.unwrap().is_none());

        store.update_refresh_token(&id, "t1").await.unwrap();
        let found = store.find_by_refresh_token("t1").await.unwrap().unwrap();
        assert_eq!(found.email, "ada@example.com");

        store.update_refresh_token(&id, "t2").await.unwrap();
        assert!(store.find_by_refresh_token("t1").await.unwrap().is_none());
        assert!(store.find_by_refresh_token("t2").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_memory_store_update_of_missing_record() {
        let store = MemoryCredentialStore::new();
        let result = store.update_refresh_token(&ObjectId::new(), "t1").await;

        assert!(matches!(result, Err(StoreError::RecordMissing(_))));
        assert!(store.find_by_refresh_token("t1").await.unwrap().is_none());
    }

    #[tokio::test]
    #[ignore] // Requires MongoDB to be running
    async fn test_mongo_store_round_trip() {
        dotenv::dotenv().ok();
        let uri = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "mongodb://localhost:27017/users_db_test".to_string());
        let db = MongoDB::new(&uri).await.unwrap();
        let store = MongoCredentialStore::new(&db);

        let email = format!("{}@example.com", ObjectId::new().to_hex());
        let id = store
            .insert(UserRecord::new("Ada".into(), email.clone(), "h".into()))
            .await
            .unwrap();

        let duplicate = store
            .insert(UserRecord::new("Ada".into(), email.clone(), "h".into()))
            .await;
        assert!(matches!(duplicate, Err(StoreError::DuplicateKey)));

        let token = format!("token-{}", id.to_hex());
        store.update_refresh_token(&id, &token).await.unwrap();
        let found = store.find_by_refresh_token(&token).await.unwrap().unwrap();
        assert_eq!(found.email, email);

        let missing = store.update_refresh_token(&ObjectId::new(), &token).await;
        assert!(matches!(missing, Err(StoreError::RecordMissing(_))));
    }
}
