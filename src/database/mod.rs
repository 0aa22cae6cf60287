use mongodb::{Client, Collection, Database};
use mongodb::bson::doc;
use mongodb::options::IndexOptions;
use mongodb::IndexModel;
use std::time::Duration;

use crate::services::credential_store::USERS_COLLECTION;
use crate::services::organization_service::ORGANIZATIONS_COLLECTION;

const DEFAULT_DATABASE: &str = "users_db";

#[derive(Clone)]
pub struct MongoDB {
    client: Client,
    db: Database,
}

impl MongoDB {
    pub async fn new(uri: &str) -> mongodb::error::Result<Self> {
        let mut client_options = mongodb::options::ClientOptions::parse(uri).await?;

        client_options.max_pool_size = Some(20);
        client_options.min_pool_size = Some(5);
        client_options.max_idle_time = Some(Duration::from_secs(300));

        client_options.connect_timeout = Some(Duration::from_secs(5));
        client_options.server_selection_timeout = Some(Duration::from_secs(5));

        // Database name from the URI path, e.g. mongodb://mongo:27017/users_db
        let db_name = client_options
            .default_database
            .clone()
            .unwrap_or_else(|| DEFAULT_DATABASE.to_string());

        let client = Client::with_options(client_options)?;
        let db = client.database(&db_name);

        // Test connection
        db.list_collection_names().await?;

        let mongodb = Self { client, db };
        mongodb.ensure_indexes().await?;

        Ok(mongodb)
    }

    /// The unique email index is what keeps registration race-free, so a
    /// failure to build it aborts startup. The others are best effort.
    async fn ensure_indexes(&self) -> mongodb::error::Result<()> {
        log::info!("🔧 Creating database indexes...");

        let users = self.collection::<mongodb::bson::Document>(USERS_COLLECTION);

        let email_index = IndexModel::builder()
            .keys(doc! { "email": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();

        users.create_index(email_index).await?;
        log::info!("   ✅ Index created: users(email) unique");

        let refresh_index = IndexModel::builder()
            .keys(doc! { "refresh_token": 1 })
            .options(IndexOptions::builder().sparse(true).build())
            .build();

        match users.create_index(refresh_index).await {
            Ok(_) => log::info!("   ✅ Index created: users(refresh_token)"),
            Err(e) => log::debug!("   ℹ️  Index already exists: {}", e),
        }

        let organizations = self.collection::<mongodb::bson::Document>(ORGANIZATIONS_COLLECTION);

        let members_index = IndexModel::builder()
            .keys(doc! { "members": 1, "created_at": -1 })
            .build();

        match organizations.create_index(members_index).await {
            Ok(_) => log::info!("   ✅ Index created: organizations(members, created_at)"),
            Err(e) => log::debug!("   ℹ️  Index already exists: {}", e),
        }

        let owner_index = IndexModel::builder()
            .keys(doc! { "owner_email": 1 })
            .build();

        match organizations.create_index(owner_index).await {
            Ok(_) => log::info!("   ✅ Index created: organizations(owner_email)"),
            Err(e) => log::debug!("   ℹ️  Index already exists: {}", e),
        }

        log::info!("✅ Database indexes ready");

        Ok(())
    }

    pub fn collection<T: Send + Sync>(&self, name: &str) -> Collection<T> {
        self.db.collection(name)
    }

    /// Pings the server.
    pub async fn health_check(&self) -> bool {
        self.client
            .database("admin")
            .run_command(doc! { "ping": 1 })
            .await
            .is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    #[ignore] // Requires MongoDB to be running
    async fn test_mongodb_connection() {
        dotenv::dotenv().ok();
        let _ = env_logger::builder().is_test(true).try_init();

        let uri = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "mongodb://localhost:27017/users_db_test".to_string());
        let db = MongoDB::new(&uri).await.unwrap();

        assert!(db.health_check().await);
        assert_eq!(db.db.name(), "users_db_test");
    }
}
