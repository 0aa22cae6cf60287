use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// Document of the "users" collection.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct UserRecord {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub name: String,
    pub email: String,  // unique index
    pub password_hash: String,
    /// The single live refresh token. Overwritten on every sign-in.
    #[serde(default)]
    pub refresh_token: Option<String>,
}

impl UserRecord {
    pub fn new(name: String, email: String, password_hash: String) -> Self {
        Self {
            id: None,
            name,
            email,
            password_hash,
            refresh_token: None,
        }
    }
}

/// What the API exposes about a user. Never carries the hash or tokens.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, utoipa::ToSchema)]
pub struct PublicUser {
    pub id: String,
    pub name: String,
    pub email: String,
}

impl From<&UserRecord> for PublicUser {
    fn from(user: &UserRecord) -> Self {
        Self {
            id: user.id.map(|oid| oid.to_hex()).unwrap_or_default(),
            name: user.name.clone(),
            email: user.email.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson;

    #[test]
    fn test_missing_refresh_token_deserializes_as_none() {
        let oid = ObjectId::new();
        let document = bson::doc! {
            "_id": oid,
            "name": "Ada",
            "email": "ada@example.com",
            "password_hash": "$2b$04$hash",
        };

        let user: UserRecord = bson::from_document(document).unwrap();
        assert_eq!(user.id, Some(oid));
        assert!(user.refresh_token.is_none());
    }

    #[test]
    fn test_new_record_skips_id_when_serialized() {
        let user = UserRecord::new("Ada".into(), "ada@example.com".into(), "hash".into());
        let document = bson::to_document(&user).unwrap();
        assert!(!document.contains_key("_id"));
        assert_eq!(document.get_str("email").unwrap(), "ada@example.com");
    }

    #[test]
    fn test_public_user_hides_secrets() {
        let mut user = UserRecord::new("Ada".into(), "ada@example.com".into(), "hash".into());
        user.id = Some(ObjectId::new());
        user.refresh_token = Some("token".into());

        let public = PublicUser::from(&user);
        let json = serde_json::to_value(&public).unwrap();

        assert_eq!(json["id"], user.id.unwrap().to_hex());
        assert!(json.get("password_hash").is_none());
        assert!(json.get("refresh_token").is_none());
    }
}
