use mongodb::bson::oid::ObjectId;
use mongodb::bson::DateTime as BsonDateTime;
use serde::{Deserialize, Serialize};

pub const MAX_ORGANIZATION_NAME_LEN: usize = 100;

/// Document of the "organizations" collection
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Organization {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub description: Option<String>,
    pub owner_email: String,
    /// Member emails. The owner is always the first entry.
    #[serde(default)]
    pub members: Vec<String>,
    pub created_at: BsonDateTime,
    pub updated_at: BsonDateTime,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct CreateOrganizationRequest {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct UpdateOrganizationRequest {
    pub name: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct AddMemberRequest {
    pub email: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, utoipa::ToSchema)]
pub struct OrganizationResponse {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub owner_email: String,
    pub members: Vec<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Organization> for OrganizationResponse {
    fn from(org: Organization) -> Self {
        Self {
            id: org.id.map(|oid| oid.to_hex()).unwrap_or_default(),
            name: org.name,
            description: org.description,
            owner_email: org.owner_email,
            members: org.members,
            created_at: org.created_at.try_to_rfc3339_string().unwrap_or_default(),
            updated_at: org.updated_at.try_to_rfc3339_string().unwrap_or_default(),
        }
    }
}

/// Trims and checks an organization name.
pub fn normalize_organization_name(raw: &str) -> Result<String, String> {
    let name = raw.trim();
    if name.is_empty() {
        return Err("Organization name is required".to_string());
    }
    if name.chars().count() > MAX_ORGANIZATION_NAME_LEN {
        return Err(format!(
            "Organization name must be at most {} characters",
            MAX_ORGANIZATION_NAME_LEN
        ));
    }
    Ok(name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_organization_name() {
        assert_eq!(normalize_organization_name("  Acme  ").unwrap(), "Acme");
        assert!(normalize_organization_name("   ").is_err());
        assert!(normalize_organization_name(&"x".repeat(MAX_ORGANIZATION_NAME_LEN + 1)).is_err());
        assert!(normalize_organization_name(&"é".repeat(MAX_ORGANIZATION_NAME_LEN)).is_ok());
    }

    #[test]
    fn test_response_from_organization() {
        let oid = ObjectId::new();
        let now = BsonDateTime::now();
        let org = Organization {
            id: Some(oid),
            name: "Acme".into(),
            description: None,
            owner_email: "ada@example.com".into(),
            members: vec!["ada@example.com".into()],
            created_at: now,
            updated_at: now,
        };

        let response = OrganizationResponse::from(org);
        assert_eq!(response.id, oid.to_hex());
        assert_eq!(response.members, vec!["ada@example.com".to_string()]);
        assert!(!response.created_at.is_empty());

        let json = serde_json::to_value(&response).unwrap();
        assert!(json.get("description").is_none());
    }
}
