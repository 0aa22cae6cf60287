// ==================== ORGANIZATIONS ====================
// Organizações pertencem ao usuário que as criou (owner_email).
// Membros podem ler; apenas o owner altera ou remove.

use crate::{
    database::MongoDB,
    models::{
        normalize_organization_name, AddMemberRequest, CreateOrganizationRequest, Organization,
        OrganizationResponse, UpdateOrganizationRequest,
    },
    utils::AppError,
};
use futures::stream::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId, Bson, DateTime, Document};
use mongodb::options::ReturnDocument;
use mongodb::Collection;

pub const ORGANIZATIONS_COLLECTION: &str = "organizations";

fn collection(db: &MongoDB) -> Collection<Organization> {
    db.collection::<Organization>(ORGANIZATIONS_COLLECTION)
}

pub fn parse_object_id(id: &str) -> Result<ObjectId, AppError> {
    ObjectId::parse_str(id).map_err(|_| AppError::InvalidRequest("Invalid organization ID".to_string()))
}

fn normalize_description(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim).filter(|d| !d.is_empty()).map(String::from)
}

fn not_found() -> AppError {
    AppError::NotFound("Organization not found".to_string())
}

/// Builds the `$set` document for a partial update.
pub fn build_update(request: &UpdateOrganizationRequest) -> Result<Document, AppError> {
    if request.name.is_none() && request.description.is_none() {
        return Err(AppError::InvalidRequest("Nothing to update".to_string()));
    }

    let mut set = doc! { "updated_at": DateTime::now() };

    if let Some(name) = &request.name {
        let name = normalize_organization_name(name).map_err(AppError::InvalidRequest)?;
        set.insert("name", name);
    }

    if let Some(description) = &request.description {
        match normalize_description(Some(description.as_str())) {
            Some(description) => set.insert("description", description),
            None => set.insert("description", Bson::Null),
        };
    }

    Ok(set)
}

/// POST /organizations
pub async fn create_organization(
    db: &MongoDB,
    owner_email: &str,
    request: &CreateOrganizationRequest,
) -> Result<OrganizationResponse, AppError> {
    let name = normalize_organization_name(&request.name).map_err(AppError::InvalidRequest)?;
    let now = DateTime::now();

    let mut organization = Organization {
        id: None,
        name,
        description: normalize_description(request.description.as_deref()),
        owner_email: owner_email.to_string(),
        members: vec![owner_email.to_string()],
        created_at: now,
        updated_at: now,
    };

    let result = collection(db).insert_one(&organization).await?;
    organization.id = result.inserted_id.as_object_id();

    log::info!("✅ Organization created: {} (owner: {})", organization.name, owner_email);

    Ok(OrganizationResponse::from(organization))
}

/// GET /organizations - organizações em que o usuário é membro
pub async fn list_organizations(
    db: &MongoDB,
    member_email: &str,
) -> Result<Vec<OrganizationResponse>, AppError> {
    let mut cursor = collection(db)
        .find(doc! { "members": member_email })
        .sort(doc! { "created_at": -1 })
        .await?;

    // Um documento corrompido falha a listagem inteira
    let mut organizations = Vec::new();
    while let Some(organization) = cursor.try_next().await? {
        organizations.push(OrganizationResponse::from(organization));
    }

    Ok(organizations)
}

/// GET /organizations/{id}
pub async fn get_organization(
    db: &MongoDB,
    member_email: &str,
    id: &str,
) -> Result<OrganizationResponse, AppError> {
    let object_id = parse_object_id(id)?;

    collection(db)
        .find_one(doc! { "_id": object_id, "members": member_email })
        .await?
        .map(OrganizationResponse::from)
        .ok_or_else(not_found)
}

/// PUT /organizations/{id} - somente o owner
pub async fn update_organization(
    db: &MongoDB,
    owner_email: &str,
    id: &str,
    request: &UpdateOrganizationRequest,
) -> Result<OrganizationResponse, AppError> {
    let object_id = parse_object_id(id)?;
    let set = build_update(request)?;

    collection(db)
        .find_one_and_update(
            doc! { "_id": object_id, "owner_email": owner_email },
            doc! { "$set": set },
        )
        .return_document(ReturnDocument::After)
        .await?
        .map(OrganizationResponse::from)
        .ok_or_else(not_found)
}

/// DELETE /organizations/{id} - somente o owner
pub async fn delete_organization(db: &MongoDB, owner_email: &str, id: &str) -> Result<(), AppError> {
    let object_id = parse_object_id(id)?;

    let result = collection(db)
        .delete_one(doc! { "_id": object_id, "owner_email": owner_email })
        .await?;

    if result.deleted_count == 0 {
        return Err(not_found());
    }

    log::info!("🗑️ Organization {} deleted by {}", id, owner_email);
    Ok(())
}

/// POST /organizations/{id}/members - somente o owner, idempotente
pub async fn add_member(
    db: &MongoDB,
    owner_email: &str,
    id: &str,
    request: &AddMemberRequest,
) -> Result<OrganizationResponse, AppError> {
    let object_id = parse_object_id(id)?;
    let email = request.email.trim().to_lowercase();

    if !email.contains('@') {
        return Err(AppError::InvalidRequest("A valid email is required".to_string()));
    }

    collection(db)
        .find_one_and_update(
            doc! { "_id": object_id, "owner_email": owner_email },
            doc! {
                "$addToSet": { "members": email.as_str() },
                "$set": { "updated_at": DateTime::now() },
            },
        )
        .return_document(ReturnDocument::After)
        .await?
        .map(OrganizationResponse::from)
        .ok_or_else(not_found)
}
