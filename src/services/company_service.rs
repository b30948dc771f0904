use crate::database::{FeedbackStore, StoreError};
use crate::models::{
    Company, CompanyChanges, CreateCompanyRequest, DeleteCompanyRequest, NewCompany,
    SuggestionFilter, UpdateCompanyRequest,
};
use crate::services::auth_service::Claims;
use crate::utils::error::AppError;
use crate::utils::validation::{optional_text, Required};

fn name_taken(name: &str) -> AppError {
    AppError::InvalidRequest(format!("Company '{}' already exists", name))
}

fn not_found(id: i64) -> AppError {
    AppError::NotFound(format!("Company {} not found", id))
}

/// Loads the company and checks that `claims` belong to its creator
async fn owned_company(db: &dyn FeedbackStore, claims: &Claims, id: i64) -> Result<Company, AppError> {
    let user_id = claims.user_id()?;
    let company = db.find_company(id).await?.ok_or_else(|| not_found(id))?;
    if company.user_id != user_id {
        return Err(AppError::InvalidRequest("user_id doesn't match".to_string()));
    }
    Ok(company)
}

pub async fn create_company(
    db: &dyn FeedbackStore,
    claims: &Claims,
    request: CreateCompanyRequest,
) -> Result<Company, AppError> {
    let user_id = claims.user_id()?;

    let mut required = Required::new();
    let name = required.text("name", &request.name);
    required.finish()?;

    if db.find_company_by_name(&name).await?.is_some() {
        return Err(name_taken(&name));
    }

    db.insert_company(NewCompany {
        name: name.clone(),
        headquarters: optional_text(request.headquarters),
        industry: optional_text(request.industry),
        user_id,
    })
    .await
    .map_err(|e| match e {
        StoreError::Duplicate(_) => name_taken(&name),
        other => other.into(),
    })
}

pub async fn list_companies(db: &dyn FeedbackStore) -> Result<Vec<Company>, AppError> {
    Ok(db.list_companies().await?)
}

pub async fn update_company(
    db: &dyn FeedbackStore,
    claims: &Claims,
    request: UpdateCompanyRequest,
) -> Result<Company, AppError> {
    let mut required = Required::new();
    let id = required.value("id", request.id);
    required.finish()?;

    let name = match request.name.map(|n| n.trim().to_string()) {
        Some(n) if n.is_empty() => {
            return Err(AppError::InvalidRequest("name must not be empty".to_string()));
        }
        other => other,
    };
    let changes = CompanyChanges {
        name,
        headquarters: request.headquarters.map(|h| optional_text(Some(h))),
        industry: request.industry.map(|i| optional_text(Some(i))),
    };

    let company = owned_company(db, claims, id).await?;
    if changes.is_empty() {
        return Ok(company);
    }

    if let Some(name) = &changes.name {
        if matches!(db.find_company_by_name(name).await?, Some(other) if other.id != id) {
            return Err(name_taken(name));
        }
    }

    let taken = changes.name.clone().unwrap_or_default();
    db.update_company(id, changes)
        .await
        .map_err(|e| match e {
            StoreError::Duplicate(_) => name_taken(&taken),
            other => other.into(),
        })?
        .ok_or_else(|| not_found(id))
}

/// Deletes a company that no product or suggestion refers to any more
pub async fn delete_company(
    db: &dyn FeedbackStore,
    claims: &Claims,
    request: DeleteCompanyRequest,
) -> Result<Company, AppError> {
    let mut required = Required::new();
    let id = required.value("id", request.id);
    required.finish()?;

    owned_company(db, claims, id).await?;

    let in_use = !db.list_products(id).await?.is_empty()
        || !db.list_suggestions(SuggestionFilter::Company(id)).await?.is_empty();
    if in_use {
        return Err(AppError::InvalidRequest(format!(
            "Company {} still has products or suggestions",
            id
        )));
    }

    db.delete_company(id).await?.ok_or_else(|| not_found(id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryStore;
    use crate::models::NewProduct;

    fn request(name: Option<&str>) -> CreateCompanyRequest {
        CreateCompanyRequest {
            name: name.map(str::to_string),
            headquarters: Some("Springfield".to_string()),
            industry: Some(" ".to_string()),
        }
    }

    fn update(id: i64) -> UpdateCompanyRequest {
        UpdateCompanyRequest {
            id: Some(id),
            name: None,
            headquarters: None,
            industry: None,
        }
    }

    #[tokio::test]
    async fn creates_and_lists() {
        let db = MemoryStore::new();
        let company = create_company(&db, &Claims::for_user(3), request(Some("Acme"))).await.unwrap();
        assert_eq!(company.headquarters.as_deref(), Some("Springfield"));
        assert_eq!(company.industry, None);
        assert_eq!(company.user_id, 3);

        let all = list_companies(&db).await.unwrap();
        assert_eq!(all, vec![company]);
    }

    #[tokio::test]
    async fn name_is_required_and_unique() {
        let db = MemoryStore::new();
        let claims = Claims::for_user(1);
        assert_eq!(
            create_company(&db, &claims, request(None)).await,
            Err(AppError::MissingFields(vec!["name"]))
        );

        create_company(&db, &claims, request(Some("Acme"))).await.unwrap();
        assert!(matches!(
            create_company(&db, &claims, request(Some("Acme"))).await,
            Err(AppError::InvalidRequest(_))
        ));
    }

    #[tokio::test]
    async fn only_the_creator_edits() {
        let db = MemoryStore::new();
        let company = create_company(&db, &Claims::for_user(1), request(Some("Acme"))).await.unwrap();

        let mut rename = update(company.id);
        rename.name = Some("Acme Corp".to_string());
        assert_eq!(
            update_company(&db, &Claims::for_user(2), rename).await,
            Err(AppError::InvalidRequest("user_id doesn't match".to_string()))
        );

        let mut changes = update(company.id);
        changes.name = Some(" Acme Corp ".to_string());
        changes.headquarters = Some("".to_string());
        let updated = update_company(&db, &Claims::for_user(1), changes).await.unwrap();
        assert_eq!(updated.name, "Acme Corp");
        assert_eq!(updated.headquarters, None);

        assert_eq!(
            update_company(&db, &Claims::for_user(1), update(42)).await,
            Err(not_found(42))
        );
    }

    #[tokio::test]
    async fn rename_to_taken_name_is_rejected() {
        let db = MemoryStore::new();
        let claims = Claims::for_user(1);
        create_company(&db, &claims, request(Some("Acme"))).await.unwrap();
        let globex = create_company(&db, &claims, request(Some("Globex"))).await.unwrap();

        let mut rename = update(globex.id);
        rename.name = Some("Acme".to_string());
        assert_eq!(update_company(&db, &claims, rename).await, Err(name_taken("Acme")));
    }

    #[tokio::test]
    async fn delete_refuses_companies_in_use() {
        let db = MemoryStore::new();
        let claims = Claims::for_user(1);
        let company = create_company(&db, &claims, request(Some("Acme"))).await.unwrap();
        let product = db
            .insert_product(NewProduct {
                name: "Anvil".to_string(),
                company_id: company.id,
                description: "heavy".to_string(),
            })
            .await
            .unwrap();

        let err = delete_company(&db, &claims, DeleteCompanyRequest { id: Some(company.id) })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidRequest(msg) if msg.contains("still has")));

        let empty = create_company(&db, &claims, request(Some("Globex"))).await.unwrap();
        assert_eq!(
            delete_company(&db, &Claims::for_user(2), DeleteCompanyRequest { id: Some(empty.id) }).await,
            Err(AppError::InvalidRequest("user_id doesn't match".to_string()))
        );
        let deleted = delete_company(&db, &claims, DeleteCompanyRequest { id: Some(empty.id) })
            .await
            .unwrap();
        assert_eq!(deleted.id, empty.id);
        assert!(db.find_product(product.id).await.unwrap().is_some());
    }
}
