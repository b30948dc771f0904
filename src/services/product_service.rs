use crate::database::FeedbackStore;
use crate::models::{CreateProductRequest, NewProduct, Product, ProductQuery};
use crate::utils::error::AppError;
use crate::utils::validation::Required;

pub async fn create_product(
    db: &dyn FeedbackStore,
    request: CreateProductRequest,
) -> Result<Product, AppError> {
    let mut required = Required::new();
    let name = required.text("name", &request.name);
    let company_id = required.value("company_id", request.company_id);
    let description = required.text("description", &request.description);
    required.finish()?;

    if db.find_company(company_id).await?.is_none() {
        return Err(AppError::InvalidRequest(format!("Company {} does not exist", company_id)));
    }

    Ok(db
        .insert_product(NewProduct {
            name,
            company_id,
            description,
        })
        .await?)
}

/// Products of exactly one company
pub async fn list_products(
    db: &dyn FeedbackStore,
    query: &ProductQuery,
) -> Result<Vec<Product>, AppError> {
    let mut required = Required::new();
    let company_id = required.value("company_id", query.company_id);
    required.finish()?;

    Ok(db.list_products(company_id).await?)
}
