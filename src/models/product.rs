use serde::{Deserialize, Serialize};

/// Product offered by a company; suggestions may target it
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, utoipa::ToSchema)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub company_id: i64,
    pub description: String,
}

#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub company_id: i64,
    pub description: String,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct CreateProductRequest {
    pub name: Option<String>,
    pub company_id: Option<i64>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ProductQuery {
    /// Company whose products are listed
    pub company_id: Option<i64>,
}
