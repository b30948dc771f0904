use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, utoipa::ToSchema)]
pub struct Company {
    pub id: i64,
    pub name: String,
    pub headquarters: Option<String>,
    pub industry: Option<String>,
    /// User who created the company; only they may edit or delete it
    pub user_id: i64,
}

#[derive(Debug, Clone)]
pub struct NewCompany {
    pub name: String,
    pub headquarters: Option<String>,
    pub industry: Option<String>,
    pub user_id: i64,
}

/// Validated partial update. `Some(None)` clears an optional field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompanyChanges {
    pub name: Option<String>,
    pub headquarters: Option<Option<String>>,
    pub industry: Option<Option<String>>,
}

impl CompanyChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.headquarters.is_none() && self.industry.is_none()
    }
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct CreateCompanyRequest {
    pub name: Option<String>,
    pub headquarters: Option<String>,
    pub industry: Option<String>,
}

/// Blank `headquarters` / `industry` clear the stored value
#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct UpdateCompanyRequest {
    pub id: Option<i64>,
    pub name: Option<String>,
    pub headquarters: Option<String>,
    pub industry: Option<String>,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct DeleteCompanyRequest {
    pub id: Option<i64>,
}
