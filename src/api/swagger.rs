use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Feedback Service API",
        version = "1.0.0",
        description = "Company feedback backend: users register, create companies and products, post, vote on and comment on improvement suggestions.\n\n**Authentication:** `/api/register` and `/api/login` set an `access_token` cookie (path `/api`) that every other `/api` route requires. An `Authorization: Bearer` header is accepted as well."
    ),
    paths(
        // Auth
        crate::api::auth::register,
        crate::api::auth::login,
        crate::api::auth::logout,
        crate::api::auth::get_me,

        // Companies & products
        crate::api::companies::create_company,
        crate::api::companies::list_companies,
        crate::api::companies::update_company,
        crate::api::companies::delete_company,
        crate::api::products::create_product,
        crate::api::products::list_products,

        // Suggestions
        crate::api::suggestions::create_suggestion,
        crate::api::suggestions::update_suggestion,
        crate::api::suggestions::vote_suggestion,
        crate::api::suggestions::list_suggestions,
        crate::api::suggestions::delete_suggestion,

        // Comments
        crate::api::comments::create_comment,
        crate::api::comments::list_comments,
        crate::api::comments::update_comment,
        crate::api::comments::delete_comment,
        crate::api::comments::like_comment,

        // Health
        crate::api::health::health_check,
    ),
    components(
        schemas(
            crate::models::RegisterRequest,
            crate::models::LoginRequest,
            crate::models::AuthResponse,
            crate::models::UserInfo,
            crate::models::Company,
            crate::models::CreateCompanyRequest,
            crate::models::UpdateCompanyRequest,
            crate::models::DeleteCompanyRequest,
            crate::models::Product,
            crate::models::CreateProductRequest,
            crate::models::Suggestion,
            crate::models::CreateSuggestionRequest,
            crate::models::UpdateSuggestionRequest,
            crate::models::VoteRequest,
            crate::models::Vote,
            crate::models::VoteResponse,
            crate::models::DeleteSuggestionRequest,
            crate::models::Comment,
            crate::models::CreateCommentRequest,
            crate::models::UpdateCommentRequest,
            crate::models::CommentIdRequest,
            crate::models::CommentLikeResponse,
            crate::api::health::HealthResponse,
        )
    ),
    tags(
        (name = "Auth", description = "Registration, login and session cookie management."),
        (name = "Companies", description = "Companies that receive feedback."),
        (name = "Products", description = "Products belonging to a company."),
        (name = "Suggestions", description = "Improvement suggestions with per-user up/down votes."),
        (name = "Comments", description = "Discussion under a suggestion, with per-user likes."),
        (name = "Health", description = "Liveness and storage connectivity."),
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "access_token",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                    "access_token",
                    "JWT issued by /api/register or /api/login",
                ))),
            );
        }
    }
}
