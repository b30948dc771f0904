use actix_web::{
    body::MessageBody,
    cookie::Cookie,
    dev::{Service, ServiceResponse},
    http::{header, StatusCode},
    test::{self, TestRequest},
    web, App,
};
use serde_json::{json, Value};
use std::sync::Arc;

use feedback_service::config::AuthSettings;
use feedback_service::database::{FeedbackStore, MemoryStore};

macro_rules! test_app {
    () => {{
        let store: Arc<dyn FeedbackStore> = Arc::new(MemoryStore::new());
        test::init_service(
            App::new()
                .app_data(web::Data::from(store))
                .app_data(web::Data::new(AuthSettings {
                    bcrypt_cost: 4,
                    ..AuthSettings::default()
                }))
                .configure(feedback_service::configure),
        )
        .await
    }};
}

/// Runs the request and returns status + JSON body, including errors raised by middleware
async fn send<S, B, R>(app: &S, req: R) -> (StatusCode, Value)
where
    S: Service<R, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    match test::try_call_service(app, req).await {
        Ok(res) => {
            let status = res.status();
            let body: Value = test::read_body_json(res).await;
            (status, body)
        }
        Err(err) => {
            let res = err.error_response();
            let status = res.status();
            let bytes = actix_web::body::to_bytes(res.into_body())
                .await
                .expect("error body should be readable");
            (status, serde_json::from_slice(&bytes).expect("error body should be JSON"))
        }
    }
}

fn register_req(username: &str) -> TestRequest {
    TestRequest::post().uri("/api/register").set_json(json!({
        "username": username,
        "email": format!("{}@example.com", username),
        "password": "correct horse"
    }))
}

fn login_req(email: &str, password: &str) -> TestRequest {
    TestRequest::post()
        .uri("/api/login")
        .set_json(json!({ "email": email, "password": password }))
}

/// Request carrying the session cookie, the way a browser sends it
fn authed(req: TestRequest, token: &str) -> TestRequest {
    req.cookie(Cookie::new("access_token", token.to_string()))
}

fn token_of(body: &Value) -> String {
    body["access_token"]
        .as_str()
        .expect("response should carry access_token")
        .to_string()
}

#[actix_web::test]
async fn registering_same_username_twice_is_rejected() {
    let app = test_app!();

    let (status, body) = send(&app, register_req("ada").to_request()).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["user"]["username"], "ada");
    assert!(body["user"].get("password").is_none());

    let (status, body) = send(&app, register_req("ada").to_request()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Username already exists");
}

#[actix_web::test]
async fn register_requires_username_and_password() {
    let app = test_app!();

    let req = TestRequest::post()
        .uri("/api/register")
        .set_json(json!({ "email": "ada@example.com" }))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Missing required fields: username, password");
}

#[actix_web::test]
async fn login_sets_cookie_and_rejects_wrong_password() {
    let app = test_app!();
    send(&app, register_req("ada").to_request()).await;

    let (status, body) = send(&app, login_req("ada@example.com", "wrong").to_request()).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid credentials");

    let res = test::call_service(&app, login_req("ada@example.com", "correct horse").to_request()).await;
    assert_eq!(res.status(), StatusCode::OK);
    let set_cookie = res
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .expect("login should set the token cookie")
        .to_string();
    assert!(set_cookie.starts_with("access_token="));
    assert!(set_cookie.contains("Path=/api"));
    assert!(set_cookie.contains("HttpOnly"));
}

#[actix_web::test]
async fn login_with_missing_fields_is_bad_request() {
    let app = test_app!();
    let req = TestRequest::post()
        .uri("/api/login")
        .set_json(json!({ "email": "ada@example.com" }))
        .to_request();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn rejected_cookie_falls_back_to_bearer_header() {
    let app = test_app!();
    let (_, body) = send(&app, register_req("ada").to_request()).await;
    let token = token_of(&body);

    for stale in ["not-a-jwt", ""] {
        let req = authed(TestRequest::get().uri("/api/me"), stale)
            .insert_header((header::AUTHORIZATION, format!("Bearer {}", token)))
            .to_request();
        let (status, body) = send(&app, req).await;
        assert_eq!(status, StatusCode::OK, "cookie {:?}", stale);
        assert_eq!(body["username"], "ada");
    }

    let req = authed(TestRequest::get().uri("/api/me"), "not-a-jwt").to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["error"].as_str().unwrap().starts_with("Invalid token"));
}

#[actix_web::test]
async fn trailing_slash_on_public_path_is_not_found() {
    let app = test_app!();
    let res = test::call_service(
        &app,
        login_req("ada@example.com", "correct horse").uri("/api/login/").to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn api_routes_require_a_token() {
    let app = test_app!();

    let (status, body) = send(&app, TestRequest::get().uri("/api/company").to_request()).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Missing authorization token");

    let req = authed(TestRequest::get().uri("/api/company"), "not-a-jwt").to_request();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send(&app, TestRequest::get().uri("/health").to_request()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[actix_web::test]
async fn bearer_header_is_accepted_and_me_returns_user() {
    let app = test_app!();
    let (_, body) = send(&app, register_req("ada").to_request()).await;
    let token = token_of(&body);

    let req = TestRequest::get()
        .uri("/api/me")
        .insert_header((header::AUTHORIZATION, format!("Bearer {}", token)))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["username"], "ada");
    assert_eq!(body["email"], "ada@example.com");
}

#[actix_web::test]
async fn logout_expires_cookie() {
    let app = test_app!();
    let res = test::call_service(&app, TestRequest::post().uri("/api/logout").to_request()).await;
    assert_eq!(res.status(), StatusCode::OK);

    let set_cookie = res
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(set_cookie.starts_with("access_token=;"));
    assert!(set_cookie.contains("Max-Age=0"));
}

#[actix_web::test]
async fn companies_are_created_and_listed() {
    let app = test_app!();
    let (_, body) = send(&app, register_req("ada").to_request()).await;
    let token = token_of(&body);

    let req = authed(TestRequest::post().uri("/api/company"), &token)
        .set_json(json!({ "name": "Acme", "headquarters": "Springfield", "industry": "Tools" }))
        .to_request();
    let (status, company) = send(&app, req).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(company["id"], 1);

    let req = authed(TestRequest::post().uri("/api/company"), &token)
        .set_json(json!({ "headquarters": "Nowhere" }))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Missing required fields: name");

    let req = authed(TestRequest::get().uri("/api/company"), &token).to_request();
    let (status, companies) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(companies, json!([company]));
}

#[actix_web::test]
async fn product_listing_filters_strictly_by_company() {
    let app = test_app!();
    let (_, body) = send(&app, register_req("ada").to_request()).await;
    let token = token_of(&body);

    for name in ["Acme", "Globex"] {
        let req = authed(TestRequest::post().uri("/api/company"), &token)
            .set_json(json!({ "name": name }))
            .to_request();
        send(&app, req).await;
    }
    for (name, company_id) in [("Anvil", 1), ("Rocket", 1), ("Laser", 2)] {
        let req = authed(TestRequest::post().uri("/api/product"), &token)
            .set_json(json!({ "name": name, "company_id": company_id, "description": "product" }))
            .to_request();
        let (status, _) = send(&app, req).await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let req = authed(TestRequest::get().uri("/api/product?company_id=1"), &token).to_request();
    let (status, products) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<_> = products
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["name"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(names, vec!["Anvil", "Rocket"]);

    let req = authed(TestRequest::get().uri("/api/product"), &token).to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Missing required fields: company_id");
}

fn suggestion_body(title: &str, user_id: i64) -> Value {
    json!({
        "title": title,
        "description": "make it lighter",
        "user_id": user_id,
        "company_id": 1,
        "product_id": 1
    })
}

#[actix_web::test]
async fn suggestion_lifecycle() {
    let app = test_app!();

    let (_, body) = send(&app, register_req("ada").to_request()).await;
    let token = token_of(&body);
    let user_id = body["user"]["id"].as_i64().unwrap();
    let seed = [
        authed(TestRequest::post().uri("/api/company"), &token).set_json(json!({ "name": "Acme" })),
        authed(TestRequest::post().uri("/api/product"), &token)
            .set_json(json!({ "name": "Anvil", "company_id": 1, "description": "heavy" })),
    ];
    for req in seed {
        let (status, _) = send(&app, req.to_request()).await;
        assert_eq!(status, StatusCode::CREATED);
    }

    // create
    let req = authed(TestRequest::post().uri("/api/suggestion"), &token)
        .set_json(suggestion_body("Lighter anvil", user_id))
        .to_request();
    let (status, created) = send(&app, req).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["upvotes"], 0);
    assert_eq!(created["downvotes"], 0);
    let id = created["id"].as_i64().unwrap();

    // duplicate title
    let req = authed(TestRequest::post().uri("/api/suggestion"), &token)
        .set_json(suggestion_body("Lighter anvil", user_id))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Another suggestion with that title already exists");

    // partial update
    let req = authed(TestRequest::patch().uri("/api/suggestion"), &token)
        .set_json(json!({ "id": id, "upvotes": 4 }))
        .to_request();
    let (status, updated) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["upvotes"], 4);
    assert_eq!(updated["title"], "Lighter anvil");

    // vote
    let req = authed(TestRequest::post().uri("/api/suggestion/vote"), &token)
        .set_json(json!({ "id": id, "direction": "down" }))
        .to_request();
    let (status, voted) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(voted["vote"], "down");
    assert_eq!(voted["suggestion"]["downvotes"], 1);
    assert_eq!(voted["suggestion"]["upvotes"], 4);

    // list by product, then by company
    for query in ["product_id_included=true&filter_id=1", "product_id_included=false&filter_id=1"] {
        let req = authed(TestRequest::get().uri(&format!("/api/suggestion?{}", query)), &token).to_request();
        let (status, list) = send(&app, req).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(list.as_array().unwrap().len(), 1);
    }

    // delete by someone else: rejected, row intact
    let req = authed(TestRequest::delete().uri("/api/suggestion"), &token)
        .set_json(json!({ "id": id, "user_id": user_id + 100 }))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "user_id doesn't match");

    let req = authed(TestRequest::get().uri("/api/suggestion?product_id_included=false&filter_id=1"), &token)
        .to_request();
    let (_, list) = send(&app, req).await;
    assert_eq!(list.as_array().unwrap().len(), 1);

    // delete by the author
    let req = authed(TestRequest::delete().uri("/api/suggestion"), &token)
        .set_json(json!({ "id": id, "user_id": user_id }))
        .to_request();
    let (status, deleted) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(deleted["id"], id);

    // updating a deleted suggestion is a 404, not a crash
    let req = authed(TestRequest::patch().uri("/api/suggestion"), &token)
        .set_json(json!({ "id": id, "title": "Gone" }))
        .to_request();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn suggestion_listing_requires_both_parameters() {
    let app = test_app!();
    let (_, body) = send(&app, register_req("ada").to_request()).await;
    let token = token_of(&body);

    let req = authed(TestRequest::get().uri("/api/suggestion?filter_id=1"), &token).to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Missing required fields: product_id_included");
}

#[actix_web::test]
async fn malformed_json_is_bad_request() {
    let app = test_app!();
    let req = TestRequest::post()
        .uri("/api/register")
        .insert_header((header::CONTENT_TYPE, "application/json"))
        .set_payload("{not json")
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().starts_with("Invalid JSON body"));
}

#[actix_web::test]
async fn vote_direction_must_be_up_or_down() {
    let app = test_app!();
    let (_, body) = send(&app, register_req("ada").to_request()).await;
    let token = token_of(&body);

    let req = authed(TestRequest::post().uri("/api/suggestion/vote"), &token)
        .set_json(json!({ "id": 1, "direction": "sideways" }))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().starts_with("Invalid JSON body"));
}

/// Registers ada and bob, then has ada create company 1, product 1 and a suggestion
macro_rules! two_users_and_a_suggestion {
    ($app:expr) => {{
        let (_, ada) = send(&$app, register_req("ada").to_request()).await;
        let (_, bob) = send(&$app, register_req("bob").to_request()).await;
        let ada_id = ada["user"]["id"].as_i64().unwrap();
        let (ada, bob) = (token_of(&ada), token_of(&bob));

        let seed = [
            authed(TestRequest::post().uri("/api/company"), &ada).set_json(json!({ "name": "Acme" })),
            authed(TestRequest::post().uri("/api/product"), &ada)
                .set_json(json!({ "name": "Anvil", "company_id": 1, "description": "heavy" })),
            authed(TestRequest::post().uri("/api/suggestion"), &ada)
                .set_json(suggestion_body("Lighter anvil", ada_id)),
        ];
        let mut suggestion = Value::Null;
        for req in seed {
            let (status, body) = send(&$app, req.to_request()).await;
            assert_eq!(status, StatusCode::CREATED);
            suggestion = body;
        }
        (ada, ada_id, bob, suggestion["id"].as_i64().unwrap())
    }};
}

#[actix_web::test]
async fn suggestions_are_bound_to_the_token_user() {
    let app = test_app!();
    let (ada, ada_id, bob, id) = two_users_and_a_suggestion!(app);

    // bob cannot post in ada's name
    let req = authed(TestRequest::post().uri("/api/suggestion"), &bob)
        .set_json(suggestion_body("Heavier anvil", ada_id))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "user_id doesn't match");

    // nor delete the suggestion by naming ada in the body
    let req = authed(TestRequest::delete().uri("/api/suggestion"), &bob)
        .set_json(json!({ "id": id, "user_id": ada_id }))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "user_id doesn't match");

    let req = authed(TestRequest::get().uri("/api/suggestion?product_id_included=false&filter_id=1"), &ada)
        .to_request();
    let (_, list) = send(&app, req).await;
    assert_eq!(list.as_array().unwrap().len(), 1);
    assert_eq!(list[0]["title"], "Lighter anvil");
}

#[actix_web::test]
async fn each_user_holds_one_vote() {
    let app = test_app!();
    let (ada, _, bob, id) = two_users_and_a_suggestion!(app);

    let vote = |token: String, direction: &'static str| {
        authed(TestRequest::post().uri("/api/suggestion/vote"), &token)
            .set_json(json!({ "id": id, "direction": direction }))
            .to_request()
    };

    let (status, body) = send(&app, vote(ada.clone(), "up")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["vote"], "up");
    assert_eq!(body["suggestion"]["upvotes"], 1);

    // same direction again takes the vote back
    let (_, body) = send(&app, vote(ada.clone(), "up")).await;
    assert_eq!(body["vote"], Value::Null);
    assert_eq!(body["suggestion"]["upvotes"], 0);

    let (_, body) = send(&app, vote(bob.clone(), "up")).await;
    assert_eq!(body["suggestion"]["upvotes"], 1);

    let (_, body) = send(&app, vote(ada.clone(), "down")).await;
    assert_eq!((body["suggestion"]["upvotes"].as_i64(), body["suggestion"]["downvotes"].as_i64()), (Some(1), Some(1)));

    // switching moves ada's vote instead of adding one
    let (_, body) = send(&app, vote(ada.clone(), "up")).await;
    assert_eq!(body["vote"], "up");
    assert_eq!((body["suggestion"]["upvotes"].as_i64(), body["suggestion"]["downvotes"].as_i64()), (Some(2), Some(0)));

    let req = authed(TestRequest::post().uri("/api/suggestion/vote"), &bob)
        .set_json(json!({ "id": 999, "direction": "up" }))
        .to_request();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn only_the_creator_edits_or_deletes_a_company() {
    let app = test_app!();
    let (ada, _, bob, _) = two_users_and_a_suggestion!(app);

    let req = authed(TestRequest::patch().uri("/api/company"), &bob)
        .set_json(json!({ "id": 1, "name": "Bobco" }))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "user_id doesn't match");

    let req = authed(TestRequest::patch().uri("/api/company"), &ada)
        .set_json(json!({ "id": 1, "industry": "Tools" }))
        .to_request();
    let (status, company) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!((company["name"].as_str(), company["industry"].as_str()), (Some("Acme"), Some("Tools")));

    // products and suggestions still point at Acme
    let req = authed(TestRequest::delete().uri("/api/company"), &ada)
        .set_json(json!({ "id": 1 }))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Company 1 still has products or suggestions");

    let req = authed(TestRequest::post().uri("/api/company"), &ada)
        .set_json(json!({ "name": "Globex" }))
        .to_request();
    let (_, globex) = send(&app, req).await;
    let delete = |token: &str| {
        authed(TestRequest::delete().uri("/api/company"), token)
            .set_json(json!({ "id": globex["id"] }))
            .to_request()
    };
    let (status, _) = send(&app, delete(&bob)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, deleted) = send(&app, delete(&ada)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(deleted["name"], "Globex");
    let (status, _) = send(&app, delete(&ada)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let req = authed(TestRequest::get().uri("/api/company"), &ada).to_request();
    let (_, companies) = send(&app, req).await;
    assert_eq!(companies.as_array().unwrap().len(), 1);
}

#[actix_web::test]
async fn comment_lifecycle() {
    let app = test_app!();
    let (ada, _, bob, id) = two_users_and_a_suggestion!(app);
    let list_uri = format!("/api/comment?suggestion_id={}", id);

    let req = authed(TestRequest::post().uri("/api/comment"), &bob)
        .set_json(json!({ "suggestion_id": id, "message": "Yes please" }))
        .to_request();
    let (status, comment) = send(&app, req).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(comment["likes"], 0);
    let comment_id = comment["id"].as_i64().unwrap();

    let req = authed(TestRequest::get().uri(&list_uri), &ada).to_request();
    let (status, list) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list, json!([comment]));

    // only bob may edit his comment
    let edit = |token: &str| {
        authed(TestRequest::patch().uri("/api/comment"), token)
            .set_json(json!({ "id": comment_id, "message": "Yes please, soon" }))
            .to_request()
    };
    let (status, body) = send(&app, edit(&ada)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "user_id doesn't match");
    let (status, edited) = send(&app, edit(&bob)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(edited["message"], "Yes please, soon");

    // a like toggles per user
    let like = || {
        authed(TestRequest::post().uri("/api/comment/like"), &ada)
            .set_json(json!({ "id": comment_id }))
            .to_request()
    };
    let (status, body) = send(&app, like()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!((body["liked"].as_bool(), body["comment"]["likes"].as_i64()), (Some(true), Some(1)));
    let (_, body) = send(&app, like()).await;
    assert_eq!((body["liked"].as_bool(), body["comment"]["likes"].as_i64()), (Some(false), Some(0)));

    let req = authed(TestRequest::delete().uri("/api/comment"), &bob)
        .set_json(json!({ "id": comment_id }))
        .to_request();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);

    let req = authed(TestRequest::get().uri(&list_uri), &ada).to_request();
    let (_, list) = send(&app, req).await;
    assert_eq!(list, json!([]));

    let req = authed(TestRequest::get().uri("/api/comment"), &ada).to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Missing required fields: suggestion_id");
}
