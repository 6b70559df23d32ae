use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use ladle::api::AppState;
use ladle::config::Config;
use std::sync::Arc;
use tower::ServiceExt;

const PASSWORD: &str = "correct-horse-battery";
const IMAGE: &str = "data:image/png;base64,iVBORw0KGgo=";

async fn spawn_app() -> (Router, Arc<AppState>) {
    let mut config = Config::default();
    config.general.database_path = "sqlite::memory:".to_string();
    config.general.media_path = std::env::temp_dir()
        .join(format!("ladle-tests-{}", uuid::Uuid::new_v4()))
        .to_string_lossy()
        .to_string();
    config.observability.metrics_enabled = false;
    // Cheap Argon2 params keep the test suite fast
    config.security.argon2_memory_cost_kib = 1024;
    config.security.argon2_time_cost = 1;

    let state = ladle::api::create_app_state_from_config(config, None)
        .await
        .expect("Failed to create app state");
    let app = ladle::api::router(state.clone()).await;

    (app, state)
}

fn request(
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<&serde_json::Value>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);

    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Token {token}"));
    }

    match body {
        Some(body) => builder
            .header("Content-Type", mime::APPLICATION_JSON.as_ref())
            .body(Body::from(serde_json::to_string(body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<&serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let response = app
        .clone()
        .oneshot(request(method, uri, token, body))
        .await
        .unwrap();

    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null)
    };

    (status, json)
}

/// Register a user and log them in; returns (user id, auth token).
async fn register_and_login(app: &Router, email: &str, username: &str) -> (i64, String) {
    let payload = serde_json::json!({
        "email": email,
        "username": username,
        "first_name": "Test",
        "last_name": "Chef",
        "password": PASSWORD,
    });

    let (status, body) = send(app, "POST", "/api/users/", None, Some(&payload)).await;
    assert_eq!(status, StatusCode::CREATED, "registration failed: {body}");
    let user_id = body["id"].as_i64().unwrap();

    let login = serde_json::json!({ "email": email, "password": PASSWORD });
    let (status, body) = send(app, "POST", "/api/auth/token/login/", None, Some(&login)).await;
    assert_eq!(status, StatusCode::OK, "login failed: {body}");

    (user_id, body["auth_token"].as_str().unwrap().to_string())
}

struct Catalog {
    breakfast: i32,
    dinner: i32,
    sugar: i32,
    flour: i32,
}

async fn seed_catalog(state: &Arc<AppState>) -> Catalog {
    let store = state.store();

    let breakfast = store
        .create_tag("Breakfast", "#E26C2D", "breakfast")
        .await
        .unwrap();
    let dinner = store.create_tag("Dinner", "#49B64E", "dinner").await.unwrap();
    let sugar = store.create_ingredient("sugar", "g").await.unwrap();
    let flour = store.create_ingredient("flour", "g").await.unwrap();

    Catalog {
        breakfast: breakfast.id,
        dinner: dinner.id,
        sugar: sugar.id,
        flour: flour.id,
    }
}

fn recipe_payload(name: &str, tags: &[i32], ingredients: &[(i32, i32)]) -> serde_json::Value {
    serde_json::json!({
        "name": name,
        "text": "Mix everything and cook.",
        "image": IMAGE,
        "cooking_time": 15,
        "tags": tags,
        "ingredients": ingredients
            .iter()
            .map(|(id, amount)| serde_json::json!({ "id": id, "amount": amount }))
            .collect::<Vec<_>>(),
    })
}

#[tokio::test]
async fn test_registration_and_me() {
    let (app, _state) = spawn_app().await;

    let (_, token) = register_and_login(&app, "anna@example.com", "anna").await;

    let (status, body) = send(&app, "GET", "/api/users/me/", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "anna@example.com");
    assert_eq!(body["username"], "anna");
    assert_eq!(body["is_subscribed"], false);

    // No token -> 401
    let (status, _) = send(&app, "GET", "/api/users/me/", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_reserved_username_rejected() {
    let (app, _state) = spawn_app().await;

    for username in ["me", "Me", "ME"] {
        let payload = serde_json::json!({
            "email": format!("{username}@example.com"),
            "username": username,
            "first_name": "Test",
            "last_name": "Chef",
            "password": PASSWORD,
        });

        let (status, body) = send(&app, "POST", "/api/users/", None, Some(&payload)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{username}: {body}");
        assert!(body["username"].is_array());
    }
}

#[tokio::test]
async fn test_duplicate_email_and_username_rejected() {
    let (app, _state) = spawn_app().await;

    register_and_login(&app, "anna@example.com", "anna").await;

    let duplicate_email = serde_json::json!({
        "email": "anna@example.com",
        "username": "other",
        "first_name": "Test",
        "last_name": "Chef",
        "password": PASSWORD,
    });
    let (status, body) = send(&app, "POST", "/api/users/", None, Some(&duplicate_email)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["email"].is_array());

    let duplicate_username = serde_json::json!({
        "email": "other@example.com",
        "username": "anna",
        "first_name": "Test",
        "last_name": "Chef",
        "password": PASSWORD,
    });
    let (status, body) = send(&app, "POST", "/api/users/", None, Some(&duplicate_username)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["username"].is_array());
}

#[tokio::test]
async fn test_login_rejects_bad_credentials() {
    let (app, _state) = spawn_app().await;

    register_and_login(&app, "anna@example.com", "anna").await;

    let login = serde_json::json!({ "email": "anna@example.com", "password": "wrong-password" });
    let (status, _) = send(&app, "POST", "/api/auth/token/login/", None, Some(&login)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_recipe_create_requires_auth() {
    let (app, state) = spawn_app().await;
    let catalog = seed_catalog(&state).await;

    let payload = recipe_payload("Pancakes", &[catalog.breakfast], &[(catalog.flour, 200)]);
    let (status, _) = send(&app, "POST", "/api/recipes/", None, Some(&payload)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_recipe_crud_and_association_replacement() {
    let (app, state) = spawn_app().await;
    let catalog = seed_catalog(&state).await;
    let (_, token) = register_and_login(&app, "anna@example.com", "anna").await;

    let payload = recipe_payload(
        "Pancakes",
        &[catalog.breakfast],
        &[(catalog.sugar, 10), (catalog.flour, 200)],
    );
    let (status, body) = send(&app, "POST", "/api/recipes/", Some(&token), Some(&payload)).await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let recipe_id = body["id"].as_i64().unwrap();
    assert_eq!(body["author"]["username"], "anna");
    assert_eq!(body["ingredients"].as_array().unwrap().len(), 2);
    assert_eq!(body["tags"][0]["slug"], "breakfast");
    assert!(body["image"].as_str().unwrap().starts_with("/media/"));

    // Update fully replaces the tag and ingredient sets
    let milk = state.store().create_ingredient("milk", "ml").await.unwrap();
    let update = serde_json::json!({
        "tags": [catalog.dinner],
        "ingredients": [{ "id": milk.id, "amount": 5 }],
    });
    let (status, body) = send(
        &app,
        "PATCH",
        &format!("/api/recipes/{recipe_id}/"),
        Some(&token),
        Some(&update),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");

    let (status, body) = send(
        &app,
        "GET",
        &format!("/api/recipes/{recipe_id}/"),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let ingredients = body["ingredients"].as_array().unwrap();
    assert_eq!(ingredients.len(), 1);
    assert_eq!(ingredients[0]["name"], "milk");
    assert_eq!(ingredients[0]["amount"], 5);
    let tags = body["tags"].as_array().unwrap();
    assert_eq!(tags.len(), 1);
    assert_eq!(tags[0]["slug"], "dinner");

    // Delete
    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/api/recipes/{recipe_id}/"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(
        &app,
        "GET",
        &format!("/api/recipes/{recipe_id}/"),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_recipe_validation_errors() {
    let (app, state) = spawn_app().await;
    let catalog = seed_catalog(&state).await;
    let (_, token) = register_and_login(&app, "anna@example.com", "anna").await;

    // amount < 1
    let mut payload = recipe_payload("Pancakes", &[catalog.breakfast], &[(catalog.flour, 0)]);
    let (status, body) = send(&app, "POST", "/api/recipes/", Some(&token), Some(&payload)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["ingredients"].is_array());

    // cooking_time < 1
    payload = recipe_payload("Pancakes", &[catalog.breakfast], &[(catalog.flour, 200)]);
    payload["cooking_time"] = serde_json::json!(0);
    let (status, body) = send(&app, "POST", "/api/recipes/", Some(&token), Some(&payload)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["cooking_time"].is_array());

    // duplicate ingredient ids in one payload
    payload = recipe_payload(
        "Pancakes",
        &[catalog.breakfast],
        &[(catalog.flour, 10), (catalog.flour, 20)],
    );
    let (status, _) = send(&app, "POST", "/api/recipes/", Some(&token), Some(&payload)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // unknown tag id
    payload = recipe_payload("Pancakes", &[999], &[(catalog.flour, 10)]);
    let (status, _) = send(&app, "POST", "/api/recipes/", Some(&token), Some(&payload)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_only_author_or_staff_may_modify() {
    let (app, state) = spawn_app().await;
    let catalog = seed_catalog(&state).await;
    let (_, author_token) = register_and_login(&app, "anna@example.com", "anna").await;
    let (_, other_token) = register_and_login(&app, "boris@example.com", "boris").await;

    let payload = recipe_payload("Pancakes", &[catalog.breakfast], &[(catalog.flour, 200)]);
    let (_, body) = send(
        &app,
        "POST",
        "/api/recipes/",
        Some(&author_token),
        Some(&payload),
    )
    .await;
    let recipe_id = body["id"].as_i64().unwrap();

    let update = serde_json::json!({ "name": "Stolen pancakes" });
    let (status, _) = send(
        &app,
        "PATCH",
        &format!("/api/recipes/{recipe_id}/"),
        Some(&other_token),
        Some(&update),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/api/recipes/{recipe_id}/"),
        Some(&other_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_favorite_toggle_contract() {
    let (app, state) = spawn_app().await;
    let catalog = seed_catalog(&state).await;
    let (_, token) = register_and_login(&app, "anna@example.com", "anna").await;

    let payload = recipe_payload("Pancakes", &[catalog.breakfast], &[(catalog.flour, 200)]);
    let (_, body) = send(&app, "POST", "/api/recipes/", Some(&token), Some(&payload)).await;
    let recipe_id = body["id"].as_i64().unwrap();
    let favorite_uri = format!("/api/recipes/{recipe_id}/favorite/");

    // Un-favoriting a recipe that was never favorited is a 400, not a 500
    let (status, _) = send(&app, "DELETE", &favorite_uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(&app, "POST", &favorite_uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["id"].as_i64().unwrap(), recipe_id);
    assert_eq!(body["name"], "Pancakes");

    // Second POST is a 400, and the recipe stays favorited exactly once
    let (status, _) = send(&app, "POST", &favorite_uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, body) = send(
        &app,
        "GET",
        "/api/recipes/?is_favorited=1",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(body["count"], 1);

    let (status, _) = send(&app, "DELETE", &favorite_uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, "DELETE", &favorite_uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_shopping_cart_download_sums_amounts() {
    let (app, state) = spawn_app().await;
    let catalog = seed_catalog(&state).await;
    let (_, token) = register_and_login(&app, "anna@example.com", "anna").await;

    let first = recipe_payload(
        "Pancakes",
        &[catalog.breakfast],
        &[(catalog.sugar, 200), (catalog.flour, 100)],
    );
    let (_, body) = send(&app, "POST", "/api/recipes/", Some(&token), Some(&first)).await;
    let first_id = body["id"].as_i64().unwrap();

    let second = recipe_payload("Jam", &[catalog.dinner], &[(catalog.sugar, 100)]);
    let (_, body) = send(&app, "POST", "/api/recipes/", Some(&token), Some(&second)).await;
    let second_id = body["id"].as_i64().unwrap();

    for id in [first_id, second_id] {
        let (status, _) = send(
            &app,
            "POST",
            &format!("/api/recipes/{id}/shopping_cart/"),
            Some(&token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let response = app
        .clone()
        .oneshot(request(
            "GET",
            "/api/recipes/download_shopping_cart/",
            Some(&token),
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response
        .headers()
        .get("content-type")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(content_type.starts_with("text/plain"));
    let disposition = response
        .headers()
        .get("content-disposition")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(disposition.starts_with("attachment"));

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let text = String::from_utf8(bytes.to_vec()).unwrap();

    assert!(text.contains("sugar - g - 300"), "{text}");
    assert!(text.contains("flour - g - 100"), "{text}");
}

#[tokio::test]
async fn test_subscribe_contract() {
    let (app, _state) = spawn_app().await;
    let (anna_id, anna_token) = register_and_login(&app, "anna@example.com", "anna").await;
    let (boris_id, boris_token) = register_and_login(&app, "boris@example.com", "boris").await;

    // Self-follow is rejected
    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/users/{anna_id}/subscribe/"),
        Some(&anna_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let subscribe_uri = format!("/api/users/{boris_id}/subscribe/");
    let (status, body) = send(&app, "POST", &subscribe_uri, Some(&anna_token), None).await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["username"], "boris");
    assert_eq!(body["is_subscribed"], true);
    assert_eq!(body["recipes_count"], 0);

    // Duplicate follow is rejected
    let (status, _) = send(&app, "POST", &subscribe_uri, Some(&anna_token), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Appears in the follower's subscription list, not the author's
    let (status, body) = send(
        &app,
        "GET",
        "/api/users/subscriptions/",
        Some(&anna_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);
    assert_eq!(body["results"][0]["username"], "boris");

    let (_, body) = send(
        &app,
        "GET",
        "/api/users/subscriptions/",
        Some(&boris_token),
        None,
    )
    .await;
    assert_eq!(body["count"], 0);

    // The profile reflects the follow state for the requester
    let (_, body) = send(
        &app,
        "GET",
        &format!("/api/users/{boris_id}/"),
        Some(&anna_token),
        None,
    )
    .await;
    assert_eq!(body["is_subscribed"], true);

    let (status, _) = send(&app, "DELETE", &subscribe_uri, Some(&anna_token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    // Unfollowing a relation that no longer exists is a 400
    let (status, _) = send(&app, "DELETE", &subscribe_uri, Some(&anna_token), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_subscriptions_recipes_limit() {
    let (app, state) = spawn_app().await;
    let catalog = seed_catalog(&state).await;
    let (_, anna_token) = register_and_login(&app, "anna@example.com", "anna").await;
    let (boris_id, boris_token) = register_and_login(&app, "boris@example.com", "boris").await;

    for name in ["Soup", "Stew", "Salad"] {
        let payload = recipe_payload(name, &[catalog.dinner], &[(catalog.flour, 10)]);
        let (status, _) = send(
            &app,
            "POST",
            "/api/recipes/",
            Some(&boris_token),
            Some(&payload),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/users/{boris_id}/subscribe/"),
        Some(&anna_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, body) = send(
        &app,
        "GET",
        "/api/users/subscriptions/?recipes_limit=2",
        Some(&anna_token),
        None,
    )
    .await;
    let entry = &body["results"][0];
    assert_eq!(entry["recipes"].as_array().unwrap().len(), 2);
    assert_eq!(entry["recipes_count"], 3);
}

#[tokio::test]
async fn test_ingredient_prefix_search_order() {
    let (app, state) = spawn_app().await;

    for (name, unit) in [("buttermilk", "ml"), ("millet", "g"), ("milk", "ml")] {
        state.store().create_ingredient(name, unit).await.unwrap();
    }

    let (status, body) = send(&app, "GET", "/api/ingredients/?name=mil", None, None).await;
    assert_eq!(status, StatusCode::OK);

    let names: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|i| i["name"].as_str().unwrap())
        .collect();

    // Prefix matches come before containing matches
    assert_eq!(names, vec!["milk", "millet", "buttermilk"]);
}

#[tokio::test]
async fn test_recipe_list_filters() {
    let (app, state) = spawn_app().await;
    let catalog = seed_catalog(&state).await;
    let (anna_id, anna_token) = register_and_login(&app, "anna@example.com", "anna").await;
    let (_, boris_token) = register_and_login(&app, "boris@example.com", "boris").await;

    let pancakes = recipe_payload("Pancakes", &[catalog.breakfast], &[(catalog.flour, 200)]);
    let (_, body) = send(
        &app,
        "POST",
        "/api/recipes/",
        Some(&anna_token),
        Some(&pancakes),
    )
    .await;
    let pancakes_id = body["id"].as_i64().unwrap();

    let stew = recipe_payload("Stew", &[catalog.dinner], &[(catalog.flour, 50)]);
    let (_, body) = send(
        &app,
        "POST",
        "/api/recipes/",
        Some(&boris_token),
        Some(&stew),
    )
    .await;
    let stew_id = body["id"].as_i64().unwrap();

    // By tag slug
    let (_, body) = send(&app, "GET", "/api/recipes/?tags=breakfast", None, None).await;
    assert_eq!(body["count"], 1);
    assert_eq!(body["results"][0]["id"].as_i64().unwrap(), pancakes_id);

    // Repeated tags params are OR-ed
    let (_, body) = send(
        &app,
        "GET",
        "/api/recipes/?tags=breakfast&tags=dinner",
        None,
        None,
    )
    .await;
    assert_eq!(body["count"], 2);

    // By author
    let (_, body) = send(
        &app,
        "GET",
        &format!("/api/recipes/?author={anna_id}"),
        None,
        None,
    )
    .await;
    assert_eq!(body["count"], 1);
    assert_eq!(body["results"][0]["id"].as_i64().unwrap(), pancakes_id);

    // is_favorited only filters for the requester holding the token
    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/recipes/{stew_id}/favorite/"),
        Some(&anna_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, body) = send(
        &app,
        "GET",
        "/api/recipes/?is_favorited=1",
        Some(&anna_token),
        None,
    )
    .await;
    assert_eq!(body["count"], 1);
    assert_eq!(body["results"][0]["id"].as_i64().unwrap(), stew_id);
    assert_eq!(body["results"][0]["is_favorited"], true);

    // Anonymous requests ignore the favorite filter
    let (_, body) = send(&app, "GET", "/api/recipes/?is_favorited=1", None, None).await;
    assert_eq!(body["count"], 2);
}

#[tokio::test]
async fn test_recipe_pagination() {
    let (app, state) = spawn_app().await;
    let catalog = seed_catalog(&state).await;
    let (_, token) = register_and_login(&app, "anna@example.com", "anna").await;

    for i in 0..3 {
        let payload = recipe_payload(
            &format!("Recipe {i}"),
            &[catalog.dinner],
            &[(catalog.flour, 10)],
        );
        let (status, _) = send(&app, "POST", "/api/recipes/", Some(&token), Some(&payload)).await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (_, body) = send(&app, "GET", "/api/recipes/?limit=2&page=1", None, None).await;
    assert_eq!(body["count"], 3);
    assert_eq!(body["results"].as_array().unwrap().len(), 2);
    assert!(body["next"].is_string());
    assert!(body["previous"].is_null());

    let (_, body) = send(&app, "GET", "/api/recipes/?limit=2&page=2", None, None).await;
    assert_eq!(body["results"].as_array().unwrap().len(), 1);
    assert!(body["next"].is_null());
    assert!(body["previous"].is_string());
}

#[tokio::test]
async fn test_tag_endpoints() {
    let (app, state) = spawn_app().await;
    let catalog = seed_catalog(&state).await;

    let (status, body) = send(&app, "GET", "/api/tags/", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 2);

    let (status, body) = send(
        &app,
        "GET",
        &format!("/api/tags/{}/", catalog.breakfast),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["slug"], "breakfast");
    assert_eq!(body["color"], "#E26C2D");

    let (status, _) = send(&app, "GET", "/api/tags/999/", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_set_password() {
    let (app, _state) = spawn_app().await;
    let (_, token) = register_and_login(&app, "anna@example.com", "anna").await;

    let wrong = serde_json::json!({
        "new_password": "another-password-1",
        "current_password": "not-my-password",
    });
    let (status, _) = send(
        &app,
        "POST",
        "/api/users/set_password/",
        Some(&token),
        Some(&wrong),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let change = serde_json::json!({
        "new_password": "another-password-1",
        "current_password": PASSWORD,
    });
    let (status, _) = send(
        &app,
        "POST",
        "/api/users/set_password/",
        Some(&token),
        Some(&change),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    // Old password no longer logs in, the new one does
    let old_login = serde_json::json!({ "email": "anna@example.com", "password": PASSWORD });
    let (status, _) = send(&app, "POST", "/api/auth/token/login/", None, Some(&old_login)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let new_login = serde_json::json!({
        "email": "anna@example.com",
        "password": "another-password-1",
    });
    let (status, _) = send(&app, "POST", "/api/auth/token/login/", None, Some(&new_login)).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_logout_revokes_token() {
    let (app, _state) = spawn_app().await;
    let (_, token) = register_and_login(&app, "anna@example.com", "anna").await;

    let (status, _) = send(&app, "POST", "/api/auth/token/logout/", Some(&token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, "GET", "/api/users/me/", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
