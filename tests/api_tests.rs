use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode},
};
use chrono::Datelike;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use std::path::PathBuf;
use std::sync::Arc;
use tower::ServiceExt;
use yamdb::api::AppState;
use yamdb::api::auth::AuthenticatedUser;
use yamdb::config::Config;
use yamdb::db::DEFAULT_API_KEY;

struct TestApp {
    router: Router,
    state: Arc<AppState>,
    db_path: PathBuf,
}

impl Drop for TestApp {
    fn drop(&mut self) {
        std::fs::remove_file(&self.db_path).ok();
    }
}

async fn spawn_app() -> TestApp {
    let db_path = std::env::temp_dir().join(format!("yamdb-api-{}.db", uuid::Uuid::new_v4()));

    let mut config = Config::default();
    config.general.database_path = format!("sqlite:{}", db_path.display());

    let state = yamdb::api::create_app_state_from_config(config, None)
        .await
        .expect("Failed to create app state");
    let router = yamdb::api::router(state.clone()).await;

    TestApp {
        router,
        state,
        db_path,
    }
}

impl TestApp {
    async fn send(
        &self,
        method: Method,
        uri: &str,
        key: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(key) = key {
            builder = builder.header("X-Api-Key", key);
        }

        let request = match body {
            Some(body) => builder
                .header("Content-Type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, json)
    }

    async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Method::GET, uri, Some(DEFAULT_API_KEY), None).await
    }

    async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::POST, uri, Some(DEFAULT_API_KEY), Some(body))
            .await
    }

    async fn patch(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::PATCH, uri, Some(DEFAULT_API_KEY), Some(body))
            .await
    }

    async fn delete(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Method::DELETE, uri, Some(DEFAULT_API_KEY), None).await
    }

    /// Creates another user and returns its API key.
    async fn user_key(&self, username: &str) -> String {
        self.state
            .store()
            .create_user(username)
            .await
            .unwrap()
            .api_key
    }

    async fn create_title(&self, body: Value) -> i64 {
        let (status, json) = self.post("/api/titles", body).await;
        assert_eq!(status, StatusCode::CREATED, "{json}");
        json["data"]["id"].as_i64().unwrap()
    }
}

fn field_names(body: &Value) -> Vec<String> {
    body["fields"]
        .as_array()
        .map(|fields| {
            fields
                .iter()
                .filter_map(|f| f["field"].as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

#[tokio::test]
async fn test_auth_endpoints() {
    let app = spawn_app().await;

    let (status, _) = app.send(Method::GET, "/api/titles", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .send(Method::GET, "/api/titles", Some("wrong-key"), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = app.get("/api/titles").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let request = Request::builder()
        .uri("/api/titles")
        .header("Authorization", format!("Bearer {DEFAULT_API_KEY}"))
        .body(Body::empty())
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_health_does_not_need_a_key() {
    let app = spawn_app().await;

    let (status, body) = app.send(Method::GET, "/api/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["database"], "up");
}

#[tokio::test]
async fn test_categories_and_genres() {
    let app = spawn_app().await;

    let (status, body) = app
        .post("/api/categories", json!({"name": "Films", "slug": "films"}))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"], json!({"name": "Films", "slug": "films"}));

    app.post("/api/categories", json!({"name": "Books", "slug": "books"}))
        .await;

    let (_, body) = app.get("/api/categories").await;
    let slugs: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["slug"].as_str().unwrap())
        .collect();
    assert_eq!(slugs, vec!["books", "films"]);

    let (status, _) = app
        .post("/api/categories", json!({"name": "Movies", "slug": "films"}))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = app
        .post("/api/genres", json!({"name": "Sci Fi", "slug": "sci fi"}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(field_names(&body), vec!["slug"]);

    let (status, body) = app.post("/api/genres", json!({"slug": "drama"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(field_names(&body), vec!["name"]);

    let (status, _) = app
        .post("/api/genres", json!({"name": "Drama", "slug": "drama"}))
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = app.delete("/api/genres/drama").await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = app.delete("/api/genres/drama").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_title_shape_and_rating() {
    let app = spawn_app().await;
    let critic = app.user_key("critic").await;

    app.post("/api/categories", json!({"name": "Films", "slug": "films"}))
        .await;
    app.post("/api/genres", json!({"name": "Drama", "slug": "drama"}))
        .await;
    app.post("/api/genres", json!({"name": "Sci-Fi", "slug": "sci-fi"}))
        .await;

    let (_, genres) = app.get("/api/genres").await;
    assert_eq!(genres["data"].as_array().unwrap().len(), 2);

    let (status, body) = app
        .post(
            "/api/titles",
            json!({
                "name": "Stalker",
                "year": 1979,
                "description": "A guide leads two men through the Zone",
                "genre": [1, 2],
                "category": 1
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let title = &body["data"];
    let mut keys: Vec<&str> = title
        .as_object()
        .unwrap()
        .keys()
        .map(String::as_str)
        .collect();
    keys.sort_unstable();
    assert_eq!(
        keys,
        vec!["category", "description", "genre", "id", "name", "rating", "year"]
    );
    assert!(title["rating"].is_null());
    assert_eq!(title["genre"], json!([1, 2]));
    assert_eq!(title["category"], 1);
    let id = title["id"].as_i64().unwrap();

    let (status, _) = app
        .post(
            &format!("/api/titles/{id}/reviews"),
            json!({"text": "Good", "score": 8}),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = app
        .send(
            Method::POST,
            &format!("/api/titles/{id}/reviews"),
            Some(&critic),
            Some(json!({"text": "Masterpiece", "score": 10})),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, body) = app.get(&format!("/api/titles/{id}")).await;
    assert_eq!(body["data"]["rating"].as_f64(), Some(9.0));
    assert!(body["data"].get("reviews").is_none());

    let (_, body) = app.get("/api/titles").await;
    assert_eq!(body["data"][0]["rating"].as_f64(), Some(9.0));
}

#[tokio::test]
async fn test_title_validation() {
    let app = spawn_app().await;
    let this_year = chrono::Utc::now().year();

    let (status, body) = app
        .post("/api/titles", json!({"name": "Later", "year": this_year + 1}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(field_names(&body), vec!["year"]);
    assert!(
        body["fields"][0]["message"]
            .as_str()
            .unwrap()
            .contains(&(this_year + 1).to_string())
    );

    let (status, _) = app
        .post("/api/titles", json!({"name": "Now", "year": this_year}))
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = app.post("/api/titles", json!({"year": 1999})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(field_names(&body), vec!["name"]);

    let (status, body) = app
        .post("/api/titles", json!({"name": "x".repeat(201)}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(field_names(&body), vec!["name"]);

    let (status, _) = app
        .post("/api/titles", json!({"name": "Orphan", "genre": [42]}))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .post("/api/titles", json!({"name": "Orphan", "category": 7}))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app.get("/api/titles/999").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_title_partial_update() {
    let app = spawn_app().await;
    app.post("/api/genres", json!({"name": "Drama", "slug": "drama"}))
        .await;

    let id = app
        .create_title(json!({"name": "Solaris", "year": 1972, "description": "Ocean"}))
        .await;

    let (status, body) = app
        .patch(&format!("/api/titles/{id}"), json!({"genre": [1]}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "Solaris");
    assert_eq!(body["data"]["year"], 1972);
    assert_eq!(body["data"]["genre"], json!([1]));

    let (status, body) = app
        .patch(
            &format!("/api/titles/{id}"),
            json!({"year": null, "name": "Solaris (1972)"}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["year"].is_null());
    assert_eq!(body["data"]["description"], "Ocean");
    assert_eq!(body["data"]["genre"], json!([1]));

    let (status, body) = app
        .patch(&format!("/api/titles/{id}"), json!({"year": 9999}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(field_names(&body), vec!["year"]);
}

#[tokio::test]
async fn test_one_review_per_author() {
    let app = spawn_app().await;
    let critic = app.user_key("critic").await;
    let id = app.create_title(json!({"name": "Mirror"})).await;
    let uri = format!("/api/titles/{id}/reviews");

    let (status, body) = app.post(&uri, json!({"text": "Dreamlike"})).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["score"], 10);
    assert_eq!(body["data"]["author"], "admin");

    let (status, body) = app
        .post(&uri, json!({"text": "Changed my mind", "score": 3}))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["success"], false);

    let (status, body) = app
        .send(
            Method::POST,
            &uri,
            Some(&critic),
            Some(json!({"text": "Too slow", "score": 4})),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["author"], "critic");

    let (_, body) = app.get(&uri).await;
    let authors: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["author"].as_str().unwrap())
        .collect();
    assert_eq!(authors, vec!["critic", "admin"]);
}

#[tokio::test]
async fn test_review_score_bounds() {
    let app = spawn_app().await;
    let id = app.create_title(json!({"name": "Nostalghia"})).await;
    let uri = format!("/api/titles/{id}/reviews");

    for score in [0, 11, -1] {
        let (status, body) = app.post(&uri, json!({"text": "x", "score": score})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "score {score}");
        assert_eq!(field_names(&body), vec!["score"]);
    }

    let (status, body) = app.post(&uri, json!({"text": "x", "score": 0})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(
        body["fields"][0]["message"]
            .as_str()
            .unwrap()
            .contains("greater than or equal to 1")
    );

    let (status, body) = app.post(&uri, json!({"text": "x", "score": 1})).await;
    assert_eq!(status, StatusCode::CREATED);
    let review_id = body["data"]["id"].as_i64().unwrap();

    let review_uri = format!("{uri}/{review_id}");
    let (status, _) = app.patch(&review_uri, json!({"score": 11})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app.patch(&review_uri, json!({"score": 7})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["score"], 7);
    assert_eq!(body["data"]["text"], "x");
}

#[tokio::test]
async fn test_review_is_scoped_to_its_title() {
    let app = spawn_app().await;
    let first = app.create_title(json!({"name": "First"})).await;
    let second = app.create_title(json!({"name": "Second"})).await;

    let (_, body) = app
        .post(&format!("/api/titles/{first}/reviews"), json!({"text": "ok"}))
        .await;
    let review_id = body["data"]["id"].as_i64().unwrap();

    let (status, _) = app
        .get(&format!("/api/titles/{second}/reviews/{review_id}"))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .get(&format!("/api/titles/{first}/reviews/{review_id}"))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app.get("/api/titles/999/reviews").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_comments() {
    let app = spawn_app().await;
    let critic = app.user_key("critic").await;
    let id = app.create_title(json!({"name": "Andrei Rublev"})).await;

    let (_, body) = app
        .post(&format!("/api/titles/{id}/reviews"), json!({"text": "Epic"}))
        .await;
    let review_id = body["data"]["id"].as_i64().unwrap();
    let uri = format!("/api/titles/{id}/reviews/{review_id}/comments");

    let (status, body) = app.post(&uri, json!({"text": "Agreed"})).await;
    assert_eq!(status, StatusCode::CREATED);
    let mut keys: Vec<&str> = body["data"]
        .as_object()
        .unwrap()
        .keys()
        .map(String::as_str)
        .collect();
    keys.sort_unstable();
    assert_eq!(keys, vec!["author", "id", "pub_date", "text"]);
    let comment_id = body["data"]["id"].as_i64().unwrap();

    let (status, _) = app
        .send(
            Method::POST,
            &uri,
            Some(&critic),
            Some(json!({"text": "Disagree"})),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = app.post(&uri, json!({"text": ""})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(field_names(&body), vec!["text"]);

    let (_, body) = app.get(&uri).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 2);

    let (status, body) = app
        .patch(&format!("{uri}/{comment_id}"), json!({"text": "Edited"}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["text"], "Edited");

    let (status, _) = app.delete(&format!("{uri}/{comment_id}")).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = app.get(&format!("{uri}/{comment_id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_deleting_title_cascades() {
    let app = spawn_app().await;
    let id = app.create_title(json!({"name": "Ivan's Childhood"})).await;

    let (_, body) = app
        .post(&format!("/api/titles/{id}/reviews"), json!({"text": "Stark"}))
        .await;
    let review_id = body["data"]["id"].as_i64().unwrap();
    app.post(
        &format!("/api/titles/{id}/reviews/{review_id}/comments"),
        json!({"text": "Indeed"}),
    )
    .await;

    let (status, _) = app.delete(&format!("/api/titles/{id}")).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = app.get(&format!("/api/titles/{id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let store = app.state.store();
    let review_id = i32::try_from(review_id).unwrap();
    assert!(store.get_review(review_id).await.unwrap().is_none());
    assert!(store.list_comments(review_id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_deleting_category_clears_reference() {
    let app = spawn_app().await;
    app.post("/api/categories", json!({"name": "Films", "slug": "films"}))
        .await;
    let id = app
        .create_title(json!({"name": "The Sacrifice", "category": 1}))
        .await;

    let (status, _) = app.delete("/api/categories/films").await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = app.get(&format!("/api/titles/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["category"].is_null());
}

#[tokio::test]
async fn test_title_list_filters() {
    let app = spawn_app().await;
    app.post("/api/categories", json!({"name": "Films", "slug": "films"}))
        .await;
    app.post("/api/genres", json!({"name": "Drama", "slug": "drama"}))
        .await;

    app.create_title(json!({"name": "Zerkalo", "year": 1975, "genre": [1], "category": 1}))
        .await;
    app.create_title(json!({"name": "Solaris", "year": 1972}))
        .await;

    let (_, body) = app.get("/api/titles?genre=drama").await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"][0]["name"], "Zerkalo");

    let (_, body) = app.get("/api/titles?category=films").await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let (_, body) = app.get("/api/titles?year=1972").await;
    assert_eq!(body["data"][0]["name"], "Solaris");

    let (_, body) = app.get("/api/titles?genre=unknown").await;
    assert!(body["data"].as_array().unwrap().is_empty());

    let (_, body) = app.get("/api/titles?limit=1").await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"][0]["name"], "Solaris");

    let (status, _) = app.get("/api/titles?limit=0").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_blank_text_is_rejected() {
    let app = spawn_app().await;

    let (status, body) = app
        .post("/api/categories", json!({"name": "   ", "slug": "films"}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(field_names(&body), vec!["name"]);
    assert_eq!(body["fields"][0]["message"], "This field may not be blank");

    let (status, body) = app.post("/api/titles", json!({"name": " \t "})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(field_names(&body), vec!["name"]);

    let id = app.create_title(json!({"name": "Stalker"})).await;

    let (status, body) = app
        .patch(&format!("/api/titles/{id}"), json!({"name": "  "}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(field_names(&body), vec!["name"]);

    let reviews = format!("/api/titles/{id}/reviews");
    let (status, body) = app.post(&reviews, json!({"text": "   ", "score": 5})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(field_names(&body), vec!["text"]);

    let (_, body) = app.post(&reviews, json!({"text": "Zone", "score": 5})).await;
    let review_id = body["data"]["id"].as_i64().unwrap();

    let (status, body) = app
        .patch(&format!("{reviews}/{review_id}"), json!({"text": "\n"}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(field_names(&body), vec!["text"]);

    let (status, body) = app
        .post(&format!("{reviews}/{review_id}/comments"), json!({"text": "  "}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(field_names(&body), vec!["text"]);
}

#[tokio::test]
async fn test_malformed_bodies_use_the_envelope() {
    let app = spawn_app().await;
    let id = app.create_title(json!({"name": "Solaris"})).await;

    let (status, body) = app
        .post(
            &format!("/api/titles/{id}/reviews"),
            json!({"text": "x", "score": 3_000_000_000_i64}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().unwrap().contains("score"));

    let (status, body) = app
        .post("/api/titles", json!({"name": "Solaris", "year": 3_000_000_000_i64}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/genres")
        .header("X-Api-Key", DEFAULT_API_KEY)
        .header("Content-Type", "application/json")
        .body(Body::from("{\"name\": "))
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["success"], false);

    let (_, reviews) = app.get(&format!("/api/titles/{id}/reviews")).await;
    assert!(reviews["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_authenticated_user_reaches_request_span() {
    let app = spawn_app().await;
    let admin = app
        .state
        .store()
        .get_user_by_username("admin")
        .await
        .unwrap()
        .unwrap();

    let request = Request::builder()
        .uri("/api/titles")
        .header("X-Api-Key", DEFAULT_API_KEY)
        .body(Body::empty())
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.extensions().get::<AuthenticatedUser>(),
        Some(&AuthenticatedUser(admin.id))
    );

    let request = Request::builder()
        .uri("/api/health")
        .body(Body::empty())
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();
    assert!(response.extensions().get::<AuthenticatedUser>().is_none());
}
