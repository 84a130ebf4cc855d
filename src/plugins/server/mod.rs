pub mod auth;
mod dto;
mod handlers;

use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use async_trait::async_trait;
use axum::{
  Router,
  middleware::from_fn_with_state,
  routing::{get, post, put},
};
use tower::ServiceBuilder;
use tower_governor::{GovernorLayer, governor::GovernorConfigBuilder};
use tower_http::{
  cors::{Any, CorsLayer},
  trace::TraceLayer,
};

use self::auth::{ADMIN, ANY_ROLE, Gate};
use crate::{prelude::*, state::AppState};

pub struct Plugin;

#[async_trait]
impl super::Plugin for Plugin {
  async fn start(&self, app: Arc<AppState>) -> anyhow::Result<()> {
    let governor_conf = Arc::new(
      GovernorConfigBuilder::default()
        .per_second(2)
        .burst_size(100)
        .finish()
        .context("Failed to build rate limiter config")?,
    );

    let governor_limiter = governor_conf.limiter().clone();

    tokio::spawn(async move {
      loop {
        tokio::time::sleep(Duration::from_secs(60)).await;
        governor_limiter.retain_recent();
      }
    });

    let addr = SocketAddr::from(([0, 0, 0, 0], app.config.port));

    let router = router(app)
      .layer(GovernorLayer::new(governor_conf))
      .into_make_service_with_connect_info::<SocketAddr>();

    let listener = tokio::net::TcpListener::bind(addr)
      .await
      .with_context(|| format!("Failed to bind {addr}"))?;

    tracing::info!("HTTP Server listening on {addr}");

    tokio::spawn(async move {
      if let Err(err) = axum::serve(listener, router).await {
        error!("HTTP server stopped: {err}");
      }
    });

    Ok(())
  }
}

/// All routes, without rate limiting (it needs the peer address).
pub fn router(app: Arc<AppState>) -> Router {
  let require_user =
    from_fn_with_state(Gate::new(app.clone(), ANY_ROLE), auth::gate);
  let require_admin =
    from_fn_with_state(Gate::new(app.clone(), ADMIN), auth::gate);

  let admin = Router::new()
    .route("/products", post(handlers::create_product))
    .route(
      "/products/{id}",
      put(handlers::update_product).delete(handlers::delete_product),
    )
    .route("/orders", get(handlers::orders))
    .route("/orders/{id}", get(handlers::order).delete(handlers::delete_order))
    .route("/orders/{id}/status", put(handlers::set_order_status))
    .route("/feedbacks", get(handlers::feedbacks))
    .route("/feedbacks/{id}/reply", post(handlers::reply_feedback))
    .route_layer(require_admin);

  Router::new()
    .route("/health", get(handlers::health))
    .route("/api/auth/register", post(handlers::register))
    .route("/api/auth/login", post(handlers::login))
    .route(
      "/api/auth/me",
      get(handlers::me).route_layer(require_user.clone()),
    )
    .route("/api/products", get(handlers::products))
    .route("/api/products/{id}", get(handlers::product))
    .route(
      "/api/products/{id}/reviews",
      get(handlers::reviews)
        .merge(post(handlers::add_review).route_layer(require_user)),
    )
    .route("/api/orders", post(handlers::submit_order))
    .nest("/api/admin", admin)
    .layer(
      ServiceBuilder::new().layer(TraceLayer::new_for_http()).layer(
        CorsLayer::new()
          .allow_origin(Any)
          .allow_methods(Any)
          .allow_headers(Any),
      ),
    )
    .with_state(app)
}

#[cfg(test)]
mod tests {
  use axum::{
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
  };
  use json::{Value, json};
  use tower::ServiceExt;

  use super::*;
  use crate::{
    config::Config,
    entity::{order, product, user::UserRole},
    sv::{self, Identity, test_utils::test_db},
  };

  struct Harness {
    app: Arc<AppState>,
    _dir: tempfile::TempDir,
  }

  impl Harness {
    async fn new() -> Self {
      Self::with_db(test_db::setup().await)
    }

    /// Database without any tables, so every write fails.
    async fn broken() -> Self {
      Self::with_db(Database::connect("sqlite::memory:").await.unwrap())
    }

    fn with_db(db: DatabaseConnection) -> Self {
      let dir = tempfile::tempdir().unwrap();
      let config = Config {
        db_url: "sqlite::memory:".into(),
        port: 0,
        jwt_secret: "test-secret".into(),
        token_ttl: Duration::from_secs(3600),
        fallback_file: dir.path().join("orders.json"),
        admin: None,
      };
      Self { app: Arc::new(AppState::with_db(db, config)), _dir: dir }
    }

    async fn token(&self, email: &str, role: UserRole) -> String {
      let users = sv::User::new(&self.app.db);
      let mut user = users.register(email, "Tester", "secret1").await.unwrap();
      if role == UserRole::Admin {
        user = users.set_role(user.id, UserRole::Admin).await.unwrap();
      }
      self.app.auth.issue(&Identity::from(&user)).unwrap()
    }

    async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
      self.send("GET", uri, token, None).await
    }

    async fn delete(
      &self,
      uri: &str,
      token: Option<&str>,
    ) -> (StatusCode, Value) {
      self.send("DELETE", uri, token, None).await
    }

    async fn post(
      &self,
      uri: &str,
      token: Option<&str>,
      body: Value,
    ) -> (StatusCode, Value) {
      self.send("POST", uri, token, Some(body)).await
    }

    async fn put(
      &self,
      uri: &str,
      token: Option<&str>,
      body: Value,
    ) -> (StatusCode, Value) {
      self.send("PUT", uri, token, Some(body)).await
    }

    async fn send(
      &self,
      method: &str,
      uri: &str,
      token: Option<&str>,
      body: Option<Value>,
    ) -> (StatusCode, Value) {
      let mut request = Request::builder().method(method).uri(uri);
      if let Some(token) = token {
        request =
          request.header(header::AUTHORIZATION, format!("Bearer {token}"));
      }
      let body = match body {
        Some(body) => {
          request = request.header(header::CONTENT_TYPE, "application/json");
          Body::from(body.to_string())
        }
        None => Body::empty(),
      };

      let response = router(self.app.clone())
        .oneshot(request.body(body).unwrap())
        .await
        .unwrap();

      let status = response.status();
      let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
      let value = json::from_slice(&bytes).unwrap_or(Value::Null);
      (status, value)
    }
  }

  async fn insert_product(db: &DatabaseConnection, id: i32) {
    product::ActiveModel {
      id: Set(id),
      name: Set(format!("Product {id}")),
      description: Set(None),
      price: Set(10_000),
      original_price: Set(None),
      discount_percent: Set(0),
      rating: Set(0.0),
      reviews: Set(0),
      image: Set(Some(format!("{id}.png"))),
      created_at: Set(Utc::now().naive_utc()),
    }
    .insert(db)
    .await
    .unwrap();
  }

  #[tokio::test]
  async fn test_order_total_from_discount() {
    let h = Harness::new().await;
    insert_product(&h.app.db, 1).await;

    let checkout = json!({
      "name": "Test",
      "items": [{ "id": 1, "price": 100, "qty": 2 }],
      "discount": 10
    });
    let (status, body) = h.post("/api/orders", None, checkout).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    let order_id = body["orderId"].as_i64().unwrap() as i32;

    let order = order::Entity::find_by_id(order_id).one(&h.app.db).await;
    assert_eq!(order.unwrap().unwrap().total, 19_000);

    let admin = h.token("root@shop.test", UserRole::Admin).await;
    let uri = format!("/api/admin/orders/{order_id}");
    let (status, body) = h.get(&uri, Some(&admin)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["order"]["total"], 190.0);
    assert_eq!(body["items"][0]["name"], "Product 1");
  }

  #[tokio::test]
  async fn test_order_fallback_when_database_down() {
    let h = Harness::broken().await;

    let checkout = json!({
      "customerName": "Test",
      "items": [{ "id": 1, "price": 100, "qty": 2 }]
    });
    let (status, body) = h.post("/api/orders", None, checkout).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert!(body.get("orderId").is_none());

    let records = h.app.fallback.all().await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(body["fallbackId"], records[0].id);
  }

  #[tokio::test]
  async fn test_empty_order_accepted() {
    let h = Harness::new().await;
    let checkout = json!({ "name": "Test", "items": [] });
    let (status, body) = h.post("/api/orders", None, checkout).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert!(body["orderId"].is_number());
  }

  #[tokio::test]
  async fn test_malformed_bodies_use_error_envelope() {
    let h = Harness::new().await;
    insert_product(&h.app.db, 5).await;
    let token = h.token("a@shop.test", UserRole::User).await;

    let mistyped = json!({ "items": [{ "id": 1, "price": 1, "qty": 2.5 }] });
    let (status, body) = h.post("/api/orders", None, mistyped).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["ok"], false);
    assert!(body["error"].is_string());

    let (status, body) = h
      .post("/api/products/5/reviews", Some(&token), json!({ "rating": "4" }))
      .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["ok"], false);

    let (status, body) =
      h.post("/api/orders", None, json!(["not", "an", "order"])).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);

    let request = Request::builder()
      .method("POST")
      .uri("/api/orders")
      .header(header::CONTENT_TYPE, "application/json")
      .body(Body::from("{\"items\": ["))
      .unwrap();
    let response = router(h.app.clone()).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = json::from_slice(&bytes).unwrap();
    assert_eq!(body["success"], false);
  }

  #[tokio::test]
  async fn test_first_review_aggregate() {
    let h = Harness::new().await;
    insert_product(&h.app.db, 5).await;
    let token = h.token("a@shop.test", UserRole::User).await;

    let (status, body) = h
      .post("/api/products/5/reviews", Some(&token), json!({ "rating": 4 }))
      .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], true);
    assert_eq!(body["avgRating"], 4.0);
    assert_eq!(body["reviewCount"], 1);
    assert_eq!(body["review"]["rating"], 4);

    let (_, body) = h.get("/api/products/5", None).await;
    assert_eq!(body["product"]["rating"], 4.0);
    assert_eq!(body["product"]["reviews"], 1);

    let (_, body) = h.get("/api/products/5/reviews", None).await;
    assert_eq!(body["reviews"].as_array().unwrap().len(), 1);
  }

  #[tokio::test]
  async fn test_review_requires_token() {
    let h = Harness::new().await;
    insert_product(&h.app.db, 5).await;
    let uri = "/api/products/5/reviews";

    let (status, body) = h.post(uri, None, json!({ "rating": 4 })).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "No token provided");

    let (status, body) =
      h.post(uri, Some("not-a-token"), json!({ "rating": 4 })).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid or expired token");
  }

  #[tokio::test]
  async fn test_review_validation() {
    let h = Harness::new().await;
    insert_product(&h.app.db, 5).await;
    let token = Some(h.token("a@shop.test", UserRole::User).await);
    let token = token.as_deref();

    let (status, _) = h
      .post("/api/products/abc/reviews", token, json!({ "rating": 4 }))
      .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) =
      h.post("/api/products/5/reviews", token, json!({ "text": "hi" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) =
      h.post("/api/products/6/reviews", token, json!({ "rating": 4 })).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn test_reply_roles() {
    let h = Harness::new().await;
    insert_product(&h.app.db, 5).await;
    let user = h.token("a@shop.test", UserRole::User).await;
    let admin = h.token("root@shop.test", UserRole::Admin).await;

    let (_, body) = h
      .post("/api/products/5/reviews", Some(&user), json!({ "rating": 2 }))
      .await;
    let review_id = body["review"]["id"].as_i64().unwrap();
    let uri = format!("/api/admin/feedbacks/{review_id}/reply");
    let reply = json!({ "reply": "Thanks for the feedback" });

    let (status, _) = h.post(&uri, None, reply.clone()).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = h.post(&uri, Some(&user), reply.clone()).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = h.post(&uri, Some(&admin), reply).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["reply"]["text"], "Thanks for the feedback");
    assert_eq!(body["reply"]["by"], "Tester");

    let (status, _) =
      h.post(&uri, Some(&admin), json!({ "reply": "   " })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let bad_id = "/api/admin/feedbacks/x/reply";
    let (status, _) =
      h.post(bad_id, Some(&admin), json!({ "reply": "ok" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
  }

  #[tokio::test]
  async fn test_admin_role_is_case_insensitive() {
    let h = Harness::new().await;
    let root = Identity { id: 1, role: "ADMIN".into(), name: "Root".into() };
    let token = h.app.auth.issue(&root).unwrap();

    let (status, body) = h.get("/api/admin/feedbacks", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["feedbacks"], json!([]));
  }

  #[tokio::test]
  async fn test_register_login_me() {
    let h = Harness::new().await;

    let account = json!({
      "email": "new@shop.test",
      "name": "New",
      "password": "secret1"
    });
    let (status, body) = h.post("/api/auth/register", None, account).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["role"], "user");

    let wrong = json!({ "email": "new@shop.test", "password": "wrong" });
    let (status, _) = h.post("/api/auth/login", None, wrong).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let right = json!({ "email": "new@shop.test", "password": "secret1" });
    let (status, body) = h.post("/api/auth/login", None, right).await;
    assert_eq!(status, StatusCode::OK);
    let token = body["token"].as_str().unwrap().to_string();

    let (status, body) = h.get("/api/auth/me", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["name"], "New");
  }

  #[tokio::test]
  async fn test_admin_product_crud() {
    let h = Harness::new().await;
    let admin = h.token("root@shop.test", UserRole::Admin).await;
    let user = h.token("a@shop.test", UserRole::User).await;
    let mug = json!({ "name": "Mug", "price": 12.5, "image": "mug.png" });

    let (status, _) =
      h.post("/api/admin/products", Some(&user), mug.clone()).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = h.post("/api/admin/products", Some(&admin), mug).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["product"]["price"], 12.5);
    let uri = format!("/api/admin/products/{}", body["product"]["id"]);

    let patch = json!({ "originalPrice": 15, "discountPercent": 17 });
    let (status, body) = h.put(&uri, Some(&admin), patch).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["product"]["originalPrice"], 15.0);
    assert_eq!(body["product"]["name"], "Mug");
    let id = body["product"]["id"].as_i64().unwrap();

    let (status, _) = h.delete(&uri, Some(&admin)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = h.get(&format!("/api/products/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let huge = json!({ "name": "Yacht", "price": 1e300 });
    let (status, _) = h.post("/api/admin/products", Some(&admin), huge).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
  }

  #[tokio::test]
  async fn test_admin_order_status() {
    let h = Harness::new().await;
    let admin = h.token("root@shop.test", UserRole::Admin).await;

    let checkout =
      json!({ "name": "Test", "items": [{ "id": 1, "price": 3, "qty": 1 }] });
    let (_, body) = h.post("/api/orders", None, checkout).await;
    let uri = format!("/api/admin/orders/{}", body["orderId"]);

    let delivered = json!({ "status": "Delivered" });
    let (status, body) =
      h.put(&format!("{uri}/status"), Some(&admin), delivered).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["order"]["status"], "Delivered");

    let (_, body) = h.get("/api/admin/orders", Some(&admin)).await;
    assert_eq!(body["orders"].as_array().unwrap().len(), 1);

    let (status, _) = h.delete(&uri, Some(&admin)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = h.get(&uri, Some(&admin)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
  }
}
