use axum::{
  Extension, Json,
  extract::{Path, State},
};
use json::{Value, json};

use super::dto::*;
use crate::{
  prelude::*,
  state::AppState,
  sv::{
    self, Identity,
    order::{Payload, Submitted},
  },
  utils::parse_id,
};

type App = State<Arc<AppState>>;

pub async fn health() -> Json<Value> {
  Json(json!({ "ok": true }))
}

pub async fn register(
  State(app): App,
  Body(req): Body<RegisterReq>,
) -> Result<Json<Value>> {
  let user = sv::User::new(&app.db)
    .register(&req.email, &req.name, &req.password)
    .await?;
  let identity = Identity::from(&user);
  let token = app.auth.issue(&identity)?;

  info!("User #{} registered", user.id);
  Ok(Json(json!({ "ok": true, "token": token, "user": identity })))
}

pub async fn login(
  State(app): App,
  Body(req): Body<LoginReq>,
) -> Result<Json<Value>> {
  let user = sv::User::new(&app.db).login(&req.email, &req.password).await?;
  let identity = Identity::from(&user);
  let token = app.auth.issue(&identity)?;

  Ok(Json(json!({ "ok": true, "token": token, "user": identity })))
}

pub async fn me(Extension(identity): Extension<Identity>) -> Json<Value> {
  Json(json!({ "ok": true, "user": identity }))
}

pub async fn products(State(app): App) -> Result<Json<Value>> {
  let products: Vec<ProductView> = sv::Product::new(&app.db)
    .list()
    .await?
    .into_iter()
    .map(Into::into)
    .collect();

  Ok(Json(json!({ "ok": true, "products": products })))
}

pub async fn product(
  State(app): App,
  Path(id): Path<String>,
) -> Result<Json<Value>> {
  let id = parse_id(&id, "product")?;
  let product = ProductView::from(sv::Product::new(&app.db).by_id(id).await?);

  Ok(Json(json!({ "ok": true, "product": product })))
}

pub async fn reviews(
  State(app): App,
  Path(id): Path<String>,
) -> Result<Json<Value>> {
  let id = parse_id(&id, "product")?;
  let reviews: Vec<ReviewView> = sv::Feedback::new(&app.db)
    .by_product(id)
    .await?
    .into_iter()
    .map(Into::into)
    .collect();

  Ok(Json(json!({ "ok": true, "reviews": reviews })))
}

pub async fn add_review(
  State(app): App,
  Extension(identity): Extension<Identity>,
  Path(id): Path<String>,
  Body(req): Body<ReviewReq>,
) -> Result<Json<Value>> {
  let id = parse_id(&id, "product")?;
  let submission = sv::Feedback::new(&app.db)
    .submit(&identity, id, req.rating, req.text.as_deref())
    .await?;

  Ok(Json(json!({
    "ok": true,
    "review": ReviewView::from(submission.review),
    "avgRating": submission.aggregate.avg_rating,
    "reviewCount": submission.aggregate.review_count,
  })))
}

pub async fn submit_order(
  State(app): App,
  Body(payload): Body<Payload>,
) -> Result<Json<Value>> {
  let submitted =
    sv::Order::new(&app.db).submit(&payload, &app.fallback).await?;

  Ok(Json(match submitted {
    Submitted::Stored { order_id } => {
      json!({ "success": true, "orderId": order_id })
    }
    Submitted::Fallback { fallback_id } => {
      json!({ "success": true, "fallbackId": fallback_id })
    }
  }))
}

pub async fn create_product(
  State(app): App,
  Body(req): Body<ProductReq>,
) -> Result<Json<Value>> {
  let product = sv::Product::new(&app.db).create(req.try_into()?).await?;
  Ok(Json(json!({ "ok": true, "product": ProductView::from(product) })))
}

pub async fn update_product(
  State(app): App,
  Path(id): Path<String>,
  Body(req): Body<ProductReq>,
) -> Result<Json<Value>> {
  let id = parse_id(&id, "product")?;
  let product = sv::Product::new(&app.db).update(id, req.try_into()?).await?;
  Ok(Json(json!({ "ok": true, "product": ProductView::from(product) })))
}

pub async fn delete_product(
  State(app): App,
  Path(id): Path<String>,
) -> Result<Json<Value>> {
  let id = parse_id(&id, "product")?;
  sv::Product::new(&app.db).delete(id).await?;
  Ok(Json(json!({ "ok": true })))
}

pub async fn orders(State(app): App) -> Result<Json<Value>> {
  let orders: Vec<OrderView> = sv::Order::new(&app.db)
    .list()
    .await?
    .into_iter()
    .map(Into::into)
    .collect();

  Ok(Json(json!({ "ok": true, "orders": orders })))
}

pub async fn order(
  State(app): App,
  Path(id): Path<String>,
) -> Result<Json<Value>> {
  let id = parse_id(&id, "order")?;
  let (order, items) = sv::Order::new(&app.db).by_id(id).await?;
  let items: Vec<OrderItemView> = items.into_iter().map(Into::into).collect();

  Ok(Json(json!({
    "ok": true,
    "order": OrderView::from(order),
    "items": items,
  })))
}

pub async fn set_order_status(
  State(app): App,
  Path(id): Path<String>,
  Body(req): Body<StatusReq>,
) -> Result<Json<Value>> {
  let id = parse_id(&id, "order")?;
  let order = sv::Order::new(&app.db).set_status(id, &req.status).await?;
  Ok(Json(json!({ "ok": true, "order": OrderView::from(order) })))
}

pub async fn delete_order(
  State(app): App,
  Path(id): Path<String>,
) -> Result<Json<Value>> {
  let id = parse_id(&id, "order")?;
  sv::Order::new(&app.db).delete(id).await?;
  Ok(Json(json!({ "ok": true })))
}

pub async fn feedbacks(State(app): App) -> Result<Json<Value>> {
  let feedbacks: Vec<ReviewView> = sv::Feedback::new(&app.db)
    .all()
    .await?
    .into_iter()
    .map(Into::into)
    .collect();

  Ok(Json(json!({ "ok": true, "feedbacks": feedbacks })))
}

pub async fn reply_feedback(
  State(app): App,
  Extension(identity): Extension<Identity>,
  Path(id): Path<String>,
  Body(req): Body<ReplyReq>,
) -> Result<Json<Value>> {
  let id = parse_id(&id, "feedback")?;
  let reply =
    sv::Feedback::new(&app.db).reply(id, &req.reply, &identity).await?;

  Ok(Json(json!({ "ok": true, "reply": reply })))
}
