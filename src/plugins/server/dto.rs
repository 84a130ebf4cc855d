//! Request bodies and JSON views. Amounts cross the wire as decimals and
//! live in cents everywhere else.

use axum::{Json, extract::FromRequest};
use serde::{Deserialize, Serialize};

use crate::{
  entity::{feedback, order, order_item, product},
  prelude::*,
  sv::product::ProductDraft,
  utils::{checked_cents, from_cents},
};

/// `Json` that reports bad bodies through [`Error`] like every other failure.
#[derive(FromRequest)]
#[from_request(via(Json), rejection(Error))]
pub struct Body<T>(pub T);

#[derive(Debug, Deserialize)]
pub struct RegisterReq {
  #[serde(default)]
  pub email: String,
  #[serde(default)]
  pub name: String,
  #[serde(default)]
  pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginReq {
  #[serde(default)]
  pub email: String,
  #[serde(default)]
  pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct ReviewReq {
  pub rating: Option<i32>,
  #[serde(alias = "comment")]
  pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ReplyReq {
  #[serde(default, alias = "text")]
  pub reply: String,
}

#[derive(Debug, Deserialize)]
pub struct StatusReq {
  #[serde(default)]
  pub status: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductReq {
  pub name: Option<String>,
  pub description: Option<String>,
  pub price: Option<f64>,
  pub original_price: Option<f64>,
  pub discount_percent: Option<i32>,
  pub image: Option<String>,
}

impl TryFrom<ProductReq> for ProductDraft {
  type Error = Error;

  fn try_from(req: ProductReq) -> Result<Self> {
    let cents = |amount: Option<f64>, what: &str| {
      amount
        .map(|amount| {
          checked_cents(amount).ok_or_else(|| {
            Error::InvalidArgs(format!("Invalid {what} `{amount}`"))
          })
        })
        .transpose()
    };

    Ok(Self {
      price: cents(req.price, "price")?,
      original_price: cents(req.original_price, "original price")?,
      name: req.name,
      description: req.description,
      discount_percent: req.discount_percent,
      image: req.image,
    })
  }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductView {
  pub id: i32,
  pub name: String,
  pub description: Option<String>,
  pub price: f64,
  pub original_price: Option<f64>,
  pub discount_percent: i32,
  pub rating: f64,
  pub reviews: i32,
  pub image: Option<String>,
  pub created_at: DateTime,
}

impl From<product::Model> for ProductView {
  fn from(p: product::Model) -> Self {
    Self {
      id: p.id,
      name: p.name,
      description: p.description,
      price: from_cents(p.price),
      original_price: p.original_price.map(from_cents),
      discount_percent: p.discount_percent,
      rating: p.rating,
      reviews: p.reviews,
      image: p.image,
      created_at: p.created_at,
    }
  }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewView {
  pub id: i32,
  pub product_id: i32,
  pub user_id: Option<i32>,
  pub rating: i32,
  pub comment: Option<String>,
  pub approved: bool,
  pub created_at: DateTime,
  pub reply: Option<String>,
  pub reply_by: Option<String>,
  pub replied_at: Option<DateTime>,
}

impl From<feedback::Model> for ReviewView {
  fn from(f: feedback::Model) -> Self {
    Self {
      id: f.id,
      product_id: f.product_id,
      user_id: f.user_id,
      rating: f.rating,
      comment: f.comment,
      approved: f.approved,
      created_at: f.created_at,
      reply: f.reply,
      reply_by: f.reply_by,
      replied_at: f.replied_at,
    }
  }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderView {
  pub id: i32,
  pub customer_name: String,
  pub phone: String,
  pub address: String,
  pub payment_method: String,
  pub delivery_method: String,
  pub subtotal: f64,
  pub discount: f64,
  pub total: f64,
  pub status: String,
  pub created_at: DateTime,
}

impl From<order::Model> for OrderView {
  fn from(o: order::Model) -> Self {
    Self {
      id: o.id,
      customer_name: o.customer_name,
      phone: o.phone,
      address: o.address,
      payment_method: o.payment_method,
      delivery_method: o.delivery_method,
      subtotal: from_cents(o.subtotal),
      discount: from_cents(o.discount),
      total: from_cents(o.total),
      status: o.status,
      created_at: o.created_at,
    }
  }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemView {
  pub id: i32,
  pub product_id: i32,
  pub name: Option<String>,
  pub image: Option<String>,
  pub price: f64,
  pub qty: i32,
}

impl From<order_item::Model> for OrderItemView {
  fn from(i: order_item::Model) -> Self {
    Self {
      id: i.id,
      product_id: i.product_id,
      name: i.name,
      image: i.image,
      price: from_cents(i.price),
      qty: i.qty,
    }
  }
}
