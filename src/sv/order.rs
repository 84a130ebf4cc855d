use sea_orm::{ActiveValue::NotSet, DatabaseTransaction};
use serde::Deserialize;

use crate::{
  entity::{order, order_item, product},
  prelude::*,
  sv::Fallback,
  utils::{checked_cents, to_cents},
};

/// Order body exactly as the client sent it.
pub type Payload = json::Map<String, json::Value>;

/// The fields of a [`Payload`] the database path understands. Unknown keys
/// are ignored here and survive only in the raw payload.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Checkout {
  #[serde(default, alias = "name")]
  pub customer_name: String,
  #[serde(default)]
  pub phone: String,
  #[serde(default)]
  pub address: String,
  #[serde(default, alias = "payment")]
  pub payment_method: String,
  #[serde(default)]
  pub delivery_method: String,
  #[serde(default)]
  pub items: Vec<CartLine>,
  #[serde(default)]
  pub discount: Option<f64>,
  #[serde(default)]
  pub total: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CartLine {
  pub id: i32,
  pub price: f64,
  #[serde(alias = "quantity")]
  pub qty: i32,
}

/// Order amounts in cents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Totals {
  pub subtotal: i64,
  pub discount: i64,
  pub total: i64,
}

impl Checkout {
  pub fn parse(payload: &Payload) -> Result<Self> {
    json::from_value(json::Value::Object(payload.clone()))
      .map_err(|err| Error::InvalidArgs(format!("Invalid order: {err}")))
  }

  /// A positive client `total` wins, otherwise `max(0, subtotal - discount)`.
  /// Fails only when an amount cannot be represented in cents.
  pub fn totals(&self) -> Result<Totals> {
    let mut subtotal: i64 = 0;
    for line in &self.items {
      let price = cents(line.price, "price")?;
      subtotal = price
        .checked_mul(i64::from(line.qty))
        .and_then(|cost| subtotal.checked_add(cost))
        .ok_or_else(|| {
          Error::InvalidArgs("Order subtotal is out of range".into())
        })?;
    }

    let discount =
      self.discount.map(|d| cents(d, "discount")).transpose()?.unwrap_or(0);

    let total = match self.total.map(|t| cents(t, "total")).transpose()? {
      Some(total) if total > 0 => total,
      _ => subtotal.saturating_sub(discount).max(0),
    };

    Ok(Totals { subtotal, discount, total })
  }
}

fn cents(amount: f64, what: &str) -> Result<i64> {
  checked_cents(amount)
    .ok_or_else(|| Error::InvalidArgs(format!("Invalid {what} `{amount}`")))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Submitted {
  Stored { order_id: i32 },
  Fallback { fallback_id: i64 },
}

pub struct Order<'a> {
  db: &'a DatabaseConnection,
}

impl<'a> Order<'a> {
  pub fn new(db: &'a DatabaseConnection) -> Self {
    Self { db }
  }

  /// Stores the order in the database, or the raw `payload` in `fallback`
  /// when the database write fails for any reason. Only a payload that cannot
  /// be read as an order, or a failed fallback write, is an error.
  pub async fn submit(
    &self,
    payload: &Payload,
    fallback: &Fallback,
  ) -> Result<Submitted> {
    let checkout = Checkout::parse(payload)?;
    let totals = checkout.totals()?;

    match self.persist(&checkout, totals).await {
      Ok(order_id) => {
        info!(
          "Order #{order_id} placed: {} items, total {}",
          checkout.items.len(),
          totals.total
        );
        Ok(Submitted::Stored { order_id })
      }
      Err(err) => {
        warn!("Order insert failed, using fallback store: {err}");
        let fallback_id = fallback.append(payload).await?;
        info!(
          "Order saved to {} as {fallback_id}",
          fallback.path().display()
        );
        Ok(Submitted::Fallback { fallback_id })
      }
    }
  }

  async fn persist(&self, checkout: &Checkout, totals: Totals) -> Result<i32> {
    let txn = self.db.begin().await?;

    match Self::write(&txn, checkout, totals).await {
      Ok(order_id) => {
        txn.commit().await?;
        Ok(order_id)
      }
      Err(err) => {
        if let Err(rollback) = txn.rollback().await {
          warn!("Rollback failed: {rollback}");
        }
        Err(err)
      }
    }
  }

  async fn write(
    txn: &DatabaseTransaction,
    checkout: &Checkout,
    totals: Totals,
  ) -> Result<i32> {
    let order = order::ActiveModel {
      id: NotSet,
      customer_name: Set(checkout.customer_name.clone()),
      phone: Set(checkout.phone.clone()),
      address: Set(checkout.address.clone()),
      payment_method: Set(checkout.payment_method.clone()),
      delivery_method: Set(checkout.delivery_method.clone()),
      subtotal: Set(totals.subtotal),
      discount: Set(totals.discount),
      total: Set(totals.total),
      status: Set(order::DEFAULT_STATUS.to_string()),
      created_at: Set(Utc::now().naive_utc()),
    }
    .insert(txn)
    .await?;

    let snapshots = Self::snapshots(txn, &checkout.items).await;

    let items = checkout.items.iter().map(|line| {
      let product = snapshots.get(&line.id);
      order_item::ActiveModel {
        id: NotSet,
        order_id: Set(order.id),
        product_id: Set(line.id),
        name: Set(product.map(|p| p.name.clone())),
        image: Set(product.and_then(|p| p.image.clone())),
        price: Set(to_cents(line.price)),
        qty: Set(line.qty),
      }
    });

    if !checkout.items.is_empty() {
      order_item::Entity::insert_many(items).exec(txn).await?;
    }

    Ok(order.id)
  }

  /// One lookup for every distinct product in the cart. Failure only costs
  /// the name/image snapshot, never the order.
  async fn snapshots(
    txn: &DatabaseTransaction,
    lines: &[CartLine],
  ) -> HashMap<i32, product::Model> {
    let ids: HashSet<i32> = lines.iter().map(|line| line.id).collect();

    match product::Entity::find()
      .filter(product::Column::Id.is_in(ids))
      .all(txn)
      .await
    {
      Ok(products) => products.into_iter().map(|p| (p.id, p)).collect(),
      Err(err) => {
        warn!("Product lookup failed, item snapshots left empty: {err}");
        HashMap::new()
      }
    }
  }

  pub async fn list(&self) -> Result<Vec<order::Model>> {
    Ok(
      order::Entity::find()
        .order_by_desc(order::Column::CreatedAt)
        .order_by_desc(order::Column::Id)
        .all(self.db)
        .await?,
    )
  }

  pub async fn by_id(
    &self,
    id: i32,
  ) -> Result<(order::Model, Vec<order_item::Model>)> {
    let order = order::Entity::find_by_id(id)
      .one(self.db)
      .await?
      .ok_or(Error::OrderNotFound)?;

    let items = order_item::Entity::find()
      .filter(order_item::Column::OrderId.eq(order.id))
      .order_by_asc(order_item::Column::Id)
      .all(self.db)
      .await?;

    Ok((order, items))
  }

  pub async fn set_status(
    &self,
    id: i32,
    status: &str,
  ) -> Result<order::Model> {
    let status = status.trim();
    if status.is_empty() {
      return Err(Error::InvalidArgs("Status is required".into()));
    }

    let order = order::Entity::find_by_id(id)
      .one(self.db)
      .await?
      .ok_or(Error::OrderNotFound)?;

    let order =
      order::ActiveModel { status: Set(status.to_string()), ..order.into() }
        .update(self.db)
        .await?;

    info!("Order #{id} status set to {status}");
    Ok(order)
  }

  pub async fn delete(&self, id: i32) -> Result<()> {
    let txn = self.db.begin().await?;

    order_item::Entity::delete_many()
      .filter(order_item::Column::OrderId.eq(id))
      .exec(&txn)
      .await?;
    let result = order::Entity::delete_by_id(id).exec(&txn).await?;

    if result.rows_affected == 0 {
      txn.rollback().await?;
      return Err(Error::OrderNotFound);
    }

    txn.commit().await?;
    info!("Order #{id} deleted");
    Ok(())
  }
}
