use sea_orm::ActiveValue::NotSet;

use crate::{entity::product, prelude::*};

/// Fields accepted when creating or editing a product. Amounts are in cents.
/// On update only `Some` fields are written.
#[derive(Debug, Default, Clone)]
pub struct ProductDraft {
  pub name: Option<String>,
  pub description: Option<String>,
  pub price: Option<i64>,
  pub original_price: Option<i64>,
  pub discount_percent: Option<i32>,
  pub image: Option<String>,
}

impl ProductDraft {
  fn validate(&self) -> Result<()> {
    if let Some(name) = &self.name
      && name.trim().is_empty()
    {
      return Err(Error::InvalidArgs("Product name is required".into()));
    }
    if self.price.is_some_and(|p| p < 0)
      || self.original_price.is_some_and(|p| p < 0)
    {
      return Err(Error::InvalidArgs("Price must not be negative".into()));
    }
    if let Some(discount) = self.discount_percent
      && !(0..=100).contains(&discount)
    {
      return Err(Error::InvalidArgs(
        "Discount percent must be between 0 and 100".into(),
      ));
    }
    Ok(())
  }
}

pub struct Product<'a> {
  db: &'a DatabaseConnection,
}

impl<'a> Product<'a> {
  pub fn new(db: &'a DatabaseConnection) -> Self {
    Self { db }
  }

  pub async fn list(&self) -> Result<Vec<product::Model>> {
    Ok(
      product::Entity::find()
        .order_by_asc(product::Column::Id)
        .all(self.db)
        .await?,
    )
  }

  pub async fn by_id(&self, id: i32) -> Result<product::Model> {
    product::Entity::find_by_id(id)
      .one(self.db)
      .await?
      .ok_or(Error::ProductNotFound)
  }

  pub async fn create(&self, draft: ProductDraft) -> Result<product::Model> {
    draft.validate()?;

    let Some(name) = draft.name else {
      return Err(Error::InvalidArgs("Product name is required".into()));
    };
    let Some(price) = draft.price else {
      return Err(Error::InvalidArgs("Product price is required".into()));
    };

    let product = product::ActiveModel {
      id: NotSet,
      name: Set(name.trim().to_string()),
      description: Set(draft.description),
      price: Set(price),
      original_price: Set(draft.original_price),
      discount_percent: Set(draft.discount_percent.unwrap_or(0)),
      rating: Set(0.0),
      reviews: Set(0),
      image: Set(draft.image),
      created_at: Set(Utc::now().naive_utc()),
    };

    let product = product.insert(self.db).await?;
    info!("Product #{} created", product.id);
    Ok(product)
  }

  pub async fn update(
    &self,
    id: i32,
    draft: ProductDraft,
  ) -> Result<product::Model> {
    draft.validate()?;

    let mut product: product::ActiveModel = self.by_id(id).await?.into();

    if let Some(name) = draft.name {
      product.name = Set(name.trim().to_string());
    }
    if let Some(description) = draft.description {
      product.description = Set(Some(description));
    }
    if let Some(price) = draft.price {
      product.price = Set(price);
    }
    if let Some(original_price) = draft.original_price {
      product.original_price = Set(Some(original_price));
    }
    if let Some(discount) = draft.discount_percent {
      product.discount_percent = Set(discount);
    }
    if let Some(image) = draft.image {
      product.image = Set(Some(image));
    }

    Ok(product.update(self.db).await?)
  }

  pub async fn delete(&self, id: i32) -> Result<()> {
    let result = product::Entity::delete_by_id(id).exec(self.db).await?;
    if result.rows_affected == 0 {
      return Err(Error::ProductNotFound);
    }
    info!("Product #{id} deleted");
    Ok(())
  }
}
