use sea_orm::{
  ActiveValue::NotSet,
  QuerySelect,
  sea_query::{Expr, Func, SimpleExpr},
};
use serde::Serialize;

use crate::{
  entity::{feedback, product},
  prelude::*,
  sv::auth::Identity,
};

/// Derived product rating, as written back onto the product row.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Aggregate {
  pub avg_rating: f64,
  pub review_count: i64,
}

#[derive(Debug, Clone)]
pub struct Submission {
  pub review: feedback::Model,
  pub aggregate: Aggregate,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reply {
  pub text: String,
  pub by: String,
  pub at: DateTime,
}

pub struct Feedback<'a> {
  db: &'a DatabaseConnection,
}

impl<'a> Feedback<'a> {
  pub fn new(db: &'a DatabaseConnection) -> Self {
    Self { db }
  }

  /// Stores a review and refreshes the product rating. A user may review the
  /// same product any number of times; every review counts.
  pub async fn submit(
    &self,
    author: &Identity,
    product_id: i32,
    rating: Option<i32>,
    text: Option<&str>,
  ) -> Result<Submission> {
    let rating = match rating {
      None | Some(0) => {
        return Err(Error::InvalidArgs("Rating is required".into()));
      }
      Some(rating) if !(1..=5).contains(&rating) => {
        return Err(Error::InvalidArgs(
          "Rating must be between 1 and 5".into(),
        ));
      }
      Some(rating) => rating,
    };

    product::Entity::find_by_id(product_id)
      .one(self.db)
      .await?
      .ok_or(Error::ProductNotFound)?;

    let comment =
      text.map(str::trim).filter(|text| !text.is_empty()).map(String::from);

    let review = feedback::ActiveModel {
      id: NotSet,
      product_id: Set(product_id),
      user_id: Set(Some(author.id)),
      rating: Set(rating),
      comment: Set(comment),
      approved: Set(true),
      created_at: Set(Utc::now().naive_utc()),
      reply: Set(None),
      reply_by: Set(None),
      replied_at: Set(None),
    }
    .insert(self.db)
    .await?;

    debug!(
      "Review #{} by user {} on product {product_id}: {rating}",
      review.id, author.id
    );

    let aggregate = match self.refresh_rating(product_id).await {
      Ok(aggregate) => aggregate,
      Err(err) => {
        warn!("Rating refresh failed for product {product_id}: {err}");
        self.stored_rating(product_id).await
      }
    };

    Ok(Submission { review, aggregate })
  }

  /// Recomputes AVG/COUNT over approved feedback and writes them onto the
  /// product. Not isolated from concurrent submissions.
  pub async fn refresh_rating(&self, product_id: i32) -> Result<Aggregate> {
    let (avg, count): (Option<f64>, i64) = feedback::Entity::find()
      .select_only()
      .column_as(
        SimpleExpr::from(Func::avg(Expr::col(feedback::Column::Rating))),
        "avg_rating",
      )
      .column_as(
        SimpleExpr::from(Func::count(Expr::col(feedback::Column::Id))),
        "review_count",
      )
      .filter(feedback::Column::ProductId.eq(product_id))
      .filter(feedback::Column::Approved.eq(true))
      .into_tuple()
      .one(self.db)
      .await?
      .unwrap_or((None, 0));

    let aggregate = Aggregate {
      avg_rating: avg.map(round_rating).unwrap_or(0.0),
      review_count: count,
    };
    let reviews = review_column(count)?;

    product::Entity::update_many()
      .col_expr(product::Column::Rating, Expr::value(aggregate.avg_rating))
      .col_expr(product::Column::Reviews, Expr::value(reviews))
      .filter(product::Column::Id.eq(product_id))
      .exec(self.db)
      .await?;

    Ok(aggregate)
  }

  async fn stored_rating(&self, product_id: i32) -> Aggregate {
    match product::Entity::find_by_id(product_id).one(self.db).await {
      Ok(Some(product)) => Aggregate {
        avg_rating: product.rating,
        review_count: i64::from(product.reviews),
      },
      Ok(None) => Aggregate { avg_rating: 0.0, review_count: 0 },
      Err(err) => {
        warn!("Stored rating unavailable for product {product_id}: {err}");
        Aggregate { avg_rating: 0.0, review_count: 0 }
      }
    }
  }

  /// Sets the admin reply. The previous reply, if any, is replaced.
  pub async fn reply(
    &self,
    feedback_id: i32,
    text: &str,
    author: &Identity,
  ) -> Result<Reply> {
    let text = text.trim();
    if text.is_empty() {
      return Err(Error::InvalidArgs("Reply text is required".into()));
    }

    let review = feedback::Entity::find_by_id(feedback_id)
      .one(self.db)
      .await?
      .ok_or(Error::FeedbackNotFound)?;

    let reply = Reply {
      text: text.to_string(),
      by: author.name.clone(),
      at: Utc::now().naive_utc(),
    };

    feedback::ActiveModel {
      reply: Set(Some(reply.text.clone())),
      reply_by: Set(Some(reply.by.clone())),
      replied_at: Set(Some(reply.at)),
      ..review.into()
    }
    .update(self.db)
    .await?;

    info!("Feedback #{feedback_id} answered by {}", reply.by);
    Ok(reply)
  }

  pub async fn by_product(
    &self,
    product_id: i32,
  ) -> Result<Vec<feedback::Model>> {
    Ok(
      feedback::Entity::find()
        .filter(feedback::Column::ProductId.eq(product_id))
        .filter(feedback::Column::Approved.eq(true))
        .order_by_desc(feedback::Column::CreatedAt)
        .order_by_desc(feedback::Column::Id)
        .all(self.db)
        .await?,
    )
  }

  pub async fn all(&self) -> Result<Vec<feedback::Model>> {
    Ok(
      feedback::Entity::find()
        .order_by_desc(feedback::Column::CreatedAt)
        .order_by_desc(feedback::Column::Id)
        .all(self.db)
        .await?,
    )
  }
}

fn round_rating(avg: f64) -> f64 {
  (avg * 10.0).round() / 10.0
}

/// `products.reviews` is a 32-bit column.
fn review_column(count: i64) -> Result<i32> {
  i32::try_from(count).map_err(|_| {
    Error::Internal(format!("Review count {count} does not fit the column"))
  })
}
