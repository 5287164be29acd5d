use anyhow::{Context, Result};
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};

use crate::entities::{cart_entries, products};
use crate::models::cart::CartLine;
use crate::models::product::Product;

pub struct CartRepository {
    conn: DatabaseConnection,
}

impl CartRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Insert a new entry or add `quantity` to the existing one in a single
    /// statement, so concurrent adds for the same pair never lose an update
    /// and never create a second row.
    ///
    /// Returns `false` and leaves the row untouched when the summed quantity
    /// would not fit in an `i32`.
    pub async fn upsert_add(&self, user_id: i32, product_id: i32, quantity: i32) -> Result<bool> {
        let entry = cart_entries::ActiveModel {
            user_id: Set(user_id),
            product_id: Set(product_id),
            quantity: Set(quantity),
            ..Default::default()
        };

        let rows = cart_entries::Entity::insert(entry)
            .on_conflict(
                OnConflict::columns([
                    cart_entries::Column::UserId,
                    cart_entries::Column::ProductId,
                ])
                .value(
                    cart_entries::Column::Quantity,
                    Expr::col((cart_entries::Entity, cart_entries::Column::Quantity)).add(quantity),
                )
                .action_and_where(
                    Expr::col((cart_entries::Entity, cart_entries::Column::Quantity))
                        .lte(i32::MAX.saturating_sub(quantity)),
                )
                .to_owned(),
            )
            .exec_without_returning(&self.conn)
            .await
            .context("Failed to upsert cart entry")?;

        Ok(rows > 0)
    }

    /// Overwrite the quantity of an existing entry. Returns `false` when the
    /// user has no entry for the product.
    pub async fn set_quantity(&self, user_id: i32, product_id: i32, quantity: i32) -> Result<bool> {
        let Some(entry) = self.find_entry(user_id, product_id).await? else {
            return Ok(false);
        };

        let mut active: cart_entries::ActiveModel = entry.into();
        active.quantity = Set(quantity);
        active
            .update(&self.conn)
            .await
            .context("Failed to update cart entry quantity")?;

        Ok(true)
    }

    pub async fn remove(&self, user_id: i32, product_id: i32) -> Result<bool> {
        let result = cart_entries::Entity::delete_many()
            .filter(cart_entries::Column::UserId.eq(user_id))
            .filter(cart_entries::Column::ProductId.eq(product_id))
            .exec(&self.conn)
            .await
            .context("Failed to remove cart entry")?;

        Ok(result.rows_affected > 0)
    }

    pub async fn quantity_of(&self, user_id: i32, product_id: i32) -> Result<Option<i32>> {
        Ok(self
            .find_entry(user_id, product_id)
            .await?
            .map(|entry| entry.quantity))
    }

    /// Cart lines joined with their products, oldest entry first.
    pub async fn list(&self, user_id: i32) -> Result<Vec<CartLine>> {
        let rows = cart_entries::Entity::find()
            .filter(cart_entries::Column::UserId.eq(user_id))
            .find_also_related(products::Entity)
            .order_by_asc(cart_entries::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to list cart entries")?;

        Ok(rows
            .into_iter()
            .filter_map(|(entry, product)| {
                product.map(|product| CartLine {
                    product: Product::from(product),
                    quantity: entry.quantity,
                })
            })
            .collect())
    }

    async fn find_entry(&self, user_id: i32, product_id: i32) -> Result<Option<cart_entries::Model>> {
        cart_entries::Entity::find()
            .filter(cart_entries::Column::UserId.eq(user_id))
            .filter(cart_entries::Column::ProductId.eq(product_id))
            .one(&self.conn)
            .await
            .context("Failed to query cart entry")
    }
}
