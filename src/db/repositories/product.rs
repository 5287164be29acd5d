use anyhow::{Context, Result};
use sea_orm::sea_query::LikeExpr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use tracing::info;

use crate::entities::{cart_entries, order_items, product_images, products};
use crate::models::product::{Product, ProductInput};

pub struct ProductRepository {
    conn: DatabaseConnection,
}

/// Outcome of attaching a secondary image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SecondaryImageOutcome {
    Added,
    LimitReached,
    ProductMissing,
}

impl ProductRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn list_all(&self) -> Result<Vec<Product>> {
        let rows = products::Entity::find()
            .order_by_asc(products::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to list products")?;

        Ok(rows.into_iter().map(Product::from).collect())
    }

    pub async fn list_by_category(&self, category: &str) -> Result<Vec<Product>> {
        let rows = products::Entity::find()
            .filter(products::Column::Category.eq(category))
            .order_by_asc(products::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to list products by category")?;

        Ok(rows.into_iter().map(Product::from).collect())
    }

    /// Case-insensitive substring match on the product name.
    pub async fn search(&self, query: &str, limit: Option<u64>) -> Result<Vec<Product>> {
        let pattern = format!("%{}%", escape_like(query));

        let rows = products::Entity::find()
            .filter(products::Column::Name.like(LikeExpr::new(pattern).escape('\\')))
            .order_by_asc(products::Column::Id)
            .limit(limit)
            .all(&self.conn)
            .await
            .context("Failed to search products")?;

        Ok(rows.into_iter().map(Product::from).collect())
    }

    /// Fetch a product together with its secondary images.
    pub async fn get(&self, id: i32) -> Result<Option<Product>> {
        let rows = products::Entity::find_by_id(id)
            .find_with_related(product_images::Entity)
            .all(&self.conn)
            .await
            .context("Failed to query product by ID")?;

        Ok(rows
            .into_iter()
            .next()
            .map(|(product, images)| Product::from_models(product, images)))
    }

    pub async fn create(&self, input: ProductInput) -> Result<Product> {
        let now = chrono::Utc::now().to_rfc3339();

        let active = products::ActiveModel {
            name: Set(input.name),
            price: Set(input.price.stored()),
            description: Set(input.description),
            category: Set(input.category),
            image_url: Set(None),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        };

        let model = active
            .insert(&self.conn)
            .await
            .context("Failed to insert product")?;

        info!(product_id = model.id, name = %model.name, "Created product");
        Ok(Product::from(model))
    }

    pub async fn update(&self, id: i32, input: ProductInput) -> Result<bool> {
        let Some(model) = products::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query product for update")?
        else {
            return Ok(false);
        };

        let mut active: products::ActiveModel = model.into();
        active.name = Set(input.name);
        active.price = Set(input.price.stored());
        active.description = Set(input.description);
        active.category = Set(input.category);
        active.updated_at = Set(chrono::Utc::now().to_rfc3339());
        active
            .update(&self.conn)
            .await
            .context("Failed to update product")?;

        Ok(true)
    }

    /// Point the product at a new primary image. Returns the previous
    /// reference, or `None` wrapped in `Some` when there was none; the outer
    /// `None` means the product does not exist.
    pub async fn set_primary_image(
        &self,
        id: i32,
        image_url: &str,
    ) -> Result<Option<Option<String>>> {
        let Some(model) = products::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query product for image update")?
        else {
            return Ok(None);
        };

        let previous = model.image_url.clone();

        let mut active: products::ActiveModel = model.into();
        active.image_url = Set(Some(image_url.to_string()));
        active.updated_at = Set(chrono::Utc::now().to_rfc3339());
        active
            .update(&self.conn)
            .await
            .context("Failed to update product image")?;

        Ok(Some(previous))
    }

    /// Attach a secondary image unless the product already has `max` of them.
    pub async fn add_secondary_image(
        &self,
        id: i32,
        image_url: &str,
        max: usize,
    ) -> Result<SecondaryImageOutcome> {
        let txn = self
            .conn
            .begin()
            .await
            .context("Failed to begin image transaction")?;

        if products::Entity::find_by_id(id)
            .one(&txn)
            .await
            .context("Failed to query product for image")?
            .is_none()
        {
            return Ok(SecondaryImageOutcome::ProductMissing);
        }

        let existing = product_images::Entity::find()
            .filter(product_images::Column::ProductId.eq(id))
            .count(&txn)
            .await
            .context("Failed to count product images")?;

        if usize::try_from(existing).unwrap_or(usize::MAX) >= max {
            return Ok(SecondaryImageOutcome::LimitReached);
        }

        product_images::ActiveModel {
            product_id: Set(id),
            image_url: Set(image_url.to_string()),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .context("Failed to insert product image")?;

        txn.commit()
            .await
            .context("Failed to commit product image")?;

        Ok(SecondaryImageOutcome::Added)
    }

    /// Remove every secondary image row of a product, returning the file
    /// references that were detached.
    pub async fn clear_secondary_images(&self, id: i32) -> Result<Vec<String>> {
        let txn = self
            .conn
            .begin()
            .await
            .context("Failed to begin image transaction")?;

        let images = product_images::Entity::find()
            .filter(product_images::Column::ProductId.eq(id))
            .all(&txn)
            .await
            .context("Failed to list product images")?;

        product_images::Entity::delete_many()
            .filter(product_images::Column::ProductId.eq(id))
            .exec(&txn)
            .await
            .context("Failed to delete product images")?;

        txn.commit()
            .await
            .context("Failed to commit product image removal")?;

        Ok(images.into_iter().map(|image| image.image_url).collect())
    }

    /// Delete a product and everything that references it, children first:
    /// order line items, cart entries, secondary image rows, then the product.
    ///
    /// Returns the image references (secondary first, then primary) whose
    /// files the caller should remove once the transaction has committed, or
    /// `None` if the product did not exist.
    pub async fn delete_cascade(&self, id: i32) -> Result<Option<Vec<String>>> {
        let txn = self
            .conn
            .begin()
            .await
            .context("Failed to begin product delete transaction")?;

        let Some(product) = products::Entity::find_by_id(id)
            .one(&txn)
            .await
            .context("Failed to query product for delete")?
        else {
            return Ok(None);
        };

        order_items::Entity::delete_many()
            .filter(order_items::Column::ProductId.eq(id))
            .exec(&txn)
            .await
            .context("Failed to delete order items of product")?;

        cart_entries::Entity::delete_many()
            .filter(cart_entries::Column::ProductId.eq(id))
            .exec(&txn)
            .await
            .context("Failed to delete cart entries of product")?;

        let images = product_images::Entity::find()
            .filter(product_images::Column::ProductId.eq(id))
            .all(&txn)
            .await
            .context("Failed to list product images")?;

        product_images::Entity::delete_many()
            .filter(product_images::Column::ProductId.eq(id))
            .exec(&txn)
            .await
            .context("Failed to delete product images")?;

        products::Entity::delete_by_id(id)
            .exec(&txn)
            .await
            .context("Failed to delete product")?;

        txn.commit()
            .await
            .context("Failed to commit product delete")?;

        info!(product_id = id, name = %product.name, "Deleted product");

        let mut files: Vec<String> = images.into_iter().map(|image| image.image_url).collect();
        files.extend(product.image_url);
        Ok(Some(files))
    }
}

/// Escape `LIKE` wildcards so user input matches literally.
fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for ch in input.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("air max"), "air max");
        assert_eq!(escape_like("100%"), "100\\%");
        assert_eq!(escape_like("a_b\\c"), "a\\_b\\\\c");
    }
}
