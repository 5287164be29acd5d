use std::collections::HashMap;

use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use tracing::info;

use crate::domain::{OrderId, Price, ProductId, UserId};
use crate::entities::{cart_entries, order_items, orders, products, users};
use crate::models::order::{Order, OrderLine};

pub struct OrderRepository {
    conn: DatabaseConnection,
}

impl OrderRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Convert the user's cart into an order in one transaction.
    ///
    /// Each line item snapshots the product's current price, the order total
    /// is the sum of those snapshots, and every consumed cart entry is
    /// deleted. Returns `None` (and writes nothing) when the cart is empty.
    pub async fn place(&self, user_id: i32, payment_method: Option<String>) -> Result<Option<Order>> {
        let txn = self
            .conn
            .begin()
            .await
            .context("Failed to begin checkout transaction")?;

        let entries = cart_entries::Entity::find()
            .filter(cart_entries::Column::UserId.eq(user_id))
            .find_also_related(products::Entity)
            .order_by_asc(cart_entries::Column::Id)
            .all(&txn)
            .await
            .context("Failed to read cart for checkout")?;

        let lines: Vec<(cart_entries::Model, products::Model)> = entries
            .into_iter()
            .filter_map(|(entry, product)| product.map(|product| (entry, product)))
            .collect();

        if lines.is_empty() {
            return Ok(None);
        }

        let total: Price = lines
            .iter()
            .map(|(entry, product)| Price::from_stored(product.price).times(entry.quantity))
            .sum();

        let created_at = chrono::Utc::now().to_rfc3339();
        let order = orders::ActiveModel {
            user_id: Set(user_id),
            total_amount: Set(total.stored()),
            payment_method: Set(payment_method),
            created_at: Set(created_at),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .context("Failed to insert order")?;

        let mut items = Vec::with_capacity(lines.len());
        for (entry, product) in lines {
            order_items::ActiveModel {
                order_id: Set(order.id),
                product_id: Set(product.id),
                quantity: Set(entry.quantity),
                price: Set(product.price),
                ..Default::default()
            }
            .insert(&txn)
            .await
            .context("Failed to insert order item")?;

            cart_entries::Entity::delete_by_id(entry.id)
                .exec(&txn)
                .await
                .context("Failed to consume cart entry")?;

            items.push(OrderLine {
                product_id: ProductId::new(product.id),
                product_name: product.name,
                quantity: entry.quantity,
                unit_price: Price::from_stored(product.price),
            });
        }

        let username = users::Entity::find_by_id(user_id)
            .one(&txn)
            .await
            .context("Failed to query order owner")?
            .map(|user| user.username)
            .unwrap_or_default();

        txn.commit()
            .await
            .context("Failed to commit checkout")?;

        info!(order_id = order.id, user_id, total = order.total_amount, "Order placed");

        Ok(Some(Order {
            id: OrderId::new(order.id),
            user_id: UserId::new(order.user_id),
            username,
            total_amount: Price::from_stored(order.total_amount),
            payment_method: order.payment_method,
            created_at: order.created_at,
            items,
        }))
    }

    pub async fn get(&self, id: i32) -> Result<Option<Order>> {
        let Some(order) = orders::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query order")?
        else {
            return Ok(None);
        };

        let mut assembled = assemble(&self.conn, vec![order]).await?;
        Ok(assembled.pop())
    }

    /// Orders placed by one user, newest first.
    pub async fn list_for_user(&self, user_id: i32) -> Result<Vec<Order>> {
        let rows = orders::Entity::find()
            .filter(orders::Column::UserId.eq(user_id))
            .order_by_desc(orders::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to list orders of user")?;

        assemble(&self.conn, rows).await
    }

    /// Every order with its owner's username and line items, newest first.
    pub async fn list_all(&self) -> Result<Vec<Order>> {
        let rows = orders::Entity::find()
            .order_by_desc(orders::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to list orders")?;

        assemble(&self.conn, rows).await
    }

    /// Delete an order's line items, then the order.
    pub async fn delete_cascade(&self, id: i32) -> Result<bool> {
        let txn = self
            .conn
            .begin()
            .await
            .context("Failed to begin order delete transaction")?;

        if orders::Entity::find_by_id(id)
            .one(&txn)
            .await
            .context("Failed to query order for delete")?
            .is_none()
        {
            return Ok(false);
        }

        order_items::Entity::delete_many()
            .filter(order_items::Column::OrderId.eq(id))
            .exec(&txn)
            .await
            .context("Failed to delete order items")?;

        orders::Entity::delete_by_id(id)
            .exec(&txn)
            .await
            .context("Failed to delete order")?;

        txn.commit()
            .await
            .context("Failed to commit order delete")?;

        info!(order_id = id, "Deleted order");
        Ok(true)
    }
}

/// Attach usernames and line items to a batch of order rows, keeping the
/// order of `rows`.
async fn assemble<C: ConnectionTrait>(conn: &C, rows: Vec<orders::Model>) -> Result<Vec<Order>> {
    if rows.is_empty() {
        return Ok(Vec::new());
    }

    let order_ids: Vec<i32> = rows.iter().map(|order| order.id).collect();
    let user_ids: Vec<i32> = rows.iter().map(|order| order.user_id).collect();

    let usernames: HashMap<i32, String> = users::Entity::find()
        .filter(users::Column::Id.is_in(user_ids))
        .all(conn)
        .await
        .context("Failed to query order owners")?
        .into_iter()
        .map(|user| (user.id, user.username))
        .collect();

    let item_rows = order_items::Entity::find()
        .filter(order_items::Column::OrderId.is_in(order_ids))
        .find_also_related(products::Entity)
        .order_by_asc(order_items::Column::Id)
        .all(conn)
        .await
        .context("Failed to query order items")?;

    let mut items_by_order: HashMap<i32, Vec<OrderLine>> = HashMap::new();
    for (item, product) in item_rows {
        items_by_order.entry(item.order_id).or_default().push(OrderLine {
            product_id: ProductId::new(item.product_id),
            product_name: product.map(|product| product.name).unwrap_or_default(),
            quantity: item.quantity,
            unit_price: Price::from_stored(item.price),
        });
    }

    Ok(rows
        .into_iter()
        .map(|order| Order {
            id: OrderId::new(order.id),
            user_id: UserId::new(order.user_id),
            username: usernames.get(&order.user_id).cloned().unwrap_or_default(),
            total_amount: Price::from_stored(order.total_amount),
            payment_method: order.payment_method,
            created_at: order.created_at,
            items: items_by_order.remove(&order.id).unwrap_or_default(),
        })
        .collect())
}
