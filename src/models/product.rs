use serde::Serialize;

use crate::domain::{Price, ProductId};
use crate::entities::{product_images, products};

#[derive(Debug, Clone, Serialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub price: Price,
    pub description: Option<String>,
    pub category: String,
    pub image_url: Option<String>,
    /// Secondary images, in upload order.
    pub images: Vec<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl Product {
    pub(crate) fn from_models(model: products::Model, images: Vec<product_images::Model>) -> Self {
        let mut images = images;
        images.sort_by_key(|image| image.id);

        Self {
            id: ProductId::new(model.id),
            name: model.name,
            price: Price::from_stored(model.price),
            description: model.description,
            category: model.category,
            image_url: model.image_url,
            images: images.into_iter().map(|image| image.image_url).collect(),
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

impl From<products::Model> for Product {
    fn from(model: products::Model) -> Self {
        Self::from_models(model, Vec::new())
    }
}

/// Fields for creating or editing a product. Price is already scaled.
#[derive(Debug, Clone)]
pub struct ProductInput {
    pub name: String,
    pub price: Price,
    pub description: Option<String>,
    pub category: String,
}
