pub use super::cart_entries::Entity as CartEntries;
pub use super::order_items::Entity as OrderItems;
pub use super::orders::Entity as Orders;
pub use super::product_images::Entity as ProductImages;
pub use super::products::Entity as Products;
pub use super::users::Entity as Users;
