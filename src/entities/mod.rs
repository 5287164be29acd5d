pub mod prelude;

pub mod cart_entries;
pub mod order_items;
pub mod orders;
pub mod product_images;
pub mod products;
pub mod users;
