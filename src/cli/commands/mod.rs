mod create_admin;
mod export_orders;

pub use create_admin::{AdminArgs, cmd_create_admin};
pub use export_orders::cmd_export_orders;
