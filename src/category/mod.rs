//! The shared catalog of categories that transactions are filed under.

mod create;
mod db;
mod domain;
mod list;

pub use create::create_category_endpoint;
pub use db::{create_category, create_category_table, ensure_seeded, get_all_categories};
pub use domain::{Category, CategoryData, CategoryId, CategoryName};
pub use list::list_categories_endpoint;

#[cfg(test)]
pub use db::get_category;
