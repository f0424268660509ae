//! Notion as the source of the shopping list and the store of item mappings.

pub mod client;
pub mod query_builder;
pub mod shopping_list;

pub use client::NotionClient;
pub use query_builder::QueryBuilder;
pub use shopping_list::NotionDataProvider;
