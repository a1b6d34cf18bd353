pub mod chain;
pub mod chart;
pub mod cli;
pub mod config;
pub mod query;
pub mod render;
pub mod sanitize;
pub mod schema;
pub mod store;
pub mod synthesizer;
pub mod text_to_sql_chain;
