pub mod app_config;
pub mod filter_config;
