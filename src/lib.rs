pub mod api_client;
pub mod batch_aggregator;
pub mod color_scale;
pub mod columns;
pub mod data_fetch;
pub mod env_loader;
pub mod error;
pub mod excel_writer;
pub mod models;
pub mod ontology;
pub mod projection;
pub mod selection;
pub mod view_scope;
pub mod views;
