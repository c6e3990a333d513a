pub mod api;
pub mod collect;
pub mod config;
pub mod output;
