pub mod adapters;
pub mod app_state;
