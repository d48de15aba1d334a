pub mod inference;
pub mod model_manager;
pub mod provider;
