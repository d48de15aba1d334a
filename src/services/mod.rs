pub mod classifier;
pub mod session;
pub mod upload_service;
pub mod workflow;
