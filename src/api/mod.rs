pub mod gateway;
pub mod handlers;
pub mod models;

// Re-export main components
pub use gateway::PredictionGateway;
