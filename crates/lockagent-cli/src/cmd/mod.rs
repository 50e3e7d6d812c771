pub mod agent;
pub mod lock;
