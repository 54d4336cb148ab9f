// Core business logic modules
pub mod artifact;
pub mod config;
pub mod context;
pub mod counters;
pub mod inventory;
pub mod query;
pub mod sampler;
pub mod shutdown;
