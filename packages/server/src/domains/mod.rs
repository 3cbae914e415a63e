// Business domains
pub mod auth;
pub mod director;
pub mod evaluator;
pub mod matchfunction;
pub mod tickets;
