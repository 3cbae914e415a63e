//! Evaluator domain - pass-through evaluator
//!
//! Every proposal the backend sends is approved unchanged.

pub mod service;

pub use service::{pass_through, serve, EvaluatorService};
