//! benchstock — client core for an electronics-inventory manager.
//!
//! The backend owns the business logic; this crate is the typed client side:
//! wire schemas and a REST client (`model`, `api`), the shopping-list
//! view-model layer and line state machine (`shopping`), stock-receive
//! allocation validation (`allocation`), an optimistic keyed query cache
//! (`cache`), and the shared SSE task-event bridge (`events`).

pub mod allocation;
pub mod api;
pub mod cache;
pub mod config;
pub mod errors;
pub mod events;
pub mod model;
pub mod shopping;
pub mod telemetry;
