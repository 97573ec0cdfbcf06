//! Conduit - rule-based request routing and provider dispatch
//!
//! This library resolves normalized request envelopes to one of several
//! backend providers (language models, developer tooling, multi-agent
//! workflows, vision services) through a priority-ordered rule table, and
//! invokes the chosen provider behind a uniform contract.

pub mod api;
pub mod cli;
pub mod config;
pub mod dispatch;
pub mod envelope;
pub mod logging;
pub mod provider;
pub mod rbac;
pub mod registry;
pub mod routing;
pub mod secrets;
