//! HTTP request handlers.
//!
//! - [`account_status`]: validates a lookup, forwards it upstream and records the outcome
//! - [`recent_queries`]: lists and clears the query history
//!
//! Handlers return [`crate::errors::Error`], which converts to a status code and a
//! `{"message": ...}` JSON body.

pub mod account_status;
pub mod recent_queries;
