//! Core types and rules for the Mindful progression & reminder engine.
//!
//! This crate is deliberately free of HTTP and database dependencies. Durable
//! storage and notification delivery are reached through the
//! [`store::ProgressStore`] and [`notify::NotificationScheduler`] traits; the
//! [`engine::Engine`] wires them into the per-event pipeline.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod activity;
pub mod badge;
pub mod calendar;
pub mod catalog;
pub mod engine;
pub mod error;
pub mod evaluator;
pub mod notify;
pub mod progress;
pub mod reminder;
pub mod store;
pub mod streak;

pub use error::{Error, Result};
