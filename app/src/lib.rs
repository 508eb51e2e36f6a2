//! Terminal client for the appointment scheduler.
//!
//! # Overview
//! Hosts the sans-IO `scheduler_core` crate: executes its requests over
//! reqwest with a timeout and optional retries, drives the optimistic task
//! toggle, keeps page state and renders it as text.
//!
//! # Design
//! - `Transport` is the only I/O seam; unit tests swap in a scripted one.
//! - `Fetcher` owns the timeout and the fixed-delay retry budget.
//! - `AppointmentService` pairs each core builder with its parser.
//! - Pages own their in-memory state; views render to `String`.

pub mod config;
pub mod connection;
pub mod error;
pub mod fetch;
pub mod input;
pub mod logging;
pub mod pages;
pub mod service;
pub mod task_toggle;
pub mod transport;
pub mod views;

#[cfg(test)]
mod testing;

pub use config::{AppConfig, GlobalArgs};
pub use error::AppError;
pub use fetch::Fetcher;
pub use service::AppointmentService;
pub use transport::{ReqwestTransport, Transport};
