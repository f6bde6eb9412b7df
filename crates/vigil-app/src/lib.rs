#![forbid(unsafe_code)]
#![deny(
    warnings,
    dead_code,
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]

//! Vigil application bootstrap wiring.
//!
//! Layout: `bootstrap.rs` (service wiring), `webhook.rs` (event dispatch),
//! `activation.rs` (merge-time hosting sweep).

mod activation;
/// Application bootstrap and environment loading.
pub mod bootstrap;
/// Application error type.
pub mod error;
/// Webhook routing and review dispatch.
pub mod webhook;

pub use bootstrap::run_app;
pub use error::{AppError, AppResult};
