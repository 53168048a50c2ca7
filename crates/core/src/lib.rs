//! Core library for hibob-jobs
//!
//! This crate implements the **Functional Core** of the hibob-jobs application,
//! following the Functional Core - Imperative Shell architectural pattern.
//!
//! # Architecture Overview
//!
//! The project uses a two-crate architecture to enforce separation of concerns:
//!
//! - **`hibob_jobs_core`** (this crate): Pure transformation functions with zero I/O
//! - **`hibob-jobs`**: HTTP calls, configuration, CLI and the embedding server
//!   (the Imperative Shell)
//!
//! ## Functional Core Principles
//!
//! - **Pure functions**: Same input always produces the same output. The one
//!   clock-dependent computation ([`posted`]) takes `now` as a parameter.
//! - **No side effects**: No I/O, no logging, no global state.
//! - **Testable**: Everything is tested with fixture JSON, no HTTP mocking.
//!
//! # Module Organization
//!
//! - [`api`]: Request descriptions, credentials, the [`api::ApiError`] taxonomy
//!   and classification of raw `(status, body)` exchanges
//! - [`fields`]: The field normalizer for HiBob's mixed value encodings
//! - [`jobs`]: Search request bodies and the job summary/detail models
//! - [`posted`]: "Posted X ago" computation
//! - [`pagination`]: Page state, next/previous heuristics and link building
//! - [`notice`]: User-facing message classes
//! - [`render`]: View models and HTML fragments
//! - [`rich_text`]: Allowlist sanitiser for job descriptions
//!
//! # Example Usage
//!
//! ```rust,ignore
//! use hibob_jobs_core::render::{render_listing, ListingView};
//! use serde_json::json;
//!
//! let entries = vec![json!({
//!     "/jobAd/id": {"value": "42"},
//!     "/jobAd/title": {"value": "Engineer"},
//! })];
//!
//! let view = ListingView::build(&entries, 10, 0, "/careers/job", "/careers");
//! assert_eq!(view.cards[0].url, "/careers/job?job_id=42");
//!
//! let html = render_listing(&view);
//! ```

pub mod api;
pub mod fields;
pub mod jobs;
pub mod notice;
pub mod pagination;
pub mod posted;
pub mod render;
pub mod rich_text;
