//! # Order Agent
//!
//! Turns a free-text request ("something spicy with pork") into a short
//! list of catalog entries and hands that list to an external ranker.
//!
//! A local language model translates the request into a comma-separated
//! keyword query. The query filters an in-memory catalog by substring
//! match, and the names that survive are passed to a ranking script which
//! prints the final presentation.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐   ┌────────────┐   ┌───────────┐   ┌──────────┐
//! │ Command  │──▶│ Translator │──▶│  Catalog  │──▶│  Ranker  │
//! │ + prefs  │   │ (model)    │   │  filter   │   │ (script) │
//! └──────────┘   └────────────┘   └───────────┘   └──────────┘
//! ```
//!
//! The pure pieces (keyword parsing, filtering, prompt composition, output
//! cleanup) live in the `order-agent-core` crate. This crate adds
//! configuration, process execution, and the pipeline that ties them
//! together.
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`catalog`] | Catalog loading (JSON file or built-in sample) |
//! | [`preferences`] | Optional user preference text |
//! | [`process`] | External process execution |
//! | [`translator`] | Command → keyword query via the model |
//! | [`ranker`] | Payload serialization and ranker hand-off |
//! | [`pipeline`] | Stage sequencing and failure attribution |
//! | [`report`] | User-facing progress output |

pub mod catalog;
pub mod config;
pub mod pipeline;
pub mod preferences;
pub mod process;
pub mod ranker;
pub mod report;
pub mod translator;
