//! # Defects Architecture
//!
//! Defects is the data layer behind a field inspection app: a user photographs
//! a physical defect, tags it with type, severity, location and the rest, and
//! the record lands in a shared store for later review.
//!
//! ## Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  HTTP Layer (http/, wired by main.rs)                       │
//! │  - Routes, JSON extraction, status codes, CORS, logging     │
//! │  - The ONLY place that knows about requests and responses   │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (api.rs)                                         │
//! │  - Thin facade owning the loaded collection and settings    │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Command Layer (commands/*.rs)                              │
//! │  - create / list / get / update business rules              │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Collection (collection.rs) + Storage Layer (store/)        │
//! │  - Ordered in-memory records, written through on mutation   │
//! │  - DataStore trait: FileStore, InMemoryStore                │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Persistence Model
//!
//! All records live in memory and in one JSON file. Every mutation rewrites
//! the whole file (atomically, via temp file and rename). Images arrive as
//! base64 data URLs, are decoded by [`image`], and are stored once under a
//! random `<uuid>.png` name that is unrelated to the defect id.
//!
//! A failed save is reported to the caller, but the in-memory change is not
//! rolled back. Image files are never deleted, so a record that fails to
//! persist can leave an orphaned image behind.
//!
//! ## Testing Strategy
//!
//! 1. **Commands**: unit tests against `InMemoryStore`, where most of the
//!    business rules are covered.
//! 2. **Store**: `FileStore` tests against temp directories.
//! 3. **HTTP**: end-to-end tests against a live server on a random port.
//!
//! ## Module Overview
//!
//! - [`api`]: The API facade
//! - [`commands`]: Business logic for each operation
//! - [`collection`]: Ordered record sequence with write-through persistence
//! - [`store`]: Storage abstraction and implementations
//! - [`image`]: Data URL decoding and image naming
//! - [`model`]: Core data types (`Defect`, `NewDefect`, `DefectPatch`)
//! - [`config`]: Configuration management
//! - [`http`]: axum router and handlers
//! - [`error`]: Error types

pub mod api;
pub mod collection;
pub mod commands;
pub mod config;
pub mod error;
pub mod http;
pub mod image;
pub mod model;
pub mod store;
