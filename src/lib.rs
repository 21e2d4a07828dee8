//! # Bone Atlas
//!
//! Host side of the bone detection pipeline: a SQLite-backed bone catalog,
//! its import path, and the commands that turn detector output into a chat
//! handoff. The mapping logic itself lives in `bone-atlas-core`.
//!
//! ```text
//! ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//! │  detections  │──▶│ normalize +  │──▶│  aggregate + │──▶ seed messages
//! │ (JSON / S1)  │   │   resolve    │   │  summarize   │
//! └──────────────┘   └──────┬───────┘   └──────────────┘
//!                           │
//!                    ┌──────▼───────┐
//!                    │ SqliteCatalog│
//!                    └──────────────┘
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`logging`] | tracing subscriber setup |
//! | [`db`] | Database connection |
//! | [`migrate`] | Schema migrations |
//! | [`import`] | Catalog import from JSON |
//! | [`sqlite_catalog`] | SQLite `BoneCatalog` |
//! | [`bootstrap`] | Detection-to-chat handoff |
//! | [`resolve_cmd`] | `resolve` / `normalize` commands |
//! | [`bones`] | Grouped bone listing |

pub mod bones;
pub mod bootstrap;
pub mod config;
pub mod db;
pub mod import;
pub mod logging;
pub mod migrate;
pub mod resolve_cmd;
pub mod sqlite_catalog;
