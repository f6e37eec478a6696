//! # Dosnap Architecture
//!
//! Dosnap is a cron-driven retention sweep for DigitalOcean: it snapshots
//! tagged droplets and their attached volumes, then prunes old automatic
//! snapshots beyond a retention count. The library is UI-agnostic; the binary
//! is a thin CLI wired in `main.rs`.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI Layer (main.rs, args.rs)                               │
//! │  - Parses flags, resolves env config, initializes logging   │
//! │  - The ONLY place that knows about stdout/exit codes        │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Sweep Layer (sweep.rs)                                     │
//! │  - Selector → Gate → Creator → Pruner, per droplet          │
//! │  - Pure gate/retention rules, heavily unit tested           │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Provider Layer (provider/)                                 │
//! │  - Abstract SnapshotProvider trait                          │
//! │  - DoClient (production), DryRunProvider (decorator),       │
//! │    InMemoryProvider (testing)                               │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Key Principle: No Dry-Run Conditionals in Core
//!
//! Dry-run is a provider decorator, not a flag threaded through the sweep.
//! The sweep runs identical branching logic live and dry; only whether
//! create/delete calls reach the API changes. This makes dry-run a faithful
//! simulation and keeps the core free of mode checks.
//!
//! ## Module Overview
//!
//! - [`sweep`]: the batch job — selector, gate, creator, pruner
//! - [`provider`]: provider trait and its implementations
//! - [`naming`]: snapshot naming convention and matcher predicate
//! - [`config`]: environment-sourced configuration, validated at startup
//! - [`model`]: core data types (`Droplet`, `Volume`, `Snapshot`)
//! - [`error`]: error types

pub mod config;
pub mod error;
pub mod model;
pub mod naming;
pub mod provider;
pub mod sweep;
