// Copyright 2026 the Umbra Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Shadow-tree reconciliation and transactional commits for UI surfaces.
//!
//! `umbra_core` keeps an immutable, persistent tree of [shadow nodes] per
//! surface, commits new versions of it under a lock, and turns every commit
//! into an ordered list of view instructions for a platform mounting layer.
//!
//! # Architecture
//!
//! ```text
//!   UiManager::create_node / clone_node ──► ShadowNode trees
//!                                                │
//!   SurfaceHandler::constraint_layout            ▼
//!   UiManager::complete_surface ──────► ShadowTree::commit()
//!   UiManager::update_state                      │
//!                       hooks ─► reconcile state ─► layout ─► seal
//!                                                │
//!                                                ▼
//!                         calculate_shadow_view_mutations(mounted, new)
//!                                                │
//!                                                ▼
//!   MountingCoordinator ◄──── MountingTransaction (CommitMode::Normal)
//!          │
//!          ▼
//!   Mounter::apply() on the mounting thread
//! ```
//!
//! **[`node`]**: The persistent data model. Nodes are immutable once sealed;
//! a new version shares every untouched subtree with its source. Versions of
//! the same logical node share a family, which also carries native state.
//!
//! **[`layout`]**: Layout metrics and constraints, and the
//! [`LayoutEngine`](layout::LayoutEngine) trait commits run before diffing.
//!
//! **[`component`]**: Component descriptors create and clone nodes and parse
//! props. The root and view kinds are built in.
//!
//! **[`mounting`]**: Slicing, the differentiator, the commit protocol of
//! [`ShadowTree`](mounting::ShadowTree), and the
//! [`MountingCoordinator`](mounting::MountingCoordinator) handoff.
//!
//! **[`surface`]**: The [`SurfaceHandler`](surface::SurfaceHandler) state
//! machine and display modes.
//!
//! **[`ui_manager`]**: Node creation, the registry of running surfaces, and
//! commit and mount hooks.
//!
//! **[`backend`]**: The [`Mounter`](backend::Mounter) trait platform
//! mounting layers implement.
//!
//! **[`trace`]**: [`TraceSink`](trace::TraceSink) trait and event types for
//! commit instrumentation, with a zero-overhead [`Tracer`](trace::Tracer)
//! wrapper, and per-transaction telemetry.
//!
//! Independently of trace sinks, the crate logs through `tracing`: commit
//! lifecycle at `debug`, differentiator statistics at `trace`, surface start
//! and stop at `info`, and contract violations at `warn`.
//!
//! # Crate features
//!
//! - `trace` (disabled by default): Enables `Tracer` method bodies (one branch
//!   per call site).
//! - `trace-rich` (disabled by default, implies `trace`): Delivers the full
//!   mutation list of every forwarded transaction to trace sinks.
//!
//! [shadow nodes]: node::ShadowNode

#![cfg_attr(docsrs, feature(doc_auto_cfg))]

pub mod backend;
pub mod component;
pub mod config;
pub mod error;
pub mod layout;
pub mod mounting;
pub mod node;
pub mod surface;
pub mod time;
pub mod trace;
pub mod ui_manager;
