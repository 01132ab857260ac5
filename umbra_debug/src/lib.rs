// Copyright 2026 the Umbra Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Recording, pretty-printing, and Chrome trace export for umbra
//! diagnostics.
//!
//! This crate provides [`TraceSink`](umbra_core::trace::TraceSink)
//! implementations for development and post-mortem analysis:
//!
//! - [`pretty::PrettyPrintSink`]: human-readable one-line-per-event output.
//! - [`recorder::RecorderSink`]: compact binary recording with
//!   [`recorder::decode`] for playback.
//! - [`chrome::export`]: writes Chrome Trace Event Format JSON from recorded
//!   bytes.
//!
//! [`json::mutations_to_json`] dumps instruction lists for inspection.

pub mod chrome;
pub mod json;
pub mod pretty;
pub mod recorder;
