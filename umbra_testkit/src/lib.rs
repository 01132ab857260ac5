// Copyright 2026 the Umbra Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Test support for umbra.
//!
//! - [`TreeBuilder`] turns declarative [`Element`] descriptions into shadow
//!   nodes, reusing one family per tag so successive builds are versions of
//!   the same logical nodes.
//! - [`StubLayoutEngine`] positions views absolutely from their `left`,
//!   `top`, `width` and `height` props.
//! - [`RecordingMounter`] records every transaction and replays it onto a
//!   validating [`StubViewTree`](umbra_core::mounting::StubViewTree).
//! - [`random`] generates and edits trees from a seeded RNG.

mod builder;
mod layout;
mod mounter;
pub mod random;

pub use builder::{Element, TreeBuilder};
pub use layout::StubLayoutEngine;
pub use mounter::RecordingMounter;
