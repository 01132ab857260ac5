// Copyright 2026 the Umbra Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Renderer-wide configuration.

use crate::mounting::DifferentiatorMode;

/// Knobs shared by every surface of one [`UiManager`](crate::ui_manager::UiManager).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RendererConfig {
    /// Algorithm used to reconcile sibling lists.
    pub differentiator_mode: DifferentiatorMode,
    /// Whether commits replace stale node states with the newest committed
    /// ones unless the caller says otherwise.
    pub enable_state_reconciliation: bool,
    /// Whether the delegate is told to mount transactions synchronously.
    pub mount_synchronously: bool,
    /// Whether every transaction is checked against a stub mounted tree.
    pub introspection: bool,
}

impl RendererConfig {
    /// The default configuration.
    pub const DEFAULT: Self = Self {
        differentiator_mode: DifferentiatorMode::OptimizedMoves,
        enable_state_reconciliation: true,
        mount_synchronously: false,
        introspection: false,
    };

    /// The default configuration with introspection turned on. Doubles the
    /// work of every commit; meant for tests.
    pub const VALIDATING: Self = Self {
        introspection: true,
        ..Self::DEFAULT
    };

    /// Returns a copy using `mode`.
    #[must_use]
    pub const fn with_differentiator_mode(mut self, mode: DifferentiatorMode) -> Self {
        self.differentiator_mode = mode;
        self
    }
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}
