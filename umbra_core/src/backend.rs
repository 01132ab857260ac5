// Copyright 2026 the Umbra Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Contract for platform mounting layers.
//!
//! Umbra stops at the instruction list. A platform integration provides the
//! following pieces:
//!
//! - **Component descriptors** for its view kinds, registered in a
//!   [`ComponentDescriptorRegistry`](crate::component::ComponentDescriptorRegistry).
//!
//! - **A layout engine** implementing
//!   [`LayoutEngine`](crate::layout::LayoutEngine).
//!
//! - **A mounter** implementing [`Mounter`] to turn each
//!   [`MountingTransaction`] into native view operations.
//!
//! # Crate boundaries
//!
//! `umbra_core` owns the data model, diffing, the commit protocol, and this
//! contract module. Integrations depend on `umbra_core` and provide platform
//! glue; application code wires them together through a
//! [`UiManager`](crate::ui_manager::UiManager).

use crate::mounting::MountingTransaction;

/// Applies committed transactions to a platform-native view tree.
///
/// Mounters are driven from the mounting thread, usually through
/// [`MountingCoordinator::drain_into`](crate::mounting::MountingCoordinator::drain_into).
///
/// # Mounting loop pseudocode
///
/// ```rust,ignore
/// fn on_main_thread_tick(surface: &SurfaceHandler, mounter: &mut NativeMounter) {
///     let Some(coordinator) = surface.mounting_coordinator() else {
///         return;
///     };
///     // Apply every pending transaction, oldest first.
///     coordinator.drain_into(mounter);
/// }
/// ```
pub trait Mounter {
    /// Applies the instructions of `transaction`, in order.
    fn apply(&mut self, transaction: &MountingTransaction);
}
