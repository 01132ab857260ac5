// Copyright 2026 the Umbra Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Handoff of committed instruction lists to the mounting layer.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

use crate::backend::Mounter;
use crate::node::{SharedShadowNode, SurfaceId};
use crate::trace::TransactionTelemetry;

use super::mutation::ShadowViewMutationList;
use super::stub::{StubViewTree, build_stub_view_tree_without_differentiator};

/// The instructions of one forwarded commit.
#[derive(Clone, Debug)]
pub struct MountingTransaction {
    /// Surface the transaction belongs to.
    pub surface_id: SurfaceId,
    /// Revision number of the commit that produced it.
    pub number: u64,
    /// Instructions, to be applied in order.
    pub mutations: ShadowViewMutationList,
    /// Timing of the commit.
    pub telemetry: TransactionTelemetry,
}

#[derive(Debug)]
struct Queue {
    pending: VecDeque<(MountingTransaction, SharedShadowNode)>,
    revoked: bool,
    base_revision_number: u64,
    base_root: SharedShadowNode,
    stub: Option<StubViewTree>,
}

/// Delivers transactions to the mounting layer exactly once each, in commit
/// order.
///
/// Commits push; the mounting thread pulls, either by polling
/// [`pull_transaction`](Self::pull_transaction), by blocking in
/// [`wait_for_transaction`](Self::wait_for_transaction), or by handing a
/// [`Mounter`] to [`drain_into`](Self::drain_into).
///
/// The queue is unbounded and nothing drops transactions on its own: a
/// started surface keeps queueing every forwarded commit until the mounting
/// layer pulls them or the coordinator is revoked. Consumers that attach late
/// can watch the backlog with
/// [`pending_transaction_count`](Self::pending_transaction_count).
#[derive(Debug)]
pub struct MountingCoordinator {
    surface_id: SurfaceId,
    queue: Mutex<Queue>,
    signal: Condvar,
}

impl MountingCoordinator {
    /// Creates a coordinator whose mounted tree starts as `base_root`.
    ///
    /// With `introspection`, every pushed transaction is applied to a
    /// [`StubViewTree`] and checked against the committed root.
    #[must_use]
    pub fn new(surface_id: SurfaceId, base_root: &SharedShadowNode, introspection: bool) -> Self {
        let stub = introspection.then(|| build_stub_view_tree_without_differentiator(base_root));
        Self {
            surface_id,
            queue: Mutex::new(Queue {
                pending: VecDeque::new(),
                revoked: false,
                base_revision_number: 0,
                base_root: Arc::clone(base_root),
                stub,
            }),
            signal: Condvar::new(),
        }
    }

    /// Returns the surface id.
    #[must_use]
    pub fn surface_id(&self) -> SurfaceId {
        self.surface_id
    }

    /// Queues `transaction`, whose mutations turn the previous mounted tree
    /// into `committed_root`.
    pub(crate) fn push(&self, transaction: MountingTransaction, committed_root: &SharedShadowNode) {
        let mut queue = self.queue.lock();
        if queue.revoked {
            tracing::debug!(
                surface_id = %self.surface_id,
                number = transaction.number,
                "dropping transaction for revoked coordinator"
            );
            return;
        }
        if let Some(stub) = &mut queue.stub {
            let applied = stub.mutate(&transaction.mutations);
            let expected = build_stub_view_tree_without_differentiator(committed_root);
            let consistent = applied.is_ok() && *stub == expected;
            if !consistent {
                tracing::error!(
                    surface_id = %self.surface_id,
                    number = transaction.number,
                    error = ?applied.err(),
                    "transaction does not reproduce the committed tree"
                );
                *stub = expected;
            }
            debug_assert!(
                consistent,
                "transaction {} of surface {} does not reproduce the committed tree",
                transaction.number, self.surface_id
            );
        }
        queue
            .pending
            .push_back((transaction, Arc::clone(committed_root)));
        drop(queue);
        self.signal.notify_all();
    }

    /// Takes the oldest pending transaction.
    #[must_use]
    pub fn pull_transaction(&self) -> Option<MountingTransaction> {
        let mut queue = self.queue.lock();
        let (transaction, root) = queue.pending.pop_front()?;
        queue.base_revision_number = transaction.number;
        queue.base_root = root;
        Some(transaction)
    }

    /// Blocks until a transaction is pending, the coordinator is revoked, or
    /// `timeout` passes. Returns `true` if a transaction is pending.
    pub fn wait_for_transaction(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut queue = self.queue.lock();
        while queue.pending.is_empty() && !queue.revoked {
            if self.signal.wait_until(&mut queue, deadline).timed_out() {
                break;
            }
        }
        !queue.pending.is_empty()
    }

    /// Returns `true` if a transaction is waiting to be pulled.
    #[must_use]
    pub fn has_pending_transactions(&self) -> bool {
        !self.queue.lock().pending.is_empty()
    }

    /// Returns how many transactions are waiting to be pulled.
    #[must_use]
    pub fn pending_transaction_count(&self) -> usize {
        self.queue.lock().pending.len()
    }

    /// Returns the revision number of the last pulled transaction.
    #[must_use]
    pub fn base_revision_number(&self) -> u64 {
        self.queue.lock().base_revision_number
    }

    /// Returns the root the last pulled transaction produced, or the initial
    /// root if none was pulled yet.
    #[must_use]
    pub fn base_root(&self) -> SharedShadowNode {
        Arc::clone(&self.queue.lock().base_root)
    }

    /// Drops pending transactions and ignores future ones. Wakes waiters.
    pub fn revoke(&self) {
        let mut queue = self.queue.lock();
        queue.revoked = true;
        queue.pending.clear();
        drop(queue);
        self.signal.notify_all();
    }

    /// Returns `true` once [`revoke`](Self::revoke) was called.
    #[must_use]
    pub fn is_revoked(&self) -> bool {
        self.queue.lock().revoked
    }

    /// Pulls every pending transaction and applies it to `mounter`, oldest
    /// first. Returns the number applied.
    ///
    /// The queue lock is not held while the mounter runs.
    pub fn drain_into(&self, mounter: &mut dyn Mounter) -> usize {
        let mut applied = 0;
        while let Some(transaction) = self.pull_transaction() {
            mounter.apply(&transaction);
            applied += 1;
        }
        applied
    }

    /// Returns a copy of the introspection stub, if enabled.
    #[must_use]
    pub fn stub_view_tree(&self) -> Option<StubViewTree> {
        self.queue.lock().stub.clone()
    }
}
