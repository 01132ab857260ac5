// Copyright 2026 the Umbra Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The commit protocol of one surface.
//!
//! A [`ShadowTree`] owns the current [`ShadowTreeRevision`] of a surface and
//! serializes every change to it. A commit runs entirely under the commit
//! lock:
//!
//! ```text
//!  transaction ─► will_commit hook ─► state reconciliation ─► layout
//!       │                                                        │
//!       └── None: Cancelled                              seal + diff
//!                                                                │
//!                        current revision ◄─ swap ◄──────────────┘
//!                                              │
//!                               CommitMode::Normal: push transaction
//! ```
//!
//! Readers of the current revision take a separate read lock and never wait
//! for a whole commit.

use core::cell::RefCell;
use std::sync::Arc;

use parking_lot::{Mutex, ReentrantMutex, RwLock};

use crate::component::{RootComponentDescriptor, RootProps};
use crate::config::RendererConfig;
use crate::layout::{LayoutConstraints, LayoutContext, LayoutEngine};
use crate::node::{ShadowNode, ShadowNodeFragment, SharedShadowNode, SurfaceId};
use crate::time::HostTime;
use crate::trace::{
    CommitBeginEvent, CommitEndEvent, CommitPhase, PhaseBeginEvent, PhaseEndEvent,
    TelemetryBuilder, TraceSink, Tracer, TransactionTelemetry,
};

use super::coordinator::{MountingCoordinator, MountingTransaction};
use super::differentiator::calculate_shadow_view_mutations_with_mode;
use super::mutation::count_by_kind;
use super::reconcile::{commit_states, progress_state};

/// Whether commits are forwarded to the mounting coordinator.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum CommitMode {
    /// Every commit is diffed against the mounted tree and forwarded.
    #[default]
    Normal,
    /// Commits update the current revision only. The mounted tree stays
    /// where it was.
    Suspended,
}

/// Outcome of [`ShadowTree::commit`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CommitStatus {
    /// A new revision became current.
    Succeeded,
    /// Nothing changed: the transaction or a commit hook declined, or the
    /// commit was reentrant.
    Cancelled,
}

/// Per-commit switches.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CommitOptions {
    /// Replace stale states with their family's most recent ones.
    pub enable_state_reconciliation: bool,
    /// Passed through to
    /// [`ShadowTreeDelegate::shadow_tree_did_finish_transaction`].
    pub mount_synchronously: bool,
}

impl Default for CommitOptions {
    fn default() -> Self {
        Self::from(&RendererConfig::DEFAULT)
    }
}

impl From<&RendererConfig> for CommitOptions {
    fn from(config: &RendererConfig) -> Self {
        Self {
            enable_state_reconciliation: config.enable_state_reconciliation,
            mount_synchronously: config.mount_synchronously,
        }
    }
}

/// One committed state of a surface.
#[derive(Clone, Debug)]
pub struct ShadowTreeRevision {
    /// The sealed root.
    pub root: SharedShadowNode,
    /// Sequential revision number; the initial empty root is `0`.
    pub number: u64,
    /// Timing of the commit that produced this revision.
    pub telemetry: TransactionTelemetry,
}

/// Hooks a [`ShadowTree`] calls around commits.
pub trait ShadowTreeDelegate: Send + Sync {
    /// Runs after the transaction, before layout. Returns the root to commit,
    /// possibly rewritten, or `None` to cancel.
    fn shadow_tree_will_commit(
        &self,
        tree: &ShadowTree,
        old_root: &ShadowNode,
        new_root: ShadowNode,
    ) -> Option<ShadowNode> {
        _ = (tree, old_root);
        Some(new_root)
    }

    /// Runs after a transaction was pushed to `coordinator`, outside the
    /// commit lock.
    fn shadow_tree_did_finish_transaction(
        &self,
        coordinator: &Arc<MountingCoordinator>,
        mount_synchronously: bool,
    ) {
        _ = (coordinator, mount_synchronously);
    }
}

#[derive(Debug)]
struct CommitSlot {
    in_commit: bool,
    mounted_root: SharedShadowNode,
    commit_mode: CommitMode,
}

/// Clears `in_commit` when the commit ends, including by unwinding.
struct InCommit<'a>(&'a RefCell<CommitSlot>);

impl Drop for InCommit<'_> {
    fn drop(&mut self) {
        self.0.borrow_mut().in_commit = false;
    }
}

/// Timestamps phases into the telemetry and the tracer together.
///
/// Once the telemetry is finished, phases are only traced.
struct PhaseClock<'a> {
    surface_id: SurfaceId,
    tracer: Tracer<'a>,
    telemetry: Option<TelemetryBuilder>,
}

impl PhaseClock<'_> {
    fn commit_begin(&mut self, base_revision: u64, timestamp: HostTime) {
        self.tracer.commit_begin(&CommitBeginEvent {
            surface_id: self.surface_id,
            base_revision,
            timestamp,
        });
    }

    fn begin(&mut self, phase: CommitPhase) {
        self.begin_at(phase, HostTime::now());
    }

    fn end(&mut self, phase: CommitPhase) {
        self.end_at(phase, HostTime::now());
    }

    fn begin_at(&mut self, phase: CommitPhase, timestamp: HostTime) {
        if let Some(telemetry) = &mut self.telemetry {
            telemetry.phase_begin(phase, timestamp);
        }
        self.tracer.phase_begin(&PhaseBeginEvent {
            surface_id: self.surface_id,
            phase,
            timestamp,
        });
    }

    fn end_at(&mut self, phase: CommitPhase, timestamp: HostTime) {
        if let Some(telemetry) = &mut self.telemetry {
            telemetry.phase_end(phase, timestamp);
        }
        self.tracer.phase_end(&PhaseEndEvent {
            surface_id: self.surface_id,
            phase,
            timestamp,
        });
    }

    fn finish_telemetry(&mut self, mutation_counts: [usize; 5]) -> TransactionTelemetry {
        self.telemetry
            .take()
            .map(|telemetry| telemetry.finish(HostTime::now(), mutation_counts))
            .unwrap_or_default()
    }

    fn commit_end(&mut self, status: CommitStatus, revision: u64, mutation_count: usize, forwarded: bool) {
        self.tracer.commit_end(&CommitEndEvent {
            surface_id: self.surface_id,
            status,
            revision,
            mutation_count,
            forwarded,
            timestamp: HostTime::now(),
        });
    }
}

/// The committed tree of one surface.
pub struct ShadowTree {
    surface_id: SurfaceId,
    config: RendererConfig,
    layout_engine: Option<Arc<dyn LayoutEngine>>,
    delegate: Option<Arc<dyn ShadowTreeDelegate>>,
    commit_lock: ReentrantMutex<RefCell<CommitSlot>>,
    current: RwLock<ShadowTreeRevision>,
    coordinator: Arc<MountingCoordinator>,
    trace_sink: Mutex<Option<Box<dyn TraceSink + Send>>>,
}

impl ShadowTree {
    /// Creates a tree whose revision `0` is an empty, unlaid root.
    #[must_use]
    pub fn new(
        surface_id: SurfaceId,
        layout_constraints: LayoutConstraints,
        layout_context: LayoutContext,
        config: RendererConfig,
    ) -> Self {
        let root = RootComponentDescriptor.create_root(surface_id, layout_constraints, layout_context);
        root.seal_recursive();
        let root = Arc::new(root);
        let coordinator = Arc::new(MountingCoordinator::new(
            surface_id,
            &root,
            config.introspection,
        ));
        Self {
            surface_id,
            config,
            layout_engine: None,
            delegate: None,
            commit_lock: ReentrantMutex::new(RefCell::new(CommitSlot {
                in_commit: false,
                mounted_root: Arc::clone(&root),
                commit_mode: CommitMode::Normal,
            })),
            current: RwLock::new(ShadowTreeRevision {
                root,
                number: 0,
                telemetry: TransactionTelemetry::default(),
            }),
            coordinator,
            trace_sink: Mutex::new(None),
        }
    }

    /// Lays out every committed root with `engine`.
    #[must_use]
    pub fn with_layout_engine(mut self, engine: Arc<dyn LayoutEngine>) -> Self {
        self.layout_engine = Some(engine);
        self
    }

    /// Calls `delegate` around every commit.
    #[must_use]
    pub fn with_delegate(mut self, delegate: Arc<dyn ShadowTreeDelegate>) -> Self {
        self.delegate = Some(delegate);
        self
    }

    /// Returns the surface id.
    #[must_use]
    pub fn surface_id(&self) -> SurfaceId {
        self.surface_id
    }

    /// Returns the configuration the tree was created with.
    #[must_use]
    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    /// Returns the layout engine, if any.
    #[must_use]
    pub fn layout_engine(&self) -> Option<&Arc<dyn LayoutEngine>> {
        self.layout_engine.as_ref()
    }

    /// Returns the coordinator that receives forwarded transactions.
    #[must_use]
    pub fn mounting_coordinator(&self) -> &Arc<MountingCoordinator> {
        &self.coordinator
    }

    /// Returns a snapshot of the current revision.
    #[must_use]
    pub fn current_revision(&self) -> ShadowTreeRevision {
        self.current.read().clone()
    }

    /// Installs or removes the sink receiving commit trace events.
    ///
    /// May be called from a transaction or a will-commit hook; the sink in
    /// place once they return receives the events of that commit.
    pub fn set_trace_sink(&self, sink: Option<Box<dyn TraceSink + Send>>) {
        *self.trace_sink.lock() = sink;
    }

    /// Removes and returns the trace sink.
    pub fn take_trace_sink(&self) -> Option<Box<dyn TraceSink + Send>> {
        self.trace_sink.lock().take()
    }

    /// Returns the commit mode.
    #[must_use]
    pub fn commit_mode(&self) -> CommitMode {
        self.commit_lock.lock().borrow().commit_mode
    }

    /// Sets the commit mode. Applies to the next commit.
    ///
    /// Switching back to [`CommitMode::Normal`] does not forward the commits
    /// made while suspended; the next commit is diffed against the last
    /// forwarded root.
    pub fn set_commit_mode(&self, mode: CommitMode) {
        let guard = self.commit_lock.lock();
        let previous = core::mem::replace(&mut guard.borrow_mut().commit_mode, mode);
        if previous != mode {
            tracing::debug!(surface_id = %self.surface_id, ?mode, "commit mode changed");
        }
    }

    /// Commits the root produced by `transaction` from the current root.
    ///
    /// `transaction` returning `None` cancels the commit. Commits from any
    /// number of threads are serialized; a commit started from inside another
    /// commit of the same tree is a contract violation and is cancelled.
    pub fn commit(
        &self,
        transaction: impl FnOnce(&ShadowNode) -> Option<ShadowNode>,
        options: CommitOptions,
    ) -> CommitStatus {
        let guard = self.commit_lock.lock();
        let reentrant = core::mem::replace(&mut guard.borrow_mut().in_commit, true);
        if reentrant {
            tracing::warn!(surface_id = %self.surface_id, "reentrant commit cancelled");
            debug_assert!(!reentrant, "reentrant commit on surface {}", self.surface_id);
            return CommitStatus::Cancelled;
        }
        let in_commit = InCommit(&guard);
        let forwarded = self.commit_locked(in_commit.0, transaction, options);
        drop(in_commit);
        drop(guard);

        match forwarded {
            None => CommitStatus::Cancelled,
            Some(forwarded) => {
                if forwarded && let Some(delegate) = &self.delegate {
                    delegate.shadow_tree_did_finish_transaction(
                        &self.coordinator,
                        options.mount_synchronously,
                    );
                }
                CommitStatus::Succeeded
            }
        }
    }

    /// Commits a root without children, unmounting every view.
    pub fn commit_empty_tree(&self) -> CommitStatus {
        self.commit(
            |root| Some(root.clone_with(ShadowNodeFragment::children(Vec::new()))),
            CommitOptions::from(&self.config),
        )
    }

    /// Runs one commit with the lock held. Returns `None` if cancelled,
    /// otherwise whether a transaction was forwarded.
    fn commit_locked(
        &self,
        slot: &RefCell<CommitSlot>,
        transaction: impl FnOnce(&ShadowNode) -> Option<ShadowNode>,
        options: CommitOptions,
    ) -> Option<bool> {
        let (old_root, base_number) = {
            let current = self.current.read();
            (Arc::clone(&current.root), current.number)
        };

        // The transaction and the will-commit hook run before the sink lock is
        // taken, so they may install or take the sink.
        let commit_start = HostTime::now();
        let new_root = transaction(&old_root).and_then(|new_root| match &self.delegate {
            Some(delegate) => delegate.shadow_tree_will_commit(self, &old_root, new_root),
            None => Some(new_root),
        });
        let transaction_end = HostTime::now();

        let mut sink = self.trace_sink.lock();
        let mut clock = PhaseClock {
            surface_id: self.surface_id,
            tracer: sink
                .as_deref_mut()
                .map_or_else(Tracer::none, |sink| Tracer::new(sink)),
            telemetry: Some(TelemetryBuilder::new(commit_start)),
        };
        clock.commit_begin(base_number, commit_start);
        clock.begin_at(CommitPhase::Transaction, commit_start);
        clock.end_at(CommitPhase::Transaction, transaction_end);
        let Some(mut new_root) = new_root else {
            clock.commit_end(CommitStatus::Cancelled, base_number, 0, false);
            tracing::debug!(surface_id = %self.surface_id, base_number, "commit cancelled");
            return None;
        };
        debug_assert!(
            new_root.same_family(&old_root),
            "committed root of surface {} is not a version of the surface root",
            self.surface_id
        );

        if options.enable_state_reconciliation {
            clock.begin(CommitPhase::StateReconciliation);
            if let Some(progressed) = progress_state(&new_root, Some(&old_root)) {
                new_root = progressed;
            }
            clock.end(CommitPhase::StateReconciliation);
        }

        clock.begin(CommitPhase::Layout);
        if let Some(engine) = &self.layout_engine {
            let props = RootProps::of(&new_root).copied().unwrap_or_default();
            engine.layout_if_needed(&mut new_root, &props.layout_constraints, &props.layout_context);
        }
        clock.end(CommitPhase::Layout);

        new_root.seal_recursive();
        let new_root = Arc::new(new_root);
        let number = base_number + 1;

        let mut slot = slot.borrow_mut();
        let forwarded = slot.commit_mode == CommitMode::Normal;
        let mutations = if forwarded {
            clock.begin(CommitPhase::Diff);
            let mutations = calculate_shadow_view_mutations_with_mode(
                self.config.differentiator_mode,
                &slot.mounted_root,
                &new_root,
            );
            clock.end(CommitPhase::Diff);
            mutations
        } else {
            Vec::new()
        };
        let telemetry = clock.finish_telemetry(count_by_kind(&mutations));

        clock.begin(CommitPhase::Mount);
        *self.current.write() = ShadowTreeRevision {
            root: Arc::clone(&new_root),
            number,
            telemetry,
        };
        commit_states(&new_root, Some(&old_root));
        let mutation_count = mutations.len();
        if forwarded {
            slot.mounted_root = Arc::clone(&new_root);
            clock.tracer.telemetry(self.surface_id, number, &telemetry);
            #[cfg(feature = "trace-rich")]
            clock.tracer.mutations(self.surface_id, number, &mutations);
            self.coordinator.push(
                MountingTransaction {
                    surface_id: self.surface_id,
                    number,
                    mutations,
                    telemetry,
                },
                &new_root,
            );
        }
        clock.end(CommitPhase::Mount);
        clock.commit_end(CommitStatus::Succeeded, number, mutation_count, forwarded);

        tracing::debug!(
            surface_id = %self.surface_id,
            revision = number,
            mutation_count,
            forwarded,
            "committed"
        );
        Some(forwarded)
    }
}

impl core::fmt::Debug for ShadowTree {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ShadowTree")
            .field("surface_id", &self.surface_id)
            .field("revision", &self.current.read().number)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mounting::{MutationKind, ShadowViewMutation};
    use crate::node::tests::plain_node;

    fn tree() -> ShadowTree {
        ShadowTree::new(
            SurfaceId(1),
            LayoutConstraints::default(),
            LayoutContext::default(),
            RendererConfig::VALIDATING,
        )
    }

    fn append(tag: i32) -> impl FnOnce(&ShadowNode) -> Option<ShadowNode> {
        move |root| {
            let mut children = root.children().to_vec();
            children.push(Arc::new(plain_node(tag)));
            Some(root.clone_with(ShadowNodeFragment::children(children)))
        }
    }

    #[test]
    fn commit_advances_revision_and_forwards() {
        let tree = tree();
        assert_eq!(tree.commit(append(10), CommitOptions::default()), CommitStatus::Succeeded);
        let revision = tree.current_revision();
        assert_eq!(revision.number, 1);
        assert!(revision.root.is_sealed());

        let transaction = tree
            .mounting_coordinator()
            .pull_transaction()
            .expect("forwarded");
        assert_eq!(transaction.number, 1);
        let kinds: Vec<_> = transaction.mutations.iter().map(ShadowViewMutation::kind).collect();
        assert_eq!(kinds, [MutationKind::Create, MutationKind::Insert]);
        assert_eq!(transaction.telemetry.total_mutations(), 2);
        assert_eq!(
            transaction.telemetry.phase_duration(CommitPhase::Mount),
            core::time::Duration::ZERO,
            "mounting is traced but not timed"
        );
    }

    #[test]
    fn declined_transaction_cancels() {
        let tree = tree();
        assert_eq!(tree.commit(|_| None, CommitOptions::default()), CommitStatus::Cancelled);
        assert_eq!(tree.current_revision().number, 0);
        assert!(!tree.mounting_coordinator().has_pending_transactions());
    }

    #[test]
    fn suspended_commits_are_not_forwarded() {
        let tree = tree();
        tree.set_commit_mode(CommitMode::Suspended);
        assert_eq!(tree.commit(append(10), CommitOptions::default()), CommitStatus::Succeeded);
        assert_eq!(tree.current_revision().number, 1);
        assert!(!tree.mounting_coordinator().has_pending_transactions());

        tree.set_commit_mode(CommitMode::Normal);
        assert_eq!(tree.commit_mode(), CommitMode::Normal);
        assert_eq!(tree.commit(append(11), CommitOptions::default()), CommitStatus::Succeeded);
        let transaction = tree
            .mounting_coordinator()
            .pull_transaction()
            .expect("forwarded");
        assert_eq!(transaction.number, 2);
        // Both children are new to the mounted tree.
        assert_eq!(transaction.mutations.len(), 4);
    }

    #[test]
    fn empty_tree_unmounts_everything() {
        let tree = tree();
        tree.commit(append(10), CommitOptions::default());
        tree.commit(append(11), CommitOptions::default());
        assert_eq!(tree.commit_empty_tree(), CommitStatus::Succeeded);
        assert!(tree.current_revision().root.children().is_empty());
        let stub = tree
            .mounting_coordinator()
            .stub_view_tree()
            .expect("introspection on");
        assert_eq!(stub.len(), 1);
    }

    #[test]
    fn transaction_can_swap_the_trace_sink() {
        struct Quiet;
        impl TraceSink for Quiet {}

        let tree = tree();
        tree.set_trace_sink(Some(Box::new(Quiet)));
        let mut taken = None;
        let status = tree.commit(
            |root| {
                taken = tree.take_trace_sink();
                tree.set_trace_sink(Some(Box::new(Quiet)));
                Some(root.clone_with(ShadowNodeFragment::default()))
            },
            CommitOptions::default(),
        );
        assert_eq!(status, CommitStatus::Succeeded);
        assert!(taken.is_some());
        assert!(tree.take_trace_sink().is_some());
        assert_eq!(tree.current_revision().number, 1);
    }

    #[test]
    #[should_panic(expected = "reentrant commit")]
    fn reentrant_commit_panics_in_debug() {
        let tree = tree();
        tree.commit(
            |root| {
                tree.commit(append(20), CommitOptions::default());
                Some(root.clone_with(ShadowNodeFragment::default()))
            },
            CommitOptions::default(),
        );
    }
}
