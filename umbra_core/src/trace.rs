// Copyright 2026 the Umbra Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Instrumentation of the commit pipeline.
//!
//! This module provides a [`TraceSink`] trait with per-event methods that the
//! commit pipeline calls at each stage. All method bodies default to no-ops,
//! so implementing only the events you care about is fine.
//!
//! [`Tracer`] wraps an optional `&mut dyn TraceSink`. When the `trace` feature
//! is **off**, every `Tracer` method compiles to nothing. When **on**, each
//! method performs a single `Option` branch before dispatching.
//!
//! [`TelemetryBuilder`] collects phase timestamps during a commit and produces
//! the [`TransactionTelemetry`] attached to every mounting transaction. It is
//! always active, independent of the features.
//!
//! # Crate features
//!
//! - `trace` enables the `Tracer` method bodies.
//! - `trace-rich` (implies `trace`) additionally delivers the full mutation
//!   list of every forwarded transaction.

use core::time::Duration;

use crate::mounting::{CommitStatus, MutationKind};
#[cfg(feature = "trace-rich")]
use crate::mounting::ShadowViewMutation;
use crate::node::SurfaceId;
use crate::time::HostTime;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Which phase of a commit is being measured.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CommitPhase {
    /// Running the caller's transaction and commit hooks.
    Transaction,
    /// Replacing stale node states with newer ones.
    StateReconciliation,
    /// Running the layout engine.
    Layout,
    /// Diffing against the mounted tree.
    Diff,
    /// Handing the transaction to the mounting coordinator.
    Mount,
}

impl CommitPhase {
    /// All phases, in pipeline order.
    pub const ALL: [Self; 5] = [
        Self::Transaction,
        Self::StateReconciliation,
        Self::Layout,
        Self::Diff,
        Self::Mount,
    ];

    /// Returns a short lowercase name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Transaction => "transaction",
            Self::StateReconciliation => "state_reconciliation",
            Self::Layout => "layout",
            Self::Diff => "diff",
            Self::Mount => "mount",
        }
    }

    const fn index(self) -> usize {
        match self {
            Self::Transaction => 0,
            Self::StateReconciliation => 1,
            Self::Layout => 2,
            Self::Diff => 3,
            Self::Mount => 4,
        }
    }
}

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Emitted when a commit acquires the commit lock.
#[derive(Clone, Copy, Debug)]
pub struct CommitBeginEvent {
    /// Surface being committed.
    pub surface_id: SurfaceId,
    /// Revision number the commit starts from.
    pub base_revision: u64,
    /// Host time at the start of the commit.
    pub timestamp: HostTime,
}

/// Marks the beginning of a commit phase.
#[derive(Clone, Copy, Debug)]
pub struct PhaseBeginEvent {
    /// Surface being committed.
    pub surface_id: SurfaceId,
    /// Which phase is starting.
    pub phase: CommitPhase,
    /// Host time at the start of the phase.
    pub timestamp: HostTime,
}

/// Marks the end of a commit phase.
#[derive(Clone, Copy, Debug)]
pub struct PhaseEndEvent {
    /// Surface being committed.
    pub surface_id: SurfaceId,
    /// Which phase is ending.
    pub phase: CommitPhase,
    /// Host time at the end of the phase.
    pub timestamp: HostTime,
}

/// Emitted when a commit finishes, successfully or not.
#[derive(Clone, Copy, Debug)]
pub struct CommitEndEvent {
    /// Surface being committed.
    pub surface_id: SurfaceId,
    /// Outcome of the commit.
    pub status: CommitStatus,
    /// Revision number after the commit.
    pub revision: u64,
    /// Number of instructions forwarded to mounting (0 if suspended).
    pub mutation_count: usize,
    /// Whether a transaction was forwarded to the mounting coordinator.
    pub forwarded: bool,
    /// Host time at the end of the commit.
    pub timestamp: HostTime,
}

/// Timing and size of one mounting transaction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TransactionTelemetry {
    /// When the commit acquired the commit lock.
    pub commit_start: HostTime,
    /// When the commit finished diffing.
    pub commit_end: HostTime,
    phase_durations: [Duration; 5],
    mutation_counts: [usize; 5],
}

impl TransactionTelemetry {
    /// Returns the duration of `phase` (zero if it did not run).
    #[must_use]
    pub fn phase_duration(&self, phase: CommitPhase) -> Duration {
        self.phase_durations[phase.index()]
    }

    /// Returns the number of instructions of `kind`.
    #[must_use]
    pub fn mutation_count(&self, kind: MutationKind) -> usize {
        self.mutation_counts[kind.index()]
    }

    /// Returns the total number of instructions.
    #[must_use]
    pub fn total_mutations(&self) -> usize {
        self.mutation_counts.iter().sum()
    }

    /// Returns the time from commit start to commit end.
    #[must_use]
    pub fn commit_duration(&self) -> Duration {
        self.commit_end.saturating_duration_since(self.commit_start)
    }
}

// ---------------------------------------------------------------------------
// TraceSink trait
// ---------------------------------------------------------------------------

/// Receives trace events from the commit pipeline.
///
/// All methods have default no-op implementations, so you only need to
/// override the events you care about.
pub trait TraceSink {
    /// Called when a commit starts.
    fn on_commit_begin(&mut self, e: &CommitBeginEvent) {
        _ = e;
    }

    /// Called at the beginning of a commit phase.
    fn on_phase_begin(&mut self, e: &PhaseBeginEvent) {
        _ = e;
    }

    /// Called at the end of a commit phase.
    fn on_phase_end(&mut self, e: &PhaseEndEvent) {
        _ = e;
    }

    /// Called when a commit ends.
    fn on_commit_end(&mut self, e: &CommitEndEvent) {
        _ = e;
    }

    /// Called with the telemetry of every forwarded transaction.
    fn on_telemetry(&mut self, surface_id: SurfaceId, revision: u64, t: &TransactionTelemetry) {
        _ = (surface_id, revision, t);
    }

    /// Called with the instructions of every forwarded transaction (requires
    /// `trace-rich` feature).
    #[cfg(feature = "trace-rich")]
    fn on_mutations(&mut self, surface_id: SurfaceId, revision: u64, m: &[ShadowViewMutation]) {
        _ = (surface_id, revision, m);
    }
}

// ---------------------------------------------------------------------------
// NoopSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

// ---------------------------------------------------------------------------
// Tracer wrapper
// ---------------------------------------------------------------------------

/// Thin wrapper around an optional [`TraceSink`].
///
/// When the `trace` feature is **off**, every method compiles to nothing. When
/// **on**, each method checks the inner `Option` (one branch) before
/// dispatching to the sink.
pub struct Tracer<'a> {
    #[cfg(feature = "trace")]
    sink: Option<&'a mut dyn TraceSink>,
    #[cfg(not(feature = "trace"))]
    _marker: core::marker::PhantomData<&'a mut dyn TraceSink>,
}

impl core::fmt::Debug for Tracer<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer").finish_non_exhaustive()
    }
}

impl<'a> Tracer<'a> {
    /// Creates a tracer that dispatches to the given sink.
    #[inline]
    #[must_use]
    pub fn new(sink: &'a mut dyn TraceSink) -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: Some(sink) }
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = sink;
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Creates a tracer that discards all events.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: None }
        }
        #[cfg(not(feature = "trace"))]
        {
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Emits a [`CommitBeginEvent`].
    #[inline]
    pub fn commit_begin(&mut self, e: &CommitBeginEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_commit_begin(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`PhaseBeginEvent`].
    #[inline]
    pub fn phase_begin(&mut self, e: &PhaseBeginEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_phase_begin(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`PhaseEndEvent`].
    #[inline]
    pub fn phase_end(&mut self, e: &PhaseEndEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_phase_end(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`CommitEndEvent`].
    #[inline]
    pub fn commit_end(&mut self, e: &CommitEndEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_commit_end(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits transaction telemetry.
    #[inline]
    pub fn telemetry(&mut self, surface_id: SurfaceId, revision: u64, t: &TransactionTelemetry) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_telemetry(surface_id, revision, t);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = (surface_id, revision, t);
        }
    }

    /// Emits the instructions of a transaction (requires `trace-rich`
    /// feature).
    #[cfg(feature = "trace-rich")]
    #[inline]
    pub fn mutations(&mut self, surface_id: SurfaceId, revision: u64, m: &[ShadowViewMutation]) {
        if let Some(s) = &mut self.sink {
            s.on_mutations(surface_id, revision, m);
        }
    }
}

// ---------------------------------------------------------------------------
// TelemetryBuilder
// ---------------------------------------------------------------------------

/// Collects phase timestamps during a commit and produces a
/// [`TransactionTelemetry`].
#[derive(Debug)]
pub struct TelemetryBuilder {
    commit_start: HostTime,
    phase_starts: [Option<HostTime>; 5],
    phase_ends: [Option<HostTime>; 5],
}

impl TelemetryBuilder {
    /// Starts building telemetry for a commit that started at `commit_start`.
    #[must_use]
    pub fn new(commit_start: HostTime) -> Self {
        Self {
            commit_start,
            phase_starts: [None; 5],
            phase_ends: [None; 5],
        }
    }

    /// Records the start of a phase.
    pub fn phase_begin(&mut self, phase: CommitPhase, t: HostTime) {
        self.phase_starts[phase.index()] = Some(t);
    }

    /// Records the end of a phase.
    pub fn phase_end(&mut self, phase: CommitPhase, t: HostTime) {
        self.phase_ends[phase.index()] = Some(t);
    }

    /// Consumes the builder and produces the final telemetry.
    #[must_use]
    pub fn finish(self, commit_end: HostTime, mutation_counts: [usize; 5]) -> TransactionTelemetry {
        let mut phase_durations = [Duration::ZERO; 5];
        for phase in CommitPhase::ALL {
            let idx = phase.index();
            if let (Some(start), Some(end)) = (self.phase_starts[idx], self.phase_ends[idx]) {
                phase_durations[idx] = end.saturating_duration_since(start);
            }
        }
        TransactionTelemetry {
            commit_start: self.commit_start,
            commit_end,
            phase_durations,
            mutation_counts,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
