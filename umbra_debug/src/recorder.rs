// Copyright 2026 the Umbra Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Compact binary event recording and decoding.
//!
//! [`RecorderSink`] implements [`TraceSink`] and encodes events into a
//! `Vec<u8>` as fixed-size little-endian records. [`decode`] reads them back
//! as an iterator of [`RecordedEvent`].
//!
//! Mutation lists ([`on_mutations`](TraceSink::on_mutations)) store only the
//! count. [`SharedRecorder`] lets a recording be read back after the sink has
//! been handed to a [`ShadowTree`](umbra_core::mounting::ShadowTree).

use std::sync::Arc;

use parking_lot::Mutex;
use umbra_core::mounting::{CommitStatus, MutationKind, ShadowViewMutation};
use umbra_core::node::SurfaceId;
use umbra_core::time::HostTime;
use umbra_core::trace::{
    CommitBeginEvent, CommitEndEvent, CommitPhase, PhaseBeginEvent, PhaseEndEvent, TraceSink,
    TransactionTelemetry,
};

// ---------------------------------------------------------------------------
// Event type discriminants
// ---------------------------------------------------------------------------

const TAG_COMMIT_BEGIN: u8 = 1;
const TAG_PHASE_BEGIN: u8 = 2;
const TAG_PHASE_END: u8 = 3;
const TAG_COMMIT_END: u8 = 4;
const TAG_TELEMETRY: u8 = 5;
const TAG_MUTATIONS_COUNT: u8 = 6;

// ---------------------------------------------------------------------------
// RecorderSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that encodes events into a compact binary buffer.
#[derive(Debug, Default)]
pub struct RecorderSink {
    buf: Vec<u8>,
}

impl RecorderSink {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a view of the recorded bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Consumes the recorder and returns the recorded bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    // -- encoding helpers --------------------------------------------------

    fn write_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    fn write_u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_i32(&mut self, v: i32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_u64(&mut self, v: u64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_count(&mut self, n: usize) {
        #[expect(
            clippy::cast_possible_truncation,
            reason = "counts capped at u32::MAX for recording"
        )]
        self.write_u32(n.min(u32::MAX as usize) as u32);
    }

    fn write_phase(&mut self, p: CommitPhase) {
        self.write_u8(match p {
            CommitPhase::Transaction => 0,
            CommitPhase::StateReconciliation => 1,
            CommitPhase::Layout => 2,
            CommitPhase::Diff => 3,
            CommitPhase::Mount => 4,
        });
    }

    fn write_header(&mut self, tag: u8, surface_id: SurfaceId) {
        self.write_u8(tag);
        self.write_i32(surface_id.0);
    }
}

impl TraceSink for RecorderSink {
    fn on_commit_begin(&mut self, e: &CommitBeginEvent) {
        self.write_header(TAG_COMMIT_BEGIN, e.surface_id);
        self.write_u64(e.base_revision);
        self.write_u64(e.timestamp.nanos());
    }

    fn on_phase_begin(&mut self, e: &PhaseBeginEvent) {
        self.write_header(TAG_PHASE_BEGIN, e.surface_id);
        self.write_phase(e.phase);
        self.write_u64(e.timestamp.nanos());
    }

    fn on_phase_end(&mut self, e: &PhaseEndEvent) {
        self.write_header(TAG_PHASE_END, e.surface_id);
        self.write_phase(e.phase);
        self.write_u64(e.timestamp.nanos());
    }

    fn on_commit_end(&mut self, e: &CommitEndEvent) {
        self.write_header(TAG_COMMIT_END, e.surface_id);
        self.write_u8(match e.status {
            CommitStatus::Succeeded => 0,
            CommitStatus::Cancelled => 1,
        });
        self.write_u64(e.revision);
        self.write_count(e.mutation_count);
        self.write_u8(u8::from(e.forwarded));
        self.write_u64(e.timestamp.nanos());
    }

    fn on_telemetry(&mut self, surface_id: SurfaceId, revision: u64, t: &TransactionTelemetry) {
        self.write_header(TAG_TELEMETRY, surface_id);
        self.write_u64(revision);
        self.write_u64(t.commit_start.nanos());
        self.write_u64(t.commit_end.nanos());
        for phase in CommitPhase::ALL {
            let nanos = t.phase_duration(phase).as_nanos();
            self.write_u64(u64::try_from(nanos).unwrap_or(u64::MAX));
        }
        for kind in MutationKind::ALL {
            self.write_count(t.mutation_count(kind));
        }
    }

    fn on_mutations(&mut self, surface_id: SurfaceId, revision: u64, m: &[ShadowViewMutation]) {
        self.write_header(TAG_MUTATIONS_COUNT, surface_id);
        self.write_u64(revision);
        self.write_count(m.len());
    }
}

// ---------------------------------------------------------------------------
// SharedRecorder
// ---------------------------------------------------------------------------

/// A cloneable handle to a [`RecorderSink`].
///
/// Install one clone on a shadow tree and keep another to read the bytes.
#[derive(Clone, Debug, Default)]
pub struct SharedRecorder {
    inner: Arc<Mutex<RecorderSink>>,
}

impl SharedRecorder {
    /// Creates an empty shared recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the bytes recorded so far.
    #[must_use]
    pub fn bytes(&self) -> Vec<u8> {
        self.inner.lock().as_bytes().to_vec()
    }

    /// Decodes the events recorded so far.
    #[must_use]
    pub fn events(&self) -> Vec<RecordedEvent> {
        decode(self.inner.lock().as_bytes()).collect()
    }
}

impl TraceSink for SharedRecorder {
    fn on_commit_begin(&mut self, e: &CommitBeginEvent) {
        self.inner.lock().on_commit_begin(e);
    }

    fn on_phase_begin(&mut self, e: &PhaseBeginEvent) {
        self.inner.lock().on_phase_begin(e);
    }

    fn on_phase_end(&mut self, e: &PhaseEndEvent) {
        self.inner.lock().on_phase_end(e);
    }

    fn on_commit_end(&mut self, e: &CommitEndEvent) {
        self.inner.lock().on_commit_end(e);
    }

    fn on_telemetry(&mut self, surface_id: SurfaceId, revision: u64, t: &TransactionTelemetry) {
        self.inner.lock().on_telemetry(surface_id, revision, t);
    }

    fn on_mutations(&mut self, surface_id: SurfaceId, revision: u64, m: &[ShadowViewMutation]) {
        self.inner.lock().on_mutations(surface_id, revision, m);
    }
}

// ---------------------------------------------------------------------------
// Decoder
// ---------------------------------------------------------------------------

/// Telemetry as stored in a recording.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TelemetryRecord {
    /// Surface the transaction belongs to.
    pub surface_id: SurfaceId,
    /// Revision the transaction produced.
    pub revision: u64,
    /// When the commit started.
    pub commit_start: HostTime,
    /// When the commit finished diffing.
    pub commit_end: HostTime,
    /// Phase durations in nanoseconds, indexed like [`CommitPhase::ALL`].
    pub phase_nanos: [u64; 5],
    /// Instruction counts, indexed like [`MutationKind::ALL`].
    pub mutation_counts: [u32; 5],
}

/// A decoded event from a binary recording.
#[derive(Clone, Debug)]
pub enum RecordedEvent {
    /// A [`CommitBeginEvent`].
    CommitBegin(CommitBeginEvent),
    /// A [`PhaseBeginEvent`].
    PhaseBegin(PhaseBeginEvent),
    /// A [`PhaseEndEvent`].
    PhaseEnd(PhaseEndEvent),
    /// A [`CommitEndEvent`].
    CommitEnd(CommitEndEvent),
    /// Telemetry of a forwarded transaction.
    Telemetry(TelemetryRecord),
    /// Instruction count of a forwarded transaction.
    MutationsCount {
        /// Surface the transaction belongs to.
        surface_id: SurfaceId,
        /// Revision the transaction produced.
        revision: u64,
        /// Number of instructions.
        count: u32,
    },
}

/// Decodes a byte slice produced by [`RecorderSink`] into an iterator of
/// [`RecordedEvent`].
pub fn decode(bytes: &[u8]) -> DecodeIter<'_> {
    DecodeIter {
        data: bytes,
        pos: 0,
    }
}

/// Iterator over decoded events.
#[derive(Debug)]
pub struct DecodeIter<'a> {
    data: &'a [u8],
    pos: usize,
}

impl DecodeIter<'_> {
    fn take<const N: usize>(&mut self) -> Option<[u8; N]> {
        let bytes = self.data.get(self.pos..self.pos + N)?.try_into().ok()?;
        self.pos += N;
        Some(bytes)
    }

    fn read_u8(&mut self) -> Option<u8> {
        self.take::<1>().map(|[v]| v)
    }

    fn read_u32(&mut self) -> Option<u32> {
        self.take().map(u32::from_le_bytes)
    }

    fn read_i32(&mut self) -> Option<i32> {
        self.take().map(i32::from_le_bytes)
    }

    fn read_u64(&mut self) -> Option<u64> {
        self.take().map(u64::from_le_bytes)
    }

    fn read_time(&mut self) -> Option<HostTime> {
        self.read_u64().map(HostTime)
    }

    fn read_phase(&mut self) -> Option<CommitPhase> {
        Some(match self.read_u8()? {
            0 => CommitPhase::Transaction,
            1 => CommitPhase::StateReconciliation,
            2 => CommitPhase::Layout,
            3 => CommitPhase::Diff,
            _ => CommitPhase::Mount,
        })
    }

    fn decode_commit_begin(&mut self, surface_id: SurfaceId) -> Option<RecordedEvent> {
        Some(RecordedEvent::CommitBegin(CommitBeginEvent {
            surface_id,
            base_revision: self.read_u64()?,
            timestamp: self.read_time()?,
        }))
    }

    fn decode_phase_begin(&mut self, surface_id: SurfaceId) -> Option<RecordedEvent> {
        Some(RecordedEvent::PhaseBegin(PhaseBeginEvent {
            surface_id,
            phase: self.read_phase()?,
            timestamp: self.read_time()?,
        }))
    }

    fn decode_phase_end(&mut self, surface_id: SurfaceId) -> Option<RecordedEvent> {
        Some(RecordedEvent::PhaseEnd(PhaseEndEvent {
            surface_id,
            phase: self.read_phase()?,
            timestamp: self.read_time()?,
        }))
    }

    fn decode_commit_end(&mut self, surface_id: SurfaceId) -> Option<RecordedEvent> {
        Some(RecordedEvent::CommitEnd(CommitEndEvent {
            surface_id,
            status: match self.read_u8()? {
                0 => CommitStatus::Succeeded,
                _ => CommitStatus::Cancelled,
            },
            revision: self.read_u64()?,
            mutation_count: self.read_u32()? as usize,
            forwarded: self.read_u8()? != 0,
            timestamp: self.read_time()?,
        }))
    }

    fn decode_telemetry(&mut self, surface_id: SurfaceId) -> Option<RecordedEvent> {
        let revision = self.read_u64()?;
        let commit_start = self.read_time()?;
        let commit_end = self.read_time()?;
        let mut phase_nanos = [0; 5];
        for slot in &mut phase_nanos {
            *slot = self.read_u64()?;
        }
        let mut mutation_counts = [0; 5];
        for slot in &mut mutation_counts {
            *slot = self.read_u32()?;
        }
        Some(RecordedEvent::Telemetry(TelemetryRecord {
            surface_id,
            revision,
            commit_start,
            commit_end,
            phase_nanos,
            mutation_counts,
        }))
    }

    fn decode_mutations_count(&mut self, surface_id: SurfaceId) -> Option<RecordedEvent> {
        let revision = self.read_u64()?;
        let count = self.read_u32()?;
        Some(RecordedEvent::MutationsCount {
            surface_id,
            revision,
            count,
        })
    }
}

impl Iterator for DecodeIter<'_> {
    type Item = RecordedEvent;

    fn next(&mut self) -> Option<Self::Item> {
        let tag = self.read_u8()?;
        let surface_id = SurfaceId(self.read_i32()?);
        match tag {
            TAG_COMMIT_BEGIN => self.decode_commit_begin(surface_id),
            TAG_PHASE_BEGIN => self.decode_phase_begin(surface_id),
            TAG_PHASE_END => self.decode_phase_end(surface_id),
            TAG_COMMIT_END => self.decode_commit_end(surface_id),
            TAG_TELEMETRY => self.decode_telemetry(surface_id),
            TAG_MUTATIONS_COUNT => self.decode_mutations_count(surface_id),
            _ => None, // unknown tag → stop iteration
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commit_events_decode_in_order() {
        let mut rec = RecorderSink::new();
        rec.on_commit_begin(&CommitBeginEvent {
            surface_id: SurfaceId(2),
            base_revision: 9,
            timestamp: HostTime(1_000),
        });
        rec.on_phase_begin(&PhaseBeginEvent {
            surface_id: SurfaceId(2),
            phase: CommitPhase::StateReconciliation,
            timestamp: HostTime(1_100),
        });
        rec.on_phase_end(&PhaseEndEvent {
            surface_id: SurfaceId(2),
            phase: CommitPhase::StateReconciliation,
            timestamp: HostTime(1_200),
        });
        rec.on_commit_end(&CommitEndEvent {
            surface_id: SurfaceId(2),
            status: CommitStatus::Cancelled,
            revision: 9,
            mutation_count: 0,
            forwarded: false,
            timestamp: HostTime(1_300),
        });

        let events: Vec<_> = decode(rec.as_bytes()).collect();
        assert_eq!(events.len(), 4);
        match &events[0] {
            RecordedEvent::CommitBegin(e) => {
                assert_eq!(e.surface_id, SurfaceId(2));
                assert_eq!(e.base_revision, 9);
                assert_eq!(e.timestamp, HostTime(1_000));
            }
            other => panic!("expected CommitBegin, got {other:?}"),
        }
        match &events[2] {
            RecordedEvent::PhaseEnd(e) => {
                assert_eq!(e.phase, CommitPhase::StateReconciliation);
                assert_eq!(e.timestamp, HostTime(1_200));
            }
            other => panic!("expected PhaseEnd, got {other:?}"),
        }
        match &events[3] {
            RecordedEvent::CommitEnd(e) => {
                assert_eq!(e.status, CommitStatus::Cancelled);
                assert!(!e.forwarded, "cancelled commits are not forwarded");
            }
            other => panic!("expected CommitEnd, got {other:?}"),
        }
    }

    #[test]
    fn telemetry_keeps_counts_and_times() {
        let mut rec = RecorderSink::new();
        let mut telemetry = TransactionTelemetry::default();
        telemetry.commit_start = HostTime(5);
        telemetry.commit_end = HostTime(50);
        rec.on_telemetry(SurfaceId(1), 3, &telemetry);
        rec.on_mutations(SurfaceId(1), 3, &[]);

        let events: Vec<_> = decode(rec.as_bytes()).collect();
        assert_eq!(events.len(), 2);
        match &events[0] {
            RecordedEvent::Telemetry(t) => {
                assert_eq!(t.revision, 3);
                assert_eq!(t.commit_start, HostTime(5));
                assert_eq!(t.commit_end, HostTime(50));
                assert_eq!(t.phase_nanos, [0; 5]);
                assert_eq!(t.mutation_counts, [0; 5]);
            }
            other => panic!("expected Telemetry, got {other:?}"),
        }
        match &events[1] {
            RecordedEvent::MutationsCount { revision, count, .. } => {
                assert_eq!(*revision, 3);
                assert_eq!(*count, 0);
            }
            other => panic!("expected MutationsCount, got {other:?}"),
        }
    }

    #[test]
    fn truncated_recording_stops_cleanly() {
        let mut rec = RecorderSink::new();
        rec.on_commit_begin(&CommitBeginEvent {
            surface_id: SurfaceId(1),
            base_revision: 0,
            timestamp: HostTime(0),
        });
        let bytes = rec.into_bytes();
        let events: Vec<_> = decode(&bytes[..bytes.len() - 1]).collect();
        assert!(events.is_empty(), "partial records are not decoded");
    }

    #[test]
    fn shared_recorder_sees_writes_from_clones() {
        let recorder = SharedRecorder::new();
        let mut installed = recorder.clone();
        installed.on_phase_begin(&PhaseBeginEvent {
            surface_id: SurfaceId(4),
            phase: CommitPhase::Diff,
            timestamp: HostTime(10),
        });
        assert_eq!(recorder.events().len(), 1);
        assert!(!recorder.bytes().is_empty(), "bytes are shared");
    }
}
