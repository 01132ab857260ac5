// Copyright 2026 the Umbra Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`TraceSink`] and writes one line per event
//! to a [`Write`](std::io::Write) destination (default: stderr). Timestamps
//! and durations are printed in microseconds.

use core::time::Duration;
use std::io::Write;

use umbra_core::mounting::{MutationKind, ShadowViewMutation};
use umbra_core::node::SurfaceId;
use umbra_core::time::HostTime;
use umbra_core::trace::{
    CommitBeginEvent, CommitEndEvent, CommitPhase, PhaseBeginEvent, PhaseEndEvent, TraceSink,
    TransactionTelemetry,
};

/// Writes human-readable trace lines to a [`Write`](std::io::Write) destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write + Send>> {
    writer: W,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink").finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self {
            writer: Box::new(std::io::stderr()),
        }
    }

    /// Creates a sink that writes to a boxed writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write + Send>) -> Self {
        Self { writer }
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W) -> Self {
        Self { writer }
    }

    /// Consumes the sink and returns its writer.
    #[must_use]
    pub fn into_writer(self) -> W {
        self.writer
    }
}

fn host_us(t: HostTime) -> f64 {
    t.nanos() as f64 / 1000.0
}

fn duration_us(d: Duration) -> f64 {
    d.as_nanos() as f64 / 1000.0
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_commit_begin(&mut self, e: &CommitBeginEvent) {
        let _ = writeln!(
            self.writer,
            "[commit:begin] surface={} base={} at {:.1}µs",
            e.surface_id.0,
            e.base_revision,
            host_us(e.timestamp),
        );
    }

    fn on_phase_begin(&mut self, e: &PhaseBeginEvent) {
        let _ = writeln!(
            self.writer,
            "[phase:begin] surface={} {} at {:.1}µs",
            e.surface_id.0,
            e.phase.name(),
            host_us(e.timestamp),
        );
    }

    fn on_phase_end(&mut self, e: &PhaseEndEvent) {
        let _ = writeln!(
            self.writer,
            "[phase:end] surface={} {} at {:.1}µs",
            e.surface_id.0,
            e.phase.name(),
            host_us(e.timestamp),
        );
    }

    fn on_commit_end(&mut self, e: &CommitEndEvent) {
        let _ = writeln!(
            self.writer,
            "[commit:end] surface={} status={:?} revision={} mutations={} forwarded={} at {:.1}µs",
            e.surface_id.0,
            e.status,
            e.revision,
            e.mutation_count,
            e.forwarded,
            host_us(e.timestamp),
        );
    }

    fn on_telemetry(&mut self, surface_id: SurfaceId, revision: u64, t: &TransactionTelemetry) {
        let _ = write!(
            self.writer,
            "[telemetry] surface={} revision={} total={:.1}µs",
            surface_id.0,
            revision,
            duration_us(t.commit_duration()),
        );
        for phase in CommitPhase::ALL {
            let _ = write!(
                self.writer,
                " {}={:.1}µs",
                phase.name(),
                duration_us(t.phase_duration(phase)),
            );
        }
        for kind in MutationKind::ALL {
            let _ = write!(self.writer, " {}={}", kind.name(), t.mutation_count(kind));
        }
        let _ = writeln!(self.writer);
    }

    fn on_mutations(&mut self, surface_id: SurfaceId, revision: u64, m: &[ShadowViewMutation]) {
        let _ = writeln!(
            self.writer,
            "[mutations] surface={} revision={} count={}",
            surface_id.0,
            revision,
            m.len(),
        );
        for mutation in m {
            let _ = writeln!(self.writer, "  {mutation:?}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use umbra_core::mounting::CommitStatus;

    fn output(sink: PrettyPrintSink<Vec<u8>>) -> String {
        String::from_utf8(sink.into_writer()).unwrap()
    }

    #[test]
    fn one_line_per_event() {
        let mut sink = PrettyPrintSink::with_writer(Vec::new());
        sink.on_commit_begin(&CommitBeginEvent {
            surface_id: SurfaceId(3),
            base_revision: 4,
            timestamp: HostTime(2_000),
        });
        sink.on_phase_begin(&PhaseBeginEvent {
            surface_id: SurfaceId(3),
            phase: CommitPhase::Layout,
            timestamp: HostTime(2_500),
        });
        sink.on_commit_end(&CommitEndEvent {
            surface_id: SurfaceId(3),
            status: CommitStatus::Succeeded,
            revision: 5,
            mutation_count: 2,
            forwarded: true,
            timestamp: HostTime(9_000),
        });

        let text = output(sink);
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 3, "unexpected output: {text}");
        assert_eq!(lines[0], "[commit:begin] surface=3 base=4 at 2.0µs");
        assert_eq!(lines[1], "[phase:begin] surface=3 layout at 2.5µs");
        assert!(
            lines[2].starts_with("[commit:end] surface=3 status=Succeeded revision=5"),
            "unexpected line: {}",
            lines[2]
        );
    }

    #[test]
    fn telemetry_lists_every_phase_and_kind() {
        let mut sink = PrettyPrintSink::with_writer(Vec::new());
        sink.on_telemetry(SurfaceId(1), 7, &TransactionTelemetry::default());

        let text = output(sink);
        assert!(text.starts_with("[telemetry] surface=1 revision=7 total=0.0µs"));
        for phase in CommitPhase::ALL {
            assert!(text.contains(&format!(" {}=0.0µs", phase.name())), "{text}");
        }
        for kind in MutationKind::ALL {
            assert!(text.contains(&format!(" {}=0", kind.name())), "{text}");
        }
        assert!(text.ends_with('\n'), "telemetry line is terminated");
    }
}
