// Copyright 2026 the Umbra Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Chrome Trace Event Format exporter.
//!
//! [`export`] reads recorded bytes from a [`RecorderSink`](super::recorder::RecorderSink)
//! and writes [Chrome Trace Event Format][spec] JSON to the given writer.
//!
//! Each surface becomes its own thread row, so commits on different surfaces
//! do not nest into each other.
//!
//! [spec]: https://docs.google.com/document/d/1CvAClvFfyA5R-PhYUmn5OOQtYMH4h6I0nSsKchNAySU

use std::io::{self, Write};

use serde_json::{Map, Value, json};

use umbra_core::mounting::MutationKind;
use umbra_core::time::HostTime;
use umbra_core::trace::CommitPhase;

use crate::recorder::{RecordedEvent, decode};

/// Exports recorded events as Chrome Trace Event Format JSON.
///
/// The output is a complete JSON array of trace event objects, suitable for
/// loading into `chrome://tracing` or [Perfetto](https://ui.perfetto.dev/).
pub fn export(bytes: &[u8], writer: &mut dyn Write) -> io::Result<()> {
    let mut events: Vec<Value> = Vec::new();

    for recorded in decode(bytes) {
        match recorded {
            RecordedEvent::CommitBegin(e) => {
                events.push(json!({
                    "ph": "B",
                    "name": "Commit",
                    "cat": "Commit",
                    "ts": to_us(e.timestamp),
                    "pid": 0,
                    "tid": e.surface_id.0,
                    "args": {
                        "base_revision": e.base_revision,
                    }
                }));
            }
            RecordedEvent::PhaseBegin(e) => {
                events.push(json!({
                    "ph": "B",
                    "name": e.phase.name(),
                    "cat": "Phase",
                    "ts": to_us(e.timestamp),
                    "pid": 0,
                    "tid": e.surface_id.0,
                }));
            }
            RecordedEvent::PhaseEnd(e) => {
                events.push(json!({
                    "ph": "E",
                    "name": e.phase.name(),
                    "cat": "Phase",
                    "ts": to_us(e.timestamp),
                    "pid": 0,
                    "tid": e.surface_id.0,
                }));
            }
            RecordedEvent::CommitEnd(e) => {
                events.push(json!({
                    "ph": "E",
                    "name": "Commit",
                    "cat": "Commit",
                    "ts": to_us(e.timestamp),
                    "pid": 0,
                    "tid": e.surface_id.0,
                    "args": {
                        "status": format!("{:?}", e.status),
                        "revision": e.revision,
                        "mutations": e.mutation_count,
                        "forwarded": e.forwarded,
                    }
                }));
            }
            RecordedEvent::Telemetry(t) => {
                let mut args = Map::new();
                args.insert("revision".into(), t.revision.into());
                for (phase, nanos) in CommitPhase::ALL.iter().zip(t.phase_nanos) {
                    args.insert(format!("{}_us", phase.name()), (nanos as f64 / 1000.0).into());
                }
                for (kind, count) in MutationKind::ALL.iter().zip(t.mutation_counts) {
                    args.insert(kind.name().into(), count.into());
                }
                events.push(json!({
                    "ph": "i",
                    "name": "Telemetry",
                    "cat": "Summary",
                    "ts": to_us(t.commit_end),
                    "pid": 0,
                    "tid": t.surface_id.0,
                    "s": "t",
                    "args": args,
                }));
            }
            RecordedEvent::MutationsCount {
                surface_id,
                revision,
                count,
            } => {
                events.push(json!({
                    "ph": "i",
                    "name": "Mutations",
                    "cat": "Rich",
                    "ts": 0,
                    "pid": 0,
                    "tid": surface_id.0,
                    "s": "t",
                    "args": {
                        "revision": revision,
                        "count": count,
                    }
                }));
            }
        }
    }

    serde_json::to_writer_pretty(writer, &events)?;
    Ok(())
}

fn to_us(t: HostTime) -> f64 {
    t.nanos() as f64 / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recorder::RecorderSink;
    use umbra_core::mounting::CommitStatus;
    use umbra_core::node::SurfaceId;
    use umbra_core::trace::{
        CommitBeginEvent, CommitEndEvent, PhaseBeginEvent, PhaseEndEvent, TraceSink,
        TransactionTelemetry,
    };

    #[test]
    fn export_produces_valid_json() {
        let mut rec = RecorderSink::new();
        rec.on_commit_begin(&CommitBeginEvent {
            surface_id: SurfaceId(1),
            base_revision: 0,
            timestamp: HostTime(1_000_000),
        });
        rec.on_phase_begin(&PhaseBeginEvent {
            surface_id: SurfaceId(1),
            phase: CommitPhase::Diff,
            timestamp: HostTime(1_000_000),
        });
        rec.on_phase_end(&PhaseEndEvent {
            surface_id: SurfaceId(1),
            phase: CommitPhase::Diff,
            timestamp: HostTime(1_000_100),
        });
        rec.on_commit_end(&CommitEndEvent {
            surface_id: SurfaceId(1),
            status: CommitStatus::Succeeded,
            revision: 1,
            mutation_count: 2,
            forwarded: true,
            timestamp: HostTime(1_000_200),
        });
        rec.on_telemetry(SurfaceId(1), 1, &TransactionTelemetry::default());

        let mut out = Vec::new();
        export(rec.as_bytes(), &mut out).unwrap();
        let json_str = String::from_utf8(out).unwrap();

        let parsed: Vec<Value> = serde_json::from_str(&json_str).unwrap();
        assert_eq!(parsed.len(), 5);

        // The commit brackets its phases.
        assert_eq!(parsed[0]["ph"], "B");
        assert_eq!(parsed[0]["name"], "Commit");
        assert_eq!(parsed[1]["name"], "diff");
        assert_eq!(parsed[2]["ph"], "E");
        assert_eq!(parsed[3]["ph"], "E");
        assert_eq!(parsed[3]["args"]["mutations"], 2);
        assert_eq!(parsed[3]["tid"], 1);

        assert_eq!(parsed[4]["ph"], "i");
        assert_eq!(parsed[4]["args"]["insert"], 0);
        assert_eq!(parsed[4]["args"]["layout_us"], 0.0);
    }

    #[test]
    fn export_empty_recording() {
        let mut out = Vec::new();
        export(&[], &mut out).unwrap();
        let json_str = String::from_utf8(out).unwrap();
        let parsed: Vec<Value> = serde_json::from_str(&json_str).unwrap();
        assert!(parsed.is_empty());
    }
}
