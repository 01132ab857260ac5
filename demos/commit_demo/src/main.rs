// Copyright 2026 the Umbra Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Two producer threads committing to one surface while a third thread
//! mounts.
//!
//! Every commit is traced to stdout through a
//! [`PrettyPrintSink`](umbra_debug::pretty::PrettyPrintSink) and recorded
//! through a [`SharedRecorder`](umbra_debug::recorder::SharedRecorder); the
//! recording is exported as a Chrome trace at the end. The mounting thread
//! replays every transaction onto a stub view tree, which must match the
//! committed tree once everything is drained.
//!
//! Set `RUST_LOG=umbra_core=debug` to also see the commit log.

use std::error::Error;
use std::fs::File;
use std::io::BufWriter;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use kurbo::Size;
use tracing_subscriber::EnvFilter;
use umbra_core::component::{ComponentDescriptorRegistry, ContextContainer};
use umbra_core::config::RendererConfig;
use umbra_core::layout::{LayoutConstraints, LayoutContext, LayoutDirection};
use umbra_core::mounting::{
    CommitOptions, CommitStatus, MountingCoordinator, build_stub_view_tree_without_differentiator,
};
use umbra_core::node::{RawProps, ShadowNode, ShadowNodeFragment, SharedShadowNode, SurfaceId, Tag};
use umbra_core::surface::SurfaceHandler;
use umbra_core::time::HostTime;
use umbra_core::trace::{
    CommitBeginEvent, CommitEndEvent, PhaseBeginEvent, PhaseEndEvent, TraceSink,
    TransactionTelemetry,
};
use umbra_core::ui_manager::{UiManager, UiManagerMountHook};
use umbra_debug::json::mutations_to_json;
use umbra_debug::pretty::PrettyPrintSink;
use umbra_debug::recorder::SharedRecorder;
use umbra_testkit::{RecordingMounter, StubLayoutEngine};

const SURFACE: SurfaceId = SurfaceId(1);
const COMMITS_PER_PRODUCER: i32 = 12;
/// Each producer keeps at most this many of its own views mounted.
const LIVE_VIEWS_PER_PRODUCER: usize = 4;

/// Sends commit, phase and telemetry events to both sinks.
struct Fanout {
    pretty: PrettyPrintSink,
    recorder: SharedRecorder,
}

impl TraceSink for Fanout {
    fn on_commit_begin(&mut self, e: &CommitBeginEvent) {
        self.pretty.on_commit_begin(e);
        self.recorder.on_commit_begin(e);
    }

    fn on_phase_begin(&mut self, e: &PhaseBeginEvent) {
        self.pretty.on_phase_begin(e);
        self.recorder.on_phase_begin(e);
    }

    fn on_phase_end(&mut self, e: &PhaseEndEvent) {
        self.pretty.on_phase_end(e);
        self.recorder.on_phase_end(e);
    }

    fn on_commit_end(&mut self, e: &CommitEndEvent) {
        self.pretty.on_commit_end(e);
        self.recorder.on_commit_end(e);
    }

    fn on_telemetry(&mut self, surface_id: SurfaceId, revision: u64, t: &TransactionTelemetry) {
        self.pretty.on_telemetry(surface_id, revision, t);
        self.recorder.on_telemetry(surface_id, revision, t);
    }
}

struct MountLog;

impl UiManagerMountHook for MountLog {
    fn shadow_tree_did_mount(&self, root: &SharedShadowNode, time: HostTime) {
        tracing::info!(
            surface_id = %root.surface_id(),
            children = root.children().len(),
            at_ns = time.nanos(),
            "mounted"
        );
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let ui_manager = Arc::new(
        UiManager::new(
            Arc::new(ComponentDescriptorRegistry::with_builtins()),
            Arc::new(ContextContainer::new()),
            RendererConfig::VALIDATING,
        )
        .with_layout_engine(Arc::new(StubLayoutEngine)),
    );
    ui_manager.register_mount_hook(Arc::new(MountLog));

    let surface = SurfaceHandler::new("CommitDemo", SURFACE);
    surface.constraint_layout(
        LayoutConstraints {
            minimum_size: Size::new(512.0, 0.0),
            maximum_size: Size::new(512.0, f64::INFINITY),
            layout_direction: LayoutDirection::LeftToRight,
        },
        LayoutContext::default(),
    );
    surface.register(&ui_manager)?;
    surface.start()?;

    let tree = surface.shadow_tree().ok_or("surface did not start")?;
    let coordinator = surface
        .mounting_coordinator()
        .ok_or("surface did not start")?;
    let recorder = SharedRecorder::new();
    tree.set_trace_sink(Some(Box::new(Fanout {
        pretty: PrettyPrintSink::new(Box::new(std::io::stdout())),
        recorder: recorder.clone(),
    })));

    let producers_done = AtomicBool::new(false);
    let mut mounter = RecordingMounter::new(&coordinator.base_root());

    thread::scope(|scope| {
        let mounting = scope.spawn(|| mount_until_done(&ui_manager, &coordinator, &mut mounter, &producers_done));
        let producers: Vec<_> = (0..2)
            .map(|producer| {
                let ui_manager = &ui_manager;
                scope.spawn(move || produce(ui_manager, producer))
            })
            .collect();
        for producer in producers {
            match producer.join() {
                Ok(committed) => tracing::info!(committed, "producer finished"),
                Err(_) => tracing::error!("producer panicked"),
            }
        }
        producers_done.store(true, Ordering::Release);
        if mounting.join().is_err() {
            tracing::error!("mounting thread panicked");
        }
    });

    let revision = tree.current_revision();
    let expected = build_stub_view_tree_without_differentiator(&revision.root);
    println!(
        "revision {} mounted through {} transactions, stub {} ({} views)",
        revision.number,
        mounter.transactions().len(),
        if *mounter.stub() == expected { "matches" } else { "DIFFERS" },
        mounter.stub().len(),
    );
    if let Some((number, error)) = mounter.error() {
        println!("transaction {number} failed to mount: {error}");
    }
    if let Some(first) = mounter.transactions().first() {
        println!(
            "first transaction:\n{}",
            serde_json::to_string_pretty(&mutations_to_json(&first.mutations))?
        );
    }

    surface.stop()?;
    coordinator.drain_into(&mut mounter);
    println!("after stop: {} mounted views", mounter.stub().len());
    surface.unregister()?;

    let path = "commit_trace.json";
    let mut writer = BufWriter::new(File::create(path)?);
    umbra_debug::chrome::export(&recorder.bytes(), &mut writer)?;
    println!("Wrote {path}");
    Ok(())
}

/// Commits `COMMITS_PER_PRODUCER` times, each adding one view to a row of
/// its own and dropping the oldest once the row is full. Returns the number
/// of successful commits.
fn produce(ui_manager: &UiManager, producer: i32) -> usize {
    let first_tag = 100 * (producer + 1);
    let owns = move |node: &SharedShadowNode| (first_tag..first_tag + 100).contains(&node.tag().0);
    let mut committed = 0;
    for step in 0..COMMITS_PER_PRODUCER {
        let props = RawProps::new()
            .with("left", step * 40)
            .with("top", producer * 120)
            .with("width", 32)
            .with("height", 100)
            .with("backgroundColor", 0xff00_00ff_u32 << (8 * producer));
        let node = match ui_manager.create_node(Tag(first_tag + step), "View", SURFACE, &props) {
            Ok(node) => Arc::new(node),
            Err(error) => {
                tracing::error!(%error, "cannot create view");
                return committed;
            }
        };
        let status = ui_manager
            .shadow_tree_registry()
            .visit(SURFACE, |tree| {
                tree.commit(
                    |root: &ShadowNode| {
                        let mut children = root.children().to_vec();
                        if children.iter().filter(|&child| owns(child)).count()
                            >= LIVE_VIEWS_PER_PRODUCER
                        {
                            let oldest = children.iter().position(&owns)?;
                            children.remove(oldest);
                        }
                        children.push(node);
                        Some(root.clone_with(ShadowNodeFragment::children(children)))
                    },
                    CommitOptions::from(ui_manager.config()),
                )
            });
        if status == Some(CommitStatus::Succeeded) {
            committed += 1;
        }
        thread::sleep(Duration::from_millis(2));
    }
    committed
}

/// Applies transactions as they arrive until the producers are done and
/// nothing is pending.
fn mount_until_done(
    ui_manager: &UiManager,
    coordinator: &MountingCoordinator,
    mounter: &mut RecordingMounter,
    producers_done: &AtomicBool,
) {
    loop {
        if coordinator.wait_for_transaction(Duration::from_millis(20)) {
            let applied = coordinator.drain_into(mounter);
            tracing::debug!(applied, "drained");
            ui_manager.report_mount(coordinator.surface_id());
        } else if producers_done.load(Ordering::Acquire) && !coordinator.has_pending_transactions() {
            return;
        }
    }
}
