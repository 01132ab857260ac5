// Copyright 2026 the Umbra Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Surfaces driven through a UI manager: display modes and native state.

use std::any::Any;
use std::sync::Arc;

use kurbo::Size;
use umbra_core::component::{ComponentDescriptorRegistry, ContextContainer, ViewProps};
use umbra_core::config::RendererConfig;
use umbra_core::layout::{LayoutConstraints, LayoutContext, LayoutDirection};
use umbra_core::mounting::{
    CommitOptions, CommitStatus, MountingCoordinator, build_stub_view_tree_without_differentiator,
};
use umbra_core::node::{
    RawProps, ShadowNodeFragment, ShadowNodeTraits, SharedShadowNode, SharedStateData, StateData,
    SurfaceId, Tag, downcast_props,
};
use umbra_core::surface::{DisplayMode, SurfaceHandler, SurfaceStatus};
use umbra_core::ui_manager::UiManager;
use umbra_testkit::{RecordingMounter, StubLayoutEngine};

const SURFACE: SurfaceId = SurfaceId(7);

fn ui_manager() -> Arc<UiManager> {
    Arc::new(
        UiManager::new(
            Arc::new(ComponentDescriptorRegistry::with_builtins()),
            Arc::new(ContextContainer::new()),
            RendererConfig::VALIDATING,
        )
        .with_layout_engine(Arc::new(StubLayoutEngine)),
    )
}

fn running_surface(ui_manager: &Arc<UiManager>) -> SurfaceHandler {
    let surface = SurfaceHandler::new("App", SURFACE);
    surface.constraint_layout(
        LayoutConstraints {
            minimum_size: Size::new(320.0, 0.0),
            maximum_size: Size::new(320.0, f64::INFINITY),
            layout_direction: LayoutDirection::LeftToRight,
        },
        LayoutContext::default(),
    );
    surface.register(ui_manager).expect("unregistered");
    surface.start().expect("registered");
    surface
}

fn view(ui_manager: &UiManager, tag: i32) -> SharedShadowNode {
    let props = RawProps::new()
        .with("left", 0)
        .with("top", 10 * tag)
        .with("width", 50)
        .with("height", 10)
        .with("nativeID", format!("view-{tag}"));
    Arc::new(
        ui_manager
            .create_node(Tag(tag), "View", SURFACE, &props)
            .expect("View is registered"),
    )
}

fn mounted_matches_current(mounter: &RecordingMounter, surface: &SurfaceHandler) -> bool {
    let tree = surface.shadow_tree().expect("running");
    *mounter.stub() == build_stub_view_tree_without_differentiator(&tree.current_revision().root)
}

fn coordinator(surface: &SurfaceHandler) -> Arc<MountingCoordinator> {
    surface.mounting_coordinator().expect("running")
}

#[test]
fn hiding_tears_down_and_keeps_the_tree() {
    let ui_manager = ui_manager();
    let surface = running_surface(&ui_manager);
    let coordinator = coordinator(&surface);
    let mut mounter = RecordingMounter::new(&coordinator.base_root());

    ui_manager
        .complete_surface(
            SURFACE,
            vec![view(&ui_manager, 1), view(&ui_manager, 2)],
            CommitOptions::default(),
        )
        .expect("running");
    coordinator.drain_into(&mut mounter);
    assert_eq!(mounter.stub().len(), 3);

    surface.set_display_mode(DisplayMode::Hidden);
    coordinator.drain_into(&mut mounter);
    assert_eq!(mounter.stub().len(), 1, "only the root stays mounted");
    let tree = surface.shadow_tree().expect("running");
    assert_eq!(tree.current_revision().root.children().len(), 2, "the tree is kept");

    // Commits while hidden are kept but not mounted.
    ui_manager
        .complete_surface(
            SURFACE,
            vec![view(&ui_manager, 1), view(&ui_manager, 2), view(&ui_manager, 3)],
            CommitOptions::default(),
        )
        .expect("running");
    assert!(!coordinator.has_pending_transactions());

    surface.set_display_mode(DisplayMode::Visible);
    ui_manager
        .complete_surface(
            SURFACE,
            vec![view(&ui_manager, 1), view(&ui_manager, 3)],
            CommitOptions::default(),
        )
        .expect("running");
    coordinator.drain_into(&mut mounter);
    assert!(mounter.error().is_none());
    assert!(mounted_matches_current(&mounter, &surface));
    assert_eq!(mounter.stub().children_of(mounter.stub().root_tag()), [Tag(1), Tag(3)]);
}

#[test]
fn suspending_freezes_the_mounted_views() {
    let ui_manager = ui_manager();
    let surface = running_surface(&ui_manager);
    let coordinator = coordinator(&surface);
    let mut mounter = RecordingMounter::new(&coordinator.base_root());

    ui_manager
        .complete_surface(SURFACE, vec![view(&ui_manager, 1)], CommitOptions::default())
        .expect("running");
    coordinator.drain_into(&mut mounter);

    surface.set_display_mode(DisplayMode::Suspended);
    ui_manager
        .complete_surface(SURFACE, vec![view(&ui_manager, 2)], CommitOptions::default())
        .expect("running");
    assert_eq!(coordinator.drain_into(&mut mounter), 0);
    assert_eq!(mounter.stub().children_of(mounter.stub().root_tag()), [Tag(1)]);

    surface.set_display_mode(DisplayMode::Visible);
    ui_manager
        .complete_surface(SURFACE, vec![view(&ui_manager, 2)], CommitOptions::default())
        .expect("running");
    coordinator.drain_into(&mut mounter);
    assert!(mounted_matches_current(&mounter, &surface));
}

#[test]
fn stopping_unmounts_everything() {
    let ui_manager = ui_manager();
    let surface = running_surface(&ui_manager);
    let coordinator = coordinator(&surface);
    let mut mounter = RecordingMounter::new(&coordinator.base_root());
    surface.set_display_mode(DisplayMode::Suspended);

    ui_manager
        .complete_surface(SURFACE, vec![view(&ui_manager, 1)], CommitOptions::default())
        .expect("running");
    surface.set_display_mode(DisplayMode::Visible);
    ui_manager
        .complete_surface(
            SURFACE,
            vec![view(&ui_manager, 1), view(&ui_manager, 2)],
            CommitOptions::default(),
        )
        .expect("running");

    surface.stop().expect("running");
    assert_eq!(surface.status(), SurfaceStatus::Registered);
    coordinator.drain_into(&mut mounter);
    assert!(mounter.error().is_none());
    assert_eq!(mounter.stub().len(), 1);
    assert!(ui_manager.shadow_tree_registry().is_empty());
}

#[test]
fn measuring_does_not_commit() {
    let ui_manager = ui_manager();
    let surface = running_surface(&ui_manager);
    let tree = surface.shadow_tree().expect("running");
    let before = tree.current_revision().number;

    let size = surface.measure(
        LayoutConstraints::exact(Size::new(200.0, 100.0)),
        LayoutContext::default(),
    );
    assert_eq!(size, Size::new(200.0, 100.0));
    assert_eq!(tree.current_revision().number, before);
}

#[derive(Debug, PartialEq)]
struct ScrollOffset(f64);
impl StateData for ScrollOffset {}

fn offset_of(data: Option<&SharedStateData>) -> f64 {
    data.and_then(|data| {
        let any: &dyn Any = data.as_ref();
        any.downcast_ref::<ScrollOffset>()
    })
    .map_or(0.0, |offset| offset.0)
}

#[test]
fn native_state_survives_stale_commits() {
    let ui_manager = ui_manager();
    let _surface = running_surface(&ui_manager);
    let tree = ui_manager
        .shadow_tree_registry()
        .get(SURFACE)
        .expect("running");

    let scroller = view(&ui_manager, 5);
    let initial = scroller
        .family()
        .create_state(Arc::new(ScrollOffset(0.0)));
    let scroller = Arc::new(scroller.clone_with(ShadowNodeFragment::state(initial)));
    ui_manager
        .complete_surface(SURFACE, vec![Arc::clone(&scroller)], CommitOptions::default())
        .expect("running");

    // Native code scrolls.
    let family = Arc::clone(scroller.family());
    let status = ui_manager
        .update_state(&family, |old| {
            Some(Arc::new(ScrollOffset(offset_of(old) + 40.0)) as SharedStateData)
        })
        .expect("running");
    assert_eq!(status, CommitStatus::Succeeded);
    let committed = Arc::clone(&tree.current_revision().root.children()[0]);
    assert!(committed
        .traits()
        .contains(ShadowNodeTraits::CLONED_BY_NATIVE_STATE_UPDATE));
    let scrolled = committed.state().expect("has state");
    assert_eq!(scrolled.data_as::<ScrollOffset>(), Some(&ScrollOffset(40.0)));

    // A producer still holding the old version changes its props.
    let restyled = ui_manager
        .clone_node(&scroller, None, &RawProps::new().with("opacity", 0.5))
        .expect("View is registered");
    ui_manager
        .complete_surface(SURFACE, vec![Arc::new(restyled)], CommitOptions::default())
        .expect("running");
    let committed = Arc::clone(&tree.current_revision().root.children()[0]);
    assert_eq!(
        committed.state().map(|state| state.revision()),
        Some(scrolled.revision()),
        "stale state is replaced"
    );
    let props = downcast_props::<ViewProps>(committed.props()).expect("view props");
    assert_eq!(props.opacity, 0.5);

    // Without reconciliation the stale state is committed as is, and the
    // family keeps the newer one.
    let unreconciled = CommitOptions {
        enable_state_reconciliation: false,
        ..CommitOptions::default()
    };
    ui_manager
        .complete_surface(SURFACE, vec![Arc::clone(&scroller)], unreconciled)
        .expect("running");
    let committed = Arc::clone(&tree.current_revision().root.children()[0]);
    assert!(committed.state().expect("has state").revision() < scrolled.revision());
    assert_eq!(
        family.most_recent_state().map(|state| state.revision()),
        Some(scrolled.revision())
    );

    // Declining the update cancels the commit.
    let number = tree.current_revision().number;
    let status = ui_manager
        .update_state(&family, |_| None)
        .expect("running");
    assert_eq!(status, CommitStatus::Cancelled);
    assert_eq!(tree.current_revision().number, number);
}

#[test]
fn queries_follow_the_current_revision() {
    let ui_manager = ui_manager();
    let _surface = running_surface(&ui_manager);
    let parent_props = RawProps::new()
        .with("left", 10)
        .with("top", 20)
        .with("width", 100)
        .with("height", 100)
        .with("nativeID", "parent");
    let mut parent = ui_manager
        .create_node(Tag(1), "View", SURFACE, &parent_props)
        .expect("View is registered");
    let child = view(&ui_manager, 2);
    ui_manager.append_child(&mut parent, Arc::clone(&child));
    ui_manager
        .complete_surface(SURFACE, vec![Arc::new(parent)], CommitOptions::default())
        .expect("running");

    let metrics = ui_manager
        .relative_layout_metrics(&child, None)
        .expect("mounted");
    assert_eq!(metrics.frame.origin(), kurbo::Point::new(10.0, 40.0));

    let hit = ui_manager
        .find_node_at_point(&child, kurbo::Point::new(5.0, 25.0))
        .expect("inside the child");
    assert_eq!(hit.tag(), Tag(2));
}
