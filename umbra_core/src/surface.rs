// Copyright 2026 the Umbra Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Lifecycle of one surface.
//!
//! A [`SurfaceHandler`] moves through
//!
//! ```text
//!  Unregistered ──register──► Registered ──start──► Running
//!        ▲                      │    ▲                 │
//!        └──────unregister──────┘    └──────stop───────┘
//! ```
//!
//! State is split over two locks. The *link* lock guards the status and the
//! running shadow tree; the *parameters* lock guards what the surface is
//! configured with. Parameters can change in any status. When both are
//! needed, the link lock is always taken first.

use std::sync::Arc;

use kurbo::Size;
use parking_lot::RwLock;

use crate::component::RootComponentDescriptor;
use crate::error::SurfaceError;
use crate::layout::{LayoutConstraints, LayoutContext};
use crate::mounting::{CommitMode, CommitOptions, CommitStatus, MountingCoordinator, ShadowTree};
use crate::node::{RawProps, ShadowNodeFragment, SurfaceId};
use crate::ui_manager::UiManager;

/// Where a surface is in its lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SurfaceStatus {
    /// Not attached to a UI manager.
    Unregistered,
    /// Attached to a UI manager, not running.
    Registered,
    /// Running: commits reach a shadow tree.
    Running,
}

/// Visibility of a surface.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum DisplayMode {
    /// Commits are mounted.
    #[default]
    Visible,
    /// Commits are kept but not mounted; the mounted views stay as they are.
    Suspended,
    /// The mounted views are torn down and commits are kept but not mounted.
    Hidden,
}

#[derive(Debug)]
struct Link {
    status: SurfaceStatus,
    ui_manager: Option<Arc<UiManager>>,
    shadow_tree: Option<Arc<ShadowTree>>,
}

#[derive(Debug)]
struct Parameters {
    module_name: String,
    props: RawProps,
    layout_constraints: LayoutConstraints,
    layout_context: LayoutContext,
    display_mode: DisplayMode,
}

/// Runs one surface on a [`UiManager`].
#[derive(Debug)]
pub struct SurfaceHandler {
    surface_id: SurfaceId,
    link: RwLock<Link>,
    parameters: RwLock<Parameters>,
}

impl SurfaceHandler {
    /// Creates an unregistered surface running `module_name`.
    #[must_use]
    pub fn new(module_name: impl Into<String>, surface_id: SurfaceId) -> Self {
        Self {
            surface_id,
            link: RwLock::new(Link {
                status: SurfaceStatus::Unregistered,
                ui_manager: None,
                shadow_tree: None,
            }),
            parameters: RwLock::new(Parameters {
                module_name: module_name.into(),
                props: RawProps::new(),
                layout_constraints: LayoutConstraints::default(),
                layout_context: LayoutContext::default(),
                display_mode: DisplayMode::Visible,
            }),
        }
    }

    /// Returns the surface id.
    #[must_use]
    pub fn surface_id(&self) -> SurfaceId {
        self.surface_id
    }

    /// Returns the lifecycle status.
    #[must_use]
    pub fn status(&self) -> SurfaceStatus {
        self.link.read().status
    }

    /// Returns the module name.
    #[must_use]
    pub fn module_name(&self) -> String {
        self.parameters.read().module_name.clone()
    }

    /// Returns the surface props.
    #[must_use]
    pub fn props(&self) -> RawProps {
        self.parameters.read().props.clone()
    }

    /// Returns the display mode.
    #[must_use]
    pub fn display_mode(&self) -> DisplayMode {
        self.parameters.read().display_mode
    }

    /// Returns the layout constraints.
    #[must_use]
    pub fn layout_constraints(&self) -> LayoutConstraints {
        self.parameters.read().layout_constraints
    }

    /// Returns the layout context.
    #[must_use]
    pub fn layout_context(&self) -> LayoutContext {
        self.parameters.read().layout_context
    }

    /// Returns the coordinator of the running shadow tree.
    #[must_use]
    pub fn mounting_coordinator(&self) -> Option<Arc<MountingCoordinator>> {
        self.link
            .read()
            .shadow_tree
            .as_ref()
            .map(|tree| Arc::clone(tree.mounting_coordinator()))
    }

    /// Returns the running shadow tree.
    #[must_use]
    pub fn shadow_tree(&self) -> Option<Arc<ShadowTree>> {
        self.link.read().shadow_tree.clone()
    }

    fn check_status(&self, actual: SurfaceStatus, expected: SurfaceStatus) -> Result<(), SurfaceError> {
        if actual == expected {
            return Ok(());
        }
        tracing::warn!(surface_id = %self.surface_id, ?actual, ?expected, "invalid surface status");
        debug_assert_eq!(
            actual, expected,
            "surface {} is in the wrong status",
            self.surface_id
        );
        Err(SurfaceError::InvalidStatus {
            surface_id: self.surface_id,
            expected,
            actual,
        })
    }

    /// Attaches the surface to `ui_manager`.
    ///
    /// # Errors
    ///
    /// [`SurfaceError::InvalidStatus`] unless unregistered.
    pub fn register(&self, ui_manager: &Arc<UiManager>) -> Result<(), SurfaceError> {
        let mut link = self.link.write();
        self.check_status(link.status, SurfaceStatus::Unregistered)?;
        link.ui_manager = Some(Arc::clone(ui_manager));
        link.status = SurfaceStatus::Registered;
        Ok(())
    }

    /// Detaches the surface from its UI manager.
    ///
    /// # Errors
    ///
    /// [`SurfaceError::InvalidStatus`] unless registered and not running.
    pub fn unregister(&self) -> Result<(), SurfaceError> {
        let mut link = self.link.write();
        self.check_status(link.status, SurfaceStatus::Registered)?;
        link.ui_manager = None;
        link.status = SurfaceStatus::Unregistered;
        Ok(())
    }

    /// Creates the shadow tree and starts running.
    ///
    /// # Errors
    ///
    /// [`SurfaceError::InvalidStatus`] unless registered;
    /// [`SurfaceError::AlreadyRegistered`] if the UI manager already runs a
    /// surface with this id.
    pub fn start(&self) -> Result<(), SurfaceError> {
        let mut link = self.link.write();
        self.check_status(link.status, SurfaceStatus::Registered)?;
        let ui_manager = link
            .ui_manager
            .clone()
            .ok_or(SurfaceError::NotRegistered(self.surface_id))?;

        let parameters = self.parameters.read();
        let tree = ui_manager.start_surface(
            self.surface_id,
            &parameters.module_name,
            &parameters.props,
            parameters.layout_constraints,
            parameters.layout_context,
            parameters.display_mode,
        )?;
        let display_mode = parameters.display_mode;
        drop(parameters);

        apply_display_mode(&tree, display_mode);
        link.shadow_tree = Some(tree);
        link.status = SurfaceStatus::Running;
        Ok(())
    }

    /// Unmounts everything and stops running.
    ///
    /// An empty tree is committed and forwarded whatever the display mode,
    /// so the mounting layer tears down every view it still holds.
    ///
    /// # Errors
    ///
    /// [`SurfaceError::InvalidStatus`] unless running.
    pub fn stop(&self) -> Result<(), SurfaceError> {
        let mut link = self.link.write();
        self.check_status(link.status, SurfaceStatus::Running)?;
        let tree = link.shadow_tree.take();
        link.status = SurfaceStatus::Registered;
        let ui_manager = link.ui_manager.clone();
        drop(link);

        if let Some(ui_manager) = ui_manager {
            ui_manager.stop_surface(self.surface_id);
        }
        if let Some(tree) = tree {
            tree.set_commit_mode(CommitMode::Normal);
            tree.commit_empty_tree();
        }
        Ok(())
    }

    /// Sets the display mode and applies it if running.
    pub fn set_display_mode(&self, display_mode: DisplayMode) {
        {
            let mut parameters = self.parameters.write();
            if parameters.display_mode == display_mode {
                return;
            }
            parameters.display_mode = display_mode;
        }

        let link = self.link.read();
        if link.status != SurfaceStatus::Running {
            return;
        }
        let (Some(ui_manager), Some(tree)) = (&link.ui_manager, &link.shadow_tree) else {
            return;
        };
        let parameters = self.parameters.read();
        ui_manager.set_surface_props(
            self.surface_id,
            &parameters.module_name,
            &parameters.props,
            display_mode,
        );
        drop(parameters);
        apply_display_mode(tree, display_mode);
    }

    /// Sets the surface props and forwards them if running.
    pub fn set_props(&self, props: RawProps) {
        self.parameters.write().props = props;

        let link = self.link.read();
        if link.status != SurfaceStatus::Running {
            return;
        }
        if let Some(ui_manager) = &link.ui_manager {
            let parameters = self.parameters.read();
            ui_manager.set_surface_props(
                self.surface_id,
                &parameters.module_name,
                &parameters.props,
                parameters.display_mode,
            );
        }
    }

    /// Sets the layout inputs and, if running, commits a relayout.
    ///
    /// Returns [`CommitStatus::Cancelled`] when not running or when the
    /// inputs did not change.
    pub fn constraint_layout(
        &self,
        layout_constraints: LayoutConstraints,
        layout_context: LayoutContext,
    ) -> CommitStatus {
        {
            let mut parameters = self.parameters.write();
            parameters.layout_constraints = layout_constraints;
            parameters.layout_context = layout_context;
        }

        let link = self.link.read();
        if link.status != SurfaceStatus::Running {
            return CommitStatus::Cancelled;
        }
        let Some(tree) = &link.shadow_tree else {
            return CommitStatus::Cancelled;
        };
        tree.commit(
            |root| RootComponentDescriptor.clone_with_layout(root, layout_constraints, layout_context),
            CommitOptions::from(tree.config()),
        )
    }

    /// Returns the size the surface would have under `layout_constraints`,
    /// without committing anything.
    ///
    /// Returns the minimum size when not running or without a layout engine.
    #[must_use]
    pub fn measure(&self, layout_constraints: LayoutConstraints, layout_context: LayoutContext) -> Size {
        let link = self.link.read();
        let Some(tree) = link.shadow_tree.as_ref().filter(|_| link.status == SurfaceStatus::Running)
        else {
            return layout_constraints.minimum_size;
        };
        let Some(engine) = tree.layout_engine() else {
            return layout_constraints.minimum_size;
        };
        let root = tree.current_revision().root;
        let mut scratch = RootComponentDescriptor
            .clone_with_layout(&root, layout_constraints, layout_context)
            .unwrap_or_else(|| root.clone_with(ShadowNodeFragment::default()));
        engine.layout_if_needed(&mut scratch, &layout_constraints, &layout_context);
        scratch.layout_metrics().size()
    }
}

/// Brings the commit mode of `tree` in line with `display_mode`.
///
/// Hiding commits an empty tree in normal mode first, so the teardown reaches
/// the mounting layer, then suspends and commits the current revision back.
fn apply_display_mode(tree: &ShadowTree, display_mode: DisplayMode) {
    match display_mode {
        DisplayMode::Visible => tree.set_commit_mode(CommitMode::Normal),
        DisplayMode::Suspended => tree.set_commit_mode(CommitMode::Suspended),
        DisplayMode::Hidden => {
            tree.set_commit_mode(CommitMode::Normal);
            let revision = tree.current_revision();
            tree.commit_empty_tree();
            tree.set_commit_mode(CommitMode::Suspended);
            tree.commit(
                |_| Some(revision.root.clone_with(ShadowNodeFragment::default())),
                CommitOptions::from(tree.config()),
            );
        }
    }
    tracing::debug!(surface_id = %tree.surface_id(), ?display_mode, "display mode applied");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::{ComponentDescriptorRegistry, ContextContainer};
    use crate::config::RendererConfig;

    fn ui_manager() -> Arc<UiManager> {
        Arc::new(UiManager::new(
            Arc::new(ComponentDescriptorRegistry::with_builtins()),
            Arc::new(ContextContainer::new()),
            RendererConfig::VALIDATING,
        ))
    }

    #[test]
    fn lifecycle_round_trip() {
        let ui_manager = ui_manager();
        let surface = SurfaceHandler::new("App", SurfaceId(11));
        assert_eq!(surface.status(), SurfaceStatus::Unregistered);

        surface.register(&ui_manager).expect("unregistered");
        surface.start().expect("registered");
        assert_eq!(surface.status(), SurfaceStatus::Running);
        assert!(surface.mounting_coordinator().is_some());
        assert_eq!(ui_manager.shadow_tree_registry().len(), 1);

        surface.stop().expect("running");
        assert_eq!(surface.status(), SurfaceStatus::Registered);
        assert!(surface.mounting_coordinator().is_none());
        assert!(ui_manager.shadow_tree_registry().is_empty());

        surface.unregister().expect("registered");
        assert_eq!(surface.status(), SurfaceStatus::Unregistered);
    }

    #[test]
    #[should_panic(expected = "wrong status")]
    fn starting_twice_panics_in_debug() {
        let surface = SurfaceHandler::new("App", SurfaceId(11));
        surface.register(&ui_manager()).expect("unregistered");
        surface.start().expect("registered");
        _ = surface.start();
    }

    #[test]
    fn parameters_change_in_any_status() {
        let surface = SurfaceHandler::new("App", SurfaceId(11));
        let constraints = LayoutConstraints::exact(Size::new(320.0, 480.0));
        assert_eq!(
            surface.constraint_layout(constraints, LayoutContext::default()),
            CommitStatus::Cancelled
        );
        surface.set_display_mode(DisplayMode::Suspended);
        surface.set_props(RawProps::new().with("theme", "dark"));

        assert_eq!(surface.layout_constraints(), constraints);
        assert_eq!(surface.display_mode(), DisplayMode::Suspended);
        assert_eq!(surface.props().str("theme"), Some("dark"));
        assert_eq!(surface.measure(constraints, LayoutContext::default()), constraints.minimum_size);
    }

    #[test]
    fn starting_suspended_suspends_the_tree() {
        let surface = SurfaceHandler::new("App", SurfaceId(11));
        surface.set_display_mode(DisplayMode::Suspended);
        surface.register(&ui_manager()).expect("unregistered");
        surface.start().expect("registered");
        let tree = surface.shadow_tree().expect("running");
        assert_eq!(tree.commit_mode(), CommitMode::Suspended);
    }

    #[test]
    fn constraint_layout_commits_once_per_change() {
        let surface = SurfaceHandler::new("App", SurfaceId(11));
        surface.register(&ui_manager()).expect("unregistered");
        surface.start().expect("registered");
        let constraints = LayoutConstraints::exact(Size::new(320.0, 480.0));
        assert_eq!(
            surface.constraint_layout(constraints, LayoutContext::default()),
            CommitStatus::Succeeded
        );
        assert_eq!(
            surface.constraint_layout(constraints, LayoutContext::default()),
            CommitStatus::Cancelled
        );
        let tree = surface.shadow_tree().expect("running");
        assert_eq!(tree.current_revision().number, 1);
    }
}
