// Copyright 2026 the Umbra Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Orchestration of node creation and surface lifecycles.
//!
//! A [`UiManager`] is what a declarative layer talks to: it creates and
//! clones nodes through the component registry, owns the
//! [`ShadowTreeRegistry`] of running surfaces, and routes commit and mount
//! notifications to registered hooks and to its [`UiManagerDelegate`].

use std::sync::Arc;

use indexmap::IndexMap;
use kurbo::Point;
use parking_lot::RwLock;

use crate::component::{ComponentDescriptorRegistry, ContextContainer, PropsParserContext};
use crate::config::RendererConfig;
use crate::error::{SurfaceError, UiManagerError};
use crate::layout::{self, LayoutConstraints, LayoutContext, LayoutEngine, LayoutMetrics};
use crate::mounting::{
    CommitOptions, CommitStatus, MountingCoordinator, ShadowTree, ShadowTreeDelegate,
};
use crate::node::{
    EventDispatcher, RawProps, ShadowNode, ShadowNodeFamily, ShadowNodeFragment,
    ShadowNodeTraits, SharedShadowNode, SharedStateData, SurfaceId, Tag,
};
use crate::surface::DisplayMode;
use crate::time::HostTime;

/// Rewrites or vetoes commits of every surface of a [`UiManager`].
pub trait UiManagerCommitHook: Send + Sync {
    /// Returns the root to commit, or `None` to cancel the commit.
    fn shadow_tree_will_commit(
        &self,
        tree: &ShadowTree,
        old_root: &ShadowNode,
        new_root: ShadowNode,
    ) -> Option<ShadowNode>;
}

/// Observes mounting reported through [`UiManager::report_mount`].
pub trait UiManagerMountHook: Send + Sync {
    /// The mounting layer finished applying transactions up to `root`.
    fn shadow_tree_did_mount(&self, root: &SharedShadowNode, time: HostTime);

    /// A mount was reported for a surface that is no longer running.
    fn shadow_tree_did_unmount(&self, surface_id: SurfaceId, time: HostTime) {
        _ = (surface_id, time);
    }
}

/// Receives notifications from a [`UiManager`].
///
/// Every method defaults to doing nothing.
pub trait UiManagerDelegate: Send + Sync {
    /// A transaction was pushed to `coordinator`.
    fn ui_manager_did_finish_transaction(
        &self,
        coordinator: &Arc<MountingCoordinator>,
        mount_synchronously: bool,
    ) {
        _ = (coordinator, mount_synchronously);
    }

    /// A node was created by [`UiManager::create_node`].
    fn ui_manager_did_create_shadow_node(&self, node: &ShadowNode) {
        _ = node;
    }

    /// A surface started running `module_name` with `props`.
    fn ui_manager_did_start_surface(
        &self,
        surface_id: SurfaceId,
        module_name: &str,
        props: &RawProps,
        display_mode: DisplayMode,
    ) {
        _ = (surface_id, module_name, props, display_mode);
    }

    /// The props or display mode of a running surface changed.
    fn ui_manager_did_set_surface_props(
        &self,
        surface_id: SurfaceId,
        module_name: &str,
        props: &RawProps,
        display_mode: DisplayMode,
    ) {
        _ = (surface_id, module_name, props, display_mode);
    }

    /// A surface stopped.
    fn ui_manager_did_stop_surface(&self, surface_id: SurfaceId) {
        _ = surface_id;
    }
}

/// The shadow trees of all running surfaces, by surface id.
#[derive(Debug, Default)]
pub struct ShadowTreeRegistry {
    trees: RwLock<IndexMap<SurfaceId, Arc<ShadowTree>>>,
}

impl ShadowTreeRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `tree`.
    ///
    /// # Errors
    ///
    /// [`SurfaceError::AlreadyRegistered`] if a tree for the same surface is
    /// present; the registry is unchanged.
    pub fn add(&self, tree: Arc<ShadowTree>) -> Result<(), SurfaceError> {
        let surface_id = tree.surface_id();
        let mut trees = self.trees.write();
        if trees.contains_key(&surface_id) {
            return Err(SurfaceError::AlreadyRegistered(surface_id));
        }
        trees.insert(surface_id, tree);
        Ok(())
    }

    /// Removes and returns the tree of `surface_id`.
    pub fn remove(&self, surface_id: SurfaceId) -> Option<Arc<ShadowTree>> {
        self.trees.write().shift_remove(&surface_id)
    }

    /// Returns the tree of `surface_id`.
    #[must_use]
    pub fn get(&self, surface_id: SurfaceId) -> Option<Arc<ShadowTree>> {
        self.trees.read().get(&surface_id).cloned()
    }

    /// Calls `f` with the tree of `surface_id`, if present.
    ///
    /// The registry lock is released before `f` runs, so `f` may commit or
    /// touch the registry.
    pub fn visit<R>(&self, surface_id: SurfaceId, f: impl FnOnce(&ShadowTree) -> R) -> Option<R> {
        let tree = self.get(surface_id)?;
        Some(f(&tree))
    }

    /// Calls `f` with every tree, in registration order.
    pub fn enumerate(&self, mut f: impl FnMut(&ShadowTree)) {
        let trees: Vec<_> = self.trees.read().values().cloned().collect();
        for tree in &trees {
            f(tree);
        }
    }

    /// Returns the number of running surfaces.
    #[must_use]
    pub fn len(&self) -> usize {
        self.trees.read().len()
    }

    /// Returns `true` if no surface is running.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.trees.read().is_empty()
    }
}

/// The part of a [`UiManager`] its shadow trees call back into.
#[derive(Default)]
struct Hooks {
    commit_hooks: RwLock<Vec<Arc<dyn UiManagerCommitHook>>>,
    mount_hooks: RwLock<Vec<Arc<dyn UiManagerMountHook>>>,
    delegate: RwLock<Option<Arc<dyn UiManagerDelegate>>>,
}

impl ShadowTreeDelegate for Hooks {
    fn shadow_tree_will_commit(
        &self,
        tree: &ShadowTree,
        old_root: &ShadowNode,
        new_root: ShadowNode,
    ) -> Option<ShadowNode> {
        let hooks = self.commit_hooks.read().clone();
        hooks.iter().try_fold(new_root, |root, hook| {
            hook.shadow_tree_will_commit(tree, old_root, root)
        })
    }

    fn shadow_tree_did_finish_transaction(
        &self,
        coordinator: &Arc<MountingCoordinator>,
        mount_synchronously: bool,
    ) {
        let delegate = self.delegate.read().clone();
        if let Some(delegate) = delegate {
            delegate.ui_manager_did_finish_transaction(coordinator, mount_synchronously);
        }
    }
}

/// Creates nodes and runs surfaces for one renderer.
pub struct UiManager {
    config: RendererConfig,
    component_registry: Arc<ComponentDescriptorRegistry>,
    context_container: Arc<ContextContainer>,
    layout_engine: Option<Arc<dyn LayoutEngine>>,
    event_dispatcher: Option<Arc<dyn EventDispatcher>>,
    shadow_tree_registry: ShadowTreeRegistry,
    hooks: Arc<Hooks>,
}

impl UiManager {
    /// Creates a UI manager without a layout engine or event dispatcher.
    #[must_use]
    pub fn new(
        component_registry: Arc<ComponentDescriptorRegistry>,
        context_container: Arc<ContextContainer>,
        config: RendererConfig,
    ) -> Self {
        Self {
            config,
            component_registry,
            context_container,
            layout_engine: None,
            event_dispatcher: None,
            shadow_tree_registry: ShadowTreeRegistry::new(),
            hooks: Arc::new(Hooks::default()),
        }
    }

    /// Lays out every surface with `engine`.
    #[must_use]
    pub fn with_layout_engine(mut self, engine: Arc<dyn LayoutEngine>) -> Self {
        self.layout_engine = Some(engine);
        self
    }

    /// Routes events of created nodes to `dispatcher`.
    #[must_use]
    pub fn with_event_dispatcher(mut self, dispatcher: Arc<dyn EventDispatcher>) -> Self {
        self.event_dispatcher = Some(dispatcher);
        self
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    /// Returns the component registry.
    #[must_use]
    pub fn component_registry(&self) -> &Arc<ComponentDescriptorRegistry> {
        &self.component_registry
    }

    /// Returns the context container handed to props parsing.
    #[must_use]
    pub fn context_container(&self) -> &Arc<ContextContainer> {
        &self.context_container
    }

    /// Returns the registry of running surfaces.
    #[must_use]
    pub fn shadow_tree_registry(&self) -> &ShadowTreeRegistry {
        &self.shadow_tree_registry
    }

    /// Installs or removes the delegate.
    pub fn set_delegate(&self, delegate: Option<Arc<dyn UiManagerDelegate>>) {
        *self.hooks.delegate.write() = delegate;
    }

    fn delegate(&self) -> Option<Arc<dyn UiManagerDelegate>> {
        self.hooks.delegate.read().clone()
    }

    // -- Nodes --

    /// Creates the first version of node `tag` of kind `name`.
    ///
    /// # Errors
    ///
    /// [`UiManagerError::UnknownComponent`] if no descriptor is named `name`.
    pub fn create_node(
        &self,
        tag: Tag,
        name: &str,
        surface_id: SurfaceId,
        raw_props: &RawProps,
    ) -> Result<ShadowNode, UiManagerError> {
        let descriptor = self
            .component_registry
            .get_by_name(name)
            .ok_or_else(|| UiManagerError::UnknownComponent(name.to_owned()))?;
        let context = PropsParserContext {
            surface_id,
            context_container: &self.context_container,
        };
        let family = descriptor.create_family(tag, surface_id, self.event_dispatcher.clone());
        let props = descriptor.clone_props(&context, None, raw_props);
        let state = descriptor.create_initial_state(&props, &family);
        let node = descriptor.create_shadow_node(
            ShadowNodeFragment {
                props: Some(props),
                state,
                ..ShadowNodeFragment::default()
            },
            family,
        );
        if let Some(delegate) = self.delegate() {
            delegate.ui_manager_did_create_shadow_node(&node);
        }
        Ok(node)
    }

    /// Creates the next version of `node`, with `raw_props` applied on top of
    /// its props and, if given, new `children`.
    ///
    /// # Errors
    ///
    /// [`UiManagerError::UnknownComponent`] if the node's kind is no longer
    /// registered.
    pub fn clone_node(
        &self,
        node: &ShadowNode,
        children: Option<Vec<SharedShadowNode>>,
        raw_props: &RawProps,
    ) -> Result<ShadowNode, UiManagerError> {
        let descriptor = self
            .component_registry
            .get(node.component_handle())
            .ok_or_else(|| UiManagerError::UnknownComponent(node.component_name().to_owned()))?;
        let props = (!raw_props.is_empty()).then(|| {
            let context = PropsParserContext {
                surface_id: node.surface_id(),
                context_container: &self.context_container,
            };
            descriptor.clone_props(&context, Some(node.props()), raw_props)
        });
        Ok(descriptor.clone_shadow_node(
            node,
            ShadowNodeFragment {
                props,
                children: children.map(Arc::new),
                ..ShadowNodeFragment::default()
            },
        ))
    }

    /// Appends `child` to the unsealed `parent`.
    pub fn append_child(&self, parent: &mut ShadowNode, child: SharedShadowNode) {
        parent.append_child(child);
    }

    /// Commits `children` as the new children of the root of `surface_id`.
    ///
    /// # Errors
    ///
    /// [`UiManagerError::UnknownSurface`] if the surface is not running.
    pub fn complete_surface(
        &self,
        surface_id: SurfaceId,
        children: Vec<SharedShadowNode>,
        options: CommitOptions,
    ) -> Result<CommitStatus, UiManagerError> {
        self.shadow_tree_registry
            .visit(surface_id, |tree| {
                tree.commit(
                    |root| Some(root.clone_with(ShadowNodeFragment::children(children))),
                    options,
                )
            })
            .ok_or(UiManagerError::UnknownSurface(surface_id))
    }

    // -- Surfaces --

    /// Creates and registers the shadow tree of a starting surface.
    ///
    /// # Errors
    ///
    /// [`SurfaceError::AlreadyRegistered`] if the surface is running already.
    pub fn start_surface(
        &self,
        surface_id: SurfaceId,
        module_name: &str,
        props: &RawProps,
        layout_constraints: LayoutConstraints,
        layout_context: LayoutContext,
        display_mode: DisplayMode,
    ) -> Result<Arc<ShadowTree>, SurfaceError> {
        let mut tree = ShadowTree::new(surface_id, layout_constraints, layout_context, self.config)
            .with_delegate(Arc::clone(&self.hooks) as Arc<dyn ShadowTreeDelegate>);
        if let Some(engine) = &self.layout_engine {
            tree = tree.with_layout_engine(Arc::clone(engine));
        }
        let tree = Arc::new(tree);
        self.shadow_tree_registry.add(Arc::clone(&tree))?;
        tracing::info!(%surface_id, module_name, "surface started");
        if let Some(delegate) = self.delegate() {
            delegate.ui_manager_did_start_surface(surface_id, module_name, props, display_mode);
        }
        Ok(tree)
    }

    /// Forwards new surface props to the delegate.
    pub fn set_surface_props(
        &self,
        surface_id: SurfaceId,
        module_name: &str,
        props: &RawProps,
        display_mode: DisplayMode,
    ) {
        if let Some(delegate) = self.delegate() {
            delegate.ui_manager_did_set_surface_props(surface_id, module_name, props, display_mode);
        }
    }

    /// Unregisters and returns the shadow tree of `surface_id`.
    ///
    /// Commits already in flight finish; later lookups fail.
    pub fn stop_surface(&self, surface_id: SurfaceId) -> Option<Arc<ShadowTree>> {
        let tree = self.shadow_tree_registry.remove(surface_id)?;
        tracing::info!(%surface_id, "surface stopped");
        if let Some(delegate) = self.delegate() {
            delegate.ui_manager_did_stop_surface(surface_id);
        }
        Some(tree)
    }

    // -- Queries --

    /// Returns the version of `node` in the current revision of its surface.
    #[must_use]
    pub fn newest_clone_of_shadow_node(&self, node: &ShadowNode) -> Option<SharedShadowNode> {
        let root = self
            .shadow_tree_registry
            .visit(node.surface_id(), |tree| tree.current_revision().root)?;
        if root.same_family(node) {
            return Some(root);
        }
        root.find_in_subtree(node.family()).cloned()
    }

    /// Returns the metrics of `node` relative to `ancestor`, or to the root of
    /// its surface. Both are looked up in the current revision.
    #[must_use]
    pub fn relative_layout_metrics(
        &self,
        node: &ShadowNode,
        ancestor: Option<&ShadowNode>,
    ) -> Option<LayoutMetrics> {
        let ancestor = match ancestor {
            Some(ancestor) => self.newest_clone_of_shadow_node(ancestor)?,
            None => self
                .shadow_tree_registry
                .visit(node.surface_id(), |tree| tree.current_revision().root)?,
        };
        layout::relative_layout_metrics(node.family(), &ancestor)
    }

    /// Returns the deepest node under `point` in the current version of
    /// `node`'s subtree.
    #[must_use]
    pub fn find_node_at_point(&self, node: &ShadowNode, point: Point) -> Option<SharedShadowNode> {
        let newest = self.newest_clone_of_shadow_node(node)?;
        layout::find_node_at_point(&newest, point)
    }

    // -- Native state --

    /// Commits a new state for the node of `family`, computed by `callback`
    /// from the node's current state data.
    ///
    /// The node and its ancestors are cloned; the node is marked
    /// [`CLONED_BY_NATIVE_STATE_UPDATE`](ShadowNodeTraits::CLONED_BY_NATIVE_STATE_UPDATE).
    /// `callback` returning `None`, or the node not being in the current
    /// revision, cancels the commit.
    ///
    /// # Errors
    ///
    /// [`UiManagerError::UnknownSurface`] if the surface is not running.
    pub fn update_state(
        &self,
        family: &Arc<ShadowNodeFamily>,
        callback: impl FnOnce(Option<&SharedStateData>) -> Option<SharedStateData>,
    ) -> Result<CommitStatus, UiManagerError> {
        let surface_id = family.surface_id();
        let options = CommitOptions::from(&self.config);
        self.shadow_tree_registry
            .visit(surface_id, |tree| {
                tree.commit(
                    |root| {
                        let mut valid = true;
                        let new_root = root.clone_tree(family, |old| {
                            match callback(old.state().map(|state| state.data())) {
                                Some(data) => old.clone_with(ShadowNodeFragment {
                                    state: Some(family.create_state(data)),
                                    traits: Some(ShadowNodeTraits::CLONED_BY_NATIVE_STATE_UPDATE),
                                    ..ShadowNodeFragment::default()
                                }),
                                None => {
                                    valid = false;
                                    old.clone_with(ShadowNodeFragment::default())
                                }
                            }
                        })?;
                        valid.then_some(new_root)
                    },
                    options,
                )
            })
            .ok_or(UiManagerError::UnknownSurface(surface_id))
    }

    // -- Hooks --

    /// Registers a commit hook. Hooks run in registration order.
    pub fn register_commit_hook(&self, hook: Arc<dyn UiManagerCommitHook>) {
        let mut hooks = self.hooks.commit_hooks.write();
        debug_assert!(
            !hooks.iter().any(|registered| Arc::ptr_eq(registered, &hook)),
            "commit hook registered twice"
        );
        hooks.push(hook);
    }

    /// Unregisters a commit hook. Returns `false` if it was not registered.
    pub fn unregister_commit_hook(&self, hook: &Arc<dyn UiManagerCommitHook>) -> bool {
        let mut hooks = self.hooks.commit_hooks.write();
        let Some(position) = hooks.iter().position(|registered| Arc::ptr_eq(registered, hook)) else {
            return false;
        };
        hooks.remove(position);
        true
    }

    /// Registers a mount hook.
    pub fn register_mount_hook(&self, hook: Arc<dyn UiManagerMountHook>) {
        let mut hooks = self.hooks.mount_hooks.write();
        debug_assert!(
            !hooks.iter().any(|registered| Arc::ptr_eq(registered, &hook)),
            "mount hook registered twice"
        );
        hooks.push(hook);
    }

    /// Unregisters a mount hook. Returns `false` if it was not registered.
    pub fn unregister_mount_hook(&self, hook: &Arc<dyn UiManagerMountHook>) -> bool {
        let mut hooks = self.hooks.mount_hooks.write();
        let Some(position) = hooks.iter().position(|registered| Arc::ptr_eq(registered, hook)) else {
            return false;
        };
        hooks.remove(position);
        true
    }

    /// Tells mount hooks that the mounting layer of `surface_id` caught up
    /// with the last pulled transaction.
    pub fn report_mount(&self, surface_id: SurfaceId) {
        let time = HostTime::now();
        let root = self
            .shadow_tree_registry
            .visit(surface_id, |tree| tree.mounting_coordinator().base_root());
        let hooks = self.hooks.mount_hooks.read().clone();
        for hook in &hooks {
            match &root {
                Some(root) => hook.shadow_tree_did_mount(root, time),
                None => hook.shadow_tree_did_unmount(surface_id, time),
            }
        }
    }
}

impl core::fmt::Debug for UiManager {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("UiManager")
            .field("config", &self.config)
            .field("component_registry", &self.component_registry)
            .field("surfaces", &self.shadow_tree_registry.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    fn ui_manager() -> UiManager {
        UiManager::new(
            Arc::new(ComponentDescriptorRegistry::with_builtins()),
            Arc::new(ContextContainer::new()),
            RendererConfig::VALIDATING,
        )
    }

    fn start(ui_manager: &UiManager, surface_id: SurfaceId) -> Arc<ShadowTree> {
        ui_manager
            .start_surface(
                surface_id,
                "App",
                &RawProps::new(),
                LayoutConstraints::default(),
                LayoutContext::default(),
                DisplayMode::Visible,
            )
            .expect("surface starts")
    }

    fn view(ui_manager: &UiManager, tag: i32) -> SharedShadowNode {
        let props = RawProps::new().with("nativeID", format!("view-{tag}"));
        let node = ui_manager
            .create_node(Tag(tag), "View", SurfaceId(1), &props)
            .expect("View is registered");
        Arc::new(node)
    }

    #[test]
    fn unknown_component_is_an_error() {
        let ui_manager = ui_manager();
        let error = ui_manager
            .create_node(Tag(5), "Slider", SurfaceId(1), &RawProps::new())
            .expect_err("not registered");
        assert_eq!(error, UiManagerError::UnknownComponent("Slider".into()));
    }

    #[test]
    fn surfaces_register_once() {
        let ui_manager = ui_manager();
        start(&ui_manager, SurfaceId(1));
        let again = ui_manager.start_surface(
            SurfaceId(1),
            "App",
            &RawProps::new(),
            LayoutConstraints::default(),
            LayoutContext::default(),
            DisplayMode::Visible,
        );
        assert_eq!(again.err(), Some(SurfaceError::AlreadyRegistered(SurfaceId(1))));
        assert!(ui_manager.stop_surface(SurfaceId(1)).is_some());
        assert!(ui_manager.shadow_tree_registry().is_empty());
    }

    #[test]
    fn complete_surface_requires_a_running_surface() {
        let ui_manager = ui_manager();
        let result = ui_manager.complete_surface(SurfaceId(3), Vec::new(), CommitOptions::default());
        assert_eq!(result, Err(UiManagerError::UnknownSurface(SurfaceId(3))));
    }

    #[test]
    fn newest_clone_follows_commits() {
        let ui_manager = ui_manager();
        let tree = start(&ui_manager, SurfaceId(1));
        let child = view(&ui_manager, 10);
        ui_manager
            .complete_surface(SurfaceId(1), vec![Arc::clone(&child)], CommitOptions::default())
            .expect("running");

        let newer = ui_manager
            .clone_node(&child, None, &RawProps::new().with("opacity", 0.5))
            .expect("View is registered");
        ui_manager
            .complete_surface(SurfaceId(1), vec![Arc::new(newer)], CommitOptions::default())
            .expect("running");

        let newest = ui_manager
            .newest_clone_of_shadow_node(&child)
            .expect("still mounted");
        assert!(!Arc::ptr_eq(&newest, &child));
        assert!(Arc::ptr_eq(&newest, &tree.current_revision().root.children()[0]));
    }

    struct Veto;
    impl UiManagerCommitHook for Veto {
        fn shadow_tree_will_commit(
            &self,
            _tree: &ShadowTree,
            _old_root: &ShadowNode,
            _new_root: ShadowNode,
        ) -> Option<ShadowNode> {
            None
        }
    }

    #[test]
    fn commit_hooks_can_cancel() {
        let ui_manager = ui_manager();
        start(&ui_manager, SurfaceId(1));
        let hook: Arc<dyn UiManagerCommitHook> = Arc::new(Veto);
        ui_manager.register_commit_hook(Arc::clone(&hook));
        let status = ui_manager.complete_surface(
            SurfaceId(1),
            vec![view(&ui_manager, 10)],
            CommitOptions::default(),
        );
        assert_eq!(status, Ok(CommitStatus::Cancelled));

        assert!(ui_manager.unregister_commit_hook(&hook));
        assert!(!ui_manager.unregister_commit_hook(&hook));
        let status = ui_manager.complete_surface(
            SurfaceId(1),
            vec![view(&ui_manager, 10)],
            CommitOptions::default(),
        );
        assert_eq!(status, Ok(CommitStatus::Succeeded));
    }

    #[derive(Default)]
    struct MountLog(Mutex<Vec<Result<usize, SurfaceId>>>);
    impl UiManagerMountHook for MountLog {
        fn shadow_tree_did_mount(&self, root: &SharedShadowNode, _time: HostTime) {
            self.0.lock().push(Ok(root.children().len()));
        }
        fn shadow_tree_did_unmount(&self, surface_id: SurfaceId, _time: HostTime) {
            self.0.lock().push(Err(surface_id));
        }
    }

    #[test]
    fn report_mount_uses_the_pulled_root() {
        let ui_manager = ui_manager();
        let tree = start(&ui_manager, SurfaceId(1));
        let log = Arc::new(MountLog::default());
        ui_manager.register_mount_hook(Arc::clone(&log) as Arc<dyn UiManagerMountHook>);

        ui_manager
            .complete_surface(SurfaceId(1), vec![view(&ui_manager, 10)], CommitOptions::default())
            .expect("running");
        ui_manager.report_mount(SurfaceId(1));
        _ = tree.mounting_coordinator().pull_transaction();
        ui_manager.report_mount(SurfaceId(1));
        ui_manager.stop_surface(SurfaceId(1));
        ui_manager.report_mount(SurfaceId(1));

        assert_eq!(*log.0.lock(), [Ok(0), Ok(1), Err(SurfaceId(1))]);
    }
}
