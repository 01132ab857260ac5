// Copyright 2026 the Umbra Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Component descriptors: the per-kind capability to parse props and create
//! or clone nodes.

mod descriptor;
mod registry;
mod root;
mod view;

pub use descriptor::{ComponentDescriptor, ContextContainer, PropsParserContext};
pub use registry::ComponentDescriptorRegistry;
pub use root::{ROOT_COMPONENT_HANDLE, ROOT_COMPONENT_NAME, RootComponentDescriptor, RootProps};
pub use view::{VIEW_COMPONENT_HANDLE, ViewComponentDescriptor, ViewProps};
