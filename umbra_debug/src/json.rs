// Copyright 2026 the Umbra Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! JSON dumps of mounting instructions.

use serde_json::{Value, json};

use umbra_core::mounting::{ShadowView, ShadowViewMutation};

/// Converts an instruction list into a JSON array, one object per
/// instruction.
///
/// Views are reduced to tag, component name, and frame. Props and state are
/// opaque and left out.
#[must_use]
pub fn mutations_to_json(mutations: &[ShadowViewMutation]) -> Value {
    Value::Array(mutations.iter().map(mutation_to_json).collect())
}

fn mutation_to_json(mutation: &ShadowViewMutation) -> Value {
    let mut object = json!({
        "type": mutation.kind().name(),
        "tag": mutation.tag().0,
    });
    if let Some(parent) = mutation.parent_tag() {
        object["parentTag"] = parent.0.into();
    }
    if let Some(index) = mutation.index() {
        object["index"] = index.into();
    }
    if let Some(old) = mutation.old_view() {
        object["old"] = view_to_json(old);
    }
    if let Some(new) = mutation.new_view() {
        object["new"] = view_to_json(new);
    }
    object
}

fn view_to_json(view: &ShadowView) -> Value {
    let frame = view.layout_metrics.frame;
    json!({
        "tag": view.tag.0,
        "componentName": view.component_name,
        "frame": {
            "x": frame.x0,
            "y": frame.y0,
            "width": frame.width(),
            "height": frame.height(),
        },
        "stateRevision": view.state.as_ref().map(|s| s.revision()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use umbra_core::node::Tag;

    fn view(tag: i32) -> ShadowView {
        ShadowView {
            tag: Tag(tag),
            component_name: "View",
            ..ShadowView::default()
        }
    }

    #[test]
    fn instructions_keep_their_addressing() {
        let list = vec![
            ShadowViewMutation::Create { new: view(5) },
            ShadowViewMutation::Insert {
                parent_tag: Tag(1),
                new: view(5),
                index: 3,
            },
            ShadowViewMutation::Update {
                parent_tag: None,
                old: view(1),
                new: view(1),
                index: None,
            },
        ];

        let value = mutations_to_json(&list);
        let array = value.as_array().unwrap();
        assert_eq!(array.len(), 3);

        assert_eq!(array[0]["type"], "create");
        assert!(array[0].get("parentTag").is_none(), "create has no parent");

        assert_eq!(array[1]["type"], "insert");
        assert_eq!(array[1]["parentTag"], 1);
        assert_eq!(array[1]["index"], 3);
        assert_eq!(array[1]["new"]["componentName"], "View");

        assert_eq!(array[2]["type"], "update");
        assert!(array[2].get("index").is_none(), "root update has no index");
        assert_eq!(array[2]["old"]["tag"], 1);
    }
}
