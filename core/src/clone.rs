//! Descriptor cloning with prop merging, used by higher-order components.

use alloc::{rc::Rc, string::String, vec::Vec};

use crate::{
    node::{Children, Kind, VNode, VNodeRef, empty, fragment, key_from_prop, text},
    props::PropValue,
    Props,
};

/// One override-child argument of [`clone_vnode`].
#[derive(Debug, Clone)]
pub enum ChildArg {
    /// An explicit empty slot.
    Empty,
    /// A descriptor.
    Node(VNodeRef),
    /// Literal text.
    Text(Rc<str>),
    /// A nested list; flattened one level when it is the only argument.
    List(Vec<ChildArg>),
}

impl ChildArg {
    fn into_vnode(self) -> VNodeRef {
        match self {
            Self::Empty => empty(),
            Self::Node(node) => node,
            Self::Text(content) => text(content),
            Self::List(list) => fragment()
                .unkeyed_children(list.into_iter().map(Self::into_vnode))
                .build(),
        }
    }
}

impl From<VNodeRef> for ChildArg {
    fn from(value: VNodeRef) -> Self {
        Self::Node(value)
    }
}

impl From<Option<VNodeRef>> for ChildArg {
    fn from(value: Option<VNodeRef>) -> Self {
        value.map_or(Self::Empty, Self::Node)
    }
}

impl From<&str> for ChildArg {
    fn from(value: &str) -> Self {
        Self::Text(value.into())
    }
}

impl From<String> for ChildArg {
    fn from(value: String) -> Self {
        Self::Text(value.into())
    }
}

impl<T: Into<Self>> From<Vec<T>> for ChildArg {
    fn from(value: Vec<T>) -> Self {
        Self::List(value.into_iter().map(Into::into).collect())
    }
}

/// Clones `original`, merging `overrides` over its props and replacing its children.
///
/// - A prop present in `overrides` wins; an override of [`PropValue::Null`] removes it.
/// - `key` and `ref` overrides land on the result's key and ref, never in its props.
/// - Children come from `children` when it is non-empty, else from a `children`
///   override, else from `original`. A sole list argument is flattened one level and a
///   sole [`ChildArg::Empty`] clears the children.
/// - Components receive their children through `props.children`; text descriptors take
///   the new children as their content.
///
/// `original` is never modified, and a clone without child overrides shares the
/// original's child descriptors.
#[must_use]
pub fn clone_vnode(original: &VNode, overrides: Option<&Props>, children: Vec<ChildArg>) -> VNodeRef {
    let mut props = original.props.clone();
    let mut key = original.key.clone();
    let mut node_ref = original.node_ref.clone();
    let mut children_override = None;

    for (name, value) in overrides.into_iter().flat_map(|overrides| overrides.iter()) {
        match name {
            "key" => key = key_from_prop(value),
            "ref" => {
                node_ref = match value {
                    PropValue::Ref(node_ref) => Some(node_ref.clone()),
                    _ => None,
                };
            }
            "children" => children_override = Some(Children::from_prop(value)),
            _ if value.is_null() => {
                props.remove(name);
            }
            _ => {
                props.insert(name, value.clone());
            }
        }
    }

    let replacement = if children.is_empty() {
        children_override
    } else {
        Some(children_from_args(children))
    };

    let children = match (&original.kind, replacement) {
        (_, None) => original.children.clone(),
        (Kind::Component(_), Some(next)) => {
            if matches!(next, Children::None) {
                props.remove("children");
            } else {
                props.insert("children", next);
            }
            Children::None
        }
        (Kind::Text, Some(next)) => Children::Text(text_content(&next).into()),
        (Kind::Element(_), Some(next)) => next,
        (Kind::Fragment | Kind::Portal(_), Some(next)) => next.without_text(),
        (Kind::Empty | Kind::Unknown(_), Some(_)) => original.children.clone(),
    };

    Rc::new(VNode {
        kind: original.kind.clone(),
        key,
        props,
        children,
        node_ref,
        recreate: original.recreate,
    })
}

fn children_from_args(mut args: Vec<ChildArg>) -> Children {
    if args.len() == 1 {
        return match args.pop() {
            Some(ChildArg::List(list)) => children_from_list(list),
            Some(ChildArg::Node(node)) => Children::Single(node),
            Some(ChildArg::Text(content)) => Children::Text(content),
            Some(ChildArg::Empty) | None => Children::None,
        };
    }
    children_from_list(args)
}

fn children_from_list(list: Vec<ChildArg>) -> Children {
    Children::from_list(list.into_iter().map(ChildArg::into_vnode).collect())
}

fn text_content(children: &Children) -> String {
    match children {
        Children::Text(content) => String::from(&**content),
        other => other
            .as_slice()
            .iter()
            .filter_map(|child| child.text())
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ComponentType, Key, Ref, element};

    #[test]
    fn child_arguments_beat_children_override() {
        let original = element("div").text("f").build();
        let link = element("a").text("1").build();
        let cloned = clone_vnode(
            &original,
            Some(&Props::new().with("children", "x")),
            vec![link.clone().into()],
        );
        assert!(matches!(cloned.children(), Children::Single(child) if Rc::ptr_eq(child, &link)));
        assert_eq!(original.children().text(), Some("f"));
    }

    #[test]
    fn children_override_beats_original() {
        let original = element("div").text("f").build();
        let cloned = clone_vnode(&original, Some(&Props::new().with("children", "x")), vec![]);
        assert_eq!(cloned.children().text(), Some("x"));
    }

    #[test]
    fn null_override_removes_prop() {
        let original = element("div").class_name("test").build();
        let cloned = clone_vnode(&original, Some(&Props::new().with("className", ())), vec![]);
        assert!(cloned.props().get("className").is_none());
        assert_eq!(original.props().get("className").and_then(PropValue::as_str), Some("test"));
    }

    #[test]
    fn key_survives_unrelated_overrides() {
        let original = element("div").key("test").build();
        let cloned = clone_vnode(&original, Some(&Props::new().with("className", ())), vec![]);
        assert_eq!(cloned.key().map(Key::as_str), Some("test"));
    }

    #[test]
    fn key_and_ref_overrides_are_lifted() {
        let holder = Ref::holder();
        let original = element("div").key("a").build();
        let cloned = clone_vnode(
            &original,
            Some(&Props::new().with("key", "b").with("ref", holder.clone())),
            vec![],
        );
        assert_eq!(cloned.key().map(Key::as_str), Some("b"));
        assert_eq!(cloned.node_ref(), Some(&holder));
        assert!(cloned.props().is_empty());
    }

    #[test]
    fn sole_list_argument_is_flattened() {
        let original = element("ul").build();
        let cloned = clone_vnode(
            &original,
            None,
            vec![ChildArg::List(vec![
                element("li").key("a").build().into(),
                element("li").key("b").build().into(),
            ])],
        );
        assert!(matches!(cloned.children(), Children::Keyed(list) if list.len() == 2));
    }

    #[test]
    fn empty_slots_are_kept_in_sequences() {
        let original = element("div").build();
        let cloned = clone_vnode(
            &original,
            None,
            vec![ChildArg::Empty, element("span").build().into(), "tail".into()],
        );
        let list = cloned.children().as_slice();
        assert_eq!(list.len(), 3);
        assert!(matches!(list[0].kind(), Kind::Empty));
        assert_eq!(list[2].text(), Some("tail"));
    }

    #[test]
    fn sole_empty_argument_clears_children() {
        let original = element("div").text("gone").build();
        let cloned = clone_vnode(&original, None, vec![ChildArg::Empty]);
        assert!(cloned.children().is_empty());
    }

    #[test]
    fn component_children_go_through_props() {
        let ty = ComponentType::function("Wrap", |_| Ok(crate::empty()));
        let original = crate::component(&ty).prop("title", "t").build();
        let cloned = clone_vnode(&original, None, vec!["inner".into()]);
        assert!(matches!(cloned.children(), Children::None));
        assert!(matches!(
            cloned.props().get("children"),
            Some(PropValue::Children(Children::Text(content))) if &**content == "inner"
        ));
        assert_eq!(cloned.props().get("title").and_then(PropValue::as_str), Some("t"));
    }

    #[test]
    fn text_descriptors_take_new_content() {
        let original = text("old");
        let cloned = clone_vnode(&original, None, vec!["new".into()]);
        assert_eq!(cloned.text(), Some("new"));
    }

    #[test]
    fn fragments_share_children_without_overrides() {
        let first = element("b").build();
        let original = fragment().child(first.clone()).child(text("x")).build();
        let cloned = clone_vnode(&original, Some(&Props::new().with("id", "f")), vec![]);
        assert!(Rc::ptr_eq(&cloned.children().as_slice()[0], &first));
        assert_eq!(cloned.children(), original.children());
    }
}
