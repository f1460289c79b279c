use std::rc::Rc;

use super::{Log, drain, html, setup};
use crate::{
    Component, ComponentType, Error, NodeId, PropValue, Props, Ref, RefTarget, VNodeRef,
    component, element,
};

struct Probe {
    label: String,
    log: Log,
}

impl Probe {
    fn note(&self, event: impl std::fmt::Display) {
        self.log.borrow_mut().push(format!("{}:{event}", self.label));
    }
}

impl Component for Probe {
    fn render(&self, props: &Props) -> anyhow::Result<VNodeRef> {
        self.note("render");
        let mut out = element("p");
        if let Some(children) = props.get("children") {
            out = out.prop("children", children.clone());
        }
        Ok(out.build())
    }

    fn will_mount(&mut self, _props: &Props) -> anyhow::Result<()> {
        self.note("will_mount");
        Ok(())
    }

    fn did_mount(&mut self, node: Option<NodeId>) -> anyhow::Result<()> {
        self.note(format_args!("did_mount:{}", node.is_some()));
        Ok(())
    }

    fn will_receive_props(&mut self, _next: &Props) -> anyhow::Result<()> {
        self.note("will_receive_props");
        Ok(())
    }

    fn should_update(&self, _current: &Props, next: &Props) -> bool {
        self.note("should_update");
        next.get("frozen").and_then(PropValue::as_bool) != Some(true)
    }

    fn will_update(&mut self, _props: &Props) -> anyhow::Result<()> {
        self.note("will_update");
        Ok(())
    }

    fn did_update(&mut self, _prev: &Props, _node: Option<NodeId>) -> anyhow::Result<()> {
        self.note("did_update");
        if self.label == "sulky" {
            anyhow::bail!("did_update refused");
        }
        Ok(())
    }

    fn will_unmount(&mut self, node: Option<NodeId>) -> anyhow::Result<()> {
        self.note(format_args!("will_unmount:{:?}", node.map(NodeId::index)));
        if self.label == "stubborn" {
            anyhow::bail!("will_unmount refused");
        }
        Ok(())
    }
}

fn probe_type(log: &Log) -> ComponentType {
    let log = Rc::clone(log);
    ComponentType::class("Probe", move |props, _| Probe {
        label: props
            .get("label")
            .and_then(PropValue::as_str)
            .unwrap_or("probe")
            .to_owned(),
        log: Rc::clone(&log),
    })
}

#[test]
fn mount_runs_hooks_inside_out() {
    let log = Log::default();
    let probe = probe_type(&log);
    let (mut renderer, root) = setup();

    let inner = component(&probe).prop("label", "inner").text("hi").build();
    let outer = component(&probe).prop("label", "outer").child(inner).build();
    renderer.render(outer, root).unwrap();

    assert_eq!(html(&renderer, root), "<p><p>hi</p></p>");
    assert_eq!(
        drain(&log),
        [
            "outer:will_mount",
            "outer:render",
            "inner:will_mount",
            "inner:render",
            "inner:did_mount:true",
            "outer:did_mount:true",
        ]
    );
}

#[test]
fn prop_updates_run_the_update_hooks_in_order() {
    let log = Log::default();
    let probe = probe_type(&log);
    let (mut renderer, root) = setup();

    renderer
        .render(component(&probe).prop("label", "a").text("1").build(), root)
        .unwrap();
    drain(&log);
    renderer
        .render(component(&probe).prop("label", "a").text("2").build(), root)
        .unwrap();

    assert_eq!(html(&renderer, root), "<p>2</p>");
    assert_eq!(
        drain(&log),
        [
            "a:will_receive_props",
            "a:should_update",
            "a:will_update",
            "a:render",
            "a:did_update",
        ]
    );
}

#[test]
fn declined_updates_still_take_the_new_props() {
    let log = Log::default();
    let probe = probe_type(&log);
    let (mut renderer, root) = setup();
    let handle = Ref::holder();

    renderer
        .render(
            component(&probe).node_ref(handle.clone()).text("1").build(),
            root,
        )
        .unwrap();
    let id = handle.current().and_then(RefTarget::instance).unwrap();
    assert!(renderer.component::<Probe>(id).is_some());
    drain(&log);

    renderer
        .render(
            component(&probe)
                .node_ref(handle.clone())
                .prop("frozen", true)
                .text("2")
                .build(),
            root,
        )
        .unwrap();
    assert_eq!(drain(&log), ["probe:will_receive_props", "probe:should_update"]);
    assert_eq!(html(&renderer, root), "<p>1</p>");
    let props = renderer.props_of(id).unwrap();
    assert_eq!(props.get("frozen").and_then(PropValue::as_bool), Some(true));
}

#[test]
fn unmount_sees_the_attached_node_and_releases_the_instance() {
    let log = Log::default();
    let probe = probe_type(&log);
    let (mut renderer, root) = setup();
    let handle = Ref::holder();

    let inner = component(&probe).prop("label", "inner").build();
    let outer = component(&probe)
        .prop("label", "outer")
        .node_ref(handle.clone())
        .child(inner)
        .build();
    renderer.render(outer, root).unwrap();
    let id = handle.current().and_then(RefTarget::instance).unwrap();
    let outer_p = renderer.host().children(root)[0];
    let inner_p = renderer.host().children(outer_p)[0];
    drain(&log);

    renderer.render(None, root).unwrap();
    assert_eq!(
        drain(&log),
        [
            format!("outer:will_unmount:Some({})", outer_p.index()),
            format!("inner:will_unmount:Some({})", inner_p.index()),
        ]
    );
    assert!(!renderer.is_mounted(id));
    assert!(handle.current().is_none());
    assert!(renderer.host().is_released(outer_p));
    assert_eq!(html(&renderer, root), "");
}

#[test]
fn hoisted_component_descriptors_are_not_rerendered() {
    let log = Log::default();
    let probe = probe_type(&log);
    let (mut renderer, root) = setup();
    let sidebar = component(&probe).prop("label", "sidebar").build();
    let page = |title: &str| {
        element("main")
            .child(element("h1").text(title).build())
            .child(sidebar.clone())
            .build()
    };

    renderer.render(page("one"), root).unwrap();
    drain(&log);
    renderer.render(page("two"), root).unwrap();
    assert!(drain(&log).is_empty());
    assert_eq!(html(&renderer, root), "<main><h1>two</h1><p></p></main>");
}

#[test]
fn replacing_a_component_unmounts_before_mounting() {
    let log = Log::default();
    let probe = probe_type(&log);
    let (mut renderer, root) = setup();
    let shared = Ref::holder();

    renderer
        .render(
            component(&probe)
                .prop("label", "old")
                .node_ref(shared.clone())
                .build(),
            root,
        )
        .unwrap();
    let old = shared.current().and_then(RefTarget::instance).unwrap();
    drain(&log);

    renderer
        .render(
            component(&probe)
                .prop("label", "new")
                .node_ref(shared.clone())
                .recreate()
                .build(),
            root,
        )
        .unwrap();
    assert_eq!(
        drain(&log),
        [
            "old:will_unmount:Some(1)",
            "new:will_mount",
            "new:render",
            "new:did_mount:true",
        ]
    );
    assert!(!renderer.is_mounted(old));
    let new = shared.current().and_then(RefTarget::instance).unwrap();
    assert_ne!(new, old);
    assert!(renderer.is_mounted(new));
    assert_eq!(html(&renderer, root), "<p></p>");
}

#[test]
fn unmount_errors_surface_after_teardown() {
    let log = Log::default();
    let probe = probe_type(&log);
    let (mut renderer, root) = setup();

    renderer
        .render(component(&probe).prop("label", "stubborn").build(), root)
        .unwrap();
    let error = renderer.render(None, root).unwrap_err();
    assert!(matches!(error, Error::Hook(_)));
    assert!(!renderer.is_rendered(root));
    assert_eq!(html(&renderer, root), "");

    renderer.render(element("div").build(), root).unwrap();
    assert_eq!(html(&renderer, root), "<div></div>");
}

#[test]
fn did_update_errors_surface_after_the_patch() {
    let log = Log::default();
    let probe = probe_type(&log);
    let (mut renderer, root) = setup();

    renderer
        .render(component(&probe).prop("label", "sulky").text("1").build(), root)
        .unwrap();
    let error = renderer
        .render(component(&probe).prop("label", "sulky").text("2").build(), root)
        .unwrap_err();
    assert!(error.to_string().contains("did_update refused"));
    assert_eq!(html(&renderer, root), "<p>2</p>");
}

#[test]
fn function_components_rerender_on_new_props() {
    let (mut renderer, root) = setup();
    let greeting = ComponentType::function("Greeting", |props: &Props| {
        let name = props.get("name").and_then(PropValue::as_str).unwrap_or("nobody");
        Ok(element("span").text(format!("hello {name}")).build())
    });

    renderer
        .render(component(&greeting).prop("name", "ann").build(), root)
        .unwrap();
    renderer
        .render(component(&greeting).prop("name", "bo").build(), root)
        .unwrap();
    assert_eq!(html(&renderer, root), "<span>hello bo</span>");
}

#[test]
fn separately_declared_function_components_remount() {
    let (mut renderer, root) = setup();
    let labelled = |label: &'static str| {
        ComponentType::function("Labelled", move |_: &Props| {
            Ok(element("span").text(label).build())
        })
    };
    let first = labelled("first");
    let second = labelled("second");

    renderer.render(component(&first).build(), root).unwrap();
    let old = renderer.host().children(root)[0];
    renderer.render(component(&second).build(), root).unwrap();
    assert_eq!(html(&renderer, root), "<span>second</span>");
    assert!(renderer.host().is_released(old));

    renderer.render(component(&second).prop("x", 1).build(), root).unwrap();
    assert_eq!(html(&renderer, root), "<span>second</span>");
}
