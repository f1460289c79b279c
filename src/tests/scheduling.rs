use std::{cell::RefCell, rc::Rc};

use super::{Log, drain, html, setup, setup_with};
use crate::{
    Children, Component, ComponentType, Config, Error, NodeId, PropValue, Props, Renderer,
    Updater, VNodeRef, clone_vnode, component, element,
};

#[derive(Clone, Default)]
struct Env {
    renders: Log,
    updaters: Rc<RefCell<Vec<Updater<Counter>>>>,
}

impl Env {
    fn updater(&self, index: usize) -> Updater<Counter> {
        self.updaters.borrow()[index].clone()
    }
}

/// Counts up; `start` is applied during `will_mount`, `limit` keeps bumping after
/// every update until reached.
struct Counter {
    label: String,
    count: i64,
    limit: i64,
    updater: Updater<Self>,
    env: Env,
}

impl Component for Counter {
    fn render(&self, props: &Props) -> anyhow::Result<VNodeRef> {
        self.env.renders.borrow_mut().push(self.label.clone());
        let mut out = element("div").child(element("b").text(self.count.to_string()).build());
        if let Some(Children::Single(child)) = props.get("children").and_then(PropValue::as_children)
        {
            out = out.child(clone_vnode(child, None, vec![]));
        }
        Ok(out.build())
    }

    fn will_mount(&mut self, props: &Props) -> anyhow::Result<()> {
        if let Some(start) = props.get("start").and_then(PropValue::as_number) {
            #[allow(clippy::cast_possible_truncation)]
            let start = start as i64;
            self.updater.set_state(move |counter| counter.count = start);
        }
        Ok(())
    }

    fn did_update(&mut self, _prev: &Props, _node: Option<NodeId>) -> anyhow::Result<()> {
        if self.count < self.limit {
            self.updater.set_state(|counter| counter.count += 1);
        }
        Ok(())
    }
}

fn counter_type(env: &Env) -> ComponentType {
    let env = env.clone();
    ComponentType::class("Counter", move |props, updater: Updater<Counter>| {
        env.updaters.borrow_mut().push(updater.clone());
        #[allow(clippy::cast_possible_truncation)]
        let limit = props.get("limit").and_then(PropValue::as_number).unwrap_or(0.0) as i64;
        Counter {
            label: props
                .get("label")
                .and_then(PropValue::as_str)
                .unwrap_or("counter")
                .to_owned(),
            count: 0,
            limit,
            updater,
            env: env.clone(),
        }
    })
}

fn bump(counter: &mut Counter) {
    counter.count += 1;
}

#[test]
fn updates_to_one_instance_coalesce() {
    let env = Env::default();
    let counter = counter_type(&env);
    let (mut renderer, root) = setup();
    renderer.render(component(&counter).build(), root).unwrap();
    drain(&env.renders);

    let updater = env.updater(0);
    updater.set_state(bump);
    updater.set_state(bump);
    updater.force_update();
    assert_eq!(renderer.pending_updates(), 1);

    assert_eq!(renderer.flush().unwrap(), 1);
    assert_eq!(drain(&env.renders), ["counter"]);
    assert_eq!(html(&renderer, root), "<div><b>2</b></div>");
    assert_eq!(renderer.pending_updates(), 0);
}

#[test]
fn callbacks_run_after_the_update_lands() {
    let env = Env::default();
    let counter = counter_type(&env);
    let (mut renderer, root) = setup();
    renderer.render(component(&counter).build(), root).unwrap();

    let seen = Rc::new(RefCell::new(Vec::new()));
    let updater = env.updater(0);
    for step in 0..2 {
        let seen = seen.clone();
        updater.set_state_then(bump, move || seen.borrow_mut().push(step));
    }
    assert!(seen.borrow().is_empty());

    renderer.flush().unwrap();
    assert_eq!(*seen.borrow(), [0, 1]);
    assert_eq!(html(&renderer, root), "<div><b>2</b></div>");
}

#[test]
fn instances_render_in_the_order_they_were_marked() {
    let env = Env::default();
    let counter = counter_type(&env);
    let (mut renderer, root) = setup();
    let tree = element("section")
        .child(component(&counter).prop("label", "a").build())
        .child(component(&counter).prop("label", "b").build())
        .build();
    renderer.render(tree, root).unwrap();
    drain(&env.renders);

    env.updater(1).set_state(bump);
    env.updater(0).set_state(bump);
    assert_eq!(renderer.flush().unwrap(), 2);
    assert_eq!(drain(&env.renders), ["b", "a"]);
    assert_eq!(
        html(&renderer, root),
        "<section><div><b>1</b></div><div><b>1</b></div></section>"
    );
}

#[test]
fn a_parent_rerender_absorbs_pending_child_updates() {
    let env = Env::default();
    let counter = counter_type(&env);
    let (mut renderer, root) = setup();
    let tree = component(&counter)
        .prop("label", "parent")
        .child(component(&counter).prop("label", "child").build())
        .build();
    renderer.render(tree, root).unwrap();
    drain(&env.renders);

    env.updater(0).set_state(bump);
    env.updater(1).set_state(bump);
    renderer.flush().unwrap();
    assert_eq!(drain(&env.renders), ["parent", "child"]);
    assert_eq!(
        html(&renderer, root),
        "<div><b>1</b><div><b>1</b></div></div>"
    );
}

#[test]
fn updates_issued_while_flushing_land_in_a_later_batch() {
    let env = Env::default();
    let counter = counter_type(&env);
    let (mut renderer, root) = setup();
    renderer
        .render(component(&counter).prop("limit", 3).build(), root)
        .unwrap();
    drain(&env.renders);

    env.updater(0).set_state(bump);
    assert_eq!(renderer.flush().unwrap(), 3);
    assert_eq!(html(&renderer, root), "<div><b>3</b></div>");
}

#[test]
fn runaway_updates_stop_at_the_batch_limit() {
    let env = Env::default();
    let counter = counter_type(&env);
    let (mut renderer, root) = setup_with(Config::default().max_update_batches(4));
    renderer
        .render(component(&counter).prop("limit", 1000).build(), root)
        .unwrap();

    env.updater(0).set_state(bump);
    let error = renderer.flush().unwrap_err();
    assert!(matches!(error, Error::UpdateLoop(4)));
    assert_eq!(renderer.pending_updates(), 1);
    assert_eq!(html(&renderer, root), "<div><b>4</b></div>");
}

#[test]
fn state_set_during_will_mount_is_part_of_the_first_render() {
    let env = Env::default();
    let counter = counter_type(&env);
    let (mut renderer, root) = setup();
    renderer
        .render(component(&counter).prop("start", 5).build(), root)
        .unwrap();
    assert_eq!(drain(&env.renders), ["counter"]);
    assert_eq!(renderer.pending_updates(), 0);
    assert_eq!(html(&renderer, root), "<div><b>5</b></div>");
}

#[test]
fn manual_flush_leaves_updates_queued() {
    let env = Env::default();
    let counter = counter_type(&env);
    let (mut renderer, root) = setup_with(Config::default().auto_flush(false));
    renderer.render(component(&counter).build(), root).unwrap();

    env.updater(0).set_state(bump);
    renderer.render(component(&counter).build(), root).unwrap();
    assert_eq!(html(&renderer, root), "<div><b>1</b></div>");
    assert_eq!(renderer.pending_updates(), 0);

    env.updater(0).set_state(bump);
    assert_eq!(renderer.pending_updates(), 1);
    assert_eq!(html(&renderer, root), "<div><b>1</b></div>");
    renderer.flush().unwrap();
    assert_eq!(html(&renderer, root), "<div><b>2</b></div>");
}

#[test]
fn updates_for_unmounted_instances_are_dropped() {
    let env = Env::default();
    let counter = counter_type(&env);
    let (mut renderer, root) = setup();
    renderer.render(component(&counter).build(), root).unwrap();
    let updater = env.updater(0);
    renderer.render(None, root).unwrap();
    drain(&env.renders);

    updater.set_state(bump);
    assert_eq!(renderer.flush().unwrap(), 0);
    assert!(drain(&env.renders).is_empty());
    assert!(!renderer.is_mounted(updater.id()));

    drop(renderer);
    updater.set_state(bump);
}

#[test]
fn renderers_do_not_share_queues() {
    let env = Env::default();
    let counter = counter_type(&env);
    let (mut first, first_root) = setup();
    let mut host = ripple_memory::MemoryHost::new();
    let second_root = host.create_container();
    let mut second = Renderer::new(host);

    first.render(component(&counter).build(), first_root).unwrap();
    second.render(component(&counter).build(), second_root).unwrap();
    env.updater(1).set_state(bump);
    assert_eq!(first.pending_updates(), 0);
    assert_eq!(second.pending_updates(), 1);
    assert_eq!(second.flush().unwrap(), 1);
    assert_eq!(second.host().inner_html(second_root), "<div><b>1</b></div>");
}
