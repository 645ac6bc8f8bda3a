// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Render pipeline tests against a scripted template engine.

use crate::*;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

type Script = Box<dyn Fn(&Variables, &mut dyn ComponentRuntime) -> Result<String>>;

/// Template engine whose templates are Rust closures.
#[derive(Default)]
struct ScriptedEngine {
    scripts: HashMap<(String, Option<usize>), Script>,
    safe_classes: RefCell<Vec<(String, Vec<String>)>>,
}

impl ScriptedEngine {
    fn script<F>(mut self, template: &str, index: Option<usize>, script: F) -> Self
    where
        F: Fn(&Variables, &mut dyn ComponentRuntime) -> Result<String> + 'static,
    {
        self.scripts
            .insert((template.to_string(), index), Box::new(script));
        self
    }
}

impl TemplateEngine for ScriptedEngine {
    fn render(
        &self,
        template: &str,
        index: Option<usize>,
        variables: &Variables,
        runtime: &mut dyn ComponentRuntime,
    ) -> Result<String> {
        let script = self
            .scripts
            .get(&(template.to_string(), index))
            .ok_or_else(|| ComponentError::ResolutionError(format!("Template not found: {template}")))?;
        script(variables, runtime)
    }

    fn add_safe_class(&self, type_name: &str, strategies: &[String]) {
        self.safe_classes
            .borrow_mut()
            .push((type_name.to_string(), strategies.to_vec()));
    }
}

#[derive(Debug)]
struct Alert {
    kind: String,
    message: String,
}

impl Component for Alert {
    fn type_name(&self) -> &'static str {
        "Alert"
    }

    fn property(&self, name: &str) -> Option<Value> {
        match name {
            "type" => Some(self.kind.clone().into()),
            "message" => Some(self.message.clone().into()),
            _ => None,
        }
    }

    fn public_properties(&self) -> Vec<(String, Value)> {
        vec![
            ("type".into(), self.kind.clone().into()),
            ("message".into(), self.message.clone().into()),
        ]
    }

    fn method_names(&self) -> &'static [&'static str] {
        &["getIcon"]
    }

    fn call(&self, method: &str, _args: &[Value]) -> Result<Value> {
        match method {
            "getIcon" => Ok(if self.kind == "success" { "check" } else { "info" }.into()),
            _ => Err(self.member_not_found(method)),
        }
    }

    fn exposed(&self) -> &'static [ExposeInTemplate] {
        const EXPOSED: &[ExposeInTemplate] = &[ExposeInTemplate::method("getIcon")];
        EXPOSED
    }
}

#[derive(Debug)]
struct Card {
    title: String,
}

impl Component for Card {
    fn type_name(&self) -> &'static str {
        "Card"
    }

    fn property(&self, name: &str) -> Option<Value> {
        match name {
            "title" => Some(self.title.clone().into()),
            _ => None,
        }
    }

    fn public_properties(&self) -> Vec<(String, Value)> {
        vec![("title".into(), self.title.clone().into())]
    }
}

fn take_string(props: &mut Props, key: &str, default: &str) -> String {
    props
        .remove(key)
        .and_then(|value| value.as_str().map(str::to_string))
        .unwrap_or_else(|| default.to_string())
}

fn registry(created: Rc<Cell<usize>>) -> ComponentRegistry {
    let mut registry = ComponentRegistry::new(ComponentConfig::default());
    registry.register(ComponentDefinition::new("alert", move |props| {
        created.set(created.get() + 1);
        Ok(Rc::new(Alert {
            kind: take_string(props, "type", "info"),
            message: take_string(props, "message", ""),
        }) as Rc<dyn Component>)
    }));
    registry.register(ComponentDefinition::new("card", |props| {
        Ok(Rc::new(Card {
            title: take_string(props, "title", ""),
        }) as Rc<dyn Component>)
    }));
    registry
}

fn props(pairs: &[(&str, Value)]) -> Props {
    pairs
        .iter()
        .map(|(key, value)| (key.to_string(), value.clone()))
        .collect()
}

fn alert_script(variables: &Variables, _runtime: &mut dyn ComponentRuntime) -> Result<String> {
    Ok(format!(
        "{}|{}|{}|{}",
        variables["type"], variables["icon"], variables["message"], variables["attributes"]
    ))
}

#[test]
fn test_render_component_builds_scope() {
    let engine = ScriptedEngine::default().script("components/alert.lua", None, |variables, runtime| {
        assert!(matches!(variables["this"], Value::Component(_)));
        assert!(matches!(variables["computed"], Value::Computed(_)));
        assert_eq!(runtime.current_component().map(MountedComponent::name), Some("alert"));
        alert_script(variables, runtime)
    });
    let renderer = ComponentRenderer::new(registry(Rc::default()), engine);

    let output = renderer
        .render_component(
            "alert",
            props(&[
                ("type", "success".into()),
                ("message", "Saved".into()),
                ("id", "flash".into()),
            ]),
        )
        .unwrap();

    assert_eq!(output, r#"success|check|Saved| id="flash""#);
}

#[test]
fn test_pre_create_listener_short_circuits() {
    let created = Rc::new(Cell::new(0));
    let renderer = {
        let mut renderer = ComponentRenderer::new(registry(created.clone()), ScriptedEngine::default());
        renderer
            .dispatcher_mut()
            .listen(|event: &mut PreCreateForRenderEvent| {
                if event.name() == "alert" {
                    event.set_rendered_string("<cached/>");
                }
                Ok(())
            });
        renderer
    };

    let output = renderer.render_component("alert", Props::new()).unwrap();

    assert_eq!(output, "<cached/>");
    assert_eq!(created.get(), 0);
}

#[test]
fn test_nested_renders_share_the_stack() {
    let engine = ScriptedEngine::default()
        .script("components/alert.lua", None, |_, runtime| {
            let inner = runtime.render_component("card", props(&[("title", "Inside".into())]))?;
            let current = runtime.current_component().map(MountedComponent::name);
            Ok(format!("alert({inner}) back in {current:?}"))
        })
        .script("components/card.lua", None, |variables, runtime| {
            let current = runtime.current_component().map(MountedComponent::name);
            Ok(format!("{} in {current:?}", variables["title"]))
        });
    let renderer = ComponentRenderer::new(registry(Rc::default()), engine);
    let mut stack = ComponentStack::new();

    let output = renderer
        .create_and_render(&mut stack, "alert", Props::new())
        .unwrap();

    assert_eq!(output, r#"alert(Inside in Some("card")) back in Some("alert")"#);
    assert!(stack.is_empty());
}

#[test]
fn test_failed_render_pops_stack_and_dispatches_post_render() {
    let engine = ScriptedEngine::default().script("components/alert.lua", None, |_, _| {
        Err(ComponentError::Logic("template exploded".into()))
    });
    let post_renders = Rc::new(Cell::new(0));
    let mut renderer = ComponentRenderer::new(registry(Rc::default()), engine);
    {
        let post_renders = post_renders.clone();
        renderer
            .dispatcher_mut()
            .listen(move |event: &mut PostRenderEvent| {
                assert_eq!(event.mounted().name(), "alert");
                post_renders.set(post_renders.get() + 1);
                Ok(())
            });
    }
    let mut stack = ComponentStack::new();

    let err = renderer
        .create_and_render(&mut stack, "alert", Props::new())
        .unwrap_err();

    assert!(matches!(err, ComponentError::Logic(message) if message == "template exploded"));
    assert!(stack.is_empty());
    assert_eq!(post_renders.get(), 1);
}

#[test]
fn test_render_error_keeps_post_render_error_attached() {
    let engine = ScriptedEngine::default().script("components/alert.lua", None, |_, _| {
        Err(ComponentError::Logic("template".into()))
    });
    let mut renderer = ComponentRenderer::new(registry(Rc::default()), engine);
    renderer
        .dispatcher_mut()
        .listen(|_: &mut PostRenderEvent| Err(ComponentError::Logic("listener".into())));

    let mut stack = ComponentStack::new();
    let err = renderer
        .create_and_render(&mut stack, "alert", Props::new())
        .unwrap_err();
    assert!(matches!(err.render_error(), ComponentError::Logic(message) if message == "template"));
    match &err {
        ComponentError::PostRenderFailed { listener, .. } => {
            assert!(matches!(listener.as_ref(), ComponentError::Logic(message) if message == "listener"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(
        err.to_string(),
        "Logic error: template (post render listener also failed: Logic error: listener)"
    );
    assert!(stack.is_empty());
}

#[test]
fn test_post_render_error_fails_a_successful_render() {
    let engine = ScriptedEngine::default().script("components/alert.lua", None, alert_script);
    let mut renderer = ComponentRenderer::new(registry(Rc::default()), engine);
    renderer
        .dispatcher_mut()
        .listen(|_: &mut PostRenderEvent| Err(ComponentError::Logic("listener".into())));

    let err = renderer.render_component("alert", Props::new()).unwrap_err();
    assert!(matches!(err, ComponentError::Logic(message) if message == "listener"));
}

#[test]
fn test_pre_render_listener_changes_template_and_variables() {
    let engine = ScriptedEngine::default()
        .script("components/alert.lua", None, alert_script)
        .script("themes/dark/alert.lua", None, |variables, _| {
            Ok(format!("dark {} {}", variables["theme"], variables["type"]))
        });
    let mut renderer = ComponentRenderer::new(registry(Rc::default()), engine);
    renderer
        .dispatcher_mut()
        .listen(|event: &mut PreRenderEvent| {
            assert!(!event.is_embedded());
            assert_eq!(event.template(), "components/alert.lua");
            event.set_template("themes/dark/alert.lua", None);
            event
                .variables_mut()
                .insert("theme".to_string(), "night".into());
            Ok(())
        });

    let output = renderer
        .render_component("alert", props(&[("type", "warning".into())]))
        .unwrap();
    assert_eq!(output, "dark night warning");
}

#[test]
fn test_safe_class_is_registered_once() {
    let engine = ScriptedEngine::default().script("components/alert.lua", None, alert_script);
    let renderer = ComponentRenderer::new(registry(Rc::default()), engine);

    renderer.render_component("alert", Props::new()).unwrap();
    renderer.render_component("alert", Props::new()).unwrap();

    assert_eq!(
        *renderer.engine().safe_classes.borrow(),
        vec![(ComponentAttributes::TYPE_NAME.to_string(), vec!["html".to_string()])]
    );
}

#[test]
fn test_unknown_component_lists_registered_names() {
    let renderer = ComponentRenderer::new(registry(Rc::default()), ScriptedEngine::default());

    let err = renderer.render_component("modal", Props::new()).unwrap_err();
    match err {
        ComponentError::UnknownComponent { name, known } => {
            assert_eq!(name, "modal");
            assert_eq!(known, "alert, card");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_embedded_context_wraps_this_in_hierarchy() {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let mut renderer = ComponentRenderer::new(registry(Rc::default()), ScriptedEngine::default());
    {
        let seen = seen.clone();
        renderer
            .dispatcher_mut()
            .listen(move |event: &mut PreRenderEvent| {
                seen.borrow_mut().push((
                    event.is_embedded(),
                    event.mounted().extra_metadata("hostTemplate").cloned(),
                    event.mounted().extra_metadata("embeddedTemplateIndex").cloned(),
                ));
                Ok(())
            });
    }

    let alert: Rc<dyn Component> = Rc::new(Alert {
        kind: "info".into(),
        message: "outer".into(),
    });
    let context = props(&[("this", Value::Component(alert.clone())), ("lang", "en".into())]);

    let variables = renderer
        .embedded_context("card", props(&[("title", "Inner".into())]), context, "page.lua", 3)
        .unwrap();

    let Value::Hierarchy(hierarchy) = &variables["this"] else {
        panic!("expected a hierarchy, got {:?}", variables["this"]);
    };
    assert_eq!(hierarchy.resolve("title", &[]).unwrap(), Value::from("Inner"));
    let parent = hierarchy.parent().unwrap();
    assert_eq!(parent.resolve("message", &[]).unwrap(), Value::from("outer"));
    assert!(parent.parent().is_none());

    assert_eq!(variables["lang"], Value::from("en"));
    assert_eq!(variables["title"], Value::from("Inner"));
    assert!(matches!(variables[OUTER_BLOCKS], Value::BlockStack(_)));
    assert_eq!(
        *seen.borrow(),
        vec![(true, Some(Value::from("page.lua")), Some(Value::Int(3)))]
    );
}

#[test]
fn test_embedded_context_keeps_existing_outer_blocks() {
    let renderer = ComponentRenderer::new(registry(Rc::default()), ScriptedEngine::default());
    let blocks = BlockStack::new();
    blocks.push("content");

    let context = props(&[(OUTER_BLOCKS, Value::BlockStack(blocks.clone()))]);
    let variables = renderer
        .embedded_context("card", Props::new(), context, "page.lua", 1)
        .unwrap();

    assert_eq!(variables[OUTER_BLOCKS], Value::BlockStack(blocks));
    assert!(matches!(variables["this"], Value::Component(_)));
}

#[test]
fn test_embedded_context_nests_existing_hierarchy() {
    let renderer = ComponentRenderer::new(registry(Rc::default()), ScriptedEngine::default());
    let outer: Rc<dyn Component> = Rc::new(Card { title: "root".into() });

    let first = renderer
        .embedded_context(
            "card",
            props(&[("title", "middle".into())]),
            props(&[("this", Value::Component(outer))]),
            "page.lua",
            1,
        )
        .unwrap();
    let second = renderer
        .embedded_context("card", props(&[("title", "leaf".into())]), first, "page.lua", 2)
        .unwrap();

    let Value::Hierarchy(hierarchy) = &second["this"] else {
        panic!("expected a hierarchy");
    };
    assert_eq!(hierarchy.depth(), 3);
    let titles: Vec<Value> = std::iter::successors(Some(hierarchy), |node| node.parent())
        .map(|node| node.resolve("title", &[]).unwrap())
        .collect();
    assert_eq!(titles, vec!["leaf".into(), "middle".into(), "root".into()]);
}
