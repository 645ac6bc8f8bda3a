// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Template scope construction.
//!
//! The variables of one render are merged from these sources, each one
//! overriding the ones before it:
//!
//! 1. the ambient context
//! 2. `this`: the component, or a [`Hierarchy`] for embedded renders
//! 3. `computed`: a [`ComputedPropertiesProxy`] over the component
//! 4. the attributes bag, under the metadata's attributes variable
//! 5. the exposed variables (public properties, then exposed members)

use crate::component::{lcfirst, Component, ExposeTarget, PropertyAccessor};
use crate::computed::ComputedPropertiesProxy;
use crate::error::{ComponentError, Result};
use crate::events::PreRenderEvent;
use crate::hierarchy::extend_hierarchy;
use crate::mounted::{ComponentMetadata, MountedComponent};
use crate::value::{Value, Variables};
use std::rc::Rc;

/// Collects the variables a component exposes to its template.
///
/// Public properties come first when `expose_public_props` is set, then the
/// entries of the component's exposure table in declaration order. Names
/// are not deduplicated; a later entry wins once the list becomes a map.
///
/// # Errors
///
/// Returns [`ComponentError::Logic`] for an exposed method that requires
/// parameters, and propagates failures of getters and property reads.
pub fn exposed_variables(
    component: &dyn Component,
    expose_public_props: bool,
    accessor: &dyn PropertyAccessor,
) -> Result<Vec<(String, Value)>> {
    let mut exposed = Vec::new();

    if expose_public_props {
        exposed.extend(component.public_properties());
    }

    for entry in component.exposed() {
        if let ExposeTarget::Property { property, getter } = entry.target {
            let value = match getter {
                Some(getter) => component.call(getter.trim_end_matches(['(', ')']), &[])?,
                None => accessor.get_value(component, property)?,
            };
            exposed.push((entry.name.unwrap_or(property).to_string(), value));
        }
    }

    for entry in component.exposed() {
        if let ExposeTarget::Method {
            method,
            required_params,
        } = entry.target
        {
            let name = match entry.name {
                Some(name) => name.to_string(),
                None => match method.strip_prefix("get") {
                    Some(rest) => lcfirst(rest),
                    None => method.to_string(),
                },
            };

            if required_params > 0 {
                return Err(ComponentError::Logic(format!(
                    "Cannot expose methods with required parameters in templates ({}::{}).",
                    component.type_name(),
                    method
                )));
            }

            exposed.push((name, component.call(method, &[])?));
        }
    }

    Ok(exposed)
}

/// Builds the variables for rendering `mounted`.
///
/// When the context is marked as embedded and already binds `this`, the
/// new component is added to a [`Hierarchy`](crate::Hierarchy) rooted at
/// the enclosing binding. Otherwise `this` is the component itself.
pub fn build_scope(
    mounted: &MountedComponent,
    metadata: &ComponentMetadata,
    context: Variables,
    accessor: &dyn PropertyAccessor,
) -> Result<Variables> {
    let component: &Rc<dyn Component> = mounted.component();

    let embedded = context
        .get(PreRenderEvent::EMBEDDED)
        .and_then(Value::as_bool)
        .unwrap_or(false);
    let this = match context.get("this") {
        Some(outer) if embedded => Value::Hierarchy(extend_hierarchy(outer, component.clone())?),
        _ => Value::Component(component.clone()),
    };

    let mut variables = context;
    variables.insert("this".to_string(), this);
    variables.insert(
        "computed".to_string(),
        Value::Computed(ComputedPropertiesProxy::new(component.clone())),
    );
    variables.insert(
        metadata.attributes_var().to_string(),
        Value::Attributes(mounted.attributes().clone()),
    );
    variables.extend(exposed_variables(
        component.as_ref(),
        metadata.is_public_props_exposed(),
        accessor,
    )?);

    Ok(variables)
}
