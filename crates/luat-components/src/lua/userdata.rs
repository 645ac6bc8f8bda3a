// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Userdata wrappers exposing renderer objects to Lua.
//!
//! Member access on components and hierarchies goes through the same lookup
//! as the Rust API. `this.title` reads a property or keyed entry. A name that
//! matches a method exactly yields a function, so both `this.add(2)` and
//! `this:add(2)` work.
//!
//! A name that only matches a `get`/`is`/`has` method (`this.double` for
//! `getDouble`) yields a getter. Calling it forwards the arguments
//! (`this.count(5, 10)`); using it as a value in concatenation, arithmetic,
//! ordering, `tostring` or a helper argument calls it with no arguments.
//! Lua does not consult metamethods for truthiness or for `==` against a
//! plain value, so conditions must call the getter: `if this.ready() then`.

use super::convert::{from_lua, table_to_variables, to_lua};
use crate::attributes::ComponentAttributes;
use crate::block_stack::BlockStack;
use crate::component::Component;
use crate::computed::ComputedPropertiesProxy;
use crate::hierarchy::{lookup_member, Hierarchy, Member};
use crate::value::Value;
use mlua::{
    Lua, MetaMethod, MultiValue, ObjectLike, Table, UserData, UserDataMethods, Value as LuaValue,
    Variadic,
};
use std::rc::Rc;

pub(crate) struct LuaComponent(pub(crate) Rc<dyn Component>);

pub(crate) struct LuaHierarchy(pub(crate) Hierarchy);

pub(crate) struct LuaComputed(pub(crate) ComputedPropertiesProxy);

pub(crate) struct LuaAttributes(pub(crate) ComponentAttributes);

pub(crate) struct LuaBlockStack(pub(crate) BlockStack);

/// A member reached through `get`/`is`/`has` normalization.
pub(crate) struct LuaGetter {
    component: Rc<dyn Component>,
    method: String,
}

impl LuaGetter {
    /// Reads the getter without arguments.
    pub(crate) fn get(&self) -> crate::error::Result<Value> {
        self.component.call(&self.method, &[])
    }
}

fn same_component(a: &Rc<dyn Component>, b: &Rc<dyn Component>) -> bool {
    std::ptr::addr_eq(Rc::as_ptr(a), Rc::as_ptr(b))
}

/// True if `value` is the object the method was read from, as passed by
/// `this:method()`. Other components passed as arguments are kept.
fn is_receiver(value: &LuaValue, component: &Rc<dyn Component>) -> bool {
    let LuaValue::UserData(userdata) = value else {
        return false;
    };
    if let Ok(receiver) = userdata.borrow::<LuaComponent>() {
        return same_component(&receiver.0, component);
    }
    if let Ok(receiver) = userdata.borrow::<LuaHierarchy>() {
        return same_component(receiver.0.component(), component);
    }
    false
}

fn call_method(
    lua: &Lua,
    component: &Rc<dyn Component>,
    method: &str,
    args: MultiValue,
) -> mlua::Result<LuaValue> {
    let mut args = args.into_iter().peekable();
    if args.peek().is_some_and(|first| is_receiver(first, component)) {
        args.next();
    }
    let args = args.map(from_lua).collect::<mlua::Result<Vec<_>>>()?;
    let result = component.call(method, &args).map_err(mlua::Error::external)?;
    to_lua(lua, &result)
}

/// Looks up `name` on `component` and converts the result for Lua.
fn member(lua: &Lua, component: &Rc<dyn Component>, name: &str) -> mlua::Result<LuaValue> {
    match lookup_member(component.as_ref(), name).map_err(mlua::Error::external)? {
        Member::Value(value) => to_lua(lua, &value),
        Member::Method(method) if method != name => {
            let getter = LuaGetter {
                component: component.clone(),
                method,
            };
            Ok(LuaValue::UserData(lua.create_userdata(getter)?))
        }
        Member::Method(method) => {
            let component = component.clone();
            let function = lua.create_function(move |lua, args: MultiValue| {
                call_method(lua, &component, &method, args)
            })?;
            Ok(LuaValue::Function(function))
        }
    }
}

/// Replaces a getter operand with the value it reads.
fn resolve(lua: &Lua, value: LuaValue) -> mlua::Result<LuaValue> {
    if let LuaValue::UserData(userdata) = &value {
        if let Ok(getter) = userdata.borrow::<LuaGetter>() {
            let resolved = getter.get().map_err(mlua::Error::external)?;
            return to_lua(lua, &resolved);
        }
    }
    Ok(value)
}

fn operand_error(operation: &str, value: &LuaValue) -> mlua::Error {
    mlua::Error::runtime(format!("attempt to {operation} a {} value", value.type_name()))
}

fn to_float(value: &LuaValue) -> Option<f64> {
    match value {
        LuaValue::Integer(i) => Some(*i as f64),
        LuaValue::Number(n) => Some(*n),
        _ => None,
    }
}

fn arithmetic(
    lua: &Lua,
    (a, b): (LuaValue, LuaValue),
    int_op: fn(i64, i64) -> i64,
    float_op: fn(f64, f64) -> f64,
) -> mlua::Result<LuaValue> {
    let (a, b) = (resolve(lua, a)?, resolve(lua, b)?);
    if let (LuaValue::Integer(x), LuaValue::Integer(y)) = (&a, &b) {
        return Ok(LuaValue::Integer(int_op(*x, *y)));
    }
    match (to_float(&a), to_float(&b)) {
        (Some(x), Some(y)) => Ok(LuaValue::Number(float_op(x, y))),
        (None, _) => Err(operand_error("perform arithmetic on", &a)),
        (_, None) => Err(operand_error("perform arithmetic on", &b)),
    }
}

fn compare(lua: &Lua, (a, b): (LuaValue, LuaValue)) -> mlua::Result<std::cmp::Ordering> {
    let (a, b) = (resolve(lua, a)?, resolve(lua, b)?);
    match (&a, &b) {
        (LuaValue::Integer(x), LuaValue::Integer(y)) => Ok(x.cmp(y)),
        (LuaValue::String(x), LuaValue::String(y)) => Ok((*x.as_bytes()).cmp(&*y.as_bytes())),
        _ => match (to_float(&a), to_float(&b)) {
            (Some(x), Some(y)) => x
                .partial_cmp(&y)
                .ok_or_else(|| mlua::Error::runtime("attempt to compare NaN")),
            _ => Err(mlua::Error::runtime(format!(
                "attempt to compare {} with {}",
                a.type_name(),
                b.type_name()
            ))),
        },
    }
}

impl UserData for LuaGetter {
    fn add_methods<M: UserDataMethods<Self>>(methods: &mut M) {
        methods.add_meta_method(MetaMethod::Call, |lua, this, args: MultiValue| {
            call_method(lua, &this.component, &this.method, args)
        });
        methods.add_meta_method(MetaMethod::Index, |lua, this, key: LuaValue| {
            let value = this.get().map_err(mlua::Error::external)?;
            match to_lua(lua, &value)? {
                LuaValue::Table(table) => table.get::<LuaValue>(key),
                LuaValue::UserData(userdata) => userdata.get::<LuaValue>(key),
                other => Err(operand_error("index", &other)),
            }
        });
        methods.add_meta_method(MetaMethod::ToString, |_, this, ()| {
            Ok(this.get().map_err(mlua::Error::external)?.to_string())
        });
        methods.add_meta_method(MetaMethod::Len, |lua, this, ()| {
            let value = this.get().map_err(mlua::Error::external)?;
            match to_lua(lua, &value)? {
                LuaValue::String(s) => Ok(s.as_bytes().len()),
                LuaValue::Table(table) => Ok(table.raw_len()),
                other => Err(operand_error("get length of", &other)),
            }
        });
        methods.add_meta_function(MetaMethod::Concat, |lua, (a, b): (LuaValue, LuaValue)| {
            let mut bytes = Vec::new();
            for operand in [a, b] {
                let operand = resolve(lua, operand)?;
                match lua.coerce_string(operand.clone())? {
                    Some(text) => bytes.extend_from_slice(&text.as_bytes()),
                    None => return Err(operand_error("concatenate", &operand)),
                }
            }
            lua.create_string(bytes)
        });
        methods.add_meta_function(MetaMethod::Eq, |lua, (a, b): (LuaValue, LuaValue)| {
            resolve(lua, a)?.equals(&resolve(lua, b)?)
        });
        methods.add_meta_function(MetaMethod::Lt, |lua, operands: (LuaValue, LuaValue)| {
            Ok(compare(lua, operands)?.is_lt())
        });
        methods.add_meta_function(MetaMethod::Le, |lua, operands: (LuaValue, LuaValue)| {
            Ok(compare(lua, operands)?.is_le())
        });
        methods.add_meta_function(MetaMethod::Add, |lua, operands: (LuaValue, LuaValue)| {
            arithmetic(lua, operands, i64::wrapping_add, |x, y| x + y)
        });
        methods.add_meta_function(MetaMethod::Sub, |lua, operands: (LuaValue, LuaValue)| {
            arithmetic(lua, operands, i64::wrapping_sub, |x, y| x - y)
        });
        methods.add_meta_function(MetaMethod::Mul, |lua, operands: (LuaValue, LuaValue)| {
            arithmetic(lua, operands, i64::wrapping_mul, |x, y| x * y)
        });
        methods.add_meta_function(MetaMethod::Div, |lua, (a, b): (LuaValue, LuaValue)| {
            let (a, b) = (resolve(lua, a)?, resolve(lua, b)?);
            match (to_float(&a), to_float(&b)) {
                (Some(x), Some(y)) => Ok(LuaValue::Number(x / y)),
                (None, _) => Err(operand_error("perform arithmetic on", &a)),
                (_, None) => Err(operand_error("perform arithmetic on", &b)),
            }
        });
    }
}

fn wrap_attributes(lua: &Lua, attributes: ComponentAttributes) -> mlua::Result<LuaValue> {
    Ok(LuaValue::UserData(lua.create_userdata(LuaAttributes(attributes))?))
}

impl UserData for LuaComponent {
    fn add_methods<M: UserDataMethods<Self>>(methods: &mut M) {
        methods.add_meta_method(MetaMethod::Index, |lua, this, key: String| {
            member(lua, &this.0, &key)
        });
        methods.add_meta_method(MetaMethod::ToString, |_, this, ()| {
            Ok(this.0.type_name().to_string())
        });
    }
}

impl UserData for LuaHierarchy {
    fn add_methods<M: UserDataMethods<Self>>(methods: &mut M) {
        // `parent` is reserved for walking up the chain.
        methods.add_meta_method(MetaMethod::Index, |lua, this, key: String| {
            if key == "parent" {
                return match this.0.parent() {
                    Some(parent) => Ok(LuaValue::UserData(
                        lua.create_userdata(LuaHierarchy(parent.clone()))?,
                    )),
                    None => Ok(LuaValue::Nil),
                };
            }
            member(lua, this.0.component(), &key)
        });
        methods.add_meta_method(MetaMethod::ToString, |_, this, ()| {
            Ok(this.0.component().type_name().to_string())
        });
    }
}

impl UserData for LuaComputed {
    fn add_methods<M: UserDataMethods<Self>>(methods: &mut M) {
        methods.add_meta_method(MetaMethod::Index, |lua, this, key: String| {
            let value = this.0.get(&key).map_err(mlua::Error::external)?;
            to_lua(lua, &value)
        });
    }
}

impl UserData for LuaAttributes {
    fn add_methods<M: UserDataMethods<Self>>(methods: &mut M) {
        methods.add_method("defaults", |lua, this, defaults: Option<Table>| {
            let defaults = table_to_variables(defaults)?;
            wrap_attributes(lua, this.0.defaults(defaults))
        });
        methods.add_method("only", |lua, this, keys: Variadic<String>| {
            let keys: Vec<&str> = keys.iter().map(String::as_str).collect();
            wrap_attributes(lua, this.0.only(&keys))
        });
        methods.add_method("without", |lua, this, keys: Variadic<String>| {
            let keys: Vec<&str> = keys.iter().map(String::as_str).collect();
            wrap_attributes(lua, this.0.without(&keys))
        });
        methods.add_method("get", |lua, this, key: String| {
            to_lua(lua, this.0.get(&key).unwrap_or(&Value::Null))
        });
        methods.add_method("has", |_, this, key: String| Ok(this.0.has(&key)));
        methods.add_method("render", |_, this, ()| Ok(this.0.render()));
        methods.add_meta_method(MetaMethod::ToString, |_, this, ()| Ok(this.0.render()));
        methods.add_meta_method(MetaMethod::Len, |_, this, ()| Ok(this.0.len()));
    }
}

impl UserData for LuaBlockStack {
    fn add_methods<M: UserDataMethods<Self>>(methods: &mut M) {
        methods.add_method("push", |_, this, block: String| {
            this.0.push(block);
            Ok(())
        });
        methods.add_method("pop", |_, this, ()| Ok(this.0.pop()));
        methods.add_method("top", |_, this, ()| Ok(this.0.top()));
        methods.add_meta_method(MetaMethod::Len, |_, this, ()| Ok(this.0.len()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;

    #[derive(Debug)]
    struct Counter {
        start: i64,
    }

    impl Component for Counter {
        fn property(&self, name: &str) -> Option<Value> {
            match name {
                "start" => Some(self.start.into()),
                _ => None,
            }
        }

        fn method_names(&self) -> &'static [&'static str] {
            &["add", "getDouble"]
        }

        fn call(&self, method: &str, args: &[Value]) -> Result<Value> {
            match method {
                "add" => {
                    let amount = args.first().and_then(Value::as_int).unwrap_or(0);
                    Ok((self.start + amount).into())
                }
                "getDouble" => Ok((self.start * 2).into()),
                _ => Err(self.member_not_found(method)),
            }
        }
    }

    #[derive(Debug)]
    struct Tally;

    impl Component for Tally {
        fn method_names(&self) -> &'static [&'static str] {
            &["argc", "getCount"]
        }

        fn call(&self, method: &str, args: &[Value]) -> Result<Value> {
            match method {
                "argc" => Ok((args.len() as i64).into()),
                "getCount" => Ok(args.iter().filter_map(Value::as_int).sum::<i64>().into()),
                _ => Err(self.member_not_found(method)),
            }
        }
    }

    fn eval(lua: &Lua, name: &str, value: Value, code: &str) -> LuaValue {
        lua.globals().set(name, to_lua(lua, &value).unwrap()).unwrap();
        lua.load(code).eval().unwrap()
    }

    #[test]
    fn test_component_members_and_methods() {
        let lua = Lua::new();
        let counter: Rc<dyn Component> = Rc::new(Counter { start: 5 });
        let value = Value::Component(counter);

        let result = eval(&lua, "c", value, "return c.start + c.double + c.add(1) + c:add(2)");
        assert_eq!(result, LuaValue::Integer(5 + 10 + 6 + 7));
    }

    #[test]
    fn test_missing_member_raises_component_error() {
        let lua = Lua::new();
        let counter: Rc<dyn Component> = Rc::new(Counter { start: 1 });
        lua.globals()
            .set("c", to_lua(&lua, &Value::Component(counter)).unwrap())
            .unwrap();

        let err = lua.load("return c.nope").eval::<LuaValue>().unwrap_err();
        let err = crate::error::ComponentError::from(err);
        assert!(err.to_string().contains("does not have a \"nope\" method"));
    }

    #[test]
    fn test_hierarchy_parent_walks_up() {
        let lua = Lua::new();
        let outer: Rc<dyn Component> = Rc::new(Counter { start: 1 });
        let inner: Rc<dyn Component> = Rc::new(Counter { start: 2 });
        let hierarchy = Hierarchy::new(outer).add(inner);

        let result = eval(
            &lua,
            "h",
            Value::Hierarchy(hierarchy),
            "return h.start * 10 + h.parent.start + (h.parent.parent == nil and 100 or 0)",
        );
        assert_eq!(result, LuaValue::Integer(121));
    }

    #[test]
    fn test_attributes_methods() {
        let lua = Lua::new();
        let attributes = ComponentAttributes::new([
            ("class", Value::from("bar")),
            ("id", Value::from("x")),
        ]);

        let result = eval(
            &lua,
            "a",
            Value::Attributes(attributes),
            r#"return tostring(a:defaults({ class = "foo" }):without("id")) .. "|" .. tostring(a:has("id")) .. "|" .. #a"#,
        );
        match result {
            LuaValue::String(s) => {
                let text: &str = &s.to_str().unwrap();
                assert_eq!(text, r#" class="foo bar"|true|2"#);
            }
            other => panic!("unexpected value: {other:?}"),
        }
    }

    #[test]
    fn test_block_stack_is_shared() {
        let lua = Lua::new();
        let blocks = BlockStack::new();

        eval(&lua, "b", Value::BlockStack(blocks.clone()), "b:push('content'); return nil");
        assert_eq!(blocks.top().as_deref(), Some("content"));
    }

    #[test]
    fn test_dot_call_keeps_other_components_as_arguments() {
        let lua = Lua::new();
        let a: Rc<dyn Component> = Rc::new(Tally);
        let b: Rc<dyn Component> = Rc::new(Tally);
        lua.globals().set("a", to_lua(&lua, &Value::Component(a.clone())).unwrap()).unwrap();
        lua.globals().set("b", to_lua(&lua, &Value::Component(b)).unwrap()).unwrap();
        lua.globals()
            .set("h", to_lua(&lua, &Value::Hierarchy(Hierarchy::new(a))).unwrap())
            .unwrap();

        let result: Vec<i64> = lua
            .load("return { a.argc(b), a:argc(b), a.argc(), a:argc(), h:argc(b), h.argc(b) }")
            .eval()
            .unwrap();
        assert_eq!(result, vec![1, 1, 0, 0, 1, 1]);
    }

    #[test]
    fn test_normalized_getter_forwards_arguments() {
        let lua = Lua::new();
        let hierarchy = Hierarchy::new(Rc::new(Counter { start: 1 })).add(Rc::new(Tally));
        lua.globals()
            .set("h", to_lua(&lua, &Value::Hierarchy(hierarchy)).unwrap())
            .unwrap();

        let sum: i64 = lua.load("return h.count(5, 10) + h:count(1)").eval().unwrap();
        assert_eq!(sum, 16);

        let text: String = lua
            .load(r#"return h.count .. "|" .. tostring(h.count) .. "|" .. h.parent.double * 2"#)
            .eval()
            .unwrap();
        assert_eq!(text, "0|0|4");

        let ordered: bool = lua.load("return h.count < 1 and h.parent.double <= 2").eval().unwrap();
        assert!(ordered);
    }

    #[test]
    fn test_getter_passed_to_rust_is_read() {
        let lua = Lua::new();
        let counter: Rc<dyn Component> = Rc::new(Counter { start: 4 });
        lua.globals()
            .set("c", to_lua(&lua, &Value::Component(counter)).unwrap())
            .unwrap();

        let value = from_lua(lua.load("return c.double").eval().unwrap()).unwrap();
        assert_eq!(value, Value::Int(8));

        let added: i64 = lua.load("return c.add(c.double)").eval().unwrap();
        assert_eq!(added, 12);
    }
}
