// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Conversion between [`Value`] and Lua values.
//!
//! Plain data maps onto Lua primitives and tables. Components and the other
//! renderer objects become userdata so templates see live objects rather
//! than snapshots.

use super::userdata::{
    LuaAttributes, LuaBlockStack, LuaComponent, LuaComputed, LuaGetter, LuaHierarchy,
};
use crate::value::{Value, Variables};
use mlua::{AnyUserData, Lua, Table, Value as LuaValue};
use std::collections::BTreeMap;

/// Converts a value into its Lua form.
pub(crate) fn to_lua(lua: &Lua, value: &Value) -> mlua::Result<LuaValue> {
    Ok(match value {
        Value::Null => LuaValue::Nil,
        Value::Bool(b) => LuaValue::Boolean(*b),
        Value::Int(i) => LuaValue::Integer(*i),
        Value::Float(n) => LuaValue::Number(*n),
        Value::String(s) => LuaValue::String(lua.create_string(s)?),
        Value::List(items) => {
            let table = lua.create_table()?;
            for (i, item) in items.iter().enumerate() {
                table.raw_set(i + 1, to_lua(lua, item)?)?;
            }
            LuaValue::Table(table)
        }
        Value::Map(map) => LuaValue::Table(map_to_table(lua, map)?),
        Value::Component(component) => {
            LuaValue::UserData(lua.create_userdata(LuaComponent(component.clone()))?)
        }
        Value::Hierarchy(hierarchy) => {
            LuaValue::UserData(lua.create_userdata(LuaHierarchy(hierarchy.clone()))?)
        }
        Value::Computed(proxy) => {
            LuaValue::UserData(lua.create_userdata(LuaComputed(proxy.clone()))?)
        }
        Value::Attributes(attributes) => {
            LuaValue::UserData(lua.create_userdata(LuaAttributes(attributes.clone()))?)
        }
        Value::BlockStack(blocks) => {
            LuaValue::UserData(lua.create_userdata(LuaBlockStack(blocks.clone()))?)
        }
    })
}

/// Converts a string keyed map into a Lua table.
pub(crate) fn map_to_table(lua: &Lua, map: &BTreeMap<String, Value>) -> mlua::Result<Table> {
    let table = lua.create_table()?;
    for (key, value) in map {
        table.raw_set(key.as_str(), to_lua(lua, value)?)?;
    }
    Ok(table)
}

/// Converts a Lua value back into a [`Value`].
pub(crate) fn from_lua(value: LuaValue) -> mlua::Result<Value> {
    Ok(match value {
        LuaValue::Nil => Value::Null,
        LuaValue::Boolean(b) => Value::Bool(b),
        LuaValue::Integer(i) => Value::Int(i),
        LuaValue::Number(n) => Value::Float(n),
        LuaValue::String(s) => {
            let text: &str = &s.to_str()?;
            Value::String(text.to_owned())
        }
        LuaValue::Table(table) => table_to_value(table)?,
        LuaValue::UserData(userdata) => userdata_to_value(&userdata)?,
        other => {
            return Err(mlua::Error::runtime(format!(
                "a Lua {} cannot be passed to a component",
                other.type_name()
            )))
        }
    })
}

/// Converts an optional Lua table of named values.
pub(crate) fn table_to_variables(table: Option<Table>) -> mlua::Result<Variables> {
    match table {
        None => Ok(Variables::new()),
        Some(table) => match table_to_value(table)? {
            Value::Map(map) => Ok(map),
            Value::List(_) => Err(mlua::Error::runtime(
                "expected a table with named keys, got a sequence",
            )),
            _ => Ok(Variables::new()),
        },
    }
}

/// A table whose keys are exactly `1..=n` becomes a list; anything else a map.
fn table_to_value(table: Table) -> mlua::Result<Value> {
    let mut pairs = Vec::new();
    for pair in table.pairs::<LuaValue, LuaValue>() {
        pairs.push(pair?);
    }

    let len = table.raw_len();
    if len > 0 && len == pairs.len() {
        let mut items = vec![Value::Null; len];
        let mut is_sequence = true;
        for (key, value) in &pairs {
            match key {
                LuaValue::Integer(i) if *i >= 1 && (*i as usize) <= len => {
                    items[(*i as usize) - 1] = from_lua(value.clone())?;
                }
                _ => {
                    is_sequence = false;
                    break;
                }
            }
        }
        if is_sequence {
            return Ok(Value::List(items));
        }
    }

    let mut map = BTreeMap::new();
    for (key, value) in pairs {
        let key = match key {
            LuaValue::String(s) => {
                let text: &str = &s.to_str()?;
                text.to_owned()
            }
            LuaValue::Integer(i) => i.to_string(),
            other => {
                return Err(mlua::Error::runtime(format!(
                    "table keys must be strings or integers, got {}",
                    other.type_name()
                )))
            }
        };
        map.insert(key, from_lua(value)?);
    }
    Ok(Value::Map(map))
}

fn userdata_to_value(userdata: &AnyUserData) -> mlua::Result<Value> {
    if let Ok(component) = userdata.borrow::<LuaComponent>() {
        return Ok(Value::Component(component.0.clone()));
    }
    if let Ok(hierarchy) = userdata.borrow::<LuaHierarchy>() {
        return Ok(Value::Hierarchy(hierarchy.0.clone()));
    }
    if let Ok(proxy) = userdata.borrow::<LuaComputed>() {
        return Ok(Value::Computed(proxy.0.clone()));
    }
    if let Ok(attributes) = userdata.borrow::<LuaAttributes>() {
        return Ok(Value::Attributes(attributes.0.clone()));
    }
    if let Ok(blocks) = userdata.borrow::<LuaBlockStack>() {
        return Ok(Value::BlockStack(blocks.0.clone()));
    }
    if let Ok(getter) = userdata.borrow::<LuaGetter>() {
        return getter.get().map_err(mlua::Error::external);
    }
    Err(mlua::Error::runtime("unsupported userdata value"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequences_become_lists() {
        let lua = Lua::new();
        let table: Table = lua.load("return { 'a', 'b', 3 }").eval().unwrap();

        assert_eq!(
            table_to_value(table).unwrap(),
            Value::List(vec!["a".into(), "b".into(), Value::Int(3)])
        );
    }

    #[test]
    fn test_mixed_tables_become_maps() {
        let lua = Lua::new();
        let table: Table = lua
            .load("return { title = 'x', [1] = true, nested = { n = 1.5 } }")
            .eval()
            .unwrap();

        let value = table_to_value(table).unwrap();
        let map = value.as_map().unwrap();
        assert_eq!(map["title"], Value::from("x"));
        assert_eq!(map["1"], Value::Bool(true));
        assert_eq!(map["nested"].as_map().unwrap()["n"], Value::Float(1.5));
    }

    #[test]
    fn test_values_survive_a_trip_through_lua() {
        let lua = Lua::new();
        let mut map = BTreeMap::new();
        map.insert("tags".to_string(), Value::from(vec!["x", "y"]));
        map.insert("count".to_string(), Value::Int(2));

        let lua_value = to_lua(&lua, &Value::Map(map.clone())).unwrap();
        assert_eq!(from_lua(lua_value).unwrap(), Value::Map(map));
    }

    #[test]
    fn test_functions_are_rejected() {
        let lua = Lua::new();
        let function: LuaValue = lua.load("return function() end").eval().unwrap();
        assert!(from_lua(function).is_err());
    }
}
