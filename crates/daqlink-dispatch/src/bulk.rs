use std::sync::atomic::{AtomicBool, Ordering};

use serde_json::{Map, Value};

use daqlink_stream::{JsonStream, StreamError};

use crate::descr::{CallDescr, CallType, Selector};
use crate::error::{DispatchError, Result};
use crate::handler::{CallContext, CallHandler};
use crate::registry::CmdRegistry;

/// Bulk access point: one request, many registry calls.
///
/// Registered in the registry like any other command (conventionally as
/// `js`). A get with no argument dumps every readable access point; a
/// request body is otherwise parsed as JSON and walked recursively, with
/// per-key results or error nodes assembled into one response object.
///
/// A busy flag rejects re-entrant invocations, so a request body that
/// names the dispatcher itself cannot recurse without bound.
pub struct JsonDispatcher {
    busy: AtomicBool,
}

/// Clears the busy flag when the outermost call unwinds.
struct BusyGuard<'a>(&'a AtomicBool);

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl JsonDispatcher {
    pub fn new() -> Self {
        Self {
            busy: AtomicBool::new(false),
        }
    }

    /// One registry call against a JSON value slot.
    ///
    /// Never fails: errors are folded into the response as an
    /// `{"error": {...}}` node in place of the value. A set call is
    /// followed by a get readback, so the response reflects the value the
    /// board actually took.
    fn call_primitive(
        registry: &CmdRegistry,
        name: &str,
        request: &Value,
        slot: &mut Value,
        call_type: CallType,
    ) {
        if call_type == CallType::Set {
            let mut arg = request.clone();
            let mut sink = Value::Null;
            let result = {
                let mut input = JsonStream::new(&mut arg);
                let mut output = JsonStream::new(&mut sink);
                registry.call(CallDescr {
                    selector: Selector::Name(name.to_owned()),
                    call_type: CallType::Set,
                    input: &mut input,
                    output: &mut output,
                })
            };
            if let Err(err) = result {
                *slot = error_node_with_value(request.clone(), &err);
                return;
            }
        }

        let mut stub = Value::Null;
        let mut readback = Value::Null;
        let result = {
            let mut input = JsonStream::new(&mut stub);
            let mut output = JsonStream::new(&mut readback);
            registry.call(CallDescr {
                selector: Selector::Name(name.to_owned()),
                call_type: CallType::Get,
                input: &mut input,
                output: &mut output,
            })
        };
        match result {
            Ok(()) => *slot = readback,
            Err(DispatchError::GetNotSupported) if call_type == CallType::Set => {
                // Write-only point: echo the accepted request value.
                *slot = request.clone();
            }
            Err(err) => {
                if call_type == CallType::Get {
                    *slot = error_node_with_value(request.clone(), &err);
                }
                // A failed readback after a successful set leaves the
                // accepted value unreported rather than erroring the key.
            }
        }
    }

    /// Dump of every readable access point, keyed by name.
    fn dump_all(registry: &CmdRegistry) -> Map<String, Value> {
        let mut resp = Map::new();
        let mut index = 0usize;
        while let Some(name) = registry.name_at(index) {
            let name = name.to_owned();
            let mut stub = Value::Null;
            let mut slot = Value::Null;
            let result = {
                let mut input = JsonStream::new(&mut stub);
                let mut output = JsonStream::new(&mut slot);
                registry.call(CallDescr {
                    selector: Selector::Index(index),
                    call_type: CallType::Get,
                    input: &mut input,
                    output: &mut output,
                })
            };
            // Unreadable points (and the dispatcher itself, which reports
            // busy here) are left out of the snapshot.
            if result.is_ok() {
                resp.insert(name, slot);
            }
            index += 1;
        }
        resp
    }

    fn walk(
        registry: &CmdRegistry,
        request: &Value,
        resp: &mut Map<String, Value>,
        call_type: CallType,
        array_mode: bool,
    ) {
        let entries: Vec<(String, &Value)> = match request {
            Value::Object(map) => map.iter().map(|(k, v)| (k.clone(), v)).collect(),
            Value::Array(items) => items
                .iter()
                .enumerate()
                .map(|(i, v)| (i.to_string(), v))
                .collect(),
            _ => Vec::new(),
        };

        for (key, child) in entries {
            match child {
                Value::Object(_) | Value::Array(_) => {
                    let mut sub = Map::new();
                    Self::walk(registry, child, &mut sub, call_type, child.is_array());
                    resp.insert(key, Value::Object(sub));
                }
                _ if array_mode => {
                    // Arrays carry bare names: ["ADC1","Gain"] means get
                    // those points.
                    let Value::String(name) = child else {
                        resp.insert(
                            key,
                            error_descr_node("cannot resolve this key!"),
                        );
                        continue;
                    };
                    if call_type != CallType::Get {
                        resp.insert(
                            name.clone(),
                            error_descr_node("cannot resolve single key in non-get call!"),
                        );
                        continue;
                    }
                    let mut slot = Value::Null;
                    Self::call_primitive(registry, name, &Value::Null, &mut slot, CallType::Get);
                    resp.insert(name.clone(), slot);
                }
                _ => {
                    let mut slot = Value::Null;
                    Self::call_primitive(registry, &key, child, &mut slot, call_type);
                    resp.insert(key, slot);
                }
            }
        }
    }
}

impl Default for JsonDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl CallHandler for JsonDispatcher {
    fn call(&self, ctx: CallContext<'_>) -> Result<()> {
        if self.busy.swap(true, Ordering::Acquire) {
            return Err(DispatchError::Disabled);
        }
        let _guard = BusyGuard(&self.busy);

        let body = match ctx.input.read_string() {
            Ok(text) => text,
            Err(StreamError::Empty) => String::new(),
            Err(err) => return Err(err.into()),
        };

        let resp = if body.trim().is_empty() {
            if ctx.call_type != CallType::Get {
                return Err(DispatchError::Parse(StreamError::Empty));
            }
            Self::dump_all(ctx.registry)
        } else {
            let request: Value = serde_json::from_str(&body)?;
            tracing::debug!(call_type = ?ctx.call_type, "bulk request");
            let mut resp = Map::new();
            Self::walk(
                ctx.registry,
                &request,
                &mut resp,
                ctx.call_type,
                request.is_array(),
            );
            resp
        };
        ctx.output.write_string(&Value::Object(resp).to_string())?;
        Ok(())
    }
}

fn error_descr_node(descr: &str) -> Value {
    let mut inner = Map::new();
    inner.insert("edescr".to_owned(), Value::String(descr.to_owned()));
    let mut node = Map::new();
    node.insert("error".to_owned(), Value::Object(inner));
    Value::Object(node)
}

fn error_node_with_value(value: Value, err: &DispatchError) -> Value {
    let mut inner = Map::new();
    inner.insert("val".to_owned(), value);
    inner.insert("edescr".to_owned(), Value::String(err.to_string()));
    let mut node = Map::new();
    node.insert("error".to_owned(), Value::Object(inner));
    Value::Object(node)
}
