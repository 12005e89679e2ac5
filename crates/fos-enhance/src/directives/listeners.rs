//! `addEventListener` / `removeEventListener` directives
//!
//! Accepted shapes for `addEventListener`:
//! - `[event, handler, options?]`
//! - `{ event: handler, .. }`
//! - `{ event: [handler, options], .. }`
//!
//! Registration is deduplicated on handler identity by the element itself,
//! so repeating an update with the same handler adds nothing.

use fos_dom::{EventHandler, ListenerOptions};

use super::{first_error, DirectiveContext};
use crate::{UpdateError, Value};

pub(super) fn add(ctx: &DirectiveContext<'_>, value: &Value) -> Result<(), UpdateError> {
    match value {
        Value::Array(args) => {
            let (event, handler, options) = listener_args(args)?;
            register(ctx, event, handler, options)
        }
        Value::Object(map) => first_error(map.string_entries().map(|(event, v)| match v {
            Value::Handler(h) => register(ctx, event, h, ListenerOptions::default()),
            Value::Array(pair) => {
                let handler = pair
                    .first()
                    .and_then(Value::as_handler)
                    .ok_or_else(|| UpdateError::NotAFunction(event.to_string()))?;
                let options = pair.get(1).map_or(Ok(ListenerOptions::default()), parse_options)?;
                register(ctx, event, handler, options)
            }
            _ => Err(UpdateError::NotAFunction(event.to_string())),
        })),
        other => Err(UpdateError::invalid("array or object", other)),
    }
}

pub(super) fn remove(ctx: &DirectiveContext<'_>, value: &Value) -> Result<(), UpdateError> {
    let args = value
        .as_array()
        .ok_or_else(|| UpdateError::invalid("[event, handler]", value))?;
    let (event, handler, options) = listener_args(args)?;
    let removed = ctx
        .element
        .remove_event_listener(event, handler, options.capture)?;
    if !removed {
        tracing::debug!("[Element] No '{}' listener to remove", event);
    }
    Ok(())
}

fn register(
    ctx: &DirectiveContext<'_>,
    event: &str,
    handler: &EventHandler,
    options: ListenerOptions,
) -> Result<(), UpdateError> {
    let added = ctx.element.add_event_listener(event, handler, options)?;
    if !added {
        tracing::debug!("[Element] '{}' listener already attached, skipping", event);
    }
    Ok(())
}

fn listener_args(args: &[Value]) -> Result<(&str, &EventHandler, ListenerOptions), UpdateError> {
    let event = args
        .first()
        .and_then(Value::as_str)
        .ok_or_else(|| UpdateError::InvalidValue {
            expected: "event name",
            found: args.first().map_or("nothing", Value::kind),
        })?;
    let handler = args
        .get(1)
        .and_then(Value::as_handler)
        .ok_or_else(|| UpdateError::NotAFunction(event.to_string()))?;
    let options = args.get(2).map_or(Ok(ListenerOptions::default()), parse_options)?;
    Ok((event, handler, options))
}

/// `true`/`false` (capture) or `{ capture, once, passive }`
fn parse_options(value: &Value) -> Result<ListenerOptions, UpdateError> {
    match value {
        Value::Null => Ok(ListenerOptions::default()),
        Value::Bool(capture) => Ok(ListenerOptions {
            capture: *capture,
            ..Default::default()
        }),
        Value::Object(map) => {
            let flag = |name| map.get(name).is_some_and(Value::is_truthy);
            Ok(ListenerOptions {
                capture: flag("capture"),
                once: flag("once"),
                passive: flag("passive"),
            })
        }
        other => Err(UpdateError::invalid("boolean or options object", other)),
    }
}
