//! Handling for keys that are not registered directives.
//!
//! Tried in order: inline `on*` handler (function or null values only),
//! element method, settable property, attribute (primitive values only).

use super::DirectiveContext;
use crate::{UpdateError, Value};

/// Apply a key that has no registered directive
pub fn apply_fallback(ctx: &DirectiveContext<'_>, key: &str, value: &Value) -> Result<(), UpdateError> {
    if let Some(result) = inline_handler(ctx, key, value) {
        return result;
    }
    if let Some(result) = call_method(ctx, key, value) {
        return result;
    }
    if let Some(result) = set_property(ctx, key, value) {
        return result;
    }
    if value.is_primitive() {
        return ctx.set_attribute(key, &value.to_attr_string());
    }
    Err(UpdateError::Unrecognized(key.to_string()))
}

fn inline_handler(ctx: &DirectiveContext<'_>, key: &str, value: &Value) -> Option<Result<(), UpdateError>> {
    if key.len() <= 2 || !key.starts_with("on") {
        return None;
    }
    let result = match value {
        Value::Handler(h) => ctx.element.set_inline_handler(key, Some(h.clone())),
        Value::Null => ctx.element.set_inline_handler(key, None),
        _ => return None,
    };
    Some(result.map_err(UpdateError::from))
}

fn call_method(ctx: &DirectiveContext<'_>, key: &str, value: &Value) -> Option<Result<(), UpdateError>> {
    let el = ctx.element;
    let args = value.as_args();
    let result = match key {
        "focus" => {
            el.focus();
            Ok(())
        }
        "blur" => {
            el.blur();
            Ok(())
        }
        "click" => {
            el.click();
            Ok(())
        }
        "scrollIntoView" => {
            el.scroll_into_view();
            Ok(())
        }
        "remove" => {
            el.remove();
            Ok(())
        }
        "toggleAttribute" => toggle_attribute(ctx, &args),
        _ => return None,
    };
    Some(result)
}

fn toggle_attribute(ctx: &DirectiveContext<'_>, args: &[&Value]) -> Result<(), UpdateError> {
    let name = args
        .first()
        .and_then(|v| v.as_str())
        .ok_or(UpdateError::InvalidValue {
            expected: "attribute name",
            found: args.first().map_or("nothing", |v| v.kind()),
        })?;
    let force = args.get(1).map(|v| v.is_truthy());
    ctx.element.toggle_attribute(name, force)?;
    Ok(())
}

fn set_property(ctx: &DirectiveContext<'_>, key: &str, value: &Value) -> Option<Result<(), UpdateError>> {
    let el = ctx.element;
    let fine = ctx.fine_grained;
    let text = || match value {
        Value::Null => String::new(),
        other => other.to_attr_string(),
    };

    let result = match key {
        "textContent" | "innerText" => {
            let text = text();
            if fine && el.text_content() == text {
                return Some(Ok(()));
            }
            el.set_text_content(&text).map_err(UpdateError::from)
        }
        "id" => ctx.set_attribute("id", &text()),
        "className" => ctx.set_attribute("class", &text()),
        "title" => ctx.set_attribute("title", &text()),
        "value" => {
            let text = text();
            if fine && el.value() == text {
                return Some(Ok(()));
            }
            el.set_value(&text).map_err(UpdateError::from)
        }
        "checked" => {
            let on = value.is_truthy();
            if fine && el.checked() == on {
                return Some(Ok(()));
            }
            el.set_checked(on).map_err(UpdateError::from)
        }
        "disabled" => toggle_flag(fine, el.disabled(), value.is_truthy(), |on| el.set_disabled(on)),
        "hidden" => toggle_flag(fine, el.hidden(), value.is_truthy(), |on| el.set_hidden(on)),
        "tabIndex" => match value {
            Value::Number(n) => el.set_tab_index(*n as i32).map_err(UpdateError::from),
            Value::String(s) => match s.trim().parse::<i32>() {
                Ok(n) => el.set_tab_index(n).map_err(UpdateError::from),
                Err(_) => Err(UpdateError::invalid("integer", value)),
            },
            other => Err(UpdateError::invalid("integer", other)),
        },
        _ => return None,
    };
    Some(result)
}

fn toggle_flag(
    fine: bool,
    current: bool,
    want: bool,
    set: impl FnOnce(bool) -> fos_dom::DomResult<()>,
) -> Result<(), UpdateError> {
    if fine && current == want {
        return Ok(());
    }
    Ok(set(want)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Updates;
    use fos_dom::{Document, EventHandler};

    fn element() -> (Document, fos_dom::Element) {
        let doc = Document::default();
        let el = doc.create_element("input");
        doc.body().append_child(&el).unwrap();
        (doc, el)
    }

    #[test]
    fn test_inline_handler_overwrites() {
        let (_doc, el) = element();
        let ctx = DirectiveContext::new(&el, false);
        let first = EventHandler::new(|_| {});
        let second = EventHandler::new(|_| {});

        apply_fallback(&ctx, "onclick", &first.into()).unwrap();
        apply_fallback(&ctx, "onclick", &second.clone().into()).unwrap();
        assert_eq!(el.inline_handler("onclick"), Some(second));

        apply_fallback(&ctx, "onclick", &Value::Null).unwrap();
        assert!(el.inline_handler("onclick").is_none());
    }

    #[test]
    fn test_on_prefix_without_function_is_an_attribute() {
        let (_doc, el) = element();
        let ctx = DirectiveContext::new(&el, false);

        apply_fallback(&ctx, "onboarding", &"done".into()).unwrap();
        apply_fallback(&ctx, "online", &true.into()).unwrap();
        assert_eq!(el.get_attribute("onboarding").as_deref(), Some("done"));
        assert_eq!(el.get_attribute("online").as_deref(), Some("true"));
        assert!(el.inline_handler("onboarding").is_none());
    }

    #[test]
    fn test_methods() {
        let (doc, el) = element();
        let ctx = DirectiveContext::new(&el, false);

        apply_fallback(&ctx, "focus", &true.into()).unwrap();
        assert_eq!(doc.active_element(), Some(el.clone()));
        apply_fallback(&ctx, "scrollIntoView", &Value::Null).unwrap();
        assert_eq!(el.scroll_requests(), 1);
        apply_fallback(&ctx, "toggleAttribute", &Value::from(vec![Value::from("readonly"), true.into()])).unwrap();
        assert!(el.has_attribute("readonly"));
        apply_fallback(&ctx, "toggleAttribute", &"readonly".into()).unwrap();
        assert!(!el.has_attribute("readonly"));
    }

    #[test]
    fn test_properties() {
        let (_doc, el) = element();
        let ctx = DirectiveContext::new(&el, false);

        apply_fallback(&ctx, "value", &"hello".into()).unwrap();
        apply_fallback(&ctx, "checked", &1.into()).unwrap();
        apply_fallback(&ctx, "disabled", &true.into()).unwrap();
        apply_fallback(&ctx, "className", &"a b".into()).unwrap();
        apply_fallback(&ctx, "tabIndex", &"3".into()).unwrap();

        assert_eq!(el.value(), "hello");
        assert!(el.checked());
        assert!(el.disabled());
        assert_eq!(el.class_name(), "a b");
        assert_eq!(el.tab_index(), 3);
    }

    #[test]
    fn test_attribute_and_unrecognized() {
        let (_doc, el) = element();
        let ctx = DirectiveContext::new(&el, false);

        apply_fallback(&ctx, "aria-label", &"Close".into()).unwrap();
        apply_fallback(&ctx, "size", &20.into()).unwrap();
        assert_eq!(el.get_attribute("aria-label").as_deref(), Some("Close"));
        assert_eq!(el.get_attribute("size").as_deref(), Some("20"));

        let err = apply_fallback(&ctx, "tooltip", &Updates::new().into()).unwrap_err();
        assert_eq!(err, UpdateError::Unrecognized("tooltip".into()));
    }
}
