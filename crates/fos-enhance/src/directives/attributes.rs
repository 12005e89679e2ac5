//! `setAttribute` and `removeAttribute` directives

use super::{first_error, string_list, DirectiveContext};
use crate::{UpdateError, Value};

/// `[name, value]` or `{ name: value, .. }`
pub(super) fn set(ctx: &DirectiveContext<'_>, value: &Value) -> Result<(), UpdateError> {
    match value {
        Value::Array(pair) => {
            let [name, v] = pair.as_slice() else {
                return Err(UpdateError::InvalidValue {
                    expected: "[name, value]",
                    found: "array of another length",
                });
            };
            let name = name
                .as_str()
                .ok_or_else(|| UpdateError::invalid("string", name))?;
            ctx.set_attribute(name, &v.to_attr_string())
        }
        Value::Object(map) => first_error(
            map.string_entries()
                .map(|(name, v)| ctx.set_attribute(name, &v.to_attr_string())),
        ),
        other => Err(UpdateError::invalid("array or object", other)),
    }
}

/// A name or an array of names
pub(super) fn remove(ctx: &DirectiveContext<'_>, value: &Value) -> Result<(), UpdateError> {
    for name in string_list(value)? {
        ctx.element.remove_attribute(&name)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Updates;
    use fos_dom::Document;

    #[test]
    fn test_set_pair_and_map() {
        let doc = Document::default();
        let el = doc.create_element("input");
        let ctx = DirectiveContext::new(&el, false);

        set(&ctx, &Value::from(vec!["type", "text"])).unwrap();
        set(&ctx, &Value::from(Updates::new().with("maxlength", 10).with("required", ""))).unwrap();

        assert_eq!(el.get_attribute("type").as_deref(), Some("text"));
        assert_eq!(el.get_attribute("maxlength").as_deref(), Some("10"));
        assert!(el.has_attribute("required"));
    }

    #[test]
    fn test_set_rejects_bad_shapes() {
        let doc = Document::default();
        let el = doc.create_element("input");
        let ctx = DirectiveContext::new(&el, false);

        assert!(set(&ctx, &Value::from(vec!["only-name"])).is_err());
        assert!(set(&ctx, &Value::from("type")).is_err());
        assert!(set(&ctx, &Value::from(vec!["bad name", "x"])).is_err());
    }

    #[test]
    fn test_remove_one_or_many() {
        let doc = Document::default();
        let el = doc.create_element("input");
        for name in ["a", "b", "c"] {
            el.set_attribute(name, "1").unwrap();
        }
        let ctx = DirectiveContext::new(&el, false);

        remove(&ctx, &Value::from("a")).unwrap();
        remove(&ctx, &Value::from(vec!["b", "missing"])).unwrap();
        assert_eq!(el.attribute_names(), ["c"]);
    }
}
