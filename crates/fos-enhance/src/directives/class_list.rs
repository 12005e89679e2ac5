//! `classList` directive: `add`, `remove`, `toggle` and `replace` operations,
//! applied in the order given. Each operand is a class name or an array of
//! them. `toggle` runs one class at a time; `replace` takes exactly
//! `[old, new]`.

use super::{expect_object, first_error, string_list, DirectiveContext};
use crate::{UpdateError, Value};

pub(super) fn apply(ctx: &DirectiveContext<'_>, value: &Value) -> Result<(), UpdateError> {
    let ops = expect_object(value)?;
    first_error(
        ops.string_entries()
            .map(|(op, operand)| apply_op(ctx, op, operand)),
    )
}

fn apply_op(ctx: &DirectiveContext<'_>, op: &str, operand: &Value) -> Result<(), UpdateError> {
    let names = string_list(operand)?;
    let el = ctx.element;
    match op {
        "add" => {
            if ctx.fine_grained && names.iter().all(|n| el.has_class(n)) {
                return Ok(());
            }
            el.update_class_list(|list| list.add(names.as_slice()))?;
        }
        "remove" => {
            if ctx.fine_grained && !names.iter().any(|n| el.has_class(n)) {
                return Ok(());
            }
            el.update_class_list(|list| list.remove(names.as_slice()))?;
        }
        "toggle" => {
            for name in &names {
                el.update_class_list(|list| list.toggle(name, None))?;
            }
        }
        "replace" => {
            let [old, new] = names.as_slice() else {
                return Err(UpdateError::ReplaceArity(names.len()));
            };
            el.update_class_list(|list| list.replace(old, new))?;
        }
        other => return Err(UpdateError::UnknownClassListOp(other.to_string())),
    }
    Ok(())
}
