//! `style` directive: property map assigned to the inline style.
//! Null values are skipped.

use super::{expect_object, first_error, DirectiveContext};
use crate::{UpdateError, Value};

pub(super) fn apply(ctx: &DirectiveContext<'_>, value: &Value) -> Result<(), UpdateError> {
    let props = expect_object(value)?;
    first_error(
        props
            .string_entries()
            .filter(|(_, v)| !matches!(v, Value::Null))
            .map(|(name, v)| ctx.set_style(name, &v.to_attr_string())),
    )
}
