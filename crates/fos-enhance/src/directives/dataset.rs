//! `dataset` directive: camelCase keys written as `data-*` attributes

use super::{expect_object, first_error, DirectiveContext};
use crate::{UpdateError, Value};

pub(super) fn apply(ctx: &DirectiveContext<'_>, value: &Value) -> Result<(), UpdateError> {
    let entries = expect_object(value)?;
    first_error(
        entries
            .string_entries()
            .map(|(key, v)| ctx.set_dataset(key, &v.to_attr_string())),
    )
}
