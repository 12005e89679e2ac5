//! External update utility hook

use fos_dom::Element;

use crate::{UpdateError, Value};

/// An external utility that may take over enhancement or individual
/// directives before built-in handling runs.
pub trait UpdateDelegate {
    /// Offered each element on first enhancement. Return true if the
    /// delegate attached its own update machinery.
    fn enhance(&self, _element: &Element) -> bool {
        false
    }

    /// Apply one directive. `None` declines and lets built-in handling run.
    fn apply(&self, element: &Element, key: &str, value: &Value) -> Option<Result<(), UpdateError>>;
}
