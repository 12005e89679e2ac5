//! fOS Enhance - declarative updates for DOM elements and collections
//!
//! Layers a single `update()` entry point over `fos-dom`:
//! - `EnhancedElement::update` applies an update object to one element
//!   through named directives (`style`, `classList`, `dataset`, ...) with a
//!   method/property/attribute fallback.
//! - `EnhancedCollection::update` splits the object into bulk keys, applied
//!   to every element, and index keys (`"0"`, `"-1"`), applied afterwards
//!   to single elements so they win.
//! - `Intercepted` wraps shortcut accessors so everything they return is
//!   enhanced, and `Shortcuts::restore` undoes it.
//!
//! Failures never propagate out of `update()`; they are logged through
//! `tracing` and collected in an `UpdateReport`.

mod batch;
mod classify;
mod collection;
mod config;
mod delegate;
pub mod directives;
mod element;
mod enhancer;
mod error;
pub mod guard;
mod index;
mod intercept;
mod lookup;
mod value;

pub use batch::{BatchTarget, FrameHandle, FrameScheduler, ManualFrames, UpdateBatcher};
pub use classify::{classify_update_keys, parse_index_key, Classified, IndexUpdate};
pub use collection::{EnhancedCollection, Iter};
pub use config::{Config, MARKER_KEY};
pub use delegate::UpdateDelegate;
pub use directives::{DirectiveContext, DirectiveRegistry};
pub use element::{EnhancedElement, NativeUpdate, NATIVE_UPDATE_SLOT};
pub use enhancer::{EnhanceStats, Enhancer};
pub use error::{AccessError, Issue, Severity, UpdateError, UpdateReport};
pub use guard::{is_enhanced, mark_enhanced, MarkOutcome, Markable};
pub use index::{resolve_index, ResolvedIndex};
pub use intercept::{looks_like_selector, Accessor, Intercepted, Lookup, Resolved, Shortcuts};
pub use lookup::{CacheStats, Collections, Elements, QueryCache, QueryKey, QueryKind, Selector};
pub use value::{PropertyKey, Symbol, Updates, Value};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
