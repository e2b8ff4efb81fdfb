//! Declarative views over a native UI toolkit.
//!
//! # Conceptual overview
//! Verdin builds UI from trees of value-typed view descriptors with chained
//! modifiers, and keeps the resulting native views synchronized with
//! reactive state.
//!
//! ## Bindings
//! A [`Binding`] holds a current value and an ordered list of subscribers.
//! Updating it synchronously notifies every subscriber in registration
//! order; derived bindings (`map`, `filter`, `combine`, `merge`,
//! `debounce`, …) form a propagation graph in which each derived node owns
//! its upstream subscription and is referenced back only weakly, so either
//! end may outlive the other. A [`Publisher`] adds a debounced update
//! queue on top. The graph is single-threaded: all propagation happens as
//! synchronous re-entrant calls on the main loop.
//!
//! ## Views and modifiers
//! A [`ViewNode`] describes a view: a primitive plus children plus a
//! modifier chain. Displaying a descriptor creates exactly one native
//! instance through the backend, applies modifiers in registration order,
//! then recurses into children. Descriptors are cheap values; all native
//! state lives behind the backend.
//!
//! ## Lists, grids, and the reconciler
//! Collection views bind to sections, and sections bind to identity-bearing
//! items. When a collection changes, the diff engine partitions old and new
//! sequences into common/inserted/deleted, and the reconciler applies the
//! result to the live native view as one batched delete-then-insert
//! transaction, preserving scroll position and untouched rows. A view that
//! is not attached to a window degrades to a single full reload instead.
//!
//! ## Control flow
//! Native control events (text changed, switch toggled, slider dragged,
//! row selected) arrive on the host's event channel and are written back
//! into the originating binding, which re-triggers propagation.
//!
//! ## Backends
//! Platform toolkits implement [`backend::NativeBackend`];
//! [`backend::HeadlessBackend`] keeps the native tree as plain data for
//! tests and off-screen hosts.

pub mod action;
pub mod backend;
pub mod binding;
pub mod cancel;
pub mod collection;
pub mod color;
pub mod controls;
pub mod diagnostics;
pub mod diff;
pub mod host;
pub mod identity;
pub mod modifiers;
pub mod rect;
pub mod scheduler;
pub mod shapes;
pub mod view;
pub mod views;

pub use crate::action::{Action, ActionWith};
pub use crate::binding::{Binding, Publisher};
pub use crate::cancel::{Cancellable, DisposeBag};
pub use crate::collection::{CollectionHost, IndexPath, Reconciler, Section, TableUpdate};
pub use crate::color::{Color, LinearGradient};
pub use crate::diagnostics::Diagnostics;
pub use crate::diff::Diff;
pub use crate::host::Host;
pub use crate::identity::{AnyItem, Eid, Identifiable};
pub use crate::modifiers::ModifierExt;
pub use crate::rect::{Alignment, Axis, EdgeInsets, Rect};
pub use crate::scheduler::MainScheduler;
pub use crate::view::{IntoViewNode, Modifier, Primitive, ViewNode};
