//! Widgetboard Core Library
//!
//! In-memory widget store keeping rectangular widgets uniquely indexed by id
//! and strictly ordered by stacking rank (z-index).

pub mod clock;
pub mod error;
pub mod layout;
pub mod spatial;
pub mod store;
pub mod widget;

pub use clock::{Clock, SystemClock};
pub use error::{WidgetError, WidgetResult};
pub use layout::{Layout, LayoutPatch};
pub use spatial::{query_region, rects_overlap};
pub use store::WidgetStore;
pub use widget::{Widget, WidgetId};
