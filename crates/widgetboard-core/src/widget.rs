//! Widget entity and its shared in-store representation.

use crate::layout::Layout;
use arc_swap::ArcSwap;
use kurbo::Rect;
use std::sync::Arc;
use uuid::Uuid;

/// Unique identifier for a widget.
pub type WidgetId = Uuid;

/// Point-in-time copy of a widget handed out by the store.
#[derive(Debug, Clone, PartialEq)]
pub struct Widget {
    id: WidgetId,
    layout: Layout,
}

impl Widget {
    pub fn id(&self) -> WidgetId {
        self.id
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn z_index(&self) -> i64 {
        self.layout.z_index()
    }

    /// Bounding rectangle of the widget.
    pub fn bounds(&self) -> Rect {
        self.layout.rect()
    }
}

/// Key ordering widgets inside the store: z-index first, id as tie-break.
pub(crate) type OrderKey = (i64, WidgetId);

/// A widget as held by the store.
///
/// The layout sits behind an atomic pointer so it can be replaced without the
/// store-wide write lock when the ordering is not affected.
#[derive(Debug)]
pub(crate) struct WidgetEntry {
    id: WidgetId,
    layout: ArcSwap<Layout>,
}

impl WidgetEntry {
    pub(crate) fn new(id: WidgetId, layout: Layout) -> Self {
        Self {
            id,
            layout: ArcSwap::from_pointee(layout),
        }
    }

    pub(crate) fn id(&self) -> WidgetId {
        self.id
    }

    /// Current layout.
    pub(crate) fn layout(&self) -> Arc<Layout> {
        self.layout.load_full()
    }

    pub(crate) fn order_key(&self) -> OrderKey {
        (self.layout.load().z_index(), self.id)
    }

    /// Atomically replace the layout.
    pub(crate) fn store_layout(&self, layout: Layout) {
        self.layout.store(Arc::new(layout));
    }

    /// Atomically replace the layout with one derived from the current value.
    ///
    /// `f` may run more than once under contention.
    pub(crate) fn rcu_layout<F>(&self, f: F)
    where
        F: Fn(&Layout) -> Layout,
    {
        self.layout.rcu(|current| Arc::new(f(&**current)));
    }

    pub(crate) fn snapshot(&self) -> Widget {
        Widget {
            id: self.id,
            layout: **self.layout.load(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use kurbo::{Point, Size};

    fn layout(z_index: i64) -> Layout {
        Layout::new(Point::new(1.0, 2.0), Size::new(3.0, 4.0), z_index, Utc::now()).unwrap()
    }

    #[test]
    fn test_snapshot_is_detached() {
        let entry = WidgetEntry::new(Uuid::new_v4(), layout(1));
        let before = entry.snapshot();

        entry.store_layout(layout(7));

        assert_eq!(before.z_index(), 1);
        assert_eq!(entry.snapshot().z_index(), 7);
        assert_eq!(before.id(), entry.id());
    }

    #[test]
    fn test_order_key_follows_layout() {
        let id = Uuid::new_v4();
        let entry = WidgetEntry::new(id, layout(2));
        assert_eq!(entry.order_key(), (2, id));

        entry.rcu_layout(|current| current.with_z_index(current.z_index() + 1, Utc::now()));
        assert_eq!(entry.order_key(), (3, id));
    }
}
