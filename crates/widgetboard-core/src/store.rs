//! Ordered in-memory widget store.
//!
//! Widgets are indexed by id and kept in a total order over
//! `(z_index, id)`. Once any mutating call returns, no two widgets share a
//! z-index. Inserting at an occupied rank shifts every widget at or above that
//! rank up by one.
//!
//! Locking: reads take the store lock shared, structural changes (insert,
//! remove, re-rank, collision shift) take it exclusive. A layout change that
//! keeps the z-index is an atomic swap on the widget itself under the shared
//! lock.

use crate::clock::{Clock, SystemClock};
use crate::error::{WidgetError, WidgetResult};
use crate::layout::{Layout, LayoutPatch};
use crate::spatial::{query_region, rects_overlap};
use crate::widget::{OrderKey, Widget, WidgetEntry, WidgetId};
use chrono::{DateTime, Utc};
use kurbo::{Point, Size};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use uuid::Uuid;

/// Both views of the widget set. Only touched with the store lock held.
#[derive(Debug, Default)]
struct StoreIndex {
    /// Widgets by id.
    entries: HashMap<WidgetId, Arc<WidgetEntry>>,
    /// Widgets by stacking order (back to front).
    order: BTreeMap<OrderKey, Arc<WidgetEntry>>,
}

impl StoreIndex {
    fn max_z_index(&self) -> Option<i64> {
        self.order.last_key_value().map(|(&(z_index, _), _)| z_index)
    }

    /// Rank given to a widget created without an explicit z-index.
    fn next_z_index(&self) -> WidgetResult<i64> {
        match self.max_z_index() {
            None => Ok(0),
            Some(max) => max
                .checked_add(1)
                .ok_or_else(|| WidgetError::invalid("zIndex space exhausted")),
        }
    }

    fn is_occupied(&self, z_index: i64) -> bool {
        self.order
            .range((z_index, Uuid::nil())..)
            .next()
            .is_some_and(|(&(found, _), _)| found == z_index)
    }

    fn insert(&mut self, entry: Arc<WidgetEntry>) {
        self.order.insert(entry.order_key(), Arc::clone(&entry));
        self.entries.insert(entry.id(), entry);
    }

    /// Shift every widget at `z_index` or above up by one rank.
    ///
    /// The tail is detached in one piece and re-ranked in ascending order, so
    /// no shifted widget can land on a rank still held by another. Fails
    /// without touching anything if the top widget cannot move up.
    fn shift_from(&mut self, z_index: i64, now: DateTime<Utc>) -> WidgetResult<()> {
        if self.max_z_index() == Some(i64::MAX) {
            return Err(WidgetError::invalid("zIndex space exhausted"));
        }

        let tail = self.order.split_off(&(z_index, Uuid::nil()));
        log::debug!("Shifting {} widget(s) from zIndex {}", tail.len(), z_index);

        for ((old_z, id), entry) in tail {
            let shifted = entry.layout().with_z_index(old_z + 1, now);
            entry.store_layout(shifted);
            self.order.insert((old_z + 1, id), entry);
        }
        Ok(())
    }
}

/// Thread-safe ordered widget collection.
pub struct WidgetStore {
    index: RwLock<StoreIndex>,
    clock: Arc<dyn Clock>,
}

impl Default for WidgetStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for WidgetStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WidgetStore")
            .field("len", &self.len())
            .finish_non_exhaustive()
    }
}

impl WidgetStore {
    /// Create an empty store stamping layouts with the system clock.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Create an empty store with a custom time source.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            index: RwLock::new(StoreIndex::default()),
            clock,
        }
    }

    // A panic can only happen before the index is touched, so a poisoned
    // lock still guards a consistent index.
    fn read(&self) -> RwLockReadGuard<'_, StoreIndex> {
        self.index.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, StoreIndex> {
        self.index.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Create a widget.
    ///
    /// Without a z-index the widget goes on top of the stack (or at 0 in an
    /// empty store). With one, widgets already at or above that rank are
    /// shifted up to make room.
    pub fn create(
        &self,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        z_index: Option<i64>,
    ) -> WidgetResult<Widget> {
        // Reject bad input before taking the lock; the rank is resolved below.
        LayoutPatch {
            x: Some(x),
            y: Some(y),
            width: Some(width),
            height: Some(height),
            z_index,
        }
        .validate()?;

        let mut index = self.write();
        let now = self.clock.now();
        let z_index = match z_index {
            Some(z_index) => z_index,
            None => index.next_z_index()?,
        };
        let layout = Layout::new(Point::new(x, y), Size::new(width, height), z_index, now)?;
        if index.is_occupied(z_index) {
            index.shift_from(z_index, now)?;
        }

        let entry = Arc::new(WidgetEntry::new(Uuid::new_v4(), layout));
        let widget = entry.snapshot();
        index.insert(entry);

        log::debug!("Created widget {} at zIndex {}", widget.id(), z_index);
        Ok(widget)
    }

    /// Get a widget by id.
    pub fn get(&self, id: WidgetId) -> WidgetResult<Widget> {
        self.read()
            .entries
            .get(&id)
            .map(|entry| entry.snapshot())
            .ok_or(WidgetError::NotFound(id))
    }

    /// Apply a partial layout change.
    ///
    /// The timestamp is refreshed on every successful call. Moving to a new
    /// z-index re-ranks the widget, shifting others if the target is taken.
    pub fn update(&self, id: WidgetId, patch: &LayoutPatch) -> WidgetResult<()> {
        patch.validate()?;

        {
            let index = self.read();
            let entry = index.entries.get(&id).ok_or(WidgetError::NotFound(id))?;
            // Ranks only change under the write lock, so this stays true
            // for as long as the read guard is held.
            let moves = patch
                .z_index
                .is_some_and(|z_index| z_index != entry.layout().z_index());
            if !moves {
                entry.rcu_layout(|current| current.overlay(patch, self.clock.now()));
                log::debug!("Updated widget {} in place", id);
                return Ok(());
            }
        }

        self.rerank(id, patch)
    }

    /// Write-locked half of [`WidgetStore::update`].
    fn rerank(&self, id: WidgetId, patch: &LayoutPatch) -> WidgetResult<()> {
        let mut index = self.write();
        let now = self.clock.now();
        // The widget may have been removed between the two locks.
        let entry = index
            .entries
            .get(&id)
            .cloned()
            .ok_or(WidgetError::NotFound(id))?;
        let current = entry.layout();
        let updated = current.overlay(patch, now);

        if updated.z_index() == current.z_index() {
            entry.store_layout(updated);
            return Ok(());
        }

        let old_key = (current.z_index(), id);
        index.order.remove(&old_key);
        if index.is_occupied(updated.z_index()) {
            if let Err(err) = index.shift_from(updated.z_index(), now) {
                index.order.insert(old_key, entry);
                return Err(err);
            }
        }
        entry.store_layout(updated);
        index.order.insert((updated.z_index(), id), entry);

        log::debug!(
            "Moved widget {} from zIndex {} to {}",
            id,
            current.z_index(),
            updated.z_index()
        );
        Ok(())
    }

    /// Remove a widget by id.
    pub fn remove(&self, id: WidgetId) -> WidgetResult<()> {
        let mut index = self.write();
        let entry = index.entries.remove(&id).ok_or(WidgetError::NotFound(id))?;
        index.order.remove(&entry.order_key());
        log::debug!("Removed widget {}", id);
        Ok(())
    }

    /// All widgets, back to front.
    pub fn list(&self) -> Vec<Widget> {
        self.read()
            .order
            .values()
            .map(|entry| entry.snapshot())
            .collect()
    }

    /// Up to `limit` widgets starting at position `offset` in stacking order.
    pub fn page(&self, limit: usize, offset: usize) -> Vec<Widget> {
        self.read()
            .order
            .values()
            .skip(offset)
            .take(limit)
            .map(|entry| entry.snapshot())
            .collect()
    }

    /// Widgets overlapping the region spanned by two opposite corners, back
    /// to front.
    pub fn filter(&self, x1: f64, y1: f64, x2: f64, y2: f64) -> WidgetResult<Vec<Widget>> {
        let region = query_region(x1, y1, x2, y2)?;
        Ok(self
            .read()
            .order
            .values()
            .map(|entry| entry.snapshot())
            .filter(|widget| rects_overlap(widget.bounds(), region))
            .collect())
    }

    /// Number of widgets.
    pub fn len(&self) -> usize {
        self.read().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().entries.is_empty()
    }

    pub fn contains(&self, id: WidgetId) -> bool {
        self.read().entries.contains_key(&id)
    }
}
