//! JSONL storage for orders
//!
//! Orders are stored in `.sublim/orders.jsonl` with one JSON object per line.
//! Uses file locking for concurrent access safety.

use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use fs2::FileExt;

use crate::domain::{EngineError, Order, OrderId};

/// Store for order data in JSONL format
pub struct OrderStore {
    path: PathBuf,
}

impl OrderStore {
    /// Creates a new order store at the given path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Creates the default store for a shop
    pub fn for_shop(shop_root: &Path) -> Self {
        Self::new(shop_root.join(".sublim").join("orders.jsonl"))
    }

    /// Returns the path to the store file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock_path(&self) -> PathBuf {
        self.path.with_extension("lock")
    }

    fn ensure_parent(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
        Ok(())
    }

    /// Reads all orders from the store
    ///
    /// A later line for the same ID replaces an earlier one.
    pub fn read_all(&self) -> Result<HashMap<OrderId, Order>> {
        if !self.path.exists() {
            return Ok(HashMap::new());
        }

        let file = File::open(&self.path)
            .with_context(|| format!("Failed to open order store: {}", self.path.display()))?;

        file.lock_shared()
            .context("Failed to acquire read lock on order store")?;

        let reader = BufReader::new(&file);
        let mut orders = HashMap::new();

        for (line_num, line) in reader.lines().enumerate() {
            let line = line.with_context(|| format!("Failed to read line {}", line_num + 1))?;

            if line.trim().is_empty() {
                continue;
            }

            let order: Order = serde_json::from_str(&line)
                .with_context(|| format!("Failed to parse order at line {}", line_num + 1))?;

            orders.insert(order.id.clone(), order);
        }

        Ok(orders)
    }

    /// Reads orders sorted by creation time (oldest first)
    pub fn read_sorted(&self) -> Result<Vec<Order>> {
        let mut orders: Vec<_> = self.read_all()?.into_values().collect();
        orders.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(orders)
    }

    /// Fetches one order
    pub fn get(&self, id: &OrderId) -> Result<Order> {
        let mut orders = self.read_all()?;
        orders
            .remove(id)
            .ok_or_else(|| EngineError::OrderNotFound(id.clone()).into())
    }

    /// Takes the exclusive writer lock on `orders.lock`
    ///
    /// Every write path holds this lock, so a rewrite can never swap out a
    /// file another writer is appending to. Released when the handle drops.
    fn lock_writers(&self) -> Result<File> {
        self.ensure_parent()?;

        let lock_path = self.lock_path();
        let lock = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&lock_path)
            .with_context(|| format!("Failed to open lock file: {}", lock_path.display()))?;
        lock.lock_exclusive()
            .context("Failed to acquire order store lock")?;
        Ok(lock)
    }

    /// Full rewrite through a temp file and rename; caller holds the writer lock
    fn write_all(&self, orders: &HashMap<OrderId, Order>) -> Result<()> {
        let temp_path = self.path.with_extension("jsonl.tmp");

        {
            let file = File::create(&temp_path)
                .with_context(|| format!("Failed to create temp file: {}", temp_path.display()))?;
            let mut writer = BufWriter::new(&file);

            // Sort by ID for stable diffs
            let mut sorted: Vec<_> = orders.values().collect();
            sorted.sort_by(|a, b| a.id.cmp(&b.id));

            for order in sorted {
                let line = serde_json::to_string(order).context("Failed to serialize order")?;
                writeln!(writer, "{}", line).context("Failed to write order")?;
            }

            writer.flush().context("Failed to flush order store")?;
        }

        fs::rename(&temp_path, &self.path).with_context(|| {
            format!(
                "Failed to rename {} to {}",
                temp_path.display(),
                self.path.display()
            )
        })?;

        tracing::debug!(count = orders.len(), path = %self.path.display(), "order store rewritten");
        Ok(())
    }

    /// Appends a newly created order, refusing an ID that is already stored
    pub fn insert_new(&self, order: &Order) -> Result<()> {
        let _lock = self.lock_writers()?;

        if self.read_all()?.contains_key(&order.id) {
            anyhow::bail!(
                "Order {} already exists: '{}' was created at this exact time",
                order.id,
                order.name
            );
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("Failed to open order store: {}", self.path.display()))?;

        let mut writer = BufWriter::new(&file);
        let line = serde_json::to_string(order).context("Failed to serialize order")?;
        writeln!(writer, "{}", line).context("Failed to write order")?;
        writer.flush().context("Failed to flush order store")?;

        tracing::debug!(order = %order.id, "order appended");
        Ok(())
    }

    /// Read-modify-write of a single order under the writer lock
    ///
    /// The closure sees the latest persisted record. If it fails, nothing is
    /// written. Concurrent callers are serialized, so two stage transitions on
    /// the same order cannot overwrite each other.
    pub fn modify<T, F>(&self, id: &OrderId, f: F) -> Result<(Order, T)>
    where
        F: FnOnce(&mut Order) -> Result<T, EngineError>,
    {
        let _lock = self.lock_writers()?;

        let mut orders = self.read_all()?;
        let order = orders
            .get_mut(id)
            .ok_or_else(|| EngineError::OrderNotFound(id.clone()))?;

        let value = f(order)?;
        let updated = order.clone();
        self.write_all(&orders)?;

        Ok((updated, value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        DeliveryProjector, FixedClock, GarmentType, OrderDraft, OrderItem, OrderStatus, Stage,
        TimeCatalog, WorkCalendar, WorkCalendarConfig,
    };
    use chrono::{NaiveDate, NaiveDateTime};
    use std::sync::mpsc;
    use std::thread;
    use std::time::Duration as StdDuration;
    use tempfile::TempDir;

    fn monday(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, 19)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn make_order(name: &str, minute: u32) -> Order {
        let calendar = WorkCalendar::new(WorkCalendarConfig::default()).unwrap();
        let projector = DeliveryProjector::new(&calendar, FixedClock(monday(9, minute)));
        let draft = OrderDraft::new(name, vec![OrderItem::new(GarmentType::Polo, 3)], 1.0);
        Order::create(draft, &TimeCatalog::default(), &projector).unwrap()
    }

    #[test]
    fn read_empty_store() {
        let dir = TempDir::new().unwrap();
        let store = OrderStore::new(dir.path().join("orders.jsonl"));

        assert!(store.read_all().unwrap().is_empty());
    }

    #[test]
    fn append_and_read_sorted() {
        let dir = TempDir::new().unwrap();
        let store = OrderStore::new(dir.path().join("orders.jsonl"));

        let later = make_order("Later", 30);
        let earlier = make_order("Earlier", 5);
        store.insert_new(&later).unwrap();
        store.insert_new(&earlier).unwrap();

        let orders = store.read_sorted().unwrap();
        assert_eq!(orders.len(), 2);
        assert_eq!(orders[0].name, "Earlier");
        assert_eq!(orders[1].name, "Later");
    }

    #[test]
    fn get_missing_order_is_not_found() {
        let dir = TempDir::new().unwrap();
        let store = OrderStore::new(dir.path().join("orders.jsonl"));
        let id: OrderId = "o-abcdef1".parse().unwrap();

        let err = store.get(&id).unwrap_err();
        assert_eq!(
            err.downcast_ref::<EngineError>(),
            Some(&EngineError::OrderNotFound(id))
        );
    }

    #[test]
    fn modify_persists_successful_change() {
        let dir = TempDir::new().unwrap();
        let store = OrderStore::new(dir.path().join("orders.jsonl"));
        let order = make_order("Jerseys", 0);
        store.insert_new(&order).unwrap();

        let clock = FixedClock(monday(10, 0));
        let (updated, status) = store
            .modify(&order.id, |o| o.start_stage(Stage::Print, &clock))
            .unwrap();

        assert_eq!(status, OrderStatus::InProduction);
        assert_eq!(updated.stages.print.started_at, Some(monday(10, 0)));
        assert_eq!(store.get(&order.id).unwrap(), updated);
    }

    #[test]
    fn modify_leaves_store_untouched_on_error() {
        let dir = TempDir::new().unwrap();
        let store = OrderStore::new(dir.path().join("orders.jsonl"));
        let order = make_order("Jerseys", 0);
        store.insert_new(&order).unwrap();

        let clock = FixedClock(monday(10, 0));
        let err = store
            .modify(&order.id, |o| o.complete_stage(Stage::Cut, &clock))
            .unwrap_err();

        assert_eq!(
            err.downcast_ref::<EngineError>(),
            Some(&EngineError::StageNotStarted(Stage::Cut))
        );
        assert_eq!(store.get(&order.id).unwrap(), order);
    }

    #[test]
    fn modify_unknown_order_fails() {
        let dir = TempDir::new().unwrap();
        let store = OrderStore::new(dir.path().join("orders.jsonl"));
        store.insert_new(&make_order("Jerseys", 0)).unwrap();

        let id: OrderId = "o-0000000".parse().unwrap();
        let err = store.modify(&id, |_| Ok(())).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<EngineError>(),
            Some(EngineError::OrderNotFound(_))
        ));
    }

    #[test]
    fn insert_new_refuses_existing_id() {
        let dir = TempDir::new().unwrap();
        let store = OrderStore::new(dir.path().join("orders.jsonl"));
        let order = make_order("Jerseys", 0);

        store.insert_new(&order).unwrap();
        let err = store.insert_new(&order).unwrap_err();

        assert!(err.to_string().contains("already exists"));
        let content = fs::read_to_string(store.path()).unwrap();
        assert_eq!(content.lines().count(), 1);
    }

    #[test]
    fn insert_during_modify_is_not_lost() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("orders.jsonl");
        let store = OrderStore::new(&path);
        let first = make_order("Jerseys", 0);
        store.insert_new(&first).unwrap();
        let newcomer = make_order("Caps", 10);

        let (entered_tx, entered_rx) = mpsc::channel();
        let (writer, first_id) = (&store, &first.id);
        thread::scope(|s| {
            s.spawn(move || {
                let clock = FixedClock(monday(10, 0));
                writer
                    .modify(first_id, |o| {
                        entered_tx.send(()).unwrap();
                        // Hold the lock while the other writer tries to insert
                        thread::sleep(StdDuration::from_millis(200));
                        o.start_stage(Stage::Design, &clock)
                    })
                    .unwrap();
            });
            s.spawn(move || {
                entered_rx.recv().unwrap();
                OrderStore::new(&path).insert_new(&newcomer).unwrap();
            });
        });

        let orders = store.read_all().unwrap();
        assert_eq!(orders.len(), 2);
        assert_eq!(orders[&first.id].status(), OrderStatus::InDesign);
        assert!(orders.values().any(|o| o.name == "Caps"));
    }

    #[test]
    fn atomic_write_leaves_no_temp_file() {
        let dir = TempDir::new().unwrap();
        let store = OrderStore::new(dir.path().join("nested").join("orders.jsonl"));

        let order = make_order("Jerseys", 0);
        store.insert_new(&order).unwrap();
        store
            .modify(&order.id, |o| {
                o.start_stage(Stage::Print, &FixedClock(monday(10, 0)))
            })
            .unwrap();

        assert!(store.path().exists());
        assert!(store.path().with_extension("lock").exists());
        assert!(!store.path().with_extension("jsonl.tmp").exists());
    }
}
