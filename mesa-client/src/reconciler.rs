//! Reconciler - bridges REST snapshots and push events into the OrderStore
//!
//! One instance per session owns the store, the event deduplicator and the
//! change channel; every order-bearing screen renders a filtered projection
//! through [`Reconciler::orders`]/[`Reconciler::tables`] and subscribes to
//! [`StoreChange`] notifications instead of carrying its own event
//! handlers. All network-triggered mutation funnels through here.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::{Mutex, RwLock};
use tokio::sync::{broadcast, mpsc};
use tokio_util::sync::CancellationToken;

use shared::event::PushEvent;
use shared::models::{
    Cart, Destination, NewOrderItem, NewTable, Order, OrderStatus, OrderUpdate, Table, TableStatus,
};

use crate::backend::Backend;
use crate::dedup::EventDeduplicator;
use crate::error::{ClientError, ClientResult};
use crate::status::derive_status;
use crate::store::{OrderFilter, OrderStore};

/// Change channel capacity (bursts come from snapshot reloads)
const CHANGE_CHANNEL_CAPACITY: usize = 256;

/// Store change notification delivered to subscribed views
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreChange {
    SnapshotLoaded,
    OrderUpserted { id: i64 },
    OrderRemoved { id: i64 },
    TableChanged { id: i64 },
    ConnectionChanged { connected: bool },
}

/// Result of a snapshot load
///
/// Orders and tables are mandatory; failures of the secondary endpoints
/// degrade the view instead of blocking it.
#[derive(Debug, Clone, Default)]
pub struct SnapshotReport {
    /// Names of secondary endpoints that failed to load
    pub degraded: Vec<&'static str>,
}

impl SnapshotReport {
    pub fn is_degraded(&self) -> bool {
        !self.degraded.is_empty()
    }
}

/// Session-scoped reconciliation core
pub struct Reconciler {
    backend: Arc<dyn Backend>,
    store: RwLock<OrderStore>,
    dedup: Mutex<EventDeduplicator>,
    changes: broadcast::Sender<StoreChange>,
    connected: AtomicBool,
}

impl Reconciler {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self {
            backend,
            store: RwLock::new(OrderStore::new()),
            dedup: Mutex::new(EventDeduplicator::new()),
            changes,
            connected: AtomicBool::new(false),
        }
    }

    // ========== Read view ==========

    pub fn orders(&self, filter: &OrderFilter) -> Vec<Order> {
        self.store.read().list_orders(filter)
    }

    pub fn order(&self, id: i64) -> Option<Order> {
        self.store.read().get_order(id).cloned()
    }

    pub fn tables(&self, place: Option<&str>) -> Vec<Table> {
        self.store.read().list_tables(place)
    }

    pub fn table(&self, id: i64) -> Option<Table> {
        self.store.read().get_table(id).cloned()
    }

    pub fn products(&self) -> Vec<shared::models::Product> {
        self.store.read().list_products()
    }

    pub fn categories(&self) -> Vec<shared::models::Category> {
        self.store.read().categories().to_vec()
    }

    pub fn staff(&self) -> Vec<shared::models::Staff> {
        self.store.read().staff().to_vec()
    }

    pub fn commission_percent(&self) -> f64 {
        self.store.read().commission_percent()
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Relaxed)
    }

    /// Subscribe to store change notifications
    pub fn subscribe(&self) -> broadcast::Receiver<StoreChange> {
        self.changes.subscribe()
    }

    fn notify(&self, change: StoreChange) {
        let _ = self.changes.send(change);
    }

    /// Abandon the request when the owning view's token fires; the eventual
    /// response is discarded before it can touch the store.
    async fn guard<T>(
        &self,
        cancel: &CancellationToken,
        fut: impl Future<Output = ClientResult<T>>,
    ) -> ClientResult<T> {
        tokio::select! {
            _ = cancel.cancelled() => Err(ClientError::Cancelled),
            result = fut => result,
        }
    }

    // ========== Snapshot ==========

    /// Fetch all snapshot endpoints in parallel and repopulate the store
    ///
    /// Orders and tables must both succeed. Each secondary endpoint fails
    /// independently: what loaded is kept and the failure is reported in
    /// [`SnapshotReport::degraded`].
    pub async fn load_snapshot(&self, cancel: &CancellationToken) -> ClientResult<SnapshotReport> {
        self.guard(cancel, async {
            let (orders, tables, products, categories, percent, staff) = tokio::join!(
                self.backend.fetch_orders(),
                self.backend.fetch_tables(),
                self.backend.fetch_products(),
                self.backend.fetch_categories(),
                self.backend.fetch_commission_percent(),
                self.backend.fetch_staff(),
            );

            let orders = orders?;
            let tables = tables?;

            let mut report = SnapshotReport::default();
            let mut store = self.store.write();
            store.replace_all(orders, tables);

            match products {
                Ok(products) => store.set_products(products),
                Err(e) => {
                    tracing::warn!(error = %e, "Product snapshot failed, keeping stale catalog");
                    report.degraded.push("products");
                }
            }
            match categories {
                Ok(categories) => store.set_categories(categories),
                Err(e) => {
                    tracing::warn!(error = %e, "Category snapshot failed");
                    report.degraded.push("categories");
                }
            }
            match percent {
                Ok(percent) => store.set_commission_percent(percent),
                Err(e) => {
                    tracing::warn!(error = %e, "Service-fee percent fetch failed");
                    report.degraded.push("percent");
                }
            }
            match staff {
                Ok(staff) => store.set_staff(staff),
                Err(e) => {
                    tracing::warn!(error = %e, "Staff list fetch failed");
                    report.degraded.push("staff");
                }
            }
            drop(store);

            tracing::info!(degraded = ?report.degraded, "Snapshot loaded");
            self.notify(StoreChange::SnapshotLoaded);
            Ok(report)
        })
        .await
    }

    // ========== Mutation commands ==========

    /// Submit the composed cart as a new order
    ///
    /// The cart is cleared only on success; on failure it stays intact so
    /// the staff can retry.
    pub async fn create_order(
        &self,
        cart: &mut Cart,
        destination: Destination,
        cancel: &CancellationToken,
    ) -> ClientResult<Order> {
        if cart.is_empty() {
            return Err(ClientError::Validation("cart is empty".to_string()));
        }
        if let Destination::Delivery { carrier_number } = &destination
            && carrier_number.trim().is_empty()
        {
            return Err(ClientError::Validation(
                "delivery order requires a carrier number".to_string(),
            ));
        }

        let body = cart.to_new_order(&destination);
        let order = self.guard(cancel, self.backend.create_order(&body)).await?;
        let id = order.id;

        {
            let mut store = self.store.write();
            store.upsert_order(order.clone());
        }
        cart.clear();

        tracing::info!(order_id = id, "Order created");
        self.notify(StoreChange::OrderUpserted { id });
        if let Some(table_id) = order.table_id {
            self.notify(StoreChange::TableChanged { id: table_id });
        }
        Ok(order)
    }

    /// Add one product line to an existing order
    ///
    /// The catalog is re-checked at submit time; a product marked finished
    /// since the cart was composed is refused.
    pub async fn add_item(
        &self,
        order_id: i64,
        item: NewOrderItem,
        cancel: &CancellationToken,
    ) -> ClientResult<Order> {
        {
            let store = self.store.read();
            if store.get_order(order_id).is_none() {
                return Err(ClientError::Validation(format!(
                    "unknown order: {}",
                    order_id
                )));
            }
            match store.product(item.product_id) {
                None => {
                    return Err(ClientError::Validation(format!(
                        "unknown product: {}",
                        item.product_id
                    )));
                }
                Some(product) if product.is_finished => {
                    return Err(ClientError::Conflict(format!(
                        "product out of stock: {}",
                        product.name
                    )));
                }
                Some(_) => {}
            }
        }

        let order = self
            .guard(cancel, self.backend.add_order_item(order_id, &item))
            .await?;
        self.store.write().upsert_order(order.clone());
        self.notify(StoreChange::OrderUpserted { id: order_id });
        Ok(order)
    }

    /// Remove one item; deletes the order when it was the last item
    ///
    /// Refused when the item is the sole ready item of an order that still
    /// has unready items, so a ready signal never silently disappears.
    pub async fn remove_item(
        &self,
        order_id: i64,
        item_id: i64,
        cancel: &CancellationToken,
    ) -> ClientResult<()> {
        let last_item = {
            let store = self.store.read();
            let Some(order) = store.get_order(order_id) else {
                return Err(ClientError::Validation(format!(
                    "unknown order: {}",
                    order_id
                )));
            };
            let Some(item) = order.order_items.iter().find(|i| i.id == Some(item_id)) else {
                return Err(ClientError::Validation(format!("unknown item: {}", item_id)));
            };
            Self::check_last_ready_guard(order, Some(item))?;
            order.order_items.len() == 1
        };

        if last_item {
            // Zero-item orders are never kept active
            return self.delete_order(order_id, cancel).await;
        }

        let order = self
            .guard(cancel, self.backend.delete_order_item(item_id))
            .await?;
        // Verified server response: take its item list verbatim
        self.store.write().upsert_order_replacing_items(order);
        self.notify(StoreChange::OrderUpserted { id: order_id });
        Ok(())
    }

    /// Move a dine-in order onto another (empty) table
    pub async fn change_table(
        &self,
        order_id: i64,
        new_table_id: i64,
        cancel: &CancellationToken,
    ) -> ClientResult<()> {
        let old_table_id = {
            let store = self.store.read();
            let Some(order) = store.get_order(order_id) else {
                return Err(ClientError::Validation(format!(
                    "unknown order: {}",
                    order_id
                )));
            };
            match store.get_table(new_table_id) {
                None => {
                    return Err(ClientError::Validation(format!(
                        "unknown table: {}",
                        new_table_id
                    )));
                }
                Some(table) if table.status == TableStatus::Busy => {
                    return Err(ClientError::Conflict(format!(
                        "table {} {} is busy",
                        table.name, table.number
                    )));
                }
                Some(_) => {}
            }
            order.table_id
        };

        let order = self
            .guard(
                cancel,
                self.backend
                    .update_order(order_id, &OrderUpdate::table(new_table_id)),
            )
            .await?;
        // Store relinks: old table freed, new table busy
        self.store.write().upsert_order(order);

        tracing::info!(
            order_id,
            from = ?old_table_id,
            to = new_table_id,
            "Order moved to new table"
        );
        if let Some(id) = old_table_id {
            self.notify(StoreChange::TableChanged { id });
        }
        self.notify(StoreChange::TableChanged { id: new_table_id });
        self.notify(StoreChange::OrderUpserted { id: order_id });
        Ok(())
    }

    /// Archive an order and return the finalized snapshot for receipt
    /// rendering
    ///
    /// Two sequential calls: the status update is the durable side effect
    /// and is never rolled back; freeing the table is advisory, retried
    /// once, and otherwise left for the next snapshot to reconcile.
    pub async fn archive_and_print(
        &self,
        order_id: i64,
        cancel: &CancellationToken,
    ) -> ClientResult<Order> {
        if self.store.read().get_order(order_id).is_none() {
            return Err(ClientError::Validation(format!(
                "unknown order: {}",
                order_id
            )));
        }

        let order = self
            .guard(
                cancel,
                self.backend
                    .update_order(order_id, &OrderUpdate::status(OrderStatus::Archive)),
            )
            .await?;

        {
            let mut store = self.store.write();
            store.upsert_order(order.clone());
            store.set_order_status(order_id, OrderStatus::Archive);
        }
        tracing::info!(order_id, "Order archived");
        self.notify(StoreChange::OrderUpserted { id: order_id });

        if let Some(table_id) = order.table_id {
            self.free_table_best_effort(table_id).await;
            self.notify(StoreChange::TableChanged { id: table_id });
        }

        let finalized = self
            .order(order_id)
            .unwrap_or(order);
        Ok(finalized)
    }

    /// Delete an order entirely (not a state transition; terminal removal)
    pub async fn delete_order(
        &self,
        order_id: i64,
        cancel: &CancellationToken,
    ) -> ClientResult<()> {
        let table_id = {
            let store = self.store.read();
            let Some(order) = store.get_order(order_id) else {
                return Err(ClientError::Validation(format!(
                    "unknown order: {}",
                    order_id
                )));
            };
            Self::check_last_ready_guard(order, None)?;
            order.table_id
        };

        self.guard(cancel, self.backend.delete_order(order_id))
            .await?;
        self.store.write().remove_order(order_id);

        tracing::info!(order_id, "Order deleted");
        self.notify(StoreChange::OrderRemoved { id: order_id });
        if let Some(id) = table_id {
            self.notify(StoreChange::TableChanged { id });
        }
        Ok(())
    }

    /// Set an order's status directly (delivery/admin flows)
    pub async fn set_order_status(
        &self,
        order_id: i64,
        status: OrderStatus,
        cancel: &CancellationToken,
    ) -> ClientResult<Order> {
        let order = self
            .guard(
                cancel,
                self.backend.update_order(order_id, &OrderUpdate::status(status)),
            )
            .await?;
        self.store.write().upsert_order(order.clone());
        self.notify(StoreChange::OrderUpserted { id: order_id });
        Ok(order)
    }

    /// Create a table (admin flow)
    pub async fn create_table(
        &self,
        body: NewTable,
        cancel: &CancellationToken,
    ) -> ClientResult<Table> {
        if body.name.trim().is_empty() || body.number.trim().is_empty() {
            return Err(ClientError::Validation(
                "table needs a place name and a seat label".to_string(),
            ));
        }
        let table = self.guard(cancel, self.backend.create_table(&body)).await?;
        let id = table.id;
        self.store.write().upsert_table(table.clone());
        self.notify(StoreChange::TableChanged { id });
        Ok(table)
    }

    /// Delete a table (admin flow); refused while occupied
    pub async fn delete_table(&self, id: i64, cancel: &CancellationToken) -> ClientResult<()> {
        {
            let store = self.store.read();
            if store
                .get_table(id)
                .is_some_and(|t| t.status == TableStatus::Busy)
            {
                return Err(ClientError::Conflict(format!("table {} is busy", id)));
            }
        }
        self.guard(cancel, self.backend.delete_table(id)).await?;
        self.store.write().remove_table(id);
        self.notify(StoreChange::TableChanged { id });
        Ok(())
    }

    /// Refuse removing the sole ready item (or deleting an order whose sole
    /// ready item would vanish with unready items still pending)
    fn check_last_ready_guard(
        order: &Order,
        item: Option<&shared::models::OrderItem>,
    ) -> ClientResult<()> {
        use shared::models::ItemStatus;

        let ready_count = order
            .order_items
            .iter()
            .filter(|i| i.status == ItemStatus::Ready)
            .count();
        let affects_ready = match item {
            Some(item) => item.status == ItemStatus::Ready,
            None => ready_count > 0,
        };
        if affects_ready && ready_count == 1 && order.order_items.len() > 1 {
            return Err(ClientError::Conflict(
                "cannot remove the only ready item while others are pending".to_string(),
            ));
        }
        Ok(())
    }

    async fn free_table_best_effort(&self, table_id: i64) {
        for attempt in 1..=2 {
            match self
                .backend
                .set_table_status(table_id, TableStatus::Empty)
                .await
            {
                Ok(()) => return,
                Err(e) if attempt == 1 => {
                    tracing::warn!(table_id, error = %e, "Table free failed, retrying");
                }
                Err(e) => {
                    tracing::warn!(
                        table_id,
                        error = %e,
                        "Table free failed, leaving for next snapshot"
                    );
                }
            }
        }
    }

    // ========== Push event handling ==========

    /// Apply one normalized push event
    ///
    /// Duplicate deliveries are dropped by the deduplicator; events for
    /// entities unknown locally are benign ordering noise, logged and
    /// dropped without surfacing to the user.
    pub fn handle_event(&self, event: PushEvent) {
        if let Some(key) = event.dedup_key()
            && !self.dedup.lock().check_and_mark(&key)
        {
            tracing::debug!(key = %key, "Duplicate push event dropped");
            return;
        }

        match event {
            PushEvent::Connected => {
                self.connected.store(true, Ordering::Relaxed);
                self.notify(StoreChange::ConnectionChanged { connected: true });
            }
            PushEvent::Disconnected => {
                self.connected.store(false, Ordering::Relaxed);
                self.notify(StoreChange::ConnectionChanged { connected: false });
            }
            PushEvent::OrderCreated(order) => self.on_order_created(order),
            PushEvent::OrderUpdated(order) => self.on_order_updated(order),
            PushEvent::OrderDeleted { order_id, .. } => self.on_order_deleted(order_id),
            PushEvent::OrderItemStatusUpdated {
                item_id, status, ..
            } => self.on_order_item_status_updated(item_id, status),
        }
    }

    fn on_order_created(&self, order: Order) {
        let id = order.id;
        let table_id = order.table_id;
        // New orders are always admitted, even when the create came from
        // another terminal
        let outcome = self.store.write().upsert_order(order);
        tracing::debug!(order_id = id, ?outcome, "orderCreated applied");
        self.notify(StoreChange::OrderUpserted { id });
        if let Some(table_id) = table_id {
            self.notify(StoreChange::TableChanged { id: table_id });
        }
    }

    fn on_order_updated(&self, order: Order) {
        let id = order.id;
        let table_id = order.table_id;
        {
            let mut store = self.store.write();
            // Unlike orderCreated, updates for unknown orders are ignored so
            // stale or foreign data is never resurrected
            if store.get_order(id).is_none() {
                tracing::debug!(order_id = id, "orderUpdated for unknown order dropped");
                return;
            }
            store.upsert_order(order);
        }
        self.notify(StoreChange::OrderUpserted { id });
        if let Some(table_id) = table_id {
            self.notify(StoreChange::TableChanged { id: table_id });
        }
    }

    fn on_order_deleted(&self, order_id: i64) {
        let removed = self.store.write().remove_order(order_id);
        match removed {
            Some(order) => {
                self.notify(StoreChange::OrderRemoved { id: order_id });
                if let Some(table_id) = order.table_id {
                    self.notify(StoreChange::TableChanged { id: table_id });
                }
            }
            None => {
                tracing::debug!(order_id, "orderDeleted for unknown order dropped");
            }
        }
    }

    fn on_order_item_status_updated(&self, item_id: i64, status: shared::models::ItemStatus) {
        let mut store = self.store.write();
        let Some(order_id) = store.update_item_status(item_id, status) else {
            tracing::debug!(item_id, "item status event for unknown item dropped");
            return;
        };

        // Recompute the aggregate only while the order is in a kitchen
        // state; a late item event must never regress Completed/Archive
        if let Some(order) = store.get_order(order_id)
            && order.status.is_kitchen_state()
        {
            let derived = derive_status(&order.order_items);
            store.set_order_status(order_id, derived);
        }
        drop(store);
        self.notify(StoreChange::OrderUpserted { id: order_id });
    }

    /// Session event loop: drain the push subscription until cancelled
    ///
    /// The receiver is handed in by the session owner together with the
    /// connection's lifecycle; no view mounts or unmounts affect it.
    pub async fn run(&self, mut events: mpsc::Receiver<PushEvent>, cancel: CancellationToken) {
        tracing::info!("Reconciler event loop started");
        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                event = events.recv() => match event {
                    Some(event) => self.handle_event(event),
                    None => break,
                },
            }
        }
        tracing::info!("Reconciler event loop stopped");
    }
}

impl std::fmt::Debug for Reconciler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reconciler")
            .field("connected", &self.is_connected())
            .finish()
    }
}
