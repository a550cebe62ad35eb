//! OrderStore - authoritative in-memory state for the current session
//!
//! Single mutable collection of orders and tables; all mutation goes
//! through the operations below and every one of them leaves the table
//! invariant intact: a table is `Busy` iff at least one non-archived order
//! references it. Reads hand out clones, never references into the maps,
//! so callers can never observe a partial update.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use shared::models::{
    Category, ItemStatus, Order, OrderStatus, Product, Staff, Table, TableStatus,
};

/// Outcome of an upsert
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    Inserted,
    Merged,
}

/// Read-view filter for [`OrderStore::list_orders`]
///
/// `query` is a case-insensitive substring match over order id, carrier
/// number, table name, and item product names.
#[derive(Debug, Clone, Default)]
pub struct OrderFilter {
    pub status: Option<OrderStatus>,
    pub table_id: Option<i64>,
    pub exclude_archived: bool,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub query: Option<String>,
}

impl OrderFilter {
    /// Active operational view: everything except archived orders
    pub fn active() -> Self {
        Self {
            exclude_archived: true,
            ..Self::default()
        }
    }

    /// Active orders on one table
    pub fn for_table(table_id: i64) -> Self {
        Self {
            table_id: Some(table_id),
            exclude_archived: true,
            ..Self::default()
        }
    }
}

/// Authoritative in-memory table of orders and tables
#[derive(Debug, Default)]
pub struct OrderStore {
    orders: HashMap<i64, Order>,
    tables: HashMap<i64, Table>,
    products: HashMap<i64, Product>,
    categories: Vec<Category>,
    staff: Vec<Staff>,
    commission_percent: f64,
}

impl OrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    // ========== Snapshot ==========

    /// Wholesale repopulation from a REST snapshot
    ///
    /// The one intentional full reload; table statuses are recomputed from
    /// the orders rather than trusted from the payload.
    pub fn replace_all(&mut self, orders: Vec<Order>, tables: Vec<Table>) {
        self.orders = orders.into_iter().map(|o| (o.id, o)).collect();
        self.tables = tables.into_iter().map(|t| (t.id, t)).collect();
        let table_ids: Vec<i64> = self.tables.keys().copied().collect();
        for id in table_ids {
            self.refresh_table_status(id);
        }
    }

    pub fn set_products(&mut self, products: Vec<Product>) {
        self.products = products.into_iter().map(|p| (p.id, p)).collect();
    }

    pub fn set_categories(&mut self, categories: Vec<Category>) {
        self.categories = categories;
    }

    pub fn set_staff(&mut self, staff: Vec<Staff>) {
        self.staff = staff;
    }

    pub fn set_commission_percent(&mut self, percent: f64) {
        self.commission_percent = percent;
    }

    // ========== Order mutation ==========

    /// Insert or field-wise merge an order
    ///
    /// A partial payload with absent/empty `order_items` never erases items
    /// already known locally; use [`Self::upsert_order_replacing_items`]
    /// when the empty item list comes from a verified server response.
    pub fn upsert_order(&mut self, mut order: Order) -> Upsert {
        match self.orders.get(&order.id) {
            Some(existing) => {
                if order.order_items.is_empty() && !existing.order_items.is_empty() {
                    order.order_items = existing.order_items.clone();
                }
                let old_table = existing.table_id;
                let new_table = order.table_id;
                self.orders.insert(order.id, order);
                self.relink_tables(old_table, new_table);
                Upsert::Merged
            }
            None => {
                let table = order.table_id;
                self.orders.insert(order.id, order);
                self.relink_tables(None, table);
                Upsert::Inserted
            }
        }
    }

    /// Insert or replace an order, taking its item list verbatim
    pub fn upsert_order_replacing_items(&mut self, order: Order) -> Upsert {
        let old_table = self.orders.get(&order.id).map(|o| o.table_id);
        let new_table = order.table_id;
        let outcome = if self.orders.insert(order.id, order).is_some() {
            Upsert::Merged
        } else {
            Upsert::Inserted
        };
        self.relink_tables(old_table.flatten(), new_table);
        outcome
    }

    /// Remove an order; unknown ids are a no-op returning `None`
    pub fn remove_order(&mut self, id: i64) -> Option<Order> {
        let order = self.orders.remove(&id)?;
        if let Some(table_id) = order.table_id {
            self.refresh_table_status(table_id);
        }
        Some(order)
    }

    /// Mutate one item's kitchen status in place, returning the owning
    /// order's id
    ///
    /// Deliberately leaves the order's aggregate status untouched: the
    /// recompute is an explicit reconciler decision, so a stray late item
    /// event can never regress a completed order back to cooking.
    pub fn update_item_status(&mut self, item_id: i64, status: ItemStatus) -> Option<i64> {
        for order in self.orders.values_mut() {
            if let Some(item) = order
                .order_items
                .iter_mut()
                .find(|i| i.id == Some(item_id))
            {
                item.status = status;
                return Some(order.id);
            }
        }
        None
    }

    /// Set an order's aggregate status; refreshes its table when the order
    /// leaves or re-enters the active set
    pub fn set_order_status(&mut self, id: i64, status: OrderStatus) -> bool {
        let Some(order) = self.orders.get_mut(&id) else {
            return false;
        };
        order.status = status;
        order.updated_at = Utc::now();
        if let Some(table_id) = order.table_id {
            self.refresh_table_status(table_id);
        }
        true
    }

    // ========== Table mutation ==========

    pub fn upsert_table(&mut self, table: Table) {
        self.tables.insert(table.id, table);
    }

    pub fn remove_table(&mut self, id: i64) -> Option<Table> {
        self.tables.remove(&id)
    }

    /// Recompute one table's status: busy iff >= 1 active order references it
    pub fn refresh_table_status(&mut self, table_id: i64) {
        let busy = self
            .orders
            .values()
            .any(|o| o.table_id == Some(table_id) && o.is_active());
        if let Some(table) = self.tables.get_mut(&table_id) {
            table.status = if busy {
                TableStatus::Busy
            } else {
                TableStatus::Empty
            };
        }
    }

    fn relink_tables(&mut self, old: Option<i64>, new: Option<i64>) {
        if let Some(id) = old
            && old != new
        {
            self.refresh_table_status(id);
        }
        if let Some(id) = new {
            self.refresh_table_status(id);
        }
    }

    // ========== Reads ==========

    pub fn get_order(&self, id: i64) -> Option<&Order> {
        self.orders.get(&id)
    }

    pub fn get_table(&self, id: i64) -> Option<&Table> {
        self.tables.get(&id)
    }

    pub fn product(&self, id: i64) -> Option<&Product> {
        self.products.get(&id)
    }

    /// Catalog products, sorted for stable menu rendering
    pub fn list_products(&self) -> Vec<Product> {
        let mut products: Vec<Product> = self.products.values().cloned().collect();
        products.sort_by(|a, b| (a.category_id, &a.name).cmp(&(b.category_id, &b.name)));
        products
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn staff(&self) -> &[Staff] {
        &self.staff
    }

    pub fn commission_percent(&self) -> f64 {
        self.commission_percent
    }

    /// Filtered, ordered read view (sorted by creation time, then id)
    pub fn list_orders(&self, filter: &OrderFilter) -> Vec<Order> {
        let query = filter.query.as_deref().map(str::to_lowercase);
        let mut orders: Vec<Order> = self
            .orders
            .values()
            .filter(|o| self.matches(o, filter, query.as_deref()))
            .cloned()
            .collect();
        orders.sort_by_key(|o| (o.created_at, o.id));
        orders
    }

    /// Tables matching a place name (case-insensitive substring), sorted by
    /// place then seat label
    pub fn list_tables(&self, place: Option<&str>) -> Vec<Table> {
        let place = place.map(str::to_lowercase);
        let mut tables: Vec<Table> = self
            .tables
            .values()
            .filter(|t| match place.as_deref() {
                Some(p) => t.name.to_lowercase().contains(p),
                None => true,
            })
            .cloned()
            .collect();
        tables.sort_by(|a, b| (&a.name, &a.number).cmp(&(&b.name, &b.number)));
        tables
    }

    fn matches(&self, order: &Order, filter: &OrderFilter, query: Option<&str>) -> bool {
        if filter.exclude_archived && !order.is_active() {
            return false;
        }
        if let Some(status) = filter.status
            && order.status != status
        {
            return false;
        }
        if let Some(table_id) = filter.table_id
            && order.table_id != Some(table_id)
        {
            return false;
        }
        if let Some(from) = filter.from
            && order.created_at < from
        {
            return false;
        }
        if let Some(to) = filter.to
            && order.created_at > to
        {
            return false;
        }
        if let Some(q) = query {
            return self.matches_query(order, q);
        }
        true
    }

    fn matches_query(&self, order: &Order, q: &str) -> bool {
        if order.id.to_string().contains(q) {
            return true;
        }
        if order
            .carrier_number
            .as_deref()
            .is_some_and(|c| c.to_lowercase().contains(q))
        {
            return true;
        }
        if let Some(table_id) = order.table_id
            && self
                .tables
                .get(&table_id)
                .is_some_and(|t| t.name.to_lowercase().contains(q))
        {
            return true;
        }
        order
            .order_items
            .iter()
            .any(|i| i.product.name.to_lowercase().contains(q))
    }
}
