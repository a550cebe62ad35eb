//! Domain models

mod cart;
mod category;
mod order;
mod product;
mod staff;
mod table;

pub use cart::{Cart, CartLine};
pub use category::Category;
pub use order::{
    Destination, ItemStatus, NewOrder, NewOrderItem, Order, OrderItem, OrderStatus, OrderUpdate,
    ProductSnapshot,
};
pub use product::Product;
pub use staff::Staff;
pub use table::{NewTable, Table, TableStatus};
