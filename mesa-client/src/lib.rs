//! mesa-client - order/table reconciliation core for the mesa dashboard
//!
//! Every order-bearing screen (floor view, delivery view, kitchen queue,
//! history) renders a filtered projection of one shared [`Reconciler`]
//! instead of re-implementing snapshot loads, push-event handling and
//! status derivation on its own. The Reconciler bridges the REST backend
//! and the push-event stream into a single authoritative [`OrderStore`]
//! and notifies subscribed views of changes.

pub mod backend;
pub mod config;
pub mod dedup;
pub mod error;
pub mod http;
pub mod reconciler;
pub mod status;
pub mod store;

pub use backend::Backend;
pub use config::ClientConfig;
pub use dedup::EventDeduplicator;
pub use error::{ClientError, ClientResult};
pub use http::HttpBackend;
pub use reconciler::{Reconciler, SnapshotReport, StoreChange};
pub use status::derive_status;
pub use store::{OrderFilter, OrderStore, Upsert};
