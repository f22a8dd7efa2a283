pub mod store;
pub mod telemetry;

pub use store::{ObservedLedgerStore, ObservedStore};
pub use telemetry::{annotate_span_with_trace_ids, init_telemetry};
