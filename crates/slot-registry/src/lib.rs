//! slot-registry: the card holder's slot table and its device command mapping

mod store;
pub use store::{SlotEntry, SlotStore};

mod translate;
pub use translate::{default_slot_codes, CommandScheme, Phase, TranslateError};

mod metrics;
pub use metrics::{DispatchMetrics, MetricsHub};
