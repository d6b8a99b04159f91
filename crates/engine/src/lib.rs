//! # Tonggwan Engine
//!
//! Deterministic duty, tax and risk evaluation for small cross-border
//! shipments. The core is a pure pipeline over an immutable
//! [`EngineSnapshot`]: validate the declaration, convert the declared
//! value, resolve the duty-free limit, decide dutiability, compute the
//! tax breakdown and match the regulation rule library.
//!
//! [`SnapshotStore`] adds the file-backed lifecycle around it: seed the
//! data file on first run, serve readers through an atomic pointer and
//! swap in a reloaded snapshot only after it validated.

pub mod error;
pub mod evaluate;
pub mod result;
pub mod snapshot;
pub mod tariff;

pub use error::{EngineError, EngineResult};
pub use evaluate::evaluate;
pub use result::{Evaluation, RuleHit, TaxBreakdown};
pub use snapshot::{EngineSnapshot, SnapshotStore};
pub use tariff::{DutyFreeLimits, LimitRule, OriginOverride, TariffSchedule};
