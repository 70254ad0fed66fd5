//! Year tables for the marginal rate calculator.
//!
//! [`StatutoryTables`] carries the 2017 and 2018 law. Base rate schedules can
//! be replaced from a CSV file with [`ScheduleLoader`].

pub mod loader;
pub mod statutory;

pub use loader::{ScheduleKey, ScheduleLoader, ScheduleLoaderError, ScheduleRecord};
pub use statutory::StatutoryTables;
