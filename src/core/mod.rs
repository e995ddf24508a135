mod aggregate;
mod engine;
mod error;
mod types;

pub use aggregate::{aggregate, summarize};
pub use engine::{MAX_HOLDING_MONTHS, run_projection, simulate, validate, year_of_month};
pub use error::SimulationError;
pub use types::{
    AccountType, AggregatedRow, Granularity, MonthRecord, PayoutMode, Period, Projection,
    ProjectionSummary, SimulationConfig,
};
