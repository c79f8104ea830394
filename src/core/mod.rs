pub mod calendar;
pub mod config;
pub mod error;
pub mod log;
pub mod market;
pub mod plan;
pub mod volatility;

pub use error::PlanError;
pub use market::{RatePoint, RateProvider, RateSeries};
pub use plan::InvestmentPlan;
