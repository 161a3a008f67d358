//! Aggregation over fetched readings.
//!
//! Two independent computations keyed through the station directory: the
//! recent-window time series with today values and station comparison, and
//! the year-to-date PM10 exceedance counts. Readings for unknown sensors or
//! with unusable values are dropped before averaging.

pub mod exceedance;
pub mod timeseries;
pub mod types;
pub mod utility;
