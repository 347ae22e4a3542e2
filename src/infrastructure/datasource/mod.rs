//! Upstream data source implementations

mod http;
mod simulated;

pub use http::HttpDataSource;
pub use simulated::SimulatedDataSource;
