//! USAspending API endpoints, one module per upstream resource.

pub mod agencies;
pub mod awards;
pub mod search;

pub use agencies::AgenciesApi;
pub use awards::AwardsApi;
pub use search::SearchApi;
