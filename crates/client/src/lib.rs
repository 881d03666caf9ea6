//! # USAspending client
//!
//! Typed, read-only client for the public [USAspending.gov](https://api.usaspending.gov)
//! REST API. Every call performs exactly one HTTP request; there is no retry,
//! caching or pagination orchestration in this crate.
//!
//! ```rust,no_run
//! use usaspending_client::{ClientResult, UsaSpendingClient};
//!
//! # async fn example() -> ClientResult<()> {
//! let client = UsaSpendingClient::builder().build()?;
//!
//! let agencies = client.agencies().toptier().await?;
//! println!("Found {} agencies", agencies.len());
//!
//! let award = client.awards().get("CONT_AWD_N0001917C0001_9700_-NONE-_-NONE-").await?;
//! println!("{award}");
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod transport;

pub use api::agencies::Agency;
pub use api::awards::{AgencyId, SpendingRequest};
pub use api::search::{SpendingByAwardRequest, TimePeriod};
pub use client::{UsaSpendingClient, UsaSpendingClientBuilder};
pub use config::{ClientConfig, DEFAULT_BASE_URL};
pub use error::{ClientError, ClientResult};
