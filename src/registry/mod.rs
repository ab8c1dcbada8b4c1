//! # Registry Infrastructure
//!
//! Registration tables consulted by the orchestration core at dispatch time.
//!
//! ```text
//! Registry Infrastructure
//! └── FetcherRegistry   ((module, endpoint) → async fetch function)
//! ```

pub mod fetcher_registry;

pub use fetcher_registry::{FetcherRegistry, FnFetcher, RegistryStats, WidgetFetcher};
