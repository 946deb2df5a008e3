//! Data layer: records, loading, and the cross-filtering index.
//!
//! Architecture:
//! ```text
//!  .csv / .tsv / .json / .parquet
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  loader   │  parse file → Vec<Record>   (fail-fast)
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────────────┐
//!   │ DimensionalIndex │  dimensions (cached keys + sort order), groups
//!   └──────────────────┘
//!        │  set_filter
//!        ▼
//!   ┌─────────────┐
//!   │ coordinator  │  flipped records → add/remove on every other group
//!   └─────────────┘
//! ```

pub mod coordinator;
pub mod error;
pub mod filter;
pub mod index;
pub mod loader;
pub mod model;
pub mod reducer;

pub use error::{IndexError, LoadError, ParseError};
pub use filter::Filter;
pub use index::{DimensionId, DimensionalIndex, GroupId, GroupSnapshot};
pub use model::{Field, Key, Projection, Record};
pub use reducer::{Aggregate, Match, Reducer};
