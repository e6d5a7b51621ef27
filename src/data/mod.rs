//! Data layer: loading, column resolution, classification, aggregation and reporting.
//!
//! Architecture:
//! ```text
//!  .xlsx / .csv / .json / .parquet
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  loader  │  parse file → RawTable (headers + cells)
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │ columns  │  fuzzy header match → ColumnMap
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  filter  │  step label → CC charge / CC discharge subsets
//!   └──────────┘
//!        │
//!        ▼
//!   ┌───────────┐
//!   │ aggregate │  per-cycle maxima per subset
//!   └───────────┘
//!        │
//!        ▼
//!   ┌───────────┐
//!   │ reconcile │  outer join, ESR / CE / EE, summary
//!   └───────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  report  │  rounded table, CSV / XLSX export
//!   └──────────┘
//! ```
//! [`pipeline::process`] runs the whole chain for one file.

pub mod aggregate;
pub mod columns;
pub mod error;
pub mod filter;
pub mod loader;
pub mod model;
pub mod pipeline;
pub mod reconcile;
pub mod report;
