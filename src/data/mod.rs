/// Data layer: sheet geometry, extraction, loading, and filtering.
///
/// Architecture:
/// ```text
///  .xlsx / .xls / .ods
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  read bytes → one Sheet per worksheet
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐   ┌────────┐
///   │ extract   │──▶│ range  │  locate the data block, split off comments
///   └──────────┘   └────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  Table    │  rows (sheet, point) × columns (name, unit)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐   ┌────────┐
///   │  filter   │◀──│ subset │  AND of predicates → mask → filtered Table
///   └──────────┘   └────────┘
/// ```

pub mod error;
pub mod extract;
pub mod filter;
pub mod loader;
pub mod model;
pub mod range;
pub mod sheet;
pub mod subset;
