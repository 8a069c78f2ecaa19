/// Data layer: core types, parsing, range handling and export.
///
/// Architecture:
/// ```text
///  DOS0 / *.txt / *.dat
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  read file → text
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  parser   │  text → Series (sorted by energy)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  range    │  validate bounds, auto-detect from data
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  points inside the window → renderer / export
///   └──────────┘
/// ```

pub mod export;
pub mod filter;
pub mod loader;
pub mod model;
pub mod parser;
pub mod range;
