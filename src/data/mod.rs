/// Data layer: core types, decoding, and the filter → sort → page → export
/// pipeline.
///
/// Architecture:
/// ```text
///  .csv / .json / .xlsx / .parquet        remote page
///        │                                     │
///        ▼                                     │
///   ┌──────────┐                               │
///   │  decode   │  bytes → DecodedRows         │
///   └──────────┘                               │
///        │                                     │
///        ▼                                     ▼
///   ┌──────────┐
///   │  model    │  Dataset: rows + stable column list
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐   ┌────────┐   ┌────────┐
///   │  filter   │ → │  sort   │ → │ pager   │ → current page
///   └──────────┘   └────────┘   └────────┘
///                       │
///                       ▼
///                  ┌────────┐
///                  │ export  │  all filtered + sorted rows → .xlsx
///                  └────────┘
/// ```
///
/// `view` composes the stages; `width` sizes columns from the full dataset.

pub mod decode;
pub mod export;
pub mod filter;
pub mod model;
pub mod pager;
pub mod sort;
pub mod view;
pub mod width;
