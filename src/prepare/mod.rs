//! prepare — raw panels to estimation-ready market tables.
//!
//! Purpose
//! -------
//! Reconcile the survey reference panel and the administrative registration
//! panel into the common [`MarketTable`](crate::market::MarketTable) schema:
//! markets, products, shares, characteristics, and instruments.
//!
//! Key behaviors
//! -------------
//! - Pure: inputs are already-parsed rows and auxiliary tables; nothing here
//!   touches the filesystem.
//! - Steps run in a fixed order: (registration only) energy finalization,
//!   model-year filter, zero-count replacement, product grouping, household
//!   and firm joins, cleaning, shares, instruments.
//! - Make removal happens either first or last, chosen explicitly through
//!   [`MakeRemoval`].
//!
//! Invariants & assumptions
//! ------------------------
//! - Output rows are unique and sorted by `(market_ids, product_ids)`.
//! - Every inside share is in `[0, 1]`; every outside share equals
//!   `1 − Σ inside shares` of its market and lies in `(0, 1)`.
//! - Any violated data-integrity precondition returns a [`PrepareError`];
//!   nothing is silently clipped or skipped except the logged drops of
//!   uncostable fuels and invalid products.
//!
//! Testing notes
//! -------------
//! - Each step has unit tests in its own file; `pipeline` tests the toy
//!   panels end to end, including both make-removal orderings.

pub mod characteristics;
pub mod energy;
pub mod errors;
pub mod identifiers;
pub mod instruments;
pub mod merge;
pub mod options;
pub mod pipeline;
pub mod shares;
pub mod zms;

pub use self::errors::{PrepareError, PrepareResult};
pub use self::instruments::{INSTRUMENT_CHARACTERISTICS, N_INSTRUMENTS};
pub use self::options::{MakeRemoval, PrepareOptions, DEFAULT_ZMS, REGISTRATION_EXCLUDED_YEARS};
pub use self::pipeline::{prepare_reference, prepare_registration};
