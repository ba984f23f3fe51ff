//! Strongly-typed domain types for safer APIs.
//!
//! Index newtypes keep cell and dof numbering apart at compile time. All newtypes are `#[repr(transparent)]`.
//!
//! # Example
//!
//! ```
//! use dg_vof::types::{CellIndex, DofIndex};
//!
//! let values = vec![0.25, 0.5, 0.75];
//! assert_eq!(values[DofIndex::new(1)], 0.5);
//! assert_eq!(CellIndex::iter(3).count(), 3);
//! ```

mod indices;

pub use indices::{CellIndex, DofIndex};
