//! Strongly-typed index newtypes.
//!
//! These types prevent mixing up the different kinds of indices the
//! kernels juggle (cell vs dof).

use std::fmt;

/// Macro to generate index newtypes with common functionality.
macro_rules! define_index {
    (
        $(#[$meta:meta])*
        $name:ident, $display_prefix:literal
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[repr(transparent)]
        pub struct $name(usize);

        impl $name {
            /// Create a new index.
            #[inline]
            pub const fn new(index: usize) -> Self {
                Self(index)
            }

            /// Get the raw index value.
            #[inline]
            pub const fn get(self) -> usize {
                self.0
            }

            /// Create an iterator over [0, n) indices.
            pub fn iter(n: usize) -> impl ExactSizeIterator<Item = $name> {
                (0..n).map($name)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}{}", $display_prefix, self.0)
            }
        }

        impl From<usize> for $name {
            #[inline]
            fn from(index: usize) -> Self {
                Self(index)
            }
        }

        impl From<$name> for usize {
            #[inline]
            fn from(idx: $name) -> usize {
                idx.0
            }
        }

        // Allow using as array index
        impl<T> std::ops::Index<$name> for [T] {
            type Output = T;
            #[inline]
            fn index(&self, idx: $name) -> &T {
                &self[idx.0]
            }
        }

        impl<T> std::ops::IndexMut<$name> for [T] {
            #[inline]
            fn index_mut(&mut self, idx: $name) -> &mut T {
                &mut self[idx.0]
            }
        }

        impl<T> std::ops::Index<$name> for Vec<T> {
            type Output = T;
            #[inline]
            fn index(&self, idx: $name) -> &T {
                &self[idx.0]
            }
        }

        impl<T> std::ops::IndexMut<$name> for Vec<T> {
            #[inline]
            fn index_mut(&mut self, idx: $name) -> &mut T {
                &mut self[idx.0]
            }
        }
    };
}

define_index!(
    /// Cell (triangle) index in a mesh.
    ///
    /// Owned cells come first, ghost cells follow.
    ///
    /// # Example
    ///
    /// ```
    /// use dg_vof::types::CellIndex;
    ///
    /// let cell = CellIndex::new(42);
    /// assert_eq!(cell.get(), 42);
    /// assert_eq!(cell.to_string(), "C42");
    /// ```
    CellIndex,
    "C"
);

define_index!(
    /// Global degree-of-freedom index in a scalar DG field.
    ///
    /// # Example
    ///
    /// ```
    /// use dg_vof::types::DofIndex;
    ///
    /// let dofs: Vec<_> = DofIndex::iter(6).collect();
    /// assert_eq!(dofs.len(), 6);
    /// assert_eq!(dofs[5].get(), 5);
    /// ```
    DofIndex,
    "D"
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_display() {
        assert_eq!(CellIndex::new(3).to_string(), "C3");
        assert_eq!(DofIndex::new(12).to_string(), "D12");
    }

    #[test]
    fn test_index_slices() {
        let values = vec![1.0, 2.0, 3.0];
        assert_eq!(values[CellIndex::new(1)], 2.0);
        assert_eq!(values[..][DofIndex::new(2)], 3.0);

        let mut values = values;
        values[CellIndex::new(0)] = 5.0;
        assert_eq!(values[0], 5.0);
    }

    #[test]
    fn test_index_iter() {
        let cells: Vec<_> = CellIndex::iter(4).collect();
        assert_eq!(cells.len(), 4);
        assert_eq!(cells[3], CellIndex::new(3));
        assert_eq!(usize::from(cells[2]), 2);
    }
}
