//! Global reductions across a domain-decomposed run.
//!
//! Every process owns a contiguous range of cells plus a layer of
//! read-only ghost cells. Quantities such as the maximum Courant number or
//! the global field bounds must be reduced over all processes; the kernels
//! do that through [`Communicator`] so they never see a process-local value.

/// All-process reductions used by the kernels.
pub trait Communicator: Send + Sync {
    /// Rank of this process.
    fn rank(&self) -> usize;

    /// Number of processes.
    fn size(&self) -> usize;

    /// Maximum of `value` over all processes.
    fn max(&self, value: f64) -> f64;

    /// Minimum of `value` over all processes.
    fn min(&self, value: f64) -> f64;

    /// Sum of `value` over all processes.
    fn sum(&self, value: f64) -> f64;

    /// Sum of an integer count over all processes.
    fn sum_count(&self, value: usize) -> usize;
}

/// Single-process communicator: every reduction is the identity.
#[derive(Clone, Copy, Debug, Default)]
pub struct SerialCommunicator;

impl Communicator for SerialCommunicator {
    fn rank(&self) -> usize {
        0
    }

    fn size(&self) -> usize {
        1
    }

    fn max(&self, value: f64) -> f64 {
        value
    }

    fn min(&self, value: f64) -> f64 {
        value
    }

    fn sum(&self, value: f64) -> f64 {
        value
    }

    fn sum_count(&self, value: usize) -> usize {
        value
    }
}

/// Global minimum and maximum of a slice of values.
///
/// Empty local slices contribute `(+inf, -inf)` so they do not affect the
/// reduction.
pub fn global_min_max(values: &[f64], comm: &dyn Communicator) -> (f64, f64) {
    let (lo, hi) = values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });
    (comm.min(lo), comm.max(hi))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serial_reductions_are_identity() {
        let comm = SerialCommunicator;
        assert_eq!(comm.rank(), 0);
        assert_eq!(comm.size(), 1);
        assert_eq!(comm.max(2.5), 2.5);
        assert_eq!(comm.min(-1.0), -1.0);
        assert_eq!(comm.sum(3.0), 3.0);
        assert_eq!(comm.sum_count(7), 7);
    }

    #[test]
    fn test_global_min_max() {
        let (lo, hi) = global_min_max(&[0.3, -0.2, 1.4], &SerialCommunicator);
        assert_eq!(lo, -0.2);
        assert_eq!(hi, 1.4);

        let (lo, hi) = global_min_max(&[], &SerialCommunicator);
        assert!(lo.is_infinite() && lo > 0.0);
        assert!(hi.is_infinite() && hi < 0.0);
    }
}
