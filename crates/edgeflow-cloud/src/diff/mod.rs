//! Desired vs observed comparison
//!
//! Each resource type declares an ordered table of named comparators. The
//! first comparator that reports a mismatch decides the verdict, and its name
//! is kept for diagnostics.

pub mod cdn;
pub mod dns;

/// A named equality check over a (desired, observed) pair
pub type Comparator<D, O> = (&'static str, fn(&D, &O) -> bool);

/// Name of the first failing comparator, or `None` when everything matches
pub fn first_mismatch<D: ?Sized, O: ?Sized>(
    comparators: &[Comparator<D, O>],
    desired: &D,
    observed: &O,
) -> Option<&'static str> {
    comparators
        .iter()
        .find(|(_, matches)| !matches(desired, observed))
        .map(|(name, _)| *name)
}
