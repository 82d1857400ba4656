//! Specification predicates over entity collections.

use std::marker::PhantomData;

/// A predicate selecting entities from a repository.
///
/// Specifications are immutable. Composition builds a new specification from
/// existing ones; it never changes them.
pub trait Specification<T>: Send + Sync {
    /// Returns true if the candidate satisfies this specification.
    fn is_satisfied_by(&self, candidate: &T) -> bool;

    /// Matches candidates satisfying both specifications.
    fn and<S>(self, other: S) -> AndSpec<T, Self, S>
    where
        Self: Sized,
        S: Specification<T>,
    {
        AndSpec {
            left: self,
            right: other,
            _phantom: PhantomData,
        }
    }

    /// Matches candidates satisfying either specification.
    fn or<S>(self, other: S) -> OrSpec<T, Self, S>
    where
        Self: Sized,
        S: Specification<T>,
    {
        OrSpec {
            left: self,
            right: other,
            _phantom: PhantomData,
        }
    }

    /// Matches candidates not satisfying this specification.
    fn not(self) -> NotSpec<T, Self>
    where
        Self: Sized,
    {
        NotSpec {
            spec: self,
            _phantom: PhantomData,
        }
    }
}

/// Conjunction of two specifications.
#[derive(Debug, Clone)]
pub struct AndSpec<T, L, R> {
    left: L,
    right: R,
    _phantom: PhantomData<fn(&T)>,
}

impl<T, L, R> Specification<T> for AndSpec<T, L, R>
where
    L: Specification<T>,
    R: Specification<T>,
{
    fn is_satisfied_by(&self, candidate: &T) -> bool {
        self.left.is_satisfied_by(candidate) && self.right.is_satisfied_by(candidate)
    }
}

/// Disjunction of two specifications.
#[derive(Debug, Clone)]
pub struct OrSpec<T, L, R> {
    left: L,
    right: R,
    _phantom: PhantomData<fn(&T)>,
}

impl<T, L, R> Specification<T> for OrSpec<T, L, R>
where
    L: Specification<T>,
    R: Specification<T>,
{
    fn is_satisfied_by(&self, candidate: &T) -> bool {
        self.left.is_satisfied_by(candidate) || self.right.is_satisfied_by(candidate)
    }
}

/// Negation of a specification.
#[derive(Debug, Clone)]
pub struct NotSpec<T, S> {
    spec: S,
    _phantom: PhantomData<fn(&T)>,
}

impl<T, S> Specification<T> for NotSpec<T, S>
where
    S: Specification<T>,
{
    fn is_satisfied_by(&self, candidate: &T) -> bool {
        !self.spec.is_satisfied_by(candidate)
    }
}

/// A specification backed by a closure.
pub struct FnSpec<T, F> {
    predicate: F,
    _phantom: PhantomData<fn(&T)>,
}

impl<T, F> Specification<T> for FnSpec<T, F>
where
    F: Fn(&T) -> bool + Send + Sync,
{
    fn is_satisfied_by(&self, candidate: &T) -> bool {
        (self.predicate)(candidate)
    }
}

/// Wraps a closure as a specification.
///
/// Useful for one-off queries; named specification types read better for
/// anything reused.
pub fn spec_fn<T, F>(predicate: F) -> FnSpec<T, F>
where
    F: Fn(&T) -> bool + Send + Sync,
{
    FnSpec {
        predicate,
        _phantom: PhantomData,
    }
}

/// Matches every candidate.
#[derive(Debug, Clone, Copy, Default)]
pub struct All;

impl<T> Specification<T> for All {
    fn is_satisfied_by(&self, _candidate: &T) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Even;

    impl Specification<i32> for Even {
        fn is_satisfied_by(&self, candidate: &i32) -> bool {
            candidate % 2 == 0
        }
    }

    struct Positive;

    impl Specification<i32> for Positive {
        fn is_satisfied_by(&self, candidate: &i32) -> bool {
            *candidate > 0
        }
    }

    #[test]
    fn and_requires_both() {
        let spec = Even.and(Positive);
        assert!(spec.is_satisfied_by(&4));
        assert!(!spec.is_satisfied_by(&-4));
        assert!(!spec.is_satisfied_by(&3));
    }

    #[test]
    fn or_requires_either() {
        let spec = Even.or(Positive);
        assert!(spec.is_satisfied_by(&-4));
        assert!(spec.is_satisfied_by(&3));
        assert!(!spec.is_satisfied_by(&-3));
    }

    #[test]
    fn not_inverts() {
        let spec = Even.not();
        assert!(spec.is_satisfied_by(&3));
        assert!(!spec.is_satisfied_by(&2));
    }

    #[test]
    fn closure_spec_composes_with_named_specs() {
        let spec = spec_fn(|n: &i32| *n > 10).and(Even);
        assert!(spec.is_satisfied_by(&12));
        assert!(!spec.is_satisfied_by(&11));
        assert!(!spec.is_satisfied_by(&8));
    }

    #[test]
    fn all_matches_everything() {
        assert!(Specification::<i32>::is_satisfied_by(&All, &-1));
    }
}
