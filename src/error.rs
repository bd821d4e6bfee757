//! # Failure aggregation for multi-resource teardown.
//!
//! When several resources are released in one sweep, more than one release can
//! fail, and cleanup code has no good place to put the "extra" errors. This
//! module keeps them all:
//!
//! - [`AggregateError`] — one reported error carrying a primary payload plus an
//!   insertion-ordered list of subordinate ("suppressed") failures.
//! - [`Shade`] — the running aggregate built up while a teardown is in flight.
//!   Failures are absorbed one by one; [`Shade::finish`] collapses the state
//!   into at most one error.
//!
//! A subordinate never replaces the primary. If no primary exists when the
//! first failure lands, either the failure itself becomes the primary
//! ([`Shade::new`]) or a fresh synthetic aggregate is created around a label
//! and the failure becomes its first subordinate ([`Shade::synthetic`]) — the
//! latter is what multi-object close paths use, so each sub-object's error
//! stays individually visible.
//!
//! # Example
//! ```
//! use mooring::{BoxError, Shade};
//!
//! let mut shade = Shade::synthetic("multi-close failure");
//! shade.absorb(Ok(()));
//! shade.absorb(Err(BoxError::from("disk flush failed")));
//! shade.absorb(Err(BoxError::from("socket already gone")));
//!
//! let err = shade.finish().unwrap();
//! assert_eq!(err.to_string(), "multi-close failure (2 suppressed)");
//! ```

use std::error::Error;
use std::fmt;

/// Boxed error type used for opaque, caller-supplied failures.
pub type BoxError = Box<dyn Error + Send + Sync + 'static>;

/// One error carrying a primary payload and ordered subordinate failures.
///
/// Produced by [`Shade::finish`] whenever more than one failure (or a labeled
/// synthetic aggregation point) is involved. The primary is `None` only for
/// synthesized aggregates, where the label stands in for it.
#[derive(Debug)]
pub struct AggregateError {
    label: &'static str,
    primary: Option<BoxError>,
    suppressed: Vec<BoxError>,
}

impl AggregateError {
    pub(crate) fn new(
        label: &'static str,
        primary: Option<BoxError>,
        suppressed: Vec<BoxError>,
    ) -> Self {
        Self {
            label,
            primary,
            suppressed,
        }
    }

    /// Builds an aggregate from an explicit primary plus subordinates.
    pub fn wrap(primary: BoxError, suppressed: Vec<BoxError>) -> Self {
        Self::new("aggregate failure", Some(primary), suppressed)
    }

    /// The label naming the aggregation point (e.g. `"multi-close failure"`).
    pub fn label(&self) -> &'static str {
        self.label
    }

    /// The primary failure, if one existed before aggregation started.
    pub fn primary(&self) -> Option<&BoxError> {
        self.primary.as_ref()
    }

    /// Subordinate failures, in the order they were absorbed.
    pub fn suppressed(&self) -> &[BoxError] {
        &self.suppressed
    }

    /// Whether this aggregate was synthesized around a label rather than
    /// promoted from a real failure.
    pub fn is_synthesized(&self) -> bool {
        self.primary.is_none()
    }
}

impl fmt::Display for AggregateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.primary {
            Some(primary) => write!(f, "{primary}")?,
            None => write!(f, "{}", self.label)?,
        }
        write!(f, " ({} suppressed)", self.suppressed.len())
    }
}

impl Error for AggregateError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match &self.primary {
            Some(primary) => Some(primary.as_ref() as &(dyn Error + 'static)),
            None => self
                .suppressed
                .first()
                .map(|e| e.as_ref() as &(dyn Error + 'static)),
        }
    }
}

/// Running aggregate failure accumulated during a teardown sweep.
///
/// A shade starts clear and absorbs the outcome of each release attempt.
/// Absorption never drops a failure and never lets a later failure displace
/// an earlier primary; [`Shade::finish`] reports the merged result.
#[derive(Debug, Default)]
pub struct Shade {
    label: Option<&'static str>,
    primary: Option<BoxError>,
    suppressed: Vec<BoxError>,
}

impl Shade {
    /// Clear shade without synthetic wrapping: the first absorbed failure
    /// becomes the primary as-is, later failures become subordinates.
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear shade with explicit synthetic wrapping: the first absorbed
    /// failure synthesizes an [`AggregateError`] labeled `label`, and every
    /// failure (including the first) becomes a subordinate.
    pub fn synthetic(label: &'static str) -> Self {
        Self {
            label: Some(label),
            primary: None,
            suppressed: Vec::new(),
        }
    }

    /// Shade seeded with an existing failure. The seed stays primary; every
    /// absorbed failure becomes a subordinate.
    pub fn with_primary(primary: BoxError) -> Self {
        Self {
            label: None,
            primary: Some(primary),
            suppressed: Vec::new(),
        }
    }

    /// Absorbs the outcome of one release attempt.
    pub fn absorb(&mut self, result: Result<(), BoxError>) {
        if let Err(err) = result {
            if self.primary.is_none() && self.label.is_none() {
                self.primary = Some(err);
            } else {
                self.suppressed.push(err);
            }
        }
    }

    /// Whether nothing has failed so far and no primary was seeded.
    pub fn is_clear(&self) -> bool {
        self.primary.is_none() && self.suppressed.is_empty()
    }

    /// Whether finishing now would report a synthesized aggregate, i.e. a
    /// labeled aggregation point with no caller-provided primary.
    pub fn synthesized(&self) -> bool {
        self.primary.is_none() && !self.suppressed.is_empty()
    }

    /// Collapses the shade into at most one error.
    ///
    /// - clear shade: `None`;
    /// - a single primary with no subordinates: that error, unchanged;
    /// - anything else: an [`AggregateError`].
    pub fn finish(self) -> Option<BoxError> {
        let Self {
            label,
            primary,
            suppressed,
        } = self;
        match (primary, suppressed) {
            (None, suppressed) if suppressed.is_empty() => None,
            (Some(primary), suppressed) if suppressed.is_empty() => Some(primary),
            (primary, suppressed) => Some(Box::new(AggregateError::new(
                label.unwrap_or("aggregate failure"),
                primary,
                suppressed,
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fail(msg: &str) -> Result<(), BoxError> {
        Err(BoxError::from(msg.to_string()))
    }

    #[test]
    fn test_clear_shade_finishes_none() {
        let mut shade = Shade::new();
        shade.absorb(Ok(()));
        assert!(shade.is_clear());
        assert!(shade.finish().is_none());
    }

    #[test]
    fn test_first_failure_becomes_primary_unwrapped() {
        let mut shade = Shade::new();
        shade.absorb(fail("boom"));
        let err = shade.finish().unwrap();
        // No AggregateError wrapping for a lone failure.
        assert_eq!(err.to_string(), "boom");
        assert!(err.downcast_ref::<AggregateError>().is_none());
    }

    #[test]
    fn test_later_failures_become_subordinates() {
        let mut shade = Shade::new();
        shade.absorb(fail("first"));
        shade.absorb(fail("second"));
        shade.absorb(fail("third"));
        let err = shade.finish().unwrap();
        let agg = err.downcast_ref::<AggregateError>().unwrap();
        assert_eq!(agg.primary().unwrap().to_string(), "first");
        assert!(!agg.is_synthesized());
        let subs: Vec<String> = agg.suppressed().iter().map(|e| e.to_string()).collect();
        assert_eq!(subs, vec!["second", "third"]);
    }

    #[test]
    fn test_synthetic_shade_wraps_first_failure() {
        let mut shade = Shade::synthetic("multi-close failure");
        shade.absorb(fail("only"));
        assert!(shade.synthesized());
        let err = shade.finish().unwrap();
        let agg = err.downcast_ref::<AggregateError>().unwrap();
        assert!(agg.is_synthesized());
        assert_eq!(agg.label(), "multi-close failure");
        assert_eq!(agg.suppressed().len(), 1);
        assert_eq!(agg.suppressed()[0].to_string(), "only");
    }

    #[test]
    fn test_seeded_primary_never_displaced() {
        let mut shade = Shade::with_primary(BoxError::from("original".to_string()));
        shade.absorb(fail("while cleaning up"));
        assert!(!shade.synthesized());
        let err = shade.finish().unwrap();
        let agg = err.downcast_ref::<AggregateError>().unwrap();
        assert_eq!(agg.primary().unwrap().to_string(), "original");
        assert_eq!(agg.suppressed().len(), 1);
    }

    #[test]
    fn test_seeded_primary_with_no_failures_returns_seed_unchanged() {
        let shade = Shade::with_primary(BoxError::from("original".to_string()));
        let err = shade.finish().unwrap();
        assert_eq!(err.to_string(), "original");
        assert!(err.downcast_ref::<AggregateError>().is_none());
    }

    #[test]
    fn test_absorption_order_is_preserved() {
        let mut shade = Shade::synthetic("multi-close failure");
        for msg in ["a", "b", "c", "d"] {
            shade.absorb(fail(msg));
        }
        let err = shade.finish().unwrap();
        let agg = err.downcast_ref::<AggregateError>().unwrap();
        let subs: Vec<String> = agg.suppressed().iter().map(|e| e.to_string()).collect();
        assert_eq!(subs, vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn test_display_and_source() {
        let agg = AggregateError::wrap(
            BoxError::from("primary".to_string()),
            vec![BoxError::from("sub".to_string())],
        );
        assert_eq!(agg.to_string(), "primary (1 suppressed)");
        assert_eq!(agg.source().unwrap().to_string(), "primary");

        let synth = AggregateError::new(
            "multi-close failure",
            None,
            vec![BoxError::from("sub".to_string())],
        );
        assert_eq!(synth.to_string(), "multi-close failure (1 suppressed)");
        assert_eq!(synth.source().unwrap().to_string(), "sub");
    }
}
