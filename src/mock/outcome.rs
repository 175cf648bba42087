//! Randomized outcome selection
//!
//! Canned reasons, errors and rules are drawn through an [`OutcomeSource`]
//! so tests can swap the thread RNG for a deterministic sequence.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::decision::DecisionResponse;

pub const REASONS: &[&str] = &[
    "Policy compliance verified",
    "Request approved by admin",
    "Within allowed parameters",
    "User has required permissions",
    "Action permitted by ruleset",
];

pub const ERRORS: &[&str] = &[
    "Rate limit exceeded",
    "Invalid authentication token",
    "Resource not found",
    "Permission denied",
    "Service temporarily unavailable",
];

pub const RULES: &[&str] = &[
    "allow-all",
    "deny-external",
    "require-auth",
    "rate-limit-100",
    "admin-only",
];

/// Source of indices into a non-empty pool
pub trait OutcomeSource: Send + Sync {
    /// Return an index in `0..len`; `len` is never zero
    fn pick(&self, len: usize) -> usize;
}

/// Fresh thread-local randomness per draw
#[derive(Debug, Default)]
pub struct ThreadRngSource;

impl OutcomeSource for ThreadRngSource {
    fn pick(&self, len: usize) -> usize {
        rand::thread_rng().gen_range(0..len)
    }
}

/// Reproducible randomness from a fixed seed
#[derive(Debug)]
pub struct SeededSource {
    rng: Mutex<StdRng>,
}

impl SeededSource {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl OutcomeSource for SeededSource {
    fn pick(&self, len: usize) -> usize {
        match self.rng.lock() {
            Ok(mut rng) => rng.gen_range(0..len),
            Err(poisoned) => poisoned.into_inner().gen_range(0..len),
        }
    }
}

/// Walks each pool in order, one step per draw
#[derive(Debug, Default)]
pub struct CyclingSource {
    next: AtomicUsize,
}

impl OutcomeSource for CyclingSource {
    fn pick(&self, len: usize) -> usize {
        self.next.fetch_add(1, Ordering::Relaxed) % len
    }
}

/// Draw one entry from a non-empty pool
pub fn draw(source: &dyn OutcomeSource, pool: &[&'static str]) -> &'static str {
    pool[source.pick(pool.len()) % pool.len()]
}

/// Build a randomized decision whose outcome is fixed by `allow`
pub fn randomized_decision(source: &dyn OutcomeSource, allow: bool) -> DecisionResponse {
    if allow {
        let reason = draw(source, REASONS);
        DecisionResponse::allowed(reason, draw(source, RULES))
    } else {
        let error = draw(source, ERRORS);
        DecisionResponse::denied(error, draw(source, RULES))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_cycling_source_is_deterministic() {
        let source = CyclingSource::default();
        assert_eq!(draw(&source, REASONS), REASONS[0]);
        assert_eq!(draw(&source, REASONS), REASONS[1]);
        assert_eq!(draw(&source, RULES), RULES[2]);
    }

    #[test]
    fn test_allow_mode_outcome_is_fixed_but_text_varies() {
        let source = ThreadRngSource;
        let mut reasons = HashSet::new();
        let mut rules = HashSet::new();

        for _ in 0..100 {
            let decision = randomized_decision(&source, true);
            assert!(decision.success());
            assert!(!decision.rejected());
            assert!(decision.error().is_none());
            reasons.insert(decision.reason().unwrap().to_string());
            rules.insert(decision.rule().unwrap().to_string());
        }

        assert!(reasons.len() >= 2);
        assert!(rules.len() >= 2);
    }

    #[test]
    fn test_deny_mode_draws_from_error_pool() {
        let source = CyclingSource::default();
        for _ in 0..10 {
            let decision = randomized_decision(&source, false);
            assert!(decision.rejected());
            assert!(decision.reason().is_none());
            assert!(ERRORS.contains(&decision.error().unwrap()));
            assert!(RULES.contains(&decision.rule().unwrap()));
        }
    }

    #[test]
    fn test_seeded_sources_agree() {
        let a = SeededSource::new(42);
        let b = SeededSource::new(42);
        let left: Vec<_> = (0..20).map(|_| draw(&a, RULES)).collect();
        let right: Vec<_> = (0..20).map(|_| draw(&b, RULES)).collect();
        assert_eq!(left, right);
    }
}
