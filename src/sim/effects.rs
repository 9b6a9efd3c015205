//! Time-bounded status effects (shield, rapid fire, double damage)
//!
//! Entries only lapse; there is no cancellation. Queries compare against the
//! current time, so an expired-but-unswept entry already reads as inactive.

/// One granted effect instance
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveEffect {
    pub name: String,
    /// Absolute session time (ms) at which this instance stops counting
    pub expires_at_ms: f64,
}

/// Active effect entries; several instances of one name may coexist
#[derive(Debug, Clone, Default)]
pub struct StatusEffects {
    entries: Vec<ActiveEffect>,
}

impl StatusEffects {
    /// Grant `name` for `duration_ms` starting at `now_ms`
    pub fn add(&mut self, name: &str, duration_ms: f64, now_ms: f64) {
        self.entries.push(ActiveEffect {
            name: name.to_owned(),
            expires_at_ms: now_ms + duration_ms,
        });
    }

    /// True iff an unexpired instance of `name` exists
    pub fn is_active(&self, name: &str, now_ms: f64) -> bool {
        self.entries
            .iter()
            .any(|e| e.name == name && e.expires_at_ms > now_ms)
    }

    /// Latest expiry among live instances of `name`
    pub fn expires_at(&self, name: &str, now_ms: f64) -> Option<f64> {
        self.entries
            .iter()
            .filter(|e| e.name == name && e.expires_at_ms > now_ms)
            .map(|e| e.expires_at_ms)
            .fold(None, |acc, t| Some(acc.map_or(t, |a: f64| a.max(t))))
    }

    /// Remove expired entries, returning how many were dropped
    pub fn sweep(&mut self, now_ms: f64) -> usize {
        let before = self.entries.len();
        self.entries.retain(|e| e.expires_at_ms > now_ms);
        before - self.entries.len()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ActiveEffect> {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expiry_is_checked_at_query_time() {
        let mut fx = StatusEffects::default();
        fx.add("Shield", 1000.0, 0.0);
        assert!(fx.is_active("Shield", 999.0));
        // Not swept yet, but already inactive
        assert!(!fx.is_active("Shield", 1000.0));
        assert_eq!(fx.len(), 1);
        assert_eq!(fx.sweep(1000.0), 1);
        assert!(fx.is_empty());
    }

    #[test]
    fn test_overlapping_grants_extend_to_latest_expiry() {
        let mut fx = StatusEffects::default();
        fx.add("Shield", 15000.0, 0.0);
        fx.add("Shield", 15000.0, 10000.0);
        for t in (0..25000).step_by(500) {
            assert!(fx.is_active("Shield", t as f64), "inactive at {t}");
        }
        fx.sweep(20000.0);
        assert!(fx.is_active("Shield", 24999.0));
        assert!(!fx.is_active("Shield", 25000.0));
        assert_eq!(fx.expires_at("Shield", 0.0), Some(25000.0));
    }

    #[test]
    fn test_names_are_independent() {
        let mut fx = StatusEffects::default();
        fx.add("Rapid Fire", 10000.0, 0.0);
        assert!(!fx.is_active("Double Damage", 1.0));
        assert_eq!(fx.expires_at("Double Damage", 1.0), None);
    }
}
