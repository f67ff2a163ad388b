use std::fmt;
use std::sync::Arc;

/// Gate evaluated before a proxied call proceeds.
///
/// Rules take no inputs beyond whatever ambient context they capture and
/// must be safe to evaluate from several threads at once.
pub trait SecurityRule: Send + Sync {
    /// Returns true to allow the call.
    fn check_rule(&self) -> bool;
}

impl<F> SecurityRule for F
where
    F: Fn() -> bool + Send + Sync,
{
    fn check_rule(&self) -> bool {
        self()
    }
}

/// Ordered set of security rules.
#[derive(Clone, Default)]
pub struct SecurityRules {
    rules: Vec<Arc<dyn SecurityRule>>,
}

impl SecurityRules {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, rule: Arc<dyn SecurityRule>) {
        self.rules.push(rule);
    }

    /// Evaluate rules in registration order.
    ///
    /// Returns the zero-based position of the first denying rule; rules after
    /// it are not evaluated.
    pub fn check(&self) -> Result<(), usize> {
        match self.rules.iter().position(|rule| !rule.check_rule()) {
            Some(position) => Err(position),
            None => Ok(()),
        }
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl fmt::Debug for SecurityRules {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecurityRules")
            .field("len", &self.rules.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct DenyAll;

    impl SecurityRule for DenyAll {
        fn check_rule(&self) -> bool {
            false
        }
    }

    #[test]
    fn test_empty_rules_allow() {
        assert_eq!(SecurityRules::new().check(), Ok(()));
    }

    #[test]
    fn test_all_allowing_rules_pass() {
        let mut rules = SecurityRules::new();
        rules.push(Arc::new(|| true));
        rules.push(Arc::new(|| true));
        assert_eq!(rules.check(), Ok(()));
        assert_eq!(rules.len(), 2);
    }

    #[test]
    fn test_first_denial_short_circuits() {
        let evaluated = Arc::new(AtomicUsize::new(0));
        let mut rules = SecurityRules::new();
        for allow in [true, false, true] {
            let evaluated = Arc::clone(&evaluated);
            rules.push(Arc::new(move || {
                evaluated.fetch_add(1, Ordering::SeqCst);
                allow
            }));
        }

        assert_eq!(rules.check(), Err(1));
        assert_eq!(evaluated.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_named_rule_type() {
        let mut rules = SecurityRules::new();
        rules.push(Arc::new(DenyAll));
        assert_eq!(rules.check(), Err(0));
    }
}
