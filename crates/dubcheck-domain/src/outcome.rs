//! Best-effort results for calls that must never abort a fact-check

/// Outcome of an external call that degrades instead of failing
///
/// Evidence search and AI adjudication always produce a usable value. When the
/// call fails the value is a fallback and the cause travels alongside it, so
/// callers can log the degradation without being able to forget the fallback.
///
/// # Examples
///
/// ```
/// use dubcheck_domain::BestEffort;
///
/// let degraded: BestEffort<Vec<u8>, &str> = BestEffort::fallback(Vec::new(), "timeout");
/// assert!(degraded.is_fallback());
/// assert_eq!(degraded.cause(), Some(&"timeout"));
/// assert!(degraded.into_value().is_empty());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum BestEffort<T, E> {
    /// The call succeeded
    Complete(T),

    /// The call failed; `value` is the fallback
    Fallback {
        /// Value to use in place of the real result
        value: T,
        /// Why the call failed
        cause: E,
    },
}

impl<T, E> BestEffort<T, E> {
    /// Wrap a fallback value together with its cause
    pub fn fallback(value: T, cause: E) -> Self {
        BestEffort::Fallback { value, cause }
    }

    /// Whether this is a fallback
    pub fn is_fallback(&self) -> bool {
        matches!(self, BestEffort::Fallback { .. })
    }

    /// The failure cause, if any
    pub fn cause(&self) -> Option<&E> {
        match self {
            BestEffort::Complete(_) => None,
            BestEffort::Fallback { cause, .. } => Some(cause),
        }
    }

    /// Borrow the value regardless of outcome
    pub fn value(&self) -> &T {
        match self {
            BestEffort::Complete(value) | BestEffort::Fallback { value, .. } => value,
        }
    }

    /// Take the value regardless of outcome
    pub fn into_value(self) -> T {
        match self {
            BestEffort::Complete(value) | BestEffort::Fallback { value, .. } => value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_complete() {
        let outcome: BestEffort<u32, String> = BestEffort::Complete(7);
        assert!(!outcome.is_fallback());
        assert!(outcome.cause().is_none());
        assert_eq!(*outcome.value(), 7);
        assert_eq!(outcome.into_value(), 7);
    }

    #[test]
    fn test_fallback() {
        let outcome = BestEffort::fallback(0u32, "down".to_string());
        assert!(outcome.is_fallback());
        assert_eq!(outcome.cause().map(String::as_str), Some("down"));
        assert_eq!(outcome.into_value(), 0);
    }
}
