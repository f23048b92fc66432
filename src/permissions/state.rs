use std::sync::Mutex;

/// The three-state permission flag for a single request execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionState {
    /// No explicit decision has been made; built-in rules will decide.
    Unresolved,
    Permitted,
    Unpermitted,
}

/// Holds the current request's explicit permission decision.
///
/// One tracker per execution, shared with the function context via `Arc`.
/// `permit`/`deny` are idempotent-overwrite: the last call before the
/// function body returns wins. The executor reads the state exactly once
/// after the body returns.
#[derive(Debug)]
pub struct PermissionTracker {
    state: Mutex<PermissionState>,
}

impl PermissionTracker {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(PermissionState::Unresolved),
        }
    }

    /// A tracker pre-seeded to permitted, for requests whose authorization
    /// was already settled by an outer layer.
    pub fn pre_granted() -> Self {
        Self {
            state: Mutex::new(PermissionState::Permitted),
        }
    }

    pub fn permit(&self) {
        *self.state.lock().expect("permission tracker poisoned") = PermissionState::Permitted;
    }

    pub fn deny(&self) {
        *self.state.lock().expect("permission tracker poisoned") = PermissionState::Unpermitted;
    }

    pub fn state(&self) -> PermissionState {
        *self.state.lock().expect("permission tracker poisoned")
    }
}

impl Default for PermissionTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tracker_starts_unresolved() {
        assert_eq!(PermissionTracker::new().state(), PermissionState::Unresolved);
    }

    #[test]
    fn test_last_explicit_call_wins() {
        let tracker = PermissionTracker::new();
        tracker.permit();
        tracker.deny();
        assert_eq!(tracker.state(), PermissionState::Unpermitted);

        tracker.permit();
        assert_eq!(tracker.state(), PermissionState::Permitted);
    }

    #[test]
    fn test_pre_granted_tracker() {
        let tracker = PermissionTracker::pre_granted();
        assert_eq!(tracker.state(), PermissionState::Permitted);

        // An explicit deny still overrides the upstream verdict.
        tracker.deny();
        assert_eq!(tracker.state(), PermissionState::Unpermitted);
    }
}
