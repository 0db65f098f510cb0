//! Restart decision for a run that has ended.

use prochub_core::{ProcessStatus, RestartPolicy};

/// How a run ended, as far as the restart policy is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitInfo {
    /// Exit code, absent when the process was killed by a signal.
    pub code: Option<i32>,
    /// A stop was explicitly requested before the exit was observed.
    pub intentional: bool,
}

impl ExitInfo {
    /// Exit code 0. Death by signal counts as failure.
    pub const fn is_success(self) -> bool {
        matches!(self.code, Some(0))
    }
}

/// Action to take when a run ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestartAction {
    /// Schedule a new run after the definition's restart delay.
    Restart,
    /// Settle in a terminal state.
    Settle(ProcessStatus),
}

/// Evaluate the restart policy for an ended run.
///
/// `restart_count` is the number of automatic restarts already performed
/// since the last reset.
pub fn decide(
    policy: RestartPolicy,
    max_restarts: u32,
    restart_count: u32,
    exit: ExitInfo,
) -> RestartAction {
    if exit.intentional {
        return RestartAction::Settle(ProcessStatus::Stopped);
    }

    let budget_left = restart_count < max_restarts;
    match policy {
        RestartPolicy::Never if exit.is_success() => RestartAction::Settle(ProcessStatus::Stopped),
        RestartPolicy::Never => RestartAction::Settle(ProcessStatus::Crashed),
        RestartPolicy::OnFailure if exit.is_success() => {
            RestartAction::Settle(ProcessStatus::Stopped)
        }
        RestartPolicy::OnFailure | RestartPolicy::Always if budget_left => RestartAction::Restart,
        RestartPolicy::OnFailure | RestartPolicy::Always => {
            RestartAction::Settle(ProcessStatus::Crashed)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const fn exited(code: i32) -> ExitInfo {
        ExitInfo {
            code: Some(code),
            intentional: false,
        }
    }

    const SIGNALLED: ExitInfo = ExitInfo {
        code: None,
        intentional: false,
    };

    #[test]
    fn test_intentional_exit_never_restarts() {
        let exit = ExitInfo {
            code: Some(1),
            intentional: true,
        };
        for policy in [RestartPolicy::Never, RestartPolicy::OnFailure, RestartPolicy::Always] {
            assert_eq!(
                decide(policy, 5, 0, exit),
                RestartAction::Settle(ProcessStatus::Stopped)
            );
        }
    }

    #[test]
    fn test_never() {
        assert_eq!(
            decide(RestartPolicy::Never, 5, 0, exited(0)),
            RestartAction::Settle(ProcessStatus::Stopped)
        );
        assert_eq!(
            decide(RestartPolicy::Never, 5, 0, exited(2)),
            RestartAction::Settle(ProcessStatus::Crashed)
        );
    }

    #[test]
    fn test_on_failure() {
        assert_eq!(
            decide(RestartPolicy::OnFailure, 3, 0, exited(0)),
            RestartAction::Settle(ProcessStatus::Stopped)
        );
        assert_eq!(decide(RestartPolicy::OnFailure, 3, 2, exited(1)), RestartAction::Restart);
        assert_eq!(decide(RestartPolicy::OnFailure, 3, 0, SIGNALLED), RestartAction::Restart);
        assert_eq!(
            decide(RestartPolicy::OnFailure, 3, 3, exited(1)),
            RestartAction::Settle(ProcessStatus::Crashed)
        );
    }

    #[test]
    fn test_always() {
        assert_eq!(decide(RestartPolicy::Always, 3, 0, exited(0)), RestartAction::Restart);
        assert_eq!(decide(RestartPolicy::Always, 3, 2, exited(1)), RestartAction::Restart);
        assert_eq!(
            decide(RestartPolicy::Always, 3, 3, exited(0)),
            RestartAction::Settle(ProcessStatus::Crashed)
        );
        assert_eq!(
            decide(RestartPolicy::Always, 0, 0, exited(1)),
            RestartAction::Settle(ProcessStatus::Crashed)
        );
    }
}
