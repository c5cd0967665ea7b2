use std::fmt;

use thiserror::Error;

/// Foreground state of the reader, driven by the host (terminal focus and quit).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityState {
    Created,
    Resumed,
    Paused,
    Destroyed,
}

impl fmt::Display for ActivityState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ActivityState::Created => "created",
            ActivityState::Resumed => "resumed",
            ActivityState::Paused => "paused",
            ActivityState::Destroyed => "destroyed",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LifecycleError {
    #[error("Cannot move from {from} to {to}")]
    InvalidTransition {
        from: ActivityState,
        to: ActivityState,
    },
}

#[derive(Debug)]
pub struct Lifecycle {
    state: ActivityState,
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::new()
    }
}

impl Lifecycle {
    pub fn new() -> Self {
        Self {
            state: ActivityState::Created,
        }
    }

    pub fn state(&self) -> ActivityState {
        self.state
    }

    pub fn is_resumed(&self) -> bool {
        self.state == ActivityState::Resumed
    }

    /// Move to `to` if the host allows it from the current state.
    pub fn transition(&mut self, to: ActivityState) -> Result<(), LifecycleError> {
        use ActivityState::*;

        let allowed = matches!(
            (self.state, to),
            (Created, Resumed)
                | (Resumed, Paused)
                | (Paused, Resumed)
                | (Paused, Destroyed)
                | (Created, Destroyed)
        );
        if !allowed {
            return Err(LifecycleError::InvalidTransition {
                from: self.state,
                to,
            });
        }

        tracing::debug!(from = %self.state, to = %to, "Lifecycle transition");
        self.state = to;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ActivityState::*;

    #[test]
    fn normal_session() {
        let mut lc = Lifecycle::new();
        for to in [Resumed, Paused, Resumed, Paused, Destroyed] {
            lc.transition(to).unwrap();
        }
        assert_eq!(lc.state(), Destroyed);
    }

    #[test]
    fn destroy_before_first_resume() {
        let mut lc = Lifecycle::new();
        lc.transition(Destroyed).unwrap();
    }

    #[test]
    fn rejects_skipping_pause() {
        let mut lc = Lifecycle::new();
        lc.transition(Resumed).unwrap();
        assert_eq!(
            lc.transition(Destroyed),
            Err(LifecycleError::InvalidTransition {
                from: Resumed,
                to: Destroyed
            })
        );
        assert!(lc.is_resumed());
    }

    #[test]
    fn destroyed_is_terminal() {
        let mut lc = Lifecycle::new();
        lc.transition(Destroyed).unwrap();
        for to in [Created, Resumed, Paused, Destroyed] {
            assert!(lc.transition(to).is_err());
        }
    }

    #[test]
    fn repeated_state_is_rejected() {
        let mut lc = Lifecycle::new();
        lc.transition(Resumed).unwrap();
        assert!(lc.transition(Resumed).is_err());
    }
}
