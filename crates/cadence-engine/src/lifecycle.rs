//! Lifecycle state machine.
//!
//! Pure bookkeeping: it decides which transitions are legal and records the
//! current state. Invoking application callbacks is the facade's job.

use std::fmt;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum LifecycleState {
    Created,
    Started,
    Running,
    Paused,
    Stopped,
    Disposed,
}

impl LifecycleState {
    /// `true` while the loops exist (running or suspended).
    pub fn is_live(self) -> bool {
        matches!(self, Self::Running | Self::Paused)
    }

    /// `true` once the runtime can never run again.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Stopped | Self::Disposed)
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Transition {
    Start,
    Resume,
    Pause,
    Stop,
    Dispose,
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, thiserror::Error)]
#[error("illegal lifecycle transition {transition} from {from}")]
pub struct IllegalTransition {
    pub from: LifecycleState,
    pub transition: Transition,
}

/// Tracks the lifecycle state and enforces legal transitions.
///
/// Monotonic except for the `Paused <-> Running` cycle; `Stopped` and
/// `Disposed` are each entered at most once.
#[derive(Debug)]
pub struct Lifecycle {
    state: LifecycleState,
    resumes: u64,
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::new()
    }
}

impl Lifecycle {
    pub fn new() -> Self {
        Self {
            state: LifecycleState::Created,
            resumes: 0,
        }
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    /// Number of completed `Paused -> Running` transitions.
    pub fn resumes_from_pause(&self) -> u64 {
        self.resumes
    }

    /// Target state of `transition` from the current state, if legal.
    pub fn target(&self, transition: Transition) -> Option<LifecycleState> {
        use LifecycleState as S;
        use Transition as T;

        match (self.state, transition) {
            (S::Created, T::Start) => Some(S::Started),
            (S::Started | S::Paused, T::Resume) => Some(S::Running),
            (S::Running, T::Pause) => Some(S::Paused),
            (S::Running | S::Paused, T::Stop) => Some(S::Stopped),
            (S::Stopped, T::Dispose) => Some(S::Disposed),
            _ => None,
        }
    }

    pub fn can(&self, transition: Transition) -> bool {
        self.target(transition).is_some()
    }

    /// Applies `transition` and returns the state it left.
    pub fn apply(&mut self, transition: Transition) -> Result<LifecycleState, IllegalTransition> {
        let from = self.state;
        let to = self
            .target(transition)
            .ok_or(IllegalTransition { from, transition })?;

        if from == LifecycleState::Paused && to == LifecycleState::Running {
            self.resumes += 1;
        }

        self.state = to;
        log::debug!("lifecycle: {from} -> {to}");
        Ok(from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use LifecycleState as S;
    use Transition as T;

    const ALL: [Transition; 5] = [T::Start, T::Resume, T::Pause, T::Stop, T::Dispose];

    fn at(state: LifecycleState) -> Lifecycle {
        let mut lc = Lifecycle::new();
        let path: &[Transition] = match state {
            S::Created => &[],
            S::Started => &[T::Start],
            S::Running => &[T::Start, T::Resume],
            S::Paused => &[T::Start, T::Resume, T::Pause],
            S::Stopped => &[T::Start, T::Resume, T::Stop],
            S::Disposed => &[T::Start, T::Resume, T::Stop, T::Dispose],
        };
        for t in path {
            lc.apply(*t).unwrap();
        }
        lc
    }

    #[test]
    fn only_start_is_legal_from_created() {
        let lc = Lifecycle::new();
        let legal: Vec<_> = ALL.into_iter().filter(|t| lc.can(*t)).collect();
        assert_eq!(legal, vec![T::Start]);
    }

    #[test]
    fn stop_before_start_is_rejected_and_state_unchanged() {
        let mut lc = Lifecycle::new();
        let err = lc.apply(T::Stop).unwrap_err();
        assert_eq!(err.from, S::Created);
        assert_eq!(lc.state(), S::Created);
    }

    #[test]
    fn pause_resume_cycles_freely() {
        let mut lc = at(S::Running);
        for _ in 0..5 {
            lc.apply(T::Pause).unwrap();
            lc.apply(T::Resume).unwrap();
        }
        assert_eq!(lc.state(), S::Running);
        assert_eq!(lc.resumes_from_pause(), 5);
    }

    #[test]
    fn stop_is_reachable_from_running_and_paused() {
        assert_eq!(at(S::Running).target(T::Stop), Some(S::Stopped));
        assert_eq!(at(S::Paused).target(T::Stop), Some(S::Stopped));
        assert_eq!(at(S::Started).target(T::Stop), None);
    }

    #[test]
    fn terminal_states_enter_once() {
        let mut lc = at(S::Stopped);
        assert!(lc.apply(T::Stop).is_err());
        assert!(lc.apply(T::Resume).is_err());
        lc.apply(T::Dispose).unwrap();
        for t in ALL {
            assert!(lc.apply(t).is_err(), "{t} must be illegal after dispose");
        }
        assert_eq!(lc.state(), S::Disposed);
    }

    #[test]
    fn start_is_not_repeatable() {
        let mut lc = at(S::Paused);
        assert!(lc.apply(T::Start).is_err());
    }

    #[test]
    fn live_and_terminal_classification() {
        assert!(S::Running.is_live());
        assert!(S::Paused.is_live());
        assert!(!S::Started.is_live());
        assert!(S::Stopped.is_terminal());
        assert!(!S::Paused.is_terminal());
    }

    #[test]
    fn error_message_names_both_sides() {
        let err = Lifecycle::new().apply(T::Pause).unwrap_err();
        assert_eq!(err.to_string(), "illegal lifecycle transition Pause from Created");
    }
}
