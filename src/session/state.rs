//! Session states, events and the control projection.
//!
//! Pure types with no I/O: the transition *data* lives here, the
//! transition *mechanics* live in [`crate::session::session`].

use serde::{Deserialize, Serialize};
use std::fmt;

/// The lifecycle state of the recording session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// No recording has been made yet.
    Idle,
    /// Audio is being captured.
    Recording,
    /// Capture finalized; an asset exists and may be uploaded.
    Stopped,
    /// Upload in flight; every other event is rejected until it settles.
    Transcribing,
    /// Transcript received; export is available.
    Done,
    /// The finalized asset exceeds the upload limit. Only a new
    /// recording leaves this state.
    TooLarge,
}

impl SessionState {
    /// Whether `event` is accepted in this state.
    ///
    /// This is the single source of truth for transition legality;
    /// [`ControlSet::for_state`] is its user-facing projection.
    pub fn accepts(self, event: SessionEvent) -> bool {
        match event {
            SessionEvent::Start => matches!(
                self,
                SessionState::Idle | SessionState::Done | SessionState::TooLarge
            ),
            SessionEvent::Stop => self == SessionState::Recording,
            SessionEvent::Transcribe => self == SessionState::Stopped,
            SessionEvent::Export => self == SessionState::Done,
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::Idle => "idle",
            SessionState::Recording => "recording",
            SessionState::Stopped => "stopped",
            SessionState::Transcribing => "transcribing",
            SessionState::Done => "done",
            SessionState::TooLarge => "too_large",
        };
        f.write_str(name)
    }
}

/// A user-triggered session event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionEvent {
    Start,
    Stop,
    Transcribe,
    Export,
}

impl fmt::Display for SessionEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionEvent::Start => "start",
            SessionEvent::Stop => "stop",
            SessionEvent::Transcribe => "transcribe",
            SessionEvent::Export => "export",
        };
        f.write_str(name)
    }
}

/// Enabled/disabled projection of the four session controls.
///
/// Derived, never stored: a control is enabled exactly when the
/// corresponding event would be accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlSet {
    pub record: bool,
    pub stop: bool,
    pub transcribe: bool,
    pub export: bool,
}

impl ControlSet {
    /// Compute the projection for `state`.
    pub fn for_state(state: SessionState) -> Self {
        Self {
            record: state.accepts(SessionEvent::Start),
            stop: state.accepts(SessionEvent::Stop),
            transcribe: state.accepts(SessionEvent::Transcribe),
            export: state.accepts(SessionEvent::Export),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_STATES: [SessionState; 6] = [
        SessionState::Idle,
        SessionState::Recording,
        SessionState::Stopped,
        SessionState::Transcribing,
        SessionState::Done,
        SessionState::TooLarge,
    ];

    const ALL_EVENTS: [SessionEvent; 4] = [
        SessionEvent::Start,
        SessionEvent::Stop,
        SessionEvent::Transcribe,
        SessionEvent::Export,
    ];

    #[test]
    fn start_accepted_only_in_idle_done_too_large() {
        for state in ALL_STATES {
            let expected = matches!(
                state,
                SessionState::Idle | SessionState::Done | SessionState::TooLarge
            );
            assert_eq!(
                state.accepts(SessionEvent::Start),
                expected,
                "start in {state}"
            );
        }
    }

    #[test]
    fn stop_accepted_only_while_recording() {
        for state in ALL_STATES {
            assert_eq!(
                state.accepts(SessionEvent::Stop),
                state == SessionState::Recording,
                "stop in {state}"
            );
        }
    }

    #[test]
    fn transcribe_accepted_only_when_stopped() {
        for state in ALL_STATES {
            assert_eq!(
                state.accepts(SessionEvent::Transcribe),
                state == SessionState::Stopped,
                "transcribe in {state}"
            );
        }
    }

    #[test]
    fn export_accepted_only_when_done() {
        for state in ALL_STATES {
            assert_eq!(
                state.accepts(SessionEvent::Export),
                state == SessionState::Done,
                "export in {state}"
            );
        }
    }

    #[test]
    fn transcribing_rejects_everything() {
        for event in ALL_EVENTS {
            assert!(!SessionState::Transcribing.accepts(event), "{event}");
        }
    }

    #[test]
    fn controls_match_acceptance_in_every_state() {
        for state in ALL_STATES {
            let controls = ControlSet::for_state(state);
            assert_eq!(controls.record, state.accepts(SessionEvent::Start));
            assert_eq!(controls.stop, state.accepts(SessionEvent::Stop));
            assert_eq!(controls.transcribe, state.accepts(SessionEvent::Transcribe));
            assert_eq!(controls.export, state.accepts(SessionEvent::Export));
        }
    }

    #[test]
    fn idle_projection_matches_initial_page_state() {
        // record enabled, everything else disabled
        let controls = ControlSet::for_state(SessionState::Idle);
        assert!(controls.record);
        assert!(!controls.stop);
        assert!(!controls.transcribe);
        assert!(!controls.export);
    }

    #[test]
    fn recording_projection() {
        let controls = ControlSet::for_state(SessionState::Recording);
        assert!(!controls.record);
        assert!(controls.stop);
        assert!(!controls.transcribe);
        assert!(!controls.export);
    }

    #[test]
    fn stopped_projection_offers_transcribe_only() {
        let controls = ControlSet::for_state(SessionState::Stopped);
        assert!(!controls.record);
        assert!(!controls.stop);
        assert!(controls.transcribe);
        assert!(!controls.export);
    }

    #[test]
    fn done_projection_enables_export() {
        let controls = ControlSet::for_state(SessionState::Done);
        assert!(controls.record);
        assert!(!controls.stop);
        assert!(!controls.transcribe);
        assert!(controls.export);
    }

    #[test]
    fn too_large_projection_only_allows_re_record() {
        let controls = ControlSet::for_state(SessionState::TooLarge);
        assert!(controls.record);
        assert!(!controls.stop);
        assert!(!controls.transcribe);
        assert!(!controls.export);
    }

    #[test]
    fn state_serializes_snake_case() {
        let json = serde_json::to_string(&SessionState::TooLarge).expect("should serialize");
        assert_eq!(json, "\"too_large\"");
    }

    #[test]
    fn display_matches_serde_names() {
        for state in ALL_STATES {
            let json = serde_json::to_string(&state).expect("should serialize");
            assert_eq!(json.trim_matches('"'), state.to_string());
        }
    }
}
