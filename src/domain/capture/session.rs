//! Capture session state machine

use std::fmt;
use std::mem;
use thiserror::Error;

use super::chunk::{AudioChunk, StreamHandle};
use crate::domain::audio::EncodedContainer;

/// Capture states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CaptureState {
    #[default]
    Idle,
    Recording,
    Stopping,
    Ready,
    Failed,
}

impl CaptureState {
    /// Get the string representation
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Recording => "recording",
            Self::Stopping => "stopping",
            Self::Ready => "ready",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for CaptureState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error when an invalid state transition is attempted
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid state transition: cannot {action} while in {current_state} state")]
pub struct InvalidStateTransition {
    pub current_state: CaptureState,
    pub action: String,
}

/// Why a capture could not start
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StartError {
    #[error("Could not capture audio: no stream available")]
    CaptureUnavailable,

    #[error(transparent)]
    InvalidTransition(#[from] InvalidStateTransition),
}

/// State plus the data that only exists in that state.
#[derive(Debug, Default)]
enum Phase {
    #[default]
    Idle,
    Recording {
        stream: StreamHandle,
        chunks: Vec<AudioChunk>,
    },
    Stopping {
        stream: StreamHandle,
    },
    Ready {
        container: EncodedContainer,
    },
    Failed {
        reason: String,
    },
}

/// Capture session entity.
///
/// State machine:
///   IDLE -> RECORDING (start)
///   RECORDING -> STOPPING (begin_stop)
///   STOPPING -> READY (finish)
///   any -> FAILED (fail)
///   READY | FAILED -> IDLE (reset)
///
/// Chunks are only accepted while recording. The chunk log is handed out
/// exactly once, by `begin_stop`, so anything that arrives afterwards is
/// dropped instead of silently joining a finished recording.
#[derive(Debug, Default)]
pub struct CaptureSession {
    phase: Phase,
}

impl CaptureSession {
    /// Create a new session in idle state
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the current state
    pub fn state(&self) -> CaptureState {
        match self.phase {
            Phase::Idle => CaptureState::Idle,
            Phase::Recording { .. } => CaptureState::Recording,
            Phase::Stopping { .. } => CaptureState::Stopping,
            Phase::Ready { .. } => CaptureState::Ready,
            Phase::Failed { .. } => CaptureState::Failed,
        }
    }

    /// The stream being recorded or finalized, if any
    pub fn stream(&self) -> Option<&StreamHandle> {
        match &self.phase {
            Phase::Recording { stream, .. } | Phase::Stopping { stream } => Some(stream),
            _ => None,
        }
    }

    /// Number of chunks accepted so far in the current recording
    pub fn chunk_count(&self) -> usize {
        match &self.phase {
            Phase::Recording { chunks, .. } => chunks.len(),
            _ => 0,
        }
    }

    /// Total size of the chunks accepted so far
    pub fn buffered_bytes(&self) -> usize {
        match &self.phase {
            Phase::Recording { chunks, .. } => chunks.iter().map(AudioChunk::len).sum(),
            _ => 0,
        }
    }

    /// The finished container, only while ready
    pub fn container(&self) -> Option<&EncodedContainer> {
        match &self.phase {
            Phase::Ready { container } => Some(container),
            _ => None,
        }
    }

    /// The failure reason, only while failed
    pub fn failure(&self) -> Option<&str> {
        match &self.phase {
            Phase::Failed { reason } => Some(reason),
            _ => None,
        }
    }

    /// Transition from IDLE to RECORDING with a fresh, empty chunk log.
    ///
    /// A missing or empty stream leaves the session idle.
    pub fn start(&mut self, stream: Option<StreamHandle>) -> Result<(), StartError> {
        self.expect(CaptureState::Idle, "start capture")?;

        let stream = stream
            .filter(|s| !s.is_empty())
            .ok_or(StartError::CaptureUnavailable)?;

        self.phase = Phase::Recording {
            stream,
            chunks: Vec::new(),
        };
        Ok(())
    }

    /// Append a chunk while recording; returns whether it was kept.
    ///
    /// In any other state this is a no-op.
    pub fn append_chunk(&mut self, chunk: AudioChunk) -> bool {
        match &mut self.phase {
            Phase::Recording { chunks, .. } => {
                chunks.push(chunk);
                true
            }
            _ => false,
        }
    }

    /// Transition from RECORDING to STOPPING, handing over the chunk log.
    pub fn begin_stop(&mut self) -> Result<Vec<AudioChunk>, InvalidStateTransition> {
        self.expect(CaptureState::Recording, "stop capture")?;

        match mem::take(&mut self.phase) {
            Phase::Recording { stream, chunks } => {
                self.phase = Phase::Stopping { stream };
                Ok(chunks)
            }
            other => {
                self.phase = other;
                Err(self.invalid("stop capture"))
            }
        }
    }

    /// Transition from STOPPING to READY
    pub fn finish(&mut self, container: EncodedContainer) -> Result<(), InvalidStateTransition> {
        self.expect(CaptureState::Stopping, "finish processing")?;
        self.phase = Phase::Ready { container };
        Ok(())
    }

    /// Move to FAILED from any state, dropping whatever the session held.
    pub fn fail(&mut self, reason: impl Into<String>) {
        self.phase = Phase::Failed {
            reason: reason.into(),
        };
    }

    /// Transition from READY or FAILED back to IDLE
    pub fn reset(&mut self) -> Result<(), InvalidStateTransition> {
        match self.state() {
            CaptureState::Ready | CaptureState::Failed => {
                self.phase = Phase::Idle;
                Ok(())
            }
            _ => Err(self.invalid("reset")),
        }
    }

    fn expect(&self, state: CaptureState, action: &str) -> Result<(), InvalidStateTransition> {
        if self.state() == state {
            Ok(())
        } else {
            Err(self.invalid(action))
        }
    }

    fn invalid(&self, action: &str) -> InvalidStateTransition {
        InvalidStateTransition {
            current_state: self.state(),
            action: action.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::audio::{wav, AudioMimeType, SampleMatrix};

    fn stream() -> Option<StreamHandle> {
        Some(StreamHandle::new("test", AudioMimeType::Webm))
    }

    fn container() -> EncodedContainer {
        wav::encode(SampleMatrix::silence(8000, 1, 4).unwrap())
    }

    fn recording() -> CaptureSession {
        let mut session = CaptureSession::new();
        session.start(stream()).unwrap();
        session
    }

    #[test]
    fn new_session_is_idle() {
        let session = CaptureSession::new();
        assert_eq!(session.state(), CaptureState::Idle);
        assert!(session.stream().is_none());
        assert!(session.container().is_none());
    }

    #[test]
    fn start_from_idle() {
        let session = recording();
        assert_eq!(session.state(), CaptureState::Recording);
        assert_eq!(session.stream().map(|s| s.label()), Some("test"));
        assert_eq!(session.chunk_count(), 0);
    }

    #[test]
    fn start_without_stream_stays_idle() {
        let mut session = CaptureSession::new();
        assert_eq!(session.start(None), Err(StartError::CaptureUnavailable));
        assert_eq!(session.state(), CaptureState::Idle);
    }

    #[test]
    fn start_with_empty_stream_stays_idle() {
        let mut session = CaptureSession::new();
        let empty = Some(StreamHandle::new("", AudioMimeType::Webm));
        assert_eq!(session.start(empty), Err(StartError::CaptureUnavailable));
        assert_eq!(session.state(), CaptureState::Idle);
    }

    #[test]
    fn start_from_recording_fails() {
        let mut session = recording();
        let err = session.start(stream()).unwrap_err();
        match err {
            StartError::InvalidTransition(e) => {
                assert_eq!(e.current_state, CaptureState::Recording);
                assert!(e.action.contains("start"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn start_from_ready_requires_reset() {
        let mut session = recording();
        session.begin_stop().unwrap();
        session.finish(container()).unwrap();

        assert!(session.start(stream()).is_err());
        session.reset().unwrap();
        assert!(session.start(stream()).is_ok());
    }

    #[test]
    fn append_keeps_order_while_recording() {
        let mut session = recording();
        assert!(session.append_chunk(AudioChunk::new(vec![1])));
        assert!(session.append_chunk(AudioChunk::new(vec![2, 3])));
        assert_eq!(session.chunk_count(), 2);
        assert_eq!(session.buffered_bytes(), 3);

        let chunks = session.begin_stop().unwrap();
        assert_eq!(chunks, vec![AudioChunk::new(vec![1]), AudioChunk::new(vec![2, 3])]);
    }

    #[test]
    fn append_is_ignored_outside_recording() {
        let mut session = CaptureSession::new();
        assert!(!session.append_chunk(AudioChunk::new(vec![9])));
        assert_eq!(session.chunk_count(), 0);

        let mut session = recording();
        session.append_chunk(AudioChunk::new(vec![1]));
        session.begin_stop().unwrap();
        assert!(!session.append_chunk(AudioChunk::new(vec![2])));
        assert_eq!(session.state(), CaptureState::Stopping);

        session.finish(container()).unwrap();
        assert!(!session.append_chunk(AudioChunk::new(vec![3])));
        assert_eq!(session.state(), CaptureState::Ready);
    }

    #[test]
    fn stop_from_idle_fails() {
        let mut session = CaptureSession::new();
        let err = session.begin_stop().unwrap_err();
        assert_eq!(err.current_state, CaptureState::Idle);
    }

    #[test]
    fn stop_from_stopping_fails() {
        let mut session = recording();
        session.begin_stop().unwrap();
        let err = session.begin_stop().unwrap_err();
        assert_eq!(err.current_state, CaptureState::Stopping);
        assert_eq!(session.state(), CaptureState::Stopping);
    }

    #[test]
    fn start_from_stopping_fails() {
        let mut session = recording();
        session.begin_stop().unwrap();
        assert!(session.start(stream()).is_err());
        assert_eq!(session.state(), CaptureState::Stopping);
    }

    #[test]
    fn finish_exposes_container() {
        let mut session = recording();
        session.begin_stop().unwrap();
        session.finish(container()).unwrap();

        assert_eq!(session.state(), CaptureState::Ready);
        assert_eq!(session.container().map(|c| c.size_bytes()), Some(52));
        assert!(session.stream().is_none());
    }

    #[test]
    fn finish_outside_stopping_fails() {
        let mut session = recording();
        let err = session.finish(container()).unwrap_err();
        assert_eq!(err.current_state, CaptureState::Recording);
    }

    #[test]
    fn fail_from_any_state() {
        let mut session = CaptureSession::new();
        session.fail("boom");
        assert_eq!(session.state(), CaptureState::Failed);
        assert_eq!(session.failure(), Some("boom"));

        let mut session = recording();
        session.begin_stop().unwrap();
        session.fail("decode error");
        assert_eq!(session.state(), CaptureState::Failed);
    }

    #[test]
    fn reset_from_failed_and_ready() {
        let mut session = CaptureSession::new();
        session.fail("boom");
        session.reset().unwrap();
        assert_eq!(session.state(), CaptureState::Idle);
        assert!(session.failure().is_none());

        let mut session = recording();
        session.begin_stop().unwrap();
        session.finish(container()).unwrap();
        session.reset().unwrap();
        assert_eq!(session.state(), CaptureState::Idle);
        assert!(session.container().is_none());
    }

    #[test]
    fn reset_from_idle_or_recording_fails() {
        let mut session = CaptureSession::new();
        assert_eq!(session.reset().unwrap_err().current_state, CaptureState::Idle);

        let mut session = recording();
        assert_eq!(
            session.reset().unwrap_err().current_state,
            CaptureState::Recording
        );
    }

    #[test]
    fn restart_clears_previous_chunks() {
        let mut session = recording();
        session.append_chunk(AudioChunk::new(vec![1, 2]));
        session.fail("boom");
        session.reset().unwrap();
        session.start(stream()).unwrap();
        assert_eq!(session.chunk_count(), 0);
    }

    #[test]
    fn state_display() {
        assert_eq!(CaptureState::Idle.to_string(), "idle");
        assert_eq!(CaptureState::Recording.to_string(), "recording");
        assert_eq!(CaptureState::Stopping.to_string(), "stopping");
        assert_eq!(CaptureState::Ready.to_string(), "ready");
        assert_eq!(CaptureState::Failed.to_string(), "failed");
    }

    #[test]
    fn error_display() {
        let err = InvalidStateTransition {
            current_state: CaptureState::Stopping,
            action: "stop capture".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("stop capture"));
        assert!(msg.contains("stopping"));
    }
}
