//! Speech-to-text listening sessions.
//!
//! A recogniser emits any number of interim transcripts and at most one
//! final transcript per session. Only finals are worth parsing. Each session
//! gets a generation number so a caller can drop the parse of a transcript
//! that a newer session has already superseded.

use serde::{Deserialize, Serialize};

/// Event emitted by a speech recogniser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "text", rename_all = "lowercase")]
pub enum TranscriptEvent {
    /// Partial hypothesis; display only.
    Interim(String),
    /// Settled transcript; ends the session.
    Final(String),
    /// Session aborted without a transcript.
    Cancelled,
}

/// Final transcript tagged with the session that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinalTranscript {
    /// Recognised text.
    pub text: String,
    /// Session generation.
    pub generation: u64,
}

/// What the session did with an accepted event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Accepted {
    /// Interim text to show while listening.
    Interim(String),
    /// Transcript to parse; the session is now idle.
    Final(FinalTranscript),
    /// The session ended without a transcript.
    Cancelled,
}

/// Errors from misuse of a [`ListeningSession`].
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TranscriptError {
    /// An event or stop arrived with no active session.
    #[error("no listening session is active")]
    NotListening,

    /// `start` was called while a session is running.
    #[error("listening session {generation} is already active")]
    AlreadyListening {
        /// Generation of the running session.
        generation: u64,
    },
}

/// Listening lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Not listening.
    Idle,
    /// Listening; events belong to `generation`.
    Listening {
        /// Current session generation.
        generation: u64,
    },
}

/// Start/stop/toggle control around a recogniser's event stream.
#[derive(Debug)]
pub struct ListeningSession {
    state: SessionState,
    latest_generation: u64,
}

impl Default for ListeningSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ListeningSession {
    /// An idle session; the first `start` is generation 1.
    pub fn new() -> Self {
        Self {
            state: SessionState::Idle,
            latest_generation: 0,
        }
    }

    /// Current state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Returns `true` while a session is active.
    pub fn is_listening(&self) -> bool {
        matches!(self.state, SessionState::Listening { .. })
    }

    /// Begin a new session and return its generation.
    ///
    /// # Errors
    ///
    /// Returns [`TranscriptError::AlreadyListening`] if a session is active.
    pub fn start(&mut self) -> Result<u64, TranscriptError> {
        if let SessionState::Listening { generation } = self.state {
            return Err(TranscriptError::AlreadyListening { generation });
        }
        self.latest_generation = self.latest_generation.saturating_add(1);
        self.state = SessionState::Listening {
            generation: self.latest_generation,
        };
        tracing::debug!(generation = self.latest_generation, "listening started");
        Ok(self.latest_generation)
    }

    /// End the active session without a transcript.
    ///
    /// # Errors
    ///
    /// Returns [`TranscriptError::NotListening`] if no session is active.
    pub fn stop(&mut self) -> Result<(), TranscriptError> {
        match self.state {
            SessionState::Listening { generation } => {
                self.state = SessionState::Idle;
                tracing::debug!(generation, "listening stopped");
                Ok(())
            }
            SessionState::Idle => Err(TranscriptError::NotListening),
        }
    }

    /// Start when idle, stop when listening. Returns whether it is now listening.
    pub fn toggle(&mut self) -> bool {
        if self.stop().is_err() {
            // Idle, so start cannot fail.
            let _ = self.start();
        }
        self.is_listening()
    }

    /// Feed a recogniser event into the session.
    ///
    /// # Errors
    ///
    /// Returns [`TranscriptError::NotListening`] if no session is active,
    /// which includes any event after the session's final transcript.
    pub fn accept(&mut self, event: TranscriptEvent) -> Result<Accepted, TranscriptError> {
        let SessionState::Listening { generation } = self.state else {
            return Err(TranscriptError::NotListening);
        };

        match event {
            TranscriptEvent::Interim(text) => Ok(Accepted::Interim(text)),
            TranscriptEvent::Final(text) => {
                self.state = SessionState::Idle;
                tracing::debug!(generation, "final transcript received");
                Ok(Accepted::Final(FinalTranscript { text, generation }))
            }
            TranscriptEvent::Cancelled => {
                self.state = SessionState::Idle;
                tracing::debug!(generation, "listening cancelled");
                Ok(Accepted::Cancelled)
            }
        }
    }

    /// Returns `false` once a newer session has started, meaning the result
    /// parsed from `transcript` should be discarded.
    pub fn is_current(&self, transcript: &FinalTranscript) -> bool {
        transcript.generation == self.latest_generation
    }
}
