//! Read-aloud support.
//!
//! A [`SpeechBackend`] speaks one utterance at a time and reports how it
//! finished on a channel. [`Narrator`] owns the single active utterance
//! and drives it from the reader.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::{Duration, Instant};

use tokio::process::Command;
use tokio::sync::{mpsc, oneshot};

use crate::error::{AppError, Result};

/// Rates offered by the rate button, in cycling order.
pub const PLAYBACK_RATES: [f32; 4] = [1.0, 1.5, 2.0, 0.75];

/// espeak-ng speed at rate 1.0, in words per minute.
const BASE_WORDS_PER_MINUTE: f32 = 175.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SpeechHandle(u64);

#[derive(Debug, Clone, PartialEq)]
pub struct SpeechParams {
    pub lang: String,
    pub rate: f32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpeechEvent {
    Ended(SpeechHandle),
    Failed(SpeechHandle, String),
}

pub trait SpeechBackend {
    fn speak(&mut self, text: &str, params: &SpeechParams) -> Result<SpeechHandle>;
    fn pause(&mut self, handle: SpeechHandle) -> Result<()>;
    fn resume(&mut self, handle: SpeechHandle) -> Result<()>;
    fn cancel(&mut self, handle: SpeechHandle);
}

struct ActiveUtterance {
    handle: SpeechHandle,
    pid: Option<u32>,
    cancel: oneshot::Sender<()>,
}

/// Speaks through an external espeak-compatible program.
pub struct CommandSpeech {
    program: PathBuf,
    events: mpsc::Sender<SpeechEvent>,
    next_id: u64,
    active: Option<ActiveUtterance>,
}

impl CommandSpeech {
    pub fn new(program: PathBuf, events: mpsc::Sender<SpeechEvent>) -> Self {
        Self {
            program,
            events,
            next_id: 0,
            active: None,
        }
    }

    /// Looks `command` up on `PATH` (or uses it directly if it is a path).
    pub fn detect(command: &str, events: mpsc::Sender<SpeechEvent>) -> Option<Self> {
        find_program(command).map(|program| Self::new(program, events))
    }

    fn signal(&self, handle: SpeechHandle, signal: &str) -> Result<()> {
        let pid = self
            .active
            .as_ref()
            .filter(|active| active.handle == handle)
            .and_then(|active| active.pid)
            .ok_or_else(|| AppError::Speech("utterance is not active".to_string()))?;
        send_signal(pid, signal)
    }
}

fn send_signal(pid: u32, signal: &str) -> Result<()> {
    let status = std::process::Command::new("kill")
        .arg(signal)
        .arg(pid.to_string())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()?;
    if !status.success() {
        return Err(AppError::Speech(format!("kill {signal} failed with {status}")));
    }
    Ok(())
}

impl SpeechBackend for CommandSpeech {
    fn speak(&mut self, text: &str, params: &SpeechParams) -> Result<SpeechHandle> {
        if let Some(previous) = self.active.take() {
            let _ = previous.cancel.send(());
        }

        let mut child = Command::new(&self.program)
            .args(speech_args(text, params))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()?;

        self.next_id += 1;
        let handle = SpeechHandle(self.next_id);
        let (cancel_tx, cancel_rx) = oneshot::channel();
        let events = self.events.clone();
        let pid = child.id();

        tokio::spawn(async move {
            let finished = tokio::select! {
                status = child.wait() => Some(status),
                _ = cancel_rx => None,
            };

            let event = match finished {
                None => {
                    let _ = child.kill().await;
                    return;
                }
                Some(Ok(status)) if status.success() => SpeechEvent::Ended(handle),
                Some(Ok(status)) => SpeechEvent::Failed(handle, format!("exited with {status}")),
                Some(Err(e)) => SpeechEvent::Failed(handle, e.to_string()),
            };
            let _ = events.send(event).await;
        });

        self.active = Some(ActiveUtterance {
            handle,
            pid,
            cancel: cancel_tx,
        });
        Ok(handle)
    }

    fn pause(&mut self, handle: SpeechHandle) -> Result<()> {
        self.signal(handle, "-STOP")
    }

    fn resume(&mut self, handle: SpeechHandle) -> Result<()> {
        self.signal(handle, "-CONT")
    }

    fn cancel(&mut self, handle: SpeechHandle) {
        if self.active.as_ref().is_some_and(|a| a.handle == handle) {
            if let Some(active) = self.active.take() {
                // A stopped process must be continued before it can die.
                if let Some(pid) = active.pid {
                    let _ = send_signal(pid, "-CONT");
                }
                let _ = active.cancel.send(());
            }
        }
    }
}

/// espeak-ng arguments. Text after `--` is never read as an option, so
/// pages opening with a dialogue hyphen are spoken.
fn speech_args(text: &str, params: &SpeechParams) -> Vec<String> {
    let words_per_minute = (BASE_WORDS_PER_MINUTE * params.rate).round() as u32;
    vec![
        "-v".to_string(),
        params.lang.to_lowercase(),
        "-s".to_string(),
        words_per_minute.to_string(),
        "--".to_string(),
        text.to_string(),
    ]
}

fn find_program(command: &str) -> Option<PathBuf> {
    let direct = Path::new(command);
    if direct.components().count() > 1 {
        return direct.is_file().then(|| direct.to_path_buf());
    }

    let paths = std::env::var_os("PATH")?;
    std::env::split_paths(&paths)
        .map(|dir| dir.join(command))
        .find(|candidate| candidate.is_file())
}

/// Backend used when no speech program is installed.
pub struct NullSpeech;

impl SpeechBackend for NullSpeech {
    fn speak(&mut self, _text: &str, _params: &SpeechParams) -> Result<SpeechHandle> {
        Err(AppError::Speech("no speech program available".to_string()))
    }

    fn pause(&mut self, _handle: SpeechHandle) -> Result<()> {
        Err(AppError::Speech("no speech program available".to_string()))
    }

    fn resume(&mut self, _handle: SpeechHandle) -> Result<()> {
        Err(AppError::Speech("no speech program available".to_string()))
    }

    fn cancel(&mut self, _handle: SpeechHandle) {}
}

#[derive(Debug, Clone, PartialEq)]
enum NarrationState {
    Idle,
    Speaking { handle: SpeechHandle, text: String },
    Paused { handle: SpeechHandle, text: String },
    /// Waiting to start over at a new rate.
    Restarting { at: Instant, text: String },
}

/// Holds the one utterance that may be active at a time.
pub struct Narrator {
    backend: Box<dyn SpeechBackend>,
    events: mpsc::Receiver<SpeechEvent>,
    lang: String,
    rate: f32,
    settle: Duration,
    state: NarrationState,
}

impl Narrator {
    pub fn new(
        backend: Box<dyn SpeechBackend>,
        events: mpsc::Receiver<SpeechEvent>,
        lang: String,
        rate: f32,
        settle: Duration,
    ) -> Self {
        Self {
            backend,
            events,
            lang,
            rate,
            settle,
            state: NarrationState::Idle,
        }
    }

    pub fn rate(&self) -> f32 {
        self.rate
    }

    pub fn is_reading(&self) -> bool {
        self.state != NarrationState::Idle
    }

    pub fn is_paused(&self) -> bool {
        matches!(self.state, NarrationState::Paused { .. })
    }

    /// Play/pause button: starts reading `text`, or pauses and resumes the
    /// current utterance.
    pub fn toggle(&mut self, text: &str) {
        match std::mem::replace(&mut self.state, NarrationState::Idle) {
            NarrationState::Idle => self.start(text),
            NarrationState::Speaking { handle, text } => match self.backend.pause(handle) {
                Ok(()) => self.state = NarrationState::Paused { handle, text },
                Err(e) => {
                    tracing::warn!("Failed to pause speech: {}", e);
                    self.state = NarrationState::Speaking { handle, text };
                }
            },
            NarrationState::Paused { handle, text } => match self.backend.resume(handle) {
                Ok(()) => self.state = NarrationState::Speaking { handle, text },
                Err(e) => {
                    tracing::warn!("Failed to resume speech: {}", e);
                    self.backend.cancel(handle);
                }
            },
            NarrationState::Restarting { .. } => {}
        }
    }

    /// Speaks `text` from the beginning, cancelling anything in flight.
    pub fn start(&mut self, text: &str) {
        self.stop();
        if text.trim().is_empty() {
            return;
        }

        let params = SpeechParams {
            lang: self.lang.clone(),
            rate: self.rate,
        };
        match self.backend.speak(text, &params) {
            Ok(handle) => {
                self.state = NarrationState::Speaking {
                    handle,
                    text: text.to_string(),
                }
            }
            Err(e) => tracing::warn!("Failed to start speech: {}", e),
        }
    }

    pub fn stop(&mut self) {
        match std::mem::replace(&mut self.state, NarrationState::Idle) {
            NarrationState::Speaking { handle, .. } | NarrationState::Paused { handle, .. } => {
                self.backend.cancel(handle)
            }
            NarrationState::Idle | NarrationState::Restarting { .. } => {}
        }
    }

    /// Moves to the next playback rate. Speech cannot change rate mid
    /// utterance, so an active utterance is cancelled and restarted from
    /// the top after the settle delay.
    pub fn cycle_rate(&mut self, now: Instant) -> f32 {
        let next = PLAYBACK_RATES
            .iter()
            .position(|&r| r == self.rate)
            .map_or(0, |i| (i + 1) % PLAYBACK_RATES.len());
        self.rate = PLAYBACK_RATES[next];

        match std::mem::replace(&mut self.state, NarrationState::Idle) {
            NarrationState::Speaking { handle, text } | NarrationState::Paused { handle, text } => {
                self.backend.cancel(handle);
                self.state = NarrationState::Restarting {
                    at: now + self.settle,
                    text,
                };
            }
            other => self.state = other,
        }
        self.rate
    }

    pub fn tick(&mut self, now: Instant) {
        if let NarrationState::Restarting { at, text } = &self.state {
            if now >= *at {
                let text = text.clone();
                self.start(&text);
            }
        }
    }

    /// Drains completion events. Events for utterances other than the
    /// active one are ignored.
    pub fn poll_events(&mut self) {
        while let Ok(event) = self.events.try_recv() {
            let finished = match &event {
                SpeechEvent::Ended(handle) | SpeechEvent::Failed(handle, _) => *handle,
            };
            if self.active_handle() != Some(finished) {
                continue;
            }
            if let SpeechEvent::Failed(_, message) = event {
                tracing::warn!("Speech failed: {}", message);
            }
            self.state = NarrationState::Idle;
        }
    }

    fn active_handle(&self) -> Option<SpeechHandle> {
        match &self.state {
            NarrationState::Speaking { handle, .. } | NarrationState::Paused { handle, .. } => {
                Some(*handle)
            }
            _ => None,
        }
    }
}
