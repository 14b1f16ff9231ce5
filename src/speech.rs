use serde::{Deserialize, Serialize};
use std::process::{Child, Command, Stdio};

use crate::alphabet::Letter;
use crate::error::SpeechError;

#[derive(Debug, Clone, PartialEq)]
pub struct Utterance {
    pub text: String,
    pub language: String,
    pub pitch: f32,
    pub rate: f32,
}

/// How an utterance stopped. Every variant means "no longer speaking".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpeechOutcome {
    Done,
    Stopped,
    Failed(String),
}

/// Text-to-speech backend. `speak` must not block; completion is reported
/// through `poll`. After `stop` cuts an utterance short, the next `poll`
/// reports `Stopped`.
pub trait SpeechEngine: Send {
    fn speak(&mut self, utterance: &Utterance) -> Result<(), SpeechError>;
    fn stop(&mut self);
    fn poll(&mut self) -> Option<SpeechOutcome>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeechSettings {
    /// Executable invoked for each utterance, e.g. `espeak-ng`
    pub command: String,
    pub letter_language: String,
    pub letter_pitch: f32,
    pub letter_rate: f32,
    pub completion_text: String,
    pub completion_language: String,
}

impl Default for SpeechSettings {
    fn default() -> Self {
        Self {
            command: "espeak-ng".to_string(),
            letter_language: "ar".to_string(),
            letter_pitch: 1.0,
            letter_rate: 0.75,
            completion_text: "Well done!".to_string(),
            completion_language: "en".to_string(),
        }
    }
}

/// Runs an espeak-compatible command per utterance.
#[derive(Debug)]
pub struct CommandSpeech {
    program: String,
    child: Option<Child>,
    stopped: bool,
}

const ESPEAK_BASE_PITCH: f32 = 50.0;
const ESPEAK_BASE_WPM: f32 = 175.0;

impl CommandSpeech {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            child: None,
            stopped: false,
        }
    }

    pub fn args_for(utterance: &Utterance) -> Vec<String> {
        let pitch = (utterance.pitch * ESPEAK_BASE_PITCH).clamp(0.0, 99.0).round() as u32;
        let wpm = (utterance.rate * ESPEAK_BASE_WPM).max(80.0).round() as u32;
        vec![
            "-v".to_string(),
            utterance.language.clone(),
            "-p".to_string(),
            pitch.to_string(),
            "-s".to_string(),
            wpm.to_string(),
            utterance.text.clone(),
        ]
    }
}

impl SpeechEngine for CommandSpeech {
    fn speak(&mut self, utterance: &Utterance) -> Result<(), SpeechError> {
        if self.program.trim().is_empty() {
            return Err(SpeechError::NoCommand);
        }
        self.stop();
        self.stopped = false;

        let child = Command::new(&self.program)
            .args(Self::args_for(utterance))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| SpeechError::Spawn {
                command: self.program.clone(),
                source,
            })?;

        self.child = Some(child);
        Ok(())
    }

    fn stop(&mut self) {
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
            self.stopped = true;
        }
    }

    fn poll(&mut self) -> Option<SpeechOutcome> {
        let Some(child) = self.child.as_mut() else {
            return std::mem::take(&mut self.stopped).then_some(SpeechOutcome::Stopped);
        };
        let outcome = match child.try_wait() {
            Ok(None) => return None,
            Ok(Some(status)) if status.success() => SpeechOutcome::Done,
            Ok(Some(status)) => SpeechOutcome::Failed(format!("exited with {status}")),
            Err(e) => SpeechOutcome::Failed(e.to_string()),
        };
        self.child = None;
        Some(outcome)
    }
}

impl Drop for CommandSpeech {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Engine that finishes every utterance instantly without a sound.
#[derive(Debug, Default)]
pub struct SilentSpeech {
    pending: bool,
    stopped: bool,
}

impl SpeechEngine for SilentSpeech {
    fn speak(&mut self, _utterance: &Utterance) -> Result<(), SpeechError> {
        self.pending = true;
        self.stopped = false;
        Ok(())
    }

    fn stop(&mut self) {
        if std::mem::take(&mut self.pending) {
            self.stopped = true;
        }
    }

    fn poll(&mut self) -> Option<SpeechOutcome> {
        if std::mem::take(&mut self.pending) {
            Some(SpeechOutcome::Done)
        } else if std::mem::take(&mut self.stopped) {
            Some(SpeechOutcome::Stopped)
        } else {
            None
        }
    }
}

/// Owns the speech engine and the "speaking" flag. At most one utterance is
/// in flight.
pub struct Narrator {
    engine: Box<dyn SpeechEngine>,
    settings: SpeechSettings,
    enabled: bool,
    speaking: bool,
}

impl Narrator {
    pub fn new(engine: Box<dyn SpeechEngine>, settings: SpeechSettings, enabled: bool) -> Self {
        Self {
            engine,
            settings,
            enabled,
            speaking: false,
        }
    }

    pub fn silent() -> Self {
        Self::new(Box::<SilentSpeech>::default(), SpeechSettings::default(), false)
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn is_speaking(&self) -> bool {
        self.speaking
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        if !enabled {
            self.stop();
        }
        self.enabled = enabled;
    }

    /// Cuts off the current utterance and drains the engine's `Stopped`
    /// report, so the flag is clear on return.
    pub fn stop(&mut self) {
        if self.speaking {
            self.engine.stop();
            if let Some(outcome) = self.engine.poll() {
                log::debug!("speech ended: {outcome:?}");
            }
        }
        self.speaking = false;
    }

    /// Speaks a newly presented letter, cutting off whatever is playing.
    pub fn announce(&mut self, letter: &Letter) {
        let utterance = Utterance {
            text: letter.arabic.clone(),
            language: self.settings.letter_language.clone(),
            pitch: self.settings.letter_pitch,
            rate: self.settings.letter_rate,
        };
        self.say(utterance);
    }

    /// Replays the current letter unless something is still being spoken.
    pub fn replay(&mut self, letter: &Letter) {
        if self.speaking {
            log::debug!("replay ignored, still speaking");
            return;
        }
        self.announce(letter);
    }

    pub fn announce_completion(&mut self) {
        let utterance = Utterance {
            text: self.settings.completion_text.clone(),
            language: self.settings.completion_language.clone(),
            pitch: 1.3,
            rate: 0.9,
        };
        self.say(utterance);
    }

    /// Drains the engine's completion state; call on every tick.
    pub fn poll(&mut self) {
        if !self.speaking {
            return;
        }
        match self.engine.poll() {
            None => {}
            Some(SpeechOutcome::Failed(reason)) => {
                log::warn!("speech playback failed: {reason}");
                self.speaking = false;
            }
            Some(_) => self.speaking = false,
        }
    }

    fn say(&mut self, utterance: Utterance) {
        if !self.enabled {
            return;
        }
        self.stop();

        match self.engine.speak(&utterance) {
            Ok(()) => self.speaking = true,
            Err(e) => {
                log::warn!("could not speak {:?}: {e}", utterance.text);
                self.speaking = false;
            }
        }
    }
}

impl std::fmt::Debug for Narrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Narrator")
            .field("enabled", &self.enabled)
            .field("speaking", &self.speaking)
            .finish()
    }
}
