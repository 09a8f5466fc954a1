//! Completion sound

use std::{path::PathBuf, process::Stdio};
use tokio::process::{Child, Command};
use tracing::debug;

use crate::error::ReminderResult;

/// Plays the cue at the end of a countdown. Best effort: failures are ignored.
pub trait AudioCue: Send + Sync {
    fn play_completion(&self);
}

/// Plays a sound file through an external player such as `paplay`
#[derive(Debug, Clone)]
pub struct SystemAudioCue {
    player: String,
    sound: PathBuf,
}

impl SystemAudioCue {
    pub fn new(player: impl Into<String>, sound: impl Into<PathBuf>) -> Self {
        Self {
            player: player.into(),
            sound: sound.into(),
        }
    }

    fn spawn_player(&self) -> ReminderResult<Child> {
        let child = Command::new(&self.player)
            .arg(&self.sound)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;
        Ok(child)
    }
}

impl AudioCue for SystemAudioCue {
    fn play_completion(&self) {
        match self.spawn_player() {
            Ok(_) => debug!("Playing {} with {}", self.sound.display(), self.player),
            Err(e) => debug!("Could not play completion sound with {}: {}", self.player, e),
        }
    }
}
