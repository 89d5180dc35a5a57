//! # Audio Triggers
//!
//! The core never plays audio itself. It names the cue and hands it to a
//! [`SoundSink`], which must return immediately.

use std::fmt;

/// Sound cues raised by the sandbox.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sound {
    /// The actor's feet touched the ground plane.
    Landing,
    /// The actor was sent back to the starting position.
    Reset,
}

impl fmt::Display for Sound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sound::Landing => write!(f, "landing"),
            Sound::Reset => write!(f, "reset"),
        }
    }
}

/// Receiver of fire-and-forget sound cues.
pub trait SoundSink {
    /// Starts playing `sound` without waiting for it.
    fn play(&self, sound: Sound);
}

/// Sink that only logs each cue, for headless runs.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSoundSink;

impl SoundSink for LogSoundSink {
    fn play(&self, sound: Sound) {
        log::debug!("Playing {} sound", sound);
    }
}
