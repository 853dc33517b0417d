use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AudioCue {
    Purchase,
    CheckIn,
    Error,
}

impl AudioCue {
    pub(crate) fn name(self) -> &'static str {
        match self {
            Self::Purchase => "purchase",
            Self::CheckIn => "checkIn",
            Self::Error => "error",
        }
    }
}

/// Fire-and-forget cue playback; gameplay never observes the result.
pub(crate) trait AudioSink {
    fn play_cue(&mut self, cue: AudioCue);
}

#[derive(Debug, Default)]
pub(crate) struct TracingAudioSink;

impl AudioSink for TracingAudioSink {
    fn play_cue(&mut self, cue: AudioCue) {
        info!(cue = cue.name(), "audio_cue");
    }
}
