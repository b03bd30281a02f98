//! Fire-and-forget clip playback, addressed by numeric clip id.

/// Destination for gameplay sound cues.
pub trait AudioSink {
    fn play_clip(&mut self, id: u32);
}

/// Discards every cue.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullAudio;

impl AudioSink for NullAudio {
    fn play_clip(&mut self, _id: u32) {}
}

/// Remembers the clips requested, in order.
#[derive(Clone, Debug, Default)]
pub struct ClipLog {
    played: Vec<u32>,
}

impl ClipLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn played(&self) -> &[u32] {
        &self.played
    }
}

impl AudioSink for ClipLog {
    fn play_clip(&mut self, id: u32) {
        self.played.push(id);
    }
}

#[cfg(feature = "audio")]
pub use self::rodio_sink::RodioAudio;

#[cfg(feature = "audio")]
mod rodio_sink {
    use std::collections::HashMap;
    use std::io::Cursor;
    use std::sync::Arc;

    use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink};

    use super::AudioSink;

    /// Plays encoded clips on the default output device.
    ///
    /// Clips are registered once as encoded bytes and decoded per playback.
    /// If no device can be opened the sink stays silent.
    pub struct RodioAudio {
        _stream: Option<OutputStream>,
        stream_handle: Option<OutputStreamHandle>,
        clips: HashMap<u32, Arc<[u8]>>,
        volume: f32,
    }

    impl RodioAudio {
        pub fn new() -> Self {
            match OutputStream::try_default() {
                Ok((stream, stream_handle)) => Self {
                    _stream: Some(stream),
                    stream_handle: Some(stream_handle),
                    clips: HashMap::new(),
                    volume: 1.0,
                },
                Err(e) => {
                    log::warn!("Failed to initialize audio: {}. Audio will be unavailable.", e);
                    Self {
                        _stream: None,
                        stream_handle: None,
                        clips: HashMap::new(),
                        volume: 1.0,
                    }
                }
            }
        }

        pub fn is_available(&self) -> bool {
            self.stream_handle.is_some()
        }

        /// Registers encoded audio (wav, ogg, mp3, flac) under `id`.
        pub fn load_clip(&mut self, id: u32, bytes: impl Into<Arc<[u8]>>) {
            self.clips.insert(id, bytes.into());
        }

        pub fn set_volume(&mut self, volume: f32) {
            self.volume = volume.clamp(0.0, 1.0);
        }
    }

    impl Default for RodioAudio {
        fn default() -> Self {
            Self::new()
        }
    }

    impl AudioSink for RodioAudio {
        fn play_clip(&mut self, id: u32) {
            let Some(handle) = self.stream_handle.as_ref() else {
                return;
            };
            let Some(bytes) = self.clips.get(&id) else {
                log::warn!("audio clip {} is not loaded", id);
                return;
            };
            let source = match Decoder::new(Cursor::new(bytes.clone())) {
                Ok(source) => source,
                Err(e) => {
                    log::warn!("failed to decode audio clip {}: {}", id, e);
                    return;
                }
            };
            match Sink::try_new(handle) {
                Ok(sink) => {
                    sink.set_volume(self.volume);
                    sink.append(source);
                    sink.detach();
                }
                Err(e) => log::warn!("failed to create audio sink: {}", e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clip_log_keeps_order() {
        let mut log = ClipLog::new();
        log.play_clip(3);
        log.play_clip(1);
        assert_eq!(log.played(), &[3, 1]);
    }
}
