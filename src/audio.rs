//! Ambient sound playback with a single active stream, plus the completion chime.

use rodio::source::{SineWave, Source};
use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug)]
pub enum AudioError {
    #[error("Failed to initialize audio output: {0}")]
    Stream(#[from] rodio::StreamError),
    #[error("Failed to play audio: {0}")]
    Play(#[from] rodio::PlayError),
    #[error("Failed to open sound file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to decode audio: {0}")]
    Decode(#[from] rodio::decoder::DecoderError),
}

/// What to play.
#[derive(Debug, Clone, PartialEq)]
pub enum SoundSource {
    /// An audio file on disk (mp3, wav, ogg, flac).
    File(PathBuf),
    /// The generated two-tone completion chime.
    Chime,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayOptions {
    pub looping: bool,
}

impl Default for PlayOptions {
    /// Ambient sounds loop unless told otherwise.
    fn default() -> Self {
        Self { looping: true }
    }
}

/// A stream that has been started on some output.
pub trait ActiveStream {
    fn pause(&self);
    fn resume(&self);
    fn stop(&self);
    fn is_paused(&self) -> bool;
    fn is_finished(&self) -> bool;
}

/// Something that can start playing sounds.
pub trait SoundOutput {
    type Stream: ActiveStream;

    fn start(&self, source: &SoundSource, options: PlayOptions) -> Result<Self::Stream, AudioError>;

    /// Plays the chime without keeping a handle to it.
    fn chime(&self) -> Result<(), AudioError>;
}

impl ActiveStream for Sink {
    fn pause(&self) {
        Sink::pause(self);
    }

    fn resume(&self) {
        Sink::play(self);
    }

    fn stop(&self) {
        Sink::stop(self);
    }

    fn is_paused(&self) -> bool {
        Sink::is_paused(self)
    }

    fn is_finished(&self) -> bool {
        self.empty()
    }
}

/// The default audio device, via rodio.
pub struct RodioOutput {
    _stream: OutputStream,
    handle: OutputStreamHandle,
}

impl RodioOutput {
    /// Opens the default output device.
    pub fn new() -> Result<Self, AudioError> {
        let (stream, handle) = OutputStream::try_default()?;
        Ok(Self {
            _stream: stream,
            handle,
        })
    }

    fn append_chime(sink: &Sink) {
        // First tone: 880 Hz (A5) for 150ms
        let tone1 = SineWave::new(880.0)
            .take_duration(Duration::from_millis(150))
            .amplify(0.3);

        // Short pause
        let silence =
            rodio::source::Zero::<f32>::new(1, 44100).take_duration(Duration::from_millis(50));

        // Second tone: 1046.5 Hz (C6) for 200ms
        let tone2 = SineWave::new(1046.5)
            .take_duration(Duration::from_millis(200))
            .amplify(0.3);

        sink.append(tone1);
        sink.append(silence);
        sink.append(tone2);
    }
}

impl SoundOutput for RodioOutput {
    type Stream = Sink;

    fn start(&self, source: &SoundSource, options: PlayOptions) -> Result<Sink, AudioError> {
        let sink = Sink::try_new(&self.handle)?;
        match source {
            SoundSource::File(path) => {
                let decoder = Decoder::new(BufReader::new(File::open(path)?))?;
                if options.looping {
                    sink.append(decoder.repeat_infinite());
                } else {
                    sink.append(decoder);
                }
            }
            SoundSource::Chime => Self::append_chime(&sink),
        }
        Ok(sink)
    }

    fn chime(&self) -> Result<(), AudioError> {
        let sink = Sink::try_new(&self.handle)?;
        Self::append_chime(&sink);
        sink.detach(); // Play in background
        Ok(())
    }
}

struct Playing<T> {
    stream: T,
    source: SoundSource,
}

/// Owns the one sound that may be playing at a time. Starting a new sound
/// stops whatever was playing before.
pub struct AudioSession<O: SoundOutput> {
    output: O,
    current: Option<Playing<O::Stream>>,
}

impl<O: SoundOutput> AudioSession<O> {
    pub fn new(output: O) -> Self {
        Self {
            output,
            current: None,
        }
    }

    pub fn play(&mut self, source: SoundSource, options: PlayOptions) -> Result<(), AudioError> {
        self.stop();
        let stream = self.output.start(&source, options)?;
        debug!(?source, looping = options.looping, "started sound");
        self.current = Some(Playing { stream, source });
        Ok(())
    }

    pub fn pause(&mut self) {
        if let Some(playing) = &self.current {
            playing.stream.pause();
        }
    }

    pub fn resume(&mut self) {
        if let Some(playing) = &self.current {
            playing.stream.resume();
        }
    }

    pub fn stop(&mut self) {
        if let Some(playing) = self.current.take() {
            playing.stream.stop();
            debug!(source = ?playing.source, "stopped sound");
        }
    }

    pub fn is_playing(&self) -> bool {
        self.current
            .as_ref()
            .is_some_and(|p| !p.stream.is_paused() && !p.stream.is_finished())
    }

    pub fn current_source(&self) -> Option<&SoundSource> {
        self.current.as_ref().map(|p| &p.source)
    }

    /// Silences any ambient sound and plays the completion chime.
    pub fn play_chime(&mut self) {
        self.stop();
        if let Err(e) = self.output.chime() {
            warn!(error = %e, "failed to play chime");
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SoundItem {
    pub id: &'static str,
    pub title: &'static str,
    pub file: PathBuf,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SoundCategory {
    pub id: &'static str,
    pub title: &'static str,
    pub items: Vec<SoundItem>,
}

/// The ambient sounds offered to the user, grouped by category.
#[derive(Debug, Clone, PartialEq)]
pub struct SoundCatalog {
    pub categories: Vec<SoundCategory>,
}

impl SoundCatalog {
    /// The built-in catalog, with files resolved under `asset_dir`.
    pub fn builtin(asset_dir: &Path) -> Self {
        let item = |id: &'static str, title: &'static str, file: &str| SoundItem {
            id,
            title,
            file: asset_dir.join(file),
        };

        Self {
            categories: vec![
                SoundCategory {
                    id: "nature",
                    title: "Nature",
                    items: vec![item("forest", "Forest", "forest.wav")],
                },
                SoundCategory {
                    id: "noise",
                    title: "Noise",
                    items: vec![item("static", "White Noise", "white_noise.wav")],
                },
                SoundCategory {
                    id: "music",
                    title: "Music",
                    items: vec![item("waves", "Ambient", "ambient.wav")],
                },
            ],
        }
    }

    pub fn find(&self, id: &str) -> Option<&SoundItem> {
        self.categories
            .iter()
            .flat_map(|c| c.items.iter())
            .find(|item| item.id == id)
    }

    pub fn source(&self, id: &str) -> Option<SoundSource> {
        self.find(id).map(|item| SoundSource::File(item.file.clone()))
    }
}
