//! Audio sinks for the alarm.
//!
//! `RodioSink` loops a sound file until stopped. `BellSink` rings the
//! terminal bell once when no sound file is configured.

use std::fs::File;
use std::io::{BufReader, Write};
use std::path::PathBuf;

use pomotick_core::storage::AlarmConfig;
use pomotick_core::{AudioError, AudioSink};
use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink, Source};

pub struct RodioSink {
    path: PathBuf,
    volume: f32,
    /// Opened on first play; must outlive every `Sink` built from it.
    output: Option<(OutputStream, OutputStreamHandle)>,
    sink: Option<Sink>,
}

impl RodioSink {
    pub fn new(path: PathBuf, volume: u32) -> Self {
        Self {
            path,
            volume: volume.min(100) as f32 / 100.0,
            output: None,
            sink: None,
        }
    }
}

impl AudioSink for RodioSink {
    fn play(&mut self) -> Result<(), AudioError> {
        self.stop();

        if self.output.is_none() {
            let output =
                OutputStream::try_default().map_err(|e| AudioError::Unavailable(e.to_string()))?;
            self.output = Some(output);
        }
        let Some((_, handle)) = self.output.as_ref() else {
            return Err(AudioError::Unavailable("output stream closed".into()));
        };

        let file = File::open(&self.path).map_err(|_| AudioError::MissingSound(self.path.clone()))?;
        let source =
            Decoder::new(BufReader::new(file)).map_err(|e| AudioError::Decode(e.to_string()))?;
        let sink = Sink::try_new(handle).map_err(|e| AudioError::Unavailable(e.to_string()))?;

        sink.set_volume(self.volume);
        sink.append(source.repeat_infinite());
        self.sink = Some(sink);
        Ok(())
    }

    fn stop(&mut self) {
        if let Some(sink) = self.sink.take() {
            sink.stop();
        }
    }
}

pub struct BellSink;

impl AudioSink for BellSink {
    fn play(&mut self) -> Result<(), AudioError> {
        let mut out = std::io::stdout();
        out.write_all(b"\x07")
            .and_then(|()| out.flush())
            .map_err(|e| AudioError::Unavailable(e.to_string()))
    }

    fn stop(&mut self) {}
}

/// Pick the sink for the configured alarm.
pub fn sink_for(config: &AlarmConfig) -> Box<dyn AudioSink> {
    match &config.sound {
        Some(path) => Box::new(RodioSink::new(PathBuf::from(path), config.volume)),
        None => Box::new(BellSink),
    }
}
