//! # Symphonia Decoder Implementation

use crate::decoder::format_detector::FormatDetector;
use crate::decoder::sample_converter::SampleConverter;
use crate::error::{PlaybackError, Result};
use crate::traits::{
    AudioDecoder, AudioFormat, AudioFrameChunk, AudioSource, DecoderFactory, ProbeResult,
};
use async_trait::async_trait;
use bridge_traits::media::MediaItem;
use std::collections::HashMap;
use std::io::Cursor;
use std::time::Duration;
use symphonia::core::codecs::{Decoder, DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::{FormatOptions, FormatReader, SeekMode, SeekTo};
use symphonia::core::io::{MediaSource, MediaSourceStream};
use symphonia::core::meta::MetadataOptions;
use symphonia::core::units::Time;
use tracing::{debug, error, info, instrument, warn};

const MAX_CONSECUTIVE_ERRORS: usize = 10;

/// Decoder over any container/codec pair symphonia understands.
///
/// Packets rarely line up with the chunk size the player asks for, so
/// decoded samples are staged in `pending` and handed out in exact
/// `max_frames` runs.
pub struct SymphoniaDecoder {
    format_reader: Box<dyn FormatReader>,
    decoder: Box<dyn Decoder>,
    converter: SampleConverter,
    track_id: u32,
    format: AudioFormat,
    duration: Option<Duration>,
    tags: HashMap<String, String>,
    pending: Vec<f32>,
    /// Frames handed out so far (position of the next chunk).
    emitted_frames: u64,
    eof: bool,
    source_info: String,
}

impl SymphoniaDecoder {
    /// Open and probe `source`. Blocking: reads the container header.
    #[instrument(skip(source))]
    pub fn open(source: AudioSource) -> Result<Self> {
        let hint = FormatDetector::hint_for_source(&source);
        let (media_source, source_info): (Box<dyn MediaSource>, String) = match source {
            AudioSource::LocalFile { path } => {
                let file = std::fs::File::open(&path).map_err(|e| {
                    warn!(path = %path.display(), error = %e, "Failed to open audio file");
                    e
                })?;
                (Box::new(file), path.display().to_string())
            }
            AudioSource::Memory { data, .. } => {
                (Box::new(Cursor::new(data)), "memory buffer".to_string())
            }
            AudioSource::RemoteStream { url } => {
                return Err(PlaybackError::UnsupportedUri(format!(
                    "remote streams are not supported: {}",
                    url
                )));
            }
        };

        let stream = MediaSourceStream::new(media_source, Default::default());
        let probed = symphonia::default::get_probe()
            .format(
                &hint,
                stream,
                &FormatOptions::default(),
                &MetadataOptions::default(),
            )
            .map_err(|e| {
                error!(source = %source_info, error = %e, "Format probe failed");
                PlaybackError::InvalidFormat(format!("Failed to probe format: {}", e))
            })?;

        let mut format_reader = probed.format;

        let track = format_reader
            .tracks()
            .iter()
            .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
            .ok_or_else(|| PlaybackError::InvalidFormat("No supported audio tracks".to_string()))?;

        let track_id = track.id;
        let codec = FormatDetector::detect_codec(track.codec_params.codec);
        FormatDetector::validate_codec_support(&codec)?;

        let sample_rate = track
            .codec_params
            .sample_rate
            .ok_or_else(|| PlaybackError::InvalidFormat("Missing sample rate".to_string()))?;

        // Some containers (AAC/M4A) only report channels after the first packet.
        let channels = track
            .codec_params
            .channels
            .map(|ch| ch.count() as u16)
            .unwrap_or(2);
        let bits_per_sample = track.codec_params.bits_per_sample.map(|b| b as u16);

        let duration = track
            .codec_params
            .n_frames
            .map(|frames| Duration::from_secs_f64(frames as f64 / sample_rate as f64));

        let decoder = symphonia::default::get_codecs()
            .make(&track.codec_params, &DecoderOptions::default())
            .map_err(|e| {
                PlaybackError::UnsupportedCodec(format!("Failed to create codec decoder: {}", e))
            })?;

        let tags = read_tags(&mut format_reader);

        info!(
            source = %source_info,
            ?codec,
            sample_rate,
            channels,
            ?duration,
            "Decoder initialized"
        );

        Ok(Self {
            format_reader,
            decoder,
            converter: SampleConverter::new(),
            track_id,
            format: AudioFormat::new(codec, sample_rate, channels, bits_per_sample, None),
            duration,
            tags,
            pending: Vec::new(),
            emitted_frames: 0,
            eof: false,
            source_info,
        })
    }

    fn channels(&self) -> usize {
        usize::from(self.format.channels.max(1))
    }

    fn frames_to_duration(&self, frames: u64) -> Duration {
        if self.format.sample_rate == 0 {
            return Duration::ZERO;
        }
        Duration::from_secs_f64(frames as f64 / self.format.sample_rate as f64)
    }

    /// Read and decode packets until one of ours decodes.
    ///
    /// Corrupt packets are skipped; `MAX_CONSECUTIVE_ERRORS` in a row is fatal.
    fn decode_next_packet(&mut self) -> Result<Option<Vec<f32>>> {
        if self.eof {
            return Ok(None);
        }

        let mut consecutive_errors = 0;

        loop {
            let packet = match self.format_reader.next_packet() {
                Ok(packet) => packet,
                Err(SymphoniaError::IoError(e))
                    if e.kind() == std::io::ErrorKind::UnexpectedEof =>
                {
                    debug!(source = %self.source_info, "Reached end of stream");
                    self.eof = true;
                    return Ok(None);
                }
                Err(SymphoniaError::ResetRequired) => {
                    return Err(PlaybackError::DecodingError(
                        "Track list changed, reset required".to_string(),
                    ));
                }
                Err(SymphoniaError::IoError(e)) => {
                    consecutive_errors += 1;
                    warn!(attempt = consecutive_errors, error = %e, "I/O error reading packet");
                    if consecutive_errors >= MAX_CONSECUTIVE_ERRORS {
                        return Err(PlaybackError::SourceUnavailable(format!(
                            "Stream I/O failure after {} attempts: {}",
                            MAX_CONSECUTIVE_ERRORS, e
                        )));
                    }
                    continue;
                }
                Err(e) => {
                    return Err(PlaybackError::DecodingError(format!(
                        "Failed to read packet: {}",
                        e
                    )));
                }
            };

            while !self.format_reader.metadata().is_latest() {
                self.format_reader.metadata().pop();
            }

            if packet.track_id() != self.track_id {
                continue;
            }

            match self.decoder.decode(&packet) {
                Ok(decoded) => {
                    let decoded_channels = decoded.spec().channels.count() as u16;
                    if decoded_channels != self.format.channels {
                        debug!(
                            from = self.format.channels,
                            to = decoded_channels,
                            "Channel count detected from decoded audio"
                        );
                        self.format.channels = decoded_channels;
                    }
                    return Ok(Some(self.converter.interleave(decoded)));
                }
                Err(SymphoniaError::IoError(e)) => {
                    consecutive_errors += 1;
                    warn!(attempt = consecutive_errors, error = %e, "Skipping unreadable packet");
                    if consecutive_errors >= MAX_CONSECUTIVE_ERRORS {
                        return Err(PlaybackError::CorruptedStream(format!(
                            "Stream corruption after {} failed packets",
                            MAX_CONSECUTIVE_ERRORS
                        )));
                    }
                }
                Err(SymphoniaError::DecodeError(e)) => {
                    consecutive_errors += 1;
                    warn!(attempt = consecutive_errors, error = %e, "Skipping undecodable packet");
                    if consecutive_errors >= MAX_CONSECUTIVE_ERRORS {
                        return Err(PlaybackError::DecodingError(format!(
                            "Decoder failure after {} failed packets: {}",
                            MAX_CONSECUTIVE_ERRORS, e
                        )));
                    }
                }
                Err(e) => {
                    return Err(PlaybackError::DecodingError(format!(
                        "Failed to decode packet: {}",
                        e
                    )));
                }
            }
        }
    }
}

fn read_tags(reader: &mut Box<dyn FormatReader>) -> HashMap<String, String> {
    let mut tags = HashMap::new();
    let metadata = reader.metadata();
    if let Some(revision) = metadata.current() {
        for tag in revision.tags() {
            tags.insert(tag.key.clone(), tag.value.to_string());
        }
    }
    tags
}

#[async_trait]
impl AudioDecoder for SymphoniaDecoder {
    async fn probe(&mut self) -> Result<ProbeResult> {
        Ok(ProbeResult::new(self.format.clone())
            .with_duration(self.duration)
            .with_tags(self.tags.clone()))
    }

    async fn decode_frames(&mut self, max_frames: usize) -> Result<Option<AudioFrameChunk>> {
        let max_frames = max_frames.max(1);

        while self.pending.len() < max_frames * self.channels() {
            match self.decode_next_packet()? {
                Some(samples) => self.pending.extend(samples),
                None => break,
            }
        }

        let channels = self.channels();
        let wanted = (max_frames * channels).min(self.pending.len());
        let take = wanted - wanted % channels;
        if take == 0 {
            self.pending.clear();
            return Ok(None);
        }

        let samples: Vec<f32> = self.pending.drain(..take).collect();
        let frames = samples.len() / channels;
        let timestamp = self.frames_to_duration(self.emitted_frames);
        self.emitted_frames += frames as u64;

        Ok(Some(AudioFrameChunk::new(samples, frames, timestamp)))
    }

    async fn seek(&mut self, position: Duration) -> Result<()> {
        let position = match self.duration {
            Some(duration) => position.min(duration),
            None => position,
        };

        self.format_reader
            .seek(
                SeekMode::Accurate,
                SeekTo::Time {
                    time: Time::from(position.as_secs_f64()),
                    track_id: Some(self.track_id),
                },
            )
            .map_err(|e| PlaybackError::SeekFailed(e.to_string()))?;

        self.decoder.reset();
        self.pending.clear();
        self.emitted_frames = (position.as_secs_f64() * self.format.sample_rate as f64) as u64;
        self.eof = false;

        debug!(?position, "Seek completed");
        Ok(())
    }
}

/// Opens catalog items through symphonia.
///
/// Accepts `file://` URIs and plain paths. The container header is read on
/// the blocking pool.
#[derive(Debug, Clone, Copy, Default)]
pub struct SymphoniaDecoderFactory;

impl SymphoniaDecoderFactory {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl DecoderFactory for SymphoniaDecoderFactory {
    async fn open(&self, item: &MediaItem) -> Result<Box<dyn AudioDecoder>> {
        let uri = item
            .media_uri()
            .ok_or_else(|| PlaybackError::MissingMediaUri(item.id().to_string()))?;
        let source = AudioSource::from_uri(uri)?;
        if source.is_remote() {
            return Err(PlaybackError::UnsupportedUri(format!(
                "remote streams are not supported: {}",
                uri
            )));
        }

        let decoder = tokio::task::spawn_blocking(move || SymphoniaDecoder::open(source))
            .await
            .map_err(|e| PlaybackError::Internal(format!("Decoder task failed: {}", e)))??;

        Ok(Box::new(decoder))
    }
}
