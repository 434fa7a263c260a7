//! Probe hints and codec identification.

use crate::error::{PlaybackError, Result};
use crate::traits::{AudioCodec, AudioSource};
use std::path::Path;
use symphonia::core::codecs::{self, CodecType};
use symphonia::core::probe::Hint;
use tracing::{debug, warn};

pub struct FormatDetector;

impl FormatDetector {
    /// Probe hint for `source`: the file extension or the codec hint.
    pub fn hint_for_source(source: &AudioSource) -> Hint {
        match source {
            AudioSource::LocalFile { path } => Self::hint_from_path(path),
            AudioSource::Memory {
                codec_hint: Some(codec),
                ..
            } => {
                let mut hint = Hint::new();
                hint.with_extension(Self::codec_extension(codec));
                hint
            }
            AudioSource::Memory { .. } | AudioSource::RemoteStream { .. } => Hint::new(),
        }
    }

    pub fn hint_from_path(path: &Path) -> Hint {
        let mut hint = Hint::new();
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(extension) => {
                debug!(extension, "Setting probe hint extension");
                hint.with_extension(extension);
            }
            None => debug!("No file extension found, probe will auto-detect"),
        }
        hint
    }

    pub fn detect_codec(codec_type: CodecType) -> AudioCodec {
        match codec_type {
            codecs::CODEC_TYPE_MP3 => AudioCodec::Mp3,
            codecs::CODEC_TYPE_AAC => AudioCodec::Aac,
            codecs::CODEC_TYPE_FLAC => AudioCodec::Flac,
            codecs::CODEC_TYPE_VORBIS => AudioCodec::Vorbis,
            codecs::CODEC_TYPE_OPUS => AudioCodec::Opus,
            codecs::CODEC_TYPE_ALAC => AudioCodec::Alac,
            codecs::CODEC_TYPE_PCM_S16LE
            | codecs::CODEC_TYPE_PCM_S16BE
            | codecs::CODEC_TYPE_PCM_S24LE
            | codecs::CODEC_TYPE_PCM_S24BE
            | codecs::CODEC_TYPE_PCM_S32LE
            | codecs::CODEC_TYPE_PCM_S32BE
            | codecs::CODEC_TYPE_PCM_F32LE
            | codecs::CODEC_TYPE_PCM_F32BE
            | codecs::CODEC_TYPE_PCM_F64LE
            | codecs::CODEC_TYPE_PCM_F64BE
            | codecs::CODEC_TYPE_PCM_U8 => AudioCodec::Wav,
            other => {
                warn!(codec = ?other, "Unknown codec type");
                AudioCodec::Unknown
            }
        }
    }

    /// Every codec the bundled symphonia build decodes is accepted.
    pub fn validate_codec_support(codec: &AudioCodec) -> Result<()> {
        match codec {
            AudioCodec::Unknown => Err(PlaybackError::UnsupportedCodec(
                "Unknown audio codec".to_string(),
            )),
            AudioCodec::Other(name) => Err(PlaybackError::UnsupportedCodec(name.clone())),
            _ => Ok(()),
        }
    }

    pub fn codec_extension(codec: &AudioCodec) -> &'static str {
        match codec {
            AudioCodec::Mp3 => "mp3",
            AudioCodec::Aac | AudioCodec::Alac => "m4a",
            AudioCodec::Flac => "flac",
            AudioCodec::Vorbis => "ogg",
            AudioCodec::Opus => "opus",
            AudioCodec::Wav => "wav",
            AudioCodec::Unknown | AudioCodec::Other(_) => "bin",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_symphonia_codecs() {
        assert_eq!(
            FormatDetector::detect_codec(codecs::CODEC_TYPE_FLAC),
            AudioCodec::Flac
        );
        assert_eq!(
            FormatDetector::detect_codec(codecs::CODEC_TYPE_PCM_S16LE),
            AudioCodec::Wav
        );
        assert_eq!(
            FormatDetector::detect_codec(codecs::CODEC_TYPE_NULL),
            AudioCodec::Unknown
        );
    }

    #[test]
    fn unknown_codecs_are_rejected() {
        assert!(FormatDetector::validate_codec_support(&AudioCodec::Mp3).is_ok());
        assert!(FormatDetector::validate_codec_support(&AudioCodec::Unknown).is_err());
        assert!(
            FormatDetector::validate_codec_support(&AudioCodec::Other("tta".into())).is_err()
        );
    }

    #[test]
    fn codec_extension() {
        assert_eq!(FormatDetector::codec_extension(&AudioCodec::Vorbis), "ogg");
        assert_eq!(FormatDetector::codec_extension(&AudioCodec::Alac), "m4a");
    }
}
