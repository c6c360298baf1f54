// Narration audio decoding

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use std::io::Cursor;
use thiserror::Error;

/// Sample rate of the PCM stream returned by the speech model.
pub const SAMPLE_RATE: u32 = 24_000;

#[derive(Debug, Error)]
pub enum AudioError {
    #[error("invalid base64 audio payload: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("PCM payload has an odd byte length ({0})")]
    TruncatedSample(usize),
    #[error("failed to encode WAV: {0}")]
    Wav(#[from] hound::Error),
}

/// Wrap base64 PCM (16-bit little endian, mono) in a WAV container so the
/// result is playable and downloadable as a regular file.
pub fn wav_from_pcm_base64(encoded: &str) -> Result<Vec<u8>, AudioError> {
    let pcm = BASE64.decode(encoded)?;
    if pcm.len() % 2 != 0 {
        return Err(AudioError::TruncatedSample(pcm.len()));
    }

    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: SAMPLE_RATE,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::new());
    let mut writer = hound::WavWriter::new(&mut cursor, spec)?;
    for frame in pcm.chunks_exact(2) {
        writer.write_sample(i16::from_le_bytes([frame[0], frame[1]]))?;
    }
    writer.finalize()?;

    Ok(cursor.into_inner())
}
