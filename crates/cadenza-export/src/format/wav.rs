//! WAV encoder using hound.

use crate::capture::RenderedAudio;
use crate::error::{ExportError, Result};
use crate::options::{BitDepth, ExportOptions};
use hound::{SampleFormat, WavSpec, WavWriter};
use std::path::Path;

/// Write rendered audio to a WAV file.
///
/// Stereo by default; `options.mono` downmixes `(l + r) / 2` at write
/// time. Samples are clamped to `[-1, 1]` before integer conversion.
pub fn write_wav(path: &Path, audio: &RenderedAudio, options: &ExportOptions) -> Result<()> {
    if audio.left.len() != audio.right.len() {
        return Err(ExportError::InvalidOptions(
            "left and right channels have different lengths".into(),
        ));
    }

    let spec = WavSpec {
        channels: if options.mono { 1 } else { 2 },
        sample_rate: audio.sample_rate.round() as u32,
        bits_per_sample: options.bit_depth.bits(),
        sample_format: match options.bit_depth {
            BitDepth::Int16 => SampleFormat::Int,
            BitDepth::Float32 => SampleFormat::Float,
        },
    };

    let mut writer = WavWriter::create(path, spec)?;

    match options.bit_depth {
        BitDepth::Float32 => {
            if options.mono {
                for (l, r) in audio.left.iter().zip(audio.right.iter()) {
                    writer.write_sample((l + r) * 0.5)?;
                }
            } else {
                for (l, r) in audio.left.iter().zip(audio.right.iter()) {
                    writer.write_sample(*l)?;
                    writer.write_sample(*r)?;
                }
            }
        }
        BitDepth::Int16 => {
            if options.mono {
                for (l, r) in audio.left.iter().zip(audio.right.iter()) {
                    writer.write_sample(to_i16((l + r) * 0.5))?;
                }
            } else {
                for (l, r) in audio.left.iter().zip(audio.right.iter()) {
                    writer.write_sample(to_i16(*l))?;
                    writer.write_sample(to_i16(*r))?;
                }
            }
        }
    }

    writer.finalize()?;
    Ok(())
}

#[inline]
fn to_i16(sample: f32) -> i16 {
    (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16
}
