//! # Sample Format Converter
//!
//! Converts decoded audio to interleaved signed 16-bit PCM.

use symphonia::core::audio::{AudioBuffer, AudioBufferRef, Signal};
use symphonia::core::conv::IntoSample;
use symphonia::core::sample::Sample;

/// Sample converter that normalizes audio to i16 interleaved format.
///
/// Symphonia's AAC decoder produces planar f32 buffers. The host expects
/// interleaved 16-bit PCM (LRLRLR... for stereo), so every decoded buffer
/// goes through [`SampleConverter::to_interleaved_i16`].
pub struct SampleConverter;

impl SampleConverter {
    /// Convert a Symphonia buffer to interleaved i16 samples.
    ///
    /// `out` is cleared first and reused so that steady-state decoding does
    /// not allocate.
    pub fn to_interleaved_i16(buffer: &AudioBufferRef<'_>, out: &mut Vec<i16>) {
        out.clear();

        match buffer {
            AudioBufferRef::S16(buf) => Self::convert_and_interleave(&**buf, |s: i16| s, out),
            AudioBufferRef::F32(buf) => {
                Self::convert_and_interleave(&**buf, |s: f32| s.into_sample(), out)
            }
            AudioBufferRef::F64(buf) => {
                Self::convert_and_interleave(&**buf, |s: f64| s.into_sample(), out)
            }
            AudioBufferRef::S32(buf) => {
                Self::convert_and_interleave(&**buf, |s: i32| s.into_sample(), out)
            }
            AudioBufferRef::S24(buf) => {
                Self::convert_and_interleave(&**buf, |s| IntoSample::into_sample(s), out)
            }
            AudioBufferRef::S8(buf) => {
                Self::convert_and_interleave(&**buf, |s: i8| s.into_sample(), out)
            }
            AudioBufferRef::U32(buf) => {
                Self::convert_and_interleave(&**buf, |s: u32| s.into_sample(), out)
            }
            AudioBufferRef::U24(buf) => {
                Self::convert_and_interleave(&**buf, |s| IntoSample::into_sample(s), out)
            }
            AudioBufferRef::U16(buf) => {
                Self::convert_and_interleave(&**buf, |s: u16| s.into_sample(), out)
            }
            AudioBufferRef::U8(buf) => {
                Self::convert_and_interleave(&**buf, |s: u8| s.into_sample(), out)
            }
        }
    }

    /// Convert planar samples of any type and append them interleaved.
    fn convert_and_interleave<T>(buf: &AudioBuffer<T>, convert: fn(T) -> i16, out: &mut Vec<i16>)
    where
        T: Sample + Copy,
    {
        let num_channels = buf.spec().channels.count();
        let num_frames = buf.frames();
        out.reserve(num_frames * num_channels);

        for frame_idx in 0..num_frames {
            for chan_idx in 0..num_channels {
                out.push(convert(buf.chan(chan_idx)[frame_idx]));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::borrow::Cow;
    use symphonia::core::audio::{Channels, SignalSpec};

    fn stereo_buffer(frames: usize) -> AudioBuffer<f32> {
        let spec = SignalSpec::new(44100, Channels::FRONT_LEFT | Channels::FRONT_RIGHT);
        let mut buf = AudioBuffer::<f32>::new(frames as u64, spec);
        buf.render_reserved(Some(frames));
        for (i, sample) in buf.chan_mut(0).iter_mut().enumerate() {
            *sample = if i % 2 == 0 { 0.5 } else { -0.5 };
        }
        for sample in buf.chan_mut(1).iter_mut() {
            *sample = 0.0;
        }
        buf
    }

    #[test]
    fn test_interleaves_planar_f32() {
        let buf = stereo_buffer(4);
        let mut out = Vec::new();
        SampleConverter::to_interleaved_i16(&AudioBufferRef::F32(Cow::Borrowed(&buf)), &mut out);

        assert_eq!(out.len(), 8);
        // Left channel on even indices, right channel silent
        assert!(out[0] > 0);
        assert_eq!(out[1], 0);
        assert!(out[2] < 0);
        assert_eq!(out[3], 0);
    }

    #[test]
    fn test_output_buffer_is_reused() {
        let buf = stereo_buffer(2);
        let mut out = vec![7i16; 32];
        SampleConverter::to_interleaved_i16(&AudioBufferRef::F32(Cow::Borrowed(&buf)), &mut out);

        assert_eq!(out.len(), 4);
        assert!(out.capacity() >= 32);
    }
}
