//! WAV renderer — encodes rendered audio buffers as 16-bit mono PCM.

const BITS_PER_SAMPLE: u16 = 16;
const BYTES_PER_SAMPLE: u32 = (BITS_PER_SAMPLE / 8) as u32;
const HEADER_LEN: usize = 44;

/// Encode mono f64 samples in [-1, 1] as a 16-bit PCM WAV byte buffer.
/// Out-of-range samples are clipped.
pub fn render_wav(samples: &[f64], sample_rate: u32) -> Vec<u8> {
    let data_len = samples.len() as u32 * BYTES_PER_SAMPLE;
    let mut buf = Vec::with_capacity(HEADER_LEN + data_len as usize);
    write_header(&mut buf, sample_rate, data_len);
    buf.extend(samples.iter().flat_map(|&s| to_i16(s).to_le_bytes()));
    buf
}

fn to_i16(sample: f64) -> i16 {
    (sample.clamp(-1.0, 1.0) * i16::MAX as f64).round() as i16
}

fn write_header(buf: &mut Vec<u8>, sample_rate: u32, data_len: u32) {
    let fields: [&[u8]; 13] = [
        b"RIFF",
        &(36 + data_len).to_le_bytes(),
        b"WAVE",
        b"fmt ",
        &16u32.to_le_bytes(),
        &1u16.to_le_bytes(), // PCM
        &1u16.to_le_bytes(), // mono
        &sample_rate.to_le_bytes(),
        &(sample_rate * BYTES_PER_SAMPLE).to_le_bytes(),
        &(BYTES_PER_SAMPLE as u16).to_le_bytes(),
        &BITS_PER_SAMPLE.to_le_bytes(),
        b"data",
        &data_len.to_le_bytes(),
    ];
    for field in fields {
        buf.extend_from_slice(field);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::SignalComponent;
    use crate::dsp::engine::{AudioEngine, RenderOptions};

    #[test]
    fn wav_header_valid() {
        let wav = render_wav(&[0.0, 0.5, -0.5], 44100);

        assert_eq!(&wav[0..4], b"RIFF");
        assert_eq!(&wav[8..12], b"WAVE");
        assert_eq!(&wav[12..16], b"fmt ");
        assert_eq!(&wav[36..40], b"data");

        let sr = u32::from_le_bytes([wav[24], wav[25], wav[26], wav[27]]);
        assert_eq!(sr, 44100);

        let ch = u16::from_le_bytes([wav[22], wav[23]]);
        assert_eq!(ch, 1);
    }

    #[test]
    fn samples_are_clamped_and_scaled() {
        let wav = render_wav(&[1.0, -1.0, 3.0], 8000);
        let sample = |i: usize| i16::from_le_bytes([wav[44 + 2 * i], wav[45 + 2 * i]]);
        assert_eq!(sample(0), i16::MAX);
        assert_eq!(sample(1), -i16::MAX);
        assert_eq!(sample(2), i16::MAX);
    }

    #[test]
    fn rendered_component_produces_audio() {
        let options = RenderOptions {
            duration: 0.5,
            sample_rate: 22050.0,
            ..RenderOptions::default()
        };
        let samples = AudioEngine::new(options).render(&[SignalComponent::new("a", 10.0, 1.0, 2.0)]);
        let wav = render_wav(&samples, 22050);

        let data_size = u32::from_le_bytes([wav[40], wav[41], wav[42], wav[43]]);
        assert_eq!(data_size, 22050);
        assert_eq!(wav.len(), 44 + 22050);
        let has_nonzero = wav[44..]
            .chunks_exact(2)
            .any(|b| i16::from_le_bytes([b[0], b[1]]) != 0);
        assert!(has_nonzero, "Rendered WAV should contain non-silent audio");
    }
}
