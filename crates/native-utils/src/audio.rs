use base64::Engine;
use ringbuf::HeapRb;
use rubato::{FastFixedIn, PolynomialDegree, Resampler};

/// Sample rate of PCM16 audio on the realtime API and on hosted call rooms.
pub const REALTIME_API_PCM16_SAMPLE_RATE: f64 = 24000.0;

pub fn create_resampler(
    in_sampling_rate: f64,
    out_sampling_rate: f64,
    chunk_size: usize,
) -> anyhow::Result<FastFixedIn<f32>> {
    let resampler = FastFixedIn::<f32>::new(
        out_sampling_rate / in_sampling_rate,
        1.0,
        PolynomialDegree::Cubic,
        chunk_size,
        1,
    )?;
    Ok(resampler)
}

/// Mono resampler that accepts input of any length and emits output once a
/// full chunk has accumulated.
pub struct ChunkedResampler {
    resampler: FastFixedIn<f32>,
    pending: Vec<f32>,
}

impl ChunkedResampler {
    pub fn new(
        in_sampling_rate: f64,
        out_sampling_rate: f64,
        chunk_size: usize,
    ) -> anyhow::Result<Self> {
        Ok(Self {
            resampler: create_resampler(in_sampling_rate, out_sampling_rate, chunk_size)?,
            pending: Vec::with_capacity(chunk_size * 2),
        })
    }

    pub fn process(&mut self, samples: &[f32]) -> anyhow::Result<Vec<f32>> {
        self.pending.extend_from_slice(samples);
        let mut out = Vec::new();
        loop {
            let needed = self.resampler.input_frames_next();
            if self.pending.len() < needed {
                break;
            }
            let input = vec![self.pending.drain(..needed).collect::<Vec<f32>>()];
            let mut resampled = self.resampler.process(&input, None)?;
            if let Some(channel) = resampled.pop() {
                out.extend(channel);
            }
        }
        Ok(out)
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }
}

pub fn shared_buffer(size: usize) -> HeapRb<f32> {
    HeapRb::new(size)
}

/// Decodes base64 PCM16. Invalid input is logged and yields no samples.
pub fn decode_i16(base64_fragment: &str) -> Vec<i16> {
    match base64::engine::general_purpose::STANDARD.decode(base64_fragment) {
        Ok(bytes) => pcm16_from_le_bytes(&bytes),
        Err(e) => {
            tracing::error!("failed to decode base64 audio fragment: {}", e);
            Vec::new()
        }
    }
}

pub fn encode_i16(pcm16: &[i16]) -> String {
    base64::engine::general_purpose::STANDARD.encode(pcm16.to_binary())
}

/// Reads little-endian PCM16. A trailing odd byte is dropped.
pub fn pcm16_from_le_bytes(bytes: &[u8]) -> Vec<i16> {
    bytes
        .chunks_exact(2)
        .map(|chunk| i16::from_le_bytes([chunk[0], chunk[1]]))
        .collect()
}

pub fn convert_f32_to_i16(pcm32: &[f32]) -> Vec<i16> {
    pcm32
        .iter()
        .map(|&sample| (sample * 32768.0).clamp(i16::MIN as f32, i16::MAX as f32) as i16)
        .collect()
}

pub fn convert_i16_to_f32(pcm16: &[i16]) -> Vec<f32> {
    pcm16
        .iter()
        .map(|&sample| (sample as f32 / 32768.0).clamp(-1.0, 1.0))
        .collect()
}

/// Little-endian PCM16 bytes.
pub trait ToBinary {
    fn to_binary(&self) -> Vec<u8>;
}

impl ToBinary for [i16] {
    fn to_binary(&self) -> Vec<u8> {
        self.iter().flat_map(|&sample| sample.to_le_bytes()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pcm16_base64_survives_the_wire() {
        let samples = [0i16, 1, -1, i16::MAX, i16::MIN];
        let encoded = encode_i16(&samples);
        assert_eq!(decode_i16(&encoded), samples);
    }

    #[test]
    fn invalid_base64_yields_silence() {
        assert!(decode_i16("not base64!!").is_empty());
    }

    #[test]
    fn odd_trailing_byte_is_dropped() {
        assert_eq!(pcm16_from_le_bytes(&[0x01, 0x00, 0xff]), vec![1]);
    }

    #[test]
    fn f32_conversion_clamps() {
        assert_eq!(convert_f32_to_i16(&[2.0, -2.0, 0.0]), vec![i16::MAX, i16::MIN, 0]);
        assert_eq!(convert_i16_to_f32(&[i16::MIN]), vec![-1.0]);
    }

    #[test]
    fn resampler_waits_for_a_full_chunk() {
        let mut resampler = ChunkedResampler::new(48000.0, 24000.0, 480).unwrap();
        assert!(resampler.process(&[0.0; 100]).unwrap().is_empty());
        assert_eq!(resampler.pending(), 100);

        let out = resampler.process(&[0.0; 900]).unwrap();
        assert!(!out.is_empty());
        assert!(out.len() < 1000);
        assert!(resampler.pending() < 480);
    }
}
