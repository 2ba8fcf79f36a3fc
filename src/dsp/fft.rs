//! Spectral transform — radix-2 FFT over power-of-two buffers.
//!
//! The forward transform is an iterative decimation-in-time Cooley–Tukey
//! butterfly network run in place over a single buffer. The inverse is
//! derived from the forward pass (`conj(fft(conj(x))) / N`) so the
//! round trip holds by construction.

use std::f64::consts::PI;

use num_complex::Complex64;

use crate::error::TransformError;

/// Check that `len` is a usable transform length.
pub fn check_length(len: usize) -> Result<(), TransformError> {
    if len.is_power_of_two() {
        Ok(())
    } else {
        Err(TransformError::InvalidLength { len })
    }
}

/// Forward DFT of `input`, returning a new spectrum.
pub fn forward(input: &[Complex64]) -> Result<Vec<Complex64>, TransformError> {
    let mut buf = input.to_vec();
    forward_in_place(&mut buf)?;
    Ok(buf)
}

/// Inverse DFT of `spectrum`, returning a new time-domain sequence.
pub fn inverse(spectrum: &[Complex64]) -> Result<Vec<Complex64>, TransformError> {
    let mut buf = spectrum.to_vec();
    inverse_in_place(&mut buf)?;
    Ok(buf)
}

/// Forward DFT computed in place: `X[k] = Σ x[n]·e^{-2πikn/N}`.
pub fn forward_in_place(buf: &mut [Complex64]) -> Result<(), TransformError> {
    let n = buf.len();
    check_length(n)?;
    if n == 1 {
        return Ok(());
    }

    bit_reverse_permute(buf);

    // Each stage merges pairs of length-`half` sub-transforms (the even and
    // odd halves of the recursive formulation) into length-`len` ones.
    let mut len = 2;
    while len <= n {
        let half = len / 2;
        for start in (0..n).step_by(len) {
            for k in 0..half {
                let twiddle = Complex64::from_polar(1.0, -2.0 * PI * k as f64 / len as f64);
                let even = buf[start + k];
                let odd = buf[start + k + half] * twiddle;
                buf[start + k] = even + odd;
                buf[start + k + half] = even - odd;
            }
        }
        len <<= 1;
    }

    Ok(())
}

/// Inverse DFT computed in place as `conj(forward(conj(X))) / N`.
pub fn inverse_in_place(buf: &mut [Complex64]) -> Result<(), TransformError> {
    for c in buf.iter_mut() {
        *c = c.conj();
    }
    forward_in_place(buf)?;
    let scale = 1.0 / buf.len() as f64;
    for c in buf.iter_mut() {
        *c = c.conj().scale(scale);
    }
    Ok(())
}

/// Reorder `buf` so index `i` holds the element at `reverse_bits(i)`.
fn bit_reverse_permute(buf: &mut [Complex64]) {
    let n = buf.len();
    let bits = n.trailing_zeros();
    for i in 0..n {
        let j = i.reverse_bits() >> (usize::BITS - bits);
        if j > i {
            buf.swap(i, j);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Direct O(N²) DFT for cross-checking.
    fn naive_dft(input: &[Complex64]) -> Vec<Complex64> {
        let n = input.len();
        (0..n)
            .map(|k| {
                input.iter().enumerate().fold(Complex64::new(0.0, 0.0), |acc, (j, &x)| {
                    let angle = -2.0 * PI * (k * j) as f64 / n as f64;
                    acc + x * Complex64::from_polar(1.0, angle)
                })
            })
            .collect()
    }

    fn pseudo_random_signal(n: usize, seed: u64) -> Vec<Complex64> {
        let mut rng = seed;
        let mut next = move || {
            rng = rng
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            (rng >> 11) as f64 / (1u64 << 53) as f64 * 2.0 - 1.0
        };
        (0..n).map(|_| Complex64::new(next(), next())).collect()
    }

    #[test]
    fn rejects_non_power_of_two() {
        let data = vec![Complex64::new(0.0, 0.0); 12];
        assert_eq!(forward(&data), Err(TransformError::InvalidLength { len: 12 }));
        assert_eq!(inverse(&data), Err(TransformError::InvalidLength { len: 12 }));
    }

    #[test]
    fn rejects_empty_input() {
        assert_eq!(forward(&[]), Err(TransformError::InvalidLength { len: 0 }));
    }

    #[test]
    fn single_sample_is_identity() {
        let x = [Complex64::new(3.0, -2.0)];
        assert_eq!(forward(&x).unwrap(), x.to_vec());
    }

    #[test]
    fn impulse_has_flat_spectrum() {
        let mut x = vec![Complex64::new(0.0, 0.0); 16];
        x[0] = Complex64::new(1.0, 0.0);
        let spectrum = forward(&x).unwrap();
        for (k, bin) in spectrum.iter().enumerate() {
            assert!((bin.re - 1.0).abs() < 1e-12 && bin.im.abs() < 1e-12, "bin {k}: {bin:?}");
        }
    }

    #[test]
    fn matches_naive_dft() {
        let x = pseudo_random_signal(64, 7);
        let fast = forward(&x).unwrap();
        let slow = naive_dft(&x);
        for (k, (a, b)) in fast.iter().zip(&slow).enumerate() {
            assert!((*a - *b).norm() < 1e-9, "bin {k}: fft {a:?} vs dft {b:?}");
        }
    }

    #[test]
    fn round_trip_restores_input() {
        for &n in &[2usize, 8, 256, 2048] {
            let x = pseudo_random_signal(n, n as u64);
            let back = inverse(&forward(&x).unwrap()).unwrap();
            let scale = x.iter().map(|c| c.norm()).fold(1.0_f64, f64::max);
            for (i, (a, b)) in x.iter().zip(&back).enumerate() {
                assert!(
                    (*a - *b).norm() <= 1e-9 * scale,
                    "N={n}, sample {i}: {a:?} vs {b:?}"
                );
            }
        }
    }

    #[test]
    fn real_input_is_conjugate_symmetric() {
        let x: Vec<Complex64> = pseudo_random_signal(32, 3)
            .into_iter()
            .map(|c| Complex64::new(c.re, 0.0))
            .collect();
        let spectrum = forward(&x).unwrap();
        for k in 1..32 {
            let mirrored = spectrum[32 - k].conj();
            assert!((spectrum[k] - mirrored).norm() < 1e-9, "bin {k} not mirrored");
        }
    }
}
