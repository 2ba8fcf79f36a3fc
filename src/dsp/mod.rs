//! DSP core — waveform/envelope evaluation, composition, FFT, filtering
//! and harmonic resynthesis.
//!
//! Everything here is a pure function of its inputs. The same code backs
//! the browser frontend (via WASM) and native hosts.

pub mod compositor;
pub mod engine;
pub mod envelope;
pub mod fft;
pub mod filter;
pub mod harmonics;
pub mod mixer;
pub mod oscillator;
pub mod renderer;
