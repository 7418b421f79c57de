//! Utility functions shared across the spectral pipeline.
//!
//! # Modules
//!
//! - [`audio_math`] - Power/decibel conversions and FFT frequency grids
//! - [`generation`] - Deterministic test-signal generation

pub mod audio_math;
pub mod generation;

pub use audio_math::*;
pub use generation::*;
