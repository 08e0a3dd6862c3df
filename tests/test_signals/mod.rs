#![allow(dead_code)]

pub mod generate;

pub use generate::{generate_mixture, generate_tone, rms, save_mono_wav};
