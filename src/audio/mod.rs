pub mod signal;
pub mod source;

pub use signal::AudioSignal;
pub use source::read_wav;
