pub mod audio_segment;
pub mod constants;
