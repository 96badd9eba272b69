//! Accent classification from public video URLs.
//!
//! The pipeline has three stages: fetch a video from a URL, extract its
//! audio track to a mono PCM waveform, and run the waveform through a
//! pretrained accent-classification model to produce a ranked list of
//! labeled predictions.
//!
//! Each bounded context keeps its interfaces in `domain` and the concrete
//! ffmpeg / ONNX Runtime / subprocess implementations in `infrastructure`;
//! `pipeline` wires them together.

pub mod classification;
pub mod extraction;
pub mod fetching;
pub mod pipeline;
pub mod shared;
