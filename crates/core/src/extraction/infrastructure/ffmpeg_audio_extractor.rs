use std::path::{Path, PathBuf};

use crate::extraction::domain::audio_extractor::AudioExtractor;
use crate::shared::audio_segment::AudioSegment;
use crate::shared::constants::CLASSIFY_SAMPLE_RATE;

use super::ffmpeg_decode;

// PCM encoders report frame_size 0; chunk frames at this size instead.
const PCM_FRAME_SAMPLES: usize = 1024;

/// Extracts the audio track of a video into a `pcm_s16le` WAV file using
/// ffmpeg-next, resampled to mono at the classification sample rate.
pub struct FfmpegAudioExtractor;

impl AudioExtractor for FfmpegAudioExtractor {
    fn extract(
        &self,
        video_path: &Path,
        output_path: &Path,
    ) -> Result<Option<PathBuf>, Box<dyn std::error::Error>> {
        if !video_path.exists() {
            log::error!("video file not found at: {}", video_path.display());
            return Ok(None);
        }

        log::info!("extracting audio from {}", video_path.display());
        let segment = match ffmpeg_decode::decode_audio(video_path, CLASSIFY_SAMPLE_RATE)? {
            Some(segment) => segment,
            None => {
                log::warn!("the video at {} has no audio track", video_path.display());
                return Ok(None);
            }
        };
        if segment.samples().is_empty() {
            log::warn!(
                "the audio track of {} decoded to zero samples",
                video_path.display()
            );
            return Ok(None);
        }

        write_wav(output_path, &segment)?;
        log::info!("extracted audio to {}", output_path.display());
        Ok(Some(output_path.to_path_buf()))
    }
}

/// Encode a mono segment as a pcm_s16le WAV via the ffmpeg muxer.
fn write_wav(path: &Path, audio: &AudioSegment) -> Result<(), Box<dyn std::error::Error>> {
    ffmpeg_next::init()?;

    let mut octx = ffmpeg_next::format::output(&path)?;

    let codec = ffmpeg_next::encoder::find(ffmpeg_next::codec::Id::PCM_S16LE)
        .ok_or("pcm_s16le encoder not found")?;
    let mut ost = octx.add_stream(Some(codec))?;
    let stream_index = ost.index();

    let mut encoder = ffmpeg_next::codec::context::Context::new_with_codec(codec)
        .encoder()
        .audio()?;
    encoder.set_rate(audio.sample_rate() as i32);
    encoder.set_channel_layout(ffmpeg_next::ChannelLayout::MONO);
    encoder.set_format(ffmpeg_next::format::Sample::I16(
        ffmpeg_next::format::sample::Type::Packed,
    ));

    let mut encoder = encoder.open_as(codec)?;
    ost.set_parameters(&encoder);

    octx.write_header()?;

    let enc_time_base = encoder.time_base();
    let ost_time_base = octx
        .stream(stream_index)
        .ok_or("output stream vanished after header write")?
        .time_base();

    let mut pts: i64 = 0;
    for chunk in audio.samples().chunks(PCM_FRAME_SAMPLES) {
        let mut frame = ffmpeg_next::util::frame::audio::Audio::new(
            ffmpeg_next::format::Sample::I16(ffmpeg_next::format::sample::Type::Packed),
            chunk.len(),
            ffmpeg_next::ChannelLayout::MONO,
        );
        frame.set_rate(audio.sample_rate());
        frame.set_pts(Some(pts));

        let plane = frame.data_mut(0);
        for (i, sample) in chunk.iter().enumerate() {
            let value = pcm_i16(*sample);
            plane[i * 2..i * 2 + 2].copy_from_slice(&value.to_le_bytes());
        }

        encoder.send_frame(&frame)?;
        drain_packets(&mut encoder, &mut octx, stream_index, enc_time_base, ost_time_base)?;
        pts += chunk.len() as i64;
    }

    encoder.send_eof()?;
    drain_packets(&mut encoder, &mut octx, stream_index, enc_time_base, ost_time_base)?;
    octx.write_trailer()?;

    Ok(())
}

fn drain_packets(
    encoder: &mut ffmpeg_next::codec::encoder::audio::Encoder,
    octx: &mut ffmpeg_next::format::context::Output,
    stream_index: usize,
    enc_time_base: ffmpeg_next::Rational,
    ost_time_base: ffmpeg_next::Rational,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut packet = ffmpeg_next::Packet::empty();
    while encoder.receive_packet(&mut packet).is_ok() {
        packet.set_stream(stream_index);
        packet.rescale_ts(enc_time_base, ost_time_base);
        packet.write_interleaved(octx)?;
    }
    Ok(())
}

/// Clamp a normalized sample into signed 16-bit PCM range.
fn pcm_i16(sample: f32) -> i16 {
    (sample.clamp(-1.0, 1.0) * f32::from(i16::MAX)).round() as i16
}
