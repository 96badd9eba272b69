use std::path::Path;

use crate::shared::audio_segment::AudioSegment;

/// Decode the best audio stream of `path` to mono f32 PCM at
/// `target_sample_rate`.
///
/// Returns `Ok(None)` when the container has no audio stream. Used both
/// by the extraction stage and by the classifier's waveform loading, so
/// the path may be relative to the process working directory.
pub fn decode_audio(
    path: &Path,
    target_sample_rate: u32,
) -> Result<Option<AudioSegment>, Box<dyn std::error::Error>> {
    ffmpeg_next::init()?;

    let mut ictx = ffmpeg_next::format::input(path)?;

    let audio_stream = match ictx.streams().best(ffmpeg_next::media::Type::Audio) {
        Some(stream) => stream,
        None => return Ok(None),
    };

    let audio_stream_index = audio_stream.index();
    let codec_ctx =
        ffmpeg_next::codec::context::Context::from_parameters(audio_stream.parameters())?;
    let mut decoder = codec_ctx.decoder().audio()?;

    let mut resampler = ffmpeg_next::software::resampling::Context::get(
        decoder.format(),
        decoder.channel_layout(),
        decoder.rate(),
        ffmpeg_next::format::Sample::F32(ffmpeg_next::format::sample::Type::Planar),
        ffmpeg_next::ChannelLayout::MONO,
        target_sample_rate,
    )?;

    let mut samples: Vec<f32> = Vec::new();
    let mut decoded = ffmpeg_next::util::frame::audio::Audio::empty();
    let mut resampled = ffmpeg_next::util::frame::audio::Audio::empty();

    for (stream, packet) in ictx.packets() {
        if stream.index() != audio_stream_index {
            continue;
        }
        decoder.send_packet(&packet)?;
        while decoder.receive_frame(&mut decoded).is_ok() {
            resampler.run(&decoded, &mut resampled)?;
            collect_f32_samples(&resampled, &mut samples);
        }
    }

    // Drain the decoder, then the resampler's internal buffer.
    decoder.send_eof()?;
    while decoder.receive_frame(&mut decoded).is_ok() {
        resampler.run(&decoded, &mut resampled)?;
        collect_f32_samples(&resampled, &mut samples);
    }
    if let Ok(Some(delay)) = resampler.flush(&mut resampled) {
        if delay.output > 0 {
            collect_f32_samples(&resampled, &mut samples);
        }
    }

    Ok(Some(AudioSegment::new(samples, target_sample_rate, 1)))
}

/// Append the f32 samples of a planar mono frame.
fn collect_f32_samples(frame: &ffmpeg_next::util::frame::audio::Audio, out: &mut Vec<f32>) {
    let count = frame.samples();
    if count == 0 {
        return;
    }
    let data = frame.data(0);
    let floats = unsafe { std::slice::from_raw_parts(data.as_ptr() as *const f32, count) };
    out.extend_from_slice(floats);
}
