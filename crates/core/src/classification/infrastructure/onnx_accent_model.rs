use std::path::Path;
use std::sync::Mutex;

use crate::classification::domain::accent_model::AccentModel;
use crate::classification::domain::label_table::LabelTable;
use crate::classification::ClassifierError;
use crate::extraction::infrastructure::ffmpeg_decode;
use crate::shared::constants::CLASSIFY_SAMPLE_RATE;

use super::model_locator;

/// Accent model backed by an ONNX Runtime session.
///
/// The session takes a mono waveform tensor of shape `[1, samples]` at the
/// classification sample rate and produces one logit per label; `score`
/// softmaxes the logits into a probability distribution over the full
/// label set.
///
/// The label table is extracted at load time and never mutated. The
/// session sits behind a mutex because a run needs exclusive access; the
/// model itself is read-only after load.
pub struct OnnxAccentModel {
    session: Mutex<ort::session::Session>,
    labels: LabelTable,
}

impl OnnxAccentModel {
    /// Load the bundle (`accent-id.onnx` + `labels.txt`) from `bundle_dir`.
    ///
    /// Any failure (unreadable labels, corrupt or incompatible model)
    /// surfaces as [`ClassifierError::ModelLoad`] and leaves nothing
    /// usable behind.
    pub fn load(bundle_dir: &Path) -> Result<Self, ClassifierError> {
        let labels_path = model_locator::labels_file(bundle_dir);
        let labels_text = std::fs::read_to_string(&labels_path)
            .map_err(|e| load_error(bundle_dir, e))?;
        let labels = LabelTable::parse(&labels_text).map_err(|e| load_error(bundle_dir, e))?;

        let model_path = model_locator::model_file(bundle_dir);
        let session = ort::session::Session::builder()
            .and_then(|builder| builder.commit_from_file(&model_path))
            .map_err(|e| load_error(bundle_dir, e))?;

        log::info!(
            "loaded accent model from {} ({} labels)",
            bundle_dir.display(),
            labels.len()
        );
        Ok(Self {
            session: Mutex::new(session),
            labels,
        })
    }
}

fn load_error(
    bundle_dir: &Path,
    source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
) -> ClassifierError {
    ClassifierError::ModelLoad {
        path: bundle_dir.to_path_buf(),
        source: source.into(),
    }
}

impl AccentModel for OnnxAccentModel {
    fn labels(&self) -> &LabelTable {
        &self.labels
    }

    fn score(&self, audio_file: &Path) -> Result<Vec<f32>, Box<dyn std::error::Error>> {
        let segment = ffmpeg_decode::decode_audio(audio_file, CLASSIFY_SAMPLE_RATE)?
            .ok_or("audio file has no decodable audio stream")?;
        if segment.samples().is_empty() {
            return Err("audio file decoded to zero samples".into());
        }

        let input = ndarray::Array2::from_shape_vec(
            (1, segment.samples().len()),
            segment.samples().to_vec(),
        )?;
        let input_value = ort::value::Tensor::from_array(input)?;

        let mut session = self
            .session
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let outputs = session.run(ort::inputs![input_value])?;
        if outputs.len() == 0 {
            return Err("accent model produced no outputs".into());
        }
        let tensor = outputs[0].try_extract_array::<f32>()?;
        let logits: Vec<f32> = tensor.iter().copied().collect();
        if logits.len() != self.labels.len() {
            return Err(format!(
                "model produced {} scores for {} labels",
                logits.len(),
                self.labels.len()
            )
            .into());
        }

        Ok(softmax(&logits))
    }
}

/// Numerically stable softmax: shift by the max logit before
/// exponentiating so large logits cannot overflow.
fn softmax(logits: &[f32]) -> Vec<f32> {
    let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = logits.iter().map(|&x| (x - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    exps.iter().map(|&x| x / sum).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use tempfile::TempDir;

    #[test]
    fn test_softmax_sums_to_one() {
        let probs = softmax(&[1.0, 2.0, 3.0]);
        let sum: f32 = probs.iter().sum();
        assert_relative_eq!(sum, 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_softmax_preserves_ordering() {
        let probs = softmax(&[0.5, 2.5, -1.0]);
        assert!(probs[1] > probs[0]);
        assert!(probs[0] > probs[2]);
    }

    #[test]
    fn test_softmax_uniform_logits() {
        let probs = softmax(&[4.0, 4.0, 4.0, 4.0]);
        for p in probs {
            assert_relative_eq!(p, 0.25, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_softmax_large_logits_do_not_overflow() {
        let probs = softmax(&[1000.0, 999.0]);
        assert!(probs.iter().all(|p| p.is_finite()));
        assert!(probs[0] > probs[1]);
        let sum: f32 = probs.iter().sum();
        assert_relative_eq!(sum, 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_load_missing_bundle_files_is_model_load_error() {
        let tmp = TempDir::new().unwrap();
        let result = OnnxAccentModel::load(tmp.path());
        assert!(matches!(
            result,
            Err(ClassifierError::ModelLoad { .. })
        ));
    }

    #[test]
    fn test_load_bad_labels_file_is_model_load_error() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("labels.txt"), "").unwrap();
        let result = OnnxAccentModel::load(tmp.path());
        assert!(matches!(
            result,
            Err(ClassifierError::ModelLoad { .. })
        ));
    }

    #[test]
    #[ignore] // Requires the pretrained bundle in models/accent-id
    fn test_score_real_bundle_returns_distribution() {
        let bundle = model_locator::locate(None).expect("bundle not installed");
        let model = OnnxAccentModel::load(&bundle).expect("bundle failed to load");

        let tmp = TempDir::new().unwrap();
        let wav = tmp.path().join("tone.wav");
        write_test_tone(&wav);

        let probs = model.score(&wav).expect("scoring failed");
        assert_eq!(probs.len(), model.labels().len());
        let sum: f32 = probs.iter().sum();
        assert_relative_eq!(sum, 1.0, epsilon = 1e-3);
    }

    // 1 second of 440 Hz sine as pcm_s16le WAV, written by hand so the
    // ignored integration test needs no fixture files.
    fn write_test_tone(path: &Path) {
        let sample_rate = 16000u32;
        let samples: Vec<i16> = (0..sample_rate)
            .map(|i| {
                let t = i as f64 / sample_rate as f64;
                ((2.0 * std::f64::consts::PI * 440.0 * t).sin() * 0.5 * 32767.0) as i16
            })
            .collect();
        let data_len = (samples.len() * 2) as u32;
        let mut bytes = Vec::with_capacity(44 + data_len as usize);
        bytes.extend_from_slice(b"RIFF");
        bytes.extend_from_slice(&(36 + data_len).to_le_bytes());
        bytes.extend_from_slice(b"WAVEfmt ");
        bytes.extend_from_slice(&16u32.to_le_bytes());
        bytes.extend_from_slice(&1u16.to_le_bytes()); // PCM
        bytes.extend_from_slice(&1u16.to_le_bytes()); // mono
        bytes.extend_from_slice(&sample_rate.to_le_bytes());
        bytes.extend_from_slice(&(sample_rate * 2).to_le_bytes());
        bytes.extend_from_slice(&2u16.to_le_bytes());
        bytes.extend_from_slice(&16u16.to_le_bytes());
        bytes.extend_from_slice(b"data");
        bytes.extend_from_slice(&data_len.to_le_bytes());
        for s in samples {
            bytes.extend_from_slice(&s.to_le_bytes());
        }
        std::fs::write(path, bytes).unwrap();
    }
}
