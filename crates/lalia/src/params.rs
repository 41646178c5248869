//! Fixed parameters of the lalia feature pipeline and model.
//!
//! Consumers read these by name; changing a value means redeploying the
//! table, there is no runtime override.

// Artifacts.
pub const CHECKPOINT_SUFFIX: &str = "ckpt.json";
pub const PROGRESS_COLUMNS: usize = 100;

// Audio framing.
pub const SAMPLE_RATE_HZ: u32 = 8_000;
pub const WINDOW_SHIFT_SEC: f32 = 0.010;
pub const WINDOW_SIZE_SEC: f32 = 0.025;

// Spectrogram image tensor, channels x bins x frames.
pub const N_FFT: usize = 256;
pub const FREQ_BINS: usize = N_FFT / 2 + 1; // 129
pub const FRAMES_PER_UTTERANCE: usize = 31;
pub const SPEC_CHANNELS: usize = 2;
pub const NUM_PIXELS: usize = SPEC_CHANNELS * FREQ_BINS * FRAMES_PER_UTTERANCE;

// Augmentation ranges, inclusive (low, high).
pub const TEMPO_RANGE: (f32, f32) = (0.9, 1.1);
pub const PITCH_RANGE_CENTS: (f32, f32) = (-150.0, 150.0);
pub const NOISE_SNR_RANGE_DB: (f32, f32) = (-10.0, -3.0);

// Label inventory and model sizing.
pub const NUM_LABELS: usize = 187;
pub const NUM_CTC_LABELS: usize = 177;
pub const NUM_HIDDEN: [usize; 2] = [256, 256];
pub const NUM_STYLE: usize = 256;
pub const EPS: f32 = 1e-9;

// Capsule routing.
pub const NUM_ROUTING_ITERATIONS: usize = 5;

/// Classes in the spoken-digit evaluation split. Every visualizer is sized
/// to this count, independent of the full label inventory.
pub const NUM_EVAL_CLASSES: usize = 10;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pixel_count_matches_tensor_shape() {
        assert_eq!(NUM_PIXELS, SPEC_CHANNELS * FREQ_BINS * FRAMES_PER_UTTERANCE);
        assert_eq!(NUM_PIXELS, 2 * 129 * 31);
    }

    #[test]
    fn freq_bins_derived_from_fft_size() {
        assert_eq!(FREQ_BINS, N_FFT / 2 + 1);
    }

    #[test]
    fn window_shift_shorter_than_window() {
        assert!(WINDOW_SHIFT_SEC < WINDOW_SIZE_SEC);
    }

    #[test]
    fn augmentation_ranges_ordered() {
        assert!(TEMPO_RANGE.0 < TEMPO_RANGE.1);
        assert!(PITCH_RANGE_CENTS.0 < PITCH_RANGE_CENTS.1);
        assert!(NOISE_SNR_RANGE_DB.0 < NOISE_SNR_RANGE_DB.1);
    }

    #[test]
    fn ctc_labels_within_full_inventory() {
        assert!(NUM_CTC_LABELS <= NUM_LABELS);
        assert!(NUM_EVAL_CLASSES <= NUM_LABELS);
    }
}
