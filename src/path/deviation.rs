use rand::Rng;

use super::curve::Curve;

/// Adds per-axis jitter of up to `amount * (1 - |2t - 1|)` to every sample,
/// where `t` is the sample's progress through its checkpoint segment.
///
/// Checkpoint samples and both curve ends are left untouched, so the curve
/// still passes exactly through its first and last checkpoint.
pub fn apply_deviation<R: Rng + ?Sized>(curve: &Curve, amount: f32, rng: &mut R) -> Curve {
    let mut jittered = curve.clone();
    if !(amount.is_finite() && amount > 0.0) || curve.len() < 3 {
        return jittered;
    }

    let last = curve.len() - 1;
    for index in 1..last {
        if curve.is_checkpoint_sample(index) {
            continue;
        }
        let t = curve.segment_progress(index);
        let spread = amount * (1.0 - (2.0 * t - 1.0).abs());
        if spread <= 0.0 {
            continue;
        }
        let sample = &mut jittered.samples_mut()[index];
        sample.x += rng.random_range(-spread..=spread);
        sample.y += rng.random_range(-spread..=spread);
        sample.z += rng.random_range(-spread..=spread);
    }
    jittered
}
