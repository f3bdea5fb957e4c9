//! Joint laws: time → sweep and pitch angles (and rates) of a wing-half.
//!
//! Time is non-dimensional (in reference flapping periods) and angles are in
//! radians. Evaluation is a pure function of the parameters and time.

use std::f64::consts::TAU;

use serde::{Deserialize, Serialize};

/// Pitch waveform family.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MotionPath {
    /// Pitch follows a sine of the stroke phase.
    Sinusoidal,
    /// Pitch follows `tanh(k sin χ) / tanh(k)`: plateaus with quick reversals.
    Smoothed {
        /// Steepness `k` of the reversal, > 0
        sharpness: f64,
    },
}

/// Non-dimensional joint-law parameters of one wing-half.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Kinematics {
    /// Pitch waveform
    pub motion: MotionPath,
    /// Period in reference periods
    pub period: f64,
    /// Phase offset in periods
    pub phase: f64,
    /// Stroke eccentricity, |e| < 1
    pub eccentricity: f64,
    /// Sweep amplitude (rad)
    pub sweep_amplitude: f64,
    /// Upper pitch bound (rad)
    pub pitch_upper: f64,
    /// Lower pitch bound (rad)
    pub pitch_lower: f64,
    /// Pitch phase lead in periods
    pub pitch_phase: f64,
    /// Stroke-plane angle (rad); constant, consumed by the geometry transform
    pub stroke_angle: f64,
}

impl Kinematics {
    /// A wing-half that never moves.
    pub const fn stationary() -> Self {
        Self {
            motion: MotionPath::Sinusoidal,
            period: 1.0,
            phase: 0.0,
            eccentricity: 0.0,
            sweep_amplitude: 0.0,
            pitch_upper: 0.0,
            pitch_lower: 0.0,
            pitch_phase: 0.0,
            stroke_angle: 0.0,
        }
    }
}

/// Instantaneous joint angles and their time derivatives.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct JointState {
    /// Sweep angle φ (rad)
    pub sweep: f64,
    /// Pitch angle θ (rad)
    pub pitch: f64,
    /// dφ/dt
    pub sweep_rate: f64,
    /// dθ/dt
    pub pitch_rate: f64,
}

/// Evaluates the joint law at non-dimensional time `t`.
pub fn evaluate(kin: &Kinematics, t: f64) -> JointState {
    let omega = TAU / kin.period;
    let psi = omega * t + TAU * kin.phase;
    let (sin_psi, cos_psi) = psi.sin_cos();

    // Eccentric stroke phase; monotone in t for |e| < 1
    let stroke = psi + kin.eccentricity * sin_psi;
    let stroke_rate = omega * (1.0 + kin.eccentricity * cos_psi);

    let (sin_stroke, cos_stroke) = stroke.sin_cos();
    let sweep = kin.sweep_amplitude * cos_stroke;
    let sweep_rate = -kin.sweep_amplitude * sin_stroke * stroke_rate;

    let mid = 0.5 * (kin.pitch_upper + kin.pitch_lower);
    let half_range = 0.5 * (kin.pitch_upper - kin.pitch_lower);
    let (shape, shape_slope) = pitch_shape(kin.motion, stroke + TAU * kin.pitch_phase);

    JointState {
        sweep,
        pitch: mid + half_range * shape,
        sweep_rate,
        pitch_rate: half_range * shape_slope * stroke_rate,
    }
}

/// Normalized pitch waveform in [-1, 1] and its derivative with respect to `chi`.
fn pitch_shape(motion: MotionPath, chi: f64) -> (f64, f64) {
    let (sin_chi, cos_chi) = chi.sin_cos();
    match motion {
        MotionPath::Sinusoidal => (sin_chi, cos_chi),
        MotionPath::Smoothed { sharpness } => {
            let norm = sharpness.tanh();
            let inner = (sharpness * sin_chi).tanh();
            let slope = sharpness * cos_chi * (1.0 - inner * inner) / norm;
            (inner / norm, slope)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn flapping(motion: MotionPath, eccentricity: f64) -> Kinematics {
        Kinematics {
            motion,
            period: 1.0,
            phase: 0.1,
            eccentricity,
            sweep_amplitude: 0.7,
            pitch_upper: 0.8,
            pitch_lower: -0.6,
            pitch_phase: 0.25,
            stroke_angle: 0.0,
        }
    }

    #[test]
    fn test_stationary_is_exactly_zero() {
        for i in 0..10 {
            let state = evaluate(&Kinematics::stationary(), i as f64 * 0.13);
            assert_eq!(state.sweep, 0.0);
            assert_eq!(state.pitch, 0.0);
            assert_eq!(state.sweep_rate, 0.0);
            assert_eq!(state.pitch_rate, 0.0);
        }
    }

    #[test]
    fn test_rates_match_finite_difference() {
        let h = 1e-6;
        for motion in [MotionPath::Sinusoidal, MotionPath::Smoothed { sharpness: 3.0 }] {
            let kin = flapping(motion, 0.3);
            for i in 0..20 {
                let t = i as f64 * 0.05;
                let plus = evaluate(&kin, t + h);
                let minus = evaluate(&kin, t - h);
                let state = evaluate(&kin, t);
                assert_relative_eq!(state.sweep_rate, (plus.sweep - minus.sweep) / (2.0 * h), epsilon = 1e-5);
                assert_relative_eq!(state.pitch_rate, (plus.pitch - minus.pitch) / (2.0 * h), epsilon = 1e-5);
            }
        }
    }

    #[test]
    fn test_periodic_and_bounded() {
        let kin = flapping(MotionPath::Smoothed { sharpness: 2.0 }, -0.4);
        for i in 0..50 {
            let t = i as f64 * 0.02;
            let a = evaluate(&kin, t);
            let b = evaluate(&kin, t + kin.period);
            assert_relative_eq!(a.sweep, b.sweep, epsilon = 1e-12);
            assert_relative_eq!(a.pitch, b.pitch, epsilon = 1e-12);
            assert!(a.sweep.abs() <= kin.sweep_amplitude + 1e-12);
            assert!(a.pitch <= kin.pitch_upper + 1e-12 && a.pitch >= kin.pitch_lower - 1e-12);
        }
    }

    #[test]
    fn test_eccentricity_skews_stroke_timing() {
        // Time at which the sweep first crosses zero after t = 0, phase removed
        let first_zero = |e: f64| {
            let kin = Kinematics { phase: 0.0, ..flapping(MotionPath::Sinusoidal, e) };
            (1..1000)
                .map(|i| i as f64 / 1000.0)
                .find(|&t| evaluate(&kin, t).sweep <= 0.0)
                .unwrap()
        };
        assert_relative_eq!(first_zero(0.0), 0.25, epsilon = 2e-3);
        assert!(first_zero(0.5) < 0.25);
        assert!(first_zero(-0.5) > 0.25);
    }
}
