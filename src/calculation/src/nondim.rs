//! Conversion between physical configuration and solver units.
//!
//! Reference length is the front span `d`, reference time one flapping
//! period `1 / f`, reference velocity `d f`. Density is scaled to one, so
//! solver forces are multiples of `ρ v² d²`.

use std::collections::HashMap;

use crate::config::{Config, KinematicsConfig, WingConfig};
use crate::error::Result;
use crate::kinematics::Kinematics;
use crate::vector::Vec3;
use crate::wing::{PerHalf, Wing};

/// Non-dimensional planform and placement of one wing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WingPlanform {
    /// Root-to-tip length
    pub span: f64,
    /// Chord at the root
    pub root_chord: f64,
    /// Chord at the tip
    pub tip_chord: f64,
    /// Panels along the span
    pub n_span: usize,
    /// Panels along the chord
    pub n_chord: usize,
    /// Pitch axis aft of the root leading edge
    pub pitch_axis: f64,
    /// Pitch-axis station along the body x axis
    pub separation: f64,
}

impl WingPlanform {
    /// Chordwise size of one root panel.
    pub fn chordwise_panel_size(&self) -> f64 {
        self.root_chord / self.n_chord as f64
    }
}

/// Everything the time march needs, in solver units. Built once per run.
#[derive(Debug, Clone, PartialEq)]
pub struct SolverParameters {
    /// Number of time steps
    pub nstep: usize,
    /// Step size in reference periods
    pub dt: f64,
    /// Perpendicular distance below which a segment contributes nothing
    pub cutoff: f64,
    /// Always 1 in solver units
    pub density: f64,
    /// Free stream seen by the body; the body itself moves at `-free_stream`
    pub free_stream: Vec3,
    /// Body pitch (rad)
    pub body_angle: f64,
    /// Front wing planform
    pub front: WingPlanform,
    /// Rear wing planform
    pub rear: WingPlanform,
    /// Joint laws per half
    pub kinematics: PerHalf<Kinematics>,
}

impl SolverParameters {
    /// Planform of `wing`.
    pub fn planform(&self, wing: Wing) -> &WingPlanform {
        match wing {
            Wing::Front => &self.front,
            Wing::Rear => &self.rear,
        }
    }

    /// Time at the start of step `step` (zero-based).
    pub fn time(&self, step: usize) -> f64 {
        step as f64 * self.dt
    }

    /// Velocity of the body in the space-fixed frame, `-U`.
    pub fn body_velocity(&self) -> Vec3 {
        -self.free_stream
    }

    /// Body origin at time `t`; impulses are taken about this point.
    pub fn body_origin(&self, t: f64) -> Vec3 {
        self.body_velocity() * t
    }

    /// Key values for logging, in the style of a parameter summary table.
    pub fn summary(&self) -> HashMap<&'static str, f64> {
        HashMap::from([
            ("nstep", self.nstep as f64),
            ("dt", self.dt),
            ("cutoff", self.cutoff),
            ("free_stream", self.free_stream.magnitude()),
            ("body_angle_deg", self.body_angle.to_degrees()),
            ("front_span", self.front.span),
            ("rear_span", self.rear.span),
            ("separation", self.rear.separation - self.front.separation),
        ])
    }
}

/// Reference quantities for converting solver output back to SI units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scales {
    /// Reference length (m)
    pub length: f64,
    /// Reference time (s)
    pub time: f64,
    /// Reference velocity (m/s)
    pub velocity: f64,
    /// Fluid density (kg/m³)
    pub density: f64,
}

impl Scales {
    /// Newtons per unit solver force.
    pub fn force(&self) -> f64 {
        self.density * self.velocity.powi(2) * self.length.powi(2)
    }

    /// Newton-metres per unit solver moment.
    pub fn moment(&self) -> f64 {
        self.force() * self.length
    }
}

/// Validates `config` and converts it to solver units.
pub fn nondimensionalize(config: &Config) -> Result<(SolverParameters, Scales)> {
    config.validate()?;
    let sim = &config.simulation;

    let scales = Scales {
        length: config.front.span,
        time: 1.0 / sim.frequency,
        velocity: config.front.span * sim.frequency,
        density: sim.density,
    };

    let front = planform(&config.front, scales.length);
    let rear = planform(&config.rear, scales.length);
    let [u, v, w] = sim.velocity;

    let params = SolverParameters {
        nstep: sim.nstep,
        dt: sim.dt,
        cutoff: sim.cutoff * front.chordwise_panel_size(),
        density: 1.0,
        free_stream: Vec3::new(u, v, w) * (1.0 / scales.velocity),
        body_angle: sim.body_angle.to_radians(),
        front,
        rear,
        kinematics: config.kinematics.map(|_, kin| kinematics(kin)),
    };

    Ok((params, scales))
}

fn planform(wing: &WingConfig, length: f64) -> WingPlanform {
    WingPlanform {
        span: wing.span / length,
        root_chord: wing.root_chord / length,
        tip_chord: wing.tip_chord / length,
        n_span: wing.n_span,
        n_chord: wing.n_chord,
        pitch_axis: wing.pitch_axis / length,
        separation: wing.separation / length,
    }
}

fn kinematics(kin: &KinematicsConfig) -> Kinematics {
    Kinematics {
        motion: kin.motion,
        period: kin.period_ratio,
        phase: kin.phase,
        eccentricity: kin.eccentricity,
        sweep_amplitude: kin.sweep_amplitude.to_radians(),
        pitch_upper: kin.pitch_upper.to_radians(),
        pitch_lower: kin.pitch_lower.to_radians(),
        pitch_phase: kin.pitch_phase,
        stroke_angle: kin.stroke_angle.to_radians(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use approx::assert_relative_eq;

    #[test]
    fn test_reference_values() {
        let config = Config::forward_flight(1.2, 10.0);
        let (params, scales) = nondimensionalize(&config).unwrap();

        assert_relative_eq!(scales.length, 0.04, epsilon = 1e-12);
        assert_relative_eq!(scales.velocity, 1.2, epsilon = 1e-12);
        assert_relative_eq!(params.front.span, 1.0, epsilon = 1e-12);
        assert_relative_eq!(params.front.root_chord, 0.25, epsilon = 1e-12);
        assert_relative_eq!(params.rear.separation, 0.375, epsilon = 1e-12);
        assert_relative_eq!(params.free_stream.x, 1.0, epsilon = 1e-12);
        assert_relative_eq!(params.body_angle, 10f64.to_radians(), epsilon = 1e-12);
        assert_relative_eq!(params.density, 1.0, epsilon = 1e-12);
        // 0.1 of a 0.125 chordwise panel
        assert_relative_eq!(params.cutoff, 0.0125, epsilon = 1e-12);
        assert_relative_eq!(
            params.kinematics.front_right.sweep_amplitude,
            40f64.to_radians(),
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_scales_convert_to_si() {
        let scales = Scales {
            length: 0.1,
            time: 0.05,
            velocity: 2.0,
            density: 1.2,
        };
        assert_relative_eq!(scales.force(), 1.2 * 4.0 * 0.01, epsilon = 1e-12);
        assert_relative_eq!(scales.moment(), 1.2 * 4.0 * 0.001, epsilon = 1e-12);
    }

    #[test]
    fn test_body_origin_moves_against_free_stream() {
        let (params, _) = nondimensionalize(&Config::forward_flight(0.6, 0.0)).unwrap();
        let origin = params.body_origin(2.0);
        assert_relative_eq!(origin.x, -1.0, epsilon = 1e-12);
        assert_eq!(params.time(4), 4.0 * params.dt);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let mut config = Config::default();
        config.simulation.frequency = 0.0;
        assert!(matches!(nondimensionalize(&config), Err(Error::InvalidConfig(_))));
    }
}
