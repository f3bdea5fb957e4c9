//! Physical configuration of a tandem flapping-wing run.
//!
//! All values here are in physical units (metres, degrees, hertz, m/s,
//! kg/m³). [`crate::nondim`] turns a validated [`Config`] into the solver's
//! non-dimensional parameters.
//!
//! # TOML format
//!
//! ```toml
//! [simulation]
//! nstep = 40              # number of time steps
//! dt = 0.025              # step size in flapping periods
//! cutoff = 0.1            # cutoff radius, fraction of the front chordwise panel size
//! frequency = 30.0        # flapping frequency (Hz)
//! density = 1.2           # fluid density (kg/m^3)
//! velocity = [0.5, 0.0, 0.0]  # free stream seen by the body (m/s)
//! body_angle = 0.0        # body pitch (deg)
//!
//! [front]
//! span = 0.04
//! root_chord = 0.01
//! tip_chord = 0.008
//! n_span = 4
//! n_chord = 2
//! pitch_axis = 0.0025     # pitch axis aft of the root leading edge (m)
//! separation = 0.0        # pitch-axis station along the body x axis (m)
//!
//! [kinematics.front_right]
//! motion = { kind = "smoothed", sharpness = 3.0 }
//! sweep_amplitude = 40.0
//! pitch_upper = 45.0
//! pitch_lower = -45.0
//! # ... remaining fields default, see `KinematicsConfig`
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::kinematics::MotionPath;
use crate::wing::{PerHalf, WingHalf};

/// Top-level configuration, one per run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Time marching and flow
    pub simulation: SimulationSettings,
    /// Leading wing
    pub front: WingConfig,
    /// Trailing wing
    pub rear: WingConfig,
    /// Joint laws, one table per half
    pub kinematics: PerHalf<KinematicsConfig>,
    /// Persistence settings for the binary
    #[serde(default)]
    pub output: OutputConfig,
}

/// Time marching and flow parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulationSettings {
    /// Number of time steps
    pub nstep: usize,
    /// Step size in flapping periods
    pub dt: f64,
    /// Cutoff radius as a fraction of the front wing's chordwise panel size
    pub cutoff: f64,
    /// Flapping frequency (Hz)
    pub frequency: f64,
    /// Fluid density (kg/m³)
    pub density: f64,
    /// Free-stream velocity relative to the body (m/s)
    pub velocity: [f64; 3],
    /// Body pitch angle (deg)
    #[serde(default)]
    pub body_angle: f64,
}

/// Planform and placement of one wing; the left half mirrors the right.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WingConfig {
    /// Half-wing length from root to tip (m)
    pub span: f64,
    /// Chord at the root (m)
    pub root_chord: f64,
    /// Chord at the tip (m)
    pub tip_chord: f64,
    /// Panels along the span
    pub n_span: usize,
    /// Panels along the chord
    pub n_chord: usize,
    /// Pitch axis location aft of the root leading edge (m)
    pub pitch_axis: f64,
    /// Station of the pitch axis along the body x axis (m)
    pub separation: f64,
}

/// Joint-law parameters of one wing-half.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KinematicsConfig {
    /// Pitch waveform
    pub motion: MotionPath,
    /// Flapping period relative to the reference period `1 / frequency`
    pub period_ratio: f64,
    /// Phase offset in periods
    pub phase: f64,
    /// Stroke eccentricity, |e| < 1; skews the down/up stroke timing
    pub eccentricity: f64,
    /// Sweep amplitude (deg)
    pub sweep_amplitude: f64,
    /// Upper pitch bound (deg)
    pub pitch_upper: f64,
    /// Lower pitch bound (deg)
    pub pitch_lower: f64,
    /// Pitch phase lead relative to the sweep, in periods
    pub pitch_phase: f64,
    /// Stroke-plane angle about the body y axis (deg)
    pub stroke_angle: f64,
}

impl Default for KinematicsConfig {
    fn default() -> Self {
        Self {
            motion: MotionPath::Sinusoidal,
            period_ratio: 1.0,
            phase: 0.0,
            eccentricity: 0.0,
            sweep_amplitude: 0.0,
            pitch_upper: 0.0,
            pitch_lower: 0.0,
            pitch_phase: 0.25,
            stroke_angle: 0.0,
        }
    }
}

/// Where and what the binary persists. Not used by the solver itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Folder receiving results and the effective configuration
    pub folder: PathBuf,
    /// Write circulation and wake files every step
    pub save_snapshots: bool,
    /// Delete an existing output folder before the run
    pub flush: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            folder: PathBuf::from("output"),
            save_snapshots: true,
            flush: false,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        let wing = WingConfig {
            span: 0.04,
            root_chord: 0.01,
            tip_chord: 0.008,
            n_span: 4,
            n_chord: 2,
            pitch_axis: 0.0025,
            separation: 0.0,
        };
        let stroke = KinematicsConfig {
            motion: MotionPath::Smoothed { sharpness: 3.0 },
            sweep_amplitude: 40.0,
            pitch_upper: 45.0,
            pitch_lower: -45.0,
            stroke_angle: 60.0,
            ..KinematicsConfig::default()
        };
        let rear_stroke = KinematicsConfig {
            phase: 0.25,
            ..stroke
        };

        Self {
            simulation: SimulationSettings {
                nstep: 40,
                dt: 0.025,
                cutoff: 0.1,
                frequency: 30.0,
                density: 1.2,
                velocity: [0.0, 0.0, 0.0],
                body_angle: 0.0,
            },
            front: wing,
            rear: WingConfig {
                separation: 0.015,
                ..wing
            },
            kinematics: PerHalf {
                front_right: stroke,
                front_left: stroke,
                rear_right: rear_stroke,
                rear_left: rear_stroke,
            },
            output: OutputConfig::default(),
        }
    }
}

impl Config {
    /// Hovering defaults with a forward free stream of `speed` m/s and a
    /// body pitched nose-up by `body_angle` degrees.
    pub fn forward_flight(speed: f64, body_angle: f64) -> Self {
        let mut config = Self::default();
        config.simulation.velocity = [speed, 0.0, 0.0];
        config.simulation.body_angle = body_angle;
        config
    }

    /// Parses and validates a TOML document.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Config = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// The configuration as a TOML document, as stored next to the results.
    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string(self)?)
    }

    /// Fails with [`Error::WingInterference`] unless the rear pitch axis sits at
    /// least half the sum of the root chords behind the front one, in metres.
    pub fn check_clearance(&self) -> Result<()> {
        crate::simulation::check_separation(
            [self.front.separation, self.rear.separation],
            [self.front.root_chord, self.rear.root_chord],
        )
    }

    /// Checks every value the solver divides by or relies on being in range.
    ///
    /// Wing clearance is not checked here; see [`Config::check_clearance`].
    pub fn validate(&self) -> Result<()> {
        let sim = &self.simulation;
        if sim.nstep == 0 {
            return Err(Error::invalid("nstep must be at least 1"));
        }
        positive("simulation.dt", sim.dt)?;
        positive("simulation.cutoff", sim.cutoff)?;
        positive("simulation.frequency", sim.frequency)?;
        positive("simulation.density", sim.density)?;
        if sim.velocity.iter().any(|v| !v.is_finite()) {
            return Err(Error::invalid("simulation.velocity must be finite"));
        }

        for (name, wing) in [("front", &self.front), ("rear", &self.rear)] {
            positive(&format!("{name}.span"), wing.span)?;
            positive(&format!("{name}.root_chord"), wing.root_chord)?;
            positive(&format!("{name}.tip_chord"), wing.tip_chord)?;
            if wing.n_span == 0 || wing.n_chord == 0 {
                return Err(Error::invalid(format!("{name} needs at least one panel in each direction")));
            }
        }

        for half in WingHalf::ALL {
            let kin = &self.kinematics[half];
            positive(&format!("kinematics.{half}.period_ratio"), kin.period_ratio)?;
            if !(kin.eccentricity.abs() < 1.0) {
                return Err(Error::invalid(format!(
                    "kinematics.{half}.eccentricity must satisfy |e| < 1, got {}",
                    kin.eccentricity
                )));
            }
            if kin.pitch_lower > kin.pitch_upper {
                return Err(Error::invalid(format!(
                    "kinematics.{half}: pitch_lower exceeds pitch_upper"
                )));
            }
            if let MotionPath::Smoothed { sharpness } = kin.motion {
                positive(&format!("kinematics.{half}.sharpness"), sharpness)?;
            }
        }

        Ok(())
    }
}

fn positive(name: &str, value: f64) -> Result<()> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(Error::invalid(format!("{name} must be positive, got {value}")))
    }
}
