//! Unsteady vortex-lattice solver for a tandem pair of flapping wings.
//!
//! This library provides:
//! - Joint laws for sweep and pitch of each wing-half
//! - Trapezoidal half-wing meshes of vortex-ring panels
//! - Rigid-body placement of the panels in the space-fixed frame
//! - A cutoff-regularized Biot–Savart kernel, parallel over evaluation points
//! - Influence-matrix assembly and a dense circulation solve
//! - A free wake that is shed from the trailing edge and convected every step
//! - Impulse-based forces and moments
//!
//! # Quick start
//!
//! ```no_run
//! use tombo_calc::{Config, NoObserver, Simulation};
//!
//! let (simulation, scales) = Simulation::from_config(&Config::default())?;
//! let output = simulation.run(&mut NoObserver)?;
//! if let Some(forces) = output.forces {
//!     let si = forces.to_dimensional(&scales);
//!     println!("final lift: {} N", si.total[si.len() - 1].force.z);
//! }
//! # Ok::<(), tombo_calc::Error>(())
//! ```
//!
//! # Features
//!
//! - `lapack`: solve the circulation system with ndarray-linalg instead of nalgebra

#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod geometry;
pub mod impulse;
pub mod influence;
pub mod kernel;
pub mod kinematics;
pub mod mesh;
pub mod nondim;
pub mod simulation;
pub mod solver;
pub mod vector;
pub mod wake;
pub mod wing;

pub use config::Config;
pub use error::{Error, Result};
pub use impulse::{ForceHistory, Impulse, ImpulseHistory, Loads};
pub use kernel::Filament;
pub use mesh::{Surface, VortexRing, WingMesh};
pub use nondim::{Scales, SolverParameters, WingPlanform};
pub use simulation::{
    HalfSnapshot, NoObserver, Simulation, SimulationOutput, SimulationState, StepObserver,
    StepSnapshot,
};
pub use vector::{Mat3, Vec3};
pub use wake::{Wake, WakePhase};
pub use wing::{PerHalf, Side, Wing, WingHalf};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
