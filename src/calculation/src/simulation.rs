//! Time march of the tandem wing pair.
//!
//! Each step places the four halves, solves the no-penetration system for
//! the bound circulation, records impulses, then convects the wake and sheds
//! the border row into it. Loads are derived from the impulse history once
//! the march is over.

use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::geometry::RigidMotion;
use crate::impulse::{self, ForceHistory, ImpulseHistory, ImpulseSample, MIN_SAMPLES};
use crate::influence::{assemble_matrix, assemble_rhs, SystemLayout};
use crate::kernel::{induced_velocities, Filament};
use crate::mesh::{self, Surface, WingMesh};
use crate::nondim::{nondimensionalize, Scales, SolverParameters, WingPlanform};
use crate::solver;
use crate::vector::Vec3;
use crate::wake::{self, Wake};
use crate::wing::{PerHalf, Wing, WingHalf};

/// Receives a borrowed view of the state after every completed step.
pub trait StepObserver {
    /// Called once per step, after shedding.
    fn on_step(&mut self, snapshot: &StepSnapshot<'_>);
}

/// Observer that ignores every step.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoObserver;

impl StepObserver for NoObserver {
    fn on_step(&mut self, _snapshot: &StepSnapshot<'_>) {}
}

/// One half as seen by an observer.
#[derive(Debug, Clone, Copy)]
pub struct HalfSnapshot<'a> {
    /// Bound circulation, one per panel
    pub gamma: &'a [f64],
    /// Placed panels with collocation points and normals
    pub surface: &'a Surface,
    /// Wake after this step's convection and shedding
    pub wake: &'a Wake,
}

/// Borrowed view of the state after one step.
#[derive(Debug, Clone)]
pub struct StepSnapshot<'a> {
    /// Zero-based index of the step just completed
    pub step: usize,
    /// Non-dimensional time of the step
    pub time: f64,
    /// Per-half circulation, surface and wake
    pub halves: PerHalf<HalfSnapshot<'a>>,
}

/// Everything that persists between steps.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationState {
    /// Completed steps
    pub step: usize,
    /// Placed surfaces of the last completed step
    pub surfaces: PerHalf<Surface>,
    /// Bound circulation of the last completed step
    pub gamma: PerHalf<Vec<f64>>,
    /// Wake of every half
    pub wakes: PerHalf<Wake>,
    /// One impulse sample per completed step
    pub impulses: ImpulseHistory,
}

/// Result of a full run.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationOutput {
    /// Loads in solver units; `None` when fewer than four steps were run
    pub forces: Option<ForceHistory>,
    /// State after the last step
    pub state: SimulationState,
    /// Parameters the run used
    pub params: SolverParameters,
}

/// Time march of the tandem pair, one [`Simulation::step`] at a time.
#[derive(Debug, Clone)]
pub struct Simulation {
    params: SolverParameters,
    local: PerHalf<Surface>,
    state: SimulationState,
}

/// Fails unless the rear pitch axis sits at least half the sum of the root
/// chords behind the front one. The boundary itself passes.
pub fn check_clearance(front: &WingPlanform, rear: &WingPlanform) -> Result<()> {
    check_separation(
        [front.separation, rear.separation],
        [front.root_chord, rear.root_chord],
    )
}

/// Clearance test on (front, rear) pitch-axis stations and root chords.
pub(crate) fn check_separation(stations: [f64; 2], root_chords: [f64; 2]) -> Result<()> {
    let separation = stations[1] - stations[0];
    let clearance = 0.5 * (root_chords[0] + root_chords[1]);
    if separation < clearance {
        return Err(Error::WingInterference {
            separation,
            clearance,
        });
    }
    debug!(separation, clearance, "wing clearance ok");
    Ok(())
}

impl Simulation {
    /// Sets up a run. The wing clearance is checked before anything else.
    pub fn new(params: SolverParameters, front: &WingMesh, rear: &WingMesh) -> Result<Self> {
        check_clearance(&params.front, &params.rear)?;
        Ok(Self::with_meshes(params, front, rear))
    }

    /// Converts `config`, generates both meshes and sets up the run.
    ///
    /// Clearance is checked on the physical values, before any conversion,
    /// so a configuration exactly on the boundary is accepted.
    pub fn from_config(config: &Config) -> Result<(Self, Scales)> {
        config.check_clearance()?;
        let (params, scales) = nondimensionalize(config)?;
        let front = mesh::generate(&params.front)?;
        let rear = mesh::generate(&params.rear)?;
        Ok((Self::with_meshes(params, &front, &rear), scales))
    }

    fn with_meshes(params: SolverParameters, front: &WingMesh, rear: &WingMesh) -> Self {
        info!(
            separation = params.rear.separation - params.front.separation,
            panels = front.right.total_count() + rear.right.total_count(),
            "setting up tandem pair"
        );

        let local = PerHalf::from_fn(|half| {
            let mesh = match half.wing() {
                Wing::Front => front,
                Wing::Rear => rear,
            };
            mesh.half(half.side())
        });
        let surfaces =
            PerHalf::from_fn(|half| RigidMotion::at(&params, half, 0.0).place(&local[half]));

        let state = SimulationState {
            step: 0,
            gamma: local.map(|_, s| vec![0.0; s.total_count()]),
            wakes: local.map(|_, s| Wake::new(s.border_count)),
            surfaces,
            impulses: ImpulseHistory::new(),
        };

        Self {
            params,
            local,
            state,
        }
    }

    /// Parameters of the run.
    pub fn params(&self) -> &SolverParameters {
        &self.params
    }

    /// State after the last completed step.
    pub fn state(&self) -> &SimulationState {
        &self.state
    }

    /// True once `nstep` steps have completed.
    pub fn is_finished(&self) -> bool {
        self.state.step >= self.params.nstep
    }

    /// Advances one time step.
    pub fn step(&mut self, observer: &mut impl StepObserver) -> Result<()> {
        let n = self.state.step;
        let params = &self.params;
        let (dt, cutoff) = (params.dt, params.cutoff);
        let t = params.time(n);

        let motions = PerHalf::from_fn(|half| RigidMotion::at(params, half, t));
        let surfaces = PerHalf::from_fn(|half| motions[half].place(&self.local[half]));
        let ordered: Vec<&Surface> = surfaces.values().to_vec();

        // Right-hand side: wing motion minus what the existing wake induces
        let wake_groups: Vec<&[Filament]> =
            self.state.wakes.iter().map(|(_, w)| w.filaments()).collect();
        let wing_velocities: Vec<Vec<Vec3>> = WingHalf::ALL
            .iter()
            .map(|&half| motions[half].collocation_velocities(&self.local[half]))
            .collect();
        let wake_velocities: Vec<Vec<Vec3>> = ordered
            .iter()
            .map(|s| induced_velocities(&s.collocation, &wake_groups, cutoff))
            .collect();

        let matrix = assemble_matrix(&ordered, cutoff);
        let rhs = assemble_rhs(&ordered, &wing_velocities, &wake_velocities);
        let solution = solver::solve(&matrix, &rhs).ok_or(Error::SingularMatrix { step: n })?;
        let mut parts = SystemLayout::of(&ordered).split(&solution).into_iter();
        let gamma = PerHalf::from_fn(|_| parts.next().unwrap_or_default());

        let origin = params.body_origin(t);
        let sample = ImpulseSample {
            time: t,
            bound: PerHalf::from_fn(|half| {
                impulse::bound_impulse(&surfaces[half].rings, &gamma[half], &origin)
            }),
            wake: PerHalf::from_fn(|half| {
                impulse::wake_impulse(self.state.wakes[half].filaments(), &origin)
            }),
        };

        // All wake and shedding velocities use positions before convection
        let bound: PerHalf<Vec<Filament>> = PerHalf::from_fn(|half| {
            surfaces[half]
                .rings
                .iter()
                .zip(&gamma[half])
                .map(|(&ring, &strength)| Filament { ring, gamma: strength })
                .collect()
        });
        let groups: Vec<&[Filament]> = bound
            .values()
            .into_iter()
            .map(Vec::as_slice)
            .chain(wake_groups.iter().copied())
            .collect();
        let wake_motion = PerHalf::from_fn(|half| {
            induced_velocities(&self.state.wakes[half].corner_points(), &groups, cutoff)
        });
        let t_next = params.time(n + 1);
        let shed = PerHalf::from_fn(|half| {
            let trailing = surfaces[half].trailing_edge();
            let velocities = induced_velocities(&trailing, &groups, cutoff);
            // Placed exactly as the next step will place the wing
            let next_motion = RigidMotion::at(params, half, t_next);
            let next: Vec<Vec3> = self.local[half]
                .trailing_edge()
                .iter()
                .map(|p| next_motion.transform_point(p))
                .collect();
            wake::shed_rings(&trailing, &velocities, &next, dt)
        });

        for half in WingHalf::ALL {
            let wake = &mut self.state.wakes[half];
            wake.convect(&wake_motion[half], dt);
            let border_count = surfaces[half].border_count;
            wake.shed(&shed[half], &gamma[half][..border_count]);
        }

        let max_gamma = gamma
            .iter()
            .flat_map(|(_, g)| g.iter())
            .fold(0.0_f64, |m, g| m.max(g.abs()));
        debug!(
            step = n,
            t,
            max_gamma,
            wake = self.state.wakes.front_right.len(),
            "step complete"
        );

        self.state.impulses.push(sample);
        self.state.surfaces = surfaces;
        self.state.gamma = gamma;
        self.state.step = n + 1;

        let state = &self.state;
        observer.on_step(&StepSnapshot {
            step: n,
            time: t,
            halves: PerHalf::from_fn(|half| HalfSnapshot {
                gamma: &state.gamma[half],
                surface: &state.surfaces[half],
                wake: &state.wakes[half],
            }),
        });
        Ok(())
    }

    /// Marches all remaining steps and differentiates the impulses into loads.
    pub fn run(mut self, observer: &mut impl StepObserver) -> Result<SimulationOutput> {
        info!(nstep = self.params.nstep, dt = self.params.dt, "starting time march");
        while !self.is_finished() {
            self.step(observer)?;
        }

        let forces = self.state.impulses.forces(
            self.params.dt,
            self.params.density,
            self.params.body_velocity(),
        );
        if forces.is_none() {
            warn!("fewer than {MIN_SAMPLES} steps, no force history");
        }
        info!(steps = self.state.step, "time march finished");

        Ok(SimulationOutput {
            forces,
            state: self.state,
            params: self.params,
        })
    }
}
