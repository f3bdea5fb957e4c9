//! Vortex impulses and the forces and moments obtained by differencing them.
//!
//! For a closed vortex ring of strength Γ with straight segments, taken about
//! an origin `o`:
//!
//! ```text
//! P = Γ/2 ∮ x × dl            (linear impulse)
//! A = Γ/3 ∮ x × (x × dl)      (angular impulse)
//! ```
//!
//! Both integrals are evaluated exactly per segment. The aerodynamic loads
//! follow as `F = −ρ dP/dt` and `M = −ρ (dA/dt + V_body × P)`.

use std::iter::Sum;
use std::ops::Add;

use crate::kernel::Filament;
use crate::mesh::VortexRing;
use crate::nondim::Scales;
use crate::vector::Vec3;
use crate::wing::{PerHalf, WingHalf};

/// Fewest impulse samples the difference stencil accepts.
pub const MIN_SAMPLES: usize = 4;

/// Linear and angular impulse of a vortex system about some origin.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Impulse {
    /// Γ/2 ∮ x × dl
    pub linear: Vec3,
    /// Γ/3 ∮ x × (x × dl)
    pub angular: Vec3,
}

impl Add for Impulse {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            linear: self.linear + other.linear,
            angular: self.angular + other.angular,
        }
    }
}

impl Sum for Impulse {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), |acc, i| acc + i)
    }
}

/// Impulse of one ring about `origin`.
pub fn ring_impulse(ring: &VortexRing, gamma: f64, origin: &Vec3) -> Impulse {
    let (mut linear, mut angular) = (Vec3::zero(), Vec3::zero());
    for (start, end) in ring.segments() {
        let a = start - *origin;
        let b = end - *origin;
        let d = b - a;
        linear += a.cross(&b);

        // ∫₀¹ x × (x × d) ds for x = a + s d
        let ad = a.dot(&d);
        angular += a * (ad + 0.5 * d.magnitude_sq()) - d * (0.5 * ad + a.magnitude_sq());
    }
    Impulse {
        linear: linear * (0.5 * gamma),
        angular: angular * (gamma / 3.0),
    }
}

/// Impulse of bound rings carrying `gammas`.
pub fn bound_impulse(rings: &[VortexRing], gammas: &[f64], origin: &Vec3) -> Impulse {
    rings
        .iter()
        .zip(gammas)
        .map(|(ring, &gamma)| ring_impulse(ring, gamma, origin))
        .sum()
}

/// Impulse of every wake ring about `origin`.
pub fn wake_impulse(filaments: &[Filament], origin: &Vec3) -> Impulse {
    filaments
        .iter()
        .map(|f| ring_impulse(&f.ring, f.gamma, origin))
        .sum()
}

/// Impulses of every half at one step, bound and wake kept apart.
#[derive(Debug, Clone, PartialEq)]
pub struct ImpulseSample {
    /// Non-dimensional time of the step
    pub time: f64,
    /// Impulse of the bound rings
    pub bound: PerHalf<Impulse>,
    /// Impulse of the wake before this step's shedding
    pub wake: PerHalf<Impulse>,
}

impl ImpulseSample {
    /// Bound plus wake impulse of `half`.
    pub fn total(&self, half: WingHalf) -> Impulse {
        self.bound[half] + self.wake[half]
    }
}

/// Aerodynamic force and moment on a body.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Loads {
    /// Force on the fluid-body system
    pub force: Vec3,
    /// Moment about the body origin
    pub moment: Vec3,
}

impl Loads {
    /// Converts solver units to newtons and newton-metres.
    pub fn scaled(&self, scales: &Scales) -> Self {
        Self {
            force: self.force * scales.force(),
            moment: self.moment * scales.moment(),
        }
    }
}

impl Add for Loads {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            force: self.force + other.force,
            moment: self.moment + other.moment,
        }
    }
}

impl Sum for Loads {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), |acc, l| acc + l)
    }
}

/// Load time series per half and for the whole tandem pair.
#[derive(Debug, Clone, PartialEq)]
pub struct ForceHistory {
    /// Sample times
    pub time: Vec<f64>,
    /// Loads per half, one per sample
    pub halves: PerHalf<Vec<Loads>>,
    /// Sum over the four halves
    pub total: Vec<Loads>,
}

impl ForceHistory {
    /// Number of samples.
    pub fn len(&self) -> usize {
        self.time.len()
    }

    /// True when no sample is stored.
    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    /// The same history in seconds, newtons and newton-metres.
    pub fn to_dimensional(&self, scales: &Scales) -> Self {
        let convert =
            |loads: &Vec<Loads>| -> Vec<Loads> { loads.iter().map(|l| l.scaled(scales)).collect() };
        Self {
            time: self.time.iter().map(|t| t * scales.time).collect(),
            halves: self.halves.map(|_, loads| convert(loads)),
            total: convert(&self.total),
        }
    }
}

/// Impulse samples of a run, one per completed step.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImpulseHistory {
    samples: Vec<ImpulseSample>,
}

impl ImpulseHistory {
    /// An empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends the sample of the step just solved.
    pub fn push(&mut self, sample: ImpulseSample) {
        self.samples.push(sample);
    }

    /// Number of recorded steps.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// True before the first step.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Differentiates the history into loads; `None` below [`MIN_SAMPLES`].
    ///
    /// `dt` is the (uniform) sample spacing and `body_velocity` the velocity of
    /// the moving origin the impulses were taken about.
    pub fn forces(&self, dt: f64, density: f64, body_velocity: Vec3) -> Option<ForceHistory> {
        if self.samples.len() < MIN_SAMPLES {
            return None;
        }

        let halves = PerHalf::from_fn(|half| {
            let totals: Vec<Impulse> = self.samples.iter().map(|s| s.total(half)).collect();
            let linear: Vec<Vec3> = totals.iter().map(|i| i.linear).collect();
            let angular: Vec<Vec3> = totals.iter().map(|i| i.angular).collect();
            let d_linear = derivative(&linear, dt);
            let d_angular = derivative(&angular, dt);

            (0..totals.len())
                .map(|i| Loads {
                    force: d_linear[i] * -density,
                    moment: (d_angular[i] + body_velocity.cross(&linear[i])) * -density,
                })
                .collect::<Vec<_>>()
        });

        let total = (0..self.samples.len())
            .map(|i| halves.values().into_iter().map(|loads| loads[i]).sum::<Loads>())
            .collect();

        Some(ForceHistory {
            time: self.samples.iter().map(|s| s.time).collect(),
            halves,
            total,
        })
    }
}

/// Time derivative of uniformly spaced samples, second order everywhere:
/// central differences inside, three-point one-sided differences at the ends.
///
/// Needs at least three samples.
pub fn derivative(values: &[Vec3], dt: f64) -> Vec<Vec3> {
    let n = values.len();
    debug_assert!(n >= 3);
    let inv = 0.5 / dt;

    (0..n)
        .map(|i| {
            if i == 0 {
                // Forward
                (values[1] * 4.0 - values[0] * 3.0 - values[2]) * inv
            } else if i == n - 1 {
                // Backward
                (values[n - 1] * 3.0 - values[n - 2] * 4.0 + values[n - 3]) * inv
            } else {
                (values[i + 1] - values[i - 1]) * inv
            }
        })
        .collect()
}
