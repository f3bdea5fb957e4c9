//! Wing-half identity and the per-half container used as the indexing key everywhere.
//!
//! The order of [`WingHalf::ALL`] is the one ordering contract of the solver:
//! influence-matrix blocks, the circulation vector, wake shedding and all
//! outputs follow it.

use std::fmt;
use std::ops::{Index, IndexMut};

use serde::{Deserialize, Serialize};

/// Front or rear wing of the tandem pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Wing {
    /// Leading wing
    Front,
    /// Trailing wing
    Rear,
}

/// Right (y ≥ 0 in the wing-local frame) or left half of a wing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    /// Half on +y
    Right,
    /// Half on -y
    Left,
}

impl Side {
    /// Sign applied to the sweep angle; the left half mirrors the right.
    pub const fn sweep_sign(self) -> f64 {
        match self {
            Side::Right => 1.0,
            Side::Left => -1.0,
        }
    }
}

/// One of the four lifting surfaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WingHalf {
    /// Right half of the front wing
    FrontRight,
    /// Left half of the front wing
    FrontLeft,
    /// Right half of the rear wing
    RearRight,
    /// Left half of the rear wing
    RearLeft,
}

impl WingHalf {
    /// Every half, in assembly and output order.
    pub const ALL: [WingHalf; 4] = [
        WingHalf::FrontRight,
        WingHalf::FrontLeft,
        WingHalf::RearRight,
        WingHalf::RearLeft,
    ];

    /// Wing this half belongs to.
    pub const fn wing(self) -> Wing {
        match self {
            WingHalf::FrontRight | WingHalf::FrontLeft => Wing::Front,
            WingHalf::RearRight | WingHalf::RearLeft => Wing::Rear,
        }
    }

    /// Side this half lies on.
    pub const fn side(self) -> Side {
        match self {
            WingHalf::FrontRight | WingHalf::RearRight => Side::Right,
            WingHalf::FrontLeft | WingHalf::RearLeft => Side::Left,
        }
    }

    /// Position in [`WingHalf::ALL`].
    pub const fn index(self) -> usize {
        match self {
            WingHalf::FrontRight => 0,
            WingHalf::FrontLeft => 1,
            WingHalf::RearRight => 2,
            WingHalf::RearLeft => 3,
        }
    }

    /// Short label used in file names and tables.
    pub const fn label(self) -> &'static str {
        match self {
            WingHalf::FrontRight => "fr",
            WingHalf::FrontLeft => "fl",
            WingHalf::RearRight => "rr",
            WingHalf::RearLeft => "rl",
        }
    }
}

impl fmt::Display for WingHalf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WingHalf::FrontRight => "front-right",
            WingHalf::FrontLeft => "front-left",
            WingHalf::RearRight => "rear-right",
            WingHalf::RearLeft => "rear-left",
        };
        f.write_str(name)
    }
}

/// One value per wing-half, addressed by [`WingHalf`] rather than by offset.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PerHalf<T> {
    /// Value of the front-right half
    pub front_right: T,
    /// Value of the front-left half
    pub front_left: T,
    /// Value of the rear-right half
    pub rear_right: T,
    /// Value of the rear-left half
    pub rear_left: T,
}

impl<T> PerHalf<T> {
    /// Builds a value for every half, calling `f` in [`WingHalf::ALL`] order.
    pub fn from_fn(mut f: impl FnMut(WingHalf) -> T) -> Self {
        Self {
            front_right: f(WingHalf::FrontRight),
            front_left: f(WingHalf::FrontLeft),
            rear_right: f(WingHalf::RearRight),
            rear_left: f(WingHalf::RearLeft),
        }
    }

    /// Builds a new container from every half and its value.
    pub fn map<U>(&self, mut f: impl FnMut(WingHalf, &T) -> U) -> PerHalf<U> {
        PerHalf::from_fn(|half| f(half, &self[half]))
    }

    /// Iterates `(half, value)` pairs in [`WingHalf::ALL`] order.
    pub fn iter(&self) -> impl Iterator<Item = (WingHalf, &T)> {
        WingHalf::ALL.into_iter().map(move |half| (half, &self[half]))
    }

    /// Values in [`WingHalf::ALL`] order.
    pub fn values(&self) -> [&T; 4] {
        [
            &self.front_right,
            &self.front_left,
            &self.rear_right,
            &self.rear_left,
        ]
    }
}

impl<T> Index<WingHalf> for PerHalf<T> {
    type Output = T;

    fn index(&self, half: WingHalf) -> &T {
        match half {
            WingHalf::FrontRight => &self.front_right,
            WingHalf::FrontLeft => &self.front_left,
            WingHalf::RearRight => &self.rear_right,
            WingHalf::RearLeft => &self.rear_left,
        }
    }
}

impl<T> IndexMut<WingHalf> for PerHalf<T> {
    fn index_mut(&mut self, half: WingHalf) -> &mut T {
        match half {
            WingHalf::FrontRight => &mut self.front_right,
            WingHalf::FrontLeft => &mut self.front_left,
            WingHalf::RearRight => &mut self.rear_right,
            WingHalf::RearLeft => &mut self.rear_left,
        }
    }
}
