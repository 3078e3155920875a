//! Turns a pointer drag into a swipe decision.
//!
//! A drag is a sequence of [`GestureEvent::Move`] samples followed by one
//! [`GestureEvent::Release`]. Moves only produce a follow transform; the
//! release is classified against the distance and velocity thresholds of
//! [`SwipeConfig`]. After the release every further event is ignored, so a
//! drag yields at most one decision.

use crate::config::SwipeConfig;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

impl Direction {
    /// Unit vector in screen coordinates (y grows downwards).
    pub fn unit(self) -> (f64, f64) {
        match self {
            Direction::Left => (-1.0, 0.0),
            Direction::Right => (1.0, 0.0),
            Direction::Up => (0.0, -1.0),
            Direction::Down => (0.0, 1.0),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Left => "left",
            Direction::Right => "right",
            Direction::Up => "up",
            Direction::Down => "down",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Offset {
    pub dx: f64,
    pub dy: f64,
}

impl Offset {
    pub const ZERO: Offset = Offset { dx: 0.0, dy: 0.0 };

    pub fn new(dx: f64, dy: f64) -> Self {
        Self { dx, dy }
    }

    pub fn length(self) -> f64 {
        self.dx.hypot(self.dy)
    }

    fn is_finite(self) -> bool {
        self.dx.is_finite() && self.dy.is_finite()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Velocity {
    pub vx: f64,
    pub vy: f64,
}

impl Velocity {
    pub fn new(vx: f64, vy: f64) -> Self {
        Self { vx, vy }
    }

    /// Magnitude in units per millisecond. Non-finite components count as 0.
    pub fn speed(self) -> f64 {
        let speed = self.vx.hypot(self.vy);
        if speed.is_finite() {
            speed
        } else {
            0.0
        }
    }
}

/// Visual transform for a card: translation, rotation in degrees, opacity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub x: f64,
    pub y: f64,
    pub rotation: f64,
    pub opacity: f64,
}

impl Transform {
    pub const ORIGIN: Transform = Transform {
        x: 0.0,
        y: 0.0,
        rotation: 0.0,
        opacity: 1.0,
    };

    pub fn css_transform(&self) -> String {
        format!(
            "translate({:.1}px, {:.1}px) rotate({:.2}deg)",
            self.x, self.y, self.rotation
        )
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::ORIGIN
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureEvent {
    Move { offset: Offset, timestamp: f64 },
    Release {
        offset: Offset,
        velocity: Option<Velocity>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureOutput {
    /// The card follows the pointer.
    Follow(Transform),
    /// The drag qualified as a swipe; the card leaves along `exit`.
    Swipe { direction: Direction, exit: Transform },
    /// The drag did not qualify; the card springs back.
    ReturnToOrigin,
    /// The drag was already released.
    Ignored,
}

/// Classifies a release. `None` means the card should return to origin.
pub fn classify_release(
    offset: Offset,
    velocity: Option<Velocity>,
    config: &SwipeConfig,
) -> Option<Direction> {
    if !offset.is_finite() {
        return None;
    }

    let speed = velocity.map(Velocity::speed).unwrap_or(0.0);
    let is_swipe = offset.dx.abs() > config.distance_threshold
        || offset.dy.abs() > config.distance_threshold
        || speed > config.velocity_threshold;

    if !is_swipe {
        return None;
    }

    // A pure flick with no displacement takes its direction from the velocity.
    let axis = match velocity {
        Some(v) if offset == Offset::ZERO && v.speed() > 0.0 => Offset::new(v.vx, v.vy),
        _ => offset,
    };

    Some(dominant_direction(axis))
}

fn dominant_direction(axis: Offset) -> Direction {
    if axis.dx.abs() > axis.dy.abs() {
        if axis.dx > 0.0 {
            Direction::Right
        } else {
            Direction::Left
        }
    } else if axis.dy > 0.0 {
        Direction::Down
    } else {
        Direction::Up
    }
}

pub fn follow_transform(offset: Offset, config: &SwipeConfig) -> Transform {
    Transform {
        x: offset.dx,
        y: offset.dy,
        rotation: offset.dx * config.rotation_factor,
        opacity: 1.0,
    }
}

/// Off-screen target for a card leaving in `direction`.
///
/// The card keeps travelling along its final offset, stretched to at least
/// `exit_distance`. A zero offset falls back to the direction's unit vector.
pub fn exit_transform(offset: Offset, direction: Direction, config: &SwipeConfig) -> Transform {
    let length = offset.length();
    let (x, y) = if length > f64::EPSILON && length.is_finite() {
        let scale = (config.exit_distance / length).max(1.0);
        (offset.dx * scale, offset.dy * scale)
    } else {
        let (ux, uy) = direction.unit();
        (ux * config.exit_distance, uy * config.exit_distance)
    };

    Transform {
        x,
        y,
        rotation: x * config.rotation_factor,
        opacity: 0.0,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// Tracking state for one drag on the active card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DragState {
    pub pointer_id: i32,
    pub card_id: String,
    pub start: Point,
    pub offset: Offset,
    velocity: Option<Velocity>,
    last_sample: Option<(Offset, f64)>,
    finalized: bool,
}

impl DragState {
    pub fn begin(
        pointer_id: i32,
        card_id: impl Into<String>,
        x: f64,
        y: f64,
        timestamp: f64,
    ) -> Self {
        Self {
            pointer_id,
            card_id: card_id.into(),
            start: Point { x, y },
            offset: Offset::ZERO,
            velocity: None,
            last_sample: timestamp.is_finite().then_some((Offset::ZERO, timestamp)),
            finalized: false,
        }
    }

    /// Offset of a client position from the drag start.
    pub fn offset_to(&self, x: f64, y: f64) -> Offset {
        Offset::new(x - self.start.x, y - self.start.y)
    }

    pub fn velocity(&self) -> Option<Velocity> {
        self.velocity
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    pub fn handle(&mut self, event: GestureEvent, config: &SwipeConfig) -> GestureOutput {
        if self.finalized {
            return GestureOutput::Ignored;
        }

        match event {
            GestureEvent::Move { offset, timestamp } => {
                self.sample(offset, timestamp, config.velocity_time_constant_ms);
                GestureOutput::Follow(follow_transform(self.offset, config))
            }
            GestureEvent::Release { offset, velocity } => {
                self.finalized = true;
                match classify_release(offset, velocity, config) {
                    Some(direction) => {
                        self.offset = offset;
                        GestureOutput::Swipe {
                            direction,
                            exit: exit_transform(offset, direction, config),
                        }
                    }
                    None => {
                        self.offset = Offset::ZERO;
                        self.velocity = None;
                        GestureOutput::ReturnToOrigin
                    }
                }
            }
        }
    }

    /// Exponentially smoothed velocity. The weight of the newest sample
    /// grows with the time since the previous one, so a pause longer than a
    /// few time constants leaves only the (near zero) velocity of the pause.
    fn sample(&mut self, offset: Offset, timestamp: f64, time_constant_ms: f64) {
        if !offset.is_finite() {
            return;
        }

        if let Some((previous, previous_time)) = self.last_sample {
            let dt = timestamp - previous_time;
            if dt > 0.0 && dt.is_finite() {
                let instant = Velocity::new(
                    (offset.dx - previous.dx) / dt,
                    (offset.dy - previous.dy) / dt,
                );
                let smoothing = 1.0 - (-dt / time_constant_ms.max(f64::EPSILON)).exp();
                self.velocity = Some(match self.velocity {
                    Some(current) => Velocity::new(
                        smoothing * instant.vx + (1.0 - smoothing) * current.vx,
                        smoothing * instant.vy + (1.0 - smoothing) * current.vy,
                    ),
                    None => instant,
                });
            }
        }

        if timestamp.is_finite() {
            self.last_sample = Some((offset, timestamp));
        }
        self.offset = offset;
    }
}
