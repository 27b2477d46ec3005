//! Spring interpolation toward a target transform.
//!
//! Each channel (pan x, pan y, zoom) is a damped harmonic oscillator
//! integrated in fixed 1 ms substeps, so the result does not depend on the
//! frame rate that drives [`TransformAnimation::step`].

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::geometry::{Transform, Vector};

/// Physical spring parameters. Defaults match a gentle, non-bouncy settle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpringConfig {
    pub tension: f32,
    pub friction: f32,
    pub mass: f32,
}

impl Default for SpringConfig {
    fn default() -> Self {
        Self {
            tension: 170.0,
            friction: 26.0,
            mass: 1.0,
        }
    }
}

const STEP_MS: f32 = 1.0;
/// Bounds the work done for one very late frame.
const MAX_STEPS_PER_FRAME: u32 = 1_000;
/// Hard stop for pathological spring settings that never come to rest.
const MAX_DURATION: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq)]
struct Channel {
    position: f32,
    /// Units per millisecond.
    velocity: f32,
    target: f32,
    precision: f32,
}

impl Channel {
    fn new(position: f32, velocity: f32, target: f32) -> Self {
        Self {
            position,
            velocity,
            target,
            precision: Self::precision_for(position, target),
        }
    }

    fn precision_for(from: f32, to: f32) -> f32 {
        ((to - from).abs().min(1.0) * 1e-3).max(1e-4 * to.abs().max(1.0))
    }

    fn retarget(&mut self, target: f32) {
        self.precision = Self::precision_for(self.position, target);
        self.target = target;
    }

    fn at_rest(&self) -> bool {
        self.velocity.abs() <= self.precision && (self.target - self.position).abs() <= self.precision
    }

    fn advance(&mut self, spring: &SpringConfig) {
        if self.at_rest() {
            self.position = self.target;
            self.velocity = 0.0;
            return;
        }
        let spring_force = -spring.tension * 1e-6 * (self.position - self.target);
        let damping_force = -spring.friction * 1e-3 * self.velocity;
        let acceleration = (spring_force + damping_force) / spring.mass;
        self.velocity += acceleration * STEP_MS;
        self.position += self.velocity * STEP_MS;
    }
}

/// A cancellable interpolation from the current transform to a target.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformAnimation {
    x: Channel,
    y: Channel,
    zoom: Channel,
    spring: SpringConfig,
    elapsed: Duration,
}

impl TransformAnimation {
    pub fn new(from: Transform, to: Transform, spring: SpringConfig) -> Self {
        Self {
            x: Channel::new(from.pan.x, 0.0, to.pan.x),
            y: Channel::new(from.pan.y, 0.0, to.pan.y),
            zoom: Channel::new(from.zoom, 0.0, to.zoom),
            spring,
            elapsed: Duration::ZERO,
        }
    }

    /// Replace the goal, keeping the current position and velocity.
    pub fn retarget(&mut self, to: Transform) {
        self.x.retarget(to.pan.x);
        self.y.retarget(to.pan.y);
        self.zoom.retarget(to.zoom);
        self.elapsed = Duration::ZERO;
    }

    pub fn target(&self) -> Transform {
        Transform::new(Vector::new(self.x.target, self.y.target), self.zoom.target)
    }

    pub fn current(&self) -> Transform {
        Transform::new(Vector::new(self.x.position, self.y.position), self.zoom.position)
    }

    pub fn is_finished(&self) -> bool {
        self.channels().iter().all(|channel| {
            channel.velocity == 0.0 && channel.position == channel.target
        })
    }

    /// Advance by `elapsed` and return the interpolated transform. Snaps
    /// exactly onto the target once every channel comes to rest.
    pub fn step(&mut self, elapsed: Duration) -> Transform {
        let millis = elapsed.as_secs_f32() * 1_000.0;
        let steps = ((millis / STEP_MS).ceil() as u32).clamp(1, MAX_STEPS_PER_FRAME);
        let spring = self.spring;
        self.elapsed += elapsed;

        for _ in 0..steps {
            if self.channels().iter().all(|channel| channel.at_rest()) {
                break;
            }
            for channel in self.channels_mut() {
                channel.advance(&spring);
            }
        }

        let timed_out = self.elapsed >= MAX_DURATION;
        if timed_out || self.channels().iter().all(|channel| channel.at_rest()) {
            for channel in self.channels_mut() {
                channel.position = channel.target;
                channel.velocity = 0.0;
            }
        }
        self.current()
    }

    fn channels(&self) -> [&Channel; 3] {
        [&self.x, &self.y, &self.zoom]
    }

    fn channels_mut(&mut self) -> [&mut Channel; 3] {
        [&mut self.x, &mut self.y, &mut self.zoom]
    }
}
