//! Spray tool: a timer that scatters single-pixel dots around the pointer.

use crate::config::SprayConfig;
use crate::drag::{DragHandler, Instant};
use crate::surface::Surface;
use kurbo::{Point, Vec2};
use std::f64::consts::PI;
use std::time::Duration;

/// Source of uniform random numbers in `[0, 1)`.
pub trait RandomSource {
    fn next_f64(&mut self) -> f64;
}

/// Simple seeded random number generator (xorshift32).
#[derive(Debug, Clone)]
pub struct SprayRng {
    state: u32,
}

impl SprayRng {
    pub fn new(seed: u32) -> Self {
        Self { state: seed.max(1) }
    }

    /// A generator seeded differently on every call.
    pub fn from_counter() -> Self {
        Self::new(next_seed())
    }

    fn next_u32(&mut self) -> u32 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.state = x;
        x
    }
}

impl RandomSource for SprayRng {
    fn next_f64(&mut self) -> f64 {
        self.next_u32() as f64 / (u32::MAX as f64 + 1.0)
    }
}

/// Counter + splitmix32 mixing so successive sprays get unrelated seeds.
fn next_seed() -> u32 {
    use std::sync::atomic::{AtomicU32, Ordering};

    static SEED_COUNTER: AtomicU32 = AtomicU32::new(1);

    let counter = SEED_COUNTER.fetch_add(1, Ordering::Relaxed);
    let mut x = counter.wrapping_mul(0x9E3779B9);
    x ^= x >> 16;
    x = x.wrapping_mul(0x85EBCA6B);
    x ^= x >> 13;
    x = x.wrapping_mul(0xC2B2AE35);
    x ^= x >> 16;
    x
}

/// A uniformly distributed offset inside a disc of `radius`.
///
/// Samples the unit square until a point lands inside the unit circle.
pub fn random_point_in_radius(rng: &mut impl RandomSource, radius: f64) -> Vec2 {
    loop {
        let x = rng.next_f64() * 2.0 - 1.0;
        let y = rng.next_f64() * 2.0 - 1.0;
        if x * x + y * y <= 1.0 {
            return Vec2::new(x * radius, y * radius);
        }
    }
}

/// Dots emitted per tick for a brush of `line_width`.
pub fn dots_per_tick(line_width: f64, area_per_dot: f64) -> usize {
    let radius = line_width / 2.0;
    let area = radius * radius * PI;
    (area / area_per_dot).ceil().max(0.0) as usize
}

/// Periodic spray job bound to a drag session.
#[derive(Debug, Clone)]
pub struct SprayJob<R = SprayRng> {
    pos: Point,
    radius: f64,
    dots_per_tick: usize,
    interval: Duration,
    next_tick: Instant,
    max_catch_up: u32,
    ticks: u64,
    stopped: bool,
    rng: R,
}

impl<R: RandomSource> SprayJob<R> {
    /// Start spraying at `pos`. The first tick is due one interval after `now`.
    pub fn new(surface: &Surface, pos: Point, now: Instant, config: &SprayConfig, rng: R) -> Self {
        let line_width = surface.state.line_width;
        let interval = Duration::from_millis(config.interval_ms.max(1));
        Self {
            pos,
            radius: line_width / 2.0,
            dots_per_tick: dots_per_tick(line_width, config.area_per_dot),
            interval,
            next_tick: now + interval,
            max_catch_up: config.max_catch_up_ticks.max(1),
            ticks: 0,
            stopped: false,
            rng,
        }
    }

    pub fn dots_per_tick(&self) -> usize {
        self.dots_per_tick
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// Fire every tick that has come due by `now`, up to the catch-up limit.
    ///
    /// Returns the number of ticks fired.
    pub fn advance(&mut self, surface: &mut Surface, now: Instant) -> u32 {
        if self.stopped {
            return 0;
        }
        let mut fired = 0;
        while now >= self.next_tick && fired < self.max_catch_up {
            self.spray_once(surface);
            self.next_tick += self.interval;
            fired += 1;
        }
        if now >= self.next_tick {
            // Drop the remaining backlog rather than bursting later.
            log::debug!("Spray fell behind, skipping backlog");
            self.next_tick = now + self.interval;
        }
        fired
    }

    /// Stop the job; no tick fires afterwards.
    pub fn stop(&mut self) {
        self.stopped = true;
    }

    fn spray_once(&mut self, surface: &mut Surface) {
        for _ in 0..self.dots_per_tick {
            let offset = random_point_in_radius(&mut self.rng, self.radius);
            surface.fill_rect(self.pos.x + offset.x, self.pos.y + offset.y, 1.0, 1.0);
        }
        self.ticks += 1;
    }
}

impl<R: RandomSource> DragHandler for SprayJob<R> {
    fn name(&self) -> &'static str {
        "spray"
    }

    fn on_move(&mut self, _surface: &mut Surface, pos: Point) {
        self.pos = pos;
    }

    fn on_end(&mut self, _surface: &mut Surface, _pos: Option<Point>) {
        self.stop();
        log::debug!("Spray stopped after {} ticks", self.ticks);
    }

    fn tick(&mut self, surface: &mut Surface, now: Instant) -> bool {
        self.advance(surface, now) > 0
    }
}
