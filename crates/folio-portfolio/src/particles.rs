#![forbid(unsafe_code)]

//! Particle Field Simulator.
//!
//! A fixed set of [`PARTICLE_COUNT`] particles drifting inside the viewport.
//! Each tick moves every particle by its velocity, then inverts the velocity
//! component of any axis on which the particle is now outside `[0, bound]`.
//! Reflection happens after the move, so a particle may overshoot a boundary
//! by up to one step before turning back.
//!
//! The field is created on mount and dropped on unmount; the owning model
//! stops declaring the frame subscription at the same time. A resize only
//! replaces the bounds: particles keep their positions and drift back on
//! their own.

use folio_core::geometry::Rect;
use folio_render::buffer::Buffer;
use folio_render::cell::{Cell, PackedRgba};

pub const PARTICLE_COUNT: usize = 50;

/// Opacity particles are drawn with over the panel background.
pub const PARTICLE_OPACITY: f32 = 0.3;

pub const MIN_RADIUS: f32 = 1.0;
pub const MAX_RADIUS: f32 = 4.0;

/// Largest per-axis speed, in cells per tick.
pub const MAX_SPEED: f32 = 0.25;

pub const PARTICLE_COLORS: [PackedRgba; 4] = [
    PackedRgba::rgb(0x8b, 0x5c, 0xf6),
    PackedRgba::rgb(0xec, 0x48, 0x99),
    PackedRgba::rgb(0x06, 0xb6, 0xd4),
    PackedRgba::rgb(0x22, 0xc5, 0x5e),
];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub radius: f32,
    /// Index into [`PARTICLE_COLORS`].
    pub color: usize,
}

impl Particle {
    pub fn glyph(&self) -> char {
        if self.radius < 2.0 {
            '·'
        } else if self.radius < 3.0 {
            '•'
        } else {
            '●'
        }
    }

    pub fn color(&self) -> PackedRgba {
        PARTICLE_COLORS[self.color % PARTICLE_COLORS.len()]
    }

    fn step(&mut self, width: f32, height: f32) {
        self.x += self.vx;
        self.y += self.vy;
        if self.x < 0.0 || self.x > width {
            self.vx = -self.vx;
        }
        if self.y < 0.0 || self.y > height {
            self.vy = -self.vy;
        }
    }
}

/// Deterministic LCG so a seed reproduces the same field.
#[derive(Debug, Clone)]
struct SeededRng {
    state: u64,
}

impl SeededRng {
    fn new(seed: u64) -> Self {
        Self {
            state: seed.wrapping_add(1),
        }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        self.state
    }

    /// Uniform in `[0, 1)`.
    fn next_f32(&mut self) -> f32 {
        (self.next_u64() >> 40) as f32 / (1u64 << 24) as f32
    }

    fn next_index(&mut self, len: usize) -> usize {
        ((self.next_u64() >> 33) % len as u64) as usize
    }
}

#[derive(Debug, Clone)]
pub struct ParticleField {
    particles: Vec<Particle>,
    width: f32,
    height: f32,
    ticks: u64,
}

impl ParticleField {
    /// Allocate the particle set inside a `width` x `height` viewport.
    ///
    /// Returns `None` when the viewport has no area; nothing is started.
    pub fn mount(width: u16, height: u16, seed: u64) -> Option<Self> {
        if width == 0 || height == 0 {
            tracing::debug!(target: "folio.particles", "no surface, field not started");
            return None;
        }
        let (w, h) = (f32::from(width), f32::from(height));
        let mut rng = SeededRng::new(seed);
        let particles = (0..PARTICLE_COUNT)
            .map(|_| Particle {
                x: rng.next_f32() * w,
                y: rng.next_f32() * h,
                radius: MIN_RADIUS + rng.next_f32() * (MAX_RADIUS - MIN_RADIUS),
                vx: (rng.next_f32() - 0.5) * 2.0 * MAX_SPEED,
                vy: (rng.next_f32() - 0.5) * 2.0 * MAX_SPEED,
                color: rng.next_index(PARTICLE_COLORS.len()),
            })
            .collect();
        tracing::debug!(target: "folio.particles", width, height, seed, "field mounted");
        Some(Self {
            particles,
            width: w,
            height: h,
            ticks: 0,
        })
    }

    /// A field with explicit particles, for driving the integrator directly.
    pub fn with_particles(width: f32, height: f32, particles: Vec<Particle>) -> Self {
        Self {
            particles,
            width,
            height,
            ticks: 0,
        }
    }

    /// Advance every particle by one step.
    pub fn tick(&mut self) {
        let (w, h) = (self.width, self.height);
        for particle in &mut self.particles {
            particle.step(w, h);
        }
        self.ticks += 1;
    }

    /// Replace the bounds. Positions are not rescaled.
    pub fn resize(&mut self, width: u16, height: u16) {
        self.width = f32::from(width);
        self.height = f32::from(height);
    }

    pub fn bounds(&self) -> (f32, f32) {
        (self.width, self.height)
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Draw the current positions into `area`. Particles outside it are skipped.
    ///
    /// Only the glyph and a translucent foreground are written; backgrounds
    /// underneath are kept.
    pub fn render(&self, buf: &mut Buffer, area: Rect) {
        if area.is_empty() {
            return;
        }
        buf.push_scissor(area);
        buf.push_opacity(PARTICLE_OPACITY);
        for particle in &self.particles {
            if particle.x < 0.0 || particle.y < 0.0 {
                continue;
            }
            let (cx, cy) = (particle.x as u16, particle.y as u16);
            if cx >= area.width || cy >= area.height {
                continue;
            }
            let cell = Cell::from_char(particle.glyph()).with_fg(particle.color());
            buf.set(area.x + cx, area.y + cy, cell);
        }
        buf.pop_opacity();
        buf.pop_scissor();
    }
}
