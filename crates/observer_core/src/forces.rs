//! Force solver: one simulation step of velocities, positions and
//! observer-specific particle state.

use crate::config::{PhysicsConfig, Surface};
use crate::modes::{ModeDescriptor, ObserverMode};
use crate::population::AMBIENT_TEMPERATURE;
use crate::spatial_hash::SpatialHash;
use observer_data::Particle;
use rand::Rng;

/// Probability per particle per playing tick of a conscious-mode surprise kick.
pub const SURPRISE_CHANCE: f64 = 0.05;
/// Half-width of the uniform velocity kick applied on a surprise.
pub const SURPRISE_KICK: f64 = 2.5;

/// Everything a step reads besides the particles themselves.
pub struct StepContext<'a> {
    pub descriptor: &'a ModeDescriptor,
    pub physics: &'a PhysicsConfig,
    pub surface: Surface,
    pub evolution_speed: f64,
    pub playing: bool,
}

/// Advances the population by one tick.
///
/// While playing, pairwise repulsion, thermal noise, damping and the speed
/// cap are applied before integration. Integration and the mode-specific
/// updates run whether or not the simulation is playing, so pausing freezes
/// forces but not motion.
pub fn step<R: Rng>(
    particles: &mut [Particle],
    ctx: &StepContext,
    grid: &mut SpatialHash,
    rng: &mut R,
) {
    if particles.is_empty() {
        return;
    }
    if ctx.playing {
        apply_forces(particles, ctx, grid, rng);
    }
    for p in particles.iter_mut() {
        integrate(p, ctx.surface);
    }
    apply_mode_rules(particles, ctx, rng);
}

/// Repulsion within half the connection distance, plus noise, damping and cap.
pub fn apply_forces<R: Rng>(
    particles: &mut [Particle],
    ctx: &StepContext,
    grid: &mut SpatialHash,
    rng: &mut R,
) {
    let radius = ctx.descriptor.force_radius();
    let positions: Vec<(f64, f64)> = particles.iter().map(|p| (p.x, p.y)).collect();
    grid.cell_size = radius;
    grid.build(&positions);

    let strength = ctx.physics.force_strength * ctx.evolution_speed;
    let noise = ctx.physics.thermal_noise * ctx.evolution_speed;

    for (i, p) in particles.iter_mut().enumerate() {
        let (px, py) = positions[i];
        let mut fx = 0.0;
        let mut fy = 0.0;
        grid.query_callback(px, py, |j| {
            if j == i {
                return;
            }
            let dx = px - positions[j].0;
            let dy = py - positions[j].1;
            let dist = (dx * dx + dy * dy).sqrt();
            if dist > 0.0 && dist < radius {
                let force = strength / (dist + 1.0);
                fx += dx / dist * force;
                fy += dy / dist * force;
            }
        });

        if noise > 0.0 {
            fx += rng.gen_range(-noise..=noise);
            fy += rng.gen_range(-noise..=noise);
        }

        p.vx = (p.vx + fx) * ctx.physics.damping;
        p.vy = (p.vy + fy) * ctx.physics.damping;
        p.cap_speed(ctx.physics.max_speed);
    }
}

/// Moves one particle by its velocity with elastic walls.
#[inline]
pub fn integrate(p: &mut Particle, surface: Surface) {
    p.x += p.vx;
    p.y += p.vy;

    if p.x < 0.0 || p.x > surface.width {
        p.vx = -p.vx;
    }
    if p.y < 0.0 || p.y > surface.height {
        p.vy = -p.vy;
    }

    p.x = p.x.clamp(0.0, surface.width);
    p.y = p.y.clamp(0.0, surface.height);
}

fn apply_mode_rules<R: Rng>(particles: &mut [Particle], ctx: &StepContext, rng: &mut R) {
    match ctx.descriptor.mode {
        ObserverMode::Classical => {
            for p in particles.iter_mut() {
                p.trail.push(p.x, p.y);
            }
        }
        ObserverMode::Conscious => {
            for p in particles.iter_mut() {
                update_prediction(p);
                if ctx.playing && rng.gen_bool(SURPRISE_CHANCE) {
                    p.vx += rng.gen_range(-SURPRISE_KICK..=SURPRISE_KICK);
                    p.vy += rng.gen_range(-SURPRISE_KICK..=SURPRISE_KICK);
                }
            }
        }
        ObserverMode::Thermodynamic => {
            for p in particles.iter_mut() {
                update_temperature(p);
            }
        }
        ObserverMode::Relativistic => {
            let c = ctx.descriptor.speed_of_light.unwrap_or(ctx.physics.max_speed);
            let limit = c * ctx.physics.speed_of_light_margin;
            for p in particles.iter_mut() {
                update_relativistic(p, c, limit);
            }
        }
        ObserverMode::Probabilistic => {
            for p in particles.iter_mut() {
                update_belief(p);
            }
        }
        ObserverMode::Quantum | ObserverMode::Social | ObserverMode::Ai => {}
    }
}

/// Scores the last prediction against the new position and predicts the next one.
pub fn update_prediction(p: &mut Particle) {
    let dx = p.prediction.predicted_x - p.x;
    let dy = p.prediction.predicted_y - p.y;
    let error = (dx * dx + dy * dy).sqrt();
    p.prediction.error = error * 0.7 + p.prediction.error * 0.3;
    p.prediction.predicted_x = p.x + p.vx;
    p.prediction.predicted_y = p.y + p.vy;
}

/// Motion heats the particle, then it relaxes toward ambient.
pub fn update_temperature(p: &mut Particle) {
    let speed = p.speed();
    if let Some(thermal) = p.thermal.as_mut() {
        let heated = 0.99 * thermal.temperature + 10.0 * speed;
        thermal.temperature = 0.98 * heated + 0.02 * AMBIENT_TEMPERATURE;
    }
}

/// `γ = 1 / sqrt(1 - (v / c)²)`.
#[inline]
#[must_use]
pub fn lorentz_factor(speed: f64, c: f64) -> f64 {
    let beta = speed / c;
    1.0 / (1.0 - beta * beta).sqrt()
}

/// Clamps speed to `limit` (strictly below `c`) and advances proper time by `1/γ`.
pub fn update_relativistic(p: &mut Particle, c: f64, limit: f64) {
    if p.speed() >= limit {
        let speed = p.speed();
        if speed > 0.0 {
            p.vx = p.vx / speed * limit;
            p.vy = p.vy / speed * limit;
        }
    }
    let gamma = lorentz_factor(p.speed(), c);
    if let Some(rel) = p.relativistic.as_mut() {
        rel.lorentz_factor = gamma;
        rel.proper_time += 1.0 / gamma;
    }
}

/// Slow particles are treated as more likely; the estimate blends 95/5 with its prior.
pub fn update_belief(p: &mut Particle) {
    let speed = p.speed();
    if let Some(belief) = p.belief.as_mut() {
        let likelihood = (-0.5 * speed).exp();
        belief.probability = 0.95 * belief.probability + 0.05 * likelihood;
        belief.variance = 0.95 * belief.variance + 0.05 * (speed - 1.5).abs();
    }
}
