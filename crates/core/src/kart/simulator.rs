//! Per-tick kart simulation.
//!
//! One `update` advances a kart by one tick through a fixed stage order:
//! tick guard, state expiry, checkpoint progress, wall collision, ground
//! adherence, hazard contacts, control integration, decay/advance, and
//! cosmetic outputs. Later stages depend on the mutations of earlier
//! ones — wall push-out must land before the ground snap, and hazards
//! must see the post-snap position — so the order is part of the model,
//! not an implementation detail.
//!
//! There is no failure path: a kart that leaves the track is recovered,
//! a stalled frame is skipped, and a missing hazard group is just empty.

use glam::{Mat3, Quat, Vec3};

use crate::input::ControlInput;
use crate::track::{HazardId, HazardType, SurfaceMask, SurfaceTag, Track};

use super::config::KartConfig;
use super::state::{KartState, SpeedState};

/// Checkpoint jumps of this many indices or more are rejected as track
/// self-proximity artifacts.
const CHECKPOINT_MAX_JUMP: usize = 3;

/// Drives one kart against a track. Owns the tuning, the checkpoint
/// markers, the start pose, and the simulation clock; the kart itself is
/// plain state passed in by the caller.
#[derive(Debug, Clone)]
pub struct KartSimulator {
    pub config: KartConfig,
    checkpoints: Vec<Vec3>,
    start_position: Vec3,
    start_target: Vec3,
    clock_ms: f64,
    race_started_ms: f64,
    race_time_ms: Option<f64>,
}

impl KartSimulator {
    pub fn new(config: KartConfig) -> Self {
        Self {
            config,
            checkpoints: Vec::new(),
            start_position: Vec3::ZERO,
            start_target: Vec3::Z,
            clock_ms: 0.0,
            race_started_ms: 0.0,
            race_time_ms: None,
        }
    }

    /// Installs the checkpoint loop and start pose of a freshly generated
    /// track.
    pub fn initialize_track_progress(
        &mut self,
        checkpoints: Vec<Vec3>,
        start_position: Vec3,
        start_target: Vec3,
    ) {
        self.checkpoints = checkpoints;
        self.start_position = start_position;
        self.start_target = start_target;
    }

    /// Simulation clock in milliseconds, advanced by accepted ticks only.
    pub fn clock_ms(&self) -> f64 {
        self.clock_ms
    }

    /// Progress around the loop in percent.
    pub fn progress_percent(&self, state: &KartState) -> u32 {
        if self.checkpoints.is_empty() {
            return 0;
        }
        let ratio = state.checkpoint_index as f32 / self.checkpoints.len() as f32;
        (ratio * 100.0).round() as u32
    }

    /// Whether the kart has completed the loop.
    pub fn finished(&self, state: &KartState) -> bool {
        self.progress_percent(state) >= 100
    }

    /// Lap time, available once the kart finishes.
    pub fn race_time_ms(&self) -> Option<f64> {
        self.race_time_ms
    }

    pub fn assign_name(&self, state: &mut KartState, name: &str) {
        state.name = name.to_string();
    }

    /// Re-homes the kart to the start pose and clears race state:
    /// zero velocity and yaw rate, factors restored, hazards revealed,
    /// timers cleared, lap timer restarted.
    pub fn reset(&mut self, state: &mut KartState, track: &mut Track) {
        let forward = (self.start_target - self.start_position).normalize_or_zero();
        let forward = if forward == Vec3::ZERO { Vec3::Z } else { forward };
        let right = Vec3::Y.cross(forward).normalize();
        let forward = right.cross(Vec3::Y);

        state.position = self.start_position + Vec3::Y * self.config.ground_clearance;
        state.rotation = Quat::from_mat3(&Mat3::from_cols(right, Vec3::Y, forward));
        state.velocity = Vec3::ZERO;
        state.relocity = 0.0;
        state.filtered_up = Vec3::Y;
        state.last_safe_position = state.position;
        state.last_safe_up = Vec3::Y;
        state.speed_state = SpeedState::Ok;
        state.hit_at_ms = 0.0;
        state.velocity_factor = self.config.velocity_factor_max;
        state.current_velocity_factor = 0.0;
        state.checkpoint_index = 0;
        state.last_hazard = None;
        state.unsafe_since_ms = None;
        state.wheels_rotation_speed_ratio = 0.0;
        state.steering_animation_frame = 0.0;
        state.exhaust_rate = 0.0;

        track.hazards.reveal_all();
        self.race_started_ms = self.clock_ms;
        self.race_time_ms = None;
    }

    /// Advances the kart by `delta_time` seconds.
    pub fn update(
        &mut self,
        state: &mut KartState,
        input: &ControlInput,
        track: &mut Track,
        delta_time: f32,
    ) {
        // A stalled frame would integrate into an explosion; drop it.
        if delta_time > self.config.max_delta_time || delta_time <= 0.0 {
            return;
        }
        self.clock_ms += f64::from(delta_time) * 1000.0;
        let frames = delta_time * self.config.frame_rate_baseline;

        self.expire_speed_state(state);
        self.update_checkpoint(state);
        self.collide_walls(state, track);
        let surface = self.adhere_to_ground(state, track, frames);
        self.interact_hazards(state, track);
        if state.speed_state != SpeedState::Exploded {
            self.integrate_controls(state, input, frames);
        }
        self.decay_and_advance(state, surface, frames);
        self.update_cosmetics(state, input, frames);
    }

    /// Reverts an elapsed hazard state and restores the top-speed factor.
    fn expire_speed_state(&self, state: &mut KartState) {
        let duration = match state.speed_state {
            SpeedState::Ok => return,
            SpeedState::Exploded => self.config.exploded_duration_ms,
            SpeedState::Fast => self.config.fast_duration_ms,
            SpeedState::Slow => self.config.slow_duration_ms,
        };
        if self.clock_ms - state.hit_at_ms >= duration {
            state.speed_state = SpeedState::Ok;
            state.velocity_factor = self.config.velocity_factor_max;
        }
    }

    /// Nearest-checkpoint scan with jump rejection. Only forward steps of
    /// fewer than `CHECKPOINT_MAX_JUMP` indices are accepted, so progress
    /// never leaps across a track fold and never runs backwards.
    fn update_checkpoint(&mut self, state: &mut KartState) {
        if self.checkpoints.is_empty() || self.finished(state) {
            return;
        }
        let nearest = self
            .checkpoints
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| {
                let da = (**a - state.position).length_squared();
                let db = (**b - state.position).length_squared();
                da.partial_cmp(&db).unwrap()
            })
            .map(|(i, _)| i)
            .unwrap();

        let previous = state.checkpoint_index;
        if nearest > previous && nearest - previous < CHECKPOINT_MAX_JUMP {
            state.checkpoint_index = nearest;
            if self.finished(state) && self.race_time_ms.is_none() {
                self.race_time_ms = Some(self.clock_ms - self.race_started_ms);
                log::info!(
                    "kart '{}' finished in {:.0} ms",
                    state.name,
                    self.clock_ms - self.race_started_ms
                );
            }
        }
    }

    /// Probes the boundary walls along ±forward and ±right. Each hit
    /// removes the penetrating velocity component scaled by the rebound
    /// factor and pushes the kart out along the wall normal.
    fn collide_walls(&self, state: &mut KartState, track: &Track) {
        let forward = state.forward();
        let right = state.right();
        for dir in [forward, -forward, right, -right] {
            let Some(hit) =
                track.cast_ray(state.position, dir, self.config.wall_ray_length, SurfaceMask::WALL)
            else {
                continue;
            };
            let into = state.velocity.dot(hit.normal);
            if into < 0.0 {
                state.velocity -= hit.normal * into * self.config.wall_rebound;
            }
            let penetration = self.config.wall_ray_length - hit.distance;
            state.position += hit.normal * penetration;
        }
    }

    /// Ground probe straight down along the filtered up vector.
    ///
    /// On a hit the kart snaps to clearance height, the up filter pulls
    /// toward the surface normal, the normal velocity component is removed
    /// (no bounce), and the pose is recorded as the recovery anchor. In
    /// the air the filter relaxes toward world-up, gravity applies, and
    /// overdue karts teleport back to the anchor. Either way the rotation
    /// is rebuilt from the filtered frame.
    fn adhere_to_ground(
        &mut self,
        state: &mut KartState,
        track: &Track,
        frames: f32,
    ) -> Option<SurfaceTag> {
        let surface = match track.cast_down(
            state.position,
            state.filtered_up,
            self.config.ground_ray_length,
        ) {
            Some(hit) => {
                let gain = (self.config.up_filter_grounded * frames).min(1.0);
                state.filtered_up = state.filtered_up.lerp(hit.normal, gain).normalize();
                state.position = hit.point + state.filtered_up * self.config.ground_clearance;

                let along = state.velocity.dot(hit.normal);
                state.velocity -= hit.normal * along;

                state.last_safe_position = state.position;
                state.last_safe_up = state.filtered_up;
                state.unsafe_since_ms = None;
                Some(hit.tag)
            }
            None => {
                let gain = (self.config.up_filter_airborne * frames).min(1.0);
                state.filtered_up = state.filtered_up.lerp(Vec3::Y, gain).normalize();
                state.velocity.y -= self.config.gravity * frames;

                let since = *state.unsafe_since_ms.get_or_insert(self.clock_ms);
                let timed_out = self.clock_ms - since > self.config.fall_timeout_ms;
                let fell_out = state.position.y < track.lowest_point - self.config.death_drop;
                if timed_out || fell_out {
                    log::debug!(
                        "kart '{}' recovered to last safe position ({})",
                        state.name,
                        if timed_out { "timeout" } else { "fell out" },
                    );
                    state.position = state.last_safe_position;
                    state.filtered_up = state.last_safe_up;
                    state.velocity = Vec3::ZERO;
                    state.relocity = 0.0;
                    state.unsafe_since_ms = None;
                }
                None
            }
        };

        // Rebuild the orthonormal frame around the filtered up vector.
        let up = state.filtered_up;
        let right = up.cross(state.forward()).normalize();
        let forward = right.cross(up);
        state.rotation = Quat::from_mat3(&Mat3::from_cols(right, up, forward)).normalize();

        surface
    }

    /// Proximity tests against every visible hazard, one group at a time.
    fn interact_hazards(&self, state: &mut KartState, track: &mut Track) {
        let radius_sq = self.config.hazard_radius * self.config.hazard_radius;

        for hazard_type in HazardType::ALL {
            let mut contacts: Vec<(HazardId, Vec3)> = Vec::new();
            for hazard in track.hazards.visible_of(hazard_type) {
                if (hazard.position - state.position).length_squared() < radius_sq {
                    contacts.push((hazard.id, hazard.position));
                }
            }
            for (id, position) in contacts {
                self.hit_hazard(state, track, hazard_type, id, position);
            }
        }
    }

    fn hit_hazard(
        &self,
        state: &mut KartState,
        track: &mut Track,
        hazard_type: HazardType,
        id: HazardId,
        position: Vec3,
    ) {
        // Bumpers act on every contact tick; the rest trigger once per id.
        if hazard_type != HazardType::Bumper {
            if state.last_hazard == Some(id) {
                return;
            }
            state.last_hazard = Some(id);
        }

        match hazard_type {
            HazardType::Bomb => {
                state.velocity.y += self.config.bomb_pop_velocity;
                state.speed_state = SpeedState::Exploded;
                state.hit_at_ms = self.clock_ms;
                state.velocity_factor = self.config.bomb_velocity_factor;
                state.current_velocity_factor = self.config.bomb_velocity_factor;
                track.hazards.hide(id);
            }
            HazardType::Boost => {
                state.speed_state = SpeedState::Fast;
                state.hit_at_ms = self.clock_ms;
                state.velocity_factor = self.config.boost_velocity_factor;
                state.current_velocity_factor = self.config.boost_velocity_factor;
                track.hazards.hide(id);
            }
            HazardType::Poison => {
                state.velocity = Vec3::ZERO;
                state.speed_state = SpeedState::Slow;
                state.hit_at_ms = self.clock_ms;
                state.velocity_factor = self.config.poison_velocity_factor;
                state.current_velocity_factor = self.config.poison_velocity_factor;
                track.hazards.hide(id);
            }
            HazardType::Bumper => {
                let outward = (state.position - position).normalize_or_zero();
                if outward == Vec3::ZERO {
                    return;
                }
                let speed = state.speed().max(self.config.bumper_min_speed);
                let heading = state.velocity.normalize_or_zero();
                if heading.dot(-outward) > self.config.bumper_cone_cos {
                    // Head-on: straight back the way it came.
                    state.velocity = -heading * speed;
                } else {
                    // Glancing: shove radially away from the bumper.
                    state.velocity = outward * speed;
                }
            }
        }
    }

    /// Steering and throttle. Skipped entirely while exploded.
    fn integrate_controls(&self, state: &mut KartState, input: &ControlInput, frames: f32) {
        let config = &self.config;

        // The achieved factor eases toward the target; hazard hits hard-set
        // it elsewhere so a bomb bites immediately.
        let target_factor = state.velocity_factor;
        let ease = if target_factor < state.current_velocity_factor {
            config.factor_ease_down
        } else {
            config.factor_ease_up
        };
        let gain = (ease * frames).min(1.0);
        state.current_velocity_factor += (target_factor - state.current_velocity_factor) * gain;

        // Yaw rate low-passes toward the steering target, then rotates the
        // kart about its up axis.
        let drift_scale = if input.drift {
            config.drift_turn_multiplier
        } else {
            1.0
        };
        let steer_target =
            config.max_turn_rate * input.horizontal.clamp(-1.0, 1.0) * drift_scale;
        let steer_gain = (config.steering_filter * frames).min(1.0);
        state.relocity += (steer_target - state.relocity) * steer_gain;
        let yaw = Quat::from_axis_angle(state.filtered_up, state.relocity * frames);
        state.rotation = (yaw * state.rotation).normalize();

        let forward = state.forward();
        let speed_along = state.velocity.dot(forward);
        let throttle = input.accelerate.clamp(-1.0, 1.0);

        if throttle > 0.0 {
            let target_speed = config.top_speed * state.current_velocity_factor * throttle;
            if speed_along > target_speed + 1e-4 {
                // Over target (boost expired, surface slowdown): ease down.
                let gain = (config.decel_to_target * frames).min(1.0);
                let eased = speed_along + (target_speed - speed_along) * gain;
                state.velocity += forward * (eased - speed_along);
            } else {
                let accel = if speed_along < config.baby_speed_threshold {
                    config.accel_launch
                } else {
                    config.accel_normal
                };
                let next = (speed_along + accel * throttle * frames).min(target_speed);
                state.velocity += forward * (next - speed_along);
            }
        } else if throttle < 0.0 {
            state.velocity += forward * (config.reverse_accel * throttle * frames);
        }

        if input.brake > 0.0 {
            let brake = input.brake.clamp(0.0, 1.0);
            state.velocity *= config.brake_scale.powf(brake * frames);
        }
    }

    /// Surface-dependent damping, then position advance at the 60 fps
    /// baseline scale.
    fn decay_and_advance(&self, state: &mut KartState, surface: Option<SurfaceTag>, frames: f32) {
        let (decay, speed_factor) = match surface {
            Some(tag) => (
                self.config.surface_decay(tag),
                self.config.surface_speed_factor(tag),
            ),
            None => (self.config.decay_air, 1.0),
        };
        state.velocity *= decay.powf(frames);
        state.relocity *= self.config.relocity_decay.powf(frames);
        state.position += state.velocity * frames * speed_factor;
    }

    /// Presentation outputs: wheel spin, steering pose, exhaust intensity.
    /// None of these feed back into the simulation.
    fn update_cosmetics(&self, state: &mut KartState, input: &ControlInput, frames: f32) {
        let forward_speed = state.velocity.dot(state.forward());
        state.wheels_rotation_speed_ratio =
            (forward_speed / self.config.top_speed).clamp(-1.0, 1.0);

        let gain = (self.config.steering_filter * frames).min(1.0);
        state.steering_animation_frame +=
            (input.horizontal.clamp(-1.0, 1.0) - state.steering_animation_frame) * gain;

        let state_scale = match state.speed_state {
            SpeedState::Ok => 1.0,
            SpeedState::Fast => 2.0,
            SpeedState::Slow => 0.5,
            SpeedState::Exploded => 0.0,
        };
        state.exhaust_rate = state.wheels_rotation_speed_ratio.abs() * state_scale;
    }
}
