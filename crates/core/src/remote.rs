//! Smoothing of remote kart poses between network samples.
//!
//! The room server relays each kart's pose at a fixed interval. Remote
//! karts are rendered by gliding from the previous sample toward the most
//! recent one — never extrapolating from velocity — which bounds the
//! visible error at the cost of one sample of latency. A late or dropped
//! message is tolerated by letting the ratio run slightly past 1 before
//! freezing on the target.

use bincode::{Decode, Encode};
use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

/// How far past the expected interval the interpolation may run before
/// freezing (tolerates network jitter without a visible stall).
const MAX_OVERSHOOT_RATIO: f64 = 1.1;

/// One received pose of a remote kart.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Encode, Decode)]
pub struct RemoteSample {
    #[bincode(with_serde)]
    pub position: Vec3,
    #[bincode(with_serde)]
    pub rotation: Quat,
    pub wheels_rotation_speed_ratio: f32,
    pub steering_animation_frame: f32,
}

impl RemoteSample {
    pub fn new(position: Vec3, rotation: Quat) -> Self {
        Self {
            position,
            rotation,
            wheels_rotation_speed_ratio: 0.0,
            steering_animation_frame: 0.0,
        }
    }
}

/// The two samples bracketing a remote kart's interpolation window.
#[derive(Debug, Clone)]
struct RemoteKart {
    id: String,
    name: String,
    last: RemoteSample,
    target: RemoteSample,
    last_received_at_ms: f64,
}

/// Interpolates all remote karts' poses between their last two samples.
///
/// Each remote kart's state is owned exclusively by this smoother; the
/// local kart never passes through here. Storage is a `Vec` so iteration
/// order is stable.
#[derive(Debug, Clone)]
pub struct RemoteStateSmoother {
    expected_interval_ms: f64,
    karts: Vec<RemoteKart>,
}

impl RemoteStateSmoother {
    /// `expected_interval_ms` is the server's relay period (`pingMS`).
    pub fn new(expected_interval_ms: f64) -> Self {
        Self {
            expected_interval_ms,
            karts: Vec::new(),
        }
    }

    pub fn expected_interval_ms(&self) -> f64 {
        self.expected_interval_ms
    }

    /// Ids of all tracked karts, in arrival order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.karts.iter().map(|k| k.id.as_str())
    }

    pub fn name_of(&self, id: &str) -> Option<&str> {
        self.find(id).map(|k| k.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.karts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.karts.is_empty()
    }

    /// Stores a new network sample: the old target becomes the window
    /// start and the clock rewinds to `now_ms`. The first sample for an
    /// id fills both ends so the kart appears in place instead of flying
    /// in from the origin. Stale or duplicate samples are accepted as-is.
    pub fn push_sample(&mut self, id: &str, name: &str, sample: RemoteSample, now_ms: f64) {
        match self.karts.iter_mut().find(|k| k.id == id) {
            Some(kart) => {
                kart.last = kart.target;
                kart.target = sample;
                kart.last_received_at_ms = now_ms;
                if !name.is_empty() {
                    name.clone_into(&mut kart.name);
                }
            }
            None => self.karts.push(RemoteKart {
                id: id.to_string(),
                name: name.to_string(),
                last: sample,
                target: sample,
                last_received_at_ms: now_ms,
            }),
        }
    }

    /// Forgets a disconnected kart. Returns whether it was tracked.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.karts.len();
        self.karts.retain(|k| k.id != id);
        self.karts.len() != before
    }

    /// The smoothed pose of one kart at render time `now_ms`.
    pub fn sample_pose(&self, id: &str, now_ms: f64) -> Option<RemoteSample> {
        let kart = self.find(id)?;
        let ratio = ((now_ms - kart.last_received_at_ms) / self.expected_interval_ms)
            .clamp(0.0, MAX_OVERSHOOT_RATIO) as f32;
        Some(RemoteSample {
            position: kart.last.position.lerp(kart.target.position, ratio),
            rotation: kart.last.rotation.slerp(kart.target.rotation, ratio).normalize(),
            wheels_rotation_speed_ratio: lerp(
                kart.last.wheels_rotation_speed_ratio,
                kart.target.wheels_rotation_speed_ratio,
                ratio,
            ),
            steering_animation_frame: lerp(
                kart.last.steering_animation_frame,
                kart.target.steering_animation_frame,
                ratio,
            ),
        })
    }

    fn find(&self, id: &str) -> Option<&RemoteKart> {
        self.karts.iter().find(|k| k.id == id)
    }
}

#[inline]
fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pose(x: f32) -> RemoteSample {
        RemoteSample::new(Vec3::new(x, 0.0, 0.0), Quat::IDENTITY)
    }

    #[test]
    fn first_sample_appears_in_place() {
        let mut smoother = RemoteStateSmoother::new(100.0);
        smoother.push_sample("a", "Ada", pose(10.0), 0.0);
        let out = smoother.sample_pose("a", 50.0).unwrap();
        assert_eq!(out.position, Vec3::new(10.0, 0.0, 0.0));
    }

    #[test]
    fn midpoint_interpolation() {
        let mut smoother = RemoteStateSmoother::new(100.0);
        smoother.push_sample("a", "Ada", pose(0.0), 0.0);
        smoother.push_sample("a", "Ada", pose(10.0), 0.0);
        let out = smoother.sample_pose("a", 50.0).unwrap();
        assert!((out.position - Vec3::new(5.0, 0.0, 0.0)).length() < 1e-4);
    }

    #[test]
    fn position_stays_on_segment_within_window() {
        let mut smoother = RemoteStateSmoother::new(100.0);
        smoother.push_sample("a", "Ada", pose(0.0), 0.0);
        smoother.push_sample("a", "Ada", pose(10.0), 0.0);
        for t in [0.0, 10.0, 25.0, 75.0, 100.0] {
            let out = smoother.sample_pose("a", t).unwrap();
            assert!(out.position.x >= 0.0 && out.position.x <= 10.0);
            assert_eq!(out.position.y, 0.0);
        }
    }

    #[test]
    fn overshoot_is_capped_at_ten_percent() {
        let mut smoother = RemoteStateSmoother::new(100.0);
        smoother.push_sample("a", "Ada", pose(0.0), 0.0);
        smoother.push_sample("a", "Ada", pose(10.0), 0.0);
        // Far past the window: frozen 10% beyond the target.
        let out = smoother.sample_pose("a", 1000.0).unwrap();
        assert!((out.position.x - 11.0).abs() < 1e-4);
    }

    #[test]
    fn new_sample_shifts_window() {
        let mut smoother = RemoteStateSmoother::new(100.0);
        smoother.push_sample("a", "Ada", pose(0.0), 0.0);
        smoother.push_sample("a", "Ada", pose(10.0), 0.0);
        smoother.push_sample("a", "Ada", pose(30.0), 100.0);
        // New window runs from the old target toward the new sample.
        let out = smoother.sample_pose("a", 150.0).unwrap();
        assert!((out.position.x - 20.0).abs() < 1e-4);
    }

    #[test]
    fn rotation_slerps_between_samples() {
        let mut smoother = RemoteStateSmoother::new(100.0);
        let quarter = Quat::from_rotation_y(std::f32::consts::FRAC_PI_2);
        smoother.push_sample("a", "Ada", RemoteSample::new(Vec3::ZERO, Quat::IDENTITY), 0.0);
        smoother.push_sample("a", "Ada", RemoteSample::new(Vec3::ZERO, quarter), 0.0);
        let out = smoother.sample_pose("a", 50.0).unwrap();
        let eighth = Quat::from_rotation_y(std::f32::consts::FRAC_PI_4);
        assert!(out.rotation.dot(eighth).abs() > 0.999);
    }

    #[test]
    fn animation_scalars_interpolate() {
        let mut smoother = RemoteStateSmoother::new(100.0);
        let mut a = pose(0.0);
        a.wheels_rotation_speed_ratio = 0.0;
        a.steering_animation_frame = -1.0;
        let mut b = pose(0.0);
        b.wheels_rotation_speed_ratio = 1.0;
        b.steering_animation_frame = 1.0;
        smoother.push_sample("a", "Ada", a, 0.0);
        smoother.push_sample("a", "Ada", b, 0.0);
        let out = smoother.sample_pose("a", 50.0).unwrap();
        assert!((out.wheels_rotation_speed_ratio - 0.5).abs() < 1e-4);
        assert!(out.steering_animation_frame.abs() < 1e-4);
    }

    #[test]
    fn remove_forgets_kart() {
        let mut smoother = RemoteStateSmoother::new(100.0);
        smoother.push_sample("a", "Ada", pose(0.0), 0.0);
        smoother.push_sample("b", "Bob", pose(5.0), 0.0);
        assert!(smoother.remove("a"));
        assert!(!smoother.remove("a"));
        assert!(smoother.sample_pose("a", 0.0).is_none());
        assert_eq!(smoother.len(), 1);
        assert_eq!(smoother.name_of("b"), Some("Bob"));
    }
}
