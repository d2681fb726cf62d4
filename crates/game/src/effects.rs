//! Transient effects and deferred tasks.
//!
//! Anything that happens "later" (a flash going dark, a notice fading, the
//! studio screen changing picture) is a [`Deferred`] task on a
//! [`TimerQueue`] that the simulation drains at the end of each frame.

use glam::Vec3;
use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::scene::{LightId, Material, NodeId, PointLight, SceneGraph};

/// Camera flash light.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlashConfig {
    /// Height of the light above the flashing object.
    pub height: f32,
    pub color: u32,
    pub intensity: f32,
    pub range: f32,
    pub decay: f32,
    /// Seconds until the light is removed.
    pub duration: f64,
}

impl Default for FlashConfig {
    fn default() -> Self {
        Self {
            height: 1.8,
            color: 0xffffff,
            intensity: 50.0,
            range: 100.0,
            decay: 1.0,
            duration: 0.1,
        }
    }
}

/// Periodic picture change on the studio screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    /// Seconds between refreshes. Zero disables the feed.
    pub interval: f64,
    /// Number of textures in the rotation.
    pub variants: u32,
    /// Texture path prefix; the variant number and `.jpg` are appended.
    pub texture_prefix: String,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            interval: 5.0,
            variants: 12,
            texture_prefix: "feed/".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EffectsConfig {
    pub flash: FlashConfig,
    /// Seconds an on-screen notice stays up.
    pub notice_duration: f64,
    pub feed: FeedConfig,
}

impl Default for EffectsConfig {
    fn default() -> Self {
        Self {
            flash: FlashConfig::default(),
            notice_duration: 2.0,
            feed: FeedConfig::default(),
        }
    }
}

/// Work scheduled for a later frame.
#[derive(Debug, Clone, PartialEq)]
pub enum Deferred {
    RemoveLight(LightId),
    ClearNotice(u64),
    RefreshFeed,
}

/// Time-ordered task queue.
///
/// Tasks due at the same time run in scheduling order.
#[derive(Debug, Clone)]
pub struct TimerQueue<T> {
    entries: Vec<(f64, u64, T)>,
    sequence: u64,
}

impl<T> Default for TimerQueue<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            sequence: 0,
        }
    }
}

impl<T> TimerQueue<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, at: f64, task: T) {
        self.entries.push((at, self.sequence, task));
        self.sequence += 1;
    }

    /// Remove and return every task due at or before `now`.
    pub fn pop_due(&mut self, now: f64) -> Vec<T> {
        let (mut due, pending): (Vec<_>, Vec<_>) =
            self.entries.drain(..).partition(|(at, _, _)| *at <= now);
        self.entries = pending;

        due.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
        due.into_iter().map(|(_, _, task)| task).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Light up the area above `position`. The caller schedules removal after
/// [`FlashConfig::duration`].
pub fn flash(scene: &mut SceneGraph, config: &FlashConfig, position: Vec3) -> LightId {
    let light = scene.add_light(PointLight {
        position: position + Vec3::Y * config.height,
        color: config.color,
        intensity: config.intensity,
        range: config.range,
        decay: config.decay,
    });
    debug!("flash at {position}");
    light
}

/// Picks random pictures for the studio screen.
#[derive(Debug, Clone)]
pub struct AmbientFeed {
    screen: Option<NodeId>,
    config: FeedConfig,
    rng: StdRng,
}

impl AmbientFeed {
    pub fn new(screen: Option<NodeId>, config: FeedConfig, seed: u64) -> Self {
        Self {
            screen,
            config,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Seconds until the next refresh, or `None` if the feed is off.
    pub fn interval(&self) -> Option<f64> {
        (self.screen.is_some() && self.config.interval > 0.0 && self.config.variants > 0)
            .then_some(self.config.interval)
    }

    /// Put a new picture on the screen.
    pub fn refresh(&mut self, scene: &mut SceneGraph) -> Option<Material> {
        let screen = self.screen?;
        if self.config.variants == 0 {
            return None;
        }

        let variant = self.rng.gen_range(1..=self.config.variants);
        let material = Material::Texture(format!("{}{variant}.jpg", self.config.texture_prefix));
        scene.node_mut(screen).material = Some(material.clone());
        Some(material)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::Tag;

    #[test]
    fn test_timer_queue_order() {
        let mut timers = TimerQueue::new();
        timers.schedule(2.0, "notice");
        timers.schedule(0.1, "light");
        timers.schedule(2.0, "second notice");
        timers.schedule(5.0, "feed");

        assert!(timers.pop_due(0.05).is_empty());
        assert_eq!(timers.pop_due(2.0), vec!["light", "notice", "second notice"]);
        assert_eq!(timers.len(), 1);
        assert_eq!(timers.pop_due(10.0), vec!["feed"]);
        assert!(timers.is_empty());
    }

    #[test]
    fn test_flash_light() {
        let mut scene = SceneGraph::new();
        let config = FlashConfig::default();
        let light = flash(&mut scene, &config, Vec3::new(-5.0, 1.2, -4.0));

        let added = scene.light(light).unwrap();
        assert!((added.position - Vec3::new(-5.0, 3.0, -4.0)).length() < 1e-6);
        assert_eq!(added.intensity, 50.0);
        assert_eq!(added.range, 100.0);
        assert_eq!(added.decay, 1.0);
    }

    #[test]
    fn test_feed_refresh_is_seeded() {
        let mut scene = SceneGraph::new();
        let root = scene.root();
        let screen = scene.add_node(root, "TVScreen", Tag::Screen, Vec3::ZERO);

        let mut a = AmbientFeed::new(Some(screen), FeedConfig::default(), 7);
        let mut b = AmbientFeed::new(Some(screen), FeedConfig::default(), 7);

        for _ in 0..5 {
            let material = a.refresh(&mut scene).unwrap();
            assert_eq!(Some(material.clone()), b.refresh(&mut scene));
            assert_eq!(scene.node(screen).material, Some(material.clone()));

            let Material::Texture(path) = material else {
                panic!("feed uses textures");
            };
            let variant: u32 = path
                .trim_start_matches("feed/")
                .trim_end_matches(".jpg")
                .parse()
                .unwrap();
            assert!((1..=12).contains(&variant));
        }
    }

    #[test]
    fn test_feed_without_screen() {
        let mut scene = SceneGraph::new();
        let mut feed = AmbientFeed::new(None, FeedConfig::default(), 1);

        assert_eq!(feed.interval(), None);
        assert_eq!(feed.refresh(&mut scene), None);
    }
}
