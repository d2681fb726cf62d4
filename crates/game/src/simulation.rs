//! Frame driver for the studio walk.

use atelier_physics::{MovementState, PlayerController};
use glam::Vec3;
use log::{debug, trace};

use crate::camera::FirstPersonCamera;
use crate::config::SimulationConfig;
use crate::effects::{self, AmbientFeed, Deferred, TimerQueue};
use crate::error::LevelError;
use crate::input::{InputEvent, InputState};
use crate::interaction::{Carried, InteractOutcome, InteractionManager};
use crate::level::Level;
use crate::notify::{Announcer, LogAnnouncer, NoticeBoard};
use crate::outfit::{OutfitStation, VisitOutcome};
use crate::scene::{LightId, Material, NodeId, Tag};
use crate::zone::{ZoneTransition, ZoneTrigger};

/// Something the host may want to render or play a sound for.
#[derive(Debug, Clone, PartialEq)]
pub enum SimEvent {
    PickedUp { node: NodeId, tag: Tag },
    Released { node: NodeId },
    Flash { node: NodeId, light: LightId },
    ZoneEntered,
    ZoneRearmed,
    Announced(String),
    OutfitChanged { item: NodeId },
    FeedRefreshed(Material),
}

/// The studio simulation.
///
/// Owns the level, the player and every interaction component. Each call to
/// [`Simulation::frame`] runs a fixed number of physics substeps, then the
/// once-per-frame work and any deferred tasks that came due.
pub struct Simulation {
    /// Frames run so far.
    pub frame: u64,

    /// Simulation clock in seconds. Advances by the clamped frame time.
    pub time: f64,

    pub config: SimulationConfig,

    pub level: Level,

    pub player: MovementState,

    pub camera: FirstPersonCamera,

    pub input: InputState,

    controller: PlayerController,
    interaction: InteractionManager,
    zone: ZoneTrigger,
    outfit: OutfitStation,
    feed: AmbientFeed,
    timers: TimerQueue<Deferred>,
    notices: NoticeBoard,
    announcer: Box<dyn Announcer>,
    events: Vec<SimEvent>,
}

impl Simulation {
    /// Create a simulation that announces through the log.
    pub fn new(config: SimulationConfig, level: Level, seed: u64) -> Self {
        Self::with_announcer(config, level, seed, Box::new(LogAnnouncer))
    }

    pub fn with_announcer(
        config: SimulationConfig,
        level: Level,
        seed: u64,
        announcer: Box<dyn Announcer>,
    ) -> Self {
        let controller = PlayerController::new(config.movement.clone());
        let player = controller.spawn(level.spawn.position);

        let mut camera = FirstPersonCamera::new(controller.eye_position(&player));
        camera.yaw = level.spawn.facing;

        let zone = ZoneTrigger::new(level.point_of_interest, &config.zone);
        let outfit = OutfitStation::new(level.outfit_target);
        let feed = AmbientFeed::new(level.feed_screen, config.effects.feed.clone(), seed);

        let mut timers = TimerQueue::new();
        if let Some(interval) = feed.interval() {
            timers.schedule(interval, Deferred::RefreshFeed);
        }

        Self {
            frame: 0,
            time: 0.0,
            interaction: InteractionManager::new(config.interaction.clone()),
            config,
            level,
            player,
            camera,
            input: InputState::new(),
            controller,
            zone,
            outfit,
            feed,
            timers,
            notices: NoticeBoard::new(),
            announcer,
            events: Vec::new(),
        }
    }

    /// Default configuration in the built-in studio.
    pub fn studio(seed: u64) -> Result<Self, LevelError> {
        Ok(Self::new(SimulationConfig::default(), Level::studio(seed)?, seed))
    }

    /// Apply one input event.
    ///
    /// Mouse-down counts as a granted pointer lock request; the host reports
    /// a lost lock with [`InputEvent::PointerLockChanged`].
    pub fn handle_input(&mut self, event: InputEvent) {
        match event {
            InputEvent::KeyDown(key) => self.input.set_key(key, true),
            InputEvent::KeyUp(key) => self.input.set_key(key, false),
            InputEvent::MouseDown => {
                if !self.input.pointer_locked {
                    debug!("pointer locked");
                    self.input.pointer_locked = true;
                }
            }
            InputEvent::MouseUp => {
                if self.input.pointer_locked {
                    self.interact();
                } else {
                    debug!("interact ignored without pointer lock");
                }
            }
            InputEvent::MouseMove { dx, dy } => {
                if self.input.pointer_locked {
                    self.camera
                        .rotate_by_mouse(dx, dy, self.config.mouse_sensitivity);
                }
            }
            InputEvent::PointerLockChanged(locked) => {
                if self.input.pointer_locked != locked {
                    debug!("pointer lock changed: {locked}");
                }
                self.input.pointer_locked = locked;
            }
        }
    }

    /// Advance by one rendered frame of `elapsed` seconds.
    pub fn frame(&mut self, elapsed: f32) {
        let frame_time = self.config.frame_time(elapsed);
        let delta_time = frame_time / self.config.substeps as f32;

        for _ in 0..self.config.substeps {
            self.substep(delta_time);
        }

        self.interaction
            .drag_carried(&mut self.level.scene, &self.camera);

        self.time += f64::from(frame_time);
        self.run_deferred();

        self.frame += 1;
    }

    fn substep(&mut self, delta_time: f32) {
        let command = self.input.to_command(&self.config.bindings);

        self.controller.apply_controls(
            &mut self.player,
            &command,
            self.camera.forward(),
            self.camera.up,
            delta_time,
        );
        self.controller
            .integrate(&mut self.player, &self.level.collision, delta_time);

        self.camera.position = self.controller.eye_position(&self.player);
        trace!(
            "substep: eye {} velocity {} on_floor {}",
            self.camera.position,
            self.player.velocity,
            self.player.on_floor
        );

        match self.zone.update(self.camera.position) {
            Some(ZoneTransition::Entered) => {
                self.events.push(SimEvent::ZoneEntered);
                self.visit_outfit_station();
            }
            Some(ZoneTransition::Rearmed) => self.events.push(SimEvent::ZoneRearmed),
            None => {}
        }
    }

    fn interact(&mut self) {
        match self.interaction.interact(&self.level.scene, &self.camera) {
            InteractOutcome::Missed => debug!("interact: nothing under the pointer"),
            InteractOutcome::Ignored { node, tag } => {
                let name = &self.level.scene.node(node).name;
                debug!("interact: {name:?} ({tag:?}) ignored");
            }
            InteractOutcome::Flash { node, position } => {
                let flash = &self.config.effects.flash;
                let light = effects::flash(&mut self.level.scene, flash, position);
                self.timers.schedule(
                    self.time + self.config.effects.flash.duration,
                    Deferred::RemoveLight(light),
                );
                self.events.push(SimEvent::Flash { node, light });
            }
            InteractOutcome::PickedUp { node, tag } => {
                self.events.push(SimEvent::PickedUp { node, tag });
                let line = self.config.dialogue.taking_line(tag);
                self.say(line);
            }
            InteractOutcome::Released { node } => {
                self.events.push(SimEvent::Released { node });
            }
        }
    }

    fn visit_outfit_station(&mut self) {
        let outcome = self.outfit.on_visit(&mut self.level.scene, &self.interaction);
        if let VisitOutcome::Dressed { item } = outcome {
            self.events.push(SimEvent::OutfitChanged { item });
        }
        let line = self.config.dialogue.visit_line(&outcome).to_string();
        self.say(line);
    }

    fn say(&mut self, text: String) {
        self.announcer.announce(&text);

        let notice = self.notices.show(text.clone());
        self.timers.schedule(
            self.time + self.config.effects.notice_duration,
            Deferred::ClearNotice(notice),
        );

        self.events.push(SimEvent::Announced(text));
    }

    fn run_deferred(&mut self) {
        for task in self.timers.pop_due(self.time) {
            match task {
                Deferred::RemoveLight(light) => {
                    if self.level.scene.remove_light(light) {
                        debug!("flash light {light:?} removed");
                    }
                }
                Deferred::ClearNotice(notice) => {
                    self.notices.clear(notice);
                }
                Deferred::RefreshFeed => {
                    if let Some(material) = self.feed.refresh(&mut self.level.scene) {
                        debug!("feed refreshed: {material:?}");
                        self.events.push(SimEvent::FeedRefreshed(material));
                    }
                    if let Some(interval) = self.feed.interval() {
                        self.timers.schedule(self.time + interval, Deferred::RefreshFeed);
                    }
                }
            }
        }
    }

    /// Put the player back on its feet at `foot`, at rest.
    pub fn respawn(&mut self, foot: Vec3) {
        let offset = foot - self.player.foot_position();
        self.player.capsule.translate(offset);
        self.player.velocity = Vec3::ZERO;
        self.player.on_floor = false;
        self.camera.position = self.controller.eye_position(&self.player);
    }

    /// Take the events produced since the last call.
    pub fn drain_events(&mut self) -> Vec<SimEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn carried(&self) -> Option<&Carried> {
        self.interaction.carried()
    }

    /// Text currently shown on screen.
    pub fn notice(&self) -> Option<&str> {
        self.notices.current()
    }

    pub fn is_outfit_visible(&self) -> bool {
        self.outfit.is_dressed(&self.level.scene)
    }

    pub fn zone_inside(&self) -> bool {
        self.zone.is_inside()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::KeyCode;
    use crate::notify::RecordingAnnouncer;

    const FRAME: f32 = 1.0 / 60.0;

    fn studio() -> Simulation {
        Simulation::studio(7).unwrap()
    }

    fn click(sim: &mut Simulation) {
        sim.handle_input(InputEvent::MouseDown);
        sim.handle_input(InputEvent::MouseUp);
    }

    fn run(sim: &mut Simulation, frames: usize, elapsed: f32) {
        for _ in 0..frames {
            sim.frame(elapsed);
        }
    }

    fn announcements(events: &[SimEvent]) -> Vec<&str> {
        events
            .iter()
            .filter_map(|event| match event {
                SimEvent::Announced(text) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_simulation_creation() {
        let sim = studio();
        assert_eq!(sim.frame, 0);
        assert_eq!(sim.camera.position, Vec3::new(0.0, 1.7, 12.0));
        assert!((sim.camera.forward() - Vec3::NEG_Z).length() < 1e-6);
        assert!(!sim.is_outfit_visible());
        assert!(sim.carried().is_none());
    }

    #[test]
    fn test_player_rests_on_floor() {
        let mut sim = studio();
        run(&mut sim, 60, FRAME);

        assert_eq!(sim.frame, 60);
        assert!(sim.player.on_floor);
        assert!(sim.player.foot_position().y.abs() < 0.01);
        assert!((sim.camera.position - sim.player.eye_position()).length() < 1e-6);
    }

    #[test]
    fn test_player_settles_at_studio_centre() {
        let mut sim = studio();
        let radius = sim.player.capsule.radius();
        sim.respawn(Vec3::new(0.0, 1.0, 0.0));

        assert!((sim.player.foot_position() - Vec3::new(0.0, 1.0, 0.0)).length() < 1e-5);
        assert_eq!(sim.player.velocity, Vec3::ZERO);
        assert_eq!(sim.player.capsule.radius(), radius);

        run(&mut sim, 180, FRAME);

        let foot = sim.player.foot_position();
        assert!(sim.player.on_floor, "foot={foot}");
        assert!(foot.y.abs() < 0.01, "foot={foot}");
        assert!(foot.x.abs() < 1e-4 && foot.z.abs() < 1e-4, "foot={foot}");
        assert!(sim.player.velocity.y.abs() < 0.5, "velocity={}", sim.player.velocity);
    }

    #[test]
    fn test_walk_forward() {
        let mut sim = studio();
        let start = sim.camera.position;

        sim.handle_input(InputEvent::KeyDown(KeyCode::KeyW));
        run(&mut sim, 60, FRAME);
        sim.handle_input(InputEvent::KeyUp(KeyCode::KeyW));

        let moved = sim.camera.position - start;
        assert!(moved.z < -1.0, "moved {moved}");
        assert!(moved.x.abs() < 1e-4);
    }

    #[test]
    fn test_long_frames_are_clamped() {
        let mut a = studio();
        let mut b = studio();
        for sim in [&mut a, &mut b] {
            sim.handle_input(InputEvent::KeyDown(KeyCode::KeyW));
        }

        a.frame(1.0);
        b.frame(0.05);

        assert_eq!(a.player, b.player);
        assert_eq!(a.time, b.time);
        assert!((a.time - 0.05).abs() < 1e-6);
    }

    #[test]
    fn test_pointer_lock_flow() {
        let mut sim = studio();

        // Mouse look and interact need the pointer lock
        sim.handle_input(InputEvent::MouseMove { dx: 100.0, dy: 0.0 });
        assert_eq!(sim.camera.yaw, 0.0);
        sim.handle_input(InputEvent::MouseUp);
        assert!(sim.drain_events().is_empty());

        sim.handle_input(InputEvent::MouseDown);
        assert!(sim.input.pointer_locked);
        sim.handle_input(InputEvent::MouseMove {
            dx: 100.0,
            dy: -50.0,
        });
        assert!((sim.camera.yaw + 0.2).abs() < 1e-6);
        assert!((sim.camera.pitch - 0.1).abs() < 1e-6);

        sim.handle_input(InputEvent::PointerLockChanged(false));
        sim.handle_input(InputEvent::MouseMove { dx: 100.0, dy: 0.0 });
        assert!((sim.camera.yaw + 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_cart_delivery() {
        let mut sim = studio();
        let cart = sim.level.scene.find("Cart001").unwrap();

        sim.respawn(Vec3::new(2.0, 0.0, 8.5));
        sim.camera.look_at(Vec3::new(2.0, 0.5, 6.0));
        click(&mut sim);

        let events = sim.drain_events();
        assert!(events.contains(&SimEvent::PickedUp {
            node: cart,
            tag: Tag::Cart,
        }));
        assert_eq!(announcements(&events), vec!["I'm taking Cart"]);
        assert_eq!(sim.notice(), Some("I'm taking Cart"));

        // Walk the cart into the zone
        sim.respawn(Vec3::new(0.0, 0.0, -3.5));
        sim.camera.pitch = 0.0;
        sim.frame(FRAME);

        let events = sim.drain_events();
        assert!(events.contains(&SimEvent::ZoneEntered));
        assert!(events
            .iter()
            .any(|event| matches!(event, SimEvent::OutfitChanged { .. })));
        assert_eq!(announcements(&events), vec!["Thanks! I'll put it on now."]);
        assert!(sim.is_outfit_visible());
        assert_eq!(sim.level.scene.node(cart).children().len(), 1);

        // The cart travels with the player
        let cart_position = sim.level.scene.world_position(cart);
        let horizontal = Vec3::new(
            cart_position.x - sim.camera.position.x,
            0.0,
            cart_position.z - sim.camera.position.z,
        );
        assert!((horizontal.length() - 1.0).abs() < 0.05);

        click(&mut sim);
        assert_eq!(sim.drain_events(), vec![SimEvent::Released { node: cart }]);
        assert!(sim.carried().is_none());
    }

    #[test]
    fn test_zone_prompts_and_rearm() {
        let mut sim = studio();
        let near = Vec3::new(0.0, 0.0, -3.5);
        let far = Vec3::new(0.0, 0.0, 12.0);

        sim.respawn(near);
        sim.frame(FRAME);
        let events = sim.drain_events();
        assert_eq!(
            announcements(&events),
            vec!["Hello! Where are my clothes? Please, bring me some."]
        );

        // Staying inside does not fire again
        run(&mut sim, 10, FRAME);
        assert!(announcements(&sim.drain_events()).is_empty());

        sim.respawn(far);
        sim.frame(FRAME);
        assert!(sim.drain_events().contains(&SimEvent::ZoneRearmed));
        assert!(!sim.zone_inside());

        sim.respawn(near);
        sim.frame(FRAME);
        assert!(sim.drain_events().contains(&SimEvent::ZoneEntered));
    }

    #[test]
    fn test_flash_expires() {
        let mut sim = studio();
        let photo_camera = sim.level.scene.find("PhotoCamera001").unwrap();

        sim.respawn(Vec3::new(-5.0, 0.0, -1.0));
        sim.camera.look_at(Vec3::new(-5.0, 1.2, -4.0));
        click(&mut sim);

        let events = sim.drain_events();
        assert!(matches!(
            events.as_slice(),
            [SimEvent::Flash { node, .. }] if *node == photo_camera
        ));
        assert_eq!(sim.level.scene.light_count(), 1);
        assert!(sim.carried().is_none());

        sim.frame(0.05);
        assert_eq!(sim.level.scene.light_count(), 1);
        sim.frame(0.05);
        assert_eq!(sim.level.scene.light_count(), 0);
    }

    #[test]
    fn test_notice_clears() {
        let mut sim = studio();
        sim.respawn(Vec3::new(0.0, 0.0, -3.5));
        sim.frame(0.05);
        assert!(sim.notice().is_some());

        run(&mut sim, 38, 0.05);
        assert!(sim.notice().is_some());
        run(&mut sim, 2, 0.05);
        assert_eq!(sim.notice(), None);
    }

    #[test]
    fn test_feed_refreshes() {
        let mut sim = studio();
        let screen = sim.level.feed_screen.unwrap();

        run(&mut sim, 99, 0.05);
        assert!(sim.level.scene.node(screen).material.is_none());

        run(&mut sim, 2, 0.05);
        let refreshed: Vec<_> = sim
            .drain_events()
            .into_iter()
            .filter(|event| matches!(event, SimEvent::FeedRefreshed(_)))
            .collect();
        assert_eq!(refreshed.len(), 1);
        assert!(matches!(
            sim.level.scene.node(screen).material,
            Some(Material::Texture(_))
        ));
    }

    #[test]
    fn test_announcer_hears_lines() {
        let recorder = RecordingAnnouncer::new();
        let level = Level::studio(7).unwrap();
        let mut sim = Simulation::with_announcer(
            SimulationConfig::default(),
            level,
            7,
            Box::new(recorder.clone()),
        );

        sim.respawn(Vec3::new(0.0, 0.0, -3.5));
        sim.frame(FRAME);

        assert_eq!(
            recorder.lines(),
            vec!["Hello! Where are my clothes? Please, bring me some.".to_string()]
        );
    }

    #[test]
    fn test_determinism() {
        let inputs: Vec<Vec<InputEvent>> = (0..120)
            .map(|i| {
                let mut events = Vec::new();
                if i % 20 == 0 {
                    events.push(InputEvent::KeyDown(KeyCode::KeyW));
                }
                if i % 20 == 10 {
                    events.push(InputEvent::KeyUp(KeyCode::KeyW));
                    events.push(InputEvent::MouseDown);
                    events.push(InputEvent::MouseMove { dx: 30.0, dy: 0.0 });
                }
                if i % 30 == 0 {
                    events.push(InputEvent::KeyDown(KeyCode::Space));
                }
                if i % 30 == 1 {
                    events.push(InputEvent::KeyUp(KeyCode::Space));
                }
                events
            })
            .collect();

        let mut a = studio();
        let mut b = studio();
        for sim in [&mut a, &mut b] {
            for frame in &inputs {
                for event in frame {
                    sim.handle_input(event.clone());
                }
                sim.frame(FRAME);
            }
        }

        assert_eq!(a.player, b.player);
        assert_eq!(a.camera, b.camera);
        assert_eq!(a.drain_events(), b.drain_events());
    }
}
