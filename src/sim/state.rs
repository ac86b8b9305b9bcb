//! Session state and phase transitions
//!
//! A `Session` owns the scene, the player's support status and the level
//! counter for one play session. Every phase change goes through the
//! transition methods here; `tick` only calls into them.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::dispatch::DispatchTable;
use super::entity::{Entity, EntityId, EntityKind};
use super::generator::LevelGenerator;
use super::level::{LevelLibrary, level_name};
use super::scene::Scene;
use super::schedule::{ActionKey, Scheduler};
use super::support::PlayerStatus;
use crate::consts::*;
use crate::error::{LevelError, Result};
use crate::settings::Settings;

/// Current phase of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Level 1 built, simulation paused, waiting for start
    StartScreen,
    /// Active gameplay
    Playing,
    /// Entities frozen in place
    Paused,
    /// Sliding out the finished level and loading the next
    LevelChange,
    /// Player was swallowed; simulation winding down
    Finished,
}

/// Cues for the external audio layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SoundCue {
    Start,
    LevelChange,
    Finish,
}

/// Things the host may want to react to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    PhaseChanged { from: GamePhase, to: GamePhase },
    Cue(SoundCue),
    LevelLoaded { name: String, number: u32 },
    NewHeight(f32),
    /// No level follows the one just finished
    Completed { last: u32 },
}

pub struct Session {
    pub(super) settings: Settings,
    library: LevelLibrary,
    pub(super) dispatch: DispatchTable,
    pub(super) phase: GamePhase,
    /// Number of the level currently built
    level: u32,
    level_name: String,
    generator: LevelGenerator,
    pub(super) scene: Scene,
    pub(super) player: Option<EntityId>,
    pub(super) controller: Option<EntityId>,
    pub(super) darkness: Option<EntityId>,
    pub(super) indicator: Option<EntityId>,
    pub(super) status: PlayerStatus,
    /// Moving platform the player is riding
    pub(super) riding: Option<EntityId>,
    pub(super) scheduler: Scheduler,
    /// Simulation speed, 1 normally; ramps to 0 after finishing
    pub(super) speed: f32,
    /// Simulation clock stopped (start screen / paused)
    pub(super) paused: bool,
    /// How far the current level has slid down so far
    pub(super) slide_offset: f32,
    pub(super) time_ticks: u64,
    events: Vec<GameEvent>,
}

impl Session {
    /// Build level 1 and wait on the start screen
    pub fn new(settings: Settings, library: LevelLibrary) -> Result<Self> {
        let generator = LevelGenerator::new(settings.cell_size())
            .with_patrol(settings.platform_travel, settings.platform_speed);
        let mut session = Self {
            settings,
            library,
            dispatch: DispatchTable::standard(),
            phase: GamePhase::StartScreen,
            level: FIRST_LEVEL,
            level_name: String::new(),
            generator,
            scene: Scene::new(),
            player: None,
            controller: None,
            darkness: None,
            indicator: None,
            status: PlayerStatus::new(),
            riding: None,
            scheduler: Scheduler::new(),
            speed: 1.0,
            paused: true,
            slide_offset: 0.0,
            time_ticks: 0,
            events: Vec::new(),
        };
        session.build_level(FIRST_LEVEL)?;
        session.set_controller_visible(false);
        Ok(session)
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn level_name(&self) -> &str {
        &self.level_name
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn status(&self) -> &PlayerStatus {
        &self.status
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn riding(&self) -> Option<EntityId> {
        self.riding
    }

    pub fn time_ticks(&self) -> u64 {
        self.time_ticks
    }

    pub fn is_scheduled(&self, key: ActionKey) -> bool {
        self.scheduler.is_scheduled(key)
    }

    /// The current player, or `PlayerNotFound`
    pub fn player(&self) -> Result<EntityId> {
        self.player.ok_or_else(|| LevelError::PlayerNotFound {
            level: self.level_name.clone(),
        })
    }

    pub fn player_position(&self) -> Result<Vec2> {
        let id = self.player()?;
        self.scene
            .get(id)
            .map(|e| e.pos)
            .ok_or_else(|| LevelError::PlayerNotFound {
                level: self.level_name.clone(),
            })
    }

    pub fn controller(&self) -> Option<&Entity> {
        self.controller.and_then(|id| self.scene.get(id))
    }

    pub fn darkness(&self) -> Option<&Entity> {
        self.darkness.and_then(|id| self.scene.get(id))
    }

    pub fn indicator(&self) -> Option<&Entity> {
        self.indicator.and_then(|id| self.scene.get(id))
    }

    /// Take the events emitted since the last call
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub(super) fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    fn set_phase(&mut self, to: GamePhase) {
        let from = self.phase;
        if from == to {
            return;
        }
        log::info!("Phase {:?} -> {:?} (level {})", from, to, self.level);
        self.phase = to;
        self.emit(GameEvent::PhaseChanged { from, to });
    }

    fn set_controller_visible(&mut self, visible: bool) {
        if let Some(controller) = self.controller.and_then(|id| self.scene.get_mut(id)) {
            controller.visible = visible;
        }
    }

    /// Tear down the scene and build level `number` from the library.
    ///
    /// On `PlayerNotFound` the level's other entities stay attached and the
    /// player reference is cleared.
    fn build_level(&mut self, number: u32) -> Result<()> {
        let name = level_name(self.settings.difficulty, number);
        let source = self.library.get(&name)?;

        self.scene.teardown();
        self.status = PlayerStatus::new();
        self.riding = None;
        self.slide_offset = 0.0;
        self.player = None;

        self.generator.read(&[source]);
        self.generator.generate(&mut self.scene);

        let screen = self.settings.screen_size();
        let mut darkness = Entity::new(EntityKind::Darkness, Vec2::new(screen.x, DARKNESS_HEIGHT));
        darkness.pos = Vec2::new(
            screen.x * 0.5,
            -self.settings.darkness_start_offset - DARKNESS_HEIGHT * 0.5,
        );
        self.darkness = Some(self.scene.attach(darkness));

        let mut controller = Entity::new(EntityKind::Controller, Vec2::new(screen.x, CONTROLLER_HEIGHT));
        controller.pos = Vec2::new(screen.x * 0.5, CONTROLLER_HEIGHT * 0.5);
        controller.visible = self.phase == GamePhase::Playing;
        self.controller = Some(self.scene.attach(controller));

        let mut indicator = Entity::new(EntityKind::Indicator, Vec2::splat(INDICATOR_SIZE));
        indicator.visible = false;
        self.indicator = Some(self.scene.attach(indicator));

        self.level = number;
        self.level_name = name.clone();

        match self.scene.find_player(&name) {
            Ok(player) => self.player = Some(player),
            Err(e) => {
                log::warn!("Level load failed: {}", e);
                return Err(e);
            }
        }

        self.emit(GameEvent::LevelLoaded { name, number });
        Ok(())
    }

    fn enter_playing(&mut self) {
        self.paused = false;
        self.set_controller_visible(true);
        self.set_phase(GamePhase::Playing);
    }

    /// Back to the start screen with a fresh level 1
    pub fn exit(&mut self) -> Result<()> {
        self.scheduler.cancel_all();
        self.speed = 1.0;
        self.paused = true;
        self.set_phase(GamePhase::StartScreen);
        let built = self.build_level(FIRST_LEVEL);
        self.set_controller_visible(false);
        built
    }

    /// Rebuild level 1 and play immediately
    pub fn restart(&mut self) -> Result<()> {
        self.scheduler.cancel_all();
        self.speed = 1.0;
        self.build_level(FIRST_LEVEL)?;
        self.emit(GameEvent::Cue(SoundCue::Start));
        self.enter_playing();
        Ok(())
    }

    /// Start playing from the start screen (or resume from pause).
    ///
    /// A finished session restarts; a level change in progress is left alone.
    pub fn start(&mut self) -> Result<()> {
        match self.phase {
            GamePhase::StartScreen => {
                self.player()?;
                self.emit(GameEvent::Cue(SoundCue::Start));
                self.enter_playing();
            }
            GamePhase::Paused => self.enter_playing(),
            GamePhase::Finished => self.restart()?,
            GamePhase::Playing | GamePhase::LevelChange => {}
        }
        Ok(())
    }

    /// Leave pause without rebuilding anything
    pub fn resume(&mut self) {
        if self.phase == GamePhase::Paused {
            self.enter_playing();
        }
    }

    pub fn pause(&mut self) {
        if self.phase == GamePhase::Playing {
            self.paused = true;
            self.set_phase(GamePhase::Paused);
        }
    }

    /// Player touched the darkness: wind the simulation down
    pub fn finish(&mut self) {
        if self.phase != GamePhase::Playing {
            return;
        }
        self.status.kill();
        self.set_phase(GamePhase::Finished);
        self.scheduler.schedule(ActionKey::SlowDown, FINISH_SLOWDOWN_SECS);
        self.emit(GameEvent::Cue(SoundCue::Finish));
    }

    /// Player reached the exit: slide the level out, then load the next.
    ///
    /// Returns false if ignored (already changing, or not playing).
    pub fn begin_level_change(&mut self) -> bool {
        if self.phase == GamePhase::LevelChange {
            log::debug!("Level change already in progress, ignoring trigger");
            return false;
        }
        if self.phase != GamePhase::Playing {
            return false;
        }
        self.set_phase(GamePhase::LevelChange);
        self.slide_offset = 0.0;
        self.scheduler.schedule(ActionKey::LevelSlide, LEVEL_SLIDE_SECS);
        self.emit(GameEvent::Cue(SoundCue::LevelChange));
        true
    }

    /// Move everything down to `progress` of one screen height
    pub(super) fn slide_to(&mut self, progress: f32) {
        let target = -self.settings.screen_height * progress;
        let delta = target - self.slide_offset;
        self.scene.shift_all(Vec2::new(0.0, delta));
        self.slide_offset = target;
    }

    /// The slide finished: wait, then load
    pub(super) fn slide_finished(&mut self) {
        self.scheduler.schedule(ActionKey::LevelLoad, LEVEL_LOAD_DELAY_SECS);
    }

    /// Delay elapsed: build the next level and resume play.
    ///
    /// If the next level fails to build, the session stays in `LevelChange`
    /// with nothing scheduled; the host recovers with `exit` or `restart`.
    pub(super) fn load_next_level(&mut self) -> Result<()> {
        let next = self.level + 1;
        if !self
            .library
            .contains(&level_name(self.settings.difficulty, next))
        {
            log::info!("No level after {}, session complete", self.level);
            self.emit(GameEvent::Completed { last: self.level });
            self.set_phase(GamePhase::Finished);
            return Ok(());
        }
        self.build_level(next)?;
        self.enter_playing();
        Ok(())
    }

    /// Simulation speed during the finish ramp
    pub(super) fn slow_down_to(&mut self, progress: f32) {
        self.speed = 1.0 - progress;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::level::TextLevel;
    use crate::settings::Difficulty;

    fn library(levels: &[&str]) -> LevelLibrary {
        let mut library = LevelLibrary::new();
        for (n, text) in levels.iter().enumerate() {
            library.insert(TextLevel::new(level_name(Difficulty::Easy, n as u32 + 1), *text));
        }
        library
    }

    #[test]
    fn test_new_session_waits_on_start_screen() {
        let mut session = Session::new(Settings::default(), LevelLibrary::builtin()).unwrap();
        assert_eq!(session.phase(), GamePhase::StartScreen);
        assert_eq!(session.level(), 1);
        assert_eq!(session.level_name(), "easy-01");
        assert!(session.is_paused());
        assert!(!session.controller().unwrap().visible);
        assert!(session.player().is_ok());
        assert!(!session.indicator().unwrap().visible);
        assert!(matches!(
            session.drain_events().as_slice(),
            [GameEvent::LevelLoaded { number: 1, .. }]
        ));
    }

    #[test]
    fn test_missing_player_is_reported() {
        let result = Session::new(Settings::default(), library(&["##\n"]));
        assert!(matches!(result, Err(LevelError::PlayerNotFound { level }) if level == "easy-01"));
    }

    #[test]
    fn test_missing_first_level() {
        let result = Session::new(Settings::default(), LevelLibrary::new());
        assert!(matches!(result, Err(LevelError::UnknownLevel(_))));
    }

    #[test]
    fn test_start_pause_resume() {
        let mut session = Session::new(Settings::default(), LevelLibrary::builtin()).unwrap();
        session.start().unwrap();
        assert_eq!(session.phase(), GamePhase::Playing);
        assert!(!session.is_paused());
        assert!(session.controller().unwrap().visible);

        let before = session.player().unwrap();
        session.pause();
        assert_eq!(session.phase(), GamePhase::Paused);
        assert!(session.is_paused());

        session.resume();
        assert_eq!(session.phase(), GamePhase::Playing);
        // Resuming never rebuilds
        assert_eq!(session.player().unwrap(), before);
    }

    #[test]
    fn test_pause_only_from_playing() {
        let mut session = Session::new(Settings::default(), LevelLibrary::builtin()).unwrap();
        session.pause();
        assert_eq!(session.phase(), GamePhase::StartScreen);
    }

    #[test]
    fn test_level_change_guard() {
        let mut session = Session::new(Settings::default(), LevelLibrary::builtin()).unwrap();
        session.start().unwrap();
        session.drain_events();

        assert!(session.begin_level_change());
        assert!(!session.begin_level_change());
        let cues = session
            .drain_events()
            .into_iter()
            .filter(|e| *e == GameEvent::Cue(SoundCue::LevelChange))
            .count();
        assert_eq!(cues, 1);
        assert!(session.is_scheduled(ActionKey::LevelSlide));
    }

    #[test]
    fn test_level_change_requires_playing() {
        let mut session = Session::new(Settings::default(), LevelLibrary::builtin()).unwrap();
        assert!(!session.begin_level_change());
        assert_eq!(session.phase(), GamePhase::StartScreen);
    }

    #[test]
    fn test_exit_resets_everything() {
        let mut session = Session::new(Settings::default(), LevelLibrary::builtin()).unwrap();
        session.start().unwrap();
        session.begin_level_change();
        session.slide_finished();
        session.load_next_level().unwrap();
        assert_eq!(session.level(), 2);

        session.finish();
        assert!(session.is_scheduled(ActionKey::SlowDown));

        session.exit().unwrap();
        assert_eq!(session.phase(), GamePhase::StartScreen);
        assert_eq!(session.level(), 1);
        assert!(!session.is_scheduled(ActionKey::SlowDown));
        assert!(!session.controller().unwrap().visible);
        assert_eq!(session.speed(), 1.0);
    }

    #[test]
    fn test_finish_from_playing_only() {
        let mut session = Session::new(Settings::default(), LevelLibrary::builtin()).unwrap();
        session.finish();
        assert_eq!(session.phase(), GamePhase::StartScreen);

        session.start().unwrap();
        session.finish();
        assert_eq!(session.phase(), GamePhase::Finished);
        assert!(session.drain_events().contains(&GameEvent::Cue(SoundCue::Finish)));
    }

    #[test]
    fn test_start_after_finish_restarts() {
        let mut session = Session::new(Settings::default(), LevelLibrary::builtin()).unwrap();
        session.start().unwrap();
        session.finish();
        session.slow_down_to(0.5);
        session.start().unwrap();
        assert_eq!(session.phase(), GamePhase::Playing);
        assert_eq!(session.speed(), 1.0);
        assert!(!session.is_scheduled(ActionKey::SlowDown));
    }

    #[test]
    fn test_last_level_completes_session() {
        let mut session = Session::new(Settings::default(), library(&["P\n#\n"])).unwrap();
        session.start().unwrap();
        session.begin_level_change();
        session.load_next_level().unwrap();
        assert_eq!(session.phase(), GamePhase::Finished);
        assert!(session.drain_events().contains(&GameEvent::Completed { last: 1 }));
    }

    #[test]
    fn test_next_level_without_player_fails() {
        let mut session = Session::new(Settings::default(), library(&["P\n#\n", "#\n"])).unwrap();
        session.start().unwrap();
        session.begin_level_change();
        let err = session.load_next_level().unwrap_err();
        assert!(matches!(err, LevelError::PlayerNotFound { ref level } if level == "easy-02"));
        assert!(session.player().is_err());
        assert!(session.player_position().is_err());

        assert_eq!(session.phase(), GamePhase::LevelChange);
        assert!(!session.is_scheduled(ActionKey::LevelLoad));
        session.exit().unwrap();
        assert_eq!(session.phase(), GamePhase::StartScreen);
        assert_eq!(session.level(), 1);
        assert!(session.player().is_ok());
    }
}
