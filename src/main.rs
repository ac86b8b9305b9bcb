//! Darkrise entry point
//!
//! Headless native driver: loads settings and levels, then runs the session
//! on a fixed timestep until the darkness catches the player. Stands in for
//! the physics layer by reporting player/darkness overlap as contacts.

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::path::{Path, PathBuf};

    use anyhow::Context;
    use darkrise::consts::*;
    use darkrise::sim::{Contact, GameEvent, GamePhase, LevelLibrary, Session, TickInput, tick};
    use darkrise::Settings;

    /// Frame time fed to the accumulator
    const FRAME_DT: f32 = 1.0 / 30.0;
    /// Give up after this many frames (two simulated minutes)
    const MAX_FRAMES: u32 = 3600;

    struct Host {
        session: Session,
        accumulator: f32,
        input: TickInput,
        /// Player currently overlapping the darkness
        swallowed: bool,
        done: bool,
    }

    impl Host {
        fn new(session: Session) -> Self {
            Self {
                session,
                accumulator: 0.0,
                input: TickInput::default(),
                swallowed: false,
                done: false,
            }
        }

        fn update(&mut self, dt: f32) -> anyhow::Result<()> {
            let dt = dt.min(0.1);
            self.accumulator += dt;

            let mut substeps = 0;
            while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
                self.detect_contacts();
                let input = std::mem::take(&mut self.input);
                tick(&mut self.session, &input, SIM_DT)?;
                self.accumulator -= SIM_DT;
                substeps += 1;
                self.report();
            }
            Ok(())
        }

        fn detect_contacts(&mut self) {
            let (Ok(player), Some(darkness)) = (self.session.player(), self.session.darkness())
            else {
                return;
            };
            let Some(body) = self.session.scene().get(player) else {
                return;
            };
            let touching = darkness.bounds().top >= body.bounds().bottom;
            if touching && !self.swallowed {
                self.input
                    .contacts
                    .push(Contact::begin(darkness.id, player, body.pos));
            }
            self.swallowed = touching;
        }

        fn report(&mut self) {
            for event in self.session.drain_events() {
                match event {
                    GameEvent::PhaseChanged { to, .. } => log::debug!("Now {:?}", to),
                    GameEvent::Cue(cue) => log::debug!("Cue {:?}", cue),
                    GameEvent::LevelLoaded { name, number } => {
                        log::info!("Level {} ({}) ready", number, name)
                    }
                    GameEvent::NewHeight(y) => log::info!("New height {:.1}", y),
                    GameEvent::Completed { last } => {
                        log::info!("All levels cleared after level {}", last);
                        self.done = true;
                    }
                }
            }
            if self.session.phase() == GamePhase::Finished && self.session.speed() <= 0.0 {
                self.done = true;
            }
        }
    }

    pub fn run() -> anyhow::Result<()> {
        env_logger::init();
        log::info!("Darkrise (native) starting...");

        let path = std::env::args()
            .nth(1)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("settings.json"));
        let settings = Settings::load(&path);

        let mut library = LevelLibrary::builtin();
        if let Some(dir) = &settings.level_dir {
            library
                .load_dir(Path::new(dir))
                .with_context(|| format!("loading levels from {}", dir))?;
        }

        let session = Session::new(settings, library).context("building the first level")?;
        let mut host = Host::new(session);
        host.report();
        host.session.start()?;

        let mut frames = 0;
        while !host.done && frames < MAX_FRAMES {
            host.update(FRAME_DT)?;
            frames += 1;
        }

        log::info!(
            "Stopped after {} ticks on level {} ({:?})",
            host.session.time_ticks(),
            host.session.level(),
            host.session.phase()
        );
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> anyhow::Result<()> {
    native::run()
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The library is driven by the host page on the web
}
