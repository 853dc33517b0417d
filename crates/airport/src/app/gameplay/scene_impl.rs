use std::time::Duration;

use engine::{ContentDatabase, DrawList, InputSnapshot, Scene, SceneCommand, SceneKey, Viewport};
use tracing::info;

use super::audio::AudioSink;
use super::intent::TickIntent;
use super::render::draw_session;
use super::session::{Session, SessionSettings};
use super::systems::TickDriver;

/// The walkable airport. Owns one [`Session`] between `load` and `unload`.
pub(crate) struct RoamScene {
    scene_name: &'static str,
    own_key: SceneKey,
    switch_target: SceneKey,
    settings: SessionSettings,
    session: Option<Session>,
    driver: TickDriver,
    audio: Box<dyn AudioSink>,
}

impl RoamScene {
    pub(crate) fn new(
        own_key: SceneKey,
        switch_target: SceneKey,
        settings: SessionSettings,
        audio: Box<dyn AudioSink>,
    ) -> Self {
        Self {
            scene_name: "roam",
            own_key,
            switch_target,
            settings,
            session: None,
            driver: TickDriver::default(),
            audio,
        }
    }

    #[cfg(test)]
    pub(crate) fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    #[cfg(test)]
    pub(crate) fn session_mut(&mut self) -> Option<&mut Session> {
        self.session.as_mut()
    }
}

impl Scene for RoamScene {
    fn load(&mut self, content: &ContentDatabase) {
        let session = Session::new(content, &self.settings);
        info!(
            scene = self.scene_name,
            zones = session.world.zones.len(),
            npcs = session.npcs.len(),
            money = session.player.money,
            "scene_loaded"
        );
        self.session = Some(session);
    }

    fn update(&mut self, fixed_dt_seconds: f32, input: &InputSnapshot) -> SceneCommand {
        if input.switch_scene_pressed() {
            return SceneCommand::SwitchTo(self.switch_target);
        }
        let canvas = self.canvas_size();
        let Some(session) = self.session.as_mut() else {
            return SceneCommand::None;
        };

        let intent = TickIntent::from_snapshot(input, canvas);
        let outcome = self.driver.run_once_per_tick(
            session,
            &intent,
            Duration::from_secs_f32(fixed_dt_seconds.max(0.0)),
        );
        for cue in session.drain_cues() {
            self.audio.play_cue(cue);
        }

        if outcome.restart_requested {
            info!(scene = self.scene_name, "session_restart_requested");
            return SceneCommand::HardResetTo(self.own_key);
        }
        SceneCommand::None
    }

    fn render(&self, draw: &mut DrawList) {
        if let Some(session) = &self.session {
            draw_session(session, draw);
        }
    }

    fn unload(&mut self) {
        if self.session.take().is_some() {
            info!(scene = self.scene_name, "scene_unloaded");
        }
    }

    fn canvas_size(&self) -> Viewport {
        match &self.session {
            Some(session) => Viewport {
                width: session.world.width.round() as u32,
                height: session.world.height.round() as u32,
            },
            None => engine::DEFAULT_CANVAS,
        }
    }

    fn debug_title(&self) -> Option<String> {
        let session = self.session.as_ref()?;
        let area = if session.is_won() {
            "Boarded"
        } else {
            session.area_label()
        };
        Some(format!("Airport Run | {area} | ${}", session.player.money))
    }
}
