//! The walkable airport: world model, actors, the per-tick systems and the roam scene.

use engine::{Scene, SceneKey};

mod actors;
mod audio;
mod intent;
mod menu;
mod messages;
mod npc;
mod progress;
mod render;
mod scene_impl;
mod session;
mod systems;
mod world;

pub(crate) use messages::MessageDurations;
pub(crate) use session::SessionSettings;

use super::story::StoryScene;
use audio::TracingAudioSink;
use scene_impl::RoamScene;

/// Scene A is the roam mode, scene B the story slideshow. Tab flips between them.
pub(crate) fn build_scene_pair(settings: SessionSettings) -> (Box<dyn Scene>, Box<dyn Scene>) {
    let scene_a = RoamScene::new(
        SceneKey::A,
        SceneKey::B,
        settings,
        Box::new(TracingAudioSink),
    );
    let scene_b = StoryScene::new(SceneKey::A);
    (Box::new(scene_a), Box::new(scene_b))
}

#[cfg(test)]
mod tests;
