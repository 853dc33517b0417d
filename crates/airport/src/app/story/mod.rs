//! Slideshow mode: the same trip told as a table of static scenes linked by choices.

mod scene;

pub(crate) use scene::StoryScene;

use std::collections::BTreeMap;

use engine::{StoryDefs, StorySceneDef};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub(crate) enum StoryError {
    #[error("unknown story scene '{key}'")]
    UnknownScene { key: String },
    #[error("no choice number {number} in this scene")]
    NoSuchChoice { number: usize },
    #[error("the story has no scenes")]
    EmptyStory,
}

/// Navigation state over the compiled story table.
#[derive(Debug, Clone)]
pub(crate) struct StoryBook {
    scenes: BTreeMap<String, StorySceneDef>,
    current: String,
}

impl StoryBook {
    pub(crate) fn new(defs: &StoryDefs) -> Result<Self, StoryError> {
        let start = defs.start.clone().ok_or(StoryError::EmptyStory)?;
        if !defs.scenes.contains_key(&start) {
            return Err(StoryError::UnknownScene { key: start });
        }
        Ok(Self {
            scenes: defs.scenes.clone(),
            current: start,
        })
    }

    pub(crate) fn current_key(&self) -> &str {
        &self.current
    }

    pub(crate) fn current(&self) -> Option<&StorySceneDef> {
        self.scenes.get(&self.current)
    }

    /// Jumps to `key`. The current scene is unchanged when the key is unknown.
    pub(crate) fn go_to(&mut self, key: &str) -> Result<(), StoryError> {
        if !self.scenes.contains_key(key) {
            return Err(StoryError::UnknownScene {
                key: key.to_string(),
            });
        }
        self.current = key.to_string();
        Ok(())
    }

    /// Follows the zero-based choice `index` of the current scene.
    pub(crate) fn choose(&mut self, index: usize) -> Result<(), StoryError> {
        let next = self
            .current()
            .and_then(|scene| scene.choices.get(index))
            .map(|choice| choice.next.clone())
            .ok_or(StoryError::NoSuchChoice { number: index + 1 })?;
        self.go_to(&next)
    }
}
