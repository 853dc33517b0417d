use super::input::{ActionStates, InputAction};
use super::rendering::{DrawList, Viewport};
use crate::content::ContentDatabase;
use crate::geometry::Vec2;

pub const DEFAULT_CANVAS: Viewport = Viewport {
    width: 800,
    height: 600,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SceneKey {
    A,
    B,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneCommand {
    None,
    SwitchTo(SceneKey),
    HardResetTo(SceneKey),
}

/// Everything a scene may read about input during one fixed tick.
///
/// Held actions are levels; `*_pressed` values are edges that are true for exactly one tick.
#[derive(Debug, Clone, Copy, Default)]
pub struct InputSnapshot {
    switch_scene_pressed: bool,
    actions: ActionStates,
    interact_pressed: bool,
    back_pressed: bool,
    digit_pressed: Option<u8>,
    cursor_position_px: Option<Vec2>,
    left_click_pressed: bool,
    window_width: u32,
    window_height: u32,
}

impl InputSnapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        switch_scene_pressed: bool,
        actions: ActionStates,
        interact_pressed: bool,
        back_pressed: bool,
        digit_pressed: Option<u8>,
        cursor_position_px: Option<Vec2>,
        left_click_pressed: bool,
        window_width: u32,
        window_height: u32,
    ) -> Self {
        Self {
            switch_scene_pressed,
            actions,
            interact_pressed,
            back_pressed,
            digit_pressed,
            cursor_position_px,
            left_click_pressed,
            window_width,
            window_height,
        }
    }

    pub fn switch_scene_pressed(&self) -> bool {
        self.switch_scene_pressed
    }

    pub fn is_down(&self, action: InputAction) -> bool {
        self.actions.is_down(action)
    }

    pub fn interact_pressed(&self) -> bool {
        self.interact_pressed
    }

    pub fn back_pressed(&self) -> bool {
        self.back_pressed
    }

    /// Number key `1`..`9` pressed this tick.
    pub fn digit_pressed(&self) -> Option<u8> {
        self.digit_pressed
    }

    pub fn cursor_position_px(&self) -> Option<Vec2> {
        self.cursor_position_px
    }

    pub fn left_click_pressed(&self) -> bool {
        self.left_click_pressed
    }

    pub fn window_size(&self) -> Viewport {
        Viewport {
            width: self.window_width,
            height: self.window_height,
        }
    }

    pub fn with_action_down(mut self, action: InputAction, is_down: bool) -> Self {
        self.actions.set(action, is_down);
        self
    }

    pub fn with_switch_scene_pressed(mut self, pressed: bool) -> Self {
        self.switch_scene_pressed = pressed;
        self
    }

    pub fn with_interact_pressed(mut self, pressed: bool) -> Self {
        self.interact_pressed = pressed;
        self
    }

    pub fn with_back_pressed(mut self, pressed: bool) -> Self {
        self.back_pressed = pressed;
        self
    }

    pub fn with_digit_pressed(mut self, digit: Option<u8>) -> Self {
        self.digit_pressed = digit;
        self
    }

    pub fn with_cursor_position_px(mut self, cursor_position_px: Option<Vec2>) -> Self {
        self.cursor_position_px = cursor_position_px;
        self
    }

    pub fn with_left_click_pressed(mut self, pressed: bool) -> Self {
        self.left_click_pressed = pressed;
        self
    }

    pub fn with_window_size(mut self, window_size: (u32, u32)) -> Self {
        self.window_width = window_size.0;
        self.window_height = window_size.1;
        self
    }
}

pub trait Scene {
    fn load(&mut self, content: &ContentDatabase);
    fn update(&mut self, fixed_dt_seconds: f32, input: &InputSnapshot) -> SceneCommand;
    fn render(&self, draw: &mut DrawList);
    fn unload(&mut self);
    fn canvas_size(&self) -> Viewport {
        DEFAULT_CANVAS
    }
    fn debug_title(&self) -> Option<String> {
        None
    }
}

struct SceneRuntime {
    scene: Box<dyn Scene>,
    is_loaded: bool,
}

pub(crate) struct SceneMachine {
    scene_a: SceneRuntime,
    scene_b: SceneRuntime,
    active_scene: SceneKey,
    content: ContentDatabase,
}

impl SceneMachine {
    pub(crate) fn new(
        scene_a: Box<dyn Scene>,
        scene_b: Box<dyn Scene>,
        active_scene: SceneKey,
        content: ContentDatabase,
    ) -> Self {
        Self {
            scene_a: SceneRuntime {
                scene: scene_a,
                is_loaded: false,
            },
            scene_b: SceneRuntime {
                scene: scene_b,
                is_loaded: false,
            },
            active_scene,
            content,
        }
    }

    pub(crate) fn active_scene(&self) -> SceneKey {
        self.active_scene
    }

    pub(crate) fn load_active(&mut self) {
        self.load_scene_if_needed(self.active_scene);
    }

    pub(crate) fn update_active(
        &mut self,
        fixed_dt_seconds: f32,
        input: &InputSnapshot,
    ) -> SceneCommand {
        self.active_runtime_mut()
            .scene
            .update(fixed_dt_seconds, input)
    }

    pub(crate) fn render_active(&self, draw: &mut DrawList) {
        let scene = &self.runtime_ref(self.active_scene).scene;
        draw.reset(scene.canvas_size());
        scene.render(draw);
    }

    pub(crate) fn debug_title_active(&self) -> Option<String> {
        self.runtime_ref(self.active_scene).scene.debug_title()
    }

    /// Applies a scene command; returns true when the active scene changed or was rebuilt.
    pub(crate) fn apply_command(&mut self, command: SceneCommand) -> bool {
        match command {
            SceneCommand::SwitchTo(next_scene) => self.switch_to(next_scene),
            SceneCommand::HardResetTo(next_scene) => self.hard_reset_to(next_scene),
            SceneCommand::None => false,
        }
    }

    pub(crate) fn switch_to(&mut self, next_scene: SceneKey) -> bool {
        if self.active_scene == next_scene {
            return false;
        }

        self.load_scene_if_needed(next_scene);
        self.active_scene = next_scene;
        true
    }

    pub(crate) fn hard_reset_to(&mut self, next_scene: SceneKey) -> bool {
        let content = &self.content;
        let runtime = match next_scene {
            SceneKey::A => &mut self.scene_a,
            SceneKey::B => &mut self.scene_b,
        };
        if runtime.is_loaded {
            runtime.scene.unload();
        }
        runtime.scene.load(content);
        runtime.is_loaded = true;
        self.active_scene = next_scene;
        true
    }

    pub(crate) fn shutdown_all(&mut self) {
        for runtime in [&mut self.scene_a, &mut self.scene_b] {
            if runtime.is_loaded {
                runtime.scene.unload();
                runtime.is_loaded = false;
            }
        }
    }

    fn load_scene_if_needed(&mut self, key: SceneKey) {
        let content = &self.content;
        let runtime = match key {
            SceneKey::A => &mut self.scene_a,
            SceneKey::B => &mut self.scene_b,
        };
        if runtime.is_loaded {
            return;
        }
        runtime.scene.load(content);
        runtime.is_loaded = true;
    }

    fn active_runtime_mut(&mut self) -> &mut SceneRuntime {
        match self.active_scene {
            SceneKey::A => &mut self.scene_a,
            SceneKey::B => &mut self.scene_b,
        }
    }

    fn runtime_ref(&self, key: SceneKey) -> &SceneRuntime {
        match key {
            SceneKey::A => &self.scene_a,
            SceneKey::B => &self.scene_b,
        }
    }
}
