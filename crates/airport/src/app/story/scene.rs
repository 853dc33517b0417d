use engine::{
    screen_to_canvas_px, Color, ContentDatabase, DrawList, InputSnapshot, Rect, Scene,
    SceneCommand, SceneKey, StorySceneDef, Vec2, DEFAULT_CANVAS, LINE_ADVANCE_PX,
};
use tracing::{debug, info, warn};

use super::StoryBook;
use crate::app::ui::{button_at, draw_button, stack_buttons, wrap_text, MenuButton};

const TEXT_LEFT: f32 = 40.0;
const TEXT_WIDTH: f32 = 420.0;
const IMAGE_FRAME: Rect = Rect::new(500.0, 60.0, 260.0, 180.0);
const CHOICES_TOP: f32 = 340.0;
const BACKDROP: Color = Color::rgb(0xF8, 0xF9, 0xF9);
const INK: Color = Color::rgb(0x1C, 0x28, 0x33);
const FRAME_FILL: Color = Color::rgb(0xD5, 0xD8, 0xDC);
const NOTICE_INK: Color = Color::rgb(0xB0, 0x3A, 0x2E);

pub(crate) struct StoryScene {
    switch_target: SceneKey,
    book: Option<StoryBook>,
    notice: Option<String>,
}

impl StoryScene {
    pub(crate) fn new(switch_target: SceneKey) -> Self {
        Self {
            switch_target,
            book: None,
            notice: None,
        }
    }

    fn choose(&mut self, index: usize) {
        let Some(book) = self.book.as_mut() else {
            return;
        };
        match book.choose(index) {
            Ok(()) => {
                debug!(scene = book.current_key(), "story_advanced");
                self.notice = None;
            }
            Err(err) => {
                debug!(error = %err, "story_choice_rejected");
                self.notice = Some(err.to_string());
            }
        }
    }
}

/// One button per choice, in declared order. Actions are zero-based choice indices.
fn choice_buttons(scene: &StorySceneDef) -> Vec<MenuButton<usize>> {
    stack_buttons(
        Vec2::new(TEXT_LEFT, CHOICES_TOP),
        TEXT_WIDTH,
        scene
            .choices
            .iter()
            .enumerate()
            .map(|(index, choice)| (index, format!("{}. {}", index + 1, choice.label))),
    )
}

impl Scene for StoryScene {
    fn load(&mut self, content: &ContentDatabase) {
        match StoryBook::new(&content.story) {
            Ok(book) => {
                info!(
                    scenes = content.story.scenes.len(),
                    start = book.current_key(),
                    "story_loaded"
                );
                self.book = Some(book);
                self.notice = None;
            }
            Err(err) => {
                warn!(error = %err, "story_unavailable");
                self.book = None;
                self.notice = Some(err.to_string());
            }
        }
    }

    fn update(&mut self, _fixed_dt_seconds: f32, input: &InputSnapshot) -> SceneCommand {
        if input.switch_scene_pressed() {
            return SceneCommand::SwitchTo(self.switch_target);
        }
        let Some(scene) = self.book.as_ref().and_then(StoryBook::current) else {
            return SceneCommand::None;
        };

        let click = input
            .cursor_position_px()
            .filter(|_| input.left_click_pressed())
            .and_then(|cursor| screen_to_canvas_px(input.window_size(), DEFAULT_CANVAS, cursor));
        let picked = button_at(&choice_buttons(scene), click).or_else(|| {
            input
                .digit_pressed()
                .map(|digit| usize::from(digit).saturating_sub(1))
        });
        if let Some(index) = picked {
            self.choose(index);
        }
        SceneCommand::None
    }

    fn render(&self, draw: &mut DrawList) {
        draw.set_clear_color(BACKDROP);
        let Some(scene) = self.book.as_ref().and_then(StoryBook::current) else {
            if let Some(notice) = &self.notice {
                draw.text(Vec2::new(TEXT_LEFT, 40.0), notice.as_str(), NOTICE_INK);
            }
            return;
        };

        draw.text(Vec2::new(TEXT_LEFT, 40.0), scene.title.as_str(), INK);
        for (row, line) in wrap_text(&scene.body, TEXT_WIDTH).into_iter().enumerate() {
            let y = 70.0 + row as f32 * LINE_ADVANCE_PX;
            draw.text(Vec2::new(TEXT_LEFT, y), line, INK);
        }

        if let Some(image) = &scene.image {
            draw.fill_rect(IMAGE_FRAME, FRAME_FILL);
            draw.outline_rect(IMAGE_FRAME, INK);
            let caption = Vec2::new(IMAGE_FRAME.x, IMAGE_FRAME.bottom() + 6.0);
            draw.text(caption, image.as_str(), INK);
        }

        for button in choice_buttons(scene) {
            draw_button(draw, &button);
        }
        if let Some(notice) = &self.notice {
            let y = CHOICES_TOP - LINE_ADVANCE_PX * 2.0;
            draw.text(Vec2::new(TEXT_LEFT, y), notice.as_str(), NOTICE_INK);
        }
        draw.text(
            Vec2::new(TEXT_LEFT, 570.0),
            "Click a choice or press its number. Tab returns to the airport.",
            INK,
        );
    }

    fn unload(&mut self) {
        self.book = None;
        self.notice = None;
    }

    fn debug_title(&self) -> Option<String> {
        let book = self.book.as_ref()?;
        Some(format!("Airport Run | story: {}", book.current_key()))
    }
}
