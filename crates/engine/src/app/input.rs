#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputAction {
    MoveUp,
    MoveDown,
    MoveLeft,
    MoveRight,
    Interact,
    Back,
}

const ACTION_COUNT: usize = 6;

#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct ActionStates {
    down: [bool; ACTION_COUNT],
}

impl ActionStates {
    pub(crate) fn set(&mut self, action: InputAction, is_down: bool) {
        self.down[action.index()] = is_down;
    }

    pub(crate) fn is_down(&self, action: InputAction) -> bool {
        self.down[action.index()]
    }
}

impl InputAction {
    const fn index(self) -> usize {
        match self {
            InputAction::MoveUp => 0,
            InputAction::MoveDown => 1,
            InputAction::MoveLeft => 2,
            InputAction::MoveRight => 3,
            InputAction::Interact => 4,
            InputAction::Back => 5,
        }
    }
}

/// Latches a single "pressed" edge per physical press; OS key repeat while held does not re-arm it.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct PressEdge {
    is_down: bool,
    pressed: bool,
}

impl PressEdge {
    pub(crate) fn update(&mut self, is_pressed: bool) {
        if is_pressed && !self.is_down {
            self.pressed = true;
        }
        self.is_down = is_pressed;
    }

    pub(crate) fn take(&mut self) -> bool {
        std::mem::take(&mut self.pressed)
    }
}
