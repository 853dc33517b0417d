use engine::{Color, PlayerDef, Rect, Vec2};

/// Held movement directions for one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct MoveAxes {
    pub(crate) up: bool,
    pub(crate) down: bool,
    pub(crate) left: bool,
    pub(crate) right: bool,
}

impl MoveAxes {
    pub(crate) fn any(self) -> bool {
        self.up || self.down || self.left || self.right
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Player {
    pub(crate) position: Vec2,
    pub(crate) size: f32,
    pub(crate) speed: f32,
    pub(crate) color: Color,
    pub(crate) money: u32,
    pub(crate) checked_in: bool,
    pub(crate) ticket: Option<String>,
    pub(crate) purchases: Vec<String>,
    pub(crate) anim_phase: u32,
}

impl Player {
    pub(crate) fn from_def(def: &PlayerDef, starting_money: Option<u32>) -> Self {
        Self {
            position: def.start,
            size: def.size,
            speed: def.speed,
            color: def.color,
            money: starting_money.unwrap_or(def.money),
            checked_in: false,
            ticket: None,
            purchases: Vec::new(),
            anim_phase: 0,
        }
    }

    pub(crate) fn rect(&self) -> Rect {
        self.rect_at(self.position)
    }

    pub(crate) fn rect_at(&self, position: Vec2) -> Rect {
        Rect::at(position, self.size, self.size)
    }
}

/// Applies each held direction independently; a step that would leave `[0, bound - size]`
/// is skipped for that axis only.
pub(crate) fn move_intent(
    position: Vec2,
    size: f32,
    speed: f32,
    axes: MoveAxes,
    bounds_width: f32,
    bounds_height: f32,
) -> Vec2 {
    let max_x = bounds_width - size;
    let max_y = bounds_height - size;
    let mut next = position;

    if axes.up && next.y - speed >= 0.0 {
        next.y -= speed;
    }
    if axes.down && next.y + speed <= max_y {
        next.y += speed;
    }
    if axes.left && next.x - speed >= 0.0 {
        next.x -= speed;
    }
    if axes.right && next.x + speed <= max_x {
        next.x += speed;
    }
    next
}

#[cfg(test)]
mod tests {
    use super::*;

    const RIGHT: MoveAxes = MoveAxes {
        up: false,
        down: false,
        left: false,
        right: true,
    };

    #[test]
    fn diagonal_moves_both_axes_in_one_tick() {
        let axes = MoveAxes {
            up: true,
            right: true,
            ..MoveAxes::default()
        };
        let next = move_intent(Vec2::new(100.0, 100.0), 20.0, 4.0, axes, 800.0, 600.0);
        assert_eq!(next, Vec2::new(104.0, 96.0));
    }

    #[test]
    fn blocked_axis_does_not_stop_the_other() {
        let axes = MoveAxes {
            up: true,
            right: true,
            ..MoveAxes::default()
        };
        let next = move_intent(Vec2::new(100.0, 2.0), 20.0, 4.0, axes, 800.0, 600.0);
        assert_eq!(next, Vec2::new(104.0, 2.0));
    }

    #[test]
    fn step_is_skipped_rather_than_clamped() {
        let next = move_intent(Vec2::new(778.0, 10.0), 20.0, 4.0, RIGHT, 800.0, 600.0);
        assert_eq!(next.x, 778.0);
        let next = move_intent(Vec2::new(776.0, 10.0), 20.0, 4.0, RIGHT, 800.0, 600.0);
        assert_eq!(next.x, 780.0);
    }

    #[test]
    fn position_stays_inside_bounds_for_any_start_and_speed() {
        let every_direction = [
            MoveAxes {
                up: true,
                ..MoveAxes::default()
            },
            MoveAxes {
                down: true,
                ..MoveAxes::default()
            },
            MoveAxes {
                left: true,
                ..MoveAxes::default()
            },
            RIGHT,
        ];
        for speed in [0.5_f32, 4.0, 13.0, 250.0] {
            for start_x in [0.0_f32, 3.0, 390.0, 777.0, 780.0] {
                for start_y in [0.0_f32, 1.0, 290.0, 579.0, 580.0] {
                    for axes in every_direction {
                        let next = move_intent(
                            Vec2::new(start_x, start_y),
                            20.0,
                            speed,
                            axes,
                            800.0,
                            600.0,
                        );
                        assert!((0.0..=780.0).contains(&next.x), "x={} speed={speed}", next.x);
                        assert!((0.0..=580.0).contains(&next.y), "y={} speed={speed}", next.y);
                    }
                }
            }
        }
    }

    #[test]
    fn player_uses_config_money_override() {
        let def = PlayerDef::default();
        assert_eq!(Player::from_def(&def, None).money, def.money);
        assert_eq!(Player::from_def(&def, Some(5)).money, 5);
        assert_eq!(
            Player::from_def(&def, None).rect(),
            Rect::new(400.0, 300.0, 20.0, 20.0)
        );
    }
}
