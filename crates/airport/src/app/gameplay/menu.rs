use engine::{Rect, Vec2, LINE_ADVANCE_PX};

use super::actors::Player;
use super::session::Modal;
use super::world::World;
use crate::app::ui::{stack_buttons, MenuButton, BUTTON_GAP, BUTTON_HEIGHT};

const PANEL_WIDTH: f32 = 360.0;
const PANEL_PADDING: f32 = 16.0;
const PANEL_TOP: f32 = 120.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum MenuAction {
    ConfirmCheckIn,
    CancelCheckIn,
    Buy(usize),
    LeaveShop,
}

/// Geometry and text of the open menu. Rendering and click handling both read this, so a
/// button is hit exactly where it is drawn.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct MenuLayout {
    pub(crate) panel: Rect,
    pub(crate) title: String,
    pub(crate) detail_lines: Vec<String>,
    pub(crate) buttons: Vec<MenuButton<MenuAction>>,
}

pub(crate) fn menu_layout(modal: Modal, world: &World, player: &Player) -> Option<MenuLayout> {
    let (title, detail_lines, entries) = match modal {
        Modal::CheckInMenu { counter, closes_at } => {
            let counter = world.counters.get(counter)?;
            let details = vec![
                format!("{} ticket: ${}", counter.ticket, counter.cost),
                format!("You have ${}", player.money),
            ];
            let entries = if closes_at.is_some() {
                Vec::new()
            } else {
                vec![
                    (
                        MenuAction::ConfirmCheckIn,
                        format!("Check in (${})", counter.cost),
                    ),
                    (MenuAction::CancelCheckIn, "Cancel".to_string()),
                ]
            };
            (counter.name.clone(), details, entries)
        }
        Modal::ShopMenu { shop } => {
            let shop = world.shops.get(shop)?;
            let mut entries = shop
                .products
                .iter()
                .enumerate()
                .map(|(index, product)| {
                    (
                        MenuAction::Buy(index),
                        format!("{}. {} ${}", index + 1, product.name, product.cost),
                    )
                })
                .collect::<Vec<_>>();
            entries.push((MenuAction::LeaveShop, "Leave".to_string()));
            (
                shop.name.clone(),
                vec![format!("You have ${}", player.money)],
                entries,
            )
        }
        Modal::None | Modal::Won { .. } => return None,
    };

    let panel_x = ((world.width - PANEL_WIDTH) * 0.5).max(0.0);
    let buttons_top =
        PANEL_TOP + PANEL_PADDING + LINE_ADVANCE_PX * (detail_lines.len() + 2) as f32;
    let buttons = stack_buttons(
        Vec2::new(panel_x + PANEL_PADDING, buttons_top),
        PANEL_WIDTH - PANEL_PADDING * 2.0,
        entries,
    );
    let buttons_height = buttons.len() as f32 * (BUTTON_HEIGHT + BUTTON_GAP);
    let panel_height = buttons_top - PANEL_TOP + buttons_height + PANEL_PADDING;

    Some(MenuLayout {
        panel: Rect::new(panel_x, PANEL_TOP, PANEL_WIDTH, panel_height),
        title,
        detail_lines,
        buttons,
    })
}
