use engine::{text_width_px, Color, DrawList, Rect, Vec2, LINE_ADVANCE_PX};

use super::menu::menu_layout;
use super::session::{Modal, Session};
use super::world::InteractableId;
use crate::app::ui::draw_button;

const INK: Color = Color::rgb(0x1C, 0x28, 0x33);
const COUNTER_FILL: Color = Color::rgb(0x52, 0xBE, 0x80);
const SHOP_FILL: Color = Color::rgb(0xE6, 0x7E, 0x22);
const GATE_FILL: Color = Color::rgb(0x5D, 0x6D, 0x7E);
const ACTIVE_OUTLINE: Color = Color::rgb(0xF1, 0xC4, 0x0F);
const PANEL_FILL: Color = Color::rgb(0xFD, 0xFE, 0xFE);
const MESSAGE_INK: Color = Color::rgb(0xB0, 0x3A, 0x2E);

const HUD_ORIGIN: Vec2 = Vec2::new(8.0, 208.0);
const LABEL_INSET: f32 = 4.0;
/// Ticks per half step of the walking bob.
const BOB_PERIOD: u32 = 8;

pub(crate) fn draw_session(session: &Session, draw: &mut DrawList) {
    let world = &session.world;
    draw.set_clear_color(world.background);

    for zone in &world.zones {
        draw.fill_rect(zone.rect, zone.color);
        draw.text(
            Vec2::new(zone.rect.x + LABEL_INSET, zone.rect.y + LABEL_INSET),
            zone.name.as_str(),
            INK,
        );
    }
    for counter in &world.counters {
        draw_interactable(draw, counter.rect, &counter.name, COUNTER_FILL);
    }
    for shop in &world.shops {
        draw_interactable(draw, shop.rect, &shop.name, SHOP_FILL);
    }
    for gate in &world.gates {
        draw_interactable(draw, gate.rect, &gate.name, GATE_FILL);
    }
    if let Some(zone) = session.active.and_then(|id| interaction_zone(session, id)) {
        draw.outline_rect(zone, ACTIVE_OUTLINE);
    }

    for npc in &session.npcs {
        draw.fill_rect(bobbed(npc.rect(), npc.anim_phase), npc.color());
    }
    let player = &session.player;
    draw.fill_rect(bobbed(player.rect(), player.anim_phase), player.color);
    draw.outline_rect(player.rect().inflate(1.0), INK);

    draw_hud(session, draw);

    match session.modal {
        Modal::None => {
            if let Some(name) = session.active_name() {
                let prompt = format!("Press E: {name}");
                let x = (world.width - text_width_px(&prompt)) * 0.5;
                draw.text(Vec2::new(x, 380.0), prompt, INK);
            }
        }
        Modal::Won { gate } => draw_win(session, gate, draw),
        Modal::CheckInMenu { .. } | Modal::ShopMenu { .. } => draw_menu(session, draw),
    }
}

fn draw_interactable(draw: &mut DrawList, rect: Rect, name: &str, fill: Color) {
    draw.fill_rect(rect, fill);
    draw.outline_rect(rect, INK);
    draw.text(
        Vec2::new(rect.x, rect.bottom() + LABEL_INSET),
        name,
        INK,
    );
}

fn interaction_zone(session: &Session, id: InteractableId) -> Option<Rect> {
    let world = &session.world;
    match id {
        InteractableId::Counter(index) => world.counters.get(index).map(|c| c.interaction_zone),
        InteractableId::Shop(index) => world.shops.get(index).map(|s| s.interaction_zone),
        InteractableId::Gate(index) => world.gates.get(index).map(|g| g.interaction_zone),
    }
}

fn bobbed(rect: Rect, anim_phase: u32) -> Rect {
    let lift = if (anim_phase / BOB_PERIOD) % 2 == 1 { 2.0 } else { 0.0 };
    Rect::new(rect.x, rect.y - lift, rect.width, rect.height)
}

fn draw_hud(session: &Session, draw: &mut DrawList) {
    let player = &session.player;
    let ticket = player.ticket.as_deref().unwrap_or("none");
    let bag = if player.purchases.is_empty() {
        "empty".to_string()
    } else {
        player.purchases.join(", ")
    };
    let lines = [
        format!("Current area: {}", session.area_label()),
        format!("Money: ${}   Ticket: {ticket}", player.money),
        format!("Bag: {bag}"),
    ];
    let mut y = HUD_ORIGIN.y;
    for line in lines {
        draw.text(Vec2::new(HUD_ORIGIN.x, y), line, INK);
        y += LINE_ADVANCE_PX;
    }
    y += LINE_ADVANCE_PX * 0.5;
    for (_, text) in session.messages.iter() {
        draw.text(Vec2::new(HUD_ORIGIN.x, y), text, MESSAGE_INK);
        y += LINE_ADVANCE_PX;
    }
}

fn draw_menu(session: &Session, draw: &mut DrawList) {
    let Some(layout) = menu_layout(session.modal, &session.world, &session.player) else {
        return;
    };
    draw.fill_rect(layout.panel, PANEL_FILL);
    draw.outline_rect(layout.panel, INK);

    let left = layout.panel.x + 16.0;
    let top = layout.panel.y + 16.0;
    draw.text(Vec2::new(left, top), layout.title.as_str(), INK);
    for (row, line) in layout.detail_lines.iter().enumerate() {
        let y = top + LINE_ADVANCE_PX * (row as f32 + 1.5);
        draw.text(Vec2::new(left, y), line.as_str(), INK);
    }
    for button in &layout.buttons {
        draw_button(draw, button);
    }
}

fn draw_win(session: &Session, gate: usize, draw: &mut DrawList) {
    let world = &session.world;
    let gate_name = world
        .gates
        .get(gate)
        .map_or("the gate", |gate| gate.name.as_str());
    let lines = [
        format!("You boarded at {gate_name}!"),
        "Have a good flight.".to_string(),
        "Press Esc to play again".to_string(),
    ];
    let panel = Rect::new((world.width - 360.0) * 0.5, 240.0, 360.0, 90.0);
    draw.fill_rect(panel, PANEL_FILL);
    draw.outline_rect(panel, INK);
    for (row, line) in lines.into_iter().enumerate() {
        let x = panel.center().x - text_width_px(&line) * 0.5;
        let y = panel.y + 16.0 + row as f32 * (LINE_ADVANCE_PX + 6.0);
        draw.text(Vec2::new(x, y), line, INK);
    }
}
