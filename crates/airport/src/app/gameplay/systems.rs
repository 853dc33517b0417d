use std::time::Duration;

use super::actors::move_intent;
use super::intent::TickIntent;
use super::menu::{menu_layout, MenuAction};
use super::npc::wander_step;
use super::session::{Modal, Session};
use crate::app::ui::button_at;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TickSystemId {
    Movement,
    Interaction,
    Progress,
    NpcWander,
    Expiry,
}

const TICK_SYSTEM_ORDER: [TickSystemId; 5] = [
    TickSystemId::Movement,
    TickSystemId::Interaction,
    TickSystemId::Progress,
    TickSystemId::NpcWander,
    TickSystemId::Expiry,
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct TickOutcome {
    pub(crate) restart_requested: bool,
}

#[derive(Debug, Default)]
pub(crate) struct TickDriver {
    last_tick_order: Vec<TickSystemId>,
}

impl TickDriver {
    /// Advances the session clock by one fixed step and runs every system once, in order.
    pub(crate) fn run_once_per_tick(
        &mut self,
        session: &mut Session,
        intent: &TickIntent,
        fixed_dt: Duration,
    ) -> TickOutcome {
        session.clock = session.clock.saturating_add(fixed_dt);
        let mut outcome = TickOutcome::default();
        self.last_tick_order.clear();
        for system_id in TICK_SYSTEM_ORDER {
            self.last_tick_order.push(system_id);
            match system_id {
                TickSystemId::Movement => run_movement(session, intent),
                TickSystemId::Interaction => run_interaction(session),
                TickSystemId::Progress => run_progress(session, intent, &mut outcome),
                TickSystemId::NpcWander => run_npc_wander(session),
                TickSystemId::Expiry => run_expiry(session),
            }
        }
        outcome
    }

    #[cfg(test)]
    pub(crate) fn last_tick_order(&self) -> &[TickSystemId] {
        &self.last_tick_order
    }
}

fn run_movement(session: &mut Session, intent: &TickIntent) {
    if session.modal != Modal::None || !intent.axes.any() {
        return;
    }
    let player = &session.player;
    let candidate = move_intent(
        player.position,
        player.size,
        player.speed,
        intent.axes,
        session.world.width,
        session.world.height,
    );
    if candidate == player.position {
        return;
    }
    let blocked = !player.checked_in
        && session
            .world
            .secured_zone_at(&player.rect_at(candidate))
            .is_some();
    if blocked {
        session.block_at_security();
        return;
    }
    session.player.position = candidate;
    session.player.anim_phase = session.player.anim_phase.wrapping_add(1);
}

fn run_interaction(session: &mut Session) {
    if session.modal != Modal::None {
        return;
    }
    let player_rect = session.player.rect();
    session.active = session
        .world
        .interactables()
        .find(|(_, zone)| zone.overlaps(&player_rect))
        .map(|(id, _)| id);
}

fn run_progress(session: &mut Session, intent: &TickIntent, outcome: &mut TickOutcome) {
    let clicked = menu_layout(session.modal, &session.world, &session.player)
        .and_then(|layout| button_at(&layout.buttons, intent.click));
    match session.modal {
        Modal::None => {
            if intent.interact {
                session.interact();
            }
        }
        Modal::CheckInMenu {
            closes_at: Some(_), ..
        } => {}
        Modal::CheckInMenu { closes_at: None, .. } => {
            if intent.interact || clicked == Some(MenuAction::ConfirmCheckIn) {
                session.confirm_check_in();
            } else if intent.back || clicked == Some(MenuAction::CancelCheckIn) {
                session.cancel_check_in();
            }
        }
        Modal::ShopMenu { .. } => {
            let digit_pick = intent
                .choice
                .map(|digit| MenuAction::Buy(usize::from(digit).saturating_sub(1)));
            match clicked.or(digit_pick) {
                Some(MenuAction::Buy(index)) => session.purchase(index),
                Some(MenuAction::LeaveShop) => session.leave_shop(),
                _ if intent.back => session.leave_shop(),
                _ => {}
            }
        }
        // Won ignores every input except back, which asks the scene for a fresh session.
        Modal::Won { .. } => {
            outcome.restart_requested = intent.back;
        }
    }
}

fn run_npc_wander(session: &mut Session) {
    let (width, height) = (session.world.width, session.world.height);
    for npc in &mut session.npcs {
        wander_step(npc, width, height, &mut session.rng);
    }
}

fn run_expiry(session: &mut Session) {
    session.messages.expire(session.clock);
    if let Modal::CheckInMenu {
        closes_at: Some(closes_at),
        ..
    } = session.modal
    {
        if session.clock >= closes_at {
            session.modal = Modal::None;
        }
    }
}
