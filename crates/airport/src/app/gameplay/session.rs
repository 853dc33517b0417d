use std::time::Duration;

use engine::ContentDatabase;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info};

use super::actors::Player;
use super::audio::AudioCue;
use super::messages::{MessageChannel, MessageDurations, Messages};
use super::npc::Npc;
use super::progress::{attempt_boarding, attempt_check_in, attempt_purchase, ProgressError};
use super::world::{InteractableId, World};

/// Which menu (if any) currently owns the player's input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum Modal {
    #[default]
    None,
    /// `closes_at` is set once an attempt was made; the menu then ignores input until it closes.
    CheckInMenu {
        counter: usize,
        closes_at: Option<Duration>,
    },
    ShopMenu {
        shop: usize,
    },
    Won {
        gate: usize,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct SessionSettings {
    pub(crate) starting_money: Option<u32>,
    pub(crate) npc_seed: Option<u64>,
    pub(crate) durations: MessageDurations,
    pub(crate) check_in_close_delay: Duration,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            starting_money: None,
            npc_seed: None,
            durations: MessageDurations::default(),
            check_in_close_delay: Duration::from_millis(2000),
        }
    }
}

/// All mutable state of one play-through. The world is fixed; everything else dies with the
/// session.
#[derive(Debug)]
pub(crate) struct Session {
    pub(crate) world: World,
    pub(crate) player: Player,
    pub(crate) npcs: Vec<Npc>,
    pub(crate) active: Option<InteractableId>,
    pub(crate) modal: Modal,
    pub(crate) messages: Messages,
    pub(crate) clock: Duration,
    pub(crate) rng: StdRng,
    check_in_close_delay: Duration,
    pending_cues: Vec<AudioCue>,
}

impl Session {
    pub(crate) fn new(content: &ContentDatabase, settings: &SessionSettings) -> Self {
        let layout = &content.layout;
        let world = World::from_layout(layout);
        let mut rng = match settings.npc_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let npcs = layout
            .npcs
            .iter()
            .map(|def| {
                let npc = Npc::from_def(def, world.width, world.height, &mut rng);
                debug!(
                    npc = %npc.name,
                    target_x = npc.target.x,
                    target_y = npc.target.y,
                    "npc_spawned"
                );
                npc
            })
            .collect();
        Self {
            player: Player::from_def(&layout.player, settings.starting_money),
            world,
            npcs,
            active: None,
            modal: Modal::None,
            messages: Messages::new(settings.durations),
            clock: Duration::ZERO,
            rng,
            check_in_close_delay: settings.check_in_close_delay,
            pending_cues: Vec::new(),
        }
    }

    pub(crate) fn area_label(&self) -> &str {
        self.world.area_label(&self.player.rect())
    }

    pub(crate) fn is_won(&self) -> bool {
        matches!(self.modal, Modal::Won { .. })
    }

    pub(crate) fn active_name(&self) -> Option<&str> {
        self.active
            .and_then(|id| self.world.interactable_name(id))
    }

    /// Interact key while no menu is open: opens the target's menu or tries to board.
    pub(crate) fn interact(&mut self) {
        if self.modal != Modal::None {
            return;
        }
        let Some(target) = self.active else {
            return;
        };
        match target {
            InteractableId::Counter(counter) => {
                self.modal = Modal::CheckInMenu {
                    counter,
                    closes_at: None,
                };
                debug!(counter, "check_in_menu_opened");
            }
            InteractableId::Shop(shop) => {
                self.modal = Modal::ShopMenu { shop };
                debug!(shop, "shop_menu_opened");
            }
            InteractableId::Gate(gate) => self.board(gate),
        }
    }

    pub(crate) fn confirm_check_in(&mut self) {
        let Modal::CheckInMenu {
            counter: index,
            closes_at: None,
        } = self.modal
        else {
            return;
        };
        let Some(counter) = self.world.counters.get(index) else {
            return;
        };
        match attempt_check_in(&mut self.player, counter) {
            Ok(()) => {
                info!(
                    counter = %counter.name,
                    ticket = %counter.ticket,
                    money = self.player.money,
                    "check_in_completed"
                );
                let text = format!("Checked in: {} ticket", counter.ticket);
                self.messages.show(MessageChannel::CheckIn, text, self.clock);
                self.pending_cues.push(AudioCue::CheckIn);
            }
            Err(err) => self.reject(MessageChannel::CheckIn, err),
        }
        self.modal = Modal::CheckInMenu {
            counter: index,
            closes_at: Some(self.clock.saturating_add(self.check_in_close_delay)),
        };
    }

    pub(crate) fn cancel_check_in(&mut self) {
        if matches!(self.modal, Modal::CheckInMenu { closes_at: None, .. }) {
            self.modal = Modal::None;
        }
    }

    pub(crate) fn purchase(&mut self, product_index: usize) {
        let Modal::ShopMenu { shop } = self.modal else {
            return;
        };
        let Some(product) = self
            .world
            .shops
            .get(shop)
            .and_then(|shop| shop.products.get(product_index))
        else {
            return;
        };
        match attempt_purchase(&mut self.player, product) {
            Ok(()) => {
                info!(
                    product = %product.name,
                    cost = product.cost,
                    money = self.player.money,
                    "purchase_completed"
                );
                let text = format!("Bought {} for ${}", product.name, product.cost);
                self.messages.show(MessageChannel::Shop, text, self.clock);
                self.pending_cues.push(AudioCue::Purchase);
            }
            Err(err) => self.reject(MessageChannel::Shop, err),
        }
    }

    pub(crate) fn leave_shop(&mut self) {
        if matches!(self.modal, Modal::ShopMenu { .. }) {
            self.modal = Modal::None;
        }
    }

    fn board(&mut self, index: usize) {
        let Some(gate) = self.world.gates.get(index) else {
            return;
        };
        match attempt_boarding(&self.player, gate) {
            Ok(()) => {
                info!(gate = %gate.name, ticket = %gate.required_ticket, "boarded");
                self.modal = Modal::Won { gate: index };
            }
            Err(err) => self.refuse(MessageChannel::Boarding, err),
        }
    }

    /// Shows the security refusal. The error cue only sounds when the message was not already up.
    pub(crate) fn block_at_security(&mut self) {
        let already_showing = self.messages.is_showing(MessageChannel::Security);
        self.messages.show(
            MessageChannel::Security,
            ProgressError::SecurityBlocked.to_string(),
            self.clock,
        );
        if !already_showing {
            debug!("security_blocked");
            self.pending_cues.push(AudioCue::Error);
        }
    }

    pub(crate) fn drain_cues(&mut self) -> Vec<AudioCue> {
        std::mem::take(&mut self.pending_cues)
    }

    /// Refusal with the error cue. Used for money and check-in failures.
    fn reject(&mut self, channel: MessageChannel, err: ProgressError) {
        self.refuse(channel, err);
        self.pending_cues.push(AudioCue::Error);
    }

    /// Message-only refusal; a wrong ticket at the gate stays silent.
    fn refuse(&mut self, channel: MessageChannel, err: ProgressError) {
        debug!(?channel, error = %err, "progress_rejected");
        self.messages.show(channel, err.to_string(), self.clock);
    }
}
