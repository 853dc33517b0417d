use std::path::PathBuf;
use std::time::Duration;

use engine::{
    compile_content_documents, ContentDatabase, DrawList, InputAction, InputSnapshot, Scene,
    SceneCommand, SceneKey, Vec2,
};

use super::actors::MoveAxes;
use super::audio::test_sink::RecordingSink;
use super::audio::AudioCue;
use super::intent::TickIntent;
use super::menu::menu_layout;
use super::messages::MessageChannel;
use super::scene_impl::RoamScene;
use super::session::{Modal, Session, SessionSettings};
use super::systems::TickDriver;
use super::world::InteractableId;

const LAYOUT_XML: &str = include_str!("../../../../../assets/base/airport.xml");
const FIXED_DT: Duration = Duration::from_millis(20);
const FIXED_DT_SECONDS: f32 = 0.02;

fn shipped_content() -> ContentDatabase {
    compile_content_documents(&[(PathBuf::from("airport.xml"), LAYOUT_XML.to_string())])
        .expect("shipped layout compiles")
}

fn seeded_settings() -> SessionSettings {
    SessionSettings {
        npc_seed: Some(7),
        ..SessionSettings::default()
    }
}

pub(crate) fn fixture_session() -> Session {
    Session::new(&shipped_content(), &seeded_settings())
}

fn snapshot_from_actions(actions: &[InputAction]) -> InputSnapshot {
    let mut snapshot = InputSnapshot::empty();
    for action in actions {
        snapshot = snapshot.with_action_down(*action, true);
    }
    snapshot
}

fn click_snapshot(cursor_px: Vec2, window_size: (u32, u32)) -> InputSnapshot {
    InputSnapshot::empty()
        .with_left_click_pressed(true)
        .with_cursor_position_px(Some(cursor_px))
        .with_window_size(window_size)
}

struct Harness {
    session: Session,
    driver: TickDriver,
}

impl Harness {
    fn new() -> Self {
        Self {
            session: fixture_session(),
            driver: TickDriver::default(),
        }
    }

    fn tick(&mut self, intent: TickIntent) -> bool {
        self.driver
            .run_once_per_tick(&mut self.session, &intent, FIXED_DT)
            .restart_requested
    }

    fn idle(&mut self, ticks: usize) {
        for _ in 0..ticks {
            self.tick(TickIntent::default());
        }
    }

    fn hold(&mut self, axes: MoveAxes, ticks: usize) {
        for _ in 0..ticks {
            self.tick(TickIntent {
                axes,
                ..TickIntent::default()
            });
        }
    }

    fn press_interact(&mut self) {
        self.tick(TickIntent {
            interact: true,
            ..TickIntent::default()
        });
    }

    /// Places the player directly; the next tick resolves the interactable there.
    fn stand_at(&mut self, x: f32, y: f32) {
        self.session.player.position = Vec2::new(x, y);
        self.idle(1);
    }
}

const UP: MoveAxes = MoveAxes {
    up: true,
    down: false,
    left: false,
    right: false,
};
const DOWN: MoveAxes = MoveAxes {
    up: false,
    down: true,
    left: false,
    right: false,
};
const RIGHT: MoveAxes = MoveAxes {
    up: false,
    down: false,
    left: false,
    right: true,
};

// Player positions that overlap exactly one interaction zone in the shipped layout.
const AT_ECONOMY_COUNTER: (f32, f32) = (50.0, 120.0);
const AT_BUSINESS_COUNTER: (f32, f32) = (160.0, 120.0);
const AT_COFFEE_STAND: (f32, f32) = (600.0, 120.0);
const AT_GATE_A1: (f32, f32) = (150.0, 490.0);
const AT_GATE_B2: (f32, f32) = (610.0, 490.0);

#[test]
fn session_starts_in_the_walkway() {
    let harness = Harness::new();
    let session = &harness.session;

    assert_eq!(session.player.money, 1000);
    assert_eq!(session.player.position, Vec2::new(400.0, 300.0));
    assert_eq!(session.area_label(), "Walking");
    assert_eq!(session.npcs.len(), 4);
    assert_eq!(session.modal, Modal::None);
}

#[test]
fn walking_into_security_is_reverted_with_one_error_cue() {
    let mut harness = Harness::new();
    harness.hold(UP, 40);

    let session = &mut harness.session;
    assert_eq!(session.player.position, Vec2::new(400.0, 200.0));
    assert_eq!(
        session.messages.get(MessageChannel::Security),
        Some("Security: you must check in first")
    );
    assert_eq!(session.drain_cues(), vec![AudioCue::Error]);
}

#[test]
fn security_lane_blocks_the_gates_until_check_in() {
    let mut harness = Harness::new();
    harness.hold(DOWN, 30);
    assert_eq!(harness.session.player.position.y, 340.0);

    harness.session.player.checked_in = true;
    harness.session.player.ticket = Some("Economy".to_string());
    harness.hold(DOWN, 30);
    assert!(harness.session.player.position.y > 390.0);
    assert_eq!(harness.session.area_label(), "Gates");
}

#[test]
fn blocked_move_leaves_animation_phase_alone() {
    let mut harness = Harness::new();
    harness.hold(UP, 25);
    let phase = harness.session.player.anim_phase;
    assert_eq!(phase, 25);

    harness.hold(UP, 10);
    assert_eq!(harness.session.player.anim_phase, phase);
}

#[test]
fn interaction_target_follows_the_player() {
    let mut harness = Harness::new();
    assert_eq!(harness.session.active, None);

    harness.stand_at(AT_ECONOMY_COUNTER.0, AT_ECONOMY_COUNTER.1);
    assert_eq!(harness.session.active, Some(InteractableId::Counter(0)));
    assert_eq!(harness.session.active_name(), Some("Economy Counter"));

    harness.stand_at(AT_COFFEE_STAND.0, AT_COFFEE_STAND.1);
    assert_eq!(harness.session.active, Some(InteractableId::Shop(0)));

    harness.stand_at(400.0, 300.0);
    assert_eq!(harness.session.active, None);
}

#[test]
fn counters_win_over_shops_when_zones_overlap() {
    let content = compile_content_documents(&[(
        PathBuf::from("overlap.xml"),
        r#"<Defs>
            <MapDef><width>800</width><height>600</height></MapDef>
            <PlayerDef><start>100,100</start><speed>4</speed><money>50</money></PlayerDef>
            <ShopDef><name>Kiosk</name><rect>90,90,20,20</rect><products>
                <li><name>Gum</name><cost>1</cost></li>
            </products></ShopDef>
            <CounterDef><name>Desk</name><rect>120,90,20,20</rect><cost>5</cost>
                <ticket>Economy</ticket></CounterDef>
        </Defs>"#
            .to_string(),
    )])
    .expect("compile");
    let mut session = Session::new(&content, &seeded_settings());
    TickDriver::default().run_once_per_tick(&mut session, &TickIntent::default(), FIXED_DT);

    assert_eq!(session.active, Some(InteractableId::Counter(0)));
}

#[test]
fn check_in_menu_confirms_then_closes_after_delay() {
    let mut harness = Harness::new();
    harness.stand_at(AT_BUSINESS_COUNTER.0, AT_BUSINESS_COUNTER.1);
    harness.press_interact();
    assert!(matches!(
        harness.session.modal,
        Modal::CheckInMenu {
            counter: 1,
            closes_at: None
        }
    ));

    harness.press_interact();
    let session = &mut harness.session;
    assert!(session.player.checked_in);
    assert_eq!(session.player.money, 800);
    assert_eq!(session.player.ticket.as_deref(), Some("Business"));
    assert_eq!(session.drain_cues(), vec![AudioCue::CheckIn]);
    assert!(matches!(
        session.modal,
        Modal::CheckInMenu {
            closes_at: Some(_),
            ..
        }
    ));

    // Locked while the outcome is on screen: another confirm does nothing.
    harness.press_interact();
    assert_eq!(harness.session.player.money, 800);
    assert!(harness.session.drain_cues().is_empty());

    harness.idle(98);
    assert_ne!(harness.session.modal, Modal::None);
    harness.idle(1);
    assert_eq!(harness.session.modal, Modal::None);
}

#[test]
fn player_is_frozen_while_a_menu_is_open() {
    let mut harness = Harness::new();
    harness.stand_at(AT_ECONOMY_COUNTER.0, AT_ECONOMY_COUNTER.1);
    harness.press_interact();

    let before = harness.session.player.position;
    harness.hold(RIGHT, 20);
    assert_eq!(harness.session.player.position, before);
    assert_eq!(harness.session.active, Some(InteractableId::Counter(0)));
}

#[test]
fn second_check_in_is_refused_with_error_cue() {
    let mut harness = Harness::new();
    harness.stand_at(AT_ECONOMY_COUNTER.0, AT_ECONOMY_COUNTER.1);
    harness.press_interact();
    harness.press_interact();
    harness.idle(120);
    harness.session.drain_cues();

    harness.stand_at(AT_BUSINESS_COUNTER.0, AT_BUSINESS_COUNTER.1);
    harness.press_interact();
    harness.press_interact();

    let session = &mut harness.session;
    assert_eq!(session.player.money, 900);
    assert_eq!(session.player.ticket.as_deref(), Some("Economy"));
    assert_eq!(
        session.messages.get(MessageChannel::CheckIn),
        Some("You are already checked in")
    );
    assert_eq!(session.drain_cues(), vec![AudioCue::Error]);
}

#[test]
fn cancel_button_closes_check_in_without_paying() {
    let mut harness = Harness::new();
    harness.stand_at(AT_ECONOMY_COUNTER.0, AT_ECONOMY_COUNTER.1);
    harness.press_interact();

    let layout = menu_layout(
        harness.session.modal,
        &harness.session.world,
        &harness.session.player,
    )
    .expect("menu");
    harness.tick(TickIntent {
        click: Some(layout.buttons[1].rect.center()),
        ..TickIntent::default()
    });

    assert_eq!(harness.session.modal, Modal::None);
    assert_eq!(harness.session.player.money, 1000);
    assert!(!harness.session.player.checked_in);
}

#[test]
fn shop_stays_open_across_purchases_until_left() {
    let mut harness = Harness::new();
    harness.stand_at(AT_COFFEE_STAND.0, AT_COFFEE_STAND.1);
    harness.press_interact();
    assert_eq!(harness.session.modal, Modal::ShopMenu { shop: 0 });

    harness.tick(TickIntent {
        choice: Some(1),
        ..TickIntent::default()
    });
    let layout = menu_layout(
        harness.session.modal,
        &harness.session.world,
        &harness.session.player,
    )
    .expect("menu");
    harness.tick(TickIntent {
        click: Some(layout.buttons[1].rect.center()),
        ..TickIntent::default()
    });

    let session = &mut harness.session;
    assert_eq!(session.player.money, 1000 - 5 - 8);
    assert_eq!(session.player.purchases, vec!["Coffee", "Croissant"]);
    assert_eq!(session.modal, Modal::ShopMenu { shop: 0 });
    assert_eq!(
        session.drain_cues(),
        vec![AudioCue::Purchase, AudioCue::Purchase]
    );
    assert_eq!(
        session.messages.get(MessageChannel::Shop),
        Some("Bought Croissant for $8")
    );

    harness.tick(TickIntent {
        back: true,
        ..TickIntent::default()
    });
    assert_eq!(harness.session.modal, Modal::None);
}

#[test]
fn purchase_without_money_is_rejected() {
    let content = shipped_content();
    let settings = SessionSettings {
        starting_money: Some(4),
        ..seeded_settings()
    };
    let mut harness = Harness {
        session: Session::new(&content, &settings),
        driver: TickDriver::default(),
    };
    harness.stand_at(AT_COFFEE_STAND.0, AT_COFFEE_STAND.1);
    harness.press_interact();
    harness.tick(TickIntent {
        choice: Some(1),
        ..TickIntent::default()
    });

    let session = &mut harness.session;
    assert_eq!(session.player.money, 4);
    assert!(session.player.purchases.is_empty());
    assert_eq!(session.drain_cues(), vec![AudioCue::Error]);
    assert!(session
        .messages
        .get(MessageChannel::Shop)
        .is_some_and(|text| text.starts_with("Not enough money for Coffee")));
}

#[test]
fn purchase_message_expires_before_outcome_messages() {
    let mut harness = Harness::new();
    harness.stand_at(AT_COFFEE_STAND.0, AT_COFFEE_STAND.1);
    harness.press_interact();
    harness.tick(TickIntent {
        choice: Some(1),
        ..TickIntent::default()
    });
    assert!(harness.session.messages.is_showing(MessageChannel::Shop));

    harness.idle(75);
    assert!(!harness.session.messages.is_showing(MessageChannel::Shop));
}

#[test]
fn full_trip_from_check_in_to_boarding() {
    let mut harness = Harness::new();

    harness.stand_at(AT_BUSINESS_COUNTER.0, AT_BUSINESS_COUNTER.1);
    harness.press_interact();
    harness.press_interact();
    harness.idle(120);
    assert_eq!(harness.session.player.money, 800);
    assert_eq!(harness.session.modal, Modal::None);

    harness.stand_at(AT_GATE_A1.0, AT_GATE_A1.1);
    assert_eq!(harness.session.active_name(), Some("Gate A1"));
    harness.press_interact();
    assert_eq!(harness.session.modal, Modal::None);
    let refusal = harness
        .session
        .messages
        .get(MessageChannel::Boarding)
        .expect("wrong ticket message");
    assert!(refusal.contains("Economy"), "{refusal}");

    harness.stand_at(AT_GATE_B2.0, AT_GATE_B2.1);
    harness.press_interact();
    assert!(harness.session.is_won());

    let frozen_at = harness.session.player.position;
    let npc_before = harness.session.npcs[0].anim_phase;
    harness.hold(RIGHT, 10);
    harness.press_interact();
    assert_eq!(harness.session.player.position, frozen_at);
    assert!(harness.session.is_won());
    assert_eq!(harness.session.player.money, 800);
    assert_eq!(harness.session.npcs[0].anim_phase, npc_before + 11);

    assert!(harness.tick(TickIntent {
        back: true,
        ..TickIntent::default()
    }));
}

#[test]
fn boarding_without_ticket_names_required_ticket_silently() {
    let mut harness = Harness::new();
    harness.stand_at(AT_GATE_A1.0, AT_GATE_A1.1);
    harness.press_interact();

    assert_eq!(
        harness.session.messages.get(MessageChannel::Boarding),
        Some("Wrong ticket: Gate A1 boards Economy passengers only")
    );
    assert!(harness.session.drain_cues().is_empty());
    assert!(!harness.session.is_won());
}

#[test]
fn npcs_stay_inside_the_map() {
    let mut harness = Harness::new();
    harness.idle(2000);
    for npc in &harness.session.npcs {
        assert!((0.0..=800.0).contains(&npc.target.x));
        assert!((0.0..=600.0).contains(&npc.target.y));
        assert!(npc.position.x > -npc.speed * 6.0 && npc.position.x < 800.0 + npc.speed * 6.0);
    }
}

fn loaded_scene(sink: RecordingSink) -> RoamScene {
    let mut scene = RoamScene::new(SceneKey::A, SceneKey::B, seeded_settings(), Box::new(sink));
    scene.load(&shipped_content());
    scene
}

#[test]
fn scene_moves_player_from_held_keys() {
    let mut scene = loaded_scene(RecordingSink::default());
    let input = snapshot_from_actions(&[InputAction::MoveLeft, InputAction::MoveDown]);
    scene.update(FIXED_DT_SECONDS, &input);

    let player = &scene.session().expect("session").player;
    assert_eq!(player.position, Vec2::new(396.0, 304.0));
}

#[test]
fn scene_switches_on_tab_and_restarts_after_win() {
    let sink = RecordingSink::default();
    let mut scene = loaded_scene(sink.clone());
    let tab = InputSnapshot::empty().with_switch_scene_pressed(true);
    assert_eq!(
        scene.update(FIXED_DT_SECONDS, &tab),
        SceneCommand::SwitchTo(SceneKey::B)
    );

    let back = InputSnapshot::empty().with_back_pressed(true);
    assert_eq!(scene.update(FIXED_DT_SECONDS, &back), SceneCommand::None);

    if let Some(session) = scene.session_mut() {
        session.modal = Modal::Won { gate: 1 };
    }
    assert_eq!(
        scene.update(FIXED_DT_SECONDS, &back),
        SceneCommand::HardResetTo(SceneKey::A)
    );
    assert!(sink.cues.borrow().is_empty());
}

#[test]
fn scene_forwards_cues_to_the_audio_sink() {
    let sink = RecordingSink::default();
    let mut scene = loaded_scene(sink.clone());
    let up = snapshot_from_actions(&[InputAction::MoveUp]);
    for _ in 0..40 {
        scene.update(FIXED_DT_SECONDS, &up);
    }
    assert_eq!(*sink.cues.borrow(), vec![AudioCue::Error]);
}

#[test]
fn scene_clicks_shop_buttons_through_the_window_transform() {
    let mut scene = loaded_scene(RecordingSink::default());
    if let Some(session) = scene.session_mut() {
        session.player.position = Vec2::new(AT_COFFEE_STAND.0, AT_COFFEE_STAND.1);
    }
    scene.update(FIXED_DT_SECONDS, &InputSnapshot::empty());
    scene.update(FIXED_DT_SECONDS, &InputSnapshot::empty().with_interact_pressed(true));

    let session = scene.session().expect("session");
    let layout = menu_layout(session.modal, &session.world, &session.player).expect("menu");
    let button = layout.buttons[0].rect.center();
    // Window twice the canvas size: canvas pixels double.
    let click = click_snapshot(Vec2::new(button.x * 2.0, button.y * 2.0), (1600, 1200));
    scene.update(FIXED_DT_SECONDS, &click);

    let player = &scene.session().expect("session").player;
    assert_eq!(player.purchases, vec!["Coffee"]);
}

#[test]
fn render_shows_hud_prompt_and_win_screen() {
    let mut scene = loaded_scene(RecordingSink::default());
    if let Some(session) = scene.session_mut() {
        session.player.position = Vec2::new(AT_GATE_B2.0, AT_GATE_B2.1);
    }
    scene.update(FIXED_DT_SECONDS, &InputSnapshot::empty());

    let mut draw = DrawList::new(scene.canvas_size());
    scene.render(&mut draw);
    let texts = draw.texts().map(str::to_string).collect::<Vec<_>>();
    assert!(texts.contains(&"Current area: Gates".to_string()));
    assert!(texts.contains(&"Press E: Gate B2".to_string()));
    assert!(texts.contains(&"Money: $1000   Ticket: none".to_string()));

    if let Some(session) = scene.session_mut() {
        session.modal = Modal::Won { gate: 1 };
    }
    let mut draw = DrawList::new(scene.canvas_size());
    scene.render(&mut draw);
    assert!(draw.texts().any(|text| text == "Press Esc to play again"));
    assert!(draw.texts().any(|text| text == "You boarded at Gate B2!"));
}

#[test]
fn debug_title_reports_area_and_money() {
    let scene = loaded_scene(RecordingSink::default());
    assert_eq!(
        scene.debug_title().as_deref(),
        Some("Airport Run | Walking | $1000")
    );
}
