use engine::{Color, NpcDef, Rect, Vec2};
use rand::Rng;

/// An NPC picks a new waypoint once it is closer than this many steps from the current one.
pub(crate) const RETARGET_STEPS: f32 = 5.0;

const NPC_PALETTE: [Color; 6] = [
    Color::rgb(0xC0, 0x39, 0x2B),
    Color::rgb(0x8E, 0x44, 0xAD),
    Color::rgb(0x27, 0xAE, 0x60),
    Color::rgb(0xD3, 0x54, 0x00),
    Color::rgb(0x16, 0xA0, 0x85),
    Color::rgb(0x7F, 0x8C, 0x8D),
];

#[derive(Debug, Clone)]
pub(crate) struct Npc {
    pub(crate) name: String,
    pub(crate) position: Vec2,
    pub(crate) size: f32,
    pub(crate) speed: f32,
    pub(crate) target: Vec2,
    pub(crate) color_seed: u32,
    pub(crate) anim_phase: u32,
}

impl Npc {
    pub(crate) fn from_def(
        def: &NpcDef,
        map_width: f32,
        map_height: f32,
        rng: &mut impl Rng,
    ) -> Self {
        Self {
            name: def.name.clone(),
            position: def.start,
            size: def.size,
            speed: def.speed,
            target: random_waypoint(map_width, map_height, rng),
            color_seed: def.color_seed,
            anim_phase: 0,
        }
    }

    pub(crate) fn rect(&self) -> Rect {
        Rect::at(self.position, self.size, self.size)
    }

    pub(crate) fn color(&self) -> Color {
        NPC_PALETTE[self.color_seed as usize % NPC_PALETTE.len()]
    }
}

pub(crate) fn random_waypoint(map_width: f32, map_height: f32, rng: &mut impl Rng) -> Vec2 {
    Vec2::new(
        rng.gen_range(0.0..=map_width.max(0.0)),
        rng.gen_range(0.0..=map_height.max(0.0)),
    )
}

/// One tick of wandering: retarget when close, otherwise step `speed` toward the waypoint.
pub(crate) fn wander_step(npc: &mut Npc, map_width: f32, map_height: f32, rng: &mut impl Rng) {
    let delta = Vec2::new(npc.target.x - npc.position.x, npc.target.y - npc.position.y);
    let distance = delta.length();
    if distance < npc.speed * RETARGET_STEPS {
        npc.target = random_waypoint(map_width, map_height, rng);
    } else {
        npc.position.x += delta.x / distance * npc.speed;
        npc.position.y += delta.y / distance * npc.speed;
    }
    npc.anim_phase = npc.anim_phase.wrapping_add(1);
}
