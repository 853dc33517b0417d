use std::collections::BTreeMap;

use crate::app::Color;
use crate::geometry::{Rect, Vec2};

#[derive(Debug, Clone, PartialEq)]
pub struct MapDef {
    pub width: f32,
    pub height: f32,
    pub background: Color,
}

impl Default for MapDef {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
            background: Color::rgb(0xF4, 0xF6, 0xF7),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerDef {
    pub start: Vec2,
    pub size: f32,
    pub speed: f32,
    pub money: u32,
    pub color: Color,
}

impl Default for PlayerDef {
    fn default() -> Self {
        Self {
            start: Vec2::new(400.0, 300.0),
            size: 20.0,
            speed: 4.0,
            money: 1000,
            color: Color::rgb(0x21, 0x61, 0x8C),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NpcDef {
    pub name: String,
    pub start: Vec2,
    pub size: f32,
    pub speed: f32,
    pub color_seed: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ZoneDef {
    pub name: String,
    pub rect: Rect,
    pub color: Color,
    /// Entering requires a completed check-in.
    pub requires_check_in: bool,
}

/// `interaction_zone` is the footprint inflated by the declared reach.
#[derive(Debug, Clone, PartialEq)]
pub struct CounterDef {
    pub name: String,
    pub rect: Rect,
    pub interaction_zone: Rect,
    pub cost: u32,
    pub ticket: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductDef {
    pub name: String,
    pub cost: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ShopDef {
    pub name: String,
    pub rect: Rect,
    pub interaction_zone: Rect,
    pub products: Vec<ProductDef>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GateDef {
    pub name: String,
    pub rect: Rect,
    pub interaction_zone: Rect,
    pub required_ticket: String,
}

/// Static airport layout; groups keep their declared order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayoutDefs {
    pub map: MapDef,
    pub player: PlayerDef,
    pub npcs: Vec<NpcDef>,
    pub zones: Vec<ZoneDef>,
    pub counters: Vec<CounterDef>,
    pub shops: Vec<ShopDef>,
    pub gates: Vec<GateDef>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoiceDef {
    pub label: String,
    pub next: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorySceneDef {
    pub key: String,
    pub title: String,
    pub body: String,
    pub image: Option<String>,
    pub choices: Vec<ChoiceDef>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoryDefs {
    /// First declared scene; `None` when no story content shipped.
    pub start: Option<String>,
    pub scenes: BTreeMap<String, StorySceneDef>,
}

impl StoryDefs {
    pub fn scene(&self, key: &str) -> Option<&StorySceneDef> {
        self.scenes.get(key)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContentDatabase {
    pub layout: LayoutDefs,
    pub story: StoryDefs,
}
