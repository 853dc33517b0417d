use engine::{Color, LayoutDefs, ProductDef, Rect};

pub(crate) const WALKING_LABEL: &str = "Walking";

#[derive(Debug, Clone)]
pub(crate) struct Zone {
    pub(crate) name: String,
    pub(crate) rect: Rect,
    pub(crate) color: Color,
    pub(crate) requires_check_in: bool,
}

#[derive(Debug, Clone)]
pub(crate) struct Counter {
    pub(crate) name: String,
    pub(crate) rect: Rect,
    pub(crate) interaction_zone: Rect,
    pub(crate) cost: u32,
    pub(crate) ticket: String,
}

#[derive(Debug, Clone)]
pub(crate) struct Shop {
    pub(crate) name: String,
    pub(crate) rect: Rect,
    pub(crate) interaction_zone: Rect,
    pub(crate) products: Vec<ProductDef>,
}

#[derive(Debug, Clone)]
pub(crate) struct Gate {
    pub(crate) name: String,
    pub(crate) rect: Rect,
    pub(crate) interaction_zone: Rect,
    pub(crate) required_ticket: String,
}

/// Stable handle to one interactable; the index is into the matching group of [`World`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum InteractableId {
    Counter(usize),
    Shop(usize),
    Gate(usize),
}

/// Static airport geometry. Built once per session and never mutated.
#[derive(Debug, Clone)]
pub(crate) struct World {
    pub(crate) width: f32,
    pub(crate) height: f32,
    pub(crate) background: Color,
    pub(crate) zones: Vec<Zone>,
    pub(crate) counters: Vec<Counter>,
    pub(crate) shops: Vec<Shop>,
    pub(crate) gates: Vec<Gate>,
}

impl World {
    pub(crate) fn from_layout(layout: &LayoutDefs) -> Self {
        Self {
            width: layout.map.width,
            height: layout.map.height,
            background: layout.map.background,
            zones: layout
                .zones
                .iter()
                .map(|zone| Zone {
                    name: zone.name.clone(),
                    rect: zone.rect,
                    color: zone.color,
                    requires_check_in: zone.requires_check_in,
                })
                .collect(),
            counters: layout
                .counters
                .iter()
                .map(|counter| Counter {
                    name: counter.name.clone(),
                    rect: counter.rect,
                    interaction_zone: counter.interaction_zone,
                    cost: counter.cost,
                    ticket: counter.ticket.clone(),
                })
                .collect(),
            shops: layout
                .shops
                .iter()
                .map(|shop| Shop {
                    name: shop.name.clone(),
                    rect: shop.rect,
                    interaction_zone: shop.interaction_zone,
                    products: shop.products.clone(),
                })
                .collect(),
            gates: layout
                .gates
                .iter()
                .map(|gate| Gate {
                    name: gate.name.clone(),
                    rect: gate.rect,
                    interaction_zone: gate.interaction_zone,
                    required_ticket: gate.required_ticket.clone(),
                })
                .collect(),
        }
    }

    /// Every interactable in resolution priority order: counters, then shops, then gates.
    pub(crate) fn interactables(&self) -> impl Iterator<Item = (InteractableId, &Rect)> {
        let counters = self
            .counters
            .iter()
            .enumerate()
            .map(|(index, counter)| (InteractableId::Counter(index), &counter.interaction_zone));
        let shops = self
            .shops
            .iter()
            .enumerate()
            .map(|(index, shop)| (InteractableId::Shop(index), &shop.interaction_zone));
        let gates = self
            .gates
            .iter()
            .enumerate()
            .map(|(index, gate)| (InteractableId::Gate(index), &gate.interaction_zone));
        counters.chain(shops).chain(gates)
    }

    pub(crate) fn interactable_name(&self, id: InteractableId) -> Option<&str> {
        match id {
            InteractableId::Counter(index) => self.counters.get(index).map(|c| c.name.as_str()),
            InteractableId::Shop(index) => self.shops.get(index).map(|s| s.name.as_str()),
            InteractableId::Gate(index) => self.gates.get(index).map(|g| g.name.as_str()),
        }
    }

    /// First zone in declared order that overlaps `rect`.
    pub(crate) fn zone_at(&self, rect: &Rect) -> Option<&Zone> {
        self.zones.iter().find(|zone| zone.rect.overlaps(rect))
    }

    pub(crate) fn area_label(&self, rect: &Rect) -> &str {
        self.zone_at(rect)
            .map_or(WALKING_LABEL, |zone| zone.name.as_str())
    }

    pub(crate) fn secured_zone_at(&self, rect: &Rect) -> Option<&Zone> {
        self.zones
            .iter()
            .find(|zone| zone.requires_check_in && zone.rect.overlaps(rect))
    }
}
