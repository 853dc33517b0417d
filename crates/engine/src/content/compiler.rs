use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use roxmltree::{Document, Node};

use crate::app::Color;
use crate::geometry::{Rect, Vec2};
use crate::AppPaths;

use super::types::{
    ChoiceDef, ContentDatabase, CounterDef, GateDef, LayoutDefs, MapDef, NpcDef, PlayerDef,
    ProductDef, ShopDef, StoryDefs, StorySceneDef, ZoneDef,
};

const DEFAULT_REACH_PX: f32 = 20.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentErrorCode {
    ReadFile,
    XmlMalformed,
    InvalidRoot,
    UnknownDefType,
    UnknownField,
    DuplicateField,
    MissingField,
    InvalidValue,
    DuplicateName,
    DuplicateDef,
    MissingDef,
    UnknownReference,
}

#[derive(Debug, Clone)]
pub struct ContentCompileError {
    pub code: ContentErrorCode,
    pub message: String,
    pub file_path: PathBuf,
    pub location: Option<SourceLocation>,
}

impl fmt::Display for ContentCompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.location {
            Some(loc) => write!(
                f,
                "{:?}: {} (file={}, line={}, column={})",
                self.code,
                self.message,
                self.file_path.display(),
                loc.line,
                loc.column
            ),
            None => write!(
                f,
                "{:?}: {} (file={})",
                self.code,
                self.message,
                self.file_path.display()
            ),
        }
    }
}

impl std::error::Error for ContentCompileError {}

/// Compiles every `*.xml` file under the base content directory, in path order.
pub fn compile_content(app_paths: &AppPaths) -> Result<ContentDatabase, ContentCompileError> {
    let root = &app_paths.base_content_dir;
    let xml_files =
        collect_xml_files_sorted(root).map_err(|error| read_error(error.path, error.source))?;

    let mut documents = Vec::with_capacity(xml_files.len());
    for xml_file in xml_files {
        let raw = fs::read_to_string(&xml_file)
            .map_err(|source| read_error(xml_file.clone(), source))?;
        documents.push((xml_file, raw));
    }

    let mut builder = ContentBuilder::new(root.clone());
    for (file_path, raw) in &documents {
        builder.add_document(file_path, raw)?;
    }
    builder.finish()
}

/// Compiles already-loaded documents; each entry is `(path used in errors, xml text)`.
pub fn compile_content_documents(
    documents: &[(PathBuf, String)],
) -> Result<ContentDatabase, ContentCompileError> {
    let fallback_path = documents
        .first()
        .map(|(path, _)| path.clone())
        .unwrap_or_default();
    let mut builder = ContentBuilder::new(fallback_path);
    for (file_path, raw) in documents {
        builder.add_document(file_path, raw)?;
    }
    builder.finish()
}

#[derive(Debug, Clone)]
struct DefOrigin {
    file_path: PathBuf,
    location: SourceLocation,
}

impl DefOrigin {
    fn error(&self, code: ContentErrorCode, message: String) -> ContentCompileError {
        ContentCompileError {
            code,
            message,
            file_path: self.file_path.clone(),
            location: Some(self.location),
        }
    }
}

#[derive(Debug)]
struct PendingReference {
    owner: String,
    target: String,
    origin: DefOrigin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum NameGroup {
    Zone,
    Interactable,
    Npc,
    StoryScene,
}

struct ContentBuilder {
    fallback_path: PathBuf,
    map: Option<(MapDef, DefOrigin)>,
    player: Option<(PlayerDef, DefOrigin)>,
    npcs: Vec<NpcDef>,
    zones: Vec<ZoneDef>,
    counters: Vec<CounterDef>,
    shops: Vec<ShopDef>,
    gates: Vec<GateDef>,
    story_start: Option<String>,
    story_scenes: BTreeMap<String, StorySceneDef>,
    seen_names: HashSet<(NameGroup, String)>,
    gate_tickets: Vec<PendingReference>,
    choice_targets: Vec<PendingReference>,
}

impl ContentBuilder {
    fn new(fallback_path: PathBuf) -> Self {
        Self {
            fallback_path,
            map: None,
            player: None,
            npcs: Vec::new(),
            zones: Vec::new(),
            counters: Vec::new(),
            shops: Vec::new(),
            gates: Vec::new(),
            story_start: None,
            story_scenes: BTreeMap::new(),
            seen_names: HashSet::new(),
            gate_tickets: Vec::new(),
            choice_targets: Vec::new(),
        }
    }

    fn add_document(&mut self, file_path: &Path, raw: &str) -> Result<(), ContentCompileError> {
        let doc = Document::parse(raw).map_err(|error| ContentCompileError {
            code: ContentErrorCode::XmlMalformed,
            message: format!("malformed XML: {error}"),
            file_path: file_path.to_path_buf(),
            location: Some(SourceLocation {
                line: error.pos().row as usize,
                column: error.pos().col as usize,
            }),
        })?;
        let ctx = DocContext {
            file_path,
            doc: &doc,
        };

        let root = doc.root_element();
        if root.tag_name().name() != "Defs" {
            return Err(ctx.error_at(
                ContentErrorCode::InvalidRoot,
                "root element must be <Defs>".to_string(),
                root,
            ));
        }

        for child in root.children().filter(|node| node.is_element()) {
            match child.tag_name().name() {
                "MapDef" => self.add_map(&ctx, child)?,
                "PlayerDef" => self.add_player(&ctx, child)?,
                "NpcDef" => self.add_npc(&ctx, child)?,
                "ZoneDef" => self.add_zone(&ctx, child)?,
                "CounterDef" => self.add_counter(&ctx, child)?,
                "ShopDef" => self.add_shop(&ctx, child)?,
                "GateDef" => self.add_gate(&ctx, child)?,
                "StorySceneDef" => self.add_story_scene(&ctx, child)?,
                other => {
                    return Err(ctx.error_at(
                        ContentErrorCode::UnknownDefType,
                        format!(
                            "unsupported def type <{other}>; expected one of MapDef, PlayerDef, \
NpcDef, ZoneDef, CounterDef, ShopDef, GateDef, StorySceneDef"
                        ),
                        child,
                    ))
                }
            }
        }
        Ok(())
    }

    fn add_map(
        &mut self,
        ctx: &DocContext<'_, '_>,
        node: Node<'_, '_>,
    ) -> Result<(), ContentCompileError> {
        let fields = ctx.fields(node, "MapDef", &["width", "height", "background"])?;
        let defaults = MapDef::default();
        let map = MapDef {
            width: ctx.positive_f32(fields.required(ctx, "width")?, "width")?,
            height: ctx.positive_f32(fields.required(ctx, "height")?, "height")?,
            background: match fields.optional("background") {
                Some(field) => ctx.color(field, "background")?,
                None => defaults.background,
            },
        };
        if self.map.is_some() {
            return Err(ctx.error_at(
                ContentErrorCode::DuplicateDef,
                "only one <MapDef> may be declared".to_string(),
                node,
            ));
        }
        self.map = Some((map, ctx.origin(node)));
        Ok(())
    }

    fn add_player(
        &mut self,
        ctx: &DocContext<'_, '_>,
        node: Node<'_, '_>,
    ) -> Result<(), ContentCompileError> {
        let fields = ctx.fields(node, "PlayerDef", &["start", "size", "speed", "money", "color"])?;
        let defaults = PlayerDef::default();
        let player = PlayerDef {
            start: ctx.vec2(fields.required(ctx, "start")?, "start")?,
            size: match fields.optional("size") {
                Some(field) => ctx.positive_f32(field, "size")?,
                None => defaults.size,
            },
            speed: ctx.positive_f32(fields.required(ctx, "speed")?, "speed")?,
            money: ctx.whole_number(fields.required(ctx, "money")?, "money")?,
            color: match fields.optional("color") {
                Some(field) => ctx.color(field, "color")?,
                None => defaults.color,
            },
        };
        if self.player.is_some() {
            return Err(ctx.error_at(
                ContentErrorCode::DuplicateDef,
                "only one <PlayerDef> may be declared".to_string(),
                node,
            ));
        }
        self.player = Some((player, ctx.origin(node)));
        Ok(())
    }

    fn add_npc(
        &mut self,
        ctx: &DocContext<'_, '_>,
        node: Node<'_, '_>,
    ) -> Result<(), ContentCompileError> {
        let fields = ctx.fields(node, "NpcDef", &["name", "start", "size", "speed", "colorSeed"])?;
        let name = ctx.required_text(fields.required(ctx, "name")?, "name")?;
        self.claim_name(ctx, node, NameGroup::Npc, &name)?;
        let npc = NpcDef {
            start: ctx.vec2(fields.required(ctx, "start")?, "start")?,
            size: match fields.optional("size") {
                Some(field) => ctx.positive_f32(field, "size")?,
                None => PlayerDef::default().size,
            },
            speed: ctx.positive_f32(fields.required(ctx, "speed")?, "speed")?,
            color_seed: match fields.optional("colorSeed") {
                Some(field) => ctx.whole_number(field, "colorSeed")?,
                None => self.npcs.len() as u32,
            },
            name,
        };
        self.npcs.push(npc);
        Ok(())
    }

    fn add_zone(
        &mut self,
        ctx: &DocContext<'_, '_>,
        node: Node<'_, '_>,
    ) -> Result<(), ContentCompileError> {
        let fields = ctx.fields(node, "ZoneDef", &["name", "rect", "color", "requiresCheckIn"])?;
        let name = ctx.required_text(fields.required(ctx, "name")?, "name")?;
        self.claim_name(ctx, node, NameGroup::Zone, &name)?;
        let zone = ZoneDef {
            rect: ctx.rect(fields.required(ctx, "rect")?, "rect")?,
            color: ctx.color(fields.required(ctx, "color")?, "color")?,
            requires_check_in: match fields.optional("requiresCheckIn") {
                Some(field) => ctx.flag(field, "requiresCheckIn")?,
                None => false,
            },
            name,
        };
        self.zones.push(zone);
        Ok(())
    }

    fn add_counter(
        &mut self,
        ctx: &DocContext<'_, '_>,
        node: Node<'_, '_>,
    ) -> Result<(), ContentCompileError> {
        let fields = ctx.fields(node, "CounterDef", &["name", "rect", "reach", "cost", "ticket"])?;
        let name = ctx.required_text(fields.required(ctx, "name")?, "name")?;
        self.claim_name(ctx, node, NameGroup::Interactable, &name)?;
        let (rect, interaction_zone) = ctx.footprint(&fields)?;
        let counter = CounterDef {
            rect,
            interaction_zone,
            cost: ctx.whole_number(fields.required(ctx, "cost")?, "cost")?,
            ticket: ctx.required_text(fields.required(ctx, "ticket")?, "ticket")?,
            name,
        };
        self.counters.push(counter);
        Ok(())
    }

    fn add_shop(
        &mut self,
        ctx: &DocContext<'_, '_>,
        node: Node<'_, '_>,
    ) -> Result<(), ContentCompileError> {
        let fields = ctx.fields(node, "ShopDef", &["name", "rect", "reach", "products"])?;
        let name = ctx.required_text(fields.required(ctx, "name")?, "name")?;
        self.claim_name(ctx, node, NameGroup::Interactable, &name)?;
        let (rect, interaction_zone) = ctx.footprint(&fields)?;

        let products_node = fields.required(ctx, "products")?;
        let mut products = Vec::new();
        for item in ctx.list_items(products_node, "products")? {
            let item_fields = ctx.fields(item, "products/li", &["name", "cost"])?;
            products.push(ProductDef {
                name: ctx.required_text(item_fields.required(ctx, "name")?, "name")?,
                cost: ctx.whole_number(item_fields.required(ctx, "cost")?, "cost")?,
            });
        }
        if products.is_empty() {
            return Err(ctx.error_at(
                ContentErrorCode::InvalidValue,
                format!("shop '{name}' must list at least one product"),
                products_node,
            ));
        }

        self.shops.push(ShopDef {
            name,
            rect,
            interaction_zone,
            products,
        });
        Ok(())
    }

    fn add_gate(
        &mut self,
        ctx: &DocContext<'_, '_>,
        node: Node<'_, '_>,
    ) -> Result<(), ContentCompileError> {
        let fields = ctx.fields(node, "GateDef", &["name", "rect", "reach", "requiredTicket"])?;
        let name = ctx.required_text(fields.required(ctx, "name")?, "name")?;
        self.claim_name(ctx, node, NameGroup::Interactable, &name)?;
        let (rect, interaction_zone) = ctx.footprint(&fields)?;
        let ticket_node = fields.required(ctx, "requiredTicket")?;
        let required_ticket = ctx.required_text(ticket_node, "requiredTicket")?;
        self.gate_tickets.push(PendingReference {
            owner: name.clone(),
            target: required_ticket.clone(),
            origin: ctx.origin(ticket_node),
        });
        self.gates.push(GateDef {
            name,
            rect,
            interaction_zone,
            required_ticket,
        });
        Ok(())
    }

    fn add_story_scene(
        &mut self,
        ctx: &DocContext<'_, '_>,
        node: Node<'_, '_>,
    ) -> Result<(), ContentCompileError> {
        let fields = ctx.fields(
            node,
            "StorySceneDef",
            &["key", "title", "body", "image", "choices"],
        )?;
        let key = ctx.required_text(fields.required(ctx, "key")?, "key")?;
        self.claim_name(ctx, node, NameGroup::StoryScene, &key)?;

        let mut choices = Vec::new();
        if let Some(choices_node) = fields.optional("choices") {
            for item in ctx.list_items(choices_node, "choices")? {
                let item_fields = ctx.fields(item, "choices/li", &["label", "next"])?;
                let next_node = item_fields.required(ctx, "next")?;
                let choice = ChoiceDef {
                    label: ctx.required_text(item_fields.required(ctx, "label")?, "label")?,
                    next: ctx.required_text(next_node, "next")?,
                };
                self.choice_targets.push(PendingReference {
                    owner: key.clone(),
                    target: choice.next.clone(),
                    origin: ctx.origin(next_node),
                });
                choices.push(choice);
            }
        }

        let scene = StorySceneDef {
            title: ctx.required_text(fields.required(ctx, "title")?, "title")?,
            body: ctx.required_text(fields.required(ctx, "body")?, "body")?,
            image: fields
                .optional("image")
                .map(|field| ctx.required_text(field, "image"))
                .transpose()?,
            choices,
            key: key.clone(),
        };
        if self.story_start.is_none() {
            self.story_start = Some(key.clone());
        }
        self.story_scenes.insert(key, scene);
        Ok(())
    }

    fn claim_name(
        &mut self,
        ctx: &DocContext<'_, '_>,
        node: Node<'_, '_>,
        group: NameGroup,
        name: &str,
    ) -> Result<(), ContentCompileError> {
        if self.seen_names.insert((group, name.to_string())) {
            return Ok(());
        }
        Err(ctx.error_at(
            ContentErrorCode::DuplicateName,
            format!(
                "duplicate name '{name}' in <{}>; names must be unique",
                node.tag_name().name()
            ),
            node,
        ))
    }

    fn finish(mut self) -> Result<ContentDatabase, ContentCompileError> {
        let Some((map, _)) = self.map.take() else {
            return Err(self.missing_def("MapDef"));
        };
        let Some((player, player_origin)) = self.player.take() else {
            return Err(self.missing_def("PlayerDef"));
        };

        let max_x = map.width - player.size;
        let max_y = map.height - player.size;
        if !(0.0..=max_x).contains(&player.start.x) || !(0.0..=max_y).contains(&player.start.y) {
            return Err(player_origin.error(
                ContentErrorCode::InvalidValue,
                format!(
                    "player start ({}, {}) must lie within [0, {max_x}] x [0, {max_y}]",
                    player.start.x, player.start.y
                ),
            ));
        }
        let start_rect = Rect::at(player.start, player.size, player.size);
        if let Some(zone) = self
            .zones
            .iter()
            .find(|zone| zone.requires_check_in && zone.rect.overlaps(&start_rect))
        {
            return Err(player_origin.error(
                ContentErrorCode::InvalidValue,
                format!(
                    "player start overlaps zone '{}' which requires check-in",
                    zone.name
                ),
            ));
        }

        let tickets = self
            .counters
            .iter()
            .map(|counter| counter.ticket.as_str())
            .collect::<HashSet<_>>();
        for reference in &self.gate_tickets {
            if !tickets.contains(reference.target.as_str()) {
                return Err(reference.origin.error(
                    ContentErrorCode::UnknownReference,
                    format!(
                        "gate '{}' requires ticket '{}' which no counter issues",
                        reference.owner, reference.target
                    ),
                ));
            }
        }
        for reference in &self.choice_targets {
            if !self.story_scenes.contains_key(&reference.target) {
                return Err(reference.origin.error(
                    ContentErrorCode::UnknownReference,
                    format!(
                        "story scene '{}' has a choice leading to unknown scene '{}'",
                        reference.owner, reference.target
                    ),
                ));
            }
        }

        Ok(ContentDatabase {
            layout: LayoutDefs {
                map,
                player,
                npcs: self.npcs,
                zones: self.zones,
                counters: self.counters,
                shops: self.shops,
                gates: self.gates,
            },
            story: StoryDefs {
                start: self.story_start,
                scenes: self.story_scenes,
            },
        })
    }

    fn missing_def(&self, def_type: &str) -> ContentCompileError {
        ContentCompileError {
            code: ContentErrorCode::MissingDef,
            message: format!("content must declare exactly one <{def_type}>"),
            file_path: self.fallback_path.clone(),
            location: None,
        }
    }
}

struct DocContext<'a, 'input> {
    file_path: &'a Path,
    doc: &'a Document<'input>,
}

struct Fields<'a, 'input> {
    owner: Node<'a, 'input>,
    def_type: &'static str,
    by_name: BTreeMap<String, Node<'a, 'input>>,
}

impl<'a, 'input> Fields<'a, 'input> {
    fn required(
        &self,
        ctx: &DocContext<'_, '_>,
        field_name: &str,
    ) -> Result<Node<'a, 'input>, ContentCompileError> {
        self.by_name.get(field_name).copied().ok_or_else(|| {
            ctx.error_at(
                ContentErrorCode::MissingField,
                format!(
                    "missing required field <{field_name}> in <{}>",
                    self.def_type
                ),
                self.owner,
            )
        })
    }

    fn optional(&self, field_name: &str) -> Option<Node<'a, 'input>> {
        self.by_name.get(field_name).copied()
    }
}

impl DocContext<'_, '_> {
    fn fields<'a, 'input>(
        &self,
        node: Node<'a, 'input>,
        def_type: &'static str,
        allowed: &[&str],
    ) -> Result<Fields<'a, 'input>, ContentCompileError> {
        let mut by_name = BTreeMap::new();
        for field in node.children().filter(|child| child.is_element()) {
            let field_name = field.tag_name().name().to_string();
            if !allowed.contains(&field_name.as_str()) {
                return Err(self.error_at(
                    ContentErrorCode::UnknownField,
                    format!("unknown field <{field_name}> in <{def_type}>"),
                    field,
                ));
            }
            if by_name.insert(field_name.clone(), field).is_some() {
                return Err(self.error_at(
                    ContentErrorCode::DuplicateField,
                    format!("duplicate field <{field_name}> in <{def_type}>"),
                    field,
                ));
            }
        }
        Ok(Fields {
            owner: node,
            def_type,
            by_name,
        })
    }

    fn list_items<'a, 'input>(
        &self,
        node: Node<'a, 'input>,
        field_name: &str,
    ) -> Result<Vec<Node<'a, 'input>>, ContentCompileError> {
        let mut items = Vec::new();
        for child in node.children().filter(|child| child.is_element()) {
            if child.tag_name().name() != "li" {
                return Err(self.error_at(
                    ContentErrorCode::UnknownField,
                    format!(
                        "<{field_name}> may only contain <li> items, found <{}>",
                        child.tag_name().name()
                    ),
                    child,
                ));
            }
            items.push(child);
        }
        Ok(items)
    }

    fn footprint(&self, fields: &Fields<'_, '_>) -> Result<(Rect, Rect), ContentCompileError> {
        let rect = self.rect(fields.required(self, "rect")?, "rect")?;
        let reach = match fields.optional("reach") {
            Some(field) => self.non_negative_f32(field, "reach")?,
            None => DEFAULT_REACH_PX,
        };
        Ok((rect, rect.inflate(reach)))
    }

    fn required_text(
        &self,
        node: Node<'_, '_>,
        field_name: &str,
    ) -> Result<String, ContentCompileError> {
        let value = node.text().map(str::trim).unwrap_or_default().to_string();
        if value.is_empty() {
            return Err(self.error_at(
                ContentErrorCode::MissingField,
                format!("field <{field_name}> must not be empty"),
                node,
            ));
        }
        Ok(value)
    }

    fn number(&self, node: Node<'_, '_>, field_name: &str) -> Result<f32, ContentCompileError> {
        let value = self.required_text(node, field_name)?;
        value
            .parse::<f32>()
            .ok()
            .filter(|parsed| parsed.is_finite())
            .ok_or_else(|| {
                self.error_at(
                    ContentErrorCode::InvalidValue,
                    format!("{field_name} '{value}' is not a valid number"),
                    node,
                )
            })
    }

    fn positive_f32(
        &self,
        node: Node<'_, '_>,
        field_name: &str,
    ) -> Result<f32, ContentCompileError> {
        let value = self.number(node, field_name)?;
        if value <= 0.0 {
            return Err(self.error_at(
                ContentErrorCode::InvalidValue,
                format!("{field_name} must be > 0"),
                node,
            ));
        }
        Ok(value)
    }

    fn non_negative_f32(
        &self,
        node: Node<'_, '_>,
        field_name: &str,
    ) -> Result<f32, ContentCompileError> {
        let value = self.number(node, field_name)?;
        if value < 0.0 {
            return Err(self.error_at(
                ContentErrorCode::InvalidValue,
                format!("{field_name} must be >= 0"),
                node,
            ));
        }
        Ok(value)
    }

    fn whole_number(
        &self,
        node: Node<'_, '_>,
        field_name: &str,
    ) -> Result<u32, ContentCompileError> {
        let value = self.required_text(node, field_name)?;
        value.parse::<u32>().map_err(|_| {
            self.error_at(
                ContentErrorCode::InvalidValue,
                format!("{field_name} '{value}' must be a non-negative whole number"),
                node,
            )
        })
    }

    fn flag(&self, node: Node<'_, '_>, field_name: &str) -> Result<bool, ContentCompileError> {
        let value = self.required_text(node, field_name)?;
        match value.as_str() {
            "true" => Ok(true),
            "false" => Ok(false),
            _ => Err(self.error_at(
                ContentErrorCode::InvalidValue,
                format!("{field_name} '{value}' must be true or false"),
                node,
            )),
        }
    }

    fn color(&self, node: Node<'_, '_>, field_name: &str) -> Result<Color, ContentCompileError> {
        let value = self.required_text(node, field_name)?;
        Color::from_hex(&value).ok_or_else(|| {
            self.error_at(
                ContentErrorCode::InvalidValue,
                format!("{field_name} '{value}' must be a #RRGGBB color"),
                node,
            )
        })
    }

    fn vec2(&self, node: Node<'_, '_>, field_name: &str) -> Result<Vec2, ContentCompileError> {
        match self.number_list(node, field_name)?.as_slice() {
            [x, y] => Ok(Vec2::new(*x, *y)),
            _ => Err(self.error_at(
                ContentErrorCode::InvalidValue,
                format!("{field_name} must be written as x,y"),
                node,
            )),
        }
    }

    fn rect(&self, node: Node<'_, '_>, field_name: &str) -> Result<Rect, ContentCompileError> {
        let values = self.number_list(node, field_name)?;
        let [x, y, width, height] = values[..] else {
            return Err(self.error_at(
                ContentErrorCode::InvalidValue,
                format!("{field_name} must be written as x,y,width,height"),
                node,
            ));
        };
        if width <= 0.0 || height <= 0.0 {
            return Err(self.error_at(
                ContentErrorCode::InvalidValue,
                format!("{field_name} width and height must be > 0"),
                node,
            ));
        }
        Ok(Rect::new(x, y, width, height))
    }

    fn number_list(
        &self,
        node: Node<'_, '_>,
        field_name: &str,
    ) -> Result<Vec<f32>, ContentCompileError> {
        let value = self.required_text(node, field_name)?;
        value
            .split(',')
            .map(|part| {
                part.trim()
                    .parse::<f32>()
                    .ok()
                    .filter(|parsed| parsed.is_finite())
                    .ok_or_else(|| {
                        self.error_at(
                            ContentErrorCode::InvalidValue,
                            format!("{field_name} '{value}' contains an invalid number"),
                            node,
                        )
                    })
            })
            .collect()
    }

    fn origin(&self, node: Node<'_, '_>) -> DefOrigin {
        DefOrigin {
            file_path: self.file_path.to_path_buf(),
            location: self.location_of(node),
        }
    }

    fn location_of(&self, node: Node<'_, '_>) -> SourceLocation {
        let pos = self.doc.text_pos_at(node.range().start);
        SourceLocation {
            line: pos.row as usize,
            column: pos.col as usize,
        }
    }

    fn error_at(
        &self,
        code: ContentErrorCode,
        message: String,
        node: Node<'_, '_>,
    ) -> ContentCompileError {
        ContentCompileError {
            code,
            message,
            file_path: self.file_path.to_path_buf(),
            location: Some(self.location_of(node)),
        }
    }
}

struct ReadError {
    path: PathBuf,
    source: std::io::Error,
}

fn collect_xml_files_sorted(root: &Path) -> Result<Vec<PathBuf>, ReadError> {
    let mut files = Vec::<PathBuf>::new();
    collect_recursive(root, &mut files)?;
    files.sort_by_key(|path| normalize_rel_path(path.strip_prefix(root).unwrap_or(path.as_path())));
    Ok(files)
}

fn collect_recursive(current: &Path, files: &mut Vec<PathBuf>) -> Result<(), ReadError> {
    let entries = fs::read_dir(current).map_err(|source| ReadError {
        path: current.to_path_buf(),
        source,
    })?;
    for entry in entries {
        let entry = entry.map_err(|source| ReadError {
            path: current.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        if path.is_dir() {
            collect_recursive(&path, files)?;
        } else if path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("xml"))
        {
            files.push(path);
        }
    }
    Ok(())
}

fn normalize_rel_path(path: &Path) -> String {
    path.components()
        .map(|component| component.as_os_str().to_string_lossy().to_string())
        .collect::<Vec<_>>()
        .join("/")
}

fn read_error(path: PathBuf, source: std::io::Error) -> ContentCompileError {
    ContentCompileError {
        code: ContentErrorCode::ReadFile,
        message: format!("failed to read content: {source}"),
        file_path: path,
        location: None,
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;
    use crate::app_paths_for_root;

    const MINIMAL: &str = r#"<Defs>
        <MapDef><width>800</width><height>600</height></MapDef>
        <PlayerDef><start>400,300</start><speed>4</speed><money>1000</money></PlayerDef>
    </Defs>"#;

    fn compile_one(xml: &str) -> Result<ContentDatabase, ContentCompileError> {
        compile_content_documents(&[
            (PathBuf::from("base.xml"), MINIMAL.to_string()),
            (PathBuf::from("extra.xml"), xml.to_string()),
        ])
    }

    fn write_file(path: &Path, content: &str) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("mkdir");
        }
        fs::write(path, content).expect("write");
    }

    #[test]
    fn minimal_layout_compiles_with_defaults() {
        let db = compile_one("<Defs/>").expect("compile");
        assert_eq!(db.layout.map.width, 800.0);
        assert_eq!(db.layout.player.size, 20.0);
        assert_eq!(db.layout.player.money, 1000);
        assert!(db.story.start.is_none());
    }

    #[test]
    fn interactables_keep_declared_order_and_inflate_reach() {
        let db = compile_one(
            r#"<Defs>
                <CounterDef><name>Zeta</name><rect>10,10,20,20</rect><cost>5</cost><ticket>Z</ticket></CounterDef>
                <CounterDef><name>Alpha</name><rect>50,10,20,20</rect><reach>5</reach><cost>7</cost><ticket>A</ticket></CounterDef>
            </Defs>"#,
        )
        .expect("compile");

        let names = db
            .layout
            .counters
            .iter()
            .map(|counter| counter.name.as_str())
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["Zeta", "Alpha"]);
        assert_eq!(
            db.layout.counters[0].interaction_zone,
            Rect::new(-10.0, -10.0, 60.0, 60.0)
        );
        assert_eq!(
            db.layout.counters[1].interaction_zone,
            Rect::new(45.0, 5.0, 30.0, 30.0)
        );
    }

    #[test]
    fn shop_products_are_parsed_from_list_items() {
        let db = compile_one(
            r#"<Defs>
                <ShopDef><name>Cafe</name><rect>0,0,10,10</rect><products>
                    <li><name>Coffee</name><cost>5</cost></li>
                    <li><name>Bagel</name><cost>3</cost></li>
                </products></ShopDef>
            </Defs>"#,
        )
        .expect("compile");
        let shop = &db.layout.shops[0];
        assert_eq!(shop.products.len(), 2);
        assert_eq!(shop.products[1].name, "Bagel");
        assert_eq!(shop.products[1].cost, 3);
    }

    #[test]
    fn missing_field_reports_file_and_location() {
        let err = compile_one(
            "<Defs>\n<ZoneDef><name>Gates</name><color>#E5E7E9</color></ZoneDef>\n</Defs>",
        )
        .expect_err("err");
        assert_eq!(err.code, ContentErrorCode::MissingField);
        assert!(err.file_path.ends_with("extra.xml"));
        assert_eq!(err.location.map(|loc| loc.line), Some(2));
        assert!(err.message.contains("<rect>"));
    }

    #[test]
    fn unknown_field_errors() {
        let err = compile_one(
            "<Defs><ZoneDef><name>A</name><rect>0,0,1,1</rect><color>#000000</color><mood>x</mood></ZoneDef></Defs>",
        )
        .expect_err("err");
        assert_eq!(err.code, ContentErrorCode::UnknownField);
    }

    #[test]
    fn unknown_def_type_errors() {
        let err = compile_one("<Defs><RunwayDef/></Defs>").expect_err("err");
        assert_eq!(err.code, ContentErrorCode::UnknownDefType);
    }

    #[test]
    fn duplicate_field_errors() {
        let err = compile_one(
            "<Defs><ZoneDef><name>A</name><name>B</name><rect>0,0,1,1</rect><color>#000000</color></ZoneDef></Defs>",
        )
        .expect_err("err");
        assert_eq!(err.code, ContentErrorCode::DuplicateField);
    }

    #[test]
    fn non_positive_rect_and_negative_cost_are_invalid() {
        let err = compile_one(
            "<Defs><ZoneDef><name>A</name><rect>0,0,0,10</rect><color>#000000</color></ZoneDef></Defs>",
        )
        .expect_err("err");
        assert_eq!(err.code, ContentErrorCode::InvalidValue);

        let err = compile_one(
            "<Defs><CounterDef><name>A</name><rect>0,0,5,5</rect><cost>-1</cost><ticket>T</ticket></CounterDef></Defs>",
        )
        .expect_err("err");
        assert_eq!(err.code, ContentErrorCode::InvalidValue);
    }

    #[test]
    fn interactable_names_must_be_unique_across_kinds() {
        let err = compile_one(
            r#"<Defs>
                <CounterDef><name>Desk</name><rect>0,0,5,5</rect><cost>1</cost><ticket>T</ticket></CounterDef>
                <GateDef><name>Desk</name><rect>9,9,5,5</rect><requiredTicket>T</requiredTicket></GateDef>
            </Defs>"#,
        )
        .expect_err("err");
        assert_eq!(err.code, ContentErrorCode::DuplicateName);
    }

    #[test]
    fn gate_ticket_must_be_issued_by_some_counter() {
        let err = compile_one(
            "<Defs><GateDef><name>G</name><rect>0,0,5,5</rect><requiredTicket>First</requiredTicket></GateDef></Defs>",
        )
        .expect_err("err");
        assert_eq!(err.code, ContentErrorCode::UnknownReference);
        assert!(err.message.contains("First"));
    }

    #[test]
    fn second_map_def_is_rejected() {
        let err = compile_one(
            "<Defs><MapDef><width>10</width><height>10</height></MapDef></Defs>",
        )
        .expect_err("err");
        assert_eq!(err.code, ContentErrorCode::DuplicateDef);
    }

    #[test]
    fn missing_map_def_is_reported() {
        let err = compile_content_documents(&[(
            PathBuf::from("only.xml"),
            "<Defs/>".to_string(),
        )])
        .expect_err("err");
        assert_eq!(err.code, ContentErrorCode::MissingDef);
        assert!(err.message.contains("MapDef"));
    }

    #[test]
    fn missing_player_def_is_reported_after_map() {
        let err = compile_content_documents(&[(
            PathBuf::from("map_only.xml"),
            "<Defs><MapDef><width>800</width><height>600</height></MapDef></Defs>".to_string(),
        )])
        .expect_err("err");
        assert_eq!(err.code, ContentErrorCode::MissingDef);
        assert!(err.message.contains("PlayerDef"));
        assert_eq!(err.file_path, PathBuf::from("map_only.xml"));
    }

    #[test]
    fn player_start_must_fit_inside_map() {
        let err = compile_content_documents(&[(
            PathBuf::from("layout.xml"),
            r#"<Defs>
                <MapDef><width>100</width><height>100</height></MapDef>
                <PlayerDef><start>90,10</start><speed>4</speed><money>1</money></PlayerDef>
            </Defs>"#
                .to_string(),
        )])
        .expect_err("err");
        assert_eq!(err.code, ContentErrorCode::InvalidValue);
        assert!(err.location.is_some());
    }

    #[test]
    fn player_cannot_start_inside_secured_zone() {
        let err = compile_one(
            r#"<Defs>
                <ZoneDef><name>Security</name><rect>390,290,50,50</rect><color>#D6EAF8</color>
                    <requiresCheckIn>true</requiresCheckIn></ZoneDef>
            </Defs>"#,
        )
        .expect_err("err");
        assert_eq!(err.code, ContentErrorCode::InvalidValue);
        assert!(err.message.contains("Security"));

        compile_one(
            r#"<Defs>
                <ZoneDef><name>Lounge</name><rect>390,290,50,50</rect><color>#D6EAF8</color></ZoneDef>
            </Defs>"#,
        )
        .expect("open zone at start is fine");
    }

    #[test]
    fn story_start_is_first_scene_and_choices_resolve() {
        let db = compile_one(
            r#"<Defs>
                <StorySceneDef><key>lobby</key><title>Lobby</title><body>Hi</body>
                    <choices><li><label>Go</label><next>gate</next></li></choices>
                </StorySceneDef>
                <StorySceneDef><key>gate</key><title>Gate</title><body>Bye</body><image>gate.png</image></StorySceneDef>
            </Defs>"#,
        )
        .expect("compile");
        assert_eq!(db.story.start.as_deref(), Some("lobby"));
        assert_eq!(db.story.scene("lobby").map(|s| s.choices.len()), Some(1));
        assert_eq!(
            db.story.scene("gate").and_then(|s| s.image.as_deref()),
            Some("gate.png")
        );
    }

    #[test]
    fn story_choice_to_unknown_scene_errors() {
        let err = compile_one(
            r#"<Defs>
                <StorySceneDef><key>lobby</key><title>Lobby</title><body>Hi</body>
                    <choices><li><label>Go</label><next>nowhere</next></li></choices>
                </StorySceneDef>
            </Defs>"#,
        )
        .expect_err("err");
        assert_eq!(err.code, ContentErrorCode::UnknownReference);
        assert!(err.message.contains("nowhere"));
    }

    #[test]
    fn malformed_xml_reports_location() {
        let err = compile_one("<Defs><ZoneDef></Defs>").expect_err("err");
        assert_eq!(err.code, ContentErrorCode::XmlMalformed);
        assert!(err.location.is_some());
    }

    #[test]
    fn invalid_root_errors() {
        let err = compile_one("<Airport/>").expect_err("err");
        assert_eq!(err.code, ContentErrorCode::InvalidRoot);
    }

    #[test]
    fn compile_content_reads_nested_xml_files_in_path_order() {
        let temp = TempDir::new().expect("temp");
        let paths = app_paths_for_root(temp.path().to_path_buf());
        write_file(&paths.base_content_dir.join("a_layout.xml"), MINIMAL);
        write_file(
            &paths.base_content_dir.join("zones").join("b.xml"),
            "<Defs><ZoneDef><name>Second</name><rect>0,0,1,1</rect><color>#000000</color></ZoneDef></Defs>",
        );
        write_file(
            &paths.base_content_dir.join("a_zones.xml"),
            "<Defs><ZoneDef><name>First</name><rect>0,0,1,1</rect><color>#000000</color></ZoneDef></Defs>",
        );
        write_file(&paths.base_content_dir.join("notes.txt"), "ignored");

        let db = compile_content(&paths).expect("compile");
        let names = db
            .layout
            .zones
            .iter()
            .map(|zone| zone.name.as_str())
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["First", "Second"]);
    }

    #[test]
    fn missing_content_dir_is_a_read_error() {
        let temp = TempDir::new().expect("temp");
        let paths = app_paths_for_root(temp.path().to_path_buf());
        let err = compile_content(&paths).expect_err("err");
        assert_eq!(err.code, ContentErrorCode::ReadFile);
    }
}
