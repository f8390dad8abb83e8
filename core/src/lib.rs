#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the battle grid engine.
//!
//! This crate defines the data model that connects the authoritative grid,
//! the pure query systems and any embedding adapter. The grid crate owns the
//! tile lattice, systems read tiles and [`CombatantSnapshot`] values to answer
//! movement, sight and targeting questions, and the turn-order system is the
//! only component that owns mutable encounter state. Every distance exchanged
//! through these types is expressed in length units, where one tile spans
//! [`LENGTH_UNITS_PER_TILE`] units.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Length units covered by a single square tile edge.
pub const LENGTH_UNITS_PER_TILE: u32 = 5;

/// Location of a single grid cell expressed as integer x and y coordinates.
///
/// `x` grows toward the east and `y` grows toward the south, so compass north
/// points toward decreasing `y`.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct CellCoord {
    x: i32,
    y: i32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Column of the cell.
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    /// Row of the cell.
    #[must_use]
    pub const fn y(&self) -> i32 {
        self.y
    }

    /// Returns the cell displaced by the provided deltas.
    #[must_use]
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x.saturating_add(dx), self.y.saturating_add(dy))
    }

    /// Computes the Chebyshev distance between two cells measured in tiles.
    #[must_use]
    pub fn chebyshev_distance(self, other: CellCoord) -> u32 {
        self.x.abs_diff(other.x).max(self.y.abs_diff(other.y))
    }

    /// Chebyshev distance between two cells converted into length units.
    #[must_use]
    pub fn distance_in_length_units(self, other: CellCoord) -> u32 {
        self.chebyshev_distance(other)
            .saturating_mul(LENGTH_UNITS_PER_TILE)
    }
}

impl fmt::Display for CellCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Error returned when text cannot be parsed as an `x,y` cell coordinate.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("expected a cell written as `x,y`, found `{input}`")]
pub struct ParseCellError {
    input: String,
}

impl FromStr for CellCoord {
    type Err = ParseCellError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let error = || ParseCellError {
            input: value.to_owned(),
        };
        let trimmed = value
            .trim()
            .trim_start_matches('(')
            .trim_end_matches(')');
        let (x, y) = trimmed.split_once(',').ok_or_else(error)?;
        let x = x.trim().parse().map_err(|_| error())?;
        let y = y.trim().parse().map_err(|_| error())?;
        Ok(Self::new(x, y))
    }
}

/// Width and height of a grid measured in whole tiles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridDimensions {
    width: u32,
    height: u32,
}

impl GridDimensions {
    /// Creates a new dimension descriptor.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Number of columns in the grid.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Number of rows in the grid.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Total number of cells covered by the grid.
    #[must_use]
    pub fn cell_count(&self) -> usize {
        let width = usize::try_from(self.width).unwrap_or(0);
        let height = usize::try_from(self.height).unwrap_or(0);
        width.checked_mul(height).unwrap_or(0)
    }

    /// Reports whether the cell lies within the grid.
    #[must_use]
    pub fn contains(&self, cell: CellCoord) -> bool {
        cell.x() >= 0
            && cell.y() >= 0
            && cell.x().unsigned_abs() < self.width
            && cell.y().unsigned_abs() < self.height
    }

    /// Row-major offset of the cell, if it lies within the grid.
    #[must_use]
    pub fn index_of(&self, cell: CellCoord) -> Option<usize> {
        if !self.contains(cell) {
            return None;
        }

        let width = usize::try_from(self.width).ok()?;
        let column = usize::try_from(cell.x()).ok()?;
        let row = usize::try_from(cell.y()).ok()?;
        row.checked_mul(width)?.checked_add(column)
    }

    /// Cell stored at the provided row-major offset.
    #[must_use]
    pub fn cell_at(&self, index: usize) -> Option<CellCoord> {
        if index >= self.cell_count() {
            return None;
        }

        let width = usize::try_from(self.width).ok()?;
        let column = i32::try_from(index % width).ok()?;
        let row = i32::try_from(index / width).ok()?;
        Some(CellCoord::new(column, row))
    }

    /// Iterator over every cell in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = CellCoord> {
        let dimensions = *self;
        (0..dimensions.cell_count()).filter_map(move |index| dimensions.cell_at(index))
    }
}

/// Theme of a battle map, used by embedders to derive ambient light.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MapTheme {
    /// Open woodland under a canopy.
    Forest,
    /// Natural underground caverns.
    Cave,
    /// Constructed underground halls.
    #[default]
    Dungeon,
    /// Open, sun-bleached sand.
    Desert,
    /// Murky wetland.
    Swamp,
}

impl MapTheme {
    /// Light level that fills every cell before any light source is applied.
    #[must_use]
    pub const fn ambient_light(self) -> LightLevel {
        match self {
            Self::Desert => LightLevel::Bright,
            Self::Forest | Self::Swamp => LightLevel::Dim,
            Self::Cave | Self::Dungeon => LightLevel::Darkness,
        }
    }
}

/// Terrain category of a tile.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerrainKind {
    /// Worked stone or packed earth.
    #[default]
    Floor,
    /// Short grass.
    Grass,
    /// Bare rock.
    Rock,
    /// Loose sand.
    Sand,
    /// Sucking mud.
    Mud,
    /// Shallow water.
    Water,
    /// Rubble, undergrowth or other difficult terrain.
    Difficult,
    /// Solid wall.
    Wall,
}

impl TerrainKind {
    /// Movement cost a tile of this terrain carries unless overridden.
    #[must_use]
    pub const fn default_movement_cost(self) -> MovementCost {
        match self {
            Self::Floor | Self::Grass | Self::Rock | Self::Sand => MovementCost::NORMAL,
            Self::Mud | Self::Water | Self::Difficult => MovementCost::DOUBLE,
            Self::Wall => MovementCost::IMPASSABLE,
        }
    }

    /// Reports whether this terrain blocks sight and movement by default.
    #[must_use]
    pub const fn is_solid(self) -> bool {
        matches!(self, Self::Wall)
    }
}

/// Multiplier applied to the cost of entering a tile.
///
/// Finite multipliers are never below one; the impassable cost removes the
/// tile from every route.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MovementCost {
    multiplier: Option<u32>,
}

impl MovementCost {
    /// Regular terrain that costs its base step cost.
    pub const NORMAL: Self = Self {
        multiplier: Some(1),
    };

    /// Difficult terrain that doubles the base step cost.
    pub const DOUBLE: Self = Self {
        multiplier: Some(2),
    };

    /// Terrain that can never be entered.
    pub const IMPASSABLE: Self = Self { multiplier: None };

    /// Creates a finite multiplier, clamping zero up to one.
    #[must_use]
    pub const fn multiplied_by(multiplier: u32) -> Self {
        Self {
            multiplier: Some(if multiplier == 0 { 1 } else { multiplier }),
        }
    }

    /// Finite multiplier, or `None` when the tile is impassable.
    #[must_use]
    pub const fn multiplier(&self) -> Option<u32> {
        self.multiplier
    }

    /// Reports whether the cost is infinite.
    #[must_use]
    pub const fn is_impassable(&self) -> bool {
        self.multiplier.is_none()
    }
}

impl Default for MovementCost {
    fn default() -> Self {
        Self::NORMAL
    }
}

/// Decorative feature standing on a tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decoration {
    /// A tree.
    Tree,
    /// A large boulder.
    Boulder,
    /// A stalagmite.
    Stalagmite,
    /// A load-bearing pillar.
    Pillar,
    /// A cactus.
    Cactus,
    /// A mangrove thicket.
    Mangrove,
}

/// Unique identifier of an environmental effect.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EffectId(u32);

impl EffectId {
    /// Creates a new effect identifier.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Category of an environmental effect lingering on a tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnvironmentalEffectKind {
    /// Burning ground.
    Fire,
    /// Slick ice.
    Ice,
    /// Poisonous vapour.
    Poison,
    /// Magically difficult terrain.
    DifficultTerrain,
    /// Sticky webbing.
    Web,
    /// Obscuring fog.
    Fog,
}

/// Status effect applied to creatures that interact with an environmental effect.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StatusEffectPayload {
    /// Display name of the status effect.
    pub name: String,
    /// Strength of the effect, such as damage per round.
    pub magnitude: i32,
    /// Rounds the status lasts once applied.
    pub duration_rounds: u32,
}

/// Environmental effect lingering on a tile.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EnvironmentalEffect {
    /// Identifier of the effect.
    pub id: EffectId,
    /// Category of the effect.
    pub kind: EnvironmentalEffectKind,
    /// Rounds remaining before the effect dissipates.
    pub remaining_rounds: u32,
    /// Status effect applied by the environmental effect.
    pub status: StatusEffectPayload,
}

/// Single square of the battle map.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    cell: CellCoord,
    terrain: TerrainKind,
    elevation: i32,
    movement_cost: MovementCost,
    blocks_line_of_sight: bool,
    blocks_movement: bool,
    provides_cover: bool,
    decoration: Option<Decoration>,
    effects: Vec<EnvironmentalEffect>,
}

impl Tile {
    /// Creates a tile whose cost and blocking flags follow the terrain defaults.
    #[must_use]
    pub fn new(cell: CellCoord, terrain: TerrainKind) -> Self {
        Self {
            cell,
            terrain,
            elevation: 0,
            movement_cost: terrain.default_movement_cost(),
            blocks_line_of_sight: terrain.is_solid(),
            blocks_movement: terrain.is_solid(),
            provides_cover: false,
            decoration: None,
            effects: Vec::new(),
        }
    }

    /// Returns the tile raised to the provided elevation.
    #[must_use]
    pub fn with_elevation(mut self, elevation: i32) -> Self {
        self.elevation = elevation;
        self
    }

    /// Returns the tile with an explicit movement cost.
    #[must_use]
    pub fn with_movement_cost(mut self, movement_cost: MovementCost) -> Self {
        self.movement_cost = movement_cost;
        self
    }

    /// Returns the tile with sight blocking toggled.
    #[must_use]
    pub fn with_sight_blocked(mut self, blocked: bool) -> Self {
        self.blocks_line_of_sight = blocked;
        self
    }

    /// Returns the tile with movement blocking toggled.
    #[must_use]
    pub fn with_movement_blocked(mut self, blocked: bool) -> Self {
        self.blocks_movement = blocked;
        self
    }

    /// Returns the tile with cover toggled.
    #[must_use]
    pub fn with_cover(mut self, provides_cover: bool) -> Self {
        self.provides_cover = provides_cover;
        self
    }

    /// Returns the tile carrying the provided decoration.
    #[must_use]
    pub fn with_decoration(mut self, decoration: Decoration) -> Self {
        self.decoration = Some(decoration);
        self
    }

    /// Returns the tile with an additional environmental effect appended.
    #[must_use]
    pub fn with_effect(mut self, effect: EnvironmentalEffect) -> Self {
        self.effects.push(effect);
        self
    }

    /// Coordinate that identifies the tile.
    #[must_use]
    pub const fn cell(&self) -> CellCoord {
        self.cell
    }

    /// Terrain category of the tile.
    #[must_use]
    pub const fn terrain(&self) -> TerrainKind {
        self.terrain
    }

    /// Elevation in whole steps.
    #[must_use]
    pub const fn elevation(&self) -> i32 {
        self.elevation
    }

    /// Elevation converted into length units.
    #[must_use]
    pub fn elevation_in_length_units(&self) -> i64 {
        i64::from(self.elevation) * i64::from(LENGTH_UNITS_PER_TILE)
    }

    /// Movement cost multiplier of the tile.
    #[must_use]
    pub const fn movement_cost(&self) -> MovementCost {
        self.movement_cost
    }

    /// Reports whether the tile blocks line of sight.
    #[must_use]
    pub const fn blocks_line_of_sight(&self) -> bool {
        self.blocks_line_of_sight
    }

    /// Reports whether the tile blocks movement.
    #[must_use]
    pub const fn blocks_movement(&self) -> bool {
        self.blocks_movement
    }

    /// Reports whether the tile grants cover to creatures behind it.
    #[must_use]
    pub const fn provides_cover(&self) -> bool {
        self.provides_cover
    }

    /// Decoration standing on the tile.
    #[must_use]
    pub const fn decoration(&self) -> Option<Decoration> {
        self.decoration
    }

    /// Environmental effects in application order.
    #[must_use]
    pub fn effects(&self) -> &[EnvironmentalEffect] {
        &self.effects
    }

    /// Reports whether a creature may ever end a step on the tile.
    #[must_use]
    pub const fn is_passable(&self) -> bool {
        !self.blocks_movement && !self.movement_cost.is_impassable()
    }
}

/// Illumination tier of a single cell.
///
/// Bright, dim and darkness merge monotonically toward the brighter tier.
/// Magical darkness sits outside that order: ordinary light never lifts it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LightLevel {
    /// Bright light.
    Bright,
    /// Dim light.
    Dim,
    /// Ordinary darkness.
    Darkness,
    /// Magical darkness, penetrated only by truesight.
    MagicalDarkness,
}

impl LightLevel {
    const fn rank(self) -> Option<u8> {
        match self {
            Self::Bright => Some(2),
            Self::Dim => Some(1),
            Self::Darkness => Some(0),
            Self::MagicalDarkness => None,
        }
    }

    /// Merges ordinary light into the current level without ever dimming it.
    ///
    /// Magical darkness on either side leaves the current level untouched.
    #[must_use]
    pub fn brightened_by(self, incoming: LightLevel) -> LightLevel {
        match (self.rank(), incoming.rank()) {
            (Some(current), Some(candidate)) if candidate > current => incoming,
            _ => self,
        }
    }

    /// Reports whether the level lets any creature see without special senses.
    #[must_use]
    pub const fn is_lit(self) -> bool {
        matches!(self, Self::Bright | Self::Dim)
    }
}

/// Special senses of an observer, each measured in length units (0 = none).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct Senses {
    /// Range at which darkness is seen as dim light.
    pub darkvision: u32,
    /// Range of blindsight.
    pub blindsight: u32,
    /// Range of tremorsense.
    pub tremorsense: u32,
    /// Range at which both darkness tiers are seen through.
    pub truesight: u32,
}

/// Unique identifier assigned to a combatant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CombatantId(u32);

impl CombatantId {
    /// Creates a new combatant identifier.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for CombatantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Side a combatant fights for.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Team {
    /// Player-controlled combatants.
    #[default]
    Player,
    /// Hostile combatants.
    Enemy,
    /// Combatants aligned with neither side.
    Neutral,
}

/// Movement available to a combatant this turn, in length units.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MovementBudget {
    /// Movement granted for the turn.
    pub total: u32,
    /// Movement already spent this turn.
    pub used: u32,
}

impl MovementBudget {
    /// Creates an unspent budget.
    #[must_use]
    pub const fn new(total: u32) -> Self {
        Self { total, used: 0 }
    }

    /// Movement still available this turn.
    #[must_use]
    pub const fn remaining(&self) -> u32 {
        self.total.saturating_sub(self.used)
    }
}

/// Immutable representation of a combatant consumed by the query systems.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatantSnapshot {
    /// Identifier of the combatant.
    pub id: CombatantId,
    /// Display name of the combatant.
    pub name: String,
    /// Cell the combatant occupies.
    pub position: CellCoord,
    /// Movement budget for the current turn.
    pub movement: MovementBudget,
    /// Special senses of the combatant.
    pub senses: Senses,
    /// Current hit points; zero or below means the combatant is down.
    pub hit_points: i32,
    /// Side the combatant fights for.
    pub team: Team,
    /// Rolled initiative.
    pub initiative: i32,
    /// Modifier added to initiative rolls, used to break initiative ties.
    pub initiative_modifier: i32,
}

impl CombatantSnapshot {
    /// Reports whether the combatant still takes turns.
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        self.hit_points > 0
    }
}

/// Read-only snapshot of every combatant in the encounter.
#[derive(Clone, Debug, Default)]
pub struct CombatantView {
    snapshots: Vec<CombatantSnapshot>,
}

impl CombatantView {
    /// Creates a new view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<CombatantSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured snapshots in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = &CombatantSnapshot> {
        self.snapshots.iter()
    }

    /// Snapshot of the requested combatant, if present.
    #[must_use]
    pub fn get(&self, id: CombatantId) -> Option<&CombatantSnapshot> {
        self.snapshots
            .binary_search_by_key(&id, |snapshot| snapshot.id)
            .ok()
            .and_then(|index| self.snapshots.get(index))
    }

    /// Reports whether the combatant is present and alive.
    #[must_use]
    pub fn is_alive(&self, id: CombatantId) -> bool {
        self.get(id).is_some_and(CombatantSnapshot::is_alive)
    }

    /// Number of captured combatants.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<CombatantSnapshot> {
        self.snapshots
    }
}

/// Unique identifier assigned to a light source.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LightSourceId(u32);

impl LightSourceId {
    /// Creates a new light source identifier.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Where a light source sits.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LightAnchor {
    /// Fixed at a cell.
    Point(CellCoord),
    /// Carried by a combatant and resolved at calculation time.
    Combatant(CombatantId),
}

/// Source of bright and dim light.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LightSource {
    /// Identifier of the source.
    pub id: LightSourceId,
    /// Radius of bright light in length units.
    pub bright_radius: u32,
    /// Additional radius of dim light beyond the bright radius.
    pub dim_radius: u32,
    /// Anchor that resolves the source's position.
    pub anchor: LightAnchor,
    /// Round the source was created in.
    pub created_round: u32,
    /// Round at which the source stops shedding light.
    pub expires_at_round: Option<u32>,
}

impl LightSource {
    /// Full reach of the source: bright plus dim radius.
    #[must_use]
    pub const fn total_radius(&self) -> u32 {
        self.bright_radius.saturating_add(self.dim_radius)
    }

    /// Reports whether the source still sheds light during `round`.
    #[must_use]
    pub fn is_active_in(&self, round: u32) -> bool {
        self.expires_at_round.map_or(true, |expiry| round < expiry)
    }
}

/// Template shape of an area of effect.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AoeShape {
    /// Radius around the origin.
    Sphere,
    /// Fan spreading from the origin toward a direction.
    Cone,
    /// Axis-aligned box anchored at its minimum corner.
    Cube,
    /// Single-tile ray.
    Line,
    /// Vertical cylinder, identical to a sphere on a flat grid.
    Cylinder,
}

/// Error returned when a textual shape tag names no known template.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("unknown area of effect shape `{tag}`")]
pub struct UnknownShapeError {
    tag: String,
}

impl UnknownShapeError {
    /// Tag that failed to parse.
    #[must_use]
    pub fn tag(&self) -> &str {
        &self.tag
    }
}

impl FromStr for AoeShape {
    type Err = UnknownShapeError;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        match tag.trim().to_ascii_lowercase().as_str() {
            "sphere" => Ok(Self::Sphere),
            "cone" => Ok(Self::Cone),
            "cube" => Ok(Self::Cube),
            "line" => Ok(Self::Line),
            "cylinder" => Ok(Self::Cylinder),
            _ => Err(UnknownShapeError {
                tag: tag.to_owned(),
            }),
        }
    }
}

/// Area-of-effect template anchored on the grid.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AoeRequest {
    /// Template shape.
    pub shape: AoeShape,
    /// Origin cell: centre for spheres, apex for cones, minimum corner for cubes.
    pub origin: CellCoord,
    /// Radius, length or side of the template in length units.
    pub size: u32,
    /// Compass heading in degrees (0 = north, 90 = east) for cones and lines.
    pub direction: Option<f64>,
    /// Explicit end point for lines, overriding the direction.
    pub aim: Option<CellCoord>,
    /// Line width in length units; lines are traced one tile wide.
    pub width: Option<u32>,
}

impl AoeRequest {
    /// Creates a request without direction, aim point or width.
    #[must_use]
    pub const fn new(shape: AoeShape, origin: CellCoord, size: u32) -> Self {
        Self {
            shape,
            origin,
            size,
            direction: None,
            aim: None,
            width: None,
        }
    }

    /// Returns the request aimed along a compass heading.
    #[must_use]
    pub fn with_direction(mut self, degrees: f64) -> Self {
        self.direction = Some(degrees);
        self
    }

    /// Returns the request aimed at an explicit cell.
    #[must_use]
    pub fn aimed_at(mut self, aim: CellCoord) -> Self {
        self.aim = Some(aim);
        self
    }

    /// Returns the request with an explicit width.
    #[must_use]
    pub fn with_width(mut self, width: u32) -> Self {
        self.width = Some(width);
        self
    }
}

/// Phase of the active turn.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnPhase {
    /// Combat has not started.
    #[default]
    Planning,
    /// The current actor is choosing and taking actions.
    Action,
}

/// Unique identifier assigned to an action.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ActionId(u32);

impl ActionId {
    /// Creates a new action identifier.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Category of an action taken during a turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    /// Movement along a route.
    Move,
    /// Use of an ability or spell.
    Ability,
    /// Voluntary end of the turn.
    EndTurn,
    /// Sustaining an ongoing effect.
    Sustain,
    /// Attempt to escape a restraining effect.
    BreakFree,
}

/// Action recorded in the current turn's log.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CombatAction {
    /// Identifier of the action.
    pub id: ActionId,
    /// Combatant performing the action.
    pub actor: CombatantId,
    /// Category of the action.
    pub kind: ActionKind,
    /// Ability used, for ability actions.
    pub ability: Option<String>,
    /// Cell targeted by the action.
    pub target_cell: Option<CellCoord>,
    /// Combatants targeted by the action.
    pub target_combatants: Vec<CombatantId>,
    /// Movement spent by the action in length units.
    pub movement_used: u32,
}

impl CombatAction {
    /// Creates an action with no targets and no movement.
    #[must_use]
    pub fn new(id: ActionId, actor: CombatantId, kind: ActionKind) -> Self {
        Self {
            id,
            actor,
            kind,
            ability: None,
            target_cell: None,
            target_combatants: Vec::new(),
            movement_used: 0,
        }
    }
}
