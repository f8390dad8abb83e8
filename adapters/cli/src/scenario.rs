//! Encounter descriptions loaded from TOML scenario files.

use std::{collections::BTreeSet, fs, path::Path};

use anyhow::{Context, Result};
use battle_grid_core::{
    CellCoord, CombatantId, CombatantSnapshot, LightLevel, LightSource, MapTheme, MovementBudget,
    Senses, Team,
};
use battle_grid_world::{
    layout::{parse_layout, LayoutError},
    Grid,
};
use rand::Rng;
use serde::Deserialize;
use thiserror::Error;

/// Walking speed granted when a scenario does not specify one.
const DEFAULT_SPEED: u32 = 30;

/// Raw scenario document as written on disk.
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ScenarioFile {
    #[serde(default)]
    theme: MapTheme,
    #[serde(default = "first_round")]
    round: u32,
    layout: Vec<String>,
    #[serde(default)]
    combatants: Vec<CombatantEntry>,
    #[serde(default)]
    lights: Vec<LightSource>,
    #[serde(default)]
    magical_darkness: Vec<CellCoord>,
}

const fn first_round() -> u32 {
    1
}

const fn default_speed() -> u32 {
    DEFAULT_SPEED
}

/// Combatant declared by a scenario.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct CombatantEntry {
    id: CombatantId,
    name: String,
    position: CellCoord,
    #[serde(default = "default_speed")]
    speed: u32,
    #[serde(default)]
    movement_used: u32,
    hit_points: i32,
    #[serde(default)]
    team: Team,
    #[serde(default)]
    senses: Senses,
    #[serde(default)]
    initiative: Option<i32>,
    #[serde(default)]
    initiative_modifier: i32,
}

impl CombatantEntry {
    /// Builds a snapshot, rolling d20 + modifier unless initiative is fixed.
    fn roll<R: Rng + ?Sized>(&self, rng: &mut R) -> CombatantSnapshot {
        let initiative = self
            .initiative
            .unwrap_or_else(|| rng.gen_range(1..=20) + self.initiative_modifier);

        CombatantSnapshot {
            id: self.id,
            name: self.name.clone(),
            position: self.position,
            movement: MovementBudget {
                total: self.speed,
                used: self.movement_used,
            },
            senses: self.senses,
            hit_points: self.hit_points,
            team: self.team,
            initiative,
            initiative_modifier: self.initiative_modifier,
        }
    }
}

/// Reasons a well-formed scenario document still describes an impossible encounter.
#[derive(Debug, Error)]
pub(crate) enum ScenarioError {
    /// The layout rows could not be turned into a grid.
    #[error("invalid layout")]
    Layout(#[from] LayoutError),
    /// Two combatants share an identifier.
    #[error("combatant {0} is declared more than once")]
    DuplicateCombatant(CombatantId),
    /// A combatant stands outside the map.
    #[error("combatant {id} stands at {position}, outside the map")]
    CombatantOffGrid {
        /// Offending combatant.
        id: CombatantId,
        /// Declared position.
        position: CellCoord,
    },
    /// Two light sources share an identifier.
    #[error("light source {0} is declared more than once")]
    DuplicateLight(u32),
}

/// Validated encounter: the grid plus everything standing and shining on it.
#[derive(Clone, Debug)]
pub(crate) struct Scenario {
    grid: Grid,
    round: u32,
    combatants: Vec<CombatantEntry>,
    lights: Vec<LightSource>,
    magical_darkness: Vec<CellCoord>,
}

impl Scenario {
    /// Reads and validates the scenario stored at `path`.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read scenario {}", path.display()))?;
        Self::from_toml(&contents)
            .with_context(|| format!("failed to load scenario {}", path.display()))
    }

    /// Parses and validates a scenario from TOML text.
    pub(crate) fn from_toml(contents: &str) -> Result<Self> {
        let file: ScenarioFile =
            toml::from_str(contents).context("scenario is not a valid TOML document")?;
        Ok(Self::validate(file)?)
    }

    fn validate(file: ScenarioFile) -> Result<Self, ScenarioError> {
        let grid = parse_layout(&file.layout, file.theme)?;

        let mut seen = BTreeSet::new();
        for entry in &file.combatants {
            if !seen.insert(entry.id) {
                return Err(ScenarioError::DuplicateCombatant(entry.id));
            }
            if !grid.within_bounds(entry.position) {
                return Err(ScenarioError::CombatantOffGrid {
                    id: entry.id,
                    position: entry.position,
                });
            }
        }

        let mut lights = BTreeSet::new();
        for light in &file.lights {
            if !lights.insert(light.id) {
                return Err(ScenarioError::DuplicateLight(light.id.get()));
            }
        }

        Ok(Self {
            grid,
            round: file.round,
            combatants: file.combatants,
            lights: file.lights,
            magical_darkness: file.magical_darkness,
        })
    }

    /// Battle map of the encounter.
    pub(crate) const fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Round the encounter is currently in.
    pub(crate) const fn round(&self) -> u32 {
        self.round
    }

    /// Ambient light derived from the map theme.
    pub(crate) fn ambient(&self) -> LightLevel {
        self.grid.theme().ambient_light()
    }

    /// Light sources placed in the encounter.
    pub(crate) fn lights(&self) -> &[LightSource] {
        &self.lights
    }

    /// Cells shrouded in magical darkness.
    pub(crate) fn magical_darkness(&self) -> &[CellCoord] {
        &self.magical_darkness
    }

    /// Snapshots of every combatant in declaration order, with initiative
    /// rolled from `rng` where the scenario leaves it open.
    pub(crate) fn roster<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<CombatantSnapshot> {
        self.combatants.iter().map(|entry| entry.roll(rng)).collect()
    }
}
