#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that answers tactical queries about an encounter.

mod render;
mod scenario;

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use battle_grid_core::{
    AoeRequest, AoeShape, CellCoord, CombatantId, CombatantSnapshot, CombatantView, LightLevel,
};
use battle_grid_system_area_of_effect::affected_cells_on_grid;
use battle_grid_system_line_of_sight::{cover_between, has_line_of_sight, trace};
use battle_grid_system_pathfinding::{find_route, reachable_area, reachable_for};
use battle_grid_system_turn_order::{
    advance, apply, AdvanceOutcome, TurnCommand, TurnEvent, TurnRecord,
};
use battle_grid_system_visibility::{
    can_see, compute_light_field, perceive, visible_cells, LightField, Perception,
};
use clap::{Parser, Subcommand};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use render::Overlay;
use scenario::Scenario;
use serde_json::{json, Value};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Tactical grid queries for turn-based encounters.
#[derive(Debug, Parser)]
#[command(name = "battle-grid", version)]
struct Cli {
    /// TOML scenario describing the encounter.
    scenario: PathBuf,
    /// Print JSON instead of an ASCII overlay.
    #[arg(long, global = true)]
    json: bool,
    /// Seed for initiative rolls.
    #[arg(long, global = true, default_value_t = 20)]
    seed: u64,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Cheapest route between two cells.
    Path {
        /// Start cell as `x,y`.
        #[arg(long)]
        from: CellCoord,
        /// Goal cell as `x,y`.
        #[arg(long)]
        to: CellCoord,
    },
    /// Cells reachable by a combatant, or from a cell with a movement budget.
    Reach {
        /// Combatant whose remaining movement is spent.
        #[arg(long, conflicts_with_all = ["from", "budget"])]
        combatant: Option<u32>,
        /// Start cell as `x,y`.
        #[arg(long, requires = "budget")]
        from: Option<CellCoord>,
        /// Movement budget in feet.
        #[arg(long, requires = "from")]
        budget: Option<u32>,
    },
    /// Line of sight and cover between two cells.
    Los {
        /// Attacker cell as `x,y`.
        #[arg(long)]
        from: CellCoord,
        /// Target cell as `x,y`.
        #[arg(long)]
        to: CellCoord,
    },
    /// Light level of every cell in the current round.
    Light,
    /// What a combatant can see.
    Vision {
        /// Observing combatant.
        #[arg(long)]
        combatant: u32,
    },
    /// Cells covered by an area-of-effect template.
    Aoe {
        /// Template shape: sphere, cube, cone, line or cylinder.
        #[arg(long)]
        shape: AoeShape,
        /// Origin cell as `x,y`.
        #[arg(long)]
        origin: CellCoord,
        /// Template size in feet.
        #[arg(long)]
        size: u32,
        /// Compass heading in degrees, 0 pointing north.
        #[arg(long, allow_hyphen_values = true)]
        direction: Option<f64>,
        /// Cell the template is aimed at, overriding the heading.
        #[arg(long)]
        aim: Option<CellCoord>,
        /// Width of a line in feet.
        #[arg(long)]
        width: Option<u32>,
    },
    /// Rolls initiative and plays out the turn order.
    Turns {
        /// Number of rounds to play.
        #[arg(long, default_value_t = 3, value_parser = clap::value_parser!(u32).range(1..))]
        rounds: u32,
    },
}

/// Output of a query in both renderings.
struct Report {
    text: String,
    json: Value,
}

/// Entry point for the battle grid command-line interface.
fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let scenario = Scenario::load(&cli.scenario)?;
    let mut rng = ChaCha8Rng::seed_from_u64(cli.seed);
    let roster = scenario.roster(&mut rng);
    info!(
        scenario = %cli.scenario.display(),
        combatants = roster.len(),
        round = scenario.round(),
        "loaded scenario"
    );

    let report = run(&scenario, roster, cli.command)?;
    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report.json).context("failed to encode report")?
        );
    } else {
        print!("{}", report.text);
    }
    Ok(())
}

fn run(scenario: &Scenario, roster: Vec<CombatantSnapshot>, command: Command) -> Result<Report> {
    let view = CombatantView::from_snapshots(roster.clone());
    match command {
        Command::Path { from, to } => Ok(path_report(scenario, from, to)),
        Command::Reach {
            combatant,
            from,
            budget,
        } => reach_report(scenario, &view, combatant, from.zip(budget)),
        Command::Los { from, to } => Ok(los_report(scenario, from, to)),
        Command::Light => Ok(light_report(scenario, &view)),
        Command::Vision { combatant } => vision_report(scenario, &view, combatant),
        Command::Aoe {
            shape,
            origin,
            size,
            direction,
            aim,
            width,
        } => {
            let mut request = AoeRequest::new(shape, origin, size);
            request.direction = direction;
            request.aim = aim;
            request.width = width;
            Ok(aoe_report(scenario, &view, &request))
        }
        Command::Turns { rounds } => Ok(turns_report(&view, roster, rounds)),
    }
}

fn path_report(scenario: &Scenario, from: CellCoord, to: CellCoord) -> Report {
    let grid = scenario.grid();
    let Some(route) = find_route(grid, from, to) else {
        return Report {
            text: format!("no route from {from} to {to}\n"),
            json: json!({ "from": from, "to": to, "cost": null, "cells": [] }),
        };
    };

    let mut overlay = Overlay::new(grid);
    overlay.mark_all(route.cells().iter().copied(), '*');
    overlay.mark(from, 'S');
    overlay.mark(to, 'G');
    let steps = route.cells().len().saturating_sub(1);

    Report {
        text: format!(
            "{overlay}route {from} -> {to}: {steps} steps, {} ft\n",
            route.cost()
        ),
        json: json!({
            "from": from,
            "to": to,
            "cost": route.cost(),
            "cells": route.cells(),
        }),
    }
}

fn reach_report(
    scenario: &Scenario,
    view: &CombatantView,
    combatant: Option<u32>,
    start: Option<(CellCoord, u32)>,
) -> Result<Report> {
    let grid = scenario.grid();
    let (origin, area) = match (combatant, start) {
        (Some(id), _) => {
            let mover = find_combatant(view, id)?;
            (mover.position, reachable_for(grid, mover))
        }
        (None, Some((from, budget))) => (from, reachable_area(grid, from, budget)),
        (None, None) => bail!("reach needs --combatant, or --from together with --budget"),
    };

    let mut overlay = Overlay::new(grid);
    overlay.mark_all(area.iter().map(|(cell, _)| cell), '+');
    overlay.mark(origin, 'S');

    Ok(Report {
        text: format!("{overlay}{} cells reachable from {origin}\n", area.len()),
        json: json!({
            "origin": origin,
            "cells": area
                .iter()
                .map(|(cell, cost)| json!({ "cell": cell, "cost": cost }))
                .collect::<Vec<_>>(),
        }),
    })
}

fn los_report(scenario: &Scenario, from: CellCoord, to: CellCoord) -> Report {
    let grid = scenario.grid();
    let clear = has_line_of_sight(grid, from, to);
    let cover = cover_between(grid, from, to);
    let line = trace(from, to);

    let mut overlay = Overlay::new(grid);
    overlay.mark_all(line.iter().copied(), '*');
    overlay.mark(from, 'A');
    overlay.mark(to, 'T');

    Report {
        text: format!(
            "{overlay}line of sight {from} -> {to}: {}; cover {cover:?} (+{})\n",
            if clear { "clear" } else { "blocked" },
            cover.bonus()
        ),
        json: json!({
            "from": from,
            "to": to,
            "clear": clear,
            "cover": format!("{cover:?}"),
            "cover_bonus": cover.bonus(),
            "trace": line,
        }),
    }
}

fn light_field(scenario: &Scenario, view: &CombatantView) -> LightField {
    let mut field = compute_light_field(
        scenario.grid(),
        scenario.ambient(),
        scenario.lights(),
        view,
        scenario.round(),
    );
    field.apply_magical_darkness(scenario.magical_darkness().iter().copied());
    field
}

fn light_report(scenario: &Scenario, view: &CombatantView) -> Report {
    let grid = scenario.grid();
    let field = light_field(scenario, view);

    let mut overlay = Overlay::new(grid);
    for (cell, level) in field.iter() {
        let solid = grid
            .tile_at(cell)
            .map_or(true, |tile| tile.blocks_line_of_sight());
        let glyph = match level {
            LightLevel::Bright => continue,
            LightLevel::Dim => '-',
            LightLevel::Darkness if solid => continue,
            LightLevel::Darkness => ' ',
            LightLevel::MagicalDarkness => '&',
        };
        overlay.mark(cell, glyph);
    }
    overlay.mark_combatants(view.iter());

    Report {
        text: format!(
            "{overlay}round {}: layout glyph = bright, '-' = dim, ' ' = dark, \
             '&' = magical darkness\n",
            scenario.round()
        ),
        json: json!({
            "round": scenario.round(),
            "ambient": scenario.ambient(),
            "cells": field
                .iter()
                .map(|(cell, level)| json!({ "cell": cell, "level": level }))
                .collect::<Vec<_>>(),
        }),
    }
}

fn vision_report(scenario: &Scenario, view: &CombatantView, observer: u32) -> Result<Report> {
    let grid = scenario.grid();
    let observer = find_combatant(view, observer)?;
    let field = light_field(scenario, view);
    let perception = perceive(observer, grid, &field);

    let mut overlay = Overlay::new(grid);
    for (cell, seen) in &perception {
        match seen {
            Perception::Clear => {}
            Perception::Obscured => overlay.mark(*cell, '?'),
            Perception::Hidden => overlay.mark(*cell, ' '),
        }
    }
    let spotted: Vec<&CombatantSnapshot> = view
        .iter()
        .filter(|other| other.id == observer.id || can_see(observer, grid, &field, other.position))
        .collect();
    overlay.mark_combatants(spotted.iter().copied());

    let mut text = format!("{overlay}{} {} sees:\n", observer.name, observer.id);
    let mut sightings = Vec::new();
    for other in spotted.iter().filter(|other| other.id != observer.id) {
        let clarity = perception
            .get(&other.position)
            .copied()
            .map_or("hidden", perception_label);
        text.push_str(&format!(
            "  {} {} at {}: {clarity}\n",
            other.name, other.id, other.position
        ));
        sightings.push(json!({ "id": other.id, "name": other.name, "clarity": clarity }));
    }

    Ok(Report {
        text,
        json: json!({
            "observer": observer.id,
            "visible": visible_cells(observer, grid, &field),
            "combatants": sightings,
        }),
    })
}

fn perception_label(perception: Perception) -> &'static str {
    match perception {
        Perception::Clear => "clear",
        Perception::Obscured => "lightly obscured",
        Perception::Hidden => "hidden",
    }
}

fn aoe_report(scenario: &Scenario, view: &CombatantView, request: &AoeRequest) -> Report {
    let grid = scenario.grid();
    let cells = affected_cells_on_grid(grid, request);
    let caught: Vec<&CombatantSnapshot> = view
        .iter()
        .filter(|combatant| cells.contains(&combatant.position))
        .collect();

    let mut overlay = Overlay::new(grid);
    overlay.mark_all(cells.iter().copied(), '*');
    overlay.mark(request.origin, 'o');
    overlay.mark_combatants(caught.iter().copied());

    let names: Vec<String> = caught
        .iter()
        .map(|combatant| format!("{} {}", combatant.name, combatant.id))
        .collect();
    Report {
        text: format!(
            "{overlay}{} cells affected; caught: {}\n",
            cells.len(),
            if names.is_empty() {
                "nobody".to_owned()
            } else {
                names.join(", ")
            }
        ),
        json: json!({
            "request": request,
            "cells": cells,
            "caught": caught.iter().map(|combatant| combatant.id).collect::<Vec<_>>(),
        }),
    }
}

fn turns_report(view: &CombatantView, roster: Vec<CombatantSnapshot>, rounds: u32) -> Report {
    let mut events = Vec::new();
    let mut record = apply(
        &TurnRecord::default(),
        TurnCommand::Initialize { combatants: roster },
        view,
        &mut events,
    );

    loop {
        match advance(&record, view).1 {
            AdvanceOutcome::Advanced {
                new_round: true, ..
            } if record.round() >= rounds => break,
            AdvanceOutcome::NotInitialized => break,
            _ => {}
        }
        record = apply(&record, TurnCommand::Advance, view, &mut events);
        if matches!(events.last(), Some(TurnEvent::CombatStalled { .. })) {
            break;
        }
    }

    let mut text = String::from("initiative:\n");
    let mut initiative = Vec::new();
    for (rank, id) in record.order().iter().enumerate() {
        if let Some(combatant) = view.get(*id) {
            text.push_str(&format!(
                "  {:>2}. {} {} ({})\n",
                rank + 1,
                combatant.name,
                combatant.id,
                combatant.initiative
            ));
            initiative.push(json!({
                "id": combatant.id,
                "name": combatant.name,
                "initiative": combatant.initiative,
            }));
        }
    }
    for event in &events {
        text.push_str(&describe(event, view));
        text.push('\n');
    }

    Report {
        text,
        json: json!({
            "initiative": initiative,
            "events": events,
            "record": record,
        }),
    }
}

fn describe(event: &TurnEvent, view: &CombatantView) -> String {
    let name = |id: CombatantId| {
        view.get(id)
            .map_or_else(|| id.to_string(), |combatant| combatant.name.clone())
    };
    match event {
        TurnEvent::CombatStarted { order } => {
            format!("combat starts with {} combatants", order.len())
        }
        TurnEvent::RoundStarted { round } => format!("round {round} begins"),
        TurnEvent::TurnStarted { round, combatant } => {
            format!("  [{round}] {} takes the turn", name(*combatant))
        }
        TurnEvent::CombatStalled { round } => {
            format!("nobody is left standing in round {round}")
        }
        TurnEvent::CombatantJoined { combatant } => format!("{} joins", name(*combatant)),
        TurnEvent::ActionRecorded { action, actor } => {
            format!("  {} takes action {}", name(*actor), action.get())
        }
        TurnEvent::ActionRejected { action, reason } => {
            format!("  action {} rejected: {reason}", action.get())
        }
    }
}

fn find_combatant(view: &CombatantView, id: u32) -> Result<&CombatantSnapshot> {
    let id = CombatantId::new(id);
    view.get(id)
        .with_context(|| format!("combatant {id} is not part of the scenario"))
}
