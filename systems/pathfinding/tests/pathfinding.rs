use battle_grid_core::{
    CellCoord, CombatantId, CombatantSnapshot, MapTheme, MovementBudget, MovementCost, Senses,
    Team, TerrainKind, Tile,
};
use battle_grid_system_pathfinding::{
    find_path, find_route, path_cost, reachable_area, reachable_for, reachable_set,
};
use battle_grid_world::{layout::parse_layout, Grid};
use rand::Rng;
use rand_chacha::{rand_core::SeedableRng, ChaCha8Rng};

fn open_field(width: u32, height: u32) -> Grid {
    Grid::new(width, height, MapTheme::Dungeon).expect("grid")
}

#[test]
fn four_diagonal_steps_cost_thirty() {
    let grid = open_field(5, 5);
    let route = find_route(&grid, CellCoord::new(0, 0), CellCoord::new(4, 4)).expect("route");

    assert_eq!(route.cost(), 30);
    assert_eq!(route.cells().first(), Some(&CellCoord::new(0, 0)));
    assert_eq!(route.cells().last(), Some(&CellCoord::new(4, 4)));

    let straight_diagonal: Vec<_> = (0..5).map(|i| CellCoord::new(i, i)).collect();
    assert_eq!(path_cost(&grid, &straight_diagonal), Some(5 + 10 + 5 + 10));
}

#[test]
fn straight_route_costs_five_per_tile() {
    let grid = open_field(8, 3);
    let route = find_route(&grid, CellCoord::new(0, 1), CellCoord::new(5, 1)).expect("route");
    assert_eq!(route.cost(), 25);
    assert_eq!(route.cells().len(), 6);
}

#[test]
fn path_starts_at_the_start_tile_and_ends_at_the_goal() {
    let grid = open_field(6, 6);
    let path = find_path(&grid, CellCoord::new(1, 4), CellCoord::new(5, 0));

    assert_eq!(path.first().map(|tile| tile.cell()), Some(CellCoord::new(1, 4)));
    assert_eq!(path.last().map(|tile| tile.cell()), Some(CellCoord::new(5, 0)));
}

#[test]
fn walls_force_a_detour() {
    let grid = parse_layout(
        &[
            ".....", //
            "####.", //
            ".....",
        ],
        MapTheme::Dungeon,
    )
    .expect("layout");
    let route = find_route(&grid, CellCoord::new(0, 0), CellCoord::new(0, 2)).expect("route");

    assert!(route
        .cells()
        .iter()
        .all(|cell| grid.tile_at(*cell).is_some_and(Tile::is_passable)));
    assert!(route.cells().contains(&CellCoord::new(4, 1)));
    assert_eq!(path_cost(&grid, route.cells()), Some(route.cost()));
}

#[test]
fn enclosed_goal_is_unreachable() {
    let grid = parse_layout(&["..#.", "..#.", "..#."], MapTheme::Dungeon).expect("layout");
    assert!(find_route(&grid, CellCoord::new(0, 0), CellCoord::new(3, 1)).is_none());
    assert!(find_path(&grid, CellCoord::new(0, 0), CellCoord::new(3, 1)).is_empty());
}

#[test]
fn blocked_goal_is_never_a_path_member() {
    let grid = parse_layout(&["..P.."], MapTheme::Dungeon).expect("layout");
    assert!(find_path(&grid, CellCoord::new(0, 0), CellCoord::new(2, 0)).is_empty());
    assert!(find_path(&grid, CellCoord::new(0, 0), CellCoord::new(4, 0)).is_empty());
}

#[test]
fn difficult_terrain_doubles_the_step_entering_it() {
    let grid = parse_layout(&["..%.."], MapTheme::Swamp).expect("layout");
    let route = find_route(&grid, CellCoord::new(0, 0), CellCoord::new(4, 0)).expect("route");
    assert_eq!(route.cost(), 5 + 10 + 5 + 5);
}

#[test]
fn cheaper_detour_beats_a_costly_shortcut() {
    let mut grid = open_field(3, 3);
    let bog = Tile::new(CellCoord::new(1, 1), TerrainKind::Mud)
        .with_movement_cost(MovementCost::multiplied_by(4));
    let _ = grid.replace_tile(bog).expect("in bounds");
    let route = find_route(&grid, CellCoord::new(0, 1), CellCoord::new(2, 1)).expect("route");

    assert!(!route.cells().contains(&CellCoord::new(1, 1)));
    assert_eq!(route.cost(), 15);
}

#[test]
fn diagonal_parity_is_tracked_per_state() {
    // Three diagonals cost 5 + 10 + 5; a fourth would cost 10 again.
    let grid = open_field(4, 4);
    let three = find_route(&grid, CellCoord::new(0, 0), CellCoord::new(3, 3)).expect("route");
    assert_eq!(three.cost(), 20);

    let zigzag = [
        CellCoord::new(0, 0),
        CellCoord::new(1, 1),
        CellCoord::new(2, 1),
        CellCoord::new(3, 2),
    ];
    assert_eq!(path_cost(&grid, &zigzag), Some(5 + 5 + 10));
}

/// Only (1, 1) leads into the costly corner at (2, 2). Reaching (1, 1) by a
/// diagonal is cheaper but leaves the next diagonal at double cost.
fn parity_trap() -> Grid {
    let mut grid = parse_layout(&["..##", "..##", "##.#"], MapTheme::Dungeon).expect("layout");
    let _ = grid
        .replace_tile(
            Tile::new(CellCoord::new(2, 2), TerrainKind::Floor)
                .with_movement_cost(MovementCost::multiplied_by(3)),
        )
        .expect("in bounds");
    grid
}

#[test]
fn cheaper_arrival_with_the_wrong_parity_does_not_win() {
    let grid = parity_trap();
    let route = find_route(&grid, CellCoord::new(0, 0), CellCoord::new(2, 2)).expect("route");

    // Straight then diagonal: 5 + 5 + 5 * 3. Diagonal first would be 5 + 10 * 3.
    assert_eq!(route.cost(), 25);
    // Either orthogonal approach to (1, 1) works; both take four cells.
    assert_eq!(route.cells().len(), 4);
    assert_eq!(route.cells().get(2), Some(&CellCoord::new(1, 1)));
    assert_eq!(path_cost(&grid, route.cells()), Some(25));
}

#[test]
fn reachable_area_keeps_both_parities_of_a_cell() {
    let grid = parity_trap();
    let start = CellCoord::new(0, 0);

    let area = reachable_area(&grid, start, 25);
    assert_eq!(area.cost_to(CellCoord::new(1, 1)), Some(5));
    assert_eq!(area.cost_to(CellCoord::new(2, 2)), Some(25));

    assert!(!reachable_area(&grid, start, 24).contains(CellCoord::new(2, 2)));
}

#[test]
fn reachable_set_respects_the_budget() {
    let grid = open_field(9, 9);
    let centre = CellCoord::new(4, 4);

    let one_step = reachable_set(&grid, centre, 5);
    assert_eq!(one_step.len(), 9);

    let area = reachable_area(&grid, centre, 10);
    assert_eq!(area.cost_to(centre), Some(0));
    assert_eq!(area.cost_to(CellCoord::new(6, 4)), Some(10));
    // Two diagonals cost 5 + 10 and exceed the budget.
    assert!(!area.contains(CellCoord::new(6, 6)));
    assert!(area.contains(CellCoord::new(6, 5)));
    assert!(area.iter().all(|(_, cost)| cost <= 10));
}

#[test]
fn reachable_set_never_contains_blocking_tiles() {
    let grid = parse_layout(&[".#.", ".B.", "..."], MapTheme::Dungeon).expect("layout");
    let reachable = reachable_set(&grid, CellCoord::new(0, 0), 60);

    assert!(!reachable.contains(&CellCoord::new(1, 0)));
    assert!(!reachable.contains(&CellCoord::new(1, 1)));
    assert!(reachable.contains(&CellCoord::new(2, 0)));
    assert_eq!(reachable.len(), 7);
}

#[test]
fn reachable_for_uses_remaining_movement() {
    let grid = open_field(10, 1);
    let combatant = CombatantSnapshot {
        id: CombatantId::new(1),
        name: "scout".to_owned(),
        position: CellCoord::new(0, 0),
        movement: MovementBudget {
            total: 30,
            used: 15,
        },
        senses: Senses::default(),
        hit_points: 12,
        team: Team::Player,
        initiative: 14,
        initiative_modifier: 2,
    };

    let area = reachable_for(&grid, &combatant);
    assert_eq!(area.len(), 4);
    assert!(area.contains(CellCoord::new(3, 0)));
    assert!(!area.contains(CellCoord::new(4, 0)));
}

#[test]
fn route_costs_agree_with_reachable_costs_on_random_maps() {
    let mut rng = ChaCha8Rng::seed_from_u64(0x5eed_2024);

    for _ in 0..8 {
        let (width, height) = (12, 10);
        let mut tiles = Vec::new();
        for y in 0..height {
            for x in 0..width {
                let cell = CellCoord::new(x, y);
                let terrain = match rng.gen_range(0..100) {
                    _ if cell == CellCoord::new(0, 0) => TerrainKind::Floor,
                    0..=17 => TerrainKind::Wall,
                    18..=32 => TerrainKind::Mud,
                    _ => TerrainKind::Floor,
                };
                tiles.push(Tile::new(cell, terrain));
            }
        }
        let grid = Grid::from_tiles(12, 10, MapTheme::Cave, tiles).expect("grid");
        let start = CellCoord::new(0, 0);
        let area = reachable_area(&grid, start, u32::MAX);

        for goal in grid.cells() {
            let route = find_route(&grid, start, goal);
            assert_eq!(
                route.as_ref().map(|route| route.cost()),
                area.cost_to(goal),
                "cost mismatch for {goal}"
            );
            if let Some(route) = route {
                assert_eq!(path_cost(&grid, route.cells()), Some(route.cost()));
            }
        }
    }
}
