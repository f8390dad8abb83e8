use battle_grid_core::{
    CellCoord, CombatantId, CombatantSnapshot, CombatantView, LightAnchor, LightLevel,
    LightSource, LightSourceId, MapTheme, MovementBudget, Senses, Team, TerrainKind, Tile,
};
use battle_grid_system_visibility::{
    can_see, compute_light_field, perceive, resolve_light_position, visible_cells, LightField,
    Perception,
};
use battle_grid_world::{layout::parse_layout, Grid};

fn dark_room(width: u32, height: u32) -> Grid {
    Grid::new(width, height, MapTheme::Dungeon).expect("grid")
}

fn point_light(id: u32, cell: CellCoord, bright_radius: u32, dim_radius: u32) -> LightSource {
    LightSource {
        id: LightSourceId::new(id),
        bright_radius,
        dim_radius,
        anchor: LightAnchor::Point(cell),
        created_round: 1,
        expires_at_round: None,
    }
}

fn observer(position: CellCoord, senses: Senses) -> CombatantSnapshot {
    CombatantSnapshot {
        id: CombatantId::new(1),
        name: "watcher".to_owned(),
        position,
        movement: MovementBudget::new(30),
        senses,
        hit_points: 10,
        team: Team::Player,
        initiative: 10,
        initiative_modifier: 0,
    }
}

fn darkness_field(grid: &Grid) -> LightField {
    compute_light_field(
        grid,
        LightLevel::Darkness,
        &[],
        &CombatantView::default(),
        1,
    )
}

#[test]
fn field_without_sources_is_ambient() {
    let grid = dark_room(10, 10);
    let field = darkness_field(&grid);
    assert!(field.iter().all(|(_, level)| level == LightLevel::Darkness));

    let desert = compute_light_field(
        &grid,
        MapTheme::Desert.ambient_light(),
        &[],
        &CombatantView::default(),
        1,
    );
    assert_eq!(
        desert.level_at(CellCoord::new(9, 9)),
        Some(LightLevel::Bright)
    );
}

#[test]
fn single_source_lights_bright_then_dim_rings() {
    let grid = dark_room(10, 10);
    let source = point_light(1, CellCoord::new(5, 5), 5, 5);
    let field = compute_light_field(
        &grid,
        LightLevel::Darkness,
        &[source],
        &CombatantView::default(),
        1,
    );

    assert_eq!(field.level_at(CellCoord::new(5, 5)), Some(LightLevel::Bright));
    assert_eq!(field.level_at(CellCoord::new(6, 6)), Some(LightLevel::Bright));
    assert_eq!(field.level_at(CellCoord::new(7, 7)), Some(LightLevel::Dim));
    assert_eq!(
        field.level_at(CellCoord::new(8, 8)),
        Some(LightLevel::Darkness)
    );
}

#[test]
fn larger_source_matches_length_unit_radii() {
    let grid = dark_room(20, 20);
    let source = point_light(1, CellCoord::new(10, 10), 10, 10);
    let field = compute_light_field(
        &grid,
        LightLevel::Darkness,
        &[source],
        &CombatantView::default(),
        1,
    );

    assert_eq!(field.level_at(CellCoord::new(12, 10)), Some(LightLevel::Bright));
    assert_eq!(field.level_at(CellCoord::new(13, 10)), Some(LightLevel::Dim));
    assert_eq!(field.level_at(CellCoord::new(14, 10)), Some(LightLevel::Dim));
    assert_eq!(
        field.level_at(CellCoord::new(15, 10)),
        Some(LightLevel::Darkness)
    );
}

#[test]
fn walls_cast_shadows() {
    let mut grid = dark_room(10, 10);
    let _ = grid
        .replace_tile(Tile::new(CellCoord::new(2, 2), TerrainKind::Wall))
        .expect("in bounds");
    let source = point_light(1, CellCoord::new(1, 2), 10, 0);
    let field = compute_light_field(
        &grid,
        LightLevel::Darkness,
        &[source],
        &CombatantView::default(),
        1,
    );

    assert_eq!(field.level_at(CellCoord::new(2, 2)), Some(LightLevel::Bright));
    assert_eq!(
        field.level_at(CellCoord::new(3, 2)),
        Some(LightLevel::Darkness)
    );
    assert_eq!(field.level_at(CellCoord::new(3, 3)), Some(LightLevel::Bright));
}

#[test]
fn overlapping_sources_never_dim_a_cell() {
    let grid = dark_room(12, 3);
    let sources = [
        point_light(1, CellCoord::new(2, 1), 10, 10),
        point_light(2, CellCoord::new(6, 1), 0, 10),
    ];
    let field = compute_light_field(
        &grid,
        LightLevel::Darkness,
        &sources,
        &CombatantView::default(),
        1,
    );

    assert_eq!(field.level_at(CellCoord::new(4, 1)), Some(LightLevel::Bright));
    assert_eq!(field.level_at(CellCoord::new(8, 1)), Some(LightLevel::Dim));
    assert_eq!(
        field.level_at(CellCoord::new(9, 1)),
        Some(LightLevel::Darkness)
    );
}

#[test]
fn carried_light_follows_its_bearer_and_orphans_are_skipped() {
    let grid = dark_room(10, 10);
    let bearer = observer(CellCoord::new(7, 2), Senses::default());
    let view = CombatantView::from_snapshots(vec![bearer]);
    let torch = LightSource {
        anchor: LightAnchor::Combatant(CombatantId::new(1)),
        ..point_light(1, CellCoord::new(0, 0), 5, 0)
    };
    let orphan = LightSource {
        anchor: LightAnchor::Combatant(CombatantId::new(99)),
        ..point_light(2, CellCoord::new(0, 0), 50, 0)
    };

    assert_eq!(
        resolve_light_position(&torch, &view),
        Some(CellCoord::new(7, 2))
    );
    assert_eq!(resolve_light_position(&orphan, &view), None);

    let field = compute_light_field(&grid, LightLevel::Darkness, &[torch, orphan], &view, 1);
    assert_eq!(field.level_at(CellCoord::new(7, 2)), Some(LightLevel::Bright));
    assert_eq!(
        field.level_at(CellCoord::new(0, 0)),
        Some(LightLevel::Darkness)
    );
}

#[test]
fn expired_and_off_grid_sources_shed_no_light() {
    let grid = dark_room(6, 6);
    let expiring = LightSource {
        expires_at_round: Some(3),
        ..point_light(1, CellCoord::new(2, 2), 10, 0)
    };
    let outside = point_light(2, CellCoord::new(-4, -4), 50, 50);

    let lit = compute_light_field(
        &grid,
        LightLevel::Darkness,
        &[expiring, outside],
        &CombatantView::default(),
        2,
    );
    assert_eq!(lit.level_at(CellCoord::new(2, 2)), Some(LightLevel::Bright));
    assert_eq!(lit.level_at(CellCoord::new(0, 0)), Some(LightLevel::Bright));
    assert_eq!(lit.level_at(CellCoord::new(5, 5)), Some(LightLevel::Darkness));

    let expired = compute_light_field(
        &grid,
        LightLevel::Darkness,
        &[expiring, outside],
        &CombatantView::default(),
        3,
    );
    assert!(expired
        .iter()
        .all(|(_, level)| level == LightLevel::Darkness));
}

#[test]
fn darkvision_sees_darkness_as_dim_within_range() {
    let grid = dark_room(10, 10);
    let field = darkness_field(&grid);
    let watcher = observer(
        CellCoord::new(5, 5),
        Senses {
            darkvision: 15,
            ..Senses::default()
        },
    );
    let perception = perceive(&watcher, &grid, &field);

    assert_eq!(perception.len(), 100);
    assert_eq!(
        perception.get(&CellCoord::new(5, 5)),
        Some(&Perception::Obscured)
    );
    assert_eq!(
        perception.get(&CellCoord::new(8, 5)),
        Some(&Perception::Obscured)
    );
    assert_eq!(
        perception.get(&CellCoord::new(9, 5)),
        Some(&Perception::Hidden)
    );
}

#[test]
fn no_special_senses_means_darkness_hides_everything() {
    let grid = dark_room(10, 10);
    let field = darkness_field(&grid);
    let watcher = observer(CellCoord::new(5, 5), Senses::default());

    assert!(visible_cells(&watcher, &grid, &field).is_empty());
    assert!(!can_see(&watcher, &grid, &field, CellCoord::new(6, 5)));
}

#[test]
fn lit_cells_are_visible_without_darkvision() {
    let grid = dark_room(10, 10);
    let source = point_light(1, CellCoord::new(5, 5), 30, 0);
    let field = compute_light_field(
        &grid,
        LightLevel::Darkness,
        &[source],
        &CombatantView::default(),
        1,
    );
    let watcher = observer(CellCoord::new(2, 2), Senses::default());

    assert!(can_see(&watcher, &grid, &field, CellCoord::new(5, 5)));
    assert_eq!(
        perceive(&watcher, &grid, &field).get(&CellCoord::new(5, 5)),
        Some(&Perception::Clear)
    );
}

#[test]
fn magical_darkness_yields_only_to_truesight() {
    let grid = dark_room(8, 1);
    let mut field = compute_light_field(
        &grid,
        LightLevel::Bright,
        &[],
        &CombatantView::default(),
        1,
    );
    field.apply_magical_darkness([CellCoord::new(3, 0), CellCoord::new(6, 0)]);

    let darkvision = observer(
        CellCoord::new(0, 0),
        Senses {
            darkvision: 120,
            ..Senses::default()
        },
    );
    assert!(!can_see(&darkvision, &grid, &field, CellCoord::new(3, 0)));
    assert!(can_see(&darkvision, &grid, &field, CellCoord::new(4, 0)));

    let truesight = observer(
        CellCoord::new(0, 0),
        Senses {
            truesight: 15,
            ..Senses::default()
        },
    );
    assert!(can_see(&truesight, &grid, &field, CellCoord::new(3, 0)));
    assert!(!can_see(&truesight, &grid, &field, CellCoord::new(6, 0)));
}

#[test]
fn truesight_also_pierces_ordinary_darkness() {
    let grid = dark_room(5, 5);
    let field = darkness_field(&grid);
    let seer = observer(
        CellCoord::new(0, 0),
        Senses {
            darkvision: 60,
            truesight: 10,
            ..Senses::default()
        },
    );
    let perception = perceive(&seer, &grid, &field);

    assert_eq!(
        perception.get(&CellCoord::new(2, 2)),
        Some(&Perception::Clear)
    );
    assert_eq!(
        perception.get(&CellCoord::new(3, 3)),
        Some(&Perception::Obscured)
    );
}

#[test]
fn walls_hide_what_lies_behind_them() {
    let grid = parse_layout(&[".....", "..#..", "....."], MapTheme::Desert).expect("layout");
    let field = compute_light_field(
        &grid,
        LightLevel::Bright,
        &[],
        &CombatantView::default(),
        1,
    );
    let watcher = observer(CellCoord::new(0, 1), Senses::default());
    let seen = visible_cells(&watcher, &grid, &field);

    assert!(seen.contains(&CellCoord::new(2, 1)));
    assert!(!seen.contains(&CellCoord::new(4, 1)));
    assert!(seen.contains(&CellCoord::new(4, 0)));
}

#[test]
fn observer_off_the_grid_sees_nothing() {
    let grid = dark_room(4, 4);
    let field = compute_light_field(
        &grid,
        LightLevel::Bright,
        &[],
        &CombatantView::default(),
        1,
    );
    let lost = observer(CellCoord::new(-1, -1), Senses::default());

    assert!(perceive(&lost, &grid, &field).is_empty());
    assert!(visible_cells(&lost, &grid, &field).is_empty());
    assert!(!can_see(&lost, &grid, &field, CellCoord::new(0, 0)));
}

#[test]
fn enormous_light_radius_only_touches_the_grid() {
    let grid = dark_room(10, 10);
    let sun = point_light(1, CellCoord::new(4, 4), u32::MAX - 10, 10);
    let field = compute_light_field(
        &grid,
        LightLevel::Darkness,
        &[sun],
        &CombatantView::default(),
        1,
    );

    assert!(field.iter().all(|(_, level)| level == LightLevel::Bright));
}
