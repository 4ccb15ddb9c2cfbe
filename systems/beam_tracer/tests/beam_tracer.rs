use mirror_maze_core::{
    Cell, Command, Direction, LevelDefinition, MirrorOrientation, Position, SimulationResult,
    TraceFailure,
};
use mirror_maze_system_beam_tracer::{trace, BeamPhase, BeamTracer};
use mirror_maze_world::{self as world, query, Grid, Level, World};

fn corridor() -> LevelDefinition {
    LevelDefinition {
        name: "Corridor".to_owned(),
        emitter_direction: Direction::Right,
        max_mirrors: 2,
        rows: [".....", "..#..", "E...T", "..#..", "....."]
            .iter()
            .map(|row| (*row).to_owned())
            .collect(),
    }
}

fn corridor_level() -> Level {
    Level::from_definition(&corridor()).expect("corridor level is valid")
}

fn mirror(orientation: MirrorOrientation) -> Cell {
    Cell::Mirror { orientation }
}

fn opposite(direction: Direction) -> Direction {
    match direction {
        Direction::Up => Direction::Down,
        Direction::Down => Direction::Up,
        Direction::Left => Direction::Right,
        Direction::Right => Direction::Left,
    }
}

#[test]
fn straight_corridor_reaches_target() {
    let level = corridor_level();
    let emitter = level.emitter();

    let (result, illumination) =
        trace(level.grid().view(), emitter.position, emitter.direction).into_parts();

    assert_eq!(
        result,
        SimulationResult::Success {
            path: vec![
                Position::new(1, 2),
                Position::new(2, 2),
                Position::new(3, 2),
                Position::new(4, 2),
            ],
        }
    );
    for x in 1..=4 {
        assert_eq!(
            illumination.directions(Position::new(x, 2)),
            &[Direction::Right]
        );
    }
    assert!(!illumination.is_lit(Position::new(0, 2)), "emitter is never lit");
}

#[test]
fn forward_mirror_beside_emitter_sends_beam_out_of_top_edge() {
    let level = corridor_level();
    let emitter = level.emitter();
    let grid = level
        .grid()
        .place_mirror(Position::new(1, 2), MirrorOrientation::Forward)
        .expect("cell (1, 2) is empty");

    let trace = trace(grid.view(), emitter.position, emitter.direction);

    assert_eq!(
        trace.result(),
        &SimulationResult::Failure(TraceFailure::OutOfBounds)
    );
    assert_eq!(trace.phase(), BeamPhase::Exited);
    let illumination = trace.illumination();
    assert_eq!(illumination.directions(Position::new(1, 2)), &[Direction::Right]);
    assert_eq!(illumination.directions(Position::new(1, 1)), &[Direction::Up]);
    assert_eq!(illumination.directions(Position::new(1, 0)), &[Direction::Up]);
    assert!(!illumination.is_lit(Position::new(4, 2)));
}

#[test]
fn forward_mirror_between_walls_deflects_into_wall() {
    let level = corridor_level();
    let emitter = level.emitter();
    let grid = level
        .grid()
        .place_mirror(Position::new(2, 2), MirrorOrientation::Forward)
        .expect("cell (2, 2) is empty");

    let trace = trace(grid.view(), emitter.position, emitter.direction);

    assert_eq!(
        trace.result(),
        &SimulationResult::Failure(TraceFailure::HitWall)
    );
    assert_eq!(trace.phase(), BeamPhase::Absorbed);
    assert_eq!(
        trace.illumination().directions(Position::new(2, 2)),
        &[Direction::Right]
    );
    assert!(!trace.illumination().is_lit(Position::new(2, 1)));
}

#[test]
fn reflection_matches_lookup_table() {
    let table = [
        (MirrorOrientation::Forward, Direction::Up, Direction::Right),
        (MirrorOrientation::Forward, Direction::Down, Direction::Left),
        (MirrorOrientation::Forward, Direction::Left, Direction::Down),
        (MirrorOrientation::Forward, Direction::Right, Direction::Up),
        (MirrorOrientation::Backward, Direction::Up, Direction::Left),
        (MirrorOrientation::Backward, Direction::Down, Direction::Right),
        (MirrorOrientation::Backward, Direction::Left, Direction::Up),
        (MirrorOrientation::Backward, Direction::Right, Direction::Down),
    ];

    let center = Position::new(1, 1);
    for (orientation, incoming, outgoing) in table {
        assert_eq!(orientation.reflect(incoming), outgoing);

        let grid = Grid::builder(3, 0)
            .cell(center, mirror(orientation))
            .build();
        let emitter = center
            .step(opposite(incoming))
            .expect("neighbour of the centre cell");
        let trace = trace(grid.view(), emitter, incoming);

        let exit_cell = center.step(outgoing).expect("neighbour of the centre cell");
        assert_eq!(
            trace.illumination().directions(exit_cell),
            &[outgoing],
            "{orientation:?} mirror hit while travelling {incoming:?}"
        );
        assert_eq!(
            trace.result(),
            &SimulationResult::Failure(TraceFailure::OutOfBounds)
        );
    }
}

#[test]
fn wall_in_front_of_target_absorbs_beam() {
    let definition = LevelDefinition {
        rows: ["....", "E.#T", "....", "...."]
            .iter()
            .map(|row| (*row).to_owned())
            .collect(),
        ..corridor()
    };
    let level = Level::from_definition(&definition).expect("valid level");
    let emitter = level.emitter();

    let trace = trace(level.grid().view(), emitter.position, emitter.direction);

    assert_eq!(
        trace.result(),
        &SimulationResult::Failure(TraceFailure::HitWall)
    );
    assert!(!trace.illumination().is_lit(level.target()));
}

#[test]
fn closed_mirror_cycle_is_detected_as_loop() {
    let grid = Grid::builder(2, 0)
        .cell(Position::new(0, 0), mirror(MirrorOrientation::Forward))
        .cell(Position::new(1, 0), mirror(MirrorOrientation::Backward))
        .cell(Position::new(1, 1), mirror(MirrorOrientation::Forward))
        .cell(Position::new(0, 1), mirror(MirrorOrientation::Backward))
        .build();

    let trace = trace(grid.view(), Position::new(0, 0), Direction::Right);

    assert_eq!(
        trace.result(),
        &SimulationResult::Failure(TraceFailure::Looped)
    );
    assert_eq!(trace.phase(), BeamPhase::Looped);
    assert!(trace.transitions() <= 16);
    assert_eq!(trace.transitions(), 4);
}

#[test]
fn fixed_mirrors_route_beam_to_target() {
    // The beam leaves the emitter downwards and is steered around the wall.
    let definition = LevelDefinition {
        emitter_direction: Direction::Down,
        rows: ["E#T", "...", "\\./"]
            .iter()
            .map(|row| (*row).to_owned())
            .collect(),
        ..corridor()
    };
    let level = Level::from_definition(&definition).expect("valid level");
    let emitter = level.emitter();

    let routed = trace(level.grid().view(), emitter.position, emitter.direction);
    assert_eq!(
        routed.result(),
        &SimulationResult::Success {
            path: vec![
                Position::new(0, 1),
                Position::new(0, 2),
                Position::new(1, 2),
                Position::new(2, 2),
                Position::new(2, 1),
                Position::new(2, 0),
            ],
        }
    );
    assert_eq!(routed.phase(), BeamPhase::Reached);

    let blocked = level
        .grid()
        .place_mirror(Position::new(2, 1), MirrorOrientation::Forward)
        .expect("cell (2, 1) is empty");
    let diverted = trace(blocked.view(), emitter.position, emitter.direction);
    assert_eq!(diverted.phase(), BeamPhase::Exited);

    let blocked = level
        .grid()
        .place_mirror(Position::new(1, 2), MirrorOrientation::Backward)
        .expect("cell (1, 2) is empty");
    let diverted = trace(blocked.view(), emitter.position, emitter.direction);
    assert_eq!(diverted.phase(), BeamPhase::Exited);
    assert!(!diverted.illumination().is_lit(Position::new(2, 2)));
}

#[test]
fn tracing_does_not_mutate_grid() {
    let level = corridor_level();
    let before = level.grid().clone();
    let emitter = level.emitter();

    let _ = trace(level.grid().view(), emitter.position, emitter.direction);

    assert_eq!(level.grid(), &before);
}

#[test]
fn tracer_system_follows_world_mutations() {
    let mut world = World::new();
    let mut tracer = BeamTracer::new();
    let mut events = Vec::new();

    assert!(tracer
        .handle(&events, query::grid_view(&world), query::emitter(&world))
        .is_none());

    world::apply(
        &mut world,
        Command::LoadLevel {
            definition: corridor(),
        },
        &mut events,
    );
    let first = tracer
        .handle(&events, query::grid_view(&world), query::emitter(&world))
        .expect("level loaded")
        .clone();
    assert!(first.result().is_success());

    events.clear();
    world::apply(
        &mut world,
        Command::PlaceMirror {
            position: Position::new(1, 2),
            orientation: MirrorOrientation::Forward,
        },
        &mut events,
    );
    let second = tracer
        .handle(&events, query::grid_view(&world), query::emitter(&world))
        .expect("level loaded");
    assert_eq!(second.result().failure(), Some(TraceFailure::OutOfBounds));

    events.clear();
    world::apply(&mut world, Command::ResetLevel, &mut events);
    let third = tracer
        .handle(&events, query::grid_view(&world), query::emitter(&world))
        .expect("level loaded");
    assert_eq!(third, &first);
}

#[test]
fn tracer_system_keeps_cached_trace_without_grid_changes() {
    let mut world = World::new();
    let mut tracer = BeamTracer::new();
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::LoadLevel {
            definition: corridor(),
        },
        &mut events,
    );
    let loaded = tracer
        .handle(&events, query::grid_view(&world), query::emitter(&world))
        .cloned();

    events.clear();
    world::apply(
        &mut world,
        Command::RemoveMirror {
            position: Position::new(1, 1),
        },
        &mut events,
    );
    let after_rejection = tracer
        .handle(&events, query::grid_view(&world), query::emitter(&world))
        .cloned();

    assert_eq!(loaded, after_rejection);
    assert_eq!(tracer.latest().cloned(), loaded);
}
