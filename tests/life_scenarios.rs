//! End-to-end runs through the CPU backend

use lifegrid::simulation::commands::SimCommand;
use lifegrid::simulation::cpu::{CpuBackend, CpuCells};
use lifegrid::simulation::grid::{GridDimensions, PingPong, ALIVE};
use lifegrid::simulation::brush::BrushState;
use lifegrid::simulation::{GridBackend, LifeSimulation};
use lifegrid::LifeConfig;

fn live_cells(dims: GridDimensions, cells: &[u32]) -> Vec<(u32, u32)> {
    let mut live = Vec::new();
    for y in 0..dims.height() {
        for x in 0..dims.width() {
            if cells[dims.index(x, y)] == ALIVE {
                live.push((x, y));
            }
        }
    }
    live
}

fn seeded(backend: &mut CpuBackend, dims: GridDimensions, live: &[(u32, u32)]) -> PingPong<CpuCells> {
    let mut seed = vec![0; dims.cell_count()];
    for &(x, y) in live {
        seed[dims.index(x, y)] = ALIVE;
    }
    backend.allocate(dims, &seed).unwrap()
}

fn step(backend: &mut CpuBackend, dims: GridDimensions, cells: &mut PingPong<CpuCells>) {
    backend.prepare(dims, &BrushState::default());
    backend.step(dims, cells);
    cells.advance();
}

#[test]
fn single_cell_dies() {
    let dims = GridDimensions::new(4, 4).unwrap();
    let mut backend = CpuBackend::new();
    let mut cells = seeded(&mut backend, dims, &[(1, 1)]);

    step(&mut backend, dims, &mut cells);
    assert!(live_cells(dims, cells.active().cells()).is_empty());
}

#[test]
fn blinker_oscillates() {
    let dims = GridDimensions::new(5, 5).unwrap();
    let horizontal = [(1, 2), (2, 2), (3, 2)];
    let vertical = [(2, 1), (2, 2), (2, 3)];

    let mut backend = CpuBackend::new();
    let mut cells = seeded(&mut backend, dims, &horizontal);

    step(&mut backend, dims, &mut cells);
    assert_eq!(live_cells(dims, cells.active().cells()), vertical);

    step(&mut backend, dims, &mut cells);
    assert_eq!(live_cells(dims, cells.active().cells()), horizontal);
}

#[test]
fn blinker_across_the_wrap_seam() {
    let dims = GridDimensions::new(6, 6).unwrap();
    let mut backend = CpuBackend::new();
    let mut cells = seeded(&mut backend, dims, &[(5, 0), (0, 0), (1, 0)]);

    step(&mut backend, dims, &mut cells);
    assert_eq!(live_cells(dims, cells.active().cells()), vec![(0, 0), (0, 1), (0, 5)]);
}

fn empty_simulation(backend: &mut CpuBackend, config: LifeConfig) -> LifeSimulation<CpuCells> {
    let config = config.with_alive_probability(0.0).with_seed(9);
    LifeSimulation::new(&config, backend).unwrap()
}

#[test]
fn lone_cell_on_3x3_dies_after_one_generation() {
    let mut backend = CpuBackend::new();
    let config = LifeConfig::default().with_grid_size(3, 3).with_brush_size(0);
    let mut sim = empty_simulation(&mut backend, config);
    let dims = sim.dims();

    // 3x3 at 4 px per cell is a 12x12 canvas; its centre is cell (1, 1)
    sim.push(SimCommand::PointerPressed { x: 6.0, y: 6.0 });
    assert_eq!(sim.tick(&mut backend, 16.0).steps, 1);
    assert_eq!(live_cells(dims, sim.grid().cells().active().cells()), vec![(1, 1)]);

    sim.push(SimCommand::PointerReleased);
    assert_eq!(sim.tick(&mut backend, 16.0).steps, 1);
    assert!(live_cells(dims, sim.grid().cells().active().cells()).is_empty());
    assert_eq!(sim.generation(), 2);
}

#[test]
fn painted_plus_becomes_a_ring() {
    let mut backend = CpuBackend::new();
    let config = LifeConfig::default().with_grid_size(8, 8).with_brush_size(1);
    let mut sim = empty_simulation(&mut backend, config);

    sim.push(SimCommand::CanvasResized { width: 80, height: 80 });
    // column 4, row 3 from the top, so cell (4, 4)
    sim.push(SimCommand::PointerPressed { x: 45.0, y: 35.0 });
    sim.tick(&mut backend, 16.0);

    let dims = sim.dims();
    let plus = live_cells(dims, sim.grid().cells().active().cells());
    assert_eq!(plus, vec![(4, 3), (3, 4), (4, 4), (5, 4), (4, 5)]);

    sim.push(SimCommand::PointerReleased);
    sim.tick(&mut backend, 16.0);

    let ring = live_cells(dims, sim.grid().cells().active().cells());
    assert_eq!(ring.len(), 8);
    assert!(!ring.contains(&(4, 4)));
    let frame = backend.last_frame().unwrap();
    assert_eq!(frame.visible().count(), 8);
}

#[test]
fn half_rate_runs_every_other_frame() {
    let mut backend = CpuBackend::new();
    let config = LifeConfig::default().with_grid_size(16, 16).with_rate_exponent(-1);
    let mut sim = LifeSimulation::new(&config.with_seed(4), &mut backend).unwrap();

    let steps: Vec<u32> = (0..10).map(|_| sim.tick(&mut backend, 16.0).steps).collect();
    assert_eq!(steps, vec![0, 1, 0, 1, 0, 1, 0, 1, 0, 1]);
    assert_eq!(sim.generation(), 5);

    // every step reads the buffer the previous one wrote
    let log = backend.step_log();
    assert_eq!(log.len(), 5);
    for pair in log.windows(2) {
        assert_eq!(pair[0].1, pair[1].0);
    }
}

#[test]
fn resize_reseeds_and_releases() {
    let mut backend = CpuBackend::new();
    let config = LifeConfig::default().with_grid_size(10, 10).with_rate_exponent(-4);
    let mut sim = LifeSimulation::new(&config.with_seed(2), &mut backend).unwrap();
    let old = (
        sim.grid().cells().active().id(),
        sim.grid().cells().standby().id(),
    );

    sim.push(SimCommand::ResizeRequested { width: 30, height: 7 });
    let report = sim.tick(&mut backend, 16.0);

    assert!(report.resized);
    assert_eq!(report.steps, 0);
    assert_eq!(sim.generation(), 0);
    assert_eq!(sim.grid().cells().active().cells().len(), 210);
    assert!(backend.is_released(old.0));
    assert!(backend.is_released(old.1));

    let frame = backend.last_frame().unwrap();
    assert_eq!(frame.quads.len(), 210);
    assert_eq!(frame.source, sim.grid().cells().active().id());
}

#[test]
fn oversized_resize_keeps_running() {
    let mut backend = CpuBackend::with_cell_limit(1_000);
    let config = LifeConfig::default().with_grid_size(20, 20);
    let mut sim = LifeSimulation::new(&config.with_seed(6), &mut backend).unwrap();

    sim.push(SimCommand::ResizeRequested { width: 100, height: 100 });
    let report = sim.tick(&mut backend, 16.0);

    assert!(!report.resized);
    assert_eq!(report.steps, 1);
    assert_eq!(sim.dims(), GridDimensions::new(20, 20).unwrap());
    assert!(sim.last_rejection().is_some());
}
