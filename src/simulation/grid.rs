//! Grid geometry, the ping-pong buffer pair and random seeding

use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::error::{LifeError, LifeResult};

/// Largest accepted grid side, in cells
pub const MAX_GRID_DIMENSION: u32 = 4096;

/// Bytes per cell in every cell buffer (one `u32`, 0 = dead, 1 = alive)
pub const CELL_SIZE: u64 = std::mem::size_of::<u32>() as u64;

pub const DEAD: u32 = 0;
pub const ALIVE: u32 = 1;

/// Validated grid extent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridDimensions {
    width: u32,
    height: u32,
}

impl GridDimensions {
    /// Rejects zero-sized or oversized grids before anything is allocated
    pub fn new(width: u32, height: u32) -> LifeResult<Self> {
        let valid = |side: u32| (1..=MAX_GRID_DIMENSION).contains(&side);
        if !valid(width) || !valid(height) {
            return Err(LifeError::InvalidGridSize {
                width,
                height,
                max: MAX_GRID_DIMENSION,
            });
        }
        Ok(Self { width, height })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// N = W * H
    pub fn cell_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Size of one cell buffer in bytes
    pub fn byte_size(&self) -> u64 {
        self.cell_count() as u64 * CELL_SIZE
    }

    /// Row-major index of an in-range cell
    pub fn index(&self, x: u32, y: u32) -> usize {
        debug_assert!(x < self.width && y < self.height, "cell ({x}, {y}) out of range");
        y as usize * self.width as usize + x as usize
    }

    /// Index of a cell offset by (dx, dy), wrapped onto the torus
    pub fn wrapped_index(&self, x: u32, y: u32, dx: i32, dy: i32) -> usize {
        let wx = (x as i64 + dx as i64).rem_euclid(self.width as i64) as u32;
        let wy = (y as i64 + dy as i64).rem_euclid(self.height as i64) as u32;
        self.index(wx, wy)
    }
}

/// Two equally sized buffers with explicit active/standby roles
///
/// The active buffer holds the latest completed generation. A step reads the
/// active buffer and writes the standby one, then [`PingPong::advance`] swaps
/// the roles. Both sides are owned values, so they can never alias.
#[derive(Debug)]
pub struct PingPong<T> {
    active: T,
    standby: T,
}

impl<T> PingPong<T> {
    pub fn new(active: T, standby: T) -> Self {
        Self { active, standby }
    }

    pub fn active(&self) -> &T {
        &self.active
    }

    pub fn standby(&self) -> &T {
        &self.standby
    }

    /// Read handle on the active side, write handle on the standby side
    pub fn split_mut(&mut self) -> (&T, &mut T) {
        (&self.active, &mut self.standby)
    }

    /// Swap roles after a step and return the new active buffer
    pub fn advance(&mut self) -> &T {
        std::mem::swap(&mut self.active, &mut self.standby);
        &self.active
    }

    pub fn into_inner(self) -> (T, T) {
        (self.active, self.standby)
    }
}

/// Dimensions plus the two cell buffers sized for them
#[derive(Debug)]
pub struct GridState<C> {
    dims: GridDimensions,
    cells: PingPong<C>,
}

impl<C> GridState<C> {
    pub fn new(dims: GridDimensions, cells: PingPong<C>) -> Self {
        Self { dims, cells }
    }

    pub fn dims(&self) -> GridDimensions {
        self.dims
    }

    pub fn cells(&self) -> &PingPong<C> {
        &self.cells
    }

    pub fn cells_mut(&mut self) -> &mut PingPong<C> {
        &mut self.cells
    }

    pub fn into_cells(self) -> PingPong<C> {
        self.cells
    }
}

/// Bernoulli fill for freshly allocated grids
pub struct CellSeeder {
    alive_probability: f64,
    rng: StdRng,
}

impl CellSeeder {
    /// `seed` makes reseeding reproducible; `None` draws from the OS
    pub fn new(alive_probability: f64, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self {
            alive_probability: alive_probability.clamp(0.0, 1.0),
            rng,
        }
    }

    pub fn alive_probability(&self) -> f64 {
        self.alive_probability
    }

    pub fn fill(&mut self, dims: GridDimensions) -> Vec<u32> {
        (0..dims.cell_count())
            .map(|_| {
                if self.rng.random_bool(self.alive_probability) {
                    ALIVE
                } else {
                    DEAD
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dimensions_reject_zero_and_oversized() {
        assert!(GridDimensions::new(0, 4).is_err());
        assert!(GridDimensions::new(4, 0).is_err());
        assert!(GridDimensions::new(MAX_GRID_DIMENSION + 1, 4).is_err());
        assert!(GridDimensions::new(1, 1).is_ok());
    }

    #[test]
    fn test_byte_size_matches_cell_count() {
        let dims = GridDimensions::new(7, 3).unwrap();
        assert_eq!(dims.cell_count(), 21);
        assert_eq!(dims.byte_size(), 84);
    }

    #[test]
    fn test_wrapped_index() {
        let dims = GridDimensions::new(4, 3).unwrap();
        assert_eq!(dims.wrapped_index(0, 0, -1, 0), dims.index(3, 0));
        assert_eq!(dims.wrapped_index(0, 0, 0, -1), dims.index(0, 2));
        assert_eq!(dims.wrapped_index(3, 2, 1, 1), dims.index(0, 0));
    }

    #[test]
    fn test_ping_pong_advance_swaps_roles() {
        let mut pair = PingPong::new("a", "b");
        assert_eq!(*pair.active(), "a");
        assert_eq!(*pair.advance(), "b");
        assert_eq!(*pair.standby(), "a");
        assert_eq!(*pair.advance(), "a");
    }

    #[test]
    fn test_seeder_is_reproducible() {
        let dims = GridDimensions::new(32, 32).unwrap();
        let first = CellSeeder::new(0.4, Some(11)).fill(dims);
        let second = CellSeeder::new(0.4, Some(11)).fill(dims);
        assert_eq!(first, second);
        assert_eq!(first.len(), 1024);

        let alive = first.iter().filter(|&&c| c == ALIVE).count();
        assert!(alive > 250 && alive < 570, "{alive} alive out of 1024");
    }

    #[test]
    fn test_seeder_extremes() {
        let dims = GridDimensions::new(8, 8).unwrap();
        assert!(CellSeeder::new(0.0, Some(1)).fill(dims).iter().all(|&c| c == DEAD));
        assert!(CellSeeder::new(1.0, Some(1)).fill(dims).iter().all(|&c| c == ALIVE));
    }
}
