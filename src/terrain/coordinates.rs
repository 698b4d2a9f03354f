use serde::{Deserialize, Serialize};

/// Grid coordinates (unsigned integers, origin at the top-left, y grows south)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridCoord {
    pub x: u32,
    pub y: u32,
}

/// Cardinal directions in connection-signature order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    North,
    East,
    South,
    West,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    /// Slot of this direction in an (N, E, S, W) signature
    pub fn index(self) -> usize {
        match self {
            Direction::North => 0,
            Direction::East => 1,
            Direction::South => 2,
            Direction::West => 3,
        }
    }

    pub fn from_index(index: usize) -> Self {
        Self::ALL[index % 4]
    }

    pub fn opposite(self) -> Self {
        Self::from_index(self.index() + 2)
    }

    pub fn offset(self) -> (i64, i64) {
        match self {
            Direction::North => (0, -1),
            Direction::East => (1, 0),
            Direction::South => (0, 1),
            Direction::West => (-1, 0),
        }
    }

    /// Whether two directions are 90° apart
    pub fn is_adjacent_to(self, other: Direction) -> bool {
        let diff = (self.index() + 4 - other.index()) % 4;
        diff == 1 || diff == 3
    }
}

impl GridCoord {
    pub fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// Build from signed coordinates, rejecting anything outside a `width`x`height` grid
    pub fn checked(x: i64, y: i64, width: u32, height: u32) -> Option<Self> {
        if x >= 0 && y >= 0 && x < width as i64 && y < height as i64 {
            Some(Self::new(x as u32, y as u32))
        } else {
            None
        }
    }

    /// Build from signed coordinates, clamping into the grid
    pub fn clamped(x: i64, y: i64, width: u32, height: u32) -> Self {
        Self::new(
            x.clamp(0, width as i64 - 1) as u32,
            y.clamp(0, height as i64 - 1) as u32,
        )
    }

    /// Packed row-major index
    pub fn index(&self, width: u32) -> usize {
        (self.y as usize) * (width as usize) + self.x as usize
    }

    pub fn from_index(index: usize, width: u32) -> Self {
        Self::new((index % width as usize) as u32, (index / width as usize) as u32)
    }

    pub fn neighbor(&self, direction: Direction, width: u32, height: u32) -> Option<Self> {
        let (dx, dy) = direction.offset();
        Self::checked(self.x as i64 + dx, self.y as i64 + dy, width, height)
    }

    /// In-bounds 4-neighbours paired with the direction they lie in
    pub fn neighbors(&self, width: u32, height: u32) -> impl Iterator<Item = (Direction, GridCoord)> + '_ {
        Direction::ALL
            .into_iter()
            .filter_map(move |dir| self.neighbor(dir, width, height).map(|c| (dir, c)))
    }

    /// Direction of `other` if it is an orthogonal neighbour
    pub fn direction_to(&self, other: &GridCoord) -> Option<Direction> {
        let dx = other.x as i64 - self.x as i64;
        let dy = other.y as i64 - self.y as i64;
        Direction::ALL.into_iter().find(|dir| dir.offset() == (dx, dy))
    }

    pub fn distance(&self, other: &GridCoord) -> f64 {
        let dx = self.x as f64 - other.x as f64;
        let dy = self.y as f64 - other.y as f64;
        (dx * dx + dy * dy).sqrt()
    }

    pub fn manhattan(&self, other: &GridCoord) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }
}

/// Every cell on the outer ring of the grid, each listed once
pub fn perimeter_cells(width: u32, height: u32) -> Vec<GridCoord> {
    let mut cells = Vec::new();
    for y in 0..height {
        for x in 0..width {
            if x == 0 || y == 0 || x == width - 1 || y == height - 1 {
                cells.push(GridCoord::new(x, y));
            }
        }
    }
    cells
}
