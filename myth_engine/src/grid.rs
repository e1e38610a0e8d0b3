//! Grid geometry: positions, sizes and a fixed-size row-major grid.

use std::fmt::Display;
use std::ops::Add;

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// A cell coordinate. `y` grows downward.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Pos {
    pub x: i32,
    pub y: i32,
}
impl Pos {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}
impl From<(i32, i32)> for Pos {
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}
impl Add for Pos {
    type Output = Pos;

    fn add(self, rhs: Pos) -> Pos {
        Pos::new(self.x + rhs.x, self.y + rhs.y)
    }
}
impl Display for Pos {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Grid dimensions in cells.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}
impl Size {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}
impl Display for Size {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Fixed-size 2D grid stored row by row.
///
/// The size is set at construction and never changes afterwards. Deserializing checks that
/// the cell count matches the size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "GridData<T>")]
pub struct Grid<T> {
    size: Size,
    cells: Vec<T>,
}

#[derive(Deserialize)]
struct GridData<T> {
    size: Size,
    cells: Vec<T>,
}

impl<T> TryFrom<GridData<T>> for Grid<T> {
    type Error = String;

    fn try_from(data: GridData<T>) -> Result<Self, Self::Error> {
        let expected = data.size.width as usize * data.size.height as usize;
        if data.cells.len() != expected {
            return Err(format!(
                "a {} grid needs {expected} cells, found {}",
                data.size,
                data.cells.len()
            ));
        }
        Ok(Self {
            size: data.size,
            cells: data.cells,
        })
    }
}
impl<T: Clone> Grid<T> {
    /// Create a grid with every cell set to `fill`.
    pub fn new(size: Size, fill: T) -> Self {
        Self {
            size,
            cells: vec![fill; size.width as usize * size.height as usize],
        }
    }
}
impl<T> Grid<T> {
    pub fn size(&self) -> Size {
        self.size
    }

    /// True if `pos` lies inside the grid.
    pub fn contains(&self, pos: Pos) -> bool {
        self.index(pos).is_some()
    }

    pub fn cell(&self, pos: Pos) -> Option<&T> {
        self.index(pos).and_then(|idx| self.cells.get(idx))
    }

    pub fn cell_mut(&mut self, pos: Pos) -> Option<&mut T> {
        self.index(pos).and_then(|idx| self.cells.get_mut(idx))
    }

    /// Replace the cell at `pos`.
    ///
    /// # Errors
    /// - `OutOfBounds` if `pos` is not on the grid
    pub fn set_cell(&mut self, pos: Pos, value: T) -> EngineResult<()> {
        let size = self.size;
        let cell = self.cell_mut(pos).ok_or(EngineError::OutOfBounds { pos, size })?;
        *cell = value;
        Ok(())
    }

    /// Iterate `(pos, cell)` pairs row by row, left to right.
    pub fn iter(&self) -> impl Iterator<Item = (Pos, &T)> {
        let width = self.size.width as usize;
        self.cells.iter().enumerate().map(move |(idx, cell)| {
            #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
            let pos = Pos::new((idx % width) as i32, (idx / width) as i32);
            (pos, cell)
        })
    }

    fn index(&self, pos: Pos) -> Option<usize> {
        let x = u32::try_from(pos.x).ok()?;
        let y = u32::try_from(pos.y).ok()?;
        if x >= self.size.width || y >= self.size.height {
            return None;
        }
        Some(y as usize * self.size.width as usize + x as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_grid_is_filled() {
        let grid = Grid::new(Size::new(3, 2), 7);
        assert_eq!(grid.iter().count(), 6);
        assert!(grid.iter().all(|(_, v)| *v == 7));
    }

    #[test]
    fn iter_is_row_major() {
        let mut grid = Grid::new(Size::new(2, 2), String::new());
        for (pos, label) in [((0, 0), "a"), ((1, 0), "b"), ((0, 1), "c"), ((1, 1), "d")] {
            grid.set_cell(pos.into(), label.to_string()).unwrap();
        }
        let order: Vec<_> = grid.iter().map(|(pos, v)| (pos, v.as_str())).collect();
        assert_eq!(
            order,
            vec![
                (Pos::new(0, 0), "a"),
                (Pos::new(1, 0), "b"),
                (Pos::new(0, 1), "c"),
                (Pos::new(1, 1), "d"),
            ]
        );
    }

    #[test]
    fn out_of_bounds_access_is_rejected() {
        let mut grid = Grid::new(Size::new(5, 5), 0);
        assert!(grid.cell(Pos::new(5, 0)).is_none());
        assert!(grid.cell(Pos::new(0, -1)).is_none());
        assert!(!grid.contains(Pos::new(-1, 2)));
        let err = grid.set_cell(Pos::new(2, 5), 1).unwrap_err();
        assert!(matches!(err, EngineError::OutOfBounds { pos, .. } if pos == Pos::new(2, 5)));
    }

    #[test]
    fn grid_with_wrong_cell_count_does_not_deserialize() {
        let grid: Grid<u8> = serde_json::from_str(r#"{"size":{"width":2,"height":2},"cells":[1,2,3,4]}"#).unwrap();
        assert_eq!(grid.cell(Pos::new(1, 1)), Some(&4));

        let err = serde_json::from_str::<Grid<u8>>(r#"{"size":{"width":2,"height":2},"cells":[]}"#).unwrap_err();
        assert!(err.to_string().contains("needs 4 cells, found 0"));
    }

    #[test]
    fn positions_add_componentwise() {
        assert_eq!(Pos::new(2, 2) + Pos::new(0, -1), Pos::new(2, 1));
    }
}
