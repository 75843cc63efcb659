//! 2d drawing surface attached to canvas nodes.
//!
//! A character grid rather than pixels: the terminal host paints the rows
//! verbatim. [`Context2d`] is a shared handle, so the context passed to a
//! draw routine and the one read back by the painter are the same surface.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

const BLANK: char = ' ';

struct Grid {
    width: u16,
    height: u16,
    cells: Vec<char>,
}

impl Grid {
    fn offset(&self, x: u16, y: u16) -> Option<usize> {
        (x < self.width && y < self.height)
            .then(|| y as usize * self.width as usize + x as usize)
    }
}

/// Drawing context handle for a canvas node.
#[derive(Clone)]
pub struct Context2d {
    grid: Rc<RefCell<Grid>>,
}

impl Context2d {
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            grid: Rc::new(RefCell::new(Grid {
                width,
                height,
                cells: vec![BLANK; width as usize * height as usize],
            })),
        }
    }

    pub fn width(&self) -> u16 {
        self.grid.borrow().width
    }

    pub fn height(&self) -> u16 {
        self.grid.borrow().height
    }

    /// Reset every cell to blank.
    pub fn clear(&self) {
        self.grid.borrow_mut().cells.fill(BLANK);
    }

    /// Set one cell. Out of bounds writes are clipped.
    pub fn put(&self, x: u16, y: u16, ch: char) {
        let mut grid = self.grid.borrow_mut();
        if let Some(offset) = grid.offset(x, y) {
            grid.cells[offset] = ch;
        }
    }

    pub fn get(&self, x: u16, y: u16) -> Option<char> {
        let grid = self.grid.borrow();
        grid.offset(x, y).map(|offset| grid.cells[offset])
    }

    pub fn fill_rect(&self, x: u16, y: u16, width: u16, height: u16, ch: char) {
        for row in y..y.saturating_add(height) {
            for col in x..x.saturating_add(width) {
                self.put(col, row, ch);
            }
        }
    }

    /// Write a string left to right starting at (x, y), clipped at the edge.
    pub fn text(&self, x: u16, y: u16, text: &str) {
        for (i, ch) in text.chars().enumerate() {
            let Ok(i) = u16::try_from(i) else { break };
            self.put(x.saturating_add(i), y, ch);
        }
    }

    pub fn row(&self, y: u16) -> Option<String> {
        let grid = self.grid.borrow();
        if y >= grid.height {
            return None;
        }
        let start = y as usize * grid.width as usize;
        Some(grid.cells[start..start + grid.width as usize].iter().collect())
    }

    pub fn rows(&self) -> Vec<String> {
        (0..self.height()).filter_map(|y| self.row(y)).collect()
    }

    /// True when both handles point at the same surface.
    pub fn ptr_eq(&self, other: &Context2d) -> bool {
        Rc::ptr_eq(&self.grid, &other.grid)
    }
}

impl fmt::Debug for Context2d {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Context2d({}x{})", self.width(), self.height())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_and_clip() {
        let ctx = Context2d::new(3, 2);
        ctx.put(0, 0, '#');
        ctx.put(5, 5, '!');

        assert_eq!(ctx.get(0, 0), Some('#'));
        assert_eq!(ctx.get(5, 5), None);
        assert_eq!(ctx.rows(), vec!["#  ".to_string(), "   ".to_string()]);
    }

    #[test]
    fn test_text_and_fill() {
        let ctx = Context2d::new(5, 2);
        ctx.fill_rect(0, 1, 5, 1, '-');
        ctx.text(1, 0, "abcdef");

        assert_eq!(ctx.row(0).as_deref(), Some(" abcd"));
        assert_eq!(ctx.row(1).as_deref(), Some("-----"));
        assert_eq!(ctx.row(2), None);
    }

    #[test]
    fn test_clones_share_surface() {
        let ctx = Context2d::new(2, 1);
        let other = ctx.clone();
        other.put(1, 0, 'x');

        assert!(ctx.ptr_eq(&other));
        assert_eq!(ctx.get(1, 0), Some('x'));

        ctx.clear();
        assert_eq!(other.get(1, 0), Some(' '));
    }
}
