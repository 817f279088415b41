pub const CARD_CONTENT_WIDTH: u16 = 14;
pub const CARD_CHROME_WIDTH: u16 = 4;
pub const CARD_GAP: u16 = 1;
pub const MIN_SLOT_WIDTH: u16 = CARD_CONTENT_WIDTH + CARD_CHROME_WIDTH + CARD_GAP;
pub const CARD_HEIGHT: u16 = 5;

/// Auto-fit card grid over `items` with a single focused cell.
#[derive(Clone, Debug)]
pub struct GridLayout<T> {
    items: Vec<T>,
    focus: usize,
    scroll_offset: usize,
    width: u16,
    height: u16,
    min_slot_width: u16,
    columns: usize,
    rows: usize,
    content_width: u16,
}

impl<T> GridLayout<T> {
    pub fn new(width: u16, height: u16) -> Self {
        let mut grid = Self {
            items: Vec::new(),
            focus: 0,
            scroll_offset: 0,
            width,
            height,
            min_slot_width: MIN_SLOT_WIDTH,
            columns: 1,
            rows: 0,
            content_width: CARD_CONTENT_WIDTH,
        };
        grid.recompute();
        grid
    }

    #[cfg(test)]
    pub fn with_min_slot_width(mut self, min_slot_width: u16) -> Self {
        self.min_slot_width = min_slot_width.max(1);
        self.recompute();
        self
    }

    pub fn set_items(&mut self, items: Vec<T>) {
        self.items = items;
        self.focus = 0;
        self.scroll_offset = 0;
        self.recompute();
    }

    pub fn set_size(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
        self.recompute();
        self.ensure_visible();
    }

    /// Moves focus by whole cells. Row and column clamp independently; a
    /// target past the last item of a ragged final row is rejected.
    pub fn move_focus(&mut self, dx: isize, dy: isize) -> bool {
        if self.items.is_empty() {
            return false;
        }
        let (row, col) = self.position(self.focus);
        let row = clamp_step(row, dy, self.rows);
        let col = clamp_step(col, dx, self.columns);
        let target = row * self.columns + col;
        if target >= self.items.len() || target == self.focus {
            return false;
        }
        self.focus = target;
        self.ensure_visible();
        true
    }

    /// Swaps the focused item with its neighbour at `(dx, dy)` and follows it.
    /// Returns false when the neighbour cell is off-grid or empty.
    pub fn move_item(&mut self, dx: isize, dy: isize) -> bool {
        if self.items.is_empty() {
            return false;
        }
        let (row, col) = self.position(self.focus);
        let Some(row) = row.checked_add_signed(dy).filter(|row| *row < self.rows) else {
            return false;
        };
        let Some(col) = col.checked_add_signed(dx).filter(|col| *col < self.columns) else {
            return false;
        };
        let target = row * self.columns + col;
        if target >= self.items.len() || target == self.focus {
            return false;
        }
        self.items.swap(self.focus, target);
        self.focus = target;
        self.ensure_visible();
        true
    }

    pub fn focus_first_where(&mut self, predicate: impl Fn(&T) -> bool) {
        if let Some(index) = self.items.iter().position(predicate) {
            self.focus = index;
            self.ensure_visible();
        }
    }

    pub fn focused(&self) -> Option<&T> {
        self.items.get(self.focus)
    }

    pub fn focus_index(&self) -> usize {
        self.focus
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    #[cfg(test)]
    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn scroll_offset(&self) -> usize {
        self.scroll_offset
    }

    pub fn visible_rows(&self) -> usize {
        usize::from((self.height / CARD_HEIGHT).max(1))
    }

    pub fn card_content_width(&self) -> u16 {
        self.content_width
    }

    /// Visible items with their linear index, row-major.
    pub fn visible_items(&self) -> impl Iterator<Item = (usize, &T)> {
        let start = self.scroll_offset * self.columns;
        let end = (start + self.visible_rows() * self.columns).min(self.items.len());
        self.items
            .iter()
            .enumerate()
            .take(end)
            .skip(start.min(end))
    }

    fn position(&self, index: usize) -> (usize, usize) {
        (index / self.columns, index % self.columns)
    }

    fn recompute(&mut self) {
        self.columns = usize::from((self.width / self.min_slot_width).max(1));
        self.rows = self.items.len().div_ceil(self.columns);
        let columns = u16::try_from(self.columns).unwrap_or(u16::MAX);
        let slot = self.width / columns;
        self.content_width = slot
            .saturating_sub(CARD_CHROME_WIDTH + CARD_GAP)
            .max(CARD_CONTENT_WIDTH);
        if self.focus >= self.items.len() {
            self.focus = self.items.len().saturating_sub(1);
        }
    }

    fn ensure_visible(&mut self) {
        let (row, _) = self.position(self.focus);
        let visible = self.visible_rows();
        if row < self.scroll_offset {
            self.scroll_offset = row;
        } else if row >= self.scroll_offset + visible {
            self.scroll_offset = row + 1 - visible;
        }
        let max_offset = self.rows.saturating_sub(visible);
        self.scroll_offset = self.scroll_offset.min(max_offset);
    }
}

fn clamp_step(value: usize, delta: isize, len: usize) -> usize {
    let last = len.saturating_sub(1);
    value.saturating_add_signed(delta).min(last)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid_of(n: usize, width: u16, height: u16) -> GridLayout<usize> {
        let mut grid = GridLayout::new(width, height);
        grid.set_items((0..n).collect());
        grid
    }

    #[test]
    fn geometry_follows_width_and_count() {
        for width in [0u16, 10, 19, 40, 80, 133] {
            for n in 0..12usize {
                let grid = grid_of(n, width, 20);
                let columns = usize::from((width / MIN_SLOT_WIDTH).max(1));
                assert_eq!(grid.columns(), columns);
                assert_eq!(grid.rows(), n.div_ceil(columns));
            }
        }
    }

    #[test]
    fn eight_items_in_three_columns_reject_move_past_row_end() {
        let mut grid = GridLayout::new(80, 30).with_min_slot_width(21);
        grid.set_items((0..8).collect());
        assert_eq!(grid.columns(), 3);
        assert_eq!(grid.rows(), 3);

        assert!(grid.move_focus(1, 0));
        assert!(grid.move_focus(1, 0));
        assert_eq!(grid.focus_index(), 2);
        assert!(!grid.move_focus(1, 0));
        assert_eq!(grid.focus_index(), 2);
    }

    #[test]
    fn move_down_into_ragged_row_is_rejected() {
        let mut grid = GridLayout::new(80, 30).with_min_slot_width(21);
        grid.set_items((0..8).collect());
        grid.focus_first_where(|item| *item == 5);
        assert!(!grid.move_focus(0, 1));
        assert_eq!(grid.focus_index(), 5);
    }

    #[test]
    fn focus_never_leaves_items() {
        let moves = [(1, 0), (0, 1), (-1, 0), (0, -1), (3, 3), (-3, -3)];
        for n in 1..10usize {
            let mut grid = grid_of(n, 60, 20);
            for (dx, dy) in moves.iter().cycle().take(40) {
                grid.move_focus(*dx, *dy);
                assert!(grid.focus_index() < n);
            }
        }
    }

    #[test]
    fn move_item_then_inverse_restores_order() {
        let mut grid = grid_of(7, 60, 20);
        grid.focus_first_where(|item| *item == 1);
        let before = grid.items().to_vec();

        assert!(grid.move_item(1, 0));
        assert_eq!(grid.focus_index(), 2);
        assert_eq!(grid.items()[2], 1);
        assert!(grid.move_item(-1, 0));

        assert_eq!(grid.items(), before.as_slice());
        assert_eq!(grid.focus_index(), 1);
    }

    #[test]
    fn move_item_off_grid_is_rejected() {
        let mut grid = grid_of(4, 60, 20);
        assert_eq!(grid.columns(), 3);
        assert!(!grid.move_item(-1, 0));
        assert!(!grid.move_item(0, -1));
        grid.focus_first_where(|item| *item == 2);
        assert!(!grid.move_item(1, 0));
        assert!(!grid.move_item(0, 1));
        assert_eq!(grid.items(), &[0, 1, 2, 3]);
    }

    #[test]
    fn set_items_resets_focus_and_scroll() {
        let mut grid = grid_of(20, 19, 10);
        grid.focus_first_where(|item| *item == 15);
        assert!(grid.scroll_offset() > 0);
        grid.set_items((0..3).collect());
        assert_eq!(grid.focus_index(), 0);
        assert_eq!(grid.scroll_offset(), 0);
    }

    #[test]
    fn scroll_adjusts_minimally() {
        let mut grid = grid_of(10, 19, 10);
        assert_eq!(grid.visible_rows(), 2);
        grid.move_focus(0, 1);
        assert_eq!(grid.scroll_offset(), 0);
        grid.move_focus(0, 1);
        assert_eq!(grid.scroll_offset(), 1);
        grid.move_focus(0, 1);
        assert_eq!(grid.scroll_offset(), 2);
        grid.move_focus(0, -1);
        assert_eq!(grid.scroll_offset(), 2);
        grid.move_focus(0, -1);
        assert_eq!(grid.scroll_offset(), 1);
    }

    #[test]
    fn spare_width_widens_cards() {
        let grid = grid_of(4, 80, 20);
        assert_eq!(grid.columns(), 4);
        assert_eq!(grid.card_content_width(), 15);
        let narrow = grid_of(4, 10, 20);
        assert_eq!(narrow.card_content_width(), CARD_CONTENT_WIDTH);
    }

    #[test]
    fn visible_items_follow_scroll() {
        let mut grid = grid_of(10, 19, 10);
        grid.focus_first_where(|item| *item == 9);
        let visible = grid.visible_items().map(|(index, _)| index).collect::<Vec<_>>();
        assert_eq!(visible, vec![8, 9]);
    }
}
