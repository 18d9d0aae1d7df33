use crate::consts;
use crate::utils;

/// 64x32 monochrome pixel grid. Sprites are blitted one 8-pixel row at a
/// time via XOR; a draw reports whether it unset any pixel that was set.
pub struct Display {
    buffer: [[u8; consts::DISPL_WIDTH]; consts::DISPL_HEIGHT],
}

impl Default for Display {
    fn default() -> Self {
        Display {
            buffer: [[0; consts::DISPL_WIDTH]; consts::DISPL_HEIGHT],
        }
    }
}

impl Display {
    pub fn clear(&mut self) {
        self.buffer
            .iter_mut()
            .for_each(|row| *row = [0; consts::DISPL_WIDTH]);
    }

    /// XOR one sprite row (MSB leftmost) at (x, y). Pixels past the right
    /// or bottom edge clip. Returns true if any set pixel was flipped off.
    pub fn draw_row(&mut self, x: u8, y: u8, bits: u8) -> bool {
        let mut collided = false;
        for shift_pos in 0..8 {
            let px = x as usize + shift_pos;
            let py = y as usize;
            if !utils::bounds_check(px, py, consts::DISPL_WIDTH, consts::DISPL_HEIGHT) {
                break;
            }
            if (bits >> (7 - shift_pos)) & 1 == 1 {
                if self.buffer[py][px] == 1 {
                    collided = true;
                }
                self.buffer[py][px] ^= 1;
            }
        }
        collided
    }

    /// Query one pixel. Coordinates past the edges read as unset, matching
    /// the clipping of `draw_row`.
    pub fn pixel(&self, x: usize, y: usize) -> u8 {
        if !utils::bounds_check(x, y, consts::DISPL_WIDTH, consts::DISPL_HEIGHT) {
            return 0;
        }
        self.buffer[y][x]
    }

    /// Row-major view of the grid, for front ends to rasterize from.
    pub fn rows(&self) -> &[[u8; consts::DISPL_WIDTH]; consts::DISPL_HEIGHT] {
        &self.buffer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draw_row_sets_pixels() {
        let mut display = Display::default();
        let collided = display.draw_row(0, 0, 0b1010_0001);
        assert!(!collided);
        assert_eq!(display.pixel(0, 0), 1);
        assert_eq!(display.pixel(1, 0), 0);
        assert_eq!(display.pixel(2, 0), 1);
        assert_eq!(display.pixel(7, 0), 1);
    }

    #[test]
    fn test_redraw_reports_collision_and_erases() {
        let mut display = Display::default();
        assert!(!display.draw_row(4, 2, 0xFF));
        assert!(display.draw_row(4, 2, 0xFF));
        for px in 4..12 {
            assert_eq!(display.pixel(px, 2), 0);
        }
    }

    #[test]
    fn test_partial_overlap_collides() {
        let mut display = Display::default();
        display.draw_row(0, 0, 0b0000_0001);
        assert!(display.draw_row(0, 0, 0xFF));
        assert_eq!(display.pixel(7, 0), 0);
        assert_eq!(display.pixel(0, 0), 1);
    }

    #[test]
    fn test_clips_at_right_edge() {
        let mut display = Display::default();
        let collided = display.draw_row((consts::DISPL_WIDTH - 2) as u8, 5, 0xFF);
        assert!(!collided);
        assert_eq!(display.pixel(consts::DISPL_WIDTH - 2, 5), 1);
        assert_eq!(display.pixel(consts::DISPL_WIDTH - 1, 5), 1);
        assert_eq!(display.pixel(0, 5), 0);
    }

    #[test]
    fn test_clips_below_bottom_edge() {
        let mut display = Display::default();
        assert!(!display.draw_row(0, consts::DISPL_HEIGHT as u8, 0xFF));
        assert_eq!(display.pixel(0, 0), 0);
    }

    #[test]
    fn test_pixel_query_clips_out_of_range() {
        let mut display = Display::default();
        display.draw_row((consts::DISPL_WIDTH - 8) as u8, 0, 0xFF);
        assert_eq!(display.pixel(consts::DISPL_WIDTH - 1, 0), 1);
        assert_eq!(display.pixel(consts::DISPL_WIDTH, 0), 0);
        assert_eq!(display.pixel(0, consts::DISPL_HEIGHT), 0);
        assert_eq!(display.pixel(usize::MAX, usize::MAX), 0);
    }

    #[test]
    fn test_clear() {
        let mut display = Display::default();
        display.draw_row(10, 10, 0xFF);
        display.clear();
        for y in 0..consts::DISPL_HEIGHT {
            for x in 0..consts::DISPL_WIDTH {
                assert_eq!(display.pixel(x, y), 0);
            }
        }
    }
}
