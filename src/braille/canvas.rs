/// RGB color of a canvas cell
pub type Rgb = [u8; 3];

/// Dot bit for (x % 2, y % 4) inside a Braille cell:
/// ```text
/// (0,0) (1,0)   bits: 0x01 0x08
/// (0,1) (1,1)   bits: 0x02 0x10
/// (0,2) (1,2)   bits: 0x04 0x20
/// (0,3) (1,3)   bits: 0x40 0x80
/// ```
const DOT_BITS: [[u8; 4]; 2] = [[0x01, 0x02, 0x04, 0x40], [0x08, 0x10, 0x20, 0x80]];

/// Braille Unicode canvas with one color per character cell.
/// Each cell is a 2x4 dot grid; patterns live at U+2800..U+28FF.
pub struct BrailleCanvas {
    width: usize,  // Characters
    height: usize, // Characters
    dots: Vec<u8>,
    /// Last color painted into each cell
    colors: Vec<Option<Rgb>>,
}

impl BrailleCanvas {
    /// Create a canvas with the given character dimensions.
    /// Dot resolution is width*2 x height*4
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            dots: vec![0; width * height],
            colors: vec![None; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    #[inline(always)]
    fn cell_index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 {
            return None;
        }
        let (cx, cy) = (x as usize / 2, y as usize / 4);
        (cx < self.width && cy < self.height).then_some(cy * self.width + cx)
    }

    /// Set a dot in the given color; out-of-range dots are ignored
    pub fn paint(&mut self, x: i32, y: i32, color: Rgb) {
        if let Some(idx) = self.cell_index(x, y) {
            self.dots[idx] |= DOT_BITS[x as usize % 2][y as usize % 4];
            self.colors[idx] = Some(color);
        }
    }

    /// Character and color of a cell, or `None` for an empty cell
    pub fn cell(&self, col: usize, row: usize) -> Option<(char, Rgb)> {
        if col >= self.width || row >= self.height {
            return None;
        }
        let idx = row * self.width + col;
        let bits = self.dots[idx];
        if bits == 0 {
            return None;
        }
        let ch = char::from_u32(0x2800 + bits as u32).unwrap_or(' ');
        Some((ch, self.colors[idx].unwrap_or([255, 255, 255])))
    }

    /// Row as a string of Braille characters
    #[cfg(test)]
    pub fn row_to_string(&self, row: usize) -> String {
        self.dots[row * self.width..(row + 1) * self.width]
            .iter()
            .map(|&b| char::from_u32(0x2800 + b as u32).unwrap_or(' '))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WHITE: Rgb = [255, 255, 255];

    #[test]
    fn test_single_dot() {
        let mut canvas = BrailleCanvas::new(1, 1);
        canvas.paint(0, 0, WHITE);
        assert_eq!(canvas.row_to_string(0), "⠁"); // U+2801
    }

    #[test]
    fn test_all_dots() {
        let mut canvas = BrailleCanvas::new(1, 1);
        for x in 0..2 {
            for y in 0..4 {
                canvas.paint(x, y, WHITE);
            }
        }
        assert_eq!(canvas.row_to_string(0), "⣿"); // U+28FF
    }

    #[test]
    fn test_diagonal() {
        let mut canvas = BrailleCanvas::new(2, 1);
        for i in 0..4 {
            canvas.paint(i, i, WHITE);
        }
        // (0,0)+(1,1) = 0x11, (2,2)+(3,3) = 0x84
        assert_eq!(canvas.row_to_string(0), "⠑⢄");
    }

    #[test]
    fn test_out_of_range_ignored() {
        let mut canvas = BrailleCanvas::new(1, 1);
        canvas.paint(-1, 0, WHITE);
        canvas.paint(2, 0, WHITE);
        canvas.paint(0, 4, WHITE);
        assert_eq!(canvas.cell(0, 0), None);
    }

    #[test]
    fn test_last_color_wins() {
        let mut canvas = BrailleCanvas::new(1, 1);
        canvas.paint(0, 0, [1, 2, 3]);
        canvas.paint(1, 0, [4, 5, 6]);
        assert_eq!(canvas.cell(0, 0), Some(('⠉', [4, 5, 6])));
        assert_eq!(canvas.cell(1, 0), None);
    }
}
