use crate::braille::{BrailleCanvas, Rgb};

/// Draw a point marker (cross) with arms of `size` dots
pub fn draw_marker(canvas: &mut BrailleCanvas, x: i32, y: i32, size: i32, color: Rgb) {
    for i in -size..=size {
        canvas.paint(x + i, y, color);
        canvas.paint(x, y + i, color);
    }
}

/// Draw a filled circle
pub fn draw_circle(canvas: &mut BrailleCanvas, cx: i32, cy: i32, radius: i32, color: Rgb) {
    for dy in -radius..=radius {
        for dx in -radius..=radius {
            if dx * dx + dy * dy <= radius * radius {
                canvas.paint(cx + dx, cy + dy, color);
            }
        }
    }
}

/// Draw a one-dot ring just outside `radius` (selection highlight)
pub fn draw_ring(canvas: &mut BrailleCanvas, cx: i32, cy: i32, radius: i32, color: Rgb) {
    let outer = radius + 1;
    for dy in -outer..=outer {
        for dx in -outer..=outer {
            let d2 = dx * dx + dy * dy;
            if d2 > radius * radius && d2 <= outer * outer {
                canvas.paint(cx + dx, cy + dy, color);
            }
        }
    }
}
