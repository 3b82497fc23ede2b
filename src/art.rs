// Procedural pixel art. The renderer falls back to these sheets whenever an image
// asset is still loading or failed to load, so every sheet keeps the same layout as
// the PNG it stands in for.

use crate::game::Level;

pub const BIRD_FRAME_PX: u32 = 16;
pub const PIPE_CELL_W: u32 = 32;
pub const PIPE_CELL_H: u32 = 160;
pub const PIPE_COLUMNS: u32 = 4;
pub const BACKGROUND_W: u32 = 144;
pub const BACKGROUND_H: u32 = 256;
pub const FLOOR_TILE_PX: u32 = 16;

#[derive(Clone, Debug, PartialEq)]
pub struct Sprite {
    pub width: u32,
    pub height: u32,
    pub pixels_rgba: Vec<u8>,
}

impl Sprite {
    fn blank(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels_rgba: vec![0u8; width as usize * height as usize * 4],
        }
    }

    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let i = ((y * self.width + x) * 4) as usize;
        [
            self.pixels_rgba[i],
            self.pixels_rgba[i + 1],
            self.pixels_rgba[i + 2],
            self.pixels_rgba[i + 3],
        ]
    }

    #[inline]
    fn put(&mut self, x: i32, y: i32, c: [u8; 4]) {
        if x < 0 || y < 0 {
            return;
        }
        let (x, y) = (x as u32, y as u32);
        if x >= self.width || y >= self.height {
            return;
        }
        let idx = ((y * self.width + x) * 4) as usize;
        self.pixels_rgba[idx..idx + 4].copy_from_slice(&c);
    }

    fn fill_rect(&mut self, x: i32, y: i32, w: i32, h: i32, c: [u8; 4]) {
        for yy in y..(y + h) {
            for xx in x..(x + w) {
                self.put(xx, yy, c);
            }
        }
    }

    fn fill_circle(&mut self, cx: i32, cy: i32, radius: i32, c: [u8; 4]) {
        let r2 = radius * radius;
        for y in (cy - radius)..=(cy + radius) {
            let dy = y - cy;
            for x in (cx - radius)..=(cx + radius) {
                let dx = x - cx;
                if dx * dx + dy * dy <= r2 {
                    self.put(x, y, c);
                }
            }
        }
    }
}

#[inline]
fn rgba(r: u8, g: u8, b: u8) -> [u8; 4] {
    [r, g, b, 255]
}

#[inline]
fn shade(c: [u8; 4], pct: u32) -> [u8; 4] {
    [
        ((c[0] as u32 * pct) / 100).min(255) as u8,
        ((c[1] as u32 * pct) / 100).min(255) as u8,
        ((c[2] as u32 * pct) / 100).min(255) as u8,
        c[3],
    ]
}

fn lerp_color(a: [u8; 4], b: [u8; 4], t: f64) -> [u8; 4] {
    let t = t.clamp(0.0, 1.0);
    let mix = |x: u8, y: u8| (x as f64 + (y as f64 - x as f64) * t).round() as u8;
    [mix(a[0], b[0]), mix(a[1], b[1]), mix(a[2], b[2]), 255]
}

/// Flapping bird, `frames` square cells laid out in one row.
pub fn bird_sheet(frames: u32) -> Sprite {
    let frames = frames.max(1);
    let s = BIRD_FRAME_PX as i32;
    let mut sheet = Sprite::blank(BIRD_FRAME_PX * frames, BIRD_FRAME_PX);

    let body = rgba(250, 204, 40);
    let belly = rgba(255, 240, 170);
    let wing = rgba(230, 150, 20);
    let beak = rgba(240, 90, 30);
    let outline = rgba(60, 40, 20);
    // Wing tip height per frame: up, level, down, level.
    let wing_offsets = [-3, 0, 3, 0];

    for frame in 0..frames as i32 {
        let ox = frame * s;
        let cx = ox + s / 2 - 1;
        let cy = s / 2;
        sheet.fill_circle(cx, cy, 6, outline);
        sheet.fill_circle(cx, cy, 5, body);
        sheet.fill_circle(cx - 1, cy + 2, 3, belly);
        // Eye.
        sheet.fill_rect(cx + 2, cy - 3, 3, 3, rgba(255, 255, 255));
        sheet.put(cx + 3, cy - 2, outline);
        // Beak.
        sheet.fill_rect(cx + 5, cy, 3, 2, beak);

        let wy = cy + wing_offsets[(frame as usize) % wing_offsets.len()];
        sheet.fill_rect(cx - 6, wy - 1, 5, 3, outline);
        sheet.fill_rect(cx - 5, wy, 3, 1, wing);
    }

    sheet
}

/// Colour of the pipe in sheet cell `(column, top_row)`.
pub fn pipe_cell_color(column: u32, top_row: bool) -> [u8; 4] {
    match (column % PIPE_COLUMNS, top_row) {
        (0, true) => rgba(80, 176, 60),
        (1, true) => rgba(238, 200, 50),
        (2, true) => rgba(206, 56, 48),
        (3, true) => rgba(56, 112, 214),
        (0, false) => rgba(226, 230, 234),
        (1, false) => rgba(236, 120, 178),
        (2, false) => rgba(130, 130, 140),
        _ => rgba(240, 140, 40),
    }
}

/// Four columns by two rows of pipe bodies, lip at the top of each cell.
pub fn pipe_sheet() -> Sprite {
    let mut sheet = Sprite::blank(PIPE_CELL_W * PIPE_COLUMNS, PIPE_CELL_H * 2);
    let w = PIPE_CELL_W as i32;
    let h = PIPE_CELL_H as i32;
    let lip_h = 12;

    for row in 0..2 {
        for column in 0..PIPE_COLUMNS {
            let base = pipe_cell_color(column, row == 0);
            let x = column as i32 * w;
            let y = row * h;

            // Body, inset so the lip overhangs.
            sheet.fill_rect(x + 3, y + lip_h, w - 6, h - lip_h, shade(base, 70));
            sheet.fill_rect(x + 4, y + lip_h, w - 8, h - lip_h, base);
            sheet.fill_rect(x + 8, y + lip_h, 3, h - lip_h, shade(base, 130));

            sheet.fill_rect(x, y, w, lip_h, shade(base, 70));
            sheet.fill_rect(x + 1, y + 1, w - 2, lip_h - 2, base);
            sheet.fill_rect(x + 5, y + 2, 3, lip_h - 4, shade(base, 130));
        }
    }

    sheet
}

/// Opaque sky backdrop: daylight for level one, dusk for level two.
pub fn background(level: Level) -> Sprite {
    let mut bg = Sprite::blank(BACKGROUND_W, BACKGROUND_H);
    let w = BACKGROUND_W as i32;
    let h = BACKGROUND_H as i32;

    let (top, bottom, hill, cloud) = match level {
        Level::One => (
            rgba(96, 170, 230),
            rgba(180, 226, 245),
            rgba(96, 160, 90),
            rgba(250, 252, 255),
        ),
        Level::Two => (
            rgba(60, 40, 110),
            rgba(240, 140, 90),
            rgba(70, 60, 90),
            rgba(250, 200, 180),
        ),
    };

    for y in 0..h {
        let c = lerp_color(top, bottom, y as f64 / (h - 1) as f64);
        bg.fill_rect(0, y, w, 1, c);
    }

    for (cx, cy, r) in [(24, 40, 7), (34, 36, 9), (46, 41, 6), (100, 70, 6), (110, 66, 8)] {
        bg.fill_circle(cx, cy, r, cloud);
    }

    // Rolling hills wrap at the edges so the backdrop tiles horizontally.
    for (cx, r) in [(0, 40), (60, 30), (110, 44), (w, 40)] {
        bg.fill_circle(cx, h + 10, r, shade(hill, 85));
    }
    for (cx, r) in [(30, 26), (90, 34)] {
        bg.fill_circle(cx, h + 14, r, hill);
    }

    bg
}

/// Grass-topped dirt tile for the floor strip.
pub fn floor_tile() -> Sprite {
    let s = FLOOR_TILE_PX as i32;
    let mut tile = Sprite::blank(FLOOR_TILE_PX, FLOOR_TILE_PX);
    let dirt = rgba(170, 112, 60);
    tile.fill_rect(0, 0, s, s, dirt);
    tile.fill_rect(0, 0, s, 4, rgba(110, 190, 70));
    tile.fill_rect(0, 4, s, 1, rgba(70, 130, 40));
    for (x, y) in [(3, 8), (10, 7), (6, 12), (13, 13), (1, 14)] {
        tile.put(x, y, shade(dirt, 70));
    }
    tile
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::PipeStyle;

    fn opaque_count(sprite: &Sprite, x0: u32, w: u32) -> usize {
        let mut n = 0;
        for y in 0..sprite.height {
            for x in x0..x0 + w {
                if sprite.pixel(x, y)[3] == 255 {
                    n += 1;
                }
            }
        }
        n
    }

    #[test]
    fn bird_sheet_has_one_cell_per_frame_with_transparent_corners() {
        let sheet = bird_sheet(4);
        assert_eq!(sheet.width, BIRD_FRAME_PX * 4);
        assert_eq!(sheet.height, BIRD_FRAME_PX);
        assert_eq!(sheet.pixels_rgba.len(), (sheet.width * sheet.height * 4) as usize);
        for frame in 0..4 {
            assert_eq!(sheet.pixel(frame * BIRD_FRAME_PX, 0)[3], 0);
            assert!(opaque_count(&sheet, frame * BIRD_FRAME_PX, BIRD_FRAME_PX) > 50);
        }
    }

    #[test]
    fn wing_moves_between_frames() {
        let sheet = bird_sheet(4);
        let cell = |frame: u32| -> Vec<[u8; 4]> {
            (0..BIRD_FRAME_PX * BIRD_FRAME_PX)
                .map(|i| sheet.pixel(frame * BIRD_FRAME_PX + i % BIRD_FRAME_PX, i / BIRD_FRAME_PX))
                .collect()
        };
        assert_ne!(cell(0), cell(2));
        assert_eq!(cell(1), cell(3));
    }

    #[test]
    fn every_pipe_style_has_a_distinct_cell() {
        let sheet = pipe_sheet();
        assert_eq!(sheet.width, PIPE_CELL_W * PIPE_COLUMNS);
        assert_eq!(sheet.height, PIPE_CELL_H * 2);

        let styles = [
            PipeStyle::White,
            PipeStyle::Yellow,
            PipeStyle::Blue,
            PipeStyle::Red,
            PipeStyle::Pink,
            PipeStyle::Orange,
        ];
        let mut colors: Vec<[u8; 4]> = styles
            .iter()
            .map(|style| {
                let (column, top_row) = style.sprite_cell();
                let y = if top_row { 0 } else { PIPE_CELL_H };
                // Middle of the body, clear of the highlight stripe.
                sheet.pixel(column * PIPE_CELL_W + PIPE_CELL_W / 2 + 4, y + PIPE_CELL_H / 2)
            })
            .collect();
        for (style, color) in styles.iter().zip(&colors) {
            let (column, top_row) = style.sprite_cell();
            assert_eq!(*color, pipe_cell_color(column, top_row));
        }
        colors.sort();
        colors.dedup();
        assert_eq!(colors.len(), styles.len());
    }

    #[test]
    fn backgrounds_are_opaque_and_differ_per_level() {
        let one = background(Level::One);
        let two = background(Level::Two);
        assert!(one.pixels_rgba.chunks_exact(4).all(|px| px[3] == 255));
        assert!(two.pixels_rgba.chunks_exact(4).all(|px| px[3] == 255));
        assert_ne!(one.pixel(0, 0), two.pixel(0, 0));
    }

    #[test]
    fn floor_tile_is_grass_over_dirt() {
        let tile = floor_tile();
        assert_eq!(tile.pixel(8, 1), rgba(110, 190, 70));
        assert_eq!(tile.pixel(8, 10), rgba(170, 112, 60));
    }
}
