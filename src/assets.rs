use crate::art::{self, Sprite};
use crate::game::Level;
use wasm_bindgen::prelude::*;
use wasm_bindgen::{Clamped, JsCast};
use wasm_bindgen_futures::JsFuture;
use web_sys::{CanvasRenderingContext2d, Document, HtmlCanvasElement, HtmlImageElement, ImageData};

const BIRD_URL: &str = "assets/Player/StyleBird1/Bird1-2.png";
const PIPES_URL: &str = "assets/Tiles/Style 1/PipeStyle1.png";
const LEVEL_ONE_BACKGROUND_URL: &str = "assets/Background/Background5.png";
const LEVEL_TWO_BACKGROUND_URL: &str = "assets/Background/Background1.png";
/// Frames laid out in a row in the bird PNG.
const BIRD_SHEET_FRAMES: u32 = 4;

/// Which image a sheet stands for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AssetSlot {
    Bird,
    Pipes,
    Background(Level),
}

impl AssetSlot {
    pub const ALL: [AssetSlot; 4] = [
        AssetSlot::Bird,
        AssetSlot::Pipes,
        AssetSlot::Background(Level::One),
        AssetSlot::Background(Level::Two),
    ];

    pub fn url(self) -> &'static str {
        match self {
            AssetSlot::Bird => BIRD_URL,
            AssetSlot::Pipes => PIPES_URL,
            AssetSlot::Background(Level::One) => LEVEL_ONE_BACKGROUND_URL,
            AssetSlot::Background(Level::Two) => LEVEL_TWO_BACKGROUND_URL,
        }
    }

    /// `(columns, rows)` of the downloaded file.
    pub fn grid(self) -> (u32, u32) {
        match self {
            AssetSlot::Bird => (BIRD_SHEET_FRAMES, 1),
            AssetSlot::Pipes => (art::PIPE_COLUMNS, 2),
            AssetSlot::Background(_) => (1, 1),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            AssetSlot::Bird => "bird",
            AssetSlot::Pipes => "pipes",
            AssetSlot::Background(Level::One) => "background_1",
            AssetSlot::Background(Level::Two) => "background_2",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AssetStatus {
    Pending,
    Loaded,
    Fallback,
}

impl AssetStatus {
    pub fn name(self) -> &'static str {
        match self {
            AssetStatus::Pending => "pending",
            AssetStatus::Loaded => "loaded",
            AssetStatus::Fallback => "fallback",
        }
    }
}

/// Axis-aligned rectangle in pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }
}

/// Source rectangle of cell `(column, row)` in an image of `size` cut into a
/// `columns` x `rows` grid. Indexes past the grid wrap; an empty image has no cells.
pub fn cell_source(size: (f64, f64), columns: u32, rows: u32, column: u32, row: u32) -> Option<Rect> {
    let columns = columns.max(1);
    let rows = rows.max(1);
    let w = size.0 / columns as f64;
    let h = size.1 / rows as f64;
    if w <= 0.0 || h <= 0.0 {
        return None;
    }
    Some(Rect::new(
        (column % columns) as f64 * w,
        (row % rows) as f64 * h,
        w,
        h,
    ))
}

pub enum ImageSource {
    Image(HtmlImageElement),
    Canvas(HtmlCanvasElement),
}

impl ImageSource {
    pub fn size(&self) -> (f64, f64) {
        match self {
            ImageSource::Image(img) => (img.natural_width() as f64, img.natural_height() as f64),
            ImageSource::Canvas(canvas) => (canvas.width() as f64, canvas.height() as f64),
        }
    }

    pub fn draw(&self, ctx: &CanvasRenderingContext2d, src: Rect, dst: Rect) -> Result<(), JsValue> {
        match self {
            ImageSource::Image(img) => ctx
                .draw_image_with_html_image_element_and_sw_and_sh_and_dx_and_dy_and_dw_and_dh(
                    img, src.x, src.y, src.w, src.h, dst.x, dst.y, dst.w, dst.h,
                ),
            ImageSource::Canvas(canvas) => ctx
                .draw_image_with_html_canvas_element_and_sw_and_sh_and_dx_and_dy_and_dw_and_dh(
                    canvas, src.x, src.y, src.w, src.h, dst.x, dst.y, dst.w, dst.h,
                ),
        }
    }
}

/// An image cut into a regular grid of cells.
pub struct SpriteSheet {
    pub source: ImageSource,
    pub columns: u32,
    pub rows: u32,
    pub status: AssetStatus,
}

impl SpriteSheet {
    pub fn cell_size(&self) -> (f64, f64) {
        let (w, h) = self.source.size();
        (w / self.columns.max(1) as f64, h / self.rows.max(1) as f64)
    }

    pub fn draw_cell(
        &self,
        ctx: &CanvasRenderingContext2d,
        column: u32,
        row: u32,
        dst: Rect,
    ) -> Result<(), JsValue> {
        match cell_source(self.source.size(), self.columns, self.rows, column, row) {
            Some(src) => self.source.draw(ctx, src, dst),
            None => Ok(()),
        }
    }
}

pub struct Assets {
    pub bird: SpriteSheet,
    pub pipes: SpriteSheet,
    pub backgrounds: [SpriteSheet; 2],
    pub floor: SpriteSheet,
}

impl Assets {
    /// Procedural stand-ins for every image, ready to draw immediately.
    pub fn placeholders(document: &Document, bird_frames: u32) -> Result<Self, JsValue> {
        let pending = |sprite: &Sprite, columns: u32, rows: u32| -> Result<SpriteSheet, JsValue> {
            Ok(SpriteSheet {
                source: ImageSource::Canvas(sprite_to_canvas(document, sprite)?),
                columns,
                rows,
                status: AssetStatus::Pending,
            })
        };

        let bird_frames = bird_frames.max(1);
        let mut floor = pending(&art::floor_tile(), 1, 1)?;
        // Never replaced by a download.
        floor.status = AssetStatus::Fallback;

        Ok(Self {
            bird: pending(&art::bird_sheet(bird_frames), bird_frames, 1)?,
            pipes: pending(&art::pipe_sheet(), art::PIPE_COLUMNS, 2)?,
            backgrounds: [
                pending(&art::background(Level::One), 1, 1)?,
                pending(&art::background(Level::Two), 1, 1)?,
            ],
            floor,
        })
    }

    pub fn background(&self, level: Level) -> &SpriteSheet {
        match level {
            Level::One => &self.backgrounds[0],
            Level::Two => &self.backgrounds[1],
        }
    }

    pub fn sheet_mut(&mut self, slot: AssetSlot) -> &mut SpriteSheet {
        match slot {
            AssetSlot::Bird => &mut self.bird,
            AssetSlot::Pipes => &mut self.pipes,
            AssetSlot::Background(Level::One) => &mut self.backgrounds[0],
            AssetSlot::Background(Level::Two) => &mut self.backgrounds[1],
        }
    }

    /// Swaps a downloaded image in, cut by that file's own layout.
    pub fn install(&mut self, slot: AssetSlot, image: HtmlImageElement) {
        let (columns, rows) = slot.grid();
        let sheet = self.sheet_mut(slot);
        sheet.source = ImageSource::Image(image);
        sheet.columns = columns;
        sheet.rows = rows;
        sheet.status = AssetStatus::Loaded;
    }

    /// Keeps the placeholder for good.
    pub fn mark_fallback(&mut self, slot: AssetSlot) {
        self.sheet_mut(slot).status = AssetStatus::Fallback;
    }

    pub fn summary(&self) -> String {
        AssetSlot::ALL
            .iter()
            .map(|slot| {
                let status = match slot {
                    AssetSlot::Bird => self.bird.status,
                    AssetSlot::Pipes => self.pipes.status,
                    AssetSlot::Background(level) => self.background(*level).status,
                };
                format!("{}={}", slot.name(), status.name())
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Copies RGBA pixels onto a fresh offscreen canvas.
pub fn sprite_to_canvas(document: &Document, sprite: &Sprite) -> Result<HtmlCanvasElement, JsValue> {
    let canvas = document
        .create_element("canvas")?
        .dyn_into::<HtmlCanvasElement>()?;
    canvas.set_width(sprite.width);
    canvas.set_height(sprite.height);

    let ctx = canvas
        .get_context("2d")?
        .ok_or_else(|| JsValue::from_str("2D canvas unavailable for placeholder art"))?
        .dyn_into::<CanvasRenderingContext2d>()?;
    let data = ImageData::new_with_u8_clamped_array_and_sh(
        Clamped(sprite.pixels_rgba.as_slice()),
        sprite.width,
        sprite.height,
    )?;
    ctx.put_image_data(&data, 0.0, 0.0)?;

    Ok(canvas)
}

/// Fetches and decodes an image; resolves once it can be drawn without stalling a frame.
pub async fn load_image(url: &str) -> Result<HtmlImageElement, JsValue> {
    let image = HtmlImageElement::new()?;
    image.set_src(url);
    JsFuture::from(image.decode()).await?;
    if image.natural_width() == 0 || image.natural_height() == 0 {
        return Err(JsValue::from_str(&format!("{} decoded to an empty image", url)));
    }
    Ok(image)
}
