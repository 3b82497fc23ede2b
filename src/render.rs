use crate::assets::{Assets, Rect};
use crate::game::{Game, Level, Phase, TransitionStage};
use crate::splash::Flock;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

const SKY: &str = "#87CEEB";
const WHITE: &str = "white";
const GOLD: &str = "#FFD700";
const RED: &str = "#FF0000";
const MAX_DPR: f64 = 2.5;
const MAX_BACKING_SIDE: f64 = 4096.0;
const FLOOR_ROWS: f64 = 2.0;

/// Where the playfield lands on the canvas backing store.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DrawInfo {
    pub scale: f64,
    pub draw_width: f64,
    pub draw_height: f64,
    pub x: f64,
    pub y: f64,
}

/// Fits the playfield inside the canvas with a uniform scale, centered.
pub fn compute_draw_info(
    canvas_width: f64,
    canvas_height: f64,
    content_width: f64,
    content_height: f64,
) -> DrawInfo {
    let scale = (canvas_width / content_width.max(1.0)).min(canvas_height / content_height.max(1.0));
    let draw_width = content_width * scale;
    let draw_height = content_height * scale;

    DrawInfo {
        scale,
        draw_width,
        draw_height,
        x: (canvas_width - draw_width) * 0.5,
        y: (canvas_height - draw_height) * 0.5,
    }
}

/// Canvas backing size for a CSS size, honouring device pixel ratio without
/// allocating huge canvases on high-DPI or very large displays.
pub fn backing_size(css_width: f64, css_height: f64, dpr: f64) -> (u32, u32) {
    let dpr = dpr.clamp(1.0, MAX_DPR);
    let mut width = (css_width * dpr).max(1.0);
    let mut height = (css_height * dpr).max(1.0);

    let max_side = width.max(height);
    if max_side > MAX_BACKING_SIDE {
        let scale = MAX_BACKING_SIDE / max_side;
        width *= scale;
        height *= scale;
    }

    (width.floor().max(1.0) as u32, height.floor().max(1.0) as u32)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
}

impl Align {
    fn css(self) -> &'static str {
        match self {
            Align::Left => "left",
            Align::Center => "center",
        }
    }
}

/// One line of text in playfield coordinates.
#[derive(Clone, Debug, PartialEq)]
pub struct Banner {
    pub text: String,
    /// Multiple of the base font size.
    pub size: f64,
    pub x: f64,
    pub y: f64,
    pub align: Align,
    pub color: &'static str,
}

impl Banner {
    fn centered(text: impl Into<String>, size: f64, x: f64, y: f64) -> Self {
        Self {
            text: text.into(),
            size,
            x,
            y,
            align: Align::Center,
            color: WHITE,
        }
    }

    fn left(text: impl Into<String>, x: f64, y: f64, color: &'static str) -> Self {
        Self {
            text: text.into(),
            size: 1.0,
            x,
            y,
            align: Align::Left,
            color,
        }
    }
}

pub fn base_font_size(width: f64, height: f64) -> f64 {
    width.min(height) * 0.05
}

/// Every line of text the current phase shows.
pub fn banner_lines(game: &Game) -> Vec<Banner> {
    let (w, h) = game.playfield();
    let fs = base_font_size(w, h);
    let mid_x = w / 2.0;
    let mid_y = h / 2.0;
    let mut lines = Vec::new();

    let seconds = || {
        game.countdown_seconds_left()
            .map(|s| s.to_string())
            .unwrap_or_default()
    };

    match game.phase() {
        Phase::Splash { selected } => {
            lines.push(Banner::centered("Flappy Bird!", 3.0, mid_x, h * 0.2));
            lines.push(Banner::centered("Select Level", 2.0, mid_x, h * 0.4));
            for (index, level) in Level::ALL.iter().enumerate() {
                let mut entry =
                    Banner::centered(level.name(), 1.5, mid_x, h * (0.55 + index as f64 * 0.1));
                if index == selected {
                    entry.color = GOLD;
                }
                lines.push(entry);
            }
            lines.push(Banner::centered(
                "↑↓ to select, Space/Enter to confirm",
                1.0,
                mid_x,
                h * 0.8,
            ));
        }
        Phase::LevelComplete(t) => match t.stage {
            TransitionStage::FadeOut => {}
            TransitionStage::Celebrate => {
                lines.push(Banner::centered("Level Complete!", 2.0, mid_x, mid_y - fs * 2.0));
                lines.push(Banner::centered(
                    format!("Score: {}", game.score()),
                    1.0,
                    mid_x,
                    mid_y,
                ));
            }
            TransitionStage::FadeIn => {
                lines.push(Banner::centered(
                    format!("{}!", game.level().name()),
                    2.0,
                    mid_x,
                    mid_y - fs * 2.0,
                ));
                lines.push(Banner::centered(seconds(), 2.0, mid_x, mid_y + fs));
            }
        },
        Phase::Won(t) => {
            if t.stage != TransitionStage::FadeOut {
                lines.push(Banner::centered("You Win!", 2.0, mid_x, mid_y - fs * 2.0));
                lines.push(Banner::centered(
                    format!("Final Score: {}", game.score()),
                    1.0,
                    mid_x,
                    mid_y,
                ));
                lines.push(Banner::centered(
                    "Returning to title screen...",
                    1.0,
                    mid_x,
                    mid_y + fs * 2.0,
                ));
            }
        }
        phase @ (Phase::Countdown { .. } | Phase::Playing | Phase::GameOver) => {
            lines.push(Banner::left(
                format!("Score: {}", game.score()),
                fs / 2.0,
                fs * 1.2,
                WHITE,
            ));
            if game.dev_mode() {
                lines.push(Banner::left("DEV MODE", fs / 2.0, fs * 2.4, RED));
            }

            match phase {
                Phase::Countdown { .. } => {
                    lines.push(Banner::centered(
                        format!("{}!", game.level().name()),
                        2.0,
                        mid_x,
                        mid_y - fs * 2.0,
                    ));
                    lines.push(Banner::centered(seconds(), 2.0, mid_x, mid_y + fs));
                    if !game.dev_mode() {
                        lines.push(Banner::left("Press K for dev mode", fs / 2.0, fs * 2.4, RED));
                    }
                }
                Phase::GameOver => {
                    lines.push(Banner::centered("Game Over!", 2.0, mid_x, mid_y));
                    lines.push(Banner::centered(
                        "Click or press Space to restart",
                        1.0,
                        mid_x,
                        mid_y + fs * 1.5,
                    ));
                }
                _ => {}
            }
        }
    }

    lines
}

pub struct Renderer {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    pub assets: Assets,
    draw_info: Option<DrawInfo>,
}

impl Renderer {
    pub fn new(canvas: HtmlCanvasElement, assets: Assets) -> Result<Self, JsValue> {
        let ctx = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("2D canvas unavailable"))?
            .dyn_into::<CanvasRenderingContext2d>()?;

        Ok(Self {
            canvas,
            ctx,
            assets,
            draw_info: None,
        })
    }

    pub fn canvas(&self) -> &HtmlCanvasElement {
        &self.canvas
    }

    pub fn draw_info(&self) -> Option<DrawInfo> {
        self.draw_info
    }

    /// Resizes the backing store and re-fits the playfield.
    pub fn resize(&mut self, css_width: f64, css_height: f64, dpr: f64, playfield: (f64, f64)) {
        let (width, height) = backing_size(css_width, css_height, dpr);
        if self.canvas.width() != width {
            self.canvas.set_width(width);
        }
        if self.canvas.height() != height {
            self.canvas.set_height(height);
        }
        self.draw_info = Some(compute_draw_info(
            width as f64,
            height as f64,
            playfield.0,
            playfield.1,
        ));
    }

    pub fn draw(&self, game: &Game, flock: &Flock) -> Result<(), JsValue> {
        let ctx = &self.ctx;
        ctx.set_transform(1.0, 0.0, 0.0, 1.0, 0.0, 0.0)?;
        ctx.set_fill_style_str("black");
        ctx.fill_rect(0.0, 0.0, self.canvas.width() as f64, self.canvas.height() as f64);

        let Some(info) = self.draw_info else {
            return Ok(());
        };
        let (w, h) = game.playfield();

        ctx.set_transform(info.scale, 0.0, 0.0, info.scale, info.x, info.y)?;
        ctx.save();
        ctx.begin_path();
        ctx.rect(0.0, 0.0, w, h);
        ctx.clip();

        let result = self.draw_scene(game, flock, w, h);
        ctx.restore();
        result
    }

    fn draw_scene(&self, game: &Game, flock: &Flock, w: f64, h: f64) -> Result<(), JsValue> {
        let ctx = &self.ctx;

        if game.in_menu() {
            ctx.set_fill_style_str("black");
            ctx.fill_rect(0.0, 0.0, w, h);
            self.draw_flock(flock)?;
            return self.draw_banners(&banner_lines(game), w, h);
        }

        self.draw_background(game, w, h)?;
        self.draw_floor(game, w, h)?;

        if !game.is_celebrating() {
            self.draw_pipes(game, h)?;
            self.draw_bird(game)?;
        }

        if matches!(game.phase(), Phase::LevelComplete(_) | Phase::Won(_)) {
            ctx.set_fill_style_str(&format!("rgba(0, 0, 0, {})", game.fade_alpha()));
            ctx.fill_rect(0.0, 0.0, w, h);
        }

        self.draw_banners(&banner_lines(game), w, h)
    }

    fn draw_background(&self, game: &Game, w: f64, h: f64) -> Result<(), JsValue> {
        let ctx = &self.ctx;
        ctx.set_fill_style_str(SKY);
        ctx.fill_rect(0.0, 0.0, w, h);

        let sheet = self.assets.background(game.level());
        let (bw, bh) = sheet.source.size();
        if bw <= 0.0 || bh <= 0.0 {
            return Ok(());
        }

        let scale = h / bh;
        let scaled_width = (bw * scale).floor().max(1.0);
        let x = ((w - scaled_width) / 2.0).floor();
        let scroll = game.background_offset().floor() % scaled_width;

        // Crisp pixels for the backdrop only.
        ctx.set_image_smoothing_enabled(false);
        let mut result = Ok(());
        for i in -1..=2 {
            let dx = x + scroll + scaled_width * i as f64;
            result = sheet.draw_cell(ctx, 0, 0, Rect::new(dx, 0.0, scaled_width, h));
            if result.is_err() {
                break;
            }
        }
        ctx.set_image_smoothing_enabled(true);
        result
    }

    fn draw_floor(&self, game: &Game, w: f64, h: f64) -> Result<(), JsValue> {
        let tile = (h * 0.05).floor().max(1.0);
        let floor_y = h - tile * FLOOR_ROWS;
        let tiles_needed = (w / tile).ceil() as i32 + 2;
        let offset = (game.background_offset() * 0.5).floor() % tile;
        let sheet = &self.assets.floor;
        let (tw, th) = sheet.source.size();

        for i in -1..tiles_needed {
            let x = i as f64 * tile + offset;
            sheet.draw_cell(&self.ctx, 0, 0, Rect::new(x, floor_y, tile, tile))?;
            // Second row: dirt only, below the grass band.
            sheet.source.draw(
                &self.ctx,
                Rect::new(0.0, th * 0.3, tw, th * 0.7),
                Rect::new(x, floor_y + tile, tile, tile),
            )?;
        }
        Ok(())
    }

    fn draw_pipes(&self, game: &Game, h: f64) -> Result<(), JsValue> {
        let ctx = &self.ctx;
        let pipe_width = game.config().pipe_width;
        let sheet = &self.assets.pipes;

        for pipe in game.pipes() {
            let (column, top_row) = pipe.style.sprite_cell();
            let row = if top_row { 0 } else { 1 };

            // Upper half hangs from the top, flipped so the lip faces the gap.
            ctx.save();
            let flipped = ctx
                .translate(pipe.x + pipe_width, pipe.gap_start)
                .and_then(|_| ctx.scale(1.0, -1.0))
                .and_then(|_| {
                    let upper = Rect::new(-pipe_width, 0.0, pipe_width, pipe.gap_start);
                    sheet.draw_cell(ctx, column, row, upper)
                });
            ctx.restore();
            flipped?;

            let lower = Rect::new(pipe.x, pipe.gap_end, pipe_width, h - pipe.gap_end);
            sheet.draw_cell(ctx, column, row, lower)?;
        }
        Ok(())
    }

    fn draw_bird(&self, game: &Game) -> Result<(), JsValue> {
        let ctx = &self.ctx;
        let bird = game.bird();
        let size = game.config().bird_size;
        let half = size / 2.0;

        ctx.save();
        let drawn = ctx
            .translate(bird.x + half, bird.y + half)
            .and_then(|_| ctx.rotate(game.bird_tilt()))
            .and_then(|_| {
                self.assets
                    .bird
                    .draw_cell(ctx, game.bird_frame(), 0, Rect::new(-half, -half, size, size))
            });
        ctx.restore();
        drawn
    }

    fn draw_flock(&self, flock: &Flock) -> Result<(), JsValue> {
        let ctx = &self.ctx;
        for bird in flock.birds() {
            let half = bird.size / 2.0;
            ctx.save();
            let drawn = ctx
                .translate(bird.x + half, bird.y + half)
                .and_then(|_| ctx.rotate(bird.rotation))
                .and_then(|_| {
                    self.assets
                        .bird
                        .draw_cell(ctx, bird.frame, 0, Rect::new(-half, -half, bird.size, bird.size))
                });
            ctx.restore();
            drawn?;
        }
        Ok(())
    }

    fn draw_banners(&self, lines: &[Banner], w: f64, h: f64) -> Result<(), JsValue> {
        let ctx = &self.ctx;
        let fs = base_font_size(w, h);
        for line in lines {
            ctx.set_font(&format!("{}px Arial", fs * line.size));
            ctx.set_text_align(line.align.css());
            ctx.set_fill_style_str(line.color);
            ctx.fill_text(&line.text, line.x, line.y)?;
        }
        ctx.set_text_align(Align::Left.css());
        Ok(())
    }
}
