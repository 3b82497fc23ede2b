use crate::config::GameConfig;
use crate::game::{Game, Phase, TransitionStage};
use crate::render::DrawInfo;
use qrcodegen::{QrCode, QrCodeEcc};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{
    CanvasRenderingContext2d, Document, HtmlCanvasElement, HtmlElement, HtmlImageElement,
};

const QR_MODULE_PX: u32 = 4;
/// Blank modules around the code, as scanners expect.
const QR_QUIET_ZONE: usize = 4;
const MAX_USER_AGENT_LEN: usize = 120;

/// Host-side facts the panel reports next to the game state.
pub struct HostInfo<'a> {
    pub status: &'a str,
    pub last_event: &'a str,
    pub assets: &'a str,
    pub canvas: (u32, u32),
    pub viewport: (f64, f64),
    pub dpr: f64,
    pub draw_info: Option<DrawInfo>,
    pub user_agent: &'a str,
}

pub fn phase_name(phase: Phase) -> &'static str {
    match phase {
        Phase::Splash { .. } => "splash",
        Phase::Countdown { .. } => "countdown",
        Phase::Playing => "playing",
        Phase::GameOver => "game_over",
        Phase::LevelComplete(t) => match t.stage {
            TransitionStage::FadeOut => "level_complete_fade_out",
            TransitionStage::Celebrate => "level_complete_celebrate",
            TransitionStage::FadeIn => "level_complete_fade_in",
        },
        Phase::Won(t) => match t.stage {
            TransitionStage::FadeOut => "won_fade_out",
            TransitionStage::Celebrate => "won_celebrate",
            TransitionStage::FadeIn => "won_fade_in",
        },
    }
}

pub fn summary_lines(game: &Game, host: &HostInfo) -> Vec<String> {
    let bird = game.bird();
    let (w, h) = game.playfield();

    let draw_line = match host.draw_info {
        Some(info) => format!(
            "draw: {}x{} @ ({}, {}) scale {:.3}",
            info.draw_width.round(),
            info.draw_height.round(),
            info.x.round(),
            info.y.round(),
            info.scale
        ),
        None => "draw: (pending)".to_string(),
    };

    let user_agent = if host.user_agent.is_empty() {
        "(unavailable)".to_string()
    } else {
        host.user_agent.chars().take(MAX_USER_AGENT_LEN).collect()
    };

    let mut lines = vec![
        format!("status: {}", host.status),
        format!("event: {}", host.last_event),
        format!("phase: {}", phase_name(game.phase())),
    ];
    if let Phase::Splash { selected } = game.phase() {
        lines.push(format!("selected: {}", selected));
    }
    lines.extend([
        format!("level: {}", game.level().number()),
        format!("score: {}", game.score()),
        format!(
            "bird: y {:.1} v {:.2} frame {}",
            bird.y,
            bird.velocity,
            game.bird_frame()
        ),
        format!("pipes: {}", game.pipes().len()),
        format!("dev_mode: {}", game.dev_mode()),
        format!("fade: {:.2}", game.fade_alpha()),
        format!("assets: {}", host.assets),
        format!("playfield: {}x{}", w.round(), h.round()),
        format!(
            "canvas: {}x{} (dpr {:.2})",
            host.canvas.0, host.canvas.1, host.dpr
        ),
        format!(
            "viewport: {}x{}",
            host.viewport.0.floor(),
            host.viewport.1.floor()
        ),
        draw_line,
        format!("ua: {}", user_agent),
    ]);
    lines
}

/// Mirrors the page status into `data-render-status` and the status text.
pub fn set_status(document: &Document, text: Option<&HtmlElement>, status: &str, message: &str) {
    if let Some(el) = document.document_element() {
        let _ = el.set_attribute("data-render-status", status);
    }
    if let Some(text) = text {
        text.set_text_content(Some(message));
    }
}

fn find<T: JsCast>(document: &Document, id: &str) -> Option<T> {
    document
        .get_element_by_id(id)
        .and_then(|el| el.dyn_into::<T>().ok())
}

/// Link and QR code that open this page, with the same tuning, on another device.
struct ShareLink {
    block: HtmlElement,
    qr: HtmlImageElement,
    url: HtmlElement,
}

/// The optional tools panel. Present only when the page provides `#diagnostics` and
/// `#diagnostics-text`; the toggle button and share block are optional on top.
pub struct DiagnosticsPanel {
    document: Document,
    panel: HtmlElement,
    text: HtmlElement,
    tools_button: Option<HtmlElement>,
    share: Option<ShareLink>,
    open: bool,
}

impl DiagnosticsPanel {
    pub fn find(document: &Document) -> Option<Self> {
        let panel = find::<HtmlElement>(document, "diagnostics")?;
        let text = find::<HtmlElement>(document, "diagnostics-text")?;
        let share = match (
            find::<HtmlElement>(document, "share"),
            find::<HtmlImageElement>(document, "share-qr"),
            find::<HtmlElement>(document, "share-url"),
        ) {
            (Some(block), Some(qr), Some(url)) => Some(ShareLink { block, qr, url }),
            _ => None,
        };

        Some(Self {
            document: document.clone(),
            panel,
            text,
            tools_button: find::<HtmlElement>(document, "tools-button"),
            share,
            open: false,
        })
    }

    pub fn text(&self) -> &HtmlElement {
        &self.text
    }

    pub fn tools_button(&self) -> Option<&HtmlElement> {
        self.tools_button.as_ref()
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn set_open(&mut self, open: bool) {
        self.open = open;

        if let Some(el) = self.document.document_element() {
            let _ = el.set_attribute("data-diag-open", if open { "1" } else { "0" });
        }

        if let Some(button) = &self.tools_button {
            let flag = if open { "true" } else { "false" };
            let _ = button.set_attribute("aria-expanded", flag);
            let _ = button.set_attribute("aria-pressed", flag);
            let _ = button.set_attribute(
                "title",
                if open { "Hide diagnostics" } else { "Diagnostics" },
            );
        }
        let _ = self
            .panel
            .set_attribute("aria-hidden", if open { "false" } else { "true" });
    }

    pub fn update(&self, lines: &[String]) {
        self.text.set_text_content(Some(&lines.join("\n")));
        if let Some(share) = &self.share {
            let _ = share.refresh(&self.document);
        }
    }
}

/// Address that reopens this page on another device: same path, tuning overrides only.
pub fn share_url(origin: &str, pathname: &str, search: &str) -> String {
    format!("{}{}{}", origin, pathname, GameConfig::tuning_query(search))
}

/// A QR code as a square of dark/light modules, quiet zone included.
pub struct QrGrid {
    size: usize,
    dark: Vec<bool>,
}

impl QrGrid {
    pub fn encode(payload: &str) -> Result<Self, String> {
        let code = QrCode::encode_text(payload, QrCodeEcc::Medium)
            .map_err(|err| format!("share link too long for a QR code ({:?})", err))?;
        let inner = code.size() as usize;
        let size = inner + QR_QUIET_ZONE * 2;

        let mut dark = vec![false; size * size];
        for y in 0..inner {
            for x in 0..inner {
                dark[(y + QR_QUIET_ZONE) * size + x + QR_QUIET_ZONE] =
                    code.get_module(x as i32, y as i32);
            }
        }
        Ok(Self { size, dark })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn is_dark(&self, x: usize, y: usize) -> bool {
        x < self.size && y < self.size && self.dark[y * self.size + x]
    }

    /// Renders at a whole number of pixels per module and returns a PNG data URL.
    pub fn to_data_url(&self, document: &Document, module_px: u32) -> Result<String, JsValue> {
        let side = self.size as u32 * module_px;
        let canvas = document
            .create_element("canvas")?
            .dyn_into::<HtmlCanvasElement>()?;
        canvas.set_width(side);
        canvas.set_height(side);

        let ctx = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("2D canvas unavailable for share QR"))?
            .dyn_into::<CanvasRenderingContext2d>()?;
        ctx.set_fill_style_str("white");
        ctx.fill_rect(0.0, 0.0, side as f64, side as f64);

        let px = module_px as f64;
        ctx.begin_path();
        for y in 0..self.size {
            for x in (0..self.size).filter(|&x| self.is_dark(x, y)) {
                ctx.rect(x as f64 * px, y as f64 * px, px, px);
            }
        }
        ctx.set_fill_style_str("black");
        ctx.fill();

        canvas.to_data_url_with_type("image/png")
    }
}

impl ShareLink {
    fn refresh(&self, document: &Document) -> Result<(), JsValue> {
        let Some(window) = web_sys::window() else {
            return Ok(());
        };
        let location = window.location();
        let url = share_url(&location.origin()?, &location.pathname()?, &location.search()?);

        let mut label = format!("Scan to play this tuning elsewhere:\n{}", url);
        if self.qr.get_attribute("data-share-url").as_deref() != Some(url.as_str()) {
            let encoded = QrGrid::encode(&url)
                .map_err(|message| JsValue::from_str(&message))
                .and_then(|grid| grid.to_data_url(document, QR_MODULE_PX));
            match encoded {
                Ok(data_url) => {
                    self.qr.set_src(&data_url);
                    let _ = self.qr.set_attribute("data-share-url", &url);
                }
                Err(err) => {
                    label = format!(
                        "{}\nQR unavailable: {}",
                        url,
                        err.as_string().unwrap_or_else(|| format!("{:?}", err))
                    );
                }
            }
        }

        self.url.set_text_content(Some(&label));
        let _ = self.block.remove_attribute("hidden");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::game::RandomSource;
    use crate::input::Command;

    struct Half;

    impl RandomSource for Half {
        fn next_unit(&mut self) -> f64 {
            0.5
        }
    }

    fn host<'a>(user_agent: &'a str) -> HostInfo<'a> {
        HostInfo {
            status: "ready",
            last_event: "init",
            assets: "bird=pending",
            canvas: (1200, 900),
            viewport: (600.4, 450.9),
            dpr: 2.0,
            draw_info: None,
            user_agent,
        }
    }

    #[test]
    fn splash_summary_lists_selection() {
        let mut game = Game::new(
            GameConfig::for_playfield(400.0, 450.0),
            400.0,
            450.0,
            Box::new(Half),
        );
        game.handle(Command::SelectDown);
        let lines = summary_lines(&game, &host("Mozilla/5.0"));

        assert_eq!(lines[0], "status: ready");
        assert_eq!(lines[2], "phase: splash");
        assert_eq!(lines[3], "selected: 1");
        assert!(lines.contains(&"canvas: 1200x900 (dpr 2.00)".to_string()));
        assert!(lines.contains(&"viewport: 600x450".to_string()));
        assert!(lines.contains(&"draw: (pending)".to_string()));
        assert_eq!(lines.last().map(String::as_str), Some("ua: Mozilla/5.0"));
    }

    #[test]
    fn in_game_summary_has_no_selection_and_truncates_user_agent() {
        let mut game = Game::new(
            GameConfig::for_playfield(400.0, 450.0),
            400.0,
            450.0,
            Box::new(Half),
        );
        game.handle(Command::Confirm);
        game.handle(Command::DevModeToggle);
        let ua = "x".repeat(300);
        let mut info = host(&ua);
        info.draw_info = Some(DrawInfo {
            scale: 2.0,
            draw_width: 800.0,
            draw_height: 900.0,
            x: 200.0,
            y: 0.0,
        });
        let lines = summary_lines(&game, &info);

        assert_eq!(lines[2], "phase: countdown");
        assert!(lines.iter().all(|l| !l.starts_with("selected")));
        assert!(lines.contains(&"dev_mode: true".to_string()));
        assert!(lines.contains(&"draw: 800x900 @ (200, 0) scale 2.000".to_string()));
        assert_eq!(lines.last().map(|l| l.len()), Some("ua: ".len() + 120));
    }

    #[test]
    fn share_url_carries_tuning_but_not_page_flags() {
        assert_eq!(
            share_url(
                "http://192.168.1.20:8080",
                "/skyflap/",
                "?diag=1&level_one_threshold=3&gravity=0.3&v=7"
            ),
            "http://192.168.1.20:8080/skyflap/?level_one_threshold=3&gravity=0.3"
        );
        assert_eq!(
            share_url("https://example.org", "/index.html", "?diag=1"),
            "https://example.org/index.html"
        );
    }

    #[test]
    fn qr_grid_has_a_quiet_zone_around_the_finder_pattern() {
        let grid = QrGrid::encode("http://192.168.1.20:8080/?gravity=0.3").expect("encode");
        // Version 1 is 21 modules, so anything larger plus the border.
        assert!(grid.size() >= 21 + QR_QUIET_ZONE * 2);
        for i in 0..grid.size() {
            assert!(!grid.is_dark(i, 0));
            assert!(!grid.is_dark(0, i));
        }
        // Top-left finder: dark outer ring, light gap, dark core.
        let q = QR_QUIET_ZONE;
        assert!(grid.is_dark(q, q));
        assert!(!grid.is_dark(q + 1, q + 1));
        assert!(grid.is_dark(q + 3, q + 3));
        assert!(!grid.is_dark(grid.size(), 0));
    }

    #[test]
    fn phase_names_cover_transitions() {
        use crate::game::Transition;
        let t = |stage| Transition {
            stage,
            alpha: 0.5,
            celebrate_remaining_ms: 0.0,
            countdown_remaining_ms: 0.0,
        };
        assert_eq!(
            phase_name(Phase::LevelComplete(t(TransitionStage::Celebrate))),
            "level_complete_celebrate"
        );
        assert_eq!(phase_name(Phase::Won(t(TransitionStage::FadeIn))), "won_fade_in");
        assert_eq!(phase_name(Phase::GameOver), "game_over");
    }
}
