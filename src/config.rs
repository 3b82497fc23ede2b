/// Every tunable number the game uses.
///
/// Size-dependent values are derived from the playfield by [`GameConfig::for_playfield`];
/// anything can be overridden afterwards, either directly (tests) or from the page query
/// string through [`GameConfig::apply_query`].
#[derive(Clone, Debug, PartialEq)]
pub struct GameConfig {
    /// Added to the bird's velocity every playing tick.
    pub gravity: f64,
    /// Velocity a flap sets (negative is up).
    pub flap_velocity: f64,
    pub bird_size: f64,
    pub pipe_width: f64,
    /// Height of the gap band.
    pub pipe_gap: f64,
    /// Leftward pipe motion per tick.
    pub pipe_speed: f64,
    /// Distance from the right edge the newest pipe must travel before the next spawns.
    pub spawn_distance: f64,
    pub level_two_spawn_factor: f64,
    pub level_two_gap_range_factor: f64,
    pub background_scroll_speed: f64,
    pub countdown_ms: f64,
    pub celebration_ms: f64,
    /// Overlay alpha change per tick during fades.
    pub fade_step: f64,
    /// Dev-mode vertical step per key press.
    pub dev_step: f64,
    pub level_one_threshold: u32,
    pub level_two_win_score: u32,
    pub bird_frames: u32,
    pub frame_duration_ms: f64,
    pub max_frame_dt_ms: f64,
}

impl GameConfig {
    pub fn for_playfield(width: f64, height: f64) -> Self {
        let width = width.max(1.0);
        let height = height.max(1.0);
        let short_side = width.min(height);
        let pipe_speed = width * 0.003;

        Self {
            gravity: 0.375,
            flap_velocity: -8.0,
            bird_size: short_side * 0.05,
            pipe_width: short_side * 0.15,
            pipe_gap: short_side * 0.25,
            pipe_speed,
            spawn_distance: width * 0.6,
            level_two_spawn_factor: 0.8,
            level_two_gap_range_factor: 1.2,
            background_scroll_speed: pipe_speed * 0.5,
            countdown_ms: 3000.0,
            celebration_ms: 1500.0,
            fade_step: 0.02,
            dev_step: 20.0,
            level_one_threshold: 10,
            level_two_win_score: 20,
            bird_frames: 4,
            frame_duration_ms: 100.0,
            max_frame_dt_ms: 100.0,
        }
    }

    /// Time to advance for a frame that arrived `elapsed_ms` after the previous one.
    pub fn frame_dt(&self, elapsed_ms: f64) -> f64 {
        elapsed_ms.max(0.0).min(self.max_frame_dt_ms.max(0.0))
    }

    /// The part of a `location.search` string that tunes the game, normalised to
    /// `?key=value&...`, or empty when nothing applies. Page flags and bad entries drop out.
    pub fn tuning_query(search: &str) -> String {
        let mut scratch = GameConfig::for_playfield(1.0, 1.0);
        let search = search.strip_prefix('?').unwrap_or(search);
        let kept: Vec<&str> = search
            .split('&')
            .filter(|pair| match pair.split_once('=') {
                Some((key, raw)) => !matches!(key, "diag" | "v") && scratch.set(key, raw).is_ok(),
                None => false,
            })
            .collect();

        if kept.is_empty() {
            String::new()
        } else {
            format!("?{}", kept.join("&"))
        }
    }

    /// Applies `key=value` pairs from a `location.search` string.
    ///
    /// Returns one message per entry that was not applied. Bare flags and the page's own
    /// `diag` / `v` keys are skipped without a message.
    pub fn apply_query(&mut self, search: &str) -> Vec<String> {
        let mut ignored = Vec::new();
        let search = search.strip_prefix('?').unwrap_or(search);

        for pair in search.split('&').filter(|p| !p.is_empty()) {
            let Some((key, raw)) = pair.split_once('=') else {
                continue;
            };
            if matches!(key, "diag" | "v") {
                continue;
            }
            if let Err(message) = self.set(key, raw) {
                ignored.push(message);
            }
        }

        ignored
    }

    fn set(&mut self, key: &str, raw: &str) -> Result<(), String> {
        let value: f64 = raw
            .parse()
            .map_err(|_| format!("{}: not a number ({})", key, raw))?;
        if !value.is_finite() {
            return Err(format!("{}: not finite ({})", key, raw));
        }
        if key == "max_frame_dt_ms" && value <= 0.0 {
            return Err(format!("{}: must be positive ({})", key, raw));
        }

        let slot = match key {
            "gravity" => &mut self.gravity,
            "flap_velocity" => &mut self.flap_velocity,
            "bird_size" => &mut self.bird_size,
            "pipe_width" => &mut self.pipe_width,
            "pipe_gap" => &mut self.pipe_gap,
            "pipe_speed" => &mut self.pipe_speed,
            "spawn_distance" => &mut self.spawn_distance,
            "level_two_spawn_factor" => &mut self.level_two_spawn_factor,
            "level_two_gap_range_factor" => &mut self.level_two_gap_range_factor,
            "background_scroll_speed" => &mut self.background_scroll_speed,
            "countdown_ms" => &mut self.countdown_ms,
            "celebration_ms" => &mut self.celebration_ms,
            "fade_step" => &mut self.fade_step,
            "dev_step" => &mut self.dev_step,
            "frame_duration_ms" => &mut self.frame_duration_ms,
            "max_frame_dt_ms" => &mut self.max_frame_dt_ms,
            "level_one_threshold" | "level_two_win_score" | "bird_frames" => {
                if value < 1.0 || value.fract() != 0.0 {
                    return Err(format!("{}: expected a positive integer ({})", key, raw));
                }
                let count = value as u32;
                match key {
                    "level_one_threshold" => self.level_one_threshold = count,
                    "level_two_win_score" => self.level_two_win_score = count,
                    _ => self.bird_frames = count,
                }
                return Ok(());
            }
            _ => return Err(format!("{}: unknown setting", key)),
        };

        *slot = value;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scales_with_the_short_side() {
        let cfg = GameConfig::for_playfield(800.0, 600.0);
        assert_eq!(cfg.bird_size, 30.0);
        assert_eq!(cfg.pipe_width, 90.0);
        assert_eq!(cfg.pipe_gap, 150.0);
        assert_eq!(cfg.pipe_speed, 2.4);
        assert_eq!(cfg.spawn_distance, 480.0);
        assert_eq!(cfg.background_scroll_speed, 1.2);
    }

    #[test]
    fn fixed_constants_match_the_arcade_tuning() {
        let cfg = GameConfig::for_playfield(640.0, 960.0);
        assert_eq!(cfg.gravity, 0.375);
        assert_eq!(cfg.flap_velocity, -8.0);
        assert_eq!(cfg.countdown_ms, 3000.0);
        assert_eq!(cfg.celebration_ms, 1500.0);
        assert_eq!(cfg.level_one_threshold, 10);
        assert_eq!(cfg.level_two_win_score, 20);
    }

    #[test]
    fn query_overrides_known_fields() {
        let mut cfg = GameConfig::for_playfield(800.0, 600.0);
        let ignored = cfg.apply_query("?gravity=0.5&countdown_ms=0&level_one_threshold=3");
        assert!(ignored.is_empty(), "{:?}", ignored);
        assert_eq!(cfg.gravity, 0.5);
        assert_eq!(cfg.countdown_ms, 0.0);
        assert_eq!(cfg.level_one_threshold, 3);
    }

    #[test]
    fn query_reports_bad_entries_and_keeps_defaults() {
        let mut cfg = GameConfig::for_playfield(800.0, 600.0);
        let ignored = cfg.apply_query("gravity=fast&warp=9&bird_frames=2.5&nosw&diag=1&pipe_speed=inf");
        assert_eq!(ignored.len(), 4);
        assert_eq!(cfg.gravity, 0.375);
        assert_eq!(cfg.bird_frames, 4);
        assert_eq!(cfg.pipe_speed, 2.4);
    }

    #[test]
    fn frame_cap_must_be_positive() {
        let mut cfg = GameConfig::for_playfield(800.0, 600.0);
        let ignored = cfg.apply_query("?max_frame_dt_ms=-5&max_frame_dt_ms=0");
        assert_eq!(ignored.len(), 2, "{:?}", ignored);
        assert_eq!(cfg.max_frame_dt_ms, 100.0);
        assert_eq!(cfg.frame_dt(16.0), 16.0);
    }

    #[test]
    fn frame_dt_never_panics_on_a_bad_cap() {
        let mut cfg = GameConfig::for_playfield(800.0, 600.0);
        assert_eq!(cfg.frame_dt(-4.0), 0.0);
        assert_eq!(cfg.frame_dt(250.0), 100.0);

        cfg.max_frame_dt_ms = -5.0;
        assert_eq!(cfg.frame_dt(16.0), 0.0);
    }

    #[test]
    fn tuning_query_keeps_only_applicable_overrides() {
        assert_eq!(
            GameConfig::tuning_query("?diag=1&gravity=0.3&warp=9&countdown_ms=0&nosw"),
            "?gravity=0.3&countdown_ms=0"
        );
        assert_eq!(GameConfig::tuning_query("?diag=1&v=3"), "");
        assert_eq!(GameConfig::tuning_query(""), "");
    }
}
