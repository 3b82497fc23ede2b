use crate::config::GameConfig;
use crate::input::Command;

/// Uniform samples in `[0, 1)`. The browser host backs this with `Math.random()`.
pub trait RandomSource {
    fn next_unit(&mut self) -> f64;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Level {
    One,
    Two,
}

impl Level {
    /// Menu order on the title screen.
    pub const ALL: [Level; 2] = [Level::One, Level::Two];

    pub fn number(self) -> u32 {
        match self {
            Level::One => 1,
            Level::Two => 2,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Level::One => "Level One",
            Level::Two => "Level Two",
        }
    }

    pub fn from_selection(index: usize) -> Level {
        Level::ALL[index.min(Level::ALL.len() - 1)]
    }

    pub fn palette(self) -> &'static [PipeStyle] {
        match self {
            Level::One => &[PipeStyle::White, PipeStyle::Yellow, PipeStyle::Blue],
            Level::Two => &[PipeStyle::Red, PipeStyle::Pink, PipeStyle::Orange],
        }
    }

    /// Score that ends this level: advance on level one, win on level two.
    pub fn score_threshold(self, config: &GameConfig) -> u32 {
        match self {
            Level::One => config.level_one_threshold,
            Level::Two => config.level_two_win_score,
        }
    }

    pub fn spawn_distance(self, config: &GameConfig) -> f64 {
        match self {
            Level::One => config.spawn_distance,
            Level::Two => config.spawn_distance * config.level_two_spawn_factor,
        }
    }

    /// Bounds for a pipe's `gap_start`. Level two widens the range but never lets the
    /// gap run off the bottom of the playfield.
    pub fn gap_start_range(self, config: &GameConfig, height: f64) -> (f64, f64) {
        let min = config.pipe_gap;
        let mut max = height - config.pipe_gap * 2.0;
        if self == Level::Two {
            max = min + (max - min) * config.level_two_gap_range_factor;
            max = max.min(height - config.pipe_gap);
        }
        (min, max.max(min))
    }
}

/// Pipe colours. Each one names a cell in the 4x2 pipe sprite sheet.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PipeStyle {
    White,
    Yellow,
    Blue,
    Red,
    Pink,
    Orange,
}

impl PipeStyle {
    /// `(column, top_row)` of the sheet cell.
    pub fn sprite_cell(self) -> (u32, bool) {
        match self {
            PipeStyle::White => (0, false),
            PipeStyle::Yellow => (1, true),
            PipeStyle::Blue => (3, true),
            PipeStyle::Red => (2, true),
            PipeStyle::Pink => (1, false),
            PipeStyle::Orange => (3, false),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bird {
    pub x: f64,
    pub y: f64,
    pub velocity: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pipe {
    pub x: f64,
    pub gap_start: f64,
    pub gap_end: f64,
    pub passed: bool,
    pub style: PipeStyle,
}

impl Pipe {
    /// Axis-aligned overlap between the bird's box and either half of the pipe.
    pub fn blocks(&self, bird: &Bird, bird_size: f64, pipe_width: f64) -> bool {
        let overlaps_x = bird.x + bird_size > self.x && bird.x < self.x + pipe_width;
        overlaps_x && (bird.y < self.gap_start || bird.y + bird_size > self.gap_end)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransitionStage {
    FadeOut,
    Celebrate,
    FadeIn,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transition {
    pub stage: TransitionStage,
    /// Opacity of the black overlay.
    pub alpha: f64,
    pub celebrate_remaining_ms: f64,
    /// Countdown for the next level, running underneath the fade-in.
    pub countdown_remaining_ms: f64,
}

impl Transition {
    fn fade_out() -> Self {
        Self {
            stage: TransitionStage::FadeOut,
            alpha: 0.0,
            celebrate_remaining_ms: 0.0,
            countdown_remaining_ms: 0.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Phase {
    Splash { selected: usize },
    Countdown { remaining_ms: f64 },
    Playing,
    GameOver,
    LevelComplete(Transition),
    Won(Transition),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CrashKind {
    Floor,
    Pipe,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameEvent {
    LevelStarted(Level),
    CountdownFinished,
    Flapped,
    Scored(u32),
    Crashed(CrashKind),
    LevelComplete,
    Won,
    ReturnedToTitle,
    DevMode(bool),
}

impl GameEvent {
    /// Short snake_case tag for diagnostics.
    pub fn label(&self) -> String {
        match self {
            GameEvent::LevelStarted(level) => format!("level_started_{}", level.number()),
            GameEvent::CountdownFinished => "countdown_finished".to_string(),
            GameEvent::Flapped => "flap".to_string(),
            GameEvent::Scored(score) => format!("score_{}", score),
            GameEvent::Crashed(CrashKind::Floor) => "crash_floor".to_string(),
            GameEvent::Crashed(CrashKind::Pipe) => "crash_pipe".to_string(),
            GameEvent::LevelComplete => "level_complete".to_string(),
            GameEvent::Won => "won".to_string(),
            GameEvent::ReturnedToTitle => "return_to_title".to_string(),
            GameEvent::DevMode(true) => "dev_mode_on".to_string(),
            GameEvent::DevMode(false) => "dev_mode_off".to_string(),
        }
    }

    /// Worth a console line; flaps and single points are not.
    pub fn is_milestone(&self) -> bool {
        !matches!(self, GameEvent::Flapped | GameEvent::Scored(_))
    }
}

pub struct Game {
    config: GameConfig,
    width: f64,
    height: f64,
    rng: Box<dyn RandomSource>,
    phase: Phase,
    level: Level,
    bird: Bird,
    pipes: Vec<Pipe>,
    score: u32,
    dev_mode: bool,
    bird_frame: u32,
    frame_elapsed_ms: f64,
    background_offset: f64,
    events: Vec<GameEvent>,
}

impl Game {
    pub fn new(config: GameConfig, width: f64, height: f64, rng: Box<dyn RandomSource>) -> Self {
        let width = width.max(1.0);
        let height = height.max(1.0);
        Self {
            config,
            width,
            height,
            rng,
            phase: Phase::Splash { selected: 0 },
            level: Level::One,
            bird: Bird {
                x: width / 3.0,
                y: height / 2.0,
                velocity: 0.0,
            },
            pipes: Vec::new(),
            score: 0,
            dev_mode: false,
            bird_frame: 0,
            frame_elapsed_ms: 0.0,
            background_offset: 0.0,
            events: Vec::new(),
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn playfield(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn level(&self) -> Level {
        self.level
    }

    pub fn bird(&self) -> &Bird {
        &self.bird
    }

    pub fn pipes(&self) -> &[Pipe] {
        &self.pipes
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn dev_mode(&self) -> bool {
        self.dev_mode
    }

    pub fn bird_frame(&self) -> u32 {
        self.bird_frame
    }

    pub fn background_offset(&self) -> f64 {
        self.background_offset
    }

    pub fn in_menu(&self) -> bool {
        matches!(self.phase, Phase::Splash { .. })
    }

    /// Lowest `y` the bird can occupy.
    pub fn floor_y(&self) -> f64 {
        self.height - self.config.bird_size
    }

    /// Rotation in radians, nose up when climbing.
    pub fn bird_tilt(&self) -> f64 {
        (self.bird.velocity * 0.1).clamp(-0.5, 0.5)
    }

    pub fn fade_alpha(&self) -> f64 {
        match self.phase {
            Phase::LevelComplete(t) | Phase::Won(t) => t.alpha,
            _ => 0.0,
        }
    }

    pub fn is_celebrating(&self) -> bool {
        matches!(
            self.phase,
            Phase::LevelComplete(Transition {
                stage: TransitionStage::Celebrate,
                ..
            }) | Phase::Won(Transition {
                stage: TransitionStage::Celebrate,
                ..
            })
        )
    }

    /// Whole seconds left on whichever countdown is visible.
    pub fn countdown_seconds_left(&self) -> Option<u32> {
        let remaining = match self.phase {
            Phase::Countdown { remaining_ms } => remaining_ms,
            Phase::LevelComplete(Transition {
                stage: TransitionStage::FadeIn,
                countdown_remaining_ms,
                ..
            }) => countdown_remaining_ms,
            _ => return None,
        };
        Some((remaining.max(0.0) / 1000.0).ceil() as u32)
    }

    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn handle(&mut self, command: Command) {
        if command == Command::Cancel {
            if !self.in_menu() {
                self.return_to_title();
            }
            return;
        }

        match self.phase {
            Phase::Splash { selected } => match command {
                Command::SelectUp => {
                    self.phase = Phase::Splash {
                        selected: selected.saturating_sub(1),
                    };
                }
                Command::SelectDown => {
                    self.phase = Phase::Splash {
                        selected: (selected + 1).min(Level::ALL.len() - 1),
                    };
                }
                Command::Confirm | Command::Flap => {
                    self.start_level(Level::from_selection(selected));
                }
                _ => {}
            },
            Phase::Countdown { .. } => {
                if command == Command::DevModeToggle {
                    self.dev_mode = !self.dev_mode;
                    self.events.push(GameEvent::DevMode(self.dev_mode));
                }
            }
            Phase::Playing => match command {
                Command::Flap if !self.dev_mode => {
                    self.bird.velocity = self.config.flap_velocity;
                    self.events.push(GameEvent::Flapped);
                }
                Command::DevUp if self.dev_mode => {
                    self.bird.y = (self.bird.y - self.config.dev_step).max(0.0);
                }
                Command::DevDown if self.dev_mode => {
                    self.bird.y = (self.bird.y + self.config.dev_step).min(self.floor_y());
                }
                _ => {}
            },
            Phase::GameOver => {
                if matches!(command, Command::Flap | Command::Confirm) {
                    self.restart();
                }
            }
            Phase::LevelComplete(_) | Phase::Won(_) => {}
        }
    }

    /// Advances one frame. `dt_ms` drives timers; physics, pipes and fades move by their
    /// fixed per-tick amounts.
    pub fn tick(&mut self, dt_ms: f64) {
        let dt_ms = dt_ms.max(0.0);
        self.animate(dt_ms);

        match self.phase {
            Phase::Splash { .. } | Phase::GameOver => {}
            Phase::Countdown { remaining_ms } => {
                let remaining_ms = remaining_ms - dt_ms;
                if remaining_ms <= 0.0 {
                    self.phase = Phase::Playing;
                    self.events.push(GameEvent::CountdownFinished);
                } else {
                    self.phase = Phase::Countdown { remaining_ms };
                }
            }
            Phase::Playing => self.step_playing(),
            Phase::LevelComplete(transition) => self.advance_transition(transition, false, dt_ms),
            Phase::Won(transition) => {
                self.background_offset -= self.config.background_scroll_speed;
                self.advance_transition(transition, true, dt_ms);
            }
        }
    }

    /// Resets the bird, clears pipes and starts the countdown. Score is only reset when
    /// starting from level one.
    pub fn start_level(&mut self, level: Level) {
        self.level = level;
        if level == Level::One {
            self.score = 0;
        }
        self.reset_bird();
        self.pipes.clear();
        self.phase = Phase::Countdown {
            remaining_ms: self.config.countdown_ms,
        };
        self.events.push(GameEvent::LevelStarted(level));
    }

    pub fn restart(&mut self) {
        self.score = 0;
        self.dev_mode = false;
        self.background_offset = 0.0;
        self.start_level(self.level);
    }

    pub fn return_to_title(&mut self) {
        self.phase = Phase::Splash { selected: 0 };
        self.level = Level::One;
        self.score = 0;
        self.dev_mode = false;
        self.background_offset = 0.0;
        self.pipes.clear();
        self.reset_bird();
        self.events.push(GameEvent::ReturnedToTitle);
    }

    fn reset_bird(&mut self) {
        self.bird = Bird {
            x: self.width / 3.0,
            y: self.height / 2.0,
            velocity: 0.0,
        };
    }

    fn animate(&mut self, dt_ms: f64) {
        if self.is_celebrating() {
            return;
        }
        self.frame_elapsed_ms += dt_ms;
        if self.frame_elapsed_ms > self.config.frame_duration_ms {
            self.bird_frame = (self.bird_frame + 1) % self.config.bird_frames.max(1);
            self.frame_elapsed_ms = 0.0;
        }
    }

    fn step_playing(&mut self) {
        let bird_size = self.config.bird_size;
        let pipe_width = self.config.pipe_width;

        if !self.dev_mode {
            self.bird.velocity += self.config.gravity;
            self.bird.y += self.bird.velocity;

            if self.bird.y < 0.0 {
                self.bird.y = 0.0;
            }
            let floor = self.floor_y();
            if self.bird.y > floor {
                self.bird.y = floor;
                self.crash(CrashKind::Floor);
                return;
            }
        }

        self.background_offset -= self.config.background_scroll_speed;
        for pipe in &mut self.pipes {
            pipe.x -= self.config.pipe_speed;
        }

        // A crash wins over any point that would have been scored this tick.
        if !self.dev_mode {
            let bird = self.bird;
            if self.pipes.iter().any(|p| p.blocks(&bird, bird_size, pipe_width)) {
                self.crash(CrashKind::Pipe);
                return;
            }
        }

        for pipe in &mut self.pipes {
            if !pipe.passed && self.bird.x > pipe.x + pipe_width {
                pipe.passed = true;
                self.score += 1;
                self.events.push(GameEvent::Scored(self.score));
            }
        }

        self.pipes.retain(|p| p.x + pipe_width > 0.0);

        let spawn_line = self.width - self.level.spawn_distance(&self.config);
        if self.pipes.last().is_none_or(|p| p.x < spawn_line) {
            self.spawn_pipe();
        }

        if self.score >= self.level.score_threshold(&self.config) {
            match self.level {
                Level::One => self.complete_level(),
                Level::Two => {
                    self.phase = Phase::Won(Transition::fade_out());
                    self.events.push(GameEvent::Won);
                }
            }
        }
    }

    fn spawn_pipe(&mut self) {
        let (min, max) = self.level.gap_start_range(&self.config, self.height);
        let gap_start = min + self.rng.next_unit() * (max - min);

        let palette = self.level.palette();
        let pick = (self.rng.next_unit() * palette.len() as f64) as usize;
        let style = palette[pick.min(palette.len() - 1)];

        self.pipes.push(Pipe {
            x: self.width,
            gap_start,
            gap_end: gap_start + self.config.pipe_gap,
            passed: false,
            style,
        });
    }

    fn complete_level(&mut self) {
        self.level = Level::Two;
        self.reset_bird();
        self.pipes.clear();
        self.phase = Phase::LevelComplete(Transition::fade_out());
        self.events.push(GameEvent::LevelComplete);
    }

    fn crash(&mut self, kind: CrashKind) {
        self.phase = Phase::GameOver;
        self.events.push(GameEvent::Crashed(kind));
    }

    fn advance_transition(&mut self, mut transition: Transition, won: bool, dt_ms: f64) {
        let step = if self.config.fade_step > 0.0 {
            self.config.fade_step
        } else {
            1.0
        };

        match transition.stage {
            TransitionStage::FadeOut => {
                transition.alpha = (transition.alpha + step).min(1.0);
                if transition.alpha >= 1.0 {
                    transition.stage = TransitionStage::Celebrate;
                    transition.celebrate_remaining_ms = self.config.celebration_ms;
                }
            }
            TransitionStage::Celebrate => {
                transition.celebrate_remaining_ms -= dt_ms;
                if transition.celebrate_remaining_ms <= 0.0 {
                    transition.stage = TransitionStage::FadeIn;
                    transition.alpha = 1.0;
                    if !won {
                        transition.countdown_remaining_ms = self.config.countdown_ms;
                    }
                }
            }
            TransitionStage::FadeIn => {
                transition.alpha = (transition.alpha - step).max(0.0);
                if !won {
                    transition.countdown_remaining_ms -= dt_ms;
                }
                if transition.alpha <= 0.0 {
                    if won {
                        self.return_to_title();
                    } else {
                        self.phase = Phase::Countdown {
                            remaining_ms: transition.countdown_remaining_ms.max(0.0),
                        };
                        self.events.push(GameEvent::LevelStarted(self.level));
                    }
                    return;
                }
            }
        }

        self.phase = if won {
            Phase::Won(transition)
        } else {
            Phase::LevelComplete(transition)
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(f64);

    impl RandomSource for Fixed {
        fn next_unit(&mut self) -> f64 {
            self.0
        }
    }

    const FRAME: f64 = 1000.0 / 60.0;

    fn game() -> Game {
        Game::new(
            GameConfig::for_playfield(800.0, 600.0),
            800.0,
            600.0,
            Box::new(Fixed(0.5)),
        )
    }

    fn playing(mut game: Game) -> Game {
        game.handle(Command::Confirm);
        game.tick(game.config.countdown_ms);
        assert_eq!(game.phase, Phase::Playing);
        game.take_events();
        game
    }

    fn pipe(x: f64, gap_start: f64, gap_end: f64) -> Pipe {
        Pipe {
            x,
            gap_start,
            gap_end,
            passed: false,
            style: PipeStyle::White,
        }
    }

    #[test]
    fn splash_selection_is_clamped_to_the_menu() {
        let mut game = game();
        game.handle(Command::SelectUp);
        assert_eq!(game.phase, Phase::Splash { selected: 0 });
        game.handle(Command::SelectDown);
        game.handle(Command::SelectDown);
        assert_eq!(game.phase, Phase::Splash { selected: 1 });

        game.handle(Command::Confirm);
        assert_eq!(game.level(), Level::Two);
        assert!(matches!(game.phase, Phase::Countdown { .. }));
        assert_eq!(game.take_events(), vec![GameEvent::LevelStarted(Level::Two)]);
    }

    #[test]
    fn countdown_runs_on_elapsed_time() {
        let mut game = game();
        game.handle(Command::Flap);
        assert_eq!(game.countdown_seconds_left(), Some(3));
        game.tick(1500.0);
        assert_eq!(game.countdown_seconds_left(), Some(2));
        game.tick(1499.0);
        assert_eq!(game.countdown_seconds_left(), Some(1));
        game.tick(1.0);
        assert_eq!(game.phase, Phase::Playing);
        assert_eq!(game.countdown_seconds_left(), None);
    }

    #[test]
    fn gravity_adds_a_fixed_amount_per_tick() {
        let mut game = playing(game());
        let gravity = game.config.gravity;
        let mut last = game.bird.velocity;
        for _ in 0..10 {
            let y = game.bird.y;
            game.tick(FRAME);
            assert_eq!(game.bird.velocity, last + gravity);
            assert_eq!(game.bird.y, y + game.bird.velocity);
            last = game.bird.velocity;
        }
    }

    #[test]
    fn flap_replaces_velocity() {
        let mut game = playing(game());
        for prior in [12.0, -3.0, 0.0] {
            game.bird.velocity = prior;
            game.handle(Command::Flap);
            assert_eq!(game.bird.velocity, game.config.flap_velocity);
        }
        game.tick(FRAME);
        assert_eq!(game.bird.velocity, game.config.flap_velocity + game.config.gravity);
        assert!(game.take_events().contains(&GameEvent::Flapped));
    }

    #[test]
    fn ceiling_clamps_without_ending_the_game() {
        let mut game = playing(game());
        game.bird.y = 1.0;
        game.bird.velocity = -8.0;
        game.tick(FRAME);
        assert_eq!(game.bird.y, 0.0);
        assert_eq!(game.phase, Phase::Playing);
    }

    #[test]
    fn falling_past_the_floor_ends_the_game() {
        let mut game = playing(game());
        game.bird.y = game.floor_y();
        game.bird.velocity = 0.0;
        game.tick(FRAME);
        assert_eq!(game.bird.y, game.floor_y());
        assert_eq!(game.phase, Phase::GameOver);
        assert_eq!(game.take_events(), vec![GameEvent::Crashed(CrashKind::Floor)]);
    }

    #[test]
    fn bird_inside_the_gap_survives() {
        let mut game = playing(game());
        let speed = game.config.pipe_speed;
        game.bird.y = 300.0;
        game.pipes.push(pipe(game.bird.x - 10.0 + speed, 250.0, 400.0));
        game.tick(FRAME);
        assert_eq!(game.phase, Phase::Playing);
    }

    #[test]
    fn crash_takes_precedence_over_scoring() {
        let mut game = playing(game());
        let speed = game.config.pipe_speed;
        let width = game.config.pipe_width;
        game.bird.y = 300.0;
        // Trailing edge falls just behind the bird this tick.
        game.pipes.push(pipe(game.bird.x - width + 1.0, 250.0, 400.0));
        // Overlaps the bird with the gap well below it.
        game.pipes.push(pipe(game.bird.x + speed, 450.0, 600.0));
        game.tick(FRAME);

        assert_eq!(game.phase, Phase::GameOver);
        assert_eq!(game.score, 0);
        assert!(!game.pipes[0].passed);
        assert_eq!(game.take_events(), vec![GameEvent::Crashed(CrashKind::Pipe)]);
    }

    #[test]
    fn each_pipe_scores_once() {
        let mut game = playing(game());
        let width = game.config.pipe_width;
        game.bird.y = 300.0;
        game.pipes.push(pipe(game.bird.x - width + 1.0, 250.0, 400.0));

        game.tick(FRAME);
        assert_eq!(game.score, 1);
        assert!(game.pipes[0].passed);
        for _ in 0..5 {
            game.tick(FRAME);
        }
        assert_eq!(game.score, 1);
        assert_eq!(game.phase, Phase::Playing);
    }

    #[test]
    fn pipes_spawn_at_the_right_edge_with_level_spacing() {
        let mut game = playing(game());
        game.tick(FRAME);
        assert_eq!(game.pipes.len(), 1);
        let first = game.pipes[0];
        assert_eq!(first.x, 800.0);
        assert_eq!(first.gap_end - first.gap_start, game.config.pipe_gap);
        // Fixed(0.5) lands in the middle of the range and palette.
        assert_eq!(first.gap_start, 225.0);
        assert_eq!(first.style, PipeStyle::Yellow);

        assert_eq!(Level::One.spawn_distance(&game.config), 480.0);
        assert_eq!(Level::Two.spawn_distance(&game.config), 384.0);
    }

    #[test]
    fn level_two_widens_the_gap_range() {
        let mut config = GameConfig::for_playfield(800.0, 600.0);
        config.pipe_gap = 100.0;
        assert_eq!(Level::One.gap_start_range(&config, 600.0), (100.0, 400.0));
        assert_eq!(Level::Two.gap_start_range(&config, 600.0), (100.0, 460.0));

        config.pipe_gap = 50.0;
        assert_eq!(Level::Two.gap_start_range(&config, 600.0), (50.0, 550.0));
    }

    #[test]
    fn offscreen_pipes_are_removed_after_crossing_the_left_edge() {
        let mut config = GameConfig::for_playfield(800.0, 600.0);
        config.pipe_speed = 10.0;
        config.spawn_distance = 10_000.0;
        let mut game = Game::new(config, 800.0, 600.0, Box::new(Fixed(0.5)));
        game.handle(Command::Confirm);
        game.handle(Command::DevModeToggle);
        game.tick(3000.0);
        assert_eq!(game.phase, Phase::Playing);

        game.tick(FRAME);
        assert_eq!(game.pipes[0].x, 800.0);

        // (800 + 90) / 10 ticks until the trailing edge reaches x = 0.
        for _ in 0..88 {
            game.tick(FRAME);
        }
        assert_eq!(game.pipes.len(), 1);
        assert_eq!(game.pipes[0].x, -80.0);

        game.tick(FRAME);
        assert_eq!(game.pipes.len(), 1);
        assert_eq!(game.pipes[0].x, 800.0, "old pipe gone, fresh one spawned");
    }

    #[test]
    fn dev_mode_only_toggles_before_play_and_steers_directly() {
        let mut game = game();
        game.handle(Command::Confirm);
        game.handle(Command::DevModeToggle);
        assert!(game.dev_mode);
        game.tick(3000.0);

        game.handle(Command::DevModeToggle);
        assert!(game.dev_mode, "no toggling while playing");

        let start = game.bird;
        game.tick(FRAME);
        assert_eq!(game.bird, start, "no gravity in dev mode");

        game.handle(Command::Flap);
        assert_eq!(game.bird.velocity, 0.0);

        game.handle(Command::DevUp);
        assert_eq!(game.bird.y, start.y - 20.0);
        for _ in 0..100 {
            game.handle(Command::DevDown);
        }
        assert_eq!(game.bird.y, game.floor_y());
        game.tick(FRAME);
        assert_eq!(game.phase, Phase::Playing);
    }

    #[test]
    fn restart_keeps_the_level_and_clears_score_and_dev_mode() {
        let mut game = game();
        game.handle(Command::SelectDown);
        game.handle(Command::Confirm);
        game.handle(Command::DevModeToggle);
        game.tick(3000.0);
        game.score = 4;
        game.phase = Phase::GameOver;

        game.handle(Command::Flap);
        assert_eq!(game.level(), Level::Two);
        assert_eq!(game.score, 0);
        assert!(!game.dev_mode);
        assert!(matches!(game.phase, Phase::Countdown { .. }));
    }

    #[test]
    fn cancel_returns_to_title_from_any_game_phase() {
        let phases = [
            Phase::Countdown { remaining_ms: 10.0 },
            Phase::Playing,
            Phase::GameOver,
            Phase::LevelComplete(Transition::fade_out()),
            Phase::Won(Transition::fade_out()),
        ];
        for phase in phases {
            let mut game = playing(game());
            game.score = 7;
            game.phase = phase;
            game.handle(Command::Cancel);
            assert_eq!(game.phase, Phase::Splash { selected: 0 });
            assert_eq!(game.score, 0);
            assert!(game.pipes.is_empty());
        }
    }

    #[test]
    fn level_one_threshold_leads_to_level_two_countdown() {
        let mut game = playing(game());
        let width = game.config.pipe_width;
        game.score = 9;
        game.bird.y = 300.0;
        game.pipes.push(pipe(game.bird.x - width + 1.0, 250.0, 400.0));
        game.tick(FRAME);

        assert!(matches!(game.phase, Phase::LevelComplete(_)));
        assert_eq!(game.level(), Level::Two);
        assert!(game.pipes.is_empty());
        assert_eq!(game.score, 10);

        let mut saw_celebration = false;
        for _ in 0..1000 {
            if matches!(game.phase, Phase::Countdown { .. }) {
                break;
            }
            saw_celebration |= game.is_celebrating();
            game.tick(FRAME);
        }
        assert!(saw_celebration);
        assert!(matches!(game.phase, Phase::Countdown { .. }));
        assert_eq!(game.score, 10);

        while game.phase != Phase::Playing {
            game.tick(FRAME);
        }
        assert_eq!(game.level(), Level::Two);
        assert_eq!(game.score, 10);
    }

    #[test]
    fn winning_returns_to_title_with_score_reset() {
        let mut game = game();
        game.handle(Command::SelectDown);
        game.handle(Command::Confirm);
        game.tick(3000.0);
        let width = game.config.pipe_width;
        game.score = 19;
        game.bird.y = 300.0;
        game.pipes.push(pipe(game.bird.x - width + 1.0, 250.0, 400.0));
        game.tick(FRAME);
        assert!(matches!(game.phase, Phase::Won(_)));
        assert_eq!(game.score, 20);

        let mut ticks = 0;
        while !game.in_menu() {
            game.tick(FRAME);
            ticks += 1;
            assert!(ticks < 1000);
        }
        assert_eq!(game.score, 0);
        assert!(game.take_events().contains(&GameEvent::ReturnedToTitle));
    }

    #[test]
    fn fade_in_carries_the_next_countdown() {
        let mut game = game();
        game.phase = Phase::LevelComplete(Transition {
            stage: TransitionStage::Celebrate,
            alpha: 1.0,
            celebrate_remaining_ms: 10.0,
            countdown_remaining_ms: 0.0,
        });
        game.tick(FRAME);
        assert_eq!(game.countdown_seconds_left(), Some(3));
        assert_eq!(game.fade_alpha(), 1.0);
        game.tick(FRAME);
        assert!(game.fade_alpha() < 1.0);
    }

    #[test]
    fn animation_pauses_while_celebrating() {
        let mut game = game();
        game.tick(150.0);
        assert_eq!(game.bird_frame, 1);
        game.phase = Phase::Won(Transition {
            stage: TransitionStage::Celebrate,
            alpha: 1.0,
            celebrate_remaining_ms: 10_000.0,
            countdown_remaining_ms: 0.0,
        });
        game.tick(150.0);
        assert_eq!(game.bird_frame, 1);
    }

    #[test]
    fn bird_tilt_is_clamped() {
        let mut game = game();
        game.bird.velocity = 40.0;
        assert_eq!(game.bird_tilt(), 0.5);
        game.bird.velocity = -8.0;
        assert!((game.bird_tilt() + 0.5).abs() < 1e-12);
        game.bird.velocity = 2.0;
        assert!((game.bird_tilt() - 0.2).abs() < 1e-12);
    }
}
