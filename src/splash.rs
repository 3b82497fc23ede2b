use crate::game::RandomSource;

pub const FLOCK_SIZE: usize = 12;

/// One decorative bird drifting across the title screen.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FlockBird {
    pub x: f64,
    pub y: f64,
    pub speed: f64,
    /// Radians, within ±45°.
    pub rotation: f64,
    pub size: f64,
    pub frame: u32,
    frame_elapsed_ms: f64,
}

pub struct Flock {
    birds: Vec<FlockBird>,
    width: f64,
    height: f64,
    bird_size: f64,
    frames: u32,
    frame_duration_ms: f64,
}

impl Flock {
    pub fn new(
        width: f64,
        height: f64,
        bird_size: f64,
        frames: u32,
        frame_duration_ms: f64,
        rng: &mut dyn RandomSource,
    ) -> Self {
        let mut flock = Self {
            birds: Vec::with_capacity(FLOCK_SIZE),
            width,
            height,
            bird_size,
            frames: frames.max(1),
            frame_duration_ms,
        };
        flock.reset(rng);
        flock
    }

    pub fn birds(&self) -> &[FlockBird] {
        &self.birds
    }

    /// Scatters a fresh flock; called whenever the title screen comes back.
    pub fn reset(&mut self, rng: &mut dyn RandomSource) {
        self.birds.clear();
        for _ in 0..FLOCK_SIZE {
            let x = rng.next_unit() * self.width;
            let y = rng.next_unit() * self.height * 0.8;
            let speed = (rng.next_unit() * 2.0 + 2.0) * (self.width / 1000.0);
            let rotation = (rng.next_unit() - 0.5) * std::f64::consts::FRAC_PI_2;
            let size = self.bird_size * (0.5 + rng.next_unit() * 0.5);
            let frame = ((rng.next_unit() * self.frames as f64) as u32).min(self.frames - 1);
            let frame_elapsed_ms = rng.next_unit() * self.frame_duration_ms;
            self.birds.push(FlockBird {
                x,
                y,
                speed,
                rotation,
                size,
                frame,
                frame_elapsed_ms,
            });
        }
    }

    /// Moves every bird right, wrapping it to just past the left edge at a new height
    /// once it leaves the screen.
    pub fn update(&mut self, dt_ms: f64, rng: &mut dyn RandomSource) {
        for bird in &mut self.birds {
            bird.x += bird.speed;
            if bird.x > self.width + bird.size {
                bird.x = -bird.size;
                bird.y = rng.next_unit() * self.height * 0.8;
            }

            bird.frame_elapsed_ms += dt_ms;
            if bird.frame_elapsed_ms > self.frame_duration_ms {
                bird.frame = (bird.frame + 1) % self.frames;
                bird.frame_elapsed_ms = 0.0;
            }
        }
    }
}
