//! Headless simulation loop around the steering core.
//!
//! This is the collaborator that owns the agents and the path: it turns scripted
//! input into drags and mode selections, steps the scene once per tick and
//! produces snapshots a renderer could draw.

use anyhow::{bail, Context, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::io::Write;
use std::path::Path as FsPath;
use std::time::{Duration, Instant};
use steering_core::{
    Agent, AgentConfig, Arena, IntegrationPolicy, Mode, Path, Scene, TraversalPolicy, Vector2D,
    DEFAULT_PATH_CAPACITY,
};
use steering_shared::{
    AgentSnapshot, FrameSnapshot, ModeName, PolicyName, Position, RunSummary, SimSettings,
};

pub mod script;
pub use script::{InputScript, RandomWalk, TickInput};

/// Nominal frame period of the interactive loop (60 Hz).
pub const FRAME_PERIOD: Duration = Duration::from_micros(16_667);

pub fn load_settings(path: &FsPath) -> Result<SimSettings> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read settings file {}", path.display()))?;
    let settings = SimSettings::from_json(&json)
        .with_context(|| format!("Failed to parse settings file {}", path.display()))?;
    Ok(settings)
}

/// Reject settings the steering math cannot work with.
pub fn validate(settings: &SimSettings) -> Result<()> {
    let positive = [
        ("width", settings.width),
        ("height", settings.height),
        ("max_speed", settings.max_speed),
        ("max_force", settings.max_force),
        ("mass", settings.mass),
        ("deceleration_radius", settings.deceleration_radius),
    ];
    for (name, value) in positive {
        if !value.is_finite() || value <= 0.0 {
            bail!("{} must be a positive number, got {}", name, value);
        }
    }

    let non_negative = [
        ("radius", settings.radius),
        ("lookahead_ticks", settings.lookahead_ticks),
        ("advance_threshold", settings.advance_threshold),
    ];
    for (name, value) in non_negative {
        if !value.is_finite() || value < 0.0 {
            bail!("{} must not be negative, got {}", name, value);
        }
    }

    if settings.radius * 2.0 > settings.width.min(settings.height) {
        bail!(
            "Agent radius {} does not fit in a {}x{} arena",
            settings.radius,
            settings.width,
            settings.height
        );
    }

    if settings.waypoints.len() < 2 {
        bail!(
            "The path needs at least 2 waypoints, got {}",
            settings.waypoints.len()
        );
    }

    if settings.waypoints.len() > DEFAULT_PATH_CAPACITY {
        bail!(
            "The path holds at most {} waypoints, got {}",
            DEFAULT_PATH_CAPACITY,
            settings.waypoints.len()
        );
    }

    Ok(())
}

pub fn to_mode(name: ModeName) -> Mode {
    match name {
        ModeName::Seek => Mode::Seek,
        ModeName::Flee => Mode::Flee,
        ModeName::Pursuit => Mode::Pursuit,
        ModeName::Evade => Mode::Evade,
        ModeName::Arrival => Mode::Arrival,
        ModeName::Circuit => Mode::FollowPath(TraversalPolicy::Circuit),
        ModeName::Oneway => Mode::FollowPath(TraversalPolicy::OneWay),
        ModeName::Twoway => Mode::FollowPath(TraversalPolicy::TwoWay),
    }
}

pub fn to_mode_name(mode: Mode) -> ModeName {
    match mode {
        Mode::Seek => ModeName::Seek,
        Mode::Flee => ModeName::Flee,
        Mode::Pursuit => ModeName::Pursuit,
        Mode::Evade => ModeName::Evade,
        Mode::Arrival => ModeName::Arrival,
        Mode::FollowPath(TraversalPolicy::Circuit) => ModeName::Circuit,
        Mode::FollowPath(TraversalPolicy::OneWay) => ModeName::Oneway,
        Mode::FollowPath(TraversalPolicy::TwoWay) => ModeName::Twoway,
    }
}

fn to_vector(position: Position) -> Vector2D {
    Vector2D::new(position.x, position.y)
}

fn to_position(vector: Vector2D) -> Position {
    Position::new(vector.x, vector.y)
}

fn snapshot(agent: &Agent) -> AgentSnapshot {
    AgentSnapshot {
        position: to_position(agent.position),
        velocity: to_position(agent.velocity),
    }
}

pub fn agent_config(settings: &SimSettings) -> AgentConfig {
    AgentConfig {
        max_speed: settings.max_speed,
        max_force: settings.max_force,
        mass: settings.mass,
        radius: settings.radius,
        deceleration_radius: settings.deceleration_radius,
        lookahead_ticks: settings.lookahead_ticks,
        policy: match settings.policy {
            PolicyName::Direct => IntegrationPolicy::Direct,
            PolicyName::Force => IntegrationPolicy::Force,
        },
    }
}

pub fn build_scene(settings: &SimSettings) -> Result<Scene> {
    validate(settings)?;

    let config = agent_config(settings);
    let waypoints: Vec<Vector2D> = settings.waypoints.iter().copied().map(to_vector).collect();
    let path = Path::new(&waypoints).context("Invalid waypoint list")?;

    let scene = Scene::new(
        Agent::new(to_vector(settings.agent_start), config),
        Agent::new(to_vector(settings.target_start), config),
        path,
        Arena::new(settings.width, settings.height),
    )
    .with_advance_threshold(settings.advance_threshold);

    Ok(scene)
}

/// A scene plus the input that drives it
pub struct Simulation {
    scene: Scene,
    mode: Mode,
    script: InputScript,
    random_walk: Option<RandomWalk>,
    waypoints_reached: u64,
}

impl Simulation {
    pub fn new(settings: &SimSettings) -> Result<Self> {
        let scene = build_scene(settings)?;
        log::debug!(
            "Scene ready: {}x{} arena, {} waypoints, {:?} policy",
            settings.width,
            settings.height,
            settings.waypoints.len(),
            settings.policy
        );

        Ok(Self {
            scene,
            mode: to_mode(settings.mode),
            script: InputScript::new(settings.drags.clone(), settings.mode_changes.clone()),
            random_walk: None,
            waypoints_reached: 0,
        })
    }

    /// Drag the target along a seeded random walk instead of the scripted drags.
    pub fn with_random_walk(mut self, seed: u64) -> Self {
        let start = to_position(self.scene.target.position);
        let arena = self.scene.arena;
        self.random_walk = Some(RandomWalk::new(seed, start, arena.width, arena.height));
        self
    }

    /// Spawn the target at a random spot and then drag it along a random walk,
    /// both drawn from one generator seeded with `seed`.
    pub fn with_random_target(mut self, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let arena = self.scene.arena;
        let config = self.scene.target.config;
        self.scene.target = Agent::random_with(&mut rng, &arena, config);

        let start = to_position(self.scene.target.position);
        self.random_walk = Some(RandomWalk::from_rng(rng, start, arena.width, arena.height));
        self
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: Mode) {
        if mode != self.mode {
            log::info!("Behavior changed: {} -> {}", self.mode, mode);
            self.mode = mode;
        }
    }

    pub fn step(&mut self) -> FrameSnapshot {
        let input = self.script.poll(self.scene.tick());
        if let Some(name) = input.mode {
            self.set_mode(to_mode(name));
        }

        let drag = match self.random_walk.as_mut() {
            Some(walk) => Some(walk.next_position()),
            None => input.drag,
        };
        if let Some(position) = drag {
            self.scene.drag_target(to_vector(position));
        }

        let report = self.scene.step(self.mode);
        if report.advanced {
            self.waypoints_reached += 1;
            log::debug!(
                "Tick {}: advanced to waypoint {}",
                report.tick,
                self.scene.path.current_index()
            );
        }

        FrameSnapshot {
            tick: report.tick,
            mode: to_mode_name(report.mode),
            agent: snapshot(&self.scene.agent),
            target: snapshot(&self.scene.target),
            waypoint: report.waypoint.map(to_position),
            advanced: report.advanced,
        }
    }

    /// Step `ticks` times, writing one JSON line per frame to `trace` when given.
    /// In realtime mode the loop is paced at [`FRAME_PERIOD`].
    pub fn run<W: Write>(
        &mut self,
        ticks: u64,
        mut trace: Option<&mut W>,
        realtime: bool,
    ) -> Result<RunSummary> {
        log::info!("Running {} ticks in {} mode", ticks, self.mode);

        let mut frame_count = 0u32;
        let mut last_fps_time = Instant::now();

        for _ in 0..ticks {
            let frame_start = Instant::now();
            let frame = self.step();

            if let Some(out) = trace.as_mut() {
                serde_json::to_writer(&mut **out, &frame).context("Failed to write frame")?;
                out.write_all(b"\n").context("Failed to write frame")?;
            }

            if realtime {
                if let Some(rest) = FRAME_PERIOD.checked_sub(frame_start.elapsed()) {
                    std::thread::sleep(rest);
                }

                frame_count += 1;
                if last_fps_time.elapsed().as_secs() >= 1 {
                    let fps = frame_count as f64 / last_fps_time.elapsed().as_secs_f64();
                    log::debug!("FPS: {:.1}", fps);
                    frame_count = 0;
                    last_fps_time = Instant::now();
                }
            }
        }

        if let Some(out) = trace.as_mut() {
            out.flush().context("Failed to flush trace output")?;
        }

        if let Some(policy) = self.mode.traversal() {
            if self.scene.path.is_finished(policy) {
                log::info!("Agent parked at the final waypoint");
            }
        }

        Ok(self.summary())
    }

    pub fn summary(&self) -> RunSummary {
        RunSummary {
            ticks: self.scene.tick(),
            final_mode: to_mode_name(self.mode),
            agent_position: to_position(self.scene.agent.position),
            waypoint_index: self.scene.path.current_index(),
            waypoints_reached: self.waypoints_reached,
        }
    }
}
