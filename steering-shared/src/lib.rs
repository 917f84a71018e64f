use serde::{Deserialize, Serialize};

/// Represents a 2D position (or velocity) in arena coordinates
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Calculate distance to another position
    pub fn distance_to(&self, other: &Position) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Behavior selection as it appears in settings files and snapshots
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ModeName {
    #[default]
    Seek,
    Flee,
    Pursuit,
    Evade,
    Arrival,
    Circuit,
    Oneway,
    Twoway,
}

impl ModeName {
    pub const ALL: [ModeName; 8] = [
        ModeName::Seek,
        ModeName::Flee,
        ModeName::Pursuit,
        ModeName::Evade,
        ModeName::Arrival,
        ModeName::Circuit,
        ModeName::Oneway,
        ModeName::Twoway,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ModeName::Seek => "seek",
            ModeName::Flee => "flee",
            ModeName::Pursuit => "pursuit",
            ModeName::Evade => "evade",
            ModeName::Arrival => "arrival",
            ModeName::Circuit => "circuit",
            ModeName::Oneway => "oneway",
            ModeName::Twoway => "twoway",
        }
    }

    pub fn is_path_following(&self) -> bool {
        matches!(self, ModeName::Circuit | ModeName::Oneway | ModeName::Twoway)
    }
}

impl std::fmt::Display for ModeName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ModeName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        ModeName::ALL
            .iter()
            .copied()
            .find(|mode| mode.as_str() == lowered)
            .ok_or_else(|| {
                let known: Vec<&str> = ModeName::ALL.iter().map(|m| m.as_str()).collect();
                format!("unknown mode '{}', expected one of: {}", s, known.join(", "))
            })
    }
}

/// How steering output is applied to an agent's velocity
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum PolicyName {
    Direct,
    #[default]
    Force,
}

impl std::str::FromStr for PolicyName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "direct" => Ok(PolicyName::Direct),
            "force" => Ok(PolicyName::Force),
            other => Err(format!("unknown policy '{}', expected direct or force", other)),
        }
    }
}

/// Scripted mouse drag: the target jumps to `position` on `tick`.
/// Serialized flat as `{"tick": 5, "x": 10.0, "y": 20.0}`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct DragEvent {
    pub tick: u64,
    #[serde(flatten)]
    pub position: Position,
}

/// Scripted button press: the behavior switches to `mode` on `tick`
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ModeChange {
    pub tick: u64,
    pub mode: ModeName,
}

/// Simulation configuration, loadable from JSON. Missing fields fall back to defaults.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SimSettings {
    pub width: f32,
    pub height: f32,
    pub radius: f32,
    pub max_speed: f32,
    pub max_force: f32,
    pub mass: f32,
    pub policy: PolicyName,
    pub deceleration_radius: f32,
    pub lookahead_ticks: f32,
    pub advance_threshold: f32,
    pub agent_start: Position,
    pub target_start: Position,
    pub waypoints: Vec<Position>,
    pub mode: ModeName,
    pub ticks: u64,
    pub drags: Vec<DragEvent>,
    pub mode_changes: Vec<ModeChange>,
}

impl Default for SimSettings {
    fn default() -> Self {
        Self {
            width: 1000.0,
            height: 800.0,
            radius: 10.0,
            max_speed: 2.0,
            max_force: 0.1,
            mass: 1.0,
            policy: PolicyName::Force,
            deceleration_radius: 100.0,
            lookahead_ticks: 20.0,
            advance_threshold: 10.0,
            agent_start: Position::new(250.0, 200.0),
            target_start: Position::new(500.0, 400.0),
            waypoints: vec![
                Position::new(100.0, 100.0),
                Position::new(700.0, 100.0),
                Position::new(700.0, 500.0),
                Position::new(100.0, 500.0),
            ],
            mode: ModeName::Seek,
            ticks: 600,
            drags: Vec::new(),
            mode_changes: Vec::new(),
        }
    }
}

impl SimSettings {
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

/// Kinematic state of one agent at the end of a tick
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct AgentSnapshot {
    pub position: Position,
    pub velocity: Position,
}

/// Everything a renderer needs to draw one frame
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FrameSnapshot {
    pub tick: u64,
    pub mode: ModeName,
    pub agent: AgentSnapshot,
    pub target: AgentSnapshot,
    /// Current waypoint, present only while following the path.
    pub waypoint: Option<Position>,
    pub advanced: bool,
}

/// Summary written when a run ends
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunSummary {
    pub ticks: u64,
    pub final_mode: ModeName,
    pub agent_position: Position,
    pub waypoint_index: usize,
    pub waypoints_reached: u64,
}
