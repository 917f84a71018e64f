use core::fmt;

use crate::path::{Path, TraversalPolicy, DEFAULT_PATH_CAPACITY};
use crate::{Agent, Arena, Vector2D};

/// Behavior the controlled agent runs on a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Seek,
    Flee,
    Pursuit,
    Evade,
    Arrival,
    FollowPath(TraversalPolicy),
}

impl Mode {
    pub const ALL: [Mode; 8] = [
        Mode::Seek,
        Mode::Flee,
        Mode::Pursuit,
        Mode::Evade,
        Mode::Arrival,
        Mode::FollowPath(TraversalPolicy::Circuit),
        Mode::FollowPath(TraversalPolicy::OneWay),
        Mode::FollowPath(TraversalPolicy::TwoWay),
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Mode::Seek => "seek",
            Mode::Flee => "flee",
            Mode::Pursuit => "pursuit",
            Mode::Evade => "evade",
            Mode::Arrival => "arrival",
            Mode::FollowPath(TraversalPolicy::Circuit) => "circuit",
            Mode::FollowPath(TraversalPolicy::OneWay) => "oneway",
            Mode::FollowPath(TraversalPolicy::TwoWay) => "twoway",
        }
    }

    pub fn traversal(&self) -> Option<TraversalPolicy> {
        match self {
            Mode::FollowPath(policy) => Some(*policy),
            _ => None,
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What happened during a single [`Scene::step`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepReport {
    pub tick: u64,
    pub mode: Mode,
    /// Desired velocity produced by the behavior that ran.
    pub desired: Vector2D,
    /// Set when the path cursor moved to another waypoint this tick.
    pub advanced: bool,
    /// Waypoint steered to, for path-following modes.
    pub waypoint: Option<Vector2D>,
}

/// The controlled agent, the draggable target and the path, stepped together once per tick.
#[derive(Debug, Clone)]
pub struct Scene<const N: usize = DEFAULT_PATH_CAPACITY> {
    pub agent: Agent,
    pub target: Agent,
    pub path: Path<N>,
    pub arena: Arena,
    /// Distance to the current waypoint below which the cursor advances.
    pub advance_threshold: f32,
    pending_drag: Option<Vector2D>,
    tick: u64,
}

impl<const N: usize> Scene<N> {
    pub fn new(agent: Agent, target: Agent, path: Path<N>, arena: Arena) -> Self {
        Self {
            agent,
            target,
            path,
            arena,
            advance_threshold: 10.0,
            pending_drag: None,
            tick: 0,
        }
    }

    pub fn with_advance_threshold(mut self, threshold: f32) -> Self {
        self.advance_threshold = threshold;
        self
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Move the target to `position` at the start of the next step.
    ///
    /// The displacement becomes the target's velocity for that tick, which is what
    /// pursuit and evade extrapolate from. Without a drag the target is at rest.
    pub fn drag_target(&mut self, position: Vector2D) {
        self.pending_drag = Some(position);
    }

    pub fn step(&mut self, mode: Mode) -> StepReport {
        match self.pending_drag.take() {
            Some(position) => {
                self.target.velocity = position - self.target.position;
                self.target.position = position;
            }
            None => self.target.velocity = Vector2D::zero(),
        }

        let target = self.target.position;
        let target_velocity = self.target.velocity;
        let mut advanced = false;
        let mut waypoint = None;

        let desired = match mode {
            Mode::Seek => self.agent.seek(target),
            Mode::Flee => self.agent.flee(target),
            Mode::Pursuit => self.agent.pursuit(target, target_velocity),
            Mode::Evade => self.agent.evade(target, target_velocity),
            Mode::Arrival => self.agent.arrival(target),
            Mode::FollowPath(policy) => {
                if self.agent.position.distance(&self.path.get_next_point())
                    < self.advance_threshold
                {
                    let before = self.path.current_index();
                    advanced = self.path.advance(policy) != before;
                }
                let next = self.path.get_next_point();
                waypoint = Some(next);
                self.agent.arrival(next)
            }
        };

        self.agent.update(&self.arena);
        self.tick += 1;

        StepReport {
            tick: self.tick,
            mode,
            desired,
            advanced,
            waypoint,
        }
    }
}
