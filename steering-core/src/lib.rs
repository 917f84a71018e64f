#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "std")]
use rand::Rng;

pub mod path;
pub mod scene;

pub use path::{Direction, Path, PathError, TraversalPolicy, DEFAULT_PATH_CAPACITY};
pub use scene::{Mode, Scene, StepReport};

/// A 2D vector used for position, velocity and force
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vector2D {
    pub x: f32,
    pub y: f32,
}

impl Vector2D {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn zero() -> Self {
        Self { x: 0.0, y: 0.0 }
    }

    pub fn magnitude(&self) -> f32 {
        #[cfg(feature = "std")]
        {
            (self.x * self.x + self.y * self.y).sqrt()
        }
        #[cfg(not(feature = "std"))]
        {
            libm::sqrtf(self.x * self.x + self.y * self.y)
        }
    }

    /// Unit vector with the same heading. The zero vector normalizes to itself.
    pub fn normalize(&self) -> Self {
        let mag = self.magnitude();
        if mag > 0.0 {
            Self {
                x: self.x / mag,
                y: self.y / mag,
            }
        } else {
            Self::zero()
        }
    }

    /// Clamp the length of the vector to `max`, keeping its heading.
    pub fn limit(&self, max: f32) -> Self {
        let mag = self.magnitude();
        if mag > max {
            self.normalize() * max
        } else {
            *self
        }
    }

    pub fn distance(&self, other: &Vector2D) -> f32 {
        (*self - *other).magnitude()
    }
}

impl core::ops::Add for Vector2D {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
        }
    }
}

impl core::ops::Sub for Vector2D {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self {
            x: self.x - other.x,
            y: self.y - other.y,
        }
    }
}

impl core::ops::Mul<f32> for Vector2D {
    type Output = Self;

    fn mul(self, scalar: f32) -> Self {
        Self {
            x: self.x * scalar,
            y: self.y * scalar,
        }
    }
}

impl core::ops::Div<f32> for Vector2D {
    type Output = Self;

    fn div(self, scalar: f32) -> Self {
        Self {
            x: self.x / scalar,
            y: self.y / scalar,
        }
    }
}

impl core::ops::Neg for Vector2D {
    type Output = Self;

    fn neg(self) -> Self {
        Self {
            x: -self.x,
            y: -self.y,
        }
    }
}

impl core::ops::AddAssign for Vector2D {
    fn add_assign(&mut self, other: Self) {
        self.x += other.x;
        self.y += other.y;
    }
}

/// How a behavior's output is turned into motion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IntegrationPolicy {
    /// The desired velocity replaces the current one outright.
    Direct,
    /// The desired velocity is reached through a bounded force, integrated on update.
    #[default]
    Force,
}

/// Rectangular region the agents live in, with the origin at the top-left corner
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Arena {
    pub width: f32,
    pub height: f32,
}

impl Arena {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Clamp a position so that a disc of `radius` around it stays inside the arena.
    pub fn clamp(&self, position: Vector2D, radius: f32) -> Vector2D {
        Vector2D {
            x: radius.max((self.width - radius).min(position.x)),
            y: radius.max((self.height - radius).min(position.y)),
        }
    }
}

impl Default for Arena {
    fn default() -> Self {
        Self {
            width: 1000.0,
            height: 800.0,
        }
    }
}

/// Tuning for a single agent
#[derive(Debug, Clone, Copy)]
pub struct AgentConfig {
    pub max_speed: f32,
    pub max_force: f32,
    pub mass: f32,
    pub radius: f32,
    /// Distance inside which arrival ramps the speed down linearly.
    pub deceleration_radius: f32,
    /// How many ticks ahead pursuit and evade extrapolate the target.
    pub lookahead_ticks: f32,
    pub policy: IntegrationPolicy,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_speed: 2.0,
            max_force: 0.1,
            mass: 1.0,
            radius: 10.0,
            deceleration_radius: 100.0,
            lookahead_ticks: 20.0,
            policy: IntegrationPolicy::Force,
        }
    }
}

/// A point-mass agent driven by steering behaviors.
///
/// Each tick expects exactly one behavior call followed by one [`Agent::update`].
/// Under [`IntegrationPolicy::Force`] repeated behavior calls within the same
/// tick keep accumulating into `acceleration` until the next update.
#[derive(Debug, Clone)]
pub struct Agent {
    pub position: Vector2D,
    pub velocity: Vector2D,
    pub acceleration: Vector2D,
    pub config: AgentConfig,
}

impl Agent {
    pub fn new(position: Vector2D, config: AgentConfig) -> Self {
        Self {
            position,
            velocity: Vector2D::zero(),
            acceleration: Vector2D::zero(),
            config,
        }
    }

    /// Spawn at rest somewhere inside the arena, away from the walls.
    #[cfg(feature = "std")]
    pub fn random(arena: &Arena, config: AgentConfig) -> Self {
        Self::random_with(&mut rand::thread_rng(), arena, config)
    }

    /// Like [`Agent::random`], drawing the spawn point from a caller-supplied generator.
    #[cfg(feature = "std")]
    pub fn random_with<R: Rng>(rng: &mut R, arena: &Arena, config: AgentConfig) -> Self {
        let x = gen_within(rng, config.radius, arena.width - config.radius);
        let y = gen_within(rng, config.radius, arena.height - config.radius);
        Self::new(Vector2D::new(x, y), config)
    }

    /// F = ma: the force is divided by the mass before it is accumulated.
    pub fn apply_force(&mut self, force: Vector2D) {
        self.acceleration += force / self.config.mass;
    }

    pub fn seek(&mut self, target: Vector2D) -> Vector2D {
        let desired = behavior::seek(self, target);
        self.steer(desired);
        desired
    }

    pub fn flee(&mut self, target: Vector2D) -> Vector2D {
        let desired = behavior::flee(self, target);
        self.steer(desired);
        desired
    }

    pub fn pursuit(&mut self, target: Vector2D, target_velocity: Vector2D) -> Vector2D {
        let future = behavior::predict(target, target_velocity, self.config.lookahead_ticks);
        self.seek(future)
    }

    pub fn evade(&mut self, target: Vector2D, target_velocity: Vector2D) -> Vector2D {
        let future = behavior::predict(target, target_velocity, self.config.lookahead_ticks);
        self.flee(future)
    }

    pub fn arrival(&mut self, target: Vector2D) -> Vector2D {
        let desired = behavior::arrival(self, target);
        self.steer(desired);
        desired
    }

    fn steer(&mut self, desired: Vector2D) {
        match self.config.policy {
            IntegrationPolicy::Direct => {
                self.velocity = desired.limit(self.config.max_speed);
            }
            IntegrationPolicy::Force => {
                let steering = behavior::steering(desired, self.velocity, self.config.max_force);
                self.apply_force(steering);
            }
        }
    }

    pub fn update(&mut self, arena: &Arena) {
        if self.config.policy == IntegrationPolicy::Force {
            self.velocity += self.acceleration;
            self.velocity = self.velocity.limit(self.config.max_speed);
            self.acceleration = Vector2D::zero();
        }
        self.position += self.velocity;
        self.position = arena.clamp(self.position, self.config.radius);
    }

    pub fn speed(&self) -> f32 {
        self.velocity.magnitude()
    }
}

#[cfg(feature = "std")]
fn gen_within<R: Rng>(rng: &mut R, low: f32, high: f32) -> f32 {
    if high > low {
        rng.gen_range(low..=high)
    } else {
        low
    }
}

/// Desired-velocity computations shared by both integration policies
pub mod behavior {
    use super::*;

    pub fn seek(agent: &Agent, target: Vector2D) -> Vector2D {
        let desired = target - agent.position;
        desired.normalize() * agent.config.max_speed
    }

    pub fn flee(agent: &Agent, target: Vector2D) -> Vector2D {
        let desired = agent.position - target;
        desired.normalize() * agent.config.max_speed
    }

    /// Linear extrapolation of a moving target a fixed number of ticks ahead.
    pub fn predict(target: Vector2D, target_velocity: Vector2D, ticks: f32) -> Vector2D {
        target + target_velocity * ticks
    }

    pub fn arrival(agent: &Agent, target: Vector2D) -> Vector2D {
        let offset = target - agent.position;
        let distance = offset.magnitude();
        let slowing = agent.config.deceleration_radius;
        let speed = if distance < slowing {
            agent.config.max_speed * (distance / slowing)
        } else {
            agent.config.max_speed
        };
        offset.normalize() * speed
    }

    /// Steering force towards `desired`, capped at `max_force`.
    pub fn steering(desired: Vector2D, velocity: Vector2D, max_force: f32) -> Vector2D {
        (desired - velocity).limit(max_force)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn direct() -> AgentConfig {
        AgentConfig {
            policy: IntegrationPolicy::Direct,
            ..AgentConfig::default()
        }
    }

    #[test]
    fn test_vector2d_magnitude() {
        let v = Vector2D::new(3.0, 4.0);
        assert_eq!(v.magnitude(), 5.0);
    }

    #[test]
    fn test_vector2d_normalize() {
        let v = Vector2D::new(3.0, 4.0);
        let normalized = v.normalize();
        assert_relative_eq!(normalized.magnitude(), 1.0, epsilon = 1e-6);
        assert_relative_eq!(normalized.x, 0.6, epsilon = 1e-6);
    }

    #[test]
    fn test_normalize_zero_is_zero() {
        assert_eq!(Vector2D::zero().normalize(), Vector2D::zero());
    }

    #[test]
    fn test_vector2d_operations() {
        let v1 = Vector2D::new(1.0, 2.0);
        let v2 = Vector2D::new(3.0, 4.0);

        assert_eq!(v1 + v2, Vector2D::new(4.0, 6.0));
        assert_eq!(v2 - v1, Vector2D::new(2.0, 2.0));
        assert_eq!(v1 * 2.0, Vector2D::new(2.0, 4.0));
        assert_eq!(v2 / 2.0, Vector2D::new(1.5, 2.0));
        assert_eq!(-v1, Vector2D::new(-1.0, -2.0));
        assert_eq!(v1.distance(&v2), 8.0f32.sqrt());
    }

    #[test]
    fn test_limit_keeps_short_vectors() {
        let v = Vector2D::new(0.3, 0.4);
        assert_eq!(v.limit(1.0), v);
        assert_relative_eq!(Vector2D::new(30.0, 40.0).limit(2.0).magnitude(), 2.0, epsilon = 1e-5);
    }

    #[test]
    fn test_arena_clamp() {
        let arena = Arena::new(100.0, 50.0);
        let clamped = arena.clamp(Vector2D::new(-5.0, 70.0), 10.0);
        assert_eq!(clamped, Vector2D::new(10.0, 40.0));
    }

    #[test]
    fn test_direct_seek_sets_velocity() {
        let mut agent = Agent::new(Vector2D::new(0.0, 0.0), direct());
        agent.seek(Vector2D::new(10.0, 0.0));
        assert_eq!(agent.velocity, Vector2D::new(2.0, 0.0));
    }

    #[test]
    fn test_seek_at_target_is_still() {
        let mut agent = Agent::new(Vector2D::new(50.0, 50.0), direct());
        let desired = agent.seek(Vector2D::new(50.0, 50.0));
        assert_eq!(desired, Vector2D::zero());
        let desired = agent.flee(Vector2D::new(50.0, 50.0));
        assert_eq!(desired, Vector2D::zero());
    }

    #[test]
    fn test_flee_is_antiparallel_to_seek() {
        let mut agent = Agent::new(Vector2D::new(40.0, 70.0), direct());
        let target = Vector2D::new(120.0, 10.0);
        let seek = agent.seek(target);
        let flee = agent.flee(target);
        assert_eq!(flee, -seek);
    }

    #[test]
    fn test_force_seek_accumulates_bounded_force() {
        let config = AgentConfig {
            mass: 2.0,
            ..AgentConfig::default()
        };
        let mut agent = Agent::new(Vector2D::new(0.0, 0.0), config);
        agent.seek(Vector2D::new(100.0, 0.0));

        // desired (2, 0) is limited to max_force 0.1, then halved by the mass
        assert_relative_eq!(agent.acceleration.x, 0.05, epsilon = 1e-6);
        assert_eq!(agent.velocity, Vector2D::zero());

        agent.update(&Arena::default());
        assert_relative_eq!(agent.velocity.x, 0.05, epsilon = 1e-6);
        assert_eq!(agent.acceleration, Vector2D::zero());
        assert_relative_eq!(agent.position.x, 10.0, epsilon = 1e-6);
    }

    #[test]
    fn test_force_policy_converges_to_max_speed() {
        let mut agent = Agent::new(Vector2D::new(100.0, 400.0), AgentConfig::default());
        let arena = Arena::default();
        for _ in 0..100 {
            agent.seek(Vector2D::new(900.0, 400.0));
            agent.update(&arena);
        }
        assert_relative_eq!(agent.speed(), 2.0, epsilon = 1e-4);
    }

    #[test]
    fn test_pursuit_aims_at_predicted_point() {
        let mut agent = Agent::new(Vector2D::new(100.0, 0.0), direct());
        let future = behavior::predict(Vector2D::zero(), Vector2D::new(1.0, 0.0), 20.0);
        assert_eq!(future, Vector2D::new(20.0, 0.0));

        let desired = agent.pursuit(Vector2D::zero(), Vector2D::new(1.0, 0.0));
        assert_eq!(desired, Vector2D::new(-2.0, 0.0));
    }

    #[test]
    fn test_pursuit_leads_a_crossing_target() {
        let mut agent = Agent::new(Vector2D::new(0.0, 0.0), direct());
        let desired = agent.pursuit(Vector2D::new(100.0, 0.0), Vector2D::new(0.0, 5.0));
        let expected = Vector2D::new(100.0, 100.0).normalize() * 2.0;
        assert_relative_eq!(desired.x, expected.x, epsilon = 1e-6);
        assert_relative_eq!(desired.y, expected.y, epsilon = 1e-6);
    }

    #[test]
    fn test_evade_flees_predicted_point() {
        let mut agent = Agent::new(Vector2D::new(100.0, 0.0), direct());
        // predicted point (140, 0) is past the agent, so evade pushes back towards the origin
        let desired = agent.evade(Vector2D::new(0.0, 0.0), Vector2D::new(7.0, 0.0));
        assert_eq!(desired, Vector2D::new(-2.0, 0.0));
    }

    #[test]
    fn test_arrival_ramps_inside_deceleration_radius() {
        let mut agent = Agent::new(Vector2D::new(0.0, 0.0), direct());
        let desired = agent.arrival(Vector2D::new(0.0, 50.0));
        assert_relative_eq!(desired.magnitude(), 1.0, epsilon = 1e-6);

        let desired = agent.arrival(Vector2D::new(0.0, 250.0));
        assert_relative_eq!(desired.magnitude(), 2.0, epsilon = 1e-6);

        let desired = agent.arrival(Vector2D::new(0.0, 0.0));
        assert_eq!(desired, Vector2D::zero());
    }

    #[test]
    fn test_update_clamps_into_arena() {
        let arena = Arena::new(200.0, 100.0);
        let mut agent = Agent::new(Vector2D::new(185.0, 50.0), direct());
        for _ in 0..20 {
            agent.seek(Vector2D::new(500.0, 50.0));
            agent.update(&arena);
        }
        assert_eq!(agent.position.x, 190.0);
        assert_eq!(agent.position.y, 50.0);
    }

    #[cfg(feature = "std")]
    #[test]
    fn test_random_agent_is_inside_arena() {
        let arena = Arena::new(300.0, 200.0);
        for _ in 0..50 {
            let agent = Agent::random(&arena, AgentConfig::default());
            assert!(agent.position.x >= 10.0 && agent.position.x <= 290.0);
            assert!(agent.position.y >= 10.0 && agent.position.y <= 190.0);
            assert_eq!(agent.velocity, Vector2D::zero());
        }
    }

    #[cfg(feature = "std")]
    #[test]
    fn test_random_with_same_seed_spawns_same_place() {
        use rand::rngs::StdRng;
        use rand::SeedableRng;

        let arena = Arena::default();
        let a = Agent::random_with(&mut StdRng::seed_from_u64(9), &arena, AgentConfig::default());
        let b = Agent::random_with(&mut StdRng::seed_from_u64(9), &arena, AgentConfig::default());
        assert_eq!(a.position, b.position);
        assert!(a.position.x >= 10.0 && a.position.x <= 990.0);
    }
}
