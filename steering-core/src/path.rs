use crate::Vector2D;

/// Waypoint capacity used when a path is declared without an explicit bound.
pub const DEFAULT_PATH_CAPACITY: usize = 32;

/// How the waypoint cursor moves once the current waypoint is reached
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraversalPolicy {
    /// Wrap around to the first waypoint after the last one.
    Circuit,
    /// Stop at the last waypoint.
    OneWay,
    /// Bounce back and forth between the first and last waypoints.
    TwoWay,
}

impl TraversalPolicy {
    pub const ALL: [TraversalPolicy; 3] = [
        TraversalPolicy::Circuit,
        TraversalPolicy::OneWay,
        TraversalPolicy::TwoWay,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

impl Direction {
    pub fn step(&self) -> isize {
        match self {
            Direction::Forward => 1,
            Direction::Backward => -1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
    #[error("a path needs at least 2 waypoints, got {found}")]
    TooFewPoints { found: usize },
    #[error("a path holds at most {capacity} waypoints")]
    Capacity { capacity: usize },
}

/// A fixed polyline with a cursor on the waypoint currently being steered to.
#[derive(Debug, Clone)]
pub struct Path<const N: usize = DEFAULT_PATH_CAPACITY> {
    points: heapless::Vec<Vector2D, N>,
    current_index: usize,
    direction: Direction,
}

impl<const N: usize> Path<N> {
    pub fn new(points: &[Vector2D]) -> Result<Self, PathError> {
        if points.len() < 2 {
            return Err(PathError::TooFewPoints {
                found: points.len(),
            });
        }
        let points =
            heapless::Vec::from_slice(points).map_err(|_| PathError::Capacity { capacity: N })?;

        Ok(Self {
            points,
            current_index: 0,
            direction: Direction::Forward,
        })
    }

    pub fn get_next_point(&self) -> Vector2D {
        self.points[self.current_index]
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn points(&self) -> &[Vector2D] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Move the cursor to the next waypoint according to `policy` and return the new index.
    pub fn advance(&mut self, policy: TraversalPolicy) -> usize {
        let last = self.points.len() - 1;
        let next = self.current_index as isize + self.direction.step();

        self.current_index = match policy {
            TraversalPolicy::Circuit => next.rem_euclid(self.points.len() as isize) as usize,
            TraversalPolicy::OneWay => next.clamp(0, last as isize) as usize,
            TraversalPolicy::TwoWay => {
                if next > last as isize {
                    self.direction = Direction::Backward;
                    last - 1
                } else if next < 0 {
                    self.direction = Direction::Forward;
                    1
                } else {
                    next as usize
                }
            }
        };

        self.current_index
    }

    /// Whether the cursor is parked for good, which only happens on a one-way traversal.
    pub fn is_finished(&self, policy: TraversalPolicy) -> bool {
        policy == TraversalPolicy::OneWay && self.current_index == self.points.len() - 1
    }

    pub fn reset(&mut self) {
        self.current_index = 0;
        self.direction = Direction::Forward;
    }
}
