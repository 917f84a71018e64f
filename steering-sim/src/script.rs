use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use steering_shared::{DragEvent, ModeChange, ModeName, Position};

/// Input that arrives before a given tick, in place of mouse and button events
#[derive(Debug, Default, Clone, PartialEq)]
pub struct TickInput {
    pub drag: Option<Position>,
    pub mode: Option<ModeName>,
}

/// Scheduled drags and mode changes, replayed in tick order.
#[derive(Debug, Default, Clone)]
pub struct InputScript {
    drags: Vec<DragEvent>,
    mode_changes: Vec<ModeChange>,
    next_drag: usize,
    next_mode: usize,
}

impl InputScript {
    pub fn new(mut drags: Vec<DragEvent>, mut mode_changes: Vec<ModeChange>) -> Self {
        drags.sort_by_key(|event| event.tick);
        mode_changes.sort_by_key(|change| change.tick);
        Self {
            drags,
            mode_changes,
            next_drag: 0,
            next_mode: 0,
        }
    }

    /// Collect everything scheduled up to and including `tick`. When several
    /// events of one kind are due, the last one wins.
    pub fn poll(&mut self, tick: u64) -> TickInput {
        let mut input = TickInput::default();

        while let Some(event) = self.drags.get(self.next_drag) {
            if event.tick > tick {
                break;
            }
            input.drag = Some(event.position);
            self.next_drag += 1;
        }

        while let Some(change) = self.mode_changes.get(self.next_mode) {
            if change.tick > tick {
                break;
            }
            input.mode = Some(change.mode);
            self.next_mode += 1;
        }

        input
    }

    pub fn is_exhausted(&self) -> bool {
        self.next_drag >= self.drags.len() && self.next_mode >= self.mode_changes.len()
    }
}

/// Seeded random drag of the target, one small step per tick
#[derive(Debug, Clone)]
pub struct RandomWalk {
    rng: StdRng,
    current: Position,
    max_step: f32,
    width: f32,
    height: f32,
}

impl RandomWalk {
    pub fn new(seed: u64, start: Position, width: f32, height: f32) -> Self {
        Self::from_rng(StdRng::seed_from_u64(seed), start, width, height)
    }

    /// Continue the walk on a generator that may already have been drawn from.
    pub fn from_rng(rng: StdRng, start: Position, width: f32, height: f32) -> Self {
        Self {
            rng,
            current: start,
            max_step: 3.0,
            width,
            height,
        }
    }

    pub fn next_position(&mut self) -> Position {
        let dx = self.rng.gen_range(-self.max_step..=self.max_step);
        let dy = self.rng.gen_range(-self.max_step..=self.max_step);
        self.current = Position::new(
            (self.current.x + dx).clamp(0.0, self.width),
            (self.current.y + dy).clamp(0.0, self.height),
        );
        self.current
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drag(tick: u64, x: f32) -> DragEvent {
        DragEvent {
            tick,
            position: Position::new(x, 0.0),
        }
    }

    #[test]
    fn test_poll_replays_in_tick_order() {
        let mut script = InputScript::new(
            vec![drag(5, 2.0), drag(1, 1.0)],
            vec![ModeChange {
                tick: 3,
                mode: ModeName::Flee,
            }],
        );

        assert_eq!(script.poll(0), TickInput::default());
        assert_eq!(script.poll(1).drag, Some(Position::new(1.0, 0.0)));
        assert_eq!(script.poll(2), TickInput::default());
        assert_eq!(script.poll(3).mode, Some(ModeName::Flee));
        assert!(!script.is_exhausted());
        assert_eq!(script.poll(5).drag, Some(Position::new(2.0, 0.0)));
        assert!(script.is_exhausted());
    }

    #[test]
    fn test_poll_keeps_last_due_event() {
        let mut script = InputScript::new(vec![drag(1, 1.0), drag(2, 2.0)], Vec::new());
        assert_eq!(script.poll(10).drag, Some(Position::new(2.0, 0.0)));
    }

    #[test]
    fn test_random_walk_is_seeded_and_bounded() {
        let start = Position::new(1.0, 1.0);
        let mut a = RandomWalk::new(7, start, 50.0, 40.0);
        let mut b = RandomWalk::new(7, start, 50.0, 40.0);
        for _ in 0..500 {
            let p = a.next_position();
            assert_eq!(p, b.next_position());
            assert!(p.x >= 0.0 && p.x <= 50.0);
            assert!(p.y >= 0.0 && p.y <= 40.0);
        }
    }
}
