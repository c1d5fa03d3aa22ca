use std::time::{Duration, Instant};

use rand::prelude::*;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchedulerError {
    #[error("not enough images for a slideshow: need at least 2, found {0}")]
    NotEnoughImages(usize),
    #[error("no transitions available")]
    NoTransitions,
    #[error("transition {0} is not part of the rotation")]
    UnknownTransition(usize),
}

/// Easing applied to the raw transition progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProgressCurve {
    #[default]
    Linear,
    Smoothstep,
    EaseInOut,
}

impl ProgressCurve {
    pub fn sample(self, t: f32) -> f32 {
        let clamped = t.clamp(0.0, 1.0);
        match self {
            ProgressCurve::Linear => clamped,
            ProgressCurve::Smoothstep => clamped * clamped * (3.0 - 2.0 * clamped),
            ProgressCurve::EaseInOut => {
                if clamped < 0.5 {
                    2.0 * clamped * clamped
                } else {
                    -1.0 + (4.0 - 2.0 * clamped) * clamped
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrderMode {
    #[default]
    Sequential,
    Shuffle,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlideTiming {
    /// How long the `from` image is held before the transition starts.
    pub pause: Duration,
    /// Length of the transition itself.
    pub transition: Duration,
    pub curve: ProgressCurve,
}

impl Default for SlideTiming {
    fn default() -> Self {
        Self {
            pause: Duration::from_secs_f32(1.0),
            transition: Duration::from_secs_f32(1.5),
            curve: ProgressCurve::Linear,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SlideOrder {
    pub images: OrderMode,
    pub transitions: OrderMode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Hold,
    Transition,
}

/// Everything the renderer needs to draw one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    pub step: u64,
    pub from: usize,
    pub to: usize,
    pub transition: usize,
    pub phase: Phase,
    pub progress: f32,
    /// Set on the last frame of a step (progress reached 1).
    pub completed: bool,
}

#[derive(Debug, Clone, Copy)]
struct StepState {
    index: u64,
    from: usize,
    to: usize,
    transition: usize,
    started: Instant,
    completed: bool,
}

/// Drives the image pairs, transition rotation and progress of a slideshow.
pub struct Slideshow {
    images: Rotation,
    transitions: Rotation,
    timing: SlideTiming,
    step: StepState,
    rng: StdRng,
}

impl Slideshow {
    pub fn new(
        image_count: usize,
        transition_count: usize,
        timing: SlideTiming,
        order: SlideOrder,
        seed: u64,
        now: Instant,
    ) -> Result<Self, SchedulerError> {
        if image_count < 2 {
            return Err(SchedulerError::NotEnoughImages(image_count));
        }
        if transition_count == 0 {
            return Err(SchedulerError::NoTransitions);
        }

        let mut rng = StdRng::seed_from_u64(seed);
        let mut images = Rotation::new((0..image_count).collect(), order.images, &mut rng);
        let transitions = Rotation::new(
            (0..transition_count).collect(),
            order.transitions,
            &mut rng,
        );

        let from = images.current();
        images.advance(&mut rng);
        let to = images.current();
        let step = StepState {
            index: 0,
            from,
            to,
            transition: transitions.current(),
            started: now,
            completed: false,
        };

        Ok(Self {
            images,
            transitions,
            timing,
            step,
            rng,
        })
    }

    /// Number of transitions still in the rotation.
    pub fn transition_count(&self) -> usize {
        self.transitions.items.len()
    }

    /// Computes the frame to draw at `now`, starting the next step first when
    /// the previous frame completed the current one.
    pub fn frame(&mut self, now: Instant) -> Frame {
        if self.step.completed {
            self.begin_next_step(now);
        }

        let elapsed = now.saturating_duration_since(self.step.started);
        let (phase, progress, completed) = if elapsed < self.timing.pause {
            (Phase::Hold, 0.0, false)
        } else {
            let into_transition = elapsed - self.timing.pause;
            let raw = if self.timing.transition.is_zero() {
                1.0
            } else {
                into_transition.as_secs_f32() / self.timing.transition.as_secs_f32()
            };
            if raw >= 1.0 {
                (Phase::Transition, 1.0, true)
            } else {
                (Phase::Transition, self.timing.curve.sample(raw), false)
            }
        };
        self.step.completed = completed;

        Frame {
            step: self.step.index,
            from: self.step.from,
            to: self.step.to,
            transition: self.step.transition,
            phase,
            progress,
            completed,
        }
    }

    /// Abandons the current step and starts the next one at `now`.
    pub fn skip(&mut self, now: Instant) {
        self.begin_next_step(now);
    }

    /// Removes a transition from the rotation. When it is the one currently
    /// playing, the step restarts with the same images and the next transition.
    pub fn retire_transition(&mut self, transition: usize, now: Instant) -> Result<(), SchedulerError> {
        if !self.transitions.items.contains(&transition) {
            return Err(SchedulerError::UnknownTransition(transition));
        }
        if self.transitions.items.len() == 1 {
            return Err(SchedulerError::NoTransitions);
        }
        self.transitions.remove(transition, &mut self.rng);

        if self.step.transition == transition {
            self.step.transition = self.transitions.current();
            self.step.started = now;
            self.step.completed = false;
        }
        Ok(())
    }

    fn begin_next_step(&mut self, now: Instant) {
        let from = self.step.to;
        self.images.advance(&mut self.rng);
        let to = self.images.current();
        self.transitions.advance(&mut self.rng);
        self.step = StepState {
            index: self.step.index + 1,
            from,
            to,
            transition: self.transitions.current(),
            started: now,
            completed: false,
        };
    }
}

/// Endless walk over a pool of indices, reshuffled after every pass in
/// shuffle mode.
struct Rotation {
    items: Vec<usize>,
    mode: OrderMode,
    order: Vec<usize>,
    cursor: usize,
}

impl Rotation {
    fn new(items: Vec<usize>, mode: OrderMode, rng: &mut StdRng) -> Self {
        let order = build_order(&items, mode, None, rng);
        Self {
            items,
            mode,
            order,
            cursor: 0,
        }
    }

    fn current(&self) -> usize {
        self.order[self.cursor]
    }

    fn advance(&mut self, rng: &mut StdRng) {
        let previous = self.current();
        self.cursor += 1;
        if self.cursor >= self.order.len() {
            self.order = build_order(&self.items, self.mode, Some(previous), rng);
            self.cursor = 0;
        }
    }

    /// Drops `item` from the pool while keeping the walk's position: the
    /// cursor moves to whatever followed `item` when it was current.
    fn remove(&mut self, item: usize, rng: &mut StdRng) {
        self.items.retain(|&other| other != item);
        if let Some(position) = self.order.iter().position(|&other| other == item) {
            self.order.remove(position);
            if position < self.cursor {
                self.cursor -= 1;
            }
        }
        if self.cursor >= self.order.len() {
            self.order = build_order(&self.items, self.mode, None, rng);
            self.cursor = 0;
        }
    }
}

/// Builds one pass over `items`. `previous` is the last item of the prior
/// pass; a new pass never starts with it when there is an alternative.
fn build_order(
    items: &[usize],
    mode: OrderMode,
    previous: Option<usize>,
    rng: &mut StdRng,
) -> Vec<usize> {
    let mut order = items.to_vec();
    match mode {
        OrderMode::Sequential => {}
        OrderMode::Shuffle => {
            order.shuffle(rng);
            if order.len() > 1 && Some(order[0]) == previous {
                let swap_with = rng.gen_range(1..order.len());
                order.swap(0, swap_with);
            }
        }
    }
    order
}

#[cfg(test)]
mod tests {
    use super::*;

    fn timing(pause_ms: u64, transition_ms: u64) -> SlideTiming {
        SlideTiming {
            pause: Duration::from_millis(pause_ms),
            transition: Duration::from_millis(transition_ms),
            curve: ProgressCurve::Linear,
        }
    }

    #[test]
    fn rejects_single_image() {
        let err = Slideshow::new(
            1,
            3,
            SlideTiming::default(),
            SlideOrder::default(),
            0,
            Instant::now(),
        )
        .err()
        .expect("error");
        assert_eq!(err, SchedulerError::NotEnoughImages(1));
    }

    #[test]
    fn rejects_missing_transitions() {
        let err = Slideshow::new(
            3,
            0,
            SlideTiming::default(),
            SlideOrder::default(),
            0,
            Instant::now(),
        )
        .err()
        .expect("error");
        assert_eq!(err, SchedulerError::NoTransitions);
    }

    #[test]
    fn holds_then_transitions() {
        let start = Instant::now();
        let mut show =
            Slideshow::new(3, 2, timing(1000, 1000), SlideOrder::default(), 1, start).unwrap();

        let hold = show.frame(start + Duration::from_millis(500));
        assert_eq!(hold.phase, Phase::Hold);
        assert_eq!(hold.progress, 0.0);
        assert_eq!((hold.from, hold.to, hold.transition), (0, 1, 0));

        let mid = show.frame(start + Duration::from_millis(1500));
        assert_eq!(mid.phase, Phase::Transition);
        assert!((mid.progress - 0.5).abs() < 1e-3);
        assert!(!mid.completed);

        let done = show.frame(start + Duration::from_millis(2100));
        assert_eq!(done.progress, 1.0);
        assert!(done.completed);
        assert_eq!(done.step, 0);
    }

    #[test]
    fn sequential_steps_wrap_images_and_rotate_transitions() {
        let mut now = Instant::now();
        let mut show =
            Slideshow::new(3, 2, timing(0, 100), SlideOrder::default(), 1, now).unwrap();

        let mut pairs = Vec::new();
        for _ in 0..4 {
            let first = show.frame(now);
            pairs.push((first.from, first.to, first.transition));
            now += Duration::from_millis(100);
            assert!(show.frame(now).completed);
        }

        assert_eq!(pairs, vec![(0, 1, 0), (1, 2, 1), (2, 0, 0), (0, 1, 1)]);
    }

    #[test]
    fn zero_pause_starts_in_transition() {
        let start = Instant::now();
        let mut show =
            Slideshow::new(2, 1, timing(0, 1000), SlideOrder::default(), 1, start).unwrap();
        let frame = show.frame(start);
        assert_eq!(frame.phase, Phase::Transition);
        assert_eq!(frame.progress, 0.0);
    }

    #[test]
    fn zero_transition_completes_immediately() {
        let start = Instant::now();
        let mut show =
            Slideshow::new(2, 1, timing(0, 0), SlideOrder::default(), 1, start).unwrap();
        let frame = show.frame(start);
        assert_eq!(frame.progress, 1.0);
        assert!(frame.completed);
    }

    #[test]
    fn skip_moves_to_next_pair() {
        let start = Instant::now();
        let mut show =
            Slideshow::new(4, 3, timing(1000, 1000), SlideOrder::default(), 1, start).unwrap();
        show.skip(start);
        let frame = show.frame(start);
        assert_eq!(frame.step, 1);
        assert_eq!((frame.from, frame.to, frame.transition), (1, 2, 1));
        assert_eq!(frame.phase, Phase::Hold);
    }

    #[test]
    fn shuffle_never_repeats_image_within_a_step() {
        let mut now = Instant::now();
        let order = SlideOrder {
            images: OrderMode::Shuffle,
            transitions: OrderMode::Shuffle,
        };
        let mut show = Slideshow::new(3, 4, timing(0, 10), order, 99, now).unwrap();
        let mut previous_to = None;
        for _ in 0..50 {
            let frame = show.frame(now);
            assert_ne!(frame.from, frame.to);
            if let Some(previous) = previous_to {
                assert_eq!(frame.from, previous);
            }
            previous_to = Some(frame.to);
            now += Duration::from_millis(10);
            assert!(show.frame(now).completed);
        }
    }

    #[test]
    fn retiring_current_transition_restarts_step() {
        let start = Instant::now();
        let mut show =
            Slideshow::new(3, 2, timing(0, 1000), SlideOrder::default(), 1, start).unwrap();
        let later = start + Duration::from_millis(400);
        show.retire_transition(0, later).unwrap();
        let frame = show.frame(later);
        assert_eq!((frame.from, frame.to, frame.transition), (0, 1, 1));
        assert_eq!(frame.progress, 0.0);
        assert_eq!(show.transition_count(), 1);

        assert_eq!(
            show.retire_transition(0, later),
            Err(SchedulerError::UnknownTransition(0))
        );
        assert_eq!(
            show.retire_transition(1, later),
            Err(SchedulerError::NoTransitions)
        );
    }

    #[test]
    fn retiring_keeps_sequential_rotation_position() {
        let start = Instant::now();
        let mut show =
            Slideshow::new(3, 4, timing(0, 1000), SlideOrder::default(), 1, start).unwrap();
        show.skip(start);
        assert_eq!(show.frame(start).transition, 1);

        show.retire_transition(1, start).unwrap();
        assert_eq!(show.frame(start).transition, 2);

        show.retire_transition(0, start).unwrap();
        assert_eq!(show.frame(start).transition, 2);

        let mut seen = Vec::new();
        for _ in 0..4 {
            show.skip(start);
            seen.push(show.frame(start).transition);
        }
        assert_eq!(seen, vec![3, 2, 3, 2]);
    }

    #[test]
    fn retiring_last_in_pass_wraps_to_first() {
        let start = Instant::now();
        let mut show =
            Slideshow::new(3, 3, timing(0, 1000), SlideOrder::default(), 1, start).unwrap();
        show.skip(start);
        show.skip(start);
        assert_eq!(show.frame(start).transition, 2);

        show.retire_transition(2, start).unwrap();
        assert_eq!(show.frame(start).transition, 0);
        show.skip(start);
        assert_eq!(show.frame(start).transition, 1);
    }

    #[test]
    fn linear_curve_increases_monotonically() {
        let curve = ProgressCurve::Linear;
        let mut last = 0.0;
        for step in 0..=10 {
            let sample = curve.sample(step as f32 / 10.0);
            assert!(sample >= last - f32::EPSILON);
            last = sample;
        }
    }

    #[test]
    fn smoothstep_matches_expected_values() {
        let curve = ProgressCurve::Smoothstep;
        assert!((curve.sample(0.0) - 0.0).abs() < 1e-6);
        assert!((curve.sample(0.5) - 0.5).abs() < 1e-6);
        assert!((curve.sample(1.0) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn ease_in_out_accelerates_then_decelerates() {
        let curve = ProgressCurve::EaseInOut;
        let first = curve.sample(0.25);
        let mid = curve.sample(0.5);
        let last = curve.sample(0.75);
        assert!(first < mid);
        assert!(last > mid);
        assert!((curve.sample(0.0) - 0.0).abs() < 1e-6);
        assert!((curve.sample(1.0) - 1.0).abs() < 1e-6);
    }
}
