use tracing::{debug, info};

use super::{
    camera::{CameraRig, CameraState},
    math::{Interpolate, smoothstep},
};

/// Durations are never allowed to reach zero.
const MIN_DURATION: f32 = 1.0e-3;

/// Frame times summed in `f32` may fall a few ulps short of the duration they add up to.
const COMPLETION_TOLERANCE: f32 = 1.0e-4;

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
pub enum Direction {
    /// Play from slot A to slot B.
    #[strum(to_string = "A -> B")]
    Forward,
    /// Play from slot B to slot A.
    #[strum(to_string = "B -> A")]
    Reverse,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransitionState {
    Idle,
    HasA,
    Ready,
    Playing(Direction),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecordOutcome {
    RecordedA,
    RecordedB,
    /// Both slots are already filled; clear before recording again.
    Full,
}

#[derive(Clone, Copy, Debug)]
struct Playback {
    start: CameraState,
    end: CameraState,
    /// Seconds played so far.
    elapsed: f32,
    direction: Direction,
}

/// Records two camera states and plays a smoothed move between them.
pub struct TransitionController {
    slot_a: Option<CameraState>,
    slot_b: Option<CameraState>,
    playback: Option<Playback>,
    /// Length of a full playback in seconds.
    duration: f32,
}

impl TransitionController {
    pub fn new(duration: f32) -> Self {
        Self {
            slot_a: None,
            slot_b: None,
            playback: None,
            duration: duration.max(MIN_DURATION),
        }
    }

    pub fn state(&self) -> TransitionState {
        match (&self.playback, &self.slot_a, &self.slot_b) {
            (Some(playback), _, _) => TransitionState::Playing(playback.direction),
            (None, Some(_), Some(_)) => TransitionState::Ready,
            (None, Some(_), None) => TransitionState::HasA,
            (None, None, _) => TransitionState::Idle,
        }
    }

    #[inline]
    pub fn is_playing(&self) -> bool {
        self.playback.is_some()
    }

    /// Progress of the running playback, or `None` when nothing is playing.
    pub fn progress(&self) -> Option<f32> {
        self.playback
            .map(|p| (p.elapsed / self.duration).min(1.0))
    }

    pub fn duration(&self) -> f32 {
        self.duration
    }

    /// Store the rig's current state in the first empty slot.
    pub fn record(&mut self, rig: &CameraRig) -> RecordOutcome {
        let state = rig.state();
        let outcome = if self.slot_a.is_none() {
            self.slot_a = Some(state);
            RecordOutcome::RecordedA
        } else if self.slot_b.is_none() {
            self.slot_b = Some(state);
            RecordOutcome::RecordedB
        } else {
            RecordOutcome::Full
        };

        match outcome {
            RecordOutcome::RecordedA => info!("Camera state A recorded at {}", state.position),
            RecordOutcome::RecordedB => info!("Camera state B recorded at {}", state.position),
            RecordOutcome::Full => info!("Both camera states already recorded, clear first"),
        }

        outcome
    }

    /// Start playing between the recorded slots. Returns `false` and changes nothing if either
    /// slot is empty.
    pub fn play(&mut self, direction: Direction) -> bool {
        let (Some(a), Some(b)) = (self.slot_a, self.slot_b) else {
            info!("Cannot play transition, record camera states A and B first");
            return false;
        };

        let (start, end) = match direction {
            Direction::Forward => (a, b),
            Direction::Reverse => (b, a),
        };

        self.playback = Some(Playback {
            start,
            end,
            elapsed: 0.0,
            direction,
        });

        info!("Playing camera transition {direction} over {:.2}s", self.duration);
        true
    }

    /// Forget both slots and stop any running playback.
    pub fn clear(&mut self) {
        self.slot_a = None;
        self.slot_b = None;
        self.playback = None;
        info!("Camera transition cleared");
    }

    /// Advance the playback and write the interpolated state into the rig. Returns `true` if the
    /// rig was written to, in which case the rig's own update must be skipped this frame.
    pub fn tick(&mut self, delta_time: f32, rig: &mut CameraRig) -> bool {
        let Some(playback) = self.playback.as_mut() else {
            return false;
        };

        playback.elapsed += delta_time;

        if playback.elapsed >= self.duration - COMPLETION_TOLERANCE {
            rig.set_state(playback.end);
            debug!("Camera transition {} finished", playback.direction);
            self.playback = None;
        } else {
            let progress = playback.elapsed / self.duration;
            rig.set_state(Self::sample(playback.start, playback.end, progress));
        }

        true
    }

    fn sample(start: CameraState, end: CameraState, progress: f32) -> CameraState {
        Interpolate::interpolate(start, end, smoothstep(progress))
    }
}
