//! Per-agent motion state.

use vn_core::Vec3;

/// Result of one [`MovementState::advance`] call.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Advance {
    Moving,
    Arrived,
}

/// Where an agent is along its final path.
///
/// The agent's world position is kept by the caller; this tracks the
/// segment being walked and the distance covered.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct MovementState {
    /// Index of the path point the current segment starts at.
    pub segment: usize,
    /// Distance travelled along the path so far.
    pub covered: f32,
    /// Length of the whole path.
    pub total: f32,
}

impl MovementState {
    /// Fresh state for a path of length `total`.
    #[inline]
    pub fn start(total: f32) -> Self {
        Self { segment: 0, covered: 0.0, total }
    }

    /// Fraction of the path covered, in `[0.0, 1.0]`.  An empty path counts
    /// as complete.
    pub fn progress(&self) -> f32 {
        if self.total <= 0.0 {
            return 1.0;
        }
        (self.covered / self.total).clamp(0.0, 1.0)
    }

    /// Move `position` up to `speed` along `path`, crossing as many path
    /// points as the distance allows.
    ///
    /// On reaching the last point, `position` is set to it exactly and
    /// `covered` to `total`.
    pub fn advance(&mut self, path: &[Vec3], position: &mut Vec3, speed: f32) -> Advance {
        let Some(&last) = path.last() else {
            self.covered = self.total;
            return Advance::Arrived;
        };
        if self.segment + 1 >= path.len() {
            *position = last;
            self.covered = self.total;
            return Advance::Arrived;
        }

        let mut moved = 0.0_f32;
        while moved < speed {
            let next = path[self.segment + 1];
            let to_next = position.distance(next);
            let budget = speed - moved;
            if to_next < budget {
                self.segment += 1;
                moved += to_next;
                *position = next;
                if self.segment + 1 == path.len() {
                    self.covered = self.total;
                    return Advance::Arrived;
                }
            } else {
                moved += budget;
                *position += (next - *position).normalize_or_zero() * budget;
            }
        }
        self.covered += moved;
        Advance::Moving
    }
}
