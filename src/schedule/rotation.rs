use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotationState {
    Idle,
    Presenting(usize),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RotationError {
    #[error("Slide {index} is out of range for {len} slides")]
    OutOfRange { index: usize, len: usize },
    #[error("Nothing is being presented")]
    NothingPresented,
    #[error("Rotation period must be longer than zero")]
    ZeroPeriod,
}

/// Index bookkeeping behind a carousel: which slide is shown out of `len`.
/// Holds no timer; whoever owns it decides when to call [`Rotation::tick`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rotation {
    len: usize,
    state: RotationState,
}

impl Rotation {
    pub fn new() -> Self {
        Self {
            len: 0,
            state: RotationState::Idle,
        }
    }

    pub fn with_len(len: usize) -> Self {
        let mut rotation = Self::new();
        rotation.reset(len);
        rotation
    }

    /// Starts over on a list of `len` slides: the first slide when there is
    /// one, `Idle` otherwise.
    pub fn reset(&mut self, len: usize) -> RotationState {
        self.len = len;
        self.state = if len == 0 {
            RotationState::Idle
        } else {
            RotationState::Presenting(0)
        };
        self.state
    }

    /// Advances to the next slide, wrapping after the last one.
    pub fn tick(&mut self) -> RotationState {
        if let RotationState::Presenting(index) = self.state {
            self.state = RotationState::Presenting((index + 1) % self.len);
        }
        self.state
    }

    pub fn select(&mut self, index: usize) -> Result<RotationState, RotationError> {
        if self.state == RotationState::Idle {
            return Err(RotationError::NothingPresented);
        }
        if index >= self.len {
            return Err(RotationError::OutOfRange {
                index,
                len: self.len,
            });
        }
        self.state = RotationState::Presenting(index);
        Ok(self.state)
    }

    pub fn state(&self) -> RotationState {
        self.state
    }

    pub fn current(&self) -> Option<usize> {
        match self.state {
            RotationState::Idle => None,
            RotationState::Presenting(index) => Some(index),
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl Default for Rotation {
    fn default() -> Self {
        Self::new()
    }
}
