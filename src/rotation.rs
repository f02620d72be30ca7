//! Rotation modes and the user-facing state machine.
//!
//! The demo has exactly four observable states, the product of [`Mode`] and
//! the rotating flag. Only explicit [`Control`]s move between them.

use std::fmt::Display;

/// Which node receives the per-frame rotation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Mode {
    /// The object hangs directly off the scene root and is turned in world
    /// space, so it orbits the origin.
    #[default]
    Broken,
    /// The object sits inside a pivot placed at its center, and the pivot is
    /// turned in its local space, so the object spins in place.
    Fixed,
}

impl Mode {
    pub fn toggled(self) -> Self {
        match self {
            Mode::Broken => Mode::Fixed,
            Mode::Fixed => Mode::Broken,
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Mode::Broken => "Broken (World-space rotation)",
            Mode::Fixed => "Fixed (Local-space rotation)",
        }
    }
}

impl Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Mode::Broken => f.write_str("broken"),
            Mode::Fixed => f.write_str("fixed"),
        }
    }
}

/// A user toggle. These are the only inputs that change [`RotationState`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Control {
    ToggleRotation,
    ToggleMode,
}

/// What the scene manager has to do after a [`Control`] was applied.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transition {
    /// Only the rotating flag flipped; the graph stays as it is.
    Flag,
    /// The mode flipped; the scene graph must be rebuilt from scratch.
    Rebuild,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct RotationState {
    pub mode: Mode,
    pub rotating: bool,
}

impl RotationState {
    pub fn new(mode: Mode, rotating: bool) -> Self {
        Self { mode, rotating }
    }

    pub fn apply(&mut self, control: Control) -> Transition {
        match control {
            Control::ToggleRotation => {
                self.rotating = !self.rotating;
                Transition::Flag
            }
            Control::ToggleMode => {
                self.mode = self.mode.toggled();
                Transition::Rebuild
            }
        }
    }

    /// Label of the button that flips the rotating flag.
    pub fn rotation_label(&self) -> &'static str {
        if self.rotating {
            "Stop Rotation"
        } else {
            "Start Rotation"
        }
    }

    /// Label of the button that flips the mode.
    pub fn mode_label(&self) -> &'static str {
        match self.mode {
            Mode::Broken => "Switch to Fixed Mode",
            Mode::Fixed => "Switch to Broken Mode",
        }
    }

    /// One line status readout, shown in the window title.
    pub fn status(&self) -> String {
        format!(
            "Current Mode: {} | [R] {} | [M] {}",
            self.mode.description(),
            self.rotation_label(),
            self.mode_label()
        )
    }
}

impl Display for RotationState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let motion = if self.rotating { "spinning" } else { "idle" };
        write!(f, "{}-{}", self.mode, motion)
    }
}
