//! Optimistic media toggles.
//!
//! Pressing a control flips its intended state immediately so the button
//! responds before the SDK does. If the operation fails the flip is undone.
//!
//! ```text
//! ┌──────┐ begin ┌─────────┐ confirm ┌───────────┐
//! │ Idle │──────>│ Pending │────────>│ Confirmed │
//! └──────┘       └─────────┘         └───────────┘
//!                     │ revert
//!                     ↓
//!            ┌───────────────────┐
//!            │ RevertedWithError │
//!            └───────────────────┘
//! ```

use std::fmt;

use huddle_core::TrackSource;

/// A local media control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaControl {
    /// Camera on/off.
    Camera,
    /// Microphone on/off.
    Microphone,
    /// Screen share on/off.
    ScreenShare,
}

impl MediaControl {
    /// Track source this control publishes.
    pub fn source(self) -> TrackSource {
        match self {
            Self::Camera => TrackSource::Camera,
            Self::Microphone => TrackSource::Microphone,
            Self::ScreenShare => TrackSource::ScreenShare,
        }
    }
}

impl fmt::Display for MediaControl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Camera => "camera",
            Self::Microphone => "microphone",
            Self::ScreenShare => "screen share",
        };
        f.write_str(label)
    }
}

/// Where a toggle is in its optimistic cycle.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ToggleState {
    /// Never pressed since the last reset.
    #[default]
    Idle,
    /// Operation in flight.
    Pending {
        /// State the user asked for.
        intended: bool,
    },
    /// The last operation succeeded.
    Confirmed,
    /// The last operation failed and the flip was undone.
    RevertedWithError {
        /// Failure shown to the user.
        message: String,
    },
}

/// One optimistic toggle.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ToggleMachine {
    enabled: bool,
    state: ToggleState,
}

impl ToggleMachine {
    /// Last intended value (not necessarily confirmed).
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Cycle state.
    pub fn state(&self) -> &ToggleState {
        &self.state
    }

    /// Flip the intended value and wait for the operation.
    ///
    /// Returns the value to request, or `None` if an operation is already
    /// in flight. Refusing a second press keeps the revert target intact.
    pub fn begin(&mut self) -> Option<bool> {
        if matches!(self.state, ToggleState::Pending { .. }) {
            return None;
        }
        self.enabled = !self.enabled;
        self.state = ToggleState::Pending { intended: self.enabled };
        Some(self.enabled)
    }

    /// The operation succeeded.
    pub fn confirm(&mut self) {
        if matches!(self.state, ToggleState::Pending { .. }) {
            self.state = ToggleState::Confirmed;
        }
    }

    /// The operation failed: undo the flip.
    pub fn revert(&mut self, message: impl Into<String>) {
        if let ToggleState::Pending { intended } = self.state {
            self.enabled = !intended;
            self.state = ToggleState::RevertedWithError { message: message.into() };
        }
    }

    /// Record a state reached outside the toggle cycle (auto-enabled
    /// microphone on join).
    ///
    /// Ignored while an operation is in flight; its result settles the
    /// toggle.
    pub fn force(&mut self, enabled: bool) {
        if matches!(self.state, ToggleState::Pending { .. }) {
            return;
        }
        self.enabled = enabled;
        self.state = ToggleState::Confirmed;
    }

    /// Back to off and idle.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Visual state of a control button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonState {
    /// Source on.
    Active,
    /// Source off, drawn as disabled.
    Disabled,
    /// Source off, no extra styling.
    Idle,
}

/// Rendered state of all three control buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlButtons {
    /// Camera button.
    pub camera: ButtonState,
    /// Microphone button.
    pub microphone: ButtonState,
    /// Screen share button.
    pub screen_share: ButtonState,
}

/// The three media toggles.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UiToggleState {
    camera: ToggleMachine,
    microphone: ToggleMachine,
    screen_share: ToggleMachine,
}

impl UiToggleState {
    /// All off.
    pub fn new() -> Self {
        Self::default()
    }

    /// Toggle for `control`.
    pub fn get(&self, control: MediaControl) -> &ToggleMachine {
        match control {
            MediaControl::Camera => &self.camera,
            MediaControl::Microphone => &self.microphone,
            MediaControl::ScreenShare => &self.screen_share,
        }
    }

    /// Mutable toggle for `control`.
    pub fn get_mut(&mut self, control: MediaControl) -> &mut ToggleMachine {
        match control {
            MediaControl::Camera => &mut self.camera,
            MediaControl::Microphone => &mut self.microphone,
            MediaControl::ScreenShare => &mut self.screen_share,
        }
    }

    /// Intended value for `control`.
    pub fn enabled(&self, control: MediaControl) -> bool {
        self.get(control).enabled()
    }

    /// Button states derived from the intended values.
    ///
    /// Camera and microphone draw an explicit disabled state when off;
    /// screen share just drops its highlight.
    pub fn buttons(&self) -> ControlButtons {
        let on_off = |enabled: bool| if enabled { ButtonState::Active } else { ButtonState::Disabled };
        ControlButtons {
            camera: on_off(self.camera.enabled()),
            microphone: on_off(self.microphone.enabled()),
            screen_share: if self.screen_share.enabled() {
                ButtonState::Active
            } else {
                ButtonState::Idle
            },
        }
    }

    /// All three off and idle.
    pub fn reset(&mut self) {
        self.camera.reset();
        self.microphone.reset();
        self.screen_share.reset();
    }

    /// Nothing enabled and nothing in flight.
    pub fn is_clear(&self) -> bool {
        *self == Self::default()
    }
}
