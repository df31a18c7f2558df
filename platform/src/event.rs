//! Input events.
//!
//! Hosts translate whatever their windowing library reports into these types before handing them
//! to a plugin. Pointer positions are not part of these types; they are passed alongside.

use std::fmt;

/// Contains possible key modifiers.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Modifiers {
    /// Whether or not the shift key is pressed.
    pub shift: bool,
    /// Whether or not the control key is pressed.
    pub ctrl: bool,
    /// Whether or not the alt (option) key is pressed.
    pub alt: bool,
    /// Whether or not the super (command) key is pressed.
    pub sup: bool,
}

impl Modifiers {
    /// Shift only.
    pub const SHIFT: Modifiers = Modifiers {
        shift: true,
        ctrl: false,
        alt: false,
        sup: false,
    };

    /// Returns true if no modifier is pressed.
    pub fn none(&self) -> bool {
        *self == Modifiers::default()
    }

    /// Returns true if shift is the only pressed modifier.
    pub fn only_shift(&self) -> bool {
        *self == Modifiers::SHIFT
    }
}

impl fmt::Debug for Modifiers {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut mods = String::new();

        if self.ctrl {
            mods.push('⌃');
        }
        if self.alt {
            mods.push('⌥');
        }
        if self.shift {
            mods.push('⇧');
        }
        if self.sup {
            mods.push('⌘');
        }

        write!(f, "Modifiers({})", mods)
    }
}

/// The pointer button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Button {
    /// The primary button, usually the left mouse button.
    Primary,

    /// The secondary button, usually the right mouse button.
    Secondary,

    /// The middle mouse button.
    Middle,

    /// Some other button that should probably be added to this enum.
    Other(usize),
}

impl Default for Button {
    fn default() -> Button {
        Button::Primary
    }
}

/// What happened to a pointer button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ButtonAction {
    Press,
    Release,
}

/// What happened to a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyAction {
    /// A key was pressed.
    Press,

    /// A key was released.
    Release,

    /// A held key sent a repeat.
    Repeat,
}

/// Keyboard-layout-independent key codes.
///
/// Only the keys hosts actually route are listed; everything else arrives as `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    Unknown,
    /// Load.
    L,
    /// Reload shaders.
    R,
    /// Save.
    S,
    /// Deselect.
    X,
    /// Reset.
    Space,
    LeftArrow,
    RightArrow,
}

#[test]
fn modifier_predicates() {
    assert!(Modifiers::default().none());
    assert!(!Modifiers::default().only_shift());
    assert!(Modifiers::SHIFT.only_shift());

    let shift_ctrl = Modifiers {
        ctrl: true,
        ..Modifiers::SHIFT
    };
    assert!(!shift_ctrl.only_shift());
    assert!(!shift_ctrl.none());
    assert_eq!(format!("{:?}", shift_ctrl), "Modifiers(⌃⇧)");
}
