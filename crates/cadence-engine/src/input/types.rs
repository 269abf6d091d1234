use std::fmt;

/// Keyboard key identifier, portable across hosts.
///
/// Hosts map their native key codes into these variants where possible.
/// Keys without a variant use `Key::Unknown(u32)` with the host's own code.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Key {
    // Letters
    A,
    B,
    C,
    D,
    E,
    F,
    G,
    H,
    I,
    J,
    K,
    L,
    M,
    N,
    O,
    P,
    Q,
    R,
    S,
    T,
    U,
    V,
    W,
    X,
    Y,
    Z,

    // Digits
    Digit0,
    Digit1,
    Digit2,
    Digit3,
    Digit4,
    Digit5,
    Digit6,
    Digit7,
    Digit8,
    Digit9,

    // Printable punctuation
    Enter,
    Tab,
    Space,
    Minus,
    Equal,
    BracketLeft,
    BracketRight,
    Backslash,
    Semicolon,
    Quote,
    Backquote,
    Comma,
    Period,
    Slash,

    // Keypad
    NumpadDivide,
    NumpadMultiply,
    NumpadSubtract,
    NumpadAdd,
    NumpadEnter,
    NumpadDecimal,
    NumpadEqual,
    Numpad0,
    Numpad1,
    Numpad2,
    Numpad3,
    Numpad4,
    Numpad5,
    Numpad6,
    Numpad7,
    Numpad8,
    Numpad9,

    // Actions
    Escape,
    CapsLock,
    Backspace,
    Pause,
    Insert,
    Home,
    PageUp,
    Delete,
    End,
    PageDown,
    ArrowRight,
    ArrowLeft,
    ArrowDown,
    ArrowUp,
    NumLock,
    Help,
    Mute,
    VolumeUp,
    VolumeDown,

    // Function keys
    F1,
    F2,
    F3,
    F4,
    F5,
    F6,
    F7,
    F8,
    F9,
    F10,
    F11,
    F12,

    // Modifiers
    ControlLeft,
    ShiftLeft,
    AltLeft,
    SuperLeft,
    ControlRight,
    ShiftRight,
    AltRight,
    SuperRight,

    /// Dead key / IME composition in progress.
    Compose,

    /// Host key not represented here.
    Unknown(u32),
}

/// Coarse key classes.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum KeyCategory {
    Printable,
    Action,
    Function,
    Modifier,
    Compose,
    Unknown,
}

impl Key {
    pub fn category(self) -> KeyCategory {
        use Key::*;
        match self {
            Escape | CapsLock | Backspace | Pause | Insert | Home | PageUp | Delete | End
            | PageDown | ArrowRight | ArrowLeft | ArrowDown | ArrowUp | NumLock | Help | Mute
            | VolumeUp | VolumeDown => KeyCategory::Action,

            F1 | F2 | F3 | F4 | F5 | F6 | F7 | F8 | F9 | F10 | F11 | F12 => KeyCategory::Function,

            ControlLeft | ShiftLeft | AltLeft | SuperLeft | ControlRight | ShiftRight | AltRight
            | SuperRight => KeyCategory::Modifier,

            Compose => KeyCategory::Compose,
            Unknown(_) => KeyCategory::Unknown,
            _ => KeyCategory::Printable,
        }
    }

    pub fn is_valid(self) -> bool {
        !matches!(self, Key::Unknown(_))
    }

    pub fn is_printable(self) -> bool {
        self.category() == KeyCategory::Printable
    }

    pub fn is_action(self) -> bool {
        self.category() == KeyCategory::Action
    }

    pub fn is_function(self) -> bool {
        self.category() == KeyCategory::Function
    }

    pub fn is_modifier(self) -> bool {
        self.category() == KeyCategory::Modifier
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Mouse button, or touch index on touch hosts (first finger = `Left`).
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub enum Button {
    #[default]
    None,
    Left,
    Middle,
    Right,
}

/// What happened to a button, key or pointer.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub enum Action {
    #[default]
    None,
    Down,
    Up,
    Move,
}

/// Drawable area resized, in physical pixels.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct ResizeEvent {
    pub width: u32,
    pub height: u32,
}

/// Pointer button or motion, in physical pixels.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct MouseEvent {
    pub x: i32,
    pub y: i32,
    pub button: Button,
    pub action: Action,
}

/// Scroll step. Each axis is normalized to `-1`, `0` or `1` so that line,
/// pixel and wheel deltas look the same on every host.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct ScrollEvent {
    pub x: i32,
    pub y: i32,
}

impl ScrollEvent {
    pub fn from_delta(dx: f64, dy: f64) -> Self {
        fn unit(v: f64) -> i32 {
            if v > 0.0 {
                1
            } else if v < 0.0 {
                -1
            } else {
                0
            }
        }

        Self { x: unit(dx), y: unit(dy) }
    }
}

/// Key press or release.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct KeyEvent {
    pub key: Key,
    /// Text the key produces with the current layout, when the host knows it.
    pub text: Option<String>,
    pub action: Action,
}

/// Raw input delivered by a host, before mask/threshold filtering.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum InputEvent {
    Mouse(MouseEvent),
    Scroll(ScrollEvent),
    Key(KeyEvent),
}
