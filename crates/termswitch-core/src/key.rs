//! Keyboard input types and raw terminal byte decoding.

use serde::{Deserialize, Serialize};

/// The key that rotates focus to the next session. Not configurable.
pub const ROTATION_KEY: Key = Key::Tab;

/// Keyboard key as read from a terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Key {
    /// Regular character
    Char(char),

    // Navigation
    /// Up arrow
    Up,
    /// Down arrow
    Down,
    /// Left arrow
    Left,
    /// Right arrow
    Right,
    /// Home key
    Home,
    /// End key
    End,
    /// Page Up
    PageUp,
    /// Page Down
    PageDown,

    // Actions
    /// Enter/Return key (CR or LF)
    Enter,
    /// Tab key
    Tab,
    /// Shift+Tab
    BackTab,
    /// Escape key
    Escape,
    /// Backspace key
    Backspace,
    /// Delete key
    Delete,
    /// Insert key
    Insert,
    /// Space key
    Space,

    /// Function key F1..=F12
    F(u8),

    /// Ctrl + letter
    Ctrl(char),
    /// Alt + character (ESC prefix)
    Alt(char),
}

/// Escape sequences recognised by the decoder. The first sequence listed for
/// a key is the one emitted by [`Key::to_escape_sequence`].
const SEQUENCES: &[(&[u8], Key)] = &[
    (b"\x1b[A", Key::Up),
    (b"\x1b[B", Key::Down),
    (b"\x1b[C", Key::Right),
    (b"\x1b[D", Key::Left),
    (b"\x1b[H", Key::Home),
    (b"\x1b[F", Key::End),
    (b"\x1bOH", Key::Home),
    (b"\x1bOF", Key::End),
    (b"\x1b[1~", Key::Home),
    (b"\x1b[4~", Key::End),
    (b"\x1b[Z", Key::BackTab),
    (b"\x1b[2~", Key::Insert),
    (b"\x1b[3~", Key::Delete),
    (b"\x1b[5~", Key::PageUp),
    (b"\x1b[6~", Key::PageDown),
    (b"\x1bOP", Key::F(1)),
    (b"\x1bOQ", Key::F(2)),
    (b"\x1bOR", Key::F(3)),
    (b"\x1bOS", Key::F(4)),
    (b"\x1b[15~", Key::F(5)),
    (b"\x1b[17~", Key::F(6)),
    (b"\x1b[18~", Key::F(7)),
    (b"\x1b[19~", Key::F(8)),
    (b"\x1b[20~", Key::F(9)),
    (b"\x1b[21~", Key::F(10)),
    (b"\x1b[23~", Key::F(11)),
    (b"\x1b[24~", Key::F(12)),
];

/// One key press decoded from a chunk of raw terminal input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyStroke {
    /// The decoded key
    pub key: Key,
    /// Byte offset of the key within the chunk
    pub offset: usize,
    /// Number of bytes the key occupies
    pub len: usize,
}

impl Key {
    /// Convert key to terminal escape sequence bytes.
    pub fn to_escape_sequence(&self) -> Vec<u8> {
        match self {
            Key::Char(c) => c.to_string().into_bytes(),
            Key::Enter => vec![0x0D],
            Key::Tab => vec![0x09],
            Key::Escape => vec![0x1B],
            Key::Backspace => vec![0x7F],
            Key::Space => vec![0x20],
            // Ctrl+A = 0x01, Ctrl+Z = 0x1A
            Key::Ctrl(c) => vec![(c.to_ascii_lowercase() as u8) & 0x1F],
            Key::Alt(c) => {
                let mut seq = vec![0x1B];
                seq.extend(c.to_string().bytes());
                seq
            }
            other => SEQUENCES
                .iter()
                .find(|(_, key)| key == other)
                .map(|(seq, _)| seq.to_vec())
                .unwrap_or_default(),
        }
    }

    /// Split raw terminal input into key presses.
    ///
    /// Every byte of `bytes` belongs to exactly one stroke and strokes are
    /// returned in input order, so the ranges tile the chunk. Unknown CSI
    /// sequences are kept whole and reported as [`Key::Escape`]; invalid
    /// UTF-8 bytes decode one at a time to U+FFFD.
    pub fn decode(bytes: &[u8]) -> Vec<KeyStroke> {
        let mut strokes = Vec::new();
        let mut offset = 0;
        while offset < bytes.len() {
            let (key, len) = decode_one(&bytes[offset..]);
            strokes.push(KeyStroke { key, offset, len });
            offset += len;
        }
        strokes
    }
}

fn decode_one(bytes: &[u8]) -> (Key, usize) {
    match bytes[0] {
        0x1B => decode_escape(bytes),
        b'\r' | b'\n' => (Key::Enter, 1),
        b'\t' => (Key::Tab, 1),
        0x7F | 0x08 => (Key::Backspace, 1),
        b' ' => (Key::Space, 1),
        b @ 0x01..=0x1A => (Key::Ctrl((b - 1 + b'a') as char), 1),
        b if b < 0x80 => (Key::Char(b as char), 1),
        _ => decode_utf8(bytes),
    }
}

fn decode_escape(bytes: &[u8]) -> (Key, usize) {
    if let Some((seq, key)) = SEQUENCES.iter().find(|(seq, _)| bytes.starts_with(seq)) {
        return (*key, seq.len());
    }

    match bytes.get(1) {
        Some(b'[') => {
            // Unrecognised CSI: parameter and intermediate bytes, then a final
            // byte. Anything else ends the sequence early and leaves ESC alone.
            let body = bytes[2..].iter().position(|b| !(0x20..=0x3F).contains(b));
            match body.map(|end| (end, bytes[2 + end])) {
                Some((end, b)) if (0x40..=0x7E).contains(&b) => (Key::Escape, end + 3),
                _ => (Key::Escape, 1),
            }
        }
        Some(&b) if (0x20..0x7F).contains(&b) => (Key::Alt(b as char), 2),
        _ => (Key::Escape, 1),
    }
}

fn decode_utf8(bytes: &[u8]) -> (Key, usize) {
    let width = match bytes[0] {
        0xC0..=0xDF => 2,
        0xE0..=0xEF => 3,
        0xF0..=0xF7 => 4,
        _ => 1,
    };

    let ch = bytes
        .get(..width)
        .and_then(|s| std::str::from_utf8(s).ok())
        .and_then(|s| s.chars().next());

    match ch {
        Some(ch) => (Key::Char(ch), width),
        None => (Key::Char(char::REPLACEMENT_CHARACTER), 1),
    }
}

impl std::fmt::Display for Key {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Key::Char(c) => return write!(f, "{c}"),
            Key::F(n) => return write!(f, "F{n}"),
            Key::Ctrl(c) => return write!(f, "Ctrl+{c}"),
            Key::Alt(c) => return write!(f, "Alt+{c}"),
            Key::Up => "Up",
            Key::Down => "Down",
            Key::Left => "Left",
            Key::Right => "Right",
            Key::Home => "Home",
            Key::End => "End",
            Key::PageUp => "PageUp",
            Key::PageDown => "PageDown",
            Key::Enter => "Enter",
            Key::Tab => "Tab",
            Key::BackTab => "Shift+Tab",
            Key::Escape => "Escape",
            Key::Backspace => "Backspace",
            Key::Delete => "Delete",
            Key::Insert => "Insert",
            Key::Space => "Space",
        };
        f.write_str(name)
    }
}
