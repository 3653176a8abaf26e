//! Focus rotation hotkey.

use termswitch_core::{Key, ROTATION_KEY};
use tracing::trace;

/// Piece of a physical input chunk after hotkey extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    /// Bytes to route to the focused session
    Data(&'a [u8]),
    /// The rotation key was pressed here
    Hotkey,
}

/// Watches physical input for the rotation key.
///
/// The key is always [`ROTATION_KEY`]. Hotkey bytes are consumed and never
/// reach a session.
#[derive(Debug, Clone)]
pub struct HotkeyListener {
    key: Key,
}

impl HotkeyListener {
    /// Listener for [`ROTATION_KEY`].
    pub fn new() -> Self {
        Self { key: ROTATION_KEY }
    }

    /// The key this listener reacts to.
    pub fn key(&self) -> Key {
        self.key
    }

    /// Whether `key` triggers rotation.
    pub fn is_hotkey(&self, key: Key) -> bool {
        key == self.key
    }

    /// Split a raw input chunk around every hotkey press.
    ///
    /// Data segments are never empty. Concatenating them gives the chunk with
    /// the hotkey bytes removed.
    pub fn split<'a>(&self, chunk: &'a [u8]) -> Vec<Segment<'a>> {
        let mut segments = Vec::new();
        let mut start = 0;

        for stroke in Key::decode(chunk) {
            if !self.is_hotkey(stroke.key) {
                continue;
            }
            trace!(offset = stroke.offset, "hotkey pressed");
            if stroke.offset > start {
                segments.push(Segment::Data(&chunk[start..stroke.offset]));
            }
            segments.push(Segment::Hotkey);
            start = stroke.offset + stroke.len;
        }

        if start < chunk.len() {
            segments.push(Segment::Data(&chunk[start..]));
        }

        segments
    }
}

impl Default for HotkeyListener {
    fn default() -> Self {
        Self::new()
    }
}
