use edex_terminal::keyboard::{ModifierKey, SpecialKey, VirtualKey};

/// What a physical key press means to the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientKey {
    Virtual(VirtualKey),
    /// Ctrl+O: show or hide the on-screen keyboard.
    ToggleKeyboard,
    /// Ctrl+C: leave the terminal at once.
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Ground,
    /// Saw ESC; the next byte decides between a sequence and a bare Escape.
    Escape,
    /// Inside a CSI/SS3 sequence; skip until its final byte.
    Sequence,
}

/// Decodes raw-mode stdin bytes into key presses.
///
/// Byte map:
/// - printable ASCII and UTF-8 text -> character keys
/// - CR/LF -> Enter, DEL/BS -> Backspace, TAB -> Tab, lone ESC -> Escape
/// - Ctrl+S / Ctrl+K / Ctrl+A -> toggle Shift / Ctrl / Alt
/// - Ctrl+D -> Hide (the client then ends the session)
/// - Ctrl+O -> toggle keyboard, Ctrl+C -> quit
///
/// Arrow and function keys arrive as escape sequences and are dropped.
pub struct KeyDecoder {
    state: State,
    utf8: Vec<u8>,
}

impl KeyDecoder {
    pub fn new() -> Self {
        Self {
            state: State::Ground,
            utf8: Vec::new(),
        }
    }

    /// Feed one read's worth of bytes. A trailing ESC is taken as the
    /// Escape key, since terminals send whole sequences in a single write.
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<ClientKey> {
        let mut keys = Vec::new();
        for &b in bytes {
            self.feed_byte(b, &mut keys);
        }
        if self.state == State::Escape {
            self.state = State::Ground;
            keys.push(special(SpecialKey::Escape));
        }
        keys
    }

    fn feed_byte(&mut self, b: u8, keys: &mut Vec<ClientKey>) {
        match self.state {
            State::Sequence => {
                if (0x40..=0x7e).contains(&b) {
                    self.state = State::Ground;
                }
                return;
            }
            State::Escape => {
                if b == b'[' || b == b'O' {
                    self.state = State::Sequence;
                    return;
                }
                self.state = State::Ground;
                keys.push(special(SpecialKey::Escape));
            }
            State::Ground => {}
        }

        if b >= 0x80 {
            self.push_utf8(b, keys);
            return;
        }
        self.utf8.clear();

        let key = match b {
            0x0d | 0x0a => special(SpecialKey::Enter),
            0x7f | 0x08 => special(SpecialKey::Backspace),
            0x09 => special(SpecialKey::Tab),
            0x1b => {
                self.state = State::Escape;
                return;
            }
            0x03 => ClientKey::Quit,
            0x04 => special(SpecialKey::Hide),
            0x0f => ClientKey::ToggleKeyboard,
            0x13 => modifier(ModifierKey::Shift),
            0x0b => modifier(ModifierKey::Ctrl),
            0x01 => modifier(ModifierKey::Alt),
            0x20..=0x7e => ClientKey::Virtual(VirtualKey::Char((b as char).to_string())),
            _ => return,
        };
        keys.push(key);
    }

    fn push_utf8(&mut self, b: u8, keys: &mut Vec<ClientKey>) {
        self.utf8.push(b);
        match std::str::from_utf8(&self.utf8) {
            Ok(s) => {
                keys.push(ClientKey::Virtual(VirtualKey::Char(s.to_string())));
                self.utf8.clear();
            }
            // Incomplete sequence: wait for more bytes.
            Err(e) if e.error_len().is_none() => {}
            Err(_) => self.utf8.clear(),
        }
    }
}

fn special(kind: SpecialKey) -> ClientKey {
    ClientKey::Virtual(VirtualKey::Special(kind))
}

fn modifier(kind: ModifierKey) -> ClientKey {
    ClientKey::Virtual(VirtualKey::Modifier(kind))
}
