use crate::input::TextTarget;
use std::cell::RefCell;
use std::rc::{Rc, Weak};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecialKey {
    Enter,
    Backspace,
    Tab,
    Escape,
    Hide,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModifierKey {
    Shift,
    Ctrl,
    Alt,
}

/// A press on the on-screen keyboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VirtualKey {
    Char(String),
    Special(SpecialKey),
    Modifier(ModifierKey),
}

/// One cap of the on-screen layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCap {
    Char(&'static str),
    Special(SpecialKey),
    Modifier(ModifierKey),
}

impl KeyCap {
    pub fn label(&self) -> &'static str {
        match self {
            KeyCap::Char(" ") => "SPACE",
            KeyCap::Char(c) => *c,
            KeyCap::Special(SpecialKey::Enter) => "ENTER",
            KeyCap::Special(SpecialKey::Backspace) => "BKSP",
            KeyCap::Special(SpecialKey::Tab) => "TAB",
            KeyCap::Special(SpecialKey::Escape) => "ESC",
            KeyCap::Special(SpecialKey::Hide) => "HIDE",
            KeyCap::Modifier(ModifierKey::Shift) => "SHIFT",
            KeyCap::Modifier(ModifierKey::Ctrl) => "CTRL",
            KeyCap::Modifier(ModifierKey::Alt) => "ALT",
        }
    }

    pub fn to_key(&self) -> VirtualKey {
        match self {
            KeyCap::Char(c) => VirtualKey::Char(c.to_string()),
            KeyCap::Special(k) => VirtualKey::Special(*k),
            KeyCap::Modifier(m) => VirtualKey::Modifier(*m),
        }
    }
}

use KeyCap::{Char as C, Modifier as M, Special as S};

pub const KEYBOARD_LAYOUT: &[&[KeyCap]] = &[
    &[
        S(SpecialKey::Escape), C("1"), C("2"), C("3"), C("4"), C("5"),
        C("6"), C("7"), C("8"), C("9"), C("0"), S(SpecialKey::Backspace),
    ],
    &[
        S(SpecialKey::Tab), C("q"), C("w"), C("e"), C("r"), C("t"),
        C("y"), C("u"), C("i"), C("o"), C("p"),
    ],
    &[
        M(ModifierKey::Ctrl), C("a"), C("s"), C("d"), C("f"), C("g"),
        C("h"), C("j"), C("k"), C("l"), S(SpecialKey::Enter),
    ],
    &[
        M(ModifierKey::Shift), C("z"), C("x"), C("c"), C("v"), C("b"),
        C("n"), C("m"), C(","), C("."), C("/"),
    ],
    &[
        M(ModifierKey::Alt), C(" "), C("-"), C("="), S(SpecialKey::Hide),
    ],
];

/// Haptic/audio acknowledgement of a key press.
pub trait KeyFeedback {
    fn key_tap(&self);
}

/// Routes virtual key presses into the bound text target.
///
/// Shift is one-shot: it upper-cases the next character and then releases.
/// Ctrl and Alt only toggle; nothing reads them yet, they exist so the
/// layout's keys have state to show.
pub struct KeyRouter {
    target: Option<Weak<RefCell<dyn TextTarget>>>,
    shift_active: bool,
    ctrl_active: bool,
    alt_active: bool,
    visible: bool,
    feedback: Option<Box<dyn KeyFeedback>>,
    on_hidden: Option<Box<dyn FnMut()>>,
}

impl Default for KeyRouter {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyRouter {
    pub fn new() -> Self {
        Self {
            target: None,
            shift_active: false,
            ctrl_active: false,
            alt_active: false,
            visible: true,
            feedback: None,
            on_hidden: None,
        }
    }

    /// Point input at `target` without taking ownership of it. Modifier
    /// state carries over.
    pub fn bind_target<T: TextTarget + 'static>(&mut self, target: &Rc<RefCell<T>>) {
        let target: Rc<RefCell<dyn TextTarget>> = target.clone();
        self.target = Some(Rc::downgrade(&target));
    }

    pub fn set_feedback(&mut self, feedback: Box<dyn KeyFeedback>) {
        self.feedback = Some(feedback);
    }

    pub fn set_visibility_listener(&mut self, on_hidden: impl FnMut() + 'static) {
        self.on_hidden = Some(Box::new(on_hidden));
    }

    fn target(&self) -> Option<Rc<RefCell<dyn TextTarget>>> {
        self.target.as_ref().and_then(Weak::upgrade)
    }

    fn tap(&self) {
        if let Some(feedback) = &self.feedback {
            feedback.key_tap();
        }
    }

    pub fn press(&mut self, key: VirtualKey) {
        match key {
            VirtualKey::Char(code) => self.press_char(&code),
            VirtualKey::Special(kind) => self.press_special(kind),
            VirtualKey::Modifier(kind) => self.toggle_modifier(kind),
        }
    }

    pub fn press_char(&mut self, code: &str) {
        let Some(target) = self.target() else {
            return;
        };
        self.tap();

        let text = if self.shift_active {
            self.shift_active = false;
            code.to_uppercase()
        } else {
            code.to_string()
        };
        let mut target = target.borrow_mut();
        let range = target.selection().range();
        target.replace(range, &text);
    }

    pub fn press_special(&mut self, kind: SpecialKey) {
        if kind == SpecialKey::Hide {
            if self.target().is_some() {
                self.tap();
            }
            self.hide();
            return;
        }
        let Some(target) = self.target() else {
            return;
        };
        self.tap();

        let mut target = target.borrow_mut();
        match kind {
            SpecialKey::Enter => target.submit(),
            SpecialKey::Backspace => {
                let selection = target.selection();
                let range = selection.range();
                if !selection.is_caret() {
                    target.replace(range, "");
                } else if range.start > 0 {
                    target.replace(range.start - 1..range.start, "");
                }
            }
            SpecialKey::Tab => {
                let range = target.selection().range();
                target.replace(range, "\t");
            }
            SpecialKey::Escape => target.set_text(""),
            SpecialKey::Hide => {}
        }
    }

    pub fn toggle_modifier(&mut self, kind: ModifierKey) {
        self.tap();
        let flag = match kind {
            ModifierKey::Shift => &mut self.shift_active,
            ModifierKey::Ctrl => &mut self.ctrl_active,
            ModifierKey::Alt => &mut self.alt_active,
        };
        *flag = !*flag;
        tracing::trace!("{:?} -> {}", kind, *flag);
    }

    pub fn is_active(&self, kind: ModifierKey) -> bool {
        match kind {
            ModifierKey::Shift => self.shift_active,
            ModifierKey::Ctrl => self.ctrl_active,
            ModifierKey::Alt => self.alt_active,
        }
    }

    pub fn shift_active(&self) -> bool {
        self.shift_active
    }

    pub fn ctrl_active(&self) -> bool {
        self.ctrl_active
    }

    pub fn alt_active(&self) -> bool {
        self.alt_active
    }

    pub fn show(&mut self) {
        self.visible = true;
    }

    /// Hide the keyboard and tell the listener.
    pub fn hide(&mut self) {
        self.visible = false;
        if let Some(on_hidden) = self.on_hidden.as_mut() {
            on_hidden();
        }
    }

    pub fn toggle_visibility(&mut self) {
        if self.visible {
            self.hide();
        } else {
            self.show();
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }
}
