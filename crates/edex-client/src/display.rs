// Pure functions that turn terminal state into one ANSI frame for a
// raw-mode screen. Every line break is \r\n.

use edex_terminal::input::{LineBuffer, TextTarget};
use edex_terminal::keyboard::{KeyCap, KeyRouter, KEYBOARD_LAYOUT};
use unicode_width::UnicodeWidthStr;

/// Rows the on-screen keyboard occupies when visible.
pub fn keyboard_height() -> u16 {
    KEYBOARD_LAYOUT.len() as u16
}

/// Screen rows a line of `width` columns takes once the terminal wraps it.
fn line_rows(width: usize, cols: usize) -> usize {
    width.div_ceil(cols.max(1)).max(1)
}

/// The trailing lines of `snapshot` that fit in `max_rows` screen rows. The
/// last line always survives; `input_width` is added to it since the prompt
/// is drawn on the same row.
fn fit_tail(snapshot: &str, max_rows: usize, cols: usize, input_width: usize) -> Vec<&str> {
    let lines: Vec<&str> = snapshot.split('\n').collect();
    let last = lines.len() - 1;
    let mut used = 0;
    let mut start = lines.len();
    for (i, text) in lines.iter().enumerate().rev() {
        let width = if i == last { text.width() + input_width } else { text.width() };
        let need = line_rows(width, cols);
        if i != last && used + need > max_rows.max(1) {
            break;
        }
        used += need;
        start = i;
    }
    lines[start..].to_vec()
}

/// The end of the log that fits in `max_rows` rows of `cols` columns,
/// counting wrapped lines. The final (usually empty) partial line is where
/// the prompt will be drawn.
pub fn render_log_tail(snapshot: &str, max_rows: usize, cols: usize) -> String {
    fit_tail(snapshot, max_rows, cols, 0).join("\r\n")
}

/// Tabs would jump the cursor to a tab stop and break caret placement.
fn visible(text: &str) -> String {
    text.replace('\t', "⇥")
}

fn modifier_flags(router: &KeyRouter) -> Option<String> {
    let flags: Vec<&str> = [
        (router.shift_active(), "SHIFT"),
        (router.ctrl_active(), "CTRL"),
        (router.alt_active(), "ALT"),
    ]
    .iter()
    .filter(|(on, _)| *on)
    .map(|(_, name)| *name)
    .collect();
    if flags.is_empty() {
        None
    } else {
        Some(format!("[{}]", flags.join(" ")))
    }
}

/// Prompt and pending input, with active modifiers flagged after it.
pub fn render_input_line(prompt: &str, line: &LineBuffer, router: &KeyRouter) -> String {
    let mut out = format!("\x1b[36m{}\x1b[0m{}\x1b[K", prompt, visible(line.text()));
    if let Some(flags) = modifier_flags(router) {
        out.push_str(&format!("  \x1b[2m{}\x1b[0m", flags));
    }
    out
}

/// Display columns `render_input_line` occupies, escapes excluded.
fn input_line_width(prompt: &str, line: &LineBuffer, router: &KeyRouter) -> usize {
    let flags = modifier_flags(router).map_or(0, |f| f.width() + 2);
    prompt.width() + visible(line.text()).width() + flags
}

/// The on-screen keyboard, one layout row per line. Latched modifiers are
/// drawn in reverse video.
pub fn render_keyboard(router: &KeyRouter) -> String {
    KEYBOARD_LAYOUT
        .iter()
        .map(|row| {
            row.iter()
                .map(|cap| {
                    let lit = matches!(cap, KeyCap::Modifier(m) if router.is_active(*m));
                    if lit {
                        format!("\x1b[7m[{}]\x1b[0m", cap.label())
                    } else {
                        format!("\x1b[2m[{}]\x1b[0m", cap.label())
                    }
                })
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect::<Vec<_>>()
        .join("\r\n")
}

/// A full frame: clear, log tail, input line, keyboard (when visible), then
/// park the cursor at the caret. Positions are in display columns, so wide
/// characters and wrapped lines land the caret where the terminal drew it.
pub fn render_screen(
    snapshot: &str,
    prompt: &str,
    line: &LineBuffer,
    router: &KeyRouter,
    rows: u16,
    cols: u16,
) -> String {
    let cols = cols.max(1) as usize;
    let kb_rows = if router.is_visible() { keyboard_height() } else { 0 };
    let log_rows = rows.saturating_sub(kb_rows).max(1) as usize;
    let tail = fit_tail(snapshot, log_rows, cols, input_line_width(prompt, line, router));

    let mut out = String::from("\x1b[H\x1b[2J");
    out.push_str(&tail.join("\r\n"));
    out.push_str(&render_input_line(prompt, line, router));
    if kb_rows > 0 {
        out.push_str("\r\n");
        out.push_str(&render_keyboard(router));
    }

    let partial = tail.last().copied().unwrap_or("");
    let rows_above: usize = tail[..tail.len().saturating_sub(1)]
        .iter()
        .map(|text| line_rows(text.width(), cols))
        .sum();
    let before_caret: String = line.text().chars().take(line.caret()).collect();
    let caret = partial.width() + prompt.width() + visible(&before_caret).width();
    let row = rows_above + caret / cols;
    let col = caret % cols;
    out.push_str(&format!("\x1b[{};{}H", row + 1, col + 1));
    out
}
