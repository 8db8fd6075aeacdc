use edex_common::config::LogConfig;

const DEFAULT_MAX_BYTES: usize = 50_000;
const DEFAULT_TRIM_TARGET: usize = 40_000;

const CLEARED_NOTICE: &str = "Terminal cleared\n\n";

/// Size-bounded scrollback for the terminal view.
///
/// Appending past `max_bytes` drops text from the front until `trim_target`
/// bytes remain, so the most recent output always survives. Lengths are
/// UTF-8 bytes; a cut that would split a character moves forward to the
/// next boundary.
pub struct OutputLog {
    contents: String,
    max_bytes: usize,
    trim_target: usize,
}

impl OutputLog {
    pub fn new(max_bytes: usize, trim_target: usize) -> Self {
        if trim_target > max_bytes {
            tracing::warn!(
                "trim target {} above ceiling {}, clamping",
                trim_target,
                max_bytes
            );
        }
        Self {
            contents: String::new(),
            max_bytes,
            trim_target: trim_target.min(max_bytes),
        }
    }

    pub fn from_config(config: &LogConfig) -> Self {
        Self::new(config.max_bytes, config.trim_target)
    }

    pub fn append(&mut self, text: &str) {
        self.contents.push_str(text);
        if self.contents.len() > self.max_bytes {
            let mut cut = self.contents.len() - self.trim_target;
            while !self.contents.is_char_boundary(cut) {
                cut += 1;
            }
            self.contents.replace_range(..cut, "");
        }
    }

    /// Current contents, for the rendering surface to pull.
    pub fn snapshot(&self) -> &str {
        &self.contents
    }

    pub fn clear(&mut self) {
        self.contents.clear();
    }

    /// Clear and leave a single notice line behind.
    pub fn reset_with_notice(&mut self) {
        self.clear();
        self.append(CLEARED_NOTICE);
    }

    pub fn len(&self) -> usize {
        self.contents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contents.is_empty()
    }

    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    pub fn trim_target(&self) -> usize {
        self.trim_target
    }
}

impl Default for OutputLog {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_BYTES, DEFAULT_TRIM_TARGET)
    }
}
