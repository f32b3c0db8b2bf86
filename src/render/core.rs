use std::io::Write;

use blake3::Hash;

use crate::docs;
use crate::error::Result;
use crate::session::PlaybackState;

/// Terminal dimensions for a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Size {
    pub width: u16,
    pub height: u16,
}

impl Size {
    pub fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }
}

/// Everything the renderer needs to draw one frame.
#[derive(Debug, Clone)]
pub struct Frame<'a> {
    pub values: &'a [u32],
    pub comparing: Option<(usize, usize)>,
    pub swapping: Option<(usize, usize)>,
    pub algorithm_label: &'a str,
    pub state: PlaybackState,
    pub size: usize,
    pub speed: u8,
    pub show_docs: bool,
}

const DEFAULT_COLOR: &str = "\x1b[34m";
const COMPARE_COLOR: &str = "\x1b[33m";
const SWAP_COLOR: &str = "\x1b[32m";
const RESET: &str = "\x1b[0m";
const BAR_GLYPH: char = '█';

// Header, legend, and footer each take one row.
const CHROME_ROWS: u16 = 3;

/// ANSI bar-plot renderer writing cursor-addressed frames to any terminal
/// handle. A content hash of the composed frame skips redundant writes, so
/// paused ticks cost nothing.
pub struct BarRenderer {
    size: Size,
    last_frame: Option<Hash>,
}

impl BarRenderer {
    pub fn new(size: Size) -> Self {
        Self {
            size,
            last_frame: None,
        }
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn resize(&mut self, size: Size) {
        self.size = size;
        self.last_frame = None;
    }

    pub fn render(&mut self, writer: &mut impl Write, frame: &Frame<'_>) -> Result<()> {
        let composed = self.compose(frame);
        let hash = blake3::hash(composed.as_bytes());
        if self.last_frame == Some(hash) {
            return Ok(());
        }
        self.last_frame = Some(hash);
        writer.write_all(composed.as_bytes())?;
        writer.flush()?;
        Ok(())
    }

    fn compose(&self, frame: &Frame<'_>) -> String {
        let Size { width, height } = self.size;
        if width == 0 || height <= CHROME_ROWS {
            return String::new();
        }

        let mut out = String::new();
        self.put_line(
            &mut out,
            0,
            &format!(
                "Hellasort — {}  size {}  speed {}  [{}]",
                frame.algorithm_label,
                frame.size,
                frame.speed,
                frame.state.label()
            ),
        );
        self.put_line(
            &mut out,
            1,
            &format!(
                "{COMPARE_COLOR}■{RESET} comparing  {SWAP_COLOR}■{RESET} swapping  \
                 {DEFAULT_COLOR}■{RESET} default"
            ),
        );

        let plot_rows = height - CHROME_ROWS - 1;
        if frame.show_docs {
            self.compose_docs(&mut out, plot_rows);
        } else {
            self.compose_bars(&mut out, frame, plot_rows);
        }

        self.put_line(
            &mut out,
            height - 1,
            "space start/pause  s stop  r shuffle  1-8 algorithm  +/- size  [/] speed  d docs  q quit",
        );
        out
    }

    /// Cursor-address a row, clear it, and write the content.
    fn put_line(&self, out: &mut String, row: u16, content: &str) {
        out.push_str(&format!("\x1b[{};1H\x1b[2K", row + 1));
        out.push_str(content);
    }

    fn compose_bars(&self, out: &mut String, frame: &Frame<'_>, plot_rows: u16) {
        let n = frame.values.len();
        let plot_rows = plot_rows as usize;
        if n == 0 || plot_rows == 0 {
            return;
        }
        let col_width = ((self.size.width as usize) / n).max(1);
        let visible = n.min(self.size.width as usize);

        // Bar heights scaled against the value ceiling of 100.
        let heights: Vec<usize> = frame.values[..visible]
            .iter()
            .map(|&v| ((v as usize * plot_rows) / 100).max(1).min(plot_rows))
            .collect();

        for row in 0..plot_rows {
            let threshold = plot_rows - row;
            let mut line = String::new();
            let mut current_color: Option<&str> = None;
            for (idx, &bar_height) in heights.iter().enumerate() {
                let filled = bar_height >= threshold;
                if filled {
                    let color = bar_color(frame, idx);
                    if current_color != Some(color) {
                        line.push_str(color);
                        current_color = Some(color);
                    }
                }
                for offset in 0..col_width {
                    let glyph = if filled && (col_width == 1 || offset + 1 < col_width) {
                        BAR_GLYPH
                    } else {
                        ' '
                    };
                    line.push(glyph);
                }
            }
            if current_color.is_some() {
                line.push_str(RESET);
            }
            self.put_line(out, 2 + row as u16, &line);
        }
    }

    fn compose_docs(&self, out: &mut String, plot_rows: u16) {
        let text = docs::panel_text();
        let mut lines = text.lines();
        for row in 0..plot_rows {
            let content = lines.next().unwrap_or("");
            let clipped: String = content.chars().take(self.size.width as usize).collect();
            self.put_line(out, 2 + row, &clipped);
        }
    }
}

fn bar_color(frame: &Frame<'_>, idx: usize) -> &'static str {
    if pair_contains(frame.comparing, idx) {
        COMPARE_COLOR
    } else if pair_contains(frame.swapping, idx) {
        SWAP_COLOR
    } else {
        DEFAULT_COLOR
    }
}

fn pair_contains(pair: Option<(usize, usize)>, idx: usize) -> bool {
    pair.is_some_and(|(i, j)| i == idx || j == idx)
}
