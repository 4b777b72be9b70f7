use std::collections::VecDeque;
use std::time::{Duration, Instant};

const WINDOW: Duration = Duration::from_secs(1);

/// Counts frames presented during the last second.
#[derive(Debug)]
pub struct FpsCounter {
    frames: VecDeque<Instant>,
    report_every: Duration,
    last_report: Option<Instant>,
}

impl FpsCounter {
    pub fn new(report_every: Duration) -> Self {
        Self {
            frames: VecDeque::with_capacity(128),
            report_every,
            last_report: None,
        }
    }

    pub fn tick(&mut self, now: Instant) {
        self.frames.push_back(now);
        while let Some(&oldest) = self.frames.front() {
            if now.duration_since(oldest) >= WINDOW {
                self.frames.pop_front();
            } else {
                break;
            }
        }
    }

    pub fn fps(&self) -> u32 {
        self.frames.len() as u32
    }

    /// True at most once per report interval. The first call only arms the
    /// timer so a half-filled window is never reported.
    pub fn should_report(&mut self, now: Instant) -> bool {
        match self.last_report {
            None => {
                self.last_report = Some(now);
                false
            }
            Some(last) if now.duration_since(last) >= self.report_every => {
                self.last_report = Some(now);
                true
            }
            Some(_) => false,
        }
    }

    pub fn reset(&mut self) {
        self.frames.clear();
        self.last_report = None;
    }
}

impl Default for FpsCounter {
    fn default() -> Self {
        Self::new(Duration::from_secs(5))
    }
}

/// RGBA8 bitmap, rows top to bottom.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FpsRaster {
    pub rgba: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

// 4x6 glyphs, one row per byte, most significant of the low four bits is the
// leftmost pixel.
fn glyph_bits(c: char) -> [u8; 6] {
    match c {
        '0' => [0b0110, 0b1001, 0b1001, 0b1001, 0b1001, 0b0110],
        '1' => [0b0010, 0b0110, 0b0010, 0b0010, 0b0010, 0b0111],
        '2' => [0b0110, 0b1001, 0b0001, 0b0010, 0b0100, 0b1111],
        '3' => [0b1110, 0b0001, 0b0110, 0b0001, 0b0001, 0b1110],
        '4' => [0b0001, 0b0011, 0b0101, 0b1001, 0b1111, 0b0001],
        '5' => [0b1111, 0b1000, 0b1110, 0b0001, 0b1001, 0b0110],
        '6' => [0b0110, 0b1000, 0b1110, 0b1001, 0b1001, 0b0110],
        '7' => [0b1111, 0b0001, 0b0010, 0b0010, 0b0100, 0b0100],
        '8' => [0b0110, 0b1001, 0b0110, 0b1001, 0b1001, 0b0110],
        '9' => [0b0110, 0b1001, 0b1001, 0b0111, 0b0001, 0b0110],
        'F' => [0b1111, 0b1000, 0b1110, 0b1000, 0b1000, 0b1000],
        'P' => [0b1110, 0b1001, 0b1110, 0b1000, 0b1000, 0b1000],
        'S' => [0b0111, 0b1000, 0b0110, 0b0001, 0b0001, 0b1110],
        ':' => [0, 0b0010, 0, 0, 0b0010, 0],
        _ => [0; 6],
    }
}

const GLYPH_W: u32 = 4;
const GLYPH_H: u32 = 6;
const CELL_W: u32 = GLYPH_W + 1;
const CELL_H: u32 = GLYPH_H + 1;
const TEXT_COLOR: [u8; 4] = [255, 255, 255, 255];
const BACKGROUND: [u8; 4] = [0, 0, 0, 160];

/// Rasterizes `"FPS:<n>"` onto a translucent panel with a one pixel margin.
pub fn rasterize_fps(fps: u32) -> FpsRaster {
    let text = format!("FPS:{}", fps);
    let width = text.chars().count() as u32 * CELL_W + 1;
    let height = CELL_H + 1;
    let mut rgba = BACKGROUND.repeat((width * height) as usize);

    for (ci, ch) in text.chars().enumerate() {
        let x0 = ci as u32 * CELL_W + 1;
        for (row, mask) in glyph_bits(ch).iter().enumerate() {
            for col in 0..GLYPH_W {
                if (mask >> (GLYPH_W - 1 - col)) & 1 == 1 {
                    let idx = (((1 + row as u32) * width + x0 + col) * 4) as usize;
                    rgba[idx..idx + 4].copy_from_slice(&TEXT_COLOR);
                }
            }
        }
    }

    FpsRaster { rgba, width, height }
}
