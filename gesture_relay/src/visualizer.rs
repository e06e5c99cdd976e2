//! Software-rendered preview window using `minifb`.
//!
//! Layout:
//!
//! ```text
//! ┌──────────────────────────────────────────┐
//! │  LAST SENT LABEL (flashes ~1 s)          │
//! │                                          │
//! │           hand skeleton, image space     │
//! │                                          │
//! ├──────────────────────────────────────────┤
//! │  status: last sent · candidates · peers  │
//! │  key legend                              │
//! └──────────────────────────────────────────┘
//! ```
//!
//! In simulation mode the window is also the input device: keys and mouse
//! drags become [`SimInput`] events for the sim source.

use std::sync::mpsc::Sender;
use std::time::{Duration, Instant};

use minifb::{Key, KeyRepeat, MouseButton, MouseMode, Window, WindowOptions};

use hand_gesture::landmark::{HAND_CONNECTIONS, INDEX_TIP, MIDDLE_TIP, PINKY_TIP, RING_TIP, THUMB_TIP};
use hand_gesture::pose::Pose;
use hand_gesture::{Finger, FingerStateVector, GestureEvent, LandmarkFrame};

use crate::error::{RelayError, Result};
use crate::pipeline::FrameOutcome;
use crate::sim::{Direction, SimInput, SimKey};

// ════════════════════════════════════════════════════════════════════════════
// Layout constants
// ════════════════════════════════════════════════════════════════════════════

pub const VIEW_W:    usize = 640;
pub const VIEW_H:    usize = 480;
const STATUS_H:      usize = 44;
pub const WIN_W:     usize = VIEW_W;
pub const WIN_H:     usize = VIEW_H + STATUS_H;
const BG_COLOR:      u32   = 0xFF1A1A2E;
const STATUS_BG:     u32   = 0xFF0F3460;
const BONE_COLOR:    u32   = 0xFFAADDFF;
const JOINT_COLOR:   u32   = 0xFFEEEEEE;
const TIP_EXTENDED:  u32   = 0xFF00FF66;
const TIP_CURLED:    u32   = 0xFFFF8844;
const FLASH_COLOR:   u32   = 0xFFFFD700;
const SWIPE_FLASH_COLOR: u32 = 0xFF66CCFF;
const FLASH_TIME:    Duration = Duration::from_millis(1000);

const FINGER_TIPS: [(Finger, usize); 5] = [
    (Finger::Thumb, THUMB_TIP),
    (Finger::Index, INDEX_TIP),
    (Finger::Middle, MIDDLE_TIP),
    (Finger::Ring, RING_TIP),
    (Finger::Pinky, PINKY_TIP),
];

// ════════════════════════════════════════════════════════════════════════════
// Visualizer
// ════════════════════════════════════════════════════════════════════════════

pub struct Visualizer {
    window: Window,
    buf:    Vec<u32>,
    /// Present in simulation mode only.
    sim_tx: Option<Sender<SimInput>>,
    last_pointer: Option<(f32, f32)>,

    hand:       Option<LandmarkFrame>,
    candidates: Vec<GestureEvent>,
    last_sent:  Option<(GestureEvent, Instant)>,
    sent_total: usize,
}

impl Visualizer {
    pub fn new(sim_tx: Option<Sender<SimInput>>) -> Result<Self> {
        let title = if sim_tx.is_some() {
            "Gesture Relay - simulator"
        } else {
            "Gesture Relay - preview"
        };
        let mut window = Window::new(
            title,
            WIN_W, WIN_H,
            WindowOptions {
                resize: false,
                ..WindowOptions::default()
            },
        ).map_err(|e| RelayError::Window(e.to_string()))?;

        window.limit_update_rate(Some(Duration::from_millis(16))); // ~60fps

        Ok(Visualizer {
            window,
            buf: vec![BG_COLOR; WIN_W * WIN_H],
            sim_tx,
            last_pointer: None,
            hand: None,
            candidates: Vec::new(),
            last_sent: None,
            sent_total: 0,
        })
    }

    /// Returns false when the window should close.
    pub fn is_open(&self) -> bool { self.window.is_open() }

    /// Poll keyboard/mouse; in simulation mode translate to `SimInput`.
    /// Returns false when the user asked to quit.
    pub fn poll_input(&mut self) -> bool {
        if !self.window.is_open() { return false; }

        if self.window.is_key_pressed(Key::Q, KeyRepeat::No)
            || self.window.is_key_pressed(Key::Escape, KeyRepeat::No)
        {
            self.send(SimInput::KeyDown(SimKey::Quit));
            return false;
        }
        if self.sim_tx.is_none() { return true; }

        let shift = self.window.is_key_down(Key::LeftShift)
                 || self.window.is_key_down(Key::RightShift);

        for (key, dir) in [
            (Key::Left, Direction::Left),
            (Key::Right, Direction::Right),
            (Key::Up, Direction::Up),
            (Key::Down, Direction::Down),
        ] {
            if shift {
                if self.window.is_key_pressed(key, KeyRepeat::No) {
                    self.send(SimInput::KeyDown(SimKey::Flick(dir)));
                }
            } else if self.window.is_key_pressed(key, KeyRepeat::Yes) {
                self.send(SimInput::KeyDown(SimKey::Move(dir)));
            }
        }

        for (key, pose) in [
            (Key::P, Pose::Pinch),
            (Key::O, Pose::OpenPalm),
            (Key::F, Pose::Fist),
            (Key::N, Pose::Pointing),
        ] {
            if self.window.is_key_pressed(key, KeyRepeat::No) {
                self.send(SimInput::KeyDown(SimKey::Pose(pose)));
            }
        }
        if self.window.is_key_pressed(Key::H, KeyRepeat::No) {
            self.send(SimInput::KeyDown(SimKey::ToggleHand));
        }

        // Drag with the left button to move the fingertip.
        if self.window.get_mouse_down(MouseButton::Left) {
            if let Some((mx, my)) = self.window.get_mouse_pos(MouseMode::Discard) {
                let p = (mx / VIEW_W as f32, my / VIEW_H as f32);
                if self.last_pointer != Some(p) {
                    self.last_pointer = Some(p);
                    self.send(SimInput::Pointer { x: p.0, y: p.1 });
                }
            }
        } else {
            self.last_pointer = None;
        }

        true
    }

    fn send(&self, input: SimInput) {
        if let Some(tx) = &self.sim_tx {
            let _ = tx.send(input);
        }
    }

    /// Fold one frame-loop report into what is shown.
    pub fn observe(&mut self, outcome: FrameOutcome) {
        if let Some(&last) = outcome.sent.last() {
            self.last_sent = Some((last, Instant::now()));
            self.sent_total += outcome.sent.len();
        }
        self.hand = outcome.hand;
        self.candidates = outcome.candidates;
    }

    /// Render one frame.
    pub fn render(&mut self, peers: usize) {
        self.buf.fill(BG_COLOR);

        if let Some(hand) = self.hand.clone() {
            self.draw_hand(&hand);
        }

        if let Some((label, at)) = self.last_sent {
            if at.elapsed() < FLASH_TIME {
                self.draw_label(label.as_str(), 30, 40, flash_color(label), 5);
            }
        }

        // ── Status bar ────────────────────────────────────────────────────
        self.fill_rect(0, VIEW_H, WIN_W, STATUS_H, STATUS_BG);
        let last = self.last_sent.map_or("-", |(g, _)| g.as_str());
        let cands = if self.candidates.is_empty() {
            "-".to_string()
        } else {
            self.candidates.iter().map(|g| g.as_str()).collect::<Vec<_>>().join(" ")
        };
        let status = format!(
            "sent: {} ({})   now: {}   peers: {}",
            last, self.sent_total, cands, peers
        );
        self.draw_label(&status, 8, VIEW_H + 8, 0xFFEEEEEE, 2);

        let legend = if self.sim_tx.is_some() {
            "arrows move  shift swipe  drag move  p/o/f/n pose  h hide  q quit"
        } else {
            "q=quit"
        };
        self.draw_label(legend, 8, VIEW_H + 28, 0xFF888888, 2);

        self.window.update_with_buffer(&self.buf, WIN_W, WIN_H).ok();
    }

    // ── Hand ──────────────────────────────────────────────────────────────

    fn draw_hand(&mut self, hand: &LandmarkFrame) {
        let px = |i: usize| {
            let p = hand.point(i);
            (
                (p.x * VIEW_W as f32).round() as isize,
                (p.y * VIEW_H as f32).round() as isize,
            )
        };

        for &(a, b) in HAND_CONNECTIONS.iter() {
            self.draw_line(px(a), px(b), BONE_COLOR);
        }
        for i in 0..hand.points().len() {
            let (x, y) = px(i);
            self.draw_dot(x, y, 2, JOINT_COLOR);
        }

        let fingers = FingerStateVector::from_frame(hand);
        for (finger, tip) in FINGER_TIPS {
            let color = if fingers.is_extended(finger) { TIP_EXTENDED } else { TIP_CURLED };
            let (x, y) = px(tip);
            self.draw_dot(x, y, 4, color);
        }
    }

    // ── Primitive drawing helpers ─────────────────────────────────────────

    fn fill_rect(&mut self, x: usize, y: usize, w: usize, h: usize, color: u32) {
        for row in y..(y+h).min(WIN_H) {
            for col in x..(x+w).min(WIN_W) {
                self.buf[row * WIN_W + col] = color;
            }
        }
    }

    fn set_pixel(&mut self, x: isize, y: isize, color: u32) {
        if x >= 0 && y >= 0 && (x as usize) < WIN_W && (y as usize) < VIEW_H {
            self.buf[y as usize * WIN_W + x as usize] = color;
        }
    }

    fn draw_dot(&mut self, cx: isize, cy: isize, r: isize, color: u32) {
        for dy in -r..=r {
            for dx in -r..=r {
                self.set_pixel(cx + dx, cy + dy, color);
            }
        }
    }

    /// Bresenham line, clipped to the hand view.
    fn draw_line(&mut self, (x0, y0): (isize, isize), (x1, y1): (isize, isize), color: u32) {
        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let (mut x, mut y, mut err) = (x0, y0, dx + dy);
        loop {
            self.set_pixel(x, y, color);
            if x == x1 && y == y1 { break; }
            let e2 = 2 * err;
            if e2 >= dy { err += dy; x += sx; }
            if e2 <= dx { err += dx; y += sy; }
        }
    }

    /// Minimal bitmap font, 3×5 glyphs, drawn at `scale` pixels per dot.
    fn draw_label(&mut self, text: &str, x: usize, y: usize, color: u32, scale: usize) {
        let mut cx = x;
        for ch in text.chars() {
            let glyph = char_glyph(ch);
            for (row, &bits) in glyph.iter().enumerate() {
                for col in 0..3usize {
                    if bits & (1 << (2 - col)) != 0 {
                        let (gx, gy) = (cx + col * scale, y + row * scale);
                        for sy in 0..scale {
                            for sx in 0..scale {
                                let (px, py) = (gx + sx, gy + sy);
                                if px < WIN_W && py < WIN_H {
                                    self.buf[py * WIN_W + px] = color;
                                }
                            }
                        }
                    }
                }
            }
            cx += 4 * scale; // 3 wide + 1 gap
            if cx + 4 * scale > WIN_W { break; }
        }
    }
}

/// Swipes flash blue, static poses gold.
fn flash_color(label: GestureEvent) -> u32 {
    if label.is_swipe() { SWIPE_FLASH_COLOR } else { FLASH_COLOR }
}

// ────────────────────────────────────────────────────────────────────────────
// Minimal 3×5 bitmap font
// ────────────────────────────────────────────────────────────────────────────

fn char_glyph(c: char) -> [u8; 5] {
    match c.to_ascii_uppercase() {
        '0' => [0b111, 0b101, 0b101, 0b101, 0b111],
        '1' => [0b010, 0b110, 0b010, 0b010, 0b111],
        '2' => [0b111, 0b001, 0b111, 0b100, 0b111],
        '3' => [0b111, 0b001, 0b111, 0b001, 0b111],
        '4' => [0b101, 0b101, 0b111, 0b001, 0b001],
        '5' => [0b111, 0b100, 0b111, 0b001, 0b111],
        '6' => [0b111, 0b100, 0b111, 0b101, 0b111],
        '7' => [0b111, 0b001, 0b001, 0b001, 0b001],
        '8' => [0b111, 0b101, 0b111, 0b101, 0b111],
        '9' => [0b111, 0b101, 0b111, 0b001, 0b111],
        'A' => [0b111, 0b101, 0b111, 0b101, 0b101],
        'C' => [0b111, 0b100, 0b100, 0b100, 0b111],
        'D' => [0b110, 0b101, 0b101, 0b101, 0b110],
        'E' => [0b111, 0b100, 0b111, 0b100, 0b111],
        'F' => [0b111, 0b100, 0b111, 0b100, 0b100],
        'G' => [0b111, 0b100, 0b101, 0b101, 0b111],
        'H' => [0b101, 0b101, 0b111, 0b101, 0b101],
        'I' => [0b111, 0b010, 0b010, 0b010, 0b111],
        'L' => [0b100, 0b100, 0b100, 0b100, 0b111],
        'M' => [0b101, 0b111, 0b101, 0b101, 0b101],
        'N' => [0b111, 0b101, 0b101, 0b101, 0b101],
        'O' => [0b111, 0b101, 0b101, 0b101, 0b111],
        'P' => [0b111, 0b101, 0b111, 0b100, 0b100],
        'Q' => [0b111, 0b101, 0b101, 0b111, 0b001],
        'R' => [0b110, 0b101, 0b110, 0b101, 0b101],
        'S' => [0b111, 0b100, 0b111, 0b001, 0b111],
        'T' => [0b111, 0b010, 0b010, 0b010, 0b010],
        'U' => [0b101, 0b101, 0b101, 0b101, 0b111],
        'V' => [0b101, 0b101, 0b101, 0b010, 0b010],
        'W' => [0b101, 0b101, 0b101, 0b111, 0b101],
        'K' => [0b101, 0b101, 0b110, 0b101, 0b101],
        'B' => [0b110, 0b101, 0b110, 0b101, 0b110],
        'J' => [0b001, 0b001, 0b001, 0b101, 0b111],
        'X' => [0b101, 0b101, 0b010, 0b101, 0b101],
        'Y' => [0b101, 0b101, 0b010, 0b010, 0b010],
        'Z' => [0b111, 0b001, 0b010, 0b100, 0b111],
        '.' => [0b000, 0b000, 0b000, 0b000, 0b010],
        '_' => [0b000, 0b000, 0b000, 0b000, 0b111],
        '(' => [0b010, 0b100, 0b100, 0b100, 0b010],
        ')' => [0b010, 0b001, 0b001, 0b001, 0b010],
        '/' => [0b001, 0b001, 0b010, 0b100, 0b100],
        '-' => [0b000, 0b000, 0b111, 0b000, 0b000],
        '+' => [0b000, 0b010, 0b111, 0b010, 0b000],
        '=' => [0b000, 0b111, 0b000, 0b111, 0b000],
        ':' => [0b000, 0b010, 0b000, 0b010, 0b000],
        ' ' => [0b000, 0b000, 0b000, 0b000, 0b000],
        _   => [0b000, 0b000, 0b010, 0b000, 0b000], // fallback dot
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn swipes_flash_in_their_own_colour() {
        assert_eq!(flash_color(GestureEvent::SwipeUp), SWIPE_FLASH_COLOR);
        assert_eq!(flash_color(GestureEvent::Fist), FLASH_COLOR);
    }

    #[test]
    fn every_label_character_has_a_glyph() {
        let fallback = char_glyph('\u{1}');
        for g in GestureEvent::ALL {
            for ch in g.as_str().chars() {
                assert_ne!(char_glyph(ch), fallback, "missing glyph for {ch:?}");
            }
        }
    }
}
