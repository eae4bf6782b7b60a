// Window + keyboard input.
// Visual effects provided here:
// 1) A window that shows the processed camera image.
// 2) A title bar carrying the invert label and, on demand, the control values.
//
// Keys: I invert, Tab switch camera, R retry camera, S snapshot, H show/hide controls,
//       1..6 select warmth/brightness/blur/red/green/blue, Up/Down adjust, Esc quit.

use minifb::{Key, KeyRepeat, Window, WindowOptions};

use crate::app::Host;
use crate::controls::{Action, Control};
use crate::error::Error;
use crate::surface::Surface;

/// Refresh cadence the window paces `present` to.
const TARGET_FPS: usize = 60;

pub struct Drawer {
    window: Window, // the on-screen window you see
    buffer: Vec<u32>,
    title: String,
}

impl Drawer {
    /// Create a window sized to the surface.
    /// Visual: a new empty window appears with your chosen title.
    pub fn new(title: &str, width: usize, height: usize) -> Result<Self, Error> {
        let mut window = Window::new(title, width, height, WindowOptions::default())
            .map_err(|e| Error::WindowInit(e.to_string()))?;
        window.set_target_fps(TARGET_FPS);
        Ok(Self {
            window,
            buffer: vec![0u32; width * height],
            title: title.to_string(),
        })
    }

    /// True while ESC is held down (we'll exit when this is pressed).
    fn esc_pressed(&self) -> bool {
        self.window.is_key_down(Key::Escape)
    }

    fn pressed_once(&self, key: Key) -> bool {
        self.window.is_key_pressed(key, KeyRepeat::No)
    }
}

impl Host for Drawer {
    /// Returns false when the user closes the window or hits ESC.
    fn is_open(&self) -> bool {
        self.window.is_open() && !self.esc_pressed()
    }

    fn poll_actions(&mut self) -> Vec<Action> {
        const SELECT: [(Key, Control); 6] = [
            (Key::Key1, Control::Warmth),
            (Key::Key2, Control::Brightness),
            (Key::Key3, Control::Blur),
            (Key::Key4, Control::Red),
            (Key::Key5, Control::Green),
            (Key::Key6, Control::Blue),
        ];

        let mut actions = Vec::new();
        if self.pressed_once(Key::I) {
            actions.push(Action::ToggleInvert);
        }
        if self.pressed_once(Key::Tab) {
            actions.push(Action::SwitchCamera);
        }
        if self.pressed_once(Key::R) {
            actions.push(Action::RetryCamera);
        }
        if self.pressed_once(Key::S) {
            actions.push(Action::Snapshot);
        }
        if self.pressed_once(Key::H) {
            actions.push(Action::ToggleControls);
        }
        for (key, control) in SELECT {
            if self.pressed_once(key) {
                actions.push(Action::Select(control));
            }
        }
        // Held arrows repeat, like dragging a slider.
        if self.window.is_key_pressed(Key::Up, KeyRepeat::Yes) {
            actions.push(Action::Nudge(1));
        }
        if self.window.is_key_pressed(Key::Down, KeyRepeat::Yes) {
            actions.push(Action::Nudge(-1));
        }
        actions
    }

    /// Push the surface to the screen as 0x00RRGGBB.
    /// Visual: the window immediately displays the new image.
    fn present(&mut self, surface: &Surface, title: &str) -> Result<(), Error> {
        let pixels = surface.pixels();
        let (w, h) = (pixels.width() as usize, pixels.height() as usize);
        self.buffer.resize(w * h, 0);
        for (dst, px) in self.buffer.iter_mut().zip(pixels.pixels()) {
            let [r, g, b, _] = px.0;
            *dst = ((r as u32) << 16) | ((g as u32) << 8) | b as u32;
        }

        if title != self.title {
            self.window.set_title(title);
            self.title = title.to_string();
        }

        self.window
            .update_with_buffer(&self.buffer, w, h)
            .map_err(|e| Error::WindowUpdate(e.to_string()))
    }
}
