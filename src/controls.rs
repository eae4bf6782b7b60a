// The user-facing knobs and the actions the window can send.
// Keys 1..6 pick a control, Up/Down nudge it; see `draw.rs` for the key map.

use std::fmt::Write as _;

use crate::fx::clamp;
use crate::types::EffectParams;

/// Read access to the current control values, once per tick.
pub trait ControlSurface {
    fn read(&self) -> EffectParams;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Warmth,
    Brightness,
    Blur,
    Red,
    Green,
    Blue,
}

impl Control {
    pub const ALL: [Control; 6] = [
        Control::Warmth,
        Control::Brightness,
        Control::Blur,
        Control::Red,
        Control::Green,
        Control::Blue,
    ];

    /// Inclusive (min, max) the slider can reach.
    pub fn range(self) -> (i32, i32) {
        match self {
            Control::Warmth => (-100, 100),
            Control::Brightness => (-255, 255),
            Control::Blur => (0, 20),
            Control::Red | Control::Green | Control::Blue => (0, 510),
        }
    }

    pub fn step(self) -> i32 {
        match self {
            Control::Blur => 1,
            _ => 5,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Control::Warmth => "warmth",
            Control::Brightness => "brightness",
            Control::Blur => "blur",
            Control::Red => "red",
            Control::Green => "green",
            Control::Blue => "blue",
        }
    }
}

/// Something the user asked for between ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    ToggleInvert,
    SwitchCamera,
    /// Try the current camera again after a failed acquisition.
    RetryCamera,
    Snapshot,
    ToggleControls,
    Select(Control),
    /// Nudge the selected control by this many steps.
    Nudge(i32),
}

#[derive(Debug, Clone)]
pub struct Controls {
    params: EffectParams,
    selected: Control,
    visible: bool,
}

impl Controls {
    /// Start from `params`, pulled into each control's range.
    pub fn new(params: EffectParams) -> Self {
        let mut controls = Self {
            params: EffectParams::default(),
            selected: Control::Brightness,
            visible: false,
        };
        for c in Control::ALL {
            controls.set(c, controls_value(&params, c));
        }
        controls
    }

    pub fn get(&self, control: Control) -> i32 {
        controls_value(&self.params, control)
    }

    /// Set a control, clamped to its range. Returns the stored value.
    pub fn set(&mut self, control: Control, value: i32) -> i32 {
        let (lo, hi) = control.range();
        let v = clamp(value, lo, hi);
        match control {
            Control::Warmth => self.params.warmth = v,
            Control::Brightness => self.params.brightness = v,
            Control::Blur => self.params.blur = v as u32,
            Control::Red => self.params.red = v,
            Control::Green => self.params.green = v,
            Control::Blue => self.params.blue = v,
        }
        v
    }

    pub fn selected(&self) -> Control {
        self.selected
    }

    pub fn select(&mut self, control: Control) {
        self.selected = control;
    }

    /// Move the selected control by `steps * step`.
    pub fn nudge(&mut self, steps: i32) -> i32 {
        let c = self.selected;
        let current = self.get(c);
        self.set(c, current.saturating_add(steps.saturating_mul(c.step())))
    }

    pub fn visible(&self) -> bool {
        self.visible
    }

    pub fn toggle_visible(&mut self) -> bool {
        self.visible = !self.visible;
        self.visible
    }

    /// "brightness=0 [blur=2] red=255 ..." with the selected control bracketed.
    pub fn summary(&self) -> String {
        let mut out = String::new();
        for c in Control::ALL {
            if !out.is_empty() {
                out.push(' ');
            }
            if c == self.selected {
                let _ = write!(out, "[{}={}]", c.label(), self.get(c));
            } else {
                let _ = write!(out, "{}={}", c.label(), self.get(c));
            }
        }
        out
    }
}

impl Default for Controls {
    fn default() -> Self {
        Self::new(EffectParams::default())
    }
}

impl ControlSurface for Controls {
    fn read(&self) -> EffectParams {
        self.params
    }
}

fn controls_value(params: &EffectParams, control: Control) -> i32 {
    match control {
        Control::Warmth => params.warmth,
        Control::Brightness => params.brightness,
        Control::Blur => params.blur.min(i32::MAX as u32) as i32,
        Control::Red => params.red,
        Control::Green => params.green,
        Control::Blue => params.blue,
    }
}
