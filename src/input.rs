//! Window input, reduced to the handful of commands the display understands.
//!
//! | Input | Command |
//! |-------|---------|
//! | left click | [`Command::Launch`] at the cursor |
//! | `1`-`8` | [`Command::ToggleColor`] for that palette slot |
//! | `A` | [`Command::ToggleAll`] |
//! | `Escape` | [`Command::Quit`] |

use crate::trigger::Trigger;
use glam::Vec2;
use winit::event::{ElementState, MouseButton, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

/// Something the user asked for.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    Launch(Trigger),
    /// Zero-based palette index.
    ToggleColor(usize),
    ToggleAll,
    Quit,
}

/// Command bound to a key, if any.
pub fn command_for_key(key: KeyCode) -> Option<Command> {
    let slot = match key {
        KeyCode::Digit1 => 0,
        KeyCode::Digit2 => 1,
        KeyCode::Digit3 => 2,
        KeyCode::Digit4 => 3,
        KeyCode::Digit5 => 4,
        KeyCode::Digit6 => 5,
        KeyCode::Digit7 => 6,
        KeyCode::Digit8 => 7,
        KeyCode::KeyA => return Some(Command::ToggleAll),
        KeyCode::Escape => return Some(Command::Quit),
        _ => return None,
    };
    Some(Command::ToggleColor(slot))
}

/// Tracks the cursor and window size so clicks can become triggers.
#[derive(Debug)]
pub struct Input {
    cursor: Vec2,
    window_size: Vec2,
}

impl Input {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            cursor: Vec2::ZERO,
            window_size: Vec2::new(width as f32, height as f32),
        }
    }

    /// Cursor position in window pixels, top-left origin.
    pub fn cursor(&self) -> Vec2 {
        self.cursor
    }

    pub fn window_size(&self) -> Vec2 {
        self.window_size
    }

    pub fn set_window_size(&mut self, width: u32, height: u32) {
        self.window_size = Vec2::new(width as f32, height as f32);
    }

    pub fn move_cursor(&mut self, position: Vec2) {
        self.cursor = position;
    }

    /// A mouse button went down. Only the left button launches.
    pub fn press(&self, button: MouseButton) -> Option<Command> {
        (button == MouseButton::Left).then(|| Command::Launch(Trigger::new(self.cursor, self.window_size)))
    }

    /// Process a winit window event.
    pub fn handle_event(&mut self, event: &WindowEvent) -> Option<Command> {
        match event {
            WindowEvent::CursorMoved { position, .. } => {
                self.move_cursor(Vec2::new(position.x as f32, position.y as f32));
                None
            }
            WindowEvent::Resized(size) => {
                self.set_window_size(size.width, size.height);
                None
            }
            WindowEvent::MouseInput {
                state: ElementState::Pressed,
                button,
                ..
            } => self.press(*button),
            WindowEvent::KeyboardInput { event, .. } if event.state == ElementState::Pressed && !event.repeat => {
                match event.physical_key {
                    PhysicalKey::Code(code) => command_for_key(code),
                    PhysicalKey::Unidentified(_) => None,
                }
            }
            _ => None,
        }
    }
}
