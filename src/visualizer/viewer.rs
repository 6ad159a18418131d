// Yoga Pose Coach 🧘 AGPL-3.0 License

//! Practice window with keyboard controls.

use image::DynamicImage;
use minifb::{Key, KeyRepeat, Window, WindowOptions};

use crate::error::{CoachError, Result};
use crate::pose::YogaPose;
use crate::session::SessionCommand;

/// A simple image viewer using minifb.
///
/// Besides closing (Esc, Q or the window button) the viewer reports key presses as
/// [`SessionCommand`]s: `H` heart rate, `M` muscles, `Up`/`Down` overlay opacity and
/// `1`-`5` target pose.
pub struct Viewer {
    window: Window,
    pub width: usize,
    pub height: usize,
    buffer: Vec<u32>,
}

impl Viewer {
    /// Create a new viewer window.
    ///
    /// # Errors
    ///
    /// Returns [`CoachError::VisualizerError`] if the window cannot be opened.
    pub fn new(title: &str, width: usize, height: usize) -> Result<Self> {
        let mut window = Window::new(
            title,
            width,
            height,
            WindowOptions {
                resize: true,
                ..WindowOptions::default()
            },
        )
        .map_err(|e| CoachError::VisualizerError(format!("Failed to create window: {e}")))?;

        // Limit update rate
        window.limit_update_rate(Some(std::time::Duration::from_micros(16600)));

        Ok(Self {
            window,
            width,
            height,
            buffer: Vec::new(),
        })
    }

    /// Whether the user asked to close the window.
    #[must_use]
    pub fn should_close(&self) -> bool {
        !self.window.is_open() || self.window.is_key_down(Key::Escape) || self.window.is_key_down(Key::Q)
    }

    /// Update the window with a new frame.
    ///
    /// Returns `Ok(false)` once the window should close.
    ///
    /// # Errors
    ///
    /// Returns [`CoachError::VisualizerError`] if the window cannot be redrawn.
    pub fn update(&mut self, image: &DynamicImage) -> Result<bool> {
        if self.should_close() {
            return Ok(false);
        }

        let (img_width, img_height) = (image.width() as usize, image.height() as usize);

        let num_pixels = img_width * img_height;
        if self.buffer.len() != num_pixels {
            self.buffer.resize(num_pixels, 0);
        }

        // Pack as 0x00RRGGBB
        let rgb = image.to_rgb8();
        for (slot, pixel) in self.buffer.iter_mut().zip(rgb.pixels()) {
            let [r, g, b] = pixel.0;
            *slot = (u32::from(r) << 16) | (u32::from(g) << 8) | u32::from(b);
        }

        self.width = img_width;
        self.height = img_height;

        self.window
            .update_with_buffer(&self.buffer, self.width, self.height)
            .map_err(|e| CoachError::VisualizerError(format!("Failed to update window: {e}")))?;

        Ok(true)
    }

    /// Commands from keys pressed since the last update.
    #[must_use]
    pub fn key_commands(&self) -> Vec<SessionCommand> {
        self.window
            .get_keys_pressed(KeyRepeat::No)
            .into_iter()
            .filter_map(key_command)
            .collect()
    }
}

fn key_command(key: Key) -> Option<SessionCommand> {
    let command = match key {
        Key::H => SessionCommand::ToggleHeartRate,
        Key::M => SessionCommand::ToggleMuscles,
        Key::Up => SessionCommand::OpacityUp,
        Key::Down => SessionCommand::OpacityDown,
        Key::Key1 => SessionCommand::SelectPose(YogaPose::Downdog),
        Key::Key2 => SessionCommand::SelectPose(YogaPose::Goddess),
        Key::Key3 => SessionCommand::SelectPose(YogaPose::Plank),
        Key::Key4 => SessionCommand::SelectPose(YogaPose::Tree),
        Key::Key5 => SessionCommand::SelectPose(YogaPose::Warrior2),
        _ => return None,
    };
    Some(command)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_mapping() {
        assert_eq!(key_command(Key::H), Some(SessionCommand::ToggleHeartRate));
        assert_eq!(key_command(Key::Key4), Some(SessionCommand::SelectPose(YogaPose::Tree)));
        assert_eq!(key_command(Key::Z), None);
    }
}
