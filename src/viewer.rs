// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Window for displaying rendered figures.

use image::RgbaImage;
use minifb::{Key, Window, WindowOptions};

use crate::error::{Result, VizError};

/// A simple image viewer using minifb.
pub struct Viewer {
    window: Window,
    /// Width of the displayed buffer in pixels.
    pub width: usize,
    /// Height of the displayed buffer in pixels.
    pub height: usize,
    buffer: Vec<u32>,
}

impl Viewer {
    /// Create a new viewer window.
    ///
    /// # Errors
    ///
    /// Returns an error if no window can be opened (e.g. no display available).
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
        .map_err(|e| VizError::VisualizerError(format!("Failed to create window: {e}")))?;

        // Limit update rate
        window.set_target_fps(60);

        Ok(Self {
            window,
            width,
            height,
            buffer: Vec::new(),
        })
    }

    /// Whether the window is still open and no quit key (Esc, Q) is held.
    pub fn is_open(&self) -> bool {
        self.window.is_open()
            && !self.window.is_key_down(Key::Escape)
            && !self.window.is_key_down(Key::Q)
    }

    /// Update the window with a new image.
    ///
    /// Returns `false` once the window has been closed.
    ///
    /// # Errors
    ///
    /// Returns an error if the window rejects the frame buffer.
    pub fn update(&mut self, image: &RgbaImage) -> Result<bool> {
        if !self.is_open() {
            return Ok(false);
        }

        let (img_width, img_height) = (image.width() as usize, image.height() as usize);
        self.buffer.clear();
        self.buffer.reserve(img_width * img_height);

        // minifb expects 0x00RRGGBB per pixel
        for pixel in image.pixels() {
            let [r, g, b, _] = pixel.0;
            self.buffer
                .push((u32::from(r) << 16) | (u32::from(g) << 8) | u32::from(b));
        }
        self.width = img_width;
        self.height = img_height;

        self.window
            .update_with_buffer(&self.buffer, self.width, self.height)
            .map_err(|e| VizError::VisualizerError(format!("Failed to update window: {e}")))?;

        Ok(true)
    }

    /// Keep showing `image` until the user closes the window.
    ///
    /// # Errors
    ///
    /// Returns an error if the window rejects the frame buffer.
    pub fn show_until_closed(&mut self, image: &RgbaImage) -> Result<()> {
        while self.update(image)? {}
        Ok(())
    }
}
