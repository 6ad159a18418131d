// Yoga Pose Coach 🧘 AGPL-3.0 License

use image::Rgb;

/// Color type for visualization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color(pub u8, pub u8, pub u8);

impl Color {
    /// Red color.
    pub const RED: Color = Color(255, 0, 0);
    /// Green color.
    pub const GREEN: Color = Color(0, 255, 0);
    /// Blue color.
    pub const BLUE: Color = Color(0, 0, 255);
    /// Yellow color.
    pub const YELLOW: Color = Color(255, 255, 0);
    /// Orange color.
    pub const ORANGE: Color = Color(255, 165, 0);
    /// Cyan color.
    pub const CYAN: Color = Color(0, 255, 255);
    /// Azure, used for correction bullets.
    pub const AZURE: Color = Color(0, 165, 255);
    /// White color.
    pub const WHITE: Color = Color(255, 255, 255);

    /// Create a new color from RGB values.
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self(r, g, b)
    }

    /// Convert to an `image` pixel.
    #[must_use]
    pub const fn to_rgb(self) -> Rgb<u8> {
        Rgb([self.0, self.1, self.2])
    }
}

impl From<Color> for Rgb<u8> {
    fn from(color: Color) -> Self {
        color.to_rgb()
    }
}

/// Skeleton connection color.
pub const LIMB_COLOR: Color = Color::RED;

/// Skeleton joint color.
pub const JOINT_COLOR: Color = Color::GREEN;

/// Heart-rate readout color.
pub const HEART_RATE_COLOR: Color = Color::CYAN;

/// Corrective feedback color.
pub const CORRECTION_COLOR: Color = Color::AZURE;

/// Upper-body muscle overlay color.
pub const UPPER_BODY_COLOR: Color = Color::BLUE;

/// Lower-body and core muscle overlay color.
pub const LOWER_BODY_COLOR: Color = Color::RED;
