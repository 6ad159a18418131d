// Yoga Pose Coach 🧘 AGPL-3.0 License

//! Frame sources.
//!
//! Practice sessions read from a webcam, a video file or a network stream; still
//! analysis reads single images, directories or simple `dir/*.ext` globs. Video
//! decoding goes through FFmpeg and needs the `video` feature.

use std::path::{Path, PathBuf};

use image::DynamicImage;

use crate::error::{CoachError, Result};

/// Where frames come from.
#[derive(Debug, Clone)]
pub enum Source {
    /// Path to an image file.
    Image(PathBuf),
    /// In-memory image.
    ImageBuffer(DynamicImage),
    /// Directory containing images.
    Directory(PathBuf),
    /// Glob pattern for images.
    Glob(String),
    /// Path to a video file.
    Video(PathBuf),
    /// Webcam device index.
    Webcam(u32),
    /// Streaming URL (RTSP, RTMP, HTTP).
    Stream(String),
}

impl Source {
    /// Whether this source yields still images.
    #[must_use]
    pub const fn is_still(&self) -> bool {
        matches!(
            self,
            Self::Image(_) | Self::ImageBuffer(_) | Self::Directory(_) | Self::Glob(_)
        )
    }

    /// Whether this source is a live or recorded video.
    #[must_use]
    pub const fn is_video(&self) -> bool {
        matches!(self, Self::Video(_) | Self::Webcam(_) | Self::Stream(_))
    }

    /// Whether frames arrive in real time.
    #[must_use]
    pub const fn is_live(&self) -> bool {
        matches!(self, Self::Webcam(_) | Self::Stream(_))
    }

    /// Human-readable identifier.
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::Image(p) | Self::Directory(p) | Self::Video(p) => p.display().to_string(),
            Self::ImageBuffer(_) => "<memory>".to_string(),
            Self::Glob(g) => g.clone(),
            Self::Webcam(i) => format!("webcam {i}"),
            Self::Stream(url) => url.clone(),
        }
    }

    /// FFmpeg input location for video sources.
    #[cfg_attr(not(feature = "video"), allow(dead_code))]
    fn video_input(&self) -> Result<PathBuf> {
        match self {
            Self::Video(p) => Ok(p.clone()),
            Self::Stream(url) => Ok(PathBuf::from(url)),
            Self::Webcam(idx) => webcam_device(*idx),
            _ => Err(CoachError::CameraError(format!("{} is not a video source", self.describe()))),
        }
    }
}

#[cfg(target_os = "linux")]
#[cfg_attr(not(feature = "video"), allow(dead_code))]
fn webcam_device(idx: u32) -> Result<PathBuf> {
    Ok(PathBuf::from(format!("/dev/video{idx}")))
}

#[cfg(not(target_os = "linux"))]
#[cfg_attr(not(feature = "video"), allow(dead_code))]
fn webcam_device(idx: u32) -> Result<PathBuf> {
    Err(CoachError::CameraError(format!(
        "Webcam {idx}: pass the capture device or stream URL as the source on this platform"
    )))
}

fn is_image_file(path: &Path) -> bool {
    path.extension().is_some_and(|ext| {
        matches!(
            ext.to_string_lossy().to_lowercase().as_str(),
            "jpg" | "jpeg" | "png" | "bmp" | "gif" | "webp" | "tiff" | "tif"
        )
    })
}

fn is_video_file(path: &Path) -> bool {
    path.extension().is_some_and(|ext| {
        matches!(
            ext.to_string_lossy().to_lowercase().as_str(),
            "mp4" | "avi" | "mov" | "mkv" | "wmv" | "flv" | "webm" | "m4v" | "mpeg" | "mpg"
        )
    })
}

impl From<&str> for Source {
    fn from(s: &str) -> Self {
        if let Ok(idx) = s.parse::<u32>() {
            return Self::Webcam(idx);
        }

        if ["rtsp://", "rtmp://", "http://", "https://"]
            .iter()
            .any(|scheme| s.starts_with(scheme))
        {
            return Self::Stream(s.to_string());
        }

        if s.contains('*') {
            return Self::Glob(s.to_string());
        }

        let path = PathBuf::from(s);
        if path.is_dir() {
            Self::Directory(path)
        } else if is_video_file(&path) {
            Self::Video(path)
        } else {
            Self::Image(path)
        }
    }
}

impl From<String> for Source {
    fn from(s: String) -> Self {
        Self::from(s.as_str())
    }
}

impl From<DynamicImage> for Source {
    fn from(img: DynamicImage) -> Self {
        Self::ImageBuffer(img)
    }
}

impl From<u32> for Source {
    fn from(idx: u32) -> Self {
        Self::Webcam(idx)
    }
}

/// Metadata about a source frame.
#[derive(Debug, Clone)]
pub struct SourceMeta {
    /// Frame index (0 for single images).
    pub frame_idx: usize,
    /// Total frames, unknown for live sources.
    pub total_frames: Option<usize>,
    /// Source path or identifier.
    pub path: String,
    /// Frames per second (for video sources).
    pub fps: Option<f32>,
}

impl Default for SourceMeta {
    fn default() -> Self {
        Self {
            frame_idx: 0,
            total_frames: Some(1),
            path: String::new(),
            fps: None,
        }
    }
}

/// Iterator over frames from a source.
///
/// Yields `Err` when a frame cannot be read; callers decide whether that ends the run.
pub struct SourceIterator {
    source: Source,
    current_frame: usize,
    image_paths: Vec<PathBuf>,
    #[cfg(feature = "video")]
    decoder: Option<video_rs::decode::Decoder>,
    #[cfg(feature = "video")]
    total_frames: Option<usize>,
}

impl SourceIterator {
    /// Open a source.
    ///
    /// # Errors
    ///
    /// Returns an error if a directory or glob cannot be listed.
    pub fn new(source: Source) -> Result<Self> {
        let image_paths = match &source {
            Source::Directory(path) => collect_images(path, None)?,
            Source::Glob(pattern) => collect_glob(pattern)?,
            Source::Image(path) => vec![path.clone()],
            _ => Vec::new(),
        };

        Ok(Self {
            source,
            current_frame: 0,
            image_paths,
            #[cfg(feature = "video")]
            decoder: None,
            #[cfg(feature = "video")]
            total_frames: None,
        })
    }

    #[must_use]
    pub const fn source(&self) -> &Source {
        &self.source
    }

    fn next_image(&mut self) -> Option<Result<(DynamicImage, SourceMeta)>> {
        let path = self.image_paths.get(self.current_frame)?;
        let meta = SourceMeta {
            frame_idx: self.current_frame,
            total_frames: Some(self.image_paths.len()),
            path: path.to_string_lossy().to_string(),
            fps: None,
        };
        self.current_frame += 1;

        Some(
            image::open(path)
                .map(|img| (img, meta))
                .map_err(|e| CoachError::ImageError(format!("Failed to load {}: {e}", path.display()))),
        )
    }

    #[cfg(feature = "video")]
    fn next_video_frame(&mut self) -> Option<Result<(DynamicImage, SourceMeta)>> {
        // Set after a failure has been reported once
        if self.current_frame == usize::MAX {
            return None;
        }

        if self.decoder.is_none() {
            let input = match self.source.video_input() {
                Ok(input) => input,
                Err(e) => {
                    self.current_frame = usize::MAX;
                    return Some(Err(e));
                }
            };
            crate::io::init_video();
            match video_rs::decode::Decoder::new(input.as_path()) {
                Ok(d) => {
                    if !self.source.is_live() {
                        if let Ok(duration) = d.duration() {
                            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                            {
                                self.total_frames =
                                    Some((duration.as_secs_f64() * f64::from(d.frame_rate())) as usize);
                            }
                        }
                    }
                    self.decoder = Some(d);
                }
                Err(e) => {
                    self.current_frame = usize::MAX;
                    return Some(Err(CoachError::CameraError(format!(
                        "Failed to open {}: {e}",
                        self.source.describe()
                    ))));
                }
            }
        }

        let decoder = self.decoder.as_mut()?;
        match decoder.decode() {
            Ok((_ts, frame)) => {
                let meta = SourceMeta {
                    frame_idx: self.current_frame,
                    total_frames: self.total_frames,
                    path: self.source.describe(),
                    fps: Some(decoder.frame_rate()),
                };
                self.current_frame += 1;
                Some(video_frame_to_image(&frame).map(|img| (img, meta)))
            }
            Err(video_rs::Error::ReadExhausted | video_rs::Error::DecodeExhausted) => None,
            Err(e) => {
                // A broken capture is not retried
                self.decoder = None;
                self.current_frame = usize::MAX;
                Some(Err(CoachError::CameraError(format!(
                    "Failed to read frame from {}: {e}",
                    self.source.describe()
                ))))
            }
        }
    }

    #[cfg(not(feature = "video"))]
    fn next_video_frame(&mut self) -> Option<Result<(DynamicImage, SourceMeta)>> {
        if self.current_frame > 0 {
            return None;
        }
        self.current_frame = 1;
        Some(Err(CoachError::FeatureNotEnabled(
            "Video and webcam input requires the 'video' feature".to_string(),
        )))
    }
}

impl Iterator for SourceIterator {
    type Item = Result<(DynamicImage, SourceMeta)>;

    fn next(&mut self) -> Option<Self::Item> {
        match &self.source {
            Source::Image(_) | Source::Directory(_) | Source::Glob(_) => self.next_image(),
            Source::ImageBuffer(img) => {
                if self.current_frame > 0 {
                    return None;
                }
                self.current_frame = 1;
                Some(Ok((img.clone(), SourceMeta::default())))
            }
            Source::Video(_) | Source::Webcam(_) | Source::Stream(_) => self.next_video_frame(),
        }
    }
}

/// Sorted image files in `dir`, optionally restricted to one extension.
fn collect_images(dir: &Path, ext: Option<&str>) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(CoachError::ImageError(format!("Not a directory: {}", dir.display())));
    }

    let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(std::result::Result::ok)
        .map(|entry| entry.path())
        .filter(|path| match ext {
            Some(ext) => path
                .extension()
                .is_some_and(|e| e.to_string_lossy().eq_ignore_ascii_case(ext)),
            None => is_image_file(path),
        })
        .collect();

    paths.sort();
    Ok(paths)
}

/// Expand a `dir/*.ext` pattern.
fn collect_glob(pattern: &str) -> Result<Vec<PathBuf>> {
    let Some(star) = pattern.find('*') else {
        return Ok(vec![PathBuf::from(pattern)]);
    };

    let dir_part = pattern[..star].trim_end_matches(['/', '\\']);
    let dir = if dir_part.is_empty() { Path::new(".") } else { Path::new(dir_part) };
    collect_images(dir, pattern[star..].strip_prefix("*."))
}

#[cfg(feature = "video")]
fn video_frame_to_image(frame: &video_rs::Frame) -> Result<DynamicImage> {
    let shape = frame.shape();
    let height = u32::try_from(shape[0])
        .map_err(|_| CoachError::ImageError("Frame height exceeds u32::MAX".to_string()))?;
    let width = u32::try_from(shape[1])
        .map_err(|_| CoachError::ImageError("Frame width exceeds u32::MAX".to_string()))?;

    let data: Vec<u8> = frame.iter().copied().collect();
    image::RgbImage::from_raw(width, height, data)
        .map(DynamicImage::ImageRgb8)
        .ok_or_else(|| CoachError::ImageError("Failed to create image from video frame".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    #[test]
    fn test_source_from_string() {
        assert!(matches!(Source::from("pose.jpg"), Source::Image(_)));
        assert!(matches!(Source::from("class.mp4"), Source::Video(_)));
        assert!(matches!(Source::from("rtsp://camera.local/live"), Source::Stream(_)));
        assert!(matches!(Source::from("0"), Source::Webcam(0)));
        assert!(matches!(Source::from("shots/*.png"), Source::Glob(_)));
    }

    #[test]
    fn test_source_kinds() {
        assert!(Source::Webcam(0).is_live());
        assert!(Source::Video(PathBuf::from("a.mp4")).is_video());
        assert!(!Source::Video(PathBuf::from("a.mp4")).is_live());
        assert!(Source::Directory(PathBuf::from("shots")).is_still());
    }

    #[test]
    fn test_directory_iteration() {
        let dir = tempfile::tempdir().unwrap();
        let img = RgbImage::from_pixel(8, 8, Rgb([1, 2, 3]));
        img.save(dir.path().join("b.png")).unwrap();
        img.save(dir.path().join("a.png")).unwrap();
        std::fs::write(dir.path().join("notes.txt"), "skip me").unwrap();

        let frames: Vec<_> = SourceIterator::new(Source::from(dir.path().to_string_lossy().to_string()))
            .unwrap()
            .collect::<Result<Vec<_>>>()
            .unwrap();
        assert_eq!(frames.len(), 2);
        assert!(frames[0].1.path.ends_with("a.png"));
        assert_eq!(frames[1].1.total_frames, Some(2));
    }

    #[test]
    fn test_missing_image_is_error() {
        let mut it = SourceIterator::new(Source::Image(PathBuf::from("does/not/exist.png"))).unwrap();
        assert!(matches!(it.next(), Some(Err(CoachError::ImageError(_)))));
        assert!(it.next().is_none());
    }

    #[test]
    fn test_image_buffer_yields_once() {
        let img = DynamicImage::ImageRgb8(RgbImage::new(4, 4));
        let mut it = SourceIterator::new(Source::from(img)).unwrap();
        assert!(it.next().is_some());
        assert!(it.next().is_none());
    }
}
