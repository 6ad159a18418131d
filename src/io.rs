// Yoga Pose Coach 🧘 AGPL-3.0 License

//! Saving annotated frames, as images or (with the `video` feature) an MP4 recording.

use std::fs;
use std::path::{Path, PathBuf};

use image::DynamicImage;

#[cfg(feature = "video")]
use video_rs::{Encoder, Time, encode::Settings as EncoderSettings};

#[cfg(feature = "video")]
use crate::error::CoachError;
use crate::error::Result;
use crate::source::SourceMeta;

#[cfg(feature = "video")]
static INIT: std::sync::Once = std::sync::Once::new();

/// Initialize `video-rs` once per process. Safe to call repeatedly.
#[allow(clippy::missing_const_for_fn)]
pub fn init_video() {
    #[cfg(feature = "video")]
    INIT.call_once(|| {
        if let Err(e) = video_rs::init() {
            crate::warn!("Failed to initialize video-rs: {e}");
        }
    });
}

/// H.264 recording of a practice session.
#[cfg(feature = "video")]
pub struct VideoWriter {
    encoder: Encoder,
    frame_duration: Time,
    position: Time,
    width: usize,
    height: usize,
}

#[cfg(feature = "video")]
impl VideoWriter {
    /// Open `path` for writing.
    ///
    /// # Errors
    ///
    /// Returns an error if the parent directory or the encoder cannot be created.
    pub fn new<P: AsRef<Path>>(path: P, width: usize, height: usize, fps: f32) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let settings = EncoderSettings::preset_h264_yuv420p(width, height, false);
        let encoder = Encoder::new(path, settings)
            .map_err(|e| CoachError::VideoError(format!("Failed to create video encoder: {e}")))?;

        Ok(Self {
            encoder,
            frame_duration: Time::from_secs_f64(1.0 / f64::from(fps)),
            position: Time::zero(),
            width,
            height,
        })
    }

    /// Append a frame.
    ///
    /// # Errors
    ///
    /// Returns an error if the frame size changed or encoding fails.
    pub fn write_frame(&mut self, frame: &DynamicImage) -> Result<()> {
        let rgb = frame.to_rgb8();
        let (width, height) = (rgb.width() as usize, rgb.height() as usize);

        if width != self.width || height != self.height {
            return Err(CoachError::VideoError(format!(
                "Frame is {width}x{height}, recording is {}x{}",
                self.width, self.height
            )));
        }

        let array = video_rs::Frame::from_shape_vec((height, width, 3), rgb.into_raw())
            .map_err(|e| CoachError::VideoError(e.to_string()))?;

        self.encoder
            .encode(&array, self.position)
            .map_err(|e| CoachError::VideoError(format!("Failed to encode frame: {e}")))?;

        self.position = self.position.aligned_with(self.frame_duration).add();
        Ok(())
    }

    /// Flush and close the file.
    ///
    /// # Errors
    ///
    /// Returns an error if the encoder fails to finish.
    pub fn finish(mut self) -> Result<()> {
        self.encoder
            .finish()
            .map_err(|e| CoachError::VideoError(format!("Failed to finish recording: {e}")))
    }
}

/// Writes annotated frames into a run directory.
///
/// Still images keep their file name. Frames from a video or camera go into one
/// MP4 file when the `video` feature is on and into numbered JPEGs otherwise.
pub struct FrameSaver {
    save_dir: PathBuf,
    saved: usize,
    #[cfg(feature = "video")]
    video_writer: Option<VideoWriter>,
}

impl FrameSaver {
    #[must_use]
    pub fn new(save_dir: PathBuf) -> Self {
        Self {
            save_dir,
            saved: 0,
            #[cfg(feature = "video")]
            video_writer: None,
        }
    }

    #[must_use]
    pub fn save_dir(&self) -> &Path {
        &self.save_dir
    }

    /// Number of frames written so far.
    #[must_use]
    pub const fn saved(&self) -> usize {
        self.saved
    }

    /// Save one annotated frame.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save(&mut self, is_video: bool, meta: &SourceMeta, annotated: &DynamicImage) -> Result<()> {
        fs::create_dir_all(&self.save_dir)?;

        #[cfg(feature = "video")]
        if is_video {
            if self.video_writer.is_none() {
                let path = self.save_dir.join(format!("{}.mp4", file_stem(&meta.path)));
                let fps = meta.fps.unwrap_or(30.0);
                self.video_writer = Some(VideoWriter::new(
                    path,
                    annotated.width() as usize,
                    annotated.height() as usize,
                    fps,
                )?);
            }
            if let Some(writer) = &mut self.video_writer {
                writer.write_frame(annotated)?;
            }
            self.saved += 1;
            return Ok(());
        }

        let name = if is_video {
            format!("{}_{:05}.jpg", file_stem(&meta.path), meta.frame_idx)
        } else {
            frame_file_name(meta, self.saved)
        };
        annotated.save(self.save_dir.join(name))?;
        self.saved += 1;
        Ok(())
    }

    /// Close any open recording.
    ///
    /// # Errors
    ///
    /// Returns an error if the recording cannot be finalized.
    pub fn finish(self) -> Result<()> {
        #[cfg(feature = "video")]
        if let Some(writer) = self.video_writer {
            writer.finish()?;
        }
        Ok(())
    }
}

/// Stem of a source path, `frame` for sources without one (camera indices, buffers).
fn file_stem(path: &str) -> String {
    Path::new(path)
        .file_stem()
        .map(|s| s.to_string_lossy().replace(['/', ':'], "_"))
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "frame".to_string())
}

fn frame_file_name(meta: &SourceMeta, index: usize) -> String {
    Path::new(&meta.path)
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| format!("image_{index:05}.jpg"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_stem() {
        assert_eq!(file_stem("clips/warrior.mp4"), "warrior");
        assert_eq!(file_stem(""), "frame");
    }

    #[test]
    fn test_saves_still_under_source_name() {
        let dir = tempfile::tempdir().unwrap();
        let mut saver = FrameSaver::new(dir.path().join("analyze"));
        let meta = SourceMeta {
            path: "photos/tree.png".to_string(),
            ..SourceMeta::default()
        };

        saver.save(false, &meta, &DynamicImage::new_rgb8(8, 8)).unwrap();
        saver.save(false, &SourceMeta::default(), &DynamicImage::new_rgb8(8, 8)).unwrap();

        assert_eq!(saver.saved(), 2);
        assert!(dir.path().join("analyze/tree.png").exists());
        assert!(dir.path().join("analyze/image_00001.jpg").exists());
        saver.finish().unwrap();
    }
}
