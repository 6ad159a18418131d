// Yoga Pose Coach 🧘 AGPL-3.0 License

use std::path::Path;
use std::process;

use crate::annotate::{OverlayOptions, find_next_run_dir};
use crate::cli::args::AnalyzeArgs;
use crate::cli::practice::{load_pipeline, pipeline_config};
use crate::io::FrameSaver;
use crate::pipeline::FrameReport;
use crate::source::{Source, SourceIterator};
use crate::{error, verbose};

/// Check the target pose in still images.
pub fn run_analyze(args: &AnalyzeArgs) {
    let source = Source::from(args.source.as_str());
    if !source.is_still() {
        error!("analyze expects an image, directory or glob; use 'practice' for {}", source.describe());
        process::exit(1);
    }

    let config = pipeline_config(&args.model)
        .with_muscle_overlay(args.muscles)
        .with_overlay_opacity(args.opacity);
    let mut pipeline = load_pipeline(&config);
    let options = OverlayOptions {
        show_muscles: config.show_muscles,
        opacity: config.overlay_opacity,
    };

    let frames = match SourceIterator::new(source) {
        Ok(iter) => iter,
        Err(e) => {
            error!("Error opening source: {e}");
            process::exit(1);
        }
    };

    let mut saver = args
        .save
        .then(|| FrameSaver::new(find_next_run_dir(Path::new("runs"), "analyze")));

    let mut analyzed = 0usize;
    let mut failed = 0usize;

    for item in frames {
        let (image, meta) = match item {
            Ok(frame) => frame,
            Err(e) => {
                error!("{e}");
                failed += 1;
                continue;
            }
        };

        let total = meta.total_frames.map_or_else(|| "?".to_string(), |n| n.to_string());
        let outcome = match pipeline.analyze(&image, args.pose) {
            Ok(outcome) => outcome,
            Err(e) => {
                error!("image {}/{total} {}: {e}", meta.frame_idx + 1, meta.path);
                failed += 1;
                continue;
            }
        };

        let report = FrameReport {
            target: args.pose,
            outcome,
            heart_rate: None,
            hr_zone: None,
        };
        verbose!(
            "image {}/{total} {}: {}x{} {}",
            meta.frame_idx + 1,
            meta.path,
            image.width(),
            image.height(),
            report.summary()
        );
        analyzed += 1;

        if let Some(saver) = &mut saver {
            let annotated = pipeline.render(&image, &report, &options);
            if let Err(e) = saver.save(false, &meta, &annotated) {
                error!("Failed to save result: {e}");
            }
        }
    }

    let noun = if analyzed == 1 { "image" } else { "images" };
    if failed > 0 {
        verbose!("Analyzed {analyzed} {noun}, {failed} failed");
    } else {
        verbose!("Analyzed {analyzed} {noun}");
    }

    if let Some(saver) = saver {
        let dir = saver.save_dir().to_path_buf();
        if saver.saved() > 0 {
            verbose!("Results saved to {}", dir.display());
        }
        if let Err(e) = saver.finish() {
            error!("Failed to finish saving: {e}");
        }
    }

    if analyzed == 0 {
        process::exit(1);
    }
}
