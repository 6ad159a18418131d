// Yoga Pose Coach 🧘 AGPL-3.0 License

use std::process;
use std::thread;
use std::time::Duration;

use crate::cli::args::NidraArgs;
use crate::meditation::{MeditationTimer, format_clock};
use crate::{error, info, success};

/// Run the yoga-nidra timer in the terminal, announcing each segment.
pub fn run_nidra(args: &NidraArgs) {
    let tick = Duration::from_millis(args.tick_ms.max(1));
    let mut timer = MeditationTimer::new().with_tick(tick);

    if let Err(e) = timer.start() {
        error!("{e}");
        process::exit(1);
    }

    println!("Yoga Nidra, {} (Ctrl+C to stop)", format_clock(timer.total()));

    let mut current = None;
    while timer.is_running() {
        let segment = timer.current_segment();
        if segment.map(|s| s.name) != current {
            if let Some(s) = segment {
                info!("[{}] {}", format_clock(timer.position()), s.title());
            }
            current = segment.map(|s| s.name);
        }
        thread::sleep(tick / 2);
    }

    timer.stop();
    success!("Meditation complete");
}
