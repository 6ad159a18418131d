// Yoga Pose Coach 🧘 AGPL-3.0 License

//! Library, history, profile and review commands.

use std::path::Path;
use std::process;

use colored::Colorize;

use crate::cli::args::{ProfileArgs, ReviewArgs};
use crate::library;
use crate::profile::{ProfileUpdate, UserProfile};
use crate::review::ReviewStore;
use crate::tracker::SessionTracker;
use crate::{error, section, success};

/// Print the pose library.
pub fn run_library() {
    for entry in library::entries() {
        println!();
        println!(
            "{} ({}) {}",
            entry.display_name().cyan().bold(),
            entry.sanskrit.italic(),
            format!("[{}]", entry.level).dimmed()
        );
        println!("  Benefits: {}", entry.benefits);
        let muscles: Vec<&str> = entry.muscles().iter().map(|m| m.as_str()).collect();
        println!("  Muscles:  {}", muscles.join(", "));
        for (i, step) in entry.instructions.iter().enumerate() {
            println!("  {}. {step}", i + 1);
        }
    }
}

/// Print the session log and its statistics.
pub fn run_history(data_dir: &Path) {
    let tracker = match SessionTracker::open(data_dir) {
        Ok(t) => t,
        Err(e) => {
            error!("Failed to read session log: {e}");
            process::exit(1);
        }
    };

    if tracker.sessions().is_empty() {
        println!("No sessions logged yet. Start one with 'yoga-pose-coach practice'.");
        return;
    }

    section!("Sessions");
    for record in tracker.sessions() {
        let hr = record
            .avg_hr
            .map_or_else(|| "-".to_string(), |hr| format!("{hr:.0} BPM"));
        println!(
            "{}  {:>5.1} min  {:>5.1} kcal  {:>7}  {}",
            record.date, record.duration, record.calories, hr, record.poses
        );
    }

    let stats = tracker.stats();
    section!("Statistics");
    println!("Total sessions:   {}", stats.total_sessions);
    println!("Total duration:   {:.1} min", stats.total_duration);
    println!("Average duration: {:.1} min", stats.avg_duration);
    println!("Favourite pose:   {}", stats.fav_pose);
}

fn print_profile(profile: &UserProfile) {
    println!("Name:         {}", profile.name);
    println!("Age:          {}", profile.age);
    println!("Weight:       {:.1} kg", profile.weight);
    println!("Height:       {:.1} cm", profile.height);
    println!("Goals:        {}", profile.goals.join(", "));
    println!("Experience:   {}", profile.experience);
    if !profile.health_notes.is_empty() {
        println!("Health notes: {}", profile.health_notes);
    }
}

/// Show the profile, applying any updates first.
pub fn run_profile(args: &ProfileArgs, data_dir: &Path) {
    let mut profile = match UserProfile::load(data_dir) {
        Ok(p) => p,
        Err(e) => {
            error!("Failed to read profile: {e}");
            process::exit(1);
        }
    };

    let update = ProfileUpdate {
        name: args.name.clone(),
        age: args.age,
        weight: args.weight,
        height: args.height,
        goals: args.goals.clone(),
        experience: args.experience,
        health_notes: args.health_notes.clone(),
    };

    if !update.is_empty() {
        profile.update(update);
        if let Err(e) = profile.save(data_dir) {
            error!("Failed to save profile: {e}");
            process::exit(1);
        }
        success!("Profile updated");
    }

    print_profile(&profile);
}

/// Store a session rating and list the user's earlier ones.
pub fn run_review(args: &ReviewArgs, data_dir: &Path) {
    let user = args.user.clone().unwrap_or_else(|| {
        UserProfile::load(data_dir)
            .map(|p| p.name)
            .unwrap_or_else(|_| UserProfile::default().name)
    });

    let store = ReviewStore::new(data_dir);
    match store.save(&user, args.pose.display_name(), args.rating, &args.comments) {
        Ok(review) => {
            success!("Thanks {}! {} rated {}/5", review.user, review.pose, review.rating);
        }
        Err(e) => {
            error!("Failed to save review: {e}");
            process::exit(1);
        }
    }

    if let Ok(history) = store.history(&user) {
        section!("Reviews by {user}");
        for review in history {
            let stars = "★".repeat(usize::from(review.rating));
            if review.comments.is_empty() {
                println!("{}  {:<5}  {}", review.timestamp, stars.yellow(), review.pose);
            } else {
                println!(
                    "{}  {:<5}  {}: {}",
                    review.timestamp,
                    stars.yellow(),
                    review.pose,
                    review.comments
                );
            }
        }
    }
}
