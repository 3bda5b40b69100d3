//! Statistics reporting.

use console::style;

use crate::download::{DownloadState, GlobalState};

/// Print statistics for a single profile.
pub fn print_profile_stats(state: &DownloadState) {
    println!();
    println!(
        "{}",
        style(format!("Statistics for {}:", state.profile_name)).bold()
    );
    println!("  Items:    {}", state.total_items);
    println!("  Pictures: {}", state.pic_count);
    println!("  Videos:   {}", state.vid_count);
    println!("  Skipped:  {} (already present)", state.skipped_count);
    if state.failed_count > 0 {
        println!("  Failed:   {}", style(state.failed_count).red());
    }
    println!("  Total:    {} downloaded", state.total_downloaded());
}

/// Print global statistics across all profiles.
pub fn print_global_stats(state: &GlobalState) {
    println!();
    println!("{}", style("═".repeat(50)).dim());
    println!("{}", style("Global Statistics:").bold());
    println!("  Profiles processed: {}", state.profiles_processed);
    if state.profiles_failed > 0 {
        println!(
            "  Profiles failed:    {}",
            style(state.profiles_failed).red()
        );
    }
    println!("  Pictures: {}", state.pic_count);
    println!("  Videos:   {}", state.vid_count);
    println!("  Skipped:  {} (already present)", state.skipped_count);
    println!("  Failed:   {}", state.failed_count);
    println!("  Total:    {} downloaded", state.total_downloaded());
    println!("{}", style("═".repeat(50)).dim());
}
