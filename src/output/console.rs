//! Console output utilities.

use console::style;

/// Print an info message.
pub fn print_info(message: &str) {
    println!("{} {}", style("INFO").cyan().bold(), message);
}

/// Print a success message.
pub fn print_success(message: &str) {
    println!("{} {}", style("OK").green().bold(), message);
}

/// Print a warning message.
pub fn print_warning(message: &str) {
    println!("{} {}", style("WARN").yellow().bold(), message);
}

/// Print an error message.
pub fn print_error(message: &str) {
    eprintln!("{} {}", style("ERROR").red().bold(), message);
}

/// Print the application banner.
pub fn print_banner() {
    let banner = r#"
╔═══════════════════════════════════════════════════════╗
║     Privacy Downloader                                ║
║     Photos and HLS videos from followed profiles      ║
╚═══════════════════════════════════════════════════════╝
"#;
    println!("{}", style(banner).cyan());
}

/// Print configuration summary.
pub fn print_config_summary(profiles: &[String], media: &str, workers: usize, download_dir: &str) {
    let profiles = if profiles.is_empty() {
        "all followed".to_string()
    } else {
        profiles.join(", ")
    };

    println!();
    println!("{}", style("Configuration:").bold());
    println!("  Profiles: {}", profiles);
    println!("  Media: {}", media);
    println!("  Workers: {}", workers);
    println!("  Directory: {}", download_dir);
    println!();
}
