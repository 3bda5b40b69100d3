//! Output module for console output and progress.
//!
//! Provides:
//! - Colored console output
//! - Logging setup with an optional debug log file
//! - Progress bars
//! - Statistics reporting

pub mod console;
pub mod logging;
pub mod progress;
pub mod stats;

pub use console::{
    print_banner, print_config_summary, print_error, print_info, print_success, print_warning,
};
pub use logging::init_logging;
pub use progress::{create_item_bar, create_spinner};
pub use stats::{print_global_stats, print_profile_stats};
