//! Privacy Downloader - CLI entry point.

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;

use privacy_downloader::{
    api::PrivacyApi,
    cli::Args,
    config::{validate_config, Config},
    download::{download_profile, DownloadState, GlobalState},
    error::{exit_codes, Error, Result},
    fs::{ensure_dir, profile_folder},
    hls::{Diagnostics, FfmpegTranscoder, ResourceFetcher, TracingDiagnostics, VideoPipeline},
    media::MediaKind,
    output::{
        create_spinner, init_logging, print_banner, print_config_summary, print_error,
        print_global_stats, print_info, print_profile_stats, print_success, print_warning,
    },
};

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::from(exit_codes::SUCCESS as u8),
        Err(e) => {
            print_error(&format!("{}", e));
            let code = match e {
                Error::Config(_) | Error::ConfigValidation { .. } | Error::MissingConfig(_) => {
                    exit_codes::CONFIG_ERROR
                }
                Error::Authentication(_) | Error::Api(_) => exit_codes::API_ERROR,
                Error::Download(_) | Error::M3U8(_) | Error::FFmpegNotFound => {
                    exit_codes::DOWNLOAD_ERROR
                }
                Error::Partial(_) => exit_codes::SOME_PROFILES_FAILED,
                _ => exit_codes::UNEXPECTED_ERROR,
            };
            ExitCode::from(code as u8)
        }
    }
}

async fn run() -> Result<()> {
    // Parse CLI arguments
    let args = Args::parse();

    print_banner();

    // Load configuration
    let config_path = args.config.clone();
    let mut config = if config_path.exists() {
        Config::load(&config_path)?
    } else {
        print_warning(&format!(
            "Configuration file not found: {}",
            config_path.display()
        ));
        print_info("Using default configuration with CLI arguments");
        Config::default()
    };

    args.merge_into_config(&mut config);

    // Set up logging once the debug settings are final
    init_logging(config.options.debug, &config.options.log_file)?;

    validate_config(&config)?;

    let base_dir = config.download_directory();
    print_config_summary(
        &config.profiles.names,
        &config.options.media.to_string(),
        config.options.workers,
        &base_dir.display().to_string(),
    );

    let diagnostics: Arc<dyn Diagnostics> = Arc::new(TracingDiagnostics::new(config.options.debug));

    // Resolve ffmpeg before any network work when videos are wanted
    let settings = config.transcode.reencode_settings();
    let transcoder = match &config.transcode.ffmpeg_path {
        Some(path) => FfmpegTranscoder::new(path, settings),
        None if config.options.media.includes(MediaKind::Video) => {
            FfmpegTranscoder::locate(settings)?
        }
        None => FfmpegTranscoder::new("ffmpeg", settings),
    };
    tracing::debug!("Using ffmpeg at {}", transcoder.program().display());

    // Authenticate
    print_info("Connecting to Privacy...");
    let client = PrivacyApi::build_client(&config.http)?;
    let api = match config.account.token.as_deref().filter(|t| !t.trim().is_empty()) {
        Some(token) => PrivacyApi::with_token(client, token.trim()),
        None => {
            PrivacyApi::login(client, &config.account.email, &config.account.password).await?
        }
    };
    print_success("Authenticated");

    let fetcher = ResourceFetcher::new(
        api.http_client().clone(),
        config.http.referer.clone(),
        diagnostics.clone(),
    );
    let pipeline = VideoPipeline::new(fetcher, Arc::new(transcoder), diagnostics);

    let profiles = resolve_profiles(&api, &config).await?;
    if profiles.is_empty() {
        print_warning("No profiles to download");
        return Ok(());
    }

    let mut global_state = GlobalState::default();

    for profile in &profiles {
        print_info(&format!("Processing profile: {}", profile));

        match process_profile(&api, &pipeline, &config, profile).await {
            Ok(state) => {
                print_profile_stats(&state);
                global_state.add_profile_stats(&state);
            }
            Err(e) => {
                print_error(&format!("Failed to process {}: {}", profile, e));
                global_state.mark_profile_failed();
            }
        }
    }

    print_global_stats(&global_state);

    if global_state.profiles_failed > 0 {
        return Err(Error::Partial(format!(
            "{} of {} profile(s) failed",
            global_state.profiles_failed,
            profiles.len()
        )));
    }

    Ok(())
}

/// Configured profiles, or every followed profile sorted case-insensitively.
async fn resolve_profiles(api: &PrivacyApi, config: &Config) -> Result<Vec<String>> {
    if !config.profiles.names.is_empty() {
        return Ok(config.profiles.names.clone());
    }

    let spinner = create_spinner("Fetching followed profiles...");
    let result = api.get_profiles().await;
    spinner.finish_and_clear();

    let mut profiles = result?;
    profiles.sort_by_key(|p| p.to_lowercase());
    profiles.dedup();
    print_info(&format!("Following {} profile(s)", profiles.len()));

    Ok(profiles)
}

/// Process a single profile.
async fn process_profile(
    api: &PrivacyApi,
    pipeline: &VideoPipeline,
    config: &Config,
    profile: &str,
) -> Result<DownloadState> {
    let base_path = profile_folder(&config.download_directory(), profile)?;
    ensure_dir(&base_path)?;
    let mut state = DownloadState::new(profile, base_path);

    download_profile(api, pipeline, config, &mut state).await?;

    Ok(state)
}
