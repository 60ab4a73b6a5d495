/// Desktop entry point: the viewer window and read-only reports
#[cfg(not(target_arch = "wasm32"))]
fn main() {
    if let Err(e) = cli::run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

// WASM doesn't use main(), it uses wasm_bindgen's start function
#[cfg(target_arch = "wasm32")]
fn main() {}

#[cfg(not(target_arch = "wasm32"))]
mod cli {
    use std::error::Error;
    use std::io::{self, Write};
    use std::path::{Path, PathBuf};

    use annotation_viewer::config::ViewerConfig;
    use annotation_viewer::constants::{DEFAULT_EXPECTED_PROMPTS, DEFAULT_REPORT_PATTERN};
    use annotation_viewer::error::ViewerError;
    use annotation_viewer::manifest::{ManifestState, load_manifest};
    use annotation_viewer::message::Message;
    use annotation_viewer::native::{run_viewer, start_session};
    use annotation_viewer::report::{
        AnnotationStats, coverage_gaps, find_bundle_files, list_flagged, load_bundles, write_csv,
    };
    use annotation_viewer::source::FsSource;
    use annotation_viewer::views::{AnnotationPanel, AuxiliaryTag, ViewMode, humanize_key};
    use clap::{Args, Parser, Subcommand};

    #[derive(Parser)]
    #[command(name = "annotation-viewer")]
    #[command(about = "Browse pre-computed vision-model image annotations")]
    #[command(version)]
    struct Cli {
        #[command(subcommand)]
        command: Commands,

        /// Configuration file (defaults to the user config directory)
        #[arg(short, long, global = true)]
        config: Option<PathBuf>,

        /// Data directory holding the manifest, images and annotations
        #[arg(short, long, global = true)]
        data_dir: Option<PathBuf>,

        /// Enable debug logging
        #[arg(short, long, global = true)]
        verbose: bool,
    }

    #[derive(Subcommand)]
    enum Commands {
        /// Open the viewer window
        Browse,

        /// List the manifest's images and their derived paths
        Images,

        /// Print one image's annotation
        Show {
            /// Image id from the manifest
            image_id: String,

            /// Model name or 1-based number
            #[arg(short, long)]
            model: Option<String>,

            /// Prompt key or 1-based number
            #[arg(short, long)]
            prompt: Option<String>,

            /// Show the structured view when available
            #[arg(long)]
            structured: bool,

            /// Print only the copy payload
            #[arg(long)]
            copy: bool,
        },

        /// Count annotations per model
        Stats(ReportArgs),

        /// List prompt results that carry quality flags
        Flagged(ReportArgs),

        /// List expected prompt keys each model is missing
        Coverage {
            #[command(flatten)]
            report: ReportArgs,

            /// Expected prompt keys (comma separated or repeated)
            #[arg(long, value_delimiter = ',')]
            expect: Vec<String>,
        },

        /// Export every prompt result to CSV
        ExportCsv {
            #[command(flatten)]
            report: ReportArgs,

            /// Output CSV file
            output: PathBuf,

            /// Include token and timing columns
            #[arg(long)]
            metrics: bool,
        },

        /// Write a configuration file with the current settings
        InitConfig {
            /// Target file (defaults to the user config directory)
            path: Option<PathBuf>,

            /// Overwrite an existing file
            #[arg(long)]
            force: bool,
        },
    }

    #[derive(Args)]
    struct ReportArgs {
        /// Directory with annotation bundle files
        dir: PathBuf,

        /// File name pattern (`prefix*suffix`)
        #[arg(long, default_value = DEFAULT_REPORT_PATTERN)]
        pattern: String,

        /// Search subdirectories too
        #[arg(short, long)]
        recursive: bool,
    }

    pub fn run() -> Result<(), Box<dyn Error>> {
        let cli = Cli::parse();
        let mut config = load_config(cli.config.as_deref())?;

        let level = if cli.verbose {
            log::LevelFilter::Debug
        } else {
            config.log_level
        };
        env_logger::Builder::new()
            .filter_level(level)
            .parse_default_env()
            .init();

        if let Some(dir) = &cli.data_dir {
            config.paths.base_path = dir.to_string_lossy().into_owned();
        }

        match cli.command {
            Commands::Browse => run_viewer(config, FsSource::new("."))?,
            Commands::Images => images(&config)?,
            Commands::Show {
                image_id,
                model,
                prompt,
                structured,
                copy,
            } => show(config, &image_id, model, prompt, structured, copy)?,
            Commands::Stats(args) => {
                let bundles = load_bundles(&report_files(&args)?);
                let stats = AnnotationStats::from_bundles(&bundles);
                println!("Files processed: {}", stats.files_processed);
                println!("Total annotations: {}", stats.total_annotations);
                println!("Model counts:");
                for (model, count) in &stats.model_counts {
                    println!("  {}: {}", model, count);
                }
                println!("Models: {}", stats.models().join(", "));
            }
            Commands::Flagged(args) => {
                let bundles = load_bundles(&report_files(&args)?);
                let flagged = list_flagged(&bundles);
                for entry in &flagged {
                    println!(
                        "{} [{}] {} / {}: {} ({} chars{})",
                        entry.image_id,
                        entry.file,
                        entry.model,
                        entry.prompt_key,
                        entry.flags.join(", "),
                        entry.response_length,
                        entry
                            .error
                            .as_deref()
                            .map(|e| format!(", error: {}", e))
                            .unwrap_or_default()
                    );
                }
                println!("{} flagged prompt results", flagged.len());
            }
            Commands::Coverage { report, expect } => {
                let expected = if expect.is_empty() {
                    DEFAULT_EXPECTED_PROMPTS.iter().map(|k| k.to_string()).collect()
                } else {
                    expect
                };
                let bundles = load_bundles(&report_files(&report)?);
                let gaps = coverage_gaps(&bundles, &expected);
                for gap in &gaps {
                    println!("{}", gap.image_id);
                    for (model, keys) in &gap.missing {
                        println!("  {}: missing {}", model, keys.join(", "));
                    }
                }
                println!(
                    "{} of {} bundles have missing prompts",
                    gaps.len(),
                    bundles.len()
                );
            }
            Commands::ExportCsv {
                report,
                output,
                metrics,
            } => {
                let bundles = load_bundles(&report_files(&report)?);
                let file = std::fs::File::create(&output)?;
                let mut writer = io::BufWriter::new(file);
                let rows = write_csv(&mut writer, &bundles, metrics)?;
                println!("Exported {} rows to {}", rows, output.display());
            }
            Commands::InitConfig { path, force } => {
                let path = path
                    .or_else(ViewerConfig::default_path)
                    .ok_or("No configuration directory; pass a path")?;
                if path.exists() && !force {
                    return Err(format!("{} exists; use --force to replace it", path.display()).into());
                }
                config.save_to(&path)?;
                println!("Wrote {}", path.display());
            }
        }

        Ok(())
    }

    fn load_config(path: Option<&Path>) -> Result<ViewerConfig, Box<dyn Error>> {
        match path {
            Some(path) => Ok(ViewerConfig::load_from(path)?),
            None => Ok(ViewerConfig::load_from_default_path().unwrap_or_default()),
        }
    }

    fn report_files(args: &ReportArgs) -> Result<Vec<PathBuf>, Box<dyn Error>> {
        Ok(find_bundle_files(&args.dir, &args.pattern, args.recursive)?)
    }

    /// A 1-based number or an exact name from `options`.
    fn choose(arg: &str, options: &[&str]) -> Option<String> {
        if let Ok(n) = arg.parse::<usize>() {
            if let Some(option) = n.checked_sub(1).and_then(|i| options.get(i)) {
                return Some(option.to_string());
            }
        }
        options
            .iter()
            .find(|option| **option == arg)
            .map(|option| option.to_string())
    }

    fn images(config: &ViewerConfig) -> Result<(), Box<dyn Error>> {
        let load = pollster::block_on(load_manifest(
            &FsSource::new("."),
            &config.manifest_location(),
            &config.paths,
        ));
        if let ManifestState::Failed(reason) = &load.state {
            return Err(reason.clone().into());
        }

        for (index, record) in load.images.iter().enumerate() {
            println!("{:>5}  {}", index + 1, record.id);
            println!("       image:       {}", record.image_path);
            println!("       thumbnail:   {}", record.thumbnail_path);
            println!("       annotations: {}", record.bundle_path);
        }
        println!("{} images", load.images.len());
        Ok(())
    }

    fn show(
        config: ViewerConfig,
        image_id: &str,
        model: Option<String>,
        prompt: Option<String>,
        structured: bool,
        copy: bool,
    ) -> Result<(), Box<dyn Error>> {
        let mut session = start_session(config, FsSource::new("."))?;
        session.wait_idle();
        if !session.show_image(image_id) {
            return Err(ViewerError::unknown_image(image_id).into());
        }
        session.wait_idle();

        if let Some(arg) = model {
            let name = choose(&arg, &session.dashboard().model_names())
                .ok_or_else(|| format!("Unknown model: {}", arg))?;
            session.dispatch(Message::SelectModel(name));
            // Selecting a model clears the prompt; take its first one unless asked otherwise
            if prompt.is_none() {
                let first = session.dashboard().prompt_keys().first().map(|k| k.to_string());
                if let Some(first) = first {
                    session.dispatch(Message::SelectPrompt(first));
                }
            }
        }
        if let Some(arg) = prompt {
            let key = choose(&arg, &session.dashboard().prompt_keys())
                .ok_or_else(|| format!("Unknown prompt: {}", arg))?;
            session.dispatch(Message::SelectPrompt(key));
        }
        if structured {
            session.dispatch(Message::SetViewMode(ViewMode::Structured));
        }

        let mut stdout = io::stdout();
        if copy {
            return match session.dispatch(Message::Copy) {
                Some(payload) => Ok(writeln!(stdout, "{}", payload)?),
                None => Err("No annotation to copy".into()),
            };
        }

        let dashboard = session.dashboard();
        if let Some(status) = dashboard.status_message() {
            writeln!(stdout, "! {}", status)?;
        }
        let view = match dashboard.panel() {
            AnnotationPanel::Empty(state) => {
                writeln!(stdout, "{}", state.message())?;
                return Ok(());
            }
            AnnotationPanel::Annotation(view) => view,
        };

        writeln!(stdout, "{}", view.title())?;
        let others: Vec<String> = dashboard.prompt_keys().iter().map(|k| humanize_key(k)).collect();
        writeln!(stdout, "Prompts: {}", others.join(", "))?;
        if let Some(error) = view.error() {
            writeln!(stdout, "Error: {}", error)?;
        }
        if !view.quality_flags().is_empty() {
            writeln!(stdout, "Flags: {}", view.quality_flags().join(", "))?;
        }
        writeln!(stdout)?;

        match (view.mode(), view.structured_tree()) {
            (ViewMode::Structured, Some(tree)) => {
                for line in tree.outline() {
                    writeln!(stdout, "{}", line)?;
                }
            }
            _ => writeln!(stdout, "{}", view.response_text())?,
        }

        let metrics = view.metrics();
        if !metrics.is_empty() {
            writeln!(stdout)?;
            for metric in &metrics {
                writeln!(stdout, "{:<16} {}", format!("{}:", metric.label), metric.value)?;
            }
        }
        match view.auxiliary_tag() {
            AuxiliaryTag::Present(tag) => writeln!(stdout, "Auxiliary tag: {}", tag)?,
            AuxiliaryTag::Missing { link } => writeln!(stdout, "Auxiliary tag: none ({})", link)?,
        }
        if let Some(badge) = dashboard.badge() {
            writeln!(stdout, "Platform: {}", badge.summary)?;
        }
        Ok(())
    }
}
