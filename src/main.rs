use clap::{Args, Parser, Subcommand};
use quickconvert::batch::{self, BatchEvent, BatchJob, BatchRequest, CancelToken};
use quickconvert::config::{self, AppConfig};
use quickconvert::emit::DirectoryEmitter;
use quickconvert::history::HistoryLedger;
use quickconvert::imaging::{Dimensions, RustCodec, TargetFormat};
use quickconvert::output;
use quickconvert::presets::PRESETS;
use quickconvert::session::{
    Interrupt, Reply, Session, SessionCommand, SessionError, preset_dimensions,
};
use quickconvert::staging::{FileStaging, StagingMode};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::mpsc;

#[derive(Parser)]
#[command(name = "quickconvert")]
#[command(about = "Convert and resize images locally")]
#[command(long_about = "\
Convert and resize images locally

Files are staged in the order given (directories are walked for .jpg, .jpeg,
.png and .webp), processed in parallel, and written to the output directory
in that same order. Existing files are never overwritten: a second photo.png
is saved as \"photo (1).png\".

Examples:

  quickconvert convert --to webp holiday/         # every image in holiday/
  quickconvert resize --preset thailand visa.jpg  # 35x45 mm → 350x450 px
  quickconvert resize --width 600 --height 800 a.png b.jpg
  quickconvert session                            # interactive mode

Run 'quickconvert gen-config' to generate a documented quickconvert.toml.")]
#[command(version)]
struct Cli {
    /// Config file (default: ./quickconvert.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output directory (overrides config)
    #[arg(long, global = true)]
    output: Option<PathBuf>,

    /// JPEG quality 1-100 (overrides config)
    #[arg(long, global = true, value_parser = clap::value_parser!(u32).range(1..=100))]
    quality: Option<u32>,

    /// Print this run's conversion history when done
    #[arg(long, global = true)]
    history: bool,

    #[command(subcommand)]
    command: Command,
}

/// Files or directories to stage.
#[derive(Args, Clone)]
struct Inputs {
    #[arg(required = true)]
    paths: Vec<PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Convert images to another format
    Convert {
        /// Target format: png, jpg/jpeg or webp (JPEG output is always named .jpg)
        #[arg(long, default_value = "png")]
        to: TargetFormat,
        #[command(flatten)]
        inputs: Inputs,
    },
    /// Resize images to an exact size, keeping their format
    Resize {
        /// ID-photo preset (see 'quickconvert presets')
        #[arg(long, conflicts_with_all = ["width", "height"])]
        preset: Option<String>,
        /// Width in pixels (default from config)
        #[arg(long)]
        width: Option<u32>,
        /// Height in pixels (default from config)
        #[arg(long)]
        height: Option<u32>,
        #[command(flatten)]
        inputs: Inputs,
    },
    /// List ID-photo presets
    Presets,
    /// Interactive session reading commands from stdin
    Session,
    /// Print a stock quickconvert.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut app_config = config::load_config(cli.config.as_deref(), &std::env::current_dir()?)?;
    if let Some(dir) = &cli.output {
        app_config.output.directory = dir.clone();
    }
    if let Some(quality) = cli.quality {
        app_config.encoding.quality = quality;
    }
    app_config.validate()?;

    let clean = match cli.command {
        Command::Convert { to, inputs } => {
            let request = BatchRequest::Convert { target: to };
            run_once(&app_config, request, &inputs.paths, cli.history)?
        }
        Command::Resize {
            preset,
            width,
            height,
            inputs,
        } => {
            let target = match preset {
                Some(id) => preset_dimensions(&id)?,
                None => {
                    let fallback = app_config.default_dimensions();
                    Dimensions::new(
                        width.unwrap_or(fallback.width),
                        height.unwrap_or(fallback.height),
                    )
                }
            };
            let request = BatchRequest::Resize { target };
            run_once(&app_config, request, &inputs.paths, cli.history)?
        }
        Command::Presets => {
            output::print_presets(PRESETS);
            true
        }
        Command::Session => {
            run_session(&app_config, cli.history)?;
            true
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
            true
        }
    };

    if !clean {
        std::process::exit(1);
    }
    Ok(())
}

/// Stage `paths`, run one batch, and report whether every file was saved.
fn run_once(
    app_config: &AppConfig,
    request: BatchRequest,
    paths: &[PathBuf],
    show_history: bool,
) -> Result<bool, Box<dyn std::error::Error>> {
    init_thread_pool(&app_config.processing);

    let mut staging = FileStaging::new();
    staging.load_paths(paths, StagingMode::Image)?;
    if staging.is_empty() {
        println!("No images found");
        return Ok(true);
    }

    let mut emitter = DirectoryEmitter::new(&app_config.output.directory)?;
    let mut ledger = HistoryLedger::new();
    let cancel = install_cancel_handler()?;
    let job = BatchJob {
        request,
        quality: app_config.quality(),
        filter: app_config.resize.filter,
    };

    let (tx, rx) = mpsc::channel();
    let printer = spawn_printer(rx);
    let report = batch::run_batch(
        &RustCodec::new(),
        staging.files(),
        &job,
        &mut emitter,
        &mut ledger,
        &cancel,
        Some(tx),
    );
    printer.join().ok();

    if show_history {
        output::print_history(ledger.entries());
    }
    Ok(report.failed() == 0)
}

fn run_session(app_config: &AppConfig, show_history: bool) -> Result<(), Box<dyn std::error::Error>> {
    init_thread_pool(&app_config.processing);

    let codec = RustCodec::new();
    let mut emitter = DirectoryEmitter::new(&app_config.output.directory)?;
    let interrupt = Interrupt::new();
    let handler = interrupt.clone();
    ctrlc::set_handler(move || {
        if handler.interrupt() {
            println!();
            std::process::exit(130);
        }
    })?;
    let mut session = Session::new(app_config);

    println!(
        "quickconvert session, saving to {} ('help' lists commands)",
        emitter.dir().display()
    );
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("> ");
        io::stdout().flush()?;
        let Some(line) = lines.next() else {
            break;
        };
        let command = match SessionCommand::parse(&line?) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(err) => {
                eprintln!("error: {err}");
                continue;
            }
        };
        let reply = match command {
            SessionCommand::Run => run_streamed(&mut session, &codec, &mut emitter, &interrupt),
            command => session.execute(command, &codec, &mut emitter, interrupt.cancel_token()),
        };
        match reply {
            Ok(Reply::Lines(reply)) => {
                for line in reply {
                    println!("{}", line);
                }
            }
            Ok(Reply::Quit) => break,
            Err(err) => eprintln!("error: {err}"),
        }
    }

    if show_history {
        output::print_history(session.ledger().entries());
    }
    Ok(())
}

/// Run the staged batch, printing progress as it happens.
fn run_streamed(
    session: &mut Session,
    codec: &RustCodec,
    emitter: &mut DirectoryEmitter,
    interrupt: &Interrupt,
) -> Result<Reply, SessionError> {
    let _running = interrupt.begin_batch();
    let (tx, rx) = mpsc::channel();
    let printer = spawn_printer(rx);
    let result = session.run(codec, emitter, interrupt.cancel_token(), Some(tx));
    printer.join().ok();
    result.map(|_| Reply::Lines(Vec::new()))
}

/// Ctrl-C cancels the running batch instead of killing the process mid-write.
fn install_cancel_handler() -> Result<CancelToken, ctrlc::Error> {
    let cancel = CancelToken::new();
    let handle = cancel.clone();
    ctrlc::set_handler(move || handle.cancel())?;
    Ok(cancel)
}

fn spawn_printer(rx: mpsc::Receiver<BatchEvent>) -> std::thread::JoinHandle<()> {
    std::thread::spawn(move || {
        for event in rx {
            for line in output::format_batch_event(&event) {
                println!("{}", line);
            }
        }
    })
}

/// Size the global rayon pool from `[processing] max_processes`.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
