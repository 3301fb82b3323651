use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use hydrabot::{config::Paths, error::AppError, startup, VERSION};

/// Discord chat bot for StarCraft communities.
#[derive(Parser, Debug)]
#[command(name = "hydrabot", disable_version_flag = true)]
struct Args {
    /// Initialize only, without connecting to Discord.
    #[arg(short = 't', long = "test")]
    test: bool,

    /// Directory holding config.json (default: ~/.config/hydrabot/).
    #[arg(long = "cfg-path", env = "HYDRABOT_CFG_PATH", value_name = "PATH")]
    cfg_path: Option<PathBuf>,

    /// Directory for caches and the instance lock (default: ~/.cache/hydrabot/).
    #[arg(long = "cfg-cache", env = "HYDRABOT_CFG_CACHE", value_name = "PATH")]
    cfg_cache: Option<PathBuf>,

    /// Print the version and exit.
    #[arg(short = 'v', long = "version")]
    version: bool,
}

impl Args {
    fn paths(&self) -> Paths {
        let config = self.cfg_path.clone().unwrap_or_else(|| {
            dirs::config_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("hydrabot")
        });
        let cache = self.cfg_cache.clone().unwrap_or_else(|| {
            dirs::cache_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("hydrabot")
        });
        Paths { config, cache }
    }
}

fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    if args.version {
        println!("hydrabot {}", VERSION);
        return ExitCode::SUCCESS;
    }

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("hydrabot: error: {}.", e);
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run(args)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) if e.is_lock_held() => {
            eprintln!("hydrabot: error: another instance is already running.");
            ExitCode::FAILURE
        }
        Err(e) => {
            eprintln!("hydrabot: error: {}.", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<(), AppError> {
    let bot = startup::init(args.paths()).await?;

    if args.test {
        tracing::info!("Initialized in test mode, not connecting to Discord");
        return Ok(());
    }

    startup::connect(bot).await
}
