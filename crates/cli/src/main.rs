// CodeNest CLI - headless front-end for editor settings, remote execution and accounts

mod account;
mod exit_codes;
mod run;
mod settings;

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use codenest_api_client::{ApiClient, ApiError};
use codenest_config::{
    AppConfig, ConfigError, FileStorage, LocalStorage, Panel, SettingsCategory, SettingsError,
    StorageError,
};
use codenest_judge_client::JudgeError;

use exit_codes::*;

/// Log filter variable; defaults to `warn`
const LOG_ENV: &str = "CODENEST_LOG";

#[derive(Parser)]
#[command(name = "codenest")]
#[command(about = "CodeNest online IDE, headless")]
#[command(version)]
#[command(subcommand_required = false)]
struct Cli {
    /// Device storage file (session and local settings)
    #[arg(long, global = true, env = "CODENEST_STORAGE", value_name = "PATH")]
    storage: Option<PathBuf>,

    /// Config file (defaults to ~/.config/codenest/config.toml)
    #[arg(long, global = true, env = "CODENEST_CONFIG", value_name = "PATH")]
    config: Option<PathBuf>,

    /// Debug logging to stderr
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in with email and password
    Login {
        #[arg(long)]
        email: String,
        /// Read from stdin when omitted
        #[arg(long, env = "CODENEST_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Create an account (an OTP is emailed)
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long, env = "CODENEST_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Confirm a registration OTP and sign in
    Verify {
        #[arg(long)]
        email: String,
        #[arg(long)]
        otp: String,
    },

    /// Send a new registration OTP
    ResendOtp {
        #[arg(long)]
        email: String,
    },

    /// Check whether an account exists
    CheckEmail {
        email: String,
    },

    /// Sign out and clear the local session
    Logout,

    /// Show the signed-in user
    Whoami {
        /// Fetch the profile from the server instead of the stored copy
        #[arg(long)]
        refresh: bool,
        #[arg(long)]
        json: bool,
    },

    /// Show another account's public profile
    User {
        id: String,
        #[arg(long)]
        json: bool,
    },

    /// Email a password reset code
    ForgotPassword {
        #[arg(long)]
        email: String,
    },

    /// Reset a password with the emailed code
    ResetPassword {
        #[arg(long)]
        email: String,
        #[arg(long)]
        otp: String,
        /// New password; read from stdin when omitted
        #[arg(long, env = "CODENEST_NEW_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Change the password of the signed-in account
    ChangePassword {
        #[arg(long)]
        current: String,
        #[arg(long = "new")]
        new_password: String,
    },

    /// Sign in through an OAuth provider
    #[command(after_help = "\
Without --token, prints the URL to open in a browser. The callback page
hands back a token; pass it with --token to finish signing in.")]
    Social {
        provider: SocialProvider,
        #[arg(long)]
        token: Option<String>,
    },

    /// Execute a source file on the judge
    #[command(after_help = "\
Examples:
  codenest run hello.py
  codenest run main.c --stdin input.txt
  codenest run script --language bash --json")]
    Run {
        file: PathBuf,
        /// Language name; inferred from the file extension when omitted
        #[arg(long, short = 'l')]
        language: Option<String>,
        /// File to feed as program input ("-" for this process's stdin)
        #[arg(long, value_name = "FILE")]
        stdin: Option<PathBuf>,
        /// Print the normalized result as JSON
        #[arg(long)]
        json: bool,
    },

    /// List languages the judge can run
    Languages {
        #[arg(long)]
        json: bool,
    },

    /// Editor settings
    #[command(subcommand)]
    Settings(SettingsCommands),

    /// Editor page layout
    #[command(subcommand)]
    Layout(LayoutCommands),

    /// Config file
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Judge API key in the system keychain
    #[command(subcommand)]
    JudgeKey(JudgeKeyCommands),
}

#[derive(Subcommand)]
enum SettingsCommands {
    /// Print the stored settings as JSON
    Show,
    /// Print the editor widget options derived from the settings
    Options,
    /// Print one setting
    Get { key: String },
    /// Change one setting. VALUE is parsed as JSON, falling back to a string.
    #[command(after_help = "\
Examples:
  codenest settings set fontSize 18
  codenest settings set theme vs-light
  codenest settings set delay 500 --group hover")]
    Set {
        key: String,
        value: String,
        /// Nested group (hover, parameterHints, find, guides)
        #[arg(long)]
        group: Option<String>,
    },
    /// Restore defaults, for everything or one category
    Reset {
        #[arg(long)]
        category: Option<SettingsCategory>,
    },
    /// Replace settings from a JSON file
    Import { file: PathBuf },
    /// Upload local settings to the account
    Push,
    /// Replace local settings with the account's
    Pull,
}

#[derive(Subcommand)]
enum LayoutCommands {
    /// Print the layout settings as JSON
    Show,
    /// Toggle a panel (input or output)
    Toggle { panel: Panel },
    Expand { panel: Panel },
    Collapse { panel: Panel },
    /// Allow both panels to be open at once
    AllowMultiple {
        #[arg(action = clap::ArgAction::Set)]
        allow: bool,
    },
    /// Show or hide the footer
    Footer {
        #[arg(action = clap::ArgAction::Set)]
        visible: bool,
    },
    /// How a panel collapses (shrink or minimize)
    Behavior { panel: Panel, behavior: String },
    /// Restore the default layout
    Reset,
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Print the effective config (file plus environment) as TOML
    Show,
    /// Write a config file with the defaults
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Subcommand)]
enum JudgeKeyCommands {
    /// Store the key (read from stdin when omitted)
    Set { key: Option<String> },
    /// Remove the stored key
    Delete,
    /// Report where the key would be read from
    Status,
}

#[derive(Clone, Copy, ValueEnum)]
enum SocialProvider {
    Google,
    Github,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        None => {
            eprintln!("Usage: codenest <command> [options]");
            eprintln!("       codenest --help for more information");
            Ok(())
        }
        Some(command) => dispatch(command, cli.storage, cli.config),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

fn dispatch(command: Commands, storage: Option<PathBuf>, config: Option<PathBuf>) -> Result<(), CliError> {
    let ctx = || Context::load(storage.as_deref(), config.as_deref());

    match command {
        Commands::Login { email, password } => account::cmd_login(&ctx()?, email, password),
        Commands::Register { name, email, password } => account::cmd_register(&ctx()?, name, email, password),
        Commands::Verify { email, otp } => account::cmd_verify(&ctx()?, email, otp),
        Commands::ResendOtp { email } => account::cmd_resend_otp(&ctx()?, email),
        Commands::CheckEmail { email } => account::cmd_check_email(&ctx()?, email),
        Commands::Logout => account::cmd_logout(&ctx()?),
        Commands::Whoami { refresh, json } => account::cmd_whoami(&ctx()?, refresh, json),
        Commands::User { id, json } => account::cmd_user(&ctx()?, id, json),
        Commands::ForgotPassword { email } => account::cmd_forgot_password(&ctx()?, email),
        Commands::ResetPassword { email, otp, password } => {
            account::cmd_reset_password(&ctx()?, email, otp, password)
        }
        Commands::ChangePassword { current, new_password } => {
            account::cmd_change_password(&ctx()?, current, new_password)
        }
        Commands::Social { provider, token } => {
            let github = matches!(provider, SocialProvider::Github);
            account::cmd_social(&ctx()?, github, token)
        }
        Commands::Run { file, language, stdin, json } => run::cmd_run(&ctx()?, file, language, stdin, json),
        Commands::Languages { json } => run::cmd_languages(json),
        Commands::Settings(cmd) => {
            let ctx = ctx()?;
            match cmd {
                SettingsCommands::Show => settings::cmd_show(&ctx),
                SettingsCommands::Options => settings::cmd_options(&ctx),
                SettingsCommands::Get { key } => settings::cmd_get(&ctx, key),
                SettingsCommands::Set { key, value, group } => settings::cmd_set(&ctx, key, value, group),
                SettingsCommands::Reset { category } => settings::cmd_reset(&ctx, category),
                SettingsCommands::Import { file } => settings::cmd_import(&ctx, file),
                SettingsCommands::Push => settings::cmd_push(&ctx),
                SettingsCommands::Pull => settings::cmd_pull(&ctx),
            }
        }
        Commands::Layout(cmd) => {
            let ctx = ctx()?;
            match cmd {
                LayoutCommands::Show => settings::cmd_layout_show(&ctx),
                LayoutCommands::Toggle { panel } => settings::cmd_layout_toggle(&ctx, panel),
                LayoutCommands::Expand { panel } => settings::cmd_layout_expand(&ctx, panel, true),
                LayoutCommands::Collapse { panel } => settings::cmd_layout_expand(&ctx, panel, false),
                LayoutCommands::AllowMultiple { allow } => settings::cmd_layout_allow_multiple(&ctx, allow),
                LayoutCommands::Footer { visible } => settings::cmd_layout_footer(&ctx, visible),
                LayoutCommands::Behavior { panel, behavior } => settings::cmd_layout_behavior(&ctx, panel, behavior),
                LayoutCommands::Reset => settings::cmd_layout_reset(&ctx),
            }
        }
        Commands::Config(cmd) => match cmd {
            ConfigCommands::Show => settings::cmd_config_show(&ctx()?),
            ConfigCommands::Init { force } => {
                let path = config.clone().unwrap_or_else(AppConfig::config_path);
                settings::cmd_config_init(&path, force)
            }
        },
        Commands::JudgeKey(cmd) => match cmd {
            JudgeKeyCommands::Set { key } => run::cmd_judge_key_set(key),
            JudgeKeyCommands::Delete => run::cmd_judge_key_delete(),
            JudgeKeyCommands::Status => run::cmd_judge_key_status(),
        },
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug,hyper=warn,reqwest=warn,rustls=warn")
    } else {
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

// ============================================================================
// Context
// ============================================================================

/// Resolved config plus the open device storage
pub struct Context {
    pub config: AppConfig,
    pub storage: Arc<dyn LocalStorage>,
}

impl Context {
    fn load(storage: Option<&Path>, config: Option<&Path>) -> Result<Self, CliError> {
        let config = match config {
            Some(path) => {
                let mut c = AppConfig::load_from(path).map_err(CliError::config)?;
                c.apply_env(|name| std::env::var(name).ok());
                c
            }
            None => AppConfig::load().map_err(CliError::config)?,
        };

        let path = storage.map(Path::to_path_buf).unwrap_or_else(FileStorage::default_path);
        tracing::debug!("Device storage: {}", path.display());
        let storage = FileStorage::open(path).map_err(CliError::storage)?;

        Ok(Self { config, storage: Arc::new(storage) })
    }

    pub fn api(&self) -> Result<ApiClient, CliError> {
        ApiClient::new(&self.config.api_base, self.storage.clone()).map_err(CliError::api)
    }
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn usage(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    pub fn io(msg: impl Into<String>) -> Self {
        Self { code: EXIT_ERROR, message: msg.into(), hint: None }
    }

    pub fn api(err: ApiError) -> Self {
        let code = api_exit_code(&err);
        let hint = match &err {
            ApiError::NotAuthenticated => Some("run `codenest login --email <EMAIL>`".to_string()),
            ApiError::Unauthorized(_) => Some("the session was cleared; sign in again".to_string()),
            ApiError::Network(_) => Some(format!("is the backend reachable? (override with {})", codenest_config::app_config::API_BASE_ENV)),
            _ => None,
        };
        Self { code, message: err.to_string(), hint }
    }

    pub fn judge(err: JudgeError) -> Self {
        let code = judge_exit_code(&err);
        let hint = match &err {
            JudgeError::UnsupportedLanguage(_) => Some("see `codenest languages`".to_string()),
            JudgeError::Http(401, _) | JudgeError::Http(403, _) => {
                Some("set the judge key with `codenest judge-key set`".to_string())
            }
            _ => None,
        };
        Self { code, message: err.to_string(), hint }
    }

    pub fn settings(err: SettingsError) -> Self {
        let code = match &err {
            SettingsError::Storage(_) => EXIT_STORAGE,
            _ => EXIT_INVALID_SETTING,
        };
        Self { code, message: err.to_string(), hint: None }
    }

    pub fn storage(err: StorageError) -> Self {
        Self { code: EXIT_STORAGE, message: err.to_string(), hint: None }
    }

    pub fn config(err: ConfigError) -> Self {
        Self { code: EXIT_CONFIG, message: err.to_string(), hint: None }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}
