use crate::agent::{AgentConfig, DEFAULT_MODEL, DEFAULT_TIMEOUT_SECS, Provider};
use crate::filewalker::{DEFAULT_MAX_DEPTH, DiscoveryOptions};
use crate::prompt::DEFAULT_TEMPLATE;
use anyhow::{Context, Result, bail};
use clap::{Arg, ArgAction, ArgMatches, Command, value_parser};
use std::ffi::OsString;
use std::path::PathBuf;

/// What a single invocation should do.
#[derive(Debug, Clone)]
pub enum Mode {
    /// Document the project at `input` (a path or repository URL).
    Generate { input: String },
    /// Score `generated` against `original`.
    Grade {
        original: PathBuf,
        generated: PathBuf,
    },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub mode: Mode,
    pub template: String,
    pub discovery: DiscoveryOptions,
    pub output_path: Option<PathBuf>,
    #[cfg(feature = "git")]
    pub git_branch: Option<String>,
    pub agent: AgentConfig,
    /// Print the prompt instead of calling the provider.
    pub dry_run: bool,
    /// Emit grade reports as JSON instead of Markdown.
    pub json: bool,
    pub verbosity: u8,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mode: Mode::Generate {
                input: ".".to_string(),
            },
            template: DEFAULT_TEMPLATE.to_string(),
            discovery: DiscoveryOptions::default(),
            output_path: None,
            #[cfg(feature = "git")]
            git_branch: None,
            agent: AgentConfig::default(),
            dry_run: false,
            json: false,
            verbosity: 0,
        }
    }
}

impl Config {
    #[cfg(feature = "git")]
    pub fn branch(&self) -> Option<&str> {
        self.git_branch.as_deref()
    }

    #[cfg(not(feature = "git"))]
    pub fn branch(&self) -> Option<&str> {
        None
    }
}

fn command() -> Command {
    let cmd = Command::new("repodoc")
        .version(clap::crate_version!())
        .about("Generates Markdown documentation for a Python project with an LLM")
        .arg(
            Arg::new("input")
                .value_name("PATH_OR_URL")
                .help("Local directory or GitHub repository URL (https://github.com/owner/repo)")
                .required_unless_present("grade"),
        )
        .arg(
            Arg::new("grade")
                .long("grade")
                .value_names(["ORIGINAL", "GENERATED"])
                .num_args(2)
                .value_parser(value_parser!(PathBuf))
                .conflicts_with("input")
                .help("Grade generated documentation against the original"),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("FILE")
                .value_parser(value_parser!(PathBuf))
                .help("Write the result to FILE instead of stdout"),
        )
        .arg(
            Arg::new("template")
                .short('t')
                .long("template")
                .value_name("FILE")
                .value_parser(value_parser!(PathBuf))
                .conflicts_with("template_text")
                .help("Read the documentation template from FILE"),
        )
        .arg(
            Arg::new("template_text")
                .long("template-text")
                .value_name("TEXT")
                .help("Documentation template given inline (Markdown headers)"),
        )
        .arg(
            Arg::new("max_depth")
                .long("max-depth")
                .value_name("N")
                .value_parser(value_parser!(usize))
                .default_value(DEFAULT_MAX_DEPTH.to_string())
                .help("Scan files in directories fewer than N levels below the root"),
        )
        .arg(
            Arg::new("extension")
                .long("extension")
                .value_name("EXT")
                .default_value("py")
                .help("Source file extension to scan"),
        )
        .arg(
            Arg::new("gitignore")
                .long("gitignore")
                .action(ArgAction::SetTrue)
                .help("Skip files matched by .gitignore rules"),
        )
        .arg(
            Arg::new("dry_run")
                .long("dry-run")
                .action(ArgAction::SetTrue)
                .help("Print the prompt instead of calling the model"),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .action(ArgAction::SetTrue)
                .requires("grade")
                .help("Print the grade report as JSON"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::Count)
                .help("Increase log output (-v info, -vv debug, -vvv trace)"),
        )
        .arg(
            Arg::new("provider")
                .long("provider")
                .env("REPODOC_PROVIDER")
                .value_parser(["openai", "azure"])
                .default_value("openai")
                .help("Model provider"),
        )
        .arg(
            Arg::new("api_base")
                .long("api-base")
                .env("REPODOC_API_BASE")
                .value_name("URL")
                .help("Provider endpoint (required for Azure)"),
        )
        .arg(
            Arg::new("api_key")
                .long("api-key")
                .env("REPODOC_API_KEY")
                .hide_env_values(true)
                .value_name("KEY")
                .help("Provider API key"),
        )
        .arg(
            Arg::new("api_version")
                .long("api-version")
                .env("REPODOC_API_VERSION")
                .value_name("VERSION")
                .help("Azure OpenAI API version"),
        )
        .arg(
            Arg::new("model")
                .long("model")
                .env("REPODOC_MODEL")
                .default_value(DEFAULT_MODEL)
                .help("Model name, or deployment name for Azure"),
        )
        .arg(
            Arg::new("temperature")
                .long("temperature")
                .value_parser(value_parser!(f32))
                .default_value("0")
                .help("Sampling temperature"),
        )
        .arg(
            Arg::new("timeout")
                .long("timeout")
                .value_name("SECONDS")
                .value_parser(value_parser!(u64))
                .default_value(DEFAULT_TIMEOUT_SECS.to_string())
                .help("Request timeout for the model call"),
        );

    #[cfg(feature = "git")]
    let cmd = cmd.arg(
        Arg::new("branch")
            .short('b')
            .long("branch")
            .value_name("NAME")
            .help("Branch to check out when cloning a repository"),
    );

    cmd
}

pub fn parse_args() -> Result<Config> {
    parse_from(std::env::args_os())
}

/// Parses `args` (including the program name) into a [`Config`].
pub fn parse_from<I, T>(args: I) -> Result<Config>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let matches = command().get_matches_from(args);
    config_from_matches(&matches)
}

fn config_from_matches(matches: &ArgMatches) -> Result<Config> {
    let mode = match matches.get_many::<PathBuf>("grade") {
        Some(mut paths) => {
            let (Some(original), Some(generated)) = (paths.next(), paths.next()) else {
                bail!("--grade needs ORIGINAL and GENERATED files");
            };
            Mode::Grade {
                original: original.clone(),
                generated: generated.clone(),
            }
        }
        None => Mode::Generate {
            input: matches
                .get_one::<String>("input")
                .cloned()
                .context("missing PATH_OR_URL")?,
        },
    };

    let template = match (
        matches.get_one::<PathBuf>("template"),
        matches.get_one::<String>("template_text"),
    ) {
        (Some(path), _) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read template: {}", path.display()))?,
        (None, Some(text)) => text.clone(),
        (None, None) => DEFAULT_TEMPLATE.to_string(),
    };

    let max_depth = matches
        .get_one::<usize>("max_depth")
        .copied()
        .unwrap_or(DEFAULT_MAX_DEPTH);
    let extension = matches
        .get_one::<String>("extension")
        .map(|ext| ext.trim_start_matches('.').to_string())
        .unwrap_or_else(|| "py".to_string());
    if extension.is_empty() {
        bail!("--extension must not be empty");
    }

    let provider: Provider = matches
        .get_one::<String>("provider")
        .map(String::as_str)
        .unwrap_or("openai")
        .parse()?;

    let agent = AgentConfig {
        provider,
        api_base: matches.get_one::<String>("api_base").cloned(),
        api_key: matches.get_one::<String>("api_key").cloned(),
        api_version: matches.get_one::<String>("api_version").cloned(),
        model: matches
            .get_one::<String>("model")
            .cloned()
            .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
        temperature: matches.get_one::<f32>("temperature").copied().unwrap_or(0.0),
        timeout_secs: matches
            .get_one::<u64>("timeout")
            .copied()
            .unwrap_or(DEFAULT_TIMEOUT_SECS),
    };

    Ok(Config {
        mode,
        template,
        discovery: DiscoveryOptions {
            max_depth,
            extension,
            respect_gitignore: matches.get_flag("gitignore"),
        },
        output_path: matches.get_one::<PathBuf>("output").cloned(),
        #[cfg(feature = "git")]
        git_branch: matches.get_one::<String>("branch").cloned(),
        agent,
        dry_run: matches.get_flag("dry_run"),
        json: matches.get_flag("json"),
        verbosity: matches.get_count("verbose"),
    })
}
