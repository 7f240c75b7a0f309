use anyhow::Result;
use clap::{Arg, ArgAction, ArgMatches, Command};
use std::path::{Path, PathBuf};

/// Remote folder the images are served from after upload.
pub const DEFAULT_BASE_URL: &str =
    "https://raw.githubusercontent.com/devinschumacher/uploads/main/images";

/// Link prefix marking an image as living in the local images root.
pub const DEFAULT_IMAGE_PREFIX: &str = "/images/";

pub const DEFAULT_SCRIPT_NAME: &str = "copy_images.sh";

pub struct Config {
    pub markdown_dir: PathBuf,
    pub images_dir: PathBuf,
    pub base_url: String,
    pub script_path: PathBuf,
    pub image_prefix: String,
    pub dry_run: bool,
    pub verbosity: u8,
}

impl Config {
    /// Builds a config for `markdown_dir` with every other field at its default.
    pub fn for_markdown_dir(markdown_dir: impl Into<PathBuf>) -> Self {
        let markdown_dir = markdown_dir.into();
        Self {
            images_dir: default_images_dir(&markdown_dir),
            script_path: markdown_dir.join(DEFAULT_SCRIPT_NAME),
            markdown_dir,
            base_url: DEFAULT_BASE_URL.to_string(),
            image_prefix: DEFAULT_IMAGE_PREFIX.to_string(),
            dry_run: false,
            verbosity: 0,
        }
    }
}

/// Images sit next to the markdown folder by default: `<markdown_dir>/../images`.
fn default_images_dir(markdown_dir: &Path) -> PathBuf {
    markdown_dir
        .parent()
        .map(|p| p.join("images"))
        .unwrap_or_else(|| markdown_dir.join("images"))
}

pub fn build_command() -> Command {
    Command::new("md-image-migrate")
        .version(env!("CARGO_PKG_VERSION"))
        .author("Matias Hiltunen")
        .about("Rewrites local markdown image links to remote URLs and scripts the upload copy")
        .arg(
            Arg::new("markdown-dir")
                .short('m')
                .long("markdown-dir")
                .value_name("DIR")
                .help("Directory whose *.md files are rewritten (default: current directory)")
                .num_args(1),
        )
        .arg(
            Arg::new("images-dir")
                .short('i')
                .long("images-dir")
                .value_name("DIR")
                .help("Directory holding the local image files (default: <markdown-dir>/../images)")
                .num_args(1),
        )
        .arg(
            Arg::new("base-url")
                .short('u')
                .long("base-url")
                .value_name("URL")
                .help("Remote URL the images will be served from")
                .num_args(1),
        )
        .arg(
            Arg::new("script")
                .short('o')
                .long("script")
                .value_name("FILE")
                .help("Where to write the copy script (default: <markdown-dir>/copy_images.sh)")
                .num_args(1),
        )
        .arg(
            Arg::new("prefix")
                .short('p')
                .long("prefix")
                .value_name("PREFIX")
                .help("Link prefix that marks a local image")
                .num_args(1),
        )
        .arg(
            Arg::new("dry-run")
                .short('n')
                .long("dry-run")
                .help("Report what would change without writing anything")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Increase log output (-v info, -vv debug)")
                .action(ArgAction::Count),
        )
}

pub fn parse_args() -> Result<Config> {
    let matches = build_command().get_matches();
    config_from_matches(&matches, &std::env::current_dir()?)
}

/// Resolves parsed arguments into a `Config`, anchoring relative paths at `cwd`.
pub fn config_from_matches(matches: &ArgMatches, cwd: &Path) -> Result<Config> {
    let markdown_dir = matches
        .get_one::<String>("markdown-dir")
        .map(|s| cwd.join(s))
        .unwrap_or_else(|| cwd.to_path_buf());

    let mut config = Config::for_markdown_dir(markdown_dir);

    if let Some(dir) = matches.get_one::<String>("images-dir") {
        config.images_dir = cwd.join(dir);
    }
    if let Some(url) = matches.get_one::<String>("base-url") {
        if url.trim_end_matches('/').is_empty() {
            anyhow::bail!("--base-url must not be empty");
        }
        config.base_url = url.clone();
    }
    if let Some(script) = matches.get_one::<String>("script") {
        config.script_path = cwd.join(script);
    }
    if let Some(prefix) = matches.get_one::<String>("prefix") {
        if prefix.is_empty() {
            anyhow::bail!("--prefix must not be empty");
        }
        config.image_prefix = prefix.clone();
    }

    config.dry_run = matches.get_flag("dry-run");
    config.verbosity = matches.get_count("verbose");

    Ok(config)
}
