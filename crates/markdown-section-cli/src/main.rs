use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use log::{debug, LevelFilter};
use markdown_section::{MarkdownOptions, SectionOptions, SectionWrapper};
use markdown_section_config::{check_class_prefix, check_custom_class, Config, LoadOptions};
use std::{
    fs,
    io::{self, Read, Write},
    path::PathBuf,
};

#[derive(Parser)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to markdown file, or `-` for stdin
    #[arg(value_name = "FILE", default_value = "-")]
    path: PathBuf,

    /// Config file applied on top of discovered ones
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Do not add the `section-h{level}` class
    #[arg(long)]
    no_section_class: bool,

    /// Add an `h{level}` class to every section
    #[arg(long)]
    heading_class: bool,

    /// Add a `{PREFIX}h{level}` class to every section
    #[arg(long, value_name = "PREFIX")]
    class_prefix: Option<String>,

    /// Add this class verbatim to every section
    #[arg(long = "class", value_name = "CLASS")]
    custom_class: Option<String>,

    /// Enable tables, strikethrough and task lists
    #[arg(long)]
    gfm: bool,

    /// Print the grouped document tree instead of HTML
    #[arg(long)]
    outline: bool,

    /// Log debug output (repeat for trace output)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut load = LoadOptions::default();
    if let Some(path) = &cli.config {
        load = load.with_override_path(path);
    }
    let config = Config::load(load).context("Unable to load configuration")?;
    debug!(
        "configuration resolved from {} layer(s)",
        config.sources.layers.len()
    );

    let classes = apply_class_flags(config.classes, &cli)?;
    let markdown = if cli.gfm {
        MarkdownOptions {
            tables: true,
            strikethrough: true,
            tasklists: true,
            ..config.markdown
        }
    } else {
        config.markdown
    };
    let wrapper = SectionWrapper::new(classes).with_markdown_options(markdown);

    let source = read_source(&cli.path).with_context(|| {
        format!(
            "Unable to read markdown at path or stream: {}",
            cli.path.display()
        )
    })?;

    let rendered = if cli.outline {
        wrapper.outline(&source)
    } else {
        wrapper.render(&source).context("Failed to render html")?
    };

    print_output(&rendered)
}

fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn apply_class_flags(mut classes: SectionOptions, cli: &Cli) -> Result<SectionOptions> {
    if cli.no_section_class {
        classes.section_class = false;
    }
    if cli.heading_class {
        classes.heading_class = true;
    }
    if let Some(prefix) = &cli.class_prefix {
        if let Some(message) = check_class_prefix(prefix) {
            anyhow::bail!("Invalid --class-prefix: {message}");
        }
        classes.custom_class_prefix = prefix.clone();
    }
    if let Some(class) = &cli.custom_class {
        if let Some(message) = check_custom_class(class) {
            anyhow::bail!("Invalid --class: {message}");
        }
        classes.custom_class = class.clone();
    }
    Ok(classes)
}

fn read_source(path: &PathBuf) -> Result<String> {
    if path == &PathBuf::from("-") {
        let mut source = String::new();
        io::stdin().lock().read_to_string(&mut source)?;
        Ok(source)
    } else {
        Ok(fs::read_to_string(path)?)
    }
}

fn print_output(rendered: &str) -> Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();

    match handle.write_all(rendered.as_bytes()) {
        Ok(_) => {}
        Err(err) if should_ignore_pipe_error(&err) => return Ok(()),
        Err(err) => return Err(err).context("Failed to write output"),
    }

    match handle.flush() {
        Ok(_) => Ok(()),
        Err(err) if should_ignore_pipe_error(&err) => Ok(()),
        Err(err) => Err(err).context("Failed to flush stdout"),
    }
}

fn should_ignore_pipe_error(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::BrokenPipe | io::ErrorKind::WouldBlock
    )
}
