//! CLI command definitions, routing, and tracing setup.

use std::io::Write;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use helpbook_core::{ExtractionSummary, HelpBook, PageKind, ProgressReporter};
use helpbook_shared::{AppConfig, ExtractOptions, HelpBookError, init_config, load_config};
use helpbook_toc::Page;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use tracing::info;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// helpbook: read the platform's built-in syntax helper.
#[derive(Parser)]
#[command(
    name = "helpbook",
    version,
    about = "Read the syntax-helper container and extract its pages as structured records.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Container file to read. Takes precedence over --install-dir.
    #[arg(long, env = "HELPBOOK_CONTAINER", global = true)]
    pub container: Option<PathBuf>,

    /// Platform installation directory searched for the container.
    #[arg(long, env = "HELPBOOK_INSTALL_DIR", global = true)]
    pub install_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// List the named entities stored in the container.
    Entities,

    /// Print the page tree.
    Tree {
        /// Maximum depth to print (roots are depth 1).
        #[arg(short, long)]
        depth: Option<usize>,
    },

    /// Show how the root pages are classified.
    Roots,

    /// Extract one page and print its record as JSON.
    Page {
        /// Archive path of the page, as listed by `tree`.
        path: String,

        /// What the page documents.
        #[arg(short, long, value_enum)]
        kind: PageKindArg,
    },

    /// Extract the whole book as JSON.
    Extract {
        /// Write to this file instead of stdout.
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Skip enumeration catalogs.
        #[arg(long)]
        no_enums: bool,

        /// Skip type catalogs.
        #[arg(long)]
        no_types: bool,

        /// Abort on the first failing page instead of skipping it.
        #[arg(long)]
        strict: bool,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Page kinds accepted by `page --kind`.
#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub(crate) enum PageKindArg {
    Method,
    Property,
    Object,
    Constructor,
    Enum,
    EnumValue,
}

impl From<PageKindArg> for PageKind {
    fn from(kind: PageKindArg) -> Self {
        match kind {
            PageKindArg::Method => PageKind::Method,
            PageKindArg::Property => PageKind::Property,
            PageKindArg::Object => PageKind::Object,
            PageKindArg::Constructor => PageKind::Constructor,
            PageKindArg::Enum => PageKind::Enum,
            PageKindArg::EnumValue => PageKind::EnumValue,
        }
    }
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "helpbook=info",
        1 => "helpbook=debug",
        _ => "helpbook=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    // Logs go to stderr so JSON output on stdout stays clean.
    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) fn run(cli: Cli) -> Result<()> {
    let source = Source {
        container: cli.container,
        install_dir: cli.install_dir,
    };

    match cli.command {
        Command::Entities => cmd_entities(&source),
        Command::Tree { depth } => cmd_tree(&source, depth),
        Command::Roots => cmd_roots(&source),
        Command::Page { path, kind } => cmd_page(&source, &path, kind.into()),
        Command::Extract {
            out,
            no_enums,
            no_types,
            strict,
        } => {
            let overrides = Overrides {
                include_enums: !no_enums,
                include_types: !no_types,
                strict,
            };
            cmd_extract(&source, out.as_deref(), overrides)
        }
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(),
        },
    }
}

/// Where the container comes from, as given on the command line.
struct Source {
    container: Option<PathBuf>,
    install_dir: Option<PathBuf>,
}

/// Flags layered over the configured extraction options.
struct Overrides {
    include_enums: bool,
    include_types: bool,
    strict: bool,
}

impl Source {
    /// Open the book: explicit file, else search the installation directory
    /// from the flag or the config file.
    fn open(&self, options: ExtractOptions) -> Result<HelpBook> {
        if let Some(path) = &self.container {
            return Ok(HelpBook::open(path, options)?);
        }

        let config = load_config()?;
        let install_dir = self
            .install_dir
            .clone()
            .or_else(|| config.source.install_dir.as_ref().map(PathBuf::from))
            .ok_or_else(|| {
                eyre!("no container given: pass --container or --install-dir, or set source.install_dir in the config")
            })?;

        Ok(HelpBook::locate(
            &install_dir,
            &config.source.container_name,
            options,
        )?)
    }

    fn open_default(&self) -> Result<HelpBook> {
        let config = load_config()?;
        self.open(ExtractOptions::from(&config))
    }
}

fn print_json(value: &impl Serialize) -> Result<()> {
    let mut stdout = std::io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, value)?;
    writeln!(stdout)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Inspection commands
// ---------------------------------------------------------------------------

fn cmd_entities(source: &Source) -> Result<()> {
    let book = source.open_default()?;
    let reader = book.archive().reader();

    println!("{}", reader.path().display());
    for name in reader.entity_names() {
        let size = reader.entity(name)?.map_or(0, <[u8]>::len);
        println!("  {name:<24} {size:>12} bytes");
    }
    Ok(())
}

fn cmd_tree(source: &Source, depth: Option<usize>) -> Result<()> {
    let book = source.open_default()?;
    let tree = book.page_tree();
    info!(roots = tree.roots.len(), pages = tree.len(), "page tree loaded");

    let mut stdout = std::io::stdout().lock();
    for root in &tree.roots {
        print_page(&mut stdout, root, 1, depth)?;
    }
    Ok(())
}

fn print_page(out: &mut impl Write, page: &Page, level: usize, max: Option<usize>) -> Result<()> {
    if max.is_some_and(|max| level > max) {
        return Ok(());
    }

    let indent = "  ".repeat(level - 1);
    let title = &page.title;
    if title.ru.is_empty() || title.en.is_empty() {
        write!(out, "{indent}{}", title.display())?;
    } else {
        write!(out, "{indent}{} ({})", title.ru, title.en)?;
    }
    if page.has_content() {
        write!(out, "  [{}]", page.path)?;
    }
    writeln!(out)?;

    for child in &page.children {
        print_page(out, child, level + 1, max)?;
    }
    Ok(())
}

fn cmd_roots(source: &Source) -> Result<()> {
    let book = source.open_default()?;
    let roots = book.root_pages()?;

    let describe = |page: &Page| format!("{} [{}]", page.title.display(), page.path);
    println!("Global context: {}", describe(roots.global_context));
    println!("Enumerations:");
    for page in &roots.enum_catalogs {
        println!("  {}", describe(page));
    }
    println!("Types:");
    for page in &roots.type_catalogs {
        println!("  {}", describe(page));
    }
    Ok(())
}

fn cmd_page(source: &Source, path: &str, kind: PageKind) -> Result<()> {
    let book = source.open_default()?;
    let record = book.parse_page(path, kind)?;
    print_json(&record)
}

// ---------------------------------------------------------------------------
// Extraction
// ---------------------------------------------------------------------------

fn cmd_extract(source: &Source, out: Option<&Path>, overrides: Overrides) -> Result<()> {
    let config = load_config()?;
    let mut options = ExtractOptions::from(&config);
    options.include_enums = overrides.include_enums;
    options.include_types = overrides.include_types;
    if overrides.strict {
        options.skip_failed_pages = false;
    }

    let book = source.open(options)?;
    info!(path = %book.archive().reader().path().display(), "extracting help book");

    let reporter = CliProgress::new()?;
    let extraction = book.extract(&reporter)?;

    match out {
        Some(path) => {
            let json = serde_json::to_string_pretty(&extraction)?;
            std::fs::write(path, json).map_err(|e| HelpBookError::io(path, e))?;
            eprintln!("  Written to {}", path.display());
        }
        None => print_json(&extraction)?,
    }

    if !extraction.failures.is_empty() {
        eprintln!("  {} page(s) skipped:", extraction.failures.len());
        for failure in &extraction.failures {
            eprintln!("    {} ({}): {}", failure.title, failure.path, failure.error);
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner on stderr.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Result<Self> {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")?
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Ok(Self { spinner })
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn page_parsed(&self, path: &str, current: usize, total: usize) {
        self.spinner
            .set_message(format!("Parsing [{current}/{total}] {path}"));
    }

    fn page_failed(&self, path: &str, error: &HelpBookError) {
        self.spinner.println(format!("  skipped {path}: {error}"));
    }

    fn done(&self, summary: &ExtractionSummary) {
        self.spinner.finish_and_clear();
        eprintln!();
        eprintln!("  Help book extracted!");
        eprintln!("  Methods:     {}", summary.methods);
        eprintln!("  Properties:  {}", summary.properties);
        eprintln!("  Enums:       {}", summary.enums);
        eprintln!("  Types:       {}", summary.types);
        eprintln!("  Skipped:     {}", summary.failures);
        eprintln!("  Time:        {:.1}s", summary.elapsed.as_secs_f64());
        eprintln!();
    }
}

// ---------------------------------------------------------------------------
// Config commands
// ---------------------------------------------------------------------------

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show() -> Result<()> {
    let config: AppConfig = load_config()?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(ru: &str, en: &str, path: &str, children: Vec<Page>) -> Page {
        Page {
            title: helpbook_toc::PageTitle {
                en: en.into(),
                ru: ru.into(),
            },
            path: path.into(),
            children,
        }
    }

    fn render(root: &Page, max: Option<usize>) -> String {
        let mut out = Vec::new();
        print_page(&mut out, root, 1, max).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn tree_prints_both_titles_and_paths() {
        let root = page(
            "Коллекции",
            "Collections",
            "objects/catalog1.html",
            vec![page("", "Array", "objects/catalog1/Array.html", vec![])],
        );
        assert_eq!(
            render(&root, None),
            "Коллекции (Collections)  [objects/catalog1.html]\n  Array  [objects/catalog1/Array.html]\n"
        );
    }

    #[test]
    fn tree_depth_limits_output() {
        let root = page("А", "A", "", vec![page("Б", "B", "b.html", vec![])]);
        assert_eq!(render(&root, Some(1)), "А (A)\n");
    }

    #[test]
    fn cli_parses_page_command() {
        let cli = Cli::try_parse_from([
            "helpbook",
            "--container",
            "book.hbk",
            "page",
            "objects/a.html",
            "--kind",
            "enum-value",
        ])
        .unwrap();
        assert_eq!(cli.container, Some(PathBuf::from("book.hbk")));
        match cli.command {
            Command::Page { path, kind } => {
                assert_eq!(path, "objects/a.html");
                assert_eq!(PageKind::from(kind), PageKind::EnumValue);
            }
            _ => panic!("expected page command"),
        }
    }
}
