use adoc_config::{Backend, Config};
use adoc_engine::{ParseOptions, io, parse_document};
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum BackendArg {
    Html,
    Man,
}

impl From<BackendArg> for Backend {
    fn from(arg: BackendArg) -> Self {
        match arg {
            BackendArg::Html => Backend::Html,
            BackendArg::Man => Backend::Man,
        }
    }
}

/// Convert an AsciiDoc file to HTML or a man page.
#[derive(Debug, Parser)]
#[command(name = "adoc", version)]
struct Args {
    /// Source document
    input: PathBuf,

    /// Output format, overrides the config file
    #[arg(short, long, value_enum)]
    backend: Option<BackendArg>,

    /// Output file, `-` for stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Emit body markup only
    #[arg(short, long)]
    embedded: bool,

    /// Document attribute as `name=value` (or `name` for an empty value)
    #[arg(short, long = "attribute", value_parser = parse_attribute)]
    attributes: Vec<(String, String)>,

    /// Limit on include directives per document
    #[arg(long)]
    max_includes: Option<usize>,

    /// Store the backend, attributes and limits given here as defaults
    #[arg(long)]
    save_config: bool,
}

fn parse_attribute(s: &str) -> Result<(String, String), String> {
    let (name, value) = s.split_once('=').unwrap_or((s, ""));
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("attribute name missing in {s:?}"));
    }
    Ok((name.to_string(), value.to_string()))
}

/// Folds command-line flags over the stored configuration.
fn build_options(args: &Args, config: &Config) -> (ParseOptions, Backend) {
    let mut attributes: BTreeMap<String, String> = config.attributes.clone();
    attributes.extend(args.attributes.iter().cloned());

    let defaults = ParseOptions::default();
    let base_dir = args
        .input
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or(defaults.base_dir.clone());

    let options = ParseOptions {
        base_dir,
        attributes,
        max_includes: args
            .max_includes
            .or(config.max_includes)
            .unwrap_or(defaults.max_includes),
        column_width_precision: config
            .column_width_precision
            .unwrap_or(defaults.column_width_precision),
        embedded: args.embedded || config.embedded,
        ..defaults
    };
    let backend = args.backend.map(Backend::from).unwrap_or(config.backend);
    (options, backend)
}

/// The stored configuration with this run's flags folded in.
fn merged_config(args: &Args, config: &Config) -> Config {
    let mut merged = config.clone();
    merged.attributes.extend(args.attributes.iter().cloned());
    if let Some(backend) = args.backend {
        merged.backend = backend.into();
    }
    merged.embedded |= args.embedded;
    if args.max_includes.is_some() {
        merged.max_includes = args.max_includes;
    }
    merged
}

/// Where to write the result; `None` means stdout.
fn output_path(args: &Args, config: &Config, backend: Backend) -> Option<PathBuf> {
    match &args.output {
        Some(path) if path.as_os_str() == "-" => None,
        Some(path) => Some(path.clone()),
        None => {
            let dir = config.output_dir.as_ref()?;
            let extension = match backend {
                Backend::Html => "html",
                Backend::Man => "1",
            };
            let stem = args.input.file_stem()?;
            Some(dir.join(stem).with_extension(extension))
        }
    }
}

fn run(args: Args) -> Result<()> {
    let config = match Config::load() {
        Ok(Some(config)) => config,
        Ok(None) => Config::default(),
        Err(e) => {
            log::warn!("Ignoring config: {e}");
            Config::default()
        }
    };

    if args.save_config {
        let path = Config::config_path();
        merged_config(&args, &config)
            .save_to_path(&path)
            .with_context(|| format!("saving {}", path.display()))?;
        log::info!("Saved defaults to {}", path.display());
    }

    let (options, backend) = build_options(&args, &config);
    let source = io::read_file(&args.input)
        .with_context(|| format!("reading {}", args.input.display()))?;

    log::info!("Converting {} as {:?}", args.input.display(), backend);
    let doc = parse_document(&source, &options)?;
    let rendered = match backend {
        Backend::Html => doc.to_html()?,
        Backend::Man => doc.to_roff()?,
    };

    match output_path(&args, &config, backend) {
        Some(path) => {
            io::write_file(&path, &rendered)
                .with_context(|| format!("writing {}", path.display()))?;
            log::info!("Wrote {}", path.display());
        }
        None => print!("{rendered}"),
    }
    Ok(())
}

fn main() {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let args = Args::parse();
    if let Err(e) = run(args) {
        log::error!("{e:#}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn args(argv: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("adoc").chain(argv.iter().copied())).unwrap()
    }

    #[test]
    fn test_parse_attribute() {
        assert_eq!(
            parse_attribute("product=Widget"),
            Ok(("product".to_string(), "Widget".to_string()))
        );
        assert_eq!(
            parse_attribute("sectnums"),
            Ok(("sectnums".to_string(), String::new()))
        );
        assert!(parse_attribute("=x").is_err());
    }

    #[test]
    fn test_flags_override_config() {
        let mut config = Config {
            backend: Backend::Html,
            max_includes: Some(8),
            ..Config::default()
        };
        config
            .attributes
            .insert("product".to_string(), "Old".to_string());

        let args = args(&[
            "docs/guide.adoc",
            "-b",
            "man",
            "-a",
            "product=New",
            "--max-includes",
            "2",
        ]);
        let (options, backend) = build_options(&args, &config);

        assert_eq!(backend, Backend::Man);
        assert_eq!(options.max_includes, 2);
        assert_eq!(options.base_dir, PathBuf::from("docs"));
        assert_eq!(
            options.attributes.get("product").map(String::as_str),
            Some("New")
        );
    }

    #[test]
    fn test_config_fills_unset_flags() {
        let config = Config {
            embedded: true,
            column_width_precision: Some(2),
            ..Config::default()
        };
        let (options, backend) = build_options(&args(&["guide.adoc"]), &config);

        assert_eq!(backend, Backend::Html);
        assert!(options.embedded);
        assert_eq!(options.column_width_precision, 2);
        assert_eq!(options.base_dir, PathBuf::from("."));
    }

    #[test]
    fn test_saved_config_keeps_flags() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("adoc/config.toml");
        let mut config = Config {
            column_width_precision: Some(2),
            ..Config::default()
        };
        config
            .attributes
            .insert("product".to_string(), "Old".to_string());

        let args = args(&["guide.adoc", "-b", "man", "-a", "product=New", "--save-config"]);
        assert!(args.save_config);
        merged_config(&args, &config).save_to_path(&path).unwrap();

        let saved = Config::load_from_path(&path).unwrap().unwrap();
        assert_eq!(saved.backend, Backend::Man);
        assert_eq!(saved.column_width_precision, Some(2));
        assert_eq!(
            saved.attributes.get("product").map(String::as_str),
            Some("New")
        );
    }

    #[test]
    fn test_output_path() {
        let config = Config {
            output_dir: Some(PathBuf::from("/out")),
            ..Config::default()
        };
        assert_eq!(
            output_path(&args(&["a/guide.adoc"]), &config, Backend::Man),
            Some(PathBuf::from("/out/guide.1"))
        );
        assert_eq!(
            output_path(&args(&["guide.adoc", "-o", "-"]), &config, Backend::Html),
            None
        );
        assert_eq!(
            output_path(&args(&["guide.adoc"]), &Config::default(), Backend::Html),
            None
        );
    }

    #[test]
    fn test_run_writes_output_file() {
        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.path().join("guide.adoc");
        let output = temp_dir.path().join("out/guide.html");
        std::fs::write(&input, "= Guide\n\nHello *world*.").unwrap();

        run(args(&[
            input.to_str().unwrap(),
            "-e",
            "-o",
            output.to_str().unwrap(),
        ]))
        .unwrap();

        let html = std::fs::read_to_string(&output).unwrap();
        assert!(html.contains("<strong>world</strong>"));
        assert!(!html.contains("<!DOCTYPE html>"));
    }
}
