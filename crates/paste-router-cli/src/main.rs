use anyhow::{Context, Result, bail};
use log::{debug, info};
use paste_router_config::PasteConfig;
use paste_router_engine::clipboard::{
    ClipboardEvent, ClipboardItem, TEXT_HTML, TEXT_PLAIN, VSCODE_EDITOR_DATA,
};
use paste_router_engine::editing::{BlockKind, Document};
use paste_router_engine::paste::{
    ClipboardClassifier, DataUrlImageHandler, EmbedRegistry, LanguageSet, MarkerDetector,
    PasteDispatcher, PasteResult,
};
use std::ops::Range;
use std::path::{Path, PathBuf};
use std::{env, fs, process};

const USAGE: &str = "\
Usage: {bin} <document> [options]
       {bin} --init-config [--config PATH]

Simulates pasting into <document> and prints the outcome and resulting document.

Options:
  --selection A..B     selection as byte offsets (default: end of document)
  --text TEXT          text/plain clipboard data
  --html HTML          text/html clipboard data
  --metadata JSON      vscode-editor-data clipboard data
  --image FILE         image clipboard item (png, jpeg, gif, webp)
  --code               treat the whole document as a code block
  --table              treat the whole document as a table
  --read-only          the document is not editable
  --config PATH        config file (default: ~/.config/paste-router/config.toml)
  --init-config        write a default config file and exit";

#[derive(Debug, Default, PartialEq)]
struct Args {
    document: Option<PathBuf>,
    selection: Option<Range<usize>>,
    text: Option<String>,
    html: Option<String>,
    metadata: Option<String>,
    image: Option<PathBuf>,
    code: bool,
    table: bool,
    read_only: bool,
    config: Option<PathBuf>,
    init_config: bool,
}

fn parse_args(args: &[String]) -> Result<Args> {
    let mut parsed = Args::default();
    let mut iter = args.iter();

    while let Some(arg) = iter.next() {
        let mut value = || {
            iter.next()
                .cloned()
                .with_context(|| format!("{arg} needs a value"))
        };
        match arg.as_str() {
            "--selection" => parsed.selection = Some(parse_range(&value()?)?),
            "--text" => parsed.text = Some(value()?),
            "--html" => parsed.html = Some(value()?),
            "--metadata" => parsed.metadata = Some(value()?),
            "--image" => parsed.image = Some(PathBuf::from(value()?)),
            "--config" => parsed.config = Some(PathBuf::from(value()?)),
            "--code" => parsed.code = true,
            "--table" => parsed.table = true,
            "--read-only" => parsed.read_only = true,
            "--init-config" => parsed.init_config = true,
            flag if flag.starts_with("--") => bail!("Unknown option {flag}"),
            path => {
                if parsed.document.replace(PathBuf::from(path)).is_some() {
                    bail!("Only one document may be given");
                }
            }
        }
    }

    if parsed.document.is_none() && !parsed.init_config {
        bail!("No document given");
    }
    Ok(parsed)
}

fn parse_range(value: &str) -> Result<Range<usize>> {
    let (start, end) = value
        .split_once("..")
        .with_context(|| format!("Selection {value:?} is not of the form A..B"))?;
    let start = start.trim().parse::<usize>().context("Invalid selection start")?;
    let end = end.trim().parse::<usize>().context("Invalid selection end")?;
    Ok(start..end)
}

fn image_mime(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        _ => None,
    }
}

fn build_event(args: &Args) -> Result<ClipboardEvent> {
    let mut event = ClipboardEvent::empty();
    if let Some(text) = &args.text {
        event = event.with_text(TEXT_PLAIN, text.as_str());
    }
    if let Some(html) = &args.html {
        event = event.with_text(TEXT_HTML, html.as_str());
    }
    if let Some(metadata) = &args.metadata {
        event = event.with_text(VSCODE_EDITOR_DATA, metadata.as_str());
    }
    if let Some(path) = &args.image {
        let mime = image_mime(path)
            .with_context(|| format!("Unsupported image type: {}", path.display()))?;
        let bytes =
            fs::read(path).with_context(|| format!("Failed to read image {}", path.display()))?;
        event = event.with_item(ClipboardItem::bytes(mime, bytes));
    }
    Ok(event)
}

fn build_document(path: &Path, args: &Args) -> Result<Document> {
    let bytes =
        fs::read(path).with_context(|| format!("Failed to read document {}", path.display()))?;
    let mut doc = Document::from_bytes(&bytes)
        .with_context(|| format!("Document {} is not UTF-8", path.display()))?;

    let len = doc.text().len();
    if args.code {
        doc = doc.with_block(0..len, BlockKind::CodeFence { language: None });
    } else if args.table {
        doc = doc.with_block(0..len, BlockKind::Table);
    }

    let selection = args.selection.clone().unwrap_or(len..len);
    if selection.start > selection.end || selection.end > len {
        bail!("Selection {selection:?} is outside the document (length {len})");
    }
    Ok(doc.with_selection(selection).with_editable(!args.read_only))
}

fn build_dispatcher(config: &PasteConfig) -> Result<PasteDispatcher> {
    let languages = match &config.languages {
        Some(modes) => LanguageSet::from_modes(modes.iter().cloned()),
        None => LanguageSet::default(),
    };

    let mut embeds = EmbedRegistry::from_providers(
        config
            .embeds
            .iter()
            .map(|provider| (provider.name.as_str(), provider.patterns.as_slice())),
    )
    .context("Invalid embed provider in config")?;
    if config.default_embeds {
        embeds.register(EmbedRegistry::with_defaults());
    }
    debug!(
        "{} languages, {} embed matchers",
        languages.len(),
        embeds.len()
    );

    let classifier = ClipboardClassifier::new()
        .with_internal_detector(MarkerDetector::new(config.internal_marker.as_str()));

    let dispatcher = PasteDispatcher::new()
        .with_classifier(classifier)
        .with_languages(languages)
        .with_embeds(embeds);

    let dispatcher = if !config.image_paste {
        dispatcher.without_image_paste()
    } else if let Some(max_bytes) = config.max_image_bytes {
        dispatcher.with_image_handler(DataUrlImageHandler::new().with_max_bytes(max_bytes))
    } else {
        dispatcher
    };
    Ok(dispatcher)
}

/// Write the default config unless a file is already there
fn init_config(config_path: Option<&Path>) -> Result<PathBuf> {
    let target = config_path.map_or_else(PasteConfig::config_path, Path::to_path_buf);
    if target.exists() {
        bail!("Config file already exists at {}", target.display());
    }

    let config = PasteConfig::default();
    match config_path {
        Some(path) => config.save_to_path(path)?,
        None => config.save()?,
    }
    Ok(target)
}

fn describe(result: &PasteResult) -> String {
    match result {
        PasteResult::Applied { rule, patch } => format!(
            "applied by {rule} (changed {:?}, selection {:?})",
            patch.changed, patch.new_selection
        ),
        PasteResult::Suppressed { rule } => format!("suppressed by {rule}"),
        PasteResult::Deferred { rule, reason } => {
            format!("deferred by {rule} ({reason}); host handles the paste")
        }
        PasteResult::Rejected { rule, error } => format!("rejected by {rule}: {error}"),
        PasteResult::Unmounted => "dispatcher not mounted".to_string(),
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_default_env().init();

    let args: Vec<String> = env::args().collect();
    let bin = args.first().map_or("paste-router", String::as_str);

    let parsed = match parse_args(&args[1.min(args.len())..]) {
        Ok(parsed) => parsed,
        Err(e) => {
            eprintln!("Error: {e}");
            eprintln!("{}", USAGE.replace("{bin}", bin));
            process::exit(1);
        }
    };

    if parsed.init_config {
        let written = init_config(parsed.config.as_deref())?;
        println!("Wrote default config to {}", written.display());
        return Ok(());
    }

    let config = match PasteConfig::load_or_default(parsed.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: Failed to load config file: {e}");
            eprintln!("Config is read from {}", PasteConfig::config_path().display());
            process::exit(1);
        }
    };

    let Some(document) = parsed.document.as_deref() else {
        eprintln!("{}", USAGE.replace("{bin}", bin));
        process::exit(1);
    };
    let mut doc = build_document(document, &parsed)?;
    let event = build_event(&parsed)?;
    let mut dispatcher = build_dispatcher(&config)?;
    dispatcher.mount();

    let result = dispatcher.dispatch(&mut doc, &event);
    info!("paste handled: {}", result.is_handled());

    println!("outcome: {}", describe(&result));
    print!("{}", doc.snapshot());
    Ok(())
}
