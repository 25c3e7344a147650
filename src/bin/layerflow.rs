use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use layerflow::{Editor, EditorEvent, LayerConfig, NodeKind, PreviewFrame, StyleBook, WorkflowDoc};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "layerflow", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse and validate a workflow, then print a summary.
    Check(CheckArgs),
    /// Settle a workflow and print preview render lists as JSON.
    Resolve(ResolveArgs),
    /// Flip one slot of a visibility controller and write the settled workflow.
    Toggle(ToggleArgs),
}

#[derive(Parser, Debug)]
struct CheckArgs {
    /// Workflow JSON.
    #[arg(long)]
    workflow: PathBuf,

    /// Layer config JSON (stock config when omitted).
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct ResolveArgs {
    /// Workflow JSON.
    #[arg(long)]
    workflow: PathBuf,

    /// Layer config JSON (stock config when omitted).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Image style table JSON.
    #[arg(long)]
    image_styles: Option<PathBuf>,

    /// Text style table JSON.
    #[arg(long)]
    text_styles: Option<PathBuf>,

    /// Only print this preview node.
    #[arg(long)]
    node: Option<String>,
}

#[derive(Parser, Debug)]
struct ToggleArgs {
    /// Workflow JSON.
    #[arg(long)]
    workflow: PathBuf,

    /// Layer config JSON (stock config when omitted).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Visibility controller node id.
    #[arg(long)]
    node: String,

    /// Slot to flip.
    #[arg(long)]
    slot: String,

    /// Output workflow path (stdout when omitted).
    #[arg(long)]
    out: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Check(args) => cmd_check(args),
        Command::Resolve(args) => cmd_resolve(args),
        Command::Toggle(args) => cmd_toggle(args),
    }
}

fn read_config(path: Option<&Path>) -> anyhow::Result<LayerConfig> {
    match path {
        Some(p) => LayerConfig::from_path(p)
            .with_context(|| format!("load layer config '{}'", p.display())),
        None => Ok(LayerConfig::default()),
    }
}

fn read_workflow(path: &Path) -> anyhow::Result<WorkflowDoc> {
    WorkflowDoc::from_path(path).with_context(|| format!("load workflow '{}'", path.display()))
}

fn cmd_check(args: CheckArgs) -> anyhow::Result<()> {
    let config = read_config(args.config.as_deref())?;
    let doc = read_workflow(&args.workflow)?;

    let count = |kind: NodeKind| doc.nodes.iter().filter(|n| n.kind() == kind).count();
    println!(
        "ok: nodes={} edges={} producers={} controllers={} previews={} slots={}",
        doc.nodes.len(),
        doc.edges.len(),
        count(NodeKind::LayerImage) + count(NodeKind::LayerText),
        count(NodeKind::LayerOnOff),
        count(NodeKind::LayerPreview),
        config.layers.len(),
    );
    for warning in doc.lint() {
        println!("warning: {warning}");
    }
    Ok(())
}

fn cmd_resolve(args: ResolveArgs) -> anyhow::Result<()> {
    let config = read_config(args.config.as_deref())?;
    let mut styles = StyleBook::default();
    if let Some(p) = &args.image_styles {
        styles.load_image_styles(p)?;
    }
    if let Some(p) = &args.text_styles {
        styles.load_text_styles(p)?;
    }

    let mut editor = Editor::new(config, styles);
    let outcome = editor.load(read_workflow(&args.workflow)?)?;
    tracing::info!(passes = outcome.passes, changed = outcome.changed.len(), "workflow settled");

    let frames: Vec<(String, PreviewFrame)> = match &args.node {
        Some(id) => {
            let frame = editor
                .preview_frame(id)
                .with_context(|| format!("'{id}' is not a preview node"))?;
            vec![(id.clone(), frame)]
        }
        None => editor
            .previews()
            .into_iter()
            .map(|(id, frame)| (id.to_string(), frame))
            .collect(),
    };
    let out: serde_json::Map<String, serde_json::Value> = frames
        .into_iter()
        .map(|(id, frame)| serde_json::to_value(frame).map(|v| (id, v)))
        .collect::<Result<_, serde_json::Error>>()
        .context("serialize preview frames")?;
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}

fn cmd_toggle(args: ToggleArgs) -> anyhow::Result<()> {
    let config = read_config(args.config.as_deref())?;
    let mut editor = Editor::new(config, StyleBook::default());
    editor.load(read_workflow(&args.workflow)?)?;

    let outcome = editor.dispatch(EditorEvent::LayerToggled {
        node: args.node.as_str().into(),
        slot: args.slot.as_str().into(),
    })?;
    eprintln!(
        "toggled {} on {}: {} node(s) changed in {} pass(es)",
        args.slot,
        args.node,
        outcome.changed.len(),
        outcome.passes
    );

    let json = editor.export().to_json_pretty()?;
    match &args.out {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("create output dir '{}'", parent.display()))?;
            }
            std::fs::write(path, json).with_context(|| format!("write '{}'", path.display()))?;
        }
        None => println!("{json}"),
    }
    Ok(())
}
