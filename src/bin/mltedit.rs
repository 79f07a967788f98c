use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use mltedit::{
    AttachOpts, Document, NodeKind, ProjectStore, ProjectStoreOpts, Timecode,
    attach_playlist_to_multitrack, compute_duration, create_tractor, logical_item_at,
    wrap_as_playlist,
};

#[derive(Parser, Debug)]
#[command(name = "mltedit", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the in/out/elapsed span of a node as JSON.
    Duration(DurationArgs),
    /// Wrap the item at a track slot into a new playlist.
    Wrap(WrapArgs),
    /// Append a playlist as a new cross-faded track of a tractor.
    Attach(AttachArgs),
    /// Create an empty tractor before the `videotrack0` sentinel.
    NewTractor(NewTractorArgs),
    /// Save a document into a project store.
    Save(SaveArgs),
}

#[derive(Parser, Debug)]
struct DurationArgs {
    /// Input MLT document.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Id of the node to measure.
    #[arg(long)]
    node: String,
}

#[derive(Parser, Debug)]
struct WrapArgs {
    /// Input MLT document.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Id of the track (or playlist) holding the item.
    #[arg(long)]
    track: String,

    /// Flat item index within the track (0-based).
    #[arg(long)]
    slot: usize,

    /// Output path (defaults to rewriting the input).
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct AttachArgs {
    /// Input MLT document.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Id of the tractor whose multitrack receives the track.
    #[arg(long)]
    tractor: String,

    /// Id of the playlist to attach.
    #[arg(long)]
    playlist: String,

    /// Cross-fade overlap (`HH:MM:SS,mmm`).
    #[arg(long, default_value = "00:00:00,000")]
    overlap: Timecode,

    /// Transition service.
    #[arg(long, default_value = "luma")]
    service: String,

    /// Output path (defaults to rewriting the input).
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct NewTractorArgs {
    /// Input MLT document.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output path (defaults to rewriting the input).
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct SaveArgs {
    /// Input MLT document.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Project store root directory.
    #[arg(long, default_value = "projects")]
    root: PathBuf,

    /// Project id (a single path component).
    #[arg(long)]
    project: String,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.cmd {
        Command::Duration(args) => cmd_duration(args),
        Command::Wrap(args) => cmd_wrap(args),
        Command::Attach(args) => cmd_attach(args),
        Command::NewTractor(args) => cmd_new_tractor(args),
        Command::Save(args) => cmd_save(args),
    }
}

fn load(path: &Path) -> anyhow::Result<Document> {
    Document::from_path(path).with_context(|| format!("load document '{}'", path.display()))
}

fn write(doc: &Document, in_path: &Path, out: Option<&Path>) -> anyhow::Result<()> {
    let out = out.unwrap_or(in_path);
    ProjectStore::default()
        .write_document(out, doc)
        .with_context(|| format!("write document '{}'", out.display()))?;
    eprintln!("wrote {}", out.display());
    Ok(())
}

fn cmd_duration(args: DurationArgs) -> anyhow::Result<()> {
    let doc = load(&args.in_path)?;
    let node = doc.resolve(&args.node)?;
    let span = compute_duration(&doc, node)?;
    println!("{}", serde_json::to_string(&span)?);
    Ok(())
}

fn cmd_wrap(args: WrapArgs) -> anyhow::Result<()> {
    let mut doc = load(&args.in_path)?;
    let track = doc.resolve(&args.track)?;
    let item = logical_item_at(&doc, track, args.slot)?
        .with_context(|| format!("track '{}' has no item at slot {}", args.track, args.slot))?;
    let playlist = wrap_as_playlist(&mut doc, item)?;
    println!("{}", doc.attr(playlist, "id").unwrap_or_default());
    write(&doc, &args.in_path, args.out.as_deref())
}

fn cmd_attach(args: AttachArgs) -> anyhow::Result<()> {
    let mut doc = load(&args.in_path)?;
    let tractor = doc.resolve(&args.tractor)?;
    let multitrack = doc
        .children_of_kind(tractor, &NodeKind::Multitrack)
        .next()
        .with_context(|| format!("'{}' has no multitrack", args.tractor))?;
    let playlist = doc.resolve(&args.playlist)?;
    let opts = AttachOpts {
        overlap: args.overlap,
        service: args.service,
    };
    attach_playlist_to_multitrack(&mut doc, multitrack, playlist, &opts)?;
    write(&doc, &args.in_path, args.out.as_deref())
}

fn cmd_new_tractor(args: NewTractorArgs) -> anyhow::Result<()> {
    let mut doc = load(&args.in_path)?;
    let tractor = create_tractor(&mut doc)?;
    println!("{}", doc.attr(tractor, "id").unwrap_or_default());
    write(&doc, &args.in_path, args.out.as_deref())
}

fn cmd_save(args: SaveArgs) -> anyhow::Result<()> {
    let doc = load(&args.in_path)?;
    let store = ProjectStore::new(ProjectStoreOpts {
        root: args.root,
        ..ProjectStoreOpts::default()
    });
    let path = store.save_document(&args.project, &doc)?;
    eprintln!("wrote {}", path.display());
    Ok(())
}
