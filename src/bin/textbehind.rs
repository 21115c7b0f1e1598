use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use sha2::Digest as _;

use textbehind::{
    AppConfig, CommandSegmenter, Compositor, CutoutStatus, Editor, EditorOpts, FontBook, LayerAttr, LayerId,
    MaskSegmenter, NoSegmentation, PrecomputedCutout, Project, Segmenter,
};

#[derive(Parser, Debug)]
#[command(name = "textbehind", version)]
struct Cli {
    /// Config file (defaults to $TEXTBEHIND_CONFIG or ~/.config/textbehind/config.json).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start a project for a photo.
    Init(InitArgs),
    /// Add, duplicate, remove, edit or list text layers.
    Layer {
        #[command(subcommand)]
        cmd: LayerCommand,
    },
    /// Composite photo, text and cutout and write a PNG.
    Render(RenderArgs),
    /// Show which font face a family/weight resolves to.
    Fonts(FontsArgs),
}

#[derive(Parser, Debug)]
struct InitArgs {
    /// Background photo (.png, .jpg or .jpeg).
    #[arg(long)]
    image: PathBuf,

    /// Project JSON to create.
    #[arg(long)]
    project: PathBuf,

    /// Replace an existing project file.
    #[arg(long, default_value_t = false)]
    force: bool,
}

#[derive(Subcommand, Debug)]
enum LayerCommand {
    /// Append a layer with default styling and print its id.
    Add(ProjectArg),
    /// Copy a layer under a fresh id.
    Duplicate(LayerIdArgs),
    /// Delete a layer.
    Remove(LayerIdArgs),
    /// Change one attribute of a layer.
    Set(LayerSetArgs),
    /// Print all layers as JSON.
    List(ProjectArg),
}

#[derive(Parser, Debug)]
struct ProjectArg {
    /// Project JSON.
    #[arg(long)]
    project: PathBuf,
}

#[derive(Parser, Debug)]
struct LayerIdArgs {
    /// Project JSON.
    #[arg(long)]
    project: PathBuf,

    /// Layer id.
    #[arg(long)]
    id: u32,
}

#[derive(Parser, Debug)]
struct LayerSetArgs {
    /// Project JSON.
    #[arg(long)]
    project: PathBuf,

    /// Layer id.
    #[arg(long)]
    id: u32,

    /// Attribute name, e.g. `fontSize` or `color`.
    #[arg(long)]
    key: String,

    /// New value. Taken verbatim for text, font family and colours; parsed as a number otherwise.
    #[arg(long, allow_hyphen_values = true)]
    value: String,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Project JSON.
    #[arg(long)]
    project: PathBuf,

    /// Output PNG path, or a directory to receive text-behind-image.png.
    #[arg(long)]
    out: PathBuf,

    /// Skip background removal; text is drawn over the whole photo.
    #[arg(long, default_value_t = false)]
    no_segment: bool,

    /// How long to wait for the cutout before exporting without it.
    #[arg(long, default_value_t = 120)]
    wait_secs: u64,
}

#[derive(Parser, Debug)]
struct FontsArgs {
    /// Family to resolve.
    #[arg(long, default_value = "Inter")]
    family: String,

    /// Weight to resolve.
    #[arg(long, default_value_t = 800)]
    weight: u16,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => AppConfig::from_path(path)?,
        None => AppConfig::load(),
    };
    textbehind::logging::init_logging(&config.logging);

    match cli.cmd {
        Command::Init(args) => cmd_init(args),
        Command::Layer { cmd } => cmd_layer(cmd),
        Command::Render(args) => cmd_render(args, &config),
        Command::Fonts(args) => cmd_fonts(args, &config),
    }
}

fn cmd_init(args: InitArgs) -> anyhow::Result<()> {
    if !textbehind::is_supported_upload(&args.image) {
        anyhow::bail!(
            "'{}' is not a supported image; use .png, .jpg or .jpeg",
            args.image.display()
        );
    }
    let img = textbehind::load_image_file(&args.image)?;
    if args.project.exists() && !args.force {
        anyhow::bail!(
            "'{}' already exists (pass --force to replace it)",
            args.project.display()
        );
    }

    let image_ref = relative_to_project(&args.project, &args.image);
    Project::new(image_ref).save(&args.project)?;
    eprintln!(
        "wrote {} ({}x{})",
        args.project.display(),
        img.width(),
        img.height()
    );
    Ok(())
}

fn cmd_layer(cmd: LayerCommand) -> anyhow::Result<()> {
    match cmd {
        LayerCommand::Add(args) => {
            let project = Project::from_path(&args.project)?;
            let (state, id) = project.to_state()?.add_text_layer()?;
            project.with_state_layers(&state).save(&args.project)?;
            println!("{id}");
        }
        LayerCommand::Duplicate(args) => {
            let project = Project::from_path(&args.project)?;
            let (state, new_id) = project
                .to_state()?
                .duplicate_text_layer(LayerId(args.id))?;
            let new_id = new_id.with_context(|| format!("no layer with id {}", args.id))?;
            project.with_state_layers(&state).save(&args.project)?;
            println!("{new_id}");
        }
        LayerCommand::Remove(args) => {
            let project = Project::from_path(&args.project)?;
            let state = project.to_state()?;
            if state.layer(LayerId(args.id)).is_none() {
                anyhow::bail!("no layer with id {}", args.id);
            }
            let state = state.remove_text_layer(LayerId(args.id));
            project.with_state_layers(&state).save(&args.project)?;
        }
        LayerCommand::Set(args) => {
            let project = Project::from_path(&args.project)?;
            let state = project.to_state()?;
            if state.layer(LayerId(args.id)).is_none() {
                anyhow::bail!("no layer with id {}", args.id);
            }
            let attr = LayerAttr::from_cli_value(&args.key, &args.value)?;
            let state = state.set_attribute(LayerId(args.id), attr);
            project.with_state_layers(&state).save(&args.project)?;
        }
        LayerCommand::List(args) => {
            let project = Project::from_path(&args.project)?;
            println!("{}", serde_json::to_string_pretty(&project.layers)?);
        }
    }
    Ok(())
}

fn cmd_render(args: RenderArgs, config: &AppConfig) -> anyhow::Result<()> {
    let project = Project::from_path(&args.project)?;
    let image_path = Project::resolve(&args.project, &project.image);

    let segmenter = pick_segmenter(&project, &args, config)?;
    tracing::info!(segmenter = segmenter.name(), "rendering {}", args.project.display());

    let mut editor = Editor::new(
        segmenter,
        EditorOpts {
            threads: config.render.threads,
        },
    )?;
    editor.try_update(|_| project.to_state())?;
    editor.load_image_file(&image_path)?;

    let status = if args.no_segment {
        editor.poll();
        editor.state().cutout_status()
    } else {
        editor.wait_for_cutout(Duration::from_secs(args.wait_secs))
    };
    if status != CutoutStatus::Ready && !args.no_segment {
        eprintln!("no subject cutout ({status:?}); text is drawn over the whole photo");
    }

    let mut compositor = Compositor::new(FontBook::load(&config.fonts));
    let path = compositor
        .export(editor.state(), &args.out)?
        .context("no image loaded")?;
    eprintln!("wrote {}", path.display());
    Ok(())
}

fn pick_segmenter(
    project: &Project,
    args: &RenderArgs,
    config: &AppConfig,
) -> anyhow::Result<Arc<dyn Segmenter>> {
    if args.no_segment {
        return Ok(Arc::new(NoSegmentation));
    }
    if let Some(cutout) = &project.cutout {
        return Ok(Arc::new(PrecomputedCutout::new(Project::resolve(
            &args.project,
            cutout,
        ))));
    }
    if let Some(mask) = &project.mask {
        return Ok(Arc::new(MaskSegmenter::new(Project::resolve(
            &args.project,
            mask,
        ))));
    }
    match &config.segmenter.command {
        Some(argv) => Ok(Arc::new(CommandSegmenter::new(argv.clone())?)),
        None => Ok(Arc::new(NoSegmentation)),
    }
}

fn cmd_fonts(args: FontsArgs, config: &AppConfig) -> anyhow::Result<()> {
    let book = FontBook::load(&config.fonts);
    println!("font_faces: {}", book.face_count());
    match book.resolve(&args.family, args.weight) {
        Some(face) => {
            println!("requested:  {} {}", args.family, args.weight);
            println!("family:     {}", face.family);
            println!("weight:     {}", face.weight);
            println!("index:      {}", face.index);
            println!("sha256:     {}", sha256_hex(&face.data));
        }
        None => {
            println!("requested:  {} {}", args.family, args.weight);
            println!("family:     <none>");
        }
    }
    Ok(())
}

fn relative_to_project(project: &Path, image: &Path) -> PathBuf {
    let Some(dir) = project.parent().filter(|d| !d.as_os_str().is_empty()) else {
        return image.to_path_buf();
    };
    match (std::path::absolute(dir), std::path::absolute(image)) {
        (Ok(dir), Ok(image)) => image
            .strip_prefix(&dir)
            .map(Path::to_path_buf)
            .unwrap_or(image),
        _ => image.to_path_buf(),
    }
}

fn sha256_hex(bytes: &[u8]) -> String {
    let digest = sha2::Sha256::digest(bytes);
    let mut out = String::with_capacity(digest.len() * 2);
    for b in digest {
        out.push_str(&format!("{:02x}", b));
    }
    out
}
