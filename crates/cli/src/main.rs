mod config;
mod script;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use pixgrid::{CellCoord, Color, DirStore, Dispatcher, Effect, Intent, Pixel, Session};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{info, warn};

use crate::config::get_settings;
use crate::script::Step;

#[derive(Parser, Debug)]
#[command(name = "pixmap", about = "Paint square pixels onto the world map")]
struct Arguments {
    /// Settings file; defaults to ./pixmap.yaml when present.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Where the username and pixels are kept.
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show the username, or set it.
    User(UserArguments),
    /// Paint the cell containing a point.
    Place(PlaceArguments),
    /// Show which cell a point falls into.
    Preview(PointArguments),
    /// Show the palette; `--color` and scripts accept these indices.
    Palette,
    /// List every pixel on the map.
    List,
    /// Remove every pixel. Cannot be undone.
    Wipe(WipeArguments),
    /// Write all pixels to a JSON file.
    Export(ExportArguments),
    /// Append the pixels from a JSON file.
    Import(ImportArguments),
    /// Replay an intent script.
    Paint(PaintArguments),
}

#[derive(Args, Debug)]
struct UserArguments {
    name: Option<String>,
}

#[derive(Args, Debug)]
struct PointArguments {
    #[arg(long, allow_hyphen_values = true)]
    lat: f64,
    #[arg(long, allow_hyphen_values = true)]
    lng: f64,
}

#[derive(Args, Debug)]
struct PlaceArguments {
    #[command(flatten)]
    point: PointArguments,
    /// Palette index or #rrggbb.
    #[arg(long, value_parser = Color::pick)]
    color: Option<Color>,
}

#[derive(Args, Debug)]
struct WipeArguments {
    /// Required; there is no undo.
    #[arg(long)]
    yes: bool,
}

#[derive(Args, Debug)]
struct ExportArguments {
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct ImportArguments {
    file: PathBuf,
}

#[derive(Args, Debug)]
struct PaintArguments {
    script: PathBuf,
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

fn user(session: &mut Session<DirStore>, args: UserArguments) -> Result<()> {
    match args.name {
        Some(name) => {
            if let Some(e) = session.set_username(&name)? {
                warn!("Username is set for this run only: {}", e);
            }
            println!("{}", session.username().unwrap_or_default());
        }
        None => match session.username() {
            Some(name) => println!("{name}"),
            None => println!("<no username set>"),
        },
    }
    Ok(())
}

fn place(session: &mut Session<DirStore>, args: PlaceArguments) -> Result<()> {
    if let Some(color) = args.color {
        session.select_color(color);
    }
    let placement = session.place(args.point.lat, args.point.lng, now_millis())?;
    if let Some(e) = &placement.warning {
        warn!("Pixel placed but not saved: {}", e);
    }
    let pixel = placement.pixel;
    println!("{} {} {}", pixel.color, cell_label(&pixel), pixel.position());
    Ok(())
}

fn cell_label(pixel: &Pixel) -> String {
    pixel
        .cell()
        .map_or_else(|| "off-map".to_string(), |cell| cell.to_string())
}

fn preview(session: &Session<DirStore>, args: PointArguments) -> Result<()> {
    let Some(cell) = CellCoord::containing(args.lat, args.lng) else {
        bail!("({}, {}) is outside the paintable map", args.lat, args.lng);
    };
    let state = if session.grid().contains(cell) { "painted" } else { "free" };
    println!("{cell} {} {state}", cell.bounds());
    Ok(())
}

fn palette() {
    for (index, color) in Color::palette().enumerate() {
        let [r, g, b] = color.rgb();
        println!("{index:>2} \x1b[48;2;{r};{g};{b}m    \x1b[0m {color}");
    }
}

fn list(session: &Session<DirStore>) {
    for pixel in session.grid() {
        println!(
            "{} {} {} {} {}",
            pixel.timestamp,
            pixel.author,
            pixel.color,
            pixel.position(),
            cell_label(pixel)
        );
    }
    info!("{} pixels", session.grid().len());
}

fn wipe(session: &mut Session<DirStore>, args: WipeArguments) -> Result<()> {
    if !args.yes {
        bail!("refusing to wipe the map without --yes");
    }
    let count = session.grid().len();
    if let Some(e) = session.wipe() {
        warn!("Map wiped in memory only: {}", e);
    }
    println!("wiped {count} pixels");
    Ok(())
}

fn write_export(session: &Session<DirStore>, out: Option<&Path>) -> Result<PathBuf> {
    let export = session.export()?;
    let path = out
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(export.file_name));
    std::fs::write(&path, &export.bytes)
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(path)
}

fn import(session: &mut Session<DirStore>, args: ImportArguments) -> Result<()> {
    let bytes = std::fs::read(&args.file)
        .with_context(|| format!("failed to read {}", args.file.display()))?;
    let imported = session
        .import(&bytes)
        .with_context(|| format!("{} is not a pixel export", args.file.display()))?;
    if let Some(e) = &imported.warning {
        warn!("Imported pixels were not saved: {}", e);
    }
    println!("imported {} pixels", imported.pixels.len());
    Ok(())
}

fn paint(session: &mut Session<DirStore>, args: PaintArguments) -> Result<()> {
    let source = std::fs::read_to_string(&args.script)
        .with_context(|| format!("failed to read {}", args.script.display()))?;
    let steps = script::parse(&source)?;

    let mut dispatcher = Dispatcher::new();
    for effect in dispatcher.initial_effects(session) {
        report(effect)?;
    }
    for step in steps {
        let intent = match step {
            Step::Intent(intent) => intent,
            Step::ImportFile(path) => Intent::Import(
                std::fs::read(&path)
                    .with_context(|| format!("failed to read {}", path.display()))?,
            ),
        };
        for effect in dispatcher.handle(session, intent, now_millis) {
            report(effect)?;
        }
    }
    Ok(())
}

fn report(effect: Effect) -> Result<()> {
    match effect {
        Effect::DrawPixel { bounds, color } => println!("draw {color} {bounds}"),
        Effect::ShowHover(bounds) => println!("hover {bounds}"),
        Effect::ClearHover => println!("hover off"),
        Effect::ClearPixels => println!("clear"),
        Effect::DraggingEnabled(enabled) => println!("map dragging {}", if enabled { "on" } else { "off" }),
        Effect::Download(export) => {
            std::fs::write(export.file_name, &export.bytes)
                .with_context(|| format!("failed to write {}", export.file_name))?;
            println!("saved {}", export.file_name);
        }
        Effect::Warning(message) => warn!("{}", message),
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Arguments::parse();
    let settings = get_settings(args.config.as_deref()).context("invalid configuration")?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&settings.log_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    let data_dir = args.data_dir.unwrap_or(settings.data_dir);
    let store = DirStore::new(&data_dir)
        .with_context(|| format!("cannot use data directory {}", data_dir.display()))?;
    let mut session = Session::open(store);
    session.select_color(
        Color::pick(&settings.default_color).context("invalid default_color setting")?,
    );
    if let Some(warning) = session.load_warning() {
        warn!("{}", warning);
    }

    match args.command {
        Commands::User(user_args) => user(&mut session, user_args),
        Commands::Place(place_args) => place(&mut session, place_args),
        Commands::Preview(point) => preview(&session, point),
        Commands::Palette => {
            palette();
            Ok(())
        }
        Commands::List => {
            list(&session);
            Ok(())
        }
        Commands::Wipe(wipe_args) => wipe(&mut session, wipe_args),
        Commands::Export(export_args) => {
            let path = write_export(&session, export_args.out.as_deref())?;
            println!("exported {} pixels to {}", session.grid().len(), path.display());
            Ok(())
        }
        Commands::Import(import_args) => import(&mut session, import_args),
        Commands::Paint(paint_args) => paint(&mut session, paint_args),
    }
}
