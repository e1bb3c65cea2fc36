use anyhow::{bail, Context, Result};
use arc_teleport::logging::{init_logging_with, LogConfig, DEFAULT_LOG_ENV};
use arc_teleport::navmesh::ProximitySampler;
use arc_teleport::{
    extract_borders, reduce, AreaMask, CollisionWorld, EmitterPose, SelectableArea,
    TeleportSettings, TeleportSystem,
};
use cgmath::{Deg, Quaternion, Rotation3, Vector3};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::info;

mod config;
mod data_loader;

use config::Config;
use data_loader::{load_triangulation, save_walkable_mesh};

#[derive(Parser)]
#[command(name = "navmesh_query")]
#[command(about = "Inspect walkable meshes, borders and teleport arcs")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Settings file (defaults to arc_teleport.toml if present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Reduce a triangulation to its walkable part and report the counts
    Reduce {
        /// Triangulation JSON file
        input: PathBuf,

        /// Area mask as a bitset (defaults to the configured mask)
        #[arg(long)]
        mask: Option<u32>,

        /// Write the walkable mesh as JSON
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Print the border polylines of the walkable mesh
    Borders {
        /// Triangulation JSON file
        input: PathBuf,

        #[arg(long)]
        mask: Option<u32>,
    },
    /// Throw one teleport arc over the triangulation and report the landing
    Arc {
        /// Triangulation JSON file, used both as collision and as navmesh
        input: PathBuf,

        /// Emitter position, e.g. "1.0,1.5,2.0"
        #[arg(long, value_parser = parse_vec3, allow_hyphen_values = true)]
        origin: Vector3<f32>,

        /// Heading in degrees, rotating about +Y
        #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
        yaw: f32,

        /// Degrees above the horizontal
        #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
        pitch: f32,
    },
    /// Print the effective settings as TOML
    Settings {
        /// Write them to this file instead
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

fn init_logging(verbose: bool) {
    let mut log_config = LogConfig::from_env(DEFAULT_LOG_ENV);
    if verbose {
        log_config.set_global_level(tracing::Level::DEBUG);
    } else if std::env::var_os(DEFAULT_LOG_ENV).is_none() {
        log_config.set_global_level(tracing::Level::INFO);
    }
    init_logging_with(log_config);
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    info!("Starting navmesh_query");

    let config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Reduce {
            input,
            mask,
            output,
        } => handle_reduce_command(&input, mask_or(mask, &config.teleport), output.as_deref())?,
        Commands::Borders { input, mask } => {
            handle_borders_command(&input, mask_or(mask, &config.teleport))?
        }
        Commands::Arc {
            input,
            origin,
            yaw,
            pitch,
        } => handle_arc_command(&input, config.teleport, origin, yaw, pitch)?,
        Commands::Settings { output } => match output {
            Some(path) => {
                config.save(&path)?;
                info!("Wrote settings to {}", path.display());
            }
            None => print!("{}", config.to_toml()?),
        },
    }

    Ok(())
}

fn mask_or(mask: Option<u32>, settings: &TeleportSettings) -> AreaMask {
    mask.map(AreaMask).unwrap_or(settings.nav_area_mask)
}

fn handle_reduce_command(input: &Path, mask: AreaMask, output: Option<&Path>) -> Result<()> {
    let triangulation = load_triangulation(input)?;
    let mesh = reduce(&triangulation, mask);

    println!("{:<10} | {:>10} | {:>10}", "", "Triangles", "Vertices");
    println!("{:-<10}-+-{:->10}-+-{:->10}", "", "", "");
    println!(
        "{:<10} | {:>10} | {:>10}",
        "input",
        triangulation.triangle_count(),
        triangulation.vertices.len()
    );
    println!(
        "{:<10} | {:>10} | {:>10}",
        "walkable",
        mesh.triangle_count(),
        mesh.vertex_count()
    );
    println!("Walkable surface area: {:.3}", mesh.surface_area());

    if let Some(path) = output {
        save_walkable_mesh(&mesh, path)?;
    }

    Ok(())
}

fn handle_borders_command(input: &Path, mask: AreaMask) -> Result<()> {
    let triangulation = load_triangulation(input)?;
    let mesh = reduce(&triangulation, mask);
    let borders = extract_borders(&mesh);

    if borders.is_empty() {
        println!("No borders found.");
        return Ok(());
    }

    for (index, border) in borders.iter().enumerate() {
        println!(
            "Border {} ({}, {} edges, length {:.3}):",
            index,
            if border.is_closed() { "closed" } else { "open" },
            border.edge_count(),
            border.length()
        );
        for point in &border.points {
            println!("  ({:.3}, {:.3}, {:.3})", point.x, point.y, point.z);
        }
    }

    Ok(())
}

fn handle_arc_command(
    input: &Path,
    settings: TeleportSettings,
    origin: Vector3<f32>,
    yaw: f32,
    pitch: f32,
) -> Result<()> {
    let triangulation = load_triangulation(input)?;

    let mut world = CollisionWorld::new();
    world.add_triangulation(&triangulation, 0);

    let mut area = SelectableArea::new(settings.border_height);
    area.rebuild(&triangulation, settings.nav_area_mask);

    let rotation = Quaternion::from_angle_y(Deg(yaw)) * Quaternion::from_angle_x(Deg(-pitch));
    let pose = EmitterPose::new(origin, rotation);

    let mut system = TeleportSystem::new(settings);
    if !system.begin_aim() {
        bail!("Teleport is disabled in the settings");
    }

    let trajectory = system
        .update_aim(&pose, &world, &area)
        .context("Aim session ended unexpectedly")?
        .clone();

    println!("Launch angle: {:.1}°", system.state().arc_angle);
    println!(
        "Arc: {} points, length {:.3}",
        trajectory.points.len(),
        trajectory.arc_length()
    );

    let landing = trajectory.landing;
    let point = landing.final_point;
    println!(
        "Landing: ({:.3}, {:.3}, {:.3}) {}",
        point.x,
        point.y,
        point.z,
        if landing.on_walkable_mesh { "valid" } else { "invalid" }
    );
    if landing.did_snap {
        println!("Snapped to anchor");
    }

    let settings = system.settings();
    let sample = area.sample_position(point, settings.sample_radius, settings.nav_area_mask);
    if let Some(sample) = sample {
        println!(
            "Nearest navmesh point: ({:.3}, {:.3}, {:.3}), area {}",
            sample.position.x, sample.position.y, sample.position.z, sample.area
        );
    }

    Ok(())
}

fn parse_vec3(value: &str) -> Result<Vector3<f32>> {
    let parts = value
        .split(',')
        .map(|part| {
            part.trim()
                .parse::<f32>()
                .with_context(|| format!("Invalid number '{}'", part.trim()))
        })
        .collect::<Result<Vec<f32>>>()?;

    match parts.as_slice() {
        [x, y, z] => Ok(Vector3::new(*x, *y, *z)),
        _ => bail!("Expected three comma separated values, got '{}'", value),
    }
}
