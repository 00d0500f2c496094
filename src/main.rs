use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod catalog;
mod error;
mod mesh;
mod viewer;

use catalog::Catalog;

#[derive(Parser)]
#[command(name = "mshelf")]
#[command(about = "A desktop browser and viewer for glTF model collections", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Browse and view the models in a directory
    View {
        /// Directory containing .glb/.gltf files
        #[arg(default_value = "models")]
        dir: PathBuf,

        /// File or display name of a model to show immediately
        #[arg(short, long)]
        model: Option<String>,
    },

    /// List the models found in a directory
    List {
        /// Directory containing .glb/.gltf files
        #[arg(default_value = "models")]
        dir: PathBuf,

        /// Only show models whose name contains this text
        #[arg(short, long)]
        filter: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print statistics for a single model file
    Info {
        /// Input model file (.glb or .gltf)
        input: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::View { dir, model } => {
            if let Err(e) = viewer::run(&dir, model.as_deref()) {
                eprintln!("Error running viewer: {}", e);
                std::process::exit(1);
            }
        }
        Commands::List { dir, filter, json } => {
            if let Err(e) = list_models(&dir, filter.as_deref(), json) {
                eprintln!("Error listing models: {}", e);
                std::process::exit(1);
            }
        }
        Commands::Info { input, json } => {
            if let Err(e) = show_info(&input, json) {
                eprintln!("Error reading model: {}", e);
                std::process::exit(1);
            }
        }
    }
}

fn list_models(
    dir: &PathBuf,
    filter: Option<&str>,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let catalog = Catalog::scan(dir)?;
    let visible = catalog.filter(filter.unwrap_or(""));

    if json {
        println!("{}", serde_json::to_string_pretty(&visible)?);
        return Ok(());
    }

    if catalog.is_empty() {
        println!("No models found in {:?} (looking for .glb/.gltf)", dir);
        return Ok(());
    }
    if visible.is_empty() {
        println!("No models matching {:?}", filter.unwrap_or(""));
        return Ok(());
    }

    for entry in &visible {
        println!("{:<32} {}", entry.display_name, entry.file_name);
    }
    println!("\n{} of {} models", visible.len(), catalog.len());

    Ok(())
}

fn show_info(input: &PathBuf, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let model = mesh::load_model(input)?;
    let info = &model.info;

    if json {
        println!("{}", serde_json::to_string_pretty(info)?);
        return Ok(());
    }

    println!("=== Model Info ===");
    println!("Meshes:    {}", info.mesh_count);
    println!("Materials: {}", info.material_count);
    println!("Triangles: {}", info.triangle_count);
    println!(
        "Size:      {:.2} x {:.2} x {:.2}",
        info.dimensions[0], info.dimensions[1], info.dimensions[2]
    );

    Ok(())
}
