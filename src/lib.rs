pub mod ast;
pub mod config;
mod error;
pub mod export;
pub mod graph;
pub mod layout;
pub mod parser;

use clap::Parser;
use config::AppConfig;
pub use error::VignetteError;
use export::OutputFormat;
use layout::geometry::Size;
use layout::tree::{AxisMode, Engine};
use log::{debug, info, trace};
use std::{fs, path::PathBuf};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    pub log_level: String,

    /// Path to the input file
    #[arg(help = "Path to the input file")]
    pub file: String,

    /// Path to the output file
    #[arg(short, long, default_value = "out.svg")]
    pub output: String,

    /// Diagram title
    #[arg(short, long)]
    pub title: Option<String>,

    /// Actor axis orientation
    #[arg(long, value_enum)]
    pub axis: Option<AxisMode>,

    /// Output format (inferred from the output extension when omitted)
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Path to a TOML configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,
}

pub fn run(cfg: &Config) -> Result<(), VignetteError> {
    info!(
        input_path = cfg.file,
        output_path = cfg.output;
        "Processing diagram",
    );

    let app_config = match &cfg.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };

    // Reading input file
    let content = fs::read_to_string(&cfg.file)?;
    trace!(content; "File content");

    // Parsing the diagram
    info!("Parsing diagram");
    let diagram = parser::parse(&content)?;
    debug!(
        nodes_count = diagram.nodes.len(),
        relations_count = diagram.relations.len();
        "Parsed diagram successfully",
    );

    // Building the diagram graph
    info!("Building diagram graph");
    let graph = graph::UseCaseGraph::from_diagram(&diagram)?;
    debug!("Graph built successfully");

    // Calculating the layout; the command-line axis wins over the file.
    let axis = cfg.axis.unwrap_or(app_config.layout.axis);
    info!(axis:? = axis; "Calculating tree layout");
    let layout_engine = Engine::new()
        .with_node_size(Size::new(
            app_config.layout.node_width,
            app_config.layout.node_height,
        ))
        .with_spacing_factor(app_config.layout.spacing_factor);
    let layout = layout_engine.calculate(&graph, axis);

    let title = cfg.title.as_deref().unwrap_or("Use Case Diagram");
    let format = cfg.format.unwrap_or_else(|| OutputFormat::from_path(&cfg.output));
    info!(format:? = format; "Exporting diagram");
    match format {
        OutputFormat::Svg => {
            let svg_exporter = export::svg::Svg::new(&cfg.output);
            svg_exporter.export(&layout, title)?;
        }
        OutputFormat::Png => {
            let doc = export::svg::render_document(&layout, title);
            let bytes = export::raster::svg_to_png(
                &doc.to_string(),
                app_config.render.scale,
                &app_config.render.background,
            )?;
            fs::write(&cfg.output, bytes)?;
        }
    }

    info!(output_file = cfg.output; "Diagram exported successfully to");

    Ok(())
}
