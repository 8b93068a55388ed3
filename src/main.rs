use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use design_codec::data::design_code;
use design_codec::{
    decode_body, encode, encode_basic_image, render_layer, BasicFit, Design, DesignError, DesignMeta, DesignType,
    EncodeConfig, EncodedDesign, PixelBuffer, Result,
};

#[derive(Parser)]
#[command(name = "design_codec")]
#[command(about = "Encode and decode custom design images")]
struct Cli {
    /// JSON file overriding the encoder settings
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print every design type and its layers as JSON
    Types,
    /// Encode PNG layers into a design envelope
    Encode {
        /// Design type code or name, e.g. 101 or short-sleeve-tee
        #[arg(long = "type", default_value = "basic-design")]
        design_type: String,
        /// Layer image as name=path, once per layer
        #[arg(long = "layer", value_name = "NAME=PATH", required = true)]
        layers: Vec<String>,
        #[arg(long, default_value = "")]
        island: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        net_image: Option<PathBuf>,
        #[arg(long)]
        preview_image: Option<PathBuf>,
        #[arg(long, short, default_value = "./output")]
        out: PathBuf,
    },
    /// Decode a design body into PNG layers
    Decode {
        body: PathBuf,
        /// Render a single internal tile instead of the external layers
        #[arg(long)]
        layer: Option<usize>,
        #[arg(long, short, default_value = "./output")]
        out: PathBuf,
    },
    /// Split an image into 32x32 tiles and encode one basic design per tile
    Tile {
        image: PathBuf,
        #[arg(long, default_value = "")]
        island: String,
        #[arg(long)]
        name: String,
        #[arg(long, short, default_value = "./output")]
        out: PathBuf,
    },
    /// Convert between a numeric design id and its XXXX-XXXX-XXXX code
    Code { value: String },
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            match e.code() {
                Some(code) => log::error!("{} (code {})", e, code),
                None => log::error!("{}", e),
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => {
            log::info!("Loading settings from {}", path.display());
            EncodeConfig::load(path)?
        }
        None => EncodeConfig::default(),
    };

    match cli.command {
        Commands::Types => {
            println!("{}", serde_json::to_string_pretty(DesignType::all())?);
            Ok(())
        }
        Commands::Encode {
            design_type,
            layers,
            island,
            name,
            net_image,
            preview_image,
            out,
        } => {
            let design_type = DesignType::lookup(&design_type)?;
            log::info!("Encoding {} \"{}\"", design_type, name);

            let mut images = BTreeMap::new();
            for arg in &layers {
                let (layer, path) = parse_layer_arg(arg);
                if images.insert(layer.to_string(), open_rgba(Path::new(path))?).is_some() {
                    return Err(DesignError::DuplicateLayer(layer.to_string()));
                }
            }

            let meta = DesignMeta::new(island, name.as_str());
            let design = if design_type.is_pro() {
                Design::new(design_type, meta, images)?
            } else {
                Design::basic_from_layers(meta, images)?
            };

            let (was_quantized, encoded) = encode(&design, &config)?;
            if was_quantized {
                log::warn!("\"{}\" had too many colours and was quantized", name);
            }

            let encoded = encoded.with_previews(read_optional(net_image)?, read_optional(preview_image)?);
            fs::create_dir_all(&out)?;
            write_envelope(&out, &name, &encoded)
        }
        Commands::Decode { body, layer, out } => {
            let bytes = fs::read(&body)?;
            fs::create_dir_all(&out)?;

            if let Some(index) = layer {
                let tile = render_layer(&bytes, index)?;
                return save_png(&tile, &out.join(format!("{}.png", index)));
            }

            let design = decode_body(&bytes)?;
            log::info!(
                "Decoded {} \"{}\" from {}",
                design.design_type(),
                design.meta.design_name,
                design.meta.island_name
            );
            for (name, image) in design.layers() {
                save_png(image, &out.join(format!("{}.png", name)))?;
            }
            Ok(())
        }
        Commands::Tile {
            image,
            island,
            name,
            out,
        } => {
            let config = EncodeConfig {
                basic_fit: BasicFit::Tile,
                ..config
            };
            let image = open_rgba(&image)?;
            let designs = encode_basic_image(image, DesignMeta::new(island, name.as_str()), &config)?;
            log::info!("Split \"{}\" into {} designs", name, designs.len());

            fs::create_dir_all(&out)?;
            for (i, (was_quantized, encoded)) in designs.iter().enumerate() {
                if *was_quantized {
                    log::warn!("Tile {} had too many colours and was quantized", i + 1);
                }
                write_envelope(&out, &format!("{}_{}", name, i + 1), encoded)?;
            }
            Ok(())
        }
        Commands::Code { value } => {
            let converted = match value.parse::<u64>() {
                Ok(id) => design_code::to_code(id)?,
                Err(_) => design_code::to_id(&value)?.to_string(),
            };
            println!("{}", converted);
            Ok(())
        }
    }
}

fn parse_layer_arg(arg: &str) -> (&str, &str) {
    // A lone path is the single layer of a basic design
    arg.split_once('=').unwrap_or(("0", arg))
}

fn open_rgba(path: &Path) -> Result<PixelBuffer> {
    Ok(image::open(path)?.to_rgba8())
}

fn read_optional(path: Option<PathBuf>) -> Result<Vec<u8>> {
    match path {
        Some(path) => Ok(fs::read(path)?),
        None => Ok(Vec::new()),
    }
}

fn write_envelope(dir: &Path, stem: &str, encoded: &EncodedDesign) -> Result<()> {
    let files = [
        ("meta.msgpack", &encoded.meta),
        ("body.msgpack", &encoded.body),
        ("net.png", &encoded.net_image),
        ("preview.png", &encoded.preview_image),
    ];
    for (suffix, bytes) in files {
        if bytes.is_empty() {
            continue;
        }
        let path = dir.join(format!("{}.{}", stem, suffix));
        fs::write(&path, bytes)?;
        log::info!("Wrote {}", path.display());
    }
    Ok(())
}

/// Saves a decoded layer, then shrinks it with oxipng
fn save_png(image: &PixelBuffer, path: &Path) -> Result<()> {
    let temp_path = path.with_extension("temp.png");
    image.save(&temp_path)?;

    let mut options = oxipng::Options::from_preset(2);
    options.bit_depth_reduction = true;

    match oxipng::optimize(
        &oxipng::InFile::Path(temp_path.clone()),
        &oxipng::OutFile::Path(Some(path.to_path_buf())),
        &options,
    ) {
        Ok(_) => {
            let _ = fs::remove_file(temp_path);
        }
        Err(e) => {
            fs::rename(temp_path, path)?;
            log::warn!("oxipng optimisation failed for {}: {}. File saved unoptimised.", path.display(), e);
        }
    }

    log::info!("Wrote {}", path.display());
    Ok(())
}
