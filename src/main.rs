use clap::Parser;
use metalens::{ExtractError, ExtractorConfig, ExtractorRegistry, MarkupMode, extract_with};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Muestra la metadata de un documento según su tipo MIME")]
struct Cli {
    /// Archivo a inspeccionar
    #[arg(required_unless_present = "list_types")]
    path: Option<PathBuf>,

    /// Tipo MIME declarado del archivo (no se deduce del contenido)
    #[arg(short, long, required_unless_present = "list_types")]
    mime: Option<String>,

    /// Conserva lo leído cuando un fragmento XML está mal formado
    #[arg(long, env = "METALENS_LENIENT")]
    lenient: bool,

    /// Archivo TOML con la configuración de los extractores
    #[arg(long)]
    config: Option<PathBuf>,

    /// JSON en una sola línea
    #[arg(long)]
    compact: bool,

    /// Lista los tipos MIME soportados y termina
    #[arg(long)]
    list_types: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("Error: {error}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), ExtractError> {
    let mut config = match &cli.config {
        Some(path) => ExtractorConfig::load(path)?,
        None => ExtractorConfig::default(),
    };
    if cli.lenient {
        config.markup_mode = MarkupMode::Lenient;
    }

    let registry = ExtractorRegistry::with_builtin(&config);

    if cli.list_types {
        for (mime, extractor) in registry.supported_types() {
            println!("{mime}\t{extractor}");
        }
        return Ok(());
    }

    let (Some(path), Some(mime)) = (&cli.path, &cli.mime) else {
        return Err(ExtractError::Config(
            "Se necesitan la ruta y el tipo MIME".to_string(),
        ));
    };

    let metadata = extract_with(&registry, path, mime)?;

    let json = if cli.compact {
        serde_json::to_string(&metadata)
    } else {
        serde_json::to_string_pretty(&metadata)
    }
    .map_err(|err| ExtractError::Config(format!("No se pudo serializar JSON: {err}")))?;

    println!("{json}");
    Ok(())
}
