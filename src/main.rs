//! qrbadge command-line entrypoint

use clap::Parser;
use qrbadge::output::render_generated;
use qrbadge::{
    ColorSpec, Error, FillMode, GeneratorOptions, MetadataSink, ModuleShape, QrBadgeConfig,
    QrGenerator, Result, SqliteMetadataStore, logging,
};
use std::path::PathBuf;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    name = "qrbadge",
    version,
    about = "Generate styled QR codes with a circular logo badge"
)]
struct Cli {
    /// Text or URL to encode. Prompts on stdin when omitted.
    #[arg(value_name = "TEXT")]
    text: Option<String>,

    /// Optional configuration file (toml/yaml). Defaults to qrbadge.{toml,yaml} in cwd/XDG config.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Logo image placed in the middle of the code
    #[arg(long, value_name = "PATH")]
    logo: Option<PathBuf>,

    /// Directory receiving generated PNG files
    #[arg(long, value_name = "DIR")]
    out_dir: Option<PathBuf>,

    /// SQLite database recording one row per generated code
    #[arg(long, value_name = "PATH")]
    database: Option<PathBuf>,

    /// Module shape (square, rounded, circle, gapped-square, vertical-bars, horizontal-bars)
    #[arg(long, value_name = "SHAPE")]
    shape: Option<ModuleShape>,

    /// Colour fill (solid, radial-gradient, square-gradient, horizontal-gradient, vertical-gradient, image-mask)
    #[arg(long, value_name = "FILL")]
    fill: Option<FillMode>,

    /// Module colour as a name, #hex or r,g,b
    #[arg(long, value_name = "COLOR")]
    color: Option<ColorSpec>,

    /// Second colour for gradient fills
    #[arg(long, value_name = "COLOR")]
    gradient_color: Option<ColorSpec>,

    /// Background colour
    #[arg(long, value_name = "COLOR")]
    background: Option<ColorSpec>,

    /// Image sampled for module colours with `--fill image-mask`
    #[arg(long, value_name = "PATH")]
    mask_image: Option<PathBuf>,

    /// Decode the written image and check it matches the input
    #[arg(long)]
    verify: bool,

    /// Output results as formatted JSON instead of human-readable text
    #[arg(long)]
    json: bool,
}

impl Cli {
    fn apply(&self, config: &mut QrBadgeConfig) {
        if let Some(ref logo) = self.logo {
            config.output.logo = Some(logo.clone());
        }
        if let Some(ref dir) = self.out_dir {
            config.output.dir = dir.clone();
        }
        if let Some(ref database) = self.database {
            config.metadata.database = Some(database.clone());
        }
        if let Some(shape) = self.shape {
            config.style.shape = shape;
        }
        if let Some(fill) = self.fill {
            config.style.fill = fill;
        }
        if let Some(ref color) = self.color {
            config.style.color = color.clone();
        }
        if let Some(ref color) = self.gradient_color {
            config.style.gradient_color = Some(color.clone());
        }
        if let Some(ref color) = self.background {
            config.style.background = color.clone();
        }
        if let Some(ref mask) = self.mask_image {
            config.style.mask_image = Some(mask.clone());
        }
        if self.verify {
            config.output.verify = true;
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = QrBadgeConfig::load(cli.config.as_deref())?;
    cli.apply(&mut config);

    logging::init(&config.logging)?;

    let sink: Option<Box<dyn MetadataSink>> = match config.metadata.database {
        Some(ref path) => {
            info!(path = %path.display(), table = %config.metadata.table, "Recording metadata");
            let store = SqliteMetadataStore::open(path, config.metadata.table.clone()).await?;
            Some(Box::new(store))
        }
        None => None,
    };

    let mut generator = QrGenerator::new(GeneratorOptions::from(&config), sink)?;
    if let Some(ref logo) = config.output.logo {
        generator.set_logo_by_path(logo)?;
    }

    let text = match cli.text {
        Some(text) => text,
        None => prompt("url: ").await?,
    };

    let generated = generator.generate(&text).await?;
    let rendered = render_generated(&generated)?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&rendered.json)?);
    } else {
        for line in &rendered.human {
            println!("{line}");
        }
    }

    if generated.verified == Some(false) {
        return Err(Error::QrDecode(format!(
            "{} does not decode to the input text",
            generated.path.display()
        )));
    }

    Ok(())
}

async fn prompt(label: &str) -> Result<String> {
    let mut stdout = tokio::io::stdout();
    stdout.write_all(label.as_bytes()).await?;
    stdout.flush().await?;

    read_text(&mut BufReader::new(tokio::io::stdin())).await
}

/// One line of input without its line terminator; an empty line is valid text.
async fn read_text<R: AsyncBufRead + Unpin>(reader: &mut R) -> Result<String> {
    let mut line = String::new();
    reader.read_line(&mut line).await?;

    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_read_text_keeps_empty_line() {
        assert_eq!(read_text(&mut &b"\n"[..]).await.unwrap(), "");
        assert_eq!(read_text(&mut &b""[..]).await.unwrap(), "");
    }

    #[tokio::test]
    async fn test_read_text_strips_only_terminator() {
        assert_eq!(
            read_text(&mut &b" https://example.com \r\nnext\n"[..])
                .await
                .unwrap(),
            " https://example.com "
        );
    }
}
