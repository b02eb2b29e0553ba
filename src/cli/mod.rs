use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use crate::clipboard::{CarrierStore, ClipboardContent, ImageData};
use crate::config::Config;
use crate::library::SqliteLibrary;

#[derive(Parser)]
#[command(name = "carrierclip")]
#[command(about = "Clipboard hidden inside a picture in a shared photo library")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    #[command(about = "Copy text to the clipboard")]
    Copy { text: String },

    #[command(about = "Append text to the text already on the clipboard")]
    Append { text: String },

    #[command(about = "Print the text on the clipboard")]
    Paste,

    #[command(about = "Remove everything from the clipboard")]
    Clear,

    #[command(about = "Copy a PNG image to the clipboard")]
    CopyImage { path: PathBuf },

    #[command(about = "Save the clipboard image as a PNG")]
    PasteImage { path: PathBuf },

    #[command(about = "Show what the clipboard holds")]
    Status,

    #[command(about = "List every carrier picture in the library")]
    Assets,

    #[command(about = "Configuration management")]
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum ConfigAction {
    #[command(about = "Show current configuration")]
    Show,

    #[command(about = "Generate example configuration")]
    Init {
        #[arg(long)]
        force: bool,
    },

    #[command(about = "Validate configuration")]
    Validate,
}

pub struct CliHandler {
    config: Config,
    config_path: Option<PathBuf>,
    store: Option<CarrierStore<SqliteLibrary>>,
}

impl CliHandler {
    pub fn new(config_path: Option<PathBuf>) -> Result<Self> {
        let config = Config::load_config(config_path.as_deref())?;
        Ok(Self::with_config(config, config_path))
    }

    pub fn with_config(config: Config, config_path: Option<PathBuf>) -> Self {
        Self {
            config,
            config_path,
            store: None,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Lazily open the picture library when needed
    fn ensure_store(&mut self) -> Result<&CarrierStore<SqliteLibrary>> {
        let store = match self.store.take() {
            Some(store) => store,
            None => {
                info!("Opening picture library at {}", self.config.library.path.display());
                let library = SqliteLibrary::open(&self.config.library.path).with_context(|| {
                    format!(
                        "Failed to open picture library {}",
                        self.config.library.path.display()
                    )
                })?;
                CarrierStore::with_name(library, self.config.library.carrier_name.clone())
                    .with_max_size(self.config.clipboard.max_size)
            }
        };
        let store: &CarrierStore<SqliteLibrary> = self.store.insert(store);
        Ok(store)
    }

    pub fn handle_command(&mut self, command: Commands, out: &mut dyn Write) -> Result<()> {
        match command {
            Commands::Copy { text } => self.copy_text(&text, out),
            Commands::Append { text } => self.append_text(&text, out),
            Commands::Paste => self.paste_text(out),
            Commands::Clear => self.clear(out),
            Commands::CopyImage { path } => self.copy_image(&path, out),
            Commands::PasteImage { path } => self.paste_image(&path, out),
            Commands::Status => self.show_status(out),
            Commands::Assets => self.show_assets(out),
            Commands::Config { action } => self.handle_config_action(action, out),
        }
    }

    fn copy_text(&mut self, text: &str, out: &mut dyn Write) -> Result<()> {
        self.ensure_store()?.set_text(text)?;
        writeln!(out, "Text copied to clipboard")?;
        Ok(())
    }

    fn append_text(&mut self, text: &str, out: &mut dyn Write) -> Result<()> {
        let store = self.ensure_store()?;
        let mut proxy = store.generate_proxy()?;

        let combined = format!("{}{}", proxy.get_text(), text);
        proxy.set_text(combined);
        proxy.persist()?;

        writeln!(out, "Text appended to clipboard")?;
        Ok(())
    }

    fn paste_text(&mut self, out: &mut dyn Write) -> Result<()> {
        let text = self.ensure_store()?.get_text()?;
        writeln!(out, "{}", text)?;
        Ok(())
    }

    fn clear(&mut self, out: &mut dyn Write) -> Result<()> {
        self.ensure_store()?.clear()?;
        writeln!(out, "Clipboard cleared")?;
        Ok(())
    }

    fn copy_image(&mut self, path: &Path, out: &mut dyn Write) -> Result<()> {
        let rgba = image::open(path)
            .with_context(|| format!("Failed to load image {}", path.display()))?
            .to_rgba8();
        let (width, height) = rgba.dimensions();
        let image = ImageData::new(width as usize, height as usize, rgba.into_raw())?;

        self.ensure_store()?.set_image(&image)?;
        writeln!(out, "Image {}x{} copied to clipboard", width, height)?;
        Ok(())
    }

    fn paste_image(&mut self, path: &Path, out: &mut dyn Write) -> Result<()> {
        let image = self
            .ensure_store()?
            .get_image()?
            .ok_or_else(|| anyhow!("Clipboard does not contain an image"))?;

        image::save_buffer(
            path,
            &image.bytes,
            u32::try_from(image.width)?,
            u32::try_from(image.height)?,
            image::ColorType::Rgba8,
        )
        .with_context(|| format!("Failed to save image {}", path.display()))?;

        writeln!(
            out,
            "Image {}x{} saved to {}",
            image.width,
            image.height,
            path.display()
        )?;
        Ok(())
    }

    fn show_status(&mut self, out: &mut dyn Write) -> Result<()> {
        let library_path = self.config.library.path.clone();
        let store = self.ensure_store()?;
        let content = store.content()?;
        let assets = store.carrier_assets()?;

        writeln!(out, "CarrierClip Status:")?;
        writeln!(out, "  Version: {}", env!("CARGO_PKG_VERSION"))?;
        writeln!(
            out,
            "  Build: {} ({}, {})",
            env!("BUILD_DATE"),
            env!("TARGET"),
            env!("RUSTC_VERSION")
        )?;
        writeln!(out, "  Library: {}", library_path.display())?;
        writeln!(out, "  Carrier: {} ({} saved)", store.name(), assets.len())?;

        match &content {
            ClipboardContent::Empty => writeln!(out, "  Contents: empty")?,
            ClipboardContent::Text(text) => {
                writeln!(out, "  Contents: text ({} bytes)", text.len())?
            }
            ClipboardContent::Image(image) => {
                writeln!(out, "  Contents: image {}x{}", image.width, image.height)?
            }
        }

        Ok(())
    }

    fn show_assets(&mut self, out: &mut dyn Write) -> Result<()> {
        let store = self.ensure_store()?;
        let assets = store.carrier_assets()?;

        if assets.is_empty() {
            writeln!(out, "No carrier pictures found")?;
            return Ok(());
        }

        writeln!(out, "Carrier pictures ({}):", assets.len())?;
        for asset in &assets {
            writeln!(
                out,
                "{:>6}  [{}] {} bytes",
                asset.id,
                asset.saved_at.format("%Y-%m-%d %H:%M:%S"),
                asset.size
            )?;
        }

        Ok(())
    }

    fn handle_config_action(&mut self, action: ConfigAction, out: &mut dyn Write) -> Result<()> {
        match action {
            ConfigAction::Show => {
                writeln!(out, "Current Configuration:")?;
                writeln!(out, "{}", toml::to_string_pretty(&self.config)?)?;
            }
            ConfigAction::Init { force } => {
                let path = match &self.config_path {
                    Some(path) => path.clone(),
                    None => Config::default_path()
                        .ok_or_else(|| anyhow!("Could not find config directory"))?,
                };
                Config::write_example(&path, force)?;
                writeln!(out, "Example configuration written to {}", path.display())?;
            }
            ConfigAction::Validate => {
                // Config is already loaded and validated in CliHandler::new()
                writeln!(out, "Configuration is valid")?;
            }
        }
        Ok(())
    }
}
