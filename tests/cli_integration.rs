use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tempfile::TempDir;

use carrierclip::{
    cli::{Cli, CliHandler, Commands, ConfigAction},
    config::Config,
};

fn test_handler(temp_dir: &TempDir) -> CliHandler {
    let mut config = Config::default();
    config.library.path = temp_dir.path().join("pictures.db");
    CliHandler::with_config(config, Some(temp_dir.path().join("config.toml")))
}

fn run(handler: &mut CliHandler, command: Commands) -> Result<String> {
    let mut out = Vec::new();
    handler.handle_command(command, &mut out)?;
    Ok(String::from_utf8(out)?)
}

#[test]
fn test_cli_parsing() -> Result<()> {
    let cli = Cli::try_parse_from(["carrierclip", "status"])?;
    assert_eq!(cli.command, Commands::Status);

    let cli = Cli::try_parse_from(["carrierclip", "copy", "hello there"])?;
    assert_eq!(
        cli.command,
        Commands::Copy {
            text: "hello there".to_string()
        }
    );

    let cli = Cli::try_parse_from(["carrierclip", "paste-image", "out.png"])?;
    assert_eq!(
        cli.command,
        Commands::PasteImage {
            path: PathBuf::from("out.png")
        }
    );

    let cli = Cli::try_parse_from(["carrierclip", "-v", "config", "init", "--force"])?;
    assert!(cli.verbose);
    assert_eq!(
        cli.command,
        Commands::Config {
            action: ConfigAction::Init { force: true }
        }
    );

    Ok(())
}

#[test]
fn test_copy_then_paste() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let mut handler = test_handler(&temp_dir);

    run(
        &mut handler,
        Commands::Copy {
            text: "hello".to_string(),
        },
    )?;
    let output = run(&mut handler, Commands::Paste)?;
    assert_eq!(output, "hello\n");

    Ok(())
}

#[test]
fn test_append_uses_existing_text() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let mut handler = test_handler(&temp_dir);

    run(
        &mut handler,
        Commands::Copy {
            text: "abc".to_string(),
        },
    )?;
    run(
        &mut handler,
        Commands::Append {
            text: "def".to_string(),
        },
    )?;

    assert_eq!(run(&mut handler, Commands::Paste)?, "abcdef\n");
    Ok(())
}

#[test]
fn test_status_and_assets() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let mut handler = test_handler(&temp_dir);

    let output = run(&mut handler, Commands::Assets)?;
    assert!(output.contains("No carrier pictures found"));

    run(
        &mut handler,
        Commands::Copy {
            text: "four".to_string(),
        },
    )?;
    run(&mut handler, Commands::Clear)?;

    let output = run(&mut handler, Commands::Status)?;
    assert!(output.contains("CarrierClip Status:"));
    assert!(output.contains("clipboard.jpg (2 saved)"));
    assert!(output.contains("Contents: empty"));

    let output = run(&mut handler, Commands::Assets)?;
    assert!(output.contains("Carrier pictures (2):"));

    Ok(())
}

#[test]
fn test_status_is_read_only() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let mut handler = test_handler(&temp_dir);

    let output = run(&mut handler, Commands::Status)?;
    assert!(output.contains("clipboard.jpg (0 saved)"));
    assert!(output.contains("Contents: empty"));

    run(
        &mut handler,
        Commands::Copy {
            text: "hello".to_string(),
        },
    )?;
    run(&mut handler, Commands::Status)?;
    let output = run(&mut handler, Commands::Status)?;
    assert!(output.contains("clipboard.jpg (1 saved)"));
    assert!(output.contains("Contents: text (5 bytes)"));

    Ok(())
}

#[test]
fn test_image_round_trip_through_png()-> Result<()> {
    let temp_dir = TempDir::new()?;
    let mut handler = test_handler(&temp_dir);

    let source = temp_dir.path().join("source.png");
    let pixels = vec![255, 0, 0, 255, 0, 255, 0, 128, 0, 0, 255, 255];
    image::save_buffer(&source, &pixels, 3, 1, image::ColorType::Rgba8)?;

    run(&mut handler, Commands::CopyImage { path: source })?;
    let status = run(&mut handler, Commands::Status)?;
    assert!(status.contains("Contents: image 3x1"));

    let target = temp_dir.path().join("target.png");
    run(
        &mut handler,
        Commands::PasteImage {
            path: target.clone(),
        },
    )?;

    let decoded = image::open(&target)?.to_rgba8();
    assert_eq!(decoded.dimensions(), (3, 1));
    assert_eq!(decoded.into_raw(), pixels);

    Ok(())
}

#[test]
fn test_paste_image_without_image_fails() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let mut handler = test_handler(&temp_dir);

    let result = run(
        &mut handler,
        Commands::PasteImage {
            path: temp_dir.path().join("none.png"),
        },
    );
    assert!(result.is_err());

    Ok(())
}

#[test]
fn test_config_init_and_reload() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let config_path = temp_dir.path().join("config.toml");
    let mut handler = test_handler(&temp_dir);

    run(
        &mut handler,
        Commands::Config {
            action: ConfigAction::Init { force: false },
        },
    )?;
    assert!(config_path.exists());

    let handler = CliHandler::new(Some(config_path))?;
    assert_eq!(handler.config().library.carrier_name, "clipboard.jpg");

    Ok(())
}
