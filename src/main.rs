use caption_press::delivery::Mailer;
use caption_press::session::Session;
use caption_press::text::RustTypeEngine;
use caption_press::{config, logging, output};
use clap::{ArgAction, Parser, Subcommand};
use std::path::{Path, PathBuf};

fn version_string() -> &'static str {
    let on_tag = env!("ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once at startup
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "caption-press")]
#[command(about = "Put auto-fitted captions on an image, then save or mail it")]
#[command(long_about = "\
Put auto-fitted captions on an image, then save or mail it

Each caption is drawn at the largest font size that fits the image, centered
horizontally. The top caption sits at one fifth of the height, the bottom
caption near the lower edge.

Images are normalized on load: anything larger than the max box shrinks to
fit it, anything smaller than the min box grows to cover it.

Fonts are chosen by palette name (see 'caption-press fonts') or by a path to
a .ttf/.otf file. Colors: black, white. Formats: png, jpeg, tiff, bmp.

Mail is sent through the relay in [mail]; the password is read from the
environment variable named by mail.password_env.

Run 'caption-press gen-config' to generate a documented caption-press.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Directory containing caption-press.toml
    #[arg(long, default_value = ".", global = true)]
    config: PathBuf,

    /// Log progress to stderr (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

/// Image, captions and style shared by compose and send.
#[derive(clap::Args)]
struct CaptionArgs {
    /// Source image (PNG, JPEG, TIFF or BMP)
    image: PathBuf,
    /// Palette font name or path to a .ttf/.otf file
    #[arg(long)]
    font: String,
    /// Caption color: black or white
    #[arg(long)]
    color: String,
    /// Top caption text
    #[arg(long, default_value = "")]
    top: String,
    /// Bottom caption text
    #[arg(long, default_value = "")]
    bottom: String,
    /// Output format (defaults to output.format from the config)
    #[arg(long)]
    format: Option<String>,
}

#[derive(Subcommand)]
enum Command {
    /// Caption an image and optionally save it
    Compose {
        #[command(flatten)]
        captions: CaptionArgs,
        /// Save as <output-dir>/<NAME>.<ext>; without it nothing is written
        #[arg(long)]
        output_name: Option<String>,
        #[arg(long, default_value = ".")]
        output_dir: PathBuf,
        /// Print the compose report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Caption an image and mail it as an attachment
    Send {
        #[command(flatten)]
        captions: CaptionArgs,
        /// Recipient address
        #[arg(long)]
        to: String,
        /// Attachment name, without extension
        #[arg(long)]
        output_name: String,
    },
    /// List the configured font palette
    Fonts,
    /// Print a stock caption-press.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    match cli.command {
        Command::Compose {
            captions,
            output_name,
            output_dir,
            json,
        } => {
            let app_config = config::load_config(&cli.config)?;
            let session = compose(&app_config, &cli.config, &captions)?;
            if let (Some(source), Some(composite), Some(style)) =
                (session.source(), session.composite(), session.style())
            {
                if json {
                    let report = output::compose_report(source, composite, &style);
                    println!("{}", serde_json::to_string_pretty(&report)?);
                } else {
                    output::print_compose_output(source, composite, &style);
                }
            }
            if let Some(name) = output_name {
                let saved = session.save(&output_dir, &name)?;
                if !json {
                    output::print_save_output(&saved);
                }
            }
        }
        Command::Send {
            captions,
            to,
            output_name,
        } => {
            let app_config = config::load_config(&cli.config)?;
            let session = compose(&app_config, &cli.config, &captions)?;
            let mailer = Mailer::from_config(&app_config.mail)?;
            let sent = session.send(&mailer, &to, &output_name)?;
            output::print_send_output(&sent);
        }
        Command::Fonts => {
            let app_config = config::load_config(&cli.config)?;
            output::print_fonts_output(&app_config.font_palette(&cli.config));
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Build a session from the arguments and run one compose.
fn compose(
    app_config: &config::AppConfig,
    config_dir: &Path,
    args: &CaptionArgs,
) -> Result<Session, Box<dyn std::error::Error>> {
    let mut session = Session::from_config(app_config);
    session.select_image(&args.image)?;
    session.select_font(&app_config.font_palette(config_dir), &args.font)?;
    session.select_color(&args.color)?;
    if let Some(format) = &args.format {
        session.select_format(format)?;
    }
    session.compose(&RustTypeEngine::new(), &args.top, &args.bottom)?;
    Ok(session)
}
