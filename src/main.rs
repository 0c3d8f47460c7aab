//! # Cardnews CLI
//!
//! Command-line front end for editing, rendering and syncing card news.
//!
//! ## Usage
//!
//! ```bash
//! # List templates and pick one
//! cardnews templates
//! cardnews select vertical-card
//!
//! # Edit fields of the selected template
//! cardnews set headline1 "새로운 시작"
//! cardnews set bodyTexts '["첫째", "둘째"]' --json
//! cardnews upload imageUrl ./candidate.jpg
//!
//! # Export a PNG at 2x
//! cardnews render --out ./exports
//!
//! # Run the backend
//! cardnews serve --dev-mode
//! ```

use clap::{Args, Parser, Subcommand};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cardnews::{
    CardNewsError, Editor, TemplateType,
    client::ApiClient,
    editor::Upload,
    render::{EXPORT_PIXEL_RATIO, RenderContext, check_pixel_ratio, export, font::FontBook, images::ImageSet},
    server::{self, ImageKind, ServerConfig, auth::hash_password, models::CardMetadata},
    state::{ContentCorrections, CopyrightPatch, FileStore},
};

/// Cardnews - card-news graphic editor
#[derive(Parser, Debug)]
#[command(name = "cardnews")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Directory holding the local editor state
    #[arg(long, global = true, env = "CARDNEWS_STORE", default_value = ".cardnews")]
    store: PathBuf,

    /// Content correction applied on every load, as FROM=TO (repeatable)
    #[arg(
        long = "banned-word",
        global = true,
        env = "CARDNEWS_BANNED_WORDS",
        value_delimiter = ',',
        value_name = "FROM=TO",
        default_value = "양보=안보"
    )]
    banned_words: Vec<String>,

    /// TrueType font for regular text (falls back to a bitmap font)
    #[arg(long, global = true, env = "CARDNEWS_FONT")]
    font: Option<PathBuf>,

    /// TrueType font for bold text
    #[arg(long, global = true, env = "CARDNEWS_BOLD_FONT")]
    bold_font: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug, Clone)]
struct Remote {
    /// Backend base URL
    #[arg(long, env = "CARDNEWS_SERVER", default_value = "http://127.0.0.1:8080")]
    server: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List templates
    Templates,

    /// Print a template's record as JSON (defaults to the selected one)
    Show { template: Option<String> },

    /// Select the template the form edits
    Select { template: String },

    /// Set a field of the selected template
    Set {
        field: String,
        value: String,

        /// Parse VALUE as JSON instead of taking it as text
        #[arg(long)]
        json: bool,
    },

    /// Clear a field so it stays empty
    Clear { field: String },

    /// Put an image file into an image field
    Upload {
        field: String,
        file: PathBuf,

        /// Append to a list field (textImageUrls) instead of replacing
        #[arg(long)]
        append: bool,

        /// Upload to the backend collection (profile, background, text, logo)
        /// and store its URL instead of a data URL
        #[arg(long, value_name = "KIND")]
        remote: Option<String>,

        #[command(flatten)]
        api: Remote,
    },

    /// Show or change the app title and subtitle
    Title {
        title: Option<String>,

        #[arg(long)]
        subtitle: Option<String>,
    },

    /// Update the copyright banner on every template
    Copyright(CopyrightArgs),

    /// Render the selected template (or TEMPLATE) to PNG
    Render {
        template: Option<String>,

        /// Output directory
        #[arg(long, default_value = ".")]
        out: PathBuf,

        /// Pixel ratio, at most 4
        #[arg(long, default_value_t = EXPORT_PIXEL_RATIO, value_parser = parse_ratio)]
        ratio: f32,

        /// Also save the PNG and its record on the backend
        #[arg(long)]
        save: bool,

        #[command(flatten)]
        api: Remote,
    },

    /// Saved content snapshots
    #[command(subcommand)]
    Content(ContentCommand),

    /// Backend image collections
    #[command(subcommand)]
    Images(ImagesCommand),

    /// Save the current record as "my default"
    SaveDefault,

    /// Reset to "my default", or to the built-in defaults without one
    Reset,

    /// Log in, or check the stored session when ID is omitted
    Login {
        id: Option<String>,

        #[arg(long, env = "CARDNEWS_PASSWORD", hide_env_values = true)]
        password: Option<String>,

        #[command(flatten)]
        api: Remote,
    },

    /// App-wide defaults on the backend
    #[command(subcommand)]
    Defaults(DefaultsCommand),

    /// Print an argon2 hash for a --user entry
    HashPassword { password: String },

    /// Run the HTTP backend
    Serve(ServeArgs),
}

#[derive(Args, Debug)]
struct CopyrightArgs {
    #[arg(long)]
    left1: Option<String>,
    #[arg(long)]
    left2: Option<String>,
    #[arg(long)]
    center_name: Option<String>,
    #[arg(long)]
    right1: Option<String>,
    #[arg(long)]
    right2: Option<String>,
    #[arg(long)]
    right3: Option<String>,
    #[arg(long)]
    highlight_word: Option<String>,
    #[arg(long)]
    highlight_word2: Option<String>,
}

#[derive(Subcommand, Debug)]
enum ContentCommand {
    /// Snapshot the selected template's record
    Save {
        title: String,

        /// Also store it on the backend
        #[arg(long)]
        remote: bool,

        #[command(flatten)]
        api: Remote,
    },
    List {
        #[arg(long)]
        remote: bool,

        #[command(flatten)]
        api: Remote,
    },
    Delete {
        id: String,

        #[arg(long)]
        remote: bool,

        #[command(flatten)]
        api: Remote,
    },
    /// Load a snapshot back into the editor
    Load {
        id: String,

        /// ID names a saved card-news image on the backend
        #[arg(long, conflicts_with = "remote")]
        image: bool,

        /// ID names a snapshot on the backend
        #[arg(long)]
        remote: bool,

        #[command(flatten)]
        api: Remote,
    },
}

#[derive(Subcommand, Debug)]
enum ImagesCommand {
    /// KIND: profile, background, text, logo or cardnews
    List {
        kind: String,

        #[command(flatten)]
        api: Remote,
    },
    Delete {
        kind: String,
        id: String,

        #[command(flatten)]
        api: Remote,
    },
}

#[derive(Subcommand, Debug)]
enum DefaultsCommand {
    /// Fetch and merge the backend's defaults
    Pull {
        #[command(flatten)]
        api: Remote,
    },
    /// Store the current state as the backend's defaults
    Push {
        #[command(flatten)]
        api: Remote,
    },
}

#[derive(Args, Debug)]
struct ServeArgs {
    #[arg(long, env = "CARDNEWS_LISTEN", default_value = "127.0.0.1:8080")]
    listen: String,

    /// Keep records and blobs here instead of in memory
    #[arg(long, env = "CARDNEWS_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Base URL used in signed blob links
    #[arg(long, env = "CARDNEWS_PUBLIC_URL")]
    public_url: Option<String>,

    #[arg(long, env = "CARDNEWS_JWT_SECRET", hide_env_values = true, default_value = "")]
    jwt_secret: String,

    #[arg(long, default_value_t = 60 * 24)]
    token_ttl_mins: i64,

    #[arg(long, default_value_t = 60 * 60)]
    url_ttl_secs: i64,

    /// Account as LOGIN:ARGON2_HASH (repeatable)
    #[arg(long = "user", env = "CARDNEWS_USERS", value_delimiter = ',')]
    users: Vec<String>,

    /// Disable authentication
    #[arg(long, env = "CARDNEWS_DEV_MODE")]
    dev_mode: bool,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cardnews=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(e) = run(Cli::parse()).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn parse_template(s: &str) -> Result<TemplateType, CardNewsError> {
    TemplateType::parse(s.trim()).ok_or_else(|| CardNewsError::UnknownTemplate(s.to_string()))
}

fn parse_ratio(s: &str) -> Result<f32, String> {
    let ratio: f32 = s.parse().map_err(|e| format!("{}", e))?;
    check_pixel_ratio(ratio).map_err(|e| e.to_string())
}

fn parse_kind(s: &str) -> Result<ImageKind, CardNewsError> {
    ImageKind::parse(s).ok_or_else(|| CardNewsError::Validation(format!("unknown image kind '{}'", s)))
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), CardNewsError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn open_editor(cli: &Cli) -> Result<Editor<FileStore>, CardNewsError> {
    let corrections = ContentCorrections::parse(&cli.banned_words)?;
    Ok(Editor::load(FileStore::open(&cli.store)?, corrections))
}

fn client(editor: &Editor<FileStore>, api: &Remote) -> ApiClient {
    ApiClient::new(&api.server).with_token(editor.access_token())
}

fn load_fonts(cli: &Cli) -> Result<FontBook, CardNewsError> {
    if cli.font.is_none() && cli.bold_font.is_none() {
        return Ok(FontBook::bitmap());
    }
    FontBook::load(cli.font.as_deref(), cli.bold_font.as_deref())
}

async fn run(cli: Cli) -> Result<(), CardNewsError> {
    match &cli.command {
        Commands::HashPassword { password } => {
            let hash = hash_password(password).map_err(|e| CardNewsError::Config(e.to_string()))?;
            println!("{}", hash);
            return Ok(());
        }
        Commands::Serve(args) => {
            let public_url = args
                .public_url
                .clone()
                .unwrap_or_else(|| format!("http://{}", args.listen));
            let config = ServerConfig {
                listen_addr: args.listen.clone(),
                data_dir: args.data_dir.clone(),
                public_url,
                jwt_secret: args.jwt_secret.clone(),
                token_ttl_mins: args.token_ttl_mins,
                url_ttl_secs: args.url_ttl_secs,
                users: args.users.clone(),
                dev_mode: args.dev_mode,
            };
            return server::serve(config, load_fonts(&cli)?).await;
        }
        _ => {}
    }

    let mut editor = open_editor(&cli)?;

    match &cli.command {
        Commands::Templates => {
            for kind in TemplateType::ALL {
                let (w, h) = kind.dimensions();
                let marker = if kind == editor.selected() { "*" } else { " " };
                println!("{} {:<20} {}x{}  {}", marker, kind.id(), w, h, kind.label());
            }
        }

        Commands::Show { template } => {
            let kind = match template {
                Some(t) => parse_template(t)?,
                None => editor.selected(),
            };
            print_json(&editor.block(kind))?;
        }

        Commands::Select { template } => {
            editor.select_template(parse_template(template)?);
            println!("Selected {}", editor.selected());
        }

        Commands::Set { field, value, json } => {
            let value = if *json {
                serde_json::from_str(value)?
            } else {
                Value::String(value.clone())
            };
            editor.set_field(field, value)?;
        }

        Commands::Clear { field } => editor.clear_field(field)?,

        Commands::Upload {
            field,
            file,
            append,
            remote,
            api,
        } => {
            let upload = Upload::from_path(file)?;
            let reference = match remote {
                Some(kind) => upload_remote(&client(&editor, api), parse_kind(kind)?, &upload).await?,
                None => upload.to_data_url(),
            };
            if *append {
                editor.push_list_item(field, &reference)?;
            } else {
                editor.set_field(field, Value::String(reference))?;
            }
            println!("Set {} from {}", field, upload.name);
        }

        Commands::Title { title, subtitle } => {
            if let Some(title) = title {
                editor.set_title(title);
            }
            if let Some(subtitle) = subtitle {
                editor.set_subtitle(subtitle);
            }
            println!("{}\n{}", editor.title(), editor.subtitle());
        }

        Commands::Copyright(args) => {
            editor.set_copyright(&CopyrightPatch {
                left1: args.left1.clone(),
                left2: args.left2.clone(),
                center_name: args.center_name.clone(),
                right1: args.right1.clone(),
                right2: args.right2.clone(),
                right3: args.right3.clone(),
                highlight_word: args.highlight_word.clone(),
                highlight_word2: args.highlight_word2.clone(),
            })?;
        }

        Commands::Render {
            template,
            out,
            ratio,
            save,
            api,
        } => {
            let kind = match template {
                Some(t) => parse_template(t)?,
                None => editor.selected(),
            };
            let path = render_to(&cli, &editor, kind, out, *ratio, save.then(|| client(&editor, api))).await?;
            println!("{}", path.display());
        }

        Commands::Content(cmd) => content(&mut editor, cmd).await?,

        Commands::Images(cmd) => match cmd {
            ImagesCommand::List { kind, api } => {
                let images = client(&editor, api).list_images(parse_kind(kind)?).await?;
                for image in images {
                    println!(
                        "{}  {}  {}  {}",
                        image.id,
                        image.filename,
                        image.name.as_deref().unwrap_or("-"),
                        image.url.as_deref().unwrap_or("-")
                    );
                }
            }
            ImagesCommand::Delete { kind, id, api } => {
                client(&editor, api).delete_image(parse_kind(kind)?, id).await?;
                println!("Deleted {}", id);
            }
        },

        Commands::SaveDefault => {
            editor.save_as_user_default()?;
            println!("Saved current content as your default");
        }

        Commands::Reset => {
            editor.reset_to_defaults();
            println!("Reset {}", editor.selected());
        }

        Commands::Login { id, password, api } => match id {
            Some(id) => {
                let password = password
                    .as_deref()
                    .ok_or_else(|| CardNewsError::Validation("--password is required".into()))?;
                let mut api_client = ApiClient::new(&api.server);
                let response = api_client.login(id, password).await?;
                editor.set_access_token(Some(&response.access_token));
                println!("Logged in as {}", response.user.email);
            }
            None => match client(&editor, api).verify_session().await? {
                Some(user) => println!("Logged in as {}", user.email),
                None => {
                    editor.set_access_token(None);
                    println!("Not logged in");
                }
            },
        },

        Commands::Defaults(cmd) => match cmd {
            DefaultsCommand::Pull { api } => {
                let defaults = client(&editor, api).fetch_defaults().await?;
                editor.apply_server_defaults(&defaults);
                println!("Applied server defaults ({} selected)", editor.selected());
            }
            DefaultsCommand::Push { api } => {
                client(&editor, api).push_defaults(&editor.to_app_defaults()).await?;
                println!("Saved app defaults to {}", api.server);
            }
        },

        Commands::HashPassword { .. } | Commands::Serve(_) => {}
    }

    Ok(())
}

/// Upload to a backend collection and return the new image's signed URL.
async fn upload_remote(api: &ApiClient, kind: ImageKind, upload: &Upload) -> Result<String, CardNewsError> {
    let stored = api.upload_image(kind, upload).await?;
    api.list_images(kind)
        .await?
        .into_iter()
        .find(|img| img.id == stored.id)
        .and_then(|img| img.url)
        .ok_or_else(|| CardNewsError::Api(format!("uploaded image {} has no URL", stored.id)))
}

async fn render_to(
    cli: &Cli,
    editor: &Editor<FileStore>,
    kind: TemplateType,
    out: &Path,
    ratio: f32,
    save: Option<ApiClient>,
) -> Result<PathBuf, CardNewsError> {
    let data = editor.data(kind)?;
    let fonts = load_fonts(cli)?;
    let mut images = ImageSet::new();
    images.load_local(&data);
    images.fetch_remote(&reqwest::Client::new(), &data).await;

    let exported = export(&data, &RenderContext::new(&fonts, &images), ratio)?;
    std::fs::create_dir_all(out)?;
    let path = out.join(&exported.filename);
    std::fs::write(&path, &exported.png)?;

    if let Some(api) = save {
        let metadata = CardMetadata {
            template: kind,
            data: data.to_block(),
        };
        let saved = api.save_card(&exported, &metadata).await?;
        println!("Saved {} on the server", saved.filename);
    }
    Ok(path)
}

async fn content(editor: &mut Editor<FileStore>, cmd: &ContentCommand) -> Result<(), CardNewsError> {
    match cmd {
        ContentCommand::Save { title, remote, api } => {
            let saved = editor.save_content(title);
            if *remote {
                client(editor, api).create_content(&saved).await?;
            }
            println!("Saved {} ({})", saved.title, saved.id);
        }
        ContentCommand::List { remote, api } => {
            let contents = if *remote {
                client(editor, api).list_contents().await?
            } else {
                editor.saved_contents().to_vec()
            };
            for c in contents {
                let when = chrono::DateTime::from_timestamp_millis(c.timestamp)
                    .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                    .unwrap_or_default();
                println!("{}  {}  {:<20} {}", c.id, when, c.template_type.id(), c.title);
            }
        }
        ContentCommand::Delete { id, remote, api } => {
            if *remote {
                client(editor, api).delete_content(id).await?;
            } else if !editor.delete_content(id) {
                return Err(CardNewsError::Validation(format!("no saved content '{}'", id)));
            }
            println!("Deleted {}", id);
        }
        ContentCommand::Load { id, image, remote, api } => {
            if *image {
                let record = client(editor, api)
                    .list_images(ImageKind::CardNews)
                    .await?
                    .into_iter()
                    .find(|img| &img.id == id)
                    .ok_or_else(|| CardNewsError::Api(format!("Image not found: {}", id)))?;
                let metadata: CardMetadata = serde_json::from_value(record.metadata.unwrap_or(Value::Null))
                    .map_err(|e| CardNewsError::Schema(format!("image metadata: {}", e)))?;
                editor.load_snapshot(metadata.template, &metadata.data)?;
            } else if *remote {
                let content = client(editor, api)
                    .list_contents()
                    .await?
                    .into_iter()
                    .find(|c| &c.id == id)
                    .ok_or_else(|| CardNewsError::Api(format!("Content not found: {}", id)))?;
                editor.load_snapshot(content.template_type, &content.data)?;
            } else {
                editor.load_content(id)?;
            }
            println!("Loaded into {}", editor.selected());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_ratio_is_bounded() {
        let cli = Cli::try_parse_from(["cardnews", "render", "--ratio", "3"]).unwrap();
        assert!(matches!(cli.command, Commands::Render { ratio, .. } if ratio == 3.0));

        for bad in ["0", "-1", "100", "NaN", "two"] {
            assert!(Cli::try_parse_from(["cardnews", "render", "--ratio", bad]).is_err(), "{}", bad);
        }
    }
}
