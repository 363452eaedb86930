use cardgen::{config, frontmatter, naming, pipeline, report, scan};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Per-run metadata overrides. Non-empty values replace whatever each
/// document's frontmatter supplied.
#[derive(clap::Args, Clone)]
struct OverrideArgs {
    /// Author shown in every card footer
    #[arg(long, env = "AUTHOR")]
    author: Option<String>,

    /// Avatar image URL shown on every card
    #[arg(long, env = "AVATAR")]
    avatar: Option<String>,
}

impl OverrideArgs {
    fn into_overrides(self) -> config::Overrides {
        config::Overrides {
            author: self.author,
            avatar: self.avatar,
        }
    }
}

/// Style overrides applied on top of stock defaults and `cardgen.toml`.
#[derive(clap::Args, Clone)]
struct StyleArgs {
    /// Card width in px
    #[arg(long, env = "CARD_WIDTH")]
    card_width: Option<u32>,

    /// Card height in px
    #[arg(long, env = "CARD_HEIGHT")]
    card_height: Option<u32>,

    /// Title font size in px
    #[arg(long, env = "HEADER_SIZE")]
    header_size: Option<u32>,

    /// Title color (#rgb or #rrggbb)
    #[arg(long, env = "HEADER_COLOR")]
    header_color: Option<String>,

    /// Description font size in px
    #[arg(long, env = "DESCRIPTION_SIZE")]
    description_size: Option<u32>,

    /// Description color
    #[arg(long, env = "DESCRIPTION_COLOR")]
    description_color: Option<String>,

    /// Footer font size in px
    #[arg(long, env = "FOOTER_SIZE")]
    footer_size: Option<u32>,

    /// Footer color
    #[arg(long, env = "FOOTER_COLOR")]
    footer_color: Option<String>,
}

impl StyleArgs {
    fn apply(&self, style: &mut config::StyleConfig) {
        if let Some(w) = self.card_width {
            style.card.width = w;
        }
        if let Some(h) = self.card_height {
            style.card.height = h;
        }
        if let Some(s) = self.header_size {
            style.header.size = s;
        }
        if let Some(ref c) = self.header_color {
            style.header.color = c.clone();
        }
        if let Some(s) = self.description_size {
            style.description.size = s;
        }
        if let Some(ref c) = self.description_color {
            style.description.color = c.clone();
        }
        if let Some(s) = self.footer_size {
            style.footer.size = s;
        }
        if let Some(ref c) = self.footer_color {
            style.footer.color = c.clone();
        }
    }
}

#[derive(Parser)]
#[command(name = "cardgen")]
#[command(about = "Social preview card generator for markdown content")]
#[command(long_about = "\
Social preview card generator for markdown content

Each markdown document's frontmatter becomes a 1200×630 PNG card, rendered
as HTML and captured with headless Chrome. Cards are regenerated only when
the document's content changes.

Content structure:

  content/
  ├── cardgen.toml                 # Card styling (optional)
  ├── 2024-01-02-hello-world.md    # → hello-world.png
  └── guides/
      └── getting-started.md       # → getting-started.png

Frontmatter fields:
  title          required
  author         required (or --author override)
  date           required
  description    optional
  avatar         optional image URL

Output directory receives {slug}.png, {slug}.md5 (content fingerprint)
and a .nojekyll marker for static hosting.

All flags can also be set via environment variables (INPUT_DIR,
OUTPUT_DIR, FORCE_REGENERATE, AUTHOR, AVATAR, HEADER_COLOR, ...), which
is how CI workflows usually drive cardgen.")]
#[command(version)]
struct Cli {
    /// Markdown content directory
    #[arg(long, env = "INPUT_DIR", default_value = "content", global = true)]
    input: PathBuf,

    /// Output directory for generated cards
    #[arg(long, env = "OUTPUT_DIR", default_value = "social-previews", global = true)]
    output: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render cards for all changed documents
    Generate {
        /// Regenerate every card regardless of fingerprints
        #[arg(long, env = "FORCE_REGENERATE")]
        force: bool,

        /// External HTML template with {{ field }} placeholders
        #[arg(long, env = "TEMPLATE")]
        template: Option<PathBuf>,

        #[command(flatten)]
        overrides: OverrideArgs,

        #[command(flatten)]
        style: StyleArgs,
    },
    /// List the documents a run would consider
    Scan,
    /// Validate frontmatter without rendering
    Check {
        #[command(flatten)]
        overrides: OverrideArgs,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Command::Generate {
            force,
            template,
            overrides,
            style: style_args,
        } => {
            let mut style = config::load_style(&cli.input)?;
            style_args.apply(&mut style);
            style.validate()?;

            let run_config = config::RunConfig {
                input_root: cli.input,
                output_root: cli.output,
                force_regenerate: force,
                overrides: overrides.into_overrides(),
                template,
            };

            let summary = pipeline::run(&run_config, &style)?;
            report::print_run_report(&summary);
        }
        Command::Scan => {
            let outcome = scan::scan(&cli.input)?;
            report::print_scan_report(&outcome.documents, &outcome.warnings);
        }
        Command::Check { overrides } => {
            let overrides = overrides.into_overrides();
            let outcome = scan::scan(&cli.input)?;
            for path in &outcome.documents {
                let slug = naming::slug_for(path);
                let verdict = std::fs::read_to_string(path)
                    .map_err(|e| e.to_string())
                    .and_then(|raw| {
                        frontmatter::extract(&raw).map_err(|e| e.to_string()).and_then(
                            |mut fields| {
                                fields.apply_overrides(&overrides);
                                fields.validate().map(|_| ()).map_err(|e| e.to_string())
                            },
                        )
                    });
                let line = match &verdict {
                    Ok(()) => report::format_check_line(path, &slug, None),
                    Err(reason) => report::format_check_line(path, &slug, Some(reason.as_str())),
                };
                println!("{}", line);
            }
        }
    }

    Ok(())
}
