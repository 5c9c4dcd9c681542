use clap::{Parser, Subcommand};
use conversion_routes::config::{self, SiteConfig};
use conversion_routes::registry::Registry;
use conversion_routes::routes::{self, RouteEntry, RouteOptions};
use conversion_routes::slug::SlugCodec;
use conversion_routes::{lookup, output, pages, scaffold};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "conversion-routes")]
#[command(about = "Conversion registry, slugs, and sitemap routes for a file-conversion site")]
#[command(long_about = "\
Conversion registry, slugs, and sitemap routes for a file-conversion site

Every declared conversion gets exactly one page at /{slug}. Slugs follow
{source}-to-{target} unless an override applies (pdf → merged is merge-pdf).

Site structure:

  site/
  ├── config.toml                  # Site config (optional)
  └── pages/                       # One directory per route
      ├── heic-to-jpg/index.html   # Conversion page
      ├── merge-pdf/index.html     # Conversion page with an override slug
      └── about/index.html         # Static page from [[static_pages]]

Run 'conversion-routes gen-config' to generate a documented config.toml.")]
#[command(version)]
struct Cli {
    /// Site directory holding config.toml and the page directory
    #[arg(long, default_value = ".", global = true)]
    site: PathBuf,

    /// Output directory for sitemap.xml
    #[arg(long, default_value = "dist", global = true)]
    output: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List every route the sitemap will contain
    Routes {
        /// Print routes as JSON
        #[arg(long)]
        json: bool,
    },
    /// Write sitemap.xml to the output directory
    Sitemap,
    /// Create a page skeleton for every conversion that has none
    Scaffold,
    /// Audit slugs and compare the page directory with the registry
    Check,
    /// Describe a format token or a page slug
    Lookup {
        /// Format token (heic) or slug (heic-to-jpg, merge-pdf)
        query: String,
    },
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    run(Cli::parse())
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let site = cli.site.as_path();

    match cli.command {
        Command::GenConfig => print!("{}", config::stock_config_toml()),
        Command::Routes { json } => {
            let ctx = SiteContext::load(site)?;
            let routes = ctx.routes()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&routes)?);
            } else {
                output::print_routes(&routes);
            }
        }
        Command::Sitemap => {
            let ctx = SiteContext::load(site)?;
            let routes = ctx.routes()?;
            std::fs::create_dir_all(&cli.output)?;
            let path = cli.output.join("sitemap.xml");
            std::fs::write(&path, routes::render_sitemap(&routes))?;
            println!("==> Wrote {} routes → {}", routes.len(), path.display());
        }
        Command::Scaffold => {
            let ctx = SiteContext::load(site)?;
            init_thread_pool(&ctx.config.processing);
            let pages_dir = ctx.config.pages_path(site);
            println!("==> Scaffolding {}", pages_dir.display());
            let report = scaffold::scaffold(&ctx.registry, &ctx.codec, &ctx.config, &pages_dir)?;
            output::print_scaffold_report(&report, &pages_dir);
        }
        Command::Check => {
            let ctx = SiteContext::load(site)?;
            println!("==> Auditing {} slugs", ctx.registry.edge_count());
            let audit = ctx.codec.audit(&ctx.registry);
            output::print_audit(&audit);
            let audit = audit.ensure_unique()?;
            for failure in &audit.non_round_trip {
                tracing::warn!(slug = %failure.slug, "slug does not decode to its conversion");
            }

            // Static pages must not shadow conversion slugs either.
            ctx.routes()?;

            let pages_dir = ctx.config.pages_path(site);
            println!();
            println!("==> Checking {}", pages_dir.display());
            let existing = pages::scan_pages(&pages_dir)?;
            let check = pages::check_pages(
                &ctx.registry,
                &ctx.codec,
                &ctx.config.static_pages,
                &existing,
            );
            output::print_page_check(&check);
            if !check.is_clean() {
                return Err(format!(
                    "{} orphaned and {} missing pages in {}",
                    check.orphans.len(),
                    check.missing.len(),
                    pages_dir.display()
                )
                .into());
            }
            println!("==> Site is consistent");
        }
        Command::Lookup { query } => {
            let ctx = SiteContext::load(site)?;
            let result = lookup::lookup(&ctx.registry, &ctx.codec, &query);
            output::print_lookup(&result);
        }
    }

    Ok(())
}

/// Site config plus the builtin registry and slug codec.
struct SiteContext {
    config: SiteConfig,
    registry: Registry,
    codec: SlugCodec,
}

impl SiteContext {
    fn load(site: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        Ok(Self {
            config: config::load_config(site)?,
            registry: Registry::builtin()?,
            codec: SlugCodec::builtin(),
        })
    }

    /// Sitemap route set, dated today unless the config pins a date.
    fn routes(&self) -> Result<Vec<RouteEntry>, Box<dyn std::error::Error>> {
        let today = chrono::Local::now().date_naive();
        let options = RouteOptions {
            base_url: self.config.base_url.clone(),
            last_modified: self.config.last_modified_or(today)?,
            conversions: self.config.sitemap.conversions.clone(),
        };
        Ok(routes::generate_routes(
            &self.registry,
            &self.codec,
            &self.config.static_pages,
            &options,
        )?)
    }
}

/// Initialize the rayon thread pool based on processing config.
///
/// Caps at the number of available CPU cores. The user can constrain down, not up.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
