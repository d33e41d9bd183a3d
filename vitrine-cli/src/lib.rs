//! # Vitrine CLI
//!
//! Operator front end for the template document engine.
//!
//! ## Commands
//!
//! - `generate` - Build a document from product data with a preset style
//! - `migrate` - Rewrite a legacy or current document in the current format
//! - `dimensions` - Compute content-driven or preset output dimensions
//! - `render` - Rasterize a document to PNG, JPEG or SVG
//! - `push` / `pull` / `list` / `deactivate` - Talk to the template store
//! - `export` - Batch-export stored templates into a directory
//!
//! Documents are read from and written to files; summaries go to the output
//! writer as JSON.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{anyhow, bail, Context};
use clap::{Args, Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde_json::{json, Value};
use vitrine_core::{
    codec, randomize_palette, Dimensions, Document, IdentityResolver, ImageUrlResolver,
    LayoutConfig, LayoutEngine, PrefixUrlResolver, PresetConfig, PresetGenerator, PresetStyle,
    Product, RecordId, SizingOptions, TemplateRecord,
};
use vitrine_renderer::{
    BatchKind, DefaultImageLoader, DirectorySink, DocumentRenderer, ExportFormat, RenderConfig,
    RenderOptions,
};
use vitrine_sync::{HttpTemplateApi, ProductRef, SyncConfig, SyncService};

/// Command-line arguments for vitrine.
#[derive(Debug, Clone, Parser)]
#[command(name = "vitrine")]
#[command(about = "Generate, render and sync product marketing templates")]
#[command(version)]
pub struct CliArgs {
    /// Template store base URL (e.g., <https://api.example.com/v1>)
    #[arg(long, env = "VITRINE_API_URL", global = true)]
    pub api_url: Option<String>,

    /// Bearer token for the template store
    #[arg(long, env = "VITRINE_API_TOKEN", global = true, hide_env_values = true)]
    pub api_token: Option<String>,

    /// Base URL that relative product image paths are resolved against
    #[arg(long, env = "VITRINE_IMAGE_BASE_URL", global = true)]
    pub image_base_url: Option<String>,

    /// JSON file overriding the layout tables
    #[arg(long, global = true)]
    pub layout_config: Option<PathBuf>,

    /// JSON file overriding the preset generator settings
    #[arg(long, global = true)]
    pub preset_config: Option<PathBuf>,

    /// Skip loading system fonts when rasterizing
    #[arg(long, global = true)]
    pub no_system_fonts: bool,

    /// Command to run
    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands.
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Build a document from product data with a preset style
    Generate {
        /// Product JSON file
        #[arg(long)]
        product: PathBuf,

        /// Preset style (minimal, catalog, social, instagram, modern,
        /// ecommerce, business-card, newsletter, banner, collage)
        #[arg(long, default_value = "minimal")]
        style: PresetStyle,

        /// Size the canvas for a platform preset (e.g., instagram-story)
        #[arg(long, conflicts_with_all = ["width", "height"])]
        use_case: Option<String>,

        /// Canvas width
        #[arg(long)]
        width: Option<u32>,

        /// Canvas height
        #[arg(long)]
        height: Option<u32>,

        /// Shuffle the palette with this seed after generation
        #[arg(long)]
        palette_seed: Option<u64>,

        /// Output file for the interchange record
        #[arg(short, long)]
        out: PathBuf,
    },

    /// Rewrite a document in the current interchange format
    Migrate {
        /// Input document (legacy array or current format)
        input: PathBuf,

        /// Output file (default: overwrite the input)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Compute output dimensions
    Dimensions(DimensionsArgs),

    /// Rasterize a document
    Render {
        /// Input document
        input: PathBuf,

        /// Output image file
        #[arg(short, long)]
        out: PathBuf,

        /// Output format (default: from the output extension, else png)
        #[arg(long)]
        format: Option<ExportFormat>,

        /// Output width (default: the document's export width)
        #[arg(long)]
        width: Option<u32>,

        /// Output height (default: the document's export height)
        #[arg(long)]
        height: Option<u32>,

        /// JPEG quality between 0 and 1
        #[arg(long, default_value_t = 0.92)]
        quality: f32,

        /// Supersampling factor
        #[arg(long, default_value_t = 1.0)]
        multiplier: f32,
    },

    /// Validate a document and create or update its stored record
    Push {
        /// Input document or interchange record
        input: PathBuf,

        /// Product JSON file (default: the record's embedded product)
        #[arg(long)]
        product: Option<PathBuf>,

        /// Update this record instead of creating one
        #[arg(long)]
        template_id: Option<RecordId>,
    },

    /// Fetch a stored record's document
    Pull {
        /// Record identifier
        template_id: RecordId,

        /// Output file for the document
        #[arg(short, long)]
        out: PathBuf,
    },

    /// List stored records
    List(RecordFilter),

    /// Soft-delete a stored record
    Deactivate {
        /// Record identifier
        template_id: RecordId,
    },

    /// Export stored records into a directory
    Export {
        /// Which records
        #[command(flatten)]
        filter: RecordFilter,

        /// Artifact kind: json or png
        #[arg(long, default_value = "json")]
        kind: BatchKind,

        /// Target directory
        #[arg(long)]
        dir: PathBuf,
    },
}

/// Arguments for `dimensions`.
#[derive(Debug, Clone, Args)]
pub struct DimensionsArgs {
    /// Document to size by its content
    pub input: Option<PathBuf>,

    /// Look up a platform preset instead
    #[arg(long, conflicts_with = "input")]
    pub use_case: Option<String>,

    /// List the platform presets
    #[arg(long, conflicts_with_all = ["input", "use_case"])]
    pub list_presets: bool,

    /// Snap to the nearest named aspect ratio
    #[arg(long)]
    pub responsive: bool,

    /// Grow to fit content plus padding
    #[arg(long)]
    pub auto_scale: bool,

    /// Base width (default: the document canvas)
    #[arg(long)]
    pub base_width: Option<u32>,

    /// Base height (default: the document canvas)
    #[arg(long)]
    pub base_height: Option<u32>,
}

/// Record selection by product or brand.
#[derive(Debug, Clone, Args)]
#[group(required = true, multiple = false)]
pub struct RecordFilter {
    /// Records generated for this product
    #[arg(long)]
    pub product_id: Option<RecordId>,

    /// Records owned by this brand
    #[arg(long)]
    pub brand_id: Option<RecordId>,
}

/// Shared services built from the global arguments.
pub struct CliContext {
    layout: LayoutEngine,
    preset_config: PresetConfig,
    resolver: Arc<dyn ImageUrlResolver>,
    loader: Arc<DefaultImageLoader>,
    render_config: RenderConfig,
    api_url: Option<String>,
    api_token: Option<String>,
}

impl CliContext {
    /// Build the context, reading any configuration files.
    ///
    /// # Errors
    ///
    /// Returns an error if a configuration file cannot be read or parsed.
    pub async fn from_args(args: &CliArgs) -> anyhow::Result<Self> {
        let layout_config: LayoutConfig = match &args.layout_config {
            Some(path) => serde_json::from_value(read_json(path).await?)
                .with_context(|| format!("invalid layout config {}", path.display()))?,
            None => LayoutConfig::default(),
        };
        let preset_config: PresetConfig = match &args.preset_config {
            Some(path) => serde_json::from_value(read_json(path).await?)
                .with_context(|| format!("invalid preset config {}", path.display()))?,
            None => PresetConfig::default(),
        };
        let resolver: Arc<dyn ImageUrlResolver> = match &args.image_base_url {
            Some(base) => Arc::new(PrefixUrlResolver::new(base.clone())),
            None => Arc::new(IdentityResolver),
        };

        Ok(Self {
            layout: LayoutEngine::new(layout_config),
            preset_config,
            resolver,
            loader: Arc::new(DefaultImageLoader::default()),
            render_config: RenderConfig {
                load_system_fonts: !args.no_system_fonts,
                ..RenderConfig::default()
            },
            api_url: args.api_url.clone(),
            api_token: args.api_token.clone(),
        })
    }

    fn renderer(&self) -> DocumentRenderer {
        DocumentRenderer::new(
            self.loader.clone(),
            self.resolver.clone(),
            self.render_config.clone(),
        )
    }

    fn sync_service(&self) -> anyhow::Result<SyncService> {
        let url = self.api_url.as_deref().ok_or_else(|| {
            anyhow!("no template store configured; set --api-url or VITRINE_API_URL")
        })?;
        let api = HttpTemplateApi::new(url, self.api_token.clone())?;
        Ok(SyncService::new(Arc::new(api), SyncConfig::default()))
    }
}

/// Run a parsed command line, writing summaries to `out`.
///
/// # Errors
///
/// Returns an error if the command fails.
#[allow(clippy::too_many_lines)]
pub async fn run(args: CliArgs, out: &mut (dyn Write + Send)) -> anyhow::Result<()> {
    let ctx = CliContext::from_args(&args).await?;

    match args.command {
        Command::Generate {
            product,
            style,
            use_case,
            width,
            height,
            palette_seed,
            out: target,
        } => {
            let product: Product = serde_json::from_value(read_json(&product).await?)
                .with_context(|| format!("invalid product file {}", product.display()))?;
            let dims = match use_case.as_deref() {
                Some(use_case) => ctx.layout.get_optimal_dimensions(use_case),
                None => {
                    let default = ctx.layout.config().default_dimensions;
                    Dimensions::new(
                        width.unwrap_or(default.width),
                        height.unwrap_or(default.height),
                    )
                }
            };

            let generator = PresetGenerator::new(
                ctx.loader.clone(),
                ctx.resolver.clone(),
                ctx.preset_config.clone(),
            );
            let mut doc = Document::new(f64::from(dims.width), f64::from(dims.height));
            let report = generator.generate(&mut doc, &product, style).await;
            if let Some(seed) = palette_seed {
                randomize_palette(&mut doc, &mut StdRng::seed_from_u64(seed));
            }
            if let Some(use_case) = use_case.as_deref() {
                doc = ctx.layout.optimize_for_platform(&doc, use_case);
            }

            let record = codec::encode_record(&doc, Some(&product))?;
            write_json(&target, &record).await?;
            print_json(
                out,
                &json!({
                    "style": report.style.as_str(),
                    "objects": report.object_count,
                    "degraded_slots": report.degraded_slots,
                    "width": dims.width,
                    "height": dims.height,
                    "out": target.display().to_string(),
                }),
            )
        }

        Command::Migrate { input, out: target } => {
            let value = read_json(&input).await?;
            let was_legacy = codec::is_legacy(&value);
            let doc = codec::from_value(value)
                .with_context(|| format!("cannot read document {}", input.display()))?;
            let target = target.unwrap_or_else(|| input.clone());
            write_json(&target, &codec::to_value(&doc)?).await?;
            print_json(
                out,
                &json!({
                    "migrated": was_legacy,
                    "version": doc.version,
                    "objects": doc.len(),
                    "out": target.display().to_string(),
                }),
            )
        }

        Command::Dimensions(dims) => dimensions(&ctx, &dims, out).await,

        Command::Render {
            input,
            out: target,
            format,
            width,
            height,
            quality,
            multiplier,
        } => {
            let doc = read_document(&input).await?;
            let format = format.unwrap_or_else(|| format_for_path(&target));
            let options = RenderOptions {
                width,
                height,
                format,
                quality,
                multiplier,
            };
            let bytes = ctx.renderer().render_document(&doc, &options).await?;
            tokio::fs::write(&target, &bytes)
                .await
                .with_context(|| format!("cannot write {}", target.display()))?;
            print_json(
                out,
                &json!({
                    "format": format.to_string(),
                    "bytes": bytes.len(),
                    "out": target.display().to_string(),
                }),
            )
        }

        Command::Push {
            input,
            product,
            template_id,
        } => {
            let value = read_json(&input).await?;
            let product: Product = match &product {
                Some(path) => serde_json::from_value(read_json(path).await?)
                    .with_context(|| format!("invalid product file {}", path.display()))?,
                None => value
                    .get("product")
                    .cloned()
                    .map(serde_json::from_value)
                    .transpose()?
                    .ok_or_else(|| {
                        anyhow!("{} has no embedded product; pass --product", input.display())
                    })?,
            };
            let record = ctx
                .sync_service()?
                .sync_raw(value, &ProductRef::for_product(&product), template_id)
                .await?;
            print_json(out, &record_summary(&record))
        }

        Command::Pull {
            template_id,
            out: target,
        } => {
            let pulled = ctx.sync_service()?.pull(template_id).await?;
            write_json(&target, &codec::to_value(&pulled.document)?).await?;
            print_json(out, &record_summary(&pulled.record))
        }

        Command::List(filter) => {
            let records = list_records(&ctx.sync_service()?, &filter).await?;
            let summaries: Vec<Value> = records.iter().map(record_summary).collect();
            print_json(out, &Value::Array(summaries))
        }

        Command::Deactivate { template_id } => {
            let record = ctx.sync_service()?.deactivate(template_id).await?;
            print_json(out, &record_summary(&record))
        }

        Command::Export { filter, kind, dir } => {
            let records = list_records(&ctx.sync_service()?, &filter).await?;
            let mut sink = DirectorySink::new(&dir);
            let report = ctx.renderer().batch_export(&records, kind, &mut sink).await;
            let failures: Vec<Value> = report
                .failures
                .iter()
                .map(|f| json!({ "id": f.record_id, "reason": f.reason }))
                .collect();
            print_json(
                out,
                &json!({
                    "delivered": report.delivered,
                    "failures": failures,
                    "dir": dir.display().to_string(),
                }),
            )
        }
    }
}

async fn dimensions(
    ctx: &CliContext,
    args: &DimensionsArgs,
    out: &mut (dyn Write + Send),
) -> anyhow::Result<()> {
    if args.list_presets {
        let presets: Vec<Value> = ctx
            .layout
            .platform_presets()
            .iter()
            .map(|p| json!({ "name": p.name, "width": p.width, "height": p.height }))
            .collect();
        return print_json(out, &Value::Array(presets));
    }

    if let Some(use_case) = &args.use_case {
        let dims = ctx.layout.get_optimal_dimensions(use_case);
        return print_json(out, &json!({ "width": dims.width, "height": dims.height }));
    }

    let Some(input) = &args.input else {
        bail!("pass a document, --use-case or --list-presets");
    };
    let doc = read_document(input).await?;
    let canvas = doc.canvas_dimensions();
    let base = Dimensions::new(
        args.base_width.unwrap_or(canvas.width),
        args.base_height.unwrap_or(canvas.height),
    );
    let dims = ctx.layout.calculate_dynamic_dimensions(
        &doc,
        base,
        SizingOptions {
            responsive: args.responsive,
            auto_scale: args.auto_scale,
        },
    );
    let bounds = ctx.layout.compute_content_bounds(&doc);
    print_json(
        out,
        &json!({
            "width": dims.width,
            "height": dims.height,
            "bounds": {
                "min_x": bounds.min_x,
                "min_y": bounds.min_y,
                "max_x": bounds.max_x,
                "max_y": bounds.max_y,
            },
        }),
    )
}

async fn list_records(
    service: &SyncService,
    filter: &RecordFilter,
) -> anyhow::Result<Vec<TemplateRecord>> {
    match (filter.product_id, filter.brand_id) {
        (Some(product_id), _) => Ok(service.list_for_product(product_id).await?),
        (None, Some(brand_id)) => Ok(service.list_for_brand(brand_id).await?),
        (None, None) => bail!("pass --product-id or --brand-id"),
    }
}

fn record_summary(record: &TemplateRecord) -> Value {
    json!({
        "id": record.id,
        "name": record.name,
        "product_id": record.product_id,
        "brand_id": record.brand_id,
        "visibility": record.visibility,
        "is_active": record.is_active,
        "updated_at": record.updated_at,
    })
}

/// Output format implied by a file extension; PNG when unknown.
#[must_use]
pub fn format_for_path(path: &Path) -> ExportFormat {
    path.extension()
        .and_then(std::ffi::OsStr::to_str)
        .and_then(|ext| ext.parse().ok())
        .unwrap_or_default()
}

async fn read_json(path: &Path) -> anyhow::Result<Value> {
    let text = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("cannot read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("{} is not JSON", path.display()))
}

async fn read_document(path: &Path) -> anyhow::Result<Document> {
    codec::from_value(read_json(path).await?)
        .with_context(|| format!("cannot read document {}", path.display()))
}

async fn write_json(path: &Path, value: &Value) -> anyhow::Result<()> {
    let text = serde_json::to_string_pretty(value)?;
    tokio::fs::write(path, text)
        .await
        .with_context(|| format!("cannot write {}", path.display()))
}

fn print_json(out: &mut (dyn Write + Send), value: &Value) -> anyhow::Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}
