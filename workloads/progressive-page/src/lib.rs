//! Progressive page - Reference workload.
//!
//! Serves one page with three independently slow sections:
//! - `GET /` and `GET /stream` stream the shell, then each section in
//!   document order as it becomes ready
//! - `GET /nostream` waits for every section and sends the page at once
//! - `/static/*` serves files from the configured directory

mod data;
mod sections;
mod templates;

use std::convert::Infallible;
use std::sync::Arc;

use axum::body::Body;
use axum::extract::State;
use axum::http::Uri;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use futures::channel::mpsc;
use futures::StreamExt;
use tower_http::services::ServeDir;

use edge_sdk::edge_core::{RenderMode, RequestContext, ServerConfig, StreamError};
use edge_sdk::edge_data::ProducerGroup;
use edge_sdk::edge_executor::{BoundSection, StreamCoordinator};
use edge_sdk::edge_observability::{LogFormat, LogLevel, StructuredLogger};
use edge_sdk::edge_streaming::{
    escape_html, swap_script, HeadContent, MemoryTransport, Shell, SinkTransport,
};

pub use data::{demo_categories, demo_products, Product};
pub use sections::Renderers;
pub use templates::{templates, PAGE_STYLES};

/// Chunks buffered between the page task and the response body.
const BODY_CHANNEL_CAPACITY: usize = 8;

/// Logging settings applied to every request logger.
#[derive(Debug, Clone, Copy)]
pub struct LogSettings {
    pub format: LogFormat,
    pub min_level: LogLevel,
}

impl LogSettings {
    /// JSON at info level, or human-readable at debug level when verbose.
    pub fn from_verbose(verbose: bool) -> Self {
        if verbose {
            Self {
                format: LogFormat::Human,
                min_level: LogLevel::Debug,
            }
        } else {
            Self::default()
        }
    }

    /// Apply to a logger.
    pub fn apply(&self, logger: StructuredLogger) -> StructuredLogger {
        logger.with_format(self.format).with_min_level(self.min_level)
    }
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            format: LogFormat::Json,
            min_level: LogLevel::Info,
        }
    }
}

/// Shared, read-only application state.
#[derive(Clone)]
pub struct AppState {
    config: Arc<ServerConfig>,
    renderers: Renderers,
    log: LogSettings,
}

impl AppState {
    /// Build state from configuration.
    pub fn new(config: ServerConfig, log: LogSettings) -> anyhow::Result<Self> {
        config.validate()?;
        let renderers = Renderers::from_templates(templates())?;
        Ok(Self {
            config: Arc::new(config),
            renderers,
            log,
        })
    }

    /// Server configuration.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    fn logger(&self, ctx: &RequestContext) -> StructuredLogger {
        self.log.apply(
            StructuredLogger::new(ctx.request_id.clone())
                .with_workload("progressive-page")
                .with_route(&ctx.path)
                .with_mode(ctx.mode),
        )
    }
}

/// Build the router.
pub fn app(state: AppState) -> Router {
    let static_files = ServeDir::new(&state.config.static_dir);

    Router::new()
        .route("/", get(stream_page))
        .route("/stream", get(stream_page))
        .route("/nostream", get(buffered_page))
        .nest_service("/static", static_files)
        .with_state(state)
}

async fn stream_page(State(state): State<AppState>, uri: Uri) -> Response {
    render_page(state, uri.path(), RenderMode::Streaming).await
}

async fn buffered_page(State(state): State<AppState>, uri: Uri) -> Response {
    render_page(state, uri.path(), RenderMode::Buffered).await
}

/// Handle one page request in the given mode.
pub async fn render_page(state: AppState, path: &str, mode: RenderMode) -> Response {
    let ctx = RequestContext::new(path, mode);
    let logger = state.logger(&ctx);
    logger.info("Page request started");

    let mut producers = ProducerGroup::new();
    let mut coordinator = match build_page(&state, &ctx, &mut producers) {
        Ok(coordinator) => coordinator,
        Err(e) => return error_response(&logger, e),
    };

    match mode {
        RenderMode::Streaming => {
            let (tx, rx) = mpsc::channel::<Vec<u8>>(BODY_CHANNEL_CAPACITY);
            let mut transport = SinkTransport::new(tx);
            if let Err(e) = coordinator.preflight(&transport) {
                return error_response(&logger, e);
            }

            // The page task owns the producers: when the client goes away the
            // body channel closes, the task ends and unfinished producers are
            // aborted.
            tokio::spawn(async move {
                let _producers = producers;
                if let Ok(report) = coordinator.run(&mut transport, &logger).await {
                    logger.debug(&report.metrics.to_summary());
                }
            });

            html_response(&ctx, Body::from_stream(rx.map(Ok::<_, Infallible>)))
        }
        RenderMode::Buffered => {
            let mut transport = MemoryTransport::new();
            let result = coordinator.run(&mut transport, &logger).await;
            drop(producers);

            match result {
                Ok(report) => {
                    logger.debug(&report.metrics.to_summary());
                    html_response(&ctx, Body::from(transport.delivered()))
                }
                Err(e) => error_response(&logger, e),
            }
        }
    }
}

fn build_page(
    state: &AppState,
    ctx: &RequestContext,
    producers: &mut ProducerGroup,
) -> Result<StreamCoordinator, StreamError> {
    let data = data::spawn_producers(producers, &state.config.latency);
    let [profile, products, categories] = sections::page_sections();
    let renderers = &state.renderers;

    StreamCoordinator::new(page_shell(&state.config.title, ctx), ctx.mode).with_sections([
        BoundSection::new(profile, data.profile, renderers.profile.clone()).boxed(),
        BoundSection::new(products, data.products, renderers.products.clone()).boxed(),
        BoundSection::new(categories, data.categories, renderers.categories.clone()).boxed(),
    ])
}

/// Page chrome around the sections.
pub fn page_shell(title: &str, ctx: &RequestContext) -> Shell {
    let mut head = HeadContent::new(title)
        .with_meta("viewport", "width=device-width, initial-scale=1")
        .with_style(PAGE_STYLES);
    if ctx.mode == RenderMode::Streaming {
        head = head.with_script(swap_script());
    }

    Shell::new(head)
        .with_body_start(format!(
            r#"<body>
<header class="site-header"><h1>{}</h1></header>
<main class="page">
<p class="request-info">Request ID: {} ({})</p>
"#,
            escape_html(title),
            ctx.request_id,
            ctx.mode
        ))
        .with_body_end("</main>\n</body>\n</html>\n")
}

fn html_response(ctx: &RequestContext, body: Body) -> Response {
    (
        [
            ("content-type", "text/html; charset=utf-8".to_string()),
            ("x-request-id", ctx.request_id.to_string()),
            ("x-render-mode", ctx.mode.as_str().to_string()),
        ],
        body,
    )
        .into_response()
}

fn error_response(logger: &StructuredLogger, error: StreamError) -> Response {
    logger
        .error_builder("Page request failed")
        .field("error", error.to_string())
        .emit();
    (error.status_code(), error.to_string()).into_response()
}
