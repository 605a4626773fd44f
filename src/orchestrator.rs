//! Render orchestration: resource readiness, theme dispatch and the
//! generation guard that keeps stale renders off the surface.
//!
//! Every call to [`BannerRenderer::render`] takes a fresh generation number.
//! Font and icon loading run concurrently and may take arbitrarily long; when
//! they finish the render re-checks, under the surface lock, that no newer
//! render has started since. If one has, the render is dropped as
//! `Superseded` and the surface is left alone.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use log::{debug, info, warn};
use tiny_skia::Pixmap;

use crate::fonts::{system_typeface, FontFetcher, FontLoader, FontStatus, OfflineFetcher, Typeface};
use crate::rendering::{icon, raster, theme_renderer, RenderResources, Screenshot};
use crate::settings::{BannerSettings, Theme};
use crate::{Error, RendererConfig, Result};

/// Lifecycle of a single render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderPhase {
    Idle,
    AwaitingResources,
    Drawing,
    Committed,
}

/// How a render ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderOutcome {
    /// The surface now holds this render's pixels.
    Committed { generation: u64 },
    /// A newer render started while this one waited; nothing was drawn.
    Superseded { generation: u64, latest: u64 },
}

impl RenderOutcome {
    pub fn generation(&self) -> u64 {
        match self {
            RenderOutcome::Committed { generation } | RenderOutcome::Superseded { generation, .. } => *generation,
        }
    }

    pub fn is_committed(&self) -> bool {
        matches!(self, RenderOutcome::Committed { .. })
    }
}

#[derive(Default)]
struct Surface {
    pixmap: Option<Pixmap>,
    generation: Option<u64>,
}

struct Inner {
    config: RendererConfig,
    fonts: FontLoader,
    generation: AtomicU64,
    surface: Mutex<Surface>,
}

/// Owns the drawing surface and serializes commits to it.
///
/// Cloning is cheap; clones share the surface and generation counter.
#[derive(Clone)]
pub struct BannerRenderer {
    inner: Arc<Inner>,
}

#[cfg(feature = "remote-fonts")]
fn default_fetcher(config: &RendererConfig) -> Result<Arc<dyn FontFetcher>> {
    if config.enable_remote_fonts {
        Ok(Arc::new(crate::fonts::GoogleFontsFetcher::new(config)?))
    } else {
        Ok(Arc::new(OfflineFetcher))
    }
}

#[cfg(not(feature = "remote-fonts"))]
fn default_fetcher(config: &RendererConfig) -> Result<Arc<dyn FontFetcher>> {
    if config.enable_remote_fonts {
        warn!("built without the `remote-fonts` feature; using platform fonts only");
    }
    Ok(Arc::new(OfflineFetcher))
}

/// Await `fut`, giving up after `ms` milliseconds (0 waits forever).
async fn bounded<F: Future>(ms: u64, fut: F) -> Result<F::Output> {
    if ms == 0 {
        return Ok(fut.await);
    }
    tokio::time::timeout(Duration::from_millis(ms), fut)
        .await
        .map_err(|_| Error::Timeout(ms))
}

impl BannerRenderer {
    /// Renderer using the configured font service (or none, when disabled).
    pub fn new(config: RendererConfig) -> Result<Self> {
        let fetcher = default_fetcher(&config)?;
        Ok(Self::with_fetcher(config, fetcher))
    }

    /// Renderer with a custom font source and the process-wide font cache.
    pub fn with_fetcher(config: RendererConfig, fetcher: Arc<dyn FontFetcher>) -> Self {
        Self::with_font_loader(config, FontLoader::new(fetcher))
    }

    pub fn with_font_loader(config: RendererConfig, fonts: FontLoader) -> Self {
        Self {
            inner: Arc::new(Inner {
                config,
                fonts,
                generation: AtomicU64::new(0),
                surface: Mutex::new(Surface::default()),
            }),
        }
    }

    pub fn config(&self) -> &RendererConfig {
        &self.inner.config
    }

    pub fn fonts(&self) -> &FontLoader {
        &self.inner.fonts
    }

    /// Newest generation handed out so far (0 before the first render).
    pub fn latest_generation(&self) -> u64 {
        self.inner.generation.load(Ordering::SeqCst)
    }

    /// Generation whose pixels are currently on the surface.
    pub fn committed_generation(&self) -> Option<u64> {
        self.lock_surface().ok().and_then(|s| s.generation)
    }

    /// Render one settings snapshot.
    ///
    /// Invalid settings are rejected before a generation is taken. Font and
    /// icon failures, including timeouts, never fail the render.
    pub async fn render(&self, settings: &BannerSettings) -> Result<RenderOutcome> {
        let generation = self.begin(settings)?;
        self.finish(generation, settings).await
    }

    /// Validate `settings` and reserve the next generation for it.
    ///
    /// Callers that queue renders (see `Preview`) reserve at receipt time so
    /// that generation order is arrival order, not task start order.
    pub fn begin(&self, settings: &BannerSettings) -> Result<u64> {
        settings.validate()?;
        let generation = self.inner.generation.fetch_add(1, Ordering::SeqCst) + 1;
        trace_phase(generation, RenderPhase::Idle);
        Ok(generation)
    }

    /// Load resources for a generation reserved with [`begin`](Self::begin)
    /// and commit it unless a newer generation exists by then.
    pub async fn finish(&self, generation: u64, settings: &BannerSettings) -> Result<RenderOutcome> {
        trace_phase(generation, RenderPhase::AwaitingResources);
        let resources = self.gather(settings).await;

        let mut surface = self.lock_surface()?;
        let latest = self.inner.generation.load(Ordering::SeqCst);
        if latest != generation {
            info!("render #{} superseded by #{}; discarded", generation, latest);
            return Ok(RenderOutcome::Superseded { generation, latest });
        }

        trace_phase(generation, RenderPhase::Drawing);
        let list = theme_renderer(settings.theme).compose(settings, &resources);
        let mut pixmap = match surface.pixmap.take() {
            Some(mut pm) if pm.width() == settings.width && pm.height() == settings.height => {
                pm.fill(tiny_skia::Color::TRANSPARENT);
                pm
            }
            _ => Pixmap::new(settings.width, settings.height).ok_or_else(|| {
                Error::RenderError(format!(
                    "cannot allocate a {}x{} surface",
                    settings.width, settings.height
                ))
            })?,
        };
        raster::paint_into(&mut pixmap, &list);
        surface.pixmap = Some(pixmap);
        surface.generation = Some(generation);

        trace_phase(generation, RenderPhase::Committed);
        info!(
            "render #{} committed ({}x{}, {} commands)",
            generation,
            settings.width,
            settings.height,
            list.len()
        );
        Ok(RenderOutcome::Committed { generation })
    }

    /// PNG of the committed surface.
    pub fn snapshot(&self) -> Result<Screenshot> {
        let surface = self.lock_surface()?;
        match surface.pixmap.as_ref() {
            Some(pixmap) => Screenshot::from_pixmap(pixmap),
            None => Err(Error::RenderError("nothing has been committed yet".into())),
        }
    }

    /// Run `f` against the committed surface, if any.
    pub fn with_surface<R>(&self, f: impl FnOnce(&Pixmap) -> R) -> Option<R> {
        let surface = self.lock_surface().ok()?;
        surface.pixmap.as_ref().map(f)
    }

    fn lock_surface(&self) -> Result<MutexGuard<'_, Surface>> {
        self.inner
            .surface
            .lock()
            .map_err(|_| Error::Other("surface lock poisoned".into()))
    }

    async fn gather(&self, settings: &BannerSettings) -> RenderResources {
        let config = &self.inner.config;
        let fonts = &self.inner.fonts;
        let timeout_ms = config.resource_timeout_ms;
        let family = settings.font_family.as_str();

        let font = bounded(timeout_ms, fonts.ensure(family));
        let icon = bounded(timeout_ms, async {
            if config.enable_icons && settings.wants_icon() {
                icon::load_icon(settings).await
            } else {
                None
            }
        });
        let (font, icon) = tokio::join!(font, icon);

        if let Err(e) = &font {
            warn!("font '{}': {}; using fallback font", family, e);
        }
        let icon = icon.unwrap_or_else(|e| {
            warn!("icon: {}; drawing banner without icon", e);
            None
        });

        let faces = resolve_faces(fonts.clone(), settings, font.ok()).await;
        RenderResources {
            text_face: faces.text,
            mono_face: faces.mono,
            mono_bold_face: faces.mono_bold,
            icon,
        }
    }
}

#[derive(Default)]
struct Faces {
    text: Option<Typeface>,
    mono: Option<Typeface>,
    mono_bold: Option<Typeface>,
}

/// Pick the faces a render draws with.
///
/// The first lookup scans the installed fonts and every miss reads a font
/// file, so this runs on the blocking pool.
async fn resolve_faces(fonts: FontLoader, settings: &BannerSettings, status: Option<FontStatus>) -> Faces {
    let family = settings.font_family.clone();
    let size = settings.font_size as f32;
    let terminal = settings.theme == Theme::OsWindow;

    let resolved = tokio::task::spawn_blocking(move || {
        if let Some(status) = status.filter(|s| !s.is_fallback()) {
            if !fonts.confirm(&family, size) {
                warn!("font '{}' ({:?}) cannot be measured; text may use a fallback", family, status);
            }
        }
        let (mono, mono_bold) = if terminal {
            (system_typeface("monospace", false), system_typeface("monospace", true))
        } else {
            (None, None)
        };
        Faces {
            text: fonts.typeface(&family),
            mono,
            mono_bold,
        }
    })
    .await;

    resolved.unwrap_or_else(|e| {
        warn!("font resolution task failed: {}; text is not drawn", e);
        Faces::default()
    })
}

fn trace_phase(generation: u64, phase: RenderPhase) {
    debug!("render #{}: {:?}", generation, phase);
}
