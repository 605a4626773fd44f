//! Font loading: remote font delivery, a process-wide cache of loaded
//! families, and platform fallback faces.
//!
//! Rendering never fails because of fonts. `FontLoader::ensure` reports what
//! happened through `FontStatus`, and `FontLoader::typeface` always hands back
//! the best face available: a fetched family from the cache, otherwise a
//! system face matching the family (or its generic class), otherwise any
//! installed face. On a machine with no fonts at all it returns `None` and text
//! is measured with a fixed advance and not drawn.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, OnceLock};

use ab_glyph::{Font, FontArc, FontVec, GlyphId, OutlineCurve};
use futures::future::BoxFuture;
use log::{debug, info, warn};
use resvg::usvg::fontdb;
use tiny_skia::{Path, PathBuilder};

use crate::{Error, Result};

/// Families that never need fetching.
pub const GENERIC_FAMILIES: [&str; 4] = ["sans-serif", "serif", "monospace", "cursive"];

/// String measured to confirm a face is usable, the classic font-loading check.
pub const CONFIRM_TEXT: &str = "BESbswy";

/// Glyph size used for the post-load usability check.
pub const CONFIRM_SIZE: f32 = 16.0;

pub fn is_generic_family(family: &str) -> bool {
    let family = family.trim();
    family.is_empty() || GENERIC_FAMILIES.contains(&family)
}

// ---------------------------------------------------------------------------
// Typeface
// ---------------------------------------------------------------------------

/// A parsed font face able to measure and outline single-line text.
#[derive(Clone)]
pub struct Typeface {
    family: Arc<str>,
    font: FontArc,
}

impl fmt::Debug for Typeface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Typeface").field("family", &self.family).finish()
    }
}

impl PartialEq for Typeface {
    fn eq(&self, other: &Self) -> bool {
        self.family == other.family
    }
}

impl Typeface {
    pub fn from_bytes(family: &str, data: Vec<u8>) -> Result<Self> {
        Self::from_bytes_and_index(family, data, 0)
    }

    pub fn from_bytes_and_index(family: &str, data: Vec<u8>, index: u32) -> Result<Self> {
        let font = FontVec::try_from_vec_and_index(data, index)
            .map_err(|e| Error::FontLoadError(format!("{family}: {e}")))?;
        Ok(Self {
            family: Arc::from(family),
            font: FontArc::new(font),
        })
    }

    pub fn family(&self) -> &str {
        &self.family
    }

    fn scale(&self, size: f32) -> f32 {
        size / self.font.units_per_em().unwrap_or(1000.0)
    }

    /// Distance from the baseline to the top of the em box, in pixels.
    pub fn ascent(&self, size: f32) -> f32 {
        self.font.ascent_unscaled() * self.scale(size)
    }

    /// Distance from the baseline to the bottom of the em box (negative), in pixels.
    pub fn descent(&self, size: f32) -> f32 {
        self.font.descent_unscaled() * self.scale(size)
    }

    /// Advance width of `text` at `size` px, including pair kerning.
    pub fn measure(&self, text: &str, size: f32) -> f32 {
        let scale = self.scale(size);
        let mut width = 0.0;
        let mut prev: Option<GlyphId> = None;
        for ch in text.chars() {
            let id = self.font.glyph_id(ch);
            if let Some(p) = prev {
                width += self.font.kern_unscaled(p, id) * scale;
            }
            width += self.font.h_advance_unscaled(id) * scale;
            prev = Some(id);
        }
        width
    }

    /// Whether the face produces non-zero advances for the confirmation string.
    pub fn is_usable(&self, size: f32) -> bool {
        self.measure(CONFIRM_TEXT, size) > 0.0
    }

    /// Glyph outlines of `text` laid out left to right from `x` on `baseline`.
    /// Returns `None` when no glyph has an outline (e.g. whitespace only).
    pub fn outline(&self, text: &str, x: f32, baseline: f32, size: f32) -> Option<Path> {
        let scale = self.scale(size);
        let mut pb = PathBuilder::new();
        let mut pen = x;
        let mut prev: Option<GlyphId> = None;

        for ch in text.chars() {
            let id = self.font.glyph_id(ch);
            if let Some(p) = prev {
                pen += self.font.kern_unscaled(p, id) * scale;
            }
            if let Some(outline) = self.font.outline(id) {
                let map = |pt: ab_glyph::Point| (pen + pt.x * scale, baseline - pt.y * scale);
                let mut last: Option<ab_glyph::Point> = None;
                for curve in &outline.curves {
                    let start = match curve {
                        OutlineCurve::Line(a, _) | OutlineCurve::Quad(a, _, _) | OutlineCurve::Cubic(a, _, _, _) => *a,
                    };
                    if last != Some(start) {
                        if last.is_some() {
                            pb.close();
                        }
                        let (sx, sy) = map(start);
                        pb.move_to(sx, sy);
                    }
                    let end = match curve {
                        OutlineCurve::Line(_, b) => {
                            let (bx, by) = map(*b);
                            pb.line_to(bx, by);
                            *b
                        }
                        OutlineCurve::Quad(_, c, b) => {
                            let (cx, cy) = map(*c);
                            let (bx, by) = map(*b);
                            pb.quad_to(cx, cy, bx, by);
                            *b
                        }
                        OutlineCurve::Cubic(_, c1, c2, b) => {
                            let (c1x, c1y) = map(*c1);
                            let (c2x, c2y) = map(*c2);
                            let (bx, by) = map(*b);
                            pb.cubic_to(c1x, c1y, c2x, c2y, bx, by);
                            *b
                        }
                    };
                    last = Some(end);
                }
                if last.is_some() {
                    pb.close();
                }
            }
            pen += self.font.h_advance_unscaled(id) * scale;
            prev = Some(id);
        }

        pb.finish()
    }
}

// ---------------------------------------------------------------------------
// Fetchers
// ---------------------------------------------------------------------------

/// Source of font file bytes for a named family.
pub trait FontFetcher: Send + Sync {
    fn fetch<'a>(&'a self, family: &'a str) -> BoxFuture<'a, Result<Vec<u8>>>;
}

/// Fetcher used when remote fonts are disabled; every fetch fails.
#[derive(Debug, Default, Clone, Copy)]
pub struct OfflineFetcher;

impl FontFetcher for OfflineFetcher {
    fn fetch<'a>(&'a self, family: &'a str) -> BoxFuture<'a, Result<Vec<u8>>> {
        Box::pin(async move {
            Err(Error::FontLoadError(format!(
                "{family}: remote font loading is disabled"
            )))
        })
    }
}

/// Stylesheet URL for a family on a Google-Fonts-compatible service.
#[cfg(feature = "remote-fonts")]
pub fn stylesheet_url(base: &str, family: &str) -> Result<url::Url> {
    let mut u = url::Url::parse(base)
        .and_then(|b| b.join("css2"))
        .map_err(|e| Error::ConfigError(format!("bad font service url '{base}': {e}")))?;
    u.set_query(Some(&format!(
        "family={}:wght@400;700&display=swap",
        family.trim().replace(' ', "+")
    )));
    Ok(u)
}

/// First `url(...)` inside a `src:` declaration of a font stylesheet.
pub fn first_font_url(css: &str) -> Option<&str> {
    let src = css.find("src:")?;
    let rest = &css[src..];
    let open = rest.find("url(")? + 4;
    let close = rest[open..].find(')')? + open;
    let raw = rest[open..close].trim().trim_matches(|c| c == '"' || c == '\'');
    if raw.is_empty() {
        None
    } else {
        Some(raw)
    }
}

/// Fetches fonts from a Google-Fonts-compatible CSS API: the family's
/// stylesheet first, then the first font file it references.
#[cfg(feature = "remote-fonts")]
#[derive(Debug, Clone)]
pub struct GoogleFontsFetcher {
    client: reqwest::Client,
    base_url: String,
    user_agent: String,
}

#[cfg(feature = "remote-fonts")]
impl GoogleFontsFetcher {
    pub fn new(config: &crate::RendererConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_millis(config.font_fetch_timeout_ms))
            .build()
            .map_err(|e| Error::ConfigError(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            base_url: config.font_service_url.clone(),
            user_agent: config.user_agent.clone(),
        })
    }

    async fn fetch_family(&self, family: &str) -> Result<Vec<u8>> {
        let css_url = stylesheet_url(&self.base_url, family)?;
        debug!("fetching font stylesheet {}", css_url);
        let css = self
            .client
            .get(css_url.clone())
            .header("User-Agent", self.user_agent.clone())
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        let href = first_font_url(&css)
            .ok_or_else(|| Error::FontLoadError(format!("{family}: stylesheet has no font source")))?;
        let font_url = css_url
            .join(href)
            .map_err(|e| Error::FontLoadError(format!("{family}: bad font url '{href}': {e}")))?;

        debug!("fetching font file {}", font_url);
        let bytes = self
            .client
            .get(font_url)
            .header("User-Agent", self.user_agent.clone())
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;
        Ok(bytes.to_vec())
    }
}

#[cfg(feature = "remote-fonts")]
impl FontFetcher for GoogleFontsFetcher {
    fn fetch<'a>(&'a self, family: &'a str) -> BoxFuture<'a, Result<Vec<u8>>> {
        Box::pin(self.fetch_family(family))
    }
}

// ---------------------------------------------------------------------------
// Cache
// ---------------------------------------------------------------------------

/// Append-only registry of fetched families.
///
/// The global instance lives for the whole process and is never evicted; the
/// number of distinct families tried in one session stays small.
#[derive(Default)]
pub struct FontCache {
    loaded: Mutex<HashMap<String, Typeface>>,
}

impl FontCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide cache.
    pub fn global() -> Arc<FontCache> {
        static GLOBAL: OnceLock<Arc<FontCache>> = OnceLock::new();
        GLOBAL.get_or_init(|| Arc::new(FontCache::new())).clone()
    }

    pub fn get(&self, family: &str) -> Option<Typeface> {
        self.loaded.lock().ok()?.get(family).cloned()
    }

    pub fn contains(&self, family: &str) -> bool {
        self.loaded.lock().map(|m| m.contains_key(family)).unwrap_or(false)
    }

    fn insert(&self, face: Typeface) {
        if let Ok(mut map) = self.loaded.lock() {
            map.entry(face.family().to_string()).or_insert(face);
        }
    }

    pub fn len(&self) -> usize {
        self.loaded.lock().map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ---------------------------------------------------------------------------
// System fallback faces
// ---------------------------------------------------------------------------

const SANS_CANDIDATES: [&str; 5] = ["DejaVu Sans", "Liberation Sans", "Noto Sans", "Arial", "Helvetica"];
const SERIF_CANDIDATES: [&str; 4] = ["DejaVu Serif", "Liberation Serif", "Noto Serif", "Times New Roman"];
const MONO_CANDIDATES: [&str; 5] = ["DejaVu Sans Mono", "Liberation Mono", "Noto Sans Mono", "Courier New", "Menlo"];

struct SystemFonts {
    db: fontdb::Database,
    resolved: Mutex<HashMap<(String, bool), Option<Typeface>>>,
}

fn system_fonts() -> &'static SystemFonts {
    static SYSTEM: OnceLock<SystemFonts> = OnceLock::new();
    SYSTEM.get_or_init(|| {
        let mut db = fontdb::Database::new();
        db.load_system_fonts();
        let has = |db: &fontdb::Database, name: &str| {
            db.faces().any(|f| f.families.iter().any(|(n, _)| n == name))
        };
        if let Some(name) = SANS_CANDIDATES.iter().find(|n| has(&db, n)) {
            db.set_sans_serif_family(*name);
        }
        if let Some(name) = SERIF_CANDIDATES.iter().find(|n| has(&db, n)) {
            db.set_serif_family(*name);
        }
        if let Some(name) = MONO_CANDIDATES.iter().find(|n| has(&db, n)) {
            db.set_monospace_family(*name);
        }
        debug!("loaded {} system font faces", db.len());
        SystemFonts {
            db,
            resolved: Mutex::new(HashMap::new()),
        }
    })
}

impl SystemFonts {
    fn typeface(&self, family: &str, bold: bool) -> Option<Typeface> {
        let key = (family.trim().to_ascii_lowercase(), bold);
        if let Some(hit) = self.resolved.lock().ok().and_then(|m| m.get(&key).cloned()) {
            return hit;
        }
        let face = self.lookup(family.trim(), bold);
        if face.is_none() {
            warn!("no system font available for '{}'", family);
        }
        if let Ok(mut map) = self.resolved.lock() {
            map.insert(key, face.clone());
        }
        face
    }

    fn lookup(&self, family: &str, bold: bool) -> Option<Typeface> {
        let mut families = Vec::with_capacity(3);
        match family {
            "serif" => families.push(fontdb::Family::Serif),
            "monospace" => families.push(fontdb::Family::Monospace),
            "cursive" => families.push(fontdb::Family::Cursive),
            "sans-serif" | "" => {}
            name => families.push(fontdb::Family::Name(name)),
        }
        families.push(fontdb::Family::SansSerif);

        let query = fontdb::Query {
            families: &families,
            weight: if bold { fontdb::Weight::BOLD } else { fontdb::Weight::NORMAL },
            ..fontdb::Query::default()
        };
        let id = self
            .db
            .query(&query)
            .or_else(|| self.db.faces().next().map(|f| f.id))?;
        self.db
            .with_face_data(id, |data, index| {
                Typeface::from_bytes_and_index(family, data.to_vec(), index)
            })
            .and_then(|r| r.ok())
    }
}

/// Best installed face for `family`, matching generic classes where possible.
pub fn system_typeface(family: &str, bold: bool) -> Option<Typeface> {
    system_fonts().typeface(family, bold)
}

// ---------------------------------------------------------------------------
// Loader
// ---------------------------------------------------------------------------

/// Outcome of `FontLoader::ensure`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FontStatus {
    /// Generic family or empty name; nothing to fetch.
    Generic,
    /// Already loaded earlier in this process.
    Cached,
    /// Fetched, parsed and confirmed just now.
    Loaded,
    /// Could not be loaded; text uses the platform fallback.
    Fallback(String),
}

impl FontStatus {
    pub fn is_fallback(&self) -> bool {
        matches!(self, FontStatus::Fallback(_))
    }
}

/// Ensures font families are available before text is measured or drawn.
#[derive(Clone)]
pub struct FontLoader {
    fetcher: Arc<dyn FontFetcher>,
    cache: Arc<FontCache>,
}

impl FontLoader {
    /// Loader backed by the process-wide cache.
    pub fn new(fetcher: Arc<dyn FontFetcher>) -> Self {
        Self::with_cache(fetcher, FontCache::global())
    }

    pub fn with_cache(fetcher: Arc<dyn FontFetcher>, cache: Arc<FontCache>) -> Self {
        Self { fetcher, cache }
    }

    pub fn cache(&self) -> &Arc<FontCache> {
        &self.cache
    }

    /// Make `family` available, fetching it when it is neither generic nor cached.
    pub async fn ensure(&self, family: &str) -> FontStatus {
        let family = family.trim();
        if is_generic_family(family) {
            return FontStatus::Generic;
        }
        if self.cache.contains(family) {
            debug!("font '{}' already loaded", family);
            return FontStatus::Cached;
        }

        let loaded = self
            .fetcher
            .fetch(family)
            .await
            .and_then(|bytes| Typeface::from_bytes(family, bytes));
        match loaded {
            Ok(face) if face.is_usable(CONFIRM_SIZE) => {
                info!("loaded font '{}'", family);
                self.cache.insert(face);
                FontStatus::Loaded
            }
            Ok(_) => {
                warn!("font '{}' has no usable glyphs; using fallback", family);
                FontStatus::Fallback(format!("{family}: no usable glyphs"))
            }
            Err(e) => {
                warn!("{}; using fallback font", e);
                FontStatus::Fallback(e.to_string())
            }
        }
    }

    /// Whether text in `family` can be measured at `size` with the face that
    /// would be used for drawing.
    pub fn confirm(&self, family: &str, size: f32) -> bool {
        self.typeface(family)
            .map(|face| face.measure(CONFIRM_TEXT, size) > 0.0)
            .unwrap_or(false)
    }

    /// Face to draw `family` with: the fetched face, else a system fallback.
    pub fn typeface(&self, family: &str) -> Option<Typeface> {
        self.cache
            .get(family.trim())
            .or_else(|| system_typeface(family, false))
    }

    /// Bold face for `family`; fetched families are used as-is.
    pub fn bold_typeface(&self, family: &str) -> Option<Typeface> {
        self.cache
            .get(family.trim())
            .or_else(|| system_typeface(family, true))
    }
}
