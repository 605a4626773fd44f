use std::sync::Arc;

use banner_forge::fonts::{FontCache, FontFetcher, FontLoader};
use banner_forge::{BannerRenderer, BannerSettings, Color, Error, RenderOutcome, RendererConfig, Result};
use futures::future::BoxFuture;
use tokio::sync::Notify;

/// Holds requests for one family until the test releases them.
struct HeldFetcher {
    family: &'static str,
    started: Notify,
    release: Notify,
}

impl FontFetcher for HeldFetcher {
    fn fetch<'a>(&'a self, family: &'a str) -> BoxFuture<'a, Result<Vec<u8>>> {
        Box::pin(async move {
            if family == self.family {
                self.started.notify_one();
                self.release.notified().await;
            }
            Err(Error::FontLoadError(format!("{family}: not served")))
        })
    }
}

fn banner(family: &str, width: u32, color: Color) -> BannerSettings {
    BannerSettings {
        width,
        height: 120,
        font_family: family.to_string(),
        background_color: color.into(),
        corner_radius: 0,
        outline_thickness: 0,
        text: "generation".to_string(),
        ..Default::default()
    }
}

#[tokio::test]
async fn stale_render_never_overwrites_newer_one() {
    let fetcher = Arc::new(HeldFetcher {
        family: "Slow Serif",
        started: Notify::new(),
        release: Notify::new(),
    });
    let fonts = FontLoader::with_cache(fetcher.clone(), Arc::new(FontCache::new()));
    let renderer = BannerRenderer::with_font_loader(
        RendererConfig { resource_timeout_ms: 0, ..RendererConfig::offline() },
        fonts,
    );

    // A: waits on its font.
    let a = {
        let renderer = renderer.clone();
        tokio::spawn(async move { renderer.render(&banner("Slow Serif", 300, Color::rgb(200, 0, 0))).await })
    };
    fetcher.started.notified().await;

    // B: starts later, finishes first.
    let b = renderer
        .render(&banner("Fast Sans", 400, Color::rgb(0, 0, 200)))
        .await
        .expect("render B");
    assert_eq!(b, RenderOutcome::Committed { generation: 2 });

    fetcher.release.notify_one();
    let a = a.await.expect("join").expect("render A");
    assert_eq!(a, RenderOutcome::Superseded { generation: 1, latest: 2 });

    // Only B's pixels: B's size and B's background.
    let shot = renderer.snapshot().expect("snapshot");
    assert_eq!((shot.width, shot.height), (400, 120));
    let px = renderer.with_surface(|pm| pm.pixel(5, 5)).flatten().expect("pixel");
    assert_eq!((px.red(), px.green(), px.blue()), (0, 0, 200));
    assert_eq!(renderer.committed_generation(), Some(2));
}

#[tokio::test]
async fn sequential_renders_all_commit() {
    let fonts = FontLoader::with_cache(
        Arc::new(banner_forge::fonts::OfflineFetcher),
        Arc::new(FontCache::new()),
    );
    let renderer = BannerRenderer::with_font_loader(RendererConfig::offline(), fonts);
    for (i, width) in [200u32, 250, 300].into_iter().enumerate() {
        let out = renderer
            .render(&banner("sans-serif", width, Color::WHITE))
            .await
            .expect("render");
        assert_eq!(out, RenderOutcome::Committed { generation: i as u64 + 1 });
    }
    assert_eq!(renderer.snapshot().expect("snapshot").width, 300);
}
