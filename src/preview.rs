//! Live preview service.
//!
//! An editor pushes a settings snapshot on every change. `Preview` hands each
//! snapshot to a background task that starts one render per snapshot and lets
//! the renderer's generation guard decide which one ends up on the surface.
//! Generations are reserved in arrival order, before the render task exists,
//! so the last snapshot received is the one that wins.

use std::collections::VecDeque;

use log::{debug, warn};
use tokio::sync::{mpsc, oneshot};
use tokio::task::{JoinError, JoinSet};

use crate::orchestrator::{BannerRenderer, RenderOutcome};
use crate::rendering::Screenshot;
use crate::settings::BannerSettings;
use crate::{Error, Result};

/// Outcomes kept between two `settle` calls; older ones are dropped.
const MAX_FINISHED_OUTCOMES: usize = 64;

enum Command {
    Update(BannerSettings, oneshot::Sender<Result<()>>),
    Settle(oneshot::Sender<Result<Vec<RenderOutcome>>>),
    Snapshot(oneshot::Sender<Result<Screenshot>>),
    Close(oneshot::Sender<Result<()>>),
}

/// Handle to a background preview task.
///
/// Clones talk to the same task. The task stops on [`Preview::close`] or once
/// every handle is dropped.
#[derive(Clone)]
pub struct Preview {
    cmd_tx: mpsc::UnboundedSender<Command>,
}

struct Worker {
    renderer: BannerRenderer,
    renders: JoinSet<Result<RenderOutcome>>,
    finished: VecDeque<RenderOutcome>,
}

impl Worker {
    fn record(&mut self, done: std::result::Result<Result<RenderOutcome>, JoinError>) {
        match done {
            Ok(Ok(outcome)) => {
                debug!("preview render finished: {:?}", outcome);
                if self.finished.len() == MAX_FINISHED_OUTCOMES {
                    self.finished.pop_front();
                }
                self.finished.push_back(outcome);
            }
            Ok(Err(e)) => warn!("preview render failed: {}", e),
            Err(e) => warn!("preview render task failed: {}", e),
        }
    }

    async fn settle(&mut self) -> Vec<RenderOutcome> {
        while let Some(done) = self.renders.join_next().await {
            self.record(done);
        }
        self.finished.drain(..).collect()
    }

    /// Handle one command; `false` stops the loop.
    async fn handle(&mut self, cmd: Command) -> bool {
        match cmd {
            Command::Update(settings, resp) => {
                let generation = match self.renderer.begin(&settings) {
                    Ok(generation) => generation,
                    Err(e) => {
                        warn!("preview update rejected: {}", e);
                        let _ = resp.send(Err(e));
                        return true;
                    }
                };
                let renderer = self.renderer.clone();
                self.renders
                    .spawn(async move { renderer.finish(generation, &settings).await });
                let _ = resp.send(Ok(()));
            }
            Command::Settle(resp) => {
                let outcomes = self.settle().await;
                let _ = resp.send(Ok(outcomes));
            }
            Command::Snapshot(resp) => {
                let _ = resp.send(self.renderer.snapshot());
            }
            Command::Close(resp) => {
                self.settle().await;
                let _ = resp.send(Ok(()));
                return false;
            }
        }
        true
    }
}

impl Preview {
    /// Start the background task. Must be called from within a tokio runtime.
    pub fn spawn(renderer: BannerRenderer) -> Self {
        let (cmd_tx, mut cmd_rx) = mpsc::unbounded_channel::<Command>();
        let mut worker = Worker {
            renderer,
            renders: JoinSet::new(),
            finished: VecDeque::new(),
        };

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    cmd = cmd_rx.recv() => match cmd {
                        Some(cmd) => {
                            if !worker.handle(cmd).await {
                                break;
                            }
                        }
                        None => break,
                    },
                    Some(done) = worker.renders.join_next(), if !worker.renders.is_empty() => {
                        worker.record(done);
                    }
                }
            }
            debug!("preview worker stopped");
        });

        Self { cmd_tx }
    }

    fn send(&self, cmd: Command) -> Result<()> {
        self.cmd_tx
            .send(cmd)
            .map_err(|_| Error::Other("preview worker has shut down".into()))
    }

    /// Queue a render of `settings`. Returns once its generation is reserved
    /// and the render has started; invalid settings are rejected here.
    pub async fn update(&self, settings: BannerSettings) -> Result<()> {
        let (tx, rx) = oneshot::channel();
        self.send(Command::Update(settings, tx))?;
        rx.await
            .map_err(|e| Error::Other(format!("Update canceled: {}", e)))?
    }

    /// Wait for every started render and return the outcomes collected since
    /// the previous call, in completion order. At most the newest
    /// `MAX_FINISHED_OUTCOMES` are reported.
    pub async fn settle(&self) -> Result<Vec<RenderOutcome>> {
        let (tx, rx) = oneshot::channel();
        self.send(Command::Settle(tx))?;
        rx.await
            .map_err(|e| Error::Other(format!("Settle canceled: {}", e)))?
    }

    /// PNG of whatever is committed right now.
    pub async fn snapshot(&self) -> Result<Screenshot> {
        let (tx, rx) = oneshot::channel();
        self.send(Command::Snapshot(tx))?;
        rx.await
            .map_err(|e| Error::Other(format!("Snapshot canceled: {}", e)))?
    }

    /// Let in-flight renders finish, then stop the worker.
    pub async fn close(self) -> Result<()> {
        let (tx, rx) = oneshot::channel();
        self.send(Command::Close(tx))?;
        rx.await
            .map_err(|e| Error::Other(format!("Close canceled: {}", e)))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fonts::{FontCache, FontLoader, OfflineFetcher};
    use crate::RendererConfig;
    use std::sync::Arc;

    fn preview() -> Preview {
        let fonts = FontLoader::with_cache(Arc::new(OfflineFetcher), Arc::new(FontCache::new()));
        Preview::spawn(BannerRenderer::with_font_loader(RendererConfig::default(), fonts))
    }

    fn sized(width: u32, height: u32) -> BannerSettings {
        BannerSettings {
            width,
            height,
            text: String::new(),
            font_family: "sans-serif".into(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn last_update_ends_up_on_the_surface() {
        let p = preview();
        p.update(sized(200, 100)).await.unwrap();
        p.update(sized(320, 160)).await.unwrap();

        let outcomes = p.settle().await.unwrap();
        assert_eq!(outcomes.len(), 2);
        let committed: Vec<_> = outcomes.iter().filter(|o| o.is_committed()).collect();
        assert!(committed.iter().any(|o| o.generation() == 2));

        let shot = p.snapshot().await.unwrap();
        assert_eq!((shot.width, shot.height), (320, 160));
        p.close().await.unwrap();
    }

    #[tokio::test]
    async fn invalid_update_is_rejected_not_committed() {
        let p = preview();
        let res = p.update(BannerSettings { font_size: 0, ..sized(200, 100) }).await;
        assert!(matches!(res, Err(Error::InvalidSettings(_))));
        assert!(p.settle().await.unwrap().is_empty());
        assert!(p.snapshot().await.is_err());
    }

    #[tokio::test]
    async fn closed_preview_rejects_commands() {
        let p = preview();
        let other = p.clone();
        p.close().await.unwrap();
        assert!(other.update(sized(200, 100)).await.is_err());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 1)]
    async fn back_to_back_updates_commit_the_last_one() {
        let p = preview();
        for round in 0..20 {
            p.update(sized(200, 100)).await.unwrap();
            p.update(sized(300, 150)).await.unwrap();
            let outcomes = p.settle().await.unwrap();
            let newest = outcomes.iter().map(RenderOutcome::generation).max().unwrap();
            assert!(
                outcomes.iter().any(|o| o.is_committed() && o.generation() == newest),
                "round {}: {:?}",
                round,
                outcomes
            );
            let shot = p.snapshot().await.unwrap();
            assert_eq!((shot.width, shot.height), (300, 150), "round {}", round);
        }
        p.close().await.unwrap();
    }

    #[test]
    fn unreported_outcomes_are_capped() {
        let fonts = FontLoader::with_cache(Arc::new(OfflineFetcher), Arc::new(FontCache::new()));
        let mut worker = Worker {
            renderer: BannerRenderer::with_font_loader(RendererConfig::default(), fonts),
            renders: JoinSet::new(),
            finished: VecDeque::new(),
        };
        let total = MAX_FINISHED_OUTCOMES as u64 + 10;
        for generation in 1..=total {
            worker.record(Ok(Ok(RenderOutcome::Committed { generation })));
        }
        assert_eq!(worker.finished.len(), MAX_FINISHED_OUTCOMES);
        assert_eq!(worker.finished.front().map(RenderOutcome::generation), Some(11));
        assert_eq!(worker.finished.back().map(RenderOutcome::generation), Some(total));
    }
}
