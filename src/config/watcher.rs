//! Template file watcher for hot reload.

use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};

use crate::render::{RendererHandle, TemplateRenderer};

/// Watches the flash template and swaps the renderer when it changes.
pub struct TemplateWatcher {
    path: PathBuf,
    handle: RendererHandle,
}

impl TemplateWatcher {
    /// Create a watcher that reloads `path` into `handle`.
    pub fn new(path: &Path, handle: RendererHandle) -> Self {
        Self {
            path: path.to_path_buf(),
            handle,
        }
    }

    /// Compile the template and install it if it is valid.
    ///
    /// A broken template keeps the previous renderer in place.
    pub fn reload(&self) -> bool {
        reload_into(&self.path, &self.handle)
    }

    /// Start watching the file in a background thread.
    ///
    /// The returned watcher must be kept alive for events to be delivered.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let handle = self.handle.clone();
        let path = self.path.clone();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    if event.kind.is_modify() || event.kind.is_create() {
                        tracing::info!(path = ?path, "Template change detected, reloading...");
                        reload_into(&path, &handle);
                    }
                }
                Err(e) => tracing::error!("Watch error: {:?}", e),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        watcher.watch(&self.path, RecursiveMode::NonRecursive)?;

        tracing::info!(path = ?self.path, "Template watcher started");
        Ok(watcher)
    }
}

fn reload_into(path: &Path, handle: &RendererHandle) -> bool {
    match TemplateRenderer::from_file(path) {
        Ok(renderer) => {
            handle.replace(renderer);
            tracing::info!(path = ?path, "Flash template reloaded");
            true
        }
        Err(e) => {
            tracing::error!(
                "Failed to reload template: {}. Keeping current template.",
                e
            );
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flash::Message;
    use crate::render::FnRenderer;
    use bytes::Bytes;

    #[test]
    fn reload_swaps_valid_template() {
        let path = std::env::temp_dir().join("flash_embed_watcher_valid.html");
        std::fs::write(&path, "{% for m in messages %}<{{ m.text }}>{% endfor %}").unwrap();

        let handle = RendererHandle::new(FnRenderer(|_: &[Message]| Bytes::from_static(b"old")));
        let watcher = TemplateWatcher::new(&path, handle.clone());

        assert!(watcher.reload());
        let out = handle.current().render(&[Message::info("hi")]).unwrap();
        assert_eq!(&out[..], b"<hi>");

        std::fs::remove_file(path).unwrap_or_default();
    }

    #[test]
    fn broken_template_keeps_previous() {
        let path = std::env::temp_dir().join("flash_embed_watcher_broken.html");
        std::fs::write(&path, "{% for m in messages %}").unwrap();

        let handle = RendererHandle::new(FnRenderer(|_: &[Message]| Bytes::from_static(b"old")));
        let watcher = TemplateWatcher::new(&path, handle.clone());

        assert!(!watcher.reload());
        assert_eq!(&handle.current().render(&[]).unwrap()[..], b"old");

        std::fs::remove_file(path).unwrap_or_default();
    }
}
