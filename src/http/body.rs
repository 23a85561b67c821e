//! Response body wrapper that splices rendered messages into HTML.
//!
//! # Responsibilities
//! - Forward frames of non-HTML responses untouched
//! - Scan each data frame of HTML responses for an insertion point
//! - Insert the rendered markup at most once per response
//!
//! # Design Decisions
//! - Frames are scanned one at a time; nothing beyond the sniffed first
//!   frame is ever held back
//! - A marker split across two frames is not detected
//! - One output frame per input frame

use std::pin::Pin;
use std::sync::Arc;
use std::task::{ready, Context, Poll};

use bytes::{Bytes, BytesMut};
use http_body::{Body, Frame, SizeHint};

use crate::flash::Message;
use crate::observability::metrics;
use crate::render::{render_or_empty, Render};

/// Placeholder tag replaced by the rendered messages.
pub const PLACEHOLDER_MARKER: &str = "<flashmessages>";

/// Closing tag that messages are inserted before when no placeholder exists.
pub const FALLBACK_MARKER: &str = "</body>";

/// Literal markers searched for in HTML bodies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Markers {
    /// Removed from the body; messages render in its place.
    pub placeholder: String,
    /// Kept in the body; messages render just before it.
    pub fallback: String,
}

impl Default for Markers {
    fn default() -> Self {
        Self {
            placeholder: PLACEHOLDER_MARKER.to_string(),
            fallback: FALLBACK_MARKER.to_string(),
        }
    }
}

/// Per-response rewrite state.
pub(crate) struct Rewriter {
    pending: Vec<Message>,
    renderer: Arc<Box<dyn Render>>,
    markers: Arc<Markers>,
}

impl Rewriter {
    pub(crate) fn new(
        pending: Vec<Message>,
        renderer: Arc<Box<dyn Render>>,
        markers: Arc<Markers>,
    ) -> Self {
        Self {
            pending,
            renderer,
            markers,
        }
    }

    /// Rewrite one chunk of the body.
    ///
    /// The placeholder is always stripped; the fallback marker is only used
    /// while messages are still pending.
    fn rewrite(&mut self, data: Bytes) -> Bytes {
        let placeholder = self.markers.placeholder.as_bytes();
        let fallback = self.markers.fallback.as_bytes();

        let (start, end, marker) = match find(&data, placeholder) {
            Some(pos) => (pos, pos + placeholder.len(), "placeholder"),
            None if !self.pending.is_empty() => match find(&data, fallback) {
                Some(pos) => (pos, pos, "fallback"),
                None => return data,
            },
            None => return data,
        };

        let markup = if self.pending.is_empty() {
            Bytes::new()
        } else {
            let markup = render_or_empty(&**self.renderer, &self.pending);
            tracing::debug!(marker, count = self.pending.len(), "Inserted flash messages");
            metrics::record_insertion(marker);
            self.pending.clear();
            markup
        };

        let mut out = BytesMut::with_capacity(data.len() - (end - start) + markup.len());
        out.extend_from_slice(&data[..start]);
        out.extend_from_slice(&markup);
        out.extend_from_slice(&data[end..]);
        out.freeze()
    }

    #[cfg(test)]
    fn pending(&self) -> usize {
        self.pending.len()
    }
}

enum Mode {
    Passthrough,
    Rewriting(Rewriter),
}

/// Body returned by [`crate::FlashService`].
pub struct FlashBody<B: Body> {
    inner: Pin<Box<B>>,
    /// Frame pulled early for content sniffing, replayed first.
    buffered: Option<Result<Frame<Bytes>, B::Error>>,
    mode: Mode,
}

// The inner body is boxed and never pinned in place.
impl<B: Body> Unpin for FlashBody<B> {}

impl<B: Body> FlashBody<B> {
    /// Forward every frame unchanged.
    pub(crate) fn passthrough(
        inner: Pin<Box<B>>,
        buffered: Option<Result<Frame<Bytes>, B::Error>>,
    ) -> Self {
        Self {
            inner,
            buffered,
            mode: Mode::Passthrough,
        }
    }

    /// Scan data frames and splice in the pending messages.
    pub(crate) fn rewriting(
        inner: Pin<Box<B>>,
        buffered: Option<Result<Frame<Bytes>, B::Error>>,
        rewriter: Rewriter,
    ) -> Self {
        Self {
            inner,
            buffered,
            mode: Mode::Rewriting(rewriter),
        }
    }

    #[cfg(test)]
    pub(crate) fn is_rewriting(&self) -> bool {
        matches!(self.mode, Mode::Rewriting(_))
    }
}

impl<B> Body for FlashBody<B>
where
    B: Body<Data = Bytes>,
{
    type Data = Bytes;
    type Error = B::Error;

    fn poll_frame(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        let this = self.get_mut();

        let frame = match this.buffered.take() {
            Some(frame) => frame,
            None => match ready!(this.inner.as_mut().poll_frame(cx)) {
                Some(frame) => frame,
                None => return Poll::Ready(None),
            },
        };

        let frame = match frame {
            Ok(frame) => frame,
            Err(e) => return Poll::Ready(Some(Err(e))),
        };

        let frame = match &mut this.mode {
            Mode::Passthrough => frame,
            Mode::Rewriting(rewriter) => match frame.into_data() {
                Ok(data) => Frame::data(rewriter.rewrite(data)),
                Err(frame) => frame,
            },
        };

        Poll::Ready(Some(Ok(frame)))
    }

    fn is_end_stream(&self) -> bool {
        self.buffered.is_none() && self.inner.is_end_stream()
    }

    fn size_hint(&self) -> SizeHint {
        match (&self.mode, &self.buffered) {
            (Mode::Passthrough, None) => self.inner.size_hint(),
            (Mode::Passthrough, Some(Ok(frame))) => {
                let extra = frame.data_ref().map(|d| d.len() as u64).unwrap_or(0);
                let mut hint = self.inner.size_hint();
                if let Some(upper) = hint.upper() {
                    hint.set_upper(upper + extra);
                }
                hint.set_lower(hint.lower() + extra);
                hint
            }
            _ => SizeHint::default(),
        }
    }
}

/// Position of the first occurrence of `needle` in `haystack`.
fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() || needle.len() > haystack.len() {
        return None;
    }
    haystack.windows(needle.len()).position(|w| w == needle)
}
