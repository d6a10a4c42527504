//! Framed byte-stream transport for an [`RpcChannel`].
//!
//! One task drains the channel's outbound queue onto the writer; another
//! reads frames and dispatches them strictly in arrival order.

use std::fmt::Display;

use deskpin_config::Framing;
use futures_util::{Sink, SinkExt, Stream, StreamExt};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::bytes::Bytes;
use tokio_util::codec::{FramedRead, FramedWrite, LengthDelimitedCodec, LinesCodec};
use tracing::{debug, info, warn};

use crate::channel::RpcChannel;
use crate::protocol::OutboundRequest;

/// Largest frame accepted from a peer.
pub const MAX_FRAME_LEN: usize = 4 * 1024 * 1024;

/// The two transport tasks. Dropping the handle leaves them running;
/// [`TransportHandle::abort`] stops both.
#[derive(Debug)]
pub struct TransportHandle {
    pub reader: JoinHandle<()>,
    pub writer: JoinHandle<()>,
}

impl TransportHandle {
    pub fn abort(&self) {
        self.reader.abort();
        self.writer.abort();
    }
}

fn length_codec() -> LengthDelimitedCodec {
    LengthDelimitedCodec::builder()
        .length_field_length(4)
        .little_endian()
        .max_frame_length(MAX_FRAME_LEN)
        .new_codec()
}

/// Create a channel and connect it to `reader`/`writer`.
pub fn connect<R, W>(reader: R, writer: W, framing: Framing) -> (RpcChannel, TransportHandle)
where
    R: AsyncRead + Unpin + Send + 'static,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let (channel, outbound) = RpcChannel::new();
    let handle = attach(channel.clone(), outbound, reader, writer, framing);
    (channel, handle)
}

/// Spawn the reader and writer tasks for an existing channel.
pub fn attach<R, W>(
    channel: RpcChannel,
    outbound: mpsc::UnboundedReceiver<OutboundRequest>,
    reader: R,
    writer: W,
    framing: Framing,
) -> TransportHandle
where
    R: AsyncRead + Unpin + Send + 'static,
    W: AsyncWrite + Unpin + Send + 'static,
{
    match framing {
        Framing::Lines => TransportHandle {
            reader: tokio::spawn(read_frames(
                channel,
                FramedRead::new(reader, LinesCodec::new_with_max_length(MAX_FRAME_LEN)),
            )),
            writer: tokio::spawn(write_frames(
                outbound,
                FramedWrite::new(writer, LinesCodec::new()),
                |json| json,
            )),
        },
        Framing::LengthPrefixed => TransportHandle {
            reader: tokio::spawn(read_frames(channel, FramedRead::new(reader, length_codec()))),
            writer: tokio::spawn(write_frames(
                outbound,
                FramedWrite::new(writer, length_codec()),
                Bytes::from,
            )),
        },
    }
}

async fn read_frames<S, B, E>(channel: RpcChannel, mut frames: S)
where
    S: Stream<Item = Result<B, E>> + Unpin,
    B: AsRef<[u8]>,
    E: Display,
{
    while let Some(frame) = frames.next().await {
        match frame {
            Ok(frame) => channel.dispatch_frame(frame.as_ref()),
            Err(e) => {
                warn!(error = %e, "transport read failed");
                break;
            }
        }
    }
    info!("peer closed the channel");
    channel.close();
}

async fn write_frames<K, I>(
    mut outbound: mpsc::UnboundedReceiver<OutboundRequest>,
    mut sink: K,
    into_frame: fn(String) -> I,
) where
    K: Sink<I> + Unpin,
    K::Error: Display,
{
    while let Some(request) = outbound.recv().await {
        let json = match serde_json::to_string(&request) {
            Ok(json) => json,
            Err(e) => {
                warn!(id = request.id, error = %e, "failed to encode request");
                continue;
            }
        };
        debug!(id = request.id, method = %request.method, "writing request");
        if let Err(e) = sink.send(into_frame(json)).await {
            warn!(error = %e, "transport write failed");
            break;
        }
    }
}
