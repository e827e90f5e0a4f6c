//! The byte-stream session: `SessionFacade` over a TCP connection.
//!
//! A connected session runs two background tasks: a writer that owns
//! the write half and flushes pre-encoded frames in order, and the
//! demultiplexer that owns the read half (see [`crate::demux`]). A
//! caller issues a call by handing the encoded frame to the writer and
//! then blocking on the queue of the reply tag it expects — void calls
//! return immediately.
//!
//! Usage invariant: calls on one session must be issued strictly
//! sequentially. The wire protocol has no correlation IDs; overlapping
//! calls risk response misattribution and are a caller bug, not
//! something this type can detect.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use parlor_core::{Call, CallTransport, ChatMessage, Notice, Reply, SessionError};
use parlor_protocol::{line_codec, TypeTag};
use tokio::io::AsyncWriteExt;
use tokio::net::tcp::OwnedWriteHalf;
use tokio::net::{TcpStream, ToSocketAddrs};
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::demux::{run_demux, DemuxContext};
use crate::queues::{reply_channels, ReplyQueues};

pub struct RemoteSession {
    writer: mpsc::UnboundedSender<String>,
    queues: ReplyQueues,
    identity: Arc<Mutex<Option<String>>>,
    chat_log: Arc<Mutex<Vec<ChatMessage>>>,
    closed: Arc<AtomicBool>,
}

impl RemoteSession {
    /// Connect to the coordinator. The returned receiver yields every
    /// surfaced push: UPDATE, TURN, chat deliveries, and a final EXIT
    /// if the coordinator aborts the session's match.
    pub async fn connect(
        addr: impl ToSocketAddrs,
    ) -> Result<(RemoteSession, mpsc::UnboundedReceiver<Notice>), SessionError> {
        let stream = TcpStream::connect(addr)
            .await
            .map_err(|e| SessionError::Io(e.to_string()))?;
        stream
            .set_nodelay(true)
            .map_err(|e| SessionError::Io(e.to_string()))?;
        info!("connected to {:?}", stream.peer_addr().ok());

        let (read_half, write_half) = stream.into_split();

        let (writer_tx, writer_rx) = mpsc::unbounded_channel::<String>();
        tokio::spawn(write_frames(write_half, writer_rx));

        let (router, queues) = reply_channels();
        let (notice_tx, notice_rx) = mpsc::unbounded_channel();
        let identity = Arc::new(Mutex::new(None));
        let chat_log = Arc::new(Mutex::new(Vec::new()));
        let closed = Arc::new(AtomicBool::new(false));

        let ctx = DemuxContext {
            router,
            notices: notice_tx,
            writer: writer_tx.clone(),
            identity: identity.clone(),
            chat_log: chat_log.clone(),
            closed: closed.clone(),
        };
        tokio::spawn(run_demux(read_half, ctx));

        Ok((
            RemoteSession {
                writer: writer_tx,
                queues,
                identity,
                chat_log,
                closed,
            },
            notice_rx,
        ))
    }

    /// True once the stream died or the coordinator pushed EXIT.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// The nickname this session joined under, if any.
    pub fn nickname(&self) -> Option<String> {
        self.identity.lock().unwrap().clone()
    }

    /// Everything the chat buffer has accumulated, oldest first.
    pub fn chat_log(&self) -> Vec<ChatMessage> {
        self.chat_log.lock().unwrap().clone()
    }
}

impl CallTransport for RemoteSession {
    async fn call(&self, call: Call) -> Result<Reply, SessionError> {
        if self.is_closed() {
            return Err(SessionError::Closed);
        }

        // Record identity the moment a join call goes out: a PING can
        // arrive interleaved with the join reply, and the pong needs
        // the nickname. A rejected join rolls the record back.
        let mut provisional = false;
        if let Call::AddMatch { nickname } | Call::AddPlayer { nickname, .. } = &call {
            let mut identity = self.identity.lock().unwrap();
            if identity.is_none() {
                *identity = Some(nickname.clone());
                provisional = true;
            }
        }

        let tag = TypeTag::for_call(&call);
        let frame = line_codec::encode_call(&call);
        if let Err(e) = self.writer.send(frame).map_err(|_| SessionError::Closed) {
            if provisional {
                *self.identity.lock().unwrap() = None;
            }
            return Err(e);
        }

        let reply = match tag {
            // Void call: nothing will come back; return immediately.
            None => Ok(Reply::None),
            Some(tag) => self.queues.take(tag).await,
        };

        if provisional {
            let accepted = match &reply {
                Ok(Reply::Int(id)) => *id >= 0,
                Ok(Reply::Bool(ok)) => *ok,
                _ => false,
            };
            if !accepted {
                *self.identity.lock().unwrap() = None;
            }
        }

        reply
    }
}

/// Writer half: flush frames in submission order until every sender is
/// gone or the stream dies.
async fn write_frames(mut write_half: OwnedWriteHalf, mut rx: mpsc::UnboundedReceiver<String>) {
    while let Some(frame) = rx.recv().await {
        if let Err(e) = write_half.write_all(frame.as_bytes()).await {
            debug!("write error: {}", e);
            break;
        }
        if let Err(e) = write_half.flush().await {
            debug!("flush error: {}", e);
            break;
        }
    }
    let _ = write_half.shutdown().await;
}
