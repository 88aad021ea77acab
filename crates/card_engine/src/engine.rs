use std::io;
use std::path::PathBuf;
use std::sync::{mpsc, Arc};
use std::thread;

use card_logging::{card_error, card_info, card_warn};

use crate::fetch::{FetchSettings, Fetcher, ReqwestFetcher};
use crate::persist::AtomicFileWriter;
use crate::{EngineEvent, RequestId};

enum EngineCommand {
    Fetch {
        request_id: RequestId,
        path: String,
    },
    Save {
        file_name: String,
        bytes: Arc<[u8]>,
    },
}

/// Owns the background tokio runtime; commands go in, [`EngineEvent`]s come out.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
}

impl EngineHandle {
    pub fn new(settings: FetchSettings, output_dir: PathBuf) -> io::Result<Self> {
        Self::with_fetcher(Arc::new(ReqwestFetcher::new(settings)), output_dir)
    }

    pub fn with_fetcher(fetcher: Arc<dyn Fetcher>, output_dir: PathBuf) -> io::Result<Self> {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let runtime = tokio::runtime::Runtime::new()?;
        let writer = AtomicFileWriter::new(output_dir);

        thread::Builder::new()
            .name("card-engine".to_string())
            .spawn(move || {
                while let Ok(command) = cmd_rx.recv() {
                    let fetcher = fetcher.clone();
                    let writer = writer.clone();
                    let event_tx = event_tx.clone();
                    runtime.spawn(async move {
                        handle_command(fetcher.as_ref(), &writer, command, event_tx).await;
                    });
                }
                card_info!("engine command channel closed, shutting down");
            })?;

        Ok(Self { cmd_tx, event_rx })
    }

    pub fn fetch(&self, request_id: RequestId, path: impl Into<String>) {
        let command = EngineCommand::Fetch {
            request_id,
            path: path.into(),
        };
        if self.cmd_tx.send(command).is_err() {
            card_error!("engine is gone, request {} not sent", request_id);
        }
    }

    pub fn save(&self, file_name: impl Into<String>, bytes: Arc<[u8]>) {
        let command = EngineCommand::Save {
            file_name: file_name.into(),
            bytes,
        };
        if self.cmd_tx.send(command).is_err() {
            card_error!("engine is gone, save not sent");
        }
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }

    /// Blocks until the next event arrives or the engine thread exits.
    pub fn recv(&self) -> Option<EngineEvent> {
        self.event_rx.recv().ok()
    }
}

async fn handle_command(
    fetcher: &dyn Fetcher,
    writer: &AtomicFileWriter,
    command: EngineCommand,
    event_tx: mpsc::Sender<EngineEvent>,
) {
    let event = match command {
        EngineCommand::Fetch { request_id, path } => {
            let result = fetcher.fetch(&path).await;
            match &result {
                Ok(output) => card_info!(
                    "request {} fetched {} bytes from {}",
                    request_id,
                    output.metadata.byte_len,
                    output.metadata.url
                ),
                Err(err) => card_warn!("request {} failed: {}", request_id, err),
            }
            EngineEvent::FetchCompleted { request_id, result }
        }
        EngineCommand::Save { file_name, bytes } => {
            let writer = writer.clone();
            let name = file_name.clone();
            let result =
                match tokio::task::spawn_blocking(move || writer.write(&name, &bytes)).await {
                    Ok(Ok(path)) => Ok(path),
                    Ok(Err(err)) => Err(err.to_string()),
                    Err(join_err) => Err(join_err.to_string()),
                };
            if let Err(reason) = &result {
                card_warn!("saving {} failed: {}", file_name, reason);
            }
            EngineEvent::SaveCompleted { file_name, result }
        }
    };
    let _ = event_tx.send(event);
}
