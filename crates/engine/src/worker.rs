//! Persistent render worker
//!
//! A single thread owns the [`AudioEngine`] and serves render requests in
//! order, so at most one rendering is ever active. Each submission gets a
//! [`PendingRender`] that resolves once its playback has completed.

use crate::config::Tuning;
use crate::engine::{AudioEngine, RenderRequest};
use crate::status::SendingComplete;
use crate::{EngineError, Result};
use cwburst_keying::keyer::RenderSummary;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};
use tracing::{debug, error, info};

enum Command {
    Render {
        request: RenderRequest,
        reply: Sender<Result<RenderSummary>>,
    },
    Retune(Tuning),
}

/// Completion handle for one submitted request
pub struct PendingRender {
    reply: Receiver<Result<RenderSummary>>,
}

impl PendingRender {
    /// Block until playback of this request has finished
    pub fn wait(self) -> Result<RenderSummary> {
        self.reply.recv().map_err(|_| EngineError::WorkerUnavailable {
            msg: "worker exited before completing the request".to_string(),
        })?
    }

    /// Result if the request has already finished
    pub fn try_wait(&self) -> Option<Result<RenderSummary>> {
        match self.reply.try_recv() {
            Ok(result) => Some(result),
            Err(mpsc::TryRecvError::Empty) => None,
            Err(mpsc::TryRecvError::Disconnected) => Some(Err(EngineError::WorkerUnavailable {
                msg: "worker exited before completing the request".to_string(),
            })),
        }
    }
}

/// Handle to the render thread
pub struct RenderWorker {
    commands: Option<Sender<Command>>,
    handle: Option<JoinHandle<()>>,
    sending: SendingComplete,
}

impl RenderWorker {
    /// Start the worker; `factory` builds the engine on the worker thread
    ///
    /// The engine and its device never leave that thread. Construction
    /// errors are returned here.
    pub fn spawn<F>(factory: F) -> Result<Self>
    where
        F: FnOnce() -> Result<AudioEngine> + Send + 'static,
    {
        let (commands, inbox) = mpsc::channel::<Command>();
        let (ready_tx, ready_rx) = mpsc::channel::<Result<SendingComplete>>();

        let handle = thread::Builder::new()
            .name("cwburst-render".to_string())
            .spawn(move || {
                let engine = match factory() {
                    Ok(engine) => engine,
                    Err(e) => {
                        let _ = ready_tx.send(Err(e));
                        return;
                    }
                };
                let _ = ready_tx.send(Ok(engine.sending_complete()));
                serve(engine, inbox);
            })
            .map_err(|e| EngineError::WorkerUnavailable { msg: e.to_string() })?;

        let sending = match ready_rx.recv() {
            Ok(Ok(sending)) => sending,
            Ok(Err(e)) => {
                let _ = handle.join();
                return Err(e);
            }
            Err(_) => {
                let _ = handle.join();
                return Err(EngineError::WorkerUnavailable {
                    msg: "worker exited during start-up".to_string(),
                });
            }
        };

        info!("Render worker started");
        Ok(Self {
            commands: Some(commands),
            handle: Some(handle),
            sending,
        })
    }

    fn send(&self, command: Command) -> Result<()> {
        self.commands
            .as_ref()
            .and_then(|tx| tx.send(command).ok())
            .ok_or_else(|| EngineError::WorkerUnavailable {
                msg: "worker is not running".to_string(),
            })
    }

    /// Queue a request; sending is marked incomplete immediately
    pub fn submit(&self, request: RenderRequest) -> Result<PendingRender> {
        let (reply, pending) = mpsc::channel();
        self.sending.begin();
        if let Err(e) = self.send(Command::Render { request, reply }) {
            self.sending.finish();
            return Err(e);
        }
        Ok(PendingRender { reply: pending })
    }

    /// Queue a request and wait for its playback to finish
    pub fn render_and_play(&self, request: RenderRequest) -> Result<RenderSummary> {
        self.submit(request)?.wait()
    }

    /// Replace the engine tuning for subsequent requests
    pub fn retune(&self, tuning: Tuning) -> Result<()> {
        self.send(Command::Retune(tuning))
    }

    /// Flag for the input loop
    pub fn sending_complete(&self) -> SendingComplete {
        self.sending.clone()
    }

    /// Finish queued requests, close the device and join the thread
    pub fn shutdown(mut self) -> Result<()> {
        self.join()
    }

    fn join(&mut self) -> Result<()> {
        self.commands.take();
        match self.handle.take() {
            Some(handle) => handle.join().map_err(|_| EngineError::WorkerUnavailable {
                msg: "render worker panicked".to_string(),
            }),
            None => Ok(()),
        }
    }
}

impl Drop for RenderWorker {
    fn drop(&mut self) {
        if let Err(e) = self.join() {
            error!("{}", e);
        }
    }
}

fn serve(mut engine: AudioEngine, inbox: Receiver<Command>) {
    let sending = engine.sending_complete();

    for command in inbox {
        match command {
            Command::Render { request, reply } => {
                debug!("Render request {:?}", request.text);
                let result = engine.play(&request);
                sending.finish();
                if let Err(e) = &result {
                    error!("Rendering {:?} failed: {}", request.text, e);
                }
                let _ = reply.send(result);
            }
            Command::Retune(tuning) => engine.set_tuning(tuning),
        }
    }

    if let Err(e) = engine.close() {
        error!("Closing audio device failed: {}", e);
    }
    info!("Render worker stopped");
}
