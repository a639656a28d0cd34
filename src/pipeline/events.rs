use crate::types::*;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

/// Progress events of one command, in emission order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamEvent {
    Thinking {
        brain: String,
        message: String,
    },
    ActionStart {
        step: usize,
        total: usize,
        tool: String,
        description: String,
        args: StepArgs,
    },
    Action {
        step: usize,
        total: usize,
        tool: String,
        args: StepArgs,
        result: String,
        success: bool,
    },
    Complete {
        reply: String,
        brain: String,
        actions: Vec<ActionRecord>,
        duration_ms: u64,
        task_id: Option<TaskId>,
        success: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },
    Error {
        message: String,
    },
}

impl StreamEvent {
    pub fn complete(resp: &AgentResponse, error: Option<String>) -> Self {
        StreamEvent::Complete {
            reply: resp.reply.clone(),
            brain: resp.brain.clone(),
            actions: resp.actions.iter().map(ActionRecord::stripped).collect(),
            duration_ms: resp.duration_ms,
            task_id: resp.task_id,
            success: resp.success,
            error,
        }
    }
}

/// Where the pipeline sends its events. A closed receiver means the client
/// went away; the discard sink backs the batch form.
#[derive(Clone)]
pub struct EventSink {
    tx: Option<mpsc::Sender<StreamEvent>>,
}

impl EventSink {
    pub fn channel(buffer: usize) -> (Self, mpsc::Receiver<StreamEvent>) {
        let (tx, rx) = mpsc::channel(buffer.max(1));
        (Self { tx: Some(tx) }, rx)
    }

    pub fn discard() -> Self {
        Self { tx: None }
    }

    /// False once the consumer has dropped its receiver.
    pub async fn emit(&self, event: StreamEvent) -> bool {
        match &self.tx {
            Some(tx) => tx.send(event).await.is_ok(),
            None => true,
        }
    }
}

/// Client-side reader for an SSE body. Bytes are held until a whole frame
/// (ending in a blank line) has arrived, so multi-byte characters split
/// across chunks decode intact.
#[derive(Debug, Default)]
pub struct FrameDecoder {
    buffer: Vec<u8>,
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a chunk and returns the `data:` payloads of every frame it
    /// completed. Comment lines (keep-alives) are skipped.
    pub fn push(&mut self, chunk: &[u8]) -> Result<Vec<String>, std::str::Utf8Error> {
        self.buffer.extend_from_slice(chunk);
        let mut payloads = Vec::new();
        while let Some(end) = self.buffer.windows(2).position(|w| w == b"\n\n") {
            let frame: Vec<u8> = self.buffer.drain(..end + 2).collect();
            let data: Vec<&str> = std::str::from_utf8(&frame)?
                .lines()
                .filter_map(|line| line.strip_prefix("data:"))
                .map(|d| d.strip_prefix(' ').unwrap_or(d))
                .collect();
            if !data.is_empty() {
                payloads.push(data.join("\n"));
            }
        }
        Ok(payloads)
    }
}
