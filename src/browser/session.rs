use std::cell::RefCell;
use std::collections::BTreeMap;
use std::io::{BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::browser::error::SessionError;
use crate::dom::page::{DomEvent, NodeId, Page, PageError, SelectOption};
use crate::dom::selector::Selector;

/// Request sent to the browser server over stdin (one JSON line).
#[derive(Debug, Serialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum BrowserRequest {
    Navigate {
        url: String,
    },
    Query {
        #[serde(skip_serializing_if = "Option::is_none")]
        scope: Option<NodeId>,
        selector: String,
    },
    Closest {
        node: NodeId,
        selector: String,
    },
    Inspect {
        node: NodeId,
    },
    SetValue {
        node: NodeId,
        value: String,
    },
    SetChecked {
        node: NodeId,
        checked: bool,
    },
    SetText {
        node: NodeId,
        text: String,
    },
    Focus {
        node: NodeId,
    },
    Blur {
        node: NodeId,
    },
    Click {
        node: NodeId,
    },
    Dispatch {
        node: NodeId,
        event: DomEvent,
    },
    Quit,
}

impl BrowserRequest {
    pub fn name(&self) -> &'static str {
        match self {
            BrowserRequest::Navigate { .. } => "navigate",
            BrowserRequest::Query { .. } => "query",
            BrowserRequest::Closest { .. } => "closest",
            BrowserRequest::Inspect { .. } => "inspect",
            BrowserRequest::SetValue { .. } => "set_value",
            BrowserRequest::SetChecked { .. } => "set_checked",
            BrowserRequest::SetText { .. } => "set_text",
            BrowserRequest::Focus { .. } => "focus",
            BrowserRequest::Blur { .. } => "blur",
            BrowserRequest::Click { .. } => "click",
            BrowserRequest::Dispatch { .. } => "dispatch",
            BrowserRequest::Quit => "quit",
        }
    }
}

/// Element state as reported by `inspect`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NodeInfo {
    pub tag: String,
    #[serde(default)]
    pub attrs: BTreeMap<String, String>,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub checked: bool,
    #[serde(default)]
    pub disabled: bool,
    #[serde(default)]
    pub content_editable: bool,
    #[serde(default)]
    pub options: Vec<SelectOption>,
}

/// Response received from the browser server over stdout (one JSON line).
#[derive(Debug, Deserialize)]
pub struct BrowserResponse {
    pub ok: bool,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub stale: Option<bool>,
    #[serde(default)]
    pub ready: Option<bool>,
    #[serde(default)]
    pub nodes: Option<Vec<NodeId>>,
    #[serde(default)]
    pub node: Option<NodeId>,
    #[serde(default)]
    pub info: Option<NodeInfo>,
}

struct Pipes {
    stdin: ChildStdin,
    reader: BufReader<ChildStdout>,
}

/// A live browser page driven through a long-lived Node.js process.
///
/// The server keeps Chromium open and hands out numeric element handles;
/// commands are NDJSON over stdin, responses NDJSON over stdout.
pub struct BrowserSession {
    child: Child,
    pipes: RefCell<Pipes>,
    current_url: Option<String>,
}

impl BrowserSession {
    /// Spawn `node <script_path>` and wait for its ready signal.
    pub fn launch(script_path: &str) -> Result<Self, SessionError> {
        let mut child = Command::new("node")
            .arg(script_path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|e| SessionError::Spawn {
                script: script_path.to_string(),
                source: e,
            })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| SessionError::Io("Failed to capture stdin of browser server".into()))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| SessionError::Io("Failed to capture stdout of browser server".into()))?;

        let mut reader = BufReader::new(stdout);

        // Wait for the ready signal
        let response = read_response(&mut reader, "browser server ready signal")?;
        if !response.ok || response.ready != Some(true) {
            return Err(SessionError::Protocol {
                command: "launch".into(),
                error: "Did not receive ready signal from browser server".into(),
            });
        }
        info!(script = script_path, "Browser session ready");

        Ok(BrowserSession {
            child,
            pipes: RefCell::new(Pipes { stdin, reader }),
            current_url: None,
        })
    }

    /// Send a request and read the response.
    fn send(&self, request: &BrowserRequest) -> Result<BrowserResponse, SessionError> {
        let json = serde_json::to_string(request).map_err(|e| SessionError::JsonSerialize {
            context: "BrowserRequest".into(),
            source: e,
        })?;

        let mut pipes = self
            .pipes
            .try_borrow_mut()
            .map_err(|_| SessionError::Io("Browser session is already in use".into()))?;

        writeln!(pipes.stdin, "{}", json)
            .map_err(|e| SessionError::Io(format!("Failed to write to browser server: {}", e)))?;
        pipes
            .stdin
            .flush()
            .map_err(|e| SessionError::Io(format!("Failed to flush browser server stdin: {}", e)))?;

        read_response(&mut pipes.reader, "browser server response")
    }

    /// Send a request and verify it succeeded. Stale handles surface as
    /// `PageError::StaleNode` so callers can tell them from transport faults.
    fn send_ok(&self, request: &BrowserRequest, node: Option<NodeId>) -> Result<BrowserResponse, PageError> {
        let response = self.send(request)?;
        if response.ok {
            return Ok(response);
        }
        if let (Some(true), Some(node)) = (response.stale, node) {
            return Err(PageError::StaleNode(node));
        }
        Err(PageError::Protocol {
            command: request.name().into(),
            error: response.error.unwrap_or_else(|| "Unknown error".into()),
        })
    }

    fn inspect(&self, node: NodeId) -> Result<NodeInfo, PageError> {
        let response = self.send_ok(&BrowserRequest::Inspect { node }, Some(node))?;
        response.info.ok_or_else(|| PageError::Protocol {
            command: "inspect".into(),
            error: "No info in inspect response".into(),
        })
    }

    fn command(&mut self, request: BrowserRequest, node: NodeId) -> Result<(), PageError> {
        debug!(command = request.name(), node = node.0, "Browser command");
        self.send_ok(&request, Some(node)).map(|_| ())
    }

    /// Load a URL; every previously handed-out handle becomes stale.
    pub fn navigate(&mut self, url: &str) -> Result<(), SessionError> {
        let request = BrowserRequest::Navigate {
            url: url.to_string(),
        };
        let response = self.send(&request)?;
        if !response.ok {
            return Err(SessionError::Protocol {
                command: "navigate".into(),
                error: response.error.unwrap_or_else(|| "Unknown error".into()),
            });
        }
        self.current_url = Some(url.to_string());
        Ok(())
    }

    /// Last navigated URL (cached, no browser call).
    pub fn last_url(&self) -> Option<&str> {
        self.current_url.as_deref()
    }

    pub fn quit(&mut self) -> Result<(), SessionError> {
        // Best-effort: the process may already be gone
        let _ = self.send(&BrowserRequest::Quit);
        let _ = self.child.wait();
        Ok(())
    }
}

fn read_response(
    reader: &mut BufReader<ChildStdout>,
    context: &str,
) -> Result<BrowserResponse, SessionError> {
    let mut line = String::new();
    reader
        .read_line(&mut line)
        .map_err(|e| SessionError::Io(format!("Failed to read {}: {}", context, e)))?;

    if line.trim().is_empty() {
        return Err(SessionError::Io(
            "Empty response from browser server (process may have died)".into(),
        ));
    }

    serde_json::from_str(line.trim()).map_err(|e| SessionError::JsonParse {
        context: context.into(),
        source: e,
    })
}

impl Page for BrowserSession {
    fn query_all(&self, scope: Option<NodeId>, selector: &Selector) -> Result<Vec<NodeId>, PageError> {
        let request = BrowserRequest::Query {
            scope,
            selector: selector.to_string(),
        };
        let response = self.send_ok(&request, scope)?;
        Ok(response.nodes.unwrap_or_default())
    }

    fn closest(&self, node: NodeId, selector: &Selector) -> Result<Option<NodeId>, PageError> {
        let request = BrowserRequest::Closest {
            node,
            selector: selector.to_string(),
        };
        Ok(self.send_ok(&request, Some(node))?.node)
    }

    fn tag_name(&self, node: NodeId) -> Result<String, PageError> {
        Ok(self.inspect(node)?.tag.to_ascii_lowercase())
    }

    fn attribute(&self, node: NodeId, name: &str) -> Result<Option<String>, PageError> {
        Ok(self.inspect(node)?.attrs.remove(name))
    }

    fn text_content(&self, node: NodeId) -> Result<String, PageError> {
        Ok(self.inspect(node)?.text)
    }

    fn is_disabled(&self, node: NodeId) -> Result<bool, PageError> {
        Ok(self.inspect(node)?.disabled)
    }

    fn is_content_editable(&self, node: NodeId) -> Result<bool, PageError> {
        Ok(self.inspect(node)?.content_editable)
    }

    fn value(&self, node: NodeId) -> Result<String, PageError> {
        Ok(self.inspect(node)?.value)
    }

    fn is_checked(&self, node: NodeId) -> Result<bool, PageError> {
        Ok(self.inspect(node)?.checked)
    }

    fn select_options(&self, node: NodeId) -> Result<Vec<SelectOption>, PageError> {
        Ok(self.inspect(node)?.options)
    }

    fn set_value(&mut self, node: NodeId, value: &str) -> Result<(), PageError> {
        let value = value.to_string();
        self.command(BrowserRequest::SetValue { node, value }, node)
    }

    fn set_checked(&mut self, node: NodeId, checked: bool) -> Result<(), PageError> {
        self.command(BrowserRequest::SetChecked { node, checked }, node)
    }

    fn set_text_content(&mut self, node: NodeId, text: &str) -> Result<(), PageError> {
        let text = text.to_string();
        self.command(BrowserRequest::SetText { node, text }, node)
    }

    fn focus(&mut self, node: NodeId) -> Result<(), PageError> {
        self.command(BrowserRequest::Focus { node }, node)
    }

    fn blur(&mut self, node: NodeId) -> Result<(), PageError> {
        self.command(BrowserRequest::Blur { node }, node)
    }

    fn click(&mut self, node: NodeId) -> Result<(), PageError> {
        self.command(BrowserRequest::Click { node }, node)
    }

    fn dispatch(&mut self, node: NodeId, event: DomEvent) -> Result<(), PageError> {
        self.command(BrowserRequest::Dispatch { node, event }, node)
    }
}

impl Drop for BrowserSession {
    fn drop(&mut self) {
        let _ = self.quit();
    }
}
