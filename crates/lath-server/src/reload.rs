//! WebSocket push channel between build tasks and open preview tabs.

use lath_pipeline::Stream;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Messages pushed to connected preview clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ReloadMessage {
    /// Connection established
    Connected,

    /// Full page reload
    Reload,

    /// Re-request stylesheets in place, without navigating
    RefreshCss,
}

/// Hub for broadcasting reload messages to all connected clients.
#[derive(Debug, Clone)]
pub struct ReloadHub {
    sender: broadcast::Sender<ReloadMessage>,
}

impl ReloadHub {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(100);
        Self { sender }
    }

    /// Send a message to all connected clients.
    pub fn send(&self, msg: ReloadMessage) {
        // Ignore send errors (no receivers)
        let _ = self.sender.send(msg);
    }

    /// Subscribe to reload messages.
    pub fn subscribe(&self) -> broadcast::Receiver<ReloadMessage> {
        self.sender.subscribe()
    }

    /// Get the number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for ReloadHub {
    fn default() -> Self {
        Self::new()
    }
}

/// Message a finished task pushes to clients, if any.
pub fn message_for(stream: Stream) -> Option<ReloadMessage> {
    match stream {
        Stream::None => None,
        Stream::Reload => Some(ReloadMessage::Reload),
        Stream::RefreshCss => Some(ReloadMessage::RefreshCss),
    }
}

/// Generate the client-side reload script, served at `/__reload.js`.
///
/// The socket address is derived from `location.host`, so the script works
/// on whatever port the server was given. Stylesheet refreshes re-request
/// each sheet with a cache-busting query instead of reloading the page.
pub fn reload_client_script() -> String {
    r#"
(function() {
  'use strict';

  var ws = new WebSocket('ws://' + location.host + '/__reload');
  var reconnectAttempts = 0;
  var maxReconnectAttempts = 10;

  ws.onopen = function() {
    console.log('[reload] Connected');
    reconnectAttempts = 0;
  };

  ws.onmessage = function(event) {
    var msg = JSON.parse(event.data);
    console.log('[reload]', msg.type);

    switch (msg.type) {
      case 'reload':
        location.reload();
        break;

      case 'refresh_css':
        var links = document.querySelectorAll('link[rel="stylesheet"]');
        Array.prototype.forEach.call(links, function(link) {
          var href = link.getAttribute('href').split('?')[0];
          link.setAttribute('href', href + '?t=' + Date.now());
        });
        break;

      case 'connected':
        console.log('[reload] Server acknowledged connection');
        break;
    }
  };

  ws.onclose = function() {
    console.log('[reload] Disconnected');
    if (reconnectAttempts < maxReconnectAttempts) {
      reconnectAttempts++;
      setTimeout(function() {
        console.log('[reload] Reconnecting...');
        location.reload();
      }, 1000 * reconnectAttempts);
    }
  };

  ws.onerror = function(e) {
    console.error('[reload] WebSocket error:', e);
  };
})();
"#
    .to_string()
}
