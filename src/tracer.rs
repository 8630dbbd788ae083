// Copyright (C) 2025 Kevin Exton
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.
use scylla::client::session::Session;
use scylla::response::query_result::QueryResult;
use scylla::statement::unprepared::Statement;
use tracing::{debug, warn};

/// Interprets the trace toggle. Anything outside the "on" vocabulary,
/// including an unset variable, turns tracing off.
pub fn trace_enabled(value: Option<&str>) -> bool {
    match value.map(str::to_ascii_lowercase).as_deref() {
        Some("enable" | "true" | "1" | "ok" | "ack" | "on" | "yes") => true,
        // "disable", "false", "0", "nak", "off", "no" and unset
        _ => false,
    }
}

/// Request tracing for the statements issued by this program.
///
/// Built once in `main` and handed to whatever issues statements. When
/// disabled it only builds plain statements.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TraceContext {
    enabled: bool,
}

impl TraceContext {
    pub fn new(enabled: bool) -> Self {
        TraceContext { enabled }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Wraps CQL text in a statement, asking the coordinator for a trace
    /// when tracing is on.
    pub fn statement(&self, text: impl Into<String>) -> Statement {
        let mut statement = Statement::new(text.into());
        statement.set_tracing(self.enabled);
        statement
    }

    /// Logs the server-side trace of a finished request, if one was taken.
    pub async fn report(&self, session: &Session, label: &str, result: &QueryResult) {
        if !self.enabled {
            return;
        }
        let Some(tracing_id) = result.tracing_id() else {
            return;
        };
        match session.get_tracing_info(&tracing_id).await {
            Ok(info) => debug!(
                %label,
                %tracing_id,
                coordinator = ?info.coordinator,
                duration_us = ?info.duration,
                events = info.events.len(),
                "request trace"
            ),
            Err(e) => warn!(%label, %tracing_id, error = %e, "could not fetch request trace"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_on_vocabulary() {
        for value in ["enable", "true", "1", "ok", "ack", "on", "yes", "YES", "True"] {
            assert!(trace_enabled(Some(value)), "{value} should enable tracing");
        }
    }

    #[test]
    fn test_off_vocabulary_and_unset() {
        for value in ["disable", "false", "0", "nak", "off", "no", "", "maybe"] {
            assert!(!trace_enabled(Some(value)), "{value} should disable tracing");
        }
        assert!(!trace_enabled(None));
    }

    #[test]
    fn test_statement_tracing_follows_context() {
        let on = TraceContext::new(true);
        let off = TraceContext::default();
        assert!(on.statement("SELECT now() FROM system.local").get_tracing());
        assert!(!off.statement("SELECT now() FROM system.local").get_tracing());
        assert!(on.is_enabled());
        assert!(!off.is_enabled());
    }
}
