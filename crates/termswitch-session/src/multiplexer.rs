//! Session multiplexer: registration, focus tracking and focus rotation.

use tracing::{debug, info, warn};

use termswitch_core::{
    Dimensions, DuplicateNames, Error, FocusState, MultiplexerSettings, Result, SessionId, SessionInfo,
};
use termswitch_router::{
    Delivery, InputRouter, OutputRouter, PhysicalInput, PhysicalOutput, RouterStats,
};

use crate::engine::{SessionEngine, SessionIo};

/// Outcome of [`SessionMultiplexer::rotate_focus`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rotation {
    /// Fewer than two sessions; focus did not move and nothing was redrawn
    Unchanged,
    /// Focus moved from one session to the next
    Rotated {
        /// Session that lost focus
        from: SessionId,
        /// Session that gained focus
        to: SessionId,
    },
}

impl Rotation {
    /// True if focus moved.
    pub fn is_rotated(&self) -> bool {
        matches!(self, Rotation::Rotated { .. })
    }
}

struct SessionRecord {
    id: SessionId,
    name: String,
    engine: Box<dyn SessionEngine>,
    input: InputRouter,
    output: OutputRouter,
    exited: bool,
}

impl SessionRecord {
    fn set_active(&self, active: bool) {
        self.input.set_active(active);
        self.output.set_active(active);
    }

    fn focus(&self) -> FocusState {
        FocusState::from(self.input.is_active() && self.output.is_active())
    }

    fn info(&self, index: usize) -> SessionInfo {
        SessionInfo {
            id: self.id,
            name: self.name.clone(),
            index,
            focus: self.focus(),
        }
    }
}

/// Owns the physical terminal and shares it between registered sessions.
///
/// Exactly one session is focused once the first one is registered. Sessions
/// are never removed.
pub struct SessionMultiplexer {
    input: PhysicalInput,
    output: PhysicalOutput,
    settings: MultiplexerSettings,
    sessions: Vec<SessionRecord>,
    cursor: usize,
}

impl std::fmt::Debug for SessionMultiplexer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionMultiplexer")
            .field("sessions", &self.sessions.len())
            .field("cursor", &self.cursor)
            .finish_non_exhaustive()
    }
}

impl SessionMultiplexer {
    /// Create a multiplexer with default settings.
    pub fn new(input: PhysicalInput, output: PhysicalOutput) -> Self {
        Self::with_settings(input, output, MultiplexerSettings::default())
    }

    /// Create a multiplexer with custom settings.
    pub fn with_settings(
        input: PhysicalInput,
        output: PhysicalOutput,
        settings: MultiplexerSettings,
    ) -> Self {
        Self {
            input,
            output,
            settings,
            sessions: Vec::new(),
            cursor: 0,
        }
    }

    /// Register a session built by `factory`.
    ///
    /// The factory receives the session's own router pair and must keep it.
    /// The first session ever registered is focused immediately. A failing
    /// factory leaves the multiplexer unchanged.
    pub fn register<E, F>(&mut self, name: impl Into<String>, factory: F) -> Result<SessionId>
    where
        E: SessionEngine + 'static,
        F: FnOnce(SessionIo) -> anyhow::Result<E>,
    {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(Error::InvalidSessionName(name));
        }
        if self.settings.duplicate_names == DuplicateNames::Reject
            && self.sessions.iter().any(|s| s.name == name)
        {
            return Err(Error::DuplicateSessionName(name));
        }

        let input = InputRouter::new(self.input.clone(), name.clone());
        let output = OutputRouter::new(self.output.clone(), name.clone());
        let id = SessionId::new();
        let io = SessionIo {
            id,
            name: name.clone(),
            input: input.handle(),
            output: output.handle(),
        };

        let engine = factory(io).map_err(|e| Error::EngineConstruction {
            name: name.clone(),
            reason: format!("{e:#}"),
        })?;

        self.sessions.push(SessionRecord {
            id,
            name,
            engine: Box::new(engine),
            input,
            output,
            exited: false,
        });

        let index = self.sessions.len() - 1;
        if index == 0 {
            self.cursor = 0;
            self.sessions[0].set_active(true);
        }

        info!(
            "Session registered: id={}, name='{}', index={}, focused={}",
            id,
            self.sessions[index].name,
            index,
            index == 0
        );

        Ok(id)
    }

    /// Move focus to the next session in registration order, wrapping around.
    ///
    /// Deactivates the current pair, advances the cursor, activates the next
    /// pair and asks its engine to redraw the prompt, in that order.
    pub fn rotate_focus(&mut self) -> Rotation {
        if self.sessions.len() < 2 {
            debug!(sessions = self.sessions.len(), "rotation skipped");
            return Rotation::Unchanged;
        }

        let from = self.sessions[self.cursor].id;
        self.sessions[self.cursor].set_active(false);

        self.cursor = (self.cursor + 1) % self.sessions.len();

        let next = &mut self.sessions[self.cursor];
        next.set_active(true);

        if self.settings.focus_banner {
            let banner = format!("\r\n[{}]\r\n", next.name);
            if let Err(e) = next.output.send(banner.as_bytes()) {
                warn!("Failed to write focus banner for '{}': {}", next.name, e);
            }
        }

        next.engine.redraw_prompt();

        info!(
            "Focus rotated: to='{}' (index {}), id={}",
            next.name, self.cursor, next.id
        );

        Rotation::Rotated { from, to: next.id }
    }

    /// Route a physical input chunk. Returns the session that received it.
    pub fn handle_data(&mut self, chunk: &[u8]) -> Option<SessionId> {
        let mut receiver = None;
        for record in &mut self.sessions {
            if record.input.on_data(chunk, &mut *record.engine) == Delivery::Forwarded {
                receiver = Some(record.id);
            }
        }
        if receiver.is_none() {
            debug!(bytes = chunk.len(), "input with no focused session");
        }
        receiver
    }

    /// Route physical end-of-stream. Returns the session that observed it.
    pub fn handle_end(&mut self) -> Option<SessionId> {
        let mut receiver = None;
        for record in &mut self.sessions {
            if record.input.on_end(&mut *record.engine) == Delivery::Forwarded {
                receiver = Some(record.id);
            }
        }
        info!(
            "Physical input ended, delivered to {:?}",
            receiver.map(|id| id.to_string())
        );
        receiver
    }

    /// Pass a new terminal size to every session.
    pub fn resize(&mut self, dimensions: Dimensions) {
        debug!(
            rows = dimensions.rows,
            cols = dimensions.cols,
            "resizing {} sessions",
            self.sessions.len()
        );
        for record in &mut self.sessions {
            record.engine.resize(dimensions);
        }
    }

    /// Record that a session's engine has stopped producing output.
    ///
    /// The session stays registered and keeps its place in the rotation.
    /// Returns false for an unknown id.
    pub fn mark_exited(&mut self, id: &SessionId) -> bool {
        match self.sessions.iter_mut().find(|record| record.id == *id) {
            Some(record) => {
                if !record.exited {
                    record.exited = true;
                    info!("Session exited: id={}, name='{}'", record.id, record.name);
                }
                true
            }
            None => {
                warn!("Exit reported for unknown session {}", id);
                false
            }
        }
    }

    /// Number of sessions that have not exited.
    pub fn live_count(&self) -> usize {
        self.sessions.iter().filter(|record| !record.exited).count()
    }

    /// True once at least one session is registered and all of them exited.
    pub fn all_exited(&self) -> bool {
        !self.sessions.is_empty() && self.live_count() == 0
    }

    /// The focused session, if any is registered.
    pub fn focused(&self) -> Option<SessionInfo> {
        self.sessions
            .get(self.cursor)
            .map(|record| record.info(self.cursor))
    }

    /// Focus state of a session.
    pub fn focus_state(&self, id: &SessionId) -> Option<FocusState> {
        self.sessions
            .iter()
            .find(|record| record.id == *id)
            .map(SessionRecord::focus)
    }

    /// Snapshot of all sessions in registration order.
    pub fn sessions(&self) -> Vec<SessionInfo> {
        self.sessions
            .iter()
            .enumerate()
            .map(|(index, record)| record.info(index))
            .collect()
    }

    /// Number of sessions whose input or output gate is open.
    pub fn active_count(&self) -> usize {
        self.sessions
            .iter()
            .filter(|record| record.input.is_active() || record.output.is_active())
            .count()
    }

    /// Input and output counters of a session.
    pub fn router_stats(&self, id: &SessionId) -> Option<(RouterStats, RouterStats)> {
        self.sessions
            .iter()
            .find(|record| record.id == *id)
            .map(|record| (record.input.stats(), record.output.stats()))
    }

    /// Number of registered sessions.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// True before the first registration.
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{EngineSpy, RecordingEngine};
    use termswitch_router::MemorySink;

    fn mux() -> (SessionMultiplexer, MemorySink) {
        let sink = MemorySink::new();
        let mux = SessionMultiplexer::new(PhysicalInput::detached(), PhysicalOutput::new(sink.clone()));
        (mux, sink)
    }

    fn register(mux: &mut SessionMultiplexer, name: &str) -> (SessionId, EngineSpy) {
        let spy = EngineSpy::new();
        let id = mux.register(name, RecordingEngine::factory(&spy)).unwrap();
        (id, spy)
    }

    #[test]
    fn test_empty_multiplexer() {
        let (mut mux, _) = mux();
        assert!(mux.is_empty());
        assert_eq!(mux.active_count(), 0);
        assert!(mux.focused().is_none());
        assert_eq!(mux.rotate_focus(), Rotation::Unchanged);
        assert_eq!(mux.handle_data(b"x"), None);
    }

    #[test]
    fn test_first_registration_is_focused() {
        let (mut mux, _) = mux();
        let (alpha, _) = register(&mut mux, "alpha");
        let (beta, _) = register(&mut mux, "beta");

        assert_eq!(mux.focus_state(&alpha), Some(FocusState::Active));
        assert_eq!(mux.focus_state(&beta), Some(FocusState::Inactive));
        assert_eq!(mux.focused().unwrap().name, "alpha");
        assert_eq!(mux.active_count(), 1);
    }

    #[test]
    fn test_single_session_rotation_is_noop() {
        let (mut mux, _) = mux();
        let (alpha, spy) = register(&mut mux, "alpha");

        assert_eq!(mux.rotate_focus(), Rotation::Unchanged);
        assert_eq!(mux.focus_state(&alpha), Some(FocusState::Active));
        assert_eq!(spy.redraws(), 0);
    }

    #[test]
    fn test_rotation_reports_ids_and_redraws() {
        let (mut mux, _) = mux();
        let (alpha, alpha_spy) = register(&mut mux, "alpha");
        let (beta, beta_spy) = register(&mut mux, "beta");

        let rotation = mux.rotate_focus();
        assert_eq!(rotation, Rotation::Rotated { from: alpha, to: beta });
        assert!(rotation.is_rotated());
        assert_eq!(beta_spy.redraws(), 1);
        assert_eq!(alpha_spy.redraws(), 0);
        assert_eq!(mux.active_count(), 1);
    }

    #[test]
    fn test_no_banner_by_default() {
        let (mut mux, sink) = mux();
        register(&mut mux, "alpha");
        register(&mut mux, "beta");

        mux.rotate_focus();
        assert!(sink.contents().is_empty());
    }

    #[test]
    fn test_focus_banner_enabled() {
        let sink = MemorySink::new();
        let settings = MultiplexerSettings {
            focus_banner: true,
            ..Default::default()
        };
        let mut mux = SessionMultiplexer::with_settings(
            PhysicalInput::detached(),
            PhysicalOutput::new(sink.clone()),
            settings,
        );
        register(&mut mux, "alpha");
        register(&mut mux, "beta");

        mux.rotate_focus();
        assert_eq!(sink.contents_lossy(), "\r\n[beta]\r\n");
    }

    #[test]
    fn test_input_reaches_only_focused() {
        let (mut mux, _) = mux();
        let (alpha, alpha_spy) = register(&mut mux, "alpha");
        let (_, beta_spy) = register(&mut mux, "beta");

        assert_eq!(mux.handle_data(b"ls\n"), Some(alpha));
        assert_eq!(alpha_spy.received(), "ls\n");
        assert!(beta_spy.chunks().is_empty());

        let (input_stats, _) = mux.router_stats(&alpha).unwrap();
        assert_eq!(input_stats.forwarded, 1);
    }

    #[test]
    fn test_end_reaches_only_focused() {
        let (mut mux, _) = mux();
        let (alpha, alpha_spy) = register(&mut mux, "alpha");
        let (_, beta_spy) = register(&mut mux, "beta");

        assert_eq!(mux.handle_end(), Some(alpha));
        assert!(alpha_spy.ended());
        assert!(!beta_spy.ended());
    }

    #[test]
    fn test_empty_name_rejected() {
        let (mut mux, _) = mux();
        let spy = EngineSpy::new();
        let result = mux.register("  ", RecordingEngine::factory(&spy));
        assert!(matches!(result, Err(Error::InvalidSessionName(_))));
        assert!(mux.is_empty());
    }

    #[test]
    fn test_duplicate_names_allowed_by_default() {
        let (mut mux, _) = mux();
        let (first, _) = register(&mut mux, "alpha");
        let (second, _) = register(&mut mux, "alpha");

        assert_ne!(first, second);
        assert_eq!(mux.len(), 2);
    }

    #[test]
    fn test_duplicate_names_rejected_by_policy() {
        let settings = MultiplexerSettings {
            duplicate_names: DuplicateNames::Reject,
            ..Default::default()
        };
        let mut mux = SessionMultiplexer::with_settings(
            PhysicalInput::detached(),
            PhysicalOutput::new(MemorySink::new()),
            settings,
        );
        register(&mut mux, "alpha");

        let spy = EngineSpy::new();
        let result = mux.register("alpha", RecordingEngine::factory(&spy));
        assert!(matches!(result, Err(Error::DuplicateSessionName(name)) if name == "alpha"));
        assert_eq!(mux.len(), 1);
    }

    #[test]
    fn test_failing_factory_registers_nothing() {
        let (mut mux, _) = mux();
        let result = mux.register("broken", |_io| -> anyhow::Result<RecordingEngine> {
            Err(anyhow::anyhow!("no such command"))
        });

        match result {
            Err(Error::EngineConstruction { name, reason }) => {
                assert_eq!(name, "broken");
                assert!(reason.contains("no such command"));
            }
            other => panic!("expected EngineConstruction, got {other:?}"),
        }
        assert!(mux.is_empty());
        assert_eq!(mux.active_count(), 0);

        // The next successful registration is still the first one
        let (alpha, _) = register(&mut mux, "alpha");
        assert_eq!(mux.focus_state(&alpha), Some(FocusState::Active));
    }

    #[test]
    fn test_factory_sees_registered_id() {
        let (mut mux, _) = mux();
        let mut seen = None;
        let id = mux
            .register("alpha", |io: SessionIo| {
                seen = Some(io.id);
                RecordingEngine::factory(&EngineSpy::new())(io)
            })
            .unwrap();
        assert_eq!(seen, Some(id));
    }

    #[test]
    fn test_resize_reaches_every_session() {
        let (mut mux, _) = mux();
        let (_, alpha_spy) = register(&mut mux, "alpha");
        let (_, beta_spy) = register(&mut mux, "beta");

        mux.resize(Dimensions::new(50, 132));

        assert_eq!(alpha_spy.resizes(), vec![Dimensions::new(50, 132)]);
        assert_eq!(beta_spy.resizes(), vec![Dimensions::new(50, 132)]);
    }

    #[test]
    fn test_all_exited() {
        let (mut mux, _) = mux();
        assert!(!mux.all_exited());

        let (alpha, _) = register(&mut mux, "alpha");
        let (beta, _) = register(&mut mux, "beta");
        assert_eq!(mux.live_count(), 2);

        assert!(mux.mark_exited(&alpha));
        assert!(mux.mark_exited(&alpha));
        assert_eq!(mux.live_count(), 1);
        assert!(!mux.all_exited());

        assert!(mux.mark_exited(&beta));
        assert!(mux.all_exited());
        assert!(!mux.mark_exited(&SessionId::new()));

        // Exited sessions keep their place in the rotation
        assert!(mux.rotate_focus().is_rotated());
        assert_eq!(mux.focused().unwrap().name, "beta");
    }

    #[test]
    fn test_sessions_snapshot_order() {
        let (mut mux, _) = mux();
        register(&mut mux, "alpha");
        register(&mut mux, "beta");
        register(&mut mux, "gamma");
        mux.rotate_focus();

        let sessions = mux.sessions();
        let names: Vec<&str> = sessions.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["alpha", "beta", "gamma"]);
        assert_eq!(sessions[1].focus, FocusState::Active);
        assert_eq!(sessions[2].index, 2);
    }
}
