//! The game session: the one context object tying the specification
//! cache, the technology graph, and the players together.
//!
//! There is no process-global state; everything a running game needs
//! hangs off a [`GameSession`]. Starting a new game is atomic: the
//! technology graph is built and the catalog populated before either is
//! committed, so a failure leaves the session cleanly uninitialized
//! rather than half-started.

use armada_core::cache::{CacheError, SpecCache};
use armada_core::player::{Player, PlayerId};
use armada_tech::{TechDeclaration, TechError, TechGraph, TechHandle, Technology};

use crate::loader::DataLoadError;

/// Session-level failures.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// No game is running (never started, or the last start failed).
    #[error("no game session is running")]
    NotInitialized,

    #[error("unknown player {0:?}")]
    UnknownPlayer(PlayerId),

    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error(transparent)]
    Tech(#[from] TechError),

    #[error(transparent)]
    Data(#[from] DataLoadError),
}

/// One running game.
#[derive(Debug)]
pub struct GameSession {
    cache: SpecCache,
    graph: Option<TechGraph>,
    players: Vec<Player>,
    running: bool,
}

impl GameSession {
    /// Create an idle session. Nothing is usable until
    /// [`GameSession::begin_new_game`] succeeds.
    pub fn new() -> Self {
        Self {
            cache: SpecCache::new(0),
            graph: None,
            players: Vec::new(),
            running: false,
        }
    }

    /// Tear down any running game and start a fresh one.
    ///
    /// The previous game is invalidated up front; the graph is built and
    /// the catalog populated into staging state before anything is
    /// committed, so on error the session stays uninitialized instead of
    /// half-started.
    pub fn begin_new_game(
        &mut self,
        seed: u64,
        declarations: Vec<TechDeclaration>,
        players: Vec<Player>,
    ) -> Result<(), SessionError> {
        self.running = false;
        self.graph = None;
        self.players.clear();

        let graph = TechGraph::build(declarations)?;

        self.cache.reset();
        self.cache.set_seed(seed);
        self.cache.populate()?;
        graph.validate_unlocks(&self.cache)?;

        self.graph = Some(graph);
        self.players = players;
        self.running = true;
        Ok(())
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    fn ensure_running(&self) -> Result<(), SessionError> {
        if self.running {
            Ok(())
        } else {
            Err(SessionError::NotInitialized)
        }
    }

    /// The populated specification cache.
    pub fn cache(&self) -> Result<&SpecCache, SessionError> {
        self.ensure_running()?;
        Ok(&self.cache)
    }

    /// The technology graph.
    pub fn graph(&self) -> Result<&TechGraph, SessionError> {
        self.ensure_running()?;
        self.graph.as_ref().ok_or(SessionError::NotInitialized)
    }

    /// Mutable access to the graph, for extending the Future Tech chain.
    pub fn graph_mut(&mut self) -> Result<&mut TechGraph, SessionError> {
        self.ensure_running()?;
        self.graph.as_mut().ok_or(SessionError::NotInitialized)
    }

    /// Look a technology up by display name.
    pub fn technology(&self, name: &str) -> Result<(TechHandle, &Technology), SessionError> {
        let graph = self.graph()?;
        let handle = graph.resolve(name)?;
        Ok((handle, graph.get(handle)?))
    }

    pub fn all_players(&self) -> &[Player] {
        &self.players
    }

    pub fn player(&self, id: PlayerId) -> Result<&Player, SessionError> {
        self.ensure_running()?;
        self.players
            .iter()
            .find(|p| p.id == id)
            .ok_or(SessionError::UnknownPlayer(id))
    }
}

impl Default for GameSession {
    fn default() -> Self {
        Self::new()
    }
}

// ===========================================================================
// Tests
// ===========================================================================
