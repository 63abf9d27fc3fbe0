use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};

use crate::platform::{Platform, Subsystems};

#[derive(Debug, Default)]
struct GuardState {
    initialized: bool,
    subsystems: Subsystems,
}

/// Tracks whether native subsystems are up.
///
/// Only the run that initialized subsystems quits them. A run that finds them
/// already up (a nested run) borrows them and brings up only what it asked
/// for that is still missing; it quits that extra part on release. Tests
/// inject their own guard so parallel runs do not observe each other.
#[derive(Debug, Default)]
pub struct SubsystemGuard {
    state: Mutex<GuardState>,
}

/// Result of [`SubsystemGuard::acquire`].
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub(crate) struct Acquired {
    /// True when this call initialized the subsystems and must release them.
    pub owned: bool,
    /// Subsystems a borrowing run brought up on top of the borrowed set.
    pub added: Subsystems,
    /// Everything available to this run.
    pub subsystems: Subsystems,
}

impl Acquired {
    /// Nothing held; releasing it is a no-op.
    pub(crate) const NONE: Acquired = Acquired {
        owned: false,
        added: Subsystems::NONE,
        subsystems: Subsystems::NONE,
    };
}

impl SubsystemGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process-wide guard used by frameworks that were not given one.
    pub fn global() -> Arc<SubsystemGuard> {
        static GLOBAL: OnceLock<Arc<SubsystemGuard>> = OnceLock::new();
        Arc::clone(GLOBAL.get_or_init(|| Arc::new(SubsystemGuard::new())))
    }

    pub fn is_initialized(&self) -> bool {
        self.lock().initialized
    }

    pub fn subsystems(&self) -> Subsystems {
        self.lock().subsystems
    }

    fn lock(&self) -> MutexGuard<'_, GuardState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn acquire(
        &self,
        platform: &mut dyn Platform,
        requested: Subsystems,
    ) -> anyhow::Result<Acquired> {
        let mut state = self.lock();

        if state.initialized {
            let missing = requested.difference(state.subsystems);
            if missing.is_empty() {
                log::debug!("subsystems already initialized ({}); reusing", state.subsystems);
                return Ok(Acquired {
                    owned: false,
                    added: Subsystems::NONE,
                    subsystems: state.subsystems,
                });
            }

            log::debug!(
                "subsystems already initialized ({}); bringing up {missing}",
                state.subsystems
            );
            platform.init_subsystems(missing)?;
            state.subsystems = state.subsystems.union(missing);
            log::info!("subsystems initialized: {missing} (now {})", state.subsystems);

            return Ok(Acquired {
                owned: false,
                added: missing,
                subsystems: state.subsystems,
            });
        }

        log::debug!("initializing subsystems: {requested}");
        platform.init_subsystems(requested)?;

        state.initialized = true;
        state.subsystems = requested;
        log::info!("subsystems initialized: {requested}");

        Ok(Acquired {
            owned: true,
            added: Subsystems::NONE,
            subsystems: requested,
        })
    }

    pub(crate) fn release(&self, platform: &mut dyn Platform, acquired: Acquired) {
        let mut state = self.lock();
        if !state.initialized {
            return;
        }

        if !acquired.owned {
            if !acquired.added.is_empty() {
                platform.quit_subsystems(acquired.added);
                state.subsystems = state.subsystems.difference(acquired.added);
                log::info!("subsystems shut down: {}", acquired.added);
            }
            log::debug!("subsystems not owned by this run; leaving {} up", state.subsystems);
            return;
        }

        platform.quit_subsystems(state.subsystems);
        log::info!("subsystems shut down: {}", state.subsystems);
        *state = GuardState::default();
    }
}
