use thiserror::Error;

pub type EngineResult<T> = Result<T, EngineError>;

/// Failures that end a run before the frame loop is entered, plus configuration errors.
///
/// Faults raised by game callbacks are not engine errors; they are contained by the
/// session controller and reported through [`crate::framework::GameFault`].
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("failed to initialize platform subsystems: {0}")]
    SubsystemInit(String),

    #[error("failed to set window mode {width}x{height}")]
    WindowMode { width: u32, height: u32 },

    #[error("window is not open after the game finished loading")]
    WindowClosedAfterLoad,

    #[error("config error: {0}")]
    Config(String),
}
