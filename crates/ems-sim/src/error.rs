use ems_core::EmsError;
use ems_dispatch::DispatchError;
use ems_motion::MotionError;
use ems_world::WorldError;
use thiserror::Error;

/// Anything that aborts a run.  Illegal decisions are not errors; they are
/// ignored and logged.
#[derive(Debug, Error)]
pub enum SimError {
    #[error("simulation configuration error: {0}")]
    Config(#[from] EmsError),

    #[error("world state error: {0}")]
    World(#[from] WorldError),

    #[error("decision application failed: {0}")]
    Dispatch(#[from] DispatchError),

    #[error("motion step failed: {0}")]
    Motion(#[from] MotionError),
}

pub type SimResult<T> = Result<T, SimError>;
