use thiserror::Error;

use super::*;

/// A native construction call that failed, with the diagnostic text the
/// backend produced for it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("native {call} call failed: {message}")]
pub struct DeviceError {
  pub call: &'static str,
  pub message: String
}

impl DeviceError {
  pub fn new(call: &'static str, message: impl Into<String>) -> Self {
    Self {
      call,
      message: message.into()
    }
  }
}

#[derive(Debug, Error)]
pub enum GeometryError {
  #[error("attribute location {0} is bound more than once")]
  DuplicateLocation(u32),

  #[error("an attribute must read 1 to 4 components per vertex, got {0}")]
  InvalidComponents(u32),

  #[error("a buffer of {len} values cannot be read as {components} components per vertex")]
  MisalignedBuffer { len: usize, components: u32 },

  #[error("element tuples must hold 2 or 3 indices, got {0}")]
  InvalidElementArity(usize),

  #[error("element data must use an unsigned integer kind, got {0:?}")]
  InvalidIndexKind(ScalarKind),

  #[error("integer attribute read of {0:?} data")]
  IntegerReadOfFloatData(ScalarKind),

  #[error("buffer holds {existing:?} data, replacement is {replacement:?}")]
  KindMismatch {
    existing: ScalarKind,
    replacement: ScalarKind
  },

  #[error("native state has been invalidated and not restored")]
  Invalidated,

  #[error(transparent)]
  Device(#[from] DeviceError)
}
