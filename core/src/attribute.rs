use std::rc::Rc;

use serde::Deserialize;
use serde::Serialize;

use super::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReadMode {
  /// Values may be converted to float and optionally normalized.
  Pointer,
  /// Values stay integer on the GPU side. Never normalized.
  IntegerPointer
}

/// The read-shape of one pointer call, as handed to the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AttributeLayout {
  pub components: u32,
  pub kind: ScalarKind,
  pub normalized: bool
}

/// Full control over how an existing buffer is read: mode, component
/// count, normalization and instancing divisor. The buffer is shared, not
/// owned, so one FlatBuffer can back several bindings.
pub struct AttributeSpec<B: Backend> {
  pub buffer: Rc<FlatBuffer<B>>,
  pub mode: ReadMode,
  pub components: u32,
  pub normalized: bool,
  pub divisor: u32
}

pub struct AttributeBinding<B: Backend> {
  buffer: Rc<FlatBuffer<B>>,
  location: u32,
  mode: ReadMode,
  components: u32,
  vertex_count: u32,
  normalized: bool,
  divisor: u32
}

impl<B: Backend> std::fmt::Debug for AttributeBinding<B> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("AttributeBinding")
      .field("buffer", &self.buffer)
      .field("location", &self.location)
      .field("mode", &self.mode)
      .field("components", &self.components)
      .field("vertex_count", &self.vertex_count)
      .field("normalized", &self.normalized)
      .field("divisor", &self.divisor)
      .finish()
  }
}

impl<B: Backend> AttributeBinding<B> {
  /// Tuple-per-vertex plain data: always an unnormalized Float32 pointer
  /// read with one tuple element per component.
  pub fn from_rows(device: &B::Device, location: u32, rows: &[impl AsRef<[f32]>]) -> Result<Self, GeometryError> {
    let (data, shape) = ravel(rows);
    Self::from_raveled(device, location, data, shape)
  }

  /// Value-per-vertex plain data: a single-component Float32 pointer read.
  pub fn from_flat(device: &B::Device, location: u32, values: &[f32]) -> Result<Self, GeometryError> {
    let buffer = FlatBuffer::new(device, TypedData::from_f32_slice(values), BufferUsage::VERTEX, None)?;
    Self::from_parts(buffer, location, ReadMode::Pointer, 1, false, 0)
  }

  pub fn from_spec(location: u32, spec: AttributeSpec<B>) -> Result<Self, GeometryError> {
    let AttributeSpec {
      buffer,
      mode,
      components,
      normalized,
      divisor
    } = spec;
    let normalized = match mode {
      ReadMode::Pointer => normalized,
      ReadMode::IntegerPointer => {
        if normalized {
          log::warn!("normalization is ignored for integer attribute reads at location {}", location);
        }
        false
      }
    };
    if mode == ReadMode::IntegerPointer && !buffer.kind().is_integer() {
      return Err(GeometryError::IntegerReadOfFloatData(buffer.kind()));
    }
    Self::from_parts(buffer, location, mode, components, normalized, divisor)
  }

  pub(crate) fn from_raveled(device: &B::Device, location: u32, data: Vec<f32>, shape: Shape) -> Result<Self, GeometryError> {
    // An empty row set carries no shape; read it as one component so the
    // binding stays valid with a vertex count of zero.
    let components = if shape.outer == 0 { 1 } else { shape.inner as u32 };
    let buffer = FlatBuffer::new(device, TypedData::Float32(data), BufferUsage::VERTEX, None)?;
    Self::from_parts(buffer, location, ReadMode::Pointer, components, false, 0)
  }

  fn from_parts(buffer: Rc<FlatBuffer<B>>, location: u32, mode: ReadMode, components: u32, normalized: bool, divisor: u32) -> Result<Self, GeometryError> {
    if components < 1 || components > 4 {
      return Err(GeometryError::InvalidComponents(components));
    }
    let len = buffer.len();
    if len % components as usize != 0 {
      return Err(GeometryError::MisalignedBuffer { len, components });
    }
    let vertex_count = (len / components as usize) as u32;
    Ok(Self {
      buffer,
      location,
      mode,
      components,
      vertex_count,
      normalized,
      divisor
    })
  }

  pub fn buffer(&self) -> &Rc<FlatBuffer<B>> {
    &self.buffer
  }

  pub fn location(&self) -> u32 {
    self.location
  }

  pub fn mode(&self) -> ReadMode {
    self.mode
  }

  pub fn components(&self) -> u32 {
    self.components
  }

  pub fn vertex_count(&self) -> u32 {
    self.vertex_count
  }

  pub fn normalized(&self) -> bool {
    self.normalized
  }

  pub fn divisor(&self) -> u32 {
    self.divisor
  }

  pub fn layout(&self) -> AttributeLayout {
    AttributeLayout {
      components: self.components,
      kind: self.buffer.kind(),
      normalized: self.normalized
    }
  }
}
