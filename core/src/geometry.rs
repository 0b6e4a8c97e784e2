use std::cell::Ref;
use std::cell::RefCell;
use std::rc::Rc;

use smallvec::SmallVec;

use super::*;

enum PendingAttribute<B: Backend> {
  Raveled { data: Vec<f32>, shape: Shape },
  Flat(Vec<f32>),
  Spec(AttributeSpec<B>)
}

enum PendingElements<B: Backend> {
  Raveled { data: Vec<u32>, shape: Shape },
  Flat(Vec<u32>),
  Typed { data: TypedData, primitive: Primitive },
  Set(ElementSet<B>)
}

/// Declarative description of one draw unit. Attribute entries are keyed
/// by shader location; symbolic names must be resolved to locations up
/// front (see `Device::attribute_location`), which makes an invalid key
/// unrepresentable rather than a runtime failure.
pub struct GeometryBuilder<B: Backend> {
  entries: SmallVec<[(u32, PendingAttribute<B>); 8]>,
  elements: Option<PendingElements<B>>,
  primitive: Option<Primitive>,
  name: Option<String>
}

impl<B: Backend> Default for GeometryBuilder<B> {
  fn default() -> Self {
    Self::new()
  }
}

impl<B: Backend> GeometryBuilder<B> {
  pub fn new() -> Self {
    Self {
      entries: SmallVec::new(),
      elements: None,
      primitive: None,
      name: None
    }
  }

  pub fn name(mut self, name: &str) -> Self {
    self.name = Some(name.to_string());
    self
  }

  /// Tuple-per-vertex plain data; raveled immediately, read as Float32.
  pub fn attribute_rows(mut self, location: u32, rows: &[impl AsRef<[f32]>]) -> Self {
    let (data, shape) = ravel(rows);
    self.entries.push((location, PendingAttribute::Raveled { data, shape }));
    self
  }

  /// Value-per-vertex plain data; read as single-component Float32.
  pub fn attribute_flat(mut self, location: u32, values: &[f32]) -> Self {
    self.entries.push((location, PendingAttribute::Flat(values.to_vec())));
    self
  }

  /// An explicit read-shape over an existing (possibly shared) buffer.
  pub fn attribute(mut self, location: u32, spec: AttributeSpec<B>) -> Self {
    self.entries.push((location, PendingAttribute::Spec(spec)));
    self
  }

  /// Index tuples; the tuple arity picks the primitive.
  pub fn elements_rows(mut self, rows: &[impl AsRef<[u32]>]) -> Self {
    let (data, shape) = ravel(rows);
    self.elements = Some(PendingElements::Raveled { data, shape });
    self
  }

  /// A flat list of point indices.
  pub fn elements_flat(mut self, indices: &[u32]) -> Self {
    self.elements = Some(PendingElements::Flat(indices.to_vec()));
    self
  }

  /// Typed index data with an explicit primitive.
  pub fn elements_typed(mut self, data: TypedData, primitive: Primitive) -> Self {
    self.elements = Some(PendingElements::Typed { data, primitive });
    self
  }

  /// A prebuilt element set, shared as-is.
  pub fn elements(mut self, elements: ElementSet<B>) -> Self {
    self.elements = Some(PendingElements::Set(elements));
    self
  }

  /// Primitive for non-indexed drawing. An element set's primitive always
  /// wins over this.
  pub fn primitive(mut self, primitive: Primitive) -> Self {
    self.primitive = Some(primitive);
    self
  }

  pub fn assemble(mut self, device: &B::Device) -> Result<GeometryDescriptor<B>, GeometryError> {
    self.entries.sort_by_key(|(location, _)| *location);
    for pair in self.entries.windows(2) {
      if pair[0].0 == pair[1].0 {
        return Err(GeometryError::DuplicateLocation(pair[0].0));
      }
    }

    let mut attributes: SmallVec<[AttributeBinding<B>; 8]> = SmallVec::new();
    for (location, pending) in self.entries.drain(..) {
      let binding = match pending {
        PendingAttribute::Raveled { data, shape } => AttributeBinding::from_raveled(device, location, data, shape)?,
        PendingAttribute::Flat(values) => {
          let buffer = FlatBuffer::new(device, TypedData::Float32(values), BufferUsage::VERTEX, None)?;
          AttributeBinding::from_spec(location, AttributeSpec {
            buffer,
            mode: ReadMode::Pointer,
            components: 1,
            normalized: false,
            divisor: 0
          })?
        }
        PendingAttribute::Spec(spec) => AttributeBinding::from_spec(location, spec)?
      };
      attributes.push(binding);
    }

    let elements = match self.elements.take() {
      None => None,
      Some(PendingElements::Raveled { data, shape }) => {
        let primitive = Primitive::from_tuple_arity(shape.inner)
          .ok_or(GeometryError::InvalidElementArity(shape.inner))?;
        Some(ElementSet::from_typed(device, TypedData::UInt32(data), primitive)?)
      }
      Some(PendingElements::Flat(indices)) => Some(ElementSet::from_typed(device, TypedData::UInt32(indices), Primitive::Points)?),
      Some(PendingElements::Typed { data, primitive }) => Some(ElementSet::from_typed(device, data, primitive)?),
      Some(PendingElements::Set(set)) => Some(set)
    };

    let vertex_count = match &elements {
      Some(elements) => elements.count(),
      None => attributes.iter()
        .filter(|binding| binding.divisor() == 0)
        .map(|binding| binding.vertex_count())
        .min()
        .unwrap_or(0)
    };
    let instance_count = attributes.iter()
      .filter(|binding| binding.divisor() > 0)
      .map(|binding| binding.vertex_count() * binding.divisor())
      .min()
      .unwrap_or(0);
    let primitive = elements.as_ref()
      .map(|elements| elements.primitive())
      .or(self.primitive)
      .unwrap_or(Primitive::Triangles);

    // Empty geometry never touches the native layer; the missing handle is
    // the sentinel that drawing relies purely on a caller-supplied count.
    let native = if attributes.is_empty() && elements.is_none() {
      None
    } else {
      Some(build_vertex_array(device, &attributes, elements.as_ref(), self.name.as_deref())?)
    };
    log::trace!(
      "{}: assembled geometry with {} attributes, {} vertices, {} instances",
      B::name(),
      attributes.len(),
      vertex_count,
      instance_count
    );

    Ok(GeometryDescriptor {
      attributes,
      elements,
      primitive,
      vertex_count,
      instance_count,
      name: self.name,
      native: RefCell::new(native)
    })
  }
}

/// The aggregate submitted to a draw call: attribute bindings in location
/// order, an optional element set, and the counts derived from them at
/// assembly time.
pub struct GeometryDescriptor<B: Backend> {
  attributes: SmallVec<[AttributeBinding<B>; 8]>,
  elements: Option<ElementSet<B>>,
  primitive: Primitive,
  vertex_count: u32,
  instance_count: u32,
  name: Option<String>,
  native: RefCell<Option<B::VertexArray>>
}

impl<B: Backend> std::fmt::Debug for GeometryDescriptor<B> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("GeometryDescriptor")
      .field("attributes", &self.attributes)
      .field("elements", &self.elements)
      .field("primitive", &self.primitive)
      .field("vertex_count", &self.vertex_count)
      .field("instance_count", &self.instance_count)
      .field("name", &self.name)
      .finish()
  }
}

impl<B: Backend> GeometryDescriptor<B> {
  pub fn attributes(&self) -> &[AttributeBinding<B>] {
    &self.attributes
  }

  pub fn elements(&self) -> Option<&ElementSet<B>> {
    self.elements.as_ref()
  }

  pub fn primitive(&self) -> Primitive {
    self.primitive
  }

  pub fn vertex_count(&self) -> u32 {
    self.vertex_count
  }

  pub fn instance_count(&self) -> u32 {
    self.instance_count
  }

  pub fn name(&self) -> Option<&str> {
    self.name.as_deref()
  }

  /// No attributes and no elements: legal, and drawn only through
  /// `draw_count`.
  pub fn is_empty(&self) -> bool {
    self.attributes.is_empty() && self.elements.is_none()
  }

  /// The native handle, or None for empty geometry and for descriptors
  /// whose native state was invalidated and not yet restored.
  pub fn vertex_array(&self) -> Ref<'_, Option<B::VertexArray>> {
    self.native.borrow()
  }

  /// Restores every referenced buffer, then the vertex array itself.
  /// Buffers come first: the rebuilt vertex array captures their current
  /// native handles. Idempotent while everything is still valid.
  pub fn restore(&self, device: &B::Device) -> Result<(), GeometryError> {
    for buffer in self.distinct_buffers() {
      buffer.restore(device)?;
    }
    if self.is_empty() {
      return Ok(());
    }
    let mut native = self.native.borrow_mut();
    if let Some(handle) = native.as_ref() {
      if unsafe { device.vertex_array_is_valid(handle) } {
        log::trace!("{}: vertex array still valid, restore is a no-op", B::name());
        return Ok(());
      }
    }
    *native = Some(build_vertex_array(device, &self.attributes, self.elements.as_ref(), self.name.as_deref())?);
    Ok(())
  }

  /// Drops the native vertex array, keeping the logical descriptor.
  pub fn invalidate(&self) {
    *self.native.borrow_mut() = None;
  }

  /// Draws with the counts derived at assembly time. A zero vertex count
  /// issues no native call at all.
  pub fn draw(&self, device: &B::Device) -> Result<(), GeometryError> {
    self.issue(device, self.vertex_count)
  }

  /// Draws with a caller-supplied count; the only way to draw empty
  /// geometry, where the vertex shader computes everything from the
  /// vertex id.
  pub fn draw_count(&self, device: &B::Device, count: u32) -> Result<(), GeometryError> {
    self.issue(device, count)
  }

  fn issue(&self, device: &B::Device, count: u32) -> Result<(), GeometryError> {
    if count == 0 {
      return Ok(());
    }
    let native = self.native.borrow();
    if !self.is_empty() && native.is_none() {
      return Err(GeometryError::Invalidated);
    }
    unsafe {
      device.bind_vertex_array(native.as_ref());
      match &self.elements {
        Some(elements) => device.draw_indexed(self.primitive, elements.kind(), count, self.instance_count),
        None => device.draw(self.primitive, 0, count, self.instance_count)
      }
      device.bind_vertex_array(None);
    }
    Ok(())
  }

  fn distinct_buffers(&self) -> SmallVec<[&Rc<FlatBuffer<B>>; 8]> {
    let mut buffers: SmallVec<[&Rc<FlatBuffer<B>>; 8]> = SmallVec::new();
    for binding in &self.attributes {
      if !buffers.iter().any(|buffer| Rc::ptr_eq(buffer, binding.buffer())) {
        buffers.push(binding.buffer());
      }
    }
    if let Some(elements) = &self.elements {
      if !buffers.iter().any(|buffer| Rc::ptr_eq(buffer, elements.buffer())) {
        buffers.push(elements.buffer());
      }
    }
    buffers
  }
}

// The fixed marshaling sequence: for every binding in ascending location
// order, bind its buffer, enable the location and issue the pointer call
// matching the read mode, then capture the index buffer if present, then
// unbind everything so later native calls cannot leak into the array.
fn build_vertex_array<B: Backend>(
  device: &B::Device,
  attributes: &[AttributeBinding<B>],
  elements: Option<&ElementSet<B>>,
  name: Option<&str>
) -> Result<B::VertexArray, GeometryError> {
  let vertex_array = unsafe { device.create_vertex_array(name)? };
  unsafe {
    device.bind_vertex_array(Some(&vertex_array));
  }
  for binding in attributes {
    let handle = binding.buffer().handle();
    let buffer = match handle.as_ref() {
      Some(buffer) => buffer,
      None => {
        unsafe {
          device.bind_vertex_array(None);
        }
        return Err(GeometryError::Invalidated);
      }
    };
    unsafe {
      device.bind_array_buffer(Some(buffer));
      device.enable_vertex_attribute(binding.location());
      match binding.mode() {
        ReadMode::Pointer => device.vertex_attribute_pointer(binding.location(), &binding.layout()),
        ReadMode::IntegerPointer => device.vertex_attribute_int_pointer(binding.location(), &binding.layout())
      }
      if binding.divisor() != 0 {
        device.vertex_attribute_divisor(binding.location(), binding.divisor());
      }
    }
  }
  if let Some(elements) = elements {
    let handle = elements.buffer().handle();
    let buffer = match handle.as_ref() {
      Some(buffer) => buffer,
      None => {
        unsafe {
          device.bind_vertex_array(None);
        }
        return Err(GeometryError::Invalidated);
      }
    };
    unsafe {
      device.bind_index_buffer(buffer);
    }
  }
  unsafe {
    device.bind_vertex_array(None);
    device.bind_array_buffer(None);
  }
  Ok(vertex_array)
}
