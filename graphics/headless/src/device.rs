use std::cell::{Cell, RefCell};
use std::rc::Rc;

use weft_core::{
    AttributeLayout, BufferUsage, ClearMask, ClearValue, Device, DeviceError, Extent, Primitive,
    ScalarKind, UniformValue,
};

use crate::backend::HeadlessBackend;
use crate::call::{native_setter, Call};
use crate::handles::{HeadlessBuffer, HeadlessProgram, HeadlessTarget, HeadlessVertexArray};

#[derive(Debug)]
pub(crate) struct DeviceShared {
    calls: RefCell<Vec<Call>>,
    next_id: Cell<u64>,
    generation: Cell<u64>,
    array_buffer: Cell<Option<u64>>,
    fail_next_allocation: Cell<bool>,
}

impl DeviceShared {
    pub(crate) fn record(&self, call: Call) {
        self.calls.borrow_mut().push(call);
    }

    fn alloc_id(&self) -> u64 {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        id
    }

    fn check_allocation(&self, call: &'static str) -> Result<(), DeviceError> {
        if self.fail_next_allocation.replace(false) {
            return Err(DeviceError::new(call, "allocation failure injected"));
        }
        Ok(())
    }
}

/// A device that performs no GPU work at all: every native call is
/// appended to an in-memory log. Handles are ids tagged with a context
/// generation, so losing the context is just bumping a counter.
pub struct HeadlessDevice {
    shared: Rc<DeviceShared>,
}

impl Default for HeadlessDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessDevice {
    pub fn new() -> Self {
        Self {
            shared: Rc::new(DeviceShared {
                calls: RefCell::new(Vec::new()),
                next_id: Cell::new(1),
                generation: Cell::new(0),
                array_buffer: Cell::new(None),
                fail_next_allocation: Cell::new(false),
            }),
        }
    }

    /// A fresh draw target. Targets come from the surface/framebuffer
    /// collaborator in a real backend, so this is a plain constructor and
    /// records nothing.
    pub fn new_target(&self) -> HeadlessTarget {
        HeadlessTarget {
            id: self.shared.alloc_id(),
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.shared.calls.borrow().clone()
    }

    pub fn take_calls(&self) -> Vec<Call> {
        self.shared.calls.borrow_mut().drain(..).collect()
    }

    pub fn count_calls(&self, matcher: impl Fn(&Call) -> bool) -> usize {
        self.shared.calls.borrow().iter().filter(|call| matcher(call)).count()
    }

    /// Invalidates every outstanding handle, as a lost context would.
    pub fn lose_context(&self) {
        let generation = self.shared.generation.get() + 1;
        self.shared.generation.set(generation);
        self.shared.array_buffer.set(None);
        log::debug!("headless context lost, now at generation {}", generation);
    }

    /// The next create call fails with an injected DeviceError.
    pub fn fail_next_allocation(&self) {
        self.shared.fail_next_allocation.set(true);
    }
}

impl Device<HeadlessBackend> for HeadlessDevice {
    unsafe fn create_buffer(
        &self,
        usage: BufferUsage,
        data: &[u8],
        name: Option<&str>,
    ) -> Result<HeadlessBuffer, DeviceError> {
        self.shared.check_allocation("createBuffer")?;
        let id = self.shared.alloc_id();
        if let Some(name) = name {
            log::trace!("createBuffer {} ({})", id, name);
        }
        self.shared.record(Call::CreateBuffer {
            id,
            usage,
            byte_len: data.len(),
        });
        Ok(HeadlessBuffer {
            id,
            generation: self.shared.generation.get(),
            usage,
            byte_len: Cell::new(data.len()),
            shared: self.shared.clone(),
        })
    }

    unsafe fn upload_buffer(&self, buffer: &HeadlessBuffer, data: &[u8]) {
        buffer.byte_len.set(data.len());
        self.shared.record(Call::UploadBuffer {
            id: buffer.id,
            byte_len: data.len(),
        });
    }

    unsafe fn buffer_is_valid(&self, buffer: &HeadlessBuffer) -> bool {
        buffer.generation == self.shared.generation.get()
    }

    unsafe fn create_vertex_array(&self, name: Option<&str>) -> Result<HeadlessVertexArray, DeviceError> {
        self.shared.check_allocation("createVertexArray")?;
        let id = self.shared.alloc_id();
        if let Some(name) = name {
            log::trace!("createVertexArray {} ({})", id, name);
        }
        self.shared.record(Call::CreateVertexArray { id });
        Ok(HeadlessVertexArray {
            id,
            generation: self.shared.generation.get(),
            shared: self.shared.clone(),
        })
    }

    unsafe fn bind_vertex_array(&self, vertex_array: Option<&HeadlessVertexArray>) {
        self.shared.record(Call::BindVertexArray {
            id: vertex_array.map(|vertex_array| vertex_array.id),
        });
    }

    unsafe fn vertex_array_is_valid(&self, vertex_array: &HeadlessVertexArray) -> bool {
        vertex_array.generation == self.shared.generation.get()
    }

    unsafe fn bind_array_buffer(&self, buffer: Option<&HeadlessBuffer>) {
        self.shared.array_buffer.set(buffer.map(|buffer| buffer.id));
        self.shared.record(Call::BindArrayBuffer {
            id: buffer.map(|buffer| buffer.id),
        });
    }

    unsafe fn enable_vertex_attribute(&self, location: u32) {
        self.shared.record(Call::EnableVertexAttribute { location });
    }

    unsafe fn vertex_attribute_pointer(&self, location: u32, layout: &AttributeLayout) {
        let buffer = self
            .shared
            .array_buffer
            .get()
            .expect("pointer call without a bound array buffer");
        self.shared.record(Call::VertexAttributePointer {
            location,
            buffer,
            components: layout.components,
            kind: layout.kind,
            normalized: layout.normalized,
        });
    }

    unsafe fn vertex_attribute_int_pointer(&self, location: u32, layout: &AttributeLayout) {
        debug_assert!(!layout.normalized, "integer reads are never normalized");
        let buffer = self
            .shared
            .array_buffer
            .get()
            .expect("pointer call without a bound array buffer");
        self.shared.record(Call::VertexAttributeIntPointer {
            location,
            buffer,
            components: layout.components,
            kind: layout.kind,
        });
    }

    unsafe fn vertex_attribute_divisor(&self, location: u32, divisor: u32) {
        self.shared.record(Call::VertexAttributeDivisor { location, divisor });
    }

    unsafe fn bind_index_buffer(&self, buffer: &HeadlessBuffer) {
        self.shared.record(Call::BindIndexBuffer { id: buffer.id });
    }

    unsafe fn draw(&self, primitive: Primitive, first: u32, count: u32, instances: u32) {
        self.shared.record(Call::Draw {
            primitive,
            first,
            count,
            instances,
        });
    }

    unsafe fn draw_indexed(&self, primitive: Primitive, index_kind: ScalarKind, count: u32, instances: u32) {
        self.shared.record(Call::DrawIndexed {
            primitive,
            kind: index_kind,
            count,
            instances,
        });
    }

    unsafe fn bind_target(&self, target: &HeadlessTarget, extent: Extent) {
        self.shared.record(Call::BindTarget {
            id: target.id,
            extent,
        });
    }

    unsafe fn clear(&self, mask: ClearMask, value: &ClearValue) {
        self.shared.record(Call::Clear { mask, value: *value });
    }

    unsafe fn create_program(
        &self,
        vertex_source: &str,
        fragment_source: &str,
        name: Option<&str>,
    ) -> Result<HeadlessProgram, DeviceError> {
        self.shared.check_allocation("createProgram")?;
        let id = self.shared.alloc_id();
        if let Some(name) = name {
            log::trace!("createProgram {} ({})", id, name);
        }
        let attributes = scan_declarations(vertex_source, "in");
        let mut uniforms = scan_declarations(vertex_source, "uniform");
        for uniform in scan_declarations(fragment_source, "uniform") {
            if !uniforms.contains(&uniform) {
                uniforms.push(uniform);
            }
        }
        self.shared.record(Call::CreateProgram { id });
        Ok(HeadlessProgram {
            id,
            attributes,
            uniforms,
            shared: self.shared.clone(),
        })
    }

    unsafe fn use_program(&self, program: &HeadlessProgram) {
        self.shared.record(Call::UseProgram { id: program.id });
    }

    unsafe fn attribute_location(&self, program: &HeadlessProgram, name: &str) -> Option<u32> {
        program
            .attributes
            .iter()
            .position(|attribute| attribute == name)
            .map(|position| position as u32)
    }

    unsafe fn uniform_location(&self, program: &HeadlessProgram, name: &str) -> Option<u32> {
        program
            .uniforms
            .iter()
            .position(|uniform| uniform == name)
            .map(|position| position as u32)
    }

    unsafe fn set_uniform(&self, program: &HeadlessProgram, location: u32, value: &UniformValue) {
        self.shared.record(Call::SetUniform {
            program: program.id,
            location,
            setter: native_setter(value),
        });
    }
}

// Just enough GLSL to hand out locations in declaration order. Layout and
// interpolation qualifiers are not understood; declarations must start the
// line with the storage qualifier.
fn scan_declarations(source: &str, qualifier: &str) -> Vec<String> {
    let mut names = Vec::new();
    for line in source.lines() {
        let line = line.trim().trim_end_matches(';');
        let mut tokens = line.split_whitespace();
        if tokens.next() != Some(qualifier) {
            continue;
        }
        let _ty = tokens.next();
        if let Some(name) = tokens.next() {
            names.push(name.to_string());
        }
    }
    names
}
