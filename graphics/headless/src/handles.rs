use std::cell::Cell;
use std::rc::Rc;

use weft_core::BufferUsage;

use crate::call::Call;
use crate::device::DeviceShared;

pub struct HeadlessBuffer {
    pub(crate) id: u64,
    pub(crate) generation: u64,
    pub(crate) usage: BufferUsage,
    pub(crate) byte_len: Cell<usize>,
    pub(crate) shared: Rc<DeviceShared>,
}

impl HeadlessBuffer {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn usage(&self) -> BufferUsage {
        self.usage
    }

    pub fn byte_len(&self) -> usize {
        self.byte_len.get()
    }
}

impl PartialEq for HeadlessBuffer {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for HeadlessBuffer {}

impl Drop for HeadlessBuffer {
    fn drop(&mut self) {
        self.shared.record(Call::DeleteBuffer { id: self.id });
    }
}

pub struct HeadlessVertexArray {
    pub(crate) id: u64,
    pub(crate) generation: u64,
    pub(crate) shared: Rc<DeviceShared>,
}

impl HeadlessVertexArray {
    pub fn id(&self) -> u64 {
        self.id
    }
}

impl Drop for HeadlessVertexArray {
    fn drop(&mut self) {
        self.shared.record(Call::DeleteVertexArray { id: self.id });
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HeadlessTarget {
    pub(crate) id: u64,
}

impl HeadlessTarget {
    pub fn id(&self) -> u64 {
        self.id
    }
}

#[derive(Debug)]
pub struct HeadlessProgram {
    pub(crate) id: u64,
    pub(crate) attributes: Vec<String>,
    pub(crate) uniforms: Vec<String>,
    pub(crate) shared: Rc<DeviceShared>,
}

impl HeadlessProgram {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn attributes(&self) -> &[String] {
        &self.attributes
    }

    pub fn uniforms(&self) -> &[String] {
        &self.uniforms
    }
}

impl Drop for HeadlessProgram {
    fn drop(&mut self) {
        self.shared.record(Call::DeleteProgram { id: self.id });
    }
}
