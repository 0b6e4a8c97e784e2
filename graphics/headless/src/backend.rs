use weft_core::Backend;

use crate::device::HeadlessDevice;
use crate::handles::{HeadlessBuffer, HeadlessProgram, HeadlessTarget, HeadlessVertexArray};

pub struct HeadlessBackend {}

impl Backend for HeadlessBackend {
    type Device = HeadlessDevice;
    type Buffer = HeadlessBuffer;
    type VertexArray = HeadlessVertexArray;
    type Target = HeadlessTarget;
    type Program = HeadlessProgram;

    fn name() -> &'static str {
        "Headless"
    }
}
