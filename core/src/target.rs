use std::rc::Rc;

use bitflags::bitflags;

use super::*;

bitflags! {
  #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
  pub struct ClearMask: u32 {
    const COLOR   = 0b1;
    const DEPTH   = 0b10;
    const STENCIL = 0b100;
  }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClearValue {
  pub color: [f32; 4],
  pub depth: f32,
  pub stencil: u32
}

impl Default for ClearValue {
  fn default() -> Self {
    Self {
      color: [0f32; 4],
      depth: 1f32,
      stencil: 0u32
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Extent {
  pub width: u32,
  pub height: u32
}

/// One set of color outputs with its pixel dimensions. The default
/// framebuffer is just another frame.
pub struct TargetFrame<B: Backend> {
  native: B::Target,
  extent: Extent
}

impl<B: Backend> TargetFrame<B> {
  pub fn new(native: B::Target, extent: Extent) -> Rc<Self> {
    Rc::new(Self { native, extent })
  }

  pub fn native(&self) -> &B::Target {
    &self.native
  }

  pub fn extent(&self) -> Extent {
    self.extent
  }
}

/// Explicit save/restore discipline for the single "current draw target"
/// slot of the native context. The stack is a value the caller owns and
/// threads through draw code; it is never ambient state. Exactly one frame
/// is current at all times, so the stack is constructed around a root
/// frame and can never be empty.
pub struct TargetStack<B: Backend> {
  frames: Vec<Rc<TargetFrame<B>>>
}

impl<B: Backend> TargetStack<B> {
  pub fn new(device: &B::Device, root: Rc<TargetFrame<B>>) -> Self {
    unsafe {
      device.bind_target(root.native(), root.extent());
    }
    Self { frames: vec![root] }
  }

  pub fn current(&self) -> &Rc<TargetFrame<B>> {
    self.frames.last().expect("target stack holds at least the root frame")
  }

  pub fn depth(&self) -> usize {
    self.frames.len()
  }

  /// Makes `frame` current for the duration of `f`, then restores the
  /// enclosing frame. The stack is handed back to the scope so scopes can
  /// nest. Re-entering the frame that is already current elides the
  /// native rebind on both entry and exit; the elision is observable only
  /// as the absence of redundant native calls.
  pub fn with<R>(&mut self, device: &B::Device, frame: &Rc<TargetFrame<B>>, f: impl FnOnce(&mut Self) -> R) -> R {
    let reentry = Rc::ptr_eq(self.current(), frame);
    if reentry {
      log::trace!("{}: re-entering current render target, skipping rebind", B::name());
    } else {
      unsafe {
        device.bind_target(frame.native(), frame.extent());
      }
    }
    self.frames.push(frame.clone());
    let result = f(self);
    self.frames.pop();
    if !reentry {
      let previous = self.current();
      unsafe {
        device.bind_target(previous.native(), previous.extent());
      }
    }
    result
  }

  /// Clears the current frame.
  pub fn clear(&self, device: &B::Device, mask: ClearMask, value: &ClearValue) {
    unsafe {
      device.clear(mask, value);
    }
  }
}
