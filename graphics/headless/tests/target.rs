use weft_core::{ClearMask, ClearValue, Extent, TargetFrame, TargetStack};
use weft_headless::{Call, HeadlessBackend, HeadlessDevice};

fn device() -> HeadlessDevice {
    let _ = env_logger::builder().is_test(true).try_init();
    HeadlessDevice::new()
}

#[test]
fn construction_binds_the_root_frame() {
    let device = device();
    let root = TargetFrame::<HeadlessBackend>::new(device.new_target(), Extent { width: 800, height: 600 });
    let root_id = root.native().id();

    let stack = TargetStack::new(&device, root.clone());
    assert_eq!(stack.depth(), 1);
    assert!(std::rc::Rc::ptr_eq(stack.current(), &root));
    assert_eq!(
        device.take_calls(),
        vec![Call::BindTarget {
            id: root_id,
            extent: Extent { width: 800, height: 600 },
        }]
    );
}

#[test]
fn nested_scopes_restore_the_enclosing_binding() {
    let device = device();
    let root = TargetFrame::<HeadlessBackend>::new(device.new_target(), Extent { width: 800, height: 600 });
    let shadow = TargetFrame::<HeadlessBackend>::new(device.new_target(), Extent { width: 1024, height: 1024 });
    let bloom = TargetFrame::<HeadlessBackend>::new(device.new_target(), Extent { width: 256, height: 256 });
    let (root_id, shadow_id, bloom_id) = (root.native().id(), shadow.native().id(), bloom.native().id());

    let mut stack = TargetStack::new(&device, root);
    device.take_calls();

    stack.with(&device, &shadow, |stack| {
        assert_eq!(stack.depth(), 2);
        stack.with(&device, &bloom, |stack| {
            assert_eq!(stack.current().native().id(), bloom_id);
        });
        assert_eq!(stack.current().native().id(), shadow_id);
    });
    assert_eq!(stack.depth(), 1);

    assert_eq!(
        device.take_calls(),
        vec![
            Call::BindTarget { id: shadow_id, extent: Extent { width: 1024, height: 1024 } },
            Call::BindTarget { id: bloom_id, extent: Extent { width: 256, height: 256 } },
            Call::BindTarget { id: shadow_id, extent: Extent { width: 1024, height: 1024 } },
            Call::BindTarget { id: root_id, extent: Extent { width: 800, height: 600 } },
        ]
    );
}

#[test]
fn reentering_the_current_frame_elides_both_rebinds() {
    let device = device();
    let root = TargetFrame::<HeadlessBackend>::new(device.new_target(), Extent { width: 640, height: 480 });
    let offscreen = TargetFrame::<HeadlessBackend>::new(device.new_target(), Extent { width: 128, height: 128 });
    let (root_id, offscreen_id) = (root.native().id(), offscreen.native().id());

    let mut stack = TargetStack::new(&device, root);
    device.take_calls();

    stack.with(&device, &offscreen, |stack| {
        stack.with(&device, &offscreen, |stack| {
            assert_eq!(stack.depth(), 3);
        });
    });

    // Exactly one rebind on the outermost entry and one restore on the
    // outermost exit.
    assert_eq!(
        device.take_calls(),
        vec![
            Call::BindTarget { id: offscreen_id, extent: Extent { width: 128, height: 128 } },
            Call::BindTarget { id: root_id, extent: Extent { width: 640, height: 480 } },
        ]
    );
}

#[test]
fn clear_applies_to_the_current_frame() {
    let device = device();
    let root = TargetFrame::<HeadlessBackend>::new(device.new_target(), Extent { width: 320, height: 240 });
    let stack = TargetStack::new(&device, root);
    device.take_calls();

    let value = ClearValue {
        color: [0.1, 0.2, 0.3, 1.0],
        ..ClearValue::default()
    };
    stack.clear(&device, ClearMask::COLOR | ClearMask::DEPTH, &value);
    assert_eq!(
        device.take_calls(),
        vec![Call::Clear {
            mask: ClearMask::COLOR | ClearMask::DEPTH,
            value,
        }]
    );
    assert_eq!(value.depth, 1.0);
    assert_eq!(value.stencil, 0);
}
