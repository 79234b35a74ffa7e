use super::*;
use std::sync::atomic::Ordering;
use crate::error::Error;
use crate::graphics_device::mock_graphics_device::{latest_buffer, MockGraphicsDevice, MockWrite};

fn desc(initial_capacity: u32) -> GpuBufferHandlerDesc {
    GpuBufferHandlerDesc {
        name: "TestBuffer".to_string(),
        shader_input_name: "m_test".to_string(),
        initial_capacity,
    }
}

fn device(mock: MockGraphicsDevice) -> Arc<Mutex<dyn GraphicsDevice>> {
    Arc::new(Mutex::new(mock))
}

#[test]
fn test_new_allocates_initial_capacity_and_resolves_input() {
    let mock = MockGraphicsDevice::new().with_shader_input("m_test", 4);
    let buffers = mock.created_buffers();
    let handler = GpuBufferHandler::<[u32; 4]>::new(device(mock), desc(8)).unwrap();

    assert_eq!(handler.capacity(), 8);
    assert_eq!(handler.stride(), 16);
    assert_eq!(handler.shader_input_index(), Some(4));
    assert_eq!(latest_buffer(&buffers, "TestBuffer").unwrap().size, 128);
}

#[test]
fn test_missing_shader_input_is_not_fatal() {
    let handler = GpuBufferHandler::<u32>::new(device(MockGraphicsDevice::new()), desc(0)).unwrap();
    assert_eq!(handler.shader_input_index(), None);
    assert_eq!(handler.capacity(), 1);
}

#[test]
fn test_creation_failure_propagates() {
    let result = GpuBufferHandler::<u32>::new(device(MockGraphicsDevice::new().with_failing_creation()), desc(4));
    assert_eq!(result.err(), Some(Error::OutOfMemory));
}

#[test]
fn test_update_buffer_grows_to_power_of_two() {
    let mock = MockGraphicsDevice::new();
    let buffers = mock.created_buffers();
    let mut handler = GpuBufferHandler::<u32>::new(device(mock), desc(2)).unwrap();

    handler.update_buffer(&[1, 2, 3, 4, 5]).unwrap();

    assert_eq!(handler.capacity(), 8);
    let buffer = latest_buffer(&buffers, "TestBuffer").unwrap();
    assert_eq!(buffer.size, 32);
    assert_eq!(buffer.writes(), vec![MockWrite { offset: 0, len: 20 }]);
    assert_eq!(buffer.read(16, 4), 5u32.to_ne_bytes().to_vec());
}

#[test]
fn test_update_range_writes_at_element_offset() {
    let mock = MockGraphicsDevice::new();
    let buffers = mock.created_buffers();
    let handler = GpuBufferHandler::<u32>::new(device(mock), desc(8)).unwrap();

    handler.update_range(3, &[7, 8]).unwrap();
    assert_eq!(latest_buffer(&buffers, "TestBuffer").unwrap().writes(),
        vec![MockWrite { offset: 12, len: 8 }]);

    assert!(handler.update_range(7, &[1, 2]).is_err());
}

#[test]
fn test_empty_updates_write_nothing() {
    let mock = MockGraphicsDevice::new();
    let buffers = mock.created_buffers();
    let mut handler = GpuBufferHandler::<u32>::new(device(mock), desc(4)).unwrap();

    handler.update_buffer(&[]).unwrap();
    handler.update_range(0, &[]).unwrap();
    assert!(latest_buffer(&buffers, "TestBuffer").unwrap().writes().is_empty());
}

#[test]
fn test_failed_update_is_reported() {
    let mock = MockGraphicsDevice::new();
    let switch = mock.update_failure_switch();
    let mut handler = GpuBufferHandler::<u32>::new(device(mock), desc(4)).unwrap();

    switch.store(true, Ordering::SeqCst);
    assert!(handler.update_buffer(&[1]).is_err());
    assert!(handler.update_range(0, &[1]).is_err());
}

#[test]
fn test_failed_growth_keeps_previous_buffer() {
    let mock = MockGraphicsDevice::new();
    let switch = mock.update_failure_switch();
    let mut handler = GpuBufferHandler::<u32>::new(device(mock), desc(2)).unwrap();
    handler.update_buffer(&[1, 2]).unwrap();
    let previous = handler.buffer().clone();

    switch.store(true, Ordering::SeqCst);
    assert!(handler.update_buffer(&[1, 2, 3]).is_err());

    assert_eq!(handler.capacity(), 2);
    assert!(Arc::ptr_eq(handler.buffer(), &previous));

    switch.store(false, Ordering::SeqCst);
    handler.update_buffer(&[1, 2, 3]).unwrap();
    assert_eq!(handler.capacity(), 4);
    assert!(!Arc::ptr_eq(handler.buffer(), &previous));
}
