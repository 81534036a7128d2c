//! Deferred command buffers on top of an immediate, single-threaded backend.
//!
//! A [`CommandBuffer`](command::CommandBuffer) encodes every recorded command into
//! a push buffer of 32-bit words. On submit the push buffer is replayed, front
//! to back, against the [`ImmediateContext`] owned by the [`Device`].

use std::sync::{Mutex, MutexGuard, PoisonError};

use crossbeam_queue::ArrayQueue;

pub mod barrier;
pub mod command;
mod context;
mod error;
pub mod types;

pub use context::{DescriptorPool, ImmediateContext};
pub use error::{Error, Result};

use command::{CommandBuffer, PushBuffer};

/// Push buffer sizing for the command buffers of one [`Device`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeviceDesc {
    /// Words reserved for a freshly allocated push buffer.
    pub push_buffer_capacity: usize,
    /// Capacity a push buffer keeps across `begin`. Anything above is
    /// released.
    pub push_buffer_retain_limit: usize,
    /// Push buffers of dropped command buffers kept for reuse. 0 disables
    /// recycling.
    pub recycled_push_buffers: usize,
}

impl Default for DeviceDesc {
    fn default() -> Self {
        Self {
            push_buffer_capacity: 1024,
            push_buffer_retain_limit: 1 << 20,
            recycled_push_buffers: 16,
        }
    }
}

/// Owner of the immediate context that command buffers are replayed on.
///
/// The context sits behind a mutex: any number of command buffers may record
/// at once, but only one submit replays at a time. The device does not order
/// submits of different command buffers; callers that need an order submit in
/// that order.
pub struct Device<C: ImmediateContext> {
    context: Mutex<C>,
    push_buffers: Option<ArrayQueue<PushBuffer>>,
    desc: DeviceDesc,
}

impl<C: ImmediateContext> Device<C> {
    pub fn new(context: C) -> Self {
        Self::with_desc(context, DeviceDesc::default())
    }

    pub fn with_desc(context: C, desc: DeviceDesc) -> Self {
        tracing::info!(?desc, "create device");
        let push_buffers =
            (desc.recycled_push_buffers > 0).then(|| ArrayQueue::new(desc.recycled_push_buffers));
        Self {
            context: Mutex::new(context),
            push_buffers,
            desc,
        }
    }

    pub fn desc(&self) -> &DeviceDesc {
        &self.desc
    }

    pub fn create_command_buffer(&self) -> Result<CommandBuffer<'_, C>> {
        CommandBuffer::new(self)
    }

    /// Exclusive access to the immediate context, e.g. to run work directly
    /// between two submits. Submits block while the guard is held.
    pub fn lock_context(&self) -> Result<MutexGuard<'_, C>> {
        self.context.lock().map_err(|_| Error::ContextPoisoned)
    }

    pub fn into_context(self) -> C {
        tracing::info!("drop device");
        self.context
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn acquire_push_buffer(&self) -> Result<PushBuffer> {
        if let Some(push_buffer) = self.push_buffers.as_ref().and_then(ArrayQueue::pop) {
            return Ok(push_buffer);
        }
        Ok(PushBuffer::with_capacity(self.desc.push_buffer_capacity)?)
    }

    pub(crate) fn recycle_push_buffer(&self, mut push_buffer: PushBuffer) {
        let Some(queue) = &self.push_buffers else {
            return;
        };
        if push_buffer.capacity() == 0 {
            return;
        }
        push_buffer.reset(self.desc.push_buffer_retain_limit);
        // A full queue drops the buffer.
        let _ = queue.push(push_buffer);
    }
}
