use std::fmt::Debug;
use std::sync::Arc;

use ash::vk;

use super::codec::Writer;
use super::opcode::Opcode;
use super::push_buffer::PushBuffer;
use super::replay::replay;
use crate::barrier::BarrierGroupDesc;
use crate::context::{DescriptorPool, ImmediateContext};
use crate::error::{Error, Result};
use crate::types::*;
use crate::Device;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CommandBufferState {
    /// Nothing to submit. `begin` starts a new recording.
    Ready,
    Recording,
    /// Recording ended; waiting for its one `submit`.
    Executable,
    /// A push buffer allocation failed. The command buffer must be dropped
    /// and recreated.
    Invalid,
}

/// A deferred command buffer.
///
/// Commands are encoded into a push buffer while recording and are only
/// executed, in recorded order, when the command buffer is submitted to the
/// device's immediate context. Recording never touches the context, so any
/// number of command buffers can be recorded from different threads.
///
/// Recorded commands refer to buffers, textures, pipelines, descriptor sets
/// and query pools by handle only. Those objects must stay alive until the
/// `submit` that replays them has returned. The descriptor pool given to
/// `begin` is held until that `submit`, so a long-lived command buffer can
/// bind a different pool every frame.
pub struct CommandBuffer<'a, C: ImmediateContext> {
    device: &'a Device<C>,
    push_buffer: PushBuffer,
    descriptor_pool: Option<Arc<dyn DescriptorPool>>,
    state: CommandBufferState,
    command_count: usize,
}

impl<'a, C: ImmediateContext> Debug for CommandBuffer<'a, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandBuffer")
            .field("state", &self.state)
            .field("words", &self.push_buffer.len())
            .field("commands", &self.command_count)
            .finish()
    }
}

impl<'a, C: ImmediateContext> CommandBuffer<'a, C> {
    pub fn new(device: &'a Device<C>) -> Result<Self> {
        let push_buffer = device.acquire_push_buffer()?;
        tracing::debug!(capacity = push_buffer.capacity(), "create command buffer");
        Ok(Self {
            device,
            push_buffer,
            descriptor_pool: None,
            state: CommandBufferState::Ready,
            command_count: 0,
        })
    }

    pub fn device(&self) -> &'a Device<C> {
        self.device
    }

    pub fn state(&self) -> CommandBufferState {
        self.state
    }

    pub fn push_buffer(&self) -> &PushBuffer {
        &self.push_buffer
    }

    pub fn len_words(&self) -> usize {
        self.push_buffer.len()
    }

    /// Number of commands recorded since the last `begin`.
    pub fn command_count(&self) -> usize {
        self.command_count
    }

    /// Opens a recording scope, discarding whatever was recorded before.
    ///
    /// `descriptor_pool` is the pool every descriptor set bound in this scope
    /// must come from.
    pub fn begin(&mut self, descriptor_pool: Option<Arc<dyn DescriptorPool>>) -> Result<()> {
        match self.state {
            CommandBufferState::Recording => return Err(Error::AlreadyRecording),
            CommandBufferState::Invalid => return Err(Error::Invalid),
            CommandBufferState::Ready | CommandBufferState::Executable => {}
        }
        self.push_buffer
            .reset(self.device.desc().push_buffer_retain_limit);
        tracing::debug!(
            capacity = self.push_buffer.capacity(),
            descriptor_pool = descriptor_pool.is_some(),
            "begin command buffer"
        );
        self.descriptor_pool = descriptor_pool;
        self.command_count = 0;
        self.state = CommandBufferState::Recording;
        Ok(())
    }

    pub fn end(&mut self) -> Result<()> {
        self.ensure_recording()?;
        self.state = CommandBufferState::Executable;
        tracing::debug!(
            words = self.push_buffer.len(),
            commands = self.command_count,
            "end command buffer"
        );
        Ok(())
    }

    /// Replays the ended recording on the device's immediate context.
    ///
    /// Only one submit replays on a device at a time; concurrent submits
    /// block on the context lock and run in lock acquisition order. If replay
    /// stops on a malformed record, the commands before it have already run
    /// and the command buffer returns to `Ready` like a successful submit.
    pub fn submit(&mut self) -> Result<()> {
        match self.state {
            CommandBufferState::Executable => {}
            CommandBufferState::Invalid => return Err(Error::Invalid),
            CommandBufferState::Ready | CommandBufferState::Recording => {
                return Err(Error::NotExecutable)
            }
        }
        let mut context = self.device.lock_context()?;
        let result = replay(self.push_buffer.as_words(), &mut *context);
        drop(context);

        self.state = CommandBufferState::Ready;
        self.descriptor_pool = None;
        match result {
            Ok(replayed) => {
                tracing::debug!(commands = replayed, "submit command buffer");
                Ok(())
            }
            Err(err) => {
                tracing::warn!(error = %err, "submit stopped on a malformed record");
                Err(err)
            }
        }
    }

    fn ensure_recording(&self) -> Result<()> {
        match self.state {
            CommandBufferState::Recording => Ok(()),
            CommandBufferState::Invalid => Err(Error::Invalid),
            CommandBufferState::Ready | CommandBufferState::Executable => Err(Error::NotRecording),
        }
    }

    /// Appends one record. A record that fails half way is removed again, so
    /// the push buffer only ever holds whole records.
    fn record(
        &mut self,
        opcode: Opcode,
        encode: impl FnOnce(&mut Writer<'_>) -> Result<()>,
    ) -> Result<()> {
        self.ensure_recording()?;
        let start = self.push_buffer.len();
        let mut writer = Writer::new(&mut self.push_buffer);
        let result = writer
            .word(opcode.into())
            .and_then(|()| encode(&mut writer));
        match result {
            Ok(()) => {
                self.command_count += 1;
                Ok(())
            }
            Err(err) => {
                self.push_buffer.truncate(start);
                if let Error::OutOfMemory(_) = err {
                    tracing::warn!(?opcode, words = start, "push buffer allocation failed");
                    self.state = CommandBufferState::Invalid;
                }
                Err(err)
            }
        }
    }

    pub fn set_viewports(&mut self, viewports: &[Viewport]) -> Result<()> {
        self.record(Opcode::SetViewports, |w| w.slice(viewports, "viewport count"))
    }

    pub fn set_scissors(&mut self, rects: &[Rect]) -> Result<()> {
        self.record(Opcode::SetScissors, |w| w.slice(rects, "scissor count"))
    }

    pub fn set_depth_bounds(&mut self, bounds_min: f32, bounds_max: f32) -> Result<()> {
        self.record(Opcode::SetDepthBounds, |w| {
            w.put(&bounds_min)?;
            w.put(&bounds_max)
        })
    }

    pub fn set_stencil_reference(&mut self, front_ref: u8, back_ref: u8) -> Result<()> {
        self.record(Opcode::SetStencilReference, |w| {
            w.word((front_ref as u32) | ((back_ref as u32) << 8))
        })
    }

    /// `sample_num` is the sample count the locations are laid out for.
    pub fn set_sample_locations(
        &mut self,
        locations: &[SampleLocation],
        sample_num: u8,
    ) -> Result<()> {
        self.record(Opcode::SetSampleLocations, |w| {
            w.put(&sample_num)?;
            w.slice(locations, "sample location count")
        })
    }

    pub fn set_blend_constants(&mut self, color: Color32f) -> Result<()> {
        self.record(Opcode::SetBlendConstants, |w| w.put(&color))
    }

    /// Clears attachments of the current rendering scope. An empty `rects`
    /// clears the whole attachment.
    pub fn clear_attachments(&mut self, clears: &[ClearDesc], rects: &[Rect]) -> Result<()> {
        self.record(Opcode::ClearAttachments, |w| {
            w.slice(clears, "clear count")?;
            w.slice(rects, "clear rect count")
        })
    }

    pub fn clear_storage(&mut self, clear: &ClearStorageDesc) -> Result<()> {
        self.record(Opcode::ClearStorage, |w| w.put(clear))
    }

    pub fn begin_rendering(&mut self, attachments: &AttachmentsDesc<'_>) -> Result<()> {
        self.record(Opcode::BeginRendering, |w| {
            w.put(&attachments.depth_stencil)?;
            w.put(&attachments.shading_rate)?;
            w.slice(attachments.colors, "color attachment count")
        })
    }

    pub fn end_rendering(&mut self) -> Result<()> {
        self.record(Opcode::EndRendering, |_| Ok(()))
    }

    pub fn set_vertex_buffers(
        &mut self,
        base_slot: u32,
        vertex_buffers: &[VertexBufferDesc],
    ) -> Result<()> {
        self.record(Opcode::SetVertexBuffers, |w| {
            w.put(&base_slot)?;
            w.slice(vertex_buffers, "vertex buffer count")
        })
    }

    pub fn set_index_buffer(
        &mut self,
        buffer: vk::Buffer,
        offset: u64,
        index_type: vk::IndexType,
    ) -> Result<()> {
        self.record(Opcode::SetIndexBuffer, |w| {
            w.put(&buffer)?;
            w.put(&offset)?;
            w.put(&index_type)
        })
    }

    pub fn set_pipeline_layout(&mut self, pipeline_layout: vk::PipelineLayout) -> Result<()> {
        self.record(Opcode::SetPipelineLayout, |w| w.put(&pipeline_layout))
    }

    pub fn set_pipeline(&mut self, pipeline: vk::Pipeline) -> Result<()> {
        self.record(Opcode::SetPipeline, |w| w.put(&pipeline))
    }

    /// Binds `descriptor_set` at `set_index`. The set has to come from the
    /// descriptor pool given to `begin`; this is checked now, not at submit.
    pub fn set_descriptor_set(
        &mut self,
        set_index: u32,
        descriptor_set: vk::DescriptorSet,
        dynamic_constant_buffer_offsets: &[u32],
    ) -> Result<()> {
        self.ensure_recording()?;
        let pool = self
            .descriptor_pool
            .as_deref()
            .ok_or(Error::NoDescriptorPool)?;
        if !pool.owns(descriptor_set) {
            tracing::warn!(
                ?descriptor_set,
                set_index,
                "descriptor set is not from the bound descriptor pool"
            );
            return Err(Error::IncompatibleDescriptorSet(descriptor_set));
        }
        self.record(Opcode::SetDescriptorSet, |w| {
            w.put(&set_index)?;
            w.put(&descriptor_set)?;
            w.slice(dynamic_constant_buffer_offsets, "dynamic offset count")
        })
    }

    pub fn set_root_constants(&mut self, root_constant_index: u32, data: &[u8]) -> Result<()> {
        self.record(Opcode::SetRootConstants, |w| {
            w.put(&root_constant_index)?;
            w.bytes(data, "root constant size")
        })
    }

    pub fn set_root_descriptor(
        &mut self,
        root_descriptor_index: u32,
        descriptor: Descriptor,
    ) -> Result<()> {
        self.record(Opcode::SetRootDescriptor, |w| {
            w.put(&root_descriptor_index)?;
            w.put(&descriptor)
        })
    }

    pub fn draw(&mut self, draw: &DrawDesc) -> Result<()> {
        self.record(Opcode::Draw, |w| w.put(draw))
    }

    pub fn draw_indexed(&mut self, draw: &DrawIndexedDesc) -> Result<()> {
        self.record(Opcode::DrawIndexed, |w| w.put(draw))
    }

    pub fn draw_indirect(&mut self, draw: &DrawIndirectDesc) -> Result<()> {
        self.record(Opcode::DrawIndirect, |w| w.put(draw))
    }

    pub fn draw_indexed_indirect(&mut self, draw: &DrawIndirectDesc) -> Result<()> {
        self.record(Opcode::DrawIndexedIndirect, |w| w.put(draw))
    }

    /// Copies `size` bytes, or everything past `src_offset` for
    /// [`WHOLE_SIZE`].
    pub fn copy_buffer(
        &mut self,
        dst_buffer: vk::Buffer,
        dst_offset: u64,
        src_buffer: vk::Buffer,
        src_offset: u64,
        size: u64,
    ) -> Result<()> {
        self.record(Opcode::CopyBuffer, |w| {
            w.put(&dst_buffer)?;
            w.put(&dst_offset)?;
            w.put(&src_buffer)?;
            w.put(&src_offset)?;
            w.put(&size)
        })
    }

    /// A `None` region stands for the whole texture.
    pub fn copy_texture(
        &mut self,
        dst_texture: vk::Image,
        dst_region: Option<&TextureRegionDesc>,
        src_texture: vk::Image,
        src_region: Option<&TextureRegionDesc>,
    ) -> Result<()> {
        self.record(Opcode::CopyTexture, |w| {
            w.put(&dst_texture)?;
            w.put(&dst_region.copied())?;
            w.put(&src_texture)?;
            w.put(&src_region.copied())
        })
    }

    pub fn upload_buffer_to_texture(
        &mut self,
        dst_texture: vk::Image,
        dst_region: &TextureRegionDesc,
        src_buffer: vk::Buffer,
        src_data_layout: &TextureDataLayoutDesc,
    ) -> Result<()> {
        self.record(Opcode::UploadBufferToTexture, |w| {
            w.put(&dst_texture)?;
            w.put(dst_region)?;
            w.put(&src_buffer)?;
            w.put(src_data_layout)
        })
    }

    pub fn readback_texture_to_buffer(
        &mut self,
        dst_buffer: vk::Buffer,
        dst_data_layout: &TextureDataLayoutDesc,
        src_texture: vk::Image,
        src_region: &TextureRegionDesc,
    ) -> Result<()> {
        self.record(Opcode::ReadbackTextureToBuffer, |w| {
            w.put(&dst_buffer)?;
            w.put(dst_data_layout)?;
            w.put(&src_texture)?;
            w.put(src_region)
        })
    }

    pub fn zero_buffer(&mut self, buffer: vk::Buffer, offset: u64, size: u64) -> Result<()> {
        self.record(Opcode::ZeroBuffer, |w| {
            w.put(&buffer)?;
            w.put(&offset)?;
            w.put(&size)
        })
    }

    pub fn resolve_texture(
        &mut self,
        dst_texture: vk::Image,
        dst_region: Option<&TextureRegionDesc>,
        src_texture: vk::Image,
        src_region: Option<&TextureRegionDesc>,
    ) -> Result<()> {
        self.record(Opcode::ResolveTexture, |w| {
            w.put(&dst_texture)?;
            w.put(&dst_region.copied())?;
            w.put(&src_texture)?;
            w.put(&src_region.copied())
        })
    }

    pub fn dispatch(&mut self, dispatch: &DispatchDesc) -> Result<()> {
        self.record(Opcode::Dispatch, |w| w.put(dispatch))
    }

    pub fn dispatch_indirect(&mut self, buffer: vk::Buffer, offset: u64) -> Result<()> {
        self.record(Opcode::DispatchIndirect, |w| {
            w.put(&buffer)?;
            w.put(&offset)
        })
    }

    pub fn barrier(&mut self, barriers: &BarrierGroupDesc<'_>) -> Result<()> {
        self.record(Opcode::Barrier, |w| {
            w.slice(barriers.globals, "global barrier count")?;
            w.slice(barriers.buffers, "buffer barrier count")?;
            w.slice(barriers.textures, "texture barrier count")
        })
    }

    pub fn begin_query(&mut self, query_pool: vk::QueryPool, offset: u32) -> Result<()> {
        self.record(Opcode::BeginQuery, |w| {
            w.put(&query_pool)?;
            w.put(&offset)
        })
    }

    // Pairing with begin_query is left to the validation layer.
    pub fn end_query(&mut self, query_pool: vk::QueryPool, offset: u32) -> Result<()> {
        self.record(Opcode::EndQuery, |w| {
            w.put(&query_pool)?;
            w.put(&offset)
        })
    }

    pub fn copy_queries(
        &mut self,
        query_pool: vk::QueryPool,
        offset: u32,
        num: u32,
        dst_buffer: vk::Buffer,
        dst_offset: u64,
    ) -> Result<()> {
        self.record(Opcode::CopyQueries, |w| {
            w.put(&query_pool)?;
            w.put(&offset)?;
            w.put(&num)?;
            w.put(&dst_buffer)?;
            w.put(&dst_offset)
        })
    }

    /// `bgra` is a packed 8-bit-per-channel color, blue in the low byte.
    pub fn begin_annotation(&mut self, name: &str, bgra: u32) -> Result<()> {
        self.record(Opcode::BeginAnnotation, |w| {
            w.put(&bgra)?;
            w.str(name, "annotation name length")
        })
    }

    pub fn end_annotation(&mut self) -> Result<()> {
        self.record(Opcode::EndAnnotation, |_| Ok(()))
    }

    pub fn annotation(&mut self, name: &str, bgra: u32) -> Result<()> {
        self.record(Opcode::Annotation, |w| {
            w.put(&bgra)?;
            w.str(name, "annotation name length")
        })
    }
}

impl<'a, C: ImmediateContext> Drop for CommandBuffer<'a, C> {
    fn drop(&mut self) {
        tracing::debug!(state = ?self.state, "drop command buffer");
        if self.state != CommandBufferState::Invalid {
            self.device
                .recycle_push_buffer(std::mem::take(&mut self.push_buffer));
        }
    }
}
