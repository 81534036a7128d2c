use ash::vk;

use crate::barrier::BarrierGroupDesc;
use crate::types::*;

/// The single-threaded backend that actually executes commands.
///
/// Every method runs the operation immediately. A [`CommandBuffer`](crate::command::CommandBuffer)
/// calls these in recorded order during [`submit`](crate::command::CommandBuffer::submit) and
/// at no other time. Failures inside an entry point are the backend's business: the replayer
/// does not retry and does not undo commands that already ran.
pub trait ImmediateContext {
    fn set_viewports(&mut self, viewports: &[Viewport]);
    fn set_scissors(&mut self, rects: &[Rect]);
    fn set_depth_bounds(&mut self, bounds_min: f32, bounds_max: f32);
    fn set_stencil_reference(&mut self, front_ref: u8, back_ref: u8);
    fn set_sample_locations(&mut self, locations: &[SampleLocation], sample_num: u8);
    fn set_blend_constants(&mut self, color: Color32f);
    fn clear_attachments(&mut self, clears: &[ClearDesc], rects: &[Rect]);
    fn clear_storage(&mut self, clear: &ClearStorageDesc);
    fn begin_rendering(&mut self, attachments: &AttachmentsDesc<'_>);
    fn end_rendering(&mut self);

    fn set_vertex_buffers(&mut self, base_slot: u32, vertex_buffers: &[VertexBufferDesc]);
    fn set_index_buffer(&mut self, buffer: vk::Buffer, offset: u64, index_type: vk::IndexType);
    fn set_pipeline_layout(&mut self, pipeline_layout: vk::PipelineLayout);
    fn set_pipeline(&mut self, pipeline: vk::Pipeline);
    fn set_descriptor_set(
        &mut self,
        set_index: u32,
        descriptor_set: vk::DescriptorSet,
        dynamic_constant_buffer_offsets: &[u32],
    );
    fn set_root_constants(&mut self, root_constant_index: u32, data: &[u8]);
    fn set_root_descriptor(&mut self, root_descriptor_index: u32, descriptor: Descriptor);

    fn draw(&mut self, draw: &DrawDesc);
    fn draw_indexed(&mut self, draw: &DrawIndexedDesc);
    fn draw_indirect(&mut self, draw: &DrawIndirectDesc);
    fn draw_indexed_indirect(&mut self, draw: &DrawIndirectDesc);

    fn copy_buffer(
        &mut self,
        dst_buffer: vk::Buffer,
        dst_offset: u64,
        src_buffer: vk::Buffer,
        src_offset: u64,
        size: u64,
    );
    fn copy_texture(
        &mut self,
        dst_texture: vk::Image,
        dst_region: Option<&TextureRegionDesc>,
        src_texture: vk::Image,
        src_region: Option<&TextureRegionDesc>,
    );
    fn upload_buffer_to_texture(
        &mut self,
        dst_texture: vk::Image,
        dst_region: &TextureRegionDesc,
        src_buffer: vk::Buffer,
        src_data_layout: &TextureDataLayoutDesc,
    );
    fn readback_texture_to_buffer(
        &mut self,
        dst_buffer: vk::Buffer,
        dst_data_layout: &TextureDataLayoutDesc,
        src_texture: vk::Image,
        src_region: &TextureRegionDesc,
    );
    fn zero_buffer(&mut self, buffer: vk::Buffer, offset: u64, size: u64);
    fn resolve_texture(
        &mut self,
        dst_texture: vk::Image,
        dst_region: Option<&TextureRegionDesc>,
        src_texture: vk::Image,
        src_region: Option<&TextureRegionDesc>,
    );

    fn dispatch(&mut self, dispatch: &DispatchDesc);
    fn dispatch_indirect(&mut self, buffer: vk::Buffer, offset: u64);

    fn barrier(&mut self, barriers: &BarrierGroupDesc<'_>);

    fn begin_query(&mut self, query_pool: vk::QueryPool, offset: u32);
    fn end_query(&mut self, query_pool: vk::QueryPool, offset: u32);
    fn copy_queries(
        &mut self,
        query_pool: vk::QueryPool,
        offset: u32,
        num: u32,
        dst_buffer: vk::Buffer,
        dst_offset: u64,
    );

    fn begin_annotation(&mut self, name: &str, bgra: u32);
    fn end_annotation(&mut self);
    fn annotation(&mut self, name: &str, bgra: u32);
}

/// Allocation domain of descriptor sets, consulted when a set is bound
/// during recording.
pub trait DescriptorPool: Send + Sync {
    /// Returns true if `descriptor_set` was allocated from this pool and is
    /// still alive.
    fn owns(&self, descriptor_set: vk::DescriptorSet) -> bool;
}

impl<T: DescriptorPool + Send> DescriptorPool for std::sync::Mutex<T> {
    fn owns(&self, descriptor_set: vk::DescriptorSet) -> bool {
        match self.lock() {
            Ok(pool) => pool.owns(descriptor_set),
            Err(poisoned) => poisoned.into_inner().owns(descriptor_set),
        }
    }
}
