use ash::vk;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct AccessStage {
    pub access: vk::AccessFlags2,
    pub stages: vk::PipelineStageFlags2,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct AccessLayoutStage {
    pub access: vk::AccessFlags2,
    pub layout: vk::ImageLayout,
    pub stages: vk::PipelineStageFlags2,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct GlobalBarrierDesc {
    pub before: AccessStage,
    pub after: AccessStage,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct BufferBarrierDesc {
    pub buffer: vk::Buffer,
    pub before: AccessStage,
    pub after: AccessStage,
}

/// Layout transition and hazard for a subresource range of `texture`.
/// `mip_num`/`layer_num` of `u32::MAX` mean "all remaining".
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct TextureBarrierDesc {
    pub texture: vk::Image,
    pub before: AccessLayoutStage,
    pub after: AccessLayoutStage,
    pub mip_offset: u32,
    pub mip_num: u32,
    pub layer_offset: u32,
    pub layer_num: u32,
    pub planes: vk::ImageAspectFlags,
}

impl TextureBarrierDesc {
    pub const REMAINING: u32 = u32::MAX;
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BarrierGroupDesc<'a> {
    pub globals: &'a [GlobalBarrierDesc],
    pub buffers: &'a [BufferBarrierDesc],
    pub textures: &'a [TextureBarrierDesc],
}
