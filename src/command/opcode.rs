/// First word of every record in a push buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum Opcode {
    SetViewports,
    SetScissors,
    SetDepthBounds,
    SetStencilReference,
    SetSampleLocations,
    SetBlendConstants,
    ClearAttachments,
    ClearStorage,
    BeginRendering,
    EndRendering,
    SetVertexBuffers,
    SetIndexBuffer,
    SetPipelineLayout,
    SetPipeline,
    SetDescriptorSet,
    SetRootConstants,
    SetRootDescriptor,
    Draw,
    DrawIndexed,
    DrawIndirect,
    DrawIndexedIndirect,
    CopyBuffer,
    CopyTexture,
    UploadBufferToTexture,
    ReadbackTextureToBuffer,
    ZeroBuffer,
    ResolveTexture,
    Dispatch,
    DispatchIndirect,
    Barrier,
    BeginQuery,
    EndQuery,
    CopyQueries,
    BeginAnnotation,
    EndAnnotation,
    Annotation,
}

impl Opcode {
    pub const ALL: [Opcode; 36] = [
        Opcode::SetViewports,
        Opcode::SetScissors,
        Opcode::SetDepthBounds,
        Opcode::SetStencilReference,
        Opcode::SetSampleLocations,
        Opcode::SetBlendConstants,
        Opcode::ClearAttachments,
        Opcode::ClearStorage,
        Opcode::BeginRendering,
        Opcode::EndRendering,
        Opcode::SetVertexBuffers,
        Opcode::SetIndexBuffer,
        Opcode::SetPipelineLayout,
        Opcode::SetPipeline,
        Opcode::SetDescriptorSet,
        Opcode::SetRootConstants,
        Opcode::SetRootDescriptor,
        Opcode::Draw,
        Opcode::DrawIndexed,
        Opcode::DrawIndirect,
        Opcode::DrawIndexedIndirect,
        Opcode::CopyBuffer,
        Opcode::CopyTexture,
        Opcode::UploadBufferToTexture,
        Opcode::ReadbackTextureToBuffer,
        Opcode::ZeroBuffer,
        Opcode::ResolveTexture,
        Opcode::Dispatch,
        Opcode::DispatchIndirect,
        Opcode::Barrier,
        Opcode::BeginQuery,
        Opcode::EndQuery,
        Opcode::CopyQueries,
        Opcode::BeginAnnotation,
        Opcode::EndAnnotation,
        Opcode::Annotation,
    ];
}

impl From<Opcode> for u32 {
    fn from(opcode: Opcode) -> Self {
        opcode as u32
    }
}

impl TryFrom<u32> for Opcode {
    type Error = u32;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Opcode::ALL.get(value as usize).copied().ok_or(value)
    }
}
