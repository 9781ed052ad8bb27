use kornia_image::{Image, allocator::CpuAllocator};

pub struct LabelRequest {
    pub image: Image<u8, 3, CpuAllocator>,
}

pub struct LabelResponse {
    pub label: String,
}

/// A pretrained model that turns an RGB image into a short text label.
pub trait LabelModel {
    type Error: std::error::Error + Send + Sync + 'static;

    fn run(&mut self, request: LabelRequest) -> Result<LabelResponse, Self::Error>;
}
