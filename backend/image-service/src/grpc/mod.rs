use tonic::{Request, Response, Status};

use crate::storage::ImageStore;

pub mod image {
    tonic::include_proto!("eventhub.image_service.v1");
}

use image::image_service_server::ImageService as ImageServiceRpc;
use image::*;

pub struct ImageServiceImpl {
    store: ImageStore,
}

impl ImageServiceImpl {
    pub fn new(store: ImageStore) -> Self {
        Self { store }
    }
}

#[tonic::async_trait]
impl ImageServiceRpc for ImageServiceImpl {
    async fn upload_image(
        &self,
        request: Request<UploadImageRequest>,
    ) -> Result<Response<UploadImageResponse>, Status> {
        let req = request.into_inner();
        let stored = self.store.save(&req.data, &req.content_type).await?;
        Ok(Response::new(UploadImageResponse {
            name: stored.name,
            url: stored.url,
        }))
    }

    async fn get_image(
        &self,
        request: Request<GetImageRequest>,
    ) -> Result<Response<GetImageResponse>, Status> {
        let req = request.into_inner();
        let image = self.store.load(&req.name).await?;
        Ok(Response::new(GetImageResponse {
            data: image.data,
            content_type: image.format.content_type().to_string(),
        }))
    }

    async fn delete_image(
        &self,
        request: Request<DeleteImageRequest>,
    ) -> Result<Response<DeleteImageResponse>, Status> {
        let req = request.into_inner();
        self.store.delete(&req.name).await?;
        Ok(Response::new(DeleteImageResponse {}))
    }
}
