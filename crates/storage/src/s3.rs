use crate::backend::{ByteStream as FileStream, StorageBackend};
use crate::object::{copy_source, into_parts};
use crate::StorageError;
use aws_config::{BehaviorVersion, Region};
use aws_credential_types::Credentials;
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::types::{CompletedMultipartUpload, CompletedPart};
use aws_sdk_s3::{primitives::ByteStream, Client};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use diskfile_config::S3Settings;
use futures::StreamExt;
use tokio_util::io::ReaderStream;

/// S3's minimum size for every part but the last
const PART_SIZE: usize = 5 * 1024 * 1024;

/// S3-compatible storage backend
/// Compatible with: Cloudflare R2, AWS S3, MinIO, DigitalOcean Spaces, etc.
pub struct S3Backend {
    client: Client,
    bucket_name: String,
    public_url: String,
    bucket_prefix: String,
}

impl S3Backend {
    pub async fn new(settings: &S3Settings) -> Result<Self, StorageError> {
        if settings.bucket_name.is_empty() {
            return Err(StorageError::ConfigError("s3 bucket_name is empty".to_string()));
        }

        let credentials = Credentials::new(
            settings.access_key_id.clone(),
            settings.secret_access_key.clone(),
            None,
            None,
            "diskfile-s3",
        );

        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .credentials_provider(credentials)
            .region(Region::new(settings.region.clone()));
        if !settings.endpoint_url.is_empty() {
            loader = loader.endpoint_url(settings.endpoint_url.clone());
        }
        let config = loader.load().await;

        let client = Client::new(&config);

        Ok(Self {
            client,
            bucket_name: settings.bucket_name.clone(),
            public_url: settings.public_url.trim_end_matches('/').to_string(),
            bucket_prefix: settings.bucket_prefix.trim_matches('/').to_string(),
        })
    }

    fn build_key(&self, remote_key: &str) -> String {
        let remote_key = remote_key.trim_start_matches('/');
        if self.bucket_prefix.is_empty() {
            remote_key.to_string()
        } else {
            format!("{}/{}", self.bucket_prefix, remote_key)
        }
    }

    async fn head(
        &self,
        path: &str,
    ) -> Result<aws_sdk_s3::operation::head_object::HeadObjectOutput, StorageError> {
        let key = self.build_key(path);
        self.client
            .head_object()
            .bucket(&self.bucket_name)
            .key(&key)
            .send()
            .await
            .map_err(|e| {
                if e.as_service_error().map(|se| se.is_not_found()).unwrap_or(false) {
                    StorageError::NotFound(path.to_string())
                } else {
                    StorageError::S3SdkError(e.to_string())
                }
            })
    }

    /// Uploads `first` and the remaining `parts` as one multipart upload,
    /// aborting it if any part fails
    async fn put_multipart(&self, path: &str, first: Bytes, parts: FileStream) -> Result<(), StorageError> {
        let key = self.build_key(path);
        let write_error = |e: String| StorageError::WriteError(key.clone(), e);

        let upload_id = self
            .client
            .create_multipart_upload()
            .bucket(&self.bucket_name)
            .key(&key)
            .send()
            .await
            .map_err(|e| write_error(e.to_string()))?
            .upload_id
            .ok_or_else(|| write_error("no upload id returned".to_string()))?;

        tracing::info!("Uploading {} to S3 bucket {} in parts", key, self.bucket_name);

        let completed = match self.upload_parts(&key, &upload_id, first, parts).await {
            Ok(completed) => completed,
            Err(e) => {
                if let Err(abort) = self
                    .client
                    .abort_multipart_upload()
                    .bucket(&self.bucket_name)
                    .key(&key)
                    .upload_id(&upload_id)
                    .send()
                    .await
                {
                    tracing::warn!("Failed to abort multipart upload of {}: {}", key, abort);
                }
                return Err(e);
            }
        };

        self.client
            .complete_multipart_upload()
            .bucket(&self.bucket_name)
            .key(&key)
            .upload_id(&upload_id)
            .multipart_upload(CompletedMultipartUpload::builder().set_parts(Some(completed)).build())
            .send()
            .await
            .map_err(|e| write_error(e.to_string()))?;

        Ok(())
    }

    async fn upload_parts(
        &self,
        key: &str,
        upload_id: &str,
        first: Bytes,
        mut parts: FileStream,
    ) -> Result<Vec<CompletedPart>, StorageError> {
        let write_error = |e: String| StorageError::WriteError(key.to_string(), e);
        let mut completed = Vec::new();
        let mut next = Some(first);

        while let Some(part) = next {
            let part_number = completed.len() as i32 + 1;
            let output = self
                .client
                .upload_part()
                .bucket(&self.bucket_name)
                .key(key)
                .upload_id(upload_id)
                .part_number(part_number)
                .body(ByteStream::from(part))
                .send()
                .await
                .map_err(|e| write_error(e.to_string()))?;

            completed.push(
                CompletedPart::builder()
                    .set_e_tag(output.e_tag)
                    .part_number(part_number)
                    .build(),
            );

            next = match parts.next().await {
                Some(part) => Some(part.map_err(|e| write_error(e.to_string()))?),
                None => None,
            };
        }

        Ok(completed)
    }
}

#[async_trait::async_trait]
impl StorageBackend for S3Backend {
    async fn exists(&self, path: &str) -> Result<bool, StorageError> {
        match self.head(path).await {
            Ok(_) => Ok(true),
            Err(StorageError::NotFound(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    async fn read_stream(&self, path: &str) -> Result<FileStream, StorageError> {
        let key = self.build_key(path);

        let output = self
            .client
            .get_object()
            .bucket(&self.bucket_name)
            .key(&key)
            .send()
            .await
            .map_err(|e| {
                if e.as_service_error().map(|se| se.is_no_such_key()).unwrap_or(false) {
                    StorageError::NotFound(path.to_string())
                } else {
                    StorageError::S3SdkError(e.to_string())
                }
            })?;

        Ok(ReaderStream::new(output.body.into_async_read()).boxed())
    }

    async fn write_stream(&self, path: &str, stream: FileStream) -> Result<(), StorageError> {
        let mut parts = into_parts(stream, PART_SIZE);

        let first = match parts.next().await {
            Some(part) => part.map_err(|e| StorageError::WriteError(path.to_string(), e.to_string()))?,
            None => Bytes::new(),
        };

        // Only the last part can be short, so a short first part is the whole body
        if first.len() < PART_SIZE {
            return self.put(path, first).await;
        }

        self.put_multipart(path, first, parts).await
    }

    async fn put(&self, path: &str, contents: Bytes) -> Result<(), StorageError> {
        let key = self.build_key(path);

        tracing::info!("Uploading {} to S3 bucket {}", key, self.bucket_name);

        self.client
            .put_object()
            .bucket(&self.bucket_name)
            .key(&key)
            .body(ByteStream::from(contents))
            .send()
            .await
            .map_err(|e| StorageError::WriteError(key.clone(), e.to_string()))?;

        Ok(())
    }

    async fn delete(&self, path: &str) -> Result<(), StorageError> {
        let key = self.build_key(path);

        tracing::info!("Deleting {} from S3 bucket {}", key, self.bucket_name);

        // DeleteObject succeeds on missing keys
        self.client
            .delete_object()
            .bucket(&self.bucket_name)
            .key(&key)
            .send()
            .await
            .map_err(|e| StorageError::DeleteError(key.clone(), e.to_string()))?;

        Ok(())
    }

    async fn copy(&self, from: &str, to: &str) -> Result<(), StorageError> {
        let source_key = self.build_key(from);
        let target_key = self.build_key(to);

        self.client
            .copy_object()
            .bucket(&self.bucket_name)
            .copy_source(copy_source(&self.bucket_name, &source_key))
            .key(&target_key)
            .send()
            .await
            .map_err(|e| StorageError::WriteError(target_key.clone(), e.to_string()))?;

        Ok(())
    }

    async fn rename(&self, from: &str, to: &str) -> Result<(), StorageError> {
        // S3 has no rename; the source goes only after the copy landed
        self.copy(from, to).await?;
        self.delete(from).await
    }

    async fn size(&self, path: &str) -> Result<u64, StorageError> {
        let head = self.head(path).await?;
        Ok(head.content_length().unwrap_or(0).max(0) as u64)
    }

    async fn last_modified(&self, path: &str) -> Result<DateTime<Utc>, StorageError> {
        let head = self.head(path).await?;
        head.last_modified()
            .and_then(|ts| DateTime::from_timestamp(ts.secs(), ts.subsec_nanos()))
            .ok_or_else(|| StorageError::S3SdkError(format!("no Last-Modified for '{}'", path)))
    }

    async fn temporary_url(
        &self,
        path: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<String, StorageError> {
        let expires_in = (expires_at - Utc::now())
            .to_std()
            .map_err(|_| StorageError::Unsupported(format!("expiration in the past for '{}'", path)))?;
        let presigning = PresigningConfig::expires_in(expires_in)
            .map_err(|e| StorageError::S3SdkError(e.to_string()))?;

        let request = self
            .client
            .get_object()
            .bucket(&self.bucket_name)
            .key(self.build_key(path))
            .presigned(presigning)
            .await
            .map_err(|e| StorageError::S3SdkError(e.to_string()))?;

        Ok(request.uri().to_string())
    }

    async fn public_url(&self, path: &str) -> Result<String, StorageError> {
        if self.public_url.is_empty() {
            return Err(StorageError::Unsupported(format!("public url for '{}'", path)));
        }
        Ok(format!("{}/{}", self.public_url, self.build_key(path)))
    }

    fn is_remote(&self) -> bool {
        true
    }
}
