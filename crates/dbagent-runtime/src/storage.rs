use crate::{Error, Result};
use dbagent_types::OffsiteConfig;
use object_store::aws::{AmazonS3, AmazonS3Builder};
use object_store::path::Path as ObjectPath;
use object_store::{ObjectStore, WriteMultipart};
use std::io::Read;
use std::path::Path;

// S3 minimum part size is 5 MiB; binlogs compress to tens of MiB at most.
const PART_SIZE: usize = 8 * 1024 * 1024;
const MAX_CONCURRENT_PARTS: usize = 4;

/// Destination for archived binlogs
pub trait OffsiteStorage {
    /// Upload the file at `source` to `key` in the configured bucket
    fn upload(&self, source: &Path, key: &str) -> Result<()>;
}

/// Builds a storage client for one archival batch
pub trait OffsiteStorageFactory: Send + Sync {
    fn connect(&self, config: &OffsiteConfig) -> Result<Box<dyn OffsiteStorage>>;
}

/// Amazon S3 via `object_store`
#[derive(Debug, Default, Clone, Copy)]
pub struct S3StorageFactory;

impl OffsiteStorageFactory for S3StorageFactory {
    fn connect(&self, config: &OffsiteConfig) -> Result<Box<dyn OffsiteStorage>> {
        let mut builder = AmazonS3Builder::new()
            .with_bucket_name(&config.bucket)
            .with_access_key_id(&config.auth.access_key)
            .with_secret_access_key(&config.auth.secret_key);
        if let Some(region) = &config.auth.region {
            builder = builder.with_region(region);
        }

        let store = builder
            .build()
            .map_err(|e| Error::Storage(format!("failed to build S3 client: {}", e)))?;

        // object_store is async-only; archival is not
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;

        Ok(Box::new(S3Storage { store, runtime }))
    }
}

struct S3Storage {
    store: AmazonS3,
    runtime: tokio::runtime::Runtime,
}

impl OffsiteStorage for S3Storage {
    fn upload(&self, source: &Path, key: &str) -> Result<()> {
        let location = ObjectPath::from(key);
        let mut file = std::fs::File::open(source)?;

        self.runtime.block_on(async {
            let upload = self.store.put_multipart(&location).await?;
            let mut writer = WriteMultipart::new_with_chunk_size(upload, PART_SIZE);

            let mut buffer = vec![0u8; PART_SIZE];
            loop {
                let read = match file.read(&mut buffer) {
                    Ok(0) => break,
                    Ok(read) => read,
                    Err(err) => {
                        writer.abort().await?;
                        return Err(Error::Io(err));
                    }
                };
                writer.wait_for_capacity(MAX_CONCURRENT_PARTS).await?;
                writer.write(&buffer[..read]);
            }

            writer.finish().await?;
            Ok(())
        })?;

        tracing::debug!(key, "uploaded object");
        Ok(())
    }
}
