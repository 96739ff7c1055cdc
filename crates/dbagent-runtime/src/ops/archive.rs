use crate::storage::OffsiteStorage;
use crate::{DatabaseServer, Result};
use dbagent_types::{ArchiveReport, OffsiteConfig, OffsiteFile};
use flate2::Compression;
use flate2::write::GzEncoder;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

impl DatabaseServer {
    /// Compress and upload each binlog to `<path>/<binlog>.gz`.
    ///
    /// Items fail independently: every name lands in exactly one of the two
    /// report maps. Only a storage client that cannot be built fails the call.
    pub fn upload_binlogs_to_s3(
        &self,
        binlogs: &[String],
        offsite: &OffsiteConfig,
    ) -> Result<ArchiveReport> {
        let storage = self.storage.connect(offsite)?;
        let scratch = self.config.scratch_dir();
        let mut report = ArchiveReport::default();

        for binlog in binlogs {
            match self.archive_one(storage.as_ref(), &scratch, binlog, offsite) {
                Ok(file) => {
                    tracing::info!(binlog = %binlog, size = file.size, path = %file.path, "archived binlog");
                    report.offsite_files.insert(binlog.clone(), file);
                }
                Err(err) => {
                    tracing::warn!(binlog = %binlog, error = %err, "binlog upload failed");
                    report.failed_uploads.insert(binlog.clone(), err.to_string());
                }
            }
        }

        Ok(report)
    }

    fn archive_one(
        &self,
        storage: &dyn OffsiteStorage,
        scratch: &Path,
        binlog: &str,
        offsite: &OffsiteConfig,
    ) -> Result<OffsiteFile> {
        let source = self.binlog_path(binlog)?;

        // Removed on drop, whichever way this returns
        let compressed = tempfile::Builder::new()
            .prefix(&format!("{}.", binlog))
            .suffix(".gz")
            .tempfile_in(scratch)?;

        gzip(&source, compressed.as_file())?;
        let size = compressed.as_file().metadata()?.len();

        let key = offsite.object_key(binlog);
        storage.upload(compressed.path(), &key)?;

        Ok(OffsiteFile { size, path: key })
    }
}

fn gzip(source: &Path, target: &File) -> Result<()> {
    let mut reader = BufReader::new(File::open(source)?);
    let mut encoder = GzEncoder::new(BufWriter::new(target), Compression::default());
    std::io::copy(&mut reader, &mut encoder)?;
    encoder.finish()?.flush()?;
    Ok(())
}
