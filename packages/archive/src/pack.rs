use crate::error::{ArchiveError, ArchiveResult};
use sitecanvas_bundle::{FileContent, SiteFile};
use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

/// Package a file set into a ZIP, preserving the original paths and order.
///
/// Entry timestamps are pinned so packing the same file set twice yields
/// identical bytes.
pub fn pack_files(files: &[SiteFile]) -> ArchiveResult<Vec<u8>> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let fixed_time = DateTime::from_date_and_time(1980, 1, 1, 0, 0, 0)
        .map_err(|e| ArchiveError::Io(std::io::Error::other(e.to_string())))?;
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .last_modified_time(fixed_time);

    for file in files {
        writer
            .start_file(file.path.clone(), options)
            .map_err(|e| ArchiveError::Io(std::io::Error::other(e.to_string())))?;
        match &file.content {
            FileContent::Text(text) => writer.write_all(text.as_bytes())?,
            FileContent::Binary(bytes) => writer.write_all(bytes)?,
        }
    }

    let cursor = writer
        .finish()
        .map_err(|e| ArchiveError::Io(std::io::Error::other(e.to_string())))?;
    Ok(cursor.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::process_archive;

    fn sample_files() -> Vec<SiteFile> {
        vec![
            SiteFile::text("index.html", "<p>hi</p>"),
            SiteFile::text("css/style.css", ".a { color: red; }"),
            SiteFile::binary("img/logo.png", vec![0x89, 0x50, 0x4e, 0x47]),
        ]
    }

    #[test]
    fn packed_archive_reimports() {
        let bytes = pack_files(&sample_files()).unwrap();
        let project = process_archive("packed.zip", &bytes, 0).unwrap();

        assert_eq!(project.files.len(), 3);
        assert_eq!(
            project.file("css/style.css").unwrap().as_text(),
            Some(".a { color: red; }")
        );
        match &project.file("img/logo.png").unwrap().content {
            FileContent::Binary(data) => assert_eq!(data, &[0x89, 0x50, 0x4e, 0x47]),
            FileContent::Text(_) => panic!("image decoded as text"),
        }
    }

    #[test]
    fn packing_is_deterministic() {
        let files = sample_files();
        assert_eq!(pack_files(&files).unwrap(), pack_files(&files).unwrap());
    }
}
