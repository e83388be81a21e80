use std::path::Path;

use crate::data::decode::{decode, SourceFormat};
use crate::data::model::Dataset;
use crate::data::view::Loaded;
use crate::error::LoadError;
use crate::remote::{PageRequest, PageSupplier};

// ---------------------------------------------------------------------------
// Load jobs (run off the UI thread)
// ---------------------------------------------------------------------------

/// Read a file and decode it with the strategy for its extension.
pub fn read_file(path: &Path) -> Result<Loaded, LoadError> {
    let format = SourceFormat::from_path(path)?;
    let bytes = std::fs::read(path).map_err(|source| LoadError::Io {
        path: path.display().to_string(),
        source,
    })?;
    read_bytes(&file_label(path), format, &bytes)
}

/// Decode already-read bytes.
pub fn read_bytes(label: &str, format: SourceFormat, bytes: &[u8]) -> Result<Loaded, LoadError> {
    let rows = decode(format, bytes)?;
    let dataset = Dataset::from_decoded(rows)?;
    log::info!("decoded {label} as {format}: {} rows", dataset.len());
    Ok(Loaded::File {
        label: label.to_string(),
        dataset,
    })
}

/// Fetch one page from a remote supplier.
pub fn fetch_page(
    supplier: &dyn PageSupplier,
    request: PageRequest,
    same_session: bool,
) -> Result<Loaded, LoadError> {
    let page = supplier.fetch_page(request)?;
    Ok(Loaded::Remote {
        page,
        request,
        same_session,
    })
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{FetchError, ParseError};
    use crate::remote::RemotePage;

    struct FixedSupplier(Result<usize, u16>);

    impl PageSupplier for FixedSupplier {
        fn fetch_page(&self, request: PageRequest) -> Result<RemotePage, FetchError> {
            match self.0 {
                Ok(total_pages) => Ok(RemotePage {
                    rows: vec![vec![("page".to_string(), (request.page as i64).into())]],
                    total_pages,
                }),
                Err(code) => Err(FetchError::Status {
                    url: "http://test".into(),
                    code,
                }),
            }
        }
    }

    #[test]
    fn reads_files_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("people.json");
        std::fs::write(&path, r#"[{"name":"Bob"},{"name":"Ann"}]"#).unwrap();

        match read_file(&path).unwrap() {
            Loaded::File { label, dataset } => {
                assert_eq!(label, "people.json");
                assert_eq!(dataset.len(), 2);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn unsupported_extension_fails_before_reading() {
        let err = read_file(Path::new("/definitely/missing/file.txt")).unwrap_err();
        assert!(matches!(err, LoadError::Parse(ParseError::UnsupportedExtension(_))));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = read_file(Path::new("/definitely/missing/file.csv")).unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }

    #[test]
    fn empty_json_array_is_empty_dataset() {
        let err = read_bytes("x.json", SourceFormat::Json, b"[]").unwrap_err();
        assert!(matches!(err, LoadError::Empty(_)));
    }

    #[test]
    fn fetch_wraps_supplier_results() {
        let request = PageRequest { page: 3, limit: 10 };
        let loaded = fetch_page(&FixedSupplier(Ok(5)), request, true).unwrap();
        assert!(matches!(
            loaded,
            Loaded::Remote { page: RemotePage { total_pages: 5, .. }, same_session: true, .. }
        ));

        let err = fetch_page(&FixedSupplier(Err(503)), request, false).unwrap_err();
        assert!(matches!(err, LoadError::Fetch(FetchError::Status { code: 503, .. })));
    }
}
