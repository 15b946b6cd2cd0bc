use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use err_derive::Error;
use log::*;
use tempfile::Builder;

use crate::documents::Document;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error(display = "could not open data directory {:?}", path)]
    Open {
        path: PathBuf,
        #[error(source)]
        cause: io::Error,
    },
    #[error(display = "could not read {:?}", path)]
    Read {
        path: PathBuf,
        #[error(source)]
        cause: io::Error,
    },
    #[error(display = "document {:?} is not parseable", path)]
    Corrupt {
        path: PathBuf,
        #[error(source)]
        cause: serde_json::Error,
    },
    #[error(display = "could not encode {:?}", path)]
    Encode {
        path: PathBuf,
        #[error(source)]
        cause: serde_json::Error,
    },
    #[error(display = "could not write {:?}", path)]
    Write {
        path: PathBuf,
        #[error(source)]
        cause: io::Error,
    },
}

pub trait Storage {
    /// Loads a document, materializing its seed when it does not exist.
    fn load<D: Document>(&self) -> Result<D, StorageError>;
    fn save<D: Document>(&self, document: &D) -> Result<(), StorageError>;
    /// Writes a copy of `document` alongside the live one, returning where it went.
    fn export<D: Document>(&self, document: &D, label: &str) -> Result<PathBuf, StorageError>;
}

/// Documents kept as pretty printed JSON files in a single directory.
#[derive(Debug, Clone)]
pub struct Documents {
    root: PathBuf,
}

impl Documents {
    pub fn open<P: Into<PathBuf>>(root: P) -> Result<Self, StorageError> {
        let root = root.into();
        debug!("Open documents at {:?}", root);
        fs::create_dir_all(&root).map_err(|cause| StorageError::Open {
            path: root.clone(),
            cause,
        })?;
        Ok(Documents { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_of<D: Document>(&self) -> PathBuf {
        self.root.join(D::FILE_NAME)
    }

    fn read<D: Document>(&self, path: &Path) -> Result<Option<D>, StorageError> {
        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(ref e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(cause) => {
                return Err(StorageError::Read {
                    path: path.to_owned(),
                    cause,
                })
            }
        };
        let doc = serde_json::from_slice(&bytes).map_err(|cause| StorageError::Corrupt {
            path: path.to_owned(),
            cause,
        })?;
        Ok(Some(doc))
    }

    fn write<D: Document>(&self, path: &Path, document: &D) -> Result<(), StorageError> {
        let mut bytes = serde_json::to_vec_pretty(document).map_err(|cause| {
            StorageError::Encode {
                path: path.to_owned(),
                cause,
            }
        })?;
        bytes.push(b'\n');
        write_atomically(path, &bytes).map_err(|cause| StorageError::Write {
            path: path.to_owned(),
            cause,
        })?;
        trace!("Wrote {} bytes to {:?}", bytes.len(), path);
        Ok(())
    }
}

impl Storage for Documents {
    fn load<D: Document>(&self) -> Result<D, StorageError> {
        let path = self.path_of::<D>();
        if let Some(doc) = self.read(&path)? {
            debug!("Loaded {:?}", path);
            return Ok(doc);
        }

        info!("Seeding missing document {:?}", path);
        let doc = D::seed();
        self.write(&path, &doc)?;
        Ok(doc)
    }

    fn save<D: Document>(&self, document: &D) -> Result<(), StorageError> {
        let path = self.path_of::<D>();
        self.write(&path, document)?;
        debug!("Saved {:?}", path);
        Ok(())
    }

    fn export<D: Document>(&self, document: &D, label: &str) -> Result<PathBuf, StorageError> {
        let path = self.root.join(format!("{}_{}.json", D::stem(), label));
        self.write(&path, document)?;
        info!("Exported {} to {:?}", D::FILE_NAME, path);
        Ok(path)
    }
}

/// Replaces `path` with `bytes` via a temporary file in the same directory.
///
/// The temporary file is removed if anything fails before the rename, so the
/// previous contents of `path` survive a failed or interrupted write. An
/// existing file keeps its permissions; a new one gets the usual umask
/// defaults rather than the owner-only mode of temporary files.
pub fn write_atomically(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let existing = match fs::metadata(path) {
        Ok(meta) => Some(meta.permissions()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => None,
        Err(e) => return Err(e),
    };

    let mut builder = Builder::new();
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        builder.permissions(fs::Permissions::from_mode(0o666));
    }
    let mut tmp = builder.tempfile_in(parent)?;
    if let Some(perms) = existing {
        fs::set_permissions(tmp.path(), perms)?;
    }
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
    struct Tally {
        name: String,
        count: u32,
    }

    impl Document for Tally {
        const FILE_NAME: &'static str = "tally.json";
        fn seed() -> Self {
            Tally {
                name: "fresh".to_string(),
                count: 0,
            }
        }
    }

    fn documents() -> (tempfile::TempDir, Documents) {
        env_logger::try_init().unwrap_or_default();
        let dir = tempfile::tempdir().expect("tempdir");
        let docs = Documents::open(dir.path()).expect("open");
        (dir, docs)
    }

    #[test]
    fn load_missing_document_should_materialize_seed() {
        let (_dir, docs) = documents();

        let loaded = docs.load::<Tally>().expect("load");
        assert_eq!(loaded, Tally::seed());
        assert!(docs.path_of::<Tally>().exists(), "seed should be written");
    }

    #[test]
    fn save_load() {
        let (_dir, docs) = documents();
        let some_doc = Tally {
            name: "Dave".to_string(),
            count: 7,
        };

        docs.save(&some_doc).expect("save");
        let loaded = docs.load::<Tally>().expect("load");

        assert_eq!(loaded, some_doc);
    }

    #[test]
    fn should_update_on_overwrite() {
        let (_dir, docs) = documents();

        docs.save(&Tally {
            name: "Version 1".to_string(),
            count: 1,
        })
        .expect("save original");
        docs.save(&Tally {
            name: "Version 2".to_string(),
            count: 2,
        })
        .expect("save modified");

        let loaded = docs.load::<Tally>().expect("load");
        assert_eq!(loaded.name, "Version 2");
    }

    #[test]
    fn saved_documents_are_pretty_printed() {
        let (_dir, docs) = documents();
        docs.save(&Tally::seed()).expect("save");

        let text = fs::read_to_string(docs.path_of::<Tally>()).expect("read");
        assert_eq!(text, "{\n  \"name\": \"fresh\",\n  \"count\": 0\n}\n");
    }

    #[test]
    fn should_fail_on_corrupt_document() {
        let (_dir, docs) = documents();
        fs::write(docs.path_of::<Tally>(), b"{ not json").expect("write garbage");

        let err = docs.load::<Tally>().expect_err("load should fail");

        match err {
            StorageError::Corrupt { path, .. } => assert_eq!(path, docs.path_of::<Tally>()),
            other => panic!("Expected corrupt document error, got {:?}", other),
        }
    }

    #[test]
    fn corrupt_document_is_left_alone() {
        let (_dir, docs) = documents();
        fs::write(docs.path_of::<Tally>(), b"[]").expect("write wrong shape");

        docs.load::<Tally>().expect_err("load should fail");

        let text = fs::read_to_string(docs.path_of::<Tally>()).expect("read");
        assert_eq!(text, "[]");
    }

    #[test]
    fn export_writes_labelled_copy() {
        let (_dir, docs) = documents();
        let some_doc = Tally {
            name: "Exported".to_string(),
            count: 3,
        };

        let path = docs.export(&some_doc, "export_20240101120000").expect("export");

        assert_eq!(path, docs.root().join("tally_export_20240101120000.json"));
        let copy: Tally = serde_json::from_slice(&fs::read(&path).expect("read")).expect("parse");
        assert_eq!(copy, some_doc);
        assert!(
            !docs.path_of::<Tally>().exists(),
            "export should not touch the live document"
        );
    }

    #[test]
    fn atomic_write_leaves_no_stray_files() {
        let (dir, docs) = documents();
        docs.save(&Tally::seed()).expect("save");
        docs.save(&Tally::seed()).expect("save again");

        let names = fs::read_dir(dir.path())
            .expect("read dir")
            .map(|e| e.expect("entry").file_name())
            .collect::<Vec<_>>();
        assert_eq!(names, vec![std::ffi::OsString::from("tally.json")]);
    }

    #[cfg(unix)]
    fn mode_of(path: &Path) -> u32 {
        use std::os::unix::fs::PermissionsExt;
        fs::metadata(path).expect("metadata").permissions().mode() & 0o777
    }

    #[cfg(unix)]
    #[test]
    fn save_keeps_existing_file_mode() {
        use std::os::unix::fs::PermissionsExt;
        let (_dir, docs) = documents();
        let path = docs.path_of::<Tally>();
        docs.save(&Tally::seed()).expect("save");
        fs::set_permissions(&path, fs::Permissions::from_mode(0o664)).expect("chmod");

        docs.save(&Tally {
            name: "again".to_string(),
            count: 1,
        })
        .expect("save again");

        assert_eq!(mode_of(&path), 0o664);
    }

    #[cfg(unix)]
    #[test]
    fn new_documents_get_default_file_mode() {
        let (dir, docs) = documents();
        let plain = dir.path().join("plain.txt");
        fs::write(&plain, b"x").expect("write plain file");

        docs.load::<Tally>().expect("seed");

        assert_eq!(mode_of(&docs.path_of::<Tally>()), mode_of(&plain));
    }

    #[test]
    fn open_creates_missing_directory() {
        env_logger::try_init().unwrap_or_default();
        let dir = tempfile::tempdir().expect("tempdir");
        let nested = dir.path().join("a").join("b");

        let docs = Documents::open(&nested).expect("open");

        assert!(nested.is_dir());
        assert_eq!(docs.root(), nested.as_path());
    }
}
