//! Confinement of untrusted identifiers to the upload directory.

use std::path::{Component, Path, PathBuf};

use domain_upload::exception::{UploadException, UploadResult};

/// Resolves `identifier` lexically into a relative path that can't leave its root.
///
/// `..` is allowed as long as it never climbs above the root, `.` and repeated separators
/// are dropped. Empty results, absolute prefixes and NUL bytes are rejected.
pub fn confine(identifier: &str) -> UploadResult<PathBuf> {
    let invalid = || UploadException::InvalidIdentifier {
        identifier: identifier.to_owned(),
    };
    let mut components = Vec::new();
    for component in Path::new(identifier).components() {
        match component {
            Component::Normal(s) => {
                if s.as_encoded_bytes().contains(&0) {
                    return Err(invalid());
                }
                components.push(s);
            }
            Component::CurDir => {}
            Component::RootDir | Component::Prefix(_) => return Err(invalid()),
            Component::ParentDir => {
                if components.pop().is_none() {
                    return Err(invalid());
                }
            }
        }
    }
    if components.is_empty() {
        return Err(invalid());
    }
    Ok(components.into_iter().collect())
}

/// [`confine`] joined onto `base`.
pub fn resolve(base: &Path, identifier: &str) -> UploadResult<PathBuf> {
    Ok(base.join(confine(identifier)?))
}
