use std::fs;
use std::path::{Path, PathBuf};

/// Classification of a request target against the served root.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ResourceKind {
    /// nothing positively confirmed at the candidate path
    Absent,
    RegularFile,
    Directory,
}

/// A request target resolved to a filesystem path within the root.
pub(crate) struct ResolvedResource {
    pub(crate) kind: ResourceKind,
    pub(crate) path: PathBuf,
}

/// Joins the decoded target onto the root and classifies the entry.
///
/// The target's leading separator is stripped so the join extends the
/// root instead of replacing it. Decoded `..` segments are passed to
/// the filesystem as-is. A filesystem error of any kind classifies as
/// `Absent`; resolution never fails.
pub(crate) fn resolve(root: &Path, target: &str) -> ResolvedResource {
    let relative = target.strip_prefix('/').unwrap_or(target);
    let path = root.join(relative);

    let kind = match fs::metadata(&path) {
        Err(_) => ResourceKind::Absent,
        Ok(ref meta) if meta.is_file() => ResourceKind::RegularFile,
        Ok(_) => ResourceKind::Directory,
    };

    ResolvedResource { kind, path }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::{resolve, ResourceKind};

    fn scratch_root() -> PathBuf {
        static NEXT: AtomicUsize = AtomicUsize::new(0);

        let root = std::env::temp_dir().join(format!(
            "localserve-resolver-{}-{}",
            std::process::id(),
            NEXT.fetch_add(1, Ordering::SeqCst)
        ));
        fs::create_dir_all(root.join("book")).unwrap();
        fs::write(root.join("hello.txt"), b"hello").unwrap();
        root
    }

    #[test]
    fn test_resolve_file() {
        let root = scratch_root();
        let resource = resolve(&root, "/hello.txt");

        assert_eq!(resource.kind, ResourceKind::RegularFile);
        assert_eq!(resource.path, root.join("hello.txt"));
    }

    #[test]
    fn test_resolve_directory() {
        let root = scratch_root();

        assert_eq!(resolve(&root, "/book").kind, ResourceKind::Directory);
        assert_eq!(resolve(&root, "/").kind, ResourceKind::Directory);
    }

    #[test]
    fn test_resolve_absent() {
        let root = scratch_root();

        assert_eq!(resolve(&root, "/nothing.bin").kind, ResourceKind::Absent);
        assert_eq!(
            resolve(&root, "/book/nothing.bin").kind,
            ResourceKind::Absent
        );
    }

    #[test]
    fn test_resolve_without_leading_separator() {
        let root = scratch_root();
        let resource = resolve(&root, "hello.txt");

        assert_eq!(resource.kind, ResourceKind::RegularFile);
        assert_eq!(resource.path, root.join("hello.txt"));
    }
}
