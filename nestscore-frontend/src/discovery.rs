use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;

use crate::errors::FrontendError;

/// 在输出目录（不递归）中查找修改时间最新的 `<prefix>*.dxf`。
/// 修改时间相同时取路径字典序最大的文件。
pub fn latest_output(dir: &Path, prefix: &str) -> Result<PathBuf, FrontendError> {
    let newest = WalkDir::new(dir)
        .max_depth(1)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file() && is_candidate(entry.path(), prefix))
        .filter_map(|entry| {
            let modified = entry.metadata().ok()?.modified().ok()?;
            Some((modified, entry.into_path()))
        })
        .max();

    match newest {
        Some((modified, path)) => {
            debug!(path = %path.display(), ?modified, "找到最新输出");
            Ok(path)
        }
        None => Err(FrontendError::NoOutputFound {
            dir: dir.to_path_buf(),
            prefix: prefix.to_string(),
        }),
    }
}

fn is_candidate(path: &Path, prefix: &str) -> bool {
    let Some(name) = path.file_name().and_then(|name| name.to_str()) else {
        return false;
    };
    name.starts_with(prefix)
        && path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("dxf"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{self, File};
    use std::time::{Duration, SystemTime};

    fn touch(path: &Path, age_secs: u64) {
        fs::write(path, "0\nEOF\n").expect("write file");
        let modified = SystemTime::now() - Duration::from_secs(age_secs);
        File::options()
            .write(true)
            .open(path)
            .expect("open file")
            .set_modified(modified)
            .expect("set mtime");
    }

    #[test]
    fn picks_most_recent_matching_file() {
        let dir = tempfile::tempdir().expect("create temp dir");
        touch(&dir.path().join("accuracy-old.dxf"), 300);
        touch(&dir.path().join("accuracy-new.dxf"), 10);
        touch(&dir.path().join("other-newest.dxf"), 1);
        touch(&dir.path().join("accuracy-notes.txt"), 0);

        let latest = latest_output(dir.path(), "accuracy-").expect("latest output");
        assert_eq!(latest, dir.path().join("accuracy-new.dxf"));
    }

    #[test]
    fn nested_directories_are_ignored() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let nested = dir.path().join("nested");
        fs::create_dir(&nested).expect("create nested dir");
        touch(&nested.join("accuracy-deep.dxf"), 0);

        match latest_output(dir.path(), "accuracy-") {
            Err(FrontendError::NoOutputFound { dir: reported, prefix }) => {
                assert_eq!(reported, dir.path());
                assert_eq!(prefix, "accuracy-");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn missing_directory_reports_no_output() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let err = latest_output(&dir.path().join("absent"), "accuracy-").unwrap_err();
        assert!(matches!(err, FrontendError::NoOutputFound { .. }));
    }
}
