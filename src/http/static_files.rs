//! Static upload, document and asset directories.
//!
//! Served in both deployment modes. A file missing under a mounted prefix is
//! answered with 404 by the file service itself and never reaches the API
//! routes or the SPA fallback.

use std::path::{Path, PathBuf};

use axum::Router;
use tower_http::services::ServeDir;

/// URL prefixes and the sub-directory each maps to, in mount order.
pub const MOUNT_POINTS: [(&str, &str); 3] = [
    ("/uploads", "uploads"),
    ("/documents", "documents"),
    ("/assets", "assets"),
];

/// One prefix → directory entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mount {
    pub prefix: &'static str,
    pub dir: PathBuf,
}

/// The fixed mount table.
#[derive(Debug, Clone)]
pub struct StaticAssetMounts {
    mounts: Vec<Mount>,
}

impl StaticAssetMounts {
    /// Mount table rooted at `root`.
    pub fn new(root: &Path) -> Self {
        let mounts = MOUNT_POINTS
            .iter()
            .map(|&(prefix, dir)| Mount {
                prefix,
                dir: root.join(dir),
            })
            .collect();
        Self { mounts }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Mount> {
        self.mounts.iter()
    }

    /// Whether `path` falls under one of the mounted prefixes.
    pub fn covers(&self, path: &str) -> bool {
        self.mounts
            .iter()
            .any(|m| path == m.prefix || path.starts_with(&format!("{}/", m.prefix)))
    }

    pub(crate) fn apply(&self, mut router: Router) -> Router {
        for mount in &self.mounts {
            tracing::debug!(prefix = mount.prefix, dir = %mount.dir.display(), "Mounting static directory");
            router = router.nest_service(mount.prefix, ServeDir::new(&mount.dir));
        }
        router
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use tower::ServiceExt;

    #[test]
    fn table_has_three_fixed_entries() {
        let mounts = StaticAssetMounts::new(Path::new("/srv/app"));
        let entries: Vec<_> = mounts.iter().map(|m| (m.prefix, m.dir.clone())).collect();
        assert_eq!(
            entries,
            vec![
                ("/uploads", PathBuf::from("/srv/app/uploads")),
                ("/documents", PathBuf::from("/srv/app/documents")),
                ("/assets", PathBuf::from("/srv/app/assets")),
            ]
        );
    }

    #[test]
    fn covers_whole_segments_only() {
        let mounts = StaticAssetMounts::new(Path::new("."));
        assert!(mounts.covers("/uploads/cv.pdf"));
        assert!(mounts.covers("/assets"));
        assert!(!mounts.covers("/uploadsx/cv.pdf"));
        assert!(!mounts.covers("/api/uploads"));
    }

    #[tokio::test]
    async fn serves_files_and_404s_missing_ones() {
        let root = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(root.path().join("documents")).unwrap();
        std::fs::write(root.path().join("documents/offer.txt"), "offer letter").unwrap();

        let app = StaticAssetMounts::new(root.path()).apply(Router::new());

        let res = app
            .clone()
            .oneshot(Request::builder().uri("/documents/offer.txt").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let body = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"offer letter");

        // Missing directory entirely is fine too.
        let res = app
            .oneshot(Request::builder().uri("/uploads/missing.png").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }
}
